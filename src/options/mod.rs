//! Option registry
//! Typed, validated configuration values with change notification

pub mod definitions;
pub mod descriptor;
pub mod guicursor;
pub mod registry;

pub use definitions::OPTIONS;
pub use descriptor::{
    Locality, OptionDescriptor, OptionError, OptionType, OptionValidator, OptionValue,
};
pub use guicursor::{CursorAttributes, CursorMode, CursorShape, GuiCursorEntry};
pub use registry::{ListenerId, OptionChange, OptionListener, OptionRegistry, OptionScope};

/// Registry populated with the engine's option table
pub fn default_registry() -> OptionRegistry {
    OptionRegistry::new(OPTIONS)
}
