//! Rift engine - modal key dispatch for vim-like editing
//!
//! The host owns the buffer and the screen. It feeds keys into a
//! [`session::Session`], reports native selection changes, polls
//! [`session::Session::next_deadline`] for mapping timeouts and reads the
//! mode, caret, selection and cursor shape back out.

pub mod buffer;
pub mod constants;
pub mod dispatcher;
pub mod error;
pub mod ex;
pub mod handlers;
pub mod key;
pub mod keymap;
pub mod logging;
pub mod marks;
pub mod mode;
pub mod options;
pub mod registers;
pub mod script;
pub mod search;
pub mod session;
pub mod state;

#[cfg(test)]
pub mod test_utils;
