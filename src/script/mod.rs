//! Init scripts
//!
//! Two formats are understood: plain ex command files (one command per
//! line, `"` starts a comment) and Lua files with a `rift` API table.
//! Everything a script defines is owned by [`Owner::InitScript`], so
//! loading a file again first drops what the previous load mapped.

pub mod lua;

use crate::ex::ExContext;
use crate::keymap::Owner;
use crate::session::Engine;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Read `path` and run it as a Lua script when it ends in `.lua`, as ex
/// commands otherwise. Returns the lines the commands printed.
pub fn load_init_file(engine: &Engine, path: &Path) -> Result<Vec<String>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read init file {}", path.display()))?;
    let name = path.display().to_string();
    let removed = engine.remove_owner(&Owner::InitScript);
    tracing::debug!(path = %name, removed, "load init file");

    let is_lua = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("lua"));
    if is_lua {
        lua::run(engine, &source, &name)?;
        Ok(Vec::new())
    } else {
        run_ex_script(engine, &source, &name)
    }
}

/// Run ex commands line by line, stopping at the first failure
pub fn run_ex_script(engine: &Engine, source: &str, name: &str) -> Result<Vec<String>> {
    let mut ctx = ExContext::new(engine, None, Owner::InitScript);
    for (index, line) in source.lines().enumerate() {
        let line = line.trim_start();
        if let Err(err) = ctx.run(line) {
            tracing::warn!(script = name, line = index + 1, code = %err.code, "init script failed");
            bail!("{name}:{}: {}", index + 1, err.status_line());
        }
    }
    Ok(ctx.output)
}
