//! Lua init scripts
//!
//! The global `rift` table exposes:
//!
//! - `rift.map(modes, lhs, rhs [, opts])` and `rift.noremap(...)`, where
//!   `modes` is a string of mode letters (`""` for normal, visual, select
//!   and operator-pending, `"!"` for insert and command line) and `opts`
//!   may set `nowait`
//! - `rift.unmap(modes, lhs)`
//! - `rift.set(name, value)` and `rift.get(name)` on global option values
//! - `rift.cmd(line)` to run an ex command, returning what it printed

use crate::error::EngineError;
use crate::ex::ExContext;
use crate::keymap::{MapFlags, MapModes, Owner};
use crate::options::{OptionScope, OptionValue};
use crate::session::Engine;
use anyhow::Context;
use mlua::{Lua, Table, Value};

/// Run `source` with a fresh interpreter bound to `engine`
pub fn run(engine: &Engine, source: &str, name: &str) -> anyhow::Result<()> {
    let lua = Lua::new();
    lua.scope(|scope| {
        let rift = lua.create_table()?;
        rift.set(
            "map",
            scope.create_function(|_, args: MapArgs| define(engine, args, MapFlags::RECURSIVE))?,
        )?;
        rift.set(
            "noremap",
            scope.create_function(|_, args: MapArgs| define(engine, args, MapFlags::NOREMAP))?,
        )?;
        rift.set(
            "unmap",
            scope.create_function(|_, (modes, lhs): (String, String)| {
                let modes = parse_modes(&modes)?;
                engine.unmap(modes, &lhs).map_err(mlua::Error::external)
            })?,
        )?;
        rift.set(
            "set",
            scope.create_function(|_, (option, value): (String, Value)| set_option(engine, &option, value))?,
        )?;
        rift.set(
            "get",
            scope.create_function(|lua, option: String| get_option(lua, engine, &option))?,
        )?;
        rift.set(
            "cmd",
            scope.create_function(|_, line: String| {
                let mut ctx = ExContext::new(engine, None, Owner::InitScript);
                ctx.run(&line).map_err(mlua::Error::external)?;
                Ok(ctx.output.join("\n"))
            })?,
        )?;
        lua.globals().set("rift", rift)?;
        lua.load(source).set_name(name).exec()
    })
    .map_err(|err| anyhow::anyhow!("{err}"))
    .with_context(|| format!("error in Lua init script {name}"))
}

type MapArgs = (String, String, String, Option<Table>);

fn define(engine: &Engine, (modes, lhs, rhs, opts): MapArgs, flags: MapFlags) -> mlua::Result<()> {
    let modes = parse_modes(&modes)?;
    let nowait = match opts {
        Some(opts) => opts.get::<Option<bool>>("nowait")?.unwrap_or(false),
        None => false,
    };
    let flags = if nowait { flags.nowait() } else { flags };
    engine
        .map(modes, &lhs, &rhs, Owner::InitScript, flags)
        .map(|_| ())
        .map_err(mlua::Error::external)
}

/// `""`, `"!"` or any combination of single mode letters such as `"nx"`
fn parse_modes(spec: &str) -> mlua::Result<MapModes> {
    if let Some(modes) = MapModes::from_spec(spec) {
        return Ok(modes);
    }
    spec.chars().try_fold(MapModes::NONE, |acc, letter| {
        MapModes::from_spec(letter.encode_utf8(&mut [0; 4]))
            .map(|m| acc | m)
            .ok_or_else(|| mlua::Error::runtime(format!("invalid map mode: {letter}")))
    })
}

fn set_option(engine: &Engine, name: &str, value: Value) -> mlua::Result<()> {
    let options = &engine.options;
    let result = match value {
        Value::Boolean(b) => options.set(OptionScope::Global, name, OptionValue::Bool(b)),
        Value::Integer(n) => options.set(OptionScope::Global, name, OptionValue::Number(n)),
        Value::Number(n) => options.set(OptionScope::Global, name, OptionValue::Number(n as i64)),
        Value::String(s) => options.set_from_str(OptionScope::Global, name, &s.to_str()?),
        Value::Table(items) => {
            let items = items
                .sequence_values::<String>()
                .collect::<mlua::Result<Vec<String>>>()?;
            options.set(OptionScope::Global, name, OptionValue::List(items))
        }
        other => {
            return Err(mlua::Error::runtime(format!(
                "cannot set {name} to a {}",
                other.type_name()
            )))
        }
    };
    result.map_err(|err| mlua::Error::external(EngineError::from(err)))
}

fn get_option(lua: &Lua, engine: &Engine, name: &str) -> mlua::Result<Value> {
    let value = engine
        .options
        .get(OptionScope::Global, name)
        .map_err(|err| mlua::Error::external(EngineError::from(err)))?;
    Ok(match value {
        OptionValue::Bool(b) => Value::Boolean(b),
        OptionValue::Number(n) => Value::Integer(n),
        OptionValue::String(s) => Value::String(lua.create_string(&s)?),
        OptionValue::List(items) => Value::Table(lua.create_sequence_from(items)?),
    })
}
