//! rift-keys - feed key notation through the engine and print the result

use anyhow::Result;
use clap::Parser;
use rift_engine::constants::env::INIT;
use rift_engine::dispatcher::Outcome;
use rift_engine::key::parse_keys;
use rift_engine::logging::{self, LogConfig};
use rift_engine::script;
use rift_engine::session::{Engine, Session};
use std::path::PathBuf;
use std::sync::Arc;

/// Feed keys to a fresh session and report mode, caret and text
#[derive(Parser, Debug)]
#[command(name = "rift-keys", version, about, long_about = None)]
struct Cli {
    /// Ex script to run before any key
    #[arg(long, env = INIT)]
    init: Option<PathBuf>,

    /// Initial buffer contents
    #[arg(long, default_value = "")]
    text: String,

    /// Key notation, e.g. `dw` or `ihello<Esc>`; arguments are joined by spaces
    keys: Vec<String>,
}

fn run(cli: Cli) -> Result<()> {
    let engine = Arc::new(Engine::new());
    if let Some(path) = &cli.init {
        for line in script::load_init_file(&engine, path)? {
            println!("{line}");
        }
    }

    let mut session = Session::with_text(Arc::clone(&engine), &cli.text);
    for key in parse_keys(&cli.keys.join(" ")) {
        if let Outcome::Error(message) = session.handle(key) {
            eprintln!("{message}");
        }
    }
    if let Outcome::Error(message) = session.commit_pending() {
        eprintln!("{message}");
    }

    println!("mode: {}", session.mode());
    println!("caret: {}", session.caret());
    if let Some(selection) = session.selection() {
        println!("selection: {}..{}", selection.start, selection.end);
    }
    println!("text: {:?}", session.text());
    Ok(())
}

fn main() {
    logging::init(LogConfig::default());
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("rift-keys: {err:#}");
        std::process::exit(1);
    }
}
