//! Cellfall -- a match-cells puzzle engine driven over a line protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Diagnostics go to stderr through `env_logger` (`RUST_LOG` sets the level).
//!
//! Usage: `cellfall [--config <file.json>]`

use std::env;
use std::io::{self, BufRead};
use std::process;

use log::{error, warn};

use cellfall::config::GameConfig;
use cellfall::engine::Engine;
use cellfall::protocol::parser::{parse_command, Command};

/// Reads the optional `--config <file>` argument.
fn load_config() -> Result<GameConfig, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut config = GameConfig::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires a file path")?;
                config = GameConfig::load(path).map_err(|e| format!("{}: {}", path, e))?;
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
        i += 1;
    }
    Ok(config)
}

/// Runs the main protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() {
    env_logger::init();

    let config = match load_config() {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::with_config(config);

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        let result = match cmd {
            Command::IsReady => engine.handle_isready(&mut out),
            Command::SetOption { name, value } => {
                if let Err(e) = engine.set_option(&name, value.as_deref()) {
                    warn!("setoption: {}", e);
                }
                Ok(())
            }
            Command::NewGame(size) => engine.handle_newgame(size, &mut out),
            Command::Position { board } => engine.handle_position(&board, &mut out),
            Command::Click { x, y } => engine.handle_click(x, y, &mut out),
            Command::Board => engine.handle_board(&mut out),
            Command::Moves => engine.handle_moves(&mut out),
            Command::Quit => break,
        };

        if let Err(e) = result {
            error!("failed to write response: {}", e);
            break;
        }
    }
}
