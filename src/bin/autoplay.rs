//! Autoplay soak CLI.
//!
//! Plays randomized games and outputs one JSON summary per game.
//!
//! Usage:
//!   cargo run --release --bin autoplay -- [OPTIONS]
//!
//! Options:
//!   --games N       Number of games to play (default: 10)
//!   --moves N       Clicks per game (default: 200)
//!   --width N       Board width (default: 5)
//!   --height N      Board height (default: 5)
//!   --colors N      Color variants (default: 5)
//!   --config FILE   Board settings as JSON
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress progress and summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use log::{error, info};

use cellfall::autoplay::{self, AutoplayConfig};
use cellfall::config::GameConfig;

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    let raw = args
        .get(i)
        .ok_or_else(|| format!("{} requires a value", flag))?;
    raw.parse()
        .map_err(|_| format!("invalid {} value: {}", flag, raw))
}

fn parse_args(args: &[String]) -> Result<Option<(AutoplayConfig, Option<String>)>, String> {
    let mut config = AutoplayConfig::default();
    let mut output_path = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--games" => {
                i += 1;
                config.games = value(args, i, flag)?;
            }
            "--moves" => {
                i += 1;
                config.moves_per_game = value(args, i, flag)?;
            }
            "--width" => {
                i += 1;
                config.game.width = value(args, i, flag)?;
            }
            "--height" => {
                i += 1;
                config.game.height = value(args, i, flag)?;
            }
            "--colors" => {
                i += 1;
                config.game.color_variants = value(args, i, flag)?;
            }
            "--config" => {
                i += 1;
                let path: String = value(args, i, flag)?;
                config.game = GameConfig::load(&path).map_err(|e| format!("{}: {}", path, e))?;
            }
            "--threads" => {
                i += 1;
                config.threads = value(args, i, flag)?;
            }
            "--seed" => {
                i += 1;
                config.seed = value(args, i, flag)?;
            }
            "--output" => {
                i += 1;
                output_path = Some(value(args, i, flag)?);
            }
            "--quiet" => config.quiet = true,
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("unknown argument: {}", other)),
        }
        i += 1;
    }
    Ok(Some((config, output_path)))
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let (config, output_path) = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            process::exit(1);
        }
    };

    let default_level = if config.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    info!(
        "autoplay: {} games, {} moves/game, {}x{} board, {} colors, {} threads",
        config.games,
        config.moves_per_game,
        config.game.width,
        config.game.height,
        config.game.color_variants,
        config.threads
    );

    let start = Instant::now();
    let games = match autoplay::run_autoplay(&config) {
        Ok(g) => g,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };
    let elapsed = start.elapsed().as_secs_f64();
    info!(
        "completed {} games in {:.1}s ({:.1} games/s)",
        games.len(),
        elapsed,
        games.len() as f64 / elapsed.max(1e-9)
    );
    if !config.quiet {
        if let Err(e) = autoplay::write_summary(&games, &mut io::stderr()) {
            error!("failed to write summary: {}", e);
        }
    }

    let written = match &output_path {
        Some(path) => File::create(path)
            .map_err(autoplay::AutoplayError::from)
            .and_then(|file| autoplay::write_jsonl(&games, &mut BufWriter::new(file))),
        None => autoplay::write_jsonl(&games, &mut BufWriter::new(io::stdout().lock())),
    };
    match written {
        Ok(()) => {
            if let Some(path) = output_path {
                info!("wrote {} games to {}", games.len(), path);
            }
        }
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: autoplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --moves N        Clicks per game (default: 200)");
    eprintln!("  --width N        Board width (default: 5)");
    eprintln!("  --height N       Board height (default: 5)");
    eprintln!("  --colors N       Color variants (default: 5)");
    eprintln!("  --config FILE    Board settings as JSON");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress progress and summary output");
    eprintln!("  --help           Show this help");
}
