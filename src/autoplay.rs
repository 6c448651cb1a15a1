//! Randomized soak games.
//!
//! Plays whole sessions by clicking a random playable region each turn until
//! the move budget runs out or the board can no longer be made solvable.
//! Each game is summarized for JSONL output, which makes long runs a cheap
//! way to exercise the move sequence and the reshuffle loop.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Instant;

use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, GameConfig};
use crate::controller::{BoardController, MoveError, MoveOutcome, NullAgent};
use crate::resolve::GuardError;

/// Failures that abort an autoplay run.
#[derive(Debug, thiserror::Error)]
pub enum AutoplayError {
    #[error("invalid game configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("game {game_id} failed: {source}")]
    Move { game_id: usize, source: MoveError },

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write summary: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration for an autoplay run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplayConfig {
    /// Number of games to play.
    pub games: usize,
    /// Clicks per game before it is stopped.
    pub moves_per_game: usize,
    /// Board settings shared by every game. Its seed is replaced per game.
    pub game: GameConfig,
    /// Number of parallel threads for concurrent games.
    pub threads: usize,
    /// Base random seed (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress output.
    pub quiet: bool,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        AutoplayConfig {
            games: 10,
            moves_per_game: 200,
            game: GameConfig::default(),
            threads: 4,
            seed: 0,
            quiet: false,
        }
    }
}

/// Outcome of one autoplay game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_id: usize,
    /// Seed the game's board controller ran with.
    pub seed: u64,
    /// Clicks that removed a region.
    pub moves: usize,
    pub cells_cleared: usize,
    /// Reshuffles over the whole game, the initial deal included.
    pub reshuffles: u32,
    /// Size of the largest region removed.
    pub largest_region: usize,
    /// Whether the game ended because no solvable board could be dealt.
    pub exhausted: bool,
}

fn game_rng(base_seed: u64, game_id: usize) -> SmallRng {
    if base_seed != 0 {
        SmallRng::seed_from_u64(base_seed.wrapping_add(game_id as u64))
    } else {
        SmallRng::from_entropy()
    }
}

fn is_exhausted(e: &MoveError) -> bool {
    matches!(e, MoveError::Guard(GuardError::NoSolvablePlacementFound { .. }))
}

/// Plays a single game and returns its summary.
pub fn play_game(
    config: &AutoplayConfig,
    game_id: usize,
    rng: &mut SmallRng,
) -> Result<GameSummary, AutoplayError> {
    // Seed 0 would mean entropy, which would make the game unrepeatable.
    let seed = rng.gen::<u64>().max(1);
    let mut game = config.game.clone();
    game.seed = seed;
    game.animate = false;

    let mut summary = GameSummary {
        game_id,
        seed,
        moves: 0,
        cells_cleared: 0,
        reshuffles: 0,
        largest_region: 0,
        exhausted: false,
    };
    let fail = |source| AutoplayError::Move { game_id, source };

    let mut controller = BoardController::new(game)?;
    match controller.start(&mut NullAgent) {
        Ok(n) => summary.reshuffles += n,
        Err(e) if is_exhausted(&e) => {
            summary.exhausted = true;
            return Ok(summary);
        }
        Err(e) => return Err(fail(e)),
    }

    let min_size = controller.config().min_region_size;
    for _ in 0..config.moves_per_game {
        let partition = controller.partition();
        let playable: Vec<_> = partition
            .regions()
            .iter()
            .filter(|r| r.len() >= min_size)
            .collect();
        if playable.is_empty() {
            break;
        }
        let region = playable[rng.gen_range(0..playable.len())];
        let cells: Vec<_> = region.iter().collect();
        let target = cells[rng.gen_range(0..cells.len())];

        match controller.click(target, &mut NullAgent) {
            Ok(MoveOutcome::Cleared(report)) => {
                summary.moves += 1;
                summary.cells_cleared += report.removed;
                summary.reshuffles += report.reshuffles;
                summary.largest_region = summary.largest_region.max(report.removed);
            }
            Ok(MoveOutcome::NoOp) => break,
            Err(e) if is_exhausted(&e) => {
                summary.exhausted = true;
                break;
            }
            Err(e) => return Err(fail(e)),
        }
    }

    Ok(summary)
}

/// Runs every game and collects the summaries.
///
/// When `config.threads > 1`, games are played concurrently using rayon and
/// summaries arrive in completion order.
pub fn run_autoplay(config: &AutoplayConfig) -> Result<Vec<GameSummary>, AutoplayError> {
    let mut games = Vec::with_capacity(config.games);
    run_autoplay_with_callback(config, |game| games.push(game))?;
    Ok(games)
}

/// Runs every game, calling `on_game` with each completed summary.
pub fn run_autoplay_with_callback<F>(
    config: &AutoplayConfig,
    on_game: F,
) -> Result<(), AutoplayError>
where
    F: FnMut(GameSummary),
{
    config.game.validate()?;
    if config.threads > 1 {
        run_parallel(config, on_game)
    } else {
        run_sequential(config, on_game)
    }
}

fn log_progress(config: &AutoplayConfig, n: usize, game: &GameSummary, start: Instant) {
    if config.quiet {
        return;
    }
    info!(
        "game {}/{}: {} moves, {} cleared, {} reshuffles{} ({:.2}s)",
        n,
        config.games,
        game.moves,
        game.cells_cleared,
        game.reshuffles,
        if game.exhausted { ", exhausted" } else { "" },
        start.elapsed().as_secs_f64(),
    );
}

fn run_sequential<F>(config: &AutoplayConfig, mut on_game: F) -> Result<(), AutoplayError>
where
    F: FnMut(GameSummary),
{
    for i in 0..config.games {
        let start = Instant::now();
        let mut rng = game_rng(config.seed, i);
        let game = play_game(config, i, &mut rng)?;
        log_progress(config, i + 1, &game, start);
        on_game(game);
    }
    Ok(())
}

/// Plays games on a rayon pool and hands summaries to the callback on the
/// calling thread.
fn run_parallel<F>(config: &AutoplayConfig, mut on_game: F) -> Result<(), AutoplayError>
where
    F: FnMut(GameSummary),
{
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<Result<GameSummary, AutoplayError>>();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            pool.install(|| {
                (0..config.games).into_par_iter().for_each_with(tx, |tx, i| {
                    let start = Instant::now();
                    let mut rng = game_rng(config.seed, i);
                    let result = play_game(config, i, &mut rng);
                    if let Ok(game) = &result {
                        let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        log_progress(config, n, game, start);
                    }
                    let _ = tx.send(result);
                });
            });
        });

        // The loop ends once every game has reported, so the first error
        // is returned only after all games finish. Later summaries are dropped.
        let mut first_error = None;
        for result in rx {
            match result {
                Ok(game) if first_error.is_none() => on_game(game),
                Ok(_) => {}
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    })
}

/// Writes summaries as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameSummary], out: &mut W) -> Result<(), AutoplayError> {
    for game in games {
        write_game_json(game, out)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes a single summary as one JSON line.
pub fn write_game_json<W: Write>(game: &GameSummary, out: &mut W) -> Result<(), AutoplayError> {
    serde_json::to_writer(&mut *out, game).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

/// Writes aggregate statistics for a run.
pub fn write_summary<W: Write>(games: &[GameSummary], out: &mut W) -> std::io::Result<()> {
    let total = games.len().max(1) as f64;
    let moves: usize = games.iter().map(|g| g.moves).sum();
    let cleared: usize = games.iter().map(|g| g.cells_cleared).sum();
    let reshuffles: u64 = games.iter().map(|g| u64::from(g.reshuffles)).sum();
    let exhausted = games.iter().filter(|g| g.exhausted).count();
    let largest = games.iter().map(|g| g.largest_region).max().unwrap_or(0);

    writeln!(out, "=== Autoplay Summary ===")?;
    writeln!(out, "Games: {}", games.len())?;
    writeln!(out, "Avg moves/game: {:.1}", moves as f64 / total)?;
    writeln!(out, "Avg cells cleared/game: {:.1}", cleared as f64 / total)?;
    writeln!(out, "Reshuffles: {}", reshuffles)?;
    writeln!(out, "Largest region: {}", largest)?;
    writeln!(out, "Exhausted games: {}", exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(games: usize, threads: usize) -> AutoplayConfig {
        AutoplayConfig {
            games,
            moves_per_game: 25,
            game: GameConfig {
                width: 5,
                height: 5,
                color_variants: 4,
                ..GameConfig::default()
            },
            threads,
            seed: 42,
            quiet: true,
        }
    }

    #[test]
    fn play_single_game_completes() {
        let config = small_config(1, 1);
        let mut rng = SmallRng::seed_from_u64(42);
        let game = play_game(&config, 0, &mut rng).unwrap();
        assert!(game.moves <= 25);
        assert!(game.cells_cleared >= 2 * game.moves);
        assert!(game.largest_region <= 25);
        assert_ne!(game.seed, 0);
    }

    #[test]
    fn same_seed_replays_the_same_game() {
        let config = small_config(1, 1);
        let a = play_game(&config, 0, &mut game_rng(9, 0)).unwrap();
        let b = play_game(&config, 0, &mut game_rng(9, 0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sequential_run_produces_correct_count() {
        let games = run_autoplay(&small_config(3, 1)).unwrap();
        assert_eq!(games.len(), 3);
        let ids: Vec<usize> = games.iter().map(|g| g.game_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let mut parallel = run_autoplay(&small_config(4, 2)).unwrap();
        parallel.sort_by_key(|g| g.game_id);
        let sequential = run_autoplay(&small_config(4, 1)).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn invalid_game_config_is_rejected() {
        let mut config = small_config(1, 1);
        config.game.width = 1;
        assert!(matches!(run_autoplay(&config), Err(AutoplayError::Config(_))));
    }

    #[test]
    fn jsonl_output_is_valid() {
        let games = run_autoplay(&small_config(2, 1)).unwrap();
        let mut buf = Vec::new();
        write_jsonl(&games, &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let parsed: Vec<GameSummary> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(parsed, games);
    }

    #[test]
    fn summary_reports_totals() {
        let games = vec![
            GameSummary {
                game_id: 0,
                seed: 1,
                moves: 4,
                cells_cleared: 10,
                reshuffles: 1,
                largest_region: 4,
                exhausted: false,
            },
            GameSummary {
                game_id: 1,
                seed: 2,
                moves: 2,
                cells_cleared: 6,
                reshuffles: 0,
                largest_region: 3,
                exhausted: true,
            },
        ];
        let mut buf = Vec::new();
        write_summary(&games, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Avg moves/game: 3.0"));
        assert!(text.contains("Largest region: 4"));
        assert!(text.contains("Exhausted games: 1"));
    }
}
