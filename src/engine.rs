//! Engine state management.
//!
//! Holds the session configuration assembled from `setoption` commands and
//! the board controller of the game in progress, and writes the protocol
//! response for each command.

use std::io::{self, Write};

use log::{info, warn};

use crate::board::Coord;
use crate::config::{ConfigError, GameConfig};
use crate::controller::{BoardController, MoveError, MoveOutcome};
use crate::protocol::events::EventWriter;
use crate::protocol::notation::{encode_board, parse_board};
use crate::protocol::parser::BoardSize;
use crate::resolve::GuardError;

/// Failure to apply a `setoption` command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("unknown option '{0}'")]
    Unknown(String),

    #[error("option {name} needs a value")]
    MissingValue { name: String },

    #[error("invalid value '{value}' for option {name}")]
    InvalidValue { name: String, value: String },
}

fn parse_value<T: std::str::FromStr>(name: &str, value: Option<&str>) -> Result<T, OptionError> {
    let raw = value.ok_or_else(|| OptionError::MissingValue {
        name: name.to_string(),
    })?;
    raw.parse::<T>().map_err(|_| OptionError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
    })
}

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub config: GameConfig,
    session: Option<BoardController>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    /// Creates an engine with the default configuration and no game.
    pub fn new() -> Self {
        Engine::with_config(GameConfig::default())
    }

    /// Creates an engine whose games start from `config`.
    pub fn with_config(config: GameConfig) -> Self {
        Engine {
            config,
            session: None,
        }
    }

    /// The game in progress, if any.
    pub fn session(&self) -> Option<&BoardController> {
        self.session.as_ref()
    }

    /// Sets an engine option. Takes effect from the next game, except
    /// `Animate` which also applies to the game in progress.
    pub fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), OptionError> {
        match name {
            "Width" => self.config.width = parse_value(name, value)?,
            "Height" => self.config.height = parse_value(name, value)?,
            "Colors" => self.config.color_variants = parse_value(name, value)?,
            "MinRegion" => self.config.min_region_size = parse_value(name, value)?,
            "MaxReshuffles" => self.config.max_reshuffle_retries = parse_value(name, value)?,
            "Seed" => self.config.seed = parse_value(name, value)?,
            "SpawnMargin" => {
                self.config.spawn_margin = match value {
                    None | Some("auto") => None,
                    Some(_) => Some(parse_value(name, value)?),
                }
            }
            "Animate" => {
                // A bare `setoption name Animate` switches animation on.
                let animate = match value {
                    None => true,
                    Some(_) => parse_value(name, value)?,
                };
                self.config.animate = animate;
                if let Some(session) = self.session.as_mut() {
                    session.set_animate(animate);
                }
            }
            other => return Err(OptionError::Unknown(other.to_string())),
        }
        Ok(())
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Handles `newgame`: deals a fresh board, optionally resized.
    pub fn handle_newgame<W: Write>(
        &mut self,
        size: Option<BoardSize>,
        out: &mut W,
    ) -> io::Result<()> {
        self.session = None;
        let mut config = self.config.clone();
        if let Some(size) = size {
            config.width = size.width;
            config.height = size.height;
            config.color_variants = size.colors;
        }
        let mut controller = match BoardController::new(config) {
            Ok(c) => c,
            Err(e) => return self.write_config_error(e, out),
        };

        let mut events = EventWriter::new(out);
        let started = controller.start(&mut events);
        events.finish()?;
        match started {
            Ok(_) => {
                info!(
                    "new {}x{} game with {} colors",
                    controller.grid().width(),
                    controller.grid().height(),
                    controller.config().color_variants
                );
                self.session = Some(controller);
                writeln!(out, "ready")?;
            }
            Err(e) => self.write_move_error(e, out)?,
        }
        out.flush()
    }

    /// Handles `position`: installs a board exactly as given.
    ///
    /// Like `newgame`, the previous game ends even if the board is rejected.
    pub fn handle_position<W: Write>(&mut self, board: &str, out: &mut W) -> io::Result<()> {
        self.session = None;
        let grid = match parse_board(board) {
            Ok(g) => g,
            Err(e) => {
                warn!("position: {}", e);
                writeln!(out, "error {}", e)?;
                return out.flush();
            }
        };
        match BoardController::with_board(self.config.clone(), grid) {
            Ok(controller) => {
                self.session = Some(controller);
                writeln!(out, "ready")?;
                out.flush()
            }
            Err(e) => self.write_config_error(e, out),
        }
    }

    /// Handles `click`: runs one move on the game in progress.
    pub fn handle_click<W: Write>(&mut self, x: usize, y: usize, out: &mut W) -> io::Result<()> {
        let Some(controller) = self.session.as_mut() else {
            warn!("click: no game in progress");
            writeln!(out, "error no game in progress")?;
            return out.flush();
        };

        let mut events = EventWriter::new(out);
        let result = controller.click(Coord::new(x, y), &mut events);
        events.finish()?;
        match result {
            Ok(MoveOutcome::NoOp) => writeln!(out, "noop")?,
            Ok(MoveOutcome::Cleared(report)) => writeln!(out, "done {}", report.removed)?,
            Err(e) => self.write_move_error(e, out)?,
        }
        out.flush()
    }

    /// Handles `board`: prints the current board in notation.
    pub fn handle_board<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match &self.session {
            Some(controller) => writeln!(out, "board {}", encode_board(controller.grid()))?,
            None => writeln!(out, "error no game in progress")?,
        }
        out.flush()
    }

    /// Handles `moves`: prints how many regions are playable.
    pub fn handle_moves<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match &self.session {
            Some(controller) => writeln!(out, "moves {}", controller.playable_regions())?,
            None => writeln!(out, "error no game in progress")?,
        }
        out.flush()
    }

    fn write_config_error<W: Write>(&self, e: ConfigError, out: &mut W) -> io::Result<()> {
        warn!("invalid configuration: {}", e);
        writeln!(out, "error {}", e)?;
        out.flush()
    }

    /// Reports a failed move. An unsolvable board ends the game.
    fn write_move_error<W: Write>(&mut self, e: MoveError, out: &mut W) -> io::Result<()> {
        match e {
            MoveError::Guard(GuardError::NoSolvablePlacementFound { attempts }) => {
                warn!("no solvable placement after {} reshuffles; game over", attempts);
                self.session = None;
                writeln!(out, "gameover")
            }
            other => {
                warn!("move failed: {}", other);
                writeln!(out, "error {}", other)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output<F: FnOnce(&mut Engine, &mut Vec<u8>) -> io::Result<()>>(
        engine: &mut Engine,
        f: F,
    ) -> String {
        let mut buf = Vec::new();
        f(engine, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn seeded_engine() -> Engine {
        let mut engine = Engine::new();
        engine.set_option("Seed", Some("7")).unwrap();
        engine
    }

    #[test]
    fn new_engine_has_no_game() {
        let engine = Engine::new();
        assert!(engine.session().is_none());
        assert_eq!(engine.config, GameConfig::default());
    }

    #[test]
    fn handle_isready_outputs_readyok() {
        let mut engine = Engine::new();
        let out = output(&mut engine, |e, o| e.handle_isready(o));
        assert_eq!(out, "readyok\n");
    }

    #[test]
    fn set_option_updates_config() {
        let mut engine = Engine::new();
        engine.set_option("Width", Some("7")).unwrap();
        engine.set_option("Colors", Some("3")).unwrap();
        engine.set_option("SpawnMargin", Some("12.5")).unwrap();
        engine.set_option("Animate", Some("false")).unwrap();
        engine.set_option("MaxReshuffles", Some("20")).unwrap();
        assert_eq!(engine.config.width, 7);
        assert_eq!(engine.config.color_variants, 3);
        assert_eq!(engine.config.spawn_margin, Some(12.5));
        assert!(!engine.config.animate);
        assert_eq!(engine.config.max_reshuffle_retries, 20);
        engine.set_option("SpawnMargin", Some("auto")).unwrap();
        assert_eq!(engine.config.spawn_margin, None);
    }

    #[test]
    fn set_option_rejects_bad_input() {
        let mut engine = Engine::new();
        assert_eq!(
            engine.set_option("Speed", Some("1")),
            Err(OptionError::Unknown("Speed".to_string()))
        );
        assert!(matches!(
            engine.set_option("Width", None),
            Err(OptionError::MissingValue { .. })
        ));
        assert!(matches!(
            engine.set_option("Height", Some("tall")),
            Err(OptionError::InvalidValue { .. })
        ));
        assert_eq!(engine.config.height, 5);
    }

    #[test]
    fn newgame_deals_a_full_board() {
        let mut engine = seeded_engine();
        let size = BoardSize { width: 4, height: 3, colors: 3 };
        let out = output(&mut engine, |e, o| e.handle_newgame(Some(size), o));
        assert!(out.ends_with("ready\n"));
        let spawns = out.lines().filter(|l| l.starts_with("spawn ")).count();
        let tiers = out.lines().filter(|l| l.starts_with("tier ")).count();
        assert!(spawns >= 12);
        assert_eq!(tiers, 12);
        let session = engine.session().unwrap();
        assert_eq!(session.grid().occupied_count(), 12);
        assert_eq!(session.config().width, 4);
    }

    #[test]
    fn newgame_with_bad_size_reports_error() {
        let mut engine = Engine::new();
        let size = BoardSize { width: 11, height: 3, colors: 3 };
        let out = output(&mut engine, |e, o| e.handle_newgame(Some(size), o));
        assert!(out.starts_with("error width"));
        assert!(engine.session().is_none());
    }

    #[test]
    fn position_then_board_roundtrips() {
        let mut engine = Engine::new();
        let out = output(&mut engine, |e, o| e.handle_position("bgk/kbb/gg.", o));
        assert_eq!(out, "ready\n");
        let out = output(&mut engine, |e, o| e.handle_board(o));
        assert_eq!(out, "board bgk/kbb/gg.\n");
        let out = output(&mut engine, |e, o| e.handle_moves(o));
        assert_eq!(out, "moves 2\n");
    }

    #[test]
    fn position_with_bad_notation_reports_error() {
        let mut engine = Engine::new();
        let out = output(&mut engine, |e, o| e.handle_position("bg/b", o));
        assert!(out.starts_with("error "));
        assert!(engine.session().is_none());
    }

    #[test]
    fn rejected_position_ends_the_previous_game() {
        let mut engine = Engine::new();
        output(&mut engine, |e, o| e.handle_position("bb/gg", o));
        assert!(engine.session().is_some());
        let out = output(&mut engine, |e, o| e.handle_position("bq/bb", o));
        assert!(out.starts_with("error "));
        assert!(engine.session().is_none());

        output(&mut engine, |e, o| e.handle_position("bb/gg", o));
        let out = output(&mut engine, |e, o| e.handle_position("bbbbbbbbbbb/ggggggggggg", o));
        assert!(out.starts_with("error width"));
        assert!(engine.session().is_none());
    }

    #[test]
    fn reshuffle_line_precedes_tiers() {
        let size = BoardSize { width: 2, height: 2, colors: 2 };
        let mut seen = false;
        for seed in 1..200 {
            let mut engine = Engine::new();
            engine.set_option("Seed", Some(seed.to_string().as_str())).unwrap();
            let out = output(&mut engine, |e, o| e.handle_newgame(Some(size), o));
            let lines: Vec<&str> = out.lines().collect();
            let Some(marker) = lines.iter().position(|l| l.starts_with("reshuffle ")) else {
                continue;
            };
            seen = true;
            assert!(lines[marker - 1].starts_with("spawn "), "seed {}", seed);
            let rest = &lines[marker + 1..];
            assert_eq!(rest.last(), Some(&"ready"), "seed {}", seed);
            assert!(rest[..rest.len() - 1].iter().all(|l| l.starts_with("tier ")));
        }
        assert!(seen);
    }

    #[test]
    fn click_reports_removed_count() {
        let mut engine = seeded_engine();
        output(&mut engine, |e, o| e.handle_position("bgkpy/gkpyb/bgrpk/kprgb/gbryp", o));
        let out = output(&mut engine, |e, o| e.handle_click(2, 1, o));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(&lines[..3], &["remove 2 0", "remove 2 1", "remove 2 2"]);
        assert!(lines.contains(&"move 2 3 2 0 purple anim"));
        assert!(lines.contains(&"move 2 4 2 1 pink anim"));
        assert_eq!(lines.last(), Some(&"done 3"));
    }

    #[test]
    fn alone_click_is_noop() {
        let mut engine = Engine::new();
        output(&mut engine, |e, o| e.handle_position("bg/gg", o));
        let out = output(&mut engine, |e, o| e.handle_click(0, 1, o));
        assert_eq!(out, "noop\n");
    }

    #[test]
    fn click_without_game_is_an_error() {
        let mut engine = Engine::new();
        let out = output(&mut engine, |e, o| e.handle_click(0, 0, o));
        assert_eq!(out, "error no game in progress\n");
    }

    #[test]
    fn out_of_bounds_click_is_an_error() {
        let mut engine = Engine::new();
        output(&mut engine, |e, o| e.handle_position("bb/gg", o));
        let out = output(&mut engine, |e, o| e.handle_click(2, 0, o));
        assert!(out.starts_with("error coordinate (2, 0)"));
        assert!(engine.session().is_some());
    }

    #[test]
    fn exhausted_guard_ends_the_game() {
        let mut engine = Engine::new();
        output(&mut engine, |e, o| e.handle_position("bg/gb", o));
        let err = MoveError::Guard(GuardError::NoSolvablePlacementFound { attempts: 3 });
        let out = output(&mut engine, |e, o| e.write_move_error(err, o));
        assert_eq!(out, "gameover\n");
        assert!(engine.session().is_none());
    }
}
