//! Command parser.
//!
//! Parses incoming protocol lines from raw text into structured `Command`
//! variants that the main loop can dispatch on. Clicks arrive already
//! translated to grid coordinates by the input side.

use log::warn;

/// Board dimensions and palette size for `newgame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSize {
    pub width: usize,
    pub height: usize,
    pub colors: usize,
}

/// A parsed client-to-engine command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Deal a new board, optionally overriding its size.
    NewGame(Option<BoardSize>),

    /// Install a board from notation, verbatim.
    Position { board: String },

    /// Click the cell at grid coordinate (x, y).
    Click { x: usize, y: usize },

    /// Print the current board in notation.
    Board,

    /// Print how many regions are playable.
    Moves,

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let first = *tokens.first()?;

    match first {
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "board" => Some(Command::Board),
        "moves" => Some(Command::Moves),

        "setoption" => parse_setoption(&tokens[1..]),
        "newgame" => parse_newgame(&tokens),
        "position" => parse_position(&tokens),
        "click" => parse_click(&tokens),

        other => {
            warn!("unknown command: {}", other);
            None
        }
    }
}

/// Splits `name <option...> [value <text...>]` into an option and its value.
fn parse_setoption(args: &[&str]) -> Option<Command> {
    let Some((&"name", rest)) = args.split_first() else {
        warn!("setoption needs 'name <option>'");
        return None;
    };
    let mut halves = rest.splitn(2, |&t| t == "value");
    let name = halves.next().unwrap_or_default().join(" ");
    if name.is_empty() {
        warn!("setoption without an option name");
        return None;
    }
    let value = halves.next().filter(|v| !v.is_empty()).map(|v| v.join(" "));
    Some(Command::SetOption { name, value })
}

/// Parses a run of unsigned integers, logging the first bad token.
fn parse_numbers(cmd: &str, tokens: &[&str]) -> Option<Vec<usize>> {
    let mut values = Vec::with_capacity(tokens.len());
    for t in tokens {
        match t.parse::<usize>() {
            Ok(v) => values.push(v),
            Err(_) => {
                warn!("invalid {} argument: '{}'", cmd, t);
                return None;
            }
        }
    }
    Some(values)
}

/// Parses `newgame [<width> <height> <colors>]`.
fn parse_newgame(tokens: &[&str]) -> Option<Command> {
    match tokens.len() {
        1 => Some(Command::NewGame(None)),
        4 => {
            let v = parse_numbers("newgame", &tokens[1..])?;
            Some(Command::NewGame(Some(BoardSize {
                width: v[0],
                height: v[1],
                colors: v[2],
            })))
        }
        _ => {
            warn!("malformed newgame: expected 'newgame [<width> <height> <colors>]'");
            None
        }
    }
}

/// Parses `position <board>`.
fn parse_position(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 2 {
        warn!("malformed position: expected 'position <board>'");
        return None;
    }
    Some(Command::Position {
        board: tokens[1].to_string(),
    })
}

/// Parses `click <x> <y>`.
fn parse_click(tokens: &[&str]) -> Option<Command> {
    if tokens.len() != 3 {
        warn!("malformed click: expected 'click <x> <y>'");
        return None;
    }
    let v = parse_numbers("click", &tokens[1..])?;
    Some(Command::Click { x: v[0], y: v[1] })
}
