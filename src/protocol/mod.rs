//! Line protocol handling.
//!
//! Text notation for boards, the command parser for the main loop, and the
//! writer that turns presentation commands into protocol lines.

pub mod events;
pub mod notation;
pub mod parser;

pub use events::{format_event, EventWriter};
pub use notation::{encode_board, parse_board, NotationError, MAX_NOTATION_DIM};
pub use parser::{parse_command, BoardSize, Command};
