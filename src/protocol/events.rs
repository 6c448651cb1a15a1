//! Presentation events as protocol lines.
//!
//! `EventWriter` is a [`VisualAgent`] that prints one line per command:
//!
//! ```text
//! remove <x> <y>
//! move <x1> <y1> <x2> <y2> <color> anim|snap
//! spawn <x> <y> <color> <offset> anim|snap
//! tier <x> <y> <tier>
//! ```

use std::io::{self, Write};

use crate::controller::{VisualAgent, VisualCommand};

fn motion(animate: bool) -> &'static str {
    if animate {
        "anim"
    } else {
        "snap"
    }
}

/// Formats a single command as a protocol line, without the newline.
pub fn format_event(command: &VisualCommand) -> String {
    match *command {
        VisualCommand::Remove { at } => format!("remove {}", at),
        VisualCommand::Move {
            from,
            to,
            color,
            animate,
        } => format!("move {} {} {} {}", from, to, color.name(), motion(animate)),
        VisualCommand::Spawn {
            at,
            color,
            spawn_offset,
            animate,
        } => format!(
            "spawn {} {} {} {}",
            at,
            color.name(),
            spawn_offset,
            motion(animate)
        ),
        VisualCommand::Reshuffle { count } => format!("reshuffle {}", count),
        VisualCommand::Tier { at, tier } => format!("tier {} {}", at, tier),
    }
}

/// Writes commands to an output stream.
///
/// `VisualAgent::apply` cannot fail, so the first write error is kept and
/// reported by [`finish`](Self::finish); later commands are dropped.
pub struct EventWriter<'a, W: Write> {
    out: &'a mut W,
    error: Option<io::Error>,
}

impl<'a, W: Write> EventWriter<'a, W> {
    pub fn new(out: &'a mut W) -> Self {
        EventWriter { out, error: None }
    }

    /// Returns the first write error, if any.
    pub fn finish(self) -> io::Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<W: Write> VisualAgent for EventWriter<'_, W> {
    fn apply(&mut self, command: VisualCommand) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{}", format_event(&command)) {
            self.error = Some(e);
        }
    }
}
