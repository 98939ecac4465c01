use std::io;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use pixmorph_effect::PointerHost;
use tracing::warn;

/// Mouse capture on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPointer;

impl PointerHost for TerminalPointer {
    fn attach(&self) -> io::Result<()> {
        execute!(io::stdout(), EnableMouseCapture)
    }

    fn detach(&self) {
        if let Err(err) = execute!(io::stdout(), DisableMouseCapture) {
            warn!("failed to release mouse capture: {err}");
        }
    }
}
