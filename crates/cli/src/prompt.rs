//! Interactive confirmation on the terminal.

use std::io::{self, BufRead, Write};

use tsirushka_client::{AutoConfirm, Confirm};

/// Asks `prompt [y/N]` on stderr and reads one line from stdin.
///
/// Anything other than `y`/`s` (sí) declines, including a read error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stderr = io::stderr().lock();
        if write!(stderr, "{prompt} [y/N] ").and_then(|()| stderr.flush()).is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí")
}

/// The confirmation to use: automatic with `--yes`, the terminal otherwise.
#[must_use]
pub fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(TerminalConfirm)
    }
}
