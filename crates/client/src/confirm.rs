//! The confirmation step before destructive actions.

/// Asks the user to confirm an action.
///
/// Returning `false` aborts the action before any request is made.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// A fixed answer, for `--yes` flags and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
