//! Terminal confirmation prompt.

use emporium_dashboard::Confirm;

/// Asks on the terminal with a `[y/N]` prompt. A failed or interrupted
/// prompt declines.
#[derive(Debug, Clone, Copy)]
pub struct StdinConfirm {
    assume_yes: bool,
}

impl StdinConfirm {
    pub const fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Confirmation prompt failed");
                false
            })
    }
}
