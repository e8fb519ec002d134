//! Settings collection and user notices.
//!
//! The run never talks to a terminal directly: it asks a [`SettingsPrompt`] for a form and
//! reports through a [`Notifier`].

use crate::{
    foundation::error::StampResult,
    settings::{FormChoices, SettingsForm},
};

pub mod preset;
pub mod terminal;

pub use preset::PresetPrompt;
pub use terminal::TerminalPrompt;

/// Result of showing the settings form. Cancelling is a normal outcome, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptOutcome {
    Confirmed(SettingsForm),
    Cancelled,
}

pub trait SettingsPrompt {
    /// Show the form pre-filled from `choices` and block until it is confirmed or dismissed.
    fn collect(&mut self, choices: &FormChoices) -> StampResult<PromptOutcome>;
}

/// Blocking notice to the user (the run's replacement for an alert box).
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Prints notices to stderr.
#[derive(Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Collects notices in memory, for embedders that show them in their own UI after the run.
///
/// ```
/// use episode_stamp::{Notifier, run::CANCELLED_NOTICE};
///
/// let mut notices: Vec<String> = Vec::new();
/// notices.notify(CANCELLED_NOTICE);
/// assert_eq!(notices, ["Operation canceled."]);
/// ```
impl Notifier for Vec<String> {
    fn notify(&mut self, message: &str) {
        self.push(message.to_string());
    }
}
