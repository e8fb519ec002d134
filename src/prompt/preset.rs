use crate::{
    foundation::error::StampResult,
    prompt::{PromptOutcome, SettingsPrompt},
    settings::{FormChoices, SettingsForm},
};

/// Non-interactive prompt: answers immediately without asking anyone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PresetPrompt {
    /// Submit the form exactly as pre-filled.
    Defaults,
    /// Submit this form, ignoring the offered defaults.
    Form(SettingsForm),
    /// Dismiss the form.
    Cancel,
}

impl SettingsPrompt for PresetPrompt {
    fn collect(&mut self, choices: &FormChoices) -> StampResult<PromptOutcome> {
        Ok(match self {
            Self::Defaults => PromptOutcome::Confirmed(choices.default_form()),
            Self::Form(form) => PromptOutcome::Confirmed(form.clone()),
            Self::Cancel => PromptOutcome::Cancelled,
        })
    }
}
