use crate::{
    export::{ExportReport, export_range},
    foundation::error::StampResult,
    host::HostDocument,
    prompt::{Notifier, PromptOutcome, SettingsPrompt},
    settings::{FormChoices, FormDefaults},
    validate::{Rejection, validate},
};

pub const CANCELLED_NOTICE: &str = "Operation canceled.";

/// How a run ended when nothing fatal happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The form was dismissed; nothing was written.
    Cancelled,
    /// The form was refused; nothing was written.
    Rejected(Rejection),
    Exported(ExportReport),
}

/// One complete run: collect settings, validate them against `doc`, export.
///
/// Cancellation and rejections are reported through `notifier` and returned as outcomes. Errors
/// are reserved for failures once exporting has started (or the prompt itself failing).
pub fn run(
    doc: &mut dyn HostDocument,
    prompt: &mut dyn SettingsPrompt,
    notifier: &mut dyn Notifier,
    defaults: FormDefaults,
) -> StampResult<RunOutcome> {
    let choices = FormChoices::new(doc.text_layer_names(), defaults);

    let form = match prompt.collect(&choices)? {
        PromptOutcome::Confirmed(form) => form,
        PromptOutcome::Cancelled => {
            tracing::debug!("settings form dismissed");
            notifier.notify(CANCELLED_NOTICE);
            return Ok(RunOutcome::Cancelled);
        }
    };

    let accepted = match validate(&form, doc) {
        Ok(accepted) => accepted,
        Err(rejection) => {
            tracing::warn!(?rejection, layer = %form.layer_name, "settings rejected");
            notifier.notify(&rejection.to_string());
            return Ok(RunOutcome::Rejected(rejection));
        }
    };

    let report = export_range(doc, &accepted.settings, accepted.layer)?;
    Ok(RunOutcome::Exported(report))
}
