//! episode-stamp renders numbered variants of a layered document.
//!
//! A run collects settings through a [`SettingsPrompt`], checks them against a
//! [`HostDocument`], then rewrites one text layer with every number in `[start, end]` and saves
//! a JPG or PNG per number:
//!
//! - Load a [`Document`] into a [`RasterDocument`]
//! - Call [`run`] with a prompt and a [`Notifier`]
//! - Inspect the [`RunOutcome`]
#![forbid(unsafe_code)]

mod foundation;

pub mod document;
pub mod export;
pub mod host;
pub mod prompt;
pub mod render;
pub mod run;
pub mod settings;
pub mod validate;

pub use crate::document::color::Color;
pub use crate::document::model::{Document, Layer, LayerContent, LayerKind};
pub use crate::export::{ExportReport, export_range};
pub use crate::foundation::core::{Canvas, Rgba8Premul};
pub use crate::foundation::error::{StampError, StampResult};
pub use crate::host::{HostDocument, LayerId, LayerInfo, RasterDocument, SaveOptions};
pub use crate::prompt::{
    Notifier, PresetPrompt, PromptOutcome, SettingsPrompt, StderrNotifier, TerminalPrompt,
};
pub use crate::render::{CpuRenderer, FrameRGBA};
pub use crate::run::{RunOutcome, run};
pub use crate::settings::{ExportFormat, ExportSettings, FormChoices, FormDefaults, SettingsForm};
pub use crate::validate::{Rejection, ValidatedRun, validate};
