use std::path::{Path, PathBuf};

/// Output image encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Jpg,
    Png,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Jpg, ExportFormat::Png];

    /// Display label, as offered in the settings form.
    pub fn label(self) -> &'static str {
        match self {
            Self::Jpg => "JPG",
            Self::Png => "PNG",
        }
    }

    /// Lowercase file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }

    /// Case-insensitive parse of `jpg`/`jpeg`/`png`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// Unvalidated answers from the settings form. Bounds are kept as typed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsForm {
    pub start: String,
    pub end: String,
    pub layer_name: String,
    pub export_path: PathBuf,
    pub base_name: String,
    pub format: ExportFormat,
}

/// Validated settings for one run. Built once, never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSettings {
    pub start: i64,
    pub end: i64,
    pub layer_name: String,
    pub export_path: PathBuf,
    pub base_name: String,
    pub format: ExportFormat,
}

impl ExportSettings {
    /// Number of frames in `[start, end]`.
    pub fn frame_count(&self) -> u64 {
        if self.end < self.start {
            return 0;
        }
        self.end.abs_diff(self.start).saturating_add(1)
    }

    /// `<export_path>/<base_name><i>.<ext>`, joined textually like the path was typed.
    pub fn output_path(&self, i: i64) -> PathBuf {
        output_path(&self.export_path, &self.base_name, i, self.format)
    }
}

pub fn output_path(export_path: &Path, base_name: &str, i: i64, format: ExportFormat) -> PathBuf {
    PathBuf::from(format!(
        "{}/{}{}.{}",
        export_path.display(),
        base_name,
        i,
        format.extension()
    ))
}

/// Pre-filled values for the settings form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormDefaults {
    pub start: String,
    pub end: String,
    /// Preselected layer; `None` means the first offered choice.
    pub layer_name: Option<String>,
    pub export_path: PathBuf,
    pub base_name: String,
    pub format: ExportFormat,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            start: "1".to_string(),
            end: "10".to_string(),
            layer_name: None,
            export_path: default_export_dir(),
            base_name: "episode_".to_string(),
            format: ExportFormat::Jpg,
        }
    }
}

/// The user's desktop, or the working directory when the platform has none.
pub fn default_export_dir() -> PathBuf {
    dirs::desktop_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// What the form offers: the selectable text layers plus defaults.
#[derive(Clone, Debug)]
pub struct FormChoices {
    pub text_layers: Vec<String>,
    pub defaults: FormDefaults,
}

impl FormChoices {
    pub fn new(text_layers: Vec<String>, defaults: FormDefaults) -> Self {
        Self {
            text_layers,
            defaults,
        }
    }

    /// Layer preselected in the dropdown: the configured default, else the first text layer.
    ///
    /// An empty string when the document has no text layer; validation then reports it missing.
    pub fn default_layer(&self) -> String {
        self.defaults
            .layer_name
            .clone()
            .or_else(|| self.text_layers.first().cloned())
            .unwrap_or_default()
    }

    /// The form as submitted without touching any field.
    pub fn default_form(&self) -> SettingsForm {
        SettingsForm {
            start: self.defaults.start.clone(),
            end: self.defaults.end.clone(),
            layer_name: self.default_layer(),
            export_path: self.defaults.export_path.clone(),
            base_name: self.defaults.base_name.clone(),
            format: self.defaults.format,
        }
    }
}
