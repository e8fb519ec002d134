use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use crate::{
    foundation::error::StampResult,
    prompt::{PromptOutcome, SettingsPrompt},
    settings::{ExportFormat, FormChoices, SettingsForm},
};

/// Line-oriented settings form over a reader/writer pair (usually stdin/stderr).
///
/// Every field shows its default in brackets and an empty answer keeps it. End of input at any
/// point, or declining the final confirmation, cancels the form.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

enum Answer {
    Value(String),
    Default,
    Eof,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, label: &str, default: &str) -> StampResult<Answer> {
        write!(self.output, "{label} [{default}]: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(Answer::Eof);
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            Ok(Answer::Default)
        } else {
            Ok(Answer::Value(line.to_string()))
        }
    }

    fn ask_text(&mut self, label: &str, default: &str) -> StampResult<Option<String>> {
        Ok(match self.ask(label, default)? {
            Answer::Value(v) => Some(v),
            Answer::Default => Some(default.to_string()),
            Answer::Eof => None,
        })
    }

    fn ask_layer(&mut self, choices: &FormChoices) -> StampResult<Option<String>> {
        if choices.text_layers.is_empty() {
            writeln!(self.output, "Select layer: (document has no text layers)")?;
            return Ok(Some(choices.default_layer()));
        }

        writeln!(self.output, "Text layers:")?;
        for (i, name) in choices.text_layers.iter().enumerate() {
            writeln!(self.output, "  {}) {name}", i + 1)?;
        }
        let default = choices.default_layer();
        loop {
            match self.ask("Select layer", &default)? {
                Answer::Eof => return Ok(None),
                Answer::Default => return Ok(Some(default)),
                Answer::Value(v) => {
                    if let Some(name) = pick_layer(&choices.text_layers, &v) {
                        return Ok(Some(name));
                    }
                    writeln!(
                        self.output,
                        "  '{v}' is not one of the listed layers; enter its number or exact name."
                    )?;
                }
            }
        }
    }

    fn ask_format(&mut self, default: ExportFormat) -> StampResult<Option<ExportFormat>> {
        let labels = ExportFormat::ALL.map(ExportFormat::label).join("/");
        let label = format!("Image format ({labels})");
        loop {
            match self.ask(&label, default.label())? {
                Answer::Eof => return Ok(None),
                Answer::Default => return Ok(Some(default)),
                Answer::Value(v) => match ExportFormat::parse(&v) {
                    Some(f) => return Ok(Some(f)),
                    None => writeln!(self.output, "  choose one of {labels}")?,
                },
            }
        }
    }

    fn confirm(&mut self, form: &SettingsForm) -> StampResult<bool> {
        writeln!(self.output)?;
        writeln!(
            self.output,
            "Export '{}' = {}..{} to {}/{}<n>.{}",
            form.layer_name,
            form.start.trim(),
            form.end.trim(),
            form.export_path.display(),
            form.base_name,
            form.format.extension()
        )?;
        if form.export_path.is_relative()
            && let Ok(cwd) = std::env::current_dir()
        {
            writeln!(self.output, "  (relative to {})", cwd.display())?;
        }
        loop {
            match self.ask("Proceed? (y/n)", "y")? {
                Answer::Eof => return Ok(false),
                Answer::Default => return Ok(true),
                Answer::Value(v) => match v.trim().to_ascii_lowercase().as_str() {
                    "y" | "yes" => return Ok(true),
                    "n" | "no" => return Ok(false),
                    _ => {}
                },
            }
        }
    }
}

/// Typed export directory; a leading `~` stands for the home directory.
fn expand_export_path(answer: &str) -> PathBuf {
    let trimmed = answer.trim();
    let rest = match trimmed.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with(['/', '\\']) => rest,
        _ => return PathBuf::from(trimmed),
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
        None => PathBuf::from(trimmed),
    }
}

/// A menu answer: 1-based position, else an exact name.
fn pick_layer(layers: &[String], answer: &str) -> Option<String> {
    let trimmed = answer.trim();
    if let Ok(n) = trimmed.parse::<usize>()
        && let Some(name) = n.checked_sub(1).and_then(|i| layers.get(i))
    {
        return Some(name.clone());
    }
    layers
        .iter()
        .find(|name| name.as_str() == answer || name.as_str() == trimmed)
        .cloned()
}

impl<R: BufRead, W: Write> SettingsPrompt for TerminalPrompt<R, W> {
    fn collect(&mut self, choices: &FormChoices) -> StampResult<PromptOutcome> {
        let d = &choices.defaults;
        writeln!(self.output, "Batch Export Layers")?;

        let Some(start) = self.ask_text("Starting number", &d.start)? else {
            return Ok(PromptOutcome::Cancelled);
        };
        let Some(end) = self.ask_text("Ending number", &d.end)? else {
            return Ok(PromptOutcome::Cancelled);
        };
        let Some(layer_name) = self.ask_layer(choices)? else {
            return Ok(PromptOutcome::Cancelled);
        };
        let default_path = d.export_path.display().to_string();
        let Some(export_path) = self.ask_text("Export path (~ = home)", &default_path)? else {
            return Ok(PromptOutcome::Cancelled);
        };
        let Some(base_name) = self.ask_text("Naming convention", &d.base_name)? else {
            return Ok(PromptOutcome::Cancelled);
        };
        let Some(format) = self.ask_format(d.format)? else {
            return Ok(PromptOutcome::Cancelled);
        };

        let form = SettingsForm {
            start,
            end,
            layer_name,
            export_path: expand_export_path(&export_path),
            base_name,
            format,
        };
        if self.confirm(&form)? {
            Ok(PromptOutcome::Confirmed(form))
        } else {
            Ok(PromptOutcome::Cancelled)
        }
    }
}
