use std::path::{Path, PathBuf};

use episode_stamp::{
    ExportFormat, FormDefaults, HostDocument, LayerId, LayerInfo, LayerKind, PresetPrompt,
    Rejection, RunOutcome, SaveOptions, SettingsForm, StampError, StampResult, export_range, run,
};

struct FakeLayer {
    name: String,
    kind: LayerKind,
    visible: bool,
    text: String,
}

/// Records every save as (path, text of every layer at that moment) instead of rendering.
#[derive(Default)]
struct MemoryDocument {
    layers: Vec<FakeLayer>,
    saves: Vec<(PathBuf, SaveOptions, Vec<String>)>,
    fail_on_save: Option<usize>,
}

impl MemoryDocument {
    fn with(mut self, name: &str, kind: LayerKind, visible: bool) -> Self {
        self.layers.push(FakeLayer {
            name: name.to_string(),
            kind,
            visible,
            text: String::new(),
        });
        self
    }

    fn poster() -> Self {
        Self::default()
            .with("Background", LayerKind::Solid, true)
            .with("Episode", LayerKind::Text, true)
            .with("Hidden", LayerKind::Text, false)
            .with("Logo", LayerKind::Image, true)
            .with("Extras", LayerKind::Group, true)
    }

    fn saved_paths(&self) -> Vec<PathBuf> {
        self.saves.iter().map(|(p, _, _)| p.clone()).collect()
    }
}

impl HostDocument for MemoryDocument {
    fn layers(&self) -> Vec<LayerInfo> {
        self.layers
            .iter()
            .enumerate()
            .map(|(i, l)| LayerInfo {
                id: LayerId(i),
                name: l.name.clone(),
                kind: l.kind,
                visible: l.visible,
            })
            .collect()
    }

    fn text(&self, id: LayerId) -> StampResult<String> {
        Ok(self.layers[id.0].text.clone())
    }

    fn set_text(&mut self, id: LayerId, text: &str) -> StampResult<()> {
        self.layers[id.0].text = text.to_string();
        Ok(())
    }

    fn save_as(&mut self, path: &Path, opts: &SaveOptions) -> StampResult<PathBuf> {
        if self.fail_on_save == Some(self.saves.len()) {
            return Err(StampError::save(path, std::io::Error::other("disk full")));
        }
        let texts = self.layers.iter().map(|l| l.text.clone()).collect();
        self.saves.push((path.to_path_buf(), *opts, texts));
        Ok(path.to_path_buf())
    }
}

fn form(start: &str, end: &str, layer: &str, format: ExportFormat) -> SettingsForm {
    SettingsForm {
        start: start.to_string(),
        end: end.to_string(),
        layer_name: layer.to_string(),
        export_path: PathBuf::from("/tmp/out"),
        base_name: "episode_".to_string(),
        format,
    }
}

fn run_form(doc: &mut MemoryDocument, f: SettingsForm) -> (RunOutcome, Vec<String>) {
    let mut notices: Vec<String> = Vec::new();
    let outcome = run(
        doc,
        &mut PresetPrompt::Form(f),
        &mut notices,
        FormDefaults::default(),
    )
    .unwrap();
    (outcome, notices)
}

#[test]
fn writes_one_png_per_number_and_keeps_the_last() {
    let mut doc = MemoryDocument::poster();
    let (outcome, notices) = run_form(&mut doc, form("1", "3", "Episode", ExportFormat::Png));

    let RunOutcome::Exported(report) = outcome else {
        panic!("expected export");
    };
    let expected = vec![
        PathBuf::from("/tmp/out/episode_1.png"),
        PathBuf::from("/tmp/out/episode_2.png"),
        PathBuf::from("/tmp/out/episode_3.png"),
    ];
    assert_eq!(report.written, expected);
    assert_eq!(doc.saved_paths(), expected);
    assert_eq!(doc.text(LayerId(1)).unwrap(), "3");
    assert!(notices.is_empty());

    // Each save sees the number it is named after.
    for (i, (_, opts, texts)) in doc.saves.iter().enumerate() {
        assert_eq!(texts[1], (i + 1).to_string());
        assert_eq!(*opts, SaveOptions::Png);
    }
}

#[test]
fn jpg_uses_maximum_quality() {
    let mut doc = MemoryDocument::poster();
    let (outcome, _) = run_form(&mut doc, form("7", "8", "Episode", ExportFormat::Jpg));
    assert!(matches!(outcome, RunOutcome::Exported(_)));
    assert_eq!(
        doc.saved_paths(),
        vec![
            PathBuf::from("/tmp/out/episode_7.jpg"),
            PathBuf::from("/tmp/out/episode_8.jpg"),
        ]
    );
    assert!(
        doc.saves
            .iter()
            .all(|(_, o, _)| *o == SaveOptions::Jpeg { quality: 100 })
    );
}

#[test]
fn frame_count_matches_inclusive_range() {
    let mut doc = MemoryDocument::poster();
    let (outcome, _) = run_form(&mut doc, form("-2", "10", "Episode", ExportFormat::Png));
    let RunOutcome::Exported(report) = outcome else {
        panic!("expected export");
    };
    assert_eq!(report.written.len(), 13);
    let mut unique = report.written.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 13);
    assert_eq!(report.written[0], PathBuf::from("/tmp/out/episode_-2.png"));
    assert_eq!(doc.text(LayerId(1)).unwrap(), "10");
}

#[test]
fn single_number_range_writes_one_file() {
    let mut doc = MemoryDocument::poster();
    let (outcome, _) = run_form(&mut doc, form("5", "5", "Episode", ExportFormat::Png));
    let RunOutcome::Exported(report) = outcome else {
        panic!("expected export");
    };
    assert_eq!(report.written, vec![PathBuf::from("/tmp/out/episode_5.png")]);
}

#[test]
fn start_after_end_is_rejected_without_writing() {
    let mut doc = MemoryDocument::poster();
    let (outcome, notices) = run_form(&mut doc, form("5", "2", "Episode", ExportFormat::Png));
    assert_eq!(outcome, RunOutcome::Rejected(Rejection::StartAfterEnd));
    assert!(doc.saves.is_empty());
    assert_eq!(doc.text(LayerId(1)).unwrap(), "");
    assert_eq!(
        notices,
        vec!["Please enter valid numbers, with the start number less than or equal to the end number."]
    );
}

#[test]
fn non_numeric_bounds_are_rejected_without_writing() {
    for (start, end) in [("abc", "3"), ("1", "ten"), ("", "3"), ("1.5", "3")] {
        let mut doc = MemoryDocument::poster();
        let (outcome, notices) = run_form(&mut doc, form(start, end, "Episode", ExportFormat::Jpg));
        assert_eq!(
            outcome,
            RunOutcome::Rejected(Rejection::InvalidNumber),
            "{start:?}..{end:?}"
        );
        assert!(doc.saves.is_empty());
        assert_eq!(notices.len(), 1);
    }
}

#[test]
fn number_check_runs_before_layer_check() {
    let mut doc = MemoryDocument::poster();
    let (outcome, _) = run_form(&mut doc, form("x", "3", "Missing", ExportFormat::Jpg));
    assert_eq!(outcome, RunOutcome::Rejected(Rejection::InvalidNumber));
}

#[test]
fn unknown_layer_is_rejected() {
    let mut doc = MemoryDocument::poster();
    let (outcome, notices) = run_form(&mut doc, form("1", "3", "episode", ExportFormat::Png));
    assert_eq!(outcome, RunOutcome::Rejected(Rejection::LayerNotFound));
    assert!(doc.saves.is_empty());
    assert_eq!(notices, vec!["Selected layer not found!"]);
}

#[test]
fn hidden_layer_is_rejected() {
    let mut doc = MemoryDocument::poster();
    let (outcome, notices) = run_form(&mut doc, form("1", "3", "Hidden", ExportFormat::Png));
    assert_eq!(outcome, RunOutcome::Rejected(Rejection::LayerHidden));
    assert!(doc.saves.is_empty());
    assert!(notices[0].contains("hidden"));
}

#[test]
fn non_text_layer_is_rejected() {
    let mut doc = MemoryDocument::poster();
    let (outcome, _) = run_form(&mut doc, form("1", "3", "Logo", ExportFormat::Png));
    assert_eq!(
        outcome,
        RunOutcome::Rejected(Rejection::NotTextLayer(LayerKind::Image))
    );
    assert!(doc.saves.is_empty());
}

#[test]
fn cancel_notifies_and_writes_nothing() {
    let mut doc = MemoryDocument::poster();
    let mut notices: Vec<String> = Vec::new();
    let outcome = run(
        &mut doc,
        &mut PresetPrompt::Cancel,
        &mut notices,
        FormDefaults::default(),
    )
    .unwrap();
    assert_eq!(outcome, RunOutcome::Cancelled);
    assert_eq!(notices, vec!["Operation canceled."]);
    assert!(doc.saves.is_empty());
}

#[test]
fn defaults_pick_the_first_text_layer() {
    let mut doc = MemoryDocument::poster();
    let mut notices: Vec<String> = Vec::new();
    let defaults = FormDefaults {
        start: "1".to_string(),
        end: "2".to_string(),
        export_path: PathBuf::from("/tmp/out"),
        ..FormDefaults::default()
    };
    let outcome = run(&mut doc, &mut PresetPrompt::Defaults, &mut notices, defaults).unwrap();
    let RunOutcome::Exported(report) = outcome else {
        panic!("expected export, notices: {notices:?}");
    };
    assert_eq!(report.settings.layer_name, "Episode");
    assert_eq!(
        report.written,
        vec![
            PathBuf::from("/tmp/out/episode_1.jpg"),
            PathBuf::from("/tmp/out/episode_2.jpg"),
        ]
    );
}

#[test]
fn save_failure_stops_the_loop() {
    let mut doc = MemoryDocument::poster();
    doc.fail_on_save = Some(2);
    let mut notices: Vec<String> = Vec::new();
    let err = run(
        &mut doc,
        &mut PresetPrompt::Form(form("1", "5", "Episode", ExportFormat::Png)),
        &mut notices,
        FormDefaults::default(),
    )
    .unwrap_err();

    assert!(matches!(err, StampError::Save { .. }), "{err}");
    assert_eq!(
        doc.saved_paths(),
        vec![
            PathBuf::from("/tmp/out/episode_1.png"),
            PathBuf::from("/tmp/out/episode_2.png"),
        ]
    );
    // The layer keeps the number whose save failed.
    assert_eq!(doc.text(LayerId(1)).unwrap(), "3");
}

#[test]
fn export_range_refuses_inverted_settings() {
    let mut doc = MemoryDocument::poster();
    let settings = episode_stamp::ExportSettings {
        start: 3,
        end: 1,
        layer_name: "Episode".to_string(),
        export_path: PathBuf::from("/tmp/out"),
        base_name: "episode_".to_string(),
        format: ExportFormat::Png,
    };
    assert!(export_range(&mut doc, &settings, LayerId(1)).is_err());
    assert!(doc.saves.is_empty());
}
