use std::path::PathBuf;

use crate::{
    foundation::error::{StampError, StampResult},
    host::{HostDocument, LayerId, SaveOptions},
    settings::ExportSettings,
};

/// What a completed export wrote, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportReport {
    pub settings: ExportSettings,
    pub written: Vec<PathBuf>,
}

/// Write one image per number in `[start, end]`, then leave the layer showing `end`.
///
/// Fail-fast: the first failing save aborts the remaining numbers. Files already written stay on
/// disk and the layer keeps the number that failed.
#[tracing::instrument(
    skip(doc, settings, layer),
    fields(start = settings.start, end = settings.end, layer_name = %settings.layer_name)
)]
pub fn export_range(
    doc: &mut dyn HostDocument,
    settings: &ExportSettings,
    layer: LayerId,
) -> StampResult<ExportReport> {
    if settings.start > settings.end {
        return Err(StampError::validation(format!(
            "start ({}) must be <= end ({})",
            settings.start, settings.end
        )));
    }

    let opts = SaveOptions::for_format(settings.format);
    let mut written = Vec::with_capacity(settings.frame_count().min(1024) as usize);
    for i in settings.start..=settings.end {
        doc.set_text(layer, &i.to_string())?;
        let target = settings.output_path(i);
        let path = doc.save_as(&target, &opts)?;
        tracing::info!(number = i, path = %path.display(), "exported");
        written.push(path);
    }

    doc.set_text(layer, &settings.end.to_string())?;
    tracing::info!(
        frames = written.len(),
        format = %settings.format,
        dir = %settings.export_path.display(),
        "export finished"
    );

    Ok(ExportReport {
        settings: settings.clone(),
        written,
    })
}
