//! The document the run operates on.
//!
//! [`HostDocument`] is the seam between the run logic and whatever holds the artwork: the
//! validator and the export loop only list layers, rewrite text and ask for a save.
//! [`RasterDocument`] binds it to a JSON [`Document`](crate::document::model::Document) rendered
//! on the CPU.

use std::path::{Path, PathBuf};

use crate::{
    document::model::LayerKind, foundation::error::StampResult, settings::ExportFormat,
};

pub mod raster;
pub mod save;

pub use raster::RasterDocument;

/// Position of a top-level layer in its document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerId(pub usize);

/// Listing entry for one top-level layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerInfo {
    pub id: LayerId,
    pub name: String,
    pub kind: LayerKind,
    pub visible: bool,
}

/// Format-specific encoder parameters for [`HostDocument::save_as`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveOptions {
    /// Baseline JPEG; `quality` in `1..=100`.
    Jpeg { quality: u8 },
    /// Lossless PNG with the encoder's default settings.
    Png,
}

impl SaveOptions {
    pub const JPEG_MAX_QUALITY: u8 = 100;

    /// Options used by the export loop: maximum JPEG quality, default PNG.
    pub fn for_format(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Jpg => Self::Jpeg {
                quality: Self::JPEG_MAX_QUALITY,
            },
            ExportFormat::Png => Self::Png,
        }
    }

    pub fn format(self) -> ExportFormat {
        match self {
            Self::Jpeg { .. } => ExportFormat::Jpg,
            Self::Png => ExportFormat::Png,
        }
    }
}

pub trait HostDocument {
    /// Top-level layers in document order (bottom first).
    fn layers(&self) -> Vec<LayerInfo>;

    /// First top-level layer named exactly `name`; nested layers are never matched.
    fn find_layer(&self, name: &str) -> Option<LayerInfo> {
        self.layers().into_iter().find(|l| l.name == name)
    }

    /// Names of the top-level text layers, in order.
    fn text_layer_names(&self) -> Vec<String> {
        self.layers()
            .into_iter()
            .filter(|l| l.kind == LayerKind::Text)
            .map(|l| l.name)
            .collect()
    }

    /// Current contents of a text layer.
    fn text(&self, id: LayerId) -> StampResult<String>;

    /// Replace the contents of a text layer.
    fn set_text(&mut self, id: LayerId, text: &str) -> StampResult<()>;

    /// Flatten the current state and write it to `path`.
    ///
    /// Returns the path actually written; the extension is normalized to the lowercase
    /// extension of the chosen format.
    fn save_as(&mut self, path: &Path, opts: &SaveOptions) -> StampResult<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_format() {
        assert_eq!(
            SaveOptions::for_format(ExportFormat::Jpg),
            SaveOptions::Jpeg { quality: 100 }
        );
        assert_eq!(SaveOptions::for_format(ExportFormat::Png), SaveOptions::Png);
        assert_eq!(SaveOptions::Png.format(), ExportFormat::Png);
    }
}
