use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use anyhow::Context as _;

use crate::{
    document::color::Color,
    foundation::{
        core::{Canvas, normalize_rel_path},
        error::{StampError, StampResult},
    },
};

/// A layered document: a canvas plus layers painted bottom-to-top in array order.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Document {
    pub canvas: Canvas,
    /// Fill behind every layer; opaque white when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    pub layers: Vec<Layer>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f64, // 0..1 clamped at render time
    #[serde(flatten)]
    pub content: LayerContent,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerContent {
    Text(TextLayer),
    Solid(SolidLayer),
    Image(ImageLayer),
    Group(GroupLayer),
}

/// Discriminant of [`LayerContent`], cheap to copy around in listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Text,
    Solid,
    Image,
    Group,
}

impl LayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Solid => "solid",
            Self::Image => "image",
            Self::Group => "group",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TextLayer {
    pub text: String,
    /// Font file, relative to the document directory.
    pub font_source: String,
    pub size_px: f64,
    #[serde(default = "Color::white")]
    pub color: Color,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width_px: Option<f64>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SolidLayer {
    pub color: Color,
    /// Filled area; the whole canvas when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<RectPx>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RectPx {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ImageLayer {
    /// Raster file, relative to the document directory.
    pub source: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GroupLayer {
    pub layers: Vec<Layer>,
}

fn default_visible() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        match &self.content {
            LayerContent::Text(_) => LayerKind::Text,
            LayerContent::Solid(_) => LayerKind::Solid,
            LayerContent::Image(_) => LayerKind::Image,
            LayerContent::Group(_) => LayerKind::Group,
        }
    }

    pub fn as_text(&self) -> Option<&TextLayer> {
        match &self.content {
            LayerContent::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextLayer> {
        match &mut self.content {
            LayerContent::Text(t) => Some(t),
            _ => None,
        }
    }

    fn validate(&self) -> StampResult<()> {
        if !self.opacity.is_finite() {
            return Err(StampError::validation(format!(
                "layer '{}' opacity must be finite",
                self.name
            )));
        }
        match &self.content {
            LayerContent::Text(t) => {
                if !t.size_px.is_finite() || t.size_px <= 0.0 {
                    return Err(StampError::validation(format!(
                        "text layer '{}' size_px must be finite and > 0",
                        self.name
                    )));
                }
                if let Some(w) = t.max_width_px
                    && (!w.is_finite() || w <= 0.0)
                {
                    return Err(StampError::validation(format!(
                        "text layer '{}' max_width_px must be finite and > 0",
                        self.name
                    )));
                }
                normalize_rel_path(&t.font_source)?;
            }
            LayerContent::Solid(s) => {
                if let Some(r) = s.rect
                    && (r.width < 0.0 || r.height < 0.0)
                {
                    return Err(StampError::validation(format!(
                        "solid layer '{}' rect must have non-negative size",
                        self.name
                    )));
                }
            }
            LayerContent::Image(i) => {
                normalize_rel_path(&i.source)?;
            }
            LayerContent::Group(g) => {
                for child in &g.layers {
                    child.validate()?;
                }
            }
        }
        Ok(())
    }
}

impl Document {
    pub fn validate(&self) -> StampResult<()> {
        self.canvas.validate()?;
        for layer in &self.layers {
            layer.validate()?;
        }
        Ok(())
    }

    /// Read and validate a document JSON file.
    pub fn from_path(path: &Path) -> StampResult<Self> {
        let f = File::open(path).with_context(|| format!("open document '{}'", path.display()))?;
        let doc: Document = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| StampError::serde(format!("parse '{}': {e}", path.display())))?;
        doc.validate()?;
        Ok(doc)
    }

    /// Write the document back as pretty JSON.
    pub fn save_json(&self, path: &Path) -> StampResult<()> {
        let f =
            File::create(path).with_context(|| format!("create document '{}'", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(f), self)
            .map_err(|e| StampError::serde(format!("write '{}': {e}", path.display())))?;
        Ok(())
    }
}
