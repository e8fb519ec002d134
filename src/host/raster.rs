use std::path::{Path, PathBuf};

use crate::{
    document::{lookup, model::Document},
    foundation::error::{StampError, StampResult},
    host::{HostDocument, LayerId, LayerInfo, SaveOptions, save},
    render::CpuRenderer,
};

/// A JSON document bound to the CPU renderer: the concrete [`HostDocument`].
pub struct RasterDocument {
    doc: Document,
    renderer: CpuRenderer,
}

impl RasterDocument {
    /// Wrap an in-memory document; asset paths resolve against `assets_root`.
    pub fn new(doc: Document, assets_root: impl Into<PathBuf>) -> StampResult<Self> {
        doc.validate()?;
        Ok(Self {
            doc,
            renderer: CpuRenderer::new(assets_root),
        })
    }

    /// Load a document file; its directory becomes the asset root.
    pub fn open(path: &Path) -> StampResult<Self> {
        let doc = Document::from_path(path)?;
        let root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        tracing::debug!(
            document = %path.display(),
            assets_root = %root.display(),
            layers = doc.layers.len(),
            "opened document"
        );
        Self::new(doc, root)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Give back the (possibly edited) document.
    pub fn into_document(self) -> Document {
        self.doc
    }

    fn layer_index(&self, id: LayerId) -> StampResult<usize> {
        if id.0 < self.doc.layers.len() {
            Ok(id.0)
        } else {
            Err(StampError::document(format!("no top-level layer #{}", id.0)))
        }
    }
}

impl HostDocument for RasterDocument {
    fn layers(&self) -> Vec<LayerInfo> {
        self.doc
            .layers
            .iter()
            .enumerate()
            .map(|(i, l)| LayerInfo {
                id: LayerId(i),
                name: l.name.clone(),
                kind: l.kind(),
                visible: l.visible,
            })
            .collect()
    }

    fn find_layer(&self, name: &str) -> Option<LayerInfo> {
        let i = lookup::find_top_level(&self.doc.layers, name)?;
        let l = &self.doc.layers[i];
        Some(LayerInfo {
            id: LayerId(i),
            name: l.name.clone(),
            kind: l.kind(),
            visible: l.visible,
        })
    }

    fn text_layer_names(&self) -> Vec<String> {
        lookup::text_layer_names(&self.doc.layers)
    }

    fn text(&self, id: LayerId) -> StampResult<String> {
        let i = self.layer_index(id)?;
        let layer = &self.doc.layers[i];
        layer
            .as_text()
            .map(|t| t.text.clone())
            .ok_or_else(|| StampError::document(format!("layer '{}' is not text", layer.name)))
    }

    fn set_text(&mut self, id: LayerId, text: &str) -> StampResult<()> {
        let i = self.layer_index(id)?;
        let layer = &mut self.doc.layers[i];
        let name = layer.name.clone();
        let t = layer
            .as_text_mut()
            .ok_or_else(|| StampError::document(format!("layer '{name}' is not text")))?;
        t.text = text.to_string();
        Ok(())
    }

    fn save_as(&mut self, path: &Path, opts: &SaveOptions) -> StampResult<PathBuf> {
        let frame = self.renderer.render(&self.doc)?;
        save::write_frame(&frame, path, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::LayerKind;
    use serde_json::json;

    fn raster() -> RasterDocument {
        let doc: Document = serde_json::from_value(json!({
            "canvas": { "width": 16, "height": 16 },
            "layers": [
                { "name": "Fill", "kind": "solid", "color": "#336699" },
                { "name": "Episode", "kind": "text", "text": "1",
                  "font_source": "fonts/Display.ttf", "size_px": 10 },
                { "name": "Extras", "kind": "group", "layers": [
                    { "name": "Nested", "kind": "text", "text": "x",
                      "font_source": "fonts/Display.ttf", "size_px": 10 }
                ]}
            ]
        }))
        .unwrap();
        RasterDocument::new(doc, ".").unwrap()
    }

    #[test]
    fn lists_top_level_layers_only() {
        let r = raster();
        let layers = r.layers();
        assert_eq!(layers.len(), 3);
        assert_eq!(layers[1].name, "Episode");
        assert_eq!(layers[1].kind, LayerKind::Text);
        assert_eq!(layers[1].id, LayerId(1));
        assert_eq!(r.text_layer_names(), vec!["Episode"]);
        assert!(r.find_layer("Nested").is_none());
        assert_eq!(r.find_layer("Extras").unwrap().kind, LayerKind::Group);
    }

    #[test]
    fn set_text_updates_the_document() {
        let mut r = raster();
        r.set_text(LayerId(1), "42").unwrap();
        assert_eq!(r.text(LayerId(1)).unwrap(), "42");
        let doc = r.into_document();
        assert_eq!(doc.layers[1].as_text().unwrap().text, "42");
    }

    #[test]
    fn set_text_rejects_non_text_and_unknown_ids() {
        let mut r = raster();
        assert!(r.set_text(LayerId(0), "1").is_err());
        assert!(r.set_text(LayerId(9), "1").is_err());
        assert!(r.text(LayerId(2)).is_err());
    }
}
