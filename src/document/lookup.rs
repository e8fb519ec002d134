//! Layer lookup over the top level of a document.
//!
//! Only top-level layers participate: a layer nested inside a group is never found by name and
//! never offered as a choice, even if it is a text layer.

use crate::document::model::{Layer, LayerKind};

/// Index of the first top-level layer whose name equals `name` exactly (case-sensitive).
pub fn find_top_level(layers: &[Layer], name: &str) -> Option<usize> {
    layers.iter().position(|l| l.name == name)
}

/// Names of the top-level text layers, in document order.
pub fn text_layer_names(layers: &[Layer]) -> Vec<String> {
    layers
        .iter()
        .filter(|l| l.kind() == LayerKind::Text)
        .map(|l| l.name.clone())
        .collect()
}
