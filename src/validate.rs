use crate::{
    document::model::LayerKind,
    host::{HostDocument, LayerId},
    settings::{ExportSettings, SettingsForm},
};

/// Why a submitted form was refused. Each variant's display text is the notice shown to the user.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error(
        "Please enter valid numbers, with the start number less than or equal to the end number."
    )]
    InvalidNumber,

    #[error(
        "Please enter valid numbers, with the start number less than or equal to the end number."
    )]
    StartAfterEnd,

    #[error("Selected layer not found!")]
    LayerNotFound,

    #[error("The selected layer is hidden. Please make it visible before running the script.")]
    LayerHidden,

    #[error("The selected layer is a {0} layer, not a text layer.")]
    NotTextLayer(LayerKind),
}

/// Accepted settings plus the layer they resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedRun {
    pub settings: ExportSettings,
    pub layer: LayerId,
}

/// Strict decimal integer: optional sign, digits, surrounding whitespace ignored.
pub fn parse_bound(s: &str) -> Option<i64> {
    s.trim().parse::<i64>().ok()
}

/// Check a submitted form against the document.
///
/// Rules apply in order and the first failure wins: bounds must parse, start must not exceed
/// end, the layer must exist among top-level layers, and it must be visible.
pub fn validate(form: &SettingsForm, doc: &dyn HostDocument) -> Result<ValidatedRun, Rejection> {
    let (Some(start), Some(end)) = (parse_bound(&form.start), parse_bound(&form.end)) else {
        return Err(Rejection::InvalidNumber);
    };
    if start > end {
        return Err(Rejection::StartAfterEnd);
    }

    let Some(layer) = doc.find_layer(&form.layer_name) else {
        return Err(Rejection::LayerNotFound);
    };
    if !layer.visible {
        return Err(Rejection::LayerHidden);
    }
    if layer.kind != LayerKind::Text {
        return Err(Rejection::NotTextLayer(layer.kind));
    }
    tracing::debug!(layer = %layer.name, id = layer.id.0, "resolved target layer");

    Ok(ValidatedRun {
        settings: ExportSettings {
            start,
            end,
            layer_name: form.layer_name.clone(),
            export_path: form.export_path.clone(),
            base_name: form.base_name.clone(),
            format: form.format,
        },
        layer: layer.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bound_is_strict() {
        assert_eq!(parse_bound("1"), Some(1));
        assert_eq!(parse_bound(" 42 "), Some(42));
        assert_eq!(parse_bound("-3"), Some(-3));
        assert_eq!(parse_bound("abc"), None);
        assert_eq!(parse_bound("12abc"), None);
        assert_eq!(parse_bound("1.5"), None);
        assert_eq!(parse_bound(""), None);
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(Rejection::LayerNotFound.to_string(), "Selected layer not found!");
        assert!(Rejection::LayerHidden.to_string().contains("hidden"));
        assert!(
            Rejection::NotTextLayer(LayerKind::Solid)
                .to_string()
                .contains("solid")
        );
        assert_eq!(
            Rejection::InvalidNumber.to_string(),
            Rejection::StartAfterEnd.to_string()
        );
    }
}
