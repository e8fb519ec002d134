use std::path::PathBuf;

pub type StampResult<T> = Result<T, StampError>;

/// Fatal errors: anything that stops a run after settings were accepted, or before a document
/// could be loaded at all. User-facing rejections live in [`crate::validate::Rejection`].
#[derive(thiserror::Error, Debug)]
pub enum StampError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("document error: {0}")]
    Document(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("save error: failed to write '{}': {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StampError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn document(msg: impl Into<String>) -> Self {
        Self::Document(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn save(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        Self::Save {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            StampError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            StampError::document("x")
                .to_string()
                .contains("document error:")
        );
        assert!(StampError::render("x").to_string().contains("render error:"));
        assert!(
            StampError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn save_names_the_target_path() {
        let err = StampError::save("/tmp/out/episode_3.png", std::io::Error::other("disk full"));
        let msg = err.to_string();
        assert!(msg.contains("/tmp/out/episode_3.png"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = StampError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
