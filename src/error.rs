//! Fatal, crate-local error type. Small and stable enough that a
//! hand-written `Display` impl is simpler than pulling in a derive-macro
//! crate for three variants.

use std::fmt;

#[derive(Debug)]
pub enum RenderError {
    SceneIo(std::io::Error),
    SceneParse(String),
    ImageIo(std::io::Error),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::SceneIo(e) => write!(f, "scene i/o error: {e}"),
            RenderError::SceneParse(msg) => write!(f, "scene parse error: {msg}"),
            RenderError::ImageIo(e) => write!(f, "image i/o error: {e}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::SceneIo(e) => Some(e),
            RenderError::SceneParse(_) => None,
            RenderError::ImageIo(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_variant_context() {
        let e = RenderError::SceneParse("unexpected token".to_string());
        assert!(e.to_string().contains("unexpected token"));
    }
}
