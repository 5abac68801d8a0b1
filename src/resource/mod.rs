//! Resource loading
//!
//! Meshes (OBJ + MTL), colormaps (RON) and sprite bitmaps (PNM/PNG). Every
//! lookup is resolved here so the pipeline only ever sees concrete glyphs
//! and vertex data.

pub mod colormap;
pub mod obj;
pub mod sprite;

use std::path::PathBuf;

use thiserror::Error;

pub use colormap::{load_colormap, Colormap};
pub use obj::{load_model, Model, ObjImporter};
pub use sprite::load_sprite;

/// Error type for resource loading
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("colormap parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("unknown {kind} '{name}'")]
    NotFound { kind: &'static str, name: String },
    #[error("invalid colormap entry '{key}': {message}")]
    InvalidGlyph { key: String, message: String },
    #[error("{0} contains no faces")]
    EmptyMesh(String),
}

impl ResourceError {
    pub(crate) fn parse(line_index: usize, message: impl Into<String>) -> Self {
        ResourceError::Parse {
            line: line_index + 1,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        ResourceError::NotFound {
            kind,
            name: name.into(),
        }
    }
}

/// Read a whole text file, keeping the path in the error.
pub(crate) fn read_text(path: &std::path::Path) -> Result<String, ResourceError> {
    std::fs::read_to_string(path).map_err(|source| ResourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}
