//! Colour key to glyph mapping
//!
//! Stored as a RON map of strings:
//!
//! ```ron
//! {
//!     "ff0000": "#",
//!     "default": "+",
//!     "glass": "",
//! }
//! ```
//!
//! Keys match case-insensitively. A one-character value draws that
//! character; an empty value is transparent.

use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use super::{read_text, ResourceError};
use crate::pipeline::Glyph;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Colormap {
    entries: HashMap<String, Glyph>,
}

impl Colormap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, glyph: Glyph) -> Self {
        self.insert(key, glyph);
        self
    }

    pub fn insert(&mut self, key: &str, glyph: Glyph) {
        self.entries.insert(key.to_lowercase(), glyph);
    }

    pub fn get(&self, key: &str) -> Option<Glyph> {
        self.entries.get(&key.to_lowercase()).copied()
    }

    /// Look up a key, failing with `NotFound` if it is missing.
    pub fn resolve(&self, key: &str) -> Result<Glyph, ResourceError> {
        self.get(key)
            .ok_or_else(|| ResourceError::not_found("colour key", key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a RON string map.
    pub fn from_ron_str(s: &str) -> Result<Self, ResourceError> {
        let raw: HashMap<String, String> = ron::from_str(s)?;
        let mut colormap = Colormap::new();
        for (key, value) in raw {
            let mut chars = value.chars();
            let glyph = match (chars.next(), chars.next()) {
                (None, _) => Glyph::Transparent,
                (Some(c), None) => Glyph::Solid(c),
                (Some(_), Some(_)) => {
                    return Err(ResourceError::InvalidGlyph {
                        key,
                        message: format!("'{}' is more than one character", value),
                    })
                }
            };
            colormap.insert(&key, glyph);
        }
        Ok(colormap)
    }
}

/// Load a colormap from a RON file
pub fn load_colormap(path: impl AsRef<Path>) -> Result<Colormap, ResourceError> {
    let path = path.as_ref();
    let colormap = Colormap::from_ron_str(&read_text(path)?)?;
    info!(path = %path.display(), entries = colormap.len(), "Loaded colormap");
    Ok(colormap)
}
