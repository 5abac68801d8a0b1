//! Sprite bitmaps
//!
//! Images are read through the `image` crate (PNM, including plain-text
//! `P3` PPM, and PNG). Each pixel's colour becomes an `rrggbb` key that is
//! resolved through a [`Colormap`]. Fully transparent pixels stay
//! transparent without a lookup.

use std::path::Path;

use tracing::info;

use super::{Colormap, ResourceError};
use crate::pipeline::{Glyph, SpriteBitmap};

/// Load an image and map its pixels to glyphs.
pub fn load_sprite(path: impl AsRef<Path>, colormap: &Colormap) -> Result<SpriteBitmap, ResourceError> {
    let path = path.as_ref();
    let img = image::open(path)?.to_rgba8();
    let (width, height) = (img.width() as usize, img.height() as usize);

    let mut glyphs = Vec::with_capacity(width * height);
    for pixel in img.pixels() {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            glyphs.push(Glyph::Transparent);
        } else {
            glyphs.push(colormap.resolve(&format!("{:02x}{:02x}{:02x}", r, g, b))?);
        }
    }

    info!(path = %path.display(), width, height, "Loaded sprite");
    Ok(SpriteBitmap::new(width, height, glyphs))
}

impl SpriteBitmap {
    /// Build a bitmap from text rows, top row first. Spaces are transparent
    /// and short rows are padded with transparency.
    pub fn from_glyph_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let mut glyphs = Vec::with_capacity(width * rows.len());
        for row in rows {
            let mut count = 0;
            for c in row.chars() {
                glyphs.push(if c == ' ' { Glyph::Transparent } else { Glyph::Solid(c) });
                count += 1;
            }
            glyphs.extend(std::iter::repeat(Glyph::Transparent).take(width - count));
        }
        SpriteBitmap::new(width, rows.len(), glyphs)
    }
}
