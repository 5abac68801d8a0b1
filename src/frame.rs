//! Frame assembly
//!
//! Fragments are generated bottom row first (row 0 at NDC y = -1), which is
//! the reverse of how text is printed. [`assemble_frame`] flips the rows so
//! a [`Frame`] reads top to bottom.

use std::fmt;

use thiserror::Error;

use crate::geometry::Vec2;
use crate::pipeline::FragmentRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid resolution {width}x{height}")]
    InvalidResolution { width: usize, height: usize },
    #[error("expected {expected} glyphs, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Sample points for a `width` x `height` grid of cells, one per cell
/// centre, row-major from the bottom row.
pub fn generate_fragments(width: usize, height: usize) -> Vec<FragmentRecord> {
    let cell_w = 2.0 / width as f32;
    let cell_h = 2.0 / height as f32;
    let mut fragments = Vec::with_capacity(width * height);
    for row in 0..height {
        let y = -1.0 + (row as f32 + 0.5) * cell_h;
        for col in 0..width {
            let x = -1.0 + (col as f32 + 0.5) * cell_w;
            fragments.push(FragmentRecord {
                point: Vec2::new(x, y),
                overlay: None,
            });
        }
    }
    fragments
}

/// Copy of `fragments` with overlay glyphs attached by fragment index.
/// Missing overlay entries leave the fragment alone.
pub fn apply_overlay(fragments: &[FragmentRecord], overlay: &[Option<char>]) -> Vec<FragmentRecord> {
    fragments
        .iter()
        .enumerate()
        .map(|(i, fragment)| FragmentRecord {
            point: fragment.point,
            overlay: overlay.get(i).copied().flatten(),
        })
        .collect()
}

/// Overlay that writes `text` starting at printed cell (`col`, `row`), row 0
/// being the top line. Text running past the right edge is dropped.
pub fn text_overlay(width: usize, height: usize, col: usize, row: usize, text: &str) -> Vec<Option<char>> {
    let mut overlay = vec![None; width * height];
    if row >= height {
        return overlay;
    }
    let start = (height - 1 - row) * width;
    for (offset, c) in text.chars().enumerate() {
        let x = col + offset;
        if x >= width {
            break;
        }
        overlay[start + x] = Some(c);
    }
    overlay
}

/// A finished grid of glyphs in print order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    /// Row-major, top printed row first
    glyphs: Vec<char>,
}

impl Frame {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Glyph at printed position `(col, row)`, row 0 being the top line.
    pub fn get(&self, col: usize, row: usize) -> Option<char> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.glyphs.get(row * self.width + col).copied()
    }

    /// Printed rows, top first.
    pub fn rows(&self) -> impl Iterator<Item = &[char]> + '_ {
        self.glyphs.chunks(self.width.max(1))
    }

    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    /// Rows joined by `\n`, without a trailing newline.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity((self.width + 1) * self.height);
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.extend(row.iter());
        }
        text
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Reshape per-fragment glyphs into a printable frame.
///
/// Fragment `i` lands in grid row `i / width` (counted from the bottom) and
/// column `i % width`.
pub fn assemble_frame(glyphs: Vec<char>, width: usize, height: usize) -> Result<Frame, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::InvalidResolution { width, height });
    }
    let expected = width * height;
    if glyphs.len() != expected {
        return Err(FrameError::SizeMismatch {
            expected,
            actual: glyphs.len(),
        });
    }

    let printed = glyphs
        .chunks(width)
        .rev()
        .flat_map(|row| row.iter().copied())
        .collect();
    Ok(Frame {
        width,
        height,
        glyphs: printed,
    })
}
