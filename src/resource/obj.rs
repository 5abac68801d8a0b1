//! Wavefront OBJ import
//!
//! Supports `v`, `f` (any polygon size, fan-triangulated), `mtllib` and
//! `usemtl`. Texture and normal indices in faces are accepted and ignored.
//! Each face carries a colour key:
//! - the material's `Kd` colour as lowercase `rrggbb` hex
//! - the material name when it has no `Kd`
//! - `"default"` before any `usemtl`

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{read_text, ResourceError};
use crate::geometry::Vec3;

/// Colour key used by faces that come before any `usemtl`.
pub const DEFAULT_COLOR_KEY: &str = "default";

/// One triangle of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub indices: [usize; 3],
    pub color_key: String,
}

/// Triangle mesh with per-face colour keys
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Face>,
}

impl Model {
    pub fn new(vertices: Vec<Vec3>, faces: Vec<Face>) -> Self {
        Self { vertices, faces }
    }

    /// Distinct colour keys used by the faces, in first-use order.
    pub fn color_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for face in &self.faces {
            if !keys.contains(&face.color_key.as_str()) {
                keys.push(&face.color_key);
            }
        }
        keys
    }
}

/// Parse MTL text into `material name -> colour key`.
pub fn parse_mtl(contents: &str) -> Result<HashMap<String, String>, ResourceError> {
    let mut materials = HashMap::new();
    let mut current: Option<String> = None;

    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "newmtl" => {
                let name = parts
                    .get(1)
                    .ok_or_else(|| ResourceError::parse(line_num, "newmtl without a name"))?;
                materials.insert(name.to_string(), name.to_lowercase());
                current = Some(name.to_string());
            }
            "Kd" => {
                let name = current
                    .as_ref()
                    .ok_or_else(|| ResourceError::parse(line_num, "Kd before any newmtl"))?;
                if parts.len() < 4 {
                    return Err(ResourceError::parse(line_num, "Kd needs 3 components"));
                }
                let mut hex = String::with_capacity(6);
                for part in &parts[1..4] {
                    let component = parse_float(part, line_num)?;
                    let byte = (component.clamp(0.0, 1.0) * 255.0).round() as u8;
                    hex.push_str(&format!("{:02x}", byte));
                }
                materials.insert(name.clone(), hex);
            }
            _ => {}
        }
    }

    Ok(materials)
}

fn parse_float(s: &str, line_num: usize) -> Result<f32, ResourceError> {
    s.parse()
        .map_err(|_| ResourceError::parse(line_num, format!("invalid float value '{}'", s)))
}

/// Resolve a 1-based (or negative, relative) OBJ index against `count`
/// elements seen so far.
fn parse_index(s: &str, count: usize, line_num: usize) -> Result<usize, ResourceError> {
    let idx: i64 = s
        .parse()
        .map_err(|_| ResourceError::parse(line_num, format!("invalid index '{}'", s)))?;

    let result = if idx > 0 {
        idx - 1
    } else if idx < 0 {
        count as i64 + idx
    } else {
        return Err(ResourceError::parse(line_num, "index cannot be 0"));
    };

    if result < 0 || result as usize >= count {
        return Err(ResourceError::parse(
            line_num,
            format!("index {} out of range (have {} vertices)", idx, count),
        ));
    }
    Ok(result as usize)
}

/// OBJ file importer
#[derive(Debug, Default)]
pub struct ObjImporter {
    materials: HashMap<String, String>,
    base_dir: Option<PathBuf>,
    flip_handedness: bool,
}

impl ObjImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Negate Z and reverse face winding, for assets authored in the
    /// opposite handedness.
    pub fn flip_handedness(mut self, flip: bool) -> Self {
        self.flip_handedness = flip;
        self
    }

    /// Register materials from MTL text up front. Used when parsing from a
    /// string, where `mtllib` lines cannot be followed.
    pub fn with_materials(mut self, mtl: &str) -> Result<Self, ResourceError> {
        self.materials.extend(parse_mtl(mtl)?);
        Ok(self)
    }

    /// Load an OBJ file; `mtllib` paths are resolved next to it.
    pub fn load_from_file(mut self, path: &Path) -> Result<Model, ResourceError> {
        let contents = read_text(path)?;
        self.base_dir = Some(path.parent().map(Path::to_path_buf).unwrap_or_default());
        let model = self.parse(&path.display().to_string(), &contents)?;
        info!(
            path = %path.display(),
            vertices = model.vertices.len(),
            faces = model.faces.len(),
            "Loaded model"
        );
        Ok(model)
    }

    /// Parse OBJ file contents. `name` only appears in errors.
    pub fn parse(mut self, name: &str, contents: &str) -> Result<Model, ResourceError> {
        let mut vertices: Vec<Vec3> = Vec::new();
        let mut faces: Vec<Face> = Vec::new();
        let mut color_key = DEFAULT_COLOR_KEY.to_string();

        for (line_num, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();

            match parts[0] {
                "v" => {
                    if parts.len() < 4 {
                        return Err(ResourceError::parse(line_num, "vertex needs 3 values"));
                    }
                    let x = parse_float(parts[1], line_num)?;
                    let y = parse_float(parts[2], line_num)?;
                    let z = parse_float(parts[3], line_num)?;
                    let z = if self.flip_handedness { -z } else { z };
                    vertices.push(Vec3::new(x, y, z));
                }

                "f" => {
                    if parts.len() < 4 {
                        return Err(ResourceError::parse(line_num, "face needs at least 3 vertices"));
                    }
                    let mut corners = Vec::with_capacity(parts.len() - 1);
                    for corner in &parts[1..] {
                        let position = corner.split('/').next().unwrap_or("");
                        corners.push(parse_index(position, vertices.len(), line_num)?);
                    }
                    // Fan from the first corner keeps the file's winding
                    for i in 1..corners.len() - 1 {
                        let indices = if self.flip_handedness {
                            [corners[0], corners[i + 1], corners[i]]
                        } else {
                            [corners[0], corners[i], corners[i + 1]]
                        };
                        faces.push(Face {
                            indices,
                            color_key: color_key.clone(),
                        });
                    }
                }

                "mtllib" => {
                    let Some(base_dir) = &self.base_dir else {
                        continue;
                    };
                    for library in &parts[1..] {
                        let mtl_path = base_dir.join(library);
                        let mtl = read_text(&mtl_path)?;
                        self.materials.extend(parse_mtl(&mtl)?);
                    }
                }

                "usemtl" => {
                    let material = parts
                        .get(1)
                        .ok_or_else(|| ResourceError::parse(line_num, "usemtl without a name"))?;
                    color_key = self
                        .materials
                        .get(*material)
                        .cloned()
                        .ok_or_else(|| ResourceError::not_found("material", *material))?;
                }

                other => {
                    if !matches!(other, "vt" | "vn" | "o" | "g" | "s" | "l" | "p") {
                        warn!(line = line_num + 1, statement = other, "Ignoring unknown OBJ statement");
                    }
                }
            }
        }

        if faces.is_empty() {
            return Err(ResourceError::EmptyMesh(name.to_string()));
        }

        Ok(Model { vertices, faces })
    }
}

/// Load an OBJ model (and its material libraries) from disk.
pub fn load_model(path: impl AsRef<Path>, flip_handedness: bool) -> Result<Model, ResourceError> {
    ObjImporter::new()
        .flip_handedness(flip_handedness)
        .load_from_file(path.as_ref())
}
