//! Engine and scene configuration
//!
//! Both files are RON. `EngineConfig` covers the camera, pipeline settings
//! and worker count; `SceneFile` lists what to load and where to put it.
//! Every field has a default, so a config file only needs what it changes.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::geometry::Vec3;
use crate::pipeline::{PipelineSettings, WorkerError, Workers};
use crate::resource::{load_colormap, load_model, load_sprite, ResourceError};
use crate::scene::{Camera, InstanceHandle, Scene, SceneError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Workers(#[from] WorkerError),
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// =============================================================================
// Engine config
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Output size in cells (columns, rows)
    pub resolution: (usize, usize),
    /// Vertical field of view
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Width over height of one cell
    pub cell_aspect: f32,
    pub position: Vec3,
    /// (yaw, pitch) in degrees
    pub orientation: (f32, f32),
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            resolution: (80, 24),
            fov_degrees: 70.0,
            near: 0.1,
            far: 100.0,
            cell_aspect: 0.5,
            position: Vec3::ZERO,
            orientation: (0.0, 0.0),
        }
    }
}

impl CameraConfig {
    pub fn build(&self) -> Result<Camera, SceneError> {
        let (width, height) = self.resolution;
        let mut camera = Camera::with_projection(
            width,
            height,
            self.fov_degrees.to_radians(),
            self.near,
            self.far,
            self.cell_aspect,
        )?;
        camera.set_position(self.position);
        camera.set_orientation(self.orientation.0.to_radians(), self.orientation.1.to_radians());
        Ok(camera)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Worker threads; 0 runs everything on the calling thread
    pub threads: usize,
}

impl WorkerConfig {
    pub fn build(&self) -> Result<Workers, WorkerError> {
        Workers::from_threads(self.threads)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub camera: CameraConfig,
    /// Clip against the side planes as well as near and far
    pub culling: bool,
    pub fog_glyph: char,
    pub workers: WorkerConfig,
    pub max_fps: Option<f32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            culling: true,
            fog_glyph: ' ',
            workers: WorkerConfig::default(),
            max_fps: Some(30.0),
        }
    }
}

impl EngineConfig {
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            culling: self.culling,
            fog_glyph: self.fog_glyph,
        }
    }
}

fn validate_config(config: &EngineConfig) -> Result<(), ConfigError> {
    let (width, height) = config.camera.resolution;
    if width == 0 || height == 0 {
        return Err(ConfigError::Invalid(format!("resolution {}x{} is empty", width, height)));
    }
    if let Some(fps) = config.max_fps {
        if !(fps > 0.0) {
            return Err(ConfigError::Invalid(format!("max_fps {} must be positive", fps)));
        }
    }
    Ok(())
}

pub fn load_config_from_str(s: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = ron::from_str(s)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let config = load_config_from_str(&read_file(path)?)?;
    info!(path = %path.display(), "Loaded engine config");
    Ok(config)
}

pub fn save_config(config: &EngineConfig, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());
    let contents = ron::ser::to_string_pretty(config, pretty)?;
    let path = path.as_ref();
    fs::write(path, contents).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// =============================================================================
// Scene file
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub flip_handedness: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceEntry {
    pub model: String,
    #[serde(default = "zero")]
    pub position: Vec3,
    #[serde(default = "up")]
    pub axis: Vec3,
    /// Degrees about `axis`
    #[serde(default)]
    pub angle: f32,
    #[serde(default = "one")]
    pub scale: f32,
    /// Degrees per second about `axis`
    #[serde(default)]
    pub spin: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteEntry {
    pub sprite: PathBuf,
    pub position: Vec3,
    #[serde(default = "half")]
    pub half_height: f32,
}

fn zero() -> Vec3 {
    Vec3::ZERO
}

fn up() -> Vec3 {
    Vec3::Y
}

fn one() -> f32 {
    1.0
}

fn half() -> f32 {
    0.5
}

/// Paths are relative to the scene file's directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    pub colormap: PathBuf,
    #[serde(default)]
    pub models: Vec<ModelEntry>,
    #[serde(default)]
    pub instances: Vec<InstanceEntry>,
    #[serde(default)]
    pub sprites: Vec<SpriteEntry>,
}

/// An instance that turns every frame.
#[derive(Debug, Clone, Copy)]
pub struct Spinner {
    pub instance: InstanceHandle,
    pub axis: Vec3,
    pub angle: f32,
    /// Radians per second
    pub rate: f32,
}

impl Spinner {
    /// Advance by `delta` seconds and apply to the scene.
    pub fn advance(&mut self, scene: &mut Scene, delta: f32) -> Result<(), SceneError> {
        self.angle = (self.angle + self.rate * delta) % std::f32::consts::TAU;
        scene.instance_mut(self.instance)?.set_orientation(self.axis, self.angle);
        Ok(())
    }
}

pub struct LoadedScene {
    pub scene: Scene,
    pub spinners: Vec<Spinner>,
}

impl SceneFile {
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(s)?)
    }

    /// Load every resource and place every instance.
    pub fn build(&self, base_dir: &Path, camera: Camera) -> Result<LoadedScene, ConfigError> {
        let colormap = load_colormap(base_dir.join(&self.colormap))?;
        let mut scene = Scene::new(camera);

        for entry in &self.models {
            let model = load_model(base_dir.join(&entry.path), entry.flip_handedness)?;
            scene.add_model(&entry.name, model);
        }

        let mut spinners = Vec::new();
        for entry in &self.instances {
            let model = scene.model_handle(&entry.model)?;
            let handle = scene.create_instance(model)?;
            let angle = entry.angle.to_radians();
            scene
                .instance_mut(handle)?
                .set_position(entry.position)
                .set_orientation(entry.axis, angle)
                .set_scale(entry.scale);
            if entry.spin != 0.0 {
                spinners.push(Spinner {
                    instance: handle,
                    axis: entry.axis,
                    angle,
                    rate: entry.spin.to_radians(),
                });
            }
        }

        for entry in &self.sprites {
            let bitmap = load_sprite(base_dir.join(&entry.sprite), &colormap)?;
            let sprite = scene.add_sprite(bitmap);
            let handle = scene.create_sprite_instance(sprite)?;
            scene
                .sprite_instance_mut(handle)?
                .set_position(entry.position)
                .set_half_height(entry.half_height);
        }

        scene.set_colormap(colormap);
        info!(
            models = self.models.len(),
            instances = self.instances.len(),
            sprites = self.sprites.len(),
            "Built scene"
        );
        Ok(LoadedScene { scene, spinners })
    }
}

/// Read a scene file and build it against `camera`.
pub fn load_scene(path: impl AsRef<Path>, camera: Camera) -> Result<LoadedScene, ConfigError> {
    let path = path.as_ref();
    let file = SceneFile::from_ron_str(&read_file(path)?)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    file.build(base_dir, camera)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Inline;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = load_config_from_str("(culling: false, camera: (resolution: (40, 10)))").unwrap();
        assert!(!config.culling);
        assert_eq!(config.camera.resolution, (40, 10));
        assert_eq!(config.camera.fov_degrees, 70.0);
        assert_eq!(config.fog_glyph, ' ');
        assert_eq!(config.workers.threads, 0);
    }

    #[test]
    fn test_rejects_empty_resolution() {
        let err = load_config_from_str("(camera: (resolution: (0, 10)))").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("engine.ron");
        let mut config = EngineConfig::default();
        config.fog_glyph = '.';
        config.workers.threads = 2;
        config.camera.position = Vec3::new(0.0, 1.0, 5.0);
        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config("/nonexistent/engine.ron").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_camera_from_config() {
        let mut config = CameraConfig::default();
        config.orientation = (90.0, 0.0);
        let camera = config.build().unwrap();
        assert_eq!(camera.resolution(), (80, 24));
        assert!((camera.forward().x + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_build_scene_from_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("colors.ron"), r##"{ "default": "#", "ff0000": "@" }"##).unwrap();
        fs::write(
            dir.path().join("wall.obj"),
            "v -50 -50 0\nv 50 -50 0\nv 0 50 0\nf 1 2 3\n",
        )
        .unwrap();
        fs::write(dir.path().join("dot.ppm"), "P3\n1 1\n255\n255 0 0\n").unwrap();
        let scene_path = dir.path().join("scene.ron");
        fs::write(
            &scene_path,
            r#"(
                colormap: "colors.ron",
                models: [(name: "wall", path: "wall.obj")],
                instances: [(model: "wall", position: (x: 0.0, y: 0.0, z: -5.0), spin: 90.0)],
                sprites: [(sprite: "dot.ppm", position: (x: 0.0, y: 0.0, z: -2.0), half_height: 1.0)],
            )"#,
        )
        .unwrap();

        let camera = Camera::with_projection(4, 4, std::f32::consts::FRAC_PI_2, 0.1, 100.0, 1.0).unwrap();
        let mut loaded = load_scene(&scene_path, camera).unwrap();
        assert_eq!(loaded.scene.instance_count(), 1);
        assert_eq!(loaded.spinners.len(), 1);

        let frame = loaded.scene.render_frame(&Inline).unwrap();
        // Sprite is half the view tall in front of the wall
        assert_eq!(frame.to_text(), "####\n#@@#\n#@@#\n####");

        let mut spinner = loaded.spinners[0];
        spinner.advance(&mut loaded.scene, 1.0).unwrap();
        let transform = *loaded.scene.instance(spinner.instance).unwrap().transform();
        assert!((transform.angle - std::f32::consts::FRAC_PI_2).abs() < 0.0001);
    }

    #[test]
    fn test_unknown_model_in_scene() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("colors.ron"), r##"{ "default": "#" }"##).unwrap();
        let file = SceneFile::from_ron_str(r#"(colormap: "colors.ron", instances: [(model: "ghost")])"#).unwrap();
        let camera = Camera::new(8, 4).unwrap();
        let err = file.build(dir.path(), camera).err().unwrap();
        assert!(matches!(err, ConfigError::Scene(SceneError::NotFound { .. })));
    }
}
