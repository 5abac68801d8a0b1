//! Scene ownership and frame seeding
//!
//! `Scene` owns the models, sprites, their placed instances, the colormap
//! and the camera. Everything is addressed by generational handle. Each
//! frame it resolves all of that into flat pipeline records, runs the
//! pipeline, and assembles the result.

pub mod camera;
pub mod handle;
pub mod instance;
pub mod registry;
pub mod transform;

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::frame::{apply_overlay, assemble_frame, Frame, FrameError};
use crate::geometry::mat4_compose;
use crate::pipeline::{
    run_pipeline, Glyph, PipelineInput, PipelineSettings, PipelineStats, PipelineTimings, PolygonRecord,
    SpriteBitmap, SpriteRecord, VertexRecord, WorkDistributor,
};
use crate::resource::{Colormap, Model, ResourceError};

pub use camera::Camera;
pub use handle::{Handle, HandleAllocator};
pub use instance::{Instance, SpriteInstance};
pub use registry::Registry;
pub use transform::{Transform, Transformer};

pub type ModelHandle = Handle<Model>;
pub type InstanceHandle = Handle<Instance>;
pub type SpriteHandle = Handle<Arc<SpriteBitmap>>;
pub type SpriteInstanceHandle = Handle<SpriteInstance>;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid resolution {width}x{height}")]
    InvalidResolution { width: usize, height: usize },
    #[error("invalid projection: {0}")]
    InvalidProjection(String),
    #[error("unknown {kind} '{name}'")]
    NotFound { kind: &'static str, name: String },
    #[error("{0} handle no longer refers to anything")]
    StaleHandle(&'static str),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// Per-frame records built from the scene, before fragments are attached.
#[derive(Debug, Clone, Default)]
pub struct FrameSeed {
    pub vertices: Vec<VertexRecord>,
    pub polygons: Vec<PolygonRecord>,
    pub sprites: Vec<SpriteRecord>,
}

/// A rendered frame with the pipeline's diagnostics.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub frame: Frame,
    pub timings: PipelineTimings,
    pub stats: PipelineStats,
}

pub struct Scene {
    camera: Camera,
    colormap: Colormap,
    settings: PipelineSettings,
    models: Registry<Model>,
    model_names: HashMap<String, ModelHandle>,
    instances: Registry<Instance>,
    sprites: Registry<Arc<SpriteBitmap>>,
    sprite_instances: Registry<SpriteInstance>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            colormap: Colormap::new(),
            settings: PipelineSettings::default(),
            models: Registry::new(),
            model_names: HashMap::new(),
            instances: Registry::new(),
            sprites: Registry::new(),
            sprite_instances: Registry::new(),
        }
    }

    // =========================================================================
    // Camera, colormap, settings
    // =========================================================================

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn colormap(&self) -> &Colormap {
        &self.colormap
    }

    pub fn set_colormap(&mut self, colormap: Colormap) {
        self.colormap = colormap;
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn set_culling(&mut self, culling: bool) {
        self.settings.culling = culling;
    }

    pub fn set_fog_glyph(&mut self, fog: char) {
        self.settings.fog_glyph = fog;
    }

    // =========================================================================
    // Models and instances
    // =========================================================================

    /// Register a model under `name`. A model already using that name is
    /// removed along with its instances.
    pub fn add_model(&mut self, name: &str, model: Model) -> ModelHandle {
        if let Some(old) = self.model_names.get(name).copied() {
            match self.remove_model(old) {
                Ok(_) => warn!(name, "Replaced model"),
                Err(err) => warn!(name, %err, "Model name pointed at a removed model"),
            }
        }
        let handle = self.models.insert(model);
        self.model_names.insert(name.to_string(), handle);
        handle
    }

    pub fn model_handle(&self, name: &str) -> Result<ModelHandle, SceneError> {
        self.model_names
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::NotFound {
                kind: "model",
                name: name.to_string(),
            })
    }

    pub fn model(&self, handle: ModelHandle) -> Option<&Model> {
        self.models.get(handle)
    }

    /// Remove a model and every instance of it.
    pub fn remove_model(&mut self, handle: ModelHandle) -> Result<Model, SceneError> {
        let model = self
            .models
            .remove(handle)
            .ok_or(SceneError::StaleHandle("model"))?;
        self.model_names.retain(|_, h| *h != handle);
        self.instances.retain(|instance| instance.model() != handle);
        Ok(model)
    }

    pub fn create_instance(&mut self, model: ModelHandle) -> Result<InstanceHandle, SceneError> {
        if !self.models.contains(model) {
            return Err(SceneError::StaleHandle("model"));
        }
        Ok(self.instances.insert(Instance::new(model)))
    }

    /// Returns false if the instance was already gone.
    pub fn delete_instance(&mut self, handle: InstanceHandle) -> bool {
        self.instances.remove(handle).is_some()
    }

    pub fn instance(&self, handle: InstanceHandle) -> Result<&Instance, SceneError> {
        self.instances
            .get(handle)
            .ok_or(SceneError::StaleHandle("instance"))
    }

    pub fn instance_mut(&mut self, handle: InstanceHandle) -> Result<&mut Instance, SceneError> {
        self.instances
            .get_mut(handle)
            .ok_or(SceneError::StaleHandle("instance"))
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    // =========================================================================
    // Sprites
    // =========================================================================

    pub fn add_sprite(&mut self, bitmap: SpriteBitmap) -> SpriteHandle {
        self.sprites.insert(Arc::new(bitmap))
    }

    /// Remove a sprite bitmap and every placed copy of it.
    pub fn remove_sprite(&mut self, handle: SpriteHandle) -> Result<(), SceneError> {
        self.sprites
            .remove(handle)
            .ok_or(SceneError::StaleHandle("sprite"))?;
        self.sprite_instances.retain(|instance| instance.sprite() != handle);
        Ok(())
    }

    pub fn create_sprite_instance(&mut self, sprite: SpriteHandle) -> Result<SpriteInstanceHandle, SceneError> {
        if !self.sprites.contains(sprite) {
            return Err(SceneError::StaleHandle("sprite"));
        }
        Ok(self.sprite_instances.insert(SpriteInstance::new(sprite)))
    }

    pub fn delete_sprite_instance(&mut self, handle: SpriteInstanceHandle) -> bool {
        self.sprite_instances.remove(handle).is_some()
    }

    pub fn sprite_instance_mut(&mut self, handle: SpriteInstanceHandle) -> Result<&mut SpriteInstance, SceneError> {
        self.sprite_instances
            .get_mut(handle)
            .ok_or(SceneError::StaleHandle("sprite instance"))
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Flatten every visible instance and sprite into pipeline records.
    ///
    /// Each instance's vertices get `projection * view * model`; polygon
    /// indices are offset into the shared vertex buffer and face colours are
    /// resolved through the colormap.
    pub fn seed(&self) -> Result<FrameSeed, SceneError> {
        let mut seed = FrameSeed::default();
        let view_projection = *self.camera.view_projection();
        let mut resolved: HashMap<ModelHandle, Vec<Glyph>> = HashMap::new();

        for (_, instance) in self.instances.iter() {
            if instance.is_hidden() {
                continue;
            }
            let Some(model) = self.models.get(instance.model()) else {
                continue;
            };

            if !resolved.contains_key(&instance.model()) {
                let glyphs = model
                    .faces
                    .iter()
                    .map(|face| self.colormap.resolve(&face.color_key))
                    .collect::<Result<Vec<_>, _>>()?;
                resolved.insert(instance.model(), glyphs);
            }
            let glyphs = &resolved[&instance.model()];

            let transform = mat4_compose(&view_projection, &instance.model_matrix());
            let offset = seed.vertices.len();
            seed.vertices.extend(
                model
                    .vertices
                    .iter()
                    .map(|&position| VertexRecord { position, transform }),
            );
            seed.polygons.extend(model.faces.iter().zip(glyphs).map(|(face, &glyph)| PolygonRecord {
                indices: face.indices.map(|i| i + offset),
                glyph,
            }));
        }

        let up = self.camera.up();
        let aspect = self.camera.aspect();
        for (_, instance) in self.sprite_instances.iter() {
            if instance.is_hidden() {
                continue;
            }
            let Some(bitmap) = self.sprites.get(instance.sprite()) else {
                continue;
            };
            seed.sprites.push(SpriteRecord {
                origin: instance.position(),
                bound: instance.position() + up * instance.half_height(),
                transform: view_projection,
                aspect,
                bitmap: bitmap.clone(),
            });
        }

        Ok(seed)
    }

    /// Render one frame, optionally with overlay glyphs indexed by fragment.
    pub fn render<W: WorkDistributor>(
        &self,
        workers: &W,
        overlay: Option<&[Option<char>]>,
    ) -> Result<RenderOutput, SceneError> {
        let seed = self.seed()?;
        let overlaid;
        let fragments = match overlay {
            Some(overlay) => {
                overlaid = apply_overlay(self.camera.fragments(), overlay);
                &overlaid[..]
            }
            None => self.camera.fragments(),
        };

        let input = PipelineInput {
            vertices: &seed.vertices,
            polygons: &seed.polygons,
            sprites: &seed.sprites,
            fragments,
        };
        let output = run_pipeline(workers, &input, &self.settings);
        let (width, height) = self.camera.resolution();
        let frame = assemble_frame(output.glyphs, width, height)?;
        debug!(width, height, total_ms = output.timings.total_ms(), "Rendered frame");

        Ok(RenderOutput {
            frame,
            timings: output.timings,
            stats: output.stats,
        })
    }

    pub fn render_frame<W: WorkDistributor>(&self, workers: &W) -> Result<Frame, SceneError> {
        Ok(self.render(workers, None)?.frame)
    }

    pub fn render_frame_with_overlay<W: WorkDistributor>(
        &self,
        workers: &W,
        overlay: &[Option<char>],
    ) -> Result<Frame, SceneError> {
        Ok(self.render(workers, Some(overlay))?.frame)
    }
}
