//! Placed copies of models and sprites
//!
//! Setters return `&mut Self` so they chain:
//! `scene.instance_mut(h)?.set_position(p).set_scale(2.0).hide();`

use super::transform::Transform;
use super::{ModelHandle, SpriteHandle};
use crate::geometry::{Mat4, Vec3};

/// A model placed in the world
#[derive(Debug, Clone)]
pub struct Instance {
    model: ModelHandle,
    transform: Transform,
    hidden: bool,
}

impl Instance {
    pub(crate) fn new(model: ModelHandle) -> Self {
        Self {
            model,
            transform: Transform::IDENTITY,
            hidden: false,
        }
    }

    pub fn model(&self) -> ModelHandle {
        self.model
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_scale(&mut self, scale: f32) -> &mut Self {
        self.transform.scale = scale;
        self
    }

    /// Rotation of `angle` radians about `axis`.
    pub fn set_orientation(&mut self, axis: Vec3, angle: f32) -> &mut Self {
        self.transform.axis = axis;
        self.transform.angle = angle;
        self
    }

    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.transform.position = position;
        self
    }

    pub fn hide(&mut self) -> &mut Self {
        self.hidden = true;
        self
    }

    pub fn show(&mut self) -> &mut Self {
        self.hidden = false;
        self
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }
}

/// A billboard placed in the world. It always faces the camera and is
/// `2 * half_height` world units tall.
#[derive(Debug, Clone)]
pub struct SpriteInstance {
    sprite: SpriteHandle,
    position: Vec3,
    half_height: f32,
    hidden: bool,
}

impl SpriteInstance {
    pub(crate) fn new(sprite: SpriteHandle) -> Self {
        Self {
            sprite,
            position: Vec3::ZERO,
            half_height: 0.5,
            hidden: false,
        }
    }

    pub fn sprite(&self) -> SpriteHandle {
        self.sprite
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn half_height(&self) -> f32 {
        self.half_height
    }

    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self
    }

    pub fn set_half_height(&mut self, half_height: f32) -> &mut Self {
        self.half_height = half_height;
        self
    }

    pub fn hide(&mut self) -> &mut Self {
        self.hidden = true;
        self
    }

    pub fn show(&mut self) -> &mut Self {
        self.hidden = false;
        self
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}
