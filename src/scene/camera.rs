//! Camera for glyph rendering
//!
//! First-person camera: position plus yaw (about +Y) and pitch (about the
//! camera's right axis). Looks down -Z when both are zero. The world to
//! clip matrix and the fragment grid are cached and rebuilt by the setters
//! that affect them.

use std::f32::consts::FRAC_PI_2;

use super::transform::Transformer;
use super::SceneError;
use crate::frame::generate_fragments;
use crate::geometry::{mat4_compose, mat4_perspective, Mat4, Vec3};
use crate::pipeline::FragmentRecord;

/// Pitch stays just short of straight up/down so the basis never degenerates.
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Camera state for rendering
#[derive(Clone, Debug)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,

    width: usize,
    height: usize,
    /// Vertical field of view (radians)
    fov: f32,
    near: f32,
    far: f32,
    /// Width over height of one output cell
    cell_aspect: f32,

    view_projection: Mat4,
    fragments: Vec<FragmentRecord>,
}

impl Camera {
    /// Camera at the origin. Terminal cells are roughly twice as tall as
    /// they are wide, hence the default `cell_aspect` of 0.5.
    pub fn new(width: usize, height: usize) -> Result<Self, SceneError> {
        Self::with_projection(width, height, 70f32.to_radians(), 0.1, 100.0, 0.5)
    }

    pub fn with_projection(
        width: usize,
        height: usize,
        fov: f32,
        near: f32,
        far: f32,
        cell_aspect: f32,
    ) -> Result<Self, SceneError> {
        validate_resolution(width, height)?;
        validate_projection(fov, near, far, cell_aspect)?;
        let mut cam = Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            width,
            height,
            fov,
            near,
            far,
            cell_aspect,
            view_projection: [[0.0; 4]; 4],
            fragments: generate_fragments(width, height),
        };
        cam.update_matrix();
        Ok(cam)
    }

    // =========================================================================
    // Placement
    // =========================================================================

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_matrix();
    }

    /// Move in world space
    pub fn translate(&mut self, offset: Vec3) {
        self.set_position(self.position + offset);
    }

    /// Move relative to the current heading. Forward and right stay in the
    /// horizontal plane; up is world +Y.
    pub fn move_relative(&mut self, forward: f32, right: f32, up: f32) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let ahead = Vec3::new(-sin_yaw, 0.0, -cos_yaw);
        let side = Vec3::new(cos_yaw, 0.0, -sin_yaw);
        self.translate(ahead * forward + side * right + Vec3::Y * up);
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_matrix();
    }

    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        self.set_orientation(self.yaw + d_yaw, self.pitch + d_pitch);
    }

    /// Viewing direction
    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(cos_yaw, 0.0, -sin_yaw)
    }

    /// Screen-up direction in world space
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }

    // =========================================================================
    // Projection
    // =========================================================================

    pub fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Regenerates the fragment grid when the size actually changes.
    pub fn set_resolution(&mut self, width: usize, height: usize) -> Result<(), SceneError> {
        validate_resolution(width, height)?;
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.fragments = generate_fragments(width, height);
        }
        self.update_matrix();
        Ok(())
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, fov: f32) -> Result<(), SceneError> {
        validate_projection(fov, self.near, self.far, self.cell_aspect)?;
        self.fov = fov;
        self.update_matrix();
        Ok(())
    }

    pub fn clip_range(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    pub fn set_clip_range(&mut self, near: f32, far: f32) -> Result<(), SceneError> {
        validate_projection(self.fov, near, far, self.cell_aspect)?;
        self.near = near;
        self.far = far;
        self.update_matrix();
        Ok(())
    }

    pub fn set_cell_aspect(&mut self, cell_aspect: f32) -> Result<(), SceneError> {
        validate_projection(self.fov, self.near, self.far, cell_aspect)?;
        self.cell_aspect = cell_aspect;
        self.update_matrix();
        Ok(())
    }

    /// Physical width over height of the whole view.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32 * self.cell_aspect
    }

    pub fn view_matrix(&self) -> Mat4 {
        Transformer::inverse()
            .rotate(self.pitch, Vec3::X)
            .rotate(self.yaw, Vec3::Y)
            .translate(self.position)
            .build()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        mat4_perspective(self.near, self.far, self.fov, self.aspect())
    }

    /// Cached world to clip transform
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    /// Cached sample points, one per output cell
    pub fn fragments(&self) -> &[FragmentRecord] {
        &self.fragments
    }

    fn update_matrix(&mut self) {
        self.view_projection = mat4_compose(&self.projection_matrix(), &self.view_matrix());
    }
}

fn validate_resolution(width: usize, height: usize) -> Result<(), SceneError> {
    if width == 0 || height == 0 {
        return Err(SceneError::InvalidResolution { width, height });
    }
    Ok(())
}

fn validate_projection(fov: f32, near: f32, far: f32, cell_aspect: f32) -> Result<(), SceneError> {
    if !(fov > 0.0 && fov < std::f32::consts::PI) {
        return Err(SceneError::InvalidProjection(format!("field of view {} out of range", fov)));
    }
    if !(near > 0.0 && far > near) {
        return Err(SceneError::InvalidProjection(format!("clip range {}..{} is empty", near, far)));
    }
    if !(cell_aspect > 0.0) {
        return Err(SceneError::InvalidProjection(format!("cell aspect {} must be positive", cell_aspect)));
    }
    Ok(())
}
