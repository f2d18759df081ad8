//! Camera and projection utilities

use nalgebra::{Matrix4, Point3};

use crate::orbit::Orbit;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    Orthographic,
    #[default]
    Perspective,
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub mode: ProjectionMode,
    /// Viewport width over height.
    pub aspect: f32,
}

impl Camera {
    /// Vertical field of view in perspective mode, in degrees.
    pub const FOV_DEGREES: f32 = 60.0;
    pub const NEAR: f32 = 1.0;
    pub const FAR: f32 = 1024.0;
    /// Half depth of the orthographic view volume.
    pub const ORTHO_DEPTH: f32 = 10.0;

    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self {
            mode: ProjectionMode::default(),
            aspect: 1.0,
        };
        camera.resize(width, height);
        camera
    }

    /// Update the aspect ratio; a zero height keeps it square.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = if height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => Matrix4::new_perspective(
                self.aspect,
                Self::FOV_DEGREES.to_radians(),
                Self::NEAR,
                Self::FAR,
            ),
            ProjectionMode::Orthographic => Matrix4::new_orthographic(
                -self.aspect,
                self.aspect,
                -1.0,
                1.0,
                -Self::ORTHO_DEPTH,
                Self::ORTHO_DEPTH,
            ),
        }
    }

    /// Model-view matrix for the current orbit.
    ///
    /// Perspective pulls the model back by `zoom`; orthographic has no depth
    /// cue, so zoom scales the model instead (`8` is unit scale).
    pub fn model_view(&self, orbit: &Orbit, center: &Point3<f32>, scale: f32) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_translation(&nalgebra::Vector3::new(0.0, 0.0, -orbit.zoom))
                    * orbit.model_matrix(center, scale)
            }
            ProjectionMode::Orthographic => {
                orbit.model_matrix(center, scale * orbit.zoom / Orbit::DEFAULT_ZOOM)
            }
        }
    }

    /// Project a model-space point to screen space.
    ///
    /// Returns `(x, y, depth)` with the origin at the top-left corner and
    /// depth in normalized device units, or `None` outside the view volume.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_view: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = self.projection_matrix() * model_view * point.to_homogeneous();

        // Behind the eye, or on the eye plane
        if clip.w < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;

        // Clip test
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || ndc.z.abs() > 1.0 {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(640, 480)
    }
}
