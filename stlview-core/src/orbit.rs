//! Orbit state driven by keyboard, mouse drag and scroll

use nalgebra::{Matrix4, Point3, Vector3};

/// Spin and tilt of the model (degrees) and the camera distance.
///
/// `alpha` turns the model about its z axis, `beta` tilts it about the
/// view's x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub alpha: f32,
    pub beta: f32,
    pub zoom: f32,
}

impl Orbit {
    pub const DEFAULT_ALPHA: f32 = 210.0;
    pub const DEFAULT_BETA: f32 = -70.0;
    pub const DEFAULT_ZOOM: f32 = 8.0;
    /// Rotation per arrow key press, in degrees.
    pub const KEY_STEP: f32 = 5.0;
    /// Zoom change per page key press.
    pub const ZOOM_STEP: f32 = 0.25;

    pub fn new(alpha: f32, beta: f32, zoom: f32) -> Self {
        Self {
            alpha,
            beta,
            zoom: zoom.max(0.0),
        }
    }

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, d_alpha: f32, d_beta: f32) {
        self.alpha += d_alpha;
        self.beta += d_beta;
    }

    /// Change the camera distance; never goes below zero.
    pub fn zoom_by(&mut self, delta: f32) {
        self.zoom = (self.zoom + delta).max(0.0);
    }

    /// Face the model straight on (`alpha = beta = 0`). Zoom is kept.
    pub fn reset(&mut self) {
        self.alpha = 0.0;
        self.beta = 0.0;
    }

    /// `S(scale) · Rx(beta) · Rz(alpha) · T(-center)`
    pub fn model_matrix(&self, center: &Point3<f32>, scale: f32) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(self.beta.to_radians(), 0.0, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, self.alpha.to_radians()));
        Matrix4::new_scaling(scale) * rx * rz * Matrix4::new_translation(&-center.coords)
    }
}

impl Default for Orbit {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ALPHA, Self::DEFAULT_BETA, Self::DEFAULT_ZOOM)
    }
}
