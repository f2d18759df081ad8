//! Viewer settings shared by the scene and the front ends.
use crate::mesh::{Color, Mesh};
use crate::picker::PickMode;
use crate::stl::LoadPolicy;

/// Runtime configuration of a [`Scene`](crate::scene::Scene).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerConfig {
    pub pick_mode: PickMode,
    pub load_policy: LoadPolicy,
    /// Pick marker radius in normalized view units; divided by the
    /// autoscale factor when the marker is built.
    pub marker_radius: f32,
    pub mesh_color: Color,
    pub marker_color: Color,
    pub demo_odd_color: Color,
    pub demo_last_color: Color,
}

impl ViewerConfig {
    pub const MARKER_COLOR: Color = Color::new(0.8, 0.8, 0.8);
    pub const DEMO_RED: Color = Color::new(0.9, 0.2, 0.2);
    pub const DEMO_GREEN: Color = Color::new(0.2, 0.9, 0.2);

    pub fn with_pick_mode(mut self, pick_mode: PickMode) -> Self {
        self.pick_mode = pick_mode;
        self
    }

    pub fn with_load_policy(mut self, load_policy: LoadPolicy) -> Self {
        self.load_policy = load_policy;
        self
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            pick_mode: PickMode::default(),
            load_policy: LoadPolicy::default(),
            marker_radius: 0.02,
            mesh_color: Mesh::DEFAULT_COLOR,
            marker_color: Self::MARKER_COLOR,
            demo_odd_color: Self::DEMO_RED,
            demo_last_color: Self::DEMO_GREEN,
        }
    }
}
