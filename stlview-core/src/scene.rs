//! The set of displayed meshes together with the view they are drawn and
//! picked with.
//!
//! A scene built by [`Scene::load_files`] or [`Scene::load_demo_spheres`]
//! ends with a pick marker: a small sphere that is excluded from autoscale
//! and picking and is rebuilt at every successful pick.
use std::path::{Path, PathBuf};

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::camera::Camera;
use crate::config::ViewerConfig;
use crate::error::StlResult;
use crate::geometry::Aabb;
use crate::mesh::Mesh;
use crate::orbit::Orbit;
use crate::picker::{self, Hit, ViewState, Viewport};
use crate::sphere::{self, demo_spheres};
use crate::stl::{load_stl, DecodeSummary};

/// Radius of the marker before the first pick.
const INDICATOR_RADIUS: f32 = 0.5;

/// Result of loading one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: StlResult<DecodeSummary>,
}

#[derive(Debug)]
pub struct Scene {
    meshes: Vec<Mesh>,
    has_marker: bool,
    pub view: ViewState,
    pub center: Point3<f32>,
    pub scale: f32,
    pub config: ViewerConfig,
    message: Option<String>,
}

impl Scene {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            meshes: Vec::new(),
            has_marker: false,
            view: ViewState::default(),
            center: Point3::origin(),
            scale: 1.0,
            config,
            message: None,
        }
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Status text of the last pick.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn marker(&self) -> Option<&Mesh> {
        if self.has_marker {
            self.meshes.last()
        } else {
            None
        }
    }

    /// Drop every mesh, including the marker.
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.has_marker = false;
        self.message = None;
    }

    /// Append a mesh in front of the marker.
    pub fn add_mesh(&mut self, mesh: Mesh) {
        if self.has_marker {
            let at = self.meshes.len() - 1;
            self.meshes.insert(at, mesh);
        } else {
            self.meshes.push(mesh);
        }
    }

    /// Replace the scene with one mesh per file, then add the marker and
    /// autoscale.
    ///
    /// Failures are logged and reported per file. Under the best-effort
    /// policy the facets read before a failure are kept; a mesh that ends up
    /// empty is left out of the scene.
    pub fn load_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Vec<FileOutcome> {
        self.clear();

        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let mut mesh = Mesh::new();
            mesh.color = self.config.mesh_color;

            let result = load_stl(path, &mut mesh, self.config.load_policy);
            if let Err(err) = &result {
                warn!("{}: {err}", path.display());
            }
            if mesh.is_empty() {
                debug!("{}: no geometry, skipped", path.display());
            } else {
                self.meshes.push(mesh);
            }
            outcomes.push(FileOutcome {
                path: path.to_path_buf(),
                result,
            });
        }

        self.push_marker();
        self.autoscale();
        info!("scene has {} meshes", self.meshes.len());
        outcomes
    }

    /// Replace the scene with the eight demo spheres.
    ///
    /// Spheres on the odd x corner get `demo_odd_color`, the last one
    /// `demo_last_color`, the rest `mesh_color`.
    pub fn load_demo_spheres(&mut self) {
        self.clear();
        for (i, mut mesh) in demo_spheres().into_iter().enumerate() {
            mesh.color = if i == 7 {
                self.config.demo_last_color
            } else if i & 1 != 0 {
                self.config.demo_odd_color
            } else {
                self.config.mesh_color
            };
            self.meshes.push(mesh);
        }
        self.push_marker();
        self.autoscale();
    }

    fn push_marker(&mut self) {
        let mut marker = Mesh::sphere(INDICATOR_RADIUS, Point3::new(15.0, 15.0, 15.0));
        marker.color = self.config.marker_color;
        marker.include_in_scene_extent = false;
        self.meshes.push(marker);
        self.has_marker = true;
    }

    /// Bounding box over the meshes that count towards the scene extent.
    pub fn extent(&self) -> Option<Aabb> {
        self.meshes
            .iter()
            .filter(|m| m.include_in_scene_extent && !m.is_empty())
            .map(Mesh::bounding_box)
            .reduce(|a, b| a.union(&b))
    }

    /// Center the scene and scale its largest extent to 2 units.
    pub fn autoscale(&mut self) {
        self.scale = 1.0;
        self.center = Point3::origin();

        if let Some(extent) = self.extent() {
            self.center = extent.center();
            let size = extent.size();
            if size > 0.0 {
                self.scale = 2.0 / size;
            }
        }
        debug!("autoscale center {:?} scale {}", self.center, self.scale);
    }

    /// Recompute the stored matrices for the given camera and orbit.
    pub fn update_view(&mut self, camera: &Camera, orbit: &Orbit, viewport: Viewport) {
        self.view = ViewState {
            projection: camera.projection_matrix(),
            model_view: camera.model_view(orbit, &self.center, self.scale),
            viewport,
        };
    }

    /// Pick at a screen position with the stored view.
    ///
    /// A hit moves the marker there and sets the status message; a miss
    /// clears the message.
    pub fn pick(&mut self, x: f32, y: f32) -> Option<Hit> {
        let hit = picker::pick(&self.view, x, y, &self.meshes, self.config.pick_mode);

        match hit {
            Some(hit) => {
                let p = hit.point;
                let message = format!("Pick: ({:7.3},{:7.3},{:7.3})", p.x, p.y, p.z);
                debug!("{message}");
                self.message = Some(message);
                self.place_marker(p);
            }
            None => self.message = None,
        }
        hit
    }

    fn place_marker(&mut self, at: Point3<f32>) {
        if !self.has_marker {
            self.push_marker();
        }
        let radius = self.config.marker_radius / self.scale;
        let color = self.config.marker_color;
        if let Some(marker) = self.meshes.last_mut() {
            marker.clear();
            sphere::generate(marker, radius, at);
            marker.color = color;
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
