//! Mouse picking: unproject a cursor position into a model-space ray and
//! intersect it with every triangle of the pickable meshes.
//!
//! Intersection is brute force over all triangles; there is no spatial
//! acceleration structure.
use nalgebra::{Matrix4, Point3, Vector4};
use tracing::debug;

use crate::geometry::Ray;
use crate::mesh::Mesh;

/// Relative tolerance of the point-in-triangle area test.
pub const AREA_TOLERANCE: f32 = 1e-6;

/// Default perpendicular distance for [`PickMode::NearestVertex`].
pub const DEFAULT_VERTEX_THRESHOLD: f32 = 0.3;

/// Selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PickMode {
    /// Ray/triangle intersection, nearest surface wins.
    #[default]
    Surface,
    /// Vertex closest to the viewer among those within `max_distance` of
    /// the ray.
    NearestVertex { max_distance: f32 },
}

/// Viewport size in pixels (or terminal cells).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Screen position (origin top-left, y down) to normalized device
    /// coordinates.
    pub fn to_ndc(&self, x: f32, y: f32) -> (f32, f32) {
        (2.0 * x / self.width - 1.0, 1.0 - 2.0 * y / self.height)
    }
}

/// Current matrices and viewport, as set by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub projection: Matrix4<f32>,
    pub model_view: Matrix4<f32>,
    pub viewport: Viewport,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            projection: Matrix4::identity(),
            model_view: Matrix4::identity(),
            viewport: Viewport::new(1.0, 1.0),
        }
    }
}

/// An accepted intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub point: Point3<f32>,
    /// Ray parameter; the hit lies at `origin - direction * t`.
    pub t: f32,
    pub mesh: usize,
}

/// Build the model-space pick ray for a screen position.
///
/// The cursor is pushed through the inverse projection as the point
/// `(ndc_x, ndc_y, 1, 1)` together with the direction `(0, 0, 1, 0)`, then
/// through the inverse model-view. The homogeneous coordinate is dropped
/// without dividing. Returns `None` when either matrix is singular.
pub fn unproject(view: &ViewState, x: f32, y: f32) -> Option<Ray> {
    let (ndc_x, ndc_y) = view.viewport.to_ndc(x, y);
    debug!("cursor {x} {y} => {ndc_x} {ndc_y}");

    let inv_projection = view.projection.try_inverse()?;
    let inv_model_view = view.model_view.try_inverse()?;

    let pos = inv_model_view * (inv_projection * Vector4::new(ndc_x, ndc_y, 1.0, 1.0));
    let dir = inv_model_view * (inv_projection * Vector4::new(0.0, 0.0, 1.0, 0.0));

    let ray = Ray::new(Point3::new(pos.x, pos.y, pos.z), dir.xyz());
    debug!("pick ray {:?} -> {:?}", ray.origin, ray.direction);
    Some(ray)
}

/// Intersect `ray` with the triangles of every pickable mesh.
///
/// For each triangle the plane parameter is
/// `t = dot(n, origin - v0) / dot(n, direction)` and the candidate point is
/// `origin - direction * t`. The unprojected ray points away from the
/// viewer, so among accepted hits the one with the largest `t` is the
/// visible surface.
pub fn fire_line(ray: &Ray, meshes: &[Mesh]) -> Option<Hit> {
    let mut nearest: Option<Hit> = None;

    for (mesh_index, mesh) in meshes.iter().enumerate() {
        if !mesh.include_in_scene_extent {
            continue;
        }

        for tri in mesh.iter_triangles() {
            let [v0, v1, v2] = tri.vertices;
            let side1 = v1 - v0;
            let side2 = v2 - v0;
            let cross = side1.cross(&side2);
            let area = cross.norm() / 2.0;
            // Zero-area triangles (sphere poles) have no plane.
            if area == 0.0 {
                continue;
            }
            let normal = cross / (area * 2.0);

            let denom = normal.dot(&ray.direction);
            if denom.abs() < f32::EPSILON {
                continue;
            }
            let t = normal.dot(&(ray.origin - v0)) / denom;
            let point = ray.origin - ray.direction * t;

            // The three sub-triangles around `point` cover the triangle
            // exactly when `point` is inside it. Written as an acceptance so
            // a NaN residual is rejected.
            let a0 = (point - v0).cross(&side2).norm() / 2.0;
            let a1 = (point - v1).cross(&(-side1)).norm() / 2.0;
            let a2 = (point - v2).cross(&(v1 - v2)).norm() / 2.0;
            let inside = (area - a0 - a1 - a2).abs() < area * AREA_TOLERANCE;
            if !inside {
                continue;
            }

            if nearest.map_or(true, |hit| t > hit.t) {
                nearest = Some(Hit {
                    point,
                    t,
                    mesh: mesh_index,
                });
            }
        }
    }

    match &nearest {
        Some(hit) => debug!("nearest {:?}", hit.point),
        None => debug!("no nearest"),
    }
    nearest
}

/// Vertex of the pickable meshes within `max_distance` of the ray line
/// that lies furthest back along the ray, i.e. closest to the viewer.
pub fn fire_point(ray: &Ray, meshes: &[Mesh], max_distance: f32) -> Option<Hit> {
    let mut nearest: Option<Hit> = None;

    for (mesh_index, mesh) in meshes.iter().enumerate() {
        if !mesh.include_in_scene_extent {
            continue;
        }
        for p in mesh.vertices() {
            if ray.distance_from(p) > max_distance {
                continue;
            }
            let d = ray.distance_along(p);
            if nearest.map_or(true, |hit| d < -hit.t) {
                nearest = Some(Hit {
                    point: *p,
                    t: -d,
                    mesh: mesh_index,
                });
            }
        }
    }

    nearest
}

/// Pick the world-space point under the cursor, if any.
pub fn pick(view: &ViewState, x: f32, y: f32, meshes: &[Mesh], mode: PickMode) -> Option<Hit> {
    let ray = unproject(view, x, y)?;
    match mode {
        PickMode::Surface => fire_line(&ray, meshes),
        PickMode::NearestVertex { max_distance } => fire_point(&ray, meshes, max_distance),
    }
}
