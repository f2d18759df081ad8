//! Indexed triangle mesh with exact vertex consolidation.
//!
//! Every vertex enters through [`Mesh::get_index`], which merges a
//! (position, normal) pair into an existing slot only when both are
//! bit-for-bit identical.

// Vertex counts are bounded by u32 indices, as in any GL-style index buffer
#![allow(clippy::cast_possible_truncation)]

use std::cell::Cell;
use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::edges::extract_edges;
use crate::geometry::{facet_normal, Aabb, Triangle};

/// Display color, linear RGB in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Dedup key: the raw bit patterns of position and normal.
///
/// Hashing all six components keeps permuted or cancelling coordinates from
/// colliding, and comparing bits keeps the merge exact (`0.0` and `-0.0`
/// are distinct vertices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey([u32; 6]);

impl VertexKey {
    fn new(position: &Point3<f32>, normal: &Vector3<f32>) -> Self {
        Self([
            position.x.to_bits(),
            position.y.to_bits(),
            position.z.to_bits(),
            normal.x.to_bits(),
            normal.y.to_bits(),
            normal.z.to_bits(),
        ])
    }
}

/// A triangle mesh with parallel vertex/normal buffers and an index list.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Point3<f32>>,
    normals: Vec<Vector3<f32>>,
    triangles: Vec<u32>,
    edges: Vec<[u32; 2]>,
    index: HashMap<VertexKey, u32>,
    bounds: Cell<Option<Aabb>>,
    pub color: Color,
    /// Whether the mesh counts towards autoscale and picking.
    pub include_in_scene_extent: bool,
}

impl Mesh {
    pub const DEFAULT_COLOR: Color = Color::new(0.8, 0.7, 0.6);

    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            normals: Vec::new(),
            triangles: Vec::new(),
            edges: Vec::new(),
            index: HashMap::new(),
            bounds: Cell::new(None),
            color: Self::DEFAULT_COLOR,
            include_in_scene_extent: true,
        }
    }

    pub fn with_capacity(triangle_count: usize) -> Self {
        let mut mesh = Self::new();
        mesh.triangles.reserve(triangle_count * 3);
        mesh
    }

    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vector3<f32>] {
        &self.normals
    }

    /// Flat index list, three entries per triangle.
    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    pub fn edges(&self) -> &[[u32; 2]] {
        &self.edges
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Index of the vertex with exactly this position and normal, inserting
    /// it when it has not been seen before.
    pub fn get_index(&mut self, position: Point3<f32>, normal: Vector3<f32>) -> u32 {
        let key = VertexKey::new(&position, &normal);
        if let Some(&i) = self.index.get(&key) {
            return i;
        }
        let i = self.vertices.len() as u32;
        self.index.insert(key, i);
        self.vertices.push(position);
        self.normals.push(normal);
        self.bounds.set(None);
        i
    }

    pub fn push_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.triangles.extend_from_slice(&[i0, i1, i2]);
    }

    /// Add a flat-shaded facet, using the normal computed from its winding
    /// for all three corners. Degenerate facets are skipped and return
    /// `false`.
    pub fn add_facet(&mut self, v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> bool {
        let Some(n) = facet_normal(&v0, &v1, &v2) else {
            return false;
        };
        let i0 = self.get_index(v0, n);
        let i1 = self.get_index(v1, n);
        let i2 = self.get_index(v2, n);
        self.push_triangle(i0, i1, i2);
        true
    }

    /// Rebuild the wireframe edge list from the current triangles.
    pub fn make_edges(&mut self) {
        self.edges = extract_edges(&self.triangles);
    }

    /// Drop all geometry. Color and scene-extent flag are kept.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.normals.clear();
        self.triangles.clear();
        self.edges.clear();
        self.index.clear();
        self.bounds.set(None);
    }

    /// Bounding box of all vertices, recomputed lazily after insertions.
    /// An empty mesh has a zero box at the origin.
    pub fn bounding_box(&self) -> Aabb {
        if let Some(bounds) = self.bounds.get() {
            return bounds;
        }
        let bounds = Aabb::from_points(&self.vertices).unwrap_or_default();
        self.bounds.set(Some(bounds));
        bounds
    }

    /// Positions of the `i`th triangle.
    pub fn triangle(&self, i: usize) -> Triangle {
        let idx = &self.triangles[i * 3..i * 3 + 3];
        Triangle::new(
            self.vertices[idx[0] as usize],
            self.vertices[idx[1] as usize],
            self.vertices[idx[2] as usize],
        )
    }

    pub fn iter_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).map(move |i| self.triangle(i))
    }

    /// Create a simple cube mesh centered on the origin
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let corner = |x: f32, y: f32, z: f32| Point3::new(x * h, y * h, z * h);
        // Two triangles per face, wound counter-clockwise seen from outside.
        let faces = [
            // Front (+z)
            [(-1., -1., 1.), (1., -1., 1.), (1., 1., 1.), (-1., 1., 1.)],
            // Back (-z)
            [(-1., -1., -1.), (-1., 1., -1.), (1., 1., -1.), (1., -1., -1.)],
            // Top (+y)
            [(-1., 1., -1.), (-1., 1., 1.), (1., 1., 1.), (1., 1., -1.)],
            // Bottom (-y)
            [(-1., -1., -1.), (1., -1., -1.), (1., -1., 1.), (-1., -1., 1.)],
            // Right (+x)
            [(1., -1., -1.), (1., 1., -1.), (1., 1., 1.), (1., -1., 1.)],
            // Left (-x)
            [(-1., -1., -1.), (-1., -1., 1.), (-1., 1., 1.), (-1., 1., -1.)],
        ];

        let mut mesh = Self::with_capacity(12);
        for quad in faces {
            let [a, b, c, d] = quad.map(|(x, y, z)| corner(x, y, z));
            mesh.add_facet(a, b, c);
            mesh.add_facet(a, c, d);
        }
        mesh.make_edges();
        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_index_merges_exact_matches_only() {
        let mut mesh = Mesh::new();
        let n = Vector3::new(0.0, 0.0, 1.0);
        let a = mesh.get_index(Point3::new(1.0, 2.0, 3.0), n);
        let b = mesh.get_index(Point3::new(1.0, 2.0, 3.0), n);
        assert_eq!(a, b);

        // Same position, different normal: a new slot.
        let c = mesh.get_index(Point3::new(1.0, 2.0, 3.0), Vector3::new(0.0, 1.0, 0.0));
        assert_ne!(a, c);

        // Signed zero is a different bit pattern.
        let d = mesh.get_index(Point3::new(0.0, 0.0, 0.0), n);
        let e = mesh.get_index(Point3::new(-0.0, 0.0, 0.0), n);
        assert_ne!(d, e);

        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.normals().len(), 4);
        assert_eq!(mesh.index.len(), 4);
    }

    #[test]
    fn test_permuted_coordinates_do_not_merge() {
        let mut mesh = Mesh::new();
        let n = Vector3::new(1.0, 0.0, 0.0);
        let a = mesh.get_index(Point3::new(1.0, 2.0, 3.0), n);
        let b = mesh.get_index(Point3::new(3.0, 2.0, 1.0), n);
        let c = mesh.get_index(Point3::new(2.0, 1.0, 3.0), n);
        assert_eq!([a, b, c], [0, 1, 2]);
    }

    #[test]
    fn test_shared_edge_vertices_are_stored_once() {
        let mut mesh = Mesh::new();
        // Coplanar facets sharing the edge (1,0,0)-(0,1,0).
        assert!(mesh.add_facet(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ));
        assert!(mesh.add_facet(
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ));
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.triangles(), &[0, 1, 2, 3, 2, 1]);

        mesh.make_edges();
        assert_eq!(mesh.edges().len(), 5);
    }

    #[test]
    fn test_degenerate_facet_is_skipped() {
        let mut mesh = Mesh::new();
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(!mesh.add_facet(p, p, Point3::new(2.0, 2.0, 2.0)));
        assert!(mesh.is_empty());
        assert!(mesh.vertices().is_empty());
    }

    #[test]
    fn test_bounding_box_is_invalidated_by_insertion() {
        let mut mesh = Mesh::new();
        assert_eq!(mesh.bounding_box(), Aabb::default());

        let n = Vector3::new(0.0, 0.0, 1.0);
        mesh.get_index(Point3::new(0.0, 0.0, 0.0), n);
        mesh.get_index(Point3::new(1.0, 2.0, 3.0), n);
        assert_eq!(mesh.bounding_box().max, Point3::new(1.0, 2.0, 3.0));

        // z extremes come from z, not from x.
        mesh.get_index(Point3::new(-5.0, 0.0, 9.0), n);
        mesh.get_index(Point3::new(4.0, 0.0, -7.0), n);
        let bounds = mesh.bounding_box();
        assert_eq!(bounds.min, Point3::new(-5.0, 0.0, -7.0));
        assert_eq!(bounds.max, Point3::new(4.0, 2.0, 9.0));
    }

    #[test]
    fn test_clear_resets_geometry() {
        let mut mesh = Mesh::cube(2.0);
        mesh.include_in_scene_extent = false;
        mesh.clear();
        assert!(mesh.is_empty());
        assert!(mesh.vertices().is_empty());
        assert!(mesh.edges().is_empty());
        assert_eq!(mesh.bounding_box(), Aabb::default());
        assert!(!mesh.include_in_scene_extent);
    }

    #[test]
    fn test_cube_topology() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.triangle_count(), 12);
        // Four corners per face, normals differ between faces.
        assert_eq!(cube.vertices().len(), 24);
        // Four sides plus one diagonal per face.
        assert_eq!(cube.edges().len(), 30);

        let bounds = cube.bounding_box();
        assert_eq!(bounds.min, Point3::new(-1.0, -1.0, -1.0));
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0));

        for (p, n) in cube.vertices().iter().zip(cube.normals()) {
            // Outward normals.
            assert!(p.coords.dot(n) > 0.0);
        }
    }
}
