//! Geometry primitives: triangles, boxes and rays over nalgebra points.
use nalgebra::{Point3, Vector3};

/// Unit normal of the triangle `a, b, c` following its winding.
///
/// Returns `None` when the vertices are collinear or coincident, i.e. the
/// cross product of the two edges has zero length.
pub fn facet_normal(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Option<Vector3<f32>> {
    let n = (b - a).cross(&(c - a));
    let len = n.norm();
    if len == 0.0 {
        return None;
    }
    Some(n / len)
}

/// A triangle face defined by three positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's winding
    pub fn calculate_normal(&self) -> Option<Vector3<f32>> {
        let [v0, v1, v2] = &self.vertices;
        facet_normal(v0, v1, v2)
    }

    pub fn area(&self) -> f32 {
        let [v0, v1, v2] = &self.vertices;
        (v1 - v0).cross(&(v2 - v0)).norm() / 2.0
    }
}

/// One facet as stored in an STL file.
///
/// The stored normal is kept for diagnostics only; geometry always uses the
/// normal recomputed from the vertex winding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFacet {
    pub normal: Vector3<f32>,
    pub vertices: [Point3<f32>; 3],
}

impl Default for RawFacet {
    fn default() -> Self {
        Self {
            normal: Vector3::zeros(),
            vertices: [Point3::origin(); 3],
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Point3::origin(),
            max: Point3::origin(),
        }
    }
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all `points`, or `None` for an empty input.
    ///
    /// Each axis is tracked on its own.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f32>>,
    {
        let mut points = points.into_iter();
        let first = *points.next()?;
        let mut bounds = Self::new(first, first);
        for p in points {
            for axis in 0..3 {
                if p[axis] < bounds.min[axis] {
                    bounds.min[axis] = p[axis];
                }
                if p[axis] > bounds.max[axis] {
                    bounds.max[axis] = p[axis];
                }
            }
        }
        Some(bounds)
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Largest extent over the three axes.
    pub fn size(&self) -> f32 {
        let extent = self.max - self.min;
        extent.x.max(extent.y).max(extent.z)
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }
}

/// A ray with a normalized direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Build a ray, normalizing `direction`.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Signed distance of the projection of `p` along the ray.
    pub fn distance_along(&self, p: &Point3<f32>) -> f32 {
        (p - self.origin).dot(&self.direction)
    }

    /// Perpendicular distance from `p` to the ray's line.
    pub fn distance_from(&self, p: &Point3<f32>) -> f32 {
        let foot = self.origin + self.direction * self.distance_along(p);
        (p - foot).norm()
    }
}
