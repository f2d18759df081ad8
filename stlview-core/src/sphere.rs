//! UV-sphere tessellation, used for pick markers and the demo scene.
use std::f32::consts::PI;

use nalgebra::{Point3, Vector3};

use crate::mesh::Mesh;

/// Steps around the full revolution (u).
pub const U_STEPS: usize = 32;
/// Steps from pole to pole (v).
pub const V_STEPS: usize = 32;

fn sphere_point(r: f32, u: f32, v: f32) -> Vector3<f32> {
    Vector3::new(u.cos() * v.sin() * r, v.cos() * r, u.sin() * v.sin() * r)
}

fn sphere_triangle(mesh: &mut Mesh, r: f32, corners: [Vector3<f32>; 3], center: &Point3<f32>) {
    let [i0, i1, i2] = corners.map(|p| mesh.get_index(center + p, p / r));
    mesh.push_triangle(i0, i1, i2);
}

/// Append a sphere of radius `r` around `center` to `mesh` and rebuild its
/// edges.
///
/// Normals are the radial unit vectors. Pole cells produce zero-area
/// triangles; they are emitted like any other cell.
pub fn generate(mesh: &mut Mesh, r: f32, center: Point3<f32>) {
    let end_u = PI * 2.0;
    let end_v = PI;
    let step_u = end_u / U_STEPS as f32;
    let step_v = end_v / V_STEPS as f32;

    for i in 0..U_STEPS {
        for j in 0..V_STEPS {
            let u = i as f32 * step_u;
            let v = j as f32 * step_v;
            // Close the grid on the exact end angles.
            let un = if i + 1 == U_STEPS { end_u } else { (i + 1) as f32 * step_u };
            let vn = if j + 1 == V_STEPS { end_v } else { (j + 1) as f32 * step_v };

            let p0 = sphere_point(r, u, v);
            let p1 = sphere_point(r, u, vn);
            let p2 = sphere_point(r, un, v);
            let p3 = sphere_point(r, un, vn);
            sphere_triangle(mesh, r, [p0, p2, p1], &center);
            sphere_triangle(mesh, r, [p3, p1, p2], &center);
        }
    }

    mesh.make_edges();
}

impl Mesh {
    /// Create a mesh holding a single sphere.
    pub fn sphere(r: f32, center: Point3<f32>) -> Self {
        let mut mesh = Mesh::with_capacity(U_STEPS * V_STEPS * 2);
        generate(&mut mesh, r, center);
        mesh
    }
}

/// Eight spheres of radius 5 on the corners of a cube with edge 10.
///
/// Bit 0 of the index selects x, bit 1 y and bit 2 z. The spheres keep the
/// default color; [`Scene::load_demo_spheres`](crate::scene::Scene::load_demo_spheres)
/// paints them.
pub fn demo_spheres() -> Vec<Mesh> {
    (0..8u8)
        .map(|i| {
            let c = Point3::new(
                f32::from(i & 1) * 10.0,
                f32::from((i & 2) >> 1) * 10.0,
                f32::from((i & 4) >> 2) * 10.0,
            );
            Mesh::sphere(5.0, c)
        })
        .collect()
}
