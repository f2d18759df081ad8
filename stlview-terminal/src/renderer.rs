//! ASCII rasterizer for terminal rendering

use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Vector3};
use std::io::Write;
use stlview_core::{Camera, Color as MeshColor, Mesh};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Pulls wireframe lines in front of the faces they border.
const EDGE_DEPTH_BIAS: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    color: Color,
}

const EMPTY: Cell = Cell {
    character: ' ',
    color: Color::Reset,
};

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![EMPTY; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(EMPTY);
    }

    /// Screen position of every vertex, `None` for those outside the view.
    fn project(&self, mesh: &Mesh, model_view: &Matrix4<f32>, camera: &Camera) -> Vec<Option<(f32, f32, f32)>> {
        mesh.vertices()
            .iter()
            .map(|p| camera.project_to_screen(p, model_view, self.width as u32, self.height as u32))
            .collect()
    }

    /// Fill the mesh's triangles, shaded by their view-space facing.
    pub fn render_mesh(&mut self, mesh: &Mesh, model_view: &Matrix4<f32>, camera: &Camera) {
        let screen = self.project(mesh, model_view, camera);
        let light_dir = Vector3::new(0.0, 0.0, 1.0);

        for (i, idx) in mesh.triangles().chunks_exact(3).enumerate() {
            let (Some(a), Some(b), Some(c)) = (
                screen[idx[0] as usize],
                screen[idx[1] as usize],
                screen[idx[2] as usize],
            ) else {
                continue; // Triangle is clipped
            };

            let Some(normal) = mesh.triangle(i).calculate_normal() else {
                continue;
            };
            let view_normal = model_view.transform_vector(&normal);
            let brightness = if view_normal.norm() > 0.0 {
                view_normal.normalize().dot(&light_dir).max(0.0)
            } else {
                0.0
            };

            let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
            let cell = Cell {
                character: LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)],
                color: shade(mesh.color, brightness),
            };
            self.rasterize_triangle([a, b, c], cell);
        }
    }

    /// Draw the mesh's unique edges as lines.
    pub fn render_wireframe(&mut self, mesh: &Mesh, model_view: &Matrix4<f32>, camera: &Camera) {
        let screen = self.project(mesh, model_view, camera);
        let color = shade(mesh.color, 1.0);

        for &[a, b] in mesh.edges() {
            if let (Some(p0), Some(p1)) = (screen[a as usize], screen[b as usize]) {
                self.rasterize_line(p0, p1, color);
            }
        }
    }

    fn rasterize_triangle(&mut self, coords: [(f32, f32, f32); 3], cell: Cell) {
        let [v0, v1, v2] = coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py)) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x, y, depth, cell);
                    }
                }
            }
        }
    }

    /// Bresenham line between two projected points.
    fn rasterize_line(&mut self, p0: (f32, f32, f32), p1: (f32, f32, f32), color: Color) {
        let (x0, y0) = (p0.0.floor() as i32, p0.1.floor() as i32);
        let (x1, y1) = (p1.0.floor() as i32, p1.1.floor() as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };

        let character = line_char(x1 - x0, y1 - y0);
        let steps = dx.max(-dy).max(1) as f32;

        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;
        let mut step = 0.0;
        loop {
            let depth = p0.2 + (p1.2 - p0.2) * (step / steps) - EDGE_DEPTH_BIAS;
            self.plot(x, y, depth, Cell { character, color });
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            step += 1.0;
        }
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, cell: Cell) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.cells[idx] = cell;
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(MoveTo(0, y as u16))?;
            for cell in &self.cells[y * self.width..(y + 1) * self.width] {
                writer.queue(SetForegroundColor(cell.color))?;
                writer.queue(Print(cell.character))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    #[cfg(test)]
    fn char_at(&self, x: usize, y: usize) -> char {
        self.cells[y * self.width + x].character
    }
}

/// Mesh color darkened by `brightness`, with a floor so unlit faces stay
/// visible.
fn shade(color: MeshColor, brightness: f32) -> Color {
    let k = 0.3 + 0.7 * brightness.clamp(0.0, 1.0);
    let channel = |c: f32| (c * k * 255.0).round().clamp(0.0, 255.0) as u8;
    Color::Rgb {
        r: channel(color.r),
        g: channel(color.g),
        b: channel(color.b),
    }
}

fn line_char(dx: i32, dy: i32) -> char {
    // Rows are about twice as tall as columns.
    let (ax, ay) = (dx.abs(), dy.abs() * 2);
    if ay * 2 < ax {
        '-'
    } else if ax * 2 < ay {
        '|'
    } else if (dx > 0) == (dy > 0) {
        '\\'
    } else {
        '/'
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: (f32, f32), v1: (f32, f32), v2: (f32, f32), p: (f32, f32)) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
