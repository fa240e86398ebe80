//! Orthographic ray caster for the oriented cube
//!
//! Every terminal cell shoots one ray along the view axis. Rays that enter the cube
//! are shaded from the entry face's normal and the light direction, and the
//! resulting brightness is quantized onto [`BRIGHTNESS_RAMP`](crate::BRIGHTNESS_RAMP).

use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

use crate::cube::{Face, Orientation};
use crate::{AMBIENT, BASE_LIGHTNESS, BRIGHTNESS_RAMP, MIN_LIGHT_MAGNITUDE};

/// Half the cube's edge length
pub const EXTENT: f32 = 0.5;

/// Slabs whose normal is closer than this to perpendicular with the ray count as parallel
pub const PARALLEL_EPSILON: f32 = 1e-6;

/// Largest brightness kept after clamping
const MAX_BRIGHTNESS: f32 = 0.999;

/// Frames with more cells than this are refused instead of allocated
pub const MAX_FRAME_CELLS: usize = 1 << 24;

/// A ray in 3D space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    /// Ray cast from screen position `(x, y)` straight into the scene
    pub fn orthographic(x: f32, y: f32) -> Self {
        Self::new(Point3::new(x, y, 0.0), Vector3::new(0.0, 0.0, -1.0))
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// One full screen of glyphs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    rows: usize,
    cols: usize,
    cells: Vec<char>,
}

impl Frame {
    pub fn empty() -> Self {
        Self::blank(0, 0)
    }

    pub fn blank(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![' '; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<char> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.cells[row * self.cols + col])
    }

    fn set(&mut self, row: usize, col: usize, ch: char) {
        self.cells[row * self.cols + col] = ch;
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .chunks(self.cols.max(1))
            .take(self.rows)
            .map(|row| row.iter().collect())
    }

    /// Rows joined with newlines, each row terminated
    pub fn to_ascii(&self) -> String {
        let mut result = String::with_capacity(self.rows * (self.cols + 1));
        for line in self.lines() {
            result.push_str(&line);
            result.push('\n');
        }
        result
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}

/// Index into the ramp for a raw brightness value
pub fn glyph_index(brightness: f32) -> usize {
    let levels = BRIGHTNESS_RAMP.len();
    // NaN falls through both comparisons and lands on the darkest glyph
    let clamped = if brightness >= 1.0 {
        MAX_BRIGHTNESS
    } else if brightness > 0.0 {
        brightness
    } else {
        0.0
    };
    ((clamped * levels as f32) as usize).min(levels - 1)
}

pub fn glyph_for(brightness: f32) -> char {
    BRIGHTNESS_RAMP.as_bytes()[glyph_index(brightness)] as char
}

/// The cube renderer: orientation plus light direction
#[derive(Debug, Clone)]
pub struct Renderer {
    orientation: Orientation,
    light: Vector3<f32>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            orientation: Orientation::identity(),
            light: Vector3::y(),
        }
    }

    /// Renderer with an initial light direction; falls back to the default light
    /// when `light` is too short to normalize
    pub fn with_light(light: Vector3<f32>) -> Self {
        let mut renderer = Self::new();
        renderer.set_light(light);
        renderer
    }

    pub fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    pub fn light(&self) -> Vector3<f32> {
        self.light
    }

    /// Apply a drag of `(dx, dy)` to the current orientation
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.orientation.spin(dx, dy);
        tracing::trace!(dx, dy, "Applied spin");
    }

    /// Point the light along `light`. Returns false and keeps the old light when
    /// the vector is too short.
    pub fn set_light(&mut self, light: Vector3<f32>) -> bool {
        let len = light.norm();
        if !(len > MIN_LIGHT_MAGNITUDE) {
            tracing::debug!(magnitude = len, "Ignoring degenerate light vector");
            return false;
        }
        self.light = light / len;
        true
    }

    /// Back to the unrotated pose; the light is kept
    pub fn reset(&mut self) {
        self.orientation = Orientation::identity();
    }

    /// Face through which the ray at screen position `(x, y)` enters the cube
    ///
    /// Slab test against the three oriented axes: each pair of opposite faces
    /// narrows the `[t_entry, t_exit]` interval, and the slab that pushed
    /// `t_entry` furthest is the one the ray came in through.
    pub fn is_hit(&self, x: f32, y: f32) -> Option<Face> {
        let ray = Ray::orthographic(x, y);
        let origin = ray.origin.coords;

        let mut t_entry = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut entry_face = None;

        for face in Face::ALL {
            let axis = self.orientation.axis(face);
            let denom = ray.direction.dot(&axis);
            let nom = origin.dot(&axis);

            if denom.abs() < PARALLEL_EPSILON {
                if -nom - EXTENT > 0.0 || -nom + EXTENT < 0.0 {
                    return None;
                }
                continue;
            }

            let t1 = (EXTENT - nom) / denom;
            let t2 = (-EXTENT - nom) / denom;
            let near = t1.min(t2);
            let far = t1.max(t2);

            if near > t_entry {
                t_entry = near;
                entry_face = Some(face);
            }
            if far < t_exit {
                t_exit = far;
            }
        }

        if t_entry >= t_exit {
            return None;
        }
        entry_face
    }

    /// Brightness of `face` before quantization; `noise` is uniform in `[0, 1)`
    pub fn brightness(&self, face: Face, noise: f32) -> f32 {
        let mut normal = self.orientation.axis(face);
        if normal.z < 0.0 {
            normal = -normal;
        }
        let levels = BRIGHTNESS_RAMP.len() as f32;
        let dither = (noise - 0.5) / levels;
        BASE_LIGHTNESS[face.index()] * (self.light.dot(&normal) + AMBIENT) + dither
    }

    pub fn shade(&self, face: Face, noise: f32) -> char {
        glyph_for(self.brightness(face, noise))
    }

    /// Render a `rows` x `cols` frame. Negative sizes, and sizes above
    /// [`MAX_FRAME_CELLS`], produce an empty frame.
    pub fn render(&self, rows: i32, cols: i32) -> Frame {
        if rows < 0 || cols < 0 {
            tracing::debug!(rows, cols, "Refusing to render negative frame size");
            return Frame::empty();
        }
        let too_large = (rows as usize)
            .checked_mul(cols as usize)
            .map_or(true, |cells| cells > MAX_FRAME_CELLS);
        if too_large {
            tracing::debug!(rows, cols, "Refusing to render oversized frame");
            return Frame::empty();
        }
        let (rows, cols) = (rows as usize, cols as usize);
        let mut frame = Frame::blank(rows, cols);
        if frame.is_empty() {
            return frame;
        }

        let step = 2.0 / rows.min(cols) as f32;
        let half_rows = rows as f32 / 2.0;
        let half_cols = cols as f32 / 2.0;

        // Same pose, same dither
        let mut rng = StdRng::seed_from_u64(self.orientation.dither_seed());

        for i in 0..rows {
            let x = step * (i as f32 + 0.5 - half_rows);
            for j in 0..cols {
                // Cells are about twice as tall as they are wide
                let y = step * (j as f32 + 0.5 - half_cols) / 2.0;
                if let Some(face) = self.is_hit(x, y) {
                    let noise: f32 = rng.random();
                    frame.set(i, j, self.shade(face, noise));
                }
            }
        }

        frame
    }
}
