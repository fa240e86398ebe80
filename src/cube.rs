//! Cube orientation and drag-driven rotation

use nalgebra::{Matrix3, Vector3};
use std::f32::consts::PI;

use crate::DRAG_SENSITIVITY;

/// One of the cube's three local axes, used to name the face a ray entered through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    X,
    Y,
    Z,
}

impl Face {
    pub const ALL: [Face; 3] = [Face::X, Face::Y, Face::Z];

    pub fn index(self) -> usize {
        match self {
            Face::X => 0,
            Face::Y => 1,
            Face::Z => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Face> {
        Face::ALL.get(index).copied()
    }
}

/// The cube's local axes expressed in world space
///
/// The three vectors always form a rotation matrix: they start out as the world
/// axes and are only ever changed by [`Orientation::apply`] with a rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    axes: [Vector3<f32>; 3],
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Orientation {
    pub fn identity() -> Self {
        Self {
            axes: [Vector3::x(), Vector3::y(), Vector3::z()],
        }
    }

    pub fn axes(&self) -> &[Vector3<f32>; 3] {
        &self.axes
    }

    pub fn axis(&self, face: Face) -> Vector3<f32> {
        self.axes[face.index()]
    }

    /// Rotate by a drag of `(dx, dy)` screen cells; a zero drag leaves it untouched
    pub fn spin(&mut self, dx: f32, dy: f32) {
        if let Some(rotation) = drag_rotation(dx, dy) {
            self.apply(&rotation);
        }
    }

    /// Left-multiply every axis by `rotation`
    pub fn apply(&mut self, rotation: &Matrix3<f32>) {
        for axis in &mut self.axes {
            *axis = rotation * *axis;
        }
    }

    /// Seed for per-frame dithering, derived from the matrix diagonal
    pub fn dither_seed(&self) -> u64 {
        let mix = self.axes[0].x * 10237.0 + self.axes[1].y * 126.0 + self.axes[2].z * 1236876.0;
        mix as i64 as u64
    }
}

/// Rotation for a 2D drag, or `None` for a zero-length drag
///
/// The drag direction picks an axis in the screen plane and the drag length maps
/// linearly to the angle, [`DRAG_SENSITIVITY`] cells per half turn.
pub fn drag_rotation(dx: f32, dy: f32) -> Option<Matrix3<f32>> {
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return None;
    }

    let cos_theta = dy / len;
    let sin_theta = -dx / len;
    let phi = len / DRAG_SENSITIVITY * PI;
    let (sin_phi, cos_phi) = phi.sin_cos();
    let versine = 1.0 - cos_phi;

    Some(Matrix3::new(
        1.0 - versine * sin_theta * sin_theta,
        versine * sin_theta * cos_theta,
        -sin_phi * sin_theta,
        versine * sin_theta * cos_theta,
        1.0 - versine * cos_theta * cos_theta,
        sin_phi * cos_theta,
        sin_phi * sin_theta,
        -sin_phi * cos_theta,
        cos_phi,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(orientation: &Orientation) {
        let axes = orientation.axes();
        for i in 0..3 {
            assert!((axes[i].norm() - 1.0).abs() < 1e-3, "axis {} not unit: {}", i, axes[i].norm());
            for j in (i + 1)..3 {
                let d = axes[i].dot(&axes[j]);
                assert!(d.abs() < 1e-3, "axes {} and {} not orthogonal: {}", i, j, d);
            }
        }
    }

    #[test]
    fn test_identity_axes() {
        let orientation = Orientation::identity();
        assert_eq!(orientation.axis(Face::X), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(orientation.axis(Face::Y), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(orientation.axis(Face::Z), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_zero_spin_is_noop() {
        let mut orientation = Orientation::identity();
        orientation.spin(7.0, -3.0);
        let before = orientation;
        orientation.spin(0.0, 0.0);
        assert_eq!(orientation, before);
        assert!(drag_rotation(0.0, 0.0).is_none());
    }

    #[test]
    fn test_drag_rotation_is_proper_rotation() {
        for &(dx, dy) in &[(1.0, 0.0), (0.0, 1.0), (-4.0, 2.5), (30.0, -80.0)] {
            let r = drag_rotation(dx, dy).unwrap();
            let should_be_identity = r * r.transpose();
            assert!((should_be_identity - Matrix3::identity()).norm() < 1e-5);
            assert!((r.determinant() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_stays_orthonormal_after_many_spins() {
        let mut orientation = Orientation::identity();
        for step in 0..500 {
            let t = step as f32 * 0.37;
            orientation.spin(t.sin() * 6.0, t.cos() * 3.0 + 1.0);
        }
        assert_orthonormal(&orientation);
    }

    #[test]
    fn test_half_turn_drag() {
        // A horizontal drag of DRAG_SENSITIVITY cells turns the view axis around
        let mut orientation = Orientation::identity();
        orientation.spin(0.0, DRAG_SENSITIVITY);
        let z = orientation.axis(Face::Z);
        assert!((z.z + 1.0).abs() < 1e-4);
        let x = orientation.axis(Face::X);
        assert!((x.x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_spins_compose() {
        let mut split = Orientation::identity();
        split.spin(0.0, 5.0);
        split.spin(0.0, 5.0);

        let mut whole = Orientation::identity();
        whole.spin(0.0, 10.0);

        for face in Face::ALL {
            assert!((split.axis(face) - whole.axis(face)).norm() < 1e-5);
        }
    }

    #[test]
    fn test_face_index_round_trip() {
        for face in Face::ALL {
            assert_eq!(Face::from_index(face.index()), Some(face));
        }
        assert_eq!(Face::from_index(3), None);
    }

    #[test]
    fn test_dither_seed_depends_on_pose() {
        let identity = Orientation::identity();
        assert_eq!(identity.dither_seed(), 10237 + 126 + 1236876);

        let mut turned = identity;
        turned.spin(3.0, 4.0);
        assert_ne!(turned.dither_seed(), identity.dither_seed());
    }
}
