//! 3D transformation utilities

use crate::point::{Point3f, Vector3f};
use nalgebra::{Matrix4, Unit, UnitQuaternion};

/// A 3D transformation that can be applied to points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform3D {
    pub matrix: Matrix4<f32>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a rotation transformation from a quaternion
    pub fn rotation(rotation: UnitQuaternion<f32>) -> Self {
        Self {
            matrix: rotation.to_homogeneous(),
        }
    }

    /// Rotation of `degrees` about `axis`, counter-clockwise when looking
    /// down the axis towards the origin. The axis need not be normalized.
    pub fn rotation_degrees(axis: Vector3f, degrees: f32) -> Self {
        match Unit::try_new(axis, f32::EPSILON) {
            Some(axis) => {
                Self::rotation(UnitQuaternion::from_axis_angle(&axis, degrees.to_radians()))
            }
            None => Self::identity(),
        }
    }

    /// Create a uniform scaling transformation
    pub fn uniform_scaling(scale: f32) -> Self {
        Self {
            matrix: Matrix4::new_scaling(scale),
        }
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3f) -> Point3f {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3f::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Compose this transformation with another; `other` is applied first
    pub fn compose(self, other: Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Transform3D {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(rhs)
    }
}

impl From<Transform3D> for Matrix4<f32> {
    fn from(transform: Transform3D) -> Self {
        transform.matrix
    }
}
