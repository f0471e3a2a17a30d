//! Math utilities and types
//!
//! Provides fundamental math types for 3D collision geometry.

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (used for RGBA colors)
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Squared magnitudes below this are treated as zero-length
pub const NORMALIZE_EPSILON: f32 = 1.0e-12;

/// Direction substituted when a vector is too short to normalize
pub const FALLBACK_NORMAL: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Normalize `v`, or return `fallback` when `v` is (nearly) zero-length
pub fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    let len_sq = v.magnitude_squared();
    if len_sq > NORMALIZE_EPSILON {
        v / len_sq.sqrt()
    } else {
        fallback
    }
}

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Replace the scale (builder style)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rotate a direction by this transform's rotation (scale ignored)
    pub fn rotate_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }
}

/// Math utility functions
pub mod utils {
    use super::{Quat, Vec3};

    /// Rotation taking local +Z onto `direction`
    ///
    /// Handles the antiparallel case, where `rotation_between` has no unique answer.
    pub fn rotation_from_z(direction: Vec3) -> Quat {
        let z = Vec3::z();
        Quat::rotation_between(&z, &direction).unwrap_or_else(|| {
            if direction.dot(&z) < 0.0 {
                Quat::from_axis_angle(&Vec3::x_axis(), std::f32::consts::PI)
            } else {
                Quat::identity()
            }
        })
    }
}
