//! Scalar and vector helpers used by every stage of the field.
//!
//! Everything here is `f32`, branch-light and allocation-free.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 3D Vector - particle positions, glyph anchors.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component (depth, larger is closer to the observer)
    pub z: f32,
}

impl Vec3 {
    /// Creates a new Vec3
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Creates from array
    #[must_use]
    pub const fn from_array(arr: [f32; 3]) -> Self {
        Self::new(arr[0], arr[1], arr[2])
    }
}

impl std::ops::Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Linear interpolation between `a` and `b`.
#[inline]
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Clamps to `[0, 1]`. NaN maps to 0.
#[inline]
#[must_use]
pub fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Cubic smoothstep on an already normalized input: `t * t * (3 - 2t)`.
#[inline]
#[must_use]
pub fn smooth01(t: f32) -> f32 {
    let t = clamp01(t);
    t * t * (3.0 - 2.0 * t)
}

/// Frame-rate independent exponential approach of `current` toward `target`.
///
/// `lambda` is the approach rate per second. The result is identical whether
/// the same span of time is covered in one tick or many.
#[inline]
#[must_use]
pub fn damp(current: f32, target: f32, lambda: f32, dt: f32) -> f32 {
    lerp(current, target, 1.0 - (-lambda * dt).exp())
}

/// Wraps a hue angle into `[0, 360)`.
#[inline]
#[must_use]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth01_endpoints() {
        assert_eq!(smooth01(0.0), 0.0);
        assert_eq!(smooth01(1.0), 1.0);
        assert_eq!(smooth01(0.5), 0.5);
        assert_eq!(smooth01(-3.0), 0.0);
        assert_eq!(smooth01(7.0), 1.0);
    }

    #[test]
    fn test_damp_is_step_independent() {
        let one_step = damp(0.0, 1.0, 6.0, 0.5);
        let mut many = 0.0;
        for _ in 0..50 {
            many = damp(many, 1.0, 6.0, 0.01);
        }
        assert!((one_step - many).abs() < 1e-4, "{one_step} vs {many}");
    }

    #[test]
    fn test_damp_at_target_stays_put() {
        assert_eq!(damp(1.0, 1.0, 6.0, 0.016), 1.0);
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(-10.0), 350.0);
        assert!(wrap_degrees(-1e-9) < 360.0);
    }

    #[test]
    fn test_vec3_operations() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::from_array([4.0, 5.0, 6.0]);
        assert_eq!((a + b).to_array(), [5.0, 7.0, 9.0]);
        assert_eq!((a * 2.0).to_array(), [2.0, 4.0, 6.0]);
    }
}
