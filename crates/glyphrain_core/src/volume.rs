//! # Viewing Volume
//!
//! The axis-aligned box that contains the whole field. Streams fall from `top`
//! to `bottom`, lanes partition `[-half_width, half_width]`, depth runs from
//! `far` to `near` (`near` is closer to the observer).
//!
//! The volume is recomputed by the host whenever the viewport changes and is
//! read-only to every stage during a frame.

use serde::{Deserialize, Serialize};

use crate::config::VolumeConfig;
use crate::math::{clamp01, smooth01, Vec3};

/// Host viewport in pixels (only the aspect ratio matters).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Creates a viewport.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height, or 0 for an empty viewport.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 && self.width.is_finite() && self.height.is_finite() {
            self.width / self.height
        } else {
            0.0
        }
    }
}

/// The rectangular box that contains the field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewingVolume {
    /// Half of the horizontal extent; lanes live in `[-half_width, half_width]`.
    pub half_width: f32,
    /// Upper bound of the fall.
    pub top: f32,
    /// Lower bound of the fall.
    pub bottom: f32,
    /// Depth plane closest to the observer.
    pub near: f32,
    /// Depth plane farthest from the observer.
    pub far: f32,
}

impl ViewingVolume {
    /// Creates a volume from explicit bounds.
    #[must_use]
    pub const fn new(half_width: f32, top: f32, bottom: f32, near: f32, far: f32) -> Self {
        Self {
            half_width,
            top,
            bottom,
            near,
            far,
        }
    }

    /// Computes the volume visible from a perspective camera.
    ///
    /// The visible height at depth `z` is `2 * (camera_z - z) * tan(fov / 2)`;
    /// the box takes the larger of the near and far extents so streams at any
    /// depth cover the screen, then adds `overhang` on every side.
    #[must_use]
    pub fn from_viewport(viewport: Viewport, config: &VolumeConfig) -> Self {
        let aspect = viewport.aspect();
        let half_fov = config.fov_y_deg.to_radians() * 0.5;
        let tan = half_fov.tan();

        let distance = (config.camera_z - config.near_z)
            .abs()
            .max((config.camera_z - config.far_z).abs());
        let height = 2.0 * distance * tan * (1.0 + config.overhang);
        let width = height * aspect;

        Self {
            half_width: width * 0.5,
            top: height * 0.5,
            bottom: -height * 0.5,
            near: config.near_z,
            far: config.far_z,
        }
    }

    /// True when the box cannot host a field (zero area, bad numbers).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let finite = self.half_width.is_finite()
            && self.top.is_finite()
            && self.bottom.is_finite()
            && self.near.is_finite()
            && self.far.is_finite();
        !finite || self.half_width <= 0.0 || self.top <= self.bottom || self.near == self.far
    }

    /// Full horizontal extent.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f32 {
        self.half_width * 2.0
    }

    /// Full vertical extent.
    #[inline]
    #[must_use]
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Lower and upper depth bound, in ascending order.
    #[inline]
    #[must_use]
    pub fn depth_bounds(&self) -> (f32, f32) {
        (self.near.min(self.far), self.near.max(self.far))
    }

    /// Normalized, smoothed depth: 0 at `near`, 1 at `far`.
    #[inline]
    #[must_use]
    pub fn depth_factor(&self, z: f32) -> f32 {
        let span = self.far - self.near;
        if span == 0.0 {
            return 0.0;
        }
        smooth01(clamp01((z - self.near) / span))
    }

    /// True if the point lies inside the box (bounds inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        let (z_lo, z_hi) = self.depth_bounds();
        point.x.abs() <= self.half_width
            && point.y >= self.bottom
            && point.y <= self.top
            && point.z >= z_lo
            && point.z <= z_hi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> VolumeConfig {
        VolumeConfig {
            fov_y_deg: 90.0,
            camera_z: 2.0,
            near_z: -6.0,
            far_z: -28.0,
            overhang: 0.0,
        }
    }

    #[test]
    fn test_from_viewport_uses_far_extent() {
        let volume = ViewingVolume::from_viewport(Viewport::new(200.0, 100.0), &config());
        // distance 30, tan(45deg) = 1 -> height 60, width 120
        assert!((volume.top - 30.0).abs() < 1e-3);
        assert!((volume.bottom + 30.0).abs() < 1e-3);
        assert!((volume.half_width - 60.0).abs() < 1e-3);
        assert_eq!(volume.near, -6.0);
        assert_eq!(volume.far, -28.0);
        assert!(!volume.is_degenerate());
    }

    #[test]
    fn test_empty_viewport_is_degenerate() {
        let volume = ViewingVolume::from_viewport(Viewport::new(0.0, 0.0), &config());
        assert!(volume.is_degenerate());
        let volume = ViewingVolume::from_viewport(Viewport::new(800.0, 0.0), &config());
        assert!(volume.is_degenerate());
    }

    #[test]
    fn test_depth_factor_orientation() {
        let volume = ViewingVolume::new(10.0, 5.0, -5.0, -6.0, -28.0);
        assert_eq!(volume.depth_factor(-6.0), 0.0);
        assert_eq!(volume.depth_factor(-28.0), 1.0);
        assert_eq!(volume.depth_factor(-17.0), 0.5);
        assert_eq!(volume.depth_factor(100.0), 0.0);
    }

    #[test]
    fn test_contains() {
        let volume = ViewingVolume::new(10.0, 5.0, -5.0, -6.0, -28.0);
        assert!(volume.contains(Vec3::new(0.0, 0.0, -10.0)));
        assert!(!volume.contains(Vec3::new(11.0, 0.0, -10.0)));
        assert!(!volume.contains(Vec3::new(0.0, 0.0, -2.0)));
    }

    #[test]
    fn test_nan_is_degenerate() {
        let volume = ViewingVolume::new(f32::NAN, 5.0, -5.0, -6.0, -28.0);
        assert!(volume.is_degenerate());
    }
}
