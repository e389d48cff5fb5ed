//! Easing curves for scripted loops.
//!
//! The travel loop defaults to a sharp exponential in-out: slow departure,
//! fast cruise, slow arrival.

use serde::{Deserialize, Serialize};

use crate::math::smooth01;

/// Shape of a travel cycle's progress curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Cubic smoothstep.
    SmoothStep,
    /// Exponential ease-in-out.
    #[default]
    ExponentialInOut,
}

impl Easing {
    /// Maps cycle progress `t` (clamped to `[0, 1]`) onto eased progress.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::SmoothStep => smooth01(t),
            Self::ExponentialInOut => exponential_in_out(t),
        }
    }
}

/// Symmetric `2^(20t - 10)` ramp, pinned to exact endpoints.
fn exponential_in_out(t: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    // Mirror the second half onto the first.
    let half = t.min(1.0 - t);
    let rise = 0.5 * (20.0 * half - 10.0).exp2();
    if t < 0.5 {
        rise
    } else {
        1.0 - rise
    }
}
