//! # Travel Loop
//!
//! A scripted camera move that repeats forever. Each cycle eases a few
//! parameters from their start to their travel-end values; when a cycle
//! completes, the loop calls back into a collaborator (the glitch pulse) and
//! starts over. The callback is the only coupling between the loop and the
//! rest of the field.

use glyphrain_core::math::lerp;
use glyphrain_core::{Easing, TravelConfig};
use tracing::debug;

/// Parameters the host applies to its camera and post-processing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TravelPose {
    /// Camera depth.
    pub camera_z: f32,
    /// Vertical field of view in degrees.
    pub fov_deg: f32,
    /// Bloom strength.
    pub bloom: f32,
}

/// The repeating travel cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct TravelLoop {
    duration: f32,
    easing: Easing,
    start: TravelPose,
    end: TravelPose,
    progress: f32,
    cycles: u64,
}

impl TravelLoop {
    /// Creates a loop at the start of its first cycle.
    #[must_use]
    pub fn new(config: &TravelConfig) -> Self {
        Self {
            duration: config.duration.max(f32::EPSILON),
            easing: config.easing,
            start: TravelPose {
                camera_z: config.start_camera_z,
                fov_deg: config.start_fov_deg,
                bloom: config.start_bloom,
            },
            end: TravelPose {
                camera_z: config.end_camera_z,
                fov_deg: config.end_fov_deg,
                bloom: config.end_bloom,
            },
            progress: 0.0,
            cycles: 0,
        }
    }

    /// Advances the loop; calls `on_cycle_end(cycle)` for each completed cycle.
    ///
    /// The callback runs synchronously, before this method returns.
    pub fn advance(&mut self, dt: f32, mut on_cycle_end: impl FnMut(u64)) {
        self.progress += dt / self.duration;
        while self.progress >= 1.0 {
            self.progress -= 1.0;
            self.cycles += 1;
            debug!(cycle = self.cycles, "travel cycle complete");
            on_cycle_end(self.cycles);
        }
    }

    /// Progress through the current cycle, `[0, 1)`.
    #[inline]
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Completed cycles.
    #[inline]
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Current eased pose.
    #[must_use]
    pub fn pose(&self) -> TravelPose {
        let t = self.easing.apply(self.progress);
        TravelPose {
            camera_z: lerp(self.start.camera_z, self.end.camera_z, t),
            fov_deg: lerp(self.start.fov_deg, self.end.fov_deg, t),
            bloom: lerp(self.start.bloom, self.end.bloom, t),
        }
    }
}
