//! Glitch pulse: a short post-processing spike fired at the end of each
//! travel cycle, decaying exponentially afterwards.

use glyphrain_core::math::damp;

/// Decaying glitch intensity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlitchPulse {
    intensity: f32,
    decay_rate: f32,
    kicks: u64,
}

impl GlitchPulse {
    /// Intensity below which the pulse snaps to zero.
    pub const REST_THRESHOLD: f32 = 1e-4;

    /// A resting pulse.
    #[must_use]
    pub const fn new(decay_rate: f32) -> Self {
        Self {
            intensity: 0.0,
            decay_rate,
            kicks: 0,
        }
    }

    /// Raises the intensity to `strength` (never lowers a stronger pulse).
    pub fn kick(&mut self, strength: f32) {
        self.intensity = self.intensity.max(strength.max(0.0));
        self.kicks += 1;
    }

    /// Decays toward zero: `damp(intensity, 0, decay_rate, dt)`.
    pub fn decay(&mut self, dt: f32) {
        self.intensity = damp(self.intensity, 0.0, self.decay_rate, dt);
        if self.intensity < Self::REST_THRESHOLD {
            self.intensity = 0.0;
        }
    }

    /// Current intensity.
    #[inline]
    #[must_use]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Number of kicks received.
    #[inline]
    #[must_use]
    pub fn kicks(&self) -> u64 {
        self.kicks
    }

    /// Changes the decay rate, keeping the current intensity.
    pub fn set_decay_rate(&mut self, decay_rate: f32) {
        self.decay_rate = decay_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kick_then_decay() {
        let mut pulse = GlitchPulse::new(3.5);
        assert_eq!(pulse.intensity(), 0.0);
        pulse.kick(1.0);
        assert_eq!(pulse.intensity(), 1.0);
        pulse.decay(0.1);
        let after = pulse.intensity();
        assert!(after < 1.0 && after > 0.0);
        assert!((after - (-0.35_f32).exp()).abs() < 1e-5);
        for _ in 0..600 {
            pulse.decay(1.0 / 60.0);
        }
        assert_eq!(pulse.intensity(), 0.0);
        assert_eq!(pulse.kicks(), 1);
    }

    #[test]
    fn test_weaker_kick_does_not_lower() {
        let mut pulse = GlitchPulse::new(1.0);
        pulse.kick(0.8);
        pulse.kick(0.2);
        assert_eq!(pulse.intensity(), 0.8);
        assert_eq!(pulse.kicks(), 2);
    }

    #[test]
    fn test_decay_is_frame_rate_independent() {
        let mut coarse = GlitchPulse::new(2.0);
        let mut fine = GlitchPulse::new(2.0);
        coarse.kick(1.0);
        fine.kick(1.0);
        coarse.decay(0.5);
        for _ in 0..50 {
            fine.decay(0.01);
        }
        assert!((coarse.intensity() - fine.intensity()).abs() < 1e-4);
    }
}
