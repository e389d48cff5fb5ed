//! # Event Countdowns
//!
//! Stochastic events fire through exponential-interval countdowns instead of
//! per-frame probability checks. A countdown holds the time left until its
//! next firing; on firing it redraws from `Exp(rate)`. The resulting event
//! stream is a Poisson process whose statistics do not depend on frame rate.

use glyphrain_core::SimRng;

/// Upper bound on firings reported by a single `advance`.
///
/// Only reachable with very high rates and clamped `dt`; excess firings are
/// dropped rather than looping.
pub const MAX_FIRES_PER_TICK: u32 = 32;

/// Countdown to the next occurrence of a Poisson event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoissonTimer {
    rate: f32,
    remaining: f32,
}

impl PoissonTimer {
    /// Creates a countdown with a freshly drawn interval.
    ///
    /// A rate of zero (or less) never fires.
    pub fn new(rate: f32, rng: &mut SimRng) -> Self {
        Self {
            rate,
            remaining: rng.exponential(rate),
        }
    }

    /// Events per second.
    #[inline]
    #[must_use]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Seconds until the next firing.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Redraws the countdown, discarding the time already waited.
    pub fn reset(&mut self, rng: &mut SimRng) {
        self.remaining = rng.exponential(self.rate);
    }

    /// Counts down by `dt` and returns how many times the event fired.
    ///
    /// Each firing redraws the countdown, so several events can land in one
    /// long tick.
    pub fn advance(&mut self, dt: f32, rng: &mut SimRng) -> u32 {
        self.remaining -= dt;
        let mut fired = 0;
        while self.remaining <= 0.0 {
            fired += 1;
            if fired >= MAX_FIRES_PER_TICK {
                self.reset(rng);
                break;
            }
            self.remaining += rng.exponential(self.rate);
        }
        fired
    }

    /// Counts down by `dt` and reports whether the event fired at least once.
    ///
    /// Used for events that cannot overlap: extra firings inside one tick
    /// collapse into one.
    pub fn advance_once(&mut self, dt: f32, rng: &mut SimRng) -> bool {
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.reset(rng);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphrain_core::RainSeed;

    #[test]
    fn test_zero_rate_never_fires() {
        let mut rng = SimRng::from_seed(RainSeed::new(1));
        let mut timer = PoissonTimer::new(0.0, &mut rng);
        for _ in 0..10_000 {
            assert_eq!(timer.advance(0.1, &mut rng), 0);
            assert!(!timer.advance_once(0.1, &mut rng));
        }
    }

    #[test]
    fn test_firing_count_matches_rate() {
        // 10 events/s over 1000 simulated seconds.
        let mut rng = SimRng::from_seed(RainSeed::new(2));
        let mut timer = PoissonTimer::new(10.0, &mut rng);
        let fired: u32 = (0..60_000).map(|_| timer.advance(1.0 / 60.0, &mut rng)).sum();
        let expected = 10_000.0;
        let error = (f64::from(fired) - expected).abs() / expected;
        assert!(error < 0.05, "fired {fired}");
    }

    #[test]
    fn test_firing_count_is_frame_rate_independent() {
        let count = |dt: f32, steps: u32| {
            let mut rng = SimRng::from_seed(RainSeed::new(3));
            let mut timer = PoissonTimer::new(4.0, &mut rng);
            (0..steps).map(|_| timer.advance(dt, &mut rng)).sum::<u32>()
        };
        let slow = f64::from(count(0.1, 25_000));
        let fast = f64::from(count(1.0 / 144.0, 360_000));
        assert!((slow - fast).abs() / slow < 0.08, "slow {slow} fast {fast}");
    }

    #[test]
    fn test_advance_is_bounded() {
        let mut rng = SimRng::from_seed(RainSeed::new(4));
        let mut timer = PoissonTimer::new(1_000.0, &mut rng);
        assert!(timer.advance(10.0, &mut rng) <= MAX_FIRES_PER_TICK);
        assert!(timer.remaining() > 0.0);
    }
}
