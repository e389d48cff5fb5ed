//! # Stream Simulator
//!
//! One falling column of glyphs. Each tick runs four steps in order:
//!
//! ```text
//! 1. FALL      ease speed multiplier, move head down
//! 2. SHIFT     every slot_step of distance rotates the ring one slot
//! 3. EVENTS    flicker / sparkle run / burst countdowns
//! 4. RECYCLE   whole tail below the volume -> respawn above it
//! ```
//!
//! Sub-machines are orthogonal and never terminal:
//! `flicker: waiting -> fire -> waiting`, `sparkle: idle -> running -> idle`,
//! `burst: idle -> active -> idle`, `stream: falling -> recycle -> falling`.
//!
//! A stream owns its random source; streams share no mutable state.

use glyphrain_core::config::MIN_TAIL;
use glyphrain_core::math::damp;
use glyphrain_core::{FixedRing, RainConfig, SimRng, Vec3, ViewingVolume};
use tracing::trace;

use crate::glyphs::GlyphId;
use crate::lanes::LaneSlot;
use crate::timer::PoissonTimer;

/// Explicit initial state of a stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamInit {
    /// Lane the stream belongs to.
    pub lane: LaneSlot,
    /// Horizontal position (inside the lane).
    pub x: f32,
    /// Depth, between the volume's far and near planes.
    pub depth: f32,
    /// Vertical position of the head slot.
    pub head_y: f32,
    /// Fall speed in units per second.
    pub fall_speed: f32,
    /// Glyph size.
    pub glyph_size: f32,
    /// Distance between adjacent slots.
    pub slot_step: f32,
    /// Number of slots (at least 2).
    pub tail_len: usize,
    /// Base opacity of the stream.
    pub base_opacity: f32,
    /// Hue offset of the stream in degrees.
    pub hue_jitter: f32,
}

/// A run of mutations sweeping down the tail from near the head.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SparkleRun {
    active: bool,
    start_index: usize,
    length: u32,
    progress: f32,
    last_step: Option<u32>,
}

impl SparkleRun {
    /// Starts a run for a tail of `tail_len` slots.
    ///
    /// `start_index = min(tail_len - 2, 1 + uniform{0, 1, 2})`,
    /// `length = clamp(round(uniform(avg - 1, avg + 2)), 3, 7)`.
    pub fn start(tail_len: usize, avg_length: f32, rng: &mut SimRng) -> Self {
        let start_index = (1 + rng.index(3)).min(tail_len.saturating_sub(2));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let length = rng
            .range(avg_length - 1.0, avg_length + 2.0)
            .round()
            .clamp(3.0, 7.0) as u32;
        Self {
            active: true,
            start_index,
            length,
            progress: 0.0,
            last_step: None,
        }
    }

    /// True while the run is sweeping.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// First slot of the run.
    #[inline]
    #[must_use]
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Run length in slots.
    #[inline]
    #[must_use]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Slots swept so far (fractional).
    #[inline]
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// True if `slot` is lit by the run: between the start and the front.
    #[must_use]
    pub fn covers(&self, slot: usize, tail_len: usize) -> bool {
        if !self.active || slot < self.start_index {
            return false;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let front = self.start_index + self.progress.max(0.0).floor() as usize;
        slot <= front.min(tail_len.saturating_sub(1))
    }

    /// Advances the run; returns the slot to mutate when the front crosses
    /// into a new step.
    fn advance(&mut self, dt: f32, speed: f32) -> Option<usize> {
        if !self.active {
            return None;
        }
        self.progress += speed * dt;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let step = self.progress.max(0.0).floor() as u32;
        let crossed = self.last_step != Some(step);
        self.last_step = Some(step);
        #[allow(clippy::cast_precision_loss)]
        let length = self.length as f32;
        if self.progress >= length {
            self.active = false;
        }
        crossed.then_some(self.start_index + step as usize)
    }
}

/// A short speed-up with extra glow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Burst {
    active: bool,
    elapsed: f32,
    duration: f32,
    speed_multiplier: f32,
}

impl Default for Burst {
    fn default() -> Self {
        Self::idle()
    }
}

impl Burst {
    /// An inactive burst.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            active: false,
            elapsed: 0.0,
            duration: 0.0,
            speed_multiplier: 1.0,
        }
    }

    /// Starts a burst. Ignored while one is already active.
    pub fn fire(&mut self, duration: f32, speed_multiplier: f32) -> bool {
        if self.active {
            return false;
        }
        *self = Self {
            active: true,
            elapsed: 0.0,
            duration: duration.max(0.0),
            speed_multiplier,
        };
        true
    }

    /// Advances an active burst; returns true on the tick it ends.
    ///
    /// `elapsed` is left at its final value, which is `>= duration`.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.active {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.active = false;
            return true;
        }
        false
    }

    /// True while bursting.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Seconds since the burst started.
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Burst length in seconds.
    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Speed multiplier the stream eases toward right now.
    #[inline]
    #[must_use]
    pub fn target_multiplier(&self) -> f32 {
        if self.active {
            self.speed_multiplier
        } else {
            1.0
        }
    }

    /// 1 at burst start, 0 at its end (and while idle).
    #[must_use]
    pub fn freshness(&self) -> f32 {
        if !self.active || self.duration <= 0.0 {
            return 0.0;
        }
        1.0 - (self.elapsed / self.duration).min(1.0)
    }
}

/// What happened to a stream during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStep {
    /// Slot shifts performed.
    pub shifts: u32,
    /// Flicker events fired.
    pub flickers: u32,
    /// A sparkle run started.
    pub sparkle_started: bool,
    /// A burst started.
    pub burst_started: bool,
    /// A burst ended.
    pub burst_ended: bool,
    /// The stream was recycled.
    pub recycled: bool,
}

/// One falling column of glyphs.
#[derive(Clone, Debug)]
pub struct Stream {
    lane: LaneSlot,
    x: f32,
    depth: f32,
    head_y: f32,
    fall_speed: f32,
    speed_multiplier: f32,
    glyph_size: f32,
    slot_step: f32,
    base_opacity: f32,
    hue_jitter: f32,
    glyphs: FixedRing<GlyphId>,
    distance_accumulator: f32,
    flicker: PoissonTimer,
    sparkle_timer: PoissonTimer,
    burst_timer: PoissonTimer,
    sparkle: SparkleRun,
    burst: Burst,
    recycles: u64,
    rng: SimRng,
}

impl Stream {
    /// Creates a stream with randomized attributes in `lane`.
    ///
    /// The head starts anywhere between `bottom` and `top` so a fresh field
    /// is already populated.
    #[must_use]
    pub fn spawn(lane: LaneSlot, volume: &ViewingVolume, config: &RainConfig, mut rng: SimRng) -> Self {
        let glyph_size = rng.range(config.lanes.min_glyph_size, config.lanes.max_glyph_size);
        let tail_span = config.fall.max_tail.saturating_sub(config.fall.min_tail) + 1;
        let tail_len = config.fall.min_tail + rng.index(tail_span);
        let (z_lo, z_hi) = volume.depth_bounds();

        let init = StreamInit {
            lane,
            x: lane.jittered_x(&mut rng),
            depth: rng.range(z_lo, z_hi),
            head_y: rng.range(volume.bottom, volume.top),
            fall_speed: rng.range(config.fall.min_speed, config.fall.max_speed) * config.fall.speed_factor,
            glyph_size,
            slot_step: config.fall.char_step * glyph_size,
            tail_len,
            base_opacity: rng.range(config.fall.min_base_opacity, config.fall.max_base_opacity),
            hue_jitter: rng.range(config.fall.min_hue_jitter, config.fall.max_hue_jitter),
        };
        Self::from_init(init, config, rng)
    }

    /// Creates a stream from an explicit state with fresh event countdowns.
    #[must_use]
    pub fn from_init(init: StreamInit, config: &RainConfig, mut rng: SimRng) -> Self {
        let tail_len = init.tail_len.max(MIN_TAIL);
        let mut glyphs = FixedRing::new(tail_len, GlyphId::default());
        reseed_glyphs(&mut glyphs, &mut rng);

        Self {
            lane: init.lane,
            x: init.x,
            depth: init.depth,
            head_y: init.head_y,
            fall_speed: init.fall_speed.max(0.0),
            speed_multiplier: 1.0,
            glyph_size: init.glyph_size,
            slot_step: init.slot_step.max(1e-3),
            base_opacity: init.base_opacity,
            hue_jitter: init.hue_jitter,
            glyphs,
            distance_accumulator: 0.0,
            flicker: PoissonTimer::new(config.flicker.rate, &mut rng),
            sparkle_timer: PoissonTimer::new(config.sparkle.rate, &mut rng),
            burst_timer: PoissonTimer::new(config.burst.rate, &mut rng),
            sparkle: SparkleRun::default(),
            burst: Burst::idle(),
            recycles: 0,
            rng,
        }
    }

    /// Advances the stream by `dt` seconds.
    pub fn tick(&mut self, dt: f32, volume: &ViewingVolume, config: &RainConfig) -> StreamStep {
        let mut step = StreamStep::default();

        // 1. fall
        self.speed_multiplier = damp(
            self.speed_multiplier,
            self.burst.target_multiplier(),
            config.fall.speed_ease_rate,
            dt,
        );
        let distance = self.fall_speed * self.speed_multiplier * dt;
        self.head_y -= distance;

        // 2. discrete slot shift
        self.distance_accumulator += distance;
        if self.distance_accumulator >= self.slot_step {
            let whole = (self.distance_accumulator / self.slot_step).floor();
            self.distance_accumulator = (self.distance_accumulator - whole * self.slot_step).max(0.0);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let shifts = whole.min(u32::MAX as f32) as u32;
            // Beyond one full rotation every slot is already fresh.
            let visible = shifts.min(u32::try_from(self.tail_len()).unwrap_or(u32::MAX));
            for _ in 0..visible {
                self.shift_head();
            }
            step.shifts = shifts;
        }

        // 3. events
        step.flickers = self.flicker.advance(dt, &mut self.rng);
        for _ in 0..step.flickers {
            self.flicker_once(config.flicker.changes_per_flicker);
        }

        if self.sparkle.is_active() {
            if let Some(slot) = self.sparkle.advance(dt, config.sparkle.speed) {
                if slot > 0 && slot < self.tail_len() {
                    self.mutate_slot(slot);
                }
            }
        } else if self.sparkle_timer.advance_once(dt, &mut self.rng) {
            self.sparkle = SparkleRun::start(self.tail_len(), config.sparkle.avg_length, &mut self.rng);
            step.sparkle_started = true;
        }

        if self.burst.is_active() {
            step.burst_ended = self.burst.advance(dt);
        } else if self.burst_timer.advance_once(dt, &mut self.rng) {
            let duration = self.rng.range(config.burst.min_duration, config.burst.max_duration);
            step.burst_started = self.burst.fire(duration, config.burst.speed_multiplier);
        }

        // 4. recycle
        if self.is_below(volume.bottom) {
            self.respawn(volume, config);
            step.recycled = true;
        }

        step
    }

    /// True once every slot is below `bottom`.
    ///
    /// Uses the un-rippled layout: `head_y + (tail_len - 1) * slot_step < bottom`.
    #[must_use]
    pub fn is_below(&self, bottom: f32) -> bool {
        #[allow(clippy::cast_precision_loss)]
        let tail_top = self.head_y + (self.tail_len() - 1) as f32 * self.slot_step;
        tail_top < bottom
    }

    /// Respawns above the volume with fresh glyphs, depth, jitter and events.
    pub fn respawn(&mut self, volume: &ViewingVolume, config: &RainConfig) {
        #[allow(clippy::cast_precision_loss)]
        let tail_height = self.tail_len() as f32 * self.slot_step;
        let margin = self
            .rng
            .range(config.fall.respawn_margin_min, config.fall.respawn_margin_max);
        let (z_lo, z_hi) = volume.depth_bounds();

        self.head_y = volume.top + tail_height * margin;
        self.depth = self.rng.range(z_lo, z_hi);
        self.distance_accumulator = 0.0;
        self.x = self.lane.jittered_x(&mut self.rng);
        reseed_glyphs(&mut self.glyphs, &mut self.rng);

        self.flicker.reset(&mut self.rng);
        self.sparkle_timer.reset(&mut self.rng);
        self.burst_timer.reset(&mut self.rng);
        self.sparkle = SparkleRun::default();
        self.burst = Burst::idle();
        self.speed_multiplier = 1.0;
        self.recycles += 1;

        trace!(lane = self.lane.index, head_y = self.head_y, depth = self.depth, "stream recycled");
    }

    /// Moves the stream into `lane` after a resize.
    ///
    /// Re-jitters `x` inside the new lane and clamps depth into the new range.
    pub fn relocate(&mut self, lane: LaneSlot, volume: &ViewingVolume) {
        let (z_lo, z_hi) = volume.depth_bounds();
        self.lane = lane;
        self.x = lane.jittered_x(&mut self.rng);
        self.depth = self.depth.clamp(z_lo, z_hi);
    }

    fn shift_head(&mut self) {
        let neighbour = self.glyphs.get(0);
        let head = GlyphId::random_avoiding(&mut self.rng, &[neighbour]);
        self.glyphs.push_head(head);
    }

    fn flicker_once(&mut self, changes: u32) {
        let body = self.tail_len() - 1;
        let changes = (changes as usize).clamp(1, body);
        for _ in 0..changes {
            let slot = 1 + self.rng.index(body);
            self.mutate_slot(slot);
        }
    }

    /// Replaces the symbol in `slot` with one that differs from it and from
    /// both neighbours.
    fn mutate_slot(&mut self, slot: usize) {
        let mut avoid = [self.glyphs.get(slot); 3];
        let mut count = 1;
        if slot > 0 {
            avoid[count] = self.glyphs.get(slot - 1);
            count += 1;
        }
        if slot + 1 < self.tail_len() {
            avoid[count] = self.glyphs.get(slot + 1);
            count += 1;
        }
        let next = GlyphId::random_avoiding(&mut self.rng, &avoid[..count]);
        self.glyphs.set(slot, next);
    }

    /// Lane this stream belongs to.
    #[inline]
    #[must_use]
    pub fn lane(&self) -> LaneSlot {
        self.lane
    }

    /// Horizontal position.
    #[inline]
    #[must_use]
    pub fn x(&self) -> f32 {
        self.x
    }

    /// Depth.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Vertical position of the head slot.
    #[inline]
    #[must_use]
    pub fn head_y(&self) -> f32 {
        self.head_y
    }

    /// Head position.
    #[inline]
    #[must_use]
    pub fn head_position(&self) -> Vec3 {
        Vec3::new(self.x, self.head_y, self.depth)
    }

    /// Fall speed before the burst multiplier.
    #[inline]
    #[must_use]
    pub fn fall_speed(&self) -> f32 {
        self.fall_speed
    }

    /// Current (eased) speed multiplier.
    #[inline]
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Glyph size.
    #[inline]
    #[must_use]
    pub fn glyph_size(&self) -> f32 {
        self.glyph_size
    }

    /// Distance between adjacent slots.
    #[inline]
    #[must_use]
    pub fn slot_step(&self) -> f32 {
        self.slot_step
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub fn tail_len(&self) -> usize {
        self.glyphs.len()
    }

    /// Glyph in `slot` (0 = head).
    #[inline]
    #[must_use]
    pub fn glyph(&self, slot: usize) -> GlyphId {
        self.glyphs.get(slot)
    }

    /// Glyphs from head to tail.
    pub fn glyphs(&self) -> impl Iterator<Item = GlyphId> + '_ {
        self.glyphs.iter()
    }

    /// Base opacity.
    #[inline]
    #[must_use]
    pub fn base_opacity(&self) -> f32 {
        self.base_opacity
    }

    /// Hue offset in degrees.
    #[inline]
    #[must_use]
    pub fn hue_jitter(&self) -> f32 {
        self.hue_jitter
    }

    /// Sparkle run state.
    #[inline]
    #[must_use]
    pub fn sparkle(&self) -> &SparkleRun {
        &self.sparkle
    }

    /// Burst state.
    #[inline]
    #[must_use]
    pub fn burst(&self) -> &Burst {
        &self.burst
    }

    /// Distance fallen since the last slot shift.
    #[inline]
    #[must_use]
    pub fn distance_accumulator(&self) -> f32 {
        self.distance_accumulator
    }

    /// Number of times this stream has been recycled.
    #[inline]
    #[must_use]
    pub fn recycles(&self) -> u64 {
        self.recycles
    }

    /// Fires a burst immediately (idle streams only); returns whether it started.
    pub fn force_burst(&mut self, config: &RainConfig) -> bool {
        let duration = self.rng.range(config.burst.min_duration, config.burst.max_duration);
        self.burst.fire(duration, config.burst.speed_multiplier)
    }
}

/// Fills the ring head to tail so no two adjacent slots repeat.
fn reseed_glyphs(glyphs: &mut FixedRing<GlyphId>, rng: &mut SimRng) {
    let mut previous: Option<GlyphId> = None;
    glyphs.refill(|_| {
        let glyph = match previous {
            Some(prev) => GlyphId::random_avoiding(rng, &[prev]),
            None => GlyphId::random(rng),
        };
        previous = Some(glyph);
        glyph
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphrain_core::RainSeed;

    fn lane() -> LaneSlot {
        LaneSlot {
            index: 0,
            center: 0.0,
            max_jitter: 0.1,
        }
    }

    #[test]
    fn test_sparkle_start_index_invariant() {
        let mut rng = SimRng::from_seed(RainSeed::new(21));
        for tail_len in 2..30 {
            for _ in 0..50 {
                let run = SparkleRun::start(tail_len, 7.0, &mut rng);
                assert!(run.start_index() < tail_len - 1, "tail {tail_len}: {run:?}");
                assert!((3..=7).contains(&run.length()));
            }
        }
    }

    #[test]
    fn test_sparkle_advance_visits_each_step_once() {
        let mut rng = SimRng::from_seed(RainSeed::new(22));
        let mut run = SparkleRun::start(20, 5.0, &mut rng);
        let start = run.start_index();
        // 0.5 slots per tick: every step is reported exactly once.
        let mut visited = Vec::new();
        while run.is_active() {
            if let Some(slot) = run.advance(0.5, 1.0) {
                visited.push(slot);
            }
        }
        let expected: Vec<usize> = (0..=run.length() as usize).map(|s| start + s).collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn test_sparkle_covers_start_to_front() {
        let run = SparkleRun {
            active: true,
            start_index: 2,
            length: 5,
            progress: 1.5,
            last_step: Some(1),
        };
        assert!(!run.covers(1, 10));
        assert!(run.covers(2, 10));
        assert!(run.covers(3, 10));
        assert!(!run.covers(4, 10));
        assert!(!SparkleRun::default().covers(2, 10));
    }

    #[test]
    fn test_burst_cannot_restart_while_active() {
        let mut burst = Burst::idle();
        assert!(burst.fire(1.0, 2.0));
        assert!(!burst.fire(1.0, 3.0));
        assert_eq!(burst.target_multiplier(), 2.0);
        assert!(burst.advance(1.5));
        assert_eq!(burst.target_multiplier(), 1.0);
        assert!(burst.fire(1.0, 3.0));
    }

    #[test]
    fn test_burst_freshness() {
        let mut burst = Burst::idle();
        assert_eq!(burst.freshness(), 0.0);
        burst.fire(1.0, 2.0);
        assert_eq!(burst.freshness(), 1.0);
        burst.advance(0.25);
        assert!((burst.freshness() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_reseed_has_no_adjacent_repeats() {
        let mut rng = SimRng::from_seed(RainSeed::new(23));
        let mut ring = FixedRing::new(64, GlyphId::default());
        for _ in 0..20 {
            reseed_glyphs(&mut ring, &mut rng);
            let glyphs: Vec<_> = ring.iter().collect();
            assert!(glyphs.windows(2).all(|w| w[0] != w[1]));
        }
    }

    #[test]
    fn test_mutate_slot_differs_from_neighbours() {
        let config = RainConfig::default();
        let volume = ViewingVolume::new(10.0, 10.0, -10.0, -6.0, -28.0);
        let mut stream = Stream::spawn(lane(), &volume, &config, SimRng::from_seed(RainSeed::new(24)));
        for _ in 0..500 {
            let slot = 1 + stream.rng.index(stream.tail_len() - 1);
            let before = stream.glyph(slot);
            stream.mutate_slot(slot);
            let after = stream.glyph(slot);
            assert_ne!(before, after);
            assert_ne!(after, stream.glyph(slot - 1));
            if slot + 1 < stream.tail_len() {
                assert_ne!(after, stream.glyph(slot + 1));
            }
        }
    }

    #[test]
    fn test_spawn_respects_config_ranges() {
        let config = RainConfig::default();
        let volume = ViewingVolume::new(10.0, 10.0, -10.0, -6.0, -28.0);
        for seed in 0..100 {
            let stream = Stream::spawn(lane(), &volume, &config, SimRng::from_seed(RainSeed::new(seed)));
            assert!((config.fall.min_tail..=config.fall.max_tail).contains(&stream.tail_len()));
            assert!(stream.depth() >= -28.0 && stream.depth() <= -6.0);
            assert!(stream.head_y() >= -10.0 && stream.head_y() <= 10.0);
            assert!((stream.x() - lane().center).abs() <= lane().max_jitter);
            assert!(stream.glyph_size() <= config.lanes.max_glyph_size);
            assert!((stream.slot_step() - config.fall.char_step * stream.glyph_size()).abs() < 1e-6);
        }
    }
}
