//! # Rain Engine
//!
//! Owns every subsystem of the field and drives them with an explicit
//! lifecycle:
//!
//! ```text
//! new(config, volume)
//!   │
//!   ├─ tick(dt) ──┬─ streams      fall, shift, events, recycle
//!   │             ├─ particles    drift, respawn
//!   │             ├─ glitch       decay
//!   │             └─ travel       advance ──(cycle end)──> glitch.kick
//!   │
//!   ├─ emit() ────── FrameOutput (records, markers, particles, glitch, pose)
//!   ├─ resize(volume)
//!   ├─ reconfigure(config)
//!   │
//! dispose(self)
//! ```
//!
//! Stream generators are seeded from `seed -> epoch -> lane index`. The epoch
//! advances whenever a resize rebuilds the pool, so a rebuilt pool never
//! replays the previous one. `reconfigure` starts a fresh run: the engine
//! then behaves exactly like `new` with the same configuration and volume.

use glyphrain_core::{ParticleConfig, RainConfig, RainSeed, SimRng, Viewport, ViewingVolume};
use glyphrain_procedural::{LaneLayout, ParticleField, Stream, TravelLoop, TravelPose};
use glyphrain_rendering::{FrameInputs, FrameOutput, GlitchPulse, RenderStateEmitter};
use tracing::{debug, info};

/// Purpose tag for the particle field seed; lane indices never reach it.
const PARTICLE_PURPOSE: u64 = u64::MAX;

/// Why a tick did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// `dt` was zero or negative.
    NonPositiveDt,
    /// `dt` was NaN or infinite.
    NonFiniteDt,
    /// The viewing volume cannot host a field.
    DegenerateVolume,
}

/// Summary of one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Set when the tick was skipped; all counters are then zero.
    pub skipped: Option<SkipReason>,
    /// Seconds actually simulated.
    pub dt: f32,
    /// True if `dt` was clamped to `max_dt`.
    pub clamped: bool,
    /// Slot shifts across all streams.
    pub shifts: u32,
    /// Flicker events across all streams.
    pub flickers: u32,
    /// Sparkle runs started.
    pub sparkles_started: u32,
    /// Bursts started.
    pub bursts_started: u32,
    /// Bursts ended.
    pub bursts_ended: u32,
    /// Streams recycled.
    pub recycles: u32,
    /// Particles respawned.
    pub particle_respawns: u32,
    /// Travel cycles completed (each kicked the glitch pulse).
    pub travel_cycles: u32,
}

impl TickReport {
    /// A report for a skipped tick.
    #[must_use]
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::default()
        }
    }

    /// True if the tick simulated nothing.
    #[inline]
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// Totals reported when the engine is disposed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineSummary {
    /// Ticks simulated (skipped ticks excluded).
    pub ticks: u64,
    /// Simulated seconds.
    pub time: f64,
    /// Stream recycles over the engine's lifetime.
    pub recycles: u64,
    /// Completed travel cycles.
    pub travel_cycles: u64,
    /// Pool rebuilds after the initial one: capacity-changing resizes and
    /// reconfigures.
    pub rebuilds: u64,
}

/// The rain field.
#[derive(Debug)]
pub struct RainEngine {
    config: RainConfig,
    seed: RainSeed,
    epoch: u64,
    volume: ViewingVolume,
    layout: LaneLayout,
    streams: Vec<Stream>,
    particles: ParticleField,
    travel: TravelLoop,
    glitch: GlitchPulse,
    emitter: RenderStateEmitter,
    time: f64,
    ticks: u64,
    recycles: u64,
    rebuilds: u64,
    /// Totals of runs ended by `reconfigure`.
    retired: EngineSummary,
}

impl RainEngine {
    /// Creates the field inside `volume`. The configuration is sanitized first.
    #[must_use]
    pub fn new(config: RainConfig, volume: ViewingVolume) -> Self {
        Self::from_sanitized(config.sanitized(), volume)
    }

    /// Creates the field for a viewport, deriving the volume from
    /// `config.volume`.
    #[must_use]
    pub fn for_viewport(config: RainConfig, viewport: Viewport) -> Self {
        let config = config.sanitized();
        let volume = ViewingVolume::from_viewport(viewport, &config.volume);
        Self::from_sanitized(config, volume)
    }

    fn from_sanitized(config: RainConfig, volume: ViewingVolume) -> Self {
        let seed = RainSeed::new(config.engine.seed);
        let layout = LaneLayout::allocate(volume.half_width, config.lanes.stream_count, &config.lanes);
        let streams = spawn_streams(&layout, &volume, &config, seed, 0);
        let particles = spawn_particles(&volume, &config, seed, 0);
        let emitter = RenderStateEmitter::with_capacity(
            streams.iter().map(Stream::tail_len).sum(),
            streams.len(),
            particles.len(),
        );

        info!(
            streams = streams.len(),
            dropped = layout.dropped(),
            particles = particles.len(),
            seed = config.engine.seed,
            degenerate = volume.is_degenerate(),
            "rain engine created"
        );

        Self {
            travel: TravelLoop::new(&config.travel),
            glitch: GlitchPulse::new(config.travel.glitch_decay_rate),
            config,
            seed,
            epoch: 0,
            volume,
            layout,
            streams,
            particles,
            emitter,
            time: 0.0,
            ticks: 0,
            recycles: 0,
            rebuilds: 0,
            retired: EngineSummary::default(),
        }
    }

    /// Advances the whole field by `dt` seconds.
    ///
    /// Non-finite or non-positive `dt` and a degenerate volume skip the tick
    /// and leave every state untouched. `dt` above `max_dt` is clamped.
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let reason = if !dt.is_finite() {
            Some(SkipReason::NonFiniteDt)
        } else if dt <= 0.0 {
            Some(SkipReason::NonPositiveDt)
        } else if self.volume.is_degenerate() {
            Some(SkipReason::DegenerateVolume)
        } else {
            None
        };
        if let Some(reason) = reason {
            debug!(?reason, dt, "tick skipped");
            return TickReport::skipped(reason);
        }

        let step = dt.min(self.config.engine.max_dt);
        let mut report = TickReport {
            dt: step,
            clamped: step < dt,
            ..TickReport::default()
        };

        for stream in &mut self.streams {
            let s = stream.tick(step, &self.volume, &self.config);
            report.shifts += s.shifts;
            report.flickers += s.flickers;
            report.sparkles_started += u32::from(s.sparkle_started);
            report.bursts_started += u32::from(s.burst_started);
            report.bursts_ended += u32::from(s.burst_ended);
            report.recycles += u32::from(s.recycled);
        }
        report.particle_respawns = self.particles.tick(step, &self.volume);

        self.glitch.decay(step);
        let glitch = &mut self.glitch;
        let strength = self.config.travel.glitch_strength;
        let mut cycles = 0;
        self.travel.advance(step, |_| {
            glitch.kick(strength);
            cycles += 1;
        });
        report.travel_cycles = cycles;

        self.recycles += u64::from(report.recycles);
        self.time += f64::from(step);
        self.ticks += 1;
        report
    }

    /// Builds the drawable state for the current frame.
    pub fn emit(&mut self) -> &FrameOutput {
        self.emitter.emit(&FrameInputs {
            time: self.time,
            volume: &self.volume,
            layout: &self.layout,
            config: &self.config,
            streams: &self.streams,
            particles: &self.particles,
            glitch: self.glitch.intensity(),
            travel: self.travel.pose(),
        })
    }

    /// Applies a new viewing volume.
    ///
    /// Lanes are recomputed. If the lane count changes the stream pool is
    /// rebuilt under a new epoch; otherwise every stream moves into its new
    /// lane. Particles outside the new volume respawn inside it.
    pub fn resize(&mut self, volume: ViewingVolume) {
        if volume == self.volume {
            return;
        }
        let was_degenerate = self.volume.is_degenerate();
        self.volume = volume;

        if volume.is_degenerate() {
            info!(?volume, "resized to degenerate volume, simulation paused");
            return;
        }

        let layout = LaneLayout::allocate(volume.half_width, self.config.lanes.stream_count, &self.config.lanes);
        if layout.capacity() == self.streams.len() {
            for (index, stream) in self.streams.iter_mut().enumerate() {
                if let Some(lane) = layout.slot(index) {
                    stream.relocate(lane, &volume);
                }
            }
        } else {
            self.epoch += 1;
            self.rebuilds += 1;
            self.streams = spawn_streams(&layout, &volume, &self.config, self.seed, self.epoch);
        }
        self.layout = layout;

        if was_degenerate || self.particles.len() != self.config.particles.count {
            self.particles = spawn_particles(&volume, &self.config, self.seed, self.epoch);
        } else {
            self.particles.rebound(&volume);
        }

        info!(
            half_width = volume.half_width,
            height = volume.height(),
            streams = self.streams.len(),
            epoch = self.epoch,
            "rain engine resized"
        );
    }

    /// Applies a new viewport, deriving the volume from the configuration.
    pub fn resize_viewport(&mut self, viewport: Viewport) {
        self.resize(ViewingVolume::from_viewport(viewport, &self.config.volume));
    }

    /// Replaces the configuration and starts a fresh run in the current
    /// volume.
    ///
    /// Simulated time, ticks, travel progress, the glitch pulse and the pool
    /// epoch all restart, so the following frames match those of
    /// `RainEngine::new(config, volume)`. Lifetime totals carry over into
    /// [`RainEngine::dispose`].
    pub fn reconfigure(&mut self, config: RainConfig) {
        let run = self.run_summary();
        self.retired = EngineSummary {
            ticks: self.retired.ticks + run.ticks,
            time: self.retired.time + run.time,
            recycles: self.retired.recycles + run.recycles,
            travel_cycles: self.retired.travel_cycles + run.travel_cycles,
            rebuilds: self.retired.rebuilds + run.rebuilds + 1,
        };

        let fresh = Self::new(config, self.volume);
        let retired = self.retired;
        *self = Self { retired, ..fresh };

        info!(
            streams = self.streams.len(),
            particles = self.particles.len(),
            rebuilds = self.retired.rebuilds,
            "rain engine reconfigured"
        );
    }

    /// Tears the engine down and returns its lifetime totals.
    #[must_use]
    pub fn dispose(self) -> EngineSummary {
        let run = self.run_summary();
        let summary = EngineSummary {
            ticks: self.retired.ticks + run.ticks,
            time: self.retired.time + run.time,
            recycles: self.retired.recycles + run.recycles,
            travel_cycles: self.retired.travel_cycles + run.travel_cycles,
            rebuilds: self.retired.rebuilds + run.rebuilds,
        };
        info!(ticks = summary.ticks, time = summary.time, recycles = summary.recycles, "rain engine disposed");
        summary
    }

    fn run_summary(&self) -> EngineSummary {
        EngineSummary {
            ticks: self.ticks,
            time: self.time,
            recycles: self.recycles,
            travel_cycles: self.travel.cycles(),
            rebuilds: self.rebuilds,
        }
    }

    /// Active (sanitized) configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RainConfig {
        &self.config
    }

    /// Current viewing volume.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> &ViewingVolume {
        &self.volume
    }

    /// Current lane partition.
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &LaneLayout {
        &self.layout
    }

    /// Live streams in lane order.
    #[inline]
    #[must_use]
    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    /// Ambient particle field.
    #[inline]
    #[must_use]
    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    /// Current travel pose.
    #[must_use]
    pub fn travel_pose(&self) -> TravelPose {
        self.travel.pose()
    }

    /// Completed travel cycles.
    #[inline]
    #[must_use]
    pub fn travel_cycles(&self) -> u64 {
        self.travel.cycles()
    }

    /// Current glitch intensity.
    #[inline]
    #[must_use]
    pub fn glitch_intensity(&self) -> f32 {
        self.glitch.intensity()
    }

    /// Simulated seconds since creation or the last `reconfigure`.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Ticks simulated since creation or the last `reconfigure`.
    #[inline]
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Pool epoch; increments on every resize that rebuilds the pool.
    #[inline]
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Output of the last `emit`.
    #[inline]
    #[must_use]
    pub fn output(&self) -> &FrameOutput {
        self.emitter.output()
    }
}

fn spawn_streams(
    layout: &LaneLayout,
    volume: &ViewingVolume,
    config: &RainConfig,
    seed: RainSeed,
    epoch: u64,
) -> Vec<Stream> {
    let pool = seed.derive(epoch);
    layout
        .slots()
        .map(|lane| Stream::spawn(lane, volume, config, SimRng::from_seed(pool.derive(lane.index as u64))))
        .collect()
}

fn spawn_particles(volume: &ViewingVolume, config: &RainConfig, seed: RainSeed, epoch: u64) -> ParticleField {
    let rng = SimRng::from_seed(seed.derive(epoch).derive(PARTICLE_PURPOSE));
    if volume.is_degenerate() {
        let empty = ParticleConfig {
            count: 0,
            ..config.particles.clone()
        };
        return ParticleField::new(volume, &empty, rng);
    }
    ParticleField::new(volume, &config.particles, rng)
}
