//! # Frame Loop
//!
//! Drives a [`RainEngine`] the way a host render loop would:
//!
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. BEGIN FRAME   measure dt (wall clock or fixed), clamp to max_dt  │
//! │ 2. TICK          streams, particles, travel loop, glitch            │
//! │ 3. EMIT          glyph records, head markers, particles             │
//! │ 4. END FRAME     record timings                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use tracing::warn;

use crate::engine::RainEngine;

/// Target frame time for 60 FPS.
pub const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_666);

/// Maximum allowed frame time before warning.
pub const MAX_FRAME_TIME: Duration = Duration::from_millis(33);

/// Where frame deltas come from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameTiming {
    /// Measure wall-clock time between frames.
    WallClock,
    /// Use the same `dt` every frame (seconds).
    Fixed(f32),
}

/// Produces the `dt` for each frame.
#[derive(Clone, Debug)]
pub struct FrameClock {
    timing: FrameTiming,
    max_dt: f32,
    last: Instant,
    frame: u64,
}

impl FrameClock {
    /// Creates a clock; deltas above `max_dt` are clamped.
    #[must_use]
    pub fn new(timing: FrameTiming, max_dt: f32) -> Self {
        Self {
            timing,
            max_dt,
            last: Instant::now(),
            frame: 0,
        }
    }

    /// Starts a frame and returns its `dt`.
    pub fn begin_frame(&mut self) -> f32 {
        let now = Instant::now();
        let measured = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        self.frame += 1;

        let dt = match self.timing {
            FrameTiming::WallClock => measured,
            FrameTiming::Fixed(dt) => dt,
        };
        // Clamp to prevent a burst of catch-up after a pause
        dt.min(self.max_dt)
    }

    /// Frames started so far.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Frame timing statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    /// Total frame time in microseconds.
    pub total_us: u64,
    /// Tick time in microseconds.
    pub tick_us: u64,
    /// Emit time in microseconds.
    pub emit_us: u64,
    /// Frame number.
    pub frame: u64,
    /// Glyph records emitted.
    pub glyphs: u32,
    /// Streams recycled this frame.
    pub recycles: u32,
    /// True if the tick was skipped.
    pub skipped: bool,
}

/// Runs one frame: tick then emit, timing both.
pub fn run_frame(engine: &mut RainEngine, dt: f32, frame: u64) -> FrameStats {
    let start = Instant::now();
    let report = engine.tick(dt);
    let ticked = Instant::now();
    let glyphs = engine.emit().glyphs.len();
    let done = Instant::now();

    FrameStats {
        total_us: micros(done.duration_since(start)),
        tick_us: micros(ticked.duration_since(start)),
        emit_us: micros(done.duration_since(ticked)),
        frame,
        glyphs: u32::try_from(glyphs).unwrap_or(u32::MAX),
        recycles: report.recycles,
        skipped: report.is_skipped(),
    }
}

/// Runs `frames` frames driven by `clock`, collecting statistics.
#[allow(clippy::cast_precision_loss)]
pub fn run_frames(engine: &mut RainEngine, clock: &mut FrameClock, frames: u64) -> FrameStatsAccumulator {
    let mut stats = FrameStatsAccumulator::new();
    for _ in 0..frames {
        let dt = clock.begin_frame();
        let frame = run_frame(engine, dt, clock.frame());
        if frame.total_us > micros(MAX_FRAME_TIME) {
            warn!(
                frame = frame.frame,
                ms = frame.total_us as f64 / 1000.0,
                "frame exceeded budget"
            );
        }
        stats.record(frame);
    }
    stats
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Accumulator for frame statistics.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of tick times.
    pub tick_us_sum: u64,
    /// Sum of emit times.
    pub emit_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded budget.
    pub frames_over_budget: u64,
    /// Frames whose tick was skipped.
    pub frames_skipped: u64,
    /// Glyph records emitted, summed over frames.
    pub glyphs_sum: u64,
    /// Stream recycles, summed over frames.
    pub recycles_sum: u64,
}

impl FrameStatsAccumulator {
    /// Creates a new accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            tick_us_sum: 0,
            emit_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            frames_skipped: 0,
            glyphs_sum: 0,
            recycles_sum: 0,
        }
    }

    /// Records a frame's statistics.
    pub fn record(&mut self, stats: FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.tick_us_sum += stats.tick_us;
        self.emit_us_sum += stats.emit_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);
        self.glyphs_sum += u64::from(stats.glyphs);
        self.recycles_sum += u64::from(stats.recycles);

        if stats.total_us > micros(TARGET_FRAME_TIME) {
            self.frames_over_budget += 1;
        }
        if stats.skipped {
            self.frames_skipped += 1;
        }
    }

    /// Returns average frame time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Returns average FPS.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Returns the fraction of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    /// Prints a summary of the statistics.
    #[allow(clippy::cast_precision_loss)]
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                    FRAME STATISTICS SUMMARY                      ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        println!();
        println!("┌─ TIMING ───────────────────────────────────────────────────────┐");
        println!("│ Frames Recorded:    {}", self.frames_recorded);
        println!("│ Average Frame:      {:.3} ms ({:.1} FPS)", self.avg_frame_ms(), self.avg_fps());
        if self.frames_recorded > 0 {
            println!("│ Min Frame:          {:.3} ms", self.min_frame_us as f64 / 1000.0);
            println!("│ Max Frame:          {:.3} ms", self.max_frame_us as f64 / 1000.0);
        }
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ BUDGET ───────────────────────────────────────────────────────┐");
        println!("│ Target:             {:.3} ms (60 FPS)", TARGET_FRAME_TIME.as_secs_f64() * 1000.0);
        println!(
            "│ Over Budget:        {} frames ({:.1}%)",
            self.frames_over_budget,
            self.over_budget_ratio() * 100.0
        );
        println!("│ Skipped Ticks:      {}", self.frames_skipped);
        println!("└──────────────────────────────────────────────────────────────────┘");

        if self.frames_recorded > 0 {
            let frames = self.frames_recorded as f64;
            println!();
            println!("┌─ BREAKDOWN ─────────────────────────────────────────────────────┐");
            println!("│ Tick:               {:.3} ms", self.tick_us_sum as f64 / frames / 1000.0);
            println!("│ Emit:               {:.3} ms", self.emit_us_sum as f64 / frames / 1000.0);
            println!("│ Glyphs / Frame:     {:.0}", self.glyphs_sum as f64 / frames);
            println!("│ Recycles:           {}", self.recycles_sum);
            println!("└──────────────────────────────────────────────────────────────────┘");
        }
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
