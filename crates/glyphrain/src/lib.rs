//! # GLYPHRAIN
//!
//! A procedural "rain field": many glyph streams falling through a 3D volume
//! in non-overlapping lanes, with stochastic flicker, sparkle runs and
//! bursts, a travelling ripple, depth fog, an ambient particle field and a
//! periodic camera-travel loop that kicks a glitch pulse.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                             RainEngine                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐   │
//! │  │ glyphrain_core  │────>│ glyphrain_      │────>│ glyphrain_      │   │
//! │  │                 │     │ procedural      │     │ rendering       │   │
//! │  │  • Volume       │     │  • Lanes        │     │  • Shaping      │   │
//! │  │  • Config       │     │  • Streams      │     │  • Records      │   │
//! │  │  • SimRng       │     │  • Particles    │     │  • Glitch pulse │   │
//! │  │  • FixedRing    │     │  • Travel loop  │     │  • Emitter      │   │
//! │  └─────────────────┘     └─────────────────┘     └─────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use glyphrain::{RainConfig, RainEngine, Viewport};
//!
//! let mut engine = RainEngine::for_viewport(RainConfig::default(), Viewport::new(1280.0, 720.0));
//! for _ in 0..60 {
//!     engine.tick(1.0 / 60.0);
//! }
//! let frame = engine.emit();
//! assert_eq!(frame.markers.len(), engine.streams().len());
//! let summary = engine.dispose();
//! assert_eq!(summary.ticks, 60);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod engine;
pub mod frame_loop;

// Re-export the layers
pub use glyphrain_core as core;
pub use glyphrain_procedural as procedural;
pub use glyphrain_rendering as rendering;

// Re-export commonly used types
pub use engine::{EngineSummary, RainEngine, SkipReason, TickReport};
pub use frame_loop::{run_frame, run_frames, FrameClock, FrameStats, FrameStatsAccumulator, FrameTiming};
pub use glyphrain_core::{ConfigError, RainConfig, SceneKnobs, Viewport, ViewingVolume};
pub use glyphrain_rendering::{FrameOutput, GlyphInstance, HeadMarker, SceneAmbience};
