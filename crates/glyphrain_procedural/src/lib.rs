//! # GLYPHRAIN Procedural Simulation
//!
//! The moving parts of the rain field. Everything here is deterministic for
//! a given seed and `dt` sequence.
//!
//! ## Modules
//!
//! - `lanes`: partitions the volume width so streams never overlap
//! - `stream`: the per-stream state machine
//! - `timer`: exponential-interval countdowns for stochastic events
//! - `glyphs`: the symbol alphabet
//! - `particles`: ambient motes
//! - `travel`: the repeating camera-travel cycle
//!
//! ## Example
//!
//! ```rust
//! use glyphrain_core::{RainConfig, RainSeed, SimRng, ViewingVolume};
//! use glyphrain_procedural::{LaneLayout, Stream};
//!
//! let config = RainConfig::default();
//! let volume = ViewingVolume::new(20.0, 12.0, -12.0, -6.0, -28.0);
//! let layout = LaneLayout::allocate(volume.half_width, config.lanes.stream_count, &config.lanes);
//!
//! let seed = RainSeed::new(42);
//! let mut streams: Vec<Stream> = layout
//!     .slots()
//!     .map(|lane| Stream::spawn(lane, &volume, &config, SimRng::from_seed(seed.derive(lane.index as u64))))
//!     .collect();
//!
//! for stream in &mut streams {
//!     stream.tick(1.0 / 60.0, &volume, &config);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod glyphs;
pub mod lanes;
pub mod particles;
pub mod stream;
pub mod timer;
pub mod travel;

pub use glyphs::{GlyphId, GLYPH_SET};
pub use lanes::{LaneLayout, LaneSlot};
pub use particles::{Particle, ParticleField};
pub use stream::{Burst, SparkleRun, Stream, StreamInit, StreamStep};
pub use timer::PoissonTimer;
pub use travel::{TravelLoop, TravelPose};
