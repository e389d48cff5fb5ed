//! # GLYPHRAIN Render State
//!
//! Converts the simulated rain field into flat, GPU-uploadable records. This
//! crate never draws; a host renderer consumes [`FrameOutput`] each frame.
//!
//! ## Modules
//!
//! - `records`: `#[repr(C)]` glyph and head-marker records
//! - `shaping`: ripple, brightness, fog, edge fade, halo, hue
//! - `glitch`: the decaying glitch pulse kicked by the travel loop
//! - `ambience`: camera sway and grid pulse
//! - `emitter`: the per-frame conversion
//!
//! ## Example
//!
//! ```rust
//! use glyphrain_core::{RainConfig, RainSeed, SimRng, ViewingVolume};
//! use glyphrain_procedural::{LaneLayout, ParticleField, Stream, TravelPose};
//! use glyphrain_rendering::{FrameInputs, RenderStateEmitter};
//!
//! let config = RainConfig::default();
//! let volume = ViewingVolume::new(20.0, 12.0, -12.0, -6.0, -28.0);
//! let layout = LaneLayout::allocate(volume.half_width, 8, &config.lanes);
//! let streams: Vec<Stream> = layout
//!     .slots()
//!     .map(|lane| Stream::spawn(lane, &volume, &config, SimRng::from_seed(RainSeed::new(lane.index as u64))))
//!     .collect();
//! let particles = ParticleField::new(&volume, &config.particles, SimRng::from_seed(RainSeed::new(7)));
//!
//! let mut emitter = RenderStateEmitter::new();
//! let frame = emitter.emit(&FrameInputs {
//!     time: 0.0,
//!     volume: &volume,
//!     layout: &layout,
//!     config: &config,
//!     streams: &streams,
//!     particles: &particles,
//!     glitch: 0.0,
//!     travel: TravelPose::default(),
//! });
//! assert_eq!(frame.markers.len(), streams.len());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ambience;
pub mod emitter;
pub mod glitch;
pub mod records;
pub mod shaping;

pub use ambience::SceneAmbience;
pub use emitter::{FrameInputs, FrameOutput, RenderStateEmitter};
pub use glitch::GlitchPulse;
pub use records::{GlyphInstance, HeadMarker};
pub use shaping::{edge_fade, RippleWave, SlotShade, StreamLook};
