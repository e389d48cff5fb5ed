//! # GLYPHRAIN Core
//!
//! Shared building blocks of the rain field:
//! - [`ViewingVolume`]: the box the field lives in
//! - [`RainConfig`]: every tunable, loaded from TOML
//! - [`SimRng`] / [`RainSeed`]: deterministic, per-unit randomness
//! - [`FixedRing`]: the fixed-capacity glyph column
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations in hot path** - pools and rings are sized once
//! 2. **Deterministic** - same seed, config and `dt` sequence, same field
//! 3. **Explicit inputs** - nothing reads ambient globals
//!
//! ## Example
//!
//! ```rust
//! use glyphrain_core::{RainConfig, ViewingVolume, Viewport};
//!
//! let config = RainConfig::default().sanitized();
//! let volume = ViewingVolume::from_viewport(Viewport::new(1920.0, 1080.0), &config.volume);
//! assert!(!volume.is_degenerate());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod easing;
pub mod error;
pub mod math;
pub mod ring;
pub mod rng;
pub mod volume;

pub use config::{
    AmbienceConfig, BurstConfig, EngineConfig, FallConfig, FlickerConfig, LaneConfig, MarkerConfig,
    ParticleConfig, RainConfig, RippleConfig, SceneKnobs, ShadingConfig, SparkleConfig,
    TravelConfig, VolumeConfig,
};
pub use easing::Easing;
pub use error::{ConfigError, ConfigResult};
pub use math::Vec3;
pub use ring::FixedRing;
pub use rng::{RainSeed, SimRng};
pub use volume::{Viewport, ViewingVolume};
