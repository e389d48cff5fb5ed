//! # Rain Configuration
//!
//! Every tunable of the field lives here, grouped by the stage that reads it.
//! Configuration is loaded once (TOML) and handed to the engine explicitly;
//! nothing reads ambient globals.
//!
//! ```toml
//! [lanes]
//! stream_count = 120
//!
//! [burst]
//! rate = 0.1
//! speed_multiplier = 2.0
//! ```
//!
//! Missing sections and fields fall back to defaults. Out-of-range values are
//! clamped by [`RainConfig::sanitized`], which logs every adjustment.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::easing::Easing;
use crate::error::{ConfigError, ConfigResult};

/// Upper bound on the stream pool.
pub const MAX_STREAMS: usize = 4096;
/// Upper bound on the particle pool.
pub const MAX_PARTICLES: usize = 100_000;
/// Upper bound on a stream's tail length.
pub const MAX_TAIL: usize = 256;
/// Shortest legal tail; a head plus one body slot.
pub const MIN_TAIL: usize = 2;

/// The three scene-level knobs a host exposes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneKnobs {
    /// Scales stream and particle counts.
    pub density: f32,
    /// Scales fall and drift speed.
    pub speed: f32,
    /// Scales overall brightness.
    pub glow: f32,
}

impl Default for SceneKnobs {
    fn default() -> Self {
        Self {
            density: 1.2,
            speed: 1.2,
            glow: 0.6,
        }
    }
}

/// Engine-level settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for every random decision in the field.
    pub seed: u64,
    /// Largest `dt` a single tick accepts; larger steps are clamped.
    pub max_dt: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0x6c79_7068_7261_696e,
            max_dt: 0.1,
        }
    }
}

/// Camera parameters used to derive the viewing volume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Camera position along depth.
    pub camera_z: f32,
    /// Depth plane closest to the camera.
    pub near_z: f32,
    /// Depth plane farthest from the camera.
    pub far_z: f32,
    /// Extra margin on every side, as a fraction of the visible extent.
    pub overhang: f32,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            fov_y_deg: 60.0,
            camera_z: 2.0,
            near_z: -6.0,
            far_z: -28.0,
            overhang: 0.12,
        }
    }
}

/// Lane packing and glyph size randomization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneConfig {
    /// Requested number of streams (capped by lane capacity).
    pub stream_count: usize,
    /// Smallest glyph size.
    pub min_glyph_size: f32,
    /// Largest glyph size; sets the lane footprint.
    pub max_glyph_size: f32,
    /// Glyph advance width relative to its size.
    pub glyph_width_mul: f32,
    /// Letter spacing factor.
    pub letter_spacing: f32,
    /// Lane width relative to the glyph footprint.
    pub lane_padding: f32,
    /// Absolute gap added to every lane.
    pub safety_margin: f32,
    /// Fraction of the free margin used for jitter, in `[0, 1]`.
    pub lane_jitter: f32,
    /// Absolute jitter cap.
    pub max_jitter: f32,
}

impl LaneConfig {
    /// Half width of the widest glyph any stream can draw.
    #[must_use]
    pub fn max_glyph_half_width(&self) -> f32 {
        self.max_glyph_size * self.glyph_width_mul * self.letter_spacing * 0.5
    }
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            stream_count: 90,
            min_glyph_size: 0.75,
            max_glyph_size: 1.1,
            glyph_width_mul: 0.9,
            letter_spacing: 1.05,
            lane_padding: 1.2,
            safety_margin: 0.02,
            lane_jitter: 0.08,
            max_jitter: 0.25,
        }
    }
}

/// Falling motion and per-stream spawn ranges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallConfig {
    /// Slowest fall speed (units/s, before `speed_factor`).
    pub min_speed: f32,
    /// Fastest fall speed (units/s, before `speed_factor`).
    pub max_speed: f32,
    /// Global multiplier on fall speed.
    pub speed_factor: f32,
    /// Shortest tail.
    pub min_tail: usize,
    /// Longest tail.
    pub max_tail: usize,
    /// Slot spacing relative to glyph size.
    pub char_step: f32,
    /// Approach rate of the speed multiplier toward its target (1/s).
    pub speed_ease_rate: f32,
    /// Respawn height above `top`, as a fraction of the tail length (low end).
    pub respawn_margin_min: f32,
    /// Respawn height above `top`, as a fraction of the tail length (high end).
    pub respawn_margin_max: f32,
    /// Lowest per-stream base opacity.
    pub min_base_opacity: f32,
    /// Highest per-stream base opacity.
    pub max_base_opacity: f32,
    /// Lowest per-stream hue offset in degrees.
    pub min_hue_jitter: f32,
    /// Highest per-stream hue offset in degrees.
    pub max_hue_jitter: f32,
}

impl Default for FallConfig {
    fn default() -> Self {
        Self {
            min_speed: 2.2,
            max_speed: 4.2,
            speed_factor: 1.01,
            min_tail: 12,
            max_tail: 24,
            char_step: 1.05,
            speed_ease_rate: 6.0,
            respawn_margin_min: 0.2,
            respawn_margin_max: 1.0,
            min_base_opacity: 0.4,
            max_base_opacity: 0.7,
            min_hue_jitter: -12.0,
            max_hue_jitter: 18.0,
        }
    }
}

/// Random symbol mutation along the tail.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlickerConfig {
    /// Mean flickers per second per stream.
    pub rate: f32,
    /// Slots mutated per flicker.
    pub changes_per_flicker: u32,
}

impl Default for FlickerConfig {
    fn default() -> Self {
        Self {
            rate: 10.0,
            changes_per_flicker: 3,
        }
    }
}

/// Sparkle runs: a bright mutation sweeping down from near the head.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparkleConfig {
    /// Mean run starts per second per idle stream.
    pub rate: f32,
    /// Average run length in slots.
    pub avg_length: f32,
    /// Run progress in slots per second.
    pub speed: f32,
    /// Lightness boost for slots inside the run.
    pub glow_boost: f32,
    /// Alpha boost for slots inside the run.
    pub alpha_boost: f32,
}

impl Default for SparkleConfig {
    fn default() -> Self {
        Self {
            rate: 1.2,
            avg_length: 7.0,
            speed: 34.0,
            glow_boost: 0.22,
            alpha_boost: 0.3,
        }
    }
}

/// Bursts: a short speed-up with extra glow.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// Mean burst starts per second per idle stream.
    pub rate: f32,
    /// Shortest burst in seconds.
    pub min_duration: f32,
    /// Longest burst in seconds.
    pub max_duration: f32,
    /// Target speed multiplier while bursting.
    pub speed_multiplier: f32,
    /// Extra glow at burst start, fading over its duration.
    pub extra_glow: f32,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            rate: 0.06,
            min_duration: 0.5,
            max_duration: 0.8,
            speed_multiplier: 1.75,
            extra_glow: 0.35,
        }
    }
}

/// The traveling compression wave.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RippleConfig {
    /// Seconds for one sweep from top to bottom.
    pub period: f32,
    /// Height of the compressed band.
    pub band_height: f32,
    /// Peak compression, in `[0, 1)`.
    pub strength: f32,
    /// Smallest allowed step multiplier, in `(0, 1]`.
    pub min_spacing: f32,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            period: 7.5,
            band_height: 1.8,
            strength: 0.25,
            min_spacing: 0.6,
        }
    }
}

/// Color, brightness and fake-atmosphere shaping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingConfig {
    /// Base hue in degrees.
    pub hue_base: f32,
    /// Amplitude of the slow per-stream hue wobble.
    pub hue_wobble: f32,
    /// Global brightness (particle and grid opacity).
    pub brightness: f32,
    /// Lightness of the head slot.
    pub head_lightness: f32,
    /// Lightness of body slots.
    pub body_lightness: f32,
    /// Alpha added to the head over the stream's base opacity.
    pub head_alpha_lift: f32,
    /// Alpha lost per slot down the tail.
    pub alpha_falloff: f32,
    /// Alpha floor for body slots.
    pub min_body_alpha: f32,
    /// Number of slots behind the head that get the near-head boost.
    pub end_glow_span: u32,
    /// Lightness boost near the head.
    pub end_glow_boost: f32,
    /// Alpha boost near the head.
    pub end_alpha_boost: f32,
    /// Lightness lift for the rest of the body.
    pub body_lightness_lift: f32,
    /// Alpha lift for the rest of the body.
    pub body_alpha_lift: f32,
    /// Halo width at the head.
    pub tail_halo_width: f32,
    /// Halo blur at the head.
    pub tail_halo_blur: f32,
    /// Distance over which slots fade in at `top` and out at `bottom`.
    pub edge_fade_span: f32,
    /// Alpha multiplier at the far plane.
    pub fog_alpha_far: f32,
    /// Blur multiplier at the far plane.
    pub fog_blur_far: f32,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            hue_base: 120.0,
            hue_wobble: 6.0,
            brightness: 1.12,
            head_lightness: 0.70,
            body_lightness: 0.54,
            head_alpha_lift: 0.35,
            alpha_falloff: 0.024,
            min_body_alpha: 0.10,
            end_glow_span: 3,
            end_glow_boost: 0.4,
            end_alpha_boost: 0.4,
            body_lightness_lift: 0.08,
            body_alpha_lift: 0.08,
            tail_halo_width: 0.08,
            tail_halo_blur: 0.5,
            edge_fade_span: 1.5,
            fog_alpha_far: 0.7,
            fog_blur_far: 1.8,
        }
    }
}

/// Head bulb and trail sprite.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Bulb size relative to glyph size.
    pub bulb_size: f32,
    /// Bulb intensity.
    pub bulb_intensity: f32,
    /// Size multiplier at the near plane.
    pub size_near: f32,
    /// Size multiplier at the far plane.
    pub size_far: f32,
    /// Intensity multiplier at the near plane.
    pub intensity_near: f32,
    /// Intensity multiplier at the far plane.
    pub intensity_far: f32,
    /// Bulb width relative to its size.
    pub bulb_width: f32,
    /// Bulb height relative to its size.
    pub bulb_height: f32,
    /// Trail sprite length relative to the bulb.
    pub trail_length: f32,
    /// Trail sprite opacity relative to the bulb.
    pub trail_opacity: f32,
    /// Pulse amplitude.
    pub pulse_amount: f32,
    /// Pulse angular rate (rad/s).
    pub pulse_rate: f32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            bulb_size: 0.85,
            bulb_intensity: 1.0,
            size_near: 1.2,
            size_far: 0.6,
            intensity_near: 1.3,
            intensity_far: 0.7,
            bulb_width: 0.7,
            bulb_height: 1.35,
            trail_length: 1.6,
            trail_opacity: 0.35,
            pulse_amount: 0.08,
            pulse_rate: 5.5,
        }
    }
}

/// Ambient particle field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Number of motes.
    pub count: usize,
    /// Base drift speed along depth (units/s).
    pub drift_speed: f32,
    /// Lowest per-particle speed factor.
    pub min_drift_factor: f32,
    /// Highest per-particle speed factor.
    pub max_drift_factor: f32,
    /// Field opacity before the breathing wave.
    pub opacity_base: f32,
    /// Breathing wave amplitude.
    pub opacity_wave: f32,
    /// Breathing wave angular rate (rad/s).
    pub opacity_rate: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 1920,
            drift_speed: 0.35 * 1.01,
            min_drift_factor: 0.4,
            max_drift_factor: 1.0,
            opacity_base: 0.45,
            opacity_wave: 0.15,
            opacity_rate: 0.8,
        }
    }
}

/// Slow camera sway and the pulsing wireframe grids behind the field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbienceConfig {
    /// Horizontal sway amplitude.
    pub sway_x: f32,
    /// Horizontal sway angular rate (rad/s).
    pub sway_x_rate: f32,
    /// Vertical sway amplitude.
    pub sway_y: f32,
    /// Vertical sway angular rate (rad/s).
    pub sway_y_rate: f32,
    /// Depth the swaying camera keeps looking at.
    pub look_at_z: f32,
    /// Seconds per grid pulse.
    pub grid_period: f32,
    /// Phase lead of the second grid, as a fraction of the period.
    pub grid_phase_offset: f32,
    /// Grid opacity at the bottom of the pulse.
    pub grid_floor: f32,
    /// Pulse amplitude of each grid.
    pub grid_pulse: [f32; 2],
}

impl Default for AmbienceConfig {
    fn default() -> Self {
        Self {
            sway_x: 0.35,
            sway_x_rate: 0.07,
            sway_y: 0.22,
            sway_y_rate: 0.05,
            look_at_z: -12.0,
            grid_period: 12.0,
            grid_phase_offset: 0.33,
            grid_floor: 0.02,
            grid_pulse: [0.12, 0.08],
        }
    }
}

/// The scripted camera-travel loop and its glitch pulse.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelConfig {
    /// Seconds per travel cycle.
    pub duration: f32,
    /// Easing from start to end values.
    pub easing: Easing,
    /// Camera depth at cycle start.
    pub start_camera_z: f32,
    /// Camera depth at cycle end.
    pub end_camera_z: f32,
    /// Field of view at cycle start.
    pub start_fov_deg: f32,
    /// Field of view at cycle end.
    pub end_fov_deg: f32,
    /// Bloom strength at cycle start.
    pub start_bloom: f32,
    /// Bloom strength at cycle end.
    pub end_bloom: f32,
    /// Glitch intensity set at the end of each cycle.
    pub glitch_strength: f32,
    /// Glitch decay rate (1/s).
    pub glitch_decay_rate: f32,
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            duration: 8.0,
            easing: Easing::ExponentialInOut,
            start_camera_z: 2.0,
            end_camera_z: -3.0,
            start_fov_deg: 60.0,
            end_fov_deg: 50.0,
            start_bloom: 0.35,
            end_bloom: 0.9,
            glitch_strength: 1.0,
            glitch_decay_rate: 3.5,
        }
    }
}

/// Complete configuration of the rain field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainConfig {
    /// Engine-level settings.
    pub engine: EngineConfig,
    /// Camera parameters for the viewing volume.
    pub volume: VolumeConfig,
    /// Lane packing.
    pub lanes: LaneConfig,
    /// Falling motion.
    pub fall: FallConfig,
    /// Flicker events.
    pub flicker: FlickerConfig,
    /// Sparkle runs.
    pub sparkle: SparkleConfig,
    /// Bursts.
    pub burst: BurstConfig,
    /// Ripple wave.
    pub ripple: RippleConfig,
    /// Color and atmosphere.
    pub shading: ShadingConfig,
    /// Head markers.
    pub markers: MarkerConfig,
    /// Ambient particles.
    pub particles: ParticleConfig,
    /// Travel loop.
    pub travel: TravelConfig,
    /// Camera sway and grid pulse.
    pub ambience: AmbienceConfig,
}

impl RainConfig {
    /// Derives a configuration from the scene-level knobs.
    ///
    /// `stream_count = round(75 * density)`, particle count
    /// `round(1600 * density)`, `speed_factor = 0.85 + (speed - 1) * 0.8`,
    /// `brightness = 0.85 + glow * 0.45`.
    #[must_use]
    pub fn from_knobs(knobs: SceneKnobs) -> Self {
        let mut config = Self::default();
        let density = knobs.density.max(0.0);
        let speed_factor = (0.85 + (knobs.speed - 1.0) * 0.8).max(0.0);

        config.lanes.stream_count = rounded_count(75.0 * density);
        config.particles.count = rounded_count(1600.0 * density);
        config.fall.speed_factor = speed_factor;
        config.particles.drift_speed = 0.35 * speed_factor;
        config.shading.brightness = 0.85 + knobs.glow.max(0.0) * 0.45;
        config
    }

    /// Parses a TOML document. Values are not sanitized.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid for the schema.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Reads and parses a TOML file. Values are not sanitized.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid TOML for the schema.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Renders the configuration as pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if a value cannot be represented.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Returns a copy with every value forced into its legal range.
    ///
    /// Non-finite values fall back to their defaults, inverted ranges are
    /// swapped, and each adjustment is logged at `warn`.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let mut c = self.clone();

        c.engine.max_dt = within("engine.max_dt", c.engine.max_dt, 1e-4, 1.0, d.engine.max_dt);

        c.volume.fov_y_deg = within("volume.fov_y_deg", c.volume.fov_y_deg, 1.0, 170.0, d.volume.fov_y_deg);
        c.volume.camera_z = finite("volume.camera_z", c.volume.camera_z, d.volume.camera_z);
        c.volume.near_z = finite("volume.near_z", c.volume.near_z, d.volume.near_z);
        c.volume.far_z = finite("volume.far_z", c.volume.far_z, d.volume.far_z);
        c.volume.overhang = within("volume.overhang", c.volume.overhang, 0.0, 1.0, d.volume.overhang);

        c.lanes.stream_count = count("lanes.stream_count", c.lanes.stream_count, 0, MAX_STREAMS);
        let (lo, hi) = ordered(
            "lanes.glyph_size",
            within("lanes.min_glyph_size", c.lanes.min_glyph_size, 0.01, 100.0, d.lanes.min_glyph_size),
            within("lanes.max_glyph_size", c.lanes.max_glyph_size, 0.01, 100.0, d.lanes.max_glyph_size),
        );
        c.lanes.min_glyph_size = lo;
        c.lanes.max_glyph_size = hi;
        c.lanes.glyph_width_mul = within("lanes.glyph_width_mul", c.lanes.glyph_width_mul, 0.01, 10.0, d.lanes.glyph_width_mul);
        c.lanes.letter_spacing = within("lanes.letter_spacing", c.lanes.letter_spacing, 0.01, 10.0, d.lanes.letter_spacing);
        c.lanes.lane_padding = within("lanes.lane_padding", c.lanes.lane_padding, 1.0, 10.0, d.lanes.lane_padding);
        c.lanes.safety_margin = within("lanes.safety_margin", c.lanes.safety_margin, 0.0, 10.0, d.lanes.safety_margin);
        c.lanes.lane_jitter = within("lanes.lane_jitter", c.lanes.lane_jitter, 0.0, 1.0, d.lanes.lane_jitter);
        c.lanes.max_jitter = within("lanes.max_jitter", c.lanes.max_jitter, 0.0, 10.0, d.lanes.max_jitter);

        let (lo, hi) = ordered(
            "fall.speed",
            within("fall.min_speed", c.fall.min_speed, 0.0, 1_000.0, d.fall.min_speed),
            within("fall.max_speed", c.fall.max_speed, 0.0, 1_000.0, d.fall.max_speed),
        );
        c.fall.min_speed = lo;
        c.fall.max_speed = hi;
        c.fall.speed_factor = within("fall.speed_factor", c.fall.speed_factor, 0.0, 100.0, d.fall.speed_factor);
        let min_tail = count("fall.min_tail", c.fall.min_tail, MIN_TAIL, MAX_TAIL);
        let max_tail = count("fall.max_tail", c.fall.max_tail, MIN_TAIL, MAX_TAIL);
        c.fall.min_tail = min_tail.min(max_tail);
        c.fall.max_tail = min_tail.max(max_tail);
        c.fall.char_step = within("fall.char_step", c.fall.char_step, 0.1, 10.0, d.fall.char_step);
        c.fall.speed_ease_rate = within("fall.speed_ease_rate", c.fall.speed_ease_rate, 0.0, 1_000.0, d.fall.speed_ease_rate);
        let (lo, hi) = ordered(
            "fall.respawn_margin",
            within("fall.respawn_margin_min", c.fall.respawn_margin_min, 0.0, 10.0, d.fall.respawn_margin_min),
            within("fall.respawn_margin_max", c.fall.respawn_margin_max, 0.0, 10.0, d.fall.respawn_margin_max),
        );
        c.fall.respawn_margin_min = lo;
        c.fall.respawn_margin_max = hi;
        let (lo, hi) = ordered(
            "fall.base_opacity",
            within("fall.min_base_opacity", c.fall.min_base_opacity, 0.0, 1.0, d.fall.min_base_opacity),
            within("fall.max_base_opacity", c.fall.max_base_opacity, 0.0, 1.0, d.fall.max_base_opacity),
        );
        c.fall.min_base_opacity = lo;
        c.fall.max_base_opacity = hi;
        let (lo, hi) = ordered(
            "fall.hue_jitter",
            within("fall.min_hue_jitter", c.fall.min_hue_jitter, -180.0, 180.0, d.fall.min_hue_jitter),
            within("fall.max_hue_jitter", c.fall.max_hue_jitter, -180.0, 180.0, d.fall.max_hue_jitter),
        );
        c.fall.min_hue_jitter = lo;
        c.fall.max_hue_jitter = hi;

        c.flicker.rate = within("flicker.rate", c.flicker.rate, 0.0, 1_000.0, d.flicker.rate);
        if c.flicker.changes_per_flicker > 16 {
            warn!(field = "flicker.changes_per_flicker", value = c.flicker.changes_per_flicker, "configuration value clamped");
            c.flicker.changes_per_flicker = 16;
        }

        c.sparkle.rate = within("sparkle.rate", c.sparkle.rate, 0.0, 1_000.0, d.sparkle.rate);
        c.sparkle.avg_length = within("sparkle.avg_length", c.sparkle.avg_length, 3.0, 7.0, d.sparkle.avg_length);
        c.sparkle.speed = within("sparkle.speed", c.sparkle.speed, 0.0, 10_000.0, d.sparkle.speed);
        c.sparkle.glow_boost = within("sparkle.glow_boost", c.sparkle.glow_boost, 0.0, 1.0, d.sparkle.glow_boost);
        c.sparkle.alpha_boost = within("sparkle.alpha_boost", c.sparkle.alpha_boost, 0.0, 1.0, d.sparkle.alpha_boost);

        c.burst.rate = within("burst.rate", c.burst.rate, 0.0, 1_000.0, d.burst.rate);
        let (lo, hi) = ordered(
            "burst.duration",
            within("burst.min_duration", c.burst.min_duration, 0.0, 60.0, d.burst.min_duration),
            within("burst.max_duration", c.burst.max_duration, 0.0, 60.0, d.burst.max_duration),
        );
        c.burst.min_duration = lo;
        c.burst.max_duration = hi;
        c.burst.speed_multiplier = within("burst.speed_multiplier", c.burst.speed_multiplier, 0.0, 100.0, d.burst.speed_multiplier);
        c.burst.extra_glow = within("burst.extra_glow", c.burst.extra_glow, 0.0, 1.0, d.burst.extra_glow);

        c.ripple.period = within("ripple.period", c.ripple.period, 0.01, 10_000.0, d.ripple.period);
        c.ripple.band_height = within("ripple.band_height", c.ripple.band_height, 0.0, 1_000.0, d.ripple.band_height);
        c.ripple.strength = within("ripple.strength", c.ripple.strength, 0.0, 0.99, d.ripple.strength);
        c.ripple.min_spacing = within("ripple.min_spacing", c.ripple.min_spacing, 0.05, 1.0, d.ripple.min_spacing);

        c.shading.hue_base = finite("shading.hue_base", c.shading.hue_base, d.shading.hue_base);
        c.shading.hue_wobble = within("shading.hue_wobble", c.shading.hue_wobble, 0.0, 180.0, d.shading.hue_wobble);
        c.shading.brightness = within("shading.brightness", c.shading.brightness, 0.0, 10.0, d.shading.brightness);
        c.shading.head_lightness = within("shading.head_lightness", c.shading.head_lightness, 0.0, 1.0, d.shading.head_lightness);
        c.shading.body_lightness = within("shading.body_lightness", c.shading.body_lightness, 0.0, 1.0, d.shading.body_lightness);
        c.shading.head_alpha_lift = within("shading.head_alpha_lift", c.shading.head_alpha_lift, 0.0, 1.0, d.shading.head_alpha_lift);
        c.shading.alpha_falloff = within("shading.alpha_falloff", c.shading.alpha_falloff, 0.0, 1.0, d.shading.alpha_falloff);
        c.shading.min_body_alpha = within("shading.min_body_alpha", c.shading.min_body_alpha, 0.0, 1.0, d.shading.min_body_alpha);
        c.shading.end_glow_boost = within("shading.end_glow_boost", c.shading.end_glow_boost, 0.0, 1.0, d.shading.end_glow_boost);
        c.shading.end_alpha_boost = within("shading.end_alpha_boost", c.shading.end_alpha_boost, 0.0, 1.0, d.shading.end_alpha_boost);
        c.shading.body_lightness_lift = within("shading.body_lightness_lift", c.shading.body_lightness_lift, 0.0, 1.0, d.shading.body_lightness_lift);
        c.shading.body_alpha_lift = within("shading.body_alpha_lift", c.shading.body_alpha_lift, 0.0, 1.0, d.shading.body_alpha_lift);
        c.shading.tail_halo_width = within("shading.tail_halo_width", c.shading.tail_halo_width, 0.0, 10.0, d.shading.tail_halo_width);
        c.shading.tail_halo_blur = within("shading.tail_halo_blur", c.shading.tail_halo_blur, 0.0, 10.0, d.shading.tail_halo_blur);
        c.shading.edge_fade_span = within("shading.edge_fade_span", c.shading.edge_fade_span, 0.0, 1_000.0, d.shading.edge_fade_span);
        c.shading.fog_alpha_far = within("shading.fog_alpha_far", c.shading.fog_alpha_far, 0.0, 1.0, d.shading.fog_alpha_far);
        c.shading.fog_blur_far = within("shading.fog_blur_far", c.shading.fog_blur_far, 0.0, 10.0, d.shading.fog_blur_far);

        c.markers.bulb_size = within("markers.bulb_size", c.markers.bulb_size, 0.0, 10.0, d.markers.bulb_size);
        c.markers.bulb_intensity = within("markers.bulb_intensity", c.markers.bulb_intensity, 0.0, 10.0, d.markers.bulb_intensity);
        c.markers.size_near = within("markers.size_near", c.markers.size_near, 0.0, 10.0, d.markers.size_near);
        c.markers.size_far = within("markers.size_far", c.markers.size_far, 0.0, 10.0, d.markers.size_far);
        c.markers.intensity_near = within("markers.intensity_near", c.markers.intensity_near, 0.0, 10.0, d.markers.intensity_near);
        c.markers.intensity_far = within("markers.intensity_far", c.markers.intensity_far, 0.0, 10.0, d.markers.intensity_far);
        c.markers.bulb_width = within("markers.bulb_width", c.markers.bulb_width, 0.0, 10.0, d.markers.bulb_width);
        c.markers.bulb_height = within("markers.bulb_height", c.markers.bulb_height, 0.0, 10.0, d.markers.bulb_height);
        c.markers.trail_length = within("markers.trail_length", c.markers.trail_length, 0.0, 10.0, d.markers.trail_length);
        c.markers.trail_opacity = within("markers.trail_opacity", c.markers.trail_opacity, 0.0, 1.0, d.markers.trail_opacity);
        c.markers.pulse_amount = within("markers.pulse_amount", c.markers.pulse_amount, 0.0, 0.5, d.markers.pulse_amount);
        c.markers.pulse_rate = within("markers.pulse_rate", c.markers.pulse_rate, 0.0, 100.0, d.markers.pulse_rate);

        c.particles.count = count("particles.count", c.particles.count, 0, MAX_PARTICLES);
        c.particles.drift_speed = within("particles.drift_speed", c.particles.drift_speed, 0.0, 1_000.0, d.particles.drift_speed);
        let (lo, hi) = ordered(
            "particles.drift_factor",
            within("particles.min_drift_factor", c.particles.min_drift_factor, 0.0, 10.0, d.particles.min_drift_factor),
            within("particles.max_drift_factor", c.particles.max_drift_factor, 0.0, 10.0, d.particles.max_drift_factor),
        );
        c.particles.min_drift_factor = lo;
        c.particles.max_drift_factor = hi;
        c.particles.opacity_base = within("particles.opacity_base", c.particles.opacity_base, 0.0, 1.0, d.particles.opacity_base);
        c.particles.opacity_wave = within("particles.opacity_wave", c.particles.opacity_wave, 0.0, 1.0, d.particles.opacity_wave);
        c.particles.opacity_rate = within("particles.opacity_rate", c.particles.opacity_rate, 0.0, 100.0, d.particles.opacity_rate);

        c.travel.duration = within("travel.duration", c.travel.duration, 0.1, 3_600.0, d.travel.duration);
        c.travel.start_camera_z = finite("travel.start_camera_z", c.travel.start_camera_z, d.travel.start_camera_z);
        c.travel.end_camera_z = finite("travel.end_camera_z", c.travel.end_camera_z, d.travel.end_camera_z);
        c.travel.start_fov_deg = within("travel.start_fov_deg", c.travel.start_fov_deg, 1.0, 170.0, d.travel.start_fov_deg);
        c.travel.end_fov_deg = within("travel.end_fov_deg", c.travel.end_fov_deg, 1.0, 170.0, d.travel.end_fov_deg);
        c.travel.start_bloom = within("travel.start_bloom", c.travel.start_bloom, 0.0, 10.0, d.travel.start_bloom);
        c.travel.end_bloom = within("travel.end_bloom", c.travel.end_bloom, 0.0, 10.0, d.travel.end_bloom);
        c.travel.glitch_strength = within("travel.glitch_strength", c.travel.glitch_strength, 0.0, 1.0, d.travel.glitch_strength);
        c.travel.glitch_decay_rate = within("travel.glitch_decay_rate", c.travel.glitch_decay_rate, 0.0, 1_000.0, d.travel.glitch_decay_rate);

        c.ambience.sway_x = within("ambience.sway_x", c.ambience.sway_x, 0.0, 100.0, d.ambience.sway_x);
        c.ambience.sway_x_rate = within("ambience.sway_x_rate", c.ambience.sway_x_rate, 0.0, 100.0, d.ambience.sway_x_rate);
        c.ambience.sway_y = within("ambience.sway_y", c.ambience.sway_y, 0.0, 100.0, d.ambience.sway_y);
        c.ambience.sway_y_rate = within("ambience.sway_y_rate", c.ambience.sway_y_rate, 0.0, 100.0, d.ambience.sway_y_rate);
        c.ambience.look_at_z = finite("ambience.look_at_z", c.ambience.look_at_z, d.ambience.look_at_z);
        c.ambience.grid_period = within("ambience.grid_period", c.ambience.grid_period, 0.01, 3_600.0, d.ambience.grid_period);
        c.ambience.grid_phase_offset = within("ambience.grid_phase_offset", c.ambience.grid_phase_offset, 0.0, 1.0, d.ambience.grid_phase_offset);
        c.ambience.grid_floor = within("ambience.grid_floor", c.ambience.grid_floor, 0.0, 1.0, d.ambience.grid_floor);
        for (i, pulse) in c.ambience.grid_pulse.iter_mut().enumerate() {
            *pulse = within("ambience.grid_pulse", *pulse, 0.0, 1.0, d.ambience.grid_pulse[i]);
        }

        c
    }
}

fn rounded_count(value: f32) -> usize {
    // Callers pass non-negative values; `as` saturates anything out of range.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = value.round() as usize;
    count
}

fn finite(field: &str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        warn!(field, value, fallback, "non-finite configuration value replaced");
        fallback
    }
}

fn within(field: &str, value: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    let value = finite(field, value, fallback);
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        warn!(field, value, clamped, "configuration value clamped");
    }
    clamped
}

fn ordered(range: &str, lo: f32, hi: f32) -> (f32, f32) {
    if lo <= hi {
        (lo, hi)
    } else {
        warn!(range, lo, hi, "inverted configuration range swapped");
        (hi, lo)
    }
}

fn count(field: &str, value: usize, lo: usize, hi: usize) -> usize {
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        warn!(field, value, clamped, "configuration value clamped");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_default_knobs() {
        let from_knobs = RainConfig::from_knobs(SceneKnobs::default());
        let default = RainConfig::default();
        assert_eq!(from_knobs.lanes.stream_count, default.lanes.stream_count);
        assert_eq!(from_knobs.particles.count, default.particles.count);
        assert!((from_knobs.fall.speed_factor - default.fall.speed_factor).abs() < 1e-5);
        assert!((from_knobs.shading.brightness - default.shading.brightness).abs() < 1e-5);
    }

    #[test]
    fn test_knobs_scale_counts() {
        let config = RainConfig::from_knobs(SceneKnobs {
            density: 2.0,
            speed: 1.0,
            glow: 0.0,
        });
        assert_eq!(config.lanes.stream_count, 150);
        assert_eq!(config.particles.count, 3200);
        assert!((config.fall.speed_factor - 0.85).abs() < 1e-6);
        assert!((config.shading.brightness - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RainConfig::from_toml_str(
            r#"
            [lanes]
            stream_count = 12

            [burst]
            rate = 0.5
            "#,
        )
        .expect("valid toml");
        assert_eq!(config.lanes.stream_count, 12);
        assert_eq!(config.burst.rate, 0.5);
        assert_eq!(config.burst.min_duration, BurstConfig::default().min_duration);
        assert_eq!(config.fall, FallConfig::default());
    }

    #[test]
    fn test_default_knobs_give_moderate_glow() {
        assert_eq!(SceneKnobs::default().glow, 0.6);
        let config = RainConfig::from_knobs(SceneKnobs::default());
        assert!((config.shading.brightness - 1.12).abs() < 1e-5);
    }

    #[test]
    fn test_easing_parses_snake_case() {
        let config = RainConfig::from_toml_str("[travel]\neasing = \"smooth_step\"\n").expect("valid toml");
        assert_eq!(config.travel.easing, Easing::SmoothStep);
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = RainConfig::from_toml_str("[lanes]\nstream_count = \"many\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RainConfig::from_path("/definitely/not/here/glyphrain.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("glyphrain.toml"));
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let config = RainConfig::default();
        let text = config.to_toml_string().expect("serializable");
        let parsed = RainConfig::from_toml_str(&text).expect("parses back");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_sanitized_clamps_and_orders() {
        let mut config = RainConfig::default();
        config.flicker.rate = -5.0;
        config.fall.min_speed = 9.0;
        config.fall.max_speed = 1.0;
        config.fall.min_tail = 0;
        config.ripple.min_spacing = 0.0;
        config.shading.hue_base = f32::NAN;
        config.lanes.stream_count = 1_000_000;

        let clean = config.sanitized();
        assert_eq!(clean.flicker.rate, 0.0);
        assert_eq!(clean.fall.min_speed, 1.0);
        assert_eq!(clean.fall.max_speed, 9.0);
        assert_eq!(clean.fall.min_tail, MIN_TAIL);
        assert!(clean.ripple.min_spacing > 0.0);
        assert_eq!(clean.shading.hue_base, ShadingConfig::default().hue_base);
        assert_eq!(clean.lanes.stream_count, MAX_STREAMS);
    }

    #[test]
    fn test_sanitized_default_is_unchanged() {
        let config = RainConfig::default();
        assert_eq!(config.sanitized(), config);
    }

    #[test]
    fn test_max_glyph_half_width() {
        let lanes = LaneConfig {
            max_glyph_size: 2.0,
            glyph_width_mul: 1.0,
            letter_spacing: 1.0,
            ..LaneConfig::default()
        };
        assert_eq!(lanes.max_glyph_half_width(), 1.0);
    }
}
