//! # Render-State Emitter
//!
//! Turns the physical state of the field into drawable records, once per
//! frame. The emitter owns its output buffers and clears them each frame, so
//! after the first few frames no allocation happens.
//!
//! Inputs are passed explicitly through [`FrameInputs`]; the emitter reads no
//! state of its own besides those buffers.

use glyphrain_core::math::lerp;
use glyphrain_core::{RainConfig, Vec3, ViewingVolume};
use glyphrain_procedural::{LaneLayout, ParticleField, Stream, TravelPose};
use tracing::trace;

use crate::ambience::SceneAmbience;
use crate::records::{GlyphInstance, HeadMarker};
use crate::shaping::{RippleWave, StreamLook};

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, Default)]
pub struct FrameOutput {
    /// One record per stream slot, streams in lane order, head first.
    pub glyphs: Vec<GlyphInstance>,
    /// One head marker per stream.
    pub markers: Vec<HeadMarker>,
    /// Particle positions.
    pub particles: Vec<[f32; 3]>,
    /// Opacity of the whole particle field.
    pub particle_opacity: f32,
    /// Glitch intensity, `[0, 1]` for the default strength.
    pub glitch: f32,
    /// Camera and bloom parameters of the travel loop.
    pub travel: TravelPose,
    /// Camera sway and grid opacities.
    pub ambience: SceneAmbience,
    /// Simulation time of the frame in seconds.
    pub time: f64,
}

impl FrameOutput {
    fn clear(&mut self) {
        self.glyphs.clear();
        self.markers.clear();
        self.particles.clear();
        self.particle_opacity = 0.0;
    }

    /// Glyph records as raw bytes for an instance buffer.
    #[must_use]
    pub fn glyph_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.glyphs)
    }

    /// Head markers as raw bytes for an instance buffer.
    #[must_use]
    pub fn marker_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.markers)
    }

    /// True when nothing is drawable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty() && self.markers.is_empty() && self.particles.is_empty()
    }
}

/// Explicit inputs of one emission.
#[derive(Clone, Copy, Debug)]
pub struct FrameInputs<'a> {
    /// Simulation time in seconds.
    pub time: f64,
    /// Current viewing volume.
    pub volume: &'a ViewingVolume,
    /// Lane partition the streams live in.
    pub layout: &'a LaneLayout,
    /// Active configuration.
    pub config: &'a RainConfig,
    /// Streams, in lane order.
    pub streams: &'a [Stream],
    /// Ambient motes.
    pub particles: &'a ParticleField,
    /// Current glitch intensity.
    pub glitch: f32,
    /// Current travel pose.
    pub travel: TravelPose,
}

/// Converts simulation state to [`FrameOutput`].
#[derive(Clone, Debug, Default)]
pub struct RenderStateEmitter {
    output: FrameOutput,
    frames: u64,
}

impl RenderStateEmitter {
    /// Creates an emitter with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an emitter with buffers sized for a field.
    #[must_use]
    pub fn with_capacity(glyphs: usize, streams: usize, particles: usize) -> Self {
        Self {
            output: FrameOutput {
                glyphs: Vec::with_capacity(glyphs),
                markers: Vec::with_capacity(streams),
                particles: Vec::with_capacity(particles),
                ..FrameOutput::default()
            },
            frames: 0,
        }
    }

    /// Builds the frame. A degenerate volume yields no glyphs, markers or
    /// particles, only the glitch, travel and ambience values.
    pub fn emit(&mut self, inputs: &FrameInputs<'_>) -> &FrameOutput {
        self.output.clear();
        self.output.time = inputs.time;
        self.output.glitch = inputs.glitch;
        self.output.travel = inputs.travel;
        self.output.ambience = SceneAmbience::at(
            inputs.time,
            &inputs.config.ambience,
            inputs.config.shading.brightness,
        );
        self.frames += 1;

        if inputs.volume.is_degenerate() {
            trace!(frame = self.frames, "degenerate volume, empty frame");
            return &self.output;
        }

        let wave = RippleWave::at(inputs.time, inputs.volume, &inputs.config.ripple);
        for (index, stream) in inputs.streams.iter().enumerate() {
            let look = StreamLook::new(stream, index, inputs.volume, inputs.config, inputs.time);
            emit_glyphs(&mut self.output.glyphs, index, stream, &look, &wave, inputs);
            self.output
                .markers
                .push(head_marker(index, stream, &look, inputs));
        }

        self.output.particles.extend(
            inputs
                .particles
                .particles()
                .iter()
                .map(|p| p.position.to_array()),
        );
        self.output.particle_opacity = particle_opacity(inputs.config, inputs.time);

        &self.output
    }

    /// Output of the last emission.
    #[inline]
    #[must_use]
    pub fn output(&self) -> &FrameOutput {
        &self.output
    }

    /// Number of frames emitted.
    #[inline]
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

fn emit_glyphs(
    out: &mut Vec<GlyphInstance>,
    index: usize,
    stream: &Stream,
    look: &StreamLook,
    wave: &RippleWave,
    inputs: &FrameInputs<'_>,
) {
    let tail_len = stream.tail_len();
    let positions = wave.slot_positions(stream.head_y(), stream.slot_step(), tail_len);
    let stream_id = u32::try_from(index).unwrap_or(u32::MAX);

    for ((slot, y), glyph) in positions.enumerate().zip(stream.glyphs()) {
        let sparked = stream.sparkle().covers(slot, tail_len);
        let shade = look.shade(slot, y, sparked, inputs.volume, inputs.config);
        out.push(GlyphInstance {
            position: [stream.x(), y, stream.depth()],
            symbol: u32::from(glyph.symbol()),
            hue: shade.hue,
            lightness: shade.lightness,
            alpha: shade.alpha,
            size: stream.glyph_size(),
            halo_width: shade.halo_width,
            halo_blur: shade.halo_blur,
            stream: stream_id,
            slot: u32::try_from(slot).unwrap_or(u32::MAX),
        });
    }
}

/// Bulb and trail for one stream.
///
/// Sprite widths are clamped so the sprite, centered on the stream, stays
/// inside the stream's own lane.
fn head_marker(index: usize, stream: &Stream, look: &StreamLook, inputs: &FrameInputs<'_>) -> HeadMarker {
    let markers = &inputs.config.markers;
    let d = look.depth_factor;
    let size_mul = lerp(markers.size_near, markers.size_far, d);
    let intensity_mul = lerp(markers.intensity_near, markers.intensity_far, d);
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let pulse = 1.0
        + ((inputs.time * f64::from(markers.pulse_rate) + index as f64 * 0.7).sin() as f32)
            * markers.pulse_amount;
    #[allow(clippy::cast_precision_loss)]
    let head_match = 1.0 - 1.0 / (inputs.config.shading.end_glow_span.max(1) as f32);

    let max_half = max_sprite_half_width(stream, inputs.layout);
    let bursting = stream.burst().is_active();
    let (bulb_mul, trail_mul) = if bursting { (1.15, 1.1) } else { (1.0, 1.0) };

    let base = markers.bulb_size * stream.glyph_size() * size_mul * head_match;
    let bulb = base * pulse;
    let bulb_width = (bulb * markers.bulb_width * bulb_mul).min(2.0 * max_half);
    let trail_width = (base * markers.bulb_width * 0.65 * trail_mul).min(2.0 * max_half);
    let head = stream.head_position();

    HeadMarker {
        position: (head + Vec3::new(0.0, 0.0, 0.01)).to_array(),
        intensity: (0.9 * markers.bulb_intensity * intensity_mul * head_match).clamp(0.0, 1.0),
        scale: [bulb_width.max(0.0), bulb * markers.bulb_height * bulb_mul],
        trail_scale: [
            trail_width.max(0.0),
            base * markers.bulb_height * markers.trail_length * trail_mul,
        ],
        trail_position: (head + Vec3::new(0.0, -stream.slot_step() * 0.6, 0.005)).to_array(),
        trail_intensity: (markers.trail_opacity * intensity_mul * 0.9 * head_match).clamp(0.0, 1.0),
    }
}

/// `min(max(0.05, lane_half - glyph_half), lane_half - |x - center|)`.
fn max_sprite_half_width(stream: &Stream, layout: &LaneLayout) -> f32 {
    let lane_half = layout.lane_width() * 0.5;
    let room = lane_half - (stream.x() - stream.lane().center).abs();
    (lane_half - layout.glyph_half_width()).max(0.05).min(room).max(0.0)
}

/// `brightness * (opacity_base + sin(t * opacity_rate) * opacity_wave)`.
fn particle_opacity(config: &RainConfig, time: f64) -> f32 {
    let particles = &config.particles;
    #[allow(clippy::cast_possible_truncation)]
    let wave = (time * f64::from(particles.opacity_rate)).sin() as f32;
    (config.shading.brightness * (particles.opacity_base + wave * particles.opacity_wave)).clamp(0.0, 1.0)
}
