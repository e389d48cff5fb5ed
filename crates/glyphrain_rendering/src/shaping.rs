//! # Visual Shaping
//!
//! Pure functions from simulation state to per-glyph appearance. Nothing here
//! mutates a stream; the emitter calls these once per slot per frame.
//!
//! ```text
//! position  head_y + sum(slot_step * ripple multiplier)
//! lightness head/body base + end glow | body lift + sparkle + burst
//! alpha     same boosts, then depth fog and edge fade
//! halo      strongest right behind the head, gone past end_glow_span
//! ```

use glyphrain_core::math::{clamp01, lerp, smooth01, wrap_degrees};
use glyphrain_core::{RainConfig, RippleConfig, ViewingVolume};
use glyphrain_procedural::Stream;

/// A horizontal compression band sweeping down through the field.
///
/// Inside the band the distance between adjacent slots shrinks, but never
/// below `min_spacing * slot_step`, so the tail can bunch up yet never
/// inverts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleWave {
    wave_y: f32,
    half_band: f32,
    strength: f32,
    min_spacing: f32,
}

impl RippleWave {
    /// Wave position at `time` seconds.
    ///
    /// `wave_y = top - ((t mod period) / period) * (top - bottom + band_height)`.
    /// A non-positive period or band produces a flat wave.
    #[must_use]
    pub fn at(time: f64, volume: &ViewingVolume, config: &RippleConfig) -> Self {
        if config.period <= 0.0 || config.band_height <= 0.0 || !time.is_finite() {
            return Self::flat();
        }
        let period = f64::from(config.period);
        #[allow(clippy::cast_possible_truncation)]
        let phase = (time.rem_euclid(period) / period) as f32;
        Self {
            wave_y: volume.top - phase * (volume.height() + config.band_height),
            half_band: config.band_height * 0.5,
            strength: config.strength.clamp(0.0, 1.0),
            min_spacing: config.min_spacing.clamp(f32::EPSILON, 1.0),
        }
    }

    /// A wave that leaves every step untouched.
    #[must_use]
    pub const fn flat() -> Self {
        Self {
            wave_y: 0.0,
            half_band: 0.0,
            strength: 0.0,
            min_spacing: 1.0,
        }
    }

    /// Vertical center of the band.
    #[inline]
    #[must_use]
    pub fn wave_y(&self) -> f32 {
        self.wave_y
    }

    /// Step multiplier for a slot whose un-rippled position is `y`.
    ///
    /// Smoothly falls from 1 at the band edge to `1 - strength` at its center.
    #[must_use]
    pub fn step_multiplier(&self, y: f32) -> f32 {
        if self.half_band <= 0.0 {
            return 1.0;
        }
        let dy = (y - self.wave_y).abs();
        if dy >= self.half_band {
            return 1.0;
        }
        let k = smooth01(1.0 - dy / self.half_band);
        (1.0 - self.strength * k).max(self.min_spacing)
    }

    /// Positions of `count` slots starting at `head_y`, accumulated from the
    /// head.
    pub fn slot_positions(&self, head_y: f32, slot_step: f32, count: usize) -> RippledSlots<'_> {
        RippledSlots {
            wave: self,
            head_y,
            slot_step,
            count,
            next: 0,
            y: head_y,
        }
    }
}

/// Iterator over rippled slot positions, head first.
#[derive(Clone, Debug)]
pub struct RippledSlots<'a> {
    wave: &'a RippleWave,
    head_y: f32,
    slot_step: f32,
    count: usize,
    next: usize,
    y: f32,
}

impl Iterator for RippledSlots<'_> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.next >= self.count {
            return None;
        }
        if self.next > 0 {
            #[allow(clippy::cast_precision_loss)]
            let raw = self.head_y + self.next as f32 * self.slot_step;
            self.y += self.slot_step * self.wave.step_multiplier(raw);
        }
        self.next += 1;
        Some(self.y)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for RippledSlots<'_> {}

/// Fade toward the top and bottom of the volume.
///
/// `smooth01((y - bottom) / span) * smooth01((top - y) / span)`; with no span
/// the fade is a hard cut at the volume edges.
#[must_use]
pub fn edge_fade(y: f32, volume: &ViewingVolume, span: f32) -> f32 {
    if span <= 0.0 {
        return if y >= volume.bottom && y <= volume.top { 1.0 } else { 0.0 };
    }
    smooth01((y - volume.bottom) / span) * smooth01((volume.top - y) / span)
}

/// Appearance of one slot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SlotShade {
    /// Hue in degrees.
    pub hue: f32,
    /// HSL lightness.
    pub lightness: f32,
    /// Opacity.
    pub alpha: f32,
    /// Halo width.
    pub halo_width: f32,
    /// Halo blur.
    pub halo_blur: f32,
}

/// Per-stream values shared by every slot in one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamLook {
    /// Smoothed depth, 0 near and 1 far.
    pub depth_factor: f32,
    /// Stream hue before the per-slot offset.
    pub hue: f32,
    /// Base opacity.
    pub base_opacity: f32,
    /// Number of slots.
    pub tail_len: usize,
    /// Burst freshness while bursting (1 at start, 0 at end).
    pub burst_freshness: Option<f32>,
}

impl StreamLook {
    /// Captures the frame-constant look of `stream` (the `index`-th stream).
    #[must_use]
    pub fn new(stream: &Stream, index: usize, volume: &ViewingVolume, config: &RainConfig, time: f64) -> Self {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
        let wobble = ((time + index as f64) * 0.1).sin() as f32;
        Self {
            depth_factor: volume.depth_factor(stream.depth()),
            hue: config.shading.hue_base + stream.hue_jitter() + wobble * config.shading.hue_wobble,
            base_opacity: stream.base_opacity(),
            tail_len: stream.tail_len(),
            burst_freshness: stream.burst().is_active().then(|| stream.burst().freshness()),
        }
    }

    /// Shades `slot` sitting at height `y`.
    #[must_use]
    pub fn shade(&self, slot: usize, y: f32, sparked: bool, volume: &ViewingVolume, config: &RainConfig) -> SlotShade {
        let shading = &config.shading;
        let d = self.depth_factor;
        let is_head = slot == 0;
        #[allow(clippy::cast_precision_loss)]
        let (index, tail) = (slot as f32, self.tail_len as f32);

        let (mut lightness, mut alpha) = if is_head {
            (shading.head_lightness, (self.base_opacity + shading.head_alpha_lift).min(1.0))
        } else {
            (
                shading.body_lightness,
                (self.base_opacity - index * shading.alpha_falloff).max(shading.min_body_alpha),
            )
        };

        let glow = near_head_glow(slot, shading.end_glow_span);
        if slot <= shading.end_glow_span as usize {
            let fade = lerp(1.0, 0.75, d);
            lightness = (lightness + shading.end_glow_boost * glow * fade).min(0.99);
            alpha = (alpha + shading.end_alpha_boost * glow * fade).min(1.0);
        } else {
            let fade = lerp(1.0, 0.85, d);
            let down_tail = 1.0 - (index / tail.max(1.0)) * 0.6;
            lightness = (lightness + shading.body_lightness_lift * fade * down_tail).min(0.9);
            alpha = (alpha + shading.body_alpha_lift * fade * down_tail).min(0.9);
        }

        if sparked {
            lightness = (lightness + config.sparkle.glow_boost * 0.6).min(0.99);
            alpha = (alpha + config.sparkle.alpha_boost * 0.6).min(1.0);
        }

        if let Some(k) = self.burst_freshness {
            lightness = (lightness + config.burst.extra_glow * (0.6 + 0.4 * k)).min(0.99);
            alpha = (alpha + config.burst.extra_glow * (0.5 + 0.5 * k)).min(1.0);
        }

        let fog = lerp(1.0, shading.fog_alpha_far, d);
        let alpha = clamp01(alpha) * fog * edge_fade(y, volume, shading.edge_fade_span);

        let hue = if is_head {
            self.hue
        } else if sparked {
            self.hue - 2.0
        } else {
            self.hue - 6.0
        };

        SlotShade {
            hue: wrap_degrees(hue),
            lightness: lightness.clamp(0.0, 0.99),
            alpha: clamp01(alpha),
            halo_width: shading.tail_halo_width * glow,
            halo_blur: if glow > 0.0 {
                shading.tail_halo_blur * lerp(1.0, shading.fog_blur_far, d)
            } else {
                0.0
            },
        }
    }
}

/// `1 - max(1, slot) / max(1, span)` inside the glow span, 0 past it.
#[must_use]
pub fn near_head_glow(slot: usize, span: u32) -> f32 {
    if slot > span as usize {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let (slot, span) = (slot.max(1) as f32, span.max(1) as f32);
    (1.0 - slot / span).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphrain_core::ShadingConfig;

    fn volume() -> ViewingVolume {
        ViewingVolume::new(10.0, 10.0, -10.0, -6.0, -28.0)
    }

    fn ripple() -> RippleConfig {
        RippleConfig {
            period: 10.0,
            band_height: 2.0,
            strength: 0.5,
            min_spacing: 0.6,
        }
    }

    fn look(d: f32) -> StreamLook {
        StreamLook {
            depth_factor: d,
            hue: 120.0,
            base_opacity: 0.5,
            tail_len: 16,
            burst_freshness: None,
        }
    }

    #[test]
    fn test_wave_sweeps_top_to_bottom() {
        let wave = RippleWave::at(0.0, &volume(), &ripple());
        assert_eq!(wave.wave_y(), 10.0);
        let wave = RippleWave::at(5.0, &volume(), &ripple());
        // halfway through (20 + 2)
        assert!((wave.wave_y() - (10.0 - 11.0)).abs() < 1e-4);
        let wave = RippleWave::at(15.0, &volume(), &ripple());
        assert!((wave.wave_y() + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_multiplier_profile() {
        let wave = RippleWave::at(5.0, &volume(), &ripple());
        let center = wave.wave_y();
        // strength 0.5 bottoms out at 0.5, clamped up to min_spacing
        assert!((wave.step_multiplier(center) - 0.6).abs() < 1e-6);
        assert_eq!(wave.step_multiplier(center + 1.0), 1.0);
        assert_eq!(wave.step_multiplier(center - 3.0), 1.0);
        let mid = wave.step_multiplier(center + 0.5);
        assert!(mid > 0.6 && mid < 1.0);
    }

    #[test]
    fn test_flat_wave_keeps_even_spacing() {
        let wave = RippleWave::flat();
        let ys: Vec<f32> = wave.slot_positions(-2.0, 1.5, 4).collect();
        assert_eq!(ys, vec![-2.0, -0.5, 1.0, 2.5]);
        let zero_period = RippleConfig { period: 0.0, ..ripple() };
        assert_eq!(RippleWave::at(3.0, &volume(), &zero_period), RippleWave::flat());
    }

    #[test]
    fn test_slot_positions_compress_inside_band() {
        let wave = RippleWave::at(5.0, &volume(), &ripple());
        let head = wave.wave_y() - 0.1;
        let ys: Vec<f32> = wave.slot_positions(head, 1.0, 3).collect();
        assert_eq!(ys.len(), 3);
        assert_eq!(ys[0], head);
        assert!(ys[1] - ys[0] < 1.0);
        assert!(ys[1] - ys[0] >= 0.6 - 1e-6);
    }

    #[test]
    fn test_edge_fade() {
        let v = volume();
        assert_eq!(edge_fade(0.0, &v, 1.5), 1.0);
        assert_eq!(edge_fade(10.0, &v, 1.5), 0.0);
        assert_eq!(edge_fade(-10.0, &v, 1.5), 0.0);
        assert_eq!(edge_fade(12.0, &v, 1.5), 0.0);
        let near_top = edge_fade(9.5, &v, 1.5);
        assert!(near_top > 0.0 && near_top < 1.0);
        assert_eq!(edge_fade(10.0, &v, 0.0), 1.0);
        assert_eq!(edge_fade(10.5, &v, 0.0), 0.0);
    }

    #[test]
    fn test_near_head_glow() {
        assert_eq!(near_head_glow(0, 3), near_head_glow(1, 3));
        assert!((near_head_glow(1, 3) - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(near_head_glow(3, 3), 0.0);
        assert_eq!(near_head_glow(4, 3), 0.0);
        assert_eq!(near_head_glow(0, 0), 0.0);
    }

    #[test]
    fn test_head_is_brighter_than_tail() {
        let config = RainConfig::default();
        let head = look(0.0).shade(0, 0.0, false, &volume(), &config);
        let tail = look(0.0).shade(12, 0.0, false, &volume(), &config);
        assert!(head.lightness > tail.lightness);
        assert!(head.alpha > tail.alpha);
        assert!(head.halo_width > 0.0);
        assert_eq!(tail.halo_width, 0.0);
        assert_eq!(tail.halo_blur, 0.0);
        assert!((head.hue - 120.0).abs() < 1e-4);
        assert!((tail.hue - 114.0).abs() < 1e-4);
    }

    #[test]
    fn test_fog_dims_far_streams() {
        let config = RainConfig::default();
        let near = look(0.0).shade(5, 0.0, false, &volume(), &config);
        let far = look(1.0).shade(5, 0.0, false, &volume(), &config);
        assert!(far.alpha < near.alpha);
        let near_head = look(0.0).shade(1, 0.0, false, &volume(), &config);
        let far_head = look(1.0).shade(1, 0.0, false, &volume(), &config);
        assert!(far_head.halo_blur > near_head.halo_blur);
    }

    #[test]
    fn test_sparkle_and_burst_boost() {
        let config = RainConfig::default();
        let plain = look(0.5).shade(6, 0.0, false, &volume(), &config);
        let sparked = look(0.5).shade(6, 0.0, true, &volume(), &config);
        assert!(sparked.lightness > plain.lightness);
        assert!((sparked.hue - (plain.hue + 4.0)).abs() < 1e-4);

        let fresh = StreamLook {
            burst_freshness: Some(1.0),
            ..look(0.5)
        };
        let late = StreamLook {
            burst_freshness: Some(0.0),
            ..look(0.5)
        };
        let fresh = fresh.shade(6, 0.0, false, &volume(), &config);
        let late = late.shade(6, 0.0, false, &volume(), &config);
        assert!(fresh.alpha >= late.alpha);
        assert!(late.lightness > plain.lightness);
    }

    #[test]
    fn test_shade_stays_in_range() {
        let config = RainConfig {
            shading: ShadingConfig {
                end_glow_boost: 5.0,
                end_alpha_boost: 5.0,
                ..ShadingConfig::default()
            },
            ..RainConfig::default()
        };
        let hot = StreamLook {
            base_opacity: 3.0,
            hue: -30.0,
            burst_freshness: Some(1.0),
            ..look(0.0)
        };
        for slot in 0..16 {
            let shade = hot.shade(slot, 0.0, slot % 2 == 0, &volume(), &config);
            assert!((0.0..=0.99).contains(&shade.lightness));
            assert!((0.0..=1.0).contains(&shade.alpha));
            assert!((0.0..360.0).contains(&shade.hue));
        }
    }
}
