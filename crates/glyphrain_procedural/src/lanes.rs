//! # Lane Allocator
//!
//! Partitions the width of the viewing volume into equal lanes, one stream
//! per lane. Lanes are sized from the widest glyph any stream can draw, so
//! two streams can never overlap no matter what size each one rolls.
//!
//! ```text
//!  -half_width                                         half_width
//!  |  lane 0   |  lane 1   |  lane 2   |  ...  |  lane N-1  |
//!  |  [glyph]  |   [glyph] | [glyph]   |       |  [glyph]   |
//!        ^ jitter stays inside the free margin of its own lane
//! ```

use glyphrain_core::{LaneConfig, SimRng};
use tracing::debug;

/// One lane assignment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaneSlot {
    /// Lane index, `0..capacity`.
    pub index: usize,
    /// Horizontal center of the lane.
    pub center: f32,
    /// Largest allowed offset of a stream from `center`.
    pub max_jitter: f32,
}

impl LaneSlot {
    /// Picks a jittered position inside the lane.
    pub fn jittered_x(&self, rng: &mut SimRng) -> f32 {
        self.center + rng.range(-self.max_jitter, self.max_jitter)
    }
}

/// Result of partitioning the volume width.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneLayout {
    half_width: f32,
    lane_width: f32,
    glyph_half_width: f32,
    max_jitter: f32,
    capacity: usize,
    requested: usize,
}

impl LaneLayout {
    /// Computes the largest non-overlapping layout for `requested` streams.
    ///
    /// `lane_min_width = 2 * glyph_half_width * lane_padding + safety_margin`
    /// and `capacity = min(requested, floor(2 * half_width / lane_min_width))`.
    /// A volume narrower than one lane still gets a single centered lane
    /// with no jitter. Streams beyond capacity are dropped.
    #[must_use]
    pub fn allocate(half_width: f32, requested: usize, config: &LaneConfig) -> Self {
        let glyph_half_width = config.max_glyph_half_width().max(0.0);
        let lane_min_width =
            (2.0 * glyph_half_width * config.lane_padding + config.safety_margin).max(f32::EPSILON);
        let total = if half_width.is_finite() { 2.0 * half_width.max(0.0) } else { 0.0 };

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let fit = (total / lane_min_width).floor() as usize;
        let capacity = if total > 0.0 && requested > 0 {
            requested.min(fit.max(1))
        } else {
            0
        };

        #[allow(clippy::cast_precision_loss)]
        let lane_width = if capacity > 0 { total / capacity as f32 } else { 0.0 };
        let free_margin = (lane_width - 2.0 * glyph_half_width).max(0.0);
        let max_jitter = (free_margin * 0.5 * config.lane_jitter.clamp(0.0, 1.0))
            .min(config.max_jitter.max(0.0));

        if capacity < requested {
            debug!(
                requested,
                capacity,
                dropped = requested - capacity,
                lane_width,
                "lane capacity caps stream count"
            );
        } else {
            debug!(capacity, lane_width, max_jitter, "lanes allocated");
        }

        Self {
            half_width: total * 0.5,
            lane_width,
            glyph_half_width,
            max_jitter,
            capacity,
            requested,
        }
    }

    /// Number of lanes (and live streams).
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Streams requested but dropped for lack of room.
    #[inline]
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.requested - self.capacity
    }

    /// Width of every lane.
    #[inline]
    #[must_use]
    pub fn lane_width(&self) -> f32 {
        self.lane_width
    }

    /// Half width of the widest glyph.
    #[inline]
    #[must_use]
    pub fn glyph_half_width(&self) -> f32 {
        self.glyph_half_width
    }

    /// Horizontal extent of the widest glyph; the minimum distance between
    /// streams in different lanes.
    #[inline]
    #[must_use]
    pub fn glyph_footprint(&self) -> f32 {
        self.glyph_half_width * 2.0
    }

    /// Largest jitter any stream may take.
    #[inline]
    #[must_use]
    pub fn max_jitter(&self) -> f32 {
        self.max_jitter
    }

    /// Center of lane `index`: `-half_width + (index + 0.5) * lane_width`.
    #[must_use]
    pub fn center(&self, index: usize) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let offset = (index as f32 + 0.5) * self.lane_width;
        -self.half_width + offset
    }

    /// Lane assignment for stream `index`, or `None` past capacity.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<LaneSlot> {
        (index < self.capacity).then(|| LaneSlot {
            index,
            center: self.center(index),
            max_jitter: self.max_jitter,
        })
    }

    /// All lane assignments, left to right.
    pub fn slots(&self) -> impl Iterator<Item = LaneSlot> + '_ {
        (0..self.capacity).filter_map(move |i| self.slot(i))
    }
}
