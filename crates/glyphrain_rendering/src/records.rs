//! GPU-uploadable frame records.
//!
//! Both records are `#[repr(C)]`, `Pod` and a multiple of 16 bytes, so a
//! renderer can copy a slice of them straight into an instance buffer with
//! `bytemuck::cast_slice`.

use bytemuck::{Pod, Zeroable};

/// One drawable glyph (48 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GlyphInstance {
    /// World position (x, y, z).
    pub position: [f32; 3],
    /// Unicode scalar of the symbol.
    pub symbol: u32,
    /// Hue in degrees, `[0, 360)`.
    pub hue: f32,
    /// HSL lightness, `[0, 0.99]`.
    pub lightness: f32,
    /// Opacity after fog and edge fade, `[0, 1]`.
    pub alpha: f32,
    /// Glyph size.
    pub size: f32,
    /// Outline halo width.
    pub halo_width: f32,
    /// Outline halo blur.
    pub halo_blur: f32,
    /// Index of the owning stream.
    pub stream: u32,
    /// Slot inside the stream (0 = head).
    pub slot: u32,
}

impl GlyphInstance {
    /// Size of a record in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// The symbol as a `char`.
    #[inline]
    #[must_use]
    pub fn symbol_char(&self) -> Option<char> {
        char::from_u32(self.symbol)
    }

    /// True for the leading glyph of a stream.
    #[inline]
    #[must_use]
    pub const fn is_head(&self) -> bool {
        self.slot == 0
    }
}

/// Bulb and trail sprite at the head of one stream (48 bytes).
///
/// Scales are full sprite extents (width, height).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct HeadMarker {
    /// Bulb position.
    pub position: [f32; 3],
    /// Bulb intensity, `[0, 1]`.
    pub intensity: f32,
    /// Bulb extent (width, height).
    pub scale: [f32; 2],
    /// Trail extent (width, height).
    pub trail_scale: [f32; 2],
    /// Trail position, just below the head.
    pub trail_position: [f32; 3],
    /// Trail intensity, `[0, 1]`.
    pub trail_intensity: f32,
}

impl HeadMarker {
    /// Size of a record in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}
