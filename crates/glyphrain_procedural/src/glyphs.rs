//! The symbol alphabet streams draw from.
//!
//! Streams store compact [`GlyphId`]s; the renderer resolves them to
//! characters once per frame.

use glyphrain_core::SimRng;

/// Half-width katakana, digits and uppercase latin.
pub const GLYPH_SET: [char; 66] = [
    'ア', 'イ', 'ウ', 'エ', 'オ', 'カ', 'キ', 'ク', 'ケ', 'コ', 'サ', 'シ',
    'ス', 'セ', 'ソ', 'タ', 'チ', 'ツ', 'テ', 'ト', 'ナ', 'ニ', 'ヌ', 'ネ',
    'ノ', 'ハ', 'ヒ', 'フ', 'ヘ', 'ホ', '0', '1', '2', '3', '4', '5',
    '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H',
    'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T',
    'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Index into [`GLYPH_SET`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphId(u16);

impl GlyphId {
    /// Wraps an index, reducing it into the alphabet.
    #[must_use]
    pub fn new(index: usize) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let id = (index % GLYPH_SET.len()) as u16;
        Self(id)
    }

    /// Index into the alphabet.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The character this glyph draws.
    #[inline]
    #[must_use]
    pub const fn symbol(self) -> char {
        GLYPH_SET[self.0 as usize]
    }

    /// Any glyph.
    pub fn random(rng: &mut SimRng) -> Self {
        Self::new(rng.index(GLYPH_SET.len()))
    }

    /// A glyph different from every glyph in `avoid`.
    pub fn random_avoiding(rng: &mut SimRng, avoid: &[GlyphId]) -> Self {
        let mut excluded = [usize::MAX; 3];
        for (slot, glyph) in excluded.iter_mut().zip(avoid) {
            *slot = glyph.index();
        }
        Self::new(rng.index_excluding(GLYPH_SET.len(), &excluded[..avoid.len().min(3)]))
    }
}
