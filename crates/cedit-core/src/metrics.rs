/// Font metrics capability consumed by pixel-accurate navigation.
use serde::{Deserialize, Serialize};

/// Per-character advance widths supplied by the rendering host.
///
/// The engine never rasterizes glyphs; it only needs horizontal advances
/// (including kerning) and the line height to map logical positions to
/// screen coordinates.
pub trait FontMetrics {
    /// Returns the horizontal advance of `current`, including any kerning
    /// adjustment against the following byte `next`.
    fn advance(&self, current: u8, next: u8) -> f32;

    /// Returns the vertical distance between consecutive lines.
    fn line_height(&self) -> f32;
}

/// Fixed-width metrics for tests and headless hosts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Monospace {
    /// Advance width of every character.
    pub width: f32,
    /// Line height.
    pub height: f32,
}

impl Default for Monospace {
    fn default() -> Self {
        Self {
            width: 8.0,
            height: 16.0,
        }
    }
}

impl FontMetrics for Monospace {
    fn advance(&self, _current: u8, _next: u8) -> f32 {
        self.width
    }

    fn line_height(&self) -> f32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monospace_ignores_kerning_pair() {
        let m = Monospace::default();
        assert_eq!(m.advance(b'a', b'b'), m.advance(b'W', b'.'));
    }

    #[test]
    fn test_monospace_defaults() {
        let m = Monospace::default();
        assert_eq!(m.width, 8.0);
        assert_eq!(m.height, 16.0);
    }
}
