//! Text measurement.
//!
//! Chart geometry depends on measured text widths, so the layout engine
//! takes a [`TextMeasurer`] instead of a concrete font.

use std::path::Path;

use rank_common::{RankError, RankResult};
use rusttype::{point, Font, Scale};

/// Measures the advance width of a single line of text.
pub trait TextMeasurer: Send + Sync {
    /// Width in pixels of `text` at `font_size` pixels.
    fn measure(&self, text: &str, font_size: f32) -> f32;
}

/// Measurement backed by a TrueType font.
pub struct FontMeasurer {
    font: Font<'static>,
}

impl FontMeasurer {
    pub fn from_bytes(bytes: Vec<u8>) -> RankResult<Self> {
        let font = Font::try_from_vec(bytes).ok_or_else(|| {
            RankError::RenderServiceUnavailable("font data could not be parsed".to_string())
        })?;
        Ok(Self { font })
    }

    pub fn from_file(path: impl AsRef<Path>) -> RankResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            RankError::RenderServiceUnavailable(format!(
                "failed to read font {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_bytes(bytes)
    }

    pub fn font(&self) -> &Font<'static> {
        &self.font
    }

    /// Distance from the top of the line box to the baseline.
    pub fn ascent(&self, font_size: f32) -> f32 {
        self.font.v_metrics(Scale::uniform(font_size)).ascent
    }
}

impl TextMeasurer for FontMeasurer {
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        let scale = Scale::uniform(font_size);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }
}

/// Font-independent measurement with fixed per-character advances.
///
/// ASCII characters advance `ascii_em` of the font size, everything else a
/// full em, which approximates CJK text in a proportional font.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMeasurer {
    pub ascii_em: f32,
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self { ascii_em: 0.5 }
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|c| {
                if c.is_ascii() {
                    font_size * self.ascii_em
                } else {
                    font_size
                }
            })
            .sum()
    }
}
