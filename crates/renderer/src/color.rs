//! Color analysis of avatar and background images.
//!
//! The row color of a chart bar is the mean color of the user's avatar (or
//! custom bar background). Text drawn over it uses a contrasting color that
//! is either black/white for very light/dark backgrounds, or an HSL-shifted
//! variant of the background for mid-brightness ones.

use image::RgbaImage;
use rank_common::{RankError, RankResult, Rgb};

/// Lower bound (exclusive) of the mid-brightness band.
const MID_BAND_LOW: f64 = 0.2;

/// Upper bound (exclusive) of the mid-brightness band. Backgrounds at or
/// above it get black text.
const MID_BAND_HIGH: f64 = 0.8;

/// Amount lightness and saturation are pushed away from 0.5.
const HSL_SHIFT: f64 = 0.3;

/// Decode encoded image bytes into RGBA pixels.
pub fn decode_rgba(bytes: &[u8]) -> RankResult<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| RankError::AssetDecode(e.to_string()))
}

/// Average color of encoded image bytes.
pub fn average_color(bytes: &[u8]) -> RankResult<Rgb> {
    Ok(average_color_of(&decode_rgba(bytes)?))
}

/// Per-channel mean over all pixels, truncated. Alpha is ignored.
pub fn average_color_of(image: &RgbaImage) -> Rgb {
    let count = image.width() as u64 * image.height() as u64;
    if count == 0 {
        return Rgb::BLACK;
    }

    let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
    for pixel in image.pixels() {
        r += pixel[0] as u64;
        g += pixel[1] as u64;
        b += pixel[2] as u64;
    }

    Rgb::new((r / count) as u8, (g / count) as u8, (b / count) as u8)
}

/// Perceived brightness in `[0, 1]` using YIQ luma weights.
pub fn yiq_brightness(color: Rgb) -> f64 {
    (color.r as f64 * 299.0 + color.g as f64 * 587.0 + color.b as f64 * 114.0) / 1000.0 / 255.0
}

/// Pick a readable text color for the given background.
pub fn contrasting_text_color(background: Rgb) -> Rgb {
    let brightness = yiq_brightness(background);
    if brightness > MID_BAND_LOW && brightness < MID_BAND_HIGH {
        shifted_hsl_color(background)
    } else if brightness >= MID_BAND_HIGH {
        Rgb::BLACK
    } else {
        Rgb::WHITE
    }
}

fn shifted_hsl_color(background: Rgb) -> Rgb {
    let mut hsl = Hsl::from_rgb(background);
    hsl.l = push_from_middle(hsl.l);
    hsl.s = push_from_middle(hsl.s);
    hsl.to_rgb()
}

fn push_from_middle(v: f64) -> f64 {
    if v < 0.5 {
        v + HSL_SHIFT
    } else {
        v - HSL_SHIFT
    }
}

/// Hue, saturation and lightness, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub fn from_rgb(color: Rgb) -> Self {
        let r = color.r as f64 / 255.0;
        let g = color.g as f64 / 255.0;
        let b = color.b as f64 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Self { h: 0.0, s: 0.0, l };
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };

        // Channel precedence on ties: red, then green, then blue.
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Self { h: h / 6.0, s, l }
    }

    pub fn to_rgb(&self) -> Rgb {
        let (r, g, b) = if self.s == 0.0 {
            (self.l, self.l, self.l)
        } else {
            let q = if self.l < 0.5 {
                self.l * (1.0 + self.s)
            } else {
                self.l + self.s - self.l * self.s
            };
            let p = 2.0 * self.l - q;
            (
                hue_to_channel(p, q, self.h + 1.0 / 3.0),
                hue_to_channel(p, q, self.h),
                hue_to_channel(p, q, self.h - 1.0 / 3.0),
            )
        };

        Rgb::new(to_byte(r), to_byte(g), to_byte(b))
    }
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn to_byte(channel: f64) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}
