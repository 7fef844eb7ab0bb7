//! Horizontal bar chart layout.
//!
//! The engine turns ranked render data into an ordered list of draw
//! operations against an abstract canvas. Nothing here touches pixels; the
//! rasterizer in [`crate::canvas`] replays the operations.
//!
//! Geometry, for row `i` of `n`:
//!
//! ```text
//!  0      50                         50+bar          900        width
//!  +------+--------------------------+---------------+----------+
//!  |avatar| name...      [icon][icon]|  remainder    | value    |  y = 50*i
//!  +------+--------------------------+---------------+----------+
//! ```
//!
//! Draw order: per row bar fill, custom background, remainder, value label,
//! name, icons; then all avatars; then the vertical separators.

use std::sync::Arc;

use image::RgbaImage;
use rand::Rng;
use rank_common::{RankConfig, RenderDatum, Rgb, Rgba};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::assets::AssetIndex;
use crate::color::{average_color_of, contrasting_text_color, decode_rgba};
use crate::text::TextMeasurer;

/// Height of one row, equal to the avatar edge.
pub const ROW_HEIGHT: f32 = 50.0;

/// Avatar edge length.
pub const AVATAR_SIZE: f32 = 50.0;

/// Left edge of every bar.
pub const BAR_X: f32 = 50.0;

/// Width of a bar with value zero.
pub const MIN_BAR_WIDTH: f32 = 150.0;

/// Extra width of the bar holding the maximum value.
pub const BAR_SCALE_WIDTH: f32 = 700.0;

/// Right edge of the bar track.
pub const TRACK_END_X: f32 = 900.0;

/// Gap between the bar end and the value label.
pub const VALUE_GAP: f32 = 10.0;

/// Space kept right of the widest value label.
pub const RIGHT_MARGIN: f32 = 20.0;

/// Chart font size in pixels.
pub const FONT_SIZE: f32 = 30.0;

/// Left edge of the name label.
pub const NAME_X: f32 = BAR_X + 10.0;

/// Icon edge length.
pub const ICON_SIZE: f32 = 40.0;

pub const ELLIPSIS: &str = "...";

const SEPARATOR_COUNT: usize = 8;
const SEPARATOR_FIRST_X: f32 = 200.0;
const SEPARATOR_SPACING: f32 = 100.0;
const SEPARATOR_WIDTH: f32 = 3.0;
const SEPARATOR_OPACITY: f32 = 0.12;

/// Opacity of the unfilled part of the track.
const REMAINDER_OPACITY: f32 = 0.5;

/// Row color used when the avatar cannot be decoded.
pub const FALLBACK_ROW_COLOR: Rgb = Rgb::new(0xb0, 0xb0, 0xb0);

/// Axis-aligned rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    /// `x` is the left edge of the text.
    Left,
    /// `x` is the right edge of the text.
    Right,
}

/// What an image operation draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayer {
    Avatar,
    BarBackground,
    Icon,
}

/// One canvas operation.
#[derive(Debug, Clone)]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        color: Rgba,
    },
    Image {
        image: Arc<RgbaImage>,
        /// Source crop in image pixels; `None` draws the whole image.
        source: Option<Rect>,
        dest: Rect,
        opacity: f32,
        layer: ImageLayer,
    },
    Text {
        text: String,
        x: f32,
        baseline: f32,
        align: TextAlign,
        color: Rgba,
        font_size: f32,
    },
}

impl DrawOp {
    pub fn is_image(&self, wanted: ImageLayer) -> bool {
        matches!(self, DrawOp::Image { layer, .. } if *layer == wanted)
    }
}

/// Chart options taken from [`RankConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub full_background_opacity: f32,
    pub background_opacity: f32,
    pub move_icon_to_bar_end: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::from(&RankConfig::default())
    }
}

impl From<&RankConfig> for LayoutOptions {
    fn from(config: &RankConfig) -> Self {
        Self {
            full_background_opacity: config.bar_full_background_opacity,
            background_opacity: config.bar_background_opacity,
            move_icon_to_bar_end: config.move_icon_to_bar_end,
        }
    }
}

/// Result of a layout pass.
#[derive(Debug, Clone)]
pub struct ChartLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub draw_ops: Vec<DrawOp>,
}

/// Bar width for `value` when the largest value is `max_value`.
///
/// Negative values are drawn as zero.
pub fn bar_width(value: i64, max_value: i64) -> f32 {
    let max_value = max_value.max(1) as f32;
    MIN_BAR_WIDTH + BAR_SCALE_WIDTH * value.max(0) as f32 / max_value
}

/// The scale reference: the largest value, or 1 when no value is positive.
pub fn max_value(data: &[RenderDatum]) -> i64 {
    let max = data.iter().map(|d| d.value).fold(0, i64::max);
    if max == 0 {
        1
    } else {
        max
    }
}

/// Shorten `name` to fit `max_width`, ending it with `...`.
///
/// Names that already fit are returned unchanged.
pub fn truncate_name(
    measurer: &dyn TextMeasurer,
    name: &str,
    max_width: f32,
    font_size: f32,
) -> String {
    if measurer.measure(name, font_size) <= max_width {
        return name.to_string();
    }

    let mut chars: Vec<char> = name.chars().collect();
    loop {
        let candidate: String = chars.iter().collect::<String>() + ELLIPSIS;
        if chars.is_empty() || measurer.measure(&candidate, font_size) <= max_width {
            return candidate;
        }
        chars.pop();
    }
}

struct DecodedRow {
    avatar: Option<Arc<RgbaImage>>,
    avatar_color: Rgb,
    background: Option<(Arc<RgbaImage>, Rgb)>,
    /// One slot per icon asset; failed decodes stay `None`.
    icons: Vec<Option<Arc<RgbaImage>>>,
}

/// Lays out the horizontal bar chart.
pub struct ChartLayoutEngine<'a> {
    options: LayoutOptions,
    measurer: &'a dyn TextMeasurer,
}

impl<'a> ChartLayoutEngine<'a> {
    pub fn new(options: LayoutOptions, measurer: &'a dyn TextMeasurer) -> Self {
        Self { options, measurer }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Lay out `data` picking bar backgrounds with the thread RNG.
    pub fn layout(&self, data: &[RenderDatum], assets: &AssetIndex) -> ChartLayout {
        self.layout_with_rng(data, assets, &mut rand::thread_rng())
    }

    /// Lay out `data` with an explicit RNG for background selection.
    pub fn layout_with_rng<R: Rng + ?Sized>(
        &self,
        data: &[RenderDatum],
        assets: &AssetIndex,
        rng: &mut R,
    ) -> ChartLayout {
        let max_value = max_value(data);
        let canvas_width = self.canvas_width(data, max_value);
        let canvas_height = (ROW_HEIGHT * data.len() as f32) as u32;

        // Background picks are drawn in row order so a seeded RNG is
        // reproducible regardless of decode scheduling.
        let picks: Vec<Option<usize>> = data
            .iter()
            .map(|d| {
                let n = assets.backgrounds_for(&d.external_user_id).len();
                (n > 0).then(|| rng.gen_range(0..n))
            })
            .collect();

        let rows: Vec<DecodedRow> = data
            .par_iter()
            .zip(picks.par_iter())
            .map(|(datum, pick)| decode_row(datum, *pick, assets))
            .collect();

        debug!(
            rows = data.len(),
            max_value,
            canvas_width,
            canvas_height,
            "Chart layout"
        );

        let mut ops = Vec::with_capacity(data.len() * 6 + SEPARATOR_COUNT);
        for (index, (datum, row)) in data.iter().zip(&rows).enumerate() {
            self.push_row(&mut ops, index, datum, row, max_value, canvas_width);
        }

        for (index, row) in rows.iter().enumerate() {
            if let Some(avatar) = &row.avatar {
                ops.push(DrawOp::Image {
                    image: Arc::clone(avatar),
                    source: None,
                    dest: Rect::new(0.0, ROW_HEIGHT * index as f32, AVATAR_SIZE, AVATAR_SIZE),
                    opacity: 1.0,
                    layer: ImageLayer::Avatar,
                });
            }
        }

        let separator_color = Rgb::BLACK.with_opacity(SEPARATOR_OPACITY);
        for i in 0..SEPARATOR_COUNT {
            ops.push(DrawOp::FillRect {
                rect: Rect::new(
                    SEPARATOR_FIRST_X + SEPARATOR_SPACING * i as f32,
                    0.0,
                    SEPARATOR_WIDTH,
                    canvas_height as f32,
                ),
                color: separator_color,
            });
        }

        ChartLayout {
            canvas_width,
            canvas_height,
            draw_ops: ops,
        }
    }

    /// Track plus room for the widest value label.
    fn canvas_width(&self, data: &[RenderDatum], max_value: i64) -> u32 {
        let label = data
            .iter()
            .find(|d| d.value == max_value)
            .or_else(|| data.first())
            .map(|d| d.value.to_string())
            .unwrap_or_else(|| "1".to_string());
        let label_width = self.measurer.measure(&label, FONT_SIZE);

        (TRACK_END_X + VALUE_GAP + label_width + RIGHT_MARGIN) as u32
    }

    fn push_row(
        &self,
        ops: &mut Vec<DrawOp>,
        index: usize,
        datum: &RenderDatum,
        row: &DecodedRow,
        max_value: i64,
        canvas_width: u32,
    ) {
        let y = ROW_HEIGHT * index as f32;
        let bar = bar_width(datum.value, max_value);
        let bar_end = BAR_X + bar;
        let mut active_color = row.avatar_color;

        ops.push(DrawOp::FillRect {
            rect: Rect::new(BAR_X, y, bar, ROW_HEIGHT),
            color: row.avatar_color.opaque(),
        });

        if let Some((background, background_color)) = &row.background {
            if self.options.full_background_opacity > 0.0 {
                ops.push(DrawOp::Image {
                    image: Arc::clone(background),
                    source: None,
                    dest: Rect::new(BAR_X, y, TRACK_END_X - BAR_X, ROW_HEIGHT),
                    opacity: self.options.full_background_opacity,
                    layer: ImageLayer::BarBackground,
                });
            }
            ops.push(DrawOp::Image {
                image: Arc::clone(background),
                source: Some(Rect::new(0.0, 0.0, bar, ROW_HEIGHT)),
                dest: Rect::new(BAR_X, y, bar, ROW_HEIGHT),
                opacity: self.options.background_opacity,
                layer: ImageLayer::BarBackground,
            });
            active_color = *background_color;
        }

        let remainder = TRACK_END_X - bar_end;
        if remainder > 0.0 {
            ops.push(DrawOp::FillRect {
                rect: Rect::new(bar_end, y, remainder, ROW_HEIGHT),
                color: row.avatar_color.with_opacity(REMAINDER_OPACITY),
            });
        }

        let baseline = y + ROW_HEIGHT / 2.0 + 10.5;
        let contrast = contrasting_text_color(active_color).opaque();

        let value_text = datum.value.to_string();
        let value_width = self.measurer.measure(&value_text, FONT_SIZE);
        let outside_x = bar_end + VALUE_GAP;
        let (value_x, align, value_color) = if outside_x + value_width > canvas_width as f32 - 5.0 {
            (bar_end - VALUE_GAP, TextAlign::Right, contrast)
        } else {
            (outside_x, TextAlign::Left, Rgb::BLACK.opaque())
        };
        ops.push(DrawOp::Text {
            text: value_text,
            x: value_x,
            baseline,
            align,
            color: value_color,
            font_size: FONT_SIZE,
        });

        let name = truncate_name(self.measurer, &datum.name, bar - 60.0, FONT_SIZE);
        let name_end = NAME_X + self.measurer.measure(&name, FONT_SIZE);
        ops.push(DrawOp::Text {
            text: name,
            x: NAME_X,
            baseline,
            align: TextAlign::Left,
            color: contrast,
            font_size: FONT_SIZE,
        });

        for (slot, icon) in row.icons.iter().enumerate() {
            let Some(icon) = icon else { continue };
            let x = if self.options.move_icon_to_bar_end {
                bar_end - ICON_SIZE * (slot as f32 + 1.0)
            } else {
                name_end + ICON_SIZE * slot as f32 + 5.0
            };
            ops.push(DrawOp::Image {
                image: Arc::clone(icon),
                source: None,
                dest: Rect::new(x, baseline - 30.0, ICON_SIZE, ICON_SIZE),
                opacity: 1.0,
                layer: ImageLayer::Icon,
            });
        }
    }
}

fn decode_row(datum: &RenderDatum, pick: Option<usize>, assets: &AssetIndex) -> DecodedRow {
    let user = datum.external_user_id.as_str();

    let avatar = match datum.avatar_raster.as_deref().map(decode_rgba) {
        Some(Ok(image)) => Some(Arc::new(image)),
        Some(Err(e)) => {
            warn!(user_id = user, error = %e, "Skipping undecodable avatar");
            None
        }
        None => {
            debug!(user_id = user, "No avatar raster");
            None
        }
    };
    let avatar_color = avatar
        .as_deref()
        .map(average_color_of)
        .unwrap_or(FALLBACK_ROW_COLOR);

    let background = pick
        .and_then(|i| assets.backgrounds_for(user).get(i))
        .and_then(|bytes| match decode_rgba(bytes) {
            Ok(image) => {
                let color = average_color_of(&image);
                Some((Arc::new(image), color))
            }
            Err(e) => {
                warn!(user_id = user, error = %e, "Skipping undecodable bar background");
                None
            }
        });

    let icons = assets
        .icons_for(user)
        .iter()
        .map(|bytes| match decode_rgba(bytes) {
            Ok(image) => Some(Arc::new(image)),
            Err(e) => {
                warn!(user_id = user, error = %e, "Skipping undecodable icon");
                None
            }
        })
        .collect();

    DecodedRow {
        avatar,
        avatar_color,
        background,
        icons,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::FixedAdvanceMeasurer;

    #[test]
    fn test_bar_width_extremes() {
        assert_eq!(bar_width(0, 100), 150.0);
        assert_eq!(bar_width(100, 100), 850.0);
        assert_eq!(bar_width(-5, 100), 150.0);
        assert_eq!(bar_width(0, 0), 150.0);
    }

    #[test]
    fn test_truncate_keeps_fitting_names() {
        let m = FixedAdvanceMeasurer::default();
        assert_eq!(truncate_name(&m, "alice", 200.0, 30.0), "alice");
    }

    #[test]
    fn test_truncate_long_name() {
        let m = FixedAdvanceMeasurer::default();
        let name = "abcdefghijklmnopqrstuvwxyz";
        let out = truncate_name(&m, name, 150.0, 30.0);
        assert!(out.ends_with(ELLIPSIS));
        assert!(m.measure(&out, 30.0) <= 150.0);
        // 150px holds 10 ascii chars at 15px each: 7 letters plus "..."
        assert_eq!(out, "abcdefg...");
    }
}
