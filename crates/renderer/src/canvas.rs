//! Rasterization of draw operations onto an RGBA canvas.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageOutputFormat, Pixel, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rank_common::{RankResult, Rgba as Color};
use rusttype::Scale;
use tracing::warn;

use crate::layout::{DrawOp, Rect, TextAlign};
use crate::text::{FontMeasurer, TextMeasurer};

/// Replays [`DrawOp`]s onto an image.
///
/// Without a font, text operations are skipped.
pub struct Rasterizer<'f> {
    font: Option<&'f FontMeasurer>,
}

impl<'f> Rasterizer<'f> {
    pub fn new(font: Option<&'f FontMeasurer>) -> Self {
        Self { font }
    }

    /// Draw every operation, translated by `(dx, dy)`.
    pub fn draw_all(&self, canvas: &mut RgbaImage, ops: &[DrawOp], dx: f32, dy: f32) {
        for op in ops {
            self.draw(canvas, op, dx, dy);
        }
    }

    pub fn draw(&self, canvas: &mut RgbaImage, op: &DrawOp, dx: f32, dy: f32) {
        match op {
            DrawOp::FillRect { rect, color } => fill_rect(canvas, &offset(rect, dx, dy), *color),
            DrawOp::Image {
                image,
                source,
                dest,
                opacity,
                ..
            } => draw_image(canvas, image, source.as_ref(), &offset(dest, dx, dy), *opacity),
            DrawOp::Text {
                text,
                x,
                baseline,
                align,
                color,
                font_size,
            } => {
                let Some(font) = self.font else {
                    warn!(text = %text, "No font loaded, skipping text");
                    return;
                };
                let left = match align {
                    TextAlign::Left => *x,
                    TextAlign::Right => *x - font.measure(text, *font_size),
                };
                let top = *baseline - font.ascent(*font_size);
                draw_text_mut(
                    canvas,
                    Rgba(color.to_array()),
                    (left + dx).round() as i32,
                    (top + dy).round() as i32,
                    Scale::uniform(*font_size),
                    font.font(),
                    text,
                );
            }
        }
    }
}

fn offset(rect: &Rect, dx: f32, dy: f32) -> Rect {
    Rect::new(rect.x + dx, rect.y + dy, rect.width, rect.height)
}

/// Alpha-blend a solid rectangle, clipped to the canvas.
pub fn fill_rect(canvas: &mut RgbaImage, rect: &Rect, color: Color) {
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);
    let x0 = (rect.x.round() as i64).clamp(0, w);
    let y0 = (rect.y.round() as i64).clamp(0, h);
    let x1 = (rect.right().round() as i64).clamp(0, w);
    let y1 = (rect.bottom().round() as i64).clamp(0, h);

    let paint = Rgba(color.to_array());
    for y in y0..y1 {
        for x in x0..x1 {
            canvas.get_pixel_mut(x as u32, y as u32).blend(&paint);
        }
    }
}

/// Draw `image` (or its `source` crop) scaled into `dest` at `opacity`.
///
/// A source rectangle reaching past the image is clipped to the image and
/// the destination shrinks proportionally.
pub fn draw_image(
    canvas: &mut RgbaImage,
    image: &RgbaImage,
    source: Option<&Rect>,
    dest: &Rect,
    opacity: f32,
) {
    let full = Rect::new(0.0, 0.0, image.width() as f32, image.height() as f32);
    let source = source.copied().unwrap_or(full);
    if source.width <= 0.0 || source.height <= 0.0 {
        return;
    }

    let sx0 = source.x.max(0.0);
    let sy0 = source.y.max(0.0);
    let sx1 = source.right().min(full.width);
    let sy1 = source.bottom().min(full.height);
    if sx1 <= sx0 || sy1 <= sy0 {
        return;
    }

    let scale_x = dest.width / source.width;
    let scale_y = dest.height / source.height;
    let target = Rect::new(
        dest.x + (sx0 - source.x) * scale_x,
        dest.y + (sy0 - source.y) * scale_y,
        (sx1 - sx0) * scale_x,
        (sy1 - sy0) * scale_y,
    );
    let tw = target.width.round() as u32;
    let th = target.height.round() as u32;
    if tw == 0 || th == 0 {
        return;
    }

    let crop_w = ((sx1 - sx0).round() as u32).max(1);
    let crop_h = ((sy1 - sy0).round() as u32).max(1);
    let cropped = imageops::crop_imm(image, sx0 as u32, sy0 as u32, crop_w, crop_h).to_image();
    let mut scaled = if (crop_w, crop_h) == (tw, th) {
        cropped
    } else {
        imageops::resize(&cropped, tw, th, FilterType::Triangle)
    };

    let opacity = opacity.clamp(0.0, 1.0);
    if opacity < 1.0 {
        for pixel in scaled.pixels_mut() {
            pixel[3] = (pixel[3] as f32 * opacity).round() as u8;
        }
    }

    imageops::overlay(
        canvas,
        &scaled,
        target.x.round() as i64,
        target.y.round() as i64,
    );
}

/// Encode a canvas as PNG.
pub fn encode_png(canvas: &RgbaImage) -> RankResult<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(canvas.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}
