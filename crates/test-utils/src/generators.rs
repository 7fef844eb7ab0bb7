//! In-memory image generators.
//!
//! Everything is encoded as PNG so tests exercise the same decode path as
//! avatars and asset files.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .expect("PNG encoding of an in-memory image cannot fail");
    bytes
}

/// A `size`×`size` PNG filled with one opaque color.
pub fn solid_png(size: u32, rgb: [u8; 3]) -> Vec<u8> {
    encode_png(&solid_image(size, size, rgb))
}

/// A `width`×`height` image filled with one opaque color.
pub fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

/// A square PNG whose left half is `left` and right half is `right`.
///
/// # Example
///
/// ```
/// let png = test_utils::split_png(4, [0, 0, 0], [255, 255, 255]);
/// assert!(!png.is_empty());
/// ```
pub fn split_png(size: u32, left: [u8; 3], right: [u8; 3]) -> Vec<u8> {
    let image = RgbaImage::from_fn(size, size, |x, _| {
        let c = if x < size / 2 { left } else { right };
        Rgba([c[0], c[1], c[2], 255])
    });
    encode_png(&image)
}

/// Bytes that no image decoder accepts.
pub fn corrupt_image_bytes() -> Vec<u8> {
    b"definitely not an image".to_vec()
}
