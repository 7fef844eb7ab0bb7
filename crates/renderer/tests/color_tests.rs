//! Tests for average color and contrasting text color.

use rank_common::Rgb;
use renderer::color::{average_color, contrasting_text_color, yiq_brightness, Hsl};
use test_utils::{corrupt_image_bytes, solid_png, split_png};

// ============================================================================
// Average color
// ============================================================================

#[test]
fn test_uniform_image_average_is_exact() {
    for rgb in [[0, 0, 0], [255, 255, 255], [12, 34, 56], [200, 100, 250]] {
        let png = solid_png(16, rgb);
        assert_eq!(average_color(&png).unwrap(), Rgb::new(rgb[0], rgb[1], rgb[2]));
    }
}

#[test]
fn test_average_truncates() {
    // half 0, half 255 -> 127.5 per channel, truncated
    let png = split_png(4, [0, 0, 0], [255, 255, 255]);
    assert_eq!(average_color(&png).unwrap(), Rgb::new(127, 127, 127));
}

#[test]
fn test_average_of_corrupt_bytes_fails() {
    let err = average_color(&corrupt_image_bytes()).unwrap_err();
    assert_eq!(err.code(), "ASSET_DECODE");
}

// ============================================================================
// Contrast
// ============================================================================

#[test]
fn test_black_text_on_white() {
    assert_eq!(contrasting_text_color(Rgb::WHITE), Rgb::BLACK);
}

#[test]
fn test_white_text_on_black() {
    assert_eq!(contrasting_text_color(Rgb::BLACK), Rgb::WHITE);
}

#[test]
fn test_mid_gray_gets_shifted_color() {
    let gray = Rgb::new(128, 128, 128);
    let text = contrasting_text_color(gray);
    assert_ne!(text, Rgb::BLACK);
    assert_ne!(text, Rgb::WHITE);
    // lightness 0.502 drops to about 0.2, saturation stays 0.3 with hue 0
    assert!(yiq_brightness(text) < yiq_brightness(gray));
}

#[test]
fn test_band_edges() {
    // Y just below 0.2 -> white, at or above 0.8 -> black
    assert_eq!(contrasting_text_color(Rgb::new(50, 50, 50)), Rgb::WHITE);
    assert_eq!(contrasting_text_color(Rgb::new(205, 205, 205)), Rgb::BLACK);
}

#[test]
fn test_hsl_shift_direction() {
    let dark_red = Rgb::new(150, 20, 20);
    let before = Hsl::from_rgb(dark_red);
    let after = Hsl::from_rgb(contrasting_text_color(dark_red));
    assert!(before.l < 0.5);
    assert!(after.l > before.l);
}

#[test]
fn test_mid_band_exact_colors() {
    // #963214: lightness and saturation both shift
    assert_eq!(contrasting_text_color(Rgb::new(150, 50, 20)), Rgb::new(205, 138, 118));
    // gray gains saturation at hue 0
    assert_eq!(contrasting_text_color(Rgb::new(128, 128, 128)), Rgb::new(67, 36, 36));
    assert_eq!(contrasting_text_color(Rgb::new(40, 160, 200)), Rgb::new(175, 207, 218));
}
