//! Tests for the bar chart layout engine.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rank_common::{RenderDatum, Rgb, Rgba};
use renderer::layout::{ImageLayer, Rect, TextAlign, FALLBACK_ROW_COLOR};
use renderer::{
    AssetIndex, AssetKind, ChartLayoutEngine, DrawOp, FixedAdvanceMeasurer, LayoutOptions,
    TextMeasurer,
};
use test_utils::{corrupt_image_bytes, solid_png};

fn datum(name: &str, user_id: &str, value: i64) -> RenderDatum {
    RenderDatum {
        name: name.to_string(),
        external_user_id: user_id.to_string(),
        avatar_url: String::new(),
        value,
        share_percent: 0.0,
        avatar_raster: Some(solid_png(8, [200, 40, 40])),
    }
}

fn layout_of(data: &[RenderDatum], assets: &AssetIndex, options: LayoutOptions) -> Vec<DrawOp> {
    let measurer = FixedAdvanceMeasurer::default();
    let engine = ChartLayoutEngine::new(options, &measurer);
    engine
        .layout_with_rng(data, assets, &mut StdRng::seed_from_u64(7))
        .draw_ops
}

/// Main bar of every row, in row order.
fn bars(ops: &[DrawOp]) -> Vec<(Rect, Rgba)> {
    ops.iter()
        .filter_map(|op| match op {
            DrawOp::FillRect { rect, color } if rect.x == 50.0 && rect.height == 50.0 => {
                Some((*rect, *color))
            }
            _ => None,
        })
        .collect()
}

fn texts(ops: &[DrawOp]) -> Vec<(String, f32, TextAlign, Rgba)> {
    ops.iter()
        .filter_map(|op| match op {
            DrawOp::Text {
                text,
                x,
                align,
                color,
                ..
            } => Some((text.clone(), *x, *align, *color)),
            _ => None,
        })
        .collect()
}

fn images(ops: &[DrawOp], layer: ImageLayer) -> Vec<(Rect, Option<Rect>, f32)> {
    ops.iter()
        .filter_map(|op| match op {
            DrawOp::Image {
                dest,
                source,
                opacity,
                layer: l,
                ..
            } if *l == layer => Some((*dest, *source, *opacity)),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Geometry
// ============================================================================

#[test]
fn test_bar_widths_scale_with_value() {
    let data = vec![datum("a", "1", 100), datum("b", "2", 50), datum("c", "3", 0)];
    let ops = layout_of(&data, &AssetIndex::new(), LayoutOptions::default());

    let widths: Vec<f32> = bars(&ops).iter().map(|(r, _)| r.width).collect();
    assert_eq!(widths, vec![850.0, 500.0, 150.0]);
}

#[test]
fn test_canvas_size_uses_max_value_label() {
    let measurer = FixedAdvanceMeasurer::default();
    let engine = ChartLayoutEngine::new(LayoutOptions::default(), &measurer);
    let data = vec![datum("a", "1", 5), datum("b", "2", 1234)];
    let layout = engine.layout(&data, &AssetIndex::new());

    // 900 + 10 + width("1234") + 20
    assert_eq!(layout.canvas_width, 990);
    assert_eq!(layout.canvas_height, 100);
}

#[test]
fn test_empty_data_only_draws_separators() {
    let measurer = FixedAdvanceMeasurer::default();
    let engine = ChartLayoutEngine::new(LayoutOptions::default(), &measurer);
    let layout = engine.layout(&[], &AssetIndex::new());

    assert_eq!(layout.canvas_height, 0);
    assert_eq!(layout.canvas_width, 945);
    assert_eq!(layout.draw_ops.len(), 8);
}

#[test]
fn test_separators_are_last() {
    let data = vec![datum("a", "1", 3), datum("b", "2", 2)];
    let ops = layout_of(&data, &AssetIndex::new(), LayoutOptions::default());

    let tail = &ops[ops.len() - 8..];
    for (i, op) in tail.iter().enumerate() {
        match op {
            DrawOp::FillRect { rect, color } => {
                assert_eq!(rect.x, 200.0 + 100.0 * i as f32);
                assert_eq!(rect.width, 3.0);
                assert_eq!(rect.height, 100.0);
                assert_eq!(*color, Rgba::new(0, 0, 0, 31));
            }
            other => panic!("expected separator, got {:?}", other),
        }
    }
}

#[test]
fn test_avatars_drawn_after_all_rows() {
    let data = vec![datum("a", "1", 3), datum("b", "2", 2), datum("c", "3", 1)];
    let ops = layout_of(&data, &AssetIndex::new(), LayoutOptions::default());

    let first_avatar = ops
        .iter()
        .position(|op| op.is_image(ImageLayer::Avatar))
        .unwrap();
    let last_text = ops
        .iter()
        .rposition(|op| matches!(op, DrawOp::Text { .. }))
        .unwrap();
    assert!(last_text < first_avatar);

    let avatars = images(&ops, ImageLayer::Avatar);
    let ys: Vec<f32> = avatars.iter().map(|(d, _, _)| d.y).collect();
    assert_eq!(ys, vec![0.0, 50.0, 100.0]);
    assert!(avatars.iter().all(|(d, _, _)| d.x == 0.0 && d.width == 50.0));
}

#[test]
fn test_remainder_is_half_transparent_avatar_color() {
    let data = vec![datum("a", "1", 10), datum("b", "2", 5)];
    let ops = layout_of(&data, &AssetIndex::new(), LayoutOptions::default());

    let remainders: Vec<(Rect, Rgba)> = ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::FillRect { rect, color } if color.a == 128 => Some((*rect, *color)),
            _ => None,
        })
        .collect();

    // The max row fills the whole track and has no remainder.
    assert_eq!(remainders.len(), 1);
    let (rect, color) = remainders[0];
    assert_eq!(rect.x, 50.0 + 500.0);
    assert_eq!(rect.right(), 900.0);
    assert_eq!(color.rgb(), Rgb::new(200, 40, 40));
}

// ============================================================================
// Text
// ============================================================================

#[test]
fn test_value_label_outside_bar_in_black() {
    let data = vec![datum("a", "1", 40), datum("b", "2", 10)];
    let ops = layout_of(&data, &AssetIndex::new(), LayoutOptions::default());
    let labels = texts(&ops);

    let (text, x, align, color) = &labels[0];
    assert_eq!(text, "40");
    assert_eq!(*x, 910.0);
    assert_eq!(*align, TextAlign::Left);
    assert_eq!(*color, Rgb::BLACK.opaque());
}

/// Measures `1` as very wide, everything else like the fixed measurer.
struct WideOnes;

impl TextMeasurer for WideOnes {
    fn measure(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|c| if c == '1' { 200.0 } else { font_size / 2.0 })
            .sum()
    }
}

#[test]
fn test_value_label_moves_inside_when_overflowing() {
    let data = vec![datum("a", "1", 90), datum("b", "2", 81)];
    let engine = ChartLayoutEngine::new(LayoutOptions::default(), &WideOnes);
    let layout = engine.layout(&data, &AssetIndex::new());

    let labels = texts(&layout.draw_ops);
    let (text, x, align, color) = labels
        .iter()
        .find(|(t, ..)| t == "81")
        .cloned()
        .unwrap();
    assert_eq!(text, "81");
    assert_eq!(align, TextAlign::Right);
    // bar end = 50 + 150 + 700 * 81 / 90
    assert_eq!(x, 50.0 + 150.0 + 630.0 - 10.0);
    assert_ne!(color, Rgb::BLACK.opaque());
}

#[test]
fn test_long_name_is_truncated_to_bar() {
    let long = "abcdefghijklmnopqrstuvwxyz";
    let data = vec![datum("top", "1", 100), datum(long, "2", 0)];
    let ops = layout_of(&data, &AssetIndex::new(), LayoutOptions::default());

    let measurer = FixedAdvanceMeasurer::default();
    let names: Vec<_> = texts(&ops).into_iter().filter(|(_, x, ..)| *x == 60.0).collect();
    assert_eq!(names[0].0, "top");

    let truncated = &names[1].0;
    assert!(truncated.ends_with("..."));
    assert!(measurer.measure(truncated, 30.0) <= 150.0 - 60.0);
}

#[test]
fn test_text_contrasts_with_dark_avatar() {
    let mut dark = datum("night", "1", 1);
    dark.avatar_raster = Some(solid_png(8, [0, 0, 0]));
    let ops = layout_of(&[dark], &AssetIndex::new(), LayoutOptions::default());

    let name = texts(&ops).into_iter().find(|(t, ..)| t == "night").unwrap();
    assert_eq!(name.3, Rgb::WHITE.opaque());
}

// ============================================================================
// Icons
// ============================================================================

fn index_with_icons(user: &str, icons: Vec<Vec<u8>>) -> AssetIndex {
    let mut index = AssetIndex::new();
    for icon in icons {
        index.insert(AssetKind::Icon, user, icon);
    }
    index
}

#[test]
fn test_two_icons_flush_right() {
    let assets = index_with_icons("1", vec![solid_png(4, [1, 2, 3]), solid_png(4, [4, 5, 6])]);
    let data = vec![datum("a", "1", 100)];
    let ops = layout_of(&data, &assets, LayoutOptions::default());

    let icons = images(&ops, ImageLayer::Icon);
    assert_eq!(icons.len(), 2);
    let (first, second) = (icons[0].0, icons[1].0);

    assert_eq!(first.right(), 900.0);
    assert!(first.x > second.x);
    assert!(second.right() <= first.x);
    assert_eq!(first.width, 40.0);
    // baseline 35.5, icons 30 above it
    assert_eq!(first.y, 5.5);
}

#[test]
fn test_icons_follow_name_when_not_moved() {
    let assets = index_with_icons("1", vec![solid_png(4, [1, 2, 3]), solid_png(4, [4, 5, 6])]);
    let data = vec![datum("ab", "1", 100)];
    let options = LayoutOptions {
        move_icon_to_bar_end: false,
        ..LayoutOptions::default()
    };
    let ops = layout_of(&data, &assets, options);

    let xs: Vec<f32> = images(&ops, ImageLayer::Icon).iter().map(|(d, ..)| d.x).collect();
    // name ends at 60 + 30
    assert_eq!(xs, vec![95.0, 135.0]);
}

#[test]
fn test_failed_icon_keeps_its_slot() {
    let assets = index_with_icons(
        "1",
        vec![solid_png(4, [1, 2, 3]), corrupt_image_bytes(), solid_png(4, [4, 5, 6])],
    );
    let data = vec![datum("a", "1", 100)];
    let ops = layout_of(&data, &assets, LayoutOptions::default());

    let xs: Vec<f32> = images(&ops, ImageLayer::Icon).iter().map(|(d, ..)| d.x).collect();
    assert_eq!(xs, vec![860.0, 780.0]);
}

// ============================================================================
// Decode failures and backgrounds
// ============================================================================

#[test]
fn test_corrupt_avatar_is_skipped() {
    let mut broken = datum("a", "1", 10);
    broken.avatar_raster = Some(corrupt_image_bytes());
    let mut missing = datum("b", "2", 5);
    missing.avatar_raster = None;
    let ops = layout_of(&[broken, missing], &AssetIndex::new(), LayoutOptions::default());

    assert!(images(&ops, ImageLayer::Avatar).is_empty());
    let colors: Vec<Rgb> = bars(&ops).iter().map(|(_, c)| c.rgb()).collect();
    assert_eq!(colors, vec![FALLBACK_ROW_COLOR, FALLBACK_ROW_COLOR]);
    assert_eq!(texts(&ops).len(), 4);
}

#[test]
fn test_bar_background_recolors_text() {
    let mut assets = AssetIndex::new();
    assets.insert(AssetKind::BarBackground, "1", solid_png(60, [255, 255, 255]));

    let mut row = datum("name", "1", 100);
    row.avatar_raster = Some(solid_png(8, [0, 0, 0]));
    let options = LayoutOptions {
        full_background_opacity: 0.5,
        background_opacity: 0.6,
        move_icon_to_bar_end: true,
    };
    let ops = layout_of(&[row], &assets, options);

    let backgrounds = images(&ops, ImageLayer::BarBackground);
    assert_eq!(backgrounds.len(), 2);

    let (full_dest, full_source, full_opacity) = backgrounds[0];
    assert_eq!(full_dest, Rect::new(50.0, 0.0, 850.0, 50.0));
    assert!(full_source.is_none());
    assert_eq!(full_opacity, 0.5);

    let (bar_dest, bar_source, bar_opacity) = backgrounds[1];
    assert_eq!(bar_source, Some(Rect::new(0.0, 0.0, 850.0, 50.0)));
    assert_eq!(bar_dest, Rect::new(50.0, 0.0, 850.0, 50.0));
    assert_eq!(bar_opacity, 0.6);

    // Bar fill keeps the avatar color; text follows the white background.
    assert_eq!(bars(&ops)[0].1, Rgb::BLACK.opaque());
    let name = texts(&ops).into_iter().find(|(t, ..)| t == "name").unwrap();
    assert_eq!(name.3, Rgb::BLACK.opaque());
}

#[test]
fn test_full_background_disabled_at_zero_opacity() {
    let mut assets = AssetIndex::new();
    assets.insert(AssetKind::BarBackground, "1", solid_png(60, [10, 200, 10]));
    let ops = layout_of(&[datum("a", "1", 1)], &assets, LayoutOptions::default());

    let backgrounds = images(&ops, ImageLayer::BarBackground);
    assert_eq!(backgrounds.len(), 1);
    assert!(backgrounds[0].1.is_some());
}

#[test]
fn test_corrupt_background_keeps_avatar_color() {
    let mut assets = AssetIndex::new();
    assets.insert(AssetKind::BarBackground, "1", corrupt_image_bytes());
    let mut row = datum("dark", "1", 1);
    row.avatar_raster = Some(solid_png(8, [0, 0, 0]));
    let ops = layout_of(&[row], &assets, LayoutOptions::default());

    assert!(images(&ops, ImageLayer::BarBackground).is_empty());
    let name = texts(&ops).into_iter().find(|(t, ..)| t == "dark").unwrap();
    assert_eq!(name.3, Rgb::WHITE.opaque());
}

#[test]
fn test_background_choice_is_seeded() {
    let mut assets = AssetIndex::new();
    for width in [10, 20, 30, 40] {
        let png = test_utils::encode_png(&test_utils::solid_image(width, 50, [9, 9, 9]));
        assets.insert(AssetKind::BarBackground, "1", png);
    }
    let data = vec![datum("a", "1", 1)];
    let measurer = FixedAdvanceMeasurer::default();
    let engine = ChartLayoutEngine::new(LayoutOptions::default(), &measurer);

    let picked_width = |seed: u64| {
        let layout = engine.layout_with_rng(&data, &assets, &mut StdRng::seed_from_u64(seed));
        layout
            .draw_ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Image {
                    image,
                    layer: ImageLayer::BarBackground,
                    ..
                } => Some(image.width()),
                _ => None,
            })
            .unwrap()
    };

    assert_eq!(picked_width(42), picked_width(42));
    assert!([10, 20, 30, 40].contains(&picked_width(3)));
}
