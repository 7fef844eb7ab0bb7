//! Benchmarks for chart layout and rasterization.
//!
//! Run with: cargo bench --package renderer --bench layout_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rank_common::RenderDatum;
use renderer::canvas::{encode_png, Rasterizer};
use renderer::color::average_color;
use renderer::{AssetIndex, AssetKind, ChartLayoutEngine, FixedAdvanceMeasurer, LayoutOptions};
use test_utils::solid_png;

/// Ranked rows with random values and colored avatars.
fn generate_rows(count: usize) -> Vec<RenderDatum> {
    let mut rng = StdRng::seed_from_u64(17);
    let mut rows: Vec<RenderDatum> = (0..count)
        .map(|i| RenderDatum {
            name: format!("member number {}", i),
            external_user_id: i.to_string(),
            avatar_url: String::new(),
            value: rng.gen_range(0..100_000),
            share_percent: 0.0,
            avatar_raster: Some(solid_png(50, [rng.gen(), rng.gen(), rng.gen()])),
        })
        .collect();
    rows.sort_by(|a, b| b.value.cmp(&a.value));
    rows
}

/// Every third user gets two icons and a bar background.
fn generate_assets(count: usize) -> AssetIndex {
    let mut index = AssetIndex::new();
    for i in (0..count).step_by(3) {
        let user = i.to_string();
        index.insert(AssetKind::Icon, user.clone(), solid_png(40, [255, 215, 0]));
        index.insert(AssetKind::Icon, user.clone(), solid_png(40, [192, 192, 192]));
        index.insert(AssetKind::BarBackground, user, solid_png(200, [30, 144, 255]));
    }
    index
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("chart_layout");
    let measurer = FixedAdvanceMeasurer::default();
    let engine = ChartLayoutEngine::new(LayoutOptions::default(), &measurer);

    for count in [10, 50, 200] {
        let rows = generate_rows(count);
        let assets = generate_assets(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("rows", count), &rows, |b, rows| {
            let mut rng = StdRng::seed_from_u64(1);
            b.iter(|| engine.layout_with_rng(black_box(rows), &assets, &mut rng));
        });
    }

    group.finish();
}

fn bench_rasterize(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterize");
    let measurer = FixedAdvanceMeasurer::default();
    let engine = ChartLayoutEngine::new(LayoutOptions::default(), &measurer);
    let rasterizer = Rasterizer::new(None);

    for count in [10, 50] {
        let rows = generate_rows(count);
        let assets = generate_assets(count);
        let layout = engine.layout_with_rng(&rows, &assets, &mut StdRng::seed_from_u64(1));

        group.throughput(Throughput::Elements(
            (layout.canvas_width * layout.canvas_height) as u64,
        ));
        group.bench_with_input(BenchmarkId::new("draw_and_encode", count), &layout, |b, layout| {
            b.iter(|| {
                let mut canvas = image::RgbaImage::new(layout.canvas_width, layout.canvas_height);
                rasterizer.draw_all(&mut canvas, &layout.draw_ops, 0.0, 0.0);
                encode_png(black_box(&canvas))
            });
        });
    }

    group.finish();
}

fn bench_average_color(c: &mut Criterion) {
    let mut group = c.benchmark_group("average_color");

    for size in [50, 200, 640] {
        let png = solid_png(size, [120, 80, 200]);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("decode_and_average", size), &png, |b, png| {
            b.iter(|| average_color(black_box(png)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_layout, bench_rasterize, bench_average_color);
criterion_main!(benches);
