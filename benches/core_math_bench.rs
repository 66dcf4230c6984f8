use candle_chart::api::{ChartEngine, ChartEngineConfig, SetCandlesOptions};
use candle_chart::core::{
    Bar, ChartDimensions, Indicator, Viewport, ViewportGeometry, VisibleRange,
    compute_price_bounds, max_volume_in_range,
};
use candle_chart::render::{Color, NullRenderer};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn generated_bars(count: usize) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            let base = 100.0 + t * 0.05;
            let open = base;
            let close = if i % 2 == 0 { base + 1.0 } else { base - 1.0 };
            let low = open.min(close) - 0.75;
            let high = open.max(close) + 0.75;
            Bar::new(i as i64 * 60, open, high, low, close, 1_000.0 + (i % 13) as f64)
                .expect("valid generated bar")
        })
        .collect()
}

fn bench_visible_range_and_bounds_10k(c: &mut Criterion) {
    let bars = generated_bars(10_000);
    let geometry = ViewportGeometry {
        chart_width: 1_920.0,
        y_axis_width: 72.0,
        bar_count: bars.len(),
        spacing_ratio: 3.4 / 12.0,
        min_candle_width: 2.0,
        max_candle_width: 20.0,
    };
    let viewport = Viewport::new(geometry.min_offset(9.0), 9.0);

    c.bench_function("visible_range_and_bounds_10k", |b| {
        b.iter(|| {
            let range = geometry.visible_range(black_box(viewport));
            let bounds = compute_price_bounds(black_box(&bars), range, None, 0.1);
            let volume = max_volume_in_range(black_box(&bars), range);
            black_box((bounds, volume));
        })
    });
}

fn bench_ema_series_10k(c: &mut Criterion) {
    let bars = generated_bars(10_000);
    let ema = Indicator::Ema {
        period: 20,
        color: Color::WHITE,
    };

    c.bench_function("ema_series_10k", |b| {
        b.iter(|| {
            let _ = ema.compute(black_box(&bars));
        })
    });
}

fn bench_engine_pan_rebuild_10k(c: &mut Criterion) {
    let config = ChartEngineConfig::new(ChartDimensions::new(1_920.0, 1_080.0));
    let mut engine = ChartEngine::new(NullRenderer::default(), config).expect("engine init");
    engine.set_candles(generated_bars(10_000), SetCandlesOptions::default());
    engine.pan_start();
    let mut translation = 0.0;

    c.bench_function("engine_pan_rebuild_10k", |b| {
        b.iter(|| {
            translation = (translation + 7.0) % 600.0;
            engine.pan_change(black_box(translation));
        })
    });
}

fn bench_full_range_bounds(c: &mut Criterion) {
    let bars = generated_bars(10_000);
    let range = Some(VisibleRange::new(0, bars.len() - 1));

    c.bench_function("full_range_bounds_10k", |b| {
        b.iter(|| {
            let _ = compute_price_bounds(black_box(&bars), black_box(range), None, 0.1);
        })
    });
}

criterion_group!(
    benches,
    bench_visible_range_and_bounds_10k,
    bench_ema_series_10k,
    bench_engine_pan_rebuild_10k,
    bench_full_range_bounds
);
criterion_main!(benches);
