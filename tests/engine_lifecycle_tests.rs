use std::sync::Arc;

use approx::assert_abs_diff_eq;
use candle_chart::api::{ChartConfig, ChartEngine, ChartEngineConfig, ColorMode, SetCandlesOptions};
use candle_chart::core::{Bar, ChartDimensions, stride};
use candle_chart::render::{Color, NullRenderer, PictureLayer};
use candle_chart::ChartError;
use serde_json::json;

fn engine(width: f64, height: f64) -> ChartEngine<NullRenderer> {
    let config = ChartEngineConfig::new(ChartDimensions::new(width, height));
    ChartEngine::new(NullRenderer::default(), config).expect("engine init")
}

fn trending_bars(count: usize) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let base = 100.0 + (i as f64 * 0.3).sin() * 10.0;
            let close = if i % 2 == 0 { base + 1.0 } else { base - 1.0 };
            Bar::new(
                i as i64 * 3_600,
                base,
                base.max(close) + 0.5,
                base.min(close) - 0.5,
                close,
                1_000.0 + (i % 7) as f64 * 100.0,
            )
            .expect("valid bar")
        })
        .collect()
}

#[test]
fn rejects_invalid_dimensions_and_config() {
    let err = ChartEngine::new(
        NullRenderer::default(),
        ChartEngineConfig::new(ChartDimensions::new(0.0, 400.0)),
    )
    .err()
    .expect("zero width must fail");
    assert!(matches!(err, ChartError::InvalidDimensions { .. }));

    let mut chart = ChartConfig::default();
    chart.candles.initial_width = 40.0;
    let err = ChartEngine::new(
        NullRenderer::default(),
        ChartEngineConfig::new(ChartDimensions::new(300.0, 200.0)).with_chart_config(chart),
    )
    .err()
    .expect("initial width above max must fail");
    assert!(matches!(err, ChartError::InvalidConfig(_)));
}

#[test]
fn empty_engine_renders_grid_without_price_labels() {
    let mut engine = engine(300.0, 200.0);
    assert!(engine.bars().is_empty());
    assert!(engine.visible_range().is_none());

    let base = engine.picture(PictureLayer::Base);
    assert_eq!(base.line_count(), 4);
    assert_eq!(base.text_count(), 0);
    assert!(engine.picture(PictureLayer::Indicator).is_empty());
    assert!(engine.picture(PictureLayer::Crosshair).is_empty());

    engine.render().expect("render");
    assert_eq!(engine.renderer().frames_rendered, 1);
}

#[test]
fn single_bar_pins_right_against_the_axis() {
    let mut engine = engine(300.0, 200.0);
    let bar = Bar::new(0, 95.0, 110.0, 90.0, 105.0, 10.0).expect("bar");
    engine.set_candles(vec![bar], SetCandlesOptions::default());

    let bounds = engine.price_bounds();
    assert_abs_diff_eq!(bounds.min, 88.0, epsilon = 1e-9);
    assert_abs_diff_eq!(bounds.max, 112.0, epsilon = 1e-9);
    assert_abs_diff_eq!(engine.y_axis_width(), 72.0, epsilon = 1e-9);

    let expected = 300.0 - 72.0 - stride(9.0, 3.4 / 12.0);
    assert_abs_diff_eq!(engine.min_offset(), expected, epsilon = 1e-9);
    assert_abs_diff_eq!(engine.viewport().offset, expected, epsilon = 1e-9);
    assert_abs_diff_eq!(engine.max_displayed_volume(), 10.0, epsilon = 1e-12);
}

#[test]
fn set_candles_canonicalizes_input() {
    let mut engine = engine(300.0, 200.0);
    let late = Bar::new(7_200, 1.0, 2.0, 0.5, 1.5, 1.0).expect("bar");
    let early = Bar::new(3_600, 1.0, 2.0, 0.5, 1.5, 1.0).expect("bar");
    let replacement = Bar::new(7_200, 1.5, 2.5, 1.0, 2.0, 3.0).expect("bar");
    let broken = Bar {
        timestamp: 10_800,
        open: f64::NAN,
        high: 1.0,
        low: 1.0,
        close: 1.0,
        volume: 1.0,
    };
    engine.set_candles(
        vec![late, early, broken, replacement],
        SetCandlesOptions::default(),
    );
    assert_eq!(engine.bars(), &[early, replacement]);
}

#[test]
fn rebuild_without_changes_records_identical_pictures() {
    let mut engine = engine(800.0, 400.0);
    engine.set_candles(trending_bars(120), SetCandlesOptions::default());

    let before = engine.picture(PictureLayer::Base);
    engine.rebuild_chart(false, false);
    let after = engine.picture(PictureLayer::Base);
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(*before, *after);
}

#[test]
fn replaced_pictures_are_disposed_but_held_handles_survive() {
    let mut engine = engine(800.0, 400.0);
    engine.set_candles(trending_bars(50), SetCandlesOptions::default());

    let held = engine.picture(PictureLayer::Base);
    let commands_before = held.commands().len();
    let stats_before = engine.picture_stats(PictureLayer::Base);
    assert_eq!(stats_before.live(), 1);

    engine.set_candles(trending_bars(60), SetCandlesOptions::default());
    let stats_after = engine.picture_stats(PictureLayer::Base);
    assert!(stats_after.recorded > stats_before.recorded);
    assert_eq!(stats_after.live(), 1);
    assert_eq!(held.commands().len(), commands_before);
    assert_eq!(Arc::strong_count(&held), 1);
}

#[test]
fn dispose_releases_everything_and_blocks_rendering() {
    let mut engine = engine(800.0, 400.0);
    engine.set_candles(trending_bars(50), SetCandlesOptions::default());
    engine.dispose();

    assert!(engine.is_disposed());
    assert!(engine.bars().is_empty());
    for layer in PictureLayer::COMPOSITE_ORDER {
        assert!(engine.picture(layer).is_empty());
        assert_eq!(engine.picture_stats(layer).live(), 0);
    }
    assert!(matches!(engine.render(), Err(ChartError::Disposed)));
    assert!(matches!(engine.frame(16.0), Err(ChartError::Disposed)));

    engine.set_candles(trending_bars(5), SetCandlesOptions::default());
    assert!(engine.bars().is_empty());
}

#[test]
fn config_overrides_merge_and_validate() {
    let config = ChartConfig::default()
        .with_overrides(json!({
            "candles": { "initial_width": 12.0 },
            "grid": { "dotted": false },
            "volume": null
        }))
        .expect("valid overrides");
    assert_eq!(config.candles.initial_width, 12.0);
    assert!(!config.grid.dotted);
    assert_eq!(config.volume, ChartConfig::default().volume);

    let err = ChartConfig::default()
        .with_overrides(json!({ "grid": { "stroke_width": 0.0 } }))
        .expect_err("zero grid stroke must fail");
    assert!(matches!(err, ChartError::InvalidConfig(_)));

    let err = ChartConfig::default()
        .with_overrides(json!({ "grid": { "color": "not-a-color" } }))
        .expect_err("bad color must fail");
    assert!(matches!(err, ChartError::InvalidConfig(_)));
}

#[test]
fn engine_config_json_round_trip() {
    let config = ChartEngineConfig::new(ChartDimensions::new(390.0, 260.0))
        .with_color_mode(ColorMode::Light);
    let json = config.to_json_pretty().expect("serialize");
    let restored = ChartEngineConfig::from_json_str(&json).expect("deserialize");
    assert_eq!(restored, config);
}

#[test]
fn color_mode_resets_theme_colors_and_rebuilds() {
    let mut engine = engine(800.0, 400.0);
    engine.set_candles(trending_bars(30), SetCandlesOptions::default());
    let recorded_before = engine.picture_stats(PictureLayer::Base).recorded;

    let background = Color::from_rgb8(0xFA, 0xFA, 0xFA);
    engine
        .set_color_mode(
            ColorMode::Light,
            Some(background),
            Some(json!({ "grid": { "color": "#E0E0E0" } })),
        )
        .expect("set color mode");

    assert_eq!(engine.color_mode(), ColorMode::Light);
    assert_eq!(engine.config().chart.background_color, background);
    assert_eq!(engine.config().grid.color, Color::from_rgb8(0xE0, 0xE0, 0xE0));
    assert_eq!(engine.config().volume.color, ChartConfig::default().volume.color);
    assert!(engine.picture_stats(PictureLayer::Base).recorded > recorded_before);
    assert_eq!(engine.composite_frame().background, background);
}

#[test]
fn invalid_background_leaves_theme_untouched() {
    let mut engine = engine(800.0, 400.0);
    engine.set_candles(trending_bars(30), SetCandlesOptions::default());
    let mode = engine.color_mode();
    let palette = engine.palette();
    let background = engine.config().chart.background_color;

    let err = engine
        .set_color_mode(ColorMode::Light, Some(Color::rgba(2.0, 0.0, 0.0, 1.0)), None)
        .expect_err("out of range background must fail");
    assert!(matches!(err, ChartError::InvalidData(_)));
    assert_eq!(engine.color_mode(), mode);
    assert_eq!(engine.palette(), palette);
    assert_eq!(engine.config().chart.background_color, background);
}
