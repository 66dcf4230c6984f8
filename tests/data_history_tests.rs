use approx::assert_abs_diff_eq;
use candle_chart::api::{ChartEngine, ChartEngineConfig, SetCandlesOptions};
use candle_chart::core::{Bar, ChartDimensions, IndicatorKey, IndicatorSelector, stride};
use candle_chart::interaction::ChartEvent;
use candle_chart::render::{NullRenderer, PictureLayer};

const SPACING_RATIO: f64 = 3.4 / 12.0;
const HOUR: i64 = 3_600;

fn bar_at(index: i64) -> Bar {
    let base = 100.0 + (index as f64 * 0.3).sin() * 10.0;
    let close = if index % 2 == 0 { base + 1.0 } else { base - 1.0 };
    Bar::new(
        index * HOUR,
        base,
        base.max(close) + 0.5,
        base.min(close) - 0.5,
        close,
        1_000.0 + (index.rem_euclid(7)) as f64 * 100.0,
    )
    .expect("valid bar")
}

fn bars(range: std::ops::Range<i64>) -> Vec<Bar> {
    range.map(bar_at).collect()
}

fn engine() -> ChartEngine<NullRenderer> {
    let config = ChartEngineConfig::new(ChartDimensions::new(800.0, 400.0));
    ChartEngine::new(NullRenderer::default(), config).expect("engine init")
}

fn with_history() -> SetCandlesOptions {
    SetCandlesOptions {
        has_previous_candles: true,
        reset_offset: false,
    }
}

fn run_until_idle(engine: &mut ChartEngine<NullRenderer>) {
    for _ in 0..5_000 {
        engine.advance(16.0);
        if !engine.is_animating() {
            return;
        }
    }
    panic!("animations did not settle");
}

fn history_requests(events: &[ChartEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, ChartEvent::HistoryRequested))
        .count()
}

#[test]
fn panning_near_oldest_bar_requests_history_once() {
    let mut engine = engine();
    engine.set_candles(bars(0..200), with_history());
    engine.take_events();

    engine.pan_start();
    engine.pan_change(50.0);
    engine.pan_change(70.0);
    engine.pan_end(0.0);

    assert_eq!(history_requests(&engine.take_events()), 1);
    assert!(engine.is_loading_history());
    assert!(!engine.request_additional_candles());

    engine.set_loading_history(false);
    assert!(engine.request_additional_candles());
}

#[test]
fn no_history_request_without_previous_candles() {
    let mut engine = engine();
    engine.set_candles(bars(0..200), SetCandlesOptions::default());
    engine.pan_start();
    engine.pan_change(50.0);
    engine.pan_end(0.0);
    assert_eq!(history_requests(&engine.take_events()), 0);
    assert!(!engine.request_additional_candles());
}

#[test]
fn prepended_history_keeps_bars_in_place() {
    let mut engine = engine();
    engine.set_candles(bars(0..200), with_history());
    engine.pan_start();
    engine.pan_change(200.0);
    engine.pan_end(0.0);
    run_until_idle(&mut engine);

    let (index, x) = engine.nearest_bar(400.0).expect("bar");
    let timestamp = engine.bars()[index].timestamp;

    engine.set_candles(bars(-100..200), with_history());
    assert!(!engine.is_loading_history());
    assert_eq!(engine.bars().len(), 300);

    let shifted = index + 100;
    assert_eq!(engine.bars()[shifted].timestamp, timestamp);
    let viewport = engine.viewport();
    let shifted_x = viewport.offset
        + shifted as f64 * stride(viewport.candle_width, SPACING_RATIO)
        + viewport.candle_width / 2.0;
    assert_abs_diff_eq!(shifted_x, x, epsilon = 1e-6);
    assert!(viewport.offset >= engine.min_offset() - 1e-9);
}

#[test]
fn new_data_while_pinned_right_follows_newest_bar() {
    let mut engine = engine();
    engine.set_candles(bars(0..200), SetCandlesOptions::default());
    engine.set_candles(bars(0..201), SetCandlesOptions::default());
    assert_abs_diff_eq!(engine.viewport().offset, engine.min_offset(), epsilon = 1e-9);
}

#[test]
fn new_data_while_scrolled_back_keeps_offset() {
    let mut engine = engine();
    engine.set_candles(bars(0..200), SetCandlesOptions::default());
    engine.pan_start();
    engine.pan_change(250.0);
    engine.pan_end(0.0);
    let offset = engine.viewport().offset;

    engine.set_candles(bars(0..201), SetCandlesOptions::default());
    assert_abs_diff_eq!(engine.viewport().offset, offset, epsilon = 1e-9);

    engine.snap_to_current_candle();
    assert_abs_diff_eq!(engine.viewport().offset, engine.min_offset(), epsilon = 1e-9);
}

#[test]
fn reset_offset_repins_to_newest_bar() {
    let mut engine = engine();
    engine.set_candles(bars(0..200), SetCandlesOptions::default());
    engine.pan_start();
    engine.pan_change(250.0);
    engine.pan_end(0.0);

    engine.set_candles(
        bars(0..150),
        SetCandlesOptions {
            has_previous_candles: false,
            reset_offset: true,
        },
    );
    assert_abs_diff_eq!(engine.viewport().offset, engine.min_offset(), epsilon = 1e-9);
}

#[test]
fn identical_data_only_updates_history_flag() {
    let mut engine = engine();
    engine.set_candles(bars(0..50), SetCandlesOptions::default());
    let recorded = engine.picture_stats(PictureLayer::Base).recorded;

    engine.set_candles(bars(0..50), with_history());
    assert!(engine.has_previous_candles());
    assert_eq!(engine.picture_stats(PictureLayer::Base).recorded, recorded);
}

fn step_bars(count: i64, step_at: i64) -> Vec<Bar> {
    (0..count)
        .map(|index| {
            let close = if index < step_at { 100.0 } else { 200.0 };
            Bar::new(index * HOUR, close, close + 1.0, close - 1.0, close, 1_000.0)
                .expect("valid bar")
        })
        .collect()
}

#[test]
fn indicator_toggle_restores_bounds_exactly() {
    let mut engine = engine();
    engine.set_candles(step_bars(300, 232), SetCandlesOptions::default());
    run_until_idle(&mut engine);
    let before = engine.price_bounds();

    engine.show_indicator(IndicatorKey::Ema50);
    assert!(engine.is_indicator_active(IndicatorKey::Ema50));
    run_until_idle(&mut engine);
    assert_eq!(engine.picture(PictureLayer::Indicator).path_count(), 1);
    let shown = engine.price_bounds();
    assert_ne!(shown, before);
    assert!(shown.min < before.min);

    engine.hide_indicator(IndicatorKey::Ema50);
    run_until_idle(&mut engine);
    assert!(engine.picture(PictureLayer::Indicator).is_empty());
    assert_eq!(engine.price_bounds(), before);
}

#[test]
fn toggle_all_flips_every_overlay() {
    let mut engine = engine();
    engine.set_candles(bars(0..200), SetCandlesOptions::default());

    engine.toggle_indicator(IndicatorKey::Ema20);
    assert_eq!(engine.active_indicators(), vec![IndicatorKey::Ema20]);

    engine.toggle_indicator(IndicatorSelector::All);
    assert_eq!(engine.active_indicators(), IndicatorKey::ALL.to_vec());
    assert_eq!(engine.picture(PictureLayer::Indicator).path_count(), 3);

    engine.toggle_indicator(IndicatorSelector::All);
    assert!(engine.active_indicators().is_empty());
}

#[test]
fn axis_labels_follow_visible_edges() {
    let mut engine = engine();
    engine.set_candles(bars(0..200), SetCandlesOptions::default());
    let (left, right) = engine.x_axis_labels().expect("labels");
    assert!(!left.is_empty());
    assert!(!right.is_empty());

    let base = engine.picture(PictureLayer::Base);
    let texts: Vec<&str> = base.texts().map(|text| text.text.as_str()).collect();
    assert!(texts.contains(&left.as_str()));
    assert!(texts.contains(&right.as_str()));
}
