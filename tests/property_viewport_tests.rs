use approx::assert_abs_diff_eq;
use candle_chart::core::{Viewport, ViewportGeometry, VolumeScale};
use proptest::prelude::*;

fn geometry(chart_width: f64, y_axis_width: f64, bar_count: usize) -> ViewportGeometry {
    ViewportGeometry {
        chart_width,
        y_axis_width,
        bar_count,
        spacing_ratio: 3.4 / 12.0,
        min_candle_width: 2.0,
        max_candle_width: 20.0,
    }
}

proptest! {
    #[test]
    fn clamped_offset_stays_in_range(
        chart_width in 100.0f64..2_000.0,
        y_axis_width in 20.0f64..90.0,
        bar_count in 1usize..5_000,
        candle_width in 2.0f64..20.0,
        offset in -200_000.0f64..200_000.0
    ) {
        let geometry = geometry(chart_width, y_axis_width, bar_count);
        let min_offset = geometry.min_offset(candle_width);
        let clamped = geometry.clamp_offset(offset, candle_width);
        if min_offset > 0.0 {
            prop_assert_eq!(clamped, min_offset);
        } else {
            prop_assert!(clamped >= min_offset);
            prop_assert!(clamped <= 0.0);
        }
    }

    #[test]
    fn clamped_width_stays_in_range(width in -100.0f64..500.0) {
        let clamped = geometry(800.0, 60.0, 10).clamp_candle_width(width);
        prop_assert!((2.0..=20.0).contains(&clamped));
    }

    #[test]
    fn visible_range_is_within_bar_array(
        bar_count in 1usize..5_000,
        candle_width in 2.0f64..20.0,
        offset in -200_000.0f64..1_000.0
    ) {
        let geometry = geometry(800.0, 60.0, bar_count);
        let range = geometry
            .visible_range(Viewport::new(offset, candle_width))
            .expect("non-empty bars have a range");
        prop_assert!(range.start_index <= range.end_index);
        prop_assert!(range.end_index < bar_count);
    }

    #[test]
    fn snapping_returns_exact_bar_center(
        bar_count in 1usize..2_000,
        candle_width in 2.0f64..20.0,
        offset in -50_000.0f64..0.0,
        touch_x in 0.0f64..800.0
    ) {
        let geometry = geometry(800.0, 60.0, bar_count);
        let viewport = Viewport::new(offset, candle_width);
        let index = geometry.nearest_index(touch_x, viewport).expect("index");
        prop_assert!(index < bar_count);

        let center = geometry.pixel_x(index, viewport);
        prop_assert_eq!(geometry.nearest_index(center, viewport), Some(index));
        assert_abs_diff_eq!(
            center,
            geometry.bar_left(index, viewport) + candle_width / 2.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn volume_scale_decays_gradually(
        previous in 0.0f64..1e9,
        raw in 0.0f64..1e9
    ) {
        let next = VolumeScale { max_displayed_volume: previous }.next(raw, 0.97);
        let floor = previous * 0.97;
        prop_assert!(next.max_displayed_volume >= floor);
        prop_assert!(next.max_displayed_volume <= floor.max(raw));
        prop_assert!(next.max_displayed_volume >= raw);
    }

    #[test]
    fn unclamped_pinch_keeps_anchor_center(
        anchor in 0usize..400,
        anchor_x in 100.0f64..700.0,
        new_width in 2.0f64..20.0
    ) {
        let geometry = geometry(800.0, 60.0, 10_000);
        let viewport = geometry.pinched_around(anchor as f64, anchor_x, new_width);
        prop_assume!(viewport.offset < 0.0);
        prop_assume!(viewport.offset > geometry.min_offset(new_width));
        assert_abs_diff_eq!(geometry.pixel_x(anchor, viewport), anchor_x, epsilon = 1e-7);
    }
}
