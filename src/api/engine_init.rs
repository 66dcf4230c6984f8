use std::sync::Arc;

use tracing::debug;

use crate::core::{IndicatorKey, IndicatorSet, PriceBounds, Viewport, y_axis_width};
use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;

use super::{
    ChartEngine, ChartEngineConfig, ChartPalette, TimeFormatter,
    chart_model::{ChartLayoutState, ChartModel},
    chart_presentation::{ChartPresentationState, LayerPictures},
    chart_runtime::ChartRuntimeState,
    engine_core::EngineCore,
    label_text_formatter::format_currency,
};

impl<R: Renderer> ChartEngine<R> {
    /// Creates an engine with no bars, the stock overlays registered (none
    /// active) and a freshly recorded base picture.
    pub fn new(renderer: R, config: ChartEngineConfig) -> ChartResult<Self> {
        if !config.dimensions.is_valid() {
            return Err(ChartError::InvalidDimensions {
                width: config.dimensions.width,
                height: config.dimensions.height,
            });
        }
        config.chart.validate()?;

        let mut indicators = IndicatorSet::new();
        indicators.register_indicators(
            IndicatorKey::ALL.map(|key| (key, key.default_indicator())),
        );

        let chart = config.chart;
        let initial_y_axis_width = y_axis_width(
            PriceBounds::DEFAULT,
            config.currency.decimals,
            chart.chart.y_axis_padding_left,
            chart.chart.y_axis_padding_right,
        );
        let currency = config.currency.clone();
        let price_label_formatter = Arc::new(move |price: f64| format_currency(price, &currency));

        let mut engine = Self {
            renderer,
            core: EngineCore {
                model: ChartModel::new(indicators),
                layout: ChartLayoutState::new(
                    Viewport::new(0.0, chart.candles.initial_width),
                    initial_y_axis_width,
                ),
                presentation: ChartPresentationState {
                    dimensions: config.dimensions,
                    config: chart,
                    color_mode: config.color_mode,
                    palette: ChartPalette::for_mode(config.color_mode),
                    currency: config.currency,
                    price_label_formatter,
                    time_formatter: TimeFormatter::new(config.resolution),
                    time_label_formatter: None,
                    pictures: LayerPictures::new(config.dimensions),
                },
                runtime: ChartRuntimeState::default(),
            },
        };
        engine.rebuild_chart(false, true);
        debug!(
            width = config.dimensions.width,
            height = config.dimensions.height,
            "created chart engine"
        );
        Ok(engine)
    }
}
