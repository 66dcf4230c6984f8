use std::sync::Arc;

use crate::render::Renderer;

use super::label_text_formatter::{PriceLabelFormatterFn, TimeLabelFormatterFn, format_currency};
use super::{CandleResolution, ChartEngine, CurrencyFormat, TimeFormatter};

impl<R: Renderer> ChartEngine<R> {
    /// Text for a price label (grid, bubbles).
    #[must_use]
    pub fn format_price(&self, price: f64) -> String {
        (self.core.presentation.price_label_formatter)(price)
    }

    /// Replaces price label formatting. The y-axis width still follows the
    /// currency's decimal count.
    pub fn set_price_label_formatter(&mut self, formatter: PriceLabelFormatterFn) {
        self.core.presentation.price_label_formatter = formatter;
        self.rebuild_chart(false, false);
        self.rebuild_active_crosshair();
    }

    /// Switches the quote currency and restores its default price formatter.
    pub fn set_currency(&mut self, currency: CurrencyFormat) {
        let formatter_currency = currency.clone();
        self.core.presentation.currency = currency;
        self.core.presentation.price_label_formatter =
            Arc::new(move |price: f64| format_currency(price, &formatter_currency));
        self.rebuild_chart(false, true);
        self.rebuild_active_crosshair();
    }

    #[must_use]
    pub fn currency(&self) -> &CurrencyFormat {
        &self.core.presentation.currency
    }

    pub fn set_candle_resolution(&mut self, resolution: CandleResolution) {
        self.core.presentation.time_formatter = TimeFormatter::new(resolution);
        self.rebuild_chart(false, false);
    }

    #[must_use]
    pub fn candle_resolution(&self) -> CandleResolution {
        self.core.presentation.time_formatter.resolution()
    }

    /// Overrides both x-axis labels with a per-timestamp formatter.
    pub fn set_time_label_formatter(&mut self, formatter: TimeLabelFormatterFn) {
        self.core.presentation.time_label_formatter = Some(formatter);
        self.rebuild_chart(false, false);
    }

    pub fn clear_time_label_formatter(&mut self) {
        self.core.presentation.time_label_formatter = None;
        self.rebuild_chart(false, false);
    }

    /// Standalone time label, e.g. for the active candle.
    #[must_use]
    pub fn format_time(&self, timestamp: i64) -> String {
        let presentation = &self.core.presentation;
        match &presentation.time_label_formatter {
            Some(formatter) => formatter(timestamp),
            None => presentation.time_formatter.format(timestamp),
        }
    }

    /// Left/right x-axis label text for the first and last visible bars.
    #[must_use]
    pub fn x_axis_labels(&self) -> Option<(String, String)> {
        let range = self.visible_range()?;
        let bars = &self.core.model.bars;
        let start = bars.get(range.start_index)?.timestamp;
        let end = bars.get(range.end_index)?.timestamp;
        let presentation = &self.core.presentation;
        Some(match &presentation.time_label_formatter {
            Some(formatter) => (formatter(start), formatter(end)),
            None => presentation.time_formatter.format_span(start, end),
        })
    }
}
