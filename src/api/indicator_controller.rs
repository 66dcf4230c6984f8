use tracing::debug;

use crate::core::{IndicatorKey, IndicatorSelector};
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    /// Activates an overlay. Bounds spring to include it.
    pub fn show_indicator(&mut self, key: IndicatorKey) {
        self.show_indicators(&[key]);
    }

    pub fn hide_indicator(&mut self, key: IndicatorKey) {
        self.hide_indicators(&[key]);
    }

    fn show_indicators(&mut self, keys: &[IndicatorKey]) {
        let model = &mut self.core.model;
        if model.indicators.show_indicators(keys, &model.bars) {
            debug!(?keys, "show indicators");
            self.rebuild_chart(true, true);
        }
    }

    fn hide_indicators(&mut self, keys: &[IndicatorKey]) {
        if self.core.model.indicators.hide_indicators(keys) {
            debug!(?keys, "hide indicators");
            self.rebuild_chart(true, true);
        }
    }

    /// Flips one overlay. `All` hides every overlay when all are active and
    /// shows all of them otherwise.
    pub fn toggle_indicator(&mut self, selector: impl Into<IndicatorSelector>) {
        match selector.into() {
            IndicatorSelector::One(key) => {
                if self.core.model.indicators.is_active(key) {
                    self.hide_indicator(key);
                } else {
                    self.show_indicator(key);
                }
            }
            IndicatorSelector::All => {
                let indicators = &self.core.model.indicators;
                if indicators.active_count() == indicators.registered_count() {
                    self.hide_indicators(&IndicatorKey::ALL);
                } else {
                    self.show_indicators(&IndicatorKey::ALL);
                }
            }
        }
    }

    #[must_use]
    pub fn is_indicator_active(&self, key: IndicatorKey) -> bool {
        self.core.model.indicators.is_active(key)
    }

    #[must_use]
    pub fn active_indicators(&self) -> Vec<IndicatorKey> {
        self.core.model.indicators.active_keys().collect()
    }
}
