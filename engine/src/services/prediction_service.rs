// Next-bar forecasting per symbol: indicators -> features -> cached predictor
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use shared::models::{
    HistoryResponse, IndicatorFrame, MarketSummary, ModelInfo, PredictionResult, Quote, TimeSeries,
};

use super::{build_history, build_market_summary, build_quote};
use crate::config::ForecastSettings;
use crate::data::{MarketDataSource, Period};
use crate::error::{EngineError, Result};
use crate::features::{extract_complete, extract_row, TrainingSet, FEATURE_NAMES};
use crate::indicators::IndicatorEngine;
use crate::model::{FitSummary, PricePredictor};

pub const DISCLAIMER: &str = "This prediction is for educational purposes only \
     and should not be used for investment decisions.";

const ALGORITHM: &str = "Random Forest";

/// Holds one predictor per symbol. A predictor is trained the first time its
/// symbol is forecast and reused until `invalidate` drops it.
pub struct PredictionService {
    settings: ForecastSettings,
    engine: IndicatorEngine,
    predictors: RwLock<HashMap<String, Arc<PricePredictor>>>,
}

impl PredictionService {
    pub fn new(settings: ForecastSettings) -> Self {
        PredictionService {
            settings,
            engine: IndicatorEngine::new(),
            predictors: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_trained(&self, symbol: &str) -> bool {
        self.predictors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&symbol_key(symbol))
            .map_or(false, |p| p.is_trained())
    }

    /// Forgets the model for `symbol`; the next forecast retrains it.
    pub fn invalidate(&self, symbol: &str) {
        let removed = self
            .predictors
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&symbol_key(symbol));
        if removed.is_some() {
            tracing::info!(symbol, "Invalidated predictor");
        }
    }

    /// Fits (or refits) the predictor for the series' symbol.
    pub fn train(&self, series: &TimeSeries) -> Result<FitSummary> {
        let frame = self.engine.compute(series);
        let training = self.training_set(&frame)?;
        let summary = self.predictor(&frame.symbol).fit(&training)?;
        log_ready(&frame.symbol, &summary);
        Ok(summary)
    }

    pub fn predict_next(&self, series: &TimeSeries) -> Result<PredictionResult> {
        self.forecast_series(series).map_err(|e| {
            tracing::warn!(
                symbol = %series.symbol,
                recoverable = e.is_recoverable(),
                "Forecast failed: {}",
                e
            );
            e
        })
    }

    fn forecast_series(&self, series: &TimeSeries) -> Result<PredictionResult> {
        let predictor = self.predictor(&series.symbol);
        self.forecast_with(&predictor, series)
    }

    /// Trains (if needed) and predicts with one predictor handle, so a concurrent
    /// `invalidate` cannot split the two steps across different models.
    fn forecast_with(
        &self,
        predictor: &PricePredictor,
        series: &TimeSeries,
    ) -> Result<PredictionResult> {
        let last = *series
            .last()
            .ok_or_else(|| EngineError::EmptySeries(series.symbol.clone()))?;
        let frame = self.engine.compute(series);

        if !predictor.is_trained() {
            let summary = predictor.fit_if_untrained(|| self.training_set(&frame))?;
            log_ready(&series.symbol, &summary);
        }

        let latest = extract_row(&frame, frame.len() - 1)
            .ok_or_else(|| EngineError::InsufficientRecentData(series.symbol.clone()))?;
        let (predicted_price, summary) = predictor.predict_with_summary(&latest)?;

        let current_price = last.close;
        let predicted_change = predicted_price - current_price;
        let predicted_change_percent = if current_price != 0.0 {
            Some(predicted_change / current_price * 100.0)
        } else {
            None
        };
        let prediction_date = last.date().succ_opt().ok_or_else(|| {
            EngineError::ProcessingError(format!("no calendar day follows {}", last.date()))
        })?;

        tracing::debug!(
            symbol = %series.symbol,
            current_price,
            predicted_price,
            "Forecast computed"
        );

        Ok(PredictionResult {
            symbol: series.symbol.clone(),
            current_price,
            predicted_price,
            predicted_change,
            predicted_change_percent,
            confidence: self.settings.confidence.clamp(0.0, 1.0),
            prediction_date,
            model_info: ModelInfo {
                algorithm: ALGORITHM.to_string(),
                features_used: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
                training_samples: summary.samples,
                last_updated: summary.trained_at,
            },
            disclaimer: DISCLAIMER.to_string(),
        })
    }

    /// Loads the training lookback for `symbol` from `source` and forecasts the next bar.
    pub fn forecast(
        &self,
        source: &dyn MarketDataSource,
        symbol: &str,
    ) -> Result<PredictionResult> {
        let period = Period::parse_or_default(&self.settings.training_period);
        let series = source.load(symbol, period)?;
        self.predict_next(&series)
    }

    pub fn history(
        &self,
        source: &dyn MarketDataSource,
        symbol: &str,
        period: Period,
    ) -> Result<HistoryResponse> {
        let series = source.load(symbol, period)?;
        if series.is_empty() {
            return Err(EngineError::EmptySeries(series.symbol));
        }
        Ok(build_history(&self.engine.compute(&series), period))
    }

    pub fn quote(&self, source: &dyn MarketDataSource, symbol: &str) -> Result<Quote> {
        let series = source.load(symbol, Period::Year1)?;
        build_quote(&series)
    }

    /// Last-two-bar moves for the configured market indices. Indices that cannot be
    /// loaded are left out.
    pub fn market_summary(&self, source: &dyn MarketDataSource) -> MarketSummary {
        build_market_summary(source, &self.settings.market_indices)
    }

    fn predictor(&self, symbol: &str) -> Arc<PricePredictor> {
        let key = symbol_key(symbol);
        if let Some(existing) = self
            .predictors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
        {
            return Arc::clone(existing);
        }
        let mut predictors = self
            .predictors
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = predictors.entry(key).or_insert_with(|| {
            Arc::new(PricePredictor::with_min_training_pairs(
                self.settings.forest.clone(),
                self.settings.training.min_training_pairs,
            ))
        });
        Arc::clone(entry)
    }

    /// Training pairs for a frame, after the raw-bar and complete-row minimums.
    fn training_set(&self, frame: &IndicatorFrame) -> Result<TrainingSet> {
        let thresholds = &self.settings.training;
        if frame.len() < thresholds.min_raw_bars {
            return Err(EngineError::InsufficientData {
                what: "raw bars",
                required: thresholds.min_raw_bars,
                actual: frame.len(),
            });
        }
        let complete = extract_complete(frame).count();
        if complete < thresholds.min_complete_rows {
            return Err(EngineError::InsufficientData {
                what: "complete rows",
                required: thresholds.min_complete_rows,
                actual: complete,
            });
        }
        tracing::info!(symbol = %frame.symbol, bars = frame.len(), "Building training set");
        Ok(TrainingSet::from_frame(frame))
    }
}

impl Default for PredictionService {
    fn default() -> Self {
        Self::new(ForecastSettings::default())
    }
}

fn log_ready(symbol: &str, summary: &FitSummary) {
    tracing::info!(
        symbol,
        samples = summary.samples,
        r2 = summary.in_sample_r2,
        "Predictor ready"
    );
}

fn symbol_key(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
