use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{serialize_opt_round2, serialize_opt_round4, serialize_round2, serialize_round4};

/// One OHLCV observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Ordered bars for one symbol, ascending by timestamp.
///
/// Fields are public so data sources can assemble a series directly; the engine
/// checks the ordering contract at the source boundary, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

impl TimeSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Copy of the last `n` bars (the whole series if shorter).
    pub fn tail(&self, n: usize) -> TimeSeries {
        let start = self.bars.len().saturating_sub(n);
        TimeSeries {
            symbol: self.symbol.clone(),
            bars: self.bars[start..].to_vec(),
        }
    }

    /// Copy of the bars at or after `from`.
    pub fn since(&self, from: DateTime<Utc>) -> TimeSeries {
        let start = self.bars.partition_point(|b| b.timestamp < from);
        TimeSeries {
            symbol: self.symbol.clone(),
            bars: self.bars[start..].to_vec(),
        }
    }
}

/// Derived columns for one bar. `None` marks a cell the indicator cannot produce yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub ma5: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub volume_ma20: Option<f64>,
    pub volume_ratio: Option<f64>,
}

/// Catalogue entry describing one computed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorColumn {
    pub name: String,
    pub parameters: serde_json::Value,
}

/// A time series decorated with indicator rows; `rows[i]` belongs to `bars[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub rows: Vec<IndicatorRow>,
    pub columns: Vec<IndicatorColumn>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// One row of the historical/charting output, with the external column names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Open", serialize_with = "serialize_round4")]
    pub open: f64,
    #[serde(rename = "High", serialize_with = "serialize_round4")]
    pub high: f64,
    #[serde(rename = "Low", serialize_with = "serialize_round4")]
    pub low: f64,
    #[serde(rename = "Close", serialize_with = "serialize_round4")]
    pub close: f64,
    #[serde(rename = "Volume", serialize_with = "serialize_round4")]
    pub volume: f64,
    #[serde(rename = "MA5", serialize_with = "serialize_opt_round4")]
    pub ma5: Option<f64>,
    #[serde(rename = "MA20", serialize_with = "serialize_opt_round4")]
    pub ma20: Option<f64>,
    #[serde(rename = "MA50", serialize_with = "serialize_opt_round4")]
    pub ma50: Option<f64>,
    #[serde(rename = "RSI", serialize_with = "serialize_opt_round4")]
    pub rsi: Option<f64>,
    #[serde(rename = "MACD", serialize_with = "serialize_opt_round4")]
    pub macd: Option<f64>,
    #[serde(rename = "Signal", serialize_with = "serialize_opt_round4")]
    pub signal: Option<f64>,
    #[serde(rename = "BB_Upper", serialize_with = "serialize_opt_round4")]
    pub bb_upper: Option<f64>,
    #[serde(rename = "BB_Lower", serialize_with = "serialize_opt_round4")]
    pub bb_lower: Option<f64>,
    #[serde(rename = "Volume_MA", serialize_with = "serialize_opt_round4")]
    pub volume_ma: Option<f64>,
    #[serde(rename = "Volume_Ratio", serialize_with = "serialize_opt_round4")]
    pub volume_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total_points: usize,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(serialize_with = "serialize_round2")]
    pub highest_price: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub lowest_price: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub avg_volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryResponse {
    pub symbol: String,
    pub period: String,
    pub data: Vec<HistoryRecord>,
    pub summary: HistorySummary,
}

/// Latest-price snapshot derived from a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: String,
    #[serde(serialize_with = "serialize_round2")]
    pub current_price: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub previous_close: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub change: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub change_percent: f64,
    pub volume: u64,
    pub avg_volume: u64,
    #[serde(serialize_with = "serialize_round2")]
    pub week_52_high: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub week_52_low: f64,
    pub as_of: NaiveDate,
}

/// Direction of an index over its last two bars; an unchanged close counts as up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexMove {
    pub name: String,
    pub symbol: String,
    #[serde(serialize_with = "serialize_round2")]
    pub current: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub change: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub change_percent: f64,
    pub status: MarketDirection,
}

/// Day-over-day moves of the tracked market indices, in configured order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    #[serde(rename = "market_summary")]
    pub indices: Vec<IndexMove>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub algorithm: String,
    pub features_used: Vec<String>,
    pub training_samples: usize,
    pub last_updated: DateTime<Utc>,
}

/// Next-bar forecast. Values are kept at full precision; serialization rounds
/// money and ratio fields to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub symbol: String,
    #[serde(serialize_with = "serialize_round2")]
    pub current_price: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub predicted_price: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub predicted_change: f64,
    /// `None` when the current price is zero.
    #[serde(serialize_with = "serialize_opt_round2")]
    pub predicted_change_percent: Option<f64>,
    #[serde(serialize_with = "serialize_round2")]
    pub confidence: f64,
    pub prediction_date: NaiveDate,
    pub model_info: ModelInfo,
    pub disclaimer: String,
}
