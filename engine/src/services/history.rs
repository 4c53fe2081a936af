// Historical records with indicator columns, for charting callers
use shared::models::{HistoryRecord, HistoryResponse, HistorySummary, IndicatorFrame};

use crate::data::Period;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn build_history(frame: &IndicatorFrame, period: Period) -> HistoryResponse {
    let data: Vec<HistoryRecord> = frame
        .bars
        .iter()
        .zip(frame.rows.iter())
        .map(|(bar, row)| HistoryRecord {
            date: bar.timestamp.format(DATE_FORMAT).to_string(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            ma5: row.ma5,
            ma20: row.ma20,
            ma50: row.ma50,
            rsi: row.rsi14,
            macd: row.macd,
            signal: row.signal,
            bb_upper: row.bollinger_upper,
            bb_lower: row.bollinger_lower,
            volume_ma: row.volume_ma20,
            volume_ratio: row.volume_ratio,
        })
        .collect();

    HistoryResponse {
        symbol: frame.symbol.clone(),
        period: period.to_string(),
        summary: summarize(frame, &data),
        data,
    }
}

fn summarize(frame: &IndicatorFrame, data: &[HistoryRecord]) -> HistorySummary {
    if frame.bars.is_empty() {
        return HistorySummary {
            total_points: 0,
            start_date: None,
            end_date: None,
            highest_price: 0.0,
            lowest_price: 0.0,
            avg_volume: 0.0,
        };
    }
    let highest = frame.bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let lowest = frame.bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let avg_volume = frame.bars.iter().map(|b| b.volume).sum::<f64>() / frame.bars.len() as f64;

    HistorySummary {
        total_points: data.len(),
        start_date: data.first().map(|r| r.date.clone()),
        end_date: data.last().map(|r| r.date.clone()),
        highest_price: highest,
        lowest_price: lowest,
        avg_volume,
    }
}
