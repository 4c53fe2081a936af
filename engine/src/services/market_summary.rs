// Day-over-day moves for a list of market indices
use chrono::Utc;
use shared::models::{IndexMove, MarketDirection, MarketSummary};

use super::build_quote;
use crate::config::MarketIndex;
use crate::data::{MarketDataSource, Period};
use crate::error::Result;

/// Close-to-close move over each index's last two bars. Indices that fail to load
/// or have fewer than two bars are skipped.
pub fn build_market_summary(
    source: &dyn MarketDataSource,
    indices: &[MarketIndex],
) -> MarketSummary {
    let mut moves = Vec::with_capacity(indices.len());
    for index in indices {
        match index_move(source, index) {
            Ok(Some(entry)) => moves.push(entry),
            Ok(None) => {
                tracing::debug!(symbol = %index.symbol, "Fewer than two bars, skipping index");
            }
            Err(e) => {
                tracing::warn!(symbol = %index.symbol, "Skipping index: {}", e);
            }
        }
    }
    MarketSummary {
        indices: moves,
        timestamp: Utc::now(),
    }
}

fn index_move(source: &dyn MarketDataSource, index: &MarketIndex) -> Result<Option<IndexMove>> {
    let series = source.load(&index.symbol, Period::Day5)?;
    if series.len() < 2 {
        return Ok(None);
    }
    let quote = build_quote(&series.tail(2))?;
    let status = if quote.change >= 0.0 {
        MarketDirection::Up
    } else {
        MarketDirection::Down
    };
    Ok(Some(IndexMove {
        name: index.name.clone(),
        symbol: quote.symbol,
        current: quote.current_price,
        change: quote.change,
        change_percent: quote.change_percent,
        status,
    }))
}
