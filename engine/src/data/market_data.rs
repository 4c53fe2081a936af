// Sources that hand the engine a normalized series for a symbol and lookback period
use chrono::{Datelike, Months, NaiveDate};
use shared::models::TimeSeries;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::csv_parser::CsvBarParser;
use crate::error::{EngineError, Result};
use crate::models::{new_series, validate_series};

/// Requested lookback, named the way the charting front end names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Day1,
    Day5,
    Month1,
    Month3,
    Month6,
    Year1,
    Year2,
    Year5,
    Year10,
    YearToDate,
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::Day1, Period::Day5, Period::Month1, Period::Month3, Period::Month6, Period::Year1,
        Period::Year2, Period::Year5, Period::Year10, Period::YearToDate, Period::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day1 => "1d",
            Period::Day5 => "5d",
            Period::Month1 => "1mo",
            Period::Month3 => "3mo",
            Period::Month6 => "6mo",
            Period::Year1 => "1y",
            Period::Year2 => "2y",
            Period::Year5 => "5y",
            Period::Year10 => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// Unknown names fall back to one year.
    pub fn parse_or_default(s: &str) -> Period {
        s.parse().unwrap_or_else(|_| {
            tracing::warn!(period = %s, "Unknown period, using 1y");
            Period::Year1
        })
    }

    /// Trims a full series to this lookback. Day periods count bars; month and
    /// year periods count calendar time back from the last bar.
    pub fn apply(&self, series: &TimeSeries) -> TimeSeries {
        let Some(last) = series.last() else {
            return series.clone();
        };
        let months = match self {
            Period::Day1 => return series.tail(1),
            Period::Day5 => return series.tail(5),
            Period::Max => return series.clone(),
            Period::YearToDate => {
                let jan1 = NaiveDate::from_ymd_opt(last.timestamp.year(), 1, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|d| d.and_utc());
                return match jan1 {
                    Some(start) => series.since(start),
                    None => series.clone(),
                };
            }
            Period::Month1 => 1,
            Period::Month3 => 3,
            Period::Month6 => 6,
            Period::Year1 => 12,
            Period::Year2 => 24,
            Period::Year5 => 60,
            Period::Year10 => 120,
        };
        match last.timestamp.checked_sub_months(Months::new(months)) {
            // Strictly after the anniversary so "1y" never holds two bars for the same date
            Some(start) => {
                let mut trimmed = series.since(start);
                if trimmed.bars.first().map_or(false, |b| b.timestamp == start) {
                    trimmed.bars.remove(0);
                }
                trimmed
            }
            None => series.clone(),
        }
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Period::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| EngineError::ConfigError(format!("Unknown period '{}'", s)))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait MarketDataSource: Send + Sync {
    /// Series for `symbol` trimmed to `period`. Unknown symbols are a `MarketDataError`.
    fn load(&self, symbol: &str, period: Period) -> Result<TimeSeries>;
}

/// Series held in memory, keyed by upper-cased symbol.
#[derive(Default)]
pub struct InMemorySource {
    data: HashMap<String, TimeSeries>,
}

impl InMemorySource {
    pub fn new() -> Self {
        InMemorySource {
            data: HashMap::new(),
        }
    }

    pub fn insert(&mut self, series: TimeSeries) -> Result<()> {
        validate_series(&series)?;
        let symbol = series.symbol.to_uppercase();
        tracing::debug!(symbol = %symbol, bars = series.len(), "Stored series");
        self.data.insert(symbol.clone(), TimeSeries { symbol, ..series });
        Ok(())
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        symbols
    }
}

impl MarketDataSource for InMemorySource {
    fn load(&self, symbol: &str, period: Period) -> Result<TimeSeries> {
        self.data
            .get(&symbol.trim().to_uppercase())
            .map(|series| period.apply(series))
            .ok_or_else(|| {
                EngineError::MarketDataError(format!("No data found for symbol '{}'", symbol))
            })
    }
}

/// Reads `<dir>/<SYMBOL>.csv` on every load.
pub struct CsvDirectorySource {
    dir: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }
}

impl MarketDataSource for CsvDirectorySource {
    fn load(&self, symbol: &str, period: Period) -> Result<TimeSeries> {
        let symbol = symbol.trim().to_uppercase();
        let path = self.path_for(&symbol);
        if !path.is_file() {
            return Err(EngineError::MarketDataError(format!(
                "No data found for symbol '{}' ({} not found)",
                symbol,
                path.display()
            )));
        }
        let bars = CsvBarParser::load_bars_from_csv(&path)?;
        let series = period.apply(&new_series(&symbol, bars)?);
        tracing::info!(
            symbol = %symbol,
            period = %period,
            bars = series.len(),
            "Loaded series from CSV"
        );
        Ok(series)
    }
}
