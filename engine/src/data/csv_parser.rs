use anyhow::{anyhow, Result as AnyResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use shared::models::Bar;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{EngineError, Result};

// Field-level parsers for the OHLCV export format
pub mod ohlcv_format {
    use super::*;

    /// Parses a plain decimal, rejecting NaN and infinities.
    pub fn parse_decimal(s: &str) -> AnyResult<f64> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|e| anyhow!("Failed to parse decimal '{}': {}", s, e))?;
        if !value.is_finite() {
            return Err(anyhow!("Non-finite value '{}'", s));
        }
        Ok(value)
    }

    /// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, the same with a UTC offset
    /// (`2024-01-02 00:00:00-05:00`), or RFC 3339. Offsets are converted to UTC;
    /// naive values are taken as UTC.
    pub fn parse_timestamp(s: &str) -> AnyResult<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z") {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(naive.and_utc());
        }
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| anyhow!("Failed to parse date '{}': {}", s, e))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("Invalid midnight for '{}'", s))?;
        Ok(midnight.and_utc())
    }

}

pub struct CsvBarParser;

impl CsvBarParser {
    // CSV Header: Date,Open,High,Low,Close,Volume (extra columns such as "Adj Close" are ignored)
    // Example Row: 2024-01-02,187.15,188.44,183.89,185.64,82488700
    pub fn load_bars_from_csv(file_path: impl AsRef<Path>) -> Result<Vec<Bar>> {
        let path = file_path.as_ref();
        let file = File::open(path)?;
        tracing::debug!(path = %path.display(), "Reading bars from CSV");
        Self::parse_bars(BufReader::new(file))
    }

    /// Parses bars in file order and rejects rows that do not strictly advance in time.
    pub fn parse_bars<R: Read>(reader: R) -> Result<Vec<Bar>> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let mut bars: Vec<Bar> = Vec::new();

        for (idx, result) in rdr.records().enumerate() {
            let line = idx + 2;
            let record = result?;
            let bar = Self::parse_record(&record, &headers)
                .map_err(|e| EngineError::CsvDataFormatError(format!("line {}: {}", line, e)))?;

            if let Some(previous) = bars.last() {
                if bar.timestamp <= previous.timestamp {
                    return Err(EngineError::CsvDataFormatError(format!(
                        "line {}: date {} does not follow {}",
                        line, bar.timestamp, previous.timestamp
                    )));
                }
            }
            bars.push(bar);
        }
        Ok(bars)
    }

    fn parse_record(record: &StringRecord, headers: &StringRecord) -> AnyResult<Bar> {
        let timestamp = ohlcv_format::parse_timestamp(Self::required(record, headers, "Date")?)?;
        let number = |name: &str| -> AnyResult<f64> {
            ohlcv_format::parse_decimal(Self::required(record, headers, name)?)
                .map_err(|e| anyhow!("Error parsing '{}': {}", name, e))
        };
        Ok(Bar {
            timestamp,
            open: number("Open")?,
            high: number("High")?,
            low: number("Low")?,
            close: number("Close")?,
            volume: number("Volume")?,
        })
    }

    // Helper to get a field by header name, ignoring header case.
    fn required<'a>(
        record: &'a StringRecord,
        headers: &StringRecord,
        name: &str,
    ) -> AnyResult<&'a str> {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
            .and_then(|pos| record.get(pos))
            .ok_or_else(|| anyhow!("Missing '{}' field", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_bars_from_csv_valid_data() {
        let csv_content = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-02,187.15,188.44,183.89,185.64,184.94,82488700
2024-01-03,184.22,185.88,183.43,184.25,183.55,58414500";
        let tmp_file = create_test_csv(csv_content);
        let bars = CsvBarParser::load_bars_from_csv(tmp_file.path()).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].open, 187.15);
        assert_eq!(bars[0].close, 185.64);
        assert_eq!(bars[0].volume, 82488700.0);
        assert_eq!(bars[1].date(), NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn test_header_case_is_ignored() {
        let csv = "date,open,high,low,close,volume\n2024-01-02,1,2,0.5,1.5,10\n";
        let bars = CsvBarParser::parse_bars(csv.as_bytes()).unwrap();
        assert_eq!(bars[0].high, 2.0);
    }

    #[test]
    fn test_load_bars_from_csv_empty_file() {
        let tmp_file = create_test_csv("Date,Open,High,Low,Close,Volume"); // Only header
        assert!(CsvBarParser::load_bars_from_csv(tmp_file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_column() {
        let csv = "Date,Open,High,Low,Close\n2024-01-02,1,2,0.5,1.5\n";
        let err = CsvBarParser::parse_bars(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::CsvDataFormatError(_)));
        assert!(err.to_string().contains("Missing 'Volume' field"));
    }

    #[test]
    fn test_invalid_number_names_column_and_line() {
        let csv = "Date,Open,High,Low,Close,Volume\n\
                   2024-01-02,1,2,0.5,1.5,10\n\
                   2024-01-03,oops,2,0.5,1.5,10\n";
        let err = CsvBarParser::parse_bars(csv.as_bytes()).unwrap_err().to_string();
        assert!(err.contains("line 3"));
        assert!(err.contains("Error parsing 'Open'"));
    }

    #[test]
    fn test_out_of_order_dates_are_rejected() {
        let csv = "Date,Open,High,Low,Close,Volume\n\
                   2024-01-03,1,2,0.5,1.5,10\n\
                   2024-01-02,1,2,0.5,1.5,10\n";
        let err = CsvBarParser::parse_bars(csv.as_bytes()).unwrap_err().to_string();
        assert!(err.contains("does not follow"));
    }

    #[test]
    fn test_ragged_row_is_a_csv_error() {
        let csv = "Date,Open,High,Low,Close,Volume\n2024-01-02,1,2\n";
        let err = CsvBarParser::parse_bars(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, EngineError::CsvSystemError { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = CsvBarParser::load_bars_from_csv("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, EngineError::IoError { .. }));
    }
}
