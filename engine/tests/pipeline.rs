// End-to-end runs of the forecasting pipeline on synthetic daily series
use std::io::Write;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use forecast_engine::config::ForecastSettings;
use forecast_engine::data::{CsvDirectorySource, InMemorySource, MarketDataSource, Period};
use forecast_engine::features::{extract_complete, TrainingSet};
use forecast_engine::indicators::IndicatorEngine;
use forecast_engine::model::ForestConfig;
use forecast_engine::models::new_series;
use forecast_engine::{EngineError, PredictionService};
use shared::models::{Bar, TimeSeries};

type Ohlcv = (f64, f64, f64, f64, f64);

fn series_from(symbol: &str, n: usize, bar: impl Fn(usize) -> Ohlcv) -> TimeSeries {
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    let bars = (0..n)
        .map(|i| {
            let (open, high, low, close, volume) = bar(i);
            Bar {
                timestamp: start + Duration::days(i as i64),
                open,
                high,
                low,
                close,
                volume,
            }
        })
        .collect();
    new_series(symbol, bars).unwrap()
}

fn constant(symbol: &str, n: usize) -> TimeSeries {
    series_from(symbol, n, |_| (100.0, 100.0, 100.0, 100.0, 1000.0))
}

fn uptrend(symbol: &str, n: usize) -> TimeSeries {
    series_from(symbol, n, |i| {
        let close = 100.0 + i as f64;
        (close - 0.5, close + 1.0, close - 1.0, close, 1000.0 + (i % 5) as f64 * 10.0)
    })
}

fn small_forest_settings() -> ForecastSettings {
    ForecastSettings {
        forest: ForestConfig {
            n_trees: 20,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn constant_series_indicators_settle() {
    let frame = IndicatorEngine::new().compute(&constant("FLAT", 252));
    assert_eq!(frame.len(), 252);

    for (i, row) in frame.rows.iter().enumerate() {
        if i >= 4 {
            assert_eq!(row.ma5, Some(100.0));
        }
        if i >= 49 {
            assert_eq!(row.ma50, Some(100.0));
        }
        if i >= 14 {
            assert_eq!(row.rsi14, Some(100.0));
        } else {
            assert_eq!(row.rsi14, None);
        }
        if i >= 19 {
            assert_eq!(row.ma20, Some(100.0));
            assert_eq!(row.bollinger_upper, Some(100.0));
            assert_eq!(row.bollinger_lower, Some(100.0));
            assert_eq!(row.volume_ratio, Some(1.0));
        }
        assert_eq!(row.macd, Some(0.0));
    }

    // 203 complete rows (49..=251), one fewer training pair
    assert_eq!(extract_complete(&frame).count(), 203);
    assert_eq!(TrainingSet::from_frame(&frame).len(), 202);
}

#[test]
fn constant_series_predicts_the_constant() {
    let service = PredictionService::new(small_forest_settings());
    let result = service.predict_next(&constant("FLAT", 252)).unwrap();
    assert_eq!(result.current_price, 100.0);
    assert_eq!(result.predicted_price, 100.0);
    assert_eq!(result.predicted_change, 0.0);
    assert_eq!(result.predicted_change_percent, Some(0.0));
    assert_eq!(result.model_info.training_samples, 202);
}

#[test]
fn short_series_cannot_train() {
    let series = constant("SHORT", 40);
    let frame = IndicatorEngine::new().compute(&series);
    assert!(frame.rows.iter().all(|row| row.ma50.is_none()));
    assert_eq!(extract_complete(&frame).count(), 0);

    let service = PredictionService::new(small_forest_settings());
    let err = service.predict_next(&series).unwrap_err();
    assert!(matches!(err, EngineError::InsufficientData { .. }));
    assert!(err.is_recoverable());
    assert!(!service.is_trained("SHORT"));
}

#[test]
fn uptrend_forecast_tracks_the_trend() {
    let service = PredictionService::default();
    let result = service.predict_next(&uptrend("UP", 120)).unwrap();

    assert_eq!(result.current_price, 219.0);
    // A tree ensemble cannot exceed its largest label (219), so the band is one-sided in practice.
    assert!(
        (result.predicted_price - 220.0).abs() <= 10.0,
        "predicted {} outside 220 +/- 10",
        result.predicted_price
    );
    assert_eq!(result.model_info.training_samples, 70);
    let percent = result.predicted_change_percent.unwrap();
    assert!((percent - result.predicted_change / 219.0 * 100.0).abs() < 1e-9);
}

#[test]
fn trained_model_needs_a_complete_latest_row() {
    let service = PredictionService::new(small_forest_settings());
    service.train(&uptrend("UP", 150)).unwrap();
    assert!(service.is_trained("up"));

    let recent = uptrend("UP", 20);
    let err = service.predict_next(&recent).unwrap_err();
    assert!(matches!(err, EngineError::InsufficientRecentData(_)));

    // Ten more bars than MA50 needs are enough once the model exists
    assert!(service.predict_next(&uptrend("UP", 60)).is_ok());
}

#[test]
fn prediction_json_shape() {
    let service = PredictionService::new(small_forest_settings());
    let result = service.predict_next(&uptrend("UP", 150)).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["symbol"], "UP");
    assert_eq!(json["current_price"], serde_json::json!(249.0));
    assert_eq!(json["prediction_date"], "2023-06-01");
    assert_eq!(json["model_info"]["features_used"][9], "MACD");
    assert!(json["disclaimer"].as_str().unwrap().contains("educational"));
}

#[test]
fn csv_directory_feeds_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("ACME.csv")).unwrap();
    writeln!(file, "Date,Open,High,Low,Close,Volume").unwrap();
    for bar in &uptrend("ACME", 150).bars {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            bar.timestamp.format("%Y-%m-%d"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        )
        .unwrap();
    }
    drop(file);

    let source = CsvDirectorySource::new(dir.path());
    let service = PredictionService::new(small_forest_settings());

    let result = service.forecast(&source, "acme").unwrap();
    assert_eq!(result.symbol, "ACME");
    assert_eq!(result.model_info.training_samples, 100);

    let history = service.history(&source, "ACME", Period::Month1).unwrap();
    assert!(history.data.len() >= 28 && history.data.len() <= 31);
    assert_eq!(history.summary.end_date.as_deref(), Some("2023-05-31"));

    let quote = service.quote(&source, "ACME").unwrap();
    assert_eq!(quote.current_price, 249.0);
    assert_eq!(quote.previous_close, 248.0);

    let missing = service.forecast(&source, "NOPE").unwrap_err();
    assert!(matches!(missing, EngineError::MarketDataError(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn symbols_forecast_concurrently() {
    let mut source = InMemorySource::new();
    for symbol in ["AAA", "BBB", "CCC", "DDD"] {
        source.insert(uptrend(symbol, 150)).unwrap();
    }
    let source = Arc::new(source);
    let service = Arc::new(PredictionService::new(small_forest_settings()));

    let mut tasks = Vec::new();
    for symbol in source.symbols() {
        let service = Arc::clone(&service);
        let source = Arc::clone(&source);
        tasks.push(tokio::task::spawn_blocking(move || {
            let series = source.load(&symbol, Period::Max).unwrap();
            service.predict_next(&series)
        }));
    }

    let mut predictions = Vec::new();
    for task in tasks {
        predictions.push(task.await.unwrap().unwrap());
    }

    // Same data and seed for every symbol gives the same forecast
    assert_eq!(predictions.len(), 4);
    for p in &predictions {
        assert_eq!(p.predicted_price, predictions[0].predicted_price);
        assert!(service.is_trained(&p.symbol));
    }
}
