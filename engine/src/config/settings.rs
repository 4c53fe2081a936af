// Engine settings, loaded from a JSON file with defaults for anything omitted
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};
use crate::model::ForestConfig;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ForecastSettings {
    /// Directory holding one `<SYMBOL>.csv` per security.
    pub data_dir: PathBuf,
    /// Lookback used when none is requested, e.g. "1y".
    pub default_period: String,
    /// Lookback used to train a predictor.
    pub training_period: String,
    pub training: TrainingSettings,
    pub forest: ForestConfig,
    /// Reported with every prediction; not derived from validation error.
    pub confidence: f64,
    /// Indices shown by the market summary, in display order.
    pub market_indices: Vec<MarketIndex>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MarketIndex {
    pub symbol: String,
    pub name: String,
}

impl MarketIndex {
    fn new(symbol: &str, name: &str) -> Self {
        MarketIndex {
            symbol: symbol.to_string(),
            name: name.to_string(),
        }
    }
}

fn default_market_indices() -> Vec<MarketIndex> {
    vec![
        MarketIndex::new("^GSPC", "S&P 500"),
        MarketIndex::new("^DJI", "Dow Jones"),
        MarketIndex::new("^IXIC", "NASDAQ"),
        MarketIndex::new("^RUT", "Russell 2000"),
    ]
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrainingSettings {
    pub min_raw_bars: usize,
    pub min_complete_rows: usize,
    pub min_training_pairs: usize,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        TrainingSettings {
            min_raw_bars: 100,
            min_complete_rows: 50,
            min_training_pairs: 30,
        }
    }
}

impl Default for ForecastSettings {
    fn default() -> Self {
        ForecastSettings {
            data_dir: PathBuf::from("data"),
            default_period: "1y".to_string(),
            training_period: "2y".to_string(),
            training: TrainingSettings::default(),
            forest: ForestConfig::default(),
            confidence: 0.75,
            market_indices: default_market_indices(),
        }
    }
}

impl ForecastSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let settings: ForecastSettings = serde_json::from_str(&text)
            .map_err(|e| EngineError::ConfigError(format!("{}: {}", path.display(), e)))?;
        settings.validate()?;
        tracing::debug!(path = %path.display(), "Loaded forecast settings");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let t = &self.training;
        if t.min_raw_bars == 0 || t.min_complete_rows == 0 {
            return Err(config_error("training thresholds must be positive"));
        }
        if t.min_training_pairs < 2 {
            return Err(config_error("min_training_pairs must be at least 2"));
        }
        if self.forest.n_trees == 0 {
            return Err(config_error("forest.n_trees must be positive"));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(config_error(format!(
                "confidence {} is outside [0, 1]",
                self.confidence
            )));
        }
        if let Some(index) = self.market_indices.iter().find(|i| i.symbol.trim().is_empty()) {
            return Err(config_error(format!("market index '{}' has no symbol", index.name)));
        }
        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> EngineError {
    EngineError::ConfigError(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = ForecastSettings::default();
        assert_eq!(settings.training.min_raw_bars, 100);
        assert_eq!(settings.training.min_complete_rows, 50);
        assert_eq!(settings.training.min_training_pairs, 30);
        assert_eq!(settings.forest.n_trees, 100);
        assert_eq!(settings.forest.seed, 42);
        assert_eq!(settings.confidence, 0.75);
        assert_eq!(settings.market_indices.len(), 4);
        assert_eq!(settings.market_indices[0], MarketIndex::new("^GSPC", "S&P 500"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        let json = r#"{ "data_dir": "/srv/bars", "forest": { "n_trees": 25 } }"#;
        writeln!(file, "{}", json).unwrap();
        let settings = ForecastSettings::load(file.path()).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/srv/bars"));
        assert_eq!(settings.forest.n_trees, 25);
        assert_eq!(settings.forest.max_depth, 10);
        assert_eq!(settings.confidence, 0.75);
    }

    #[test]
    fn test_load_rejects_bad_confidence() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "confidence": 1.5 }}"#).unwrap();
        let err = ForecastSettings::load(file.path()).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }

    #[test]
    fn test_load_reports_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        let result = ForecastSettings::load(file.path());
        assert!(matches!(result, Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn test_load_custom_market_indices() {
        let mut file = NamedTempFile::new().unwrap();
        let json = r#"{ "market_indices": [ { "symbol": "^FTSE", "name": "FTSE 100" } ] }"#;
        writeln!(file, "{}", json).unwrap();
        let settings = ForecastSettings::load(file.path()).unwrap();
        assert_eq!(settings.market_indices, vec![MarketIndex::new("^FTSE", "FTSE 100")]);

        let mut blank = NamedTempFile::new().unwrap();
        writeln!(blank, r#"{{ "market_indices": [ {{ "symbol": " ", "name": "X" }} ] }}"#).unwrap();
        assert!(matches!(ForecastSettings::load(blank.path()), Err(EngineError::ConfigError(_))));
    }
}
