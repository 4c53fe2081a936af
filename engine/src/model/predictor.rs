// Owns one fitted scaler + forest pair and swaps it atomically on refit.
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::{DateTime, Utc};

use super::random_forest::{ForestConfig, RandomForest};
use super::scaler::StandardScaler;
use crate::error::{EngineError, Result};
use crate::features::{FeatureVector, TrainingSet, FEATURE_NAMES};

pub const MIN_TRAINING_PAIRS: usize = 30;

/// Outcome of a successful `fit`.
#[derive(Debug, Clone, PartialEq)]
pub struct FitSummary {
    pub samples: usize,
    pub trees: usize,
    /// R² of the forest on its own training pairs.
    pub in_sample_r2: f64,
    pub trained_at: DateTime<Utc>,
}

struct FittedModel {
    scaler: StandardScaler,
    forest: RandomForest,
    summary: FitSummary,
}

/// Next-close regressor. `fit` calls are serialized; `predict` reads whichever
/// complete model was last published and never observes a half-built one.
pub struct PricePredictor {
    config: ForestConfig,
    min_training_pairs: usize,
    model: RwLock<Option<Arc<FittedModel>>>,
    fit_lock: Mutex<()>,
}

impl PricePredictor {
    pub fn new(config: ForestConfig) -> Self {
        Self::with_min_training_pairs(config, MIN_TRAINING_PAIRS)
    }

    pub fn with_min_training_pairs(config: ForestConfig, min_training_pairs: usize) -> Self {
        Self {
            config,
            min_training_pairs,
            model: RwLock::new(None),
            fit_lock: Mutex::new(()),
        }
    }

    pub fn fit(&self, training: &TrainingSet) -> Result<FitSummary> {
        self.check_training(training)?;
        let _guard = self.lock_fit();
        Ok(self.fit_locked(training))
    }

    /// Fits only when no model is published yet. `build` runs under the fit lock,
    /// so callers racing on an untrained predictor train it exactly once and all
    /// receive the summary of that one model.
    pub fn fit_if_untrained<F>(&self, build: F) -> Result<FitSummary>
    where
        F: FnOnce() -> Result<TrainingSet>,
    {
        let _guard = self.lock_fit();
        if let Some(model) = self.current() {
            return Ok(model.summary.clone());
        }
        let training = build()?;
        self.check_training(&training)?;
        Ok(self.fit_locked(&training))
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let model = self.current().ok_or(EngineError::NotTrained)?;
        predict_on(&model, features)
    }

    /// Prediction plus the summary of the exact model that produced it.
    pub fn predict_with_summary(&self, features: &FeatureVector) -> Result<(f64, FitSummary)> {
        let model = self.current().ok_or(EngineError::NotTrained)?;
        let value = predict_on(&model, features)?;
        Ok((value, model.summary.clone()))
    }

    pub fn is_trained(&self) -> bool {
        self.current().is_some()
    }

    /// Summary of the model currently in use.
    pub fn summary(&self) -> Option<FitSummary> {
        self.current().map(|m| m.summary.clone())
    }

    /// Drops the fitted model; the next `predict` fails with `NotTrained`.
    pub fn invalidate(&self) {
        let _guard = self.lock_fit();
        *self.model.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    fn check_training(&self, training: &TrainingSet) -> Result<()> {
        if training.len() < self.min_training_pairs {
            return Err(EngineError::InsufficientData {
                what: "training pairs",
                required: self.min_training_pairs,
                actual: training.len(),
            });
        }
        if training.features.len() != training.labels.len() {
            return Err(EngineError::ProcessingError(format!(
                "training set has {} feature rows but {} labels",
                training.features.len(),
                training.labels.len()
            )));
        }
        for features in &training.features {
            check_finite(features)?;
        }
        let bad_label = training.labels.iter().enumerate().find(|(_, l)| !l.is_finite());
        if let Some((row, &label)) = bad_label {
            return Err(EngineError::InvalidFeature {
                index: row,
                name: "NextClose",
                value: label,
            });
        }
        Ok(())
    }

    // A poisoned lock only means an earlier fit panicked; the published model is still whole.
    fn lock_fit(&self) -> MutexGuard<'_, ()> {
        self.fit_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Caller holds the fit lock.
    fn fit_locked(&self, training: &TrainingSet) -> FitSummary {
        tracing::info!(
            samples = training.len(),
            trees = self.config.n_trees,
            "Training price predictor"
        );
        let scaler = StandardScaler::fit(&training.features);
        let rows: Vec<Vec<f64>> = training.features.iter().map(|f| scaler.transform(f)).collect();
        let mut forest = RandomForest::new(self.config.clone());
        forest.fit(&rows, &training.labels);

        let summary = FitSummary {
            samples: training.len(),
            trees: forest.n_trees(),
            in_sample_r2: forest.r2_score(&rows, &training.labels),
            trained_at: Utc::now(),
        };
        let fitted = Arc::new(FittedModel {
            scaler,
            forest,
            summary: summary.clone(),
        });

        *self.model.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(fitted);
        tracing::info!(
            samples = summary.samples,
            r2 = summary.in_sample_r2,
            "Price predictor trained"
        );
        summary
    }

    fn current(&self) -> Option<Arc<FittedModel>> {
        self.model
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for PricePredictor {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

fn predict_on(model: &FittedModel, features: &FeatureVector) -> Result<f64> {
    check_finite(features)?;
    let scaled = model.scaler.transform(features);
    Ok(model.forest.predict_one(&scaled))
}

fn check_finite(features: &FeatureVector) -> Result<()> {
    match features.first_non_finite() {
        Some((index, value)) => Err(EngineError::InvalidFeature {
            index,
            name: FEATURE_NAMES[index],
            value,
        }),
        None => Ok(()),
    }
}
