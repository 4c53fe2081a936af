use crate::features::{FeatureVector, FEATURE_COUNT};

/// Per-feature z-score scaling with statistics frozen at fit time.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: [f64; FEATURE_COUNT],
    scales: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Population mean and standard deviation of each column. A constant column
    /// gets scale 1 so it maps to zero instead of dividing by zero.
    pub fn fit(rows: &[FeatureVector]) -> Self {
        let mut means = [0.0; FEATURE_COUNT];
        let mut scales = [1.0; FEATURE_COUNT];
        if rows.is_empty() {
            return Self { means, scales };
        }
        let n = rows.len() as f64;
        for j in 0..FEATURE_COUNT {
            let mean = rows.iter().map(|r| r.0[j]).sum::<f64>() / n;
            let variance = rows.iter().map(|r| (r.0[j] - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();
            means[j] = mean;
            scales[j] = if std > 1e-12 { std } else { 1.0 };
        }
        Self { means, scales }
    }

    pub fn transform(&self, features: &FeatureVector) -> Vec<f64> {
        features
            .0
            .iter()
            .zip(self.means.iter().zip(self.scales.iter()))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect()
    }

    pub fn means(&self) -> &[f64; FEATURE_COUNT] {
        &self.means
    }

    pub fn scales(&self) -> &[f64; FEATURE_COUNT] {
        &self.scales
    }
}
