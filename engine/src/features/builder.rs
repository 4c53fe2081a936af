use super::{FeatureVector, FEATURE_COUNT};
use shared::models::IndicatorFrame;

/// Feature vector for row `index`, or `None` when the row is out of range or any
/// of the ten features is undefined.
pub fn extract_row(frame: &IndicatorFrame, index: usize) -> Option<FeatureVector> {
    let bar = frame.bars.get(index)?;
    let row = frame.rows.get(index)?;
    let values: [f64; FEATURE_COUNT] = [
        bar.open,
        bar.high,
        bar.low,
        bar.close,
        bar.volume,
        row.ma5?,
        row.ma20?,
        row.ma50?,
        row.rsi14?,
        row.macd?,
    ];
    if values.iter().all(|v| v.is_finite()) {
        Some(FeatureVector(values))
    } else {
        None
    }
}

/// Lazy iterator over the complete rows of a frame in ascending index order.
/// Cloning it restarts from the clone's position; `extract_complete` restarts from zero.
#[derive(Clone)]
pub struct CompleteRows<'a> {
    frame: &'a IndicatorFrame,
    next: usize,
}

impl<'a> Iterator for CompleteRows<'a> {
    type Item = (usize, FeatureVector);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.frame.len() {
            let index = self.next;
            self.next += 1;
            if let Some(features) = extract_row(self.frame, index) {
                return Some((index, features));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.frame.len().saturating_sub(self.next)))
    }
}

pub fn extract_complete(frame: &IndicatorFrame) -> CompleteRows<'_> {
    CompleteRows { frame, next: 0 }
}

/// Features at bar `i` paired with the close of bar `i + 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub features: Vec<FeatureVector>,
    pub labels: Vec<f64>,
}

impl TrainingSet {
    /// Every complete row that has a successor bar contributes one pair.
    pub fn from_frame(frame: &IndicatorFrame) -> Self {
        let mut set = TrainingSet::default();
        for (index, features) in extract_complete(frame) {
            if let Some(next) = frame.bars.get(index + 1) {
                set.features.push(features);
                set.labels.push(next.close);
            }
        }
        set
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn push(&mut self, features: FeatureVector, label: f64) {
        self.features.push(features);
        self.labels.push(label);
    }
}
