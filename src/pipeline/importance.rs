//! Importance ranking and importance-based feature reduction

use serde::Serialize;

use super::config::ReductionMode;
use super::features::FeatureSelection;

/// A feature with its normalized importance and 1-based rank.
#[derive(Debug, Clone, Serialize)]
pub struct RankedFeature {
    pub name: String,
    /// Share of the top score, in `[0, 100]`.
    pub importance: f64,
    pub rank: usize,
}

/// Features sorted by descending importance, scaled so the top score is 100.
#[derive(Debug, Clone, Serialize)]
pub struct ImportanceRanking {
    features: Vec<RankedFeature>,
}

impl ImportanceRanking {
    /// Normalize `raw` by its maximum. All-zero (or empty) input stays zero.
    ///
    /// Ties keep the order of `names`.
    pub fn from_raw(names: &[String], raw: &[f64]) -> Self {
        let max = raw.iter().copied().fold(0.0f64, f64::max);
        let mut features: Vec<RankedFeature> = names
            .iter()
            .zip(raw)
            .map(|(name, &value)| RankedFeature {
                name: name.clone(),
                importance: if max > 0.0 {
                    value.max(0.0) / max * 100.0
                } else {
                    0.0
                },
                rank: 0,
            })
            .collect();

        features.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        for (i, feature) in features.iter_mut().enumerate() {
            feature.rank = i + 1;
        }
        Self { features }
    }

    pub fn features(&self) -> &[RankedFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn importance_of(&self, name: &str) -> Option<f64> {
        self.features
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.importance)
    }

    /// Names scoring strictly above `threshold`, most important first.
    pub fn above(&self, threshold: f64) -> Vec<String> {
        self.features
            .iter()
            .filter(|f| f.importance > threshold)
            .map(|f| f.name.clone())
            .collect()
    }
}

/// Feature selection for the reduced model.
pub fn reduced_selection(
    ranking: &ImportanceRanking,
    threshold: f64,
    mode: ReductionMode,
) -> FeatureSelection {
    let important = ranking.above(threshold);
    match mode {
        ReductionMode::Keep => FeatureSelection::Only(important),
        ReductionMode::Drop => FeatureSelection::Without(important),
    }
}
