//! Held-out evaluation: confusion matrix, accuracy, kappa and per-class metrics

use std::fmt;

use serde::Serialize;

use super::error::{PipelineResult, SchemaError};
use super::features::FeatureTable;
use super::label::LabelDomain;
use super::model::FittedModel;

/// Counts of `(true class, predicted class)` pairs over a label domain.
///
/// `counts[t][p]` is the number of rows with true code `t` predicted as `p`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    classes: Vec<String>,
    counts: Vec<Vec<usize>>,
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassMetrics {
    pub class: String,
    /// 0 when the class was never predicted.
    pub precision: f64,
    /// 0 when the class has no true rows.
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ConfusionMatrix {
    /// Tally `actual` against `predicted`. Both hold codes of `domain`.
    pub fn from_labels(
        actual: &[u32],
        predicted: &[u32],
        domain: &LabelDomain,
    ) -> PipelineResult<Self> {
        if actual.len() != predicted.len() {
            return Err(SchemaError::LabelCountMismatch {
                expected: actual.len(),
                got: predicted.len(),
            }
            .into());
        }
        let n = domain.len();
        let mut counts = vec![vec![0usize; n]; n];
        for (&t, &p) in actual.iter().zip(predicted) {
            counts[t as usize][p as usize] += 1;
        }
        Ok(Self {
            classes: domain.classes().to_vec(),
            counts,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    fn correct(&self) -> usize {
        (0..self.counts.len()).map(|i| self.counts[i][i]).sum()
    }

    /// Trace over total; 0 for an empty matrix.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.correct() as f64 / total as f64
        }
    }

    /// Cohen's kappa: agreement beyond what the marginals give by chance.
    pub fn kappa(&self) -> f64 {
        let total = self.total() as f64;
        if total == 0.0 {
            return 0.0;
        }
        let n = self.counts.len();
        let observed = self.correct() as f64 / total;
        let expected: f64 = (0..n)
            .map(|c| {
                let row: usize = self.counts[c].iter().sum();
                let col: usize = (0..n).map(|r| self.counts[r][c]).sum();
                (row as f64 / total) * (col as f64 / total)
            })
            .sum();
        if (1.0 - expected).abs() < f64::EPSILON {
            // Only one class present on both sides.
            return if observed >= 1.0 { 1.0 } else { 0.0 };
        }
        (observed - expected) / (1.0 - expected)
    }

    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.counts.len();
        (0..n)
            .map(|c| {
                let tp = self.counts[c][c];
                let predicted: usize = (0..n).map(|r| self.counts[r][c]).sum();
                let support: usize = self.counts[c].iter().sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: self.classes[c].clone(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Each row divided by its sum; rows with no true rows stay all zero.
    pub fn row_normalized(&self) -> Vec<Vec<f64>> {
        self.counts
            .iter()
            .map(|row| {
                let sum: usize = row.iter().sum();
                row.iter().map(|&v| ratio(v, sum)).collect()
            })
            .collect()
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10}", "")?;
        for class in &self.classes {
            write!(f, " {:>8}", class)?;
        }
        writeln!(f)?;
        for (class, row) in self.classes.iter().zip(&self.counts) {
            write!(f, "{:>10}", class)?;
            for v in row {
                write!(f, " {:>8}", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Test-set performance of one model.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
    pub kappa: f64,
    pub class_metrics: Vec<ClassMetrics>,
}

/// Predict `rows` with `model` and compare against their true labels.
pub fn evaluate(
    model: &FittedModel,
    table: &FeatureTable,
    rows: &[usize],
    labels: &[u32],
    domain: &LabelDomain,
) -> PipelineResult<Evaluation> {
    let predicted = model.predict(table, rows)?;
    let actual: Vec<u32> = rows.iter().map(|&r| labels[r]).collect();
    let confusion = ConfusionMatrix::from_labels(&actual, &predicted, domain)?;
    Ok(Evaluation {
        accuracy: confusion.accuracy(),
        kappa: confusion.kappa(),
        class_metrics: confusion.class_metrics(),
        confusion,
    })
}
