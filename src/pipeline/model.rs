//! Fitted classifiers
//!
//! Both families are backed by smartcore estimators. A fitted model records
//! the feature names it expects, the medians used for imputation and its raw
//! feature importances, and keeps no reference to its training rows.

use std::fmt;

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters, SplitCriterion,
};

use super::error::{PipelineResult, TrainingError};
use super::features::{FeatureTable, ModelMatrix};

type Tree = DecisionTreeClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;
type Forest = RandomForestClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;

/// Model family under comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    DecisionTree,
    RandomForest,
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFamily::DecisionTree => write!(f, "decision tree"),
            ModelFamily::RandomForest => write!(f, "random forest"),
        }
    }
}

/// One point of a family's search grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Hyperparams {
    DecisionTree {
        /// `None` grows the tree until leaves are pure.
        max_depth: Option<u16>,
    },
    RandomForest {
        /// Features sampled as split candidates at each node.
        mtry: usize,
        trees: u16,
    },
}

impl Hyperparams {
    pub fn family(&self) -> ModelFamily {
        match self {
            Hyperparams::DecisionTree { .. } => ModelFamily::DecisionTree,
            Hyperparams::RandomForest { .. } => ModelFamily::RandomForest,
        }
    }
}

impl fmt::Display for Hyperparams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hyperparams::DecisionTree { max_depth: Some(d) } => write!(f, "max_depth={}", d),
            Hyperparams::DecisionTree { max_depth: None } => write!(f, "max_depth=unlimited"),
            Hyperparams::RandomForest { mtry, trees } => write!(f, "mtry={}, trees={}", mtry, trees),
        }
    }
}

enum Estimator {
    Tree(Tree),
    Forest(Forest),
}

/// A trained predictor over a fixed set of named features.
pub struct FittedModel {
    estimator: Estimator,
    params: Hyperparams,
    feature_names: Vec<String>,
    medians: Vec<f64>,
    raw_importance: Vec<f64>,
}

impl fmt::Debug for FittedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FittedModel")
            .field("params", &self.params)
            .field("features", &self.feature_names.len())
            .finish()
    }
}

impl FittedModel {
    /// Fit on `rows` of `table` using the columns at `features`.
    ///
    /// With `with_importance` set, raw importances are computed: impurity
    /// decrease for a tree, out-of-bag permutation importance for a forest.
    pub fn fit(
        table: &FeatureTable,
        features: &[usize],
        rows: &[usize],
        labels: &[u32],
        params: Hyperparams,
        seed: u64,
        with_importance: bool,
    ) -> Result<Self, TrainingError> {
        if rows.is_empty() {
            return Err(TrainingError::EmptyTrainingSet);
        }
        if features.is_empty() {
            return Err(TrainingError::NoFeatures);
        }
        let y: Vec<u32> = rows.iter().map(|&r| labels[r]).collect();
        let classes = distinct_count(&y);
        if classes < 2 {
            return Err(TrainingError::SingleClass { classes });
        }

        let medians = table.medians(features, rows);
        let matrix = table.matrix(features, rows, &medians);
        let x = matrix.to_dense()?;
        let family = params.family();
        let fit_error = |e: smartcore::error::Failed| TrainingError::Fit {
            family: family.to_string(),
            message: e.to_string(),
        };

        let (estimator, raw_importance) = match params {
            Hyperparams::DecisionTree { max_depth } => {
                let parameters = DecisionTreeClassifierParameters {
                    criterion: SplitCriterion::Gini,
                    max_depth,
                    min_samples_leaf: 1,
                    min_samples_split: 2,
                    seed: Some(seed),
                };
                let tree = Tree::fit(&x, &y, parameters).map_err(fit_error)?;
                let importance = if with_importance {
                    tree.compute_feature_importances(false)
                } else {
                    Vec::new()
                };
                (Estimator::Tree(tree), importance)
            }
            Hyperparams::RandomForest { mtry, trees } => {
                let parameters = RandomForestClassifierParameters::default()
                    .with_n_trees(trees)
                    .with_m(mtry.clamp(1, features.len()))
                    .with_keep_samples(with_importance)
                    .with_seed(seed);
                let forest = Forest::fit(&x, &y, parameters).map_err(fit_error)?;
                let importance = if with_importance {
                    permutation_importance(&forest, &matrix, &y, seed)?
                } else {
                    Vec::new()
                };
                (Estimator::Forest(forest), importance)
            }
        };

        debug!("fitted {} ({}) on {} rows", family, params, rows.len());

        Ok(Self {
            estimator,
            params,
            feature_names: features
                .iter()
                .map(|&i| table.names()[i].clone())
                .collect(),
            medians,
            raw_importance,
        })
    }

    pub fn family(&self) -> ModelFamily {
        self.params.family()
    }

    pub fn params(&self) -> Hyperparams {
        self.params
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Raw importance per feature, aligned with `feature_names`; empty when
    /// the model was fitted without importance.
    pub fn raw_importance(&self) -> &[f64] {
        &self.raw_importance
    }

    /// Predict a class code for each of `rows`.
    ///
    /// Features are looked up by name, so `table` may come from a different
    /// file than the training data as long as it has the same columns.
    pub fn predict(&self, table: &FeatureTable, rows: &[usize]) -> PipelineResult<Vec<u32>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let features = table.indices_of(&self.feature_names)?;
        let x = table.matrix(&features, rows, &self.medians).to_dense()?;
        Ok(self.predict_dense(&x)?)
    }

    fn predict_dense(&self, x: &DenseMatrix<f64>) -> Result<Vec<u32>, TrainingError> {
        let predicted = match &self.estimator {
            Estimator::Tree(tree) => tree.predict(x),
            Estimator::Forest(forest) => forest.predict(x),
        };
        predicted.map_err(|e| TrainingError::Predict(e.to_string()))
    }
}

fn distinct_count(values: &[u32]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn accuracy(predicted: &[u32], actual: &[u32]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let correct = predicted
        .iter()
        .zip(actual)
        .filter(|(p, a)| p == a)
        .count();
    correct as f64 / actual.len() as f64
}

/// Mean decrease in out-of-bag accuracy when each feature is shuffled.
///
/// Negative drops are clamped to zero.
fn permutation_importance(
    forest: &Forest,
    matrix: &ModelMatrix,
    y: &[u32],
    seed: u64,
) -> Result<Vec<f64>, TrainingError> {
    let oob = |x: &DenseMatrix<f64>| {
        forest
            .predict_oob(x)
            .map_err(|e| TrainingError::Predict(e.to_string()))
    };

    let baseline = accuracy(&oob(&matrix.to_dense()?)?, y);

    (0..matrix.ncols())
        .into_par_iter()
        .map(|feature| -> Result<f64, TrainingError> {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(feature as u64));
            let permuted = matrix.with_column_permuted(feature, &mut rng).to_dense()?;
            let score = accuracy(&oob(&permuted)?, y);
            Ok((baseline - score).max(0.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feature 0 separates the classes, feature 1 is constant.
    fn separable() -> (FeatureTable, Vec<u32>) {
        let n = 60;
        let signal: Vec<Option<f64>> = (0..n).map(|i| Some(i as f64)).collect();
        let flat: Vec<Option<f64>> = vec![Some(1.0); n];
        let labels: Vec<u32> = (0..n).map(|i| if i < n / 2 { 0 } else { 1 }).collect();
        (
            FeatureTable::from_columns(vec!["signal".into(), "flat".into()], vec![signal, flat]),
            labels,
        )
    }

    #[test]
    fn tree_learns_threshold_and_reports_importance() {
        let (table, labels) = separable();
        let rows: Vec<usize> = (0..table.height()).collect();
        let model = FittedModel::fit(
            &table,
            &[0, 1],
            &rows,
            &labels,
            Hyperparams::DecisionTree { max_depth: None },
            1,
            true,
        )
        .unwrap();

        assert_eq!(model.predict(&table, &rows).unwrap(), labels);
        let importance = model.raw_importance();
        assert!(importance[0] > 0.0);
        assert_eq!(importance[1], 0.0);
    }

    #[test]
    fn forest_permutation_importance_prefers_signal() {
        let (table, labels) = separable();
        let rows: Vec<usize> = (0..table.height()).collect();
        let model = FittedModel::fit(
            &table,
            &[0, 1],
            &rows,
            &labels,
            Hyperparams::RandomForest { mtry: 2, trees: 30 },
            7,
            true,
        )
        .unwrap();

        let importance = model.raw_importance();
        assert!(importance[0] > importance[1]);
        assert!(importance.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn single_class_training_set_is_rejected() {
        let (table, _) = separable();
        let labels = vec![3u32; table.height()];
        let rows: Vec<usize> = (0..table.height()).collect();
        let err = FittedModel::fit(
            &table,
            &[0],
            &rows,
            &labels,
            Hyperparams::DecisionTree { max_depth: Some(3) },
            0,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, TrainingError::SingleClass { classes: 1 }));
    }
}
