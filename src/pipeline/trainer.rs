//! Cross-validated model training
//!
//! Each candidate of a family's grid is scored by stratified k-fold
//! cross-validation on the training rows. The best candidate by mean fold
//! accuracy is then refit on all training rows.

use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use super::error::PipelineResult;
use super::features::{FeatureSelection, FeatureTable};
use super::model::{FittedModel, Hyperparams, ModelFamily};
use super::partition::stratified_folds;

/// Trainer settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerConfig {
    pub folds: usize,
    pub forest_trees: u16,
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            folds: 5,
            forest_trees: 100,
            seed: 42,
        }
    }
}

/// Cross-validation result for one grid candidate.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    pub params: Hyperparams,
    pub fold_accuracies: Vec<f64>,
    pub mean_accuracy: f64,
    pub std_accuracy: f64,
}

impl CandidateScore {
    fn from_folds(params: Hyperparams, fold_accuracies: Vec<f64>) -> Self {
        let n = fold_accuracies.len().max(1) as f64;
        let mean_accuracy = fold_accuracies.iter().sum::<f64>() / n;
        let variance = fold_accuracies
            .iter()
            .map(|a| (a - mean_accuracy).powi(2))
            .sum::<f64>()
            / n;
        Self {
            params,
            fold_accuracies,
            mean_accuracy,
            std_accuracy: variance.sqrt(),
        }
    }
}

/// A model refit on the full training rows with its selection record.
#[derive(Debug)]
pub struct TrainedModel {
    pub model: FittedModel,
    pub selection: FeatureSelection,
    /// Score of the chosen candidate; its fold accuracies are the estimate
    /// reported for this model.
    pub chosen: CandidateScore,
    pub grid: Vec<CandidateScore>,
}

/// Default search grid for a family over `n_features` features.
///
/// Trees vary depth; forests vary the number of split candidates over
/// `{2, p/2, p}`, deduplicated and clamped to `[1, p]`.
pub fn default_grid(family: ModelFamily, n_features: usize, forest_trees: u16) -> Vec<Hyperparams> {
    match family {
        ModelFamily::DecisionTree => [Some(4), Some(8), None]
            .into_iter()
            .map(|max_depth| Hyperparams::DecisionTree { max_depth })
            .collect(),
        ModelFamily::RandomForest => {
            let p = n_features.max(1);
            let mut mtry: Vec<usize> = [2, p / 2, p].iter().map(|m| (*m).clamp(1, p)).collect();
            mtry.sort_unstable();
            mtry.dedup();
            mtry.into_iter()
                .map(|mtry| Hyperparams::RandomForest {
                    mtry,
                    trees: forest_trees,
                })
                .collect()
        }
    }
}

/// Train a `family` model on `train_rows` with the default grid.
pub fn train_model(
    table: &FeatureTable,
    train_rows: &[usize],
    labels: &[u32],
    family: ModelFamily,
    selection: &FeatureSelection,
    config: &TrainerConfig,
) -> PipelineResult<TrainedModel> {
    let features = table.resolve(selection)?;
    let grid = default_grid(family, features.len(), config.forest_trees);
    train_with_grid(table, train_rows, labels, &features, selection, grid, config)
}

/// Train over an explicit grid. `features` are column indices into `table`.
pub fn train_with_grid(
    table: &FeatureTable,
    train_rows: &[usize],
    labels: &[u32],
    features: &[usize],
    selection: &FeatureSelection,
    grid: Vec<Hyperparams>,
    config: &TrainerConfig,
) -> PipelineResult<TrainedModel> {
    let folds = stratified_folds(train_rows, labels, config.folds, config.seed)?;

    let tasks: Vec<(usize, usize)> = (0..grid.len())
        .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
        .collect();

    let scored: Vec<(usize, usize, f64)> = tasks
        .par_iter()
        .map(|&(candidate, fold)| -> PipelineResult<(usize, usize, f64)> {
            let held_out = &folds[fold];
            let fit_rows = rows_excluding(train_rows, held_out, table.height());
            let fold_seed = config.seed.wrapping_add(fold as u64);
            let model = FittedModel::fit(
                table,
                features,
                &fit_rows,
                labels,
                grid[candidate],
                fold_seed,
                false,
            )?;
            let predicted = model.predict(table, held_out)?;
            let correct = predicted
                .iter()
                .zip(held_out)
                .filter(|(p, &r)| **p == labels[r])
                .count();
            Ok((candidate, fold, correct as f64 / held_out.len().max(1) as f64))
        })
        .collect::<PipelineResult<Vec<_>>>()?;

    let mut per_candidate = vec![vec![0.0; folds.len()]; grid.len()];
    for (candidate, fold, accuracy) in scored {
        per_candidate[candidate][fold] = accuracy;
    }

    let scores: Vec<CandidateScore> = grid
        .iter()
        .zip(per_candidate)
        .map(|(params, accuracies)| CandidateScore::from_folds(*params, accuracies))
        .collect();

    for score in &scores {
        debug!(
            "{}: mean cv accuracy {:.4} (sd {:.4})",
            score.params, score.mean_accuracy, score.std_accuracy
        );
    }

    // Earliest candidate wins ties.
    let mut best = 0;
    for (i, score) in scores.iter().enumerate() {
        if score.mean_accuracy > scores[best].mean_accuracy {
            best = i;
        }
    }
    let chosen = scores[best].clone();

    info!(
        "selected {} with cv accuracy {:.4}; refitting on {} rows",
        chosen.params,
        chosen.mean_accuracy,
        train_rows.len()
    );

    let model = FittedModel::fit(
        table,
        features,
        train_rows,
        labels,
        chosen.params,
        config.seed,
        true,
    )?;

    Ok(TrainedModel {
        model,
        selection: selection.clone(),
        chosen,
        grid: scores,
    })
}

fn rows_excluding(rows: &[usize], excluded: &[usize], height: usize) -> Vec<usize> {
    let mut mask = vec![false; height];
    for &r in excluded {
        mask[r] = true;
    }
    rows.iter().copied().filter(|&r| !mask[r]).collect()
}
