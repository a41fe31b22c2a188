//! End-to-end tests for the three-model study

use liftfit::pipeline::{
    run_study, run_study_on, train_model, Dataset, FeatureSelection, FeatureTable, ModelFamily,
    PipelineConfig, PipelineError, ReductionMode, StudyModel, StudyStage, TrainingError,
};
use liftfit::report::{StudyReport, TimingInfo};

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_balanced_study_shapes() {
    let dataset = Dataset::from_frame(create_balanced_dataframe(), "classe").unwrap();
    let outcome = run_study_on(&dataset, &fast_config(), |_| {}).unwrap();

    assert_eq!(outcome.prune.exclusions.union(), vec!["f_const".to_string()]);
    assert_eq!(outcome.partition.train.len(), 900);
    assert_eq!(outcome.partition.test.len(), 100);

    for run in outcome.runs() {
        let confusion = &run.evaluation.confusion;
        assert_eq!(confusion.total(), 100, "{} confusion total", run.kind);
        assert_eq!(confusion.classes().len(), 5);
        assert!((0.0..=1.0).contains(&run.test_accuracy()));
        assert_eq!(run.trained.chosen.fold_accuracies.len(), 3);
        assert!(!run
            .trained
            .model
            .feature_names()
            .contains(&"f_const".to_string()));
    }
    assert_eq!(outcome.tree.trained.grid.len(), 3);
}

/// `x0` alone separates A from B; C and D need an oblique cut over six
/// features, which a single tree can only staircase.
#[test]
fn test_forest_beats_tree_when_one_feature_separates_two_classes() {
    let dataset =
        Dataset::from_frame(create_split_feature_dataframe(3000, 11), "classe").unwrap();
    let config = PipelineConfig {
        forest_trees: 60,
        ..fast_config()
    };
    let outcome = run_study_on(&dataset, &config, |_| {}).unwrap();

    let tree = outcome.tree.test_accuracy();
    let forest = outcome.forest.test_accuracy();
    assert!(
        tree < forest,
        "expected forest ({:.4}) to beat tree ({:.4})",
        forest,
        tree
    );
}

#[test]
fn test_reduced_forest_keeps_accuracy() {
    let dataset = Dataset::from_frame(create_quadrant_dataframe(2000, 3), "classe").unwrap();
    let outcome = run_study_on(&dataset, &fast_config(), |_| {}).unwrap();

    let top = &outcome.ranking.features()[0];
    assert!((top.importance - 100.0).abs() < 1e-9);
    assert!(outcome
        .ranking
        .features()
        .iter()
        .all(|f| (0.0..=100.0).contains(&f.importance)));

    let mut reduced = outcome.reduced_features.clone();
    reduced.sort();
    assert_eq!(reduced, vec!["x0".to_string(), "x1".to_string()]);

    let drop = outcome.forest.test_accuracy() - outcome.reduced.test_accuracy();
    assert!(
        drop <= 0.02,
        "reduced forest lost {:.4} accuracy ({:.4} -> {:.4})",
        drop,
        outcome.forest.test_accuracy(),
        outcome.reduced.test_accuracy()
    );
}

#[test]
fn test_drop_mode_excludes_important_features() {
    let dataset = Dataset::from_frame(create_quadrant_dataframe(600, 8), "classe").unwrap();
    let config = PipelineConfig {
        reduction_mode: ReductionMode::Drop,
        forest_trees: 20,
        ..fast_config()
    };
    let outcome = run_study_on(&dataset, &config, |_| {}).unwrap();

    let important = outcome.ranking.above(config.importance_threshold);
    assert!(!important.is_empty());
    for name in &important {
        assert!(!outcome.reduced_features.contains(name));
    }
    assert!(matches!(
        outcome.reduced.trained.selection,
        FeatureSelection::Without(_)
    ));
    assert!(!outcome.reduction_fallback);
}

#[test]
fn test_keep_mode_with_nothing_important_falls_back_to_all_features() {
    let dataset = Dataset::from_frame(create_quadrant_dataframe(300, 9), "classe").unwrap();
    // Nothing can score strictly above 100.
    let config = PipelineConfig {
        importance_threshold: 100.0,
        forest_trees: 10,
        ..fast_config()
    };
    let outcome = run_study_on(&dataset, &config, |_| {}).unwrap();

    assert!(outcome.ranking.above(100.0).is_empty());
    assert!(outcome.reduction_fallback);
    assert_eq!(outcome.reduced.trained.selection, FeatureSelection::All);
    assert_eq!(outcome.reduced_features.len(), 10);
    assert_eq!(
        outcome.reduced.evaluation.confusion.total(),
        outcome.partition.test.len()
    );

    let report = StudyReport::build(
        std::path::Path::new("quadrant.csv"),
        &outcome,
        TimingInfo::default(),
    );
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["reduction_fallback"], true);
}

#[test]
fn test_drop_mode_dropping_every_feature_falls_back_to_all_features() {
    let dataset = Dataset::from_frame(create_single_signal_dataframe(200, 4), "classe").unwrap();
    let config = PipelineConfig {
        reduction_mode: ReductionMode::Drop,
        forest_trees: 10,
        ..fast_config()
    };
    let outcome = run_study_on(&dataset, &config, |_| {}).unwrap();

    assert_eq!(
        outcome.ranking.above(config.importance_threshold),
        vec!["x0".to_string()]
    );
    assert!(outcome.reduction_fallback);
    assert_eq!(outcome.reduced.trained.selection, FeatureSelection::All);
    assert_eq!(outcome.reduced_features, vec!["x0".to_string()]);
}

#[test]
fn test_study_is_deterministic() {
    let dataset = Dataset::from_frame(create_quadrant_dataframe(500, 21), "classe").unwrap();
    let config = PipelineConfig {
        forest_trees: 15,
        ..fast_config()
    };
    let a = run_study_on(&dataset, &config, |_| {}).unwrap();
    let b = run_study_on(&dataset, &config, |_| {}).unwrap();

    assert_eq!(a.partition, b.partition);
    for (ra, rb) in a.runs().iter().zip(b.runs()) {
        assert_eq!(ra.evaluation.confusion, rb.evaluation.confusion);
        assert_eq!(ra.trained.chosen.fold_accuracies, rb.trained.chosen.fold_accuracies);
    }
    assert_eq!(a.reduced_features, b.reduced_features);
}

#[test]
fn test_stages_are_reported_in_order() {
    let dataset = Dataset::from_frame(create_quadrant_dataframe(300, 2), "classe").unwrap();
    let config = PipelineConfig {
        forest_trees: 10,
        ..fast_config()
    };
    let mut stages = Vec::new();
    run_study_on(&dataset, &config, |stage| stages.push(stage)).unwrap();

    assert_eq!(
        stages,
        vec![
            StudyStage::Pruning,
            StudyStage::Partitioning,
            StudyStage::Training(StudyModel::FullTree),
            StudyStage::Training(StudyModel::FullForest),
            StudyStage::Ranking,
            StudyStage::Training(StudyModel::ReducedForest),
        ]
    );
}

#[test]
fn test_run_study_from_csv_and_report() {
    let mut df = create_quadrant_dataframe(400, 4);
    let (_dir, path) = create_temp_csv(&mut df);
    let config = PipelineConfig {
        forest_trees: 10,
        ..fast_config()
    };
    let outcome = run_study(&path, &config).unwrap();

    let report = StudyReport::build(&path, &outcome, TimingInfo::default());
    assert_eq!(report.models.len(), 3);
    assert_eq!(report.columns.len(), 10);
    assert!(report.columns.iter().all(|c| c.status == "kept"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["models"][0]["model"], "full_tree");
    assert_eq!(json["metadata"]["config"]["label_column"], "classe");
    assert!(json["importance"]["features"].is_array());
}

#[test]
fn test_single_class_training_is_rejected() {
    let mut df = create_quadrant_dataframe(60, 1);
    let classe = polars::prelude::Column::new("classe".into(), vec!["A"; 60]);
    df.replace("classe", classe.take_materialized_series()).unwrap();
    let dataset = Dataset::from_frame(df, "classe").unwrap();

    let table = FeatureTable::from_dataset(&dataset).unwrap();
    let rows: Vec<usize> = (0..dataset.height()).collect();
    let err = train_model(
        &table,
        &rows,
        dataset.labels(),
        ModelFamily::DecisionTree,
        &FeatureSelection::All,
        &fast_config().trainer(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Training(TrainingError::SingleClass { classes: 1 })
    ));
}

#[test]
fn test_empty_reduced_selection_is_rejected() {
    let dataset = Dataset::from_frame(create_quadrant_dataframe(200, 6), "classe").unwrap();
    let table = FeatureTable::from_dataset(&dataset).unwrap();
    let rows: Vec<usize> = (0..dataset.height()).collect();
    let err = train_model(
        &table,
        &rows,
        dataset.labels(),
        ModelFamily::RandomForest,
        &FeatureSelection::Only(vec!["not_a_feature".into()]),
        &fast_config().trainer(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Training(TrainingError::NoFeatures)
    ));
}
