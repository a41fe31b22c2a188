//! Console summary tables for pruning, model comparison and importance

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{ColumnStats, ImportanceRanking, PruneOutcome, StudyOutcome};

/// Counts and names of the columns removed by the pruner.
#[derive(Debug, Default)]
pub struct PruneSummary {
    pub initial_columns: usize,
    pub final_columns: usize,
    pub near_zero_variance: Vec<String>,
    pub high_missing: Vec<String>,
    pub identifiers: Vec<String>,
}

impl PruneSummary {
    pub fn from_outcome(outcome: &PruneOutcome) -> Self {
        Self {
            initial_columns: outcome.initial_columns,
            final_columns: outcome.dataset.frame().width(),
            near_zero_variance: outcome.exclusions.near_zero_variance.clone(),
            high_missing: outcome.exclusions.high_missing.clone(),
            identifiers: outcome.exclusions.identifiers.clone(),
        }
    }

    pub fn display(&self) {
        print_section("📋", "PRUNING SUMMARY");

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Initial Columns"),
            Cell::new(self.initial_columns),
        ]);
        for (label, dropped) in [
            ("🧊 Near-Zero Variance", &self.near_zero_variance),
            ("🕳️  High Missing", &self.high_missing),
            ("🏷️  Identifiers", &self.identifiers),
        ] {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(dropped.len()).fg(if dropped.is_empty() {
                    Color::White
                } else {
                    Color::Red
                }),
            ]);
        }
        table.add_row(vec![
            Cell::new("✅ Final Columns"),
            Cell::new(self.final_columns)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        let reduction_pct = if self.initial_columns > 0 {
            (self.initial_columns.saturating_sub(self.final_columns)) as f64
                / self.initial_columns as f64
                * 100.0
        } else {
            0.0
        };
        table.add_row(vec![
            Cell::new("📉 Reduction"),
            Cell::new(format!("{:.1}%", reduction_pct))
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
        ]);

        print_indented(&table);

        // Identifiers are listed by name; the statistical drops go in their own table.
        if !self.identifiers.is_empty() {
            println!();
            println!(
                "      {} {}:",
                style("Identifier columns").yellow(),
                style(format!("({})", self.identifiers.len())).dim()
            );
            for name in &self.identifiers {
                println!("        {} {}", style("•").dim(), name);
            }
        }
    }
}

/// Table of the columns flagged by the variance or missingness filters.
pub fn display_excluded_statistics(outcome: &PruneOutcome) {
    let flagged: Vec<&ColumnStats> = outcome
        .stats
        .iter()
        .filter(|s| {
            outcome.exclusions.near_zero_variance.contains(&s.name)
                || outcome.exclusions.high_missing.contains(&s.name)
        })
        .collect();
    if flagged.is_empty() {
        return;
    }

    print_section("🔎", "EXCLUDED COLUMN STATISTICS");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        ["Column", "Missing", "Freq Ratio", "% Unique", "Distinct", "Reason"]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for s in flagged {
        let mut reasons = Vec::new();
        if outcome.exclusions.near_zero_variance.contains(&s.name) {
            reasons.push(if s.zero_variance {
                "zero variance"
            } else {
                "near-zero variance"
            });
        }
        if outcome.exclusions.high_missing.contains(&s.name) {
            reasons.push("missing");
        }
        table.add_row(vec![
            Cell::new(&s.name),
            Cell::new(format!("{:.1}%", s.missing_ratio * 100.0)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", s.freq_ratio)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", s.percent_unique)).set_alignment(CellAlignment::Right),
            Cell::new(s.distinct).set_alignment(CellAlignment::Right),
            Cell::new(reasons.join(", ")).fg(Color::Red),
        ]);
    }

    print_indented(&table);
}

/// Side-by-side metrics of the three trained configurations.
pub fn display_model_comparison(outcome: &StudyOutcome) {
    print_section("🏁", "MODEL COMPARISON");

    let best = outcome
        .runs()
        .iter()
        .map(|r| r.test_accuracy())
        .fold(f64::MIN, f64::max);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        [
            "Model",
            "Features",
            "Selected",
            "CV Accuracy",
            "Test Accuracy",
            "Kappa",
        ]
        .iter()
        .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for run in outcome.runs() {
        let test_cell = Cell::new(format!("{:.4}", run.test_accuracy()))
            .set_alignment(CellAlignment::Right);
        let test_cell = if run.test_accuracy() >= best {
            test_cell.fg(Color::Green).add_attribute(Attribute::Bold)
        } else {
            test_cell
        };
        table.add_row(vec![
            Cell::new(run.kind.to_string()),
            Cell::new(run.trained.model.feature_names().len()).set_alignment(CellAlignment::Right),
            Cell::new(run.trained.chosen.params.to_string()),
            Cell::new(format!(
                "{:.4} ± {:.4}",
                run.cv_accuracy(),
                run.trained.chosen.std_accuracy
            ))
            .set_alignment(CellAlignment::Right),
            test_cell,
            Cell::new(format!("{:.4}", run.evaluation.kappa)).set_alignment(CellAlignment::Right),
        ]);
    }

    print_indented(&table);
}

/// Top of the importance ranking, highlighting features above `threshold`.
pub fn display_importance(ranking: &ImportanceRanking, threshold: f64, limit: usize) {
    print_section("🌲", "FEATURE IMPORTANCE");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        ["Rank", "Feature", "Importance", ""]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for feature in ranking.features().iter().take(limit) {
        let color = if feature.importance > threshold {
            Color::Green
        } else {
            Color::DarkGrey
        };
        let bar = "█".repeat((feature.importance / 5.0).round() as usize);
        table.add_row(vec![
            Cell::new(feature.rank).set_alignment(CellAlignment::Right),
            Cell::new(&feature.name).fg(color),
            Cell::new(format!("{:.1}", feature.importance))
                .fg(color)
                .set_alignment(CellAlignment::Right),
            Cell::new(bar).fg(color),
        ]);
    }

    print_indented(&table);

    if ranking.len() > limit {
        println!(
            "      {}",
            style(format!("... {} more feature(s)", ranking.len() - limit)).dim()
        );
    }
    println!(
        "      {} feature(s) above {}",
        style(ranking.above(threshold).len()).yellow().bold(),
        style(format!("{:.1}", threshold)).dim()
    );
}

pub(crate) fn print_section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

pub(crate) fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
