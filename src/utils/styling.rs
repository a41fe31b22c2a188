//! Terminal styling helpers for step-by-step console output

use console::{style, Emoji};
use std::path::Path;

use crate::pipeline::{NzvPolicy, PipelineConfig};

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static TREE: Emoji<'_, '_> = Emoji("🌲 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
    ██╗     ██╗███████╗████████╗███████╗██╗████████╗
    ██║     ██║██╔════╝╚══██╔══╝██╔════╝██║╚══██╔══╝
    ██║     ██║█████╗     ██║   █████╗  ██║   ██║
    ██║     ██║██╔══╝     ██║   ██╔══╝  ██║   ██║
    ███████╗██║██║        ██║   ██║     ██║   ██║
    ╚══════╝╚═╝╚═╝        ╚═╝   ╚═╝     ╚═╝   ╚═╝
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Exercise-quality classification from accelerometer data").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(input: &Path, report: Option<&Path>, config: &PipelineConfig) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);
    let report = report
        .map(|p| truncate_path(p, 38))
        .unwrap_or_else(|| "(disabled)".to_string());
    let nzv = match config.nzv_policy {
        NzvPolicy::ZeroVariance => "zero variance".to_string(),
        NzvPolicy::NearZero {
            freq_cut,
            unique_cut,
        } => format!("near zero ({:.1} / {:.0}%)", freq_cut, unique_cut),
    };

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!("    │  {} Input:  {:<39}│", FOLDER, truncate_path(input, 38));
    println!(
        "    │  {} Label:  {:<39}│",
        TARGET,
        truncate_string(&config.label_column, 38)
    );
    println!("    │  {} Report: {:<39}│", SAVE, report);
    println!("    ├{}┤", line);
    println!(
        "    │  {} Missing threshold:     {:<24}│",
        CHART,
        style(format!("{:.1}%", config.missing_threshold * 100.0)).yellow()
    );
    println!(
        "    │  {} Variance filter:       {:<24}│",
        CHART,
        style(nzv).yellow()
    );
    println!(
        "    │  {} Train fraction:        {:<24}│",
        CHART,
        style(format!("{:.0}%", config.train_fraction * 100.0)).yellow()
    );
    println!(
        "    │  {} Folds / trees:         {:<24}│",
        TREE,
        style(format!("{} / {}", config.folds, config.forest_trees)).yellow()
    );
    println!(
        "    │  {} Importance threshold:  {:<24}│",
        TREE,
        style(format!("{:.1} ({})", config.importance_threshold, config.reduction_mode)).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!("    {} {}", ROCKET, style("Study complete!").green().bold());
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, threshold_info: Option<&str>) {
    if let Some(info) = threshold_info {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      Found {} {}", style(count).yellow().bold(), description);
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let tail: String = s
            .chars()
            .rev()
            .take(max_len - 3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_string("classe", 10), "classe");
    }

    #[test]
    fn truncate_keeps_the_tail() {
        let out = truncate_string("/very/long/path/to/pml-training.csv", 16);
        assert_eq!(out.chars().count(), 16);
        assert!(out.starts_with("..."));
        assert!(out.ends_with("training.csv"));
    }
}
