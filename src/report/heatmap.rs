//! Confusion-matrix heatmap rendered as a shaded terminal table
//!
//! Each cell's background is shaded by its share of the true-class row, so
//! the diagonal stands out for a good model regardless of class sizes.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};

use super::summary::{print_indented, print_section};
use crate::pipeline::ConfusionMatrix;

/// Background for a row share in `[0, 1]`, from near-white to deep blue.
pub fn shade(share: f64) -> Color {
    let t = share.clamp(0.0, 1.0);
    let lerp = |from: f64, to: f64| (from + (to - from) * t).round() as u8;
    Color::Rgb {
        r: lerp(240.0, 8.0),
        g: lerp(244.0, 48.0),
        b: lerp(250.0, 107.0),
    }
}

fn text_color(share: f64) -> Color {
    if share > 0.5 {
        Color::White
    } else {
        Color::Black
    }
}

/// Build the heatmap table: rows are true classes, columns predictions.
pub fn heatmap_table(matrix: &ConfusionMatrix) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let mut header = vec![Cell::new("true \\ pred").add_attribute(Attribute::Bold)];
    header.extend(
        matrix
            .classes()
            .iter()
            .map(|c| Cell::new(c).add_attribute(Attribute::Bold)),
    );
    table.set_header(header);

    for ((class, counts), shares) in matrix
        .classes()
        .iter()
        .zip(matrix.as_rows())
        .zip(matrix.row_normalized())
    {
        let mut row = vec![Cell::new(class).add_attribute(Attribute::Bold)];
        row.extend(counts.iter().zip(&shares).map(|(count, &share)| {
            Cell::new(count)
                .bg(shade(share))
                .fg(text_color(share))
                .set_alignment(CellAlignment::Right)
        }));
        table.add_row(row);
    }
    table
}

/// Print a titled heatmap with the matrix accuracy underneath.
pub fn display_heatmap(title: &str, matrix: &ConfusionMatrix) {
    print_section("🟦", &title.to_uppercase());
    print_indented(&heatmap_table(matrix));
    println!(
        "      accuracy {:.4} over {} row(s)",
        matrix.accuracy(),
        matrix.total()
    );
}
