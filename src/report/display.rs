//! Console rendering of the comparison report

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use super::assembler::Report;

/// Report column used to highlight the best model
const HIGHLIGHT_COLUMN: &str = "validation_f1";

/// Build the comparison table; the best held-out F1 is shown in green
pub fn report_table(report: &Report) -> Table {
    let columns = report.column_names();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let mut header = vec![Cell::new("Classifier").add_attribute(Attribute::Bold)];
    header.extend(
        columns
            .iter()
            .map(|name| Cell::new(name).add_attribute(Attribute::Bold)),
    );
    table.set_header(header);

    let best = report
        .rows()
        .iter()
        .filter_map(|row| row.get(HIGHLIGHT_COLUMN))
        .fold(f64::NEG_INFINITY, f64::max);

    for row in report.rows() {
        let mut cells = vec![Cell::new(&row.classifier_name)];
        for name in &columns {
            let value = row.get(name).unwrap_or(f64::NAN);
            let cell = Cell::new(format!("{:.4}", value));
            cells.push(if *name == HIGHLIGHT_COLUMN && value == best {
                cell.fg(Color::Green).add_attribute(Attribute::Bold)
            } else {
                cell
            });
        }
        table.add_row(cells);
    }

    table
}

pub fn display_report(report: &Report) {
    println!();
    println!(
        "    {} {}",
        style("📋").cyan(),
        style("CROSS-VALIDATION REPORT").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    for line in report_table(report).to_string().lines() {
        println!("    {}", line);
    }
}
