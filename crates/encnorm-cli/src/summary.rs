use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use encnorm_model::{ErrorKind, RowIssue, RunReport};

use crate::types::NormalizeResult;

/// Issues listed individually; the rest are only counted.
pub const MAX_LISTED_ISSUES: usize = 50;

pub fn print_summary(result: &NormalizeResult) {
    println!("Input: {}", result.input.display());
    if result.dry_run {
        println!("Output: (dry run)");
    } else {
        println!("Output: {}", result.output_dir.display());
    }
    println!("Rows read: {}", result.report.rows_read);
    println!("{}", table_summary(&result.report));
    if let Some(table) = issue_table(&result.report.issues) {
        println!();
        println!("Issues:");
        println!("{table}");
        let hidden = result.report.issues.len().saturating_sub(MAX_LISTED_ISSUES);
        if hidden > 0 {
            println!("... and {hidden} more");
        }
        for (kind, count) in result.report.issue_counts() {
            println!("{kind}: {count}");
        }
    }
}

/// Rows written and skipped per output table.
pub fn table_summary(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Written"),
        header_cell("Skipped"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    let mut total_written = 0usize;
    let mut total_skipped = 0usize;
    for count in &report.tables {
        total_written += count.written;
        total_skipped += count.skipped;
        table.add_row(vec![
            Cell::new(&count.table)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(count.written),
            count_cell(count.skipped, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_written).add_attribute(Attribute::Bold),
        count_cell(total_skipped, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Row issues ordered by kind, then encounter. `None` when there are none.
pub fn issue_table(issues: &[RowIssue]) -> Option<Table> {
    if issues.is_empty() {
        return None;
    }
    let mut ordered: Vec<&RowIssue> = issues.iter().collect();
    ordered.sort_by(|a, b| (a.kind, a.encounter).cmp(&(b.kind, b.encounter)));

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Kind"),
        header_cell("Encounter"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for issue in ordered.into_iter().take(MAX_LISTED_ISSUES) {
        table.add_row(vec![
            kind_cell(issue.kind),
            Cell::new(issue.encounter),
            Cell::new(&issue.message),
        ]);
    }
    Some(table)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Fixed(22)),
        ColumnConstraint::LowerBoundary(Width::Fixed(10)),
        ColumnConstraint::UpperBoundary(Width::Percentage(70)),
    ]);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn kind_cell(kind: ErrorKind) -> Cell {
    let color = match kind {
        ErrorKind::OrphanEncounter | ErrorKind::MissingReference => Color::Red,
        _ => Color::Yellow,
    };
    Cell::new(kind).fg(color)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
