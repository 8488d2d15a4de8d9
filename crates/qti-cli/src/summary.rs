use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::ConvertResult;

pub fn print_convert_summary(result: &ConvertResult) {
    println!("Title: {}", result.title);
    if result.dry_run {
        println!("Output: (dry run, nothing written)");
    } else {
        println!("Output: {}", result.output_dir.display());
    }

    let mut table = Table::new();
    table.set_header(vec![header_cell("Type"), header_cell("Questions")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let mut total = 0usize;
    for (kind, count) in &result.counts {
        total += count;
        table.add_row(vec![Cell::new(kind.as_str()), Cell::new(count)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!(
        "Documents: {} ({} files written)",
        result.documents, result.files_written
    );
    print_dropped_table(result);
}

fn print_dropped_table(result: &ConvertResult) {
    if result.report.dropped.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Item"),
        header_cell("Type"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    for dropped in &result.report.dropped {
        table.add_row(vec![
            Cell::new(&dropped.item_id),
            Cell::new(dropped.kind.as_str()),
            Cell::new(dropped.violation.to_string()).fg(Color::Yellow),
        ]);
    }
    println!();
    println!("Dropped questions:");
    println!("{table}");
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
