use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn label_cell(label: &str) -> Cell {
    Cell::new(label).fg(TableColor::Cyan)
}

/// Green when everything matched was canceled, yellow when some cancels
/// failed, red when none went through.
pub fn color_coded_canceled_cell(canceled: usize, failed: usize) -> Cell {
    let text = canceled.to_string();
    if failed == 0 {
        Cell::new(text).fg(TableColor::Green)
    } else if canceled > 0 {
        Cell::new(text).fg(TableColor::Yellow)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}

pub fn color_coded_failed_cell(failed: usize) -> Cell {
    let text = failed.to_string();
    if failed == 0 {
        Cell::new(text).fg(TableColor::Green)
    } else {
        Cell::new(text).fg(TableColor::Red)
    }
}
