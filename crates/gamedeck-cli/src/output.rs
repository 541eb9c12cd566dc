//! Output formatting utilities for the CLI

use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table, presets};
use owo_colors::OwoColorize;

/// Style configuration for output formatting
pub struct OutputStyle {
    pub use_color: bool,
    pub use_unicode: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_color: std::env::var("NO_COLOR").is_err(),
            use_unicode: true,
        }
    }
}

impl OutputStyle {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Bordered table with dynamic column widths
pub fn create_table(style: &OutputStyle) -> Table {
    let mut table = Table::new();

    if style.use_unicode {
        table
            .load_preset(presets::UTF8_FULL)
            .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    } else {
        table.load_preset(presets::ASCII_FULL);
    }

    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);

    table
}

pub fn header_cell(text: &str, style: &OutputStyle) -> Cell {
    let cell = Cell::new(text).add_attribute(Attribute::Bold);
    if style.use_color {
        cell.fg(Color::Cyan)
    } else {
        cell
    }
}

pub fn regular_cell(text: &str) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Left)
}

/// Right-aligned cell
pub fn numeric_cell(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

/// Green for fresh, dimmed for expired
pub fn freshness_cell(fresh: bool, style: &OutputStyle) -> Cell {
    let (text, color) = if fresh {
        ("fresh", Color::Green)
    } else {
        ("expired", Color::Grey)
    };
    let cell = Cell::new(text);
    if style.use_color { cell.fg(color) } else { cell }
}

pub fn print_section_header(title: &str, style: &OutputStyle) {
    if style.use_color {
        println!("\n{}", title.bold().bright_blue());
        println!("{}", "═".repeat(title.chars().count()).bright_blue());
    } else {
        println!("\n{title}");
        println!("{}", "=".repeat(title.chars().count()));
    }
}

pub fn format_success(text: &str, style: &OutputStyle) -> String {
    if style.use_color {
        text.green().to_string()
    } else {
        text.to_string()
    }
}

pub fn format_muted(text: &str, style: &OutputStyle) -> String {
    if style.use_color {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

/// Human-readable age such as `5m 12s`
pub fn format_age(age: std::time::Duration) -> String {
    let secs = age.as_secs();
    match secs {
        0..60 => format!("{secs}s"),
        60..3600 => format!("{}m {}s", secs / 60, secs % 60),
        _ => format!("{}h {}m", secs / 3600, (secs % 3600) / 60),
    }
}
