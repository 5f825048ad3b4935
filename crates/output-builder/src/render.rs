//! Renderers for delimited text and inline formats.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::errors::OutputError;
use crate::rows::Rows;

const MAX_TABLE_CELL: usize = 80;

/// Comma-separated text with every field quoted and inner quotes doubled.
pub fn render_csv(rows: &Rows) -> Result<String, OutputError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&rows.header)?;
    for row in &rows.body {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| OutputError::Encode(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| OutputError::Encode(err.to_string()))
}

/// Pipe-delimited table for display in a terminal or chat surface.
pub fn render_table(rows: &Rows) -> String {
    let escape = |cell: &str| truncate(&cell.replace('|', "\\|").replace('\n', " "), MAX_TABLE_CELL);
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!("| {} |", rows.header.join(" | ")));
    lines.push(format!(
        "|{}|",
        rows.header.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    ));
    for row in &rows.body {
        let cells: Vec<String> = row.iter().map(|cell| escape(cell)).collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }
    lines.join("\n")
}

/// Numbered list: name, url, then the remaining fields indented.
pub fn render_text(rows: &Rows) -> String {
    let column = |name: &str| rows.header.iter().position(|key| key == name);
    let (name_col, url_col) = (column("name"), column("url"));
    let rank_col = column("rank");

    rows.body
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let pick = |col: Option<usize>| col.and_then(|c| row.get(c)).cloned().unwrap_or_default();
            let mut entry = format!("{}. {}", index + 1, pick(name_col));
            let url = pick(url_col);
            if !url.is_empty() {
                entry.push_str(&format!("\n   {url}"));
            }
            for (col, value) in row.iter().enumerate() {
                let skip = Some(col) == name_col || Some(col) == url_col || Some(col) == rank_col;
                if !skip && !value.is_empty() {
                    entry.push_str(&format!("\n   {value}"));
                }
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
