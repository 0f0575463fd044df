//! Tabular rendering – a bold header row followed by data rows at fixed
//! column x-offsets. One row is always one line: long text is cut with an
//! ellipsis instead of wrapped, and each row asks the paginator for room
//! first, so a table flows across as many pages as it needs.

use serde::{Deserialize, Serialize};

use crate::document::Color;
use crate::fonts::FontFace;
use crate::pagination::Paginator;

/// Distance from a row's baseline to the bottom of its header band.
const BAND_DESCENT: f32 = 5.0;

/// How a column formats its cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    Text,
    /// `$` followed by the value fixed to two decimals.
    Currency,
    /// Shortest decimal form of the value (`2`, `1.5`).
    Number,
}

/// One cell value. Rows may hold strings, numbers, or nulls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub header: String,
    /// Left edge of the column, in points from the page's left edge.
    pub x: f32,
    #[serde(default)]
    pub kind: ColumnKind,
    /// Cells with more characters are cut to this many, ending in `...`.
    #[serde(default)]
    pub max_chars: Option<usize>,
    /// Shown for missing cells. Empty by default.
    #[serde(default)]
    pub placeholder: String,
}

impl Column {
    pub fn new(header: impl Into<String>, x: f32) -> Self {
        Self {
            header: header.into(),
            x,
            kind: ColumnKind::Text,
            max_chars: None,
            placeholder: String::new(),
        }
    }

    pub fn currency(mut self) -> Self {
        self.kind = ColumnKind::Currency;
        self
    }

    pub fn number(mut self) -> Self {
        self.kind = ColumnKind::Number;
        self
    }

    pub fn max_chars(mut self, limit: usize) -> Self {
        self.max_chars = Some(limit);
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = text.into();
        self
    }

    /// Render one cell of this column as display text.
    pub fn format(&self, cell: Option<&Cell>) -> String {
        let text = match (cell, self.kind) {
            (None | Some(Cell::Empty), _) => return self.placeholder.clone(),
            (Some(Cell::Number(v)), ColumnKind::Currency) => format_currency(*v),
            (Some(Cell::Number(v)), _) => format_number(*v),
            (Some(Cell::Text(s)), _) => s.trim().to_string(),
        };
        match self.max_chars {
            Some(limit) => truncate_chars(&text, limit),
            None => text,
        }
    }
}

/// A fixed-column table. Column count and order hold for every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
    /// Draw a shaded band behind the header row.
    #[serde(default = "default_shade")]
    pub shade_header: bool,
    /// Room requested before the header; defaults to the config threshold.
    #[serde(default)]
    pub min_space: Option<f32>,
}

fn default_shade() -> bool {
    true
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            shade_header: true,
            min_space: None,
        }
    }

    pub fn row(mut self, cells: Vec<Cell>) -> Self {
        self.rows.push(cells);
        self
    }
}

/// `$` + value fixed to two decimal places; negatives read `-$5.00`.
pub fn format_currency(value: f64) -> String {
    let digits = format!("{:.2}", value.abs());
    if value < 0.0 && digits != "0.00" {
        format!("-${digits}")
    } else {
        format!("${digits}")
    }
}

/// Shortest decimal rendering: `2.0` becomes `2`, `1.5` stays `1.5`.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

/// Cut `text` to at most `limit` chars, ending in `...` when cut. Limits of
/// three or less leave no room for the ellipsis and cut bare.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    if limit <= 3 {
        return text.chars().take(limit).collect();
    }
    let keep = limit.saturating_sub(3);
    let head: String = text.chars().take(keep).collect();
    format!("{}...", head.trim_end())
}

/// Draw `table` at the cursor. Returns the number of data rows placed.
pub fn render_table(pager: &mut Paginator<'_>, table: &Table) -> usize {
    let header_room = table
        .min_space
        .unwrap_or(pager.config().thresholds.table_header);
    pager.ensure_space(header_room);
    draw_header(pager, table);

    let row_room = pager.config().thresholds.table_row;
    let row_height = pager.config().table_row_height;
    let size = pager.config().table_font_size;

    for (index, row) in table.rows.iter().enumerate() {
        if pager.ensure_space(row_room) && pager.config().repeat_table_header {
            draw_header(pager, table);
        }
        if row.len() > table.columns.len() {
            log::debug!(
                "table row {index} has {} values for {} columns; extras ignored",
                row.len(),
                table.columns.len()
            );
        }
        for (i, column) in table.columns.iter().enumerate() {
            let text = column.format(row.get(i));
            pager.draw_text(column.x, &text, FontFace::Regular, size, Color::BLACK);
        }
        pager.advance(row_height);
    }
    table.rows.len()
}

fn draw_header(pager: &mut Paginator<'_>, table: &Table) {
    let cfg = pager.config();
    let (left, width) = (cfg.left_margin, cfg.content_width());
    let (row_height, size) = (cfg.table_row_height, cfg.table_font_size);

    if table.shade_header {
        pager.fill_band(left, width, BAND_DESCENT, row_height, Color::LIGHT_GRAY);
    }
    for column in &table.columns {
        pager.draw_text(column.x, &column.header, FontFace::Bold, size, Color::BLACK);
    }
    pager.advance(row_height);
}
