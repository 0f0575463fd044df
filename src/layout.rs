//! Layout engine – walks an ordered list of content blocks and places each one
//! on the document through the [`Paginator`].
//!
//! The engine knows nothing about invoices or inspections. Templates describe
//! a report as a flat `Vec<ContentBlock>`; this module owns every piece of
//! pagination arithmetic.

use serde::{Deserialize, Serialize};

use crate::config::{LayoutConfig, ParagraphOverflow};
use crate::document::{Color, Document};
use crate::fonts::{FontFace, FontManager};
use crate::pagination::Paginator;
use crate::table::{render_table, Table};
use crate::wrap::wrap_text;

/// Text drawn for an absent scalar field.
pub const PLACEHOLDER: &str = "N/A";

/// Gap between a label and its value when no explicit value column is given.
const LABEL_GAP: f32 = 4.0;
/// Minimum gap kept between a value and the next entry on the same line.
const ENTRY_GAP: f32 = 8.0;

/// `value`, or [`PLACEHOLDER`] when it is absent or blank.
pub fn or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub text: String,
    #[serde(default)]
    pub size: Option<f32>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub min_space: Option<f32>,
}

impl Heading {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: None,
            x: None,
            min_space: None,
        }
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn min_space(mut self, min_space: f32) -> Self {
        self.min_space = Some(min_space);
        self
    }
}

/// One `label: value` pair placed at fixed offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValueEntry {
    pub label: String,
    #[serde(default)]
    pub value: Option<String>,
    /// Label x; defaults to the left margin.
    #[serde(default)]
    pub x: Option<f32>,
    /// Value x; defaults to just right of the label.
    #[serde(default)]
    pub value_x: Option<f32>,
}

impl KeyValueEntry {
    pub fn new(label: impl Into<String>, value: Option<String>) -> Self {
        Self {
            label: label.into(),
            value,
            x: None,
            value_x: None,
        }
    }

    pub fn at(mut self, x: f32) -> Self {
        self.x = Some(x);
        self
    }

    pub fn value_at(mut self, value_x: f32) -> Self {
        self.value_x = Some(value_x);
        self
    }
}

/// A single line holding one or more label/value pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValueLine {
    pub entries: Vec<KeyValueEntry>,
    /// Draw a shaded banner behind the line (e.g. an invoice total).
    #[serde(default)]
    pub highlight: bool,
    #[serde(default)]
    pub size: Option<f32>,
    #[serde(default)]
    pub min_space: Option<f32>,
}

impl KeyValueLine {
    pub fn new(entries: Vec<KeyValueEntry>) -> Self {
        Self {
            entries,
            highlight: false,
            size: None,
            min_space: None,
        }
    }

    pub fn single(label: impl Into<String>, value: Option<String>) -> Self {
        Self::new(vec![KeyValueEntry::new(label, value)])
    }

    pub fn highlighted(mut self) -> Self {
        self.highlight = true;
        self
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn min_space(mut self, min_space: f32) -> Self {
        self.min_space = Some(min_space);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    #[serde(default)]
    pub size: Option<f32>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub x: Option<f32>,
    /// Wrap width; defaults to the room between `x` and the right margin.
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub min_space: Option<f32>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: None,
            bold: false,
            x: None,
            width: None,
            min_space: None,
        }
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }
}

/// One discrete unit of report content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Heading(Heading),
    KeyValue(KeyValueLine),
    Paragraph(Paragraph),
    Table(Table),
    Divider,
    Spacer { height: f32 },
    PageBreak,
    Footer { text: String },
}

/// Places content blocks onto a fresh document.
pub struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
    fonts: &'a FontManager,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a LayoutConfig, fonts: &'a FontManager) -> Self {
        Self { config, fonts }
    }

    /// Lay out `blocks` in order and return the finished document.
    /// A blank `title` falls back to the configured one.
    pub fn layout(&self, title: &str, blocks: &[ContentBlock]) -> Document {
        let title = match title.trim() {
            "" => self.config.title.as_str(),
            t => t,
        };
        let mut pager = Paginator::new(title, self.config);
        for block in blocks {
            self.render_block(&mut pager, block);
        }
        let doc = pager.finish();
        log::debug!("laid out {} blocks on {} page(s)", blocks.len(), doc.page_count());
        doc
    }

    fn render_block(&self, pager: &mut Paginator<'_>, block: &ContentBlock) {
        let th = &self.config.thresholds;
        match block {
            ContentBlock::Heading(h) => {
                pager.ensure_space(h.min_space.unwrap_or(th.heading));
                let size = h.size.unwrap_or(self.config.heading_font_size);
                let x = h.x.unwrap_or(self.config.left_margin);
                let text = self.fonts.fit_to_width(
                    &h.text,
                    FontFace::Bold,
                    size,
                    self.config.right_edge() - x,
                );
                pager.draw_text(x, &text, FontFace::Bold, size, Color::BLACK);
                pager.advance(self.config.heading_advance(size));
            }
            ContentBlock::KeyValue(line) => self.render_key_values(pager, line),
            ContentBlock::Paragraph(p) => {
                pager.ensure_space(p.min_space.unwrap_or(th.paragraph));
                let face = if p.bold { FontFace::Bold } else { FontFace::Regular };
                let size = p.size.unwrap_or(self.config.body_font_size);
                let x = p.x.unwrap_or(self.config.left_margin);
                let width = p.width.unwrap_or(self.config.right_edge() - x);
                self.render_lines(pager, &p.text, x, width, face, size, Color::BLACK);
            }
            ContentBlock::Table(table) => {
                render_table(pager, table);
            }
            ContentBlock::Divider => {
                pager.ensure_space(th.divider);
                pager.rule(
                    self.config.left_margin,
                    self.config.right_edge(),
                    0.5,
                    Color::MID_GRAY,
                );
                pager.advance(self.config.line_height);
            }
            ContentBlock::Spacer { height } => pager.advance(*height),
            ContentBlock::PageBreak => {
                if !pager.document().current_page().is_empty() {
                    pager.new_page();
                }
            }
            ContentBlock::Footer { text } => {
                pager.ensure_space(th.footer);
                pager.rule(
                    self.config.left_margin,
                    self.config.right_edge(),
                    0.5,
                    Color::MID_GRAY,
                );
                pager.advance(self.config.line_height);
                self.render_lines(
                    pager,
                    text,
                    self.config.left_margin,
                    self.config.content_width(),
                    FontFace::Regular,
                    self.config.footer_font_size,
                    Color::DARK_GRAY,
                );
            }
        }
    }

    fn render_key_values(&self, pager: &mut Paginator<'_>, line: &KeyValueLine) {
        let cfg = self.config;
        pager.ensure_space(line.min_space.unwrap_or(cfg.thresholds.key_value));
        let size = line.size.unwrap_or(cfg.body_font_size);
        let pitch = self.config.line_pitch(size);

        if line.highlight {
            pager.fill_band(cfg.left_margin, cfg.content_width(), 5.0, pitch + 2.0, Color::LIGHT_GRAY);
        }

        for (i, entry) in line.entries.iter().enumerate() {
            let x = entry.x.unwrap_or(cfg.left_margin);
            pager.draw_text(x, &entry.label, FontFace::Bold, size, Color::BLACK);

            let label_width = self.fonts.measure_text_width(&entry.label, FontFace::Bold, size);
            let value_x = entry.value_x.unwrap_or(x + label_width + LABEL_GAP);
            let limit = line.entries[i + 1..]
                .iter()
                .filter_map(|next| next.x)
                .find(|next_x| *next_x > value_x)
                .map(|next_x| next_x - ENTRY_GAP)
                .unwrap_or(cfg.right_edge());

            let value = or_placeholder(entry.value.as_deref());
            let value = self
                .fonts
                .fit_to_width(&value, FontFace::Regular, size, limit - value_x);
            pager.draw_text(value_x, &value, FontFace::Regular, size, Color::BLACK);
        }
        pager.advance(pitch);
    }

    /// Wrap `text` and emit its lines, applying the paragraph overflow policy
    /// once the cursor falls below the bottom margin.
    #[allow(clippy::too_many_arguments)]
    fn render_lines(
        &self,
        pager: &mut Paginator<'_>,
        text: &str,
        x: f32,
        width: f32,
        face: FontFace,
        size: f32,
        color: Color,
    ) {
        let lines = wrap_text(text, face, size, width, self.fonts);
        let pitch = self.config.line_pitch(size);
        for (i, line) in lines.iter().enumerate() {
            if !pager.has_room() {
                match self.config.paragraph_overflow {
                    ParagraphOverflow::Truncate => {
                        log::warn!(
                            "paragraph truncated at page bottom: {} of {} lines dropped",
                            lines.len() - i,
                            lines.len()
                        );
                        break;
                    }
                    ParagraphOverflow::Spill => pager.new_page(),
                }
            }
            pager.draw_text(x, line, face, size, color);
            pager.advance(pitch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, Column};

    fn long_text(words: usize) -> String {
        (0..words)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn texts(doc: &Document) -> Vec<String> {
        doc.texts().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn missing_values_render_placeholder() {
        let cfg = LayoutConfig::default();
        let fonts = FontManager::default();
        let blocks = vec![ContentBlock::KeyValue(KeyValueLine::new(vec![
            KeyValueEntry::new("Serial:", None),
            KeyValueEntry::new("Model:", Some("   ".into())).at(300.0),
        ]))];
        let doc = LayoutEngine::new(&cfg, &fonts).layout("t", &blocks);
        assert_eq!(texts(&doc), vec!["Serial:", "N/A", "Model:", "N/A"]);
    }

    #[test]
    fn key_value_entries_share_one_baseline() {
        let cfg = LayoutConfig::default();
        let fonts = FontManager::default();
        let blocks = vec![ContentBlock::KeyValue(KeyValueLine::new(vec![
            KeyValueEntry::new("Invoice #:", Some("INV-7".into())),
            KeyValueEntry::new("Date:", Some("2024-03-01".into())).at(350.0).value_at(400.0),
        ]))];
        let doc = LayoutEngine::new(&cfg, &fonts).layout("t", &blocks);
        let runs: Vec<_> = doc.texts().collect();
        assert!(runs.iter().all(|r| r.y == runs[0].y));
        assert_eq!(runs[2].x, 350.0);
        assert_eq!(runs[3].x, 400.0);
    }

    #[test]
    fn long_values_are_clipped_before_the_next_entry() {
        let cfg = LayoutConfig::default();
        let fonts = FontManager::default();
        let blocks = vec![ContentBlock::KeyValue(KeyValueLine::new(vec![
            KeyValueEntry::new("Site:", Some(long_text(40))).value_at(100.0),
            KeyValueEntry::new("Date:", Some("today".into())).at(300.0),
        ]))];
        let doc = LayoutEngine::new(&cfg, &fonts).layout("t", &blocks);
        let value = doc.texts().nth(1).unwrap();
        assert!(value.text.ends_with("..."));
        let width = fonts.measure_text_width(&value.text, FontFace::Regular, cfg.body_font_size);
        assert!(100.0 + width <= 300.0 - ENTRY_GAP);
    }

    #[test]
    fn paragraph_truncates_at_bottom_margin_by_default() {
        let cfg = LayoutConfig::default();
        let fonts = FontManager::default();
        let text = long_text(2000);
        let blocks = vec![ContentBlock::Paragraph(Paragraph::new(text.clone()))];
        let doc = LayoutEngine::new(&cfg, &fonts).layout("t", &blocks);

        assert_eq!(doc.page_count(), 1);
        let emitted = texts(&doc).join(" ");
        assert!(text.starts_with(&emitted), "emitted lines must be a prefix");
        assert!(emitted.len() < text.len());
        for op in &doc.pages()[0].ops {
            assert!(op.min_y() >= cfg.bottom_margin);
        }
    }

    #[test]
    fn paragraph_spills_onto_new_pages_when_configured() {
        let cfg = LayoutConfig {
            paragraph_overflow: ParagraphOverflow::Spill,
            ..LayoutConfig::default()
        };
        let fonts = FontManager::default();
        let text = long_text(2000);
        let blocks = vec![ContentBlock::Paragraph(Paragraph::new(text.clone()))];
        let doc = LayoutEngine::new(&cfg, &fonts).layout("t", &blocks);

        assert!(doc.page_count() > 1);
        assert_eq!(texts(&doc).join(" "), text);
        for page in doc.pages() {
            for op in &page.ops {
                assert!(op.min_y() >= cfg.bottom_margin);
            }
        }
    }

    #[test]
    fn heading_near_bottom_moves_to_next_page() {
        let cfg = LayoutConfig::default();
        let fonts = FontManager::default();
        let blocks = vec![
            ContentBlock::Paragraph(Paragraph::new("intro")),
            ContentBlock::Spacer { height: 600.0 },
            ContentBlock::Heading(Heading::new("Checklist")),
        ];
        let doc = LayoutEngine::new(&cfg, &fonts).layout("t", &blocks);
        assert_eq!(doc.page_count(), 2);
        let heading = doc.pages()[1].texts().next().unwrap();
        assert_eq!(heading.text, "Checklist");
        assert_eq!(heading.y, cfg.top_start());
    }

    #[test]
    fn page_break_skips_empty_pages() {
        let cfg = LayoutConfig::default();
        let fonts = FontManager::default();
        let blocks = vec![
            ContentBlock::PageBreak,
            ContentBlock::Paragraph(Paragraph::new("one")),
            ContentBlock::PageBreak,
            ContentBlock::PageBreak,
            ContentBlock::Paragraph(Paragraph::new("two")),
        ];
        let doc = LayoutEngine::new(&cfg, &fonts).layout("t", &blocks);
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn blocks_deserialize_from_tagged_json() {
        let json = r#"[
            {"type": "heading", "text": "Report"},
            {"type": "key_value", "entries": [{"label": "Account:", "value": "A-1"}]},
            {"type": "paragraph", "text": "Body", "size": 9},
            {"type": "table", "columns": [{"header": "Item", "x": 50}], "rows": [["Pump"]]},
            {"type": "divider"},
            {"type": "spacer", "height": 12},
            {"type": "footer", "text": "Thanks"}
        ]"#;
        let blocks: Vec<ContentBlock> = serde_json::from_str(json).unwrap();
        assert_eq!(blocks.len(), 7);
        assert!(matches!(&blocks[3], ContentBlock::Table(t) if t.rows == vec![vec![Cell::Text("Pump".into())]]));

        let cfg = LayoutConfig::default();
        let fonts = FontManager::default();
        let doc = LayoutEngine::new(&cfg, &fonts).layout("t", &blocks);
        assert_eq!(
            texts(&doc),
            vec!["Report", "Account:", "A-1", "Body", "Item", "Pump", "Thanks"]
        );
    }

    #[test]
    fn negative_spacer_keeps_text_below_top_margin() {
        let cfg = LayoutConfig::default();
        let fonts = FontManager::default();
        let blocks: Vec<ContentBlock> = serde_json::from_str(
            r#"[{"type": "spacer", "height": -1000}, {"type": "paragraph", "text": "hello"}]"#,
        )
        .unwrap();
        let doc = LayoutEngine::new(&cfg, &fonts).layout("t", &blocks);
        let run = doc.texts().next().unwrap();
        assert_eq!(run.text, "hello");
        assert_eq!(run.y, cfg.top_start());
    }

    #[test]
    fn table_block_uses_engine_cursor() {
        let cfg = LayoutConfig::default();
        let fonts = FontManager::default();
        let table = Table::new(vec![Column::new("Item", 50.0)]).row(vec!["Valve".into()]);
        let blocks = vec![
            ContentBlock::Heading(Heading::new("Parts")),
            ContentBlock::Table(table),
        ];
        let doc = LayoutEngine::new(&cfg, &fonts).layout("t", &blocks);
        let runs: Vec<_> = doc.texts().collect();
        assert!(runs[1].y < runs[0].y);
        assert!(runs[2].y < runs[1].y);
    }
}
