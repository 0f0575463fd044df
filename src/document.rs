//! Document model – the frozen structure that encodes exactly what goes on
//! each page, in emission order. This is the hand-off point between layout
//! and PDF rendering.
//!
//! Coordinates are PDF points with the origin at the bottom-left of the page,
//! so the layout cursor moves *down* the page by decreasing `y`.

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::fonts::FontFace;

/// US Letter width in points.
pub const LETTER_WIDTH_PT: f32 = 612.0;
/// US Letter height in points.
pub const LETTER_HEIGHT_PT: f32 = 792.0;

/// An RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::gray(0.0);
    pub const DARK_GRAY: Color = Color::gray(0.35);
    pub const MID_GRAY: Color = Color::gray(0.6);
    pub const LIGHT_GRAY: Color = Color::gray(0.9);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(level: f32) -> Self {
        Self::rgb(level, level, level)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// A single-style text run placed with its baseline at `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub font: FontFace,
    pub size: f32,
    #[serde(default)]
    pub color: Color,
}

/// A filled rectangle; `(x, y)` is its bottom-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilledRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Color,
}

/// A straight stroked line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub thickness: f32,
    pub color: Color,
}

/// One primitive draw operation on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Text(TextRun),
    Rect(FilledRect),
    Line(LineSegment),
}

impl DrawOp {
    /// Lowest y coordinate touched by the operation.
    pub fn min_y(&self) -> f32 {
        match self {
            DrawOp::Text(t) => t.y,
            DrawOp::Rect(r) => r.y,
            DrawOp::Line(l) => l.y1.min(l.y2),
        }
    }
}

/// One page of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub page_index: usize,
    pub ops: Vec<DrawOp>,
}

impl Page {
    fn new(page_index: usize) -> Self {
        Self {
            page_index,
            ops: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Text runs on this page in emission order.
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(t) => Some(t),
            _ => None,
        })
    }
}

/// An ordered, append-only sequence of pages. Always holds at least one page;
/// the last page is the current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width: f32,
    /// Height of each page in PDF points.
    pub page_height: f32,
    pages: Vec<Page>,
}

impl Document {
    /// Create a document with a single empty page.
    pub fn new(title: impl Into<String>, page_width: f32, page_height: f32) -> Self {
        Self {
            title: title.into(),
            page_width,
            page_height,
            pages: vec![Page::new(0)],
        }
    }

    /// A US Letter document.
    pub fn letter(title: impl Into<String>) -> Self {
        Self::new(title, LETTER_WIDTH_PT, LETTER_HEIGHT_PT)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> &Page {
        // `pages` is never empty: constructed with one page, only ever appended to.
        &self.pages[self.pages.len() - 1]
    }

    pub fn current_page_mut(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Append a new page and make it current.
    pub fn push_page(&mut self) -> &mut Page {
        let index = self.pages.len();
        self.pages.push(Page::new(index));
        self.current_page_mut()
    }

    /// Every text run in the document, page by page.
    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.pages.iter().flat_map(|p| p.texts())
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON. Documents without pages are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: Self =
            serde_json::from_str(json).map_err(|e| ReportError::MalformedInput(e.to_string()))?;
        if doc.pages.is_empty() {
            return Err(ReportError::MalformedInput(
                "document must contain at least one page".to_string(),
            ));
        }
        Ok(doc)
    }
}
