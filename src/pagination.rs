//! Pagination – owns the document being built and the vertical write cursor.
//!
//! Handles:
//! - cursor advance in configurable line heights
//! - `ensure_space` checks that append a page before a block that would not fit
//! - draw primitives that always land above the bottom margin
//!
//! The cursor `y` is in PDF space (origin bottom-left) and decreases as content
//! is written. Whenever a draw happens, `bottom_margin <= y <= top_start`.

use crate::config::LayoutConfig;
use crate::document::{Color, Document, DrawOp, FilledRect, LineSegment, TextRun};
use crate::fonts::FontFace;

/// Cursor and page controller for one document.
pub struct Paginator<'a> {
    config: &'a LayoutConfig,
    doc: Document,
    y: f32,
}

impl<'a> Paginator<'a> {
    /// Start a document with one empty page and the cursor at the top.
    pub fn new(title: impl Into<String>, config: &'a LayoutConfig) -> Self {
        Self {
            doc: Document::new(title, config.page_width, config.page_height),
            y: config.top_start(),
            config,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        self.config
    }

    /// Current vertical write position on the current page.
    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Whether a draw at the current cursor would stay above the bottom margin.
    pub fn has_room(&self) -> bool {
        self.y >= self.config.bottom_margin
    }

    /// Move the cursor down by `spacing` points. The cursor never moves up.
    pub fn advance(&mut self, spacing: f32) {
        if spacing > 0.0 {
            self.y -= spacing;
        }
    }

    /// Move the cursor down by the configured line height.
    pub fn advance_line(&mut self) {
        self.advance(self.config.line_height);
    }

    /// Make sure at least `min_required` points remain above the bottom
    /// margin, appending a page when they do not. Returns `true` when a new
    /// page was started.
    ///
    /// Call this *before* drawing a block whose height is not known to fit.
    /// A page with nothing drawn on it is never abandoned: the cursor is only
    /// moved back to the top, since a fresh page would offer no more room.
    pub fn ensure_space(&mut self, min_required: f32) -> bool {
        if self.y - min_required >= self.config.bottom_margin {
            return false;
        }
        if self.doc.current_page().is_empty() {
            log::debug!(
                "block needs {min_required}pt but page {} is empty; staying on it",
                self.doc.current_page().page_index
            );
            self.y = self.config.top_start();
            return false;
        }
        self.new_page();
        true
    }

    /// Append a page unconditionally and reset the cursor to the top.
    pub fn new_page(&mut self) {
        self.doc.push_page();
        self.y = self.config.top_start();
        log::debug!("started page {}", self.doc.page_count());
    }

    /// Last-resort check run by every primitive: nothing is ever placed
    /// below the bottom margin.
    fn guard(&mut self, lowest: f32) {
        if lowest >= self.config.bottom_margin {
            return;
        }
        log::debug!(
            "draw at y={lowest} would cross bottom margin {}; breaking page",
            self.config.bottom_margin
        );
        if self.doc.current_page().is_empty() {
            self.y = self.config.top_start();
        } else {
            self.new_page();
        }
    }

    /// Place a text run with its baseline on the cursor.
    pub fn draw_text(&mut self, x: f32, text: &str, font: FontFace, size: f32, color: Color) {
        if text.is_empty() {
            return;
        }
        self.guard(self.y);
        let run = TextRun {
            x,
            y: self.y,
            text: text.to_string(),
            font,
            size,
            color,
        };
        self.doc.current_page_mut().push(DrawOp::Text(run));
    }

    /// Fill a band `height` tall whose bottom edge sits `descent` below the
    /// cursor. Used for header backgrounds and totals banners.
    pub fn fill_band(&mut self, x: f32, width: f32, descent: f32, height: f32, color: Color) {
        self.guard(self.y - descent);
        let rect = FilledRect {
            x,
            y: self.y - descent,
            width,
            height,
            color,
        };
        self.doc.current_page_mut().push(DrawOp::Rect(rect));
    }

    /// Stroke a horizontal rule on the cursor from `x1` to `x2`.
    pub fn rule(&mut self, x1: f32, x2: f32, thickness: f32, color: Color) {
        self.guard(self.y);
        let line = LineSegment {
            x1,
            y1: self.y,
            x2,
            y2: self.y,
            thickness,
            color,
        };
        self.doc.current_page_mut().push(DrawOp::Line(line));
    }

    /// Hand over the finished document.
    pub fn finish(self) -> Document {
        self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(p: &mut Paginator<'_>, text: &str) {
        p.draw_text(50.0, text, FontFace::Regular, 10.0, Color::BLACK);
        p.advance_line();
    }

    #[test]
    fn cursor_starts_at_top_and_advances_down() {
        let cfg = LayoutConfig::default();
        let mut p = Paginator::new("t", &cfg);
        assert_eq!(p.y(), 742.0);
        p.advance_line();
        assert_eq!(p.y(), 727.0);
        p.advance(20.0);
        assert_eq!(p.y(), 707.0);
    }

    #[test]
    fn ensure_space_keeps_page_when_block_fits() {
        let cfg = LayoutConfig::default();
        let mut p = Paginator::new("t", &cfg);
        line(&mut p, "x");
        assert!(!p.ensure_space(100.0));
        assert_eq!(p.page_count(), 1);
    }

    #[test]
    fn ensure_space_appends_page_and_resets_cursor() {
        let cfg = LayoutConfig::default();
        let mut p = Paginator::new("t", &cfg);
        line(&mut p, "x");
        p.advance(600.0); // y = 127
        assert!(p.ensure_space(80.0));
        assert_eq!(p.page_count(), 2);
        assert_eq!(p.y(), cfg.top_start());
    }

    #[test]
    fn boundary_exactly_at_margin_fits() {
        let cfg = LayoutConfig::default();
        let mut p = Paginator::new("t", &cfg);
        line(&mut p, "x");
        let to_go = p.y() - cfg.bottom_margin - 60.0;
        p.advance(to_go);
        assert!(!p.ensure_space(60.0));
        assert!(p.ensure_space(60.5));
    }

    #[test]
    fn empty_page_is_never_abandoned() {
        let cfg = LayoutConfig::default();
        let mut p = Paginator::new("t", &cfg);
        assert!(!p.ensure_space(10_000.0));
        assert!(!p.ensure_space(10_000.0));
        assert_eq!(p.page_count(), 1);
    }

    #[test]
    fn draws_never_land_below_bottom_margin() {
        let cfg = LayoutConfig::default();
        let mut p = Paginator::new("t", &cfg);
        // No ensure_space calls at all: the primitives must still paginate.
        for i in 0..200 {
            line(&mut p, &format!("line {i}"));
        }
        p.fill_band(50.0, 100.0, 4.0, 14.0, Color::LIGHT_GRAY);
        p.rule(50.0, 562.0, 0.5, Color::MID_GRAY);
        let doc = p.finish();
        assert!(doc.page_count() > 1);
        for page in doc.pages() {
            for op in &page.ops {
                assert!(op.min_y() >= cfg.bottom_margin, "{op:?} below margin");
            }
        }
    }

    #[test]
    fn draw_on_empty_page_below_margin_returns_to_top() {
        let cfg = LayoutConfig::default();
        let mut p = Paginator::new("t", &cfg);
        p.advance(720.0);
        line(&mut p, "late");
        let doc = p.finish();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.texts().next().unwrap().y, cfg.top_start());
    }

    #[test]
    fn negative_spacing_does_not_move_above_top() {
        let cfg = LayoutConfig::default();
        let mut p = Paginator::new("t", &cfg);
        p.advance(-1000.0);
        p.advance(f32::NAN);
        assert_eq!(p.y(), cfg.top_start());
        line(&mut p, "hello");
        let doc = p.finish();
        assert_eq!(doc.texts().next().unwrap().y, cfg.top_start());
    }

    #[test]
    fn empty_text_is_skipped() {
        let cfg = LayoutConfig::default();
        let mut p = Paginator::new("t", &cfg);
        p.draw_text(50.0, "", FontFace::Bold, 10.0, Color::BLACK);
        assert!(p.document().current_page().is_empty());
    }
}
