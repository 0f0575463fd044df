//! Layout configuration – every margin, spacing, and overflow threshold the
//! engine uses, hoisted into one structure passed in at construction.

use serde::{Deserialize, Serialize};

use crate::document::{LETTER_HEIGHT_PT, LETTER_WIDTH_PT};
use crate::error::{ReportError, Result};

/// What to do when a paragraph runs past the bottom margin mid-way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphOverflow {
    /// Stop emitting lines once the cursor is below the bottom margin. The
    /// remaining lines are dropped and a warning is logged.
    #[default]
    Truncate,
    /// Continue the paragraph at the top of a new page.
    Spill,
}

/// Minimum vertical room (in points) each kind of block asks for before it
/// draws. A block may override its threshold with its own `min_space`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionThresholds {
    pub heading: f32,
    pub key_value: f32,
    pub paragraph: f32,
    pub table_header: f32,
    pub table_row: f32,
    pub divider: f32,
    pub footer: f32,
}

impl Default for SectionThresholds {
    fn default() -> Self {
        Self {
            heading: 80.0,
            key_value: 30.0,
            paragraph: 60.0,
            table_header: 100.0,
            table_row: 60.0,
            divider: 20.0,
            footer: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// PDF metadata title used when a report supplies none.
    pub title: String,
    /// Page width in points (default: Letter = 612).
    pub page_width: f32,
    /// Page height in points (default: Letter = 792).
    pub page_height: f32,
    pub top_margin: f32,
    /// The cursor never draws below this y.
    pub bottom_margin: f32,
    pub left_margin: f32,
    pub right_margin: f32,
    /// Default cursor advance after a line of body text.
    pub line_height: f32,
    pub body_font_size: f32,
    pub heading_font_size: f32,
    pub footer_font_size: f32,
    /// Vertical pitch of one table row (header included).
    pub table_row_height: f32,
    pub table_font_size: f32,
    pub thresholds: SectionThresholds,
    pub paragraph_overflow: ParagraphOverflow,
    /// Redraw a table's header at the top of each continuation page.
    pub repeat_table_header: bool,
    /// Flate-compress page content streams.
    pub compress: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            title: "report-forge output".to_string(),
            page_width: LETTER_WIDTH_PT,
            page_height: LETTER_HEIGHT_PT,
            top_margin: 50.0,
            bottom_margin: 60.0,
            left_margin: 50.0,
            right_margin: 50.0,
            line_height: 15.0,
            body_font_size: 10.0,
            heading_font_size: 16.0,
            footer_font_size: 8.0,
            table_row_height: 18.0,
            table_font_size: 9.0,
            thresholds: SectionThresholds::default(),
            paragraph_overflow: ParagraphOverflow::Truncate,
            repeat_table_header: true,
            compress: true,
        }
    }
}

impl LayoutConfig {
    /// The y at which writing starts on a fresh page.
    pub fn top_start(&self) -> f32 {
        self.page_height - self.top_margin
    }

    /// Width between the left and right margins.
    pub fn content_width(&self) -> f32 {
        self.page_width - self.left_margin - self.right_margin
    }

    /// x of the right margin.
    pub fn right_edge(&self) -> f32 {
        self.page_width - self.right_margin
    }

    /// Baseline-to-baseline distance for text at `size`.
    pub fn line_pitch(&self, size: f32) -> f32 {
        self.line_height.max(size * 1.25)
    }

    /// Cursor drop after a heading drawn at `size`.
    pub fn heading_advance(&self, size: f32) -> f32 {
        self.line_pitch(size) + 4.0
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON; omitted fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ReportError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that leave no printable area.
    pub fn validate(&self) -> Result<()> {
        if self.line_height <= 0.0 || self.table_row_height <= 0.0 {
            return Err(ReportError::Config(
                "line_height and table_row_height must be positive".to_string(),
            ));
        }
        if self.top_start() <= self.bottom_margin {
            return Err(ReportError::Config(format!(
                "top start {} must lie above bottom margin {}",
                self.top_start(),
                self.bottom_margin
            )));
        }
        if self.content_width() <= 0.0 {
            return Err(ReportError::Config(
                "left and right margins leave no content width".to_string(),
            ));
        }
        Ok(())
    }
}
