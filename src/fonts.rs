//! Font loading and text measurement using `ttf-parser`.
//!
//! Reports use two faces, regular and bold. Out of the box both map to the
//! Standard-14 Helvetica pair, measured with the published Helvetica advance
//! widths so layout matches what a PDF viewer draws. A TrueType/OpenType face
//! can be loaded for either weight; its glyph advances then drive measurement
//! and the font program is embedded by the renderer.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::encoding::{decode_byte, encode_char, encode_win_ansi};
use crate::error::{ReportError, Result};

/// Text weight used by a run. Only two weights exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontFace {
    #[default]
    Regular,
    Bold,
}

impl FontFace {
    /// Resource name used for the face inside page content streams.
    pub fn resource_name(self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
        }
    }

    fn builtin_name(self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
        }
    }
}

impl fmt::Display for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontFace::Regular => f.write_str("regular"),
            FontFace::Bold => f.write_str("bold"),
        }
    }
}

/// Helvetica advance widths for codes 0x20..=0x7E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

/// Helvetica-Bold advance widths for codes 0x20..=0x7E, in 1/1000 em.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a..m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n..z
    389, 280, 389, 584, // {..~
];

/// A parsed font program kept for embedding.
#[derive(Clone)]
pub struct FontProgram {
    /// Raw font bytes, written verbatim as `/FontFile2`.
    pub bytes: Vec<u8>,
    pub postscript_name: String,
    /// Metrics below are scaled to 1/1000 em, as PDF font dictionaries expect.
    pub ascent: f32,
    pub descent: f32,
    pub cap_height: f32,
    pub bbox: [f32; 4],
}

/// Per-face metrics: one advance width per WinAnsi code.
#[derive(Clone)]
struct FaceMetrics {
    widths: [f32; 256],
    program: Option<FontProgram>,
}

impl FaceMetrics {
    fn builtin(face: FontFace) -> Self {
        let (table, fallback) = match face {
            FontFace::Regular => (&HELVETICA_WIDTHS, 556.0),
            FontFace::Bold => (&HELVETICA_BOLD_WIDTHS, 611.0),
        };
        let mut widths = [fallback; 256];
        for (i, w) in table.iter().enumerate() {
            widths[0x20 + i] = *w as f32;
        }
        // Latin-1 no-break space renders as a space.
        widths[0xA0] = widths[0x20];
        Self {
            widths,
            program: None,
        }
    }

    fn from_truetype(face: FontFace, bytes: Vec<u8>) -> Result<Self> {
        let parsed = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| ReportError::Font(format!("failed to parse {face} font: {e}")))?;

        let upem = parsed.units_per_em() as f32;
        if upem <= 0.0 {
            return Err(ReportError::Font(format!("{face} font reports zero units per em")));
        }
        let scale = 1000.0 / upem;

        let missing = parsed
            .glyph_index('?')
            .and_then(|gid| parsed.glyph_hor_advance(gid))
            .map(|adv| adv as f32 * scale)
            .unwrap_or(500.0);

        let mut widths = [missing; 256];
        for code in 0u8..=255 {
            if let Some(ch) = decode_byte(code) {
                if let Some(adv) = parsed
                    .glyph_index(ch)
                    .and_then(|gid| parsed.glyph_hor_advance(gid))
                {
                    widths[code as usize] = adv as f32 * scale;
                }
            }
        }

        let postscript_name = parsed
            .names()
            .into_iter()
            .filter(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
            .find_map(|n| n.to_string())
            .map(|n| n.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-').collect::<String>())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| match face {
                FontFace::Regular => "ReportForge-Regular".to_string(),
                FontFace::Bold => "ReportForge-Bold".to_string(),
            });

        let bb = parsed.global_bounding_box();
        let program = FontProgram {
            postscript_name,
            ascent: parsed.ascender() as f32 * scale,
            descent: parsed.descender() as f32 * scale,
            cap_height: parsed
                .capital_height()
                .map(|h| h as f32 * scale)
                .unwrap_or(parsed.ascender() as f32 * scale),
            bbox: [
                bb.x_min as f32 * scale,
                bb.y_min as f32 * scale,
                bb.x_max as f32 * scale,
                bb.y_max as f32 * scale,
            ],
            bytes,
        };

        Ok(Self {
            widths,
            program: Some(program),
        })
    }
}

/// Measures text for the two report faces.
///
/// Stateless once loaded: measurement never mutates, so one manager can be
/// shared by every report generated in a process.
#[derive(Clone)]
pub struct FontManager {
    regular: FaceMetrics,
    bold: FaceMetrics,
}

impl FontManager {
    /// A manager using the builtin Helvetica metrics for both faces.
    pub fn new() -> Self {
        Self {
            regular: FaceMetrics::builtin(FontFace::Regular),
            bold: FaceMetrics::builtin(FontFace::Bold),
        }
    }

    /// Load a TTF/OTF font from bytes for one of the two faces.
    pub fn load_font(&mut self, face: FontFace, bytes: Vec<u8>) -> Result<()> {
        let metrics = FaceMetrics::from_truetype(face, bytes)?;
        if let Some(program) = &metrics.program {
            log::info!(
                "loaded {} face '{}' ({} bytes)",
                face,
                program.postscript_name,
                program.bytes.len()
            );
        }
        *self.metrics_mut(face) = metrics;
        Ok(())
    }

    /// Read a font file from disk and load it for `face`.
    pub fn load_font_file(&mut self, face: FontFace, path: impl AsRef<Path>) -> Result<()> {
        let bytes = std::fs::read(path.as_ref())?;
        self.load_font(face, bytes)
    }

    fn metrics(&self, face: FontFace) -> &FaceMetrics {
        match face {
            FontFace::Regular => &self.regular,
            FontFace::Bold => &self.bold,
        }
    }

    fn metrics_mut(&mut self, face: FontFace) -> &mut FaceMetrics {
        match face {
            FontFace::Regular => &mut self.regular,
            FontFace::Bold => &mut self.bold,
        }
    }

    /// Measure the rendered width of `text` at `font_size` points.
    pub fn measure_text_width(&self, text: &str, face: FontFace, font_size: f32) -> f32 {
        let widths = &self.metrics(face).widths;
        let units: f32 = encode_win_ansi(text)
            .into_iter()
            .map(|code| widths[code as usize])
            .sum();
        units * font_size / 1000.0
    }

    /// Clip `text` to `max_width`, marking the cut with a trailing `...`.
    pub fn fit_to_width(&self, text: &str, face: FontFace, font_size: f32, max_width: f32) -> String {
        if self.measure_text_width(text, face, font_size) <= max_width {
            return text.to_string();
        }
        let widths = &self.metrics(face).widths;
        let dot = widths[b'.' as usize];

        // Walk forward once. `kept` is the width of the prefix without its
        // trailing whitespace, which only grows, so the first miss ends the scan.
        let mut total = 0.0f32;
        let mut kept = 0.0f32;
        let mut kept_end = 0usize;
        let mut cut = 0usize;
        for (i, ch) in text.char_indices() {
            if (kept + dot + dot + dot) * font_size / 1000.0 > max_width {
                break;
            }
            cut = kept_end;
            total += widths[encode_char(ch) as usize];
            if !ch.is_whitespace() {
                kept = total;
                kept_end = i + ch.len_utf8();
            }
        }
        format!("{}...", &text[..cut])
    }

    /// Widths for WinAnsi codes 0..=255 in 1/1000 em.
    pub fn widths(&self, face: FontFace) -> &[f32; 256] {
        &self.metrics(face).widths
    }

    /// The embedded program for `face`, if one was loaded.
    pub fn program(&self, face: FontFace) -> Option<&FontProgram> {
        self.metrics(face).program.as_ref()
    }

    /// `/BaseFont` name for the face.
    pub fn base_font_name(&self, face: FontFace) -> &str {
        match self.program(face) {
            Some(p) => &p.postscript_name,
            None => face.builtin_name(),
        }
    }

    /// Check if any face carries real font bytes.
    pub fn has_embedded_fonts(&self) -> bool {
        self.regular.program.is_some() || self.bold.program.is_some()
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}
