//! Greedy word-wrap.
//!
//! Lines are produced lazily by [`WrapLines`]. A word is never split: a word
//! wider than the column sits alone on its own (overflowing) line.

use std::str::SplitWhitespace;

use crate::fonts::{FontFace, FontManager};

/// Lazy iterator over the wrapped lines of a string.
///
/// A clone continues from the same position. Build a fresh one with
/// [`wrap_lines`] to start over.
#[derive(Clone)]
pub struct WrapLines<'a> {
    words: SplitWhitespace<'a>,
    pending: Option<&'a str>,
    fonts: &'a FontManager,
    face: FontFace,
    font_size: f32,
    max_width: f32,
}

impl Iterator for WrapLines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        // The accumulator always carries a trailing space, and the fit test
        // measures `accumulator + word + " "`.
        let mut line = String::new();
        while let Some(word) = self.pending.take().or_else(|| self.words.next()) {
            let candidate = format!("{line}{word} ");
            let width = self
                .fonts
                .measure_text_width(&candidate, self.face, self.font_size);
            if width > self.max_width && !line.is_empty() {
                self.pending = Some(word);
                break;
            }
            line = candidate;
        }
        if line.is_empty() {
            return None;
        }
        line.truncate(line.trim_end().len());
        Some(line)
    }
}

/// Wrap `text` into lines no wider than `max_width` points.
pub fn wrap_lines<'a>(
    text: &'a str,
    face: FontFace,
    font_size: f32,
    max_width: f32,
    fonts: &'a FontManager,
) -> WrapLines<'a> {
    WrapLines {
        words: text.split_whitespace(),
        pending: None,
        fonts,
        face,
        font_size,
        max_width,
    }
}

/// Word-wrap text to fit within `max_width` points. Returns a vec of lines.
pub fn wrap_text(
    text: &str,
    face: FontFace,
    font_size: f32,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    wrap_lines(text, face, font_size, max_width, fonts).collect()
}
