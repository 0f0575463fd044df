//! WinAnsiEncoding helpers.
//!
//! Both the builtin Helvetica faces and embedded TrueType faces are written
//! as simple fonts with `/WinAnsiEncoding`, so every glyph is a single byte.
//! Measurement and serialization go through the same mapping so the width
//! the layout engine sees is the width of what actually gets drawn.

/// Code points in the 0x80–0x9F block that differ from Latin-1.
const WIN_ANSI_HIGH: [(u8, char); 27] = [
    (0x80, '\u{20AC}'), // euro
    (0x82, '\u{201A}'), // single low-9 quote
    (0x83, '\u{0192}'), // florin
    (0x84, '\u{201E}'), // double low-9 quote
    (0x85, '\u{2026}'), // ellipsis
    (0x86, '\u{2020}'), // dagger
    (0x87, '\u{2021}'), // double dagger
    (0x88, '\u{02C6}'), // circumflex
    (0x89, '\u{2030}'), // per mille
    (0x8A, '\u{0160}'), // S caron
    (0x8B, '\u{2039}'), // single left angle quote
    (0x8C, '\u{0152}'), // OE
    (0x8E, '\u{017D}'), // Z caron
    (0x91, '\u{2018}'), // left single quote
    (0x92, '\u{2019}'), // right single quote
    (0x93, '\u{201C}'), // left double quote
    (0x94, '\u{201D}'), // right double quote
    (0x95, '\u{2022}'), // bullet
    (0x96, '\u{2013}'), // en-dash
    (0x97, '\u{2014}'), // em-dash
    (0x98, '\u{02DC}'), // small tilde
    (0x99, '\u{2122}'), // trademark
    (0x9A, '\u{0161}'), // s caron
    (0x9B, '\u{203A}'), // single right angle quote
    (0x9C, '\u{0153}'), // oe
    (0x9E, '\u{017E}'), // z caron
    (0x9F, '\u{0178}'), // Y diaeresis
];

/// Map one char to its WinAnsi byte. Unmappable chars become `?`.
pub fn encode_char(c: char) -> u8 {
    match c {
        '\u{00A0}' => b' ',
        '\t' | '\n' | '\r' => b' ',
        c if (c as u32) < 0x20 => b'?',
        c if (c as u32) < 0x80 => c as u8,
        c if (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
        c => WIN_ANSI_HIGH
            .iter()
            .find(|(_, ch)| *ch == c)
            .map(|(code, _)| *code)
            .unwrap_or(b'?'),
    }
}

/// Encode a string as WinAnsi bytes.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

/// The Unicode char drawn for a WinAnsi code, if the code is assigned.
pub fn decode_byte(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as char),
        0x80..=0x9F => WIN_ANSI_HIGH
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, ch)| *ch),
        _ => None,
    }
}
