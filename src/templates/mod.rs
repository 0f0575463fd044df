//! Report templates.
//!
//! A template turns one structured record into an ordered list of
//! [`ContentBlock`]s. Templates own titles, labels, placeholder policy and
//! number formatting; they contain no pagination logic.
//!
//! Every field of every record is optional. Absent scalars render as `"N/A"`,
//! absent collections as empty sections.

pub mod inspection;
pub mod invoice;

pub use inspection::InspectionReport;
pub use invoice::Invoice;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::layout::{ContentBlock, Heading, KeyValueEntry, KeyValueLine};

/// A report type that can be laid out by the engine.
pub trait ReportTemplate {
    /// Title written to the PDF metadata.
    fn title(&self) -> String;

    /// Filename without extension, derived from the record's identifier.
    fn file_stem(&self) -> String;

    /// The report's content, in drawing order.
    fn blocks(&self, config: &LayoutConfig) -> Vec<ContentBlock>;

    /// Suggested download filename.
    fn filename(&self) -> String {
        format!("{}.pdf", self.file_stem())
    }
}

/// A person or business named on a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Party {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Sanitize a string for use in filenames.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_' || ch == '/' || ch == '#')
            && !last_dash
            && !result.is_empty()
        {
            result.push('-');
            last_dash = true;
        }
    }

    let result = result.trim_matches('-').to_string();
    if result.is_empty() {
        return fallback.to_string();
    }
    result
}

/// `prefix-identifier`, or just `prefix` when the identifier is missing.
pub(crate) fn stem_with_id(prefix: &str, id: Option<&str>) -> String {
    match id.map(|v| sanitize_filename(v, "")) {
        Some(id) if !id.is_empty() => format!("{prefix}-{id}"),
        _ => prefix.to_string(),
    }
}

/// Accepts a JSON number, a numeric string (`"12.50"`, `"$1,200"`), an empty
/// string, or null.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let value = match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Number(v)) => Some(v),
        Some(Raw::Text(s)) => {
            let cleaned: String = s
                .trim()
                .trim_start_matches('$')
                .chars()
                .filter(|c| *c != ',')
                .collect();
            if cleaned.is_empty() {
                return Ok(None);
            }
            let v = cleaned
                .parse::<f64>()
                .map_err(|_| de::Error::custom(format!("expected a number, got {s:?}")))?;
            Some(v)
        }
    };
    match value {
        Some(v) if !v.is_finite() => Err(de::Error::custom(format!(
            "expected a finite number, got {v}"
        ))),
        other => Ok(other),
    }
}

const SECTION_SIZE: f32 = 12.0;

/// Section heading shared by both templates.
pub(crate) fn section(title: &str, min_space: f32) -> ContentBlock {
    ContentBlock::Heading(Heading::new(title).size(SECTION_SIZE).min_space(min_space))
}

/// Section heading that opens a table. It asks for the table's header room
/// plus its own drop, so the heading never ends a page on its own.
pub(crate) fn table_section(title: &str, config: &LayoutConfig) -> ContentBlock {
    section(
        title,
        config.thresholds.table_header + config.heading_advance(SECTION_SIZE),
    )
}

/// One labelled line per contact field of `party`.
pub(crate) fn party_lines(party: Option<&Party>, value_x: f32) -> Vec<ContentBlock> {
    let empty = Party::default();
    let party = party.unwrap_or(&empty);
    [
        ("Name:", &party.name),
        ("Contact:", &party.contact),
        ("Address:", &party.address),
        ("Phone:", &party.phone),
        ("Email:", &party.email),
    ]
    .into_iter()
    .map(|(label, value)| {
        ContentBlock::KeyValue(KeyValueLine::new(vec![
            KeyValueEntry::new(label, value.clone()).value_at(value_x),
        ]))
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontManager;
    use crate::layout::{LayoutEngine, Paragraph};
    use crate::table::{Column, Table};

    #[derive(Deserialize)]
    struct Amount {
        #[serde(default, deserialize_with = "lenient_number")]
        value: Option<f64>,
    }

    fn parse(json: &str) -> Result<Option<f64>, serde_json::Error> {
        serde_json::from_str::<Amount>(json).map(|a| a.value)
    }

    #[test]
    fn lenient_numbers_accept_strings_and_nulls() {
        assert_eq!(parse(r#"{"value": 12.5}"#).unwrap(), Some(12.5));
        assert_eq!(parse(r#"{"value": "1,200.00"}"#).unwrap(), Some(1200.0));
        assert_eq!(parse(r#"{"value": "$45"}"#).unwrap(), Some(45.0));
        assert_eq!(parse(r#"{"value": ""}"#).unwrap(), None);
        assert_eq!(parse(r#"{"value": null}"#).unwrap(), None);
        assert_eq!(parse(r#"{}"#).unwrap(), None);
    }

    #[test]
    fn non_numeric_strings_are_rejected() {
        assert!(parse(r#"{"value": "twelve"}"#).is_err());
        assert!(parse(r#"{"value": [1]}"#).is_err());
        for raw in ["NaN", "nan", "inf", "-inf", "infinity", "$Infinity"] {
            let json = format!(r#"{{"value": "{raw}"}}"#);
            assert!(parse(&json).is_err(), "{raw} accepted");
        }
        assert!(parse(r#"{"value": 1e999}"#).is_err());
    }

    #[test]
    fn filenames_are_lowercase_ascii_with_dashes() {
        assert_eq!(sanitize_filename("INV 2024/001", "x"), "inv-2024-001");
        assert_eq!(sanitize_filename("  ##  ", "invoice"), "invoice");
        assert_eq!(stem_with_id("invoice", Some("A_77")), "invoice-a-77");
        assert_eq!(stem_with_id("invoice", None), "invoice");
        assert_eq!(stem_with_id("invoice", Some("***")), "invoice");
    }

    #[test]
    fn table_heading_stays_with_its_header_row() {
        let cfg = LayoutConfig::default();
        let fonts = FontManager::default();
        let table = Table::new(vec![Column::new("Item", 50.0)]).row(vec!["Burner".into()]);
        // Leaves the cursor at y=170: room for the header threshold alone,
        // but not once the heading itself has been drawn.
        let blocks = vec![
            ContentBlock::Paragraph(Paragraph::new("intro")),
            ContentBlock::Spacer { height: 557.0 },
            table_section("Equipment", &cfg),
            ContentBlock::Table(table),
        ];
        let doc = LayoutEngine::new(&cfg, &fonts).layout("t", &blocks);
        assert_eq!(doc.page_count(), 2);
        let second: Vec<_> = doc.pages()[1].texts().map(|t| t.text.as_str()).collect();
        assert_eq!(second, vec!["Equipment", "Item", "Burner"]);
    }

    #[test]
    fn missing_party_renders_placeholders() {
        let blocks = party_lines(None, 110.0);
        assert_eq!(blocks.len(), 5);
        for block in blocks {
            match block {
                ContentBlock::KeyValue(line) => assert_eq!(line.entries[0].value, None),
                other => panic!("unexpected block {other:?}"),
            }
        }
    }
}
