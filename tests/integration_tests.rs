//! Integration tests for the report-forge pipeline.
//!
//! These tests validate:
//! - Invoice and inspection reports render to valid PDFs
//! - Pagination never draws below the bottom margin
//! - Long tables flow across pages without losing or duplicating rows
//! - Output is byte-identical across runs
//! - The request boundary maps failures to the right status codes

use report_forge::document::Document;
use report_forge::fonts::{FontFace, FontManager};
use report_forge::layout::ContentBlock;
use report_forge::pipeline::{compute_document, generate_pdf, generate_report};
use report_forge::service::{ReportKind, ReportService};
use report_forge::templates::invoice::LineItem;
use report_forge::templates::{InspectionReport, Invoice, ReportTemplate};
use report_forge::wrap::wrap_text;
use report_forge::{LayoutConfig, ParagraphOverflow, ReportError};
use sha2::{Digest, Sha256};

// =====================================================================
// Helper
// =====================================================================

fn default_config() -> LayoutConfig {
    LayoutConfig::default()
}

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn assert_within_margins(doc: &Document, config: &LayoutConfig) {
    for page in doc.pages() {
        assert!(!page.is_empty(), "page {} is blank", page.page_index);
        for op in &page.ops {
            assert!(
                op.min_y() >= config.bottom_margin,
                "page {} draws at y={} below margin {}",
                page.page_index,
                op.min_y(),
                config.bottom_margin
            );
        }
    }
}

fn invoice_with_items(count: usize) -> Invoice {
    Invoice {
        invoice_number: Some("INV-1001".into()),
        issue_date: Some("2024-03-01".into()),
        line_items: (1..=count)
            .map(|i| LineItem {
                description: Some(format!("Service item {i}")),
                quantity: Some(1.0),
                unit_price: Some(25.0),
                amount: None,
            })
            .collect(),
        tax_rate: Some(13.0),
        ..Invoice::default()
    }
}

fn layout_of(template: &dyn ReportTemplate, config: &LayoutConfig) -> Document {
    let fonts = FontManager::default();
    compute_document(&template.blocks(config), &template.title(), config, &fonts)
}

fn sha256(bytes: &[u8]) -> Vec<u8> {
    Sha256::digest(bytes).to_vec()
}

// =====================================================================
// Scenario tests
// =====================================================================

#[test]
fn short_invoice_fits_one_page_with_exact_total() {
    let invoice = Invoice {
        line_items: vec![LineItem {
            description: Some("Annual boiler service".into()),
            quantity: Some(1.0),
            unit_price: Some(100.0),
            amount: None,
        }],
        tax_rate: Some(13.0),
        ..Invoice::default()
    };
    assert_eq!(invoice.subtotal(), 100.0);
    assert_eq!(invoice.tax_amount(), 13.0);

    let cfg = default_config();
    let doc = layout_of(&invoice, &cfg);
    assert_eq!(doc.page_count(), 1);
    assert_eq!(
        doc.texts().filter(|t| t.text == "Annual boiler service").count(),
        1
    );
    assert_eq!(doc.texts().filter(|t| t.text == "$13.00").count(), 1);
    assert_eq!(doc.texts().filter(|t| t.text == "$113.00").count(), 1);

    let (bytes, _) = generate_report(&invoice, &cfg, &FontManager::default()).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn long_notes_wrap_within_column() {
    let fonts = FontManager::default();
    let notes = "Replaced the worn drive belt and lubricated both bearings. \
                 The condensate line was partially blocked and has been flushed. \
                 Recommend replacing the air filter at the next visit and checking \
                 refrigerant pressure before the summer season begins in earnest.";
    assert!(notes.len() >= 250);

    let lines = wrap_text(notes, FontFace::Regular, 9.0, 500.0, &fonts);
    assert!(lines.len() > 1);
    for line in &lines {
        assert!(fonts.measure_text_width(line, FontFace::Regular, 9.0) <= 500.0);
    }
    let words: Vec<&str> = notes.split_whitespace().collect();
    assert_eq!(lines.join(" ").split_whitespace().collect::<Vec<_>>(), words);
}

#[test]
fn forty_line_items_span_pages_without_loss() {
    let cfg = default_config();
    let invoice = invoice_with_items(40);
    let doc = layout_of(&invoice, &cfg);

    assert!(doc.page_count() >= 2, "got {} page(s)", doc.page_count());
    for i in 1..=40 {
        let label = format!("Service item {i}");
        assert_eq!(
            doc.texts().filter(|t| t.text == label).count(),
            1,
            "{label} must appear exactly once"
        );
    }
    assert_within_margins(&doc, &cfg);
}

#[test]
fn continuation_pages_repeat_table_header() {
    let cfg = default_config();
    let doc = layout_of(&invoice_with_items(40), &cfg);
    let headers = doc.texts().filter(|t| t.text == "Unit Price").count();
    assert!(headers >= 2, "header drawn {headers} time(s)");
}

// =====================================================================
// Pagination invariant
// =====================================================================

#[test]
fn both_templates_respect_the_bottom_margin() {
    for overflow in [ParagraphOverflow::Truncate, ParagraphOverflow::Spill] {
        let cfg = LayoutConfig {
            paragraph_overflow: overflow,
            ..default_config()
        };
        let long_text = "inspection ".repeat(600);
        let report = InspectionReport {
            account_number: Some("ACC-7".into()),
            findings: Some(long_text.clone()),
            notes: Some(long_text),
            ..InspectionReport::default()
        };
        assert_within_margins(&layout_of(&report, &cfg), &cfg);
        assert_within_margins(&layout_of(&invoice_with_items(120), &cfg), &cfg);
    }
}

#[test]
fn tight_margins_still_paginate() {
    let cfg = LayoutConfig::from_json(r#"{"top_margin": 200, "bottom_margin": 200}"#).unwrap();
    let doc = layout_of(&invoice_with_items(25), &cfg);
    assert!(doc.page_count() >= 3);
    assert_within_margins(&doc, &cfg);
}

// =====================================================================
// Determinism tests
// =====================================================================

#[test]
fn pdf_output_is_deterministic() {
    let cfg = default_config();
    let fonts = FontManager::default();
    let invoice = invoice_with_items(40);
    let (bytes1, _) = generate_report(&invoice, &cfg, &fonts).unwrap();
    let (bytes2, _) = generate_report(&invoice, &cfg, &fonts).unwrap();
    assert_eq!(sha256(&bytes1), sha256(&bytes2));
}

#[test]
fn service_output_is_deterministic() {
    let svc = ReportService::new(FontManager::default(), default_config());
    let body = br#"{"account_number": "A-1", "checklist": [{"item": "Burner", "result": "Pass"}]}"#;
    let a = svc.generate(ReportKind::Inspection, body).unwrap();
    let b = svc.generate(ReportKind::Inspection, body).unwrap();
    assert_eq!(sha256(&a.pdf), sha256(&b.pdf));
}

// =====================================================================
// PDF structure tests
// =====================================================================

#[test]
fn rendered_page_count_matches_layout() {
    for compress in [true, false] {
        let cfg = LayoutConfig {
            compress,
            ..default_config()
        };
        let (bytes, doc) =
            generate_report(&invoice_with_items(40), &cfg, &FontManager::default()).unwrap();
        assert_valid_pdf(&bytes);
        let parsed = lopdf::Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), doc.page_count());
    }
}

#[test]
fn uncompressed_output_contains_drawn_text() {
    let cfg = LayoutConfig {
        compress: false,
        ..default_config()
    };
    let (bytes, _) =
        generate_report(&invoice_with_items(1), &cfg, &FontManager::default()).unwrap();
    let needle = b"Service item 1";
    assert!(bytes.windows(needle.len()).any(|w| w == needle));
}

// =====================================================================
// Content block tests
// =====================================================================

#[test]
fn json_blocks_render_end_to_end() {
    let json = r#"[
        {"type": "heading", "text": "Site Survey"},
        {"type": "key_value", "entries": [
            {"label": "Account:", "value": "A-9"},
            {"label": "Date:", "x": 350}
        ]},
        {"type": "paragraph", "text": "All units operational."},
        {"type": "table",
         "columns": [{"header": "Unit", "x": 50}, {"header": "Cost", "x": 400, "kind": "currency"}],
         "rows": [["RTU-1", 1250], ["RTU-2", null]]},
        {"type": "page_break"},
        {"type": "footer", "text": "End of survey"}
    ]"#;
    let blocks: Vec<ContentBlock> = serde_json::from_str(json).unwrap();
    let cfg = default_config();
    let (bytes, doc) = generate_pdf(&blocks, "Site Survey", &cfg, &FontManager::default()).unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(doc.page_count(), 2);
    assert!(doc.texts().any(|t| t.text == "$1250.00"));
    assert!(doc.texts().any(|t| t.text == "N/A"));
    assert_eq!(doc.pages()[1].texts().last().unwrap().text, "End of survey");
}

#[test]
fn document_json_roundtrip() {
    let doc = layout_of(&invoice_with_items(3), &default_config());
    let restored = Document::from_json(&doc.to_json()).unwrap();
    assert_eq!(doc, restored);
}

#[test]
fn layout_config_json_roundtrip() {
    let cfg = LayoutConfig {
        repeat_table_header: false,
        paragraph_overflow: ParagraphOverflow::Spill,
        ..default_config()
    };
    let restored = LayoutConfig::from_json(&cfg.to_json()).unwrap();
    assert_eq!(cfg, restored);
}

#[test]
fn invalid_config_is_rejected() {
    let err = LayoutConfig::from_json(r#"{"top_margin": 500, "bottom_margin": 400}"#).unwrap_err();
    assert!(matches!(err, ReportError::Config(_)));
}

// =====================================================================
// Font tests
// =====================================================================

#[test]
fn garbage_font_bytes_are_a_font_error() {
    let mut fonts = FontManager::new();
    let err = fonts.load_font(FontFace::Bold, b"not a font".to_vec()).unwrap_err();
    assert!(matches!(err, ReportError::Font(_)));
    assert!(!fonts.has_embedded_fonts());
}

// =====================================================================
// Service tests
// =====================================================================

#[test]
fn service_handles_both_report_kinds() {
    let svc = ReportService::new(FontManager::default(), default_config());
    for (kind, filename) in [
        (ReportKind::Invoice, "invoice-q-17.pdf"),
        (ReportKind::Inspection, "inspection-q-17.pdf"),
    ] {
        let body = br#"{"invoice_number": "Q-17", "account_number": "Q-17"}"#;
        let response = svc.handle(kind, body);
        assert_eq!(response.status, 200);
        assert_valid_pdf(&response.body);
        assert_eq!(
            response.content_disposition,
            Some(format!("attachment; filename=\"{filename}\""))
        );
    }
}

#[test]
fn wrong_shape_is_a_bad_request() {
    let svc = ReportService::new(FontManager::default(), default_config());
    let response = svc.handle(ReportKind::Invoice, br#"{"line_items": "lots"}"#);
    assert_eq!(response.status, 400);
    assert_eq!(response.content_type, "application/json");
}

#[test]
fn non_finite_amounts_are_a_bad_request() {
    let svc = ReportService::new(FontManager::default(), default_config());
    for body in [
        &br#"{"line_items": [{"description": "Pump", "unit_price": "NaN"}]}"#[..],
        &br#"{"tax_rate": "inf"}"#[..],
    ] {
        let response = svc.handle(ReportKind::Invoice, body);
        assert_eq!(response.status, 400);
    }
}
