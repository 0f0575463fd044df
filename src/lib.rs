//! # report-forge – Paginated business report generation
//!
//! This crate turns structured records (invoices, inspection reports) into
//! multi-page PDF documents. The pipeline stages are:
//!
//! 1. **Template** – record → ordered content blocks ([`templates`])
//! 2. **Layout** – place blocks, wrap text, draw tables ([`layout`], [`wrap`], [`table`])
//! 3. **Paginate** – track the cursor and break pages ([`pagination`])
//! 4. **Render** – emit deterministic PDF bytes via lopdf ([`render`])
//!
//! A framework-agnostic request boundary lives in [`service`].

pub mod config;
pub mod document;
pub mod encoding;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod pagination;
pub mod pipeline;
pub mod render;
pub mod service;
pub mod table;
pub mod templates;
pub mod wrap;

// Re-exports for convenience
pub use config::{LayoutConfig, ParagraphOverflow};
pub use document::Document;
pub use error::{ReportError, Result};
pub use fonts::{FontFace, FontManager};
pub use layout::ContentBlock;
pub use pipeline::{compute_document, generate_pdf, generate_report};
pub use service::{ReportKind, ReportService};
pub use templates::{InspectionReport, Invoice, ReportTemplate};
