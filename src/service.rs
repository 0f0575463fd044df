//! Request boundary – turns a raw JSON body into a PDF response.
//!
//! The service holds only read-only state (fonts, layout config, serializer),
//! so one instance can be shared across threads; every call builds its own
//! document. Framework glue (routing, HTTP types) is left to the caller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::error::{ReportError, Result};
use crate::fonts::FontManager;
use crate::pipeline::generate_with;
use crate::render::{PdfSerializer, Serializer};
use crate::templates::{InspectionReport, Invoice, ReportTemplate};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Message returned for failures that are not the caller's fault.
const GENERIC_FAILURE: &str = "Failed to generate report";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Invoice,
    Inspection,
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "invoice" => Ok(ReportKind::Invoice),
            "inspection" | "inspection_report" => Ok(ReportKind::Inspection),
            other => Err(ReportError::UnknownReportKind(other.to_string())),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Invoice => write!(f, "invoice"),
            ReportKind::Inspection => write!(f, "inspection"),
        }
    }
}

/// A finished report ready to hand back to the caller.
#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub filename: String,
    pub pdf: Vec<u8>,
    pub page_count: usize,
}

/// JSON body sent with every non-200 response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }
}

/// Framework-agnostic response: status code, headers, and body bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl ReportResponse {
    fn error(status: u16, payload: &ErrorPayload) -> Self {
        let body = serde_json::to_vec(payload).unwrap_or_else(|_| payload.message.clone().into_bytes());
        Self {
            status,
            content_type: JSON_CONTENT_TYPE,
            content_disposition: None,
            body,
        }
    }
}

pub struct ReportService {
    fonts: FontManager,
    config: LayoutConfig,
    serializer: Box<dyn Serializer + Send + Sync>,
}

impl ReportService {
    pub fn new(fonts: FontManager, config: LayoutConfig) -> Self {
        let serializer = PdfSerializer {
            compress: config.compress,
        };
        Self {
            fonts,
            config,
            serializer: Box::new(serializer),
        }
    }

    /// Swap the output encoder.
    pub fn with_serializer(mut self, serializer: Box<dyn Serializer + Send + Sync>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Parse `body` as a `kind` record and render it.
    pub fn generate(&self, kind: ReportKind, body: &[u8]) -> Result<GeneratedReport> {
        let template = parse_template(kind, body)?;
        self.render(template.as_ref())
    }

    /// [`Self::generate`] mapped onto a response. Never panics and never
    /// returns partial output.
    pub fn handle(&self, kind: ReportKind, body: &[u8]) -> ReportResponse {
        match self.generate(kind, body) {
            Ok(report) => ReportResponse {
                status: 200,
                content_type: self.serializer.content_type(),
                content_disposition: Some(format!("attachment; filename=\"{}\"", report.filename)),
                body: report.pdf,
            },
            Err(err) => error_response(kind, &err),
        }
    }

    /// Like [`Self::handle`], with the kind given as a path segment.
    pub fn handle_named(&self, kind: &str, body: &[u8]) -> ReportResponse {
        match kind.parse::<ReportKind>() {
            Ok(kind) => self.handle(kind, body),
            Err(err) => {
                log::warn!("rejected request: {err}");
                ReportResponse::error(404, &ErrorPayload::new("NotFound", &err.to_string()))
            }
        }
    }

    fn render(&self, template: &dyn ReportTemplate) -> Result<GeneratedReport> {
        let blocks = template.blocks(&self.config);
        let (pdf, doc) = generate_with(
            self.serializer.as_ref(),
            &blocks,
            &template.title(),
            &self.config,
            &self.fonts,
        )?;
        Ok(GeneratedReport {
            filename: template.filename(),
            pdf,
            page_count: doc.page_count(),
        })
    }
}

/// Deserialize `body` into the record type for `kind`.
pub fn parse_template(kind: ReportKind, body: &[u8]) -> Result<Box<dyn ReportTemplate>> {
    Ok(match kind {
        ReportKind::Invoice => Box::new(parse::<Invoice>(body)?),
        ReportKind::Inspection => Box::new(parse::<InspectionReport>(body)?),
    })
}

fn parse<T: for<'de> Deserialize<'de>>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| ReportError::MalformedInput(e.to_string()))
}

fn error_response(kind: ReportKind, err: &ReportError) -> ReportResponse {
    if err.is_client_error() {
        log::warn!("rejected {kind} request: {err}");
        ReportResponse::error(400, &ErrorPayload::bad_request(&err.to_string()))
    } else {
        log::error!("{kind} generation failed: {err}");
        ReportResponse::error(500, &ErrorPayload::internal_error(GENERIC_FAILURE))
    }
}
