//! Pipeline – ties together layout, pagination, and rendering into a single
//! function call.

use crate::config::LayoutConfig;
use crate::document::Document;
use crate::error::Result;
use crate::fonts::FontManager;
use crate::layout::{ContentBlock, LayoutEngine};
use crate::render::{PdfSerializer, Serializer};
use crate::templates::ReportTemplate;

/// Layout only: content blocks → paginated [`Document`].
pub fn compute_document(
    blocks: &[ContentBlock],
    title: &str,
    config: &LayoutConfig,
    fonts: &FontManager,
) -> Document {
    LayoutEngine::new(config, fonts).layout(title, blocks)
}

/// Full pipeline: content blocks → PDF bytes.
///
/// Returns `(pdf_bytes, document)`.
pub fn generate_pdf(
    blocks: &[ContentBlock],
    title: &str,
    config: &LayoutConfig,
    fonts: &FontManager,
) -> Result<(Vec<u8>, Document)> {
    let serializer = PdfSerializer {
        compress: config.compress,
    };
    generate_with(&serializer, blocks, title, config, fonts)
}

/// Same as [`generate_pdf`] with a caller-supplied serializer.
pub fn generate_with(
    serializer: &dyn Serializer,
    blocks: &[ContentBlock],
    title: &str,
    config: &LayoutConfig,
    fonts: &FontManager,
) -> Result<(Vec<u8>, Document)> {
    let doc = compute_document(blocks, title, config, fonts);
    let bytes = serializer.serialize(&doc, fonts)?;
    log::info!(
        "rendered '{}': {} page(s), {} bytes",
        doc.title,
        doc.page_count(),
        bytes.len()
    );
    Ok((bytes, doc))
}

/// Convenience: build the blocks of `template` and run the full pipeline.
pub fn generate_report<T: ReportTemplate + ?Sized>(
    template: &T,
    config: &LayoutConfig,
    fonts: &FontManager,
) -> Result<(Vec<u8>, Document)> {
    let blocks = template.blocks(config);
    generate_pdf(&blocks, &template.title(), config, fonts)
}
