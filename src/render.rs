//! PDF renderer – takes a laid-out [`Document`] and produces PDF bytes using
//! `lopdf`.
//!
//! Output is a pure function of the document, the fonts, and the options: no
//! timestamps or random identifiers are written, so identical input gives
//! byte-identical output.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document as LoDocument, Object, ObjectId, Stream, StringFormat};

use crate::document::{Color, Document, DrawOp, FilledRect, LineSegment, Page, TextRun};
use crate::encoding::encode_win_ansi;
use crate::error::{ReportError, Result};
use crate::fonts::{FontFace, FontManager};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Encodes a finished document into an output byte stream.
pub trait Serializer {
    /// MIME type of the produced bytes.
    fn content_type(&self) -> &'static str;

    fn serialize(&self, doc: &Document, fonts: &FontManager) -> Result<Vec<u8>>;
}

/// The PDF writer.
#[derive(Debug, Clone)]
pub struct PdfSerializer {
    /// Flate-compress content streams and embedded font programs.
    pub compress: bool,
}

impl Default for PdfSerializer {
    fn default() -> Self {
        Self { compress: true }
    }
}

impl Serializer for PdfSerializer {
    fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }

    fn serialize(&self, doc: &Document, fonts: &FontManager) -> Result<Vec<u8>> {
        render_pdf(doc, fonts, self.compress)
    }
}

/// Render a Document into PDF bytes.
pub fn render_pdf(doc: &Document, fonts: &FontManager, compress: bool) -> Result<Vec<u8>> {
    let mut pdf = LoDocument::with_version("1.5");
    let pages_id = pdf.new_object_id();

    let regular_id = add_font(&mut pdf, fonts, FontFace::Regular);
    let bold_id = add_font(&mut pdf, fonts, FontFace::Bold);
    let resources_id = pdf.add_object(dictionary! {
        "Font" => dictionary! {
            FontFace::Regular.resource_name() => regular_id,
            FontFace::Bold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(doc.page_count());
    for page in doc.pages() {
        let content = Content {
            operations: page_operations(page),
        };
        let content_id = pdf.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = pdf.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let media_box: Vec<Object> = vec![
        0i64.into(),
        0i64.into(),
        doc.page_width.into(),
        doc.page_height.into(),
    ];
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => doc.page_count() as i64,
        "Resources" => resources_id,
        "MediaBox" => media_box,
    };
    pdf.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = pdf.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = pdf.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(&doc.title)),
        "Producer" => Object::string_literal("report-forge"),
    });
    pdf.trailer.set("Root", catalog_id);
    pdf.trailer.set("Info", info_id);

    if compress {
        pdf.compress();
    }

    let mut bytes = Vec::new();
    pdf.save_to(&mut bytes)
        .map_err(|e| ReportError::Serialize(e.to_string()))?;
    Ok(bytes)
}

/// Register the font dictionary for `face`: a Standard-14 reference, or an
/// embedded TrueType program when one was loaded.
fn add_font(pdf: &mut LoDocument, fonts: &FontManager, face: FontFace) -> ObjectId {
    let base_font = fonts.base_font_name(face).to_string();
    let Some(program) = fonts.program(face) else {
        return pdf.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base_font,
            "Encoding" => "WinAnsiEncoding",
        });
    };

    let file_id = pdf.add_object(Stream::new(
        dictionary! { "Length1" => program.bytes.len() as i64 },
        program.bytes.clone(),
    ));
    let bbox: Vec<Object> = program.bbox.iter().map(|v| Object::Integer(v.round() as i64)).collect();
    let stem_v: i64 = match face {
        FontFace::Regular => 80,
        FontFace::Bold => 120,
    };
    let descriptor_id = pdf.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => base_font.clone(),
        "Flags" => 32i64,
        "FontBBox" => bbox,
        "ItalicAngle" => 0i64,
        "Ascent" => program.ascent.round() as i64,
        "Descent" => program.descent.round() as i64,
        "CapHeight" => program.cap_height.round() as i64,
        "StemV" => stem_v,
        "FontFile2" => file_id,
    });
    let widths: Vec<Object> = fonts.widths(face)[32..=255]
        .iter()
        .map(|w| Object::Integer(w.round() as i64))
        .collect();
    pdf.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "TrueType",
        "BaseFont" => base_font,
        "FirstChar" => 32i64,
        "LastChar" => 255i64,
        "Widths" => widths,
        "Encoding" => "WinAnsiEncoding",
        "FontDescriptor" => descriptor_id,
    })
}

fn page_operations(page: &Page) -> Vec<Operation> {
    let mut ops = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Text(run) => text_ops(&mut ops, run),
            DrawOp::Rect(rect) => rect_ops(&mut ops, rect),
            DrawOp::Line(line) => line_ops(&mut ops, line),
        }
    }
    ops
}

fn color_operands(c: &Color) -> Vec<Object> {
    vec![c.r.into(), c.g.into(), c.b.into()]
}

fn text_ops(ops: &mut Vec<Operation>, run: &TextRun) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![run.font.resource_name().into(), run.size.into()],
    ));
    ops.push(Operation::new("rg", color_operands(&run.color)));
    ops.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(&run.text), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn rect_ops(ops: &mut Vec<Operation>, rect: &FilledRect) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new("rg", color_operands(&rect.color)));
    ops.push(Operation::new(
        "re",
        vec![
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        ],
    ));
    ops.push(Operation::new("f", vec![]));
    ops.push(Operation::new("Q", vec![]));
}

fn line_ops(ops: &mut Vec<Operation>, line: &LineSegment) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new("RG", color_operands(&line.color)));
    ops.push(Operation::new("w", vec![line.thickness.into()]));
    ops.push(Operation::new("m", vec![line.x1.into(), line.y1.into()]));
    ops.push(Operation::new("l", vec![line.x2.into(), line.y2.into()]));
    ops.push(Operation::new("S", vec![]));
    ops.push(Operation::new("Q", vec![]));
}
