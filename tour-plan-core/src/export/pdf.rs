use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream, StringFormat};

use super::error::ExportError;
use super::font::{FontSource, TextEncoder, FONT_RESOURCE};
use super::layout::{self, PageLayout, Rgb, PAGE_HEIGHT, PAGE_WIDTH};
use crate::document::Document;

const PDF_VERSION: &str = "1.5";
const PRODUCER: &str = concat!("tour-plan ", env!("CARGO_PKG_VERSION"));

/// Lays out `document` and encodes it as PDF bytes.
pub fn render(document: &Document, font: &FontSource) -> Result<Vec<u8>, ExportError> {
    let mut encoder = TextEncoder::new(font)?;
    let pages = layout::layout(document, &encoder);

    let mut doc = lopdf::Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let mut contents = Vec::with_capacity(pages.len());
    for page in &pages {
        contents.push(page_content(page, &mut encoder).encode()?);
    }

    let font_id = encoder.write_font(&mut doc);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { FONT_RESOURCE => font_id },
    });

    let mut kids = Vec::with_capacity(contents.len());
    for content in contents {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH),
                Object::Real(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => text_string(&document.summary.heading.text),
        "Producer" => Object::string_literal(PRODUCER),
    });
    doc.trailer.set("Info", info_id);

    doc.compress();
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(bytes)
}

fn page_content(page: &PageLayout, encoder: &mut TextEncoder<'_>) -> Content {
    let mut ops = Vec::new();

    for rule in &page.rules {
        ops.push(color_op("RG", rule.color));
        ops.push(Operation::new("w", vec![Object::Real(rule.width)]));
        ops.push(Operation::new(
            "m",
            vec![Object::Real(rule.x1), Object::Real(rule.y)],
        ));
        ops.push(Operation::new(
            "l",
            vec![Object::Real(rule.x2), Object::Real(rule.y)],
        ));
        ops.push(Operation::new("S", vec![]));
    }

    for text in &page.texts {
        ops.push(Operation::new("BT", vec![]));
        ops.push(color_op("rg", text.color));
        ops.push(Operation::new(
            "Tf",
            vec![
                Object::Name(FONT_RESOURCE.as_bytes().to_vec()),
                Object::Real(text.size),
            ],
        ));
        ops.push(Operation::new(
            "Td",
            vec![Object::Real(text.x), Object::Real(text.y)],
        ));
        ops.push(Operation::new("Tj", vec![encoder.encode(&text.text)]));
        ops.push(Operation::new("ET", vec![]));
    }

    Content { operations: ops }
}

fn color_op(operator: &str, color: Rgb) -> Operation {
    Operation::new(
        operator,
        vec![
            Object::Real(color.0),
            Object::Real(color.1),
            Object::Real(color.2),
        ],
    )
}

/// A PDF text string: literal for ASCII, UTF-16BE with BOM otherwise.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
