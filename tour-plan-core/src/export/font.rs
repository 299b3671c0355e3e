//! Fonts for PDF text.
//!
//! Two options: the built-in Helvetica with WinAnsi encoding, which needs no
//! font file but only covers Western European text, or an embedded
//! TrueType font written as a Type0 font with Identity-H encoding. The
//! embedded font addresses glyphs directly, so any script the font covers
//! prints correctly.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use lopdf::{dictionary, Object, ObjectId, Stream, StringFormat};
use ttf_parser::{name_id, Face, GlyphId};

use super::error::ExportError;
use super::layout::Measure;

/// Resource name the page content uses for the single font.
pub const FONT_RESOURCE: &str = "F1";

const HELVETICA_DEFAULT_WIDTH: u16 = 556;
const PDF_GLYPH_UNITS: f32 = 1000.0;
const TO_UNICODE_CHUNK: usize = 100;

/// Helvetica advance widths for U+0020 through U+007E, in 1/1000 em.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Font selected for an export.
#[derive(Debug, Clone, Default)]
pub enum FontSource {
    #[default]
    Helvetica,
    TrueType(Arc<Vec<u8>>),
}

impl FontSource {
    pub fn from_file(path: &Path) -> Result<Self, ExportError> {
        let data = std::fs::read(path).map_err(|source| ExportError::FontUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Face::parse(&data, 0).map_err(|e| ExportError::FontParse(e.to_string()))?;
        Ok(FontSource::TrueType(Arc::new(data)))
    }
}

/// Maps text to font codes while recording which glyphs are used.
pub enum TextEncoder<'a> {
    WinAnsi,
    Embedded(EmbeddedFont<'a>),
}

pub struct EmbeddedFont<'a> {
    data: &'a [u8],
    face: Face<'a>,
    scale: f32,
    /// Glyph id to (character, width in 1/1000 em) for every glyph drawn.
    used: BTreeMap<u16, (char, u16)>,
}

impl<'a> TextEncoder<'a> {
    pub fn new(source: &'a FontSource) -> Result<Self, ExportError> {
        match source {
            FontSource::Helvetica => Ok(TextEncoder::WinAnsi),
            FontSource::TrueType(data) => {
                let face =
                    Face::parse(data, 0).map_err(|e| ExportError::FontParse(e.to_string()))?;
                let scale = PDF_GLYPH_UNITS / f32::from(face.units_per_em().max(1));
                Ok(TextEncoder::Embedded(EmbeddedFont {
                    data: data.as_slice(),
                    face,
                    scale,
                    used: BTreeMap::new(),
                }))
            }
        }
    }

    /// Encodes `text` as a PDF string operand for `Tj`.
    pub fn encode(&mut self, text: &str) -> Object {
        match self {
            TextEncoder::WinAnsi => Object::String(win_ansi_bytes(text), StringFormat::Literal),
            TextEncoder::Embedded(font) => {
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for c in text.chars() {
                    let gid = font.glyph(c);
                    let width = font.advance(gid);
                    font.used.entry(gid).or_insert((c, width));
                    bytes.extend_from_slice(&gid.to_be_bytes());
                }
                Object::String(bytes, StringFormat::Hexadecimal)
            }
        }
    }

    /// Adds the font objects to `doc` and returns the font dictionary id.
    ///
    /// Call after all text has been encoded so the width table covers every
    /// glyph drawn.
    pub fn write_font(&self, doc: &mut lopdf::Document) -> ObjectId {
        match self {
            TextEncoder::WinAnsi => doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
                "Encoding" => "WinAnsiEncoding",
            }),
            TextEncoder::Embedded(font) => font.write(doc),
        }
    }
}

impl Measure for TextEncoder<'_> {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = match self {
            TextEncoder::WinAnsi => win_ansi_bytes(text)
                .into_iter()
                .map(|b| u32::from(helvetica_width(b)))
                .sum(),
            TextEncoder::Embedded(font) => text
                .chars()
                .map(|c| u32::from(font.advance(font.glyph(c))))
                .sum(),
        };
        units as f32 * size / PDF_GLYPH_UNITS
    }
}

impl EmbeddedFont<'_> {
    fn glyph(&self, c: char) -> u16 {
        self.face.glyph_index(c).map(|g| g.0).unwrap_or(0)
    }

    fn advance(&self, gid: u16) -> u16 {
        let raw = self.face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0);
        (f32::from(raw) * self.scale).round() as u16
    }

    fn scaled(&self, value: i16) -> i64 {
        (f32::from(value) * self.scale).round() as i64
    }

    fn postscript_name(&self) -> String {
        self.face
            .names()
            .into_iter()
            .filter(|n| n.name_id == name_id::POST_SCRIPT_NAME)
            .find_map(|n| n.to_string())
            .map(|name| name.replace(' ', ""))
            .unwrap_or_else(|| "EmbeddedFont".to_string())
    }

    fn write(&self, doc: &mut lopdf::Document) -> ObjectId {
        let name = self.postscript_name();
        let bbox = self.face.global_bounding_box();

        let font_file = doc.add_object(Stream::new(
            dictionary! { "Length1" => self.data.len() as i64 },
            self.data.to_vec(),
        ));

        let descriptor = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => Object::Name(name.clone().into_bytes()),
            "Flags" => 4,
            "FontBBox" => vec![
                Object::Integer(self.scaled(bbox.x_min)),
                Object::Integer(self.scaled(bbox.y_min)),
                Object::Integer(self.scaled(bbox.x_max)),
                Object::Integer(self.scaled(bbox.y_max)),
            ],
            "ItalicAngle" => 0,
            "Ascent" => self.scaled(self.face.ascender()),
            "Descent" => self.scaled(self.face.descender()),
            "CapHeight" => self.scaled(self.face.capital_height().unwrap_or(self.face.ascender())),
            "StemV" => 80,
            "FontFile2" => font_file,
        });

        let mut widths = Vec::with_capacity(self.used.len() * 2);
        for (gid, (_, width)) in &self.used {
            widths.push(Object::Integer(i64::from(*gid)));
            widths.push(Object::Array(vec![Object::Integer(i64::from(*width))]));
        }

        let cid_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => Object::Name(name.clone().into_bytes()),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor,
            "DW" => 1000,
            "W" => widths,
            "CIDToGIDMap" => "Identity",
        });

        let to_unicode = doc.add_object(Stream::new(
            dictionary! {},
            to_unicode_cmap(&self.used).into_bytes(),
        ));

        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => Object::Name(name.into_bytes()),
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font)],
            "ToUnicode" => to_unicode,
        })
    }
}

fn to_unicode_cmap(used: &BTreeMap<u16, (char, u16)>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );
    let entries: Vec<(u16, char)> = used.iter().map(|(gid, (c, _))| (*gid, *c)).collect();
    for chunk in entries.chunks(TO_UNICODE_CHUNK) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, c) in chunk {
            let mut units = [0u16; 2];
            let utf16: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", gid, utf16));
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap
}

/// Encodes `text` in WinAnsi. Arrows become `->`, anything else outside the
/// encoding becomes `?`.
pub fn win_ansi_bytes(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{20}'..='\u{7E}' => out.push(c as u8),
            '\u{A0}'..='\u{FF}' => out.push(c as u32 as u8),
            '→' => out.extend_from_slice(b"->"),
            '←' => out.extend_from_slice(b"<-"),
            _ => out.push(win_ansi_special(c).unwrap_or(b'?')),
        }
    }
    out
}

fn win_ansi_special(c: char) -> Option<u8> {
    let byte = match c {
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '•' => 0x95,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        _ => return None,
    };
    Some(byte)
}

fn helvetica_width(byte: u8) -> u16 {
    match byte {
        0x20..=0x7E => HELVETICA_ASCII[usize::from(byte - 0x20)],
        0x85 => 1000,
        0x91 | 0x92 => 222,
        0x93 | 0x94 => 333,
        0x95 => 350,
        0x97 => 1000,
        _ => HELVETICA_DEFAULT_WIDTH,
    }
}
