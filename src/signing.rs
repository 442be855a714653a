//! PDF signature stamping.
//!
//! `stamp_pdf` is a pure function: (PDF bytes, PNG signature bytes,
//! timestamp) → new PDF bytes. The signature image is drawn in the
//! bottom-right margin of the first page with a two-line verification
//! caption underneath. Callers inject the timestamp so repeated calls
//! with identical inputs produce identical output.

use std::io::Write as _;

use chrono::{DateTime, Utc};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Dictionary, Document as PdfDocument, Object, ObjectId, Stream};

use crate::config;
use crate::datauri::DataUri;

/// Rendered width of the signature image in PDF points.
const STAMP_WIDTH: f32 = 100.0;
/// Distance from the page edges.
const MARGIN: f32 = 50.0;
/// Caption font size and line spacing.
const CAPTION_SIZE: f32 = 8.0;
const CAPTION_LEADING: f32 = 12.0;

/// Resource names registered on the stamped page.
const IMAGE_RESOURCE: &str = "PphSig";
const FONT_RESOURCE: &str = "PphSigFont";

/// Errors from the signing operation.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Invalid signing input: {0}")]
    InvalidInput(String),
    #[error("Document is not a PDF")]
    NotPdf,
    #[error("Signature image is not a PNG")]
    NotPng,
    #[error("Failed to parse PDF: {0}")]
    PdfParse(String),
    #[error("PDF has no pages")]
    NoPages,
    #[error("Failed to decode signature image: {0}")]
    ImageDecode(String),
    #[error("Failed to edit PDF: {0}")]
    PdfEdit(String),
}

impl From<lopdf::Error> for SigningError {
    fn from(err: lopdf::Error) -> Self {
        SigningError::PdfEdit(err.to_string())
    }
}

/// Sign a document held as data URIs. Decodes both payloads, verifies
/// the magic bytes, stamps, and re-encodes the result as a PDF data URI.
pub fn sign_document_uri(
    document_data_uri: &str,
    signature_data_uri: &str,
    timestamp: DateTime<Utc>,
) -> Result<String, SigningError> {
    let pdf = DataUri::parse(document_data_uri)
        .map_err(|e| SigningError::InvalidInput(format!("document: {e}")))?;
    let signature = DataUri::parse(signature_data_uri)
        .map_err(|e| SigningError::InvalidInput(format!("signature: {e}")))?;

    if !pdf.is_pdf() {
        return Err(SigningError::NotPdf);
    }
    if !signature.is_png() {
        return Err(SigningError::NotPng);
    }

    let stamped = stamp_pdf(pdf.bytes(), signature.bytes(), timestamp)?;
    Ok(DataUri::encode("application/pdf", &stamped))
}

/// Stamp the first page of a PDF with the signature image and caption.
pub fn stamp_pdf(
    pdf_bytes: &[u8],
    signature_png: &[u8],
    timestamp: DateTime<Utc>,
) -> Result<Vec<u8>, SigningError> {
    let mut doc =
        PdfDocument::load_mem(pdf_bytes).map_err(|e| SigningError::PdfParse(e.to_string()))?;

    let first_page_id = *doc
        .get_pages()
        .get(&1)
        .ok_or(SigningError::NoPages)?;
    let (page_width, _page_height) = page_size(&doc, first_page_id);

    // Decode the PNG and flatten any transparency onto white; PDF image
    // XObjects carry no alpha channel in this encoding.
    let image = image::load_from_memory_with_format(signature_png, image::ImageFormat::Png)
        .map_err(|e| SigningError::ImageDecode(e.to_string()))?
        .to_rgba8();
    let (img_w, img_h) = image.dimensions();
    if img_w == 0 || img_h == 0 {
        return Err(SigningError::ImageDecode("zero-sized image".into()));
    }

    let mut rgb = Vec::with_capacity((img_w * img_h * 3) as usize);
    for px in image.pixels() {
        let [r, g, b, a] = px.0;
        let a = a as u16;
        rgb.push(((r as u16 * a + 255 * (255 - a)) / 255) as u8);
        rgb.push(((g as u16 * a + 255 * (255 - a)) / 255) as u8);
        rgb.push(((b as u16 * a + 255 * (255 - a)) / 255) as u8);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&rgb)
        .and_then(|_| encoder.finish())
        .map(|compressed| {
            let xobject = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => img_w as i64,
                    "Height" => img_h as i64,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                compressed,
            );
            doc.add_object(xobject)
        })
        .map_err(|e| SigningError::PdfEdit(format!("compress image stream: {e}")))
        .and_then(|image_id| {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            });
            add_page_resource(&mut doc, first_page_id, "XObject", IMAGE_RESOURCE, image_id)?;
            add_page_resource(&mut doc, first_page_id, "Font", FONT_RESOURCE, font_id)?;
            Ok(())
        })?;

    let stamp_height = STAMP_WIDTH * img_h as f32 / img_w as f32;
    let x = page_width - STAMP_WIDTH - MARGIN;
    let image_y = MARGIN + 20.0;
    let caption = format!(
        "Verified by {}\n{}",
        config::APP_NAME,
        timestamp.format("%a, %d %b %Y %H:%M:%S GMT")
    );
    let ops = stamp_operations(x, image_y, stamp_height, &caption);

    let mut content = doc
        .get_page_content(first_page_id)
        .map_err(|e| SigningError::PdfEdit(e.to_string()))?;
    content.extend_from_slice(ops.as_bytes());
    doc.change_page_content(first_page_id, content)
        .map_err(|e| SigningError::PdfEdit(e.to_string()))?;

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| SigningError::PdfEdit(e.to_string()))?;
    Ok(out)
}

/// Content-stream operations drawing the image and its caption.
fn stamp_operations(x: f32, image_y: f32, stamp_height: f32, caption: &str) -> String {
    let mut ops = format!(
        "\nq\n{STAMP_WIDTH:.2} 0 0 {stamp_height:.2} {x:.2} {image_y:.2} cm\n/{IMAGE_RESOURCE} Do\nQ\n"
    );
    ops.push_str(&format!(
        "q\nBT\n/{FONT_RESOURCE} {CAPTION_SIZE:.0} Tf\n{CAPTION_LEADING:.0} TL\n0.2 0.2 0.2 rg\n{:.2} {:.2} Td\n",
        x - 2.0,
        MARGIN,
    ));
    for (i, line) in caption.lines().enumerate() {
        if i > 0 {
            ops.push_str("T*\n");
        }
        ops.push_str(&format!("({}) Tj\n", escape_pdf_string(line)));
    }
    ops.push_str("ET\nQ\n");
    ops
}

/// Escape characters with meaning inside PDF literal strings.
fn escape_pdf_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// MediaBox width/height of a page, walking up the page tree for
/// inherited values. Falls back to US Letter.
fn page_size(doc: &PdfDocument, page_id: ObjectId) -> (f32, f32) {
    let mut current = Some(page_id);
    // Bounded walk; malformed files can contain parent cycles.
    for _ in 0..32 {
        let Some(id) = current else { break };
        let Ok(dict) = doc.get_dictionary(id) else { break };
        if let Ok(media_box) = dict.get(b"MediaBox") {
            let resolved = resolve_object(doc, media_box);
            if let Ok(arr) = resolved.as_array() {
                if arr.len() == 4 {
                    let nums: Vec<f32> = arr.iter().filter_map(as_number).collect();
                    if nums.len() == 4 {
                        return (nums[2] - nums[0], nums[3] - nums[1]);
                    }
                }
            }
        }
        current = dict
            .get(b"Parent")
            .ok()
            .and_then(|p| p.as_reference().ok());
    }
    (612.0, 792.0)
}

fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn resolve_object<'a>(doc: &'a PdfDocument, obj: &'a Object) -> &'a Object {
    match obj.as_reference() {
        Ok(id) => doc.get_object(id).unwrap_or(obj),
        Err(_) => obj,
    }
}

/// Register `name → value` under a resource category (`Font`,
/// `XObject`) on a page, creating dictionaries as needed and following
/// one level of indirection for shared resource dictionaries.
fn add_page_resource(
    doc: &mut PdfDocument,
    page_id: ObjectId,
    category: &str,
    name: &str,
    value: ObjectId,
) -> Result<(), SigningError> {
    // Resolve where the Resources dictionary actually lives.
    let resources_ref = {
        let page = doc.get_dictionary(page_id)?;
        match page.get(b"Resources") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(_) => None,
            Err(_) => None,
        }
    };

    // Inherited or absent Resources get an inline dictionary on the page.
    if resources_ref.is_none() {
        let page = doc.get_dictionary_mut(page_id)?;
        if page.get(b"Resources").is_err() {
            page.set("Resources", dictionary! {});
        }
    }

    // Classify the category slot first so no borrow spans the mutation.
    let category_ref = {
        let resources: &Dictionary = match resources_ref {
            Some(id) => doc.get_dictionary(id)?,
            None => doc.get_dictionary(page_id)?.get(b"Resources")?.as_dict()?,
        };
        match resources.get(category.as_bytes()) {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        }
    };

    if let Some(id) = category_ref {
        doc.get_dictionary_mut(id)?.set(name, value);
        return Ok(());
    }

    let resources: &mut Dictionary = match resources_ref {
        Some(id) => doc.get_dictionary_mut(id)?,
        None => doc
            .get_dictionary_mut(page_id)?
            .get_mut(b"Resources")?
            .as_dict_mut()?,
    };
    if let Ok(Object::Dictionary(dict)) = resources.get_mut(category.as_bytes()) {
        dict.set(name, value);
    } else {
        resources.set(category, dictionary! { name => value });
    }
    Ok(())
}
