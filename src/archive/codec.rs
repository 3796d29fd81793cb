//! Canonical JSON encoding of elements.
//!
//! Every element becomes one self-describing record. Image pixels are
//! PNG-compressed and embedded as base64 so that groups containing images
//! stay a single record.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::element::{Element, ElementId, ElementKind, ElementPayload, Image, Point, Size, Stroke, Text};
use crate::error::{ArchiveError, EncodeError};

#[derive(Debug, Serialize, Deserialize)]
struct ElementRecord {
    id: ElementId,
    kind: ElementKind,
    z_index: usize,
    created_at: u64,
    payload: PayloadRecord,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PayloadRecord {
    Stroke(Stroke),
    Text(Text),
    Image(ImageRecord),
    Group { children: Vec<ElementRecord> },
}

#[derive(Debug, Serialize, Deserialize)]
struct ImageRecord {
    origin: Point,
    size: Size,
    pixel_width: u32,
    pixel_height: u32,
    /// Base64 PNG data
    png: String,
}

/// Encode one element, positioned at `z_index`, to its archive entry bytes
pub fn encode_element(element: &Element, z_index: usize) -> Result<Vec<u8>, EncodeError> {
    let record = to_record(element, z_index)?;
    Ok(serde_json::to_vec_pretty(&record)?)
}

/// Decode an element from its archive entry bytes
pub fn decode_element(bytes: &[u8]) -> Result<Element, ArchiveError> {
    let record: ElementRecord = serde_json::from_slice(bytes)?;
    from_record(record)
}

fn to_record(element: &Element, z_index: usize) -> Result<ElementRecord, EncodeError> {
    let payload = match element.payload() {
        ElementPayload::Stroke(stroke) => {
            ensure_finite("stroke points", stroke.points().iter().all(Point::is_finite))?;
            ensure_finite("stroke thickness", stroke.thickness().is_finite())?;
            PayloadRecord::Stroke(stroke.clone())
        }
        ElementPayload::Text(text) => {
            ensure_finite("text origin", text.origin().is_finite())?;
            ensure_finite("font size", text.font_size().is_finite())?;
            PayloadRecord::Text(text.clone())
        }
        ElementPayload::Image(image) => {
            ensure_finite("image origin", image.origin().is_finite())?;
            ensure_finite("image size", image.size().is_finite())?;
            PayloadRecord::Image(ImageRecord {
                origin: image.origin(),
                size: image.size(),
                pixel_width: image.pixel_width(),
                pixel_height: image.pixel_height(),
                png: STANDARD.encode(encode_png(image)?),
            })
        }
        ElementPayload::Group(children) => PayloadRecord::Group {
            children: children
                .iter()
                .enumerate()
                .map(|(i, child)| to_record(child, i))
                .collect::<Result<_, _>>()?,
        },
    };

    Ok(ElementRecord {
        id: element.id(),
        kind: element.kind(),
        z_index,
        created_at: element.created_at(),
        payload,
    })
}

fn from_record(record: ElementRecord) -> Result<Element, ArchiveError> {
    let payload = match record.payload {
        PayloadRecord::Stroke(stroke) => ElementPayload::Stroke(stroke),
        PayloadRecord::Text(text) => ElementPayload::Text(text),
        PayloadRecord::Image(img) => {
            let png = STANDARD.decode(img.png.as_bytes())?;
            let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)?.to_rgba8();
            if decoded.width() != img.pixel_width || decoded.height() != img.pixel_height {
                return Err(ArchiveError::Corrupt(format!(
                    "image {} is {}x{} but record says {}x{}",
                    record.id,
                    decoded.width(),
                    decoded.height(),
                    img.pixel_width,
                    img.pixel_height
                )));
            }
            ElementPayload::Image(Image::new(
                img.origin,
                img.size,
                img.pixel_width,
                img.pixel_height,
                decoded.into_raw(),
            ))
        }
        PayloadRecord::Group { mut children } => {
            children.sort_by_key(|child| child.z_index);
            ElementPayload::Group(
                children
                    .into_iter()
                    .map(from_record)
                    .collect::<Result<_, _>>()?,
            )
        }
    };

    if payload.kind() != record.kind {
        return Err(ArchiveError::Corrupt(format!(
            "element {} is tagged {} but holds {}",
            record.id,
            record.kind,
            payload.kind()
        )));
    }

    Ok(Element::with_id(record.id, record.created_at, payload))
}

// JSON has no representation for NaN or infinity
fn ensure_finite(field: &'static str, finite: bool) -> Result<(), EncodeError> {
    if finite {
        Ok(())
    } else {
        Err(EncodeError::NonFinite { field })
    }
}

fn encode_png(image: &Image) -> Result<Vec<u8>, EncodeError> {
    let expected = image.expected_len().ok_or(EncodeError::ImageTooLarge {
        width: image.pixel_width(),
        height: image.pixel_height(),
    })?;
    let invalid = || EncodeError::InvalidPixelBuffer {
        width: image.pixel_width(),
        height: image.pixel_height(),
        expected,
        actual: image.rgba().len(),
    };
    if !image.has_valid_pixels() {
        return Err(invalid());
    }

    let buffer = RgbaImage::from_raw(image.pixel_width(), image.pixel_height(), image.rgba().to_vec())
        .ok_or_else(invalid)?;
    let mut png = Cursor::new(Vec::new());
    buffer.write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}
