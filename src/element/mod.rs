use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id_generator;
use crate::util::time;

mod common;
pub(crate) mod image;
pub(crate) mod stroke;
pub(crate) mod text;

pub use common::{Color, Point, Size};
pub use self::image::Image;
pub use stroke::{MutableStroke, Stroke};
pub use text::Text;

/// Unique identifier of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(id_generator::generate_uuid())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Type tag of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Stroke,
    Image,
    Text,
    Group,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Stroke => "stroke",
            ElementKind::Image => "image",
            ElementKind::Text => "text",
            ElementKind::Group => "group",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of an element
#[derive(Debug, Clone, PartialEq)]
pub enum ElementPayload {
    Stroke(Stroke),
    Image(Image),
    Text(Text),
    Group(Vec<Element>),
}

impl ElementPayload {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementPayload::Stroke(_) => ElementKind::Stroke,
            ElementPayload::Image(_) => ElementKind::Image,
            ElementPayload::Text(_) => ElementKind::Text,
            ElementPayload::Group(_) => ElementKind::Group,
        }
    }
}

/// A single visual unit on the paper.
///
/// Elements never change once they are part of a document. The payload sits
/// behind an [`Arc`], so cloning an element (for history records or
/// snapshots) shares the payload instead of copying strokes or pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    id: ElementId,
    created_at: u64,
    payload: Arc<ElementPayload>,
}

impl Element {
    /// Create an element with a fresh id, stamped with the current time
    pub fn new(payload: ElementPayload) -> Self {
        Self::with_id(ElementId::new(), time::timestamp_millis(), payload)
    }

    /// Rebuild an element with known identity, e.g. when reading an archive
    pub fn with_id(id: ElementId, created_at: u64, payload: ElementPayload) -> Self {
        Self {
            id,
            created_at,
            payload: Arc::new(payload),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.payload.kind()
    }

    /// Creation time in milliseconds since the UNIX epoch
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn payload(&self) -> &ElementPayload {
        &self.payload
    }

    /// Children of a group, empty for every other kind
    pub fn children(&self) -> &[Element] {
        match self.payload.as_ref() {
            ElementPayload::Group(children) => children,
            _ => &[],
        }
    }

    /// True when both elements share the same payload allocation
    pub fn shares_payload(&self, other: &Element) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

/// Factory functions for creating elements
pub mod factory {
    use super::*;

    pub fn create_stroke(points: Vec<Point>, thickness: f32, color: Color) -> Element {
        Element::new(ElementPayload::Stroke(Stroke::new(points, thickness, color)))
    }

    pub fn create_image(origin: Point, pixel_width: u32, pixel_height: u32, rgba: Vec<u8>) -> Element {
        Element::new(ElementPayload::Image(Image::from_rgba(
            origin,
            pixel_width,
            pixel_height,
            rgba,
        )))
    }

    pub fn create_text(content: impl Into<String>, origin: Point, font_size: f32, color: Color) -> Element {
        Element::new(ElementPayload::Text(Text::new(content, origin, font_size, color)))
    }

    pub fn create_group(children: Vec<Element>) -> Element {
        Element::new(ElementPayload::Group(children))
    }
}
