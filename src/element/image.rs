use super::common::{Point, Size};

/// Raster image placed on the paper
///
/// Pixels are kept as raw RGBA8 exactly as they were imported. They are only
/// validated when the image is encoded for export, so a truncated import
/// surfaces as a serialization failure rather than a lost photo.
#[derive(Clone, PartialEq)]
pub struct Image {
    origin: Point,
    size: Size,
    pixel_width: u32,
    pixel_height: u32,
    rgba: Vec<u8>,
}

// Pixel data is too large to print
impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("origin", &self.origin)
            .field("size", &self.size)
            .field("pixel_width", &self.pixel_width)
            .field("pixel_height", &self.pixel_height)
            .field("data_len", &self.rgba.len())
            .finish()
    }
}

impl Image {
    pub fn new(origin: Point, size: Size, pixel_width: u32, pixel_height: u32, rgba: Vec<u8>) -> Self {
        Self {
            origin,
            size,
            pixel_width,
            pixel_height,
            rgba,
        }
    }

    /// Image displayed at its pixel size
    pub fn from_rgba(origin: Point, pixel_width: u32, pixel_height: u32, rgba: Vec<u8>) -> Self {
        let size = Size::new(pixel_width as f32, pixel_height as f32);
        Self::new(origin, size, pixel_width, pixel_height, rgba)
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixel_width
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixel_height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Number of bytes a complete RGBA8 buffer of this size holds, `None`
    /// when the dimensions cannot be addressed
    pub fn expected_len(&self) -> Option<usize> {
        (self.pixel_width as usize)
            .checked_mul(self.pixel_height as usize)?
            .checked_mul(4)
    }

    pub fn has_valid_pixels(&self) -> bool {
        self.pixel_width > 0 && self.pixel_height > 0 && self.expected_len() == Some(self.rgba.len())
    }
}
