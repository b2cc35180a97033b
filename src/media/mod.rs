//! Uploaded map images.

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use thiserror::Error;

use crate::geometry::Size;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("map image is empty")]
    Empty,
    #[error("unrecognized map image format")]
    UnknownFormat,
    #[error("failed to read map image dimensions: {message}")]
    ImageReadFailed { message: String },
    #[error("map image has zero width or height")]
    ZeroSized,
}

pub type MediaResult<T> = std::result::Result<T, MediaError>;

/// Raw map bytes together with the natural size read from their header.
#[derive(Debug, Clone, PartialEq)]
pub struct MapImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    width: u32,
    height: u32,
}

impl MapImage {
    pub fn decode(bytes: Vec<u8>) -> MediaResult<Self> {
        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }

        let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
            .with_guessed_format()
            .map_err(|err| MediaError::ImageReadFailed {
                message: err.to_string(),
            })?;
        let format = reader.format().ok_or(MediaError::UnknownFormat)?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|err| MediaError::ImageReadFailed {
                message: err.to_string(),
            })?;
        if width == 0 || height == 0 {
            return Err(MediaError::ZeroSized);
        }

        tracing::debug!(width, height, ?format, "decoded map image header");
        Ok(Self {
            bytes,
            format,
            width,
            height,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub const fn format(&self) -> ImageFormat {
        self.format
    }

    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn natural_size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }
}

#[cfg(test)]
pub(crate) fn encoded_png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbaImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("in-memory png encodes");
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reads_natural_size_from_png() {
        let image = MapImage::decode(encoded_png(16, 9)).expect("valid png");
        assert_eq!(image.dimensions(), (16, 9));
        assert_eq!(image.natural_size(), Size::new(16.0, 9.0));
        assert_eq!(image.format(), ImageFormat::Png);
    }

    #[test]
    fn decode_rejects_empty_and_unknown_bytes() {
        assert!(matches!(MapImage::decode(Vec::new()), Err(MediaError::Empty)));
        assert!(matches!(
            MapImage::decode(b"definitely not an image".to_vec()),
            Err(MediaError::UnknownFormat)
        ));
    }

    #[test]
    fn decode_rejects_truncated_png() {
        let mut bytes = encoded_png(8, 8);
        bytes.truncate(12);
        assert!(MapImage::decode(bytes).is_err());
    }
}
