//! Image decoding for texture upload
//!
//! Decoding keeps the source channel count where the upload path understands
//! it: grayscale stays one channel, RGB stays three, RGBA stays four and
//! grayscale-alpha stays two. Every other layout (16-bit, float, BGR) is
//! converted to 8-bit RGBA.

use std::path::Path;

use image::DynamicImage;

use crate::assets::AssetError;

/// Decoded 8-bit pixel data, rows bottom-up when flipped on load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Tightly packed pixel bytes
    pub data: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Channels per pixel
    pub channels: u8,
}

impl ImageData {
    /// Decode an image file
    pub fn from_file<P: AsRef<Path>>(path: P, flip_vertically: bool) -> Result<Self, AssetError> {
        let path = path.as_ref();
        log::debug!("Loading image from: {:?}", path);

        let image = image::open(path)
            .map_err(|e| AssetError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        let data = Self::from_dynamic(image, flip_vertically);

        log::info!(
            "Loaded image {}x{} ({} channels) from {:?}",
            data.width,
            data.height,
            data.channels,
            path
        );
        Ok(data)
    }

    /// Decode an in-memory encoded image
    pub fn from_bytes(bytes: &[u8], flip_vertically: bool) -> Result<Self, AssetError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to decode image: {}", e)))?;
        Ok(Self::from_dynamic(image, flip_vertically))
    }

    fn from_dynamic(image: DynamicImage, flip_vertically: bool) -> Self {
        let image = if flip_vertically { image.flipv() } else { image };
        let (width, height) = (image.width(), image.height());
        let (data, channels) = match image {
            DynamicImage::ImageLuma8(buffer) => (buffer.into_raw(), 1),
            DynamicImage::ImageLumaA8(buffer) => (buffer.into_raw(), 2),
            DynamicImage::ImageRgb8(buffer) => (buffer.into_raw(), 3),
            DynamicImage::ImageRgba8(buffer) => (buffer.into_raw(), 4),
            other => (other.to_rgba8().into_raw(), 4),
        };
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    /// Image filled with one RGBA color
    #[must_use]
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            data: color.repeat(pixel_count),
            width,
            height,
            channels: 4,
        }
    }

    /// Size of the pixel data in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Whether the image has 1 to 4 channels and the data length matches width × height × channels
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        (1..=4).contains(&self.channels)
            && (self.width as usize)
                .checked_mul(self.height as usize)
                .and_then(|count| count.checked_mul(usize::from(self.channels)))
                == Some(self.data.len())
    }

    /// Three-channel copy: gray values are replicated, extra channels dropped
    #[must_use]
    pub fn to_rgb(&self) -> Self {
        let channels = usize::from(self.channels.max(1));
        let data = self
            .data
            .chunks_exact(channels)
            .flat_map(|pixel| match pixel {
                [gray] | [gray, _] => [*gray, *gray, *gray],
                [r, g, b, ..] => [*r, *g, *b],
                _ => [0, 0, 0],
            })
            .collect();
        Self {
            data,
            width: self.width,
            height: self.height,
            channels: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_color_image() {
        let img = ImageData::solid_color(4, 2, [255, 0, 0, 255]);
        assert_eq!(img.size_bytes(), 32);
        assert!(img.is_consistent());
        assert_eq!(&img.data[4..8], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_channel_count_is_preserved() {
        let mut encoded = Vec::new();
        let gray = image::GrayImage::from_raw(2, 1, vec![10, 20]).unwrap();
        DynamicImage::ImageLuma8(gray)
            .write_to(&mut std::io::Cursor::new(&mut encoded), image::ImageFormat::Png)
            .unwrap();

        let decoded = ImageData::from_bytes(&encoded, false).unwrap();
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.data, vec![10, 20]);
    }

    #[test]
    fn test_flip_reverses_rows() {
        let rows = image::GrayImage::from_raw(1, 2, vec![1, 2]).unwrap();
        let flipped = ImageData::from_dynamic(DynamicImage::ImageLuma8(rows), true);
        assert_eq!(flipped.data, vec![2, 1]);
    }

    #[test]
    fn test_gray_alpha_expands_to_rgb() {
        let image = ImageData {
            data: vec![10, 255, 20, 0],
            width: 2,
            height: 1,
            channels: 2,
        };
        let rgb = image.to_rgb();
        assert_eq!(rgb.channels, 3);
        assert_eq!(rgb.data, vec![10, 10, 10, 20, 20, 20]);
        assert!(rgb.is_consistent());
    }

    #[test]
    fn test_channel_count_outside_one_to_four_is_inconsistent() {
        let empty = ImageData {
            data: Vec::new(),
            width: 2,
            height: 2,
            channels: 0,
        };
        assert!(!empty.is_consistent());

        let five = ImageData {
            data: vec![0; 5],
            width: 1,
            height: 1,
            channels: 5,
        };
        assert!(!five.is_consistent());
    }

    #[test]
    fn test_undecodable_bytes() {
        assert!(ImageData::from_bytes(b"not an image", false).is_err());
    }
}
