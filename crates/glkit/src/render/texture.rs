//! 2D texture resource

use std::borrow::Cow;
use std::path::Path;

use thiserror::Error;

use super::device::{Binding, DeviceContext, ObjectId, PixelFormat, TextureParameter};
use super::handle::{ObjectKind, OwnedHandle};
use super::result::ResourceError;
use crate::assets::ImageData;
use crate::config::TextureOptions;
use crate::platform::Platform;

/// Texture construction failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureError {
    /// Empty path, zero-sized image or pixel data inconsistent with its size
    #[error("invalid texture parameters")]
    InvalidParams,

    /// The platform has no usable graphics context
    #[error("graphics backend not ready")]
    BackendNotReady,

    /// The image file could not be read or decoded
    #[error("failed to load texture image")]
    FileIoFailed,

    /// The device refused to generate a texture
    #[error("texture generation failed")]
    GenFailed,
}

impl ResourceError for TextureError {
    const RESOURCE: &'static str = "texture";
}

/// Upload formats for a channel count: (internal, external)
fn formats(channels: u8, srgb: bool) -> (PixelFormat, PixelFormat) {
    match (channels, srgb) {
        (1, _) => (PixelFormat::Red, PixelFormat::Red),
        (4, false) => (PixelFormat::Rgba, PixelFormat::Rgba),
        (4, true) => (PixelFormat::SrgbAlpha, PixelFormat::Rgba),
        (_, false) => (PixelFormat::Rgb, PixelFormat::Rgb),
        (_, true) => (PixelFormat::Srgb, PixelFormat::Rgb),
    }
}

/// Owning handle to a 2D texture
#[derive(Debug)]
pub struct Texture2d {
    handle: OwnedHandle,
    width: u32,
    height: u32,
    internal_format: PixelFormat,
    format: PixelFormat,
}

impl Default for Texture2d {
    fn default() -> Self {
        Self {
            handle: OwnedHandle::empty(ObjectKind::Texture),
            width: 0,
            height: 0,
            internal_format: PixelFormat::Rgba,
            format: PixelFormat::Rgba,
        }
    }
}

impl Texture2d {
    /// Decode an image file and upload it
    ///
    /// # Arguments
    /// * `platform` - Platform providing the device
    /// * `path` - Image file; any format the `image` crate decodes
    /// * `options` - Sampling, mipmap, flip and sRGB options
    pub fn try_from_file(
        platform: &Platform,
        path: impl AsRef<Path>,
        options: &TextureOptions,
    ) -> Result<Self, TextureError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            log::error!("Texture path must not be empty");
            return Err(TextureError::InvalidParams);
        }
        let context = platform
            .require_device()
            .map_err(|_| TextureError::BackendNotReady)?;
        let image = ImageData::from_file(path, options.flip_vertically).map_err(|error| {
            log::error!("{}", error);
            TextureError::FileIoFailed
        })?;
        Self::upload(&context, &image, options)
    }

    /// Upload already-decoded pixels
    pub fn try_from_image(
        platform: &Platform,
        image: &ImageData,
        options: &TextureOptions,
    ) -> Result<Self, TextureError> {
        let context = platform
            .require_device()
            .map_err(|_| TextureError::BackendNotReady)?;
        Self::upload(&context, image, options)
    }

    fn upload(
        context: &DeviceContext,
        image: &ImageData,
        options: &TextureOptions,
    ) -> Result<Self, TextureError> {
        if image.width == 0 || image.height == 0 || !image.is_consistent() {
            log::error!(
                "Texture image {}x{} with {} channels has {} bytes",
                image.width,
                image.height,
                image.channels,
                image.data.len()
            );
            return Err(TextureError::InvalidParams);
        }

        let image = match image.channels {
            1 | 3 | 4 => Cow::Borrowed(image),
            other => {
                log::warn!("Unsupported channel count {}, uploading as RGB", other);
                Cow::Owned(image.to_rgb())
            }
        };
        let (internal_format, format) = formats(image.channels, options.srgb);

        let device = context.device();
        let id = device.create_texture();
        if id == 0 {
            log::error!("Failed to generate texture");
            return Err(TextureError::GenFailed);
        }
        let handle = OwnedHandle::new(context.clone(), ObjectKind::Texture, id);

        let prior_texture = u32::try_from(device.get_integer(Binding::Texture2d)).unwrap_or(0);
        let prior_alignment = device.get_integer(Binding::UnpackAlignment);

        device.bind_texture(id);
        device.texture_parameter(TextureParameter::WrapS(options.wrap_s));
        device.texture_parameter(TextureParameter::WrapT(options.wrap_t));
        device.texture_parameter(TextureParameter::MinFilter(options.min_filter));
        device.texture_parameter(TextureParameter::MagFilter(options.mag_filter));
        device.set_unpack_alignment(1);
        device.texture_image_2d(internal_format, image.width, image.height, format, &image.data);
        if options.generate_mipmaps {
            device.generate_mipmap();
        } else if options.min_filter.uses_mipmaps() {
            log::warn!(
                "Texture {} samples mipmaps with {:?} but none were generated",
                id,
                options.min_filter
            );
        }
        device.set_unpack_alignment(prior_alignment);
        device.bind_texture(prior_texture);

        log::debug!(
            "Uploaded texture {} ({}x{}, {:?})",
            id,
            image.width,
            image.height,
            internal_format
        );
        Ok(Self {
            handle,
            width: image.width,
            height: image.height,
            internal_format,
            format,
        })
    }

    /// Native texture id; 0 when the handle owns nothing
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.handle.id()
    }

    /// Whether this handle owns a texture
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    /// Width in pixels
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Storage format on the device
    #[must_use]
    pub const fn internal_format(&self) -> PixelFormat {
        self.internal_format
    }

    /// Layout of the uploaded pixels
    #[must_use]
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bind to texture unit `unit`
    pub fn bind(&self, unit: u32) {
        if let Some(context) = self.handle.context() {
            context.device().active_texture(unit);
            context.device().bind_texture(self.id());
        }
    }

    /// Clear the 2D binding of texture unit `unit`
    pub fn unbind(&self, unit: u32) {
        if let Some(context) = self.handle.context() {
            context.device().active_texture(unit);
            context.device().bind_texture(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::config::{MagFilter, MinFilter, TextureWrap, WindowOptions};
    use crate::render::device::{GraphicsDevice, RecordingDevice};
    use crate::render::Window;

    fn setup() -> (Platform, Rc<RecordingDevice>, Window) {
        let (platform, _probe, device) = Platform::headless();
        let window = Window::try_new(&platform, 64, 64, "t", WindowOptions::default()).unwrap();
        (platform, device, window)
    }

    #[test]
    fn test_formats_by_channel_count() {
        assert_eq!(formats(1, true), (PixelFormat::Red, PixelFormat::Red));
        assert_eq!(formats(3, false), (PixelFormat::Rgb, PixelFormat::Rgb));
        assert_eq!(formats(3, true), (PixelFormat::Srgb, PixelFormat::Rgb));
        assert_eq!(formats(4, true), (PixelFormat::SrgbAlpha, PixelFormat::Rgba));
    }

    #[test]
    fn test_upload_applies_options_and_restores_state() {
        let (platform, device, _window) = setup();
        let previous = device.create_texture();
        device.bind_texture(previous);

        let options = TextureOptions {
            wrap_s: TextureWrap::ClampToEdge,
            min_filter: MinFilter::Linear,
            mag_filter: MagFilter::Nearest,
            generate_mipmaps: false,
            srgb: true,
            ..TextureOptions::default()
        };
        let image = ImageData::solid_color(4, 2, [1, 2, 3, 4]);
        let texture = Texture2d::try_from_image(&platform, &image, &options).unwrap();

        assert_eq!((texture.width(), texture.height()), (4, 2));
        assert_eq!(texture.internal_format(), PixelFormat::SrgbAlpha);
        assert_eq!(
            device.texture_parameters(texture.id()),
            vec![
                TextureParameter::WrapS(TextureWrap::ClampToEdge),
                TextureParameter::WrapT(TextureWrap::Repeat),
                TextureParameter::MinFilter(MinFilter::Linear),
                TextureParameter::MagFilter(MagFilter::Nearest),
            ]
        );
        let upload = device.last_texture_upload().unwrap();
        assert_eq!(upload.texture, texture.id());
        assert_eq!(upload.bytes, 32);
        assert_eq!(upload.unpack_alignment, 1);
        assert_eq!(device.counts().mipmaps_generated, 0);
        assert_eq!(device.get_integer(Binding::Texture2d), previous as i32);
        assert_eq!(device.get_integer(Binding::UnpackAlignment), 4);
    }

    #[test]
    fn test_two_channel_image_falls_back_to_rgb() {
        let (platform, device, _window) = setup();
        let image = ImageData {
            data: vec![9, 255, 7, 255],
            width: 2,
            height: 1,
            channels: 2,
        };
        let texture = Texture2d::try_from_image(&platform, &image, &TextureOptions::default()).unwrap();
        assert_eq!(texture.format(), PixelFormat::Rgb);
        assert_eq!(device.last_texture_upload().unwrap().bytes, 6);
        assert_eq!(device.counts().mipmaps_generated, 1);
    }

    #[test]
    fn test_zero_channel_image_is_rejected() {
        let (platform, device, _window) = setup();
        let image = ImageData {
            data: Vec::new(),
            width: 4,
            height: 4,
            channels: 0,
        };
        assert_eq!(
            Texture2d::try_from_image(&platform, &image, &TextureOptions::default()).unwrap_err(),
            TextureError::InvalidParams
        );
        assert!(device.last_texture_upload().is_none());
        assert_eq!(device.counts().textures_created, 0);
    }

    #[test]
    fn test_load_from_png_file() {
        let (platform, device, _window) = setup();
        let path = std::env::temp_dir().join(format!("glkit_texture_{}.png", std::process::id()));
        image::RgbImage::from_pixel(3, 5, image::Rgb([10, 20, 30])).save(&path).unwrap();

        let texture = Texture2d::try_from_file(&platform, &path, &TextureOptions::default());
        std::fs::remove_file(&path).ok();

        let texture = texture.unwrap();
        assert_eq!((texture.width(), texture.height()), (3, 5));
        assert_eq!(texture.format(), PixelFormat::Rgb);
        assert_eq!(device.last_texture_upload().unwrap().bytes, 45);
    }

    #[test]
    fn test_load_failures() {
        let (platform, device, _window) = setup();
        let options = TextureOptions::default();
        assert_eq!(
            Texture2d::try_from_file(&platform, "", &options).unwrap_err(),
            TextureError::InvalidParams
        );
        assert_eq!(
            Texture2d::try_from_file(&platform, "missing/texture.png", &options).unwrap_err(),
            TextureError::FileIoFailed
        );

        device.script().fail_texture_create = true;
        let image = ImageData::solid_color(1, 1, [0; 4]);
        assert_eq!(
            Texture2d::try_from_image(&platform, &image, &options).unwrap_err(),
            TextureError::GenFailed
        );
        assert_eq!(device.counts().textures_created, 0);
    }

    #[test]
    fn test_bind_selects_unit() {
        let (platform, device, _window) = setup();
        let image = ImageData::solid_color(1, 1, [0; 4]);
        let texture = Texture2d::try_from_image(&platform, &image, &TextureOptions::default()).unwrap();

        texture.bind(3);
        assert_eq!(device.get_integer(Binding::Texture2d), texture.id() as i32);
        texture.unbind(3);
        assert_eq!(device.get_integer(Binding::Texture2d), 0);
    }
}
