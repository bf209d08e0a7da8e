//! Option records consumed by the resource factories

use serde::{Deserialize, Serialize};

/// Window creation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    /// Requested OpenGL context version (major, minor), core profile
    pub context_version: (u32, u32),
    /// Frame cap applied in `present` when vsync is off; 0 disables the cap
    pub target_fps: u32,
    /// Append the measured frame rate to the window title once per second
    pub show_fps: bool,
    /// Synchronize buffer swaps with the display refresh
    pub vsync: bool,
    /// Show the cursor; when false the cursor is hidden and captured
    pub cursor_visible: bool,
    /// Create the window fullscreen on the primary monitor
    pub fullscreen: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            context_version: (3, 3),
            target_fps: 0,
            show_fps: false,
            vsync: true,
            cursor_visible: true,
            fullscreen: false,
        }
    }
}

/// Texture coordinate wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureWrap {
    /// Tile the texture
    Repeat,
    /// Tile the texture, mirroring every other repetition
    MirroredRepeat,
    /// Clamp to the edge texel
    ClampToEdge,
    /// Clamp to the border color
    ClampToBorder,
}

/// Minification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinFilter {
    /// Nearest texel
    Nearest,
    /// Bilinear
    Linear,
    /// Nearest texel of the nearest mip level
    NearestMipmapNearest,
    /// Bilinear within the nearest mip level
    LinearMipmapNearest,
    /// Nearest texel, blended between mip levels
    NearestMipmapLinear,
    /// Trilinear
    LinearMipmapLinear,
}

impl MinFilter {
    /// Whether this filter samples mip levels
    #[must_use]
    pub const fn uses_mipmaps(self) -> bool {
        !matches!(self, Self::Nearest | Self::Linear)
    }
}

/// Magnification filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MagFilter {
    /// Nearest texel
    Nearest,
    /// Bilinear
    Linear,
}

/// Texture loading and sampling options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureOptions {
    /// Wrapping along S
    pub wrap_s: TextureWrap,
    /// Wrapping along T
    pub wrap_t: TextureWrap,
    /// Minification filter
    pub min_filter: MinFilter,
    /// Magnification filter
    pub mag_filter: MagFilter,
    /// Generate the mip chain after upload
    pub generate_mipmaps: bool,
    /// Flip rows on load so the first row is the bottom of the image
    pub flip_vertically: bool,
    /// Store 3/4 channel images in an sRGB internal format
    pub srgb: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            wrap_s: TextureWrap::Repeat,
            wrap_t: TextureWrap::Repeat,
            min_filter: MinFilter::LinearMipmapLinear,
            mag_filter: MagFilter::Linear,
            generate_mipmaps: true,
            flip_vertically: true,
            srgb: false,
        }
    }
}

/// Camera tuning parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
    /// Movement speed in units per second
    pub move_speed: f32,
    /// Degrees of rotation per unit of mouse movement
    pub sensitivity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            move_speed: 2.5,
            sensitivity: 0.1,
        }
    }
}
