//! Frame clearing and draw submission
//!
//! Free functions over the platform's device. None of them validate
//! bindings; the caller binds the program, vertex array and element buffer
//! first.

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

use super::buffer::ElementBuffer;
use crate::platform::Platform;

/// 8-bit RGBA color, laid out for direct use as a vertex attribute
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl Color {
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Color from all four channels
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Channels scaled to `0.0..=1.0`
    #[must_use]
    pub fn to_f32(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a].map(|c| f32::from(c) / 255.0)
    }
}

bitflags! {
    /// Buffers selected by [`clear`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        /// Color attachment
        const COLOR = 1;
        /// Depth attachment
        const DEPTH = 1 << 1;
        /// Stencil attachment
        const STENCIL = 1 << 2;
    }
}

/// Primitive assembly mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawMode {
    /// Independent points
    Points,
    /// Independent line segments
    Lines,
    /// Connected line segments
    LineStrip,
    /// Closed line loop
    LineLoop,
    /// Independent triangles
    #[default]
    Triangles,
    /// Triangle strip
    TriangleStrip,
    /// Triangle fan
    TriangleFan,
}

/// Set the color used by subsequent color clears
pub fn set_clear_color(platform: &Platform, color: Color) {
    let [r, g, b, a] = color.to_f32();
    platform.device_context().device().clear_color(r, g, b, a);
}

/// Clear the selected buffers of the current framebuffer
pub fn clear(platform: &Platform, flags: ClearFlags) {
    platform.device_context().device().clear(flags);
}

/// Enable or disable depth testing
pub fn set_depth_test(platform: &Platform, enabled: bool) {
    platform.device_context().device().set_depth_test(enabled);
}

/// Draw `count` vertices starting at `first` from the bound vertex array
pub fn draw_arrays(platform: &Platform, mode: DrawMode, first: i32, count: i32) {
    platform.device_context().device().draw_arrays(mode, first, count);
}

/// Draw every index of `elements`
///
/// The element buffer must be the one recorded in the bound vertex array.
pub fn draw_elements(platform: &Platform, mode: DrawMode, elements: &ElementBuffer) {
    let count = i32::try_from(elements.count()).unwrap_or(i32::MAX);
    platform
        .device_context()
        .device()
        .draw_elements(mode, count, elements.index_type(), 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_color_to_f32() {
        let [r, g, b, a] = Color::rgba(255, 0, 51, 255).to_f32();
        assert_relative_eq!(r, 1.0);
        assert_relative_eq!(g, 0.0);
        assert_relative_eq!(b, 0.2);
        assert_relative_eq!(a, 1.0);
    }

    #[test]
    fn test_color_is_four_bytes() {
        assert_eq!(std::mem::size_of::<Color>(), 4);
        assert_eq!(bytemuck::bytes_of(&Color::RED), &[255, 0, 0, 255]);
    }
}
