//! # Rendering
//!
//! Owning wrappers over OpenGL objects plus the free drawing calls.
//!
//! ## Architecture
//!
//! - **Device**: the [`device::GraphicsDevice`] seam every handle talks through
//! - **Handles**: [`Window`], [`ShaderProgram`], [`VertexArray`],
//!   [`VertexBuffer`], [`ElementBuffer`] and [`Texture2d`] own exactly one
//!   native object each and release it on drop
//! - **Draw**: clear, depth test and draw calls against the current context
//! - **Camera**: fly camera producing view and projection matrices
//!
//! Every handle is move-only. A moved-from handle is replaced with its
//! `Default`, which owns nothing and releases nothing.

pub mod buffer;
pub mod camera;
pub mod device;
pub mod draw;
pub mod handle;
pub mod layout;
pub mod result;
pub mod shader;
pub mod texture;
pub mod vertex_array;
pub mod window;

#[cfg(test)]
mod lifecycle_tests;

pub use buffer::{ElementBuffer, ElementBufferError, IndexElement, VertexBuffer, VertexBufferError};
pub use camera::Camera;
pub use device::{BufferUsage, ComponentType, IndexType};
pub use handle::ObjectKind;
pub use layout::VertexAttribute;
pub use shader::{ShaderError, ShaderProgram};
pub use texture::{Texture2d, TextureError};
pub use vertex_array::{VertexArray, VertexArrayError};
pub use window::{Window, WindowError};
