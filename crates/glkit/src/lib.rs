//! # glkit
//!
//! A thin convenience layer over OpenGL, GLFW and image decoding.
//!
//! ## Features
//!
//! - **Owning handles**: windows, shader programs, vertex arrays, vertex and
//!   element buffers, and textures are move-only values that release their
//!   native object exactly once
//! - **Fallible construction**: every resource has a `try_*` factory returning
//!   a `Result` and an `unwrap_or_abort` escalation path for programs that
//!   prefer to die loudly
//! - **Injected platform**: the windowing backend, the graphics device and the
//!   debug state verifier are trait objects owned by a [`Platform`], so the
//!   whole lifecycle can be exercised headless
//! - **Camera**: yaw/pitch fly camera producing view and projection matrices
//! - **Assets**: image decoding into tightly packed pixel buffers for textures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use glkit::prelude::*;
//!
//! fn main() {
//!     glkit::foundation::logging::init();
//!
//!     let platform = Platform::glfw();
//!     let mut window = Window::try_new(&platform, 800, 600, "hello", WindowOptions::default())
//!         .unwrap_or_abort("create");
//!
//!     while !window.should_close() {
//!         draw::clear(&platform, ClearFlags::COLOR);
//!         window.present();
//!         platform.poll_events();
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod input;
pub mod platform;
pub mod render;

pub use platform::Platform;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        assets::ImageData,
        config::{CameraSettings, Config, ConfigError, TextureOptions, WindowOptions},
        foundation::{
            math::{Mat3, Mat4, Mat4Ext, Vec2, Vec3, Vec4},
            time::Timer,
        },
        input::{Action, InputState, Key, MouseButton},
        platform::{BootstrapError, Platform},
        render::{
            draw::{self, ClearFlags, Color, DrawMode},
            result::{ResourceError, UnwrapOrAbort},
            BufferUsage, Camera, ElementBuffer, ElementBufferError, IndexType, ShaderError,
            ShaderProgram, Texture2d, TextureError, VertexArray, VertexArrayError,
            VertexAttribute, VertexBuffer, VertexBufferError, Window, WindowError,
        },
        vertex_attribute,
    };
}
