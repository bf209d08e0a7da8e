//! Graphics device abstraction
//!
//! [`GraphicsDevice`] is the seam between the resource handles and the
//! actual OpenGL entry points. Every method is a direct pass-through to one
//! (or a small fixed group of) GL calls against whatever context is current
//! on the calling thread. Methods take `&self`: the real device is stateless
//! once its function pointers are loaded, and test doubles use interior
//! mutability.
//!
//! Object identifiers follow GL conventions: `0` is never a live object.

mod gl_device;
pub mod recording;
pub mod verify;

pub use gl_device::GlDevice;
pub use recording::RecordingDevice;
pub use verify::{default_verifier, QueryVerifier, SkipVerifier, StateVerifier};

use std::cell::Cell;
use std::rc::Rc;

use crate::config::{MagFilter, MinFilter, TextureWrap};
use crate::render::draw::{ClearFlags, DrawMode};
use crate::render::layout::VertexAttribute;

/// Native object identifier assigned by the device; `0` means "no object"
pub type ObjectId = u32;

/// Buffer binding points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// `GL_ARRAY_BUFFER`
    Array,
    /// `GL_ELEMENT_ARRAY_BUFFER`
    ElementArray,
}

impl BufferTarget {
    /// The integer state query reporting what is bound to this target
    #[must_use]
    pub const fn binding(self) -> Binding {
        match self {
            Self::Array => Binding::ArrayBuffer,
            Self::ElementArray => Binding::ElementArrayBuffer,
        }
    }
}

/// Buffer usage hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Written once, drawn many times
    #[default]
    StaticDraw,
    /// Rewritten occasionally
    DynamicDraw,
    /// Rewritten every frame
    StreamDraw,
}

/// Integer state that can be queried back from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// Buffer bound to `GL_ARRAY_BUFFER`
    ArrayBuffer,
    /// Buffer bound to `GL_ELEMENT_ARRAY_BUFFER` (vertex array state)
    ElementArrayBuffer,
    /// Currently bound vertex array
    VertexArray,
    /// Program in use
    Program,
    /// 2D texture bound to the active texture unit
    Texture2d,
    /// `GL_UNPACK_ALIGNMENT`
    UnpackAlignment,
}

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
}

impl ShaderStage {
    /// Human-readable stage name used in diagnostics
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vertex => "VERTEX",
            Self::Fragment => "FRAGMENT",
        }
    }
}

/// Scalar type of a vertex attribute component or index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// `i8`
    Byte,
    /// `u8`
    UnsignedByte,
    /// `i16`
    Short,
    /// `u16`
    UnsignedShort,
    /// `i32`
    Int,
    /// `u32`
    UnsignedInt,
    /// `f32`
    Float,
    /// `f64`
    Double,
}

impl ComponentType {
    /// Size of one component in bytes
    #[must_use]
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::Int | Self::UnsignedInt | Self::Float => 4,
            Self::Double => 8,
        }
    }

    /// Whether the type can feed an integer (`glVertexAttribIPointer`) attribute
    #[must_use]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Float | Self::Double)
    }
}

/// Index element width for element buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// 8-bit unsigned indices
    U8,
    /// 16-bit unsigned indices
    U16,
    /// 32-bit unsigned indices
    U32,
}

impl IndexType {
    /// Size of one index in bytes
    #[must_use]
    pub const fn size_bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// Texture sampling parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureParameter {
    /// Wrapping along S
    WrapS(TextureWrap),
    /// Wrapping along T
    WrapT(TextureWrap),
    /// Minification filter
    MinFilter(MinFilter),
    /// Magnification filter
    MagFilter(MagFilter),
}

/// Pixel layout for texture upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// One channel
    Red,
    /// Three channels
    Rgb,
    /// Four channels
    Rgba,
    /// Three channels, sRGB encoded (internal format only)
    Srgb,
    /// Four channels, sRGB encoded color with linear alpha (internal format only)
    SrgbAlpha,
}

impl PixelFormat {
    /// Channels per pixel
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            Self::Red => 1,
            Self::Rgb | Self::Srgb => 3,
            Self::Rgba | Self::SrgbAlpha => 4,
        }
    }
}

/// Uniform payload; `count` is derived from the slice length
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformData<'a> {
    /// `glUniform{components}iv`
    Int {
        /// Components per element (1-4)
        components: u8,
        /// Flattened values
        values: &'a [i32],
    },
    /// `glUniform{components}uiv`
    UnsignedInt {
        /// Components per element (1-4)
        components: u8,
        /// Flattened values
        values: &'a [u32],
    },
    /// `glUniform{components}fv`
    Float {
        /// Components per element (1-4)
        components: u8,
        /// Flattened values
        values: &'a [f32],
    },
    /// `glUniformMatrix{dim}fv`, column-major
    Matrix {
        /// Matrix dimension (2, 3 or 4)
        dim: u8,
        /// Ask the driver to transpose on upload
        transpose: bool,
        /// Flattened column-major values
        values: &'a [f32],
    },
}

/// Driver identification strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceString {
    /// `GL_VENDOR`
    Vendor,
    /// `GL_RENDERER`
    Renderer,
    /// `GL_VERSION`
    Version,
    /// `GL_SHADING_LANGUAGE_VERSION`
    ShadingLanguageVersion,
}

/// The graphics device collaborator
pub trait GraphicsDevice {
    // Buffers

    /// Generate one buffer object; returns 0 on failure
    fn create_buffer(&self) -> ObjectId;
    /// Delete a buffer object
    fn delete_buffer(&self, id: ObjectId);
    /// Bind `id` to `target`
    fn bind_buffer(&self, target: BufferTarget, id: ObjectId);
    /// Allocate and fill the buffer bound to `target`
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    /// Size in bytes of the buffer bound to `target`
    fn buffer_size(&self, target: BufferTarget) -> i64;

    // Vertex arrays

    /// Generate one vertex array object; returns 0 on failure
    fn create_vertex_array(&self) -> ObjectId;
    /// Delete a vertex array object
    fn delete_vertex_array(&self, id: ObjectId);
    /// Bind a vertex array (0 unbinds)
    fn bind_vertex_array(&self, id: ObjectId);
    /// Describe a float (or normalized) attribute slot of the bound array
    fn vertex_attrib_pointer(&self, attribute: &VertexAttribute);
    /// Describe an integer attribute slot of the bound array
    fn vertex_attrib_int_pointer(&self, attribute: &VertexAttribute);
    /// Enable an attribute slot of the bound array
    fn enable_vertex_attrib(&self, index: u32);
    /// Disable an attribute slot of the bound array
    fn disable_vertex_attrib(&self, index: u32);

    // Shaders and programs

    /// Create a shader object; returns 0 on failure
    fn create_shader(&self, stage: ShaderStage) -> ObjectId;
    /// Replace the source of a shader object
    fn shader_source(&self, shader: ObjectId, source: &str);
    /// Compile a shader object
    fn compile_shader(&self, shader: ObjectId);
    /// `GL_COMPILE_STATUS` of a shader object
    fn shader_compile_status(&self, shader: ObjectId) -> bool;
    /// Compiler info log of a shader object
    fn shader_info_log(&self, shader: ObjectId) -> String;
    /// Delete a shader object
    fn delete_shader(&self, shader: ObjectId);
    /// Create a program object; returns 0 on failure
    fn create_program(&self) -> ObjectId;
    /// Attach a shader to a program
    fn attach_shader(&self, program: ObjectId, shader: ObjectId);
    /// Detach a shader from a program
    fn detach_shader(&self, program: ObjectId, shader: ObjectId);
    /// Link a program
    fn link_program(&self, program: ObjectId);
    /// `GL_LINK_STATUS` of a program
    fn program_link_status(&self, program: ObjectId) -> bool;
    /// Linker info log of a program
    fn program_info_log(&self, program: ObjectId) -> String;
    /// Delete a program object
    fn delete_program(&self, program: ObjectId);
    /// Make `program` current (0 unbinds)
    fn use_program(&self, program: ObjectId);
    /// Resolve a uniform name; -1 when the program has no such active uniform
    fn uniform_location(&self, program: ObjectId, name: &str) -> i32;
    /// Upload a uniform to the program in use
    fn set_uniform(&self, location: i32, data: UniformData<'_>);

    // Textures

    /// Generate one texture object; returns 0 on failure
    fn create_texture(&self) -> ObjectId;
    /// Delete a texture object
    fn delete_texture(&self, id: ObjectId);
    /// Select texture unit `GL_TEXTURE0 + unit`
    fn active_texture(&self, unit: u32);
    /// Bind a 2D texture to the active unit
    fn bind_texture(&self, id: ObjectId);
    /// Set a sampling parameter of the bound 2D texture
    fn texture_parameter(&self, parameter: TextureParameter);
    /// Set `GL_UNPACK_ALIGNMENT`
    fn set_unpack_alignment(&self, alignment: i32);
    /// Upload level 0 of the bound 2D texture
    fn texture_image_2d(
        &self,
        internal_format: PixelFormat,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: &[u8],
    );
    /// Generate mipmaps for the bound 2D texture
    fn generate_mipmap(&self);

    // State and drawing

    /// Query integer state
    fn get_integer(&self, binding: Binding) -> i32;
    /// Query a driver identification string
    fn get_string(&self, name: DeviceString) -> Option<String>;
    /// Set the viewport rectangle
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// Set the clear color
    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    /// Clear the selected buffers
    fn clear(&self, flags: ClearFlags);
    /// Enable or disable depth testing
    fn set_depth_test(&self, enabled: bool);
    /// Non-indexed draw
    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32);
    /// Indexed draw from the bound element buffer
    fn draw_elements(&self, mode: DrawMode, count: i32, index_type: IndexType, offset: usize);
}

/// Device plus the verification strategy, shared by every live resource
///
/// The generation counts graphics-context lifetimes. It advances whenever the
/// loaded functions are thrown away, and object ids from an older generation
/// no longer name anything on the device.
#[derive(Clone)]
pub struct DeviceContext {
    device: Rc<dyn GraphicsDevice>,
    verifier: Rc<dyn StateVerifier>,
    generation: Rc<Cell<u64>>,
}

impl DeviceContext {
    /// Bundle a device with a verification strategy
    #[must_use]
    pub fn new(device: Rc<dyn GraphicsDevice>, verifier: Rc<dyn StateVerifier>) -> Self {
        Self {
            device,
            verifier,
            generation: Rc::new(Cell::new(0)),
        }
    }

    /// Current context generation
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Start a new generation; objects created before it are abandoned
    pub(crate) fn invalidate(&self) {
        self.generation.set(self.generation.get() + 1);
    }

    /// The graphics device
    #[must_use]
    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    /// Whether `expected` is what the device reports for `binding`
    #[must_use]
    pub fn is_bound(&self, binding: Binding, expected: ObjectId) -> bool {
        self.verifier.is_bound(self.device.as_ref(), binding, expected)
    }

    /// Whether any object is bound to `binding`
    #[must_use]
    pub fn has_binding(&self, binding: Binding) -> bool {
        self.verifier.has_binding(self.device.as_ref(), binding)
    }

    /// Whether the buffer bound to `target` really holds `expected` bytes
    #[must_use]
    pub fn upload_size_matches(&self, target: BufferTarget, expected: usize) -> bool {
        self.verifier.upload_size_matches(self.device.as_ref(), target, expected)
    }
}

impl std::fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceContext")
            .field("generation", &self.generation.get())
            .finish_non_exhaustive()
    }
}

/// Driver identification captured once functions are loaded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// `GL_VENDOR`
    pub vendor: String,
    /// `GL_RENDERER`
    pub renderer: String,
    /// `GL_VERSION`
    pub version: String,
    /// `GL_SHADING_LANGUAGE_VERSION`
    pub shading_language: String,
}

impl DeviceInfo {
    /// Query all identification strings, using `?` for any the driver withholds
    #[must_use]
    pub fn query(device: &dyn GraphicsDevice) -> Self {
        let get = |name| device.get_string(name).unwrap_or_else(|| "?".to_string());
        Self {
            vendor: get(DeviceString::Vendor),
            renderer: get(DeviceString::Renderer),
            version: get(DeviceString::Version),
            shading_language: get(DeviceString::ShadingLanguageVersion),
        }
    }

    /// Write the report to the info log
    pub fn log(&self) {
        log::info!("Version:    {}", self.version);
        log::info!("GLSL:       {}", self.shading_language);
        log::info!("Vendor:     {}", self.vendor);
        log::info!("Renderer:   {}", self.renderer);
    }
}
