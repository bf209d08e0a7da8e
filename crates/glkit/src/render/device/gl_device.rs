//! OpenGL implementation of [`GraphicsDevice`]
//!
//! Every call goes straight to the `gl` crate's loaded function pointers and
//! therefore requires a current context whose functions have been loaded
//! (see [`Platform::ensure_functions`](crate::Platform::ensure_functions)).
//! This is the only module allowed to contain `unsafe` code.

#![allow(unsafe_code)]

use std::ffi::{CStr, CString};

use gl::types::{GLchar, GLenum, GLint, GLsizei, GLuint};

use super::{
    Binding, BufferTarget, BufferUsage, ComponentType, DeviceString, GraphicsDevice, IndexType,
    ObjectId, PixelFormat, ShaderStage, TextureParameter, UniformData,
};
use crate::config::{MagFilter, MinFilter, TextureWrap};
use crate::render::draw::{ClearFlags, DrawMode};
use crate::render::layout::VertexAttribute;

/// Device backed by the process-wide GL function table
#[derive(Debug, Clone, Copy, Default)]
pub struct GlDevice;

impl GlDevice {
    /// Create the device; functions are loaded separately by the windowing backend
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

const fn buffer_target(target: BufferTarget) -> GLenum {
    match target {
        BufferTarget::Array => gl::ARRAY_BUFFER,
        BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
    }
}

const fn buffer_usage(usage: BufferUsage) -> GLenum {
    match usage {
        BufferUsage::StaticDraw => gl::STATIC_DRAW,
        BufferUsage::DynamicDraw => gl::DYNAMIC_DRAW,
        BufferUsage::StreamDraw => gl::STREAM_DRAW,
    }
}

const fn component_type(ty: ComponentType) -> GLenum {
    match ty {
        ComponentType::Byte => gl::BYTE,
        ComponentType::UnsignedByte => gl::UNSIGNED_BYTE,
        ComponentType::Short => gl::SHORT,
        ComponentType::UnsignedShort => gl::UNSIGNED_SHORT,
        ComponentType::Int => gl::INT,
        ComponentType::UnsignedInt => gl::UNSIGNED_INT,
        ComponentType::Float => gl::FLOAT,
        ComponentType::Double => gl::DOUBLE,
    }
}

const fn index_type(ty: IndexType) -> GLenum {
    match ty {
        IndexType::U8 => gl::UNSIGNED_BYTE,
        IndexType::U16 => gl::UNSIGNED_SHORT,
        IndexType::U32 => gl::UNSIGNED_INT,
    }
}

const fn pixel_format(format: PixelFormat) -> GLenum {
    match format {
        PixelFormat::Red => gl::RED,
        PixelFormat::Rgb => gl::RGB,
        PixelFormat::Rgba => gl::RGBA,
        PixelFormat::Srgb => gl::SRGB,
        PixelFormat::SrgbAlpha => gl::SRGB_ALPHA,
    }
}

const fn wrap_mode(wrap: TextureWrap) -> GLenum {
    match wrap {
        TextureWrap::Repeat => gl::REPEAT,
        TextureWrap::MirroredRepeat => gl::MIRRORED_REPEAT,
        TextureWrap::ClampToEdge => gl::CLAMP_TO_EDGE,
        TextureWrap::ClampToBorder => gl::CLAMP_TO_BORDER,
    }
}

const fn min_filter(filter: MinFilter) -> GLenum {
    match filter {
        MinFilter::Nearest => gl::NEAREST,
        MinFilter::Linear => gl::LINEAR,
        MinFilter::NearestMipmapNearest => gl::NEAREST_MIPMAP_NEAREST,
        MinFilter::LinearMipmapNearest => gl::LINEAR_MIPMAP_NEAREST,
        MinFilter::NearestMipmapLinear => gl::NEAREST_MIPMAP_LINEAR,
        MinFilter::LinearMipmapLinear => gl::LINEAR_MIPMAP_LINEAR,
    }
}

const fn mag_filter(filter: MagFilter) -> GLenum {
    match filter {
        MagFilter::Nearest => gl::NEAREST,
        MagFilter::Linear => gl::LINEAR,
    }
}

const fn draw_mode(mode: DrawMode) -> GLenum {
    match mode {
        DrawMode::Points => gl::POINTS,
        DrawMode::Lines => gl::LINES,
        DrawMode::LineStrip => gl::LINE_STRIP,
        DrawMode::LineLoop => gl::LINE_LOOP,
        DrawMode::Triangles => gl::TRIANGLES,
        DrawMode::TriangleStrip => gl::TRIANGLE_STRIP,
        DrawMode::TriangleFan => gl::TRIANGLE_FAN,
    }
}

fn clear_mask(flags: ClearFlags) -> GLenum {
    let mut mask = 0;
    if flags.contains(ClearFlags::COLOR) {
        mask |= gl::COLOR_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::DEPTH) {
        mask |= gl::DEPTH_BUFFER_BIT;
    }
    if flags.contains(ClearFlags::STENCIL) {
        mask |= gl::STENCIL_BUFFER_BIT;
    }
    mask
}

fn to_sizei(value: usize) -> GLsizei {
    GLsizei::try_from(value).unwrap_or(GLsizei::MAX)
}

/// Read an info log whose length is reported by `length_of` and filled by `fill`
fn read_info_log(
    length_of: impl FnOnce(*mut GLint),
    fill: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar),
) -> String {
    let mut length: GLint = 0;
    length_of(std::ptr::addr_of_mut!(length));
    let Ok(capacity) = usize::try_from(length) else {
        return String::new();
    };
    if capacity == 0 {
        return String::new();
    }
    let mut buffer = vec![0u8; capacity];
    let mut written: GLsizei = 0;
    fill(length, std::ptr::addr_of_mut!(written), buffer.as_mut_ptr().cast());
    buffer.truncate(usize::try_from(written).unwrap_or(0));
    String::from_utf8_lossy(&buffer).trim_end().to_string()
}

impl GraphicsDevice for GlDevice {
    fn create_buffer(&self) -> ObjectId {
        let mut id: GLuint = 0;
        unsafe { gl::GenBuffers(1, &mut id) };
        id
    }

    fn delete_buffer(&self, id: ObjectId) {
        unsafe { gl::DeleteBuffers(1, &id) };
    }

    fn bind_buffer(&self, target: BufferTarget, id: ObjectId) {
        unsafe { gl::BindBuffer(buffer_target(target), id) };
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        let size = isize::try_from(data.len()).unwrap_or(isize::MAX);
        unsafe {
            gl::BufferData(
                buffer_target(target),
                size,
                data.as_ptr().cast(),
                buffer_usage(usage),
            );
        }
    }

    fn buffer_size(&self, target: BufferTarget) -> i64 {
        let mut size: GLint = 0;
        unsafe { gl::GetBufferParameteriv(buffer_target(target), gl::BUFFER_SIZE, &mut size) };
        i64::from(size)
    }

    fn create_vertex_array(&self) -> ObjectId {
        let mut id: GLuint = 0;
        unsafe { gl::GenVertexArrays(1, &mut id) };
        id
    }

    fn delete_vertex_array(&self, id: ObjectId) {
        unsafe { gl::DeleteVertexArrays(1, &id) };
    }

    fn bind_vertex_array(&self, id: ObjectId) {
        unsafe { gl::BindVertexArray(id) };
    }

    fn vertex_attrib_pointer(&self, attribute: &VertexAttribute) {
        unsafe {
            gl::VertexAttribPointer(
                attribute.index,
                attribute.components,
                component_type(attribute.component_type),
                if attribute.normalized { gl::TRUE } else { gl::FALSE },
                attribute.stride,
                attribute.offset as *const _,
            );
        }
    }

    fn vertex_attrib_int_pointer(&self, attribute: &VertexAttribute) {
        unsafe {
            gl::VertexAttribIPointer(
                attribute.index,
                attribute.components,
                component_type(attribute.component_type),
                attribute.stride,
                attribute.offset as *const _,
            );
        }
    }

    fn enable_vertex_attrib(&self, index: u32) {
        unsafe { gl::EnableVertexAttribArray(index) };
    }

    fn disable_vertex_attrib(&self, index: u32) {
        unsafe { gl::DisableVertexAttribArray(index) };
    }

    fn create_shader(&self, stage: ShaderStage) -> ObjectId {
        let kind = match stage {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        };
        unsafe { gl::CreateShader(kind) }
    }

    fn shader_source(&self, shader: ObjectId, source: &str) {
        let pointer = source.as_ptr().cast::<GLchar>();
        let length = GLint::try_from(source.len()).unwrap_or(GLint::MAX);
        unsafe { gl::ShaderSource(shader, 1, &pointer, &length) };
    }

    fn compile_shader(&self, shader: ObjectId) {
        unsafe { gl::CompileShader(shader) };
    }

    fn shader_compile_status(&self, shader: ObjectId) -> bool {
        let mut status: GLint = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
        status == GLint::from(gl::TRUE)
    }

    fn shader_info_log(&self, shader: ObjectId) -> String {
        read_info_log(
            |length| unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, length) },
            |capacity, written, buffer| unsafe {
                gl::GetShaderInfoLog(shader, capacity, written, buffer);
            },
        )
    }

    fn delete_shader(&self, shader: ObjectId) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&self) -> ObjectId {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: ObjectId, shader: ObjectId) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn detach_shader(&self, program: ObjectId, shader: ObjectId) {
        unsafe { gl::DetachShader(program, shader) };
    }

    fn link_program(&self, program: ObjectId) {
        unsafe { gl::LinkProgram(program) };
    }

    fn program_link_status(&self, program: ObjectId) -> bool {
        let mut status: GLint = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut status) };
        status == GLint::from(gl::TRUE)
    }

    fn program_info_log(&self, program: ObjectId) -> String {
        read_info_log(
            |length| unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, length) },
            |capacity, written, buffer| unsafe {
                gl::GetProgramInfoLog(program, capacity, written, buffer);
            },
        )
    }

    fn delete_program(&self, program: ObjectId) {
        unsafe { gl::DeleteProgram(program) };
    }

    fn use_program(&self, program: ObjectId) {
        unsafe { gl::UseProgram(program) };
    }

    fn uniform_location(&self, program: ObjectId, name: &str) -> i32 {
        let Ok(name) = CString::new(name) else {
            return -1;
        };
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn set_uniform(&self, location: i32, data: UniformData<'_>) {
        match data {
            UniformData::Int { components, values } => {
                let count = to_sizei(values.len() / usize::from(components.max(1)));
                let pointer = values.as_ptr();
                unsafe {
                    match components {
                        1 => gl::Uniform1iv(location, count, pointer),
                        2 => gl::Uniform2iv(location, count, pointer),
                        3 => gl::Uniform3iv(location, count, pointer),
                        _ => gl::Uniform4iv(location, count, pointer),
                    }
                }
            }
            UniformData::UnsignedInt { components, values } => {
                let count = to_sizei(values.len() / usize::from(components.max(1)));
                let pointer = values.as_ptr();
                unsafe {
                    match components {
                        1 => gl::Uniform1uiv(location, count, pointer),
                        2 => gl::Uniform2uiv(location, count, pointer),
                        3 => gl::Uniform3uiv(location, count, pointer),
                        _ => gl::Uniform4uiv(location, count, pointer),
                    }
                }
            }
            UniformData::Float { components, values } => {
                let count = to_sizei(values.len() / usize::from(components.max(1)));
                let pointer = values.as_ptr();
                unsafe {
                    match components {
                        1 => gl::Uniform1fv(location, count, pointer),
                        2 => gl::Uniform2fv(location, count, pointer),
                        3 => gl::Uniform3fv(location, count, pointer),
                        _ => gl::Uniform4fv(location, count, pointer),
                    }
                }
            }
            UniformData::Matrix {
                dim,
                transpose,
                values,
            } => {
                let dim = dim.clamp(2, 4);
                let count = to_sizei(values.len() / usize::from(dim * dim));
                let transpose = if transpose { gl::TRUE } else { gl::FALSE };
                let pointer = values.as_ptr();
                unsafe {
                    match dim {
                        2 => gl::UniformMatrix2fv(location, count, transpose, pointer),
                        3 => gl::UniformMatrix3fv(location, count, transpose, pointer),
                        _ => gl::UniformMatrix4fv(location, count, transpose, pointer),
                    }
                }
            }
        }
    }

    fn create_texture(&self) -> ObjectId {
        let mut id: GLuint = 0;
        unsafe { gl::GenTextures(1, &mut id) };
        id
    }

    fn delete_texture(&self, id: ObjectId) {
        unsafe { gl::DeleteTextures(1, &id) };
    }

    fn active_texture(&self, unit: u32) {
        unsafe { gl::ActiveTexture(gl::TEXTURE0 + unit) };
    }

    fn bind_texture(&self, id: ObjectId) {
        unsafe { gl::BindTexture(gl::TEXTURE_2D, id) };
    }

    #[allow(clippy::cast_possible_wrap)]
    fn texture_parameter(&self, parameter: TextureParameter) {
        let (name, value) = match parameter {
            TextureParameter::WrapS(wrap) => (gl::TEXTURE_WRAP_S, wrap_mode(wrap)),
            TextureParameter::WrapT(wrap) => (gl::TEXTURE_WRAP_T, wrap_mode(wrap)),
            TextureParameter::MinFilter(filter) => (gl::TEXTURE_MIN_FILTER, min_filter(filter)),
            TextureParameter::MagFilter(filter) => (gl::TEXTURE_MAG_FILTER, mag_filter(filter)),
        };
        unsafe { gl::TexParameteri(gl::TEXTURE_2D, name, value as GLint) };
    }

    fn set_unpack_alignment(&self, alignment: i32) {
        unsafe { gl::PixelStorei(gl::UNPACK_ALIGNMENT, alignment) };
    }

    #[allow(clippy::cast_possible_wrap)]
    fn texture_image_2d(
        &self,
        internal_format: PixelFormat,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: &[u8],
    ) {
        let required = (width as usize)
            .checked_mul(height as usize)
            .and_then(|count| count.checked_mul(format.channels()));
        if required.map_or(true, |required| pixels.len() < required) {
            log::error!(
                "Texture upload of {}x{} {:?} needs more than the {} bytes given",
                width,
                height,
                format,
                pixels.len()
            );
            return;
        }
        unsafe {
            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                pixel_format(internal_format) as GLint,
                GLsizei::try_from(width).unwrap_or(0),
                GLsizei::try_from(height).unwrap_or(0),
                0,
                pixel_format(format),
                gl::UNSIGNED_BYTE,
                pixels.as_ptr().cast(),
            );
        }
    }

    fn generate_mipmap(&self) {
        unsafe { gl::GenerateMipmap(gl::TEXTURE_2D) };
    }

    fn get_integer(&self, binding: Binding) -> i32 {
        let name = match binding {
            Binding::ArrayBuffer => gl::ARRAY_BUFFER_BINDING,
            Binding::ElementArrayBuffer => gl::ELEMENT_ARRAY_BUFFER_BINDING,
            Binding::VertexArray => gl::VERTEX_ARRAY_BINDING,
            Binding::Program => gl::CURRENT_PROGRAM,
            Binding::Texture2d => gl::TEXTURE_BINDING_2D,
            Binding::UnpackAlignment => gl::UNPACK_ALIGNMENT,
        };
        let mut value: GLint = 0;
        unsafe { gl::GetIntegerv(name, &mut value) };
        value
    }

    fn get_string(&self, name: DeviceString) -> Option<String> {
        let name = match name {
            DeviceString::Vendor => gl::VENDOR,
            DeviceString::Renderer => gl::RENDERER,
            DeviceString::Version => gl::VERSION,
            DeviceString::ShadingLanguageVersion => gl::SHADING_LANGUAGE_VERSION,
        };
        let pointer = unsafe { gl::GetString(name) };
        if pointer.is_null() {
            return None;
        }
        let value = unsafe { CStr::from_ptr(pointer.cast()) };
        Some(value.to_string_lossy().into_owned())
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { gl::Viewport(x, y, width, height) };
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe { gl::ClearColor(r, g, b, a) };
    }

    fn clear(&self, flags: ClearFlags) {
        unsafe { gl::Clear(clear_mask(flags)) };
    }

    fn set_depth_test(&self, enabled: bool) {
        unsafe {
            if enabled {
                gl::Enable(gl::DEPTH_TEST);
            } else {
                gl::Disable(gl::DEPTH_TEST);
            }
        }
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        unsafe { gl::DrawArrays(draw_mode(mode), first, count) };
    }

    fn draw_elements(&self, mode: DrawMode, count: i32, index: IndexType, offset: usize) {
        unsafe {
            gl::DrawElements(draw_mode(mode), count, index_type(index), offset as *const _);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_pixel_slice_never_reaches_the_driver() {
        // Returns before any GL call, so no context is needed.
        GlDevice::new().texture_image_2d(PixelFormat::Rgb, 2, 2, PixelFormat::Rgb, &[]);
        GlDevice::new().texture_image_2d(PixelFormat::Rgba, u32::MAX, u32::MAX, PixelFormat::Rgba, &[0; 4]);
    }

    #[test]
    fn test_clear_mask_combines_bits() {
        assert_eq!(clear_mask(ClearFlags::COLOR), gl::COLOR_BUFFER_BIT);
        assert_eq!(
            clear_mask(ClearFlags::COLOR | ClearFlags::DEPTH),
            gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT
        );
        assert_eq!(clear_mask(ClearFlags::empty()), 0);
    }

    #[test]
    fn test_enum_translation() {
        assert_eq!(index_type(IndexType::U16), gl::UNSIGNED_SHORT);
        assert_eq!(pixel_format(PixelFormat::SrgbAlpha), gl::SRGB_ALPHA);
        assert_eq!(min_filter(MinFilter::LinearMipmapLinear), gl::LINEAR_MIPMAP_LINEAR);
        assert_eq!(draw_mode(DrawMode::TriangleFan), gl::TRIANGLE_FAN);
    }
}
