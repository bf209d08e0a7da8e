//! Shader program resource
//!
//! A [`ShaderProgram`] owns one linked program. Stage objects are compiled,
//! attached, linked and then detached and deleted, so only the program
//! outlives construction. Uniform locations are resolved once per name and
//! cached, including names the program does not have.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

use super::device::{Binding, DeviceContext, ObjectId, ShaderStage, UniformData};
use super::handle::{ObjectKind, OwnedHandle};
use super::result::ResourceError;
use crate::foundation::io;
use crate::foundation::math::{Mat3, Mat4, Vec2, Vec3, Vec4};
use crate::platform::Platform;

/// Shader program construction failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderError {
    /// Zero stage ids, empty source or empty path
    #[error("invalid shader parameters")]
    InvalidParams,

    /// The platform has no usable graphics context
    #[error("graphics backend not ready")]
    BackendNotReady,

    /// A shader source file could not be read
    #[error("failed to read shader source file")]
    FileIoFailed,

    /// The device refused to create a shader object
    #[error("shader object creation failed")]
    CreateShaderFailed,

    /// The device refused to create a program object
    #[error("program object creation failed")]
    CreateProgramFailed,

    /// The vertex stage did not compile
    #[error("vertex shader compile failed")]
    VertexCompileFailed,

    /// The fragment stage did not compile
    #[error("fragment shader compile failed")]
    FragmentCompileFailed,

    /// The stages did not link
    #[error("program link failed")]
    LinkFailed,
}

impl ResourceError for ShaderError {
    const RESOURCE: &'static str = "shader program";
}

/// Compiled stage object, deleted on drop
struct StageObject<'a> {
    context: &'a DeviceContext,
    id: ObjectId,
}

impl Drop for StageObject<'_> {
    fn drop(&mut self) {
        self.context.device().delete_shader(self.id);
    }
}

fn compile_stage<'a>(
    context: &'a DeviceContext,
    stage: ShaderStage,
    source: &str,
) -> Result<StageObject<'a>, ShaderError> {
    let device = context.device();
    let id = device.create_shader(stage);
    if id == 0 {
        log::error!("Failed to create {} shader object", stage.name());
        return Err(ShaderError::CreateShaderFailed);
    }
    let object = StageObject { context, id };

    device.shader_source(id, source);
    device.compile_shader(id);
    if !device.shader_compile_status(id) {
        log::error!(
            "{} shader compilation failed:\n{}",
            stage.name(),
            device.shader_info_log(id)
        );
        return Err(match stage {
            ShaderStage::Vertex => ShaderError::VertexCompileFailed,
            ShaderStage::Fragment => ShaderError::FragmentCompileFailed,
        });
    }
    Ok(object)
}

/// Owning handle to a linked shader program
#[derive(Debug)]
pub struct ShaderProgram {
    handle: OwnedHandle,
    uniforms: RefCell<HashMap<String, i32>>,
}

impl Default for ShaderProgram {
    fn default() -> Self {
        Self {
            handle: OwnedHandle::empty(ObjectKind::Program),
            uniforms: RefCell::default(),
        }
    }
}

impl ShaderProgram {
    /// Link two already-compiled stage objects
    ///
    /// The stage objects stay owned by the caller; they are detached again
    /// after linking.
    pub fn try_from_ids(
        platform: &Platform,
        vertex: ObjectId,
        fragment: ObjectId,
    ) -> Result<Self, ShaderError> {
        if vertex == 0 || fragment == 0 {
            log::error!("Shader stage ids must be non-zero");
            return Err(ShaderError::InvalidParams);
        }
        let context = platform
            .require_device()
            .map_err(|_| ShaderError::BackendNotReady)?;
        Self::link(&context, vertex, fragment)
    }

    /// Compile both stages from GLSL source and link them
    pub fn try_from_source(
        platform: &Platform,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        if vertex_source.trim().is_empty() || fragment_source.trim().is_empty() {
            log::error!("Shader source must not be empty");
            return Err(ShaderError::InvalidParams);
        }
        let context = platform
            .require_device()
            .map_err(|_| ShaderError::BackendNotReady)?;

        let vertex = compile_stage(&context, ShaderStage::Vertex, vertex_source)?;
        let fragment = compile_stage(&context, ShaderStage::Fragment, fragment_source)?;
        Self::link(&context, vertex.id, fragment.id)
    }

    /// Read both stages from disk, then behave like [`try_from_source`](Self::try_from_source)
    pub fn try_from_files(
        platform: &Platform,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let (vertex_path, fragment_path) = (vertex_path.as_ref(), fragment_path.as_ref());
        if vertex_path.as_os_str().is_empty() || fragment_path.as_os_str().is_empty() {
            log::error!("Shader paths must not be empty");
            return Err(ShaderError::InvalidParams);
        }
        let read = |path: &Path| {
            io::read_text_file(path).map_err(|error| {
                log::error!("Failed to read shader {}: {}", path.display(), error);
                ShaderError::FileIoFailed
            })
        };
        let vertex_source = read(vertex_path)?;
        let fragment_source = read(fragment_path)?;
        Self::try_from_source(platform, &vertex_source, &fragment_source)
    }

    fn link(
        context: &DeviceContext,
        vertex: ObjectId,
        fragment: ObjectId,
    ) -> Result<Self, ShaderError> {
        let device = context.device();
        let id = device.create_program();
        if id == 0 {
            log::error!("Failed to create program object");
            return Err(ShaderError::CreateProgramFailed);
        }
        let program = Self {
            handle: OwnedHandle::new(context.clone(), ObjectKind::Program, id),
            uniforms: RefCell::default(),
        };

        device.attach_shader(id, vertex);
        device.attach_shader(id, fragment);
        device.link_program(id);
        device.detach_shader(id, vertex);
        device.detach_shader(id, fragment);

        if !device.program_link_status(id) {
            log::error!("Shader program linking failed:\n{}", device.program_info_log(id));
            return Err(ShaderError::LinkFailed);
        }
        log::debug!("Linked shader program {}", id);
        Ok(program)
    }

    /// Native program id; 0 when the handle owns nothing
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.handle.id()
    }

    /// Whether this handle owns a program
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    /// Make this program current
    pub fn use_program(&self) {
        if let Some(context) = self.handle.context() {
            context.device().use_program(self.id());
        }
    }

    /// Resolve a uniform name, caching the result; -1 when absent
    #[must_use]
    pub fn uniform_location(&self, name: &str) -> i32 {
        let Some(context) = self.handle.context() else {
            return -1;
        };
        if let Some(location) = self.uniforms.borrow().get(name) {
            return *location;
        }
        let location = context.device().uniform_location(self.id(), name);
        self.uniforms.borrow_mut().insert(name.to_string(), location);
        location
    }

    fn upload(&self, location: i32, data: UniformData<'_>) -> bool {
        let Some(context) = self.handle.context() else {
            log::error!("Uniform upload on an empty shader program");
            return false;
        };
        if location < 0 {
            log::error!("Uniform location {} is invalid", location);
            return false;
        }
        if !context.is_bound(Binding::Program, self.id()) {
            log::error!(
                "Shader program {} must be in use before setting uniforms",
                self.id()
            );
            return false;
        }
        context.device().set_uniform(location, data);
        true
    }

    fn upload_named(&self, name: &str, data: UniformData<'_>) -> bool {
        let location = self.uniform_location(name);
        if location < 0 {
            log::warn!("Uniform '{}' not found in program {}", name, self.id());
            return false;
        }
        self.upload(location, data)
    }

    /// Set an `int` (or sampler) uniform by location
    pub fn set_i32(&self, location: i32, value: i32) -> bool {
        self.upload(location, UniformData::Int { components: 1, values: &[value] })
    }

    /// Set a `uint` uniform by location
    pub fn set_u32(&self, location: i32, value: u32) -> bool {
        self.upload(location, UniformData::UnsignedInt { components: 1, values: &[value] })
    }

    /// Set a `float` uniform by location
    pub fn set_f32(&self, location: i32, value: f32) -> bool {
        self.upload(location, UniformData::Float { components: 1, values: &[value] })
    }

    /// Set a `vec2` uniform by location
    pub fn set_vec2(&self, location: i32, value: &Vec2) -> bool {
        self.upload(location, UniformData::Float { components: 2, values: value.as_slice() })
    }

    /// Set a `vec3` uniform by location
    pub fn set_vec3(&self, location: i32, value: &Vec3) -> bool {
        self.upload(location, UniformData::Float { components: 3, values: value.as_slice() })
    }

    /// Set a `vec4` uniform by location
    pub fn set_vec4(&self, location: i32, value: &Vec4) -> bool {
        self.upload(location, UniformData::Float { components: 4, values: value.as_slice() })
    }

    /// Set an `ivec2` uniform by location
    pub fn set_ivec2(&self, location: i32, value: [i32; 2]) -> bool {
        self.upload(location, UniformData::Int { components: 2, values: &value })
    }

    /// Set an `ivec3` uniform by location
    pub fn set_ivec3(&self, location: i32, value: [i32; 3]) -> bool {
        self.upload(location, UniformData::Int { components: 3, values: &value })
    }

    /// Set an `ivec4` uniform by location
    pub fn set_ivec4(&self, location: i32, value: [i32; 4]) -> bool {
        self.upload(location, UniformData::Int { components: 4, values: &value })
    }

    /// Set a `mat3` uniform by location from column-major storage
    pub fn set_mat3(&self, location: i32, value: &Mat3, transpose: bool) -> bool {
        self.upload(
            location,
            UniformData::Matrix { dim: 3, transpose, values: value.as_slice() },
        )
    }

    /// Set a `mat4` uniform by location from column-major storage
    pub fn set_mat4(&self, location: i32, value: &Mat4, transpose: bool) -> bool {
        self.upload(
            location,
            UniformData::Matrix { dim: 4, transpose, values: value.as_slice() },
        )
    }

    /// Set an `int` uniform by name
    pub fn set_i32_by_name(&self, name: &str, value: i32) -> bool {
        self.upload_named(name, UniformData::Int { components: 1, values: &[value] })
    }

    /// Set a `float` uniform by name
    pub fn set_f32_by_name(&self, name: &str, value: f32) -> bool {
        self.upload_named(name, UniformData::Float { components: 1, values: &[value] })
    }

    /// Set a `vec3` uniform by name
    pub fn set_vec3_by_name(&self, name: &str, value: &Vec3) -> bool {
        self.upload_named(name, UniformData::Float { components: 3, values: value.as_slice() })
    }

    /// Set a `vec4` uniform by name
    pub fn set_vec4_by_name(&self, name: &str, value: &Vec4) -> bool {
        self.upload_named(name, UniformData::Float { components: 4, values: value.as_slice() })
    }

    /// Set a `mat4` uniform by name
    pub fn set_mat4_by_name(&self, name: &str, value: &Mat4, transpose: bool) -> bool {
        self.upload_named(
            name,
            UniformData::Matrix { dim: 4, transpose, values: value.as_slice() },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowOptions;
    use crate::render::Window;

    const VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 a_position;
uniform mat4 u_mvp;
void main() { gl_Position = u_mvp * vec4(a_position, 1.0); }
";

    const FRAGMENT: &str = "#version 330 core
out vec4 frag_color;
uniform vec4 u_tint;
uniform int u_texture;
void main() { frag_color = u_tint; }
";

    fn setup() -> (Platform, std::rc::Rc<crate::render::device::RecordingDevice>, Window) {
        let (platform, _probe, device) = Platform::headless();
        let window = Window::try_new(&platform, 64, 64, "t", WindowOptions::default()).unwrap();
        (platform, device, window)
    }

    #[test]
    fn test_link_detaches_and_deletes_stages() {
        let (platform, device, _window) = setup();
        let program = ShaderProgram::try_from_source(&platform, VERTEX, FRAGMENT).unwrap();

        let counts = device.counts();
        assert!(program.is_valid());
        assert_eq!(counts.shaders_created, 2);
        assert_eq!(counts.shaders_deleted, 2);
        assert_eq!(counts.attaches, 2);
        assert_eq!(counts.detaches, 2);
        assert!(device.attached_shaders(program.id()).is_empty());
    }

    #[test]
    fn test_stage_failures_are_distinguished() {
        let (platform, device, _window) = setup();

        let vertex = ShaderProgram::try_from_source(&platform, "garbage", FRAGMENT);
        assert_eq!(vertex.unwrap_err(), ShaderError::VertexCompileFailed);

        let fragment = ShaderProgram::try_from_source(&platform, VERTEX, "garbage");
        assert_eq!(fragment.unwrap_err(), ShaderError::FragmentCompileFailed);

        device.script().fail_link = true;
        let link = ShaderProgram::try_from_source(&platform, VERTEX, FRAGMENT);
        assert_eq!(link.unwrap_err(), ShaderError::LinkFailed);

        let counts = device.counts();
        assert_eq!(counts.shaders_created, counts.shaders_deleted);
        assert_eq!(counts.programs_created, counts.programs_deleted);
    }

    #[test]
    fn test_requires_ready_backend() {
        let (platform, _probe, _device) = Platform::headless();
        assert_eq!(
            ShaderProgram::try_from_source(&platform, VERTEX, FRAGMENT).unwrap_err(),
            ShaderError::BackendNotReady
        );
        assert_eq!(
            ShaderProgram::try_from_ids(&platform, 0, 3).unwrap_err(),
            ShaderError::InvalidParams
        );
    }

    #[test]
    fn test_missing_file_is_io_failure() {
        let (platform, _device, _window) = setup();
        let result = ShaderProgram::try_from_files(
            &platform,
            "does/not/exist.vert",
            "does/not/exist.frag",
        );
        assert_eq!(result.unwrap_err(), ShaderError::FileIoFailed);
    }

    #[test]
    fn test_uniform_setters_validate_binding() {
        let (platform, device, _window) = setup();
        let program = ShaderProgram::try_from_source(&platform, VERTEX, FRAGMENT).unwrap();
        let tint = program.uniform_location("u_tint");
        assert!(tint >= 0);

        assert!(!program.set_vec4(tint, &Vec4::new(1.0, 0.0, 0.0, 1.0)));
        program.use_program();
        assert!(program.set_vec4(tint, &Vec4::new(1.0, 0.0, 0.0, 1.0)));
        assert!(!program.set_f32(-1, 1.0));
        assert!(!program.set_i32_by_name("u_missing", 3));
        assert!(program.set_i32_by_name("u_texture", 0));

        let uploads = device.uniform_uploads();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0], (program.id(), tint, vec![1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_mat4_upload_is_column_major() {
        let (platform, device, _window) = setup();
        let program = ShaderProgram::try_from_source(&platform, VERTEX, FRAGMENT).unwrap();
        program.use_program();

        let translation = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        assert!(program.set_mat4_by_name("u_mvp", &translation, false));

        let (_, _, values) = device.uniform_uploads().pop().unwrap();
        assert_eq!(&values[12..15], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_take_moves_program_and_cache() {
        let (platform, device, _window) = setup();
        let mut source = ShaderProgram::try_from_source(&platform, VERTEX, FRAGMENT).unwrap();
        let id = source.id();
        let _ = source.uniform_location("u_tint");

        let moved = std::mem::take(&mut source);
        assert_eq!(source.id(), 0);
        assert_eq!(source.uniform_location("u_tint"), -1);
        assert_eq!(moved.id(), id);
        assert!(moved.uniform_location("u_tint") >= 0);
        assert_eq!(device.counts().uniform_lookups, 1);

        drop(source);
        assert!(device.is_live(id));
        drop(moved);
        assert_eq!(device.counts().programs_deleted, 1);
    }
}
