//! In-memory graphics device
//!
//! [`RecordingDevice`] stands in for a GL context in headless runs. It hands
//! out object ids, tracks bindings and buffer sizes the way a driver would,
//! counts every call, and can be scripted to fail specific steps.
//!
//! Shader compilation is simulated: a stage compiles when its source contains
//! a `main` entry point, and linking assigns uniform locations in declaration
//! order to every `uniform` found in the attached sources.

use std::cell::{RefCell, RefMut};
use std::collections::{HashMap, HashSet};

use super::{
    Binding, BufferTarget, BufferUsage, DeviceString, GraphicsDevice, IndexType, ObjectId,
    PixelFormat, ShaderStage, TextureParameter, UniformData,
};
use crate::render::draw::{ClearFlags, DrawMode};
use crate::render::layout::VertexAttribute;

/// Per-operation call counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// Buffers generated
    pub buffers_created: usize,
    /// Buffers deleted
    pub buffers_deleted: usize,
    /// Vertex arrays generated
    pub vertex_arrays_created: usize,
    /// Vertex arrays deleted
    pub vertex_arrays_deleted: usize,
    /// Shader objects created
    pub shaders_created: usize,
    /// Shader objects deleted
    pub shaders_deleted: usize,
    /// Programs created
    pub programs_created: usize,
    /// Programs deleted
    pub programs_deleted: usize,
    /// Textures generated
    pub textures_created: usize,
    /// Textures deleted
    pub textures_deleted: usize,
    /// Shader attach calls
    pub attaches: usize,
    /// Shader detach calls
    pub detaches: usize,
    /// Uniform name resolutions
    pub uniform_lookups: usize,
    /// Uniform uploads
    pub uniform_uploads: usize,
    /// Viewport updates
    pub viewport_calls: usize,
    /// Clear calls
    pub clears: usize,
    /// Draw calls of either kind
    pub draws: usize,
    /// Mipmap generations
    pub mipmaps_generated: usize,
    /// Deletes of ids that were not live
    pub invalid_deletes: usize,
}

/// Failures to inject into subsequent calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureScript {
    /// Buffer generation returns 0
    pub fail_buffer_create: bool,
    /// Vertex array generation returns 0
    pub fail_vertex_array_create: bool,
    /// Shader object creation returns 0
    pub fail_shader_create: bool,
    /// Program creation returns 0
    pub fail_program_create: bool,
    /// Texture generation returns 0
    pub fail_texture_create: bool,
    /// Linking reports failure
    pub fail_link: bool,
    /// Buffer allocations come up this many bytes short
    pub truncate_uploads_by: usize,
}

/// A recorded draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    /// `draw_arrays`
    Arrays {
        /// Primitive mode
        mode: DrawMode,
        /// First vertex
        first: i32,
        /// Vertex count
        count: i32,
    },
    /// `draw_elements`
    Elements {
        /// Primitive mode
        mode: DrawMode,
        /// Index count
        count: i32,
        /// Index width
        index_type: IndexType,
        /// Byte offset into the element buffer
        offset: usize,
        /// Element buffer bound when the call was made
        element_buffer: ObjectId,
    },
}

/// The most recent level-0 texture upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureUpload {
    /// Texture bound at upload time
    pub texture: ObjectId,
    /// Internal format
    pub internal_format: PixelFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Source pixel layout
    pub format: PixelFormat,
    /// Bytes supplied
    pub bytes: usize,
    /// Unpack alignment in effect
    pub unpack_alignment: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Buffer,
    VertexArray,
    Shader,
    Program,
    Texture,
}

#[derive(Debug, Clone)]
struct ShaderRecord {
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Clone, Default)]
struct ProgramRecord {
    attached: Vec<ObjectId>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
}

#[derive(Debug)]
struct RecordingState {
    next_id: ObjectId,
    counts: CallCounts,
    script: FailureScript,
    live: HashMap<ObjectId, Kind>,
    shaders: HashMap<ObjectId, ShaderRecord>,
    programs: HashMap<ObjectId, ProgramRecord>,
    buffer_sizes: HashMap<ObjectId, i64>,
    array_buffer: ObjectId,
    element_buffers: HashMap<ObjectId, ObjectId>,
    vertex_array: ObjectId,
    program: ObjectId,
    active_unit: u32,
    textures: HashMap<u32, ObjectId>,
    unpack_alignment: i32,
    attributes: HashMap<(ObjectId, u32), VertexAttribute>,
    enabled: HashSet<(ObjectId, u32)>,
    texture_parameters: Vec<(ObjectId, TextureParameter)>,
    last_upload: Option<TextureUpload>,
    uniform_values: Vec<(ObjectId, i32, Vec<f32>)>,
    viewport: Option<(i32, i32, i32, i32)>,
    clear_color: [f32; 4],
    last_clear: Option<ClearFlags>,
    depth_test: bool,
    draws: Vec<DrawCall>,
}

impl Default for RecordingState {
    fn default() -> Self {
        Self {
            next_id: 1,
            counts: CallCounts::default(),
            script: FailureScript::default(),
            live: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffer_sizes: HashMap::new(),
            array_buffer: 0,
            element_buffers: HashMap::new(),
            vertex_array: 0,
            program: 0,
            active_unit: 0,
            textures: HashMap::new(),
            unpack_alignment: 4,
            attributes: HashMap::new(),
            enabled: HashSet::new(),
            texture_parameters: Vec::new(),
            last_upload: None,
            uniform_values: Vec::new(),
            viewport: None,
            clear_color: [0.0; 4],
            last_clear: None,
            depth_test: false,
            draws: Vec::new(),
        }
    }
}

impl RecordingState {
    fn allocate(&mut self, kind: Kind) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id, kind);
        id
    }

    fn release(&mut self, id: ObjectId, kind: Kind) -> bool {
        if id == 0 {
            return false;
        }
        if self.live.get(&id) == Some(&kind) {
            self.live.remove(&id);
            true
        } else {
            self.counts.invalid_deletes += 1;
            false
        }
    }

    fn bound_buffer(&self, target: BufferTarget) -> ObjectId {
        match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => self
                .element_buffers
                .get(&self.vertex_array)
                .copied()
                .unwrap_or(0),
        }
    }
}

/// Headless [`GraphicsDevice`] that records instead of rendering
#[derive(Debug, Default)]
pub struct RecordingDevice {
    state: RefCell<RecordingState>,
}

impl RecordingDevice {
    /// Fresh device with nothing allocated
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to the failure script
    pub fn script(&self) -> RefMut<'_, FailureScript> {
        RefMut::map(self.state.borrow_mut(), |state| &mut state.script)
    }

    /// Snapshot of the call counters
    #[must_use]
    pub fn counts(&self) -> CallCounts {
        self.state.borrow().counts.clone()
    }

    /// Number of objects currently allocated and not yet deleted
    #[must_use]
    pub fn live_objects(&self) -> usize {
        self.state.borrow().live.len()
    }

    /// Whether `id` is a live object
    #[must_use]
    pub fn is_live(&self, id: ObjectId) -> bool {
        self.state.borrow().live.contains_key(&id)
    }

    /// Shader objects attached to `program`
    #[must_use]
    pub fn attached_shaders(&self, program: ObjectId) -> Vec<ObjectId> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|record| record.attached.clone())
            .unwrap_or_default()
    }

    /// Last viewport rectangle set
    #[must_use]
    pub fn viewport_rect(&self) -> Option<(i32, i32, i32, i32)> {
        self.state.borrow().viewport
    }

    /// Last clear color set
    #[must_use]
    pub fn current_clear_color(&self) -> [f32; 4] {
        self.state.borrow().clear_color
    }

    /// Flags of the last clear
    #[must_use]
    pub fn last_clear(&self) -> Option<ClearFlags> {
        self.state.borrow().last_clear
    }

    /// Whether depth testing is enabled
    #[must_use]
    pub fn depth_test_enabled(&self) -> bool {
        self.state.borrow().depth_test
    }

    /// Recorded draw calls in order
    #[must_use]
    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    /// Attribute slot description recorded for `vertex_array`
    #[must_use]
    pub fn attribute(&self, vertex_array: ObjectId, index: u32) -> Option<VertexAttribute> {
        self.state.borrow().attributes.get(&(vertex_array, index)).copied()
    }

    /// Whether slot `index` of `vertex_array` is enabled
    #[must_use]
    pub fn is_attribute_enabled(&self, vertex_array: ObjectId, index: u32) -> bool {
        self.state.borrow().enabled.contains(&(vertex_array, index))
    }

    /// Element buffer recorded in `vertex_array`
    #[must_use]
    pub fn element_buffer_of(&self, vertex_array: ObjectId) -> ObjectId {
        self.state
            .borrow()
            .element_buffers
            .get(&vertex_array)
            .copied()
            .unwrap_or(0)
    }

    /// Parameters set on `texture`, in call order
    #[must_use]
    pub fn texture_parameters(&self, texture: ObjectId) -> Vec<TextureParameter> {
        self.state
            .borrow()
            .texture_parameters
            .iter()
            .filter(|(id, _)| *id == texture)
            .map(|(_, parameter)| *parameter)
            .collect()
    }

    /// Most recent texture upload
    #[must_use]
    pub fn last_texture_upload(&self) -> Option<TextureUpload> {
        self.state.borrow().last_upload
    }

    /// Uniform uploads as `(program, location, values)`; integers are widened to `f32`
    #[must_use]
    pub fn uniform_uploads(&self) -> Vec<(ObjectId, i32, Vec<f32>)> {
        self.state.borrow().uniform_values.clone()
    }
}

fn declared_uniforms(source: &str) -> impl Iterator<Item = String> + '_ {
    source.lines().filter_map(|line| {
        let line = line.trim();
        let rest = line.strip_prefix("uniform ")?;
        let declaration = rest.split(';').next()?;
        let name = declaration.split_whitespace().last()?;
        let name = name.split('[').next().unwrap_or(name);
        Some(name.to_string())
    })
}

impl GraphicsDevice for RecordingDevice {
    fn create_buffer(&self) -> ObjectId {
        let mut state = self.state.borrow_mut();
        if state.script.fail_buffer_create {
            return 0;
        }
        state.counts.buffers_created += 1;
        state.allocate(Kind::Buffer)
    }

    fn delete_buffer(&self, id: ObjectId) {
        let mut state = self.state.borrow_mut();
        if state.release(id, Kind::Buffer) {
            state.counts.buffers_deleted += 1;
            state.buffer_sizes.remove(&id);
            if state.array_buffer == id {
                state.array_buffer = 0;
            }
            state.element_buffers.retain(|_, bound| *bound != id);
        }
    }

    fn bind_buffer(&self, target: BufferTarget, id: ObjectId) {
        let mut state = self.state.borrow_mut();
        match target {
            BufferTarget::Array => state.array_buffer = id,
            BufferTarget::ElementArray => {
                let vertex_array = state.vertex_array;
                state.element_buffers.insert(vertex_array, id);
            }
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], _usage: BufferUsage) {
        let mut state = self.state.borrow_mut();
        let id = state.bound_buffer(target);
        if id == 0 {
            return;
        }
        let size = data.len().saturating_sub(state.script.truncate_uploads_by);
        state.buffer_sizes.insert(id, i64::try_from(size).unwrap_or(i64::MAX));
    }

    fn buffer_size(&self, target: BufferTarget) -> i64 {
        let state = self.state.borrow();
        let id = state.bound_buffer(target);
        state.buffer_sizes.get(&id).copied().unwrap_or(0)
    }

    fn create_vertex_array(&self) -> ObjectId {
        let mut state = self.state.borrow_mut();
        if state.script.fail_vertex_array_create {
            return 0;
        }
        state.counts.vertex_arrays_created += 1;
        state.allocate(Kind::VertexArray)
    }

    fn delete_vertex_array(&self, id: ObjectId) {
        let mut state = self.state.borrow_mut();
        if state.release(id, Kind::VertexArray) {
            state.counts.vertex_arrays_deleted += 1;
            if state.vertex_array == id {
                state.vertex_array = 0;
            }
        }
    }

    fn bind_vertex_array(&self, id: ObjectId) {
        self.state.borrow_mut().vertex_array = id;
    }

    fn vertex_attrib_pointer(&self, attribute: &VertexAttribute) {
        let mut state = self.state.borrow_mut();
        let key = (state.vertex_array, attribute.index);
        state.attributes.insert(key, *attribute);
    }

    fn vertex_attrib_int_pointer(&self, attribute: &VertexAttribute) {
        self.vertex_attrib_pointer(attribute);
    }

    fn enable_vertex_attrib(&self, index: u32) {
        let mut state = self.state.borrow_mut();
        let key = (state.vertex_array, index);
        state.enabled.insert(key);
    }

    fn disable_vertex_attrib(&self, index: u32) {
        let mut state = self.state.borrow_mut();
        let key = (state.vertex_array, index);
        state.enabled.remove(&key);
    }

    fn create_shader(&self, _stage: ShaderStage) -> ObjectId {
        let mut state = self.state.borrow_mut();
        if state.script.fail_shader_create {
            return 0;
        }
        state.counts.shaders_created += 1;
        let id = state.allocate(Kind::Shader);
        state.shaders.insert(
            id,
            ShaderRecord {
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        id
    }

    fn shader_source(&self, shader: ObjectId, source: &str) {
        if let Some(record) = self.state.borrow_mut().shaders.get_mut(&shader) {
            record.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: ObjectId) {
        if let Some(record) = self.state.borrow_mut().shaders.get_mut(&shader) {
            record.compiled = record.source.contains("void main");
            record.log = if record.compiled {
                String::new()
            } else {
                "0:1(1): error: no function with name 'main'".to_string()
            };
        }
    }

    fn shader_compile_status(&self, shader: ObjectId) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|record| record.compiled)
    }

    fn shader_info_log(&self, shader: ObjectId) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|record| record.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: ObjectId) {
        let mut state = self.state.borrow_mut();
        if state.release(shader, Kind::Shader) {
            state.counts.shaders_deleted += 1;
            state.shaders.remove(&shader);
        }
    }

    fn create_program(&self) -> ObjectId {
        let mut state = self.state.borrow_mut();
        if state.script.fail_program_create {
            return 0;
        }
        state.counts.programs_created += 1;
        let id = state.allocate(Kind::Program);
        state.programs.insert(id, ProgramRecord::default());
        id
    }

    fn attach_shader(&self, program: ObjectId, shader: ObjectId) {
        let mut state = self.state.borrow_mut();
        state.counts.attaches += 1;
        if let Some(record) = state.programs.get_mut(&program) {
            record.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: ObjectId, shader: ObjectId) {
        let mut state = self.state.borrow_mut();
        state.counts.detaches += 1;
        if let Some(record) = state.programs.get_mut(&program) {
            record.attached.retain(|attached| *attached != shader);
        }
    }

    fn link_program(&self, program: ObjectId) {
        let mut state = self.state.borrow_mut();
        let Some(attached) = state.programs.get(&program).map(|r| r.attached.clone()) else {
            return;
        };
        let all_compiled = attached
            .iter()
            .all(|id| state.shaders.get(id).is_some_and(|s| s.compiled));
        let linked = all_compiled && !attached.is_empty() && !state.script.fail_link;
        let mut uniforms = Vec::new();
        for id in &attached {
            if let Some(shader) = state.shaders.get(id) {
                for name in declared_uniforms(&shader.source) {
                    if !uniforms.contains(&name) {
                        uniforms.push(name);
                    }
                }
            }
        }
        if let Some(record) = state.programs.get_mut(&program) {
            record.linked = linked;
            record.uniforms = if linked { uniforms } else { Vec::new() };
            record.log = if linked {
                String::new()
            } else {
                "error: linking failed".to_string()
            };
        }
    }

    fn program_link_status(&self, program: ObjectId) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|record| record.linked)
    }

    fn program_info_log(&self, program: ObjectId) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|record| record.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: ObjectId) {
        let mut state = self.state.borrow_mut();
        if state.release(program, Kind::Program) {
            state.counts.programs_deleted += 1;
            state.programs.remove(&program);
            if state.program == program {
                state.program = 0;
            }
        }
    }

    fn use_program(&self, program: ObjectId) {
        self.state.borrow_mut().program = program;
    }

    fn uniform_location(&self, program: ObjectId, name: &str) -> i32 {
        let mut state = self.state.borrow_mut();
        state.counts.uniform_lookups += 1;
        state
            .programs
            .get(&program)
            .and_then(|record| record.uniforms.iter().position(|u| u == name))
            .and_then(|index| i32::try_from(index).ok())
            .unwrap_or(-1)
    }

    #[allow(clippy::cast_precision_loss)]
    fn set_uniform(&self, location: i32, data: UniformData<'_>) {
        let mut state = self.state.borrow_mut();
        state.counts.uniform_uploads += 1;
        let values = match data {
            UniformData::Int { values, .. } => values.iter().map(|v| *v as f32).collect(),
            UniformData::UnsignedInt { values, .. } => values.iter().map(|v| *v as f32).collect(),
            UniformData::Float { values, .. } | UniformData::Matrix { values, .. } => values.to_vec(),
        };
        let program = state.program;
        state.uniform_values.push((program, location, values));
    }

    fn create_texture(&self) -> ObjectId {
        let mut state = self.state.borrow_mut();
        if state.script.fail_texture_create {
            return 0;
        }
        state.counts.textures_created += 1;
        state.allocate(Kind::Texture)
    }

    fn delete_texture(&self, id: ObjectId) {
        let mut state = self.state.borrow_mut();
        if state.release(id, Kind::Texture) {
            state.counts.textures_deleted += 1;
            state.textures.retain(|_, bound| *bound != id);
        }
    }

    fn active_texture(&self, unit: u32) {
        self.state.borrow_mut().active_unit = unit;
    }

    fn bind_texture(&self, id: ObjectId) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        state.textures.insert(unit, id);
    }

    fn texture_parameter(&self, parameter: TextureParameter) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        let texture = state.textures.get(&unit).copied().unwrap_or(0);
        state.texture_parameters.push((texture, parameter));
    }

    fn set_unpack_alignment(&self, alignment: i32) {
        self.state.borrow_mut().unpack_alignment = alignment;
    }

    fn texture_image_2d(
        &self,
        internal_format: PixelFormat,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: &[u8],
    ) {
        let mut state = self.state.borrow_mut();
        let unit = state.active_unit;
        let texture = state.textures.get(&unit).copied().unwrap_or(0);
        state.last_upload = Some(TextureUpload {
            texture,
            internal_format,
            width,
            height,
            format,
            bytes: pixels.len(),
            unpack_alignment: state.unpack_alignment,
        });
    }

    fn generate_mipmap(&self) {
        self.state.borrow_mut().counts.mipmaps_generated += 1;
    }

    fn get_integer(&self, binding: Binding) -> i32 {
        let state = self.state.borrow();
        let id = match binding {
            Binding::ArrayBuffer => state.array_buffer,
            Binding::ElementArrayBuffer => state.bound_buffer(BufferTarget::ElementArray),
            Binding::VertexArray => state.vertex_array,
            Binding::Program => state.program,
            Binding::Texture2d => state.textures.get(&state.active_unit).copied().unwrap_or(0),
            Binding::UnpackAlignment => return state.unpack_alignment,
        };
        i32::try_from(id).unwrap_or(-1)
    }

    fn get_string(&self, name: DeviceString) -> Option<String> {
        let value = match name {
            DeviceString::Vendor => "glkit",
            DeviceString::Renderer => "recording device",
            DeviceString::Version => "3.3 (recording)",
            DeviceString::ShadingLanguageVersion => "3.30",
        };
        Some(value.to_string())
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        let mut state = self.state.borrow_mut();
        state.counts.viewport_calls += 1;
        state.viewport = Some((x, y, width, height));
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.state.borrow_mut().clear_color = [r, g, b, a];
    }

    fn clear(&self, flags: ClearFlags) {
        let mut state = self.state.borrow_mut();
        state.counts.clears += 1;
        state.last_clear = Some(flags);
    }

    fn set_depth_test(&self, enabled: bool) {
        self.state.borrow_mut().depth_test = enabled;
    }

    fn draw_arrays(&self, mode: DrawMode, first: i32, count: i32) {
        let mut state = self.state.borrow_mut();
        state.counts.draws += 1;
        state.draws.push(DrawCall::Arrays { mode, first, count });
    }

    fn draw_elements(&self, mode: DrawMode, count: i32, index_type: IndexType, offset: usize) {
        let mut state = self.state.borrow_mut();
        state.counts.draws += 1;
        let element_buffer = state.bound_buffer(BufferTarget::ElementArray);
        state.draws.push(DrawCall::Elements {
            mode,
            count,
            index_type,
            offset,
            element_buffer,
        });
    }
}
