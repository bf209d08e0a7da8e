//! Vertex and element buffer resources
//!
//! Both buffer kinds allocate one native buffer, upload an initial payload
//! and check that the device really holds the requested number of bytes.
//! Uploads restore whatever buffer (and, for element buffers, vertex array)
//! was bound before.

use thiserror::Error;

use super::device::{Binding, BufferTarget, BufferUsage, DeviceContext, IndexType, ObjectId};
use super::handle::{ObjectKind, OwnedHandle};
use super::result::ResourceError;
use crate::platform::Platform;

/// Vertex buffer construction failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexBufferError {
    /// Empty payload
    #[error("invalid vertex buffer parameters")]
    InvalidParams,

    /// The platform has no usable graphics context
    #[error("graphics backend not ready")]
    BackendNotReady,

    /// The device refused to generate a buffer
    #[error("buffer generation failed")]
    GenFailed,

    /// The device holds fewer bytes than were uploaded
    #[error("buffer allocation failed")]
    AllocFailed,
}

impl ResourceError for VertexBufferError {
    const RESOURCE: &'static str = "vertex buffer";
}

/// Element buffer construction failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementBufferError {
    /// Empty payload, or a byte size that is not a multiple of the index width
    #[error("invalid element buffer parameters")]
    InvalidParams,

    /// The platform has no usable graphics context
    #[error("graphics backend not ready")]
    BackendNotReady,

    /// The device refused to generate a buffer
    #[error("buffer generation failed")]
    GenFailed,

    /// The device holds fewer bytes than were uploaded
    #[error("buffer allocation failed")]
    AllocFailed,
}

impl ResourceError for ElementBufferError {
    const RESOURCE: &'static str = "element buffer";
}

/// Unsigned integer types usable as indices
pub trait IndexElement: bytemuck::Pod {
    /// Matching index width
    const TYPE: IndexType;
}

impl IndexElement for u8 {
    const TYPE: IndexType = IndexType::U8;
}

impl IndexElement for u16 {
    const TYPE: IndexType = IndexType::U16;
}

impl IndexElement for u32 {
    const TYPE: IndexType = IndexType::U32;
}

/// Upload `data` into the buffer bound at `target`; false when the size check fails
fn upload(context: &DeviceContext, target: BufferTarget, data: &[u8], usage: BufferUsage) -> bool {
    context.device().buffer_data(target, data, usage);
    let ok = context.upload_size_matches(target, data.len());
    if !ok {
        log::error!(
            "Buffer upload of {} bytes was not fully allocated",
            data.len()
        );
    }
    ok
}

fn previous(context: &DeviceContext, binding: Binding) -> ObjectId {
    u32::try_from(context.device().get_integer(binding)).unwrap_or(0)
}

/// Owning handle to a vertex buffer
#[derive(Debug)]
pub struct VertexBuffer {
    handle: OwnedHandle,
    size: usize,
    usage: BufferUsage,
}

impl Default for VertexBuffer {
    fn default() -> Self {
        Self {
            handle: OwnedHandle::empty(ObjectKind::Buffer),
            size: 0,
            usage: BufferUsage::default(),
        }
    }
}

impl VertexBuffer {
    /// Allocate a buffer holding `data`
    pub fn try_new(
        platform: &Platform,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<Self, VertexBufferError> {
        if data.is_empty() {
            log::error!("Vertex buffer payload must not be empty");
            return Err(VertexBufferError::InvalidParams);
        }
        let context = platform
            .require_device()
            .map_err(|_| VertexBufferError::BackendNotReady)?;

        let device = context.device();
        let id = device.create_buffer();
        if id == 0 {
            log::error!("Failed to generate vertex buffer");
            return Err(VertexBufferError::GenFailed);
        }
        let handle = OwnedHandle::new(context.clone(), ObjectKind::Buffer, id);

        let prior = previous(&context, Binding::ArrayBuffer);
        device.bind_buffer(BufferTarget::Array, id);
        let ok = upload(&context, BufferTarget::Array, data, usage);
        device.bind_buffer(BufferTarget::Array, prior);
        if !ok {
            return Err(VertexBufferError::AllocFailed);
        }

        Ok(Self {
            handle,
            size: data.len(),
            usage,
        })
    }

    /// Allocate a buffer holding a slice of plain-old-data vertices
    pub fn try_from_slice<T: bytemuck::Pod>(
        platform: &Platform,
        vertices: &[T],
        usage: BufferUsage,
    ) -> Result<Self, VertexBufferError> {
        Self::try_new(platform, bytemuck::cast_slice(vertices), usage)
    }

    /// Native buffer id; 0 when the handle owns nothing
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.handle.id()
    }

    /// Whether this handle owns a buffer
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    /// Payload size in bytes
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Usage hint of the current payload
    #[must_use]
    pub const fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Bind to the array buffer target
    pub fn bind(&self) {
        if let Some(context) = self.handle.context() {
            context.device().bind_buffer(BufferTarget::Array, self.id());
        }
    }

    /// Clear the array buffer binding
    pub fn unbind(&self) {
        if let Some(context) = self.handle.context() {
            context.device().bind_buffer(BufferTarget::Array, 0);
        }
    }

    /// Replace the payload, keeping the buffer object
    pub fn set_data(&mut self, data: &[u8], usage: BufferUsage) -> Result<(), VertexBufferError> {
        if data.is_empty() {
            return Err(VertexBufferError::InvalidParams);
        }
        let Some(context) = self.handle.context() else {
            return Err(VertexBufferError::InvalidParams);
        };
        let prior = previous(context, Binding::ArrayBuffer);
        context.device().bind_buffer(BufferTarget::Array, self.id());
        let ok = upload(context, BufferTarget::Array, data, usage);
        context.device().bind_buffer(BufferTarget::Array, prior);
        if !ok {
            return Err(VertexBufferError::AllocFailed);
        }
        self.size = data.len();
        self.usage = usage;
        Ok(())
    }
}

/// Owning handle to an element (index) buffer
///
/// The element count is always derived from the byte size and index width.
#[derive(Debug)]
pub struct ElementBuffer {
    handle: OwnedHandle,
    size: usize,
    usage: BufferUsage,
    index_type: IndexType,
}

impl Default for ElementBuffer {
    fn default() -> Self {
        Self {
            handle: OwnedHandle::empty(ObjectKind::Buffer),
            size: 0,
            usage: BufferUsage::default(),
            index_type: IndexType::U32,
        }
    }
}

fn validate_indices(bytes: &[u8], index_type: IndexType) -> Result<(), ElementBufferError> {
    if bytes.is_empty() || bytes.len() % index_type.size_bytes() != 0 {
        log::error!(
            "Element buffer of {} bytes does not hold whole {:?} indices",
            bytes.len(),
            index_type
        );
        return Err(ElementBufferError::InvalidParams);
    }
    Ok(())
}

/// Upload into `id` without disturbing the bound vertex array's element binding
fn upload_indices(context: &DeviceContext, id: ObjectId, bytes: &[u8], usage: BufferUsage) -> bool {
    let device = context.device();
    let prior_array = previous(context, Binding::VertexArray);
    device.bind_vertex_array(0);
    let prior_buffer = previous(context, Binding::ElementArrayBuffer);
    device.bind_buffer(BufferTarget::ElementArray, id);
    let ok = upload(context, BufferTarget::ElementArray, bytes, usage);
    device.bind_buffer(BufferTarget::ElementArray, prior_buffer);
    device.bind_vertex_array(prior_array);
    ok
}

impl ElementBuffer {
    /// Allocate a buffer holding `indices`; the index width follows `I`
    pub fn try_new<I: IndexElement>(
        platform: &Platform,
        indices: &[I],
        usage: BufferUsage,
    ) -> Result<Self, ElementBufferError> {
        Self::try_from_bytes(platform, bytemuck::cast_slice(indices), I::TYPE, usage)
    }

    /// Allocate a buffer from raw bytes interpreted as `index_type` indices
    pub fn try_from_bytes(
        platform: &Platform,
        bytes: &[u8],
        index_type: IndexType,
        usage: BufferUsage,
    ) -> Result<Self, ElementBufferError> {
        validate_indices(bytes, index_type)?;
        let context = platform
            .require_device()
            .map_err(|_| ElementBufferError::BackendNotReady)?;

        let id = context.device().create_buffer();
        if id == 0 {
            log::error!("Failed to generate element buffer");
            return Err(ElementBufferError::GenFailed);
        }
        let handle = OwnedHandle::new(context.clone(), ObjectKind::Buffer, id);

        if !upload_indices(&context, id, bytes, usage) {
            return Err(ElementBufferError::AllocFailed);
        }

        Ok(Self {
            handle,
            size: bytes.len(),
            usage,
            index_type,
        })
    }

    /// Native buffer id; 0 when the handle owns nothing
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.handle.id()
    }

    /// Whether this handle owns a buffer
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    /// Payload size in bytes
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Usage hint of the current payload
    #[must_use]
    pub const fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Index width
    #[must_use]
    pub const fn index_type(&self) -> IndexType {
        self.index_type
    }

    /// Number of indices
    #[must_use]
    pub const fn count(&self) -> usize {
        self.size / self.index_type.size_bytes()
    }

    /// Bind to the element target, recording it in the bound vertex array
    pub fn bind(&self) {
        if let Some(context) = self.handle.context() {
            context.device().bind_buffer(BufferTarget::ElementArray, self.id());
        }
    }

    /// Clear the element binding of the bound vertex array
    pub fn unbind(&self) {
        if let Some(context) = self.handle.context() {
            context.device().bind_buffer(BufferTarget::ElementArray, 0);
        }
    }

    /// Replace the payload; the index width follows `I`
    pub fn set_data<I: IndexElement>(
        &mut self,
        indices: &[I],
        usage: BufferUsage,
    ) -> Result<(), ElementBufferError> {
        self.set_bytes(bytemuck::cast_slice(indices), I::TYPE, usage)
    }

    /// Replace the payload from raw bytes interpreted as `index_type` indices
    pub fn set_bytes(
        &mut self,
        bytes: &[u8],
        index_type: IndexType,
        usage: BufferUsage,
    ) -> Result<(), ElementBufferError> {
        validate_indices(bytes, index_type)?;
        let Some(context) = self.handle.context() else {
            return Err(ElementBufferError::InvalidParams);
        };
        if !upload_indices(context, self.id(), bytes, usage) {
            return Err(ElementBufferError::AllocFailed);
        }
        self.size = bytes.len();
        self.index_type = index_type;
        self.usage = usage;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowOptions;
    use crate::render::device::{GraphicsDevice, RecordingDevice};
    use crate::render::Window;
    use std::rc::Rc;

    fn setup() -> (Platform, Rc<RecordingDevice>, Window) {
        let (platform, _probe, device) = Platform::headless();
        let window = Window::try_new(&platform, 64, 64, "t", WindowOptions::default()).unwrap();
        (platform, device, window)
    }

    #[test]
    fn test_vertex_upload_restores_binding() {
        let (platform, device, _window) = setup();
        let other = device.create_buffer();
        device.bind_buffer(BufferTarget::Array, other);

        let vbo = VertexBuffer::try_from_slice(&platform, &[0.0f32; 9], BufferUsage::StaticDraw)
            .unwrap();
        assert_eq!(vbo.size(), 36);
        assert_eq!(device.get_integer(Binding::ArrayBuffer), other as i32);

        vbo.bind();
        assert_eq!(device.get_integer(Binding::ArrayBuffer), vbo.id() as i32);
        assert_eq!(device.buffer_size(BufferTarget::Array), 36);
    }

    #[test]
    fn test_short_allocation_fails_and_releases() {
        let (platform, device, _window) = setup();
        device.script().truncate_uploads_by = 8;

        let result = VertexBuffer::try_new(&platform, &[1u8; 64], BufferUsage::DynamicDraw);
        assert_eq!(result.unwrap_err(), VertexBufferError::AllocFailed);
        let counts = device.counts();
        assert_eq!(counts.buffers_created, 1);
        assert_eq!(counts.buffers_deleted, 1);
    }

    #[test]
    fn test_generation_failure() {
        let (platform, device, _window) = setup();
        device.script().fail_buffer_create = true;
        assert_eq!(
            VertexBuffer::try_new(&platform, &[1u8; 4], BufferUsage::StaticDraw).unwrap_err(),
            VertexBufferError::GenFailed
        );
        assert_eq!(
            ElementBuffer::try_new(&platform, &[0u16, 1, 2], BufferUsage::StaticDraw).unwrap_err(),
            ElementBufferError::GenFailed
        );
    }

    #[test]
    fn test_element_count_follows_index_width() {
        let (platform, _device, _window) = setup();
        let mut ebo = ElementBuffer::try_new(&platform, &[0u16, 1, 2, 2, 3, 0], BufferUsage::StaticDraw)
            .unwrap();
        assert_eq!(ebo.index_type(), IndexType::U16);
        assert_eq!(ebo.size(), 12);
        assert_eq!(ebo.count(), 6);

        ebo.set_data(&[0u32, 1, 2], BufferUsage::DynamicDraw).unwrap();
        assert_eq!(ebo.index_type(), IndexType::U32);
        assert_eq!(ebo.count(), 3);

        ebo.set_data(&[7u8; 5], BufferUsage::DynamicDraw).unwrap();
        assert_eq!(ebo.count(), 5);
    }

    #[test]
    fn test_non_multiple_byte_size_is_rejected() {
        let (platform, device, _window) = setup();
        for (len, index_type) in [(3, IndexType::U16), (6, IndexType::U32), (0, IndexType::U8)] {
            let bytes = vec![0u8; len];
            assert_eq!(
                ElementBuffer::try_from_bytes(&platform, &bytes, index_type, BufferUsage::StaticDraw)
                    .unwrap_err(),
                ElementBufferError::InvalidParams
            );
        }
        assert_eq!(device.counts().buffers_created, 0);

        let mut ebo =
            ElementBuffer::try_from_bytes(&platform, &[0u8; 8], IndexType::U32, BufferUsage::StaticDraw)
                .unwrap();
        assert_eq!(ebo.count(), 2);
        assert_eq!(
            ebo.set_bytes(&[0u8; 7], IndexType::U16, BufferUsage::StaticDraw),
            Err(ElementBufferError::InvalidParams)
        );
        assert_eq!(ebo.count(), 2);
    }

    #[test]
    fn test_element_upload_leaves_vertex_array_binding_alone() {
        let (platform, device, _window) = setup();
        let vao = device.create_vertex_array();
        let recorded = device.create_buffer();
        device.bind_vertex_array(vao);
        device.bind_buffer(BufferTarget::ElementArray, recorded);

        let ebo = ElementBuffer::try_new(&platform, &[0u32, 1, 2], BufferUsage::StaticDraw).unwrap();
        assert_eq!(device.get_integer(Binding::VertexArray), vao as i32);
        assert_eq!(device.element_buffer_of(vao), recorded);
        assert_eq!(device.element_buffer_of(0), 0);
        assert!(ebo.is_valid());
    }
}
