//! Vertex array resource

use std::cell::Cell;

use thiserror::Error;

use super::device::{Binding, DeviceContext, ObjectId};
use super::handle::{ObjectKind, OwnedHandle};
use super::layout::VertexAttribute;
use super::result::ResourceError;
use crate::platform::Platform;

/// Vertex array construction failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexArrayError {
    /// The platform has no usable graphics context
    #[error("graphics backend not ready")]
    BackendNotReady,

    /// The device refused to generate a vertex array
    #[error("vertex array generation failed")]
    GenFailed,
}

impl ResourceError for VertexArrayError {
    const RESOURCE: &'static str = "vertex array";
}

/// Owning handle to a vertex array object
///
/// Attribute calls act on whatever array is bound, so every one of them
/// first checks that this array is the bound one (and, for slot
/// descriptions, that some array buffer is bound) and does nothing when it
/// is not.
#[derive(Debug)]
pub struct VertexArray {
    handle: OwnedHandle,
    enabled: Cell<u32>,
}

impl Default for VertexArray {
    fn default() -> Self {
        Self {
            handle: OwnedHandle::empty(ObjectKind::VertexArray),
            enabled: Cell::new(0),
        }
    }
}

impl VertexArray {
    /// Generate an empty vertex array
    pub fn try_new(platform: &Platform) -> Result<Self, VertexArrayError> {
        let context = platform
            .require_device()
            .map_err(|_| VertexArrayError::BackendNotReady)?;
        let id = context.device().create_vertex_array();
        if id == 0 {
            log::error!("Failed to generate vertex array");
            return Err(VertexArrayError::GenFailed);
        }
        Ok(Self {
            handle: OwnedHandle::new(context, ObjectKind::VertexArray, id),
            enabled: Cell::new(0),
        })
    }

    /// Native array id; 0 when the handle owns nothing
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.handle.id()
    }

    /// Whether this handle owns an array
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    /// Bind this array
    pub fn bind(&self) {
        if let Some(context) = self.handle.context() {
            context.device().bind_vertex_array(self.id());
        }
    }

    /// Bind no array
    pub fn unbind(&self) {
        if let Some(context) = self.handle.context() {
            context.device().bind_vertex_array(0);
        }
    }

    /// Whether slot `index` was enabled through this handle
    #[must_use]
    pub fn is_attrib_enabled(&self, index: u32) -> bool {
        index < u32::BITS && self.enabled.get() & (1 << index) != 0
    }

    fn checked(&self, needs_buffer: bool, operation: &str) -> Option<&DeviceContext> {
        let context = self.handle.context()?;
        if !context.is_bound(Binding::VertexArray, self.id()) {
            log::error!(
                "Vertex array {} must be bound before {}",
                self.id(),
                operation
            );
            return None;
        }
        if needs_buffer && !context.has_binding(Binding::ArrayBuffer) {
            log::error!("An array buffer must be bound before {}", operation);
            return None;
        }
        Some(context)
    }

    /// Describe a float attribute slot from the bound array buffer
    ///
    /// Integer component types are converted to float, scaled when
    /// `attribute.normalized` is set.
    pub fn attrib_pointer(&self, attribute: &VertexAttribute) -> bool {
        let Some(context) = self.checked(true, "describing an attribute") else {
            return false;
        };
        context.device().vertex_attrib_pointer(attribute);
        true
    }

    /// Describe an integer attribute slot from the bound array buffer
    pub fn attrib_pointer_int(&self, attribute: &VertexAttribute) -> bool {
        if !attribute.component_type.is_integer() {
            log::error!(
                "Integer attribute {} needs an integer component type, got {:?}",
                attribute.index,
                attribute.component_type
            );
            return false;
        }
        let Some(context) = self.checked(true, "describing an attribute") else {
            return false;
        };
        context.device().vertex_attrib_int_pointer(attribute);
        true
    }

    /// Describe a float attribute slot and enable it
    pub fn attrib_pointer_and_enable(&self, attribute: &VertexAttribute) -> bool {
        self.attrib_pointer(attribute) && self.enable_attrib(attribute.index)
    }

    /// Enable an attribute slot
    pub fn enable_attrib(&self, index: u32) -> bool {
        let Some(context) = self.checked(false, "enabling an attribute") else {
            return false;
        };
        context.device().enable_vertex_attrib(index);
        if index < u32::BITS {
            self.enabled.set(self.enabled.get() | (1 << index));
        }
        true
    }

    /// Disable an attribute slot
    pub fn disable_attrib(&self, index: u32) -> bool {
        let Some(context) = self.checked(false, "disabling an attribute") else {
            return false;
        };
        context.device().disable_vertex_attrib(index);
        if index < u32::BITS {
            self.enabled.set(self.enabled.get() & !(1 << index));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::config::WindowOptions;
    use crate::render::device::{BufferUsage, ComponentType, RecordingDevice, SkipVerifier};
    use crate::render::{VertexBuffer, Window};

    fn setup() -> (Platform, Rc<RecordingDevice>, Window) {
        let (platform, _probe, device) = Platform::headless();
        let window = Window::try_new(&platform, 64, 64, "t", WindowOptions::default()).unwrap();
        (platform, device, window)
    }

    fn position() -> VertexAttribute {
        VertexAttribute::new(0, 3, ComponentType::Float, false, 12, 0)
    }

    #[test]
    fn test_describe_requires_bound_array_and_buffer() {
        let (platform, device, _window) = setup();
        let vao = VertexArray::try_new(&platform).unwrap();
        let vbo = VertexBuffer::try_new(&platform, &[0u8; 36], BufferUsage::StaticDraw).unwrap();

        assert!(!vao.attrib_pointer_and_enable(&position()));
        vao.bind();
        assert!(!vao.attrib_pointer(&position()));
        vbo.bind();
        assert!(vao.attrib_pointer_and_enable(&position()));

        assert_eq!(device.attribute(vao.id(), 0), Some(position()));
        assert!(device.is_attribute_enabled(vao.id(), 0));
        assert!(vao.is_attrib_enabled(0));

        assert!(vao.disable_attrib(0));
        assert!(!vao.is_attrib_enabled(0));
        assert!(!device.is_attribute_enabled(vao.id(), 0));
    }

    #[test]
    fn test_integer_path_rejects_float_components() {
        let (platform, device, _window) = setup();
        let vao = VertexArray::try_new(&platform).unwrap();
        let vbo = VertexBuffer::try_new(&platform, &[0u8; 16], BufferUsage::StaticDraw).unwrap();
        vao.bind();
        vbo.bind();

        assert!(!vao.attrib_pointer_int(&position()));
        let material = VertexAttribute::new(1, 1, ComponentType::UnsignedInt, false, 4, 0);
        assert!(vao.attrib_pointer_int(&material));
        assert_eq!(device.attribute(vao.id(), 1), Some(material));
    }

    #[test]
    fn test_skip_verifier_trusts_caller() {
        let backend = crate::platform::HeadlessBackend::new();
        let device = Rc::new(RecordingDevice::new());
        let platform = Platform::new(Box::new(backend), device.clone(), Rc::new(SkipVerifier));
        let _window = Window::try_new(&platform, 8, 8, "t", WindowOptions::default()).unwrap();

        let vao = VertexArray::try_new(&platform).unwrap();
        assert!(vao.enable_attrib(2));
        assert!(device.is_attribute_enabled(0, 2));
        assert!(vao.attrib_pointer(&position()));
    }

    #[test]
    fn test_generation_failure() {
        let (platform, device, _window) = setup();
        device.script().fail_vertex_array_create = true;
        assert_eq!(
            VertexArray::try_new(&platform).unwrap_err(),
            VertexArrayError::GenFailed
        );
    }
}
