//! Debug-time state verification
//!
//! Resource operations that depend on the right object being bound (uniform
//! upload, attribute description) or on the driver honouring an allocation
//! ask a [`StateVerifier`] first. Debug builds query the device; release
//! builds skip the round trips.

use std::rc::Rc;

use super::{Binding, BufferTarget, GraphicsDevice, ObjectId};

/// Strategy for checking device state before dependent operations
pub trait StateVerifier {
    /// Whether the device reports `expected` for `binding`
    fn is_bound(&self, device: &dyn GraphicsDevice, binding: Binding, expected: ObjectId) -> bool;

    /// Whether the device reports any object for `binding`
    fn has_binding(&self, device: &dyn GraphicsDevice, binding: Binding) -> bool;

    /// Whether the buffer bound to `target` holds exactly `expected` bytes
    fn upload_size_matches(
        &self,
        device: &dyn GraphicsDevice,
        target: BufferTarget,
        expected: usize,
    ) -> bool;
}

/// Queries the device for every check
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryVerifier;

impl StateVerifier for QueryVerifier {
    fn is_bound(&self, device: &dyn GraphicsDevice, binding: Binding, expected: ObjectId) -> bool {
        u32::try_from(device.get_integer(binding)).is_ok_and(|bound| bound == expected)
    }

    fn has_binding(&self, device: &dyn GraphicsDevice, binding: Binding) -> bool {
        device.get_integer(binding) != 0
    }

    fn upload_size_matches(
        &self,
        device: &dyn GraphicsDevice,
        target: BufferTarget,
        expected: usize,
    ) -> bool {
        usize::try_from(device.buffer_size(target)).is_ok_and(|size| size == expected)
    }
}

/// Trusts the caller; every check passes
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipVerifier;

impl StateVerifier for SkipVerifier {
    fn is_bound(&self, _: &dyn GraphicsDevice, _: Binding, _: ObjectId) -> bool {
        true
    }

    fn has_binding(&self, _: &dyn GraphicsDevice, _: Binding) -> bool {
        true
    }

    fn upload_size_matches(&self, _: &dyn GraphicsDevice, _: BufferTarget, _: usize) -> bool {
        true
    }
}

/// [`QueryVerifier`] in debug builds, [`SkipVerifier`] otherwise
#[must_use]
pub fn default_verifier() -> Rc<dyn StateVerifier> {
    if cfg!(debug_assertions) {
        Rc::new(QueryVerifier)
    } else {
        Rc::new(SkipVerifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::device::RecordingDevice;

    #[test]
    fn test_query_verifier_reads_bindings() {
        let device = RecordingDevice::new();
        let program = device.create_program();
        assert!(!QueryVerifier.is_bound(&device, Binding::Program, program));

        device.use_program(program);
        assert!(QueryVerifier.is_bound(&device, Binding::Program, program));
        assert!(SkipVerifier.is_bound(&device, Binding::Program, program + 1));
        assert!(QueryVerifier.has_binding(&device, Binding::Program));
        assert!(!QueryVerifier.has_binding(&device, Binding::ArrayBuffer));
        assert!(SkipVerifier.has_binding(&device, Binding::ArrayBuffer));
    }

    #[test]
    fn test_query_verifier_detects_short_upload() {
        let device = RecordingDevice::new();
        device.script().truncate_uploads_by = 4;
        let buffer = device.create_buffer();
        device.bind_buffer(BufferTarget::Array, buffer);
        device.buffer_data(BufferTarget::Array, &[0u8; 16], crate::render::BufferUsage::StaticDraw);

        assert!(!QueryVerifier.upload_size_matches(&device, BufferTarget::Array, 16));
        assert!(QueryVerifier.upload_size_matches(&device, BufferTarget::Array, 12));
        assert!(SkipVerifier.upload_size_matches(&device, BufferTarget::Array, 16));
    }
}
