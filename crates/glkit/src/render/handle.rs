//! Exclusive ownership of native graphics objects
//!
//! An [`OwnedHandle`] pairs a device object id with the device that created
//! it. Dropping the handle deletes the object exactly once. Taking the value
//! out with [`std::mem::take`] leaves a non-owning handle (id 0) behind,
//! whose drop does nothing.
//!
//! A handle remembers the context generation it was created in. Once the
//! last window closes the functions are gone and ids may be handed out
//! again, so a handle from an older generation is abandoned instead of
//! deleted.

use super::device::{DeviceContext, ObjectId};

/// Category of native object, selecting the matching delete call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Vertex or element buffer
    Buffer,
    /// Vertex array
    VertexArray,
    /// Linked shader program
    Program,
    /// 2D texture
    Texture,
}

/// Owning wrapper around one native object id
#[derive(Debug)]
pub(crate) struct OwnedHandle {
    id: ObjectId,
    kind: ObjectKind,
    generation: u64,
    context: Option<DeviceContext>,
}

impl OwnedHandle {
    /// Take ownership of `id`
    pub(crate) fn new(context: DeviceContext, kind: ObjectKind, id: ObjectId) -> Self {
        Self {
            id,
            kind,
            generation: context.generation(),
            context: Some(context),
        }
    }

    /// Non-owning handle
    pub(crate) const fn empty(kind: ObjectKind) -> Self {
        Self {
            id: 0,
            kind,
            generation: 0,
            context: None,
        }
    }

    pub(crate) const fn id(&self) -> ObjectId {
        self.id
    }

    pub(crate) const fn is_valid(&self) -> bool {
        self.id != 0
    }

    /// Device context, present for owning handles of the current generation only
    pub(crate) fn context(&self) -> Option<&DeviceContext> {
        self.context
            .as_ref()
            .filter(|context| self.id != 0 && context.generation() == self.generation)
    }

    /// Delete the object now; later calls and the eventual drop are no-ops
    pub(crate) fn release(&mut self) {
        let id = std::mem::take(&mut self.id);
        let Some(context) = self.context.take() else {
            return;
        };
        if id == 0 {
            return;
        }
        if context.generation() != self.generation {
            log::warn!(
                "{:?} {} outlived its graphics context; skipping delete",
                self.kind,
                id
            );
            return;
        }
        let device = context.device();
        match self.kind {
            ObjectKind::Buffer => device.delete_buffer(id),
            ObjectKind::VertexArray => device.delete_vertex_array(id),
            ObjectKind::Program => device.delete_program(id),
            ObjectKind::Texture => device.delete_texture(id),
        }
        log::trace!("released {:?} {}", self.kind, id);
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::render::device::{GraphicsDevice, RecordingDevice, SkipVerifier};

    fn context(device: &Rc<RecordingDevice>) -> DeviceContext {
        DeviceContext::new(device.clone(), Rc::new(SkipVerifier))
    }

    #[test]
    fn test_drop_releases_once() {
        let device = Rc::new(RecordingDevice::new());
        let id = device.create_buffer();
        {
            let mut handle = OwnedHandle::new(context(&device), ObjectKind::Buffer, id);
            handle.release();
            assert!(!handle.is_valid());
        }
        let counts = device.counts();
        assert_eq!(counts.buffers_deleted, 1);
        assert_eq!(counts.invalid_deletes, 0);
    }

    #[test]
    fn test_take_leaves_empty_handle() {
        let device = Rc::new(RecordingDevice::new());
        let id = device.create_texture();
        let mut source = OwnedHandle::new(context(&device), ObjectKind::Texture, id);
        let destination = std::mem::replace(&mut source, OwnedHandle::empty(ObjectKind::Texture));

        assert_eq!(source.id(), 0);
        assert_eq!(destination.id(), id);
        drop(source);
        assert!(device.is_live(id));
        drop(destination);
        assert!(!device.is_live(id));
        assert_eq!(device.counts().textures_deleted, 1);
    }

    #[test]
    fn test_stale_generation_is_not_deleted() {
        let device = Rc::new(RecordingDevice::new());
        let context = context(&device);
        let id = device.create_program();
        let handle = OwnedHandle::new(context.clone(), ObjectKind::Program, id);
        assert!(handle.context().is_some());

        context.invalidate();
        assert!(handle.context().is_none());
        drop(handle);
        assert_eq!(device.counts().programs_deleted, 0);

        let fresh = OwnedHandle::new(context, ObjectKind::Program, device.create_program());
        drop(fresh);
        assert_eq!(device.counts().programs_deleted, 1);
    }
}
