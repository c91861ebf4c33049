//! GPU buffer resource.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::backend::{GpuBackend, GpuBuffer};
use crate::error::GraphicsError;
use crate::types::BufferDescriptor;

/// A GPU buffer resource.
///
/// Buffers are created by [`Mesh::register_buffer`](crate::Mesh::register_buffer)
/// and owned by that mesh. The backend storage is released when the buffer is
/// dropped, which happens when the owning mesh is dropped.
///
/// # Example
///
/// ```ignore
/// let handle = mesh.register_buffer(BufferLayout::Interleaved)?;
/// let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
/// mesh.buffer(handle).unwrap().set_data(&positions);
/// ```
pub struct Buffer {
    backend: Arc<dyn GpuBackend>,
    raw: GpuBuffer,
    descriptor: BufferDescriptor,
    size: AtomicU64,
}

impl Buffer {
    /// Create a new buffer on `backend` (called by Mesh).
    pub(crate) fn new(
        backend: Arc<dyn GpuBackend>,
        descriptor: BufferDescriptor,
    ) -> Result<Self, GraphicsError> {
        let raw = backend.create_buffer(&descriptor)?;
        let size = AtomicU64::new(descriptor.size);
        Ok(Self {
            backend,
            raw,
            descriptor,
            size,
        })
    }

    /// Get the backend name of this buffer.
    pub fn raw(&self) -> GpuBuffer {
        self.raw
    }

    /// Get the buffer descriptor.
    pub fn descriptor(&self) -> &BufferDescriptor {
        &self.descriptor
    }

    /// Get the current size in bytes (the size of the last upload).
    pub fn size(&self) -> u64 {
        self.size.load(Ordering::Relaxed)
    }

    /// Get the buffer label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }

    /// Replace the buffer contents with `data`.
    pub fn set_data<T: bytemuck::Pod>(&self, data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.backend.write_buffer(self.raw, bytes);
        self.size.store(bytes.len() as u64, Ordering::Relaxed);
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.backend.destroy_buffer(self.raw);
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("raw", &self.raw)
            .field("size", &self.size())
            .field("usage", &self.descriptor.usage)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

// Ensure Buffer is Send + Sync
static_assertions::assert_impl_all!(Buffer: Send, Sync);

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backend::dummy::DummyBackend;

    #[test]
    fn test_buffer_debug() {
        let backend = Arc::new(DummyBackend::new());
        let buffer = Buffer::new(backend, BufferDescriptor::vertex().with_label("colors")).unwrap();
        let debug = format!("{:?}", buffer);
        assert!(debug.contains("Buffer"));
        assert!(debug.contains("colors"));
    }

    #[test]
    fn test_set_data_tracks_size() {
        let backend = Arc::new(DummyBackend::new());
        let buffer = Buffer::new(backend.clone(), BufferDescriptor::vertex()).unwrap();
        assert_eq!(buffer.size(), 0);

        buffer.set_data(&[[0.5f32; 3]; 4]);
        assert_eq!(buffer.size(), 48);
        assert_eq!(backend.buffer_size(buffer.raw()), Some(48));
    }

    #[test]
    fn test_drop_releases_storage() {
        let backend = Arc::new(DummyBackend::new());
        let buffer = Buffer::new(backend.clone(), BufferDescriptor::vertex()).unwrap();
        assert_eq!(backend.live_buffer_count(), 1);
        drop(buffer);
        assert_eq!(backend.live_buffer_count(), 0);
    }

    #[test]
    fn test_creation_failure_propagates() {
        let backend = Arc::new(DummyBackend::new().with_buffer_limit(0));
        let result = Buffer::new(backend, BufferDescriptor::vertex());
        assert!(matches!(result, Err(GraphicsError::OutOfMemory)));
    }
}
