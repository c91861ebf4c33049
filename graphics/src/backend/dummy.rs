//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't perform actual GPU operations. It hands out buffer
//! and vertex stream names, keeps track of which ones are alive, and records
//! every command it receives so tests can inspect what a mesh submitted.

use std::collections::HashMap;

use parking_lot::Mutex;
use strata_core::mesh::PrimitiveTopology;

use crate::error::GraphicsError;
use crate::types::{BufferDescriptor, RasterizerState};

use super::{AttributeBinding, GpuBackend, GpuBuffer, GpuVertexStream};

/// A command received by the [`DummyBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    /// A buffer was created.
    CreateBuffer {
        /// Name given to the new buffer.
        buffer: GpuBuffer,
        /// Debug label from the descriptor.
        label: Option<String>,
    },
    /// A buffer was destroyed.
    DestroyBuffer(GpuBuffer),
    /// A buffer's contents were replaced.
    WriteBuffer {
        /// Buffer written to.
        buffer: GpuBuffer,
        /// Number of bytes uploaded.
        size: u64,
    },
    /// A vertex stream was created.
    CreateVertexStream(GpuVertexStream),
    /// A vertex stream was destroyed.
    DestroyVertexStream(GpuVertexStream),
    /// A vertex stream was bound.
    BindVertexStream(GpuVertexStream),
    /// An attribute location was associated with a buffer region.
    SetVertexAttribute(AttributeBinding),
    /// A draw was issued.
    Draw {
        /// How vertices were assembled.
        topology: PrimitiveTopology,
        /// Number of vertices drawn.
        vertex_count: u32,
        /// Rasterizer state the draw used.
        rasterizer: RasterizerState,
    },
}

#[derive(Debug, Default)]
struct DummyState {
    next_name: u64,
    buffers: HashMap<GpuBuffer, u64>,
    vertex_streams: usize,
    commands: Vec<BackendCommand>,
}

impl DummyState {
    fn allocate_name(&mut self) -> u64 {
        // Name 0 is reserved as "no object".
        self.next_name += 1;
        self.next_name
    }
}

/// Dummy GPU backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    state: Mutex<DummyState>,
    buffer_limit: Option<usize>,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of live buffers. Creating more fails with
    /// [`GraphicsError::OutOfMemory`].
    pub fn with_buffer_limit(mut self, limit: usize) -> Self {
        self.buffer_limit = Some(limit);
        self
    }

    /// All commands received so far, oldest first.
    pub fn commands(&self) -> Vec<BackendCommand> {
        self.state.lock().commands.clone()
    }

    /// Take the recorded commands, leaving the log empty.
    pub fn take_commands(&self) -> Vec<BackendCommand> {
        std::mem::take(&mut self.state.lock().commands)
    }

    /// Number of draws received so far.
    pub fn draw_count(&self) -> usize {
        self.state
            .lock()
            .commands
            .iter()
            .filter(|command| matches!(command, BackendCommand::Draw { .. }))
            .count()
    }

    /// Number of buffers created and not yet destroyed.
    pub fn live_buffer_count(&self) -> usize {
        self.state.lock().buffers.len()
    }

    /// Number of vertex streams created and not yet destroyed.
    pub fn live_vertex_stream_count(&self) -> usize {
        self.state.lock().vertex_streams
    }

    /// Size of the last upload to `buffer`, or `None` if it isn't alive.
    pub fn buffer_size(&self, buffer: GpuBuffer) -> Option<u64> {
        self.state.lock().buffers.get(&buffer).copied()
    }
}

impl GpuBackend for DummyBackend {
    fn name(&self) -> &'static str {
        "Dummy"
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<GpuBuffer, GraphicsError> {
        let mut state = self.state.lock();
        if let Some(limit) = self.buffer_limit {
            if state.buffers.len() >= limit {
                log::trace!(
                    "DummyBackend: refusing buffer {:?}, limit of {} reached",
                    descriptor.label,
                    limit
                );
                return Err(GraphicsError::OutOfMemory);
            }
        }

        let buffer = GpuBuffer::from_raw(state.allocate_name());
        state.buffers.insert(buffer, descriptor.size);
        state.commands.push(BackendCommand::CreateBuffer {
            buffer,
            label: descriptor.label.clone(),
        });
        log::trace!(
            "DummyBackend: creating buffer {:?} (name: {}, size: {})",
            descriptor.label,
            buffer.raw(),
            descriptor.size
        );
        Ok(buffer)
    }

    fn destroy_buffer(&self, buffer: GpuBuffer) {
        let mut state = self.state.lock();
        if state.buffers.remove(&buffer).is_none() {
            log::warn!("DummyBackend: destroying unknown buffer {}", buffer.raw());
        }
        state.commands.push(BackendCommand::DestroyBuffer(buffer));
        log::trace!("DummyBackend: destroyed buffer {}", buffer.raw());
    }

    fn write_buffer(&self, buffer: GpuBuffer, data: &[u8]) {
        let mut state = self.state.lock();
        let size = data.len() as u64;
        match state.buffers.get_mut(&buffer) {
            Some(stored) => *stored = size,
            None => log::warn!("DummyBackend: write to unknown buffer {}", buffer.raw()),
        }
        state
            .commands
            .push(BackendCommand::WriteBuffer { buffer, size });
        log::trace!("DummyBackend: write_buffer {} len={}", buffer.raw(), size);
    }

    fn create_vertex_stream(&self) -> Result<GpuVertexStream, GraphicsError> {
        let mut state = self.state.lock();
        let stream = GpuVertexStream::from_raw(state.allocate_name());
        state.vertex_streams += 1;
        state
            .commands
            .push(BackendCommand::CreateVertexStream(stream));
        log::trace!("DummyBackend: creating vertex stream {}", stream.raw());
        Ok(stream)
    }

    fn destroy_vertex_stream(&self, stream: GpuVertexStream) {
        let mut state = self.state.lock();
        state.vertex_streams = state.vertex_streams.saturating_sub(1);
        state
            .commands
            .push(BackendCommand::DestroyVertexStream(stream));
        log::trace!("DummyBackend: destroyed vertex stream {}", stream.raw());
    }

    fn bind_vertex_stream(&self, stream: GpuVertexStream) {
        self.state
            .lock()
            .commands
            .push(BackendCommand::BindVertexStream(stream));
    }

    fn set_vertex_attribute(&self, binding: &AttributeBinding) {
        log::trace!(
            "DummyBackend: attribute {} <- buffer {} ({}x{:?}, stride={}, offset={})",
            binding.location,
            binding.buffer.raw(),
            binding.component_count,
            binding.component_type,
            binding.stride,
            binding.offset
        );
        self.state
            .lock()
            .commands
            .push(BackendCommand::SetVertexAttribute(*binding));
    }

    fn draw(&self, topology: PrimitiveTopology, vertex_count: u32, rasterizer: &RasterizerState) {
        log::trace!(
            "DummyBackend: draw {:?} with {} vertices",
            topology,
            vertex_count
        );
        self.state.lock().commands.push(BackendCommand::Draw {
            topology,
            vertex_count,
            rasterizer: *rasterizer,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_lifecycle() {
        let backend = DummyBackend::new();
        let buffer = backend
            .create_buffer(&BufferDescriptor::vertex().with_label("test"))
            .unwrap();
        assert_eq!(backend.live_buffer_count(), 1);
        assert_eq!(backend.buffer_size(buffer), Some(0));

        backend.write_buffer(buffer, &[0u8; 48]);
        assert_eq!(backend.buffer_size(buffer), Some(48));

        backend.destroy_buffer(buffer);
        assert_eq!(backend.live_buffer_count(), 0);
        assert_eq!(backend.buffer_size(buffer), None);
    }

    #[test]
    fn test_names_are_unique_and_non_zero() {
        let backend = DummyBackend::new();
        let a = backend.create_buffer(&BufferDescriptor::vertex()).unwrap();
        let stream = backend.create_vertex_stream().unwrap();
        let b = backend.create_buffer(&BufferDescriptor::vertex()).unwrap();

        assert_ne!(a.raw(), 0);
        assert_ne!(a, b);
        assert_ne!(stream.raw(), a.raw());
        assert_ne!(stream.raw(), b.raw());
    }

    #[test]
    fn test_buffer_limit() {
        let backend = DummyBackend::new().with_buffer_limit(1);
        let first = backend.create_buffer(&BufferDescriptor::vertex()).unwrap();
        assert_eq!(
            backend.create_buffer(&BufferDescriptor::vertex()),
            Err(GraphicsError::OutOfMemory)
        );

        backend.destroy_buffer(first);
        assert!(backend.create_buffer(&BufferDescriptor::vertex()).is_ok());
    }

    #[test]
    fn test_command_recording() {
        let backend = DummyBackend::new();
        let stream = backend.create_vertex_stream().unwrap();
        backend.bind_vertex_stream(stream);
        backend.draw(PrimitiveTopology::Points, 3, &RasterizerState::default());

        assert_eq!(backend.draw_count(), 1);
        let commands = backend.take_commands();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[1], BackendCommand::BindVertexStream(stream));
        assert!(backend.commands().is_empty());
    }
}
