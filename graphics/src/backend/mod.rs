//! GPU backend abstraction layer.
//!
//! A [`GpuBackend`] is the graphics context a [`Mesh`](crate::Mesh) talks to.
//! It owns the real GPU objects and exposes them through opaque numeric names
//! ([`GpuBuffer`], [`GpuVertexStream`]), the way a driver hands out buffer and
//! vertex array names.
//!
//! # Available Backends
//!
//! - `dummy` (default): records commands instead of executing them, for
//!   testing and development without GPU hardware
//!
//! # Architecture
//!
//! Each backend implements the [`GpuBackend`] trait, which provides:
//! - Buffer creation, upload and destruction
//! - Vertex stream (vertex array) creation, binding and destruction
//! - Attribute association and draw submission
//!
//! Failures of commands that return nothing (uploads, draws) are the
//! backend's business and are not reported back to the mesh.

#[cfg(feature = "dummy")]
pub mod dummy;

use std::sync::Arc;

use strata_core::mesh::{ComponentType, PrimitiveTopology};

use crate::error::GraphicsError;
use crate::types::{BufferDescriptor, RasterizerState};

/// Backend name of a GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuBuffer(u64);

impl GpuBuffer {
    /// Wrap a backend-specific buffer name.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The backend-specific buffer name.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Backend name of a vertex stream (the container that records which
/// buffers and layouts feed each attribute location).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuVertexStream(u64);

impl GpuVertexStream {
    /// Wrap a backend-specific vertex stream name.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The backend-specific vertex stream name.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Association of one attribute location with the buffer region feeding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeBinding {
    /// Buffer holding the attribute data.
    pub buffer: GpuBuffer,
    /// Shader location of the attribute.
    pub location: u32,
    /// Number of components per vertex.
    pub component_count: u32,
    /// Type of every component.
    pub component_type: ComponentType,
    /// Distance in bytes between values of consecutive vertices.
    pub stride: u32,
    /// Distance in bytes from the buffer start to the first vertex's value.
    pub offset: u64,
}

/// GPU backend trait for abstracting different GPU APIs.
///
/// Only resource creation can fail. Backends report failures with the
/// [`GraphicsError`] variant that matches the cause:
///
/// - [`OutOfMemory`](GraphicsError::OutOfMemory) when the allocation doesn't fit
/// - [`DeviceLost`](GraphicsError::DeviceLost) when the context is gone
/// - [`ResourceCreationFailed`](GraphicsError::ResourceCreationFailed) for
///   other API failures, with the API's message
/// - [`Internal`](GraphicsError::Internal) for broken backend invariants
///
/// [`Mesh`](crate::Mesh) passes these errors through unchanged.
pub trait GpuBackend: Send + Sync + 'static {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    /// Create a buffer resource.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<GpuBuffer, GraphicsError>;

    /// Release a buffer resource.
    fn destroy_buffer(&self, buffer: GpuBuffer);

    /// Replace the whole contents of a buffer with `data`.
    fn write_buffer(&self, buffer: GpuBuffer, data: &[u8]);

    /// Create a vertex stream.
    fn create_vertex_stream(&self) -> Result<GpuVertexStream, GraphicsError>;

    /// Release a vertex stream.
    fn destroy_vertex_stream(&self, stream: GpuVertexStream);

    /// Make `stream` the target of subsequent attribute associations and draws.
    fn bind_vertex_stream(&self, stream: GpuVertexStream);

    /// Associate an attribute location of the bound stream with a buffer region.
    fn set_vertex_attribute(&self, binding: &AttributeBinding);

    /// Draw `vertex_count` vertices of the bound stream.
    fn draw(&self, topology: PrimitiveTopology, vertex_count: u32, rasterizer: &RasterizerState);
}

/// Selects and creates the appropriate backend based on available features.
pub fn create_backend() -> Result<Arc<dyn GpuBackend>, GraphicsError> {
    #[cfg(feature = "dummy")]
    {
        log::info!("Using dummy backend");
        Ok(Arc::new(dummy::DummyBackend::new()))
    }

    #[cfg(not(feature = "dummy"))]
    {
        Err(GraphicsError::FeatureNotSupported(
            "no GPU backend compiled in".to_string(),
        ))
    }
}
