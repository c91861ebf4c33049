//! # Strata Graphics
//!
//! Vertex-stream meshes on top of an abstract GPU backend.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`Mesh`] - Owns vertex buffers, binds attributes to them and draws
//! - [`GpuBackend`] - Trait for the graphics context a mesh submits to
//! - [`DummyBackend`] - Command-recording backend for testing
//! - [`RasterizerState`] - Per-draw polygon mode, line width and point size
//!
//! ## Example
//!
//! ```ignore
//! use strata_graphics::*;
//!
//! let backend = create_backend()?;
//! let mut mesh = Mesh::new(backend, &MeshDescriptor::new(PrimitiveTopology::Triangles)
//!     .with_vertex_count(3))?;
//!
//! let buffer = mesh.register_buffer(BufferLayout::Sequential)?;
//! mesh.bind_attribute(buffer, AttributeFormat::of::<[f32; 3]>(0));
//! mesh.bind_attribute(buffer, AttributeFormat::of::<[u8; 4]>(1));
//! mesh.buffer(buffer).unwrap().set_data(&data);
//!
//! mesh.draw(&RasterizerState::default());
//! ```

pub mod backend;
pub mod error;
pub mod mesh;
pub mod resources;
pub mod types;
#[cfg(feature = "wgpu")]
pub mod wgpu_layout;

// Re-export main types for convenience
#[cfg(feature = "dummy")]
pub use backend::dummy::{BackendCommand, DummyBackend};
pub use backend::{create_backend, AttributeBinding, GpuBackend, GpuBuffer, GpuVertexStream};
pub use error::GraphicsError;
pub use mesh::{
    AttributeFormat, BindOutcome, BufferHandle, BufferLayout, ComponentType, Mesh,
    MeshDescriptor, PrimitiveTopology, VertexAttribute, VertexBufferEntry, VertexComponents,
};
pub use resources::Buffer;
pub use types::{BufferDescriptor, BufferUsage, PolygonMode, RasterizerState};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// Only logs the versions in use; no global state is set up.
pub fn init() {
    strata_core::init();
    log::info!("Strata Graphics v{} initialized", VERSION);
}
