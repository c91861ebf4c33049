//! Mesh types for the graphics engine.
//!
//! - [`Mesh`] - GPU mesh owning its vertex buffers, topology and attribute layout
//! - [`BufferHandle`] - Handle to a buffer registered with a mesh
//! - [`BindOutcome`] - Result of binding an attribute
//!
//! CPU-side types (topology, formats, layout computation) live in
//! `strata-core` and are re-exported here.

mod data;
mod registry;

pub use data::Mesh;
pub use registry::{BindOutcome, BufferHandle, VertexBufferEntry};

pub use strata_core::mesh::{
    buffer_size, compute_layout, record_size, AttributeFormat, BufferLayout, ComponentType,
    MeshDescriptor, PrimitiveTopology, VertexAttribute, VertexComponents,
};
