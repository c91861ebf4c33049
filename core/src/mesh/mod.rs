//! CPU-side mesh types and the vertex layout algorithm.
//!
//! This module provides GPU-agnostic mesh data structures:
//!
//! - [`PrimitiveTopology`] - How vertices are assembled into primitives
//! - [`MeshDescriptor`] - Descriptor for creating GPU meshes
//! - [`AttributeFormat`] / [`VertexAttribute`] - Attribute descriptions before and after binding
//! - [`BufferLayout`] - Interleaved or sequential arrangement of a vertex buffer
//! - [`compute_layout`] - Stride and offset computation for one buffer
//!
//! These types are re-exported by `strata-graphics` for convenience.

mod data;
mod layout;

pub use data::{MeshDescriptor, PrimitiveTopology};
pub use layout::{
    buffer_size, compute_layout, record_size, AttributeFormat, BufferLayout, ComponentType,
    VertexAttribute, VertexComponents,
};
