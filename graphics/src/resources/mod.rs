//! GPU resources.
//!
//! - [`Buffer`] - GPU memory buffer owned by a mesh

mod buffer;

pub use buffer::Buffer;
