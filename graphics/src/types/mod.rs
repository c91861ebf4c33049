//! Descriptor and configuration types.
//!
//! This module contains usage flags, buffer descriptors and the rasterizer
//! state handed to draw calls.

mod buffer;
mod rasterizer;

pub use buffer::{BufferDescriptor, BufferUsage};
pub use rasterizer::{PolygonMode, RasterizerState};
