//! # Strata Core
//!
//! GPU-agnostic building blocks for Strata meshes: primitive topologies,
//! attribute formats and the stride/offset computation for interleaved and
//! sequential vertex buffers.

pub mod mesh;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the library version.
pub fn init() {
    log::info!("Strata Core v{} initialized", VERSION);
}
