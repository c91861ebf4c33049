//! Common utilities for mesh integration tests.
//!
//! Every test runs against a [`DummyBackend`] so the commands a mesh submits
//! can be inspected without GPU hardware.

use std::sync::Arc;

use strata_graphics::{
    AttributeBinding, AttributeFormat, BackendCommand, ComponentType, DummyBackend, Mesh,
    MeshDescriptor, PrimitiveTopology, RasterizerState,
};

/// Install a test logger once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build `count` formats at locations 0.. with the given component counts.
pub fn formats(component_type: ComponentType, counts: &[u32]) -> Vec<AttributeFormat> {
    counts
        .iter()
        .enumerate()
        .map(|(location, &count)| AttributeFormat::new(location as u32, count, component_type))
        .collect()
}

/// Test context holding a recording backend.
pub struct TestContext {
    pub backend: Arc<DummyBackend>,
}

impl TestContext {
    pub fn new() -> Self {
        init_logging();
        Self {
            backend: Arc::new(DummyBackend::new()),
        }
    }

    pub fn with_buffer_limit(limit: usize) -> Self {
        init_logging();
        Self {
            backend: Arc::new(DummyBackend::new().with_buffer_limit(limit)),
        }
    }

    /// Create a triangle mesh with the given vertex count.
    pub fn mesh(&self, vertex_count: u32) -> Mesh {
        self.mesh_with(
            MeshDescriptor::new(PrimitiveTopology::Triangles).with_vertex_count(vertex_count),
        )
    }

    pub fn mesh_with(&self, descriptor: MeshDescriptor) -> Mesh {
        Mesh::new(self.backend.clone(), &descriptor).expect("dummy backend never fails")
    }

    /// Attribute associations submitted since the last call, in order.
    pub fn take_attribute_bindings(&self) -> Vec<AttributeBinding> {
        self.backend
            .take_commands()
            .into_iter()
            .filter_map(|command| match command {
                BackendCommand::SetVertexAttribute(binding) => Some(binding),
                _ => None,
            })
            .collect()
    }

    /// Draws submitted so far as (topology, vertex count, rasterizer state).
    pub fn draws(&self) -> Vec<(PrimitiveTopology, u32, RasterizerState)> {
        self.backend
            .commands()
            .into_iter()
            .filter_map(|command| match command {
                BackendCommand::Draw {
                    topology,
                    vertex_count,
                    rasterizer,
                } => Some((topology, vertex_count, rasterizer)),
                _ => None,
            })
            .collect()
    }
}
