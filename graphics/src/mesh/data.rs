//! GPU mesh with its vertex buffers and attribute layout.
//!
//! A [`Mesh`] owns one vertex stream and every vertex buffer registered with
//! it. Attributes are bound to buffers in the order the caller chooses; that
//! order, the buffer's [`BufferLayout`] and the vertex count decide where each
//! attribute lives inside its buffer.
//!
//! # Lifecycle
//!
//! 1. Create the mesh from a [`MeshDescriptor`].
//! 2. Register buffers with [`Mesh::register_buffer`] and upload data.
//! 3. Bind attributes with [`Mesh::bind_attribute`].
//! 4. Draw. The layout is finalized on the first draw (or explicitly with
//!    [`Mesh::finalize`]) and recomputed whenever the structure or the vertex
//!    count changed since.
//!
//! After the first draw the attribute set is frozen: further bindings are
//! rejected with [`BindOutcome::AlreadyDrawn`]. Buffers can still be
//! registered, they just can't receive attributes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use strata_core::mesh::{
    AttributeFormat, BufferLayout, MeshDescriptor, PrimitiveTopology, VertexAttribute,
};

use crate::backend::{AttributeBinding, GpuBackend, GpuVertexStream};
use crate::error::GraphicsError;
use crate::resources::Buffer;
use crate::types::{BufferDescriptor, RasterizerState};

use super::registry::{BindOutcome, BufferHandle, BufferRegistry, VertexBufferEntry};

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

/// A non-indexed GPU mesh.
///
/// # Example
///
/// ```ignore
/// let mut mesh = Mesh::new(backend, &MeshDescriptor::new(PrimitiveTopology::Triangles)
///     .with_vertex_count(3)
///     .with_label("triangle"))?;
///
/// let vertices = mesh.register_buffer(BufferLayout::Interleaved)?;
/// mesh.bind_attribute(vertices, AttributeFormat::of::<[f32; 3]>(0)); // position
/// mesh.bind_attribute(vertices, AttributeFormat::of::<[f32; 4]>(1)); // color
/// mesh.buffer(vertices).unwrap().set_data(&triangle_data);
///
/// mesh.draw(&RasterizerState::default());
/// ```
pub struct Mesh {
    backend: Arc<dyn GpuBackend>,
    stream: GpuVertexStream,
    topology: PrimitiveTopology,
    vertex_count: u32,
    finalized: bool,
    drawn: bool,
    registry: BufferRegistry,
    label: Option<String>,
}

impl Mesh {
    /// Create a new mesh with no buffers.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the vertex stream cannot be created.
    pub fn new(
        backend: Arc<dyn GpuBackend>,
        descriptor: &MeshDescriptor,
    ) -> Result<Self, GraphicsError> {
        let stream = backend.create_vertex_stream()?;
        let id = NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed);

        log::trace!(
            "Mesh: created {:?} ({:?}, {} vertices) on {} backend",
            descriptor.label,
            descriptor.topology,
            descriptor.vertex_count,
            backend.name()
        );

        Ok(Self {
            backend,
            stream,
            topology: descriptor.topology,
            vertex_count: descriptor.vertex_count,
            finalized: false,
            drawn: false,
            registry: BufferRegistry::new(id),
            label: descriptor.label.clone(),
        })
    }

    /// Get the backend this mesh submits to.
    pub fn backend(&self) -> &Arc<dyn GpuBackend> {
        &self.backend
    }

    /// Get the mesh label, if set.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the primitive topology.
    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// Set the primitive topology. Does not affect the layout.
    pub fn set_topology(&mut self, topology: PrimitiveTopology) {
        log::trace!("Mesh {:?}: topology {:?}", self.label, topology);
        self.topology = topology;
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Set the number of vertices.
    ///
    /// Sequential buffers place attributes by vertex count, so this forces the
    /// layout to be recomputed on the next draw.
    pub fn set_vertex_count(&mut self, vertex_count: u32) {
        log::trace!("Mesh {:?}: vertex count {}", self.label, vertex_count);
        self.vertex_count = vertex_count;
        self.finalized = false;
    }

    /// Get the number of primitives the current topology assembles.
    pub fn primitive_count(&self) -> u32 {
        self.topology.primitive_count(self.vertex_count)
    }

    /// Whether strides and offsets are up to date with the mesh structure.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Whether the mesh has been drawn at least once.
    pub fn was_drawn(&self) -> bool {
        self.drawn
    }

    /// Create a new vertex buffer owned by this mesh.
    ///
    /// The buffer starts empty; fill it through [`Mesh::buffer`].
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the buffer cannot be created. The mesh is
    /// left unchanged in that case.
    pub fn register_buffer(&mut self, layout: BufferLayout) -> Result<BufferHandle, GraphicsError> {
        let mut descriptor = BufferDescriptor::vertex();
        if let Some(label) = &self.label {
            descriptor = descriptor.with_label(format!("{label}/{}", self.registry.next_slot()));
        }

        let buffer = Buffer::new(Arc::clone(&self.backend), descriptor)?;
        let handle = self.registry.insert(buffer, layout);
        self.finalized = false;

        log::trace!(
            "Mesh {:?}: registered {:?} buffer in slot {}",
            self.label,
            layout,
            handle.slot()
        );
        Ok(handle)
    }

    /// Bind an attribute to a buffer of this mesh.
    ///
    /// The attribute is appended after the attributes already bound to the
    /// buffer. The call does nothing if the location is already bound anywhere
    /// in the mesh, the buffer is not registered with this mesh, the mesh has
    /// been drawn, or the format has no components; the returned
    /// [`BindOutcome`] says which.
    pub fn bind_attribute(&mut self, buffer: BufferHandle, format: AttributeFormat) -> BindOutcome {
        let outcome = if self.drawn {
            BindOutcome::AlreadyDrawn
        } else {
            self.registry.bind(buffer, format)
        };

        if outcome.is_bound() {
            self.finalized = false;
        } else {
            log::debug!(
                "Mesh {:?}: ignoring attribute {} on slot {}: {:?}",
                self.label,
                format.location,
                buffer.slot(),
                outcome
            );
        }
        outcome
    }

    /// Whether `buffer` is registered with this mesh and interleaved.
    ///
    /// Unknown buffers are reported as not interleaved.
    pub fn is_interleaved(&self, buffer: BufferHandle) -> bool {
        self.layout_mode(buffer) == Some(BufferLayout::Interleaved)
    }

    /// Get the layout mode of a registered buffer.
    pub fn layout_mode(&self, buffer: BufferHandle) -> Option<BufferLayout> {
        self.registry.get(buffer).map(VertexBufferEntry::layout)
    }

    /// Get a registered buffer.
    pub fn buffer(&self, buffer: BufferHandle) -> Option<&Buffer> {
        self.registry.get(buffer).map(VertexBufferEntry::buffer)
    }

    /// Get the attributes bound to a buffer, in binding order.
    ///
    /// Strides and offsets are only meaningful while [`is_finalized`](Self::is_finalized).
    pub fn attributes(&self, buffer: BufferHandle) -> Option<&[VertexAttribute]> {
        self.registry.get(buffer).map(VertexBufferEntry::attributes)
    }

    /// Get the attribute bound at a shader location.
    pub fn attribute(&self, location: u32) -> Option<&VertexAttribute> {
        self.registry.find_attribute(location)
    }

    /// Get all registered buffers in registration order.
    pub fn vertex_buffers(&self) -> &[VertexBufferEntry] {
        self.registry.entries()
    }

    /// Get the number of registered buffers.
    pub fn buffer_count(&self) -> usize {
        self.registry.len()
    }

    /// Get the number of bound attributes.
    pub fn attribute_count(&self) -> usize {
        self.registry.attribute_count()
    }

    /// Compute stride and offset of every bound attribute.
    ///
    /// Does nothing if the mesh is already finalized.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }

        self.registry.compute_layouts(self.vertex_count);
        self.finalized = true;

        log::debug!(
            "Mesh {:?}: finalized {} attributes in {} buffers for {} vertices",
            self.label,
            self.registry.attribute_count(),
            self.registry.len(),
            self.vertex_count
        );
    }

    /// Draw the mesh.
    ///
    /// Finalizes the layout if needed, binds the vertex stream, associates
    /// every attribute with its buffer region and issues one draw with the
    /// mesh topology and vertex count. Expects the caller to have set up the
    /// shader program reading the bound locations.
    pub fn draw(&mut self, rasterizer: &RasterizerState) {
        self.finalize();

        if let Err(err) = rasterizer.validate() {
            log::warn!("Mesh {:?}: drawing with {}", self.label, err);
        }

        self.backend.bind_vertex_stream(self.stream);
        for entry in self.registry.entries() {
            let buffer = entry.buffer().raw();
            for attribute in entry.attributes() {
                self.backend.set_vertex_attribute(&AttributeBinding {
                    buffer,
                    location: attribute.location(),
                    component_count: attribute.component_count(),
                    component_type: attribute.component_type(),
                    stride: attribute.stride(),
                    offset: attribute.offset(),
                });
            }
        }
        self.backend.draw(self.topology, self.vertex_count, rasterizer);
        self.drawn = true;
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        // Buffers are released when the registry drops, after this.
        self.backend.destroy_vertex_stream(self.stream);
    }
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("label", &self.label)
            .field("topology", &self.topology)
            .field("vertex_count", &self.vertex_count)
            .field("buffer_count", &self.registry.len())
            .field("attribute_count", &self.registry.attribute_count())
            .field("finalized", &self.finalized)
            .field("drawn", &self.drawn)
            .finish()
    }
}

// Ensure Mesh is Send + Sync
static_assertions::assert_impl_all!(Mesh: Send, Sync);
