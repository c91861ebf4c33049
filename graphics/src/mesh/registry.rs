//! Per-mesh registry of vertex buffers and the attributes bound to them.

use std::collections::BTreeSet;

use strata_core::mesh::{
    compute_layout, record_size, AttributeFormat, BufferLayout, VertexAttribute,
};

use crate::resources::Buffer;

/// Handle to a vertex buffer registered with a [`Mesh`](crate::Mesh).
///
/// Handles are only meaningful to the mesh that returned them. Passing a
/// handle to a different mesh is treated like passing an unknown buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle {
    mesh: u64,
    slot: u32,
}

impl BufferHandle {
    /// Registration index of the buffer within its mesh.
    pub fn slot(&self) -> u32 {
        self.slot
    }
}

/// Result of [`Mesh::bind_attribute`](crate::Mesh::bind_attribute).
///
/// Every outcome except [`Bound`](Self::Bound) leaves the mesh unchanged.
/// Callers that don't care about rejected bindings may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindOutcome {
    /// The attribute was appended to the buffer.
    Bound,
    /// The location is already bound to this or another buffer of the mesh.
    AlreadyBound,
    /// The handle does not belong to a buffer registered with this mesh.
    UnknownBuffer,
    /// The mesh has been drawn, its attribute set is frozen.
    AlreadyDrawn,
    /// The format has zero components, its size in bytes doesn't fit in
    /// `u32`, or it would grow an interleaved record past `u32::MAX` bytes.
    InvalidFormat,
}

impl BindOutcome {
    /// Whether the attribute was bound.
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound)
    }
}

/// A registered vertex buffer with its layout mode and bound attributes.
#[derive(Debug)]
pub struct VertexBufferEntry {
    handle: BufferHandle,
    buffer: Buffer,
    layout: BufferLayout,
    attributes: Vec<VertexAttribute>,
}

impl VertexBufferEntry {
    /// Handle of this buffer.
    pub fn handle(&self) -> BufferHandle {
        self.handle
    }

    /// The GPU buffer.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// How attributes are arranged in the buffer.
    pub fn layout(&self) -> BufferLayout {
        self.layout
    }

    /// Attributes in binding order.
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }
}

/// Buffers of one mesh, in registration order, plus the set of bound locations.
#[derive(Debug)]
pub(crate) struct BufferRegistry {
    mesh: u64,
    entries: Vec<VertexBufferEntry>,
    locations: BTreeSet<u32>,
}

impl BufferRegistry {
    pub(crate) fn new(mesh: u64) -> Self {
        Self {
            mesh,
            entries: Vec::new(),
            locations: BTreeSet::new(),
        }
    }

    /// Slot the next registered buffer will get.
    pub(crate) fn next_slot(&self) -> u32 {
        self.entries.len() as u32
    }

    pub(crate) fn insert(&mut self, buffer: Buffer, layout: BufferLayout) -> BufferHandle {
        let handle = BufferHandle {
            mesh: self.mesh,
            slot: self.next_slot(),
        };
        self.entries.push(VertexBufferEntry {
            handle,
            buffer,
            layout,
            attributes: Vec::new(),
        });
        handle
    }

    pub(crate) fn get(&self, handle: BufferHandle) -> Option<&VertexBufferEntry> {
        if handle.mesh != self.mesh {
            return None;
        }
        self.entries.get(handle.slot as usize)
    }

    /// Append an attribute to a buffer, enforcing location uniqueness.
    pub(crate) fn bind(&mut self, handle: BufferHandle, format: AttributeFormat) -> BindOutcome {
        if handle.mesh != self.mesh {
            return BindOutcome::UnknownBuffer;
        }
        let Some(entry) = self.entries.get_mut(handle.slot as usize) else {
            return BindOutcome::UnknownBuffer;
        };
        if self.locations.contains(&format.location) {
            return BindOutcome::AlreadyBound;
        }
        if format.component_count == 0 || !fits_layout(entry, format) {
            return BindOutcome::InvalidFormat;
        }

        entry.attributes.push(VertexAttribute::new(format));
        self.locations.insert(format.location);
        BindOutcome::Bound
    }

    /// Recompute stride and offset of every bound attribute.
    pub(crate) fn compute_layouts(&mut self, vertex_count: u32) {
        for entry in &mut self.entries {
            compute_layout(entry.layout, &mut entry.attributes, vertex_count);
        }
    }

    pub(crate) fn entries(&self) -> &[VertexBufferEntry] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn attribute_count(&self) -> usize {
        self.locations.len()
    }

    pub(crate) fn find_attribute(&self, location: u32) -> Option<&VertexAttribute> {
        if !self.locations.contains(&location) {
            return None;
        }
        self.entries
            .iter()
            .flat_map(|entry| entry.attributes.iter())
            .find(|attribute| attribute.location() == location)
    }
}

/// Whether `format` can join the buffer without overflowing its stride.
fn fits_layout(entry: &VertexBufferEntry, format: AttributeFormat) -> bool {
    let Some(size) = format.checked_byte_size() else {
        return false;
    };
    match entry.layout {
        BufferLayout::Interleaved => record_size(&entry.attributes)
            .and_then(|record| record.checked_add(size))
            .is_some(),
        BufferLayout::Sequential => true,
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use std::sync::Arc;

    use strata_core::mesh::ComponentType;

    use super::*;
    use crate::backend::dummy::DummyBackend;
    use crate::types::BufferDescriptor;

    fn registry_with_buffer(layout: BufferLayout) -> (BufferRegistry, BufferHandle) {
        let backend = Arc::new(DummyBackend::new());
        let buffer = Buffer::new(backend, BufferDescriptor::vertex()).unwrap();
        let mut registry = BufferRegistry::new(1);
        let handle = registry.insert(buffer, layout);
        (registry, handle)
    }

    #[test]
    fn test_bind_keeps_order() {
        let (mut registry, handle) = registry_with_buffer(BufferLayout::Interleaved);
        assert!(registry.bind(handle, AttributeFormat::of::<[f32; 3]>(4)).is_bound());
        assert!(registry.bind(handle, AttributeFormat::of::<[f32; 2]>(1)).is_bound());

        let locations: Vec<_> = registry
            .get(handle)
            .unwrap()
            .attributes()
            .iter()
            .map(VertexAttribute::location)
            .collect();
        assert_eq!(locations, vec![4, 1]);
        assert_eq!(registry.attribute_count(), 2);
    }

    #[test]
    fn test_duplicate_location_rejected() {
        let (mut registry, handle) = registry_with_buffer(BufferLayout::Sequential);
        registry.bind(handle, AttributeFormat::of::<[f32; 3]>(0));
        assert_eq!(
            registry.bind(handle, AttributeFormat::of::<u8>(0)),
            BindOutcome::AlreadyBound
        );
        assert_eq!(registry.get(handle).unwrap().attributes().len(), 1);
        assert_eq!(
            registry.find_attribute(0).unwrap().component_type(),
            ComponentType::Float32
        );
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let (mut registry, _) = registry_with_buffer(BufferLayout::Interleaved);
        let foreign = BufferHandle { mesh: 2, slot: 0 };
        let out_of_range = BufferHandle { mesh: 1, slot: 9 };

        assert!(registry.get(foreign).is_none());
        assert_eq!(
            registry.bind(foreign, AttributeFormat::of::<f32>(0)),
            BindOutcome::UnknownBuffer
        );
        assert_eq!(
            registry.bind(out_of_range, AttributeFormat::of::<f32>(0)),
            BindOutcome::UnknownBuffer
        );
        assert_eq!(registry.attribute_count(), 0);
    }

    #[test]
    fn test_zero_components_rejected() {
        let (mut registry, handle) = registry_with_buffer(BufferLayout::Interleaved);
        assert_eq!(
            registry.bind(handle, AttributeFormat::new(0, 0, ComponentType::Float32)),
            BindOutcome::InvalidFormat
        );
        assert!(registry.find_attribute(0).is_none());
    }

    #[test]
    fn test_oversized_formats_rejected() {
        let (mut registry, handle) = registry_with_buffer(BufferLayout::Interleaved);
        assert_eq!(
            registry.bind(handle, AttributeFormat::new(0, 0x2000_0000, ComponentType::Float64)),
            BindOutcome::InvalidFormat
        );

        let almost_full = AttributeFormat::new(1, u32::MAX / 4, ComponentType::Float32);
        assert!(registry.bind(handle, almost_full).is_bound());
        assert_eq!(
            registry.bind(handle, AttributeFormat::of::<[f32; 2]>(2)),
            BindOutcome::InvalidFormat
        );
        assert!(registry.bind(handle, AttributeFormat::of::<[u8; 3]>(3)).is_bound());
        assert_eq!(registry.attribute_count(), 2);
    }
}
