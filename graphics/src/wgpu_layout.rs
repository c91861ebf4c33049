//! Conversion of finalized mesh layouts into wgpu vertex buffer layouts.
//!
//! wgpu fixes vertex layouts in the render pipeline and requires every
//! attribute to lie inside one record of its vertex buffer binding. The two
//! buffer layouts therefore map differently:
//!
//! - **Interleaved** buffers become one binding with the record size as
//!   `array_stride` and each attribute at its offset within the record.
//! - **Sequential** buffers become one binding per attribute, bound at the
//!   attribute's block offset, with the attribute at offset 0.
//!
//! wgpu also requires strides and binding offsets to be multiples of 4 and
//! each attribute offset to be aligned to its format size (at most 4). A
//! layout that breaks these rules is reported instead of converted, e.g. an
//! interleaved buffer holding only `[u8; 2]`, or a sequential block that
//! starts at an odd offset because the vertex count is odd.
//!
//! # Example
//!
//! ```ignore
//! let bindings = vertex_bindings(&mut mesh)?;
//! let layouts: Vec<_> = bindings.iter().map(WgpuVertexBinding::layout).collect();
//! // ... create the pipeline with `layouts`, then while recording:
//! for (slot, binding) in bindings.iter().enumerate() {
//!     let buffer = &gpu_buffers[&binding.buffer];
//!     pass.set_vertex_buffer(slot as u32, buffer.slice(binding.offset..));
//! }
//! ```

use strata_core::mesh::{BufferLayout, ComponentType};

use crate::backend::GpuBuffer;
use crate::error::GraphicsError;
use crate::mesh::Mesh;

/// Alignment wgpu requires for vertex strides and buffer binding offsets.
const VERTEX_ALIGNMENT: u64 = 4;

/// Convert a component type and count to a wgpu vertex format.
///
/// Returns `None` for combinations wgpu cannot fetch (e.g. three 8-bit
/// components). Integer types map to non-normalized formats.
pub fn convert_vertex_format(
    component_type: ComponentType,
    component_count: u32,
) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as F;

    let format = match (component_type, component_count) {
        (ComponentType::Uint8, 1) => F::Uint8,
        (ComponentType::Uint8, 2) => F::Uint8x2,
        (ComponentType::Uint8, 4) => F::Uint8x4,
        (ComponentType::Int8, 1) => F::Sint8,
        (ComponentType::Int8, 2) => F::Sint8x2,
        (ComponentType::Int8, 4) => F::Sint8x4,
        (ComponentType::Uint16, 1) => F::Uint16,
        (ComponentType::Uint16, 2) => F::Uint16x2,
        (ComponentType::Uint16, 4) => F::Uint16x4,
        (ComponentType::Int16, 1) => F::Sint16,
        (ComponentType::Int16, 2) => F::Sint16x2,
        (ComponentType::Int16, 4) => F::Sint16x4,
        (ComponentType::Float16, 1) => F::Float16,
        (ComponentType::Float16, 2) => F::Float16x2,
        (ComponentType::Float16, 4) => F::Float16x4,
        (ComponentType::Float32, 1) => F::Float32,
        (ComponentType::Float32, 2) => F::Float32x2,
        (ComponentType::Float32, 3) => F::Float32x3,
        (ComponentType::Float32, 4) => F::Float32x4,
        (ComponentType::Uint32, 1) => F::Uint32,
        (ComponentType::Uint32, 2) => F::Uint32x2,
        (ComponentType::Uint32, 3) => F::Uint32x3,
        (ComponentType::Uint32, 4) => F::Uint32x4,
        (ComponentType::Int32, 1) => F::Sint32,
        (ComponentType::Int32, 2) => F::Sint32x2,
        (ComponentType::Int32, 3) => F::Sint32x3,
        (ComponentType::Int32, 4) => F::Sint32x4,
        (ComponentType::Float64, 1) => F::Float64,
        (ComponentType::Float64, 2) => F::Float64x2,
        (ComponentType::Float64, 3) => F::Float64x3,
        (ComponentType::Float64, 4) => F::Float64x4,
        _ => return None,
    };
    Some(format)
}

/// One wgpu vertex buffer binding derived from a mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct WgpuVertexBinding {
    /// Backend name of the buffer to bind.
    pub buffer: GpuBuffer,
    /// Byte offset to bind the buffer at (`buffer.slice(offset..)`).
    pub offset: u64,
    /// Distance in bytes between consecutive vertices.
    pub array_stride: u64,
    /// Attributes read from this binding.
    pub attributes: Vec<wgpu::VertexAttribute>,
}

impl WgpuVertexBinding {
    /// Borrow as a wgpu vertex buffer layout for pipeline creation.
    pub fn layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.array_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

/// Finalize `mesh` and describe its vertex buffers as wgpu bindings.
///
/// Bindings are ordered by buffer registration, then attribute binding order.
/// Buffers without attributes produce no binding.
///
/// # Errors
///
/// Returns [`GraphicsError::FeatureNotSupported`] if an attribute has a
/// component type and count wgpu cannot fetch, or if a stride or offset
/// breaks wgpu's alignment rules.
pub fn vertex_bindings(mesh: &mut Mesh) -> Result<Vec<WgpuVertexBinding>, GraphicsError> {
    mesh.finalize();

    let mut bindings = Vec::new();
    for entry in mesh.vertex_buffers() {
        let buffer = entry.buffer().raw();
        let mut converted = Vec::with_capacity(entry.attributes().len());
        for attribute in entry.attributes() {
            let format = convert_vertex_format(
                attribute.component_type(),
                attribute.component_count(),
            )
            .ok_or_else(|| {
                GraphicsError::FeatureNotSupported(format!(
                    "attribute {}: {} x {:?} has no wgpu vertex format",
                    attribute.location(),
                    attribute.component_count(),
                    attribute.component_type()
                ))
            })?;
            converted.push((attribute, format));
        }

        let misaligned = |what: &str, location: u32, value: u64, alignment: u64| {
            GraphicsError::FeatureNotSupported(format!(
                "attribute {location}: {what} {value} is not a multiple of {alignment}"
            ))
        };

        match entry.layout() {
            BufferLayout::Interleaved => {
                let Some((first, _)) = converted.first() else {
                    continue;
                };
                let array_stride = u64::from(first.stride());
                if array_stride % VERTEX_ALIGNMENT != 0 {
                    return Err(misaligned(
                        "stride",
                        first.location(),
                        array_stride,
                        VERTEX_ALIGNMENT,
                    ));
                }
                for (attribute, format) in &converted {
                    let alignment = format.size().min(VERTEX_ALIGNMENT);
                    if attribute.offset() % alignment != 0 {
                        return Err(misaligned(
                            "offset",
                            attribute.location(),
                            attribute.offset(),
                            alignment,
                        ));
                    }
                }
                bindings.push(WgpuVertexBinding {
                    buffer,
                    offset: 0,
                    array_stride,
                    attributes: converted
                        .iter()
                        .map(|(attribute, format)| wgpu::VertexAttribute {
                            format: *format,
                            offset: attribute.offset(),
                            shader_location: attribute.location(),
                        })
                        .collect(),
                });
            }
            BufferLayout::Sequential => {
                for (attribute, format) in &converted {
                    let array_stride = u64::from(attribute.stride());
                    if array_stride % VERTEX_ALIGNMENT != 0 {
                        return Err(misaligned(
                            "stride",
                            attribute.location(),
                            array_stride,
                            VERTEX_ALIGNMENT,
                        ));
                    }
                    if attribute.offset() % VERTEX_ALIGNMENT != 0 {
                        return Err(misaligned(
                            "offset",
                            attribute.location(),
                            attribute.offset(),
                            VERTEX_ALIGNMENT,
                        ));
                    }
                    bindings.push(WgpuVertexBinding {
                        buffer,
                        offset: attribute.offset(),
                        array_stride,
                        attributes: vec![wgpu::VertexAttribute {
                            format: *format,
                            offset: 0,
                            shader_location: attribute.location(),
                        }],
                    });
                }
            }
        }
    }
    Ok(bindings)
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;
    use strata_core::mesh::{AttributeFormat, MeshDescriptor, PrimitiveTopology};

    use super::*;
    use crate::backend::dummy::DummyBackend;

    fn mesh(vertex_count: u32) -> Mesh {
        Mesh::new(
            Arc::new(DummyBackend::new()),
            &MeshDescriptor::new(PrimitiveTopology::Triangles).with_vertex_count(vertex_count),
        )
        .unwrap()
    }

    #[test]
    fn test_convert_vertex_format() {
        assert_eq!(
            convert_vertex_format(ComponentType::Float32, 3),
            Some(wgpu::VertexFormat::Float32x3)
        );
        assert_eq!(
            convert_vertex_format(ComponentType::Uint8, 4),
            Some(wgpu::VertexFormat::Uint8x4)
        );
        assert_eq!(convert_vertex_format(ComponentType::Uint8, 3), None);
        assert_eq!(convert_vertex_format(ComponentType::Float32, 5), None);
    }

    #[test]
    fn test_interleaved_binding() {
        let mut mesh = mesh(10);
        let buffer = mesh.register_buffer(BufferLayout::Interleaved).unwrap();
        mesh.bind_attribute(buffer, AttributeFormat::of::<[f32; 3]>(0));
        mesh.bind_attribute(buffer, AttributeFormat::of::<[f32; 2]>(1));

        let bindings = vertex_bindings(&mut mesh).unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].offset, 0);
        assert_eq!(bindings[0].array_stride, 20);
        assert_eq!(bindings[0].attributes[1].offset, 12);
        assert_eq!(bindings[0].attributes[1].shader_location, 1);
        assert_eq!(bindings[0].layout().attributes.len(), 2);
    }

    #[test]
    fn test_sequential_bindings() {
        let mut mesh = mesh(10);
        let buffer = mesh.register_buffer(BufferLayout::Sequential).unwrap();
        mesh.bind_attribute(buffer, AttributeFormat::of::<[f32; 3]>(0));
        mesh.bind_attribute(buffer, AttributeFormat::of::<[f32; 2]>(1));
        mesh.register_buffer(BufferLayout::Interleaved).unwrap();

        let bindings = vertex_bindings(&mut mesh).unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[1].offset, 120);
        assert_eq!(bindings[1].array_stride, 8);
        assert_eq!(bindings[1].attributes[0].offset, 0);
        assert_eq!(bindings[0].buffer, bindings[1].buffer);
    }

    #[rstest]
    #[case::short_record(BufferLayout::Interleaved, 4, vec![AttributeFormat::of::<[u8; 2]>(0)])]
    #[case::unaligned_float(
        BufferLayout::Interleaved,
        4,
        vec![
            AttributeFormat::of::<[u8; 2]>(0),
            AttributeFormat::of::<f32>(1),
            AttributeFormat::of::<[u8; 2]>(2),
        ]
    )]
    #[case::odd_block_offset(
        BufferLayout::Sequential,
        3,
        vec![AttributeFormat::of::<[u8; 2]>(0), AttributeFormat::of::<[f32; 3]>(1)]
    )]
    fn test_misaligned_layout(
        #[case] layout: BufferLayout,
        #[case] vertex_count: u32,
        #[case] formats: Vec<AttributeFormat>,
    ) {
        let mut mesh = mesh(vertex_count);
        let buffer = mesh.register_buffer(layout).unwrap();
        for format in formats {
            assert!(mesh.bind_attribute(buffer, format).is_bound());
        }

        assert!(matches!(
            vertex_bindings(&mut mesh),
            Err(GraphicsError::FeatureNotSupported(_))
        ));
    }

    #[test]
    fn test_aligned_small_components() {
        let mut mesh = mesh(3);
        let interleaved = mesh.register_buffer(BufferLayout::Interleaved).unwrap();
        mesh.bind_attribute(interleaved, AttributeFormat::of::<[u16; 2]>(0));
        mesh.bind_attribute(interleaved, AttributeFormat::of::<[u8; 4]>(1));
        let sequential = mesh.register_buffer(BufferLayout::Sequential).unwrap();
        mesh.bind_attribute(sequential, AttributeFormat::of::<[u16; 2]>(2));
        mesh.bind_attribute(sequential, AttributeFormat::of::<[f32; 3]>(3));

        let bindings = vertex_bindings(&mut mesh).unwrap();
        assert_eq!(bindings.len(), 3);
        assert_eq!(bindings[0].array_stride, 8);
        assert_eq!(bindings[0].attributes[1].offset, 4);
        assert_eq!(bindings[2].offset, 12);
        assert_eq!(bindings[2].array_stride, 12);
    }

    #[test]
    fn test_unsupported_format() {
        let mut mesh = mesh(3);
        let buffer = mesh.register_buffer(BufferLayout::Interleaved).unwrap();
        mesh.bind_attribute(buffer, AttributeFormat::of::<[u8; 3]>(0));

        assert!(matches!(
            vertex_bindings(&mut mesh),
            Err(GraphicsError::FeatureNotSupported(_))
        ));
    }
}
