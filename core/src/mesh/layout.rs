//! Vertex attribute layout computation.
//!
//! Every vertex buffer of a mesh stores its attributes in one of two
//! arrangements, described by [`BufferLayout`]:
//!
//! - **Interleaved**: one record per vertex holding all attributes of the
//!   buffer back to back. Every attribute shares the record size as stride.
//! - **Sequential**: one contiguous block per attribute, each block holding
//!   that attribute for all vertices. Each attribute's stride is its own size,
//!   and its offset depends on the vertex count.
//!
//! Attributes are described up front by an [`AttributeFormat`] (location,
//! component count, component type). Once bound to a buffer they become
//! [`VertexAttribute`]s whose stride and offset are filled in by
//! [`compute_layout`].
//!
//! # Example
//!
//! ```ignore
//! // position (float3) followed by texcoord (float2), 10 vertices
//! let mut attributes = [
//!     VertexAttribute::new(AttributeFormat::of::<[f32; 3]>(0)),
//!     VertexAttribute::new(AttributeFormat::of::<[f32; 2]>(1)),
//! ];
//!
//! compute_layout(BufferLayout::Interleaved, &mut attributes, 10);
//! assert_eq!(attributes[1].stride(), 20);
//! assert_eq!(attributes[1].offset(), 12);
//!
//! compute_layout(BufferLayout::Sequential, &mut attributes, 10);
//! assert_eq!(attributes[1].stride(), 8);
//! assert_eq!(attributes[1].offset(), 120);
//! ```

/// Numeric type of a single attribute component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// 8-bit signed integer.
    Int8,
    /// 8-bit unsigned integer.
    Uint8,
    /// 16-bit signed integer.
    Int16,
    /// 16-bit unsigned integer.
    Uint16,
    /// 32-bit signed integer.
    Int32,
    /// 32-bit unsigned integer.
    Uint32,
    /// 16-bit float.
    Float16,
    /// 32-bit float.
    Float32,
    /// 64-bit float.
    Float64,
}

impl ComponentType {
    /// Get the size in bytes of one component.
    pub fn size(&self) -> u32 {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 | Self::Float16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// Whether this is a floating-point type.
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float16 | Self::Float32 | Self::Float64)
    }

    /// Whether this is a signed type (floats included).
    pub fn is_signed(&self) -> bool {
        !matches!(self, Self::Uint8 | Self::Uint16 | Self::Uint32)
    }
}

/// How the attributes of one vertex buffer are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferLayout {
    /// All attributes of a vertex are packed together, one record per vertex.
    #[default]
    Interleaved,
    /// Each attribute is stored as one contiguous block covering all vertices.
    Sequential,
}

/// Rust types that map onto a vertex attribute's components.
///
/// Lets callers derive an [`AttributeFormat`] from the type they upload:
///
/// ```ignore
/// let position = AttributeFormat::of::<[f32; 3]>(0);
/// assert_eq!(position.component_count, 3);
/// assert_eq!(position.component_type, ComponentType::Float32);
/// ```
pub trait VertexComponents: bytemuck::Pod {
    /// Type of every component.
    const COMPONENT_TYPE: ComponentType;
    /// Number of components.
    const COMPONENT_COUNT: u32;
}

macro_rules! impl_vertex_components {
    ($($ty:ty => $component:ident),* $(,)?) => {
        $(
            impl VertexComponents for $ty {
                const COMPONENT_TYPE: ComponentType = ComponentType::$component;
                const COMPONENT_COUNT: u32 = 1;
            }
        )*
    };
}

impl_vertex_components! {
    i8 => Int8,
    u8 => Uint8,
    i16 => Int16,
    u16 => Uint16,
    i32 => Int32,
    u32 => Uint32,
    f32 => Float32,
    f64 => Float64,
}

impl<T: VertexComponents, const N: usize> VertexComponents for [T; N]
where
    [T; N]: bytemuck::Pod,
{
    const COMPONENT_TYPE: ComponentType = T::COMPONENT_TYPE;
    const COMPONENT_COUNT: u32 = T::COMPONENT_COUNT * N as u32;
}

/// Caller-supplied description of an attribute to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeFormat {
    /// Shader location of the attribute. Unique within a mesh.
    pub location: u32,
    /// Number of components per vertex.
    pub component_count: u32,
    /// Type of every component.
    pub component_type: ComponentType,
}

impl AttributeFormat {
    /// Create a new attribute format.
    pub fn new(location: u32, component_count: u32, component_type: ComponentType) -> Self {
        Self {
            location,
            component_count,
            component_type,
        }
    }

    /// Create an attribute format matching the Rust type `T`.
    pub fn of<T: VertexComponents>(location: u32) -> Self {
        Self::new(location, T::COMPONENT_COUNT, T::COMPONENT_TYPE)
    }

    /// Size in bytes of one vertex's value.
    ///
    /// Saturates at `u32::MAX`; use [`checked_byte_size`](Self::checked_byte_size)
    /// to detect formats whose size doesn't fit.
    pub fn byte_size(&self) -> u32 {
        self.component_count.saturating_mul(self.component_type.size())
    }

    /// Size in bytes of one vertex's value, or `None` if it overflows `u32`.
    pub fn checked_byte_size(&self) -> Option<u32> {
        self.component_count.checked_mul(self.component_type.size())
    }
}

/// An attribute bound to a vertex buffer.
///
/// Stride and offset are zero until the owning buffer's layout has been
/// computed with [`compute_layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    format: AttributeFormat,
    stride: u32,
    offset: u64,
}

impl VertexAttribute {
    /// Create an attribute with an uncomputed layout.
    pub fn new(format: AttributeFormat) -> Self {
        Self {
            format,
            stride: 0,
            offset: 0,
        }
    }

    /// The caller-supplied format.
    pub fn format(&self) -> &AttributeFormat {
        &self.format
    }

    /// Shader location.
    pub fn location(&self) -> u32 {
        self.format.location
    }

    /// Number of components per vertex.
    pub fn component_count(&self) -> u32 {
        self.format.component_count
    }

    /// Type of every component.
    pub fn component_type(&self) -> ComponentType {
        self.format.component_type
    }

    /// Size in bytes of one vertex's value.
    pub fn byte_size(&self) -> u32 {
        self.format.byte_size()
    }

    /// Distance in bytes between this attribute's values for consecutive vertices.
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Distance in bytes from the start of the buffer to the first vertex's value.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

/// Compute stride and offset of every attribute stored in one buffer.
///
/// `attributes` must be in binding order; the order decides the offsets.
/// An empty slice is left untouched. Strides saturate at `u32::MAX` and
/// offsets at `u64::MAX`.
pub fn compute_layout(layout: BufferLayout, attributes: &mut [VertexAttribute], vertex_count: u32) {
    match layout {
        BufferLayout::Interleaved => {
            let stride = record_size(attributes).unwrap_or(u32::MAX);
            let mut offset = 0u64;
            for attribute in attributes.iter_mut() {
                attribute.stride = stride;
                attribute.offset = offset;
                offset += u64::from(attribute.byte_size());
            }
        }
        BufferLayout::Sequential => {
            let mut offset = 0u64;
            for attribute in attributes.iter_mut() {
                let size = attribute.byte_size();
                attribute.stride = size;
                attribute.offset = offset;
                offset = offset.saturating_add(u64::from(vertex_count) * u64::from(size));
            }
        }
    }
}

/// Size in bytes of one interleaved record holding `attributes`, or `None`
/// if it doesn't fit in `u32`.
pub fn record_size(attributes: &[VertexAttribute]) -> Option<u32> {
    attributes.iter().try_fold(0u32, |size, attribute| {
        size.checked_add(attribute.format.checked_byte_size()?)
    })
}

/// Number of bytes a buffer needs to hold `vertex_count` vertices of `attributes`.
///
/// The result is the same for both layouts; only the arrangement differs.
pub fn buffer_size(attributes: &[VertexAttribute], vertex_count: u32) -> u64 {
    attributes
        .iter()
        .map(|attribute| u64::from(attribute.byte_size()) * u64::from(vertex_count))
        .fold(0, u64::saturating_add)
}
