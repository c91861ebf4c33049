//! Mesh-level data types.
//!
//! - [`PrimitiveTopology`] - How vertices are assembled into primitives
//! - [`MeshDescriptor`] - Descriptor for creating GPU meshes

/// Primitive topology describing how vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Each vertex is a separate point.
    Points,
    /// Every two vertices form a line.
    Lines,
    /// Vertices form a connected strip of lines.
    LineStrip,
    /// Like [`LineStrip`](Self::LineStrip), the last vertex is connected back to the first.
    LineLoop,
    /// Every three vertices form a triangle.
    #[default]
    Triangles,
    /// First three vertices form a triangle, each following vertex forms
    /// another triangle with the two before it.
    TriangleStrip,
    /// First vertex is the center, each following vertex forms a triangle
    /// with the previous one and the center.
    TriangleFan,
}

impl PrimitiveTopology {
    /// Get the number of vertices per primitive (for non-connected topologies).
    pub fn vertices_per_primitive(&self) -> Option<u32> {
        match self {
            Self::Points => Some(1),
            Self::Lines => Some(2),
            Self::Triangles => Some(3),
            Self::LineStrip | Self::LineLoop | Self::TriangleStrip | Self::TriangleFan => None,
        }
    }

    /// Number of primitives assembled from `vertex_count` vertices.
    pub fn primitive_count(&self, vertex_count: u32) -> u32 {
        match self {
            Self::Points => vertex_count,
            Self::Lines => vertex_count / 2,
            Self::LineStrip => vertex_count.saturating_sub(1),
            Self::LineLoop => {
                if vertex_count < 2 {
                    0
                } else {
                    vertex_count
                }
            }
            Self::Triangles => vertex_count / 3,
            Self::TriangleStrip | Self::TriangleFan => vertex_count.saturating_sub(2),
        }
    }
}

/// Descriptor for creating a mesh.
///
/// ```ignore
/// let desc = MeshDescriptor::new(PrimitiveTopology::TriangleStrip)
///     .with_vertex_count(4)
///     .with_label("quad");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeshDescriptor {
    /// Primitive topology.
    pub topology: PrimitiveTopology,
    /// Number of vertices.
    pub vertex_count: u32,
    /// Optional label for debugging.
    pub label: Option<String>,
}

impl MeshDescriptor {
    /// Create a new mesh descriptor with the given topology and no vertices.
    pub fn new(topology: PrimitiveTopology) -> Self {
        Self {
            topology,
            vertex_count: 0,
            label: None,
        }
    }

    /// Set the vertex count.
    pub fn with_vertex_count(mut self, count: u32) -> Self {
        self.vertex_count = count;
        self
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
