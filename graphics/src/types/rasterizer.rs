//! Rasterizer configuration passed to every draw.
//!
//! Polygon mode, line width and point size are draw-time settings. Instead of
//! switching them globally, callers build a [`RasterizerState`] and hand it to
//! [`Mesh::draw`](crate::Mesh::draw), which forwards it to the backend with the
//! draw command. Two draws with the same state always rasterize the same way,
//! regardless of what was drawn before.
//!
//! # Example
//!
//! ```ignore
//! let wireframe = RasterizerState::new()
//!     .with_polygon_mode(PolygonMode::Line)
//!     .with_line_width(2.0);
//!
//! mesh.draw(&wireframe);
//! mesh.draw(&RasterizerState::default());
//! ```

use crate::error::GraphicsError;

/// How the interior of polygons is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    /// Interior of the polygon is filled.
    #[default]
    Fill,
    /// Boundary edges are drawn as lines, see [`RasterizerState::line_width`].
    Line,
    /// Polygon vertices are drawn as points, see [`RasterizerState::point_size`].
    Point,
}

/// Rasterizer settings for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizerState {
    /// Polygon drawing mode (default: [`PolygonMode::Fill`]).
    pub polygon_mode: PolygonMode,
    /// Width of rasterized lines in pixels (default: 1.0).
    pub line_width: f32,
    /// Size of rasterized points in pixels (default: 1.0).
    ///
    /// Ignored when [`program_point_size`](Self::program_point_size) is set.
    pub point_size: f32,
    /// Take the point size from the vertex shader output instead of
    /// [`point_size`](Self::point_size) (default: false).
    pub program_point_size: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        Self {
            polygon_mode: PolygonMode::Fill,
            line_width: 1.0,
            point_size: 1.0,
            program_point_size: false,
        }
    }
}

impl RasterizerState {
    /// Create the default rasterizer state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the polygon mode.
    pub fn with_polygon_mode(mut self, mode: PolygonMode) -> Self {
        self.polygon_mode = mode;
        self
    }

    /// Set the line width.
    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    /// Set a fixed point size.
    pub fn with_point_size(mut self, size: f32) -> Self {
        self.point_size = size;
        self
    }

    /// Enable or disable shader-controlled point size.
    pub fn with_program_point_size(mut self, enabled: bool) -> Self {
        self.program_point_size = enabled;
        self
    }

    /// Check that line width and point size are positive finite numbers.
    pub fn validate(&self) -> Result<(), GraphicsError> {
        if !(self.line_width.is_finite() && self.line_width > 0.0) {
            return Err(GraphicsError::InvalidParameter(format!(
                "line width must be positive, got {}",
                self.line_width
            )));
        }
        if !(self.point_size.is_finite() && self.point_size > 0.0) {
            return Err(GraphicsError::InvalidParameter(format!(
                "point size must be positive, got {}",
                self.point_size
            )));
        }
        Ok(())
    }
}
