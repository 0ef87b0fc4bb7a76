//! Letterbox geometry for the frame quad.
//!
//! The quad lives in clip space ([-1, 1] on both axes). Its aspect ratio
//! follows the image, and it is scaled down on whichever axis the window has
//! to spare, so the rest of the framebuffer shows the black clear color.

use glam::Vec2;

use super::window::FramebufferSize;

/// One corner of the frame quad
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

impl QuadVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

pub const QUAD_VERTEX_COUNT: u32 = 4;

/// Half-extents of the letterboxed quad.
///
/// `None` for a zero-sized framebuffer or a non-positive aspect ratio.
pub fn letterbox_extent(framebuffer: FramebufferSize, image_aspect: f32) -> Option<Vec2> {
    let window_aspect = framebuffer.aspect_ratio()?;
    if !image_aspect.is_finite() || image_aspect <= 0.0 {
        return None;
    }

    if window_aspect > image_aspect {
        Some(Vec2::new(image_aspect / window_aspect, 1.0))
    } else {
        Some(Vec2::new(1.0, window_aspect / image_aspect))
    }
}

/// Vertices in triangle-strip order: top-left, bottom-left, top-right, bottom-right.
///
/// Texture row 0 is the top of the image.
pub fn quad_vertices(extent: Vec2) -> [QuadVertex; 4] {
    let Vec2 { x, y } = extent;
    [
        QuadVertex {
            position: [-x, y],
            tex_coord: [0.0, 0.0],
        },
        QuadVertex {
            position: [-x, -y],
            tex_coord: [0.0, 1.0],
        },
        QuadVertex {
            position: [x, y],
            tex_coord: [1.0, 0.0],
        },
        QuadVertex {
            position: [x, -y],
            tex_coord: [1.0, 1.0],
        },
    ]
}

/// Last computed quad, kept when the framebuffer collapses
#[derive(Debug, Clone, PartialEq)]
pub struct Letterbox {
    extent: Vec2,
    vertices: [QuadVertex; 4],
}

impl Letterbox {
    /// Full-screen quad
    pub fn new() -> Self {
        Self {
            extent: Vec2::ONE,
            vertices: quad_vertices(Vec2::ONE),
        }
    }

    /// Recompute for the current framebuffer. Returns false and keeps the
    /// previous geometry when no extent can be derived.
    pub fn update(&mut self, framebuffer: FramebufferSize, image_aspect: f32) -> bool {
        match letterbox_extent(framebuffer, image_aspect) {
            Some(extent) => {
                self.extent = extent;
                self.vertices = quad_vertices(extent);
                true
            }
            None => false,
        }
    }

    /// Half-extents of the current quad in clip space
    pub fn extent(&self) -> Vec2 {
        self.extent
    }

    pub fn vertices(&self) -> &[QuadVertex; 4] {
        &self.vertices
    }
}

impl Default for Letterbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_four_floats() {
        assert_eq!(std::mem::size_of::<QuadVertex>(), 16);
        assert_eq!(QuadVertex::layout().array_stride, 16);
    }

    #[test]
    fn wide_window_pillarboxes() {
        let extent = letterbox_extent(FramebufferSize::new(1600, 800), 1.0).unwrap();
        assert_eq!(extent, Vec2::new(0.5, 1.0));
    }

    #[test]
    fn texcoords_ignore_scaling() {
        let verts = quad_vertices(Vec2::new(0.25, 1.0));
        let coords: Vec<[f32; 2]> = verts.iter().map(|v| v.tex_coord).collect();
        assert_eq!(coords, vec![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]]);
    }

    #[test]
    fn bad_image_aspect_keeps_geometry() {
        let mut letterbox = Letterbox::new();
        assert!(letterbox.update(FramebufferSize::new(200, 100), 1.0));
        let before = letterbox.clone();
        assert!(!letterbox.update(FramebufferSize::new(200, 100), 0.0));
        assert!(!letterbox.update(FramebufferSize::new(200, 100), f32::NAN));
        assert_eq!(letterbox, before);
    }
}
