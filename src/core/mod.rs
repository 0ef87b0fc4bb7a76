pub mod geometry;
pub mod gpu_context;
pub mod render_pipeline;
pub mod surface;
pub mod texture;
pub mod window;

pub use geometry::{letterbox_extent, quad_vertices, Letterbox, QuadVertex};
pub use gpu_context::GpuContext;
pub use render_pipeline::{QuadPipeline, DISPLAY_SHADER};
pub use surface::PresentSurface;
pub use texture::{expand_rgb_to_rgba, texture_format_for, FrameStage, FrameTexture};
pub use window::{FramebufferSize, PresentationWindow, PumpOutcome};
