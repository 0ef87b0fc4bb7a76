use std::path::PathBuf;

use thiserror::Error;

use crate::config::GraphicsProfile;
use crate::types::{ImageSize, PixelFormat};

/// A frame the converter refuses to read. The display keeps showing the
/// previous frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("{format} frame width {width} is odd, 4:2:2 data needs whole pixel pairs")]
    OddWidth { format: PixelFormat, width: u16 },

    #[error("row pitch of {pitch} bytes is shorter than the {row_bytes} bytes of a {format} row")]
    PitchTooSmall {
        format: PixelFormat,
        pitch: u32,
        row_bytes: usize,
    },

    #[error("frame holds {available} bytes of pixel data, {required} required")]
    Truncated { required: usize, available: usize },

    #[error("{size} frame exceeds the device texture limit of {max} pixels")]
    TooLarge { size: ImageSize, max: u32 },

    #[error("{size} frame with a {pitch} byte pitch does not fit in addressable memory")]
    LayoutOverflow { size: ImageSize, pitch: u64 },
}

/// Display construction and rendering failures
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("failed to create event loop: {0}")]
    EventLoop(String),

    #[error("failed to create window: {0}")]
    Window(String),

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no {profile} adapter available: {source}")]
    Adapter {
        profile: GraphicsProfile,
        #[source]
        source: wgpu::RequestAdapterError,
    },

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface is not supported by the selected adapter")]
    SurfaceUnsupported,

    #[error("shader compilation failed: {0}")]
    Shader(String),

    #[error("render pipeline creation failed: {0}")]
    Pipeline(String),

    #[error("surface failure: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("rgb buffer holds {actual} bytes, {size} needs {expected}")]
    UploadSize {
        size: ImageSize,
        expected: usize,
        actual: usize,
    },

    #[error("buffer readback failed: {0}")]
    Readback(String),

    #[error("display resources have already been released")]
    Released,

    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl DisplayError {
    /// Everything but a rejected frame means the rendering context is unusable
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Frame(_))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
