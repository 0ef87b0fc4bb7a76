use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_TITLE: &str = "Camera Live View";
pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

/// Which graphics API family the context is created on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GraphicsProfile {
    /// OpenGL ES 3.0 class hardware (e.g. Raspberry Pi 5)
    Embedded,
    /// Vulkan, Metal or DX12
    #[default]
    Desktop,
}

impl GraphicsProfile {
    /// Backends the instance is allowed to pick an adapter from
    pub fn backends(&self) -> wgpu::Backends {
        match self {
            Self::Embedded => wgpu::Backends::GL,
            Self::Desktop => wgpu::Backends::PRIMARY,
        }
    }

    /// Device limits for this profile, with texture sizes raised to what the adapter offers
    pub fn limits(&self, adapter: &wgpu::Limits) -> wgpu::Limits {
        let base = match self {
            Self::Embedded => wgpu::Limits::downlevel_webgl2_defaults(),
            Self::Desktop => wgpu::Limits::default(),
        };
        base.using_resolution(adapter.clone())
    }

    /// Instance settings for this profile. Embedded pins the GL context to ES 3.0.
    pub fn instance_descriptor(&self) -> wgpu::InstanceDescriptor {
        let gles_minor_version = match self {
            Self::Embedded => wgpu::Gles3MinorVersion::Version0,
            Self::Desktop => wgpu::Gles3MinorVersion::Automatic,
        };

        wgpu::InstanceDescriptor {
            backends: self.backends(),
            backend_options: wgpu::BackendOptions {
                gl: wgpu::GlBackendOptions {
                    gles_minor_version,
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn instance(&self) -> wgpu::Instance {
        wgpu::Instance::new(&self.instance_descriptor())
    }
}

impl fmt::Display for GraphicsProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded => f.write_str("embedded (GLES 3.0)"),
            Self::Desktop => f.write_str("desktop"),
        }
    }
}

/// Window and context settings for [`crate::Display`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub title: String,
    /// Initial width in logical pixels
    pub width: u32,
    /// Initial height in logical pixels
    pub height: u32,
    pub resizable: bool,
    pub profile: GraphicsProfile,
    /// Pace presentation to the display refresh
    pub vsync: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            resizable: true,
            profile: GraphicsProfile::default(),
            vsync: true,
        }
    }
}

impl DisplayConfig {
    /// Parse a config, filling missing fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `Fifo` with vsync, otherwise whatever the surface offers without it
    pub fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}
