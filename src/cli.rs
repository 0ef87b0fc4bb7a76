// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{DisplayConfig, GraphicsProfile};
use crate::error::ConfigError;
use crate::types::{ImageSize, PixelFormat};

/// Pixel encoding of the synthetic camera
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Rgb888,
    Yuyv,
    /// A fourcc the converter does not know, shows the error pattern
    Unknown,
}

impl SourceFormat {
    pub fn pixel_format(&self) -> PixelFormat {
        match self {
            Self::Rgb888 => PixelFormat::RGB888,
            Self::Yuyv => PixelFormat::YUYV,
            Self::Unknown => PixelFormat::from_fourcc(b"XXXX"),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "frame-viewer")]
#[command(about = "Live camera frame viewer", long_about = None)]
pub struct Cli {
    /// JSON file with window and context settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Graphics profile, overrides the config file
    #[arg(long, value_enum)]
    pub profile: Option<GraphicsProfile>,

    /// Present as fast as possible instead of on vertical sync
    #[arg(long = "no-vsync", default_value = "false")]
    pub no_vsync: bool,

    /// Pixel format of the test pattern
    #[arg(long, value_enum, default_value = "yuyv")]
    pub format: SourceFormat,

    /// Test pattern width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u16,

    /// Test pattern height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u16,

    /// Extra bytes at the end of every test pattern row
    #[arg(long, default_value_t = 0)]
    pub pitch_padding: u32,

    /// Stop after this many frames
    #[arg(long)]
    pub frames: Option<u64>,

    /// Log filter in env_logger syntax, overrides RUST_LOG
    #[arg(long)]
    pub log: Option<String>,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied
    pub fn display_config(&self) -> Result<DisplayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => DisplayConfig::from_json_file(path)?,
            None => DisplayConfig::default(),
        };
        if let Some(profile) = self.profile {
            config.profile = profile;
        }
        if self.no_vsync {
            config.vsync = false;
        }
        Ok(config)
    }

    /// Test pattern dimensions
    pub fn source_size(&self) -> ImageSize {
        ImageSize::new(self.width, self.height)
    }
}
