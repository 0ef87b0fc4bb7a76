pub mod cli;
pub mod config;
pub mod convert;
pub mod core;
pub mod display;
pub mod error;
pub mod logging;
pub mod source;
pub mod types;

pub use config::{DisplayConfig, GraphicsProfile};
pub use convert::{convert_to_rgb, Conversion};
pub use display::Display;
pub use error::{ConfigError, DisplayError, FrameError};
pub use types::{FrameHeader, ImageFrame, ImageSize, PixelFormat};
