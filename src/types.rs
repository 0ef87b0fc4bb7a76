use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image dimensions in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    /// Width in pixels
    pub width: u16,
    /// Height in pixels (number of rows)
    pub height: u16,
}

impl ImageSize {
    /// Create a size from width and height in pixels
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Width over height, `None` for a degenerate image
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        Some(f32::from(self.width) / f32::from(self.height))
    }

    /// Total number of pixels (width * height)
    pub fn pixel_count(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Size of the tightly packed RGB buffer for this image
    pub fn rgb_len(&self) -> usize {
        self.pixel_count() * 3
    }

    /// True if either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Driver-specific pixel format identifier (DRM four-character code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PixelFormat(pub u32);

const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*code)
}

impl PixelFormat {
    /// Packed 24-bit RGB, three bytes per pixel
    pub const RGB888: Self = Self(fourcc(b"RG24"));
    /// Packed 4:2:2 YUV, Y0 U Y1 V per pixel pair
    pub const YUYV: Self = Self(fourcc(b"YUYV"));

    /// Build from the four ASCII bytes the driver reports
    pub const fn from_fourcc(code: &[u8; 4]) -> Self {
        Self(fourcc(code))
    }

    /// Bytes per pixel for the formats the converter understands
    /// Bytes per pixel in a packed row, `None` for formats without a known layout
    pub fn bytes_per_pixel(&self) -> Option<usize> {
        match *self {
            Self::RGB888 => Some(3),
            Self::YUYV => Some(2),
            _ => None,
        }
    }

    /// Whether the converter has a decoding path for this format
    pub fn is_supported(&self) -> bool {
        self.bytes_per_pixel().is_some()
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.to_le_bytes();
        if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            let code: String = bytes.iter().map(|&b| char::from(b)).collect();
            write!(f, "'{code}'")
        } else {
            write!(f, "{:#010x}", self.0)
        }
    }
}

/// Metadata attached to a frame by the acquisition side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameHeader {
    /// Acquisition timestamp
    pub timestamp: DateTime<Utc>,
    /// Bytes per row of pixels
    pub pitch: u32,
    pub size: ImageSize,
    pub format: PixelFormat,
}

impl FrameHeader {
    /// True if dimensions and format match
    /// Same size and pixel format; timestamp and pitch are ignored
    pub fn matches_format(&self, other: &FrameHeader) -> bool {
        (self.size, self.format) == (other.size, other.format)
    }
}

/// A single camera frame. The pixel data is borrowed from the acquisition
/// side and is only valid for the duration of the call that delivers it.
#[derive(Debug, Clone, Copy)]
pub struct ImageFrame<'a> {
    pub header: FrameHeader,
    pub pixels: &'a [u8],
}

impl<'a> ImageFrame<'a> {
    pub fn new(header: FrameHeader, pixels: &'a [u8]) -> Self {
        Self { header, pixels }
    }
}
