//! Synthetic frame source used in place of a camera.

use chrono::Utc;

use crate::convert::validate;
use crate::error::FrameError;
use crate::types::{FrameHeader, ImageFrame, ImageSize, PixelFormat};

/// White, yellow, cyan, green, magenta, red, blue, black
pub const COLOR_BARS: [[u8; 3]; 8] = [
    [255, 255, 255],
    [255, 255, 0],
    [0, 255, 255],
    [0, 255, 0],
    [255, 0, 255],
    [255, 0, 0],
    [0, 0, 255],
    [0, 0, 0],
];

/// Filler byte for formats the pattern cannot draw
const NOISE: u8 = 0x5a;

/// BT.601 studio-swing RGB to YUV in fixed point
pub fn rgb_to_yuv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
    let y = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
    [y, u, v].map(|c| c.clamp(0, 255) as u8)
}

/// Scrolling color bars, redrawn on every [`TestPattern::next_frame`]
#[derive(Debug, Clone)]
pub struct TestPattern {
    size: ImageSize,
    format: PixelFormat,
    pitch: u32,
    pixels: Vec<u8>,
    frame_number: u64,
}

impl TestPattern {
    /// `row_padding` extra bytes are appended to every row.
    ///
    /// Fails for layouts the converter would reject, or whose pitch or buffer
    /// size overflows.
    pub fn new(size: ImageSize, format: PixelFormat, row_padding: u32) -> Result<Self, FrameError> {
        let bytes_per_pixel = format.bytes_per_pixel().unwrap_or(2) as u32;
        let overflow = || FrameError::LayoutOverflow {
            size,
            pitch: u64::from(size.width) * u64::from(bytes_per_pixel) + u64::from(row_padding),
        };

        let pitch = u32::from(size.width)
            .checked_mul(bytes_per_pixel)
            .and_then(|row| row.checked_add(row_padding))
            .ok_or_else(overflow)?;
        let len = usize::try_from(pitch)
            .ok()
            .and_then(|pitch| pitch.checked_mul(usize::from(size.height)))
            .ok_or_else(overflow)?;
        let pixels = vec![0u8; len];

        let header = FrameHeader {
            timestamp: Utc::now(),
            pitch,
            size,
            format,
        };
        validate(&header, pixels.len())?;

        Ok(Self {
            size,
            format,
            pitch,
            pixels,
            frame_number: 0,
        })
    }

    /// Frames handed out so far
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Draw the next frame and lend it out
    pub fn next_frame(&mut self) -> ImageFrame<'_> {
        let offset = self.frame_number as usize;
        self.frame_number += 1;
        self.draw(offset);

        ImageFrame::new(
            FrameHeader {
                timestamp: Utc::now(),
                pitch: self.pitch,
                size: self.size,
                format: self.format,
            },
            &self.pixels,
        )
    }

    fn bar_at(&self, x: usize, offset: usize) -> [u8; 3] {
        let width = usize::from(self.size.width).max(1);
        let index = ((x + offset) % width) * COLOR_BARS.len() / width;
        COLOR_BARS[index]
    }

    fn draw(&mut self, offset: usize) {
        let width = usize::from(self.size.width);
        let pitch = self.pitch as usize;
        if width == 0 || pitch == 0 {
            return;
        }

        let mut row = vec![0u8; pitch];
        match self.format {
            PixelFormat::RGB888 => {
                for x in 0..width {
                    row[x * 3..x * 3 + 3].copy_from_slice(&self.bar_at(x, offset));
                }
            }
            PixelFormat::YUYV => {
                for x in (0..width).step_by(2) {
                    let [y0, u, v] = rgb_to_yuv(self.bar_at(x, offset));
                    let [y1, ..] = rgb_to_yuv(self.bar_at(x + 1, offset));
                    row[x * 2..x * 2 + 4].copy_from_slice(&[y0, u, y1, v]);
                }
            }
            _ => row.fill(NOISE),
        }

        for dst in self.pixels.chunks_exact_mut(pitch) {
            dst.copy_from_slice(&row);
        }
    }
}
