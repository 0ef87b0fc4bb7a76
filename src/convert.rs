//! Sensor pixel formats to packed RGB.
//!
//! The output is always `width * height * 3` bytes, row-major, with no row
//! padding regardless of the input pitch.

use crate::error::FrameError;
use crate::types::{FrameHeader, ImageFrame, PixelFormat};

/// Diagnostic fill for formats the converter does not understand
pub const MAGENTA: [u8; 3] = [255, 0, 255];

/// Which path produced the RGB buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Rgb888,
    Yuyv,
    /// Buffer holds the magenta error pattern
    Unsupported(PixelFormat),
}

/// Check that the header describes readable data within `available` bytes.
///
/// The last row does not need to carry pitch padding. Formats without a
/// known layout pass, their pixels are never read.
pub fn validate(header: &FrameHeader, available: usize) -> Result<(), FrameError> {
    let Some(bytes_per_pixel) = header.format.bytes_per_pixel() else {
        return Ok(());
    };

    let width = usize::from(header.size.width);
    let height = usize::from(header.size.height);

    if header.format == PixelFormat::YUYV && width % 2 != 0 {
        return Err(FrameError::OddWidth {
            format: header.format,
            width: header.size.width,
        });
    }

    let row_bytes = width * bytes_per_pixel;
    let pitch = header.pitch as usize;
    if pitch < row_bytes {
        return Err(FrameError::PitchTooSmall {
            format: header.format,
            pitch: header.pitch,
            row_bytes,
        });
    }

    let required = match height {
        0 => Some(0),
        rows => pitch
            .checked_mul(rows - 1)
            .and_then(|n| n.checked_add(row_bytes)),
    }
    .ok_or(FrameError::LayoutOverflow {
        size: header.size,
        pitch: u64::from(header.pitch),
    })?;
    if available < required {
        return Err(FrameError::Truncated {
            required,
            available,
        });
    }

    Ok(())
}

/// Convert a frame into `rgb`, resizing it only when the dimensions changed.
///
/// Rejected frames leave `rgb` untouched.
pub fn convert_to_rgb(frame: &ImageFrame<'_>, rgb: &mut Vec<u8>) -> Result<Conversion, FrameError> {
    let header = &frame.header;
    validate(header, frame.pixels.len())?;

    rgb.resize(header.size.rgb_len(), 0);

    let width = usize::from(header.size.width);
    let pitch = header.pitch as usize;

    match header.format {
        PixelFormat::RGB888 => {
            if !rgb.is_empty() {
                copy_rgb888(frame.pixels, pitch, width, rgb);
            }
            Ok(Conversion::Rgb888)
        }
        PixelFormat::YUYV => {
            if !rgb.is_empty() {
                convert_yuyv(frame.pixels, pitch, width, rgb);
            }
            Ok(Conversion::Yuyv)
        }
        other => {
            log::warn!("unsupported pixel format {other}, displaying error pattern");
            fill(rgb, MAGENTA);
            Ok(Conversion::Unsupported(other))
        }
    }
}

fn copy_rgb888(src: &[u8], pitch: usize, width: usize, rgb: &mut [u8]) {
    let row_bytes = width * 3;
    for (dst, row) in rgb.chunks_exact_mut(row_bytes).zip(src.chunks(pitch)) {
        dst.copy_from_slice(&row[..row_bytes]);
    }
}

fn convert_yuyv(src: &[u8], pitch: usize, width: usize, rgb: &mut [u8]) {
    let row_bytes = width * 3;
    for (dst, row) in rgb.chunks_exact_mut(row_bytes).zip(src.chunks(pitch)) {
        let pairs = dst.chunks_exact_mut(6).zip(row[..width * 2].chunks_exact(4));
        for (out, group) in pairs {
            let (y0, u, y1, v) = (group[0], group[1], group[2], group[3]);
            out[..3].copy_from_slice(&yuv_to_rgb(y0, u, v));
            out[3..].copy_from_slice(&yuv_to_rgb(y1, u, v));
        }
    }
}

/// BT.601 studio-swing YUV to RGB in fixed point
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = i32::from(y) - 16;
    let d = i32::from(u) - 128;
    let e = i32::from(v) - 128;

    [
        clamp_channel((298 * c + 409 * e + 128) >> 8),
        clamp_channel((298 * c - 100 * d - 208 * e + 128) >> 8),
        clamp_channel((298 * c + 516 * d + 128) >> 8),
    ]
}

fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

fn fill(rgb: &mut [u8], color: [u8; 3]) {
    for pixel in rgb.chunks_exact_mut(3) {
        pixel.copy_from_slice(&color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn black_and_white_hit_the_rails() {
        assert_eq!(yuv_to_rgb(16, 128, 128), [0, 0, 0]);
        assert_eq!(yuv_to_rgb(235, 128, 128), [255, 255, 255]);
    }

    #[test]
    fn out_of_range_chroma_is_clamped() {
        // saturated red corner pushes blue and green below zero
        assert_eq!(yuv_to_rgb(81, 90, 240), [255, 0, 0]);
        assert_eq!(yuv_to_rgb(255, 255, 255), [255, 125, 255]);
        assert_eq!(yuv_to_rgb(0, 0, 0), [0, 135, 0]);
    }

    #[test]
    fn fill_writes_every_pixel() {
        let mut buf = vec![0u8; 9];
        fill(&mut buf, MAGENTA);
        assert_eq!(buf, [255, 0, 255, 255, 0, 255, 255, 0, 255]);
    }

    #[test]
    fn huge_pitch_never_wraps() {
        let header = FrameHeader {
            timestamp: chrono::Utc::now(),
            pitch: u32::MAX,
            size: crate::types::ImageSize::new(2, 3),
            format: PixelFormat::RGB888,
        };
        let err = validate(&header, 64).unwrap_err();

        // 32-bit targets cannot even express the required length
        #[cfg(target_pointer_width = "32")]
        assert!(matches!(err, FrameError::LayoutOverflow { .. }));
        #[cfg(not(target_pointer_width = "32"))]
        assert_eq!(
            err,
            FrameError::Truncated {
                required: u32::MAX as usize * 2 + 6,
                available: 64
            }
        );
    }
}
