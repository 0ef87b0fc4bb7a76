use chrono::Utc;
use frame_viewer::convert::{convert_to_rgb, yuv_to_rgb, Conversion, MAGENTA};
use frame_viewer::{FrameError, FrameHeader, ImageFrame, ImageSize, PixelFormat};

fn header(format: PixelFormat, width: u16, height: u16, pitch: u32) -> FrameHeader {
    FrameHeader {
        timestamp: Utc::now(),
        pitch,
        size: ImageSize::new(width, height),
        format,
    }
}

/// Direct application of the BT.601 integer formulas, one pixel pair at a time
fn reference_yuyv(pixels: &[u8], width: usize, height: usize, pitch: usize) -> Vec<u8> {
    let clamp = |v: i32| v.clamp(0, 255) as u8;
    let mut out = Vec::with_capacity(width * height * 3);
    for row in 0..height {
        for pair in 0..width / 2 {
            let base = row * pitch + pair * 4;
            let (y0, u, y1, v) = (
                pixels[base] as i32,
                pixels[base + 1] as i32,
                pixels[base + 2] as i32,
                pixels[base + 3] as i32,
            );
            let (d, e) = (u - 128, v - 128);
            for y in [y0, y1] {
                let c = y - 16;
                out.push(clamp((298 * c + 409 * e + 128) >> 8));
                out.push(clamp((298 * c - 100 * d - 208 * e + 128) >> 8));
                out.push(clamp((298 * c + 516 * d + 128) >> 8));
            }
        }
    }
    out
}

// ============================================================================
// RGB888
// ============================================================================

#[test]
fn test_rgb888_tight_frame_is_copied_verbatim() {
    // 4x2, pitch 12: no padding at all
    let pixels: Vec<u8> = (0..24).collect();
    let frame = ImageFrame::new(header(PixelFormat::RGB888, 4, 2, 12), &pixels);

    let mut rgb = Vec::new();
    let conversion = convert_to_rgb(&frame, &mut rgb).unwrap();

    assert_eq!(conversion, Conversion::Rgb888);
    assert_eq!(rgb, pixels);
}

#[test]
fn test_rgb888_pitch_padding_is_dropped() {
    let (width, height, pitch) = (3usize, 4usize, 16usize);
    let mut pixels = vec![0xEE; pitch * height];
    for y in 0..height {
        for x in 0..width * 3 {
            pixels[y * pitch + x] = (y * 10 + x) as u8;
        }
    }
    let frame = ImageFrame::new(
        header(PixelFormat::RGB888, width as u16, height as u16, pitch as u32),
        &pixels,
    );

    let mut rgb = Vec::new();
    convert_to_rgb(&frame, &mut rgb).unwrap();

    assert_eq!(rgb.len(), width * height * 3);
    for y in 0..height {
        let out_row = &rgb[y * width * 3..(y + 1) * width * 3];
        let in_row = &pixels[y * pitch..y * pitch + width * 3];
        assert_eq!(out_row, in_row, "row {y}");
    }
    assert!(!rgb.contains(&0xEE));
}

#[test]
fn test_rgb888_last_row_may_omit_padding() {
    // two rows at pitch 8, but the final row only carries its 6 data bytes
    let pixels = [1, 2, 3, 4, 5, 6, 0, 0, 7, 8, 9, 10, 11, 12];
    let frame = ImageFrame::new(header(PixelFormat::RGB888, 2, 2, 8), &pixels);

    let mut rgb = Vec::new();
    convert_to_rgb(&frame, &mut rgb).unwrap();
    assert_eq!(rgb, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
}

// ============================================================================
// YUYV
// ============================================================================

#[test]
fn test_yuyv_mid_gray() {
    let pixels = [128u8, 128, 128, 128];
    let frame = ImageFrame::new(header(PixelFormat::YUYV, 2, 1, 4), &pixels);

    let mut rgb = Vec::new();
    let conversion = convert_to_rgb(&frame, &mut rgb).unwrap();

    assert_eq!(conversion, Conversion::Yuyv);
    assert_eq!(rgb, [130, 130, 130, 130, 130, 130]);
    assert!(rgb.iter().all(|&c| (c as i32 - 127).abs() <= 4));
}

#[test]
fn test_yuyv_matches_reference_formula() {
    let (width, height, pitch) = (6usize, 3usize, 16usize);
    // deterministic spread over the whole byte range, padding included
    let pixels: Vec<u8> = (0..pitch * height)
        .map(|i| ((i * 73 + 19) % 256) as u8)
        .collect();
    let frame = ImageFrame::new(
        header(PixelFormat::YUYV, width as u16, height as u16, pitch as u32),
        &pixels,
    );

    let mut rgb = Vec::new();
    convert_to_rgb(&frame, &mut rgb).unwrap();

    assert_eq!(rgb, reference_yuyv(&pixels, width, height, pitch));
}

#[test]
fn test_yuyv_pair_shares_chroma() {
    let pixels = [16u8, 128, 235, 128];
    let frame = ImageFrame::new(header(PixelFormat::YUYV, 2, 1, 4), &pixels);

    let mut rgb = Vec::new();
    convert_to_rgb(&frame, &mut rgb).unwrap();

    assert_eq!(&rgb[..3], &yuv_to_rgb(16, 128, 128));
    assert_eq!(&rgb[3..], &yuv_to_rgb(235, 128, 128));
    assert_eq!(rgb, [0, 0, 0, 255, 255, 255]);
}

#[test]
fn test_yuyv_odd_width_is_rejected() {
    let pixels = [0u8; 8];
    let frame = ImageFrame::new(header(PixelFormat::YUYV, 3, 1, 8), &pixels);

    let mut rgb = vec![9u8; 3];
    let err = convert_to_rgb(&frame, &mut rgb).unwrap_err();

    assert!(matches!(err, FrameError::OddWidth { width: 3, .. }));
    assert_eq!(rgb, [9, 9, 9], "rejected frames leave the buffer alone");
}

// ============================================================================
// Unsupported formats
// ============================================================================

#[test]
fn test_unsupported_format_fills_magenta() {
    let format = PixelFormat::from_fourcc(b"NV12");
    let pixels = [0u8; 4];
    let frame = ImageFrame::new(header(format, 5, 3, 5), &pixels);

    let mut rgb = Vec::new();
    let conversion = convert_to_rgb(&frame, &mut rgb).unwrap();

    assert_eq!(conversion, Conversion::Unsupported(format));
    assert_eq!(rgb.len(), 5 * 3 * 3);
    assert!(rgb.chunks_exact(3).all(|px| px == MAGENTA));
}

// ============================================================================
// Validation and buffer reuse
// ============================================================================

#[test]
fn test_truncated_frame_is_rejected() {
    let pixels = [0u8; 20];
    let frame = ImageFrame::new(header(PixelFormat::RGB888, 4, 2, 12), &pixels);

    let err = convert_to_rgb(&frame, &mut Vec::new()).unwrap_err();
    assert_eq!(
        err,
        FrameError::Truncated {
            required: 24,
            available: 20
        }
    );
}

#[test]
fn test_pitch_shorter_than_row_is_rejected() {
    let pixels = [0u8; 64];
    let frame = ImageFrame::new(header(PixelFormat::RGB888, 4, 2, 10), &pixels);

    let err = convert_to_rgb(&frame, &mut Vec::new()).unwrap_err();
    assert!(matches!(err, FrameError::PitchTooSmall { pitch: 10, row_bytes: 12, .. }));
}

#[test]
fn test_empty_frame_converts_to_empty_buffer() {
    let frame = ImageFrame::new(header(PixelFormat::RGB888, 0, 0, 0), &[]);
    let mut rgb = vec![1, 2, 3];
    convert_to_rgb(&frame, &mut rgb).unwrap();
    assert!(rgb.is_empty());
}

#[test]
fn test_buffer_is_reused_for_same_size() {
    let pixels = vec![7u8; 64 * 48 * 3];
    let frame = ImageFrame::new(header(PixelFormat::RGB888, 64, 48, 64 * 3), &pixels);

    let mut rgb = Vec::new();
    convert_to_rgb(&frame, &mut rgb).unwrap();
    let ptr = rgb.as_ptr();

    convert_to_rgb(&frame, &mut rgb).unwrap();
    assert_eq!(rgb.as_ptr(), ptr);
    assert_eq!(rgb.len(), 64 * 48 * 3);
}

#[test]
fn test_buffer_tracks_size_changes() {
    let big = vec![1u8; 8 * 8 * 3];
    let small = vec![2u8; 2 * 2 * 3];
    let mut rgb = Vec::new();

    convert_to_rgb(&ImageFrame::new(header(PixelFormat::RGB888, 8, 8, 24), &big), &mut rgb).unwrap();
    assert_eq!(rgb.len(), 192);

    convert_to_rgb(&ImageFrame::new(header(PixelFormat::RGB888, 2, 2, 6), &small), &mut rgb).unwrap();
    assert_eq!(rgb, small);
}
