use glam::Vec2;
use frame_viewer::core::{letterbox_extent, quad_vertices, FramebufferSize, Letterbox};

fn assert_close(actual: Vec2, expected: Vec2) {
    assert!(
        (actual - expected).abs().max_element() < 1e-6,
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn test_wide_window_square_image() {
    // window aspect 2.0, image aspect 1.0
    let extent = letterbox_extent(FramebufferSize::new(1280, 640), 1.0).unwrap();
    assert_close(extent, Vec2::new(0.5, 1.0));
}

#[test]
fn test_square_window_wide_image() {
    // window aspect 1.0, image aspect 2.0
    let extent = letterbox_extent(FramebufferSize::new(720, 720), 2.0).unwrap();
    assert_close(extent, Vec2::new(1.0, 0.5));
}

#[test]
fn test_equal_aspects_fill_the_square() {
    let extent = letterbox_extent(FramebufferSize::new(1280, 720), 1280.0 / 720.0).unwrap();
    assert_close(extent, Vec2::ONE);

    let verts = quad_vertices(extent);
    let xs: Vec<f32> = verts.iter().map(|v| v.position[0]).collect();
    let ys: Vec<f32> = verts.iter().map(|v| v.position[1]).collect();
    assert_eq!(xs, vec![-1.0, -1.0, 1.0, 1.0]);
    assert_eq!(ys, vec![1.0, -1.0, 1.0, -1.0]);
}

#[test]
fn test_quad_keeps_image_proportions() {
    let cases = [
        (1280, 720, 4.0 / 3.0),
        (800, 600, 16.0 / 9.0),
        (1080, 1920, 1.0),
        (3840, 1080, 0.5),
        (333, 777, 3.0),
    ];

    for (width, height, image_aspect) in cases {
        let fb = FramebufferSize::new(width, height);
        let extent = letterbox_extent(fb, image_aspect).unwrap();

        // never outside the window
        assert!(extent.x <= 1.0 && extent.y <= 1.0);
        // one axis always spans the full range
        assert!(extent.x == 1.0 || extent.y == 1.0);
        // on-screen aspect equals the image's
        let on_screen = (extent.x * width as f32) / (extent.y * height as f32);
        assert!(
            (on_screen - image_aspect).abs() < 1e-3,
            "{width}x{height} @ {image_aspect}: got {on_screen}"
        );
    }
}

#[test]
fn test_zero_framebuffer_has_no_extent() {
    assert_eq!(letterbox_extent(FramebufferSize::new(0, 720), 1.0), None);
    assert_eq!(letterbox_extent(FramebufferSize::new(1280, 0), 1.0), None);
    assert_eq!(letterbox_extent(FramebufferSize::new(0, 0), 1.0), None);
}

#[test]
fn test_zero_framebuffer_keeps_previous_geometry() {
    let mut letterbox = Letterbox::new();
    assert!(letterbox.update(FramebufferSize::new(1600, 800), 1.0));
    let before = *letterbox.vertices();

    assert!(!letterbox.update(FramebufferSize::new(0, 0), 1.0));
    assert!(!letterbox.update(FramebufferSize::new(0, 800), 4.0));

    assert_eq!(*letterbox.vertices(), before);
    assert_close(letterbox.extent(), Vec2::new(0.5, 1.0));
}

#[test]
fn test_default_letterbox_is_full_screen() {
    let letterbox = Letterbox::default();
    assert_close(letterbox.extent(), Vec2::ONE);
}
