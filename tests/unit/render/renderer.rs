use super::*;

const RED: [u8; 4] = [255, 0, 0, 255];

fn metrics(w: f64, h: f64) -> ViewportMetrics {
    ViewportMetrics::fullscreen(w, h, h * 5.0)
}

fn solid(w: u32, h: u32) -> Arc<FrameImage> {
    Arc::new(FrameImage::solid(w, h, RED))
}

#[test]
fn resize_scales_backing_by_dpr_and_keeps_layout() {
    let mut r = Renderer::new(&metrics(40.0, 30.0), RendererOpts::default()).unwrap();
    assert_eq!(r.backing_size(), (40, 30));

    r.resize(&metrics(40.0, 30.0).with_dpr(2.0)).unwrap();
    assert_eq!(r.backing_size(), (80, 60));
    assert_eq!(r.layout_size(), LayoutBox::new(40.0, 30.0));
    assert_eq!(r.device_pixel_ratio(), 2.0);

    // Fractional sizes truncate like a canvas width assignment.
    r.resize(&metrics(10.6, 10.0).with_dpr(1.5)).unwrap();
    assert_eq!(r.backing_size(), (15, 15));
}

#[test]
fn resize_before_any_draw_is_safe_and_idempotent() {
    let mut r = Renderer::new(&metrics(8.0, 8.0), RendererOpts::default()).unwrap();
    r.resize(&metrics(8.0, 8.0)).unwrap();
    r.resize(&metrics(8.0, 8.0)).unwrap();
    assert!(r.current_image().is_none());
    let snap = r.snapshot();
    assert_eq!((snap.width, snap.height), (8, 8));
    assert!(snap.data.iter().all(|b| *b == 0));
}

#[test]
fn draw_letterboxes_wide_image() {
    let mut r = Renderer::new(&metrics(32.0, 32.0), RendererOpts::default()).unwrap();
    assert!(r.draw_image(&solid(16, 9)).unwrap());

    let p = r.placement().unwrap();
    assert_eq!(p.width, 32.0);
    assert_eq!(p.height, 18.0);
    assert_eq!(p.offset_y, 7.0);

    let snap = r.snapshot();
    assert_eq!(snap.pixel(16, 16), Some(RED));
    assert_eq!(snap.pixel(16, 2), Some([0, 0, 0, 0]));
    assert_eq!(snap.pixel(16, 29), Some([0, 0, 0, 0]));
}

#[test]
fn resize_redraws_current_image() {
    let mut r = Renderer::new(&metrics(32.0, 32.0), RendererOpts::default()).unwrap();
    let img = solid(16, 9);
    r.draw_image(&img).unwrap();

    r.resize(&metrics(64.0, 36.0)).unwrap();
    let snap = r.snapshot();
    assert_eq!((snap.width, snap.height), (64, 36));
    assert_eq!(snap.pixel(1, 1), Some(RED));
    assert_eq!(snap.pixel(62, 34), Some(RED));
    assert!(Arc::ptr_eq(r.current_image().unwrap(), &img));
}

#[test]
fn missing_and_failed_frames_leave_surface_untouched() {
    let mut r = Renderer::new(&metrics(16.0, 16.0), RendererOpts::default()).unwrap();
    let img = solid(4, 4);
    r.draw_image(&img).unwrap();
    let before = r.snapshot();

    assert!(!r.draw(None).unwrap());
    let failed = FrameHandle::Failed {
        locator: "frame_3.jpg".to_string(),
    };
    assert!(!r.draw(Some(&failed)).unwrap());

    assert_eq!(r.snapshot(), before);
    assert!(Arc::ptr_eq(r.current_image().unwrap(), &img));
}

#[test]
fn zero_area_image_is_skipped() {
    let mut r = Renderer::new(&metrics(16.0, 16.0), RendererOpts::default()).unwrap();
    let empty = Arc::new(FrameImage {
        width: 0,
        height: 10,
        rgba8_premul: Arc::new(Vec::new()),
    });
    assert!(!r.draw_image(&empty).unwrap());
    assert!(r.current_image().is_none());
}

#[test]
fn zero_size_surface_remembers_image_for_next_resize() {
    let mut r = Renderer::new(&metrics(0.0, 0.0), RendererOpts::default()).unwrap();
    assert_eq!(r.backing_size(), (0, 0));
    assert_eq!(r.snapshot(), FrameRGBA::empty());

    assert!(!r.draw_image(&solid(4, 4)).unwrap());
    assert!(r.current_image().is_some());
    assert!(r.placement().is_none());

    r.resize(&metrics(8.0, 8.0)).unwrap();
    assert_eq!(r.snapshot().pixel(4, 4), Some(RED));
}

#[test]
fn clear_color_fills_letterbox() {
    let opts = RendererOpts {
        clear_rgba: Some([0, 0, 255, 255]),
    };
    let mut r = Renderer::new(&metrics(32.0, 32.0), opts).unwrap();
    r.draw_image(&solid(16, 9)).unwrap();
    let snap = r.snapshot();
    assert_eq!(snap.pixel(16, 2), Some([0, 0, 255, 255]));
    assert_eq!(snap.pixel(16, 16), Some(RED));
}

#[test]
fn oversized_surface_is_err() {
    let huge = metrics(70_000.0, 10.0);
    assert!(Renderer::new(&huge, RendererOpts::default()).is_err());
}
