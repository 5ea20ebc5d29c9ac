use approx::assert_relative_eq;
use proptest::prelude::*;

use croppipe_core::geometry::{
    fit_rect, fit_scale_and_offset, PixelRect, Point, Rect, Size, ViewportMapping,
};

#[test]
fn test_fit_landscape_image_is_pillarboxed() {
    let (scale, offset) = fit_scale_and_offset(Size::new(1280.0, 720.0), Size::new(800.0, 600.0));
    assert_relative_eq!(scale, 1.2);
    assert_relative_eq!(offset.x, 160.0);
    assert_relative_eq!(offset.y, 0.0);
}

#[test]
fn test_fit_wide_image_is_letterboxed() {
    let r = fit_rect(Size::new(1000.0, 1000.0), Size::new(2000.0, 500.0));
    assert_relative_eq!(r.x, 0.0);
    assert_relative_eq!(r.y, 375.0);
    assert_relative_eq!(r.width, 1000.0);
    assert_relative_eq!(r.height, 250.0);
}

#[test]
fn test_degenerate_sizes_have_no_mapping() {
    assert!(ViewportMapping::fit(Size::new(1280.0, 720.0), Size::new(0.0, 600.0)).is_none());
    assert!(ViewportMapping::fit(Size::new(0.0, 0.0), Size::new(800.0, 600.0)).is_none());
    let (scale, _) = fit_scale_and_offset(Size::new(100.0, 100.0), Size::new(0.0, 0.0));
    assert_eq!(scale, 0.0);
}

#[test]
fn test_displayed_image_rect() {
    let m = ViewportMapping::fit(Size::new(1280.0, 720.0), Size::new(800.0, 600.0)).unwrap();
    let area = m.displayed_image_rect();
    assert_relative_eq!(area.x, 160.0);
    assert_relative_eq!(area.width, 960.0);
    assert_relative_eq!(area.height, 720.0);
}

#[test]
fn test_to_image_rounds_edges() {
    let m = ViewportMapping::fit(Size::new(1280.0, 720.0), Size::new(800.0, 600.0)).unwrap();
    let roi = m.to_image(Rect::new(384.0, 104.0, 512.0, 512.0));
    assert_eq!(roi, PixelRect::new(187, 87, 427, 427));
}

#[test]
fn test_to_image_size_ignores_position() {
    let m = ViewportMapping::fit(Size::new(1280.0, 720.0), Size::new(800.0, 600.0)).unwrap();
    for x in [384.0, 385.2, 386.4, 390.3, 394.0] {
        let roi = m.to_image(Rect::new(x, 104.0, 512.0, 512.0));
        assert_eq!((roi.width, roi.height), (427, 427), "x = {x}");
    }
}

#[test]
fn test_to_image_clamps_outside_rect() {
    let m = ViewportMapping::fit(Size::new(1280.0, 720.0), Size::new(800.0, 600.0)).unwrap();
    let roi = m.to_image(Rect::new(0.0, -50.0, 400.0, 400.0));
    assert_eq!(roi, PixelRect::new(0, 0, 333, 333));

    let right = m.to_image(Rect::new(1100.0, 600.0, 200.0, 200.0));
    assert!(right.fits_within(800, 600));
    assert_eq!((right.width, right.height), (167, 167));
    assert_eq!(right.x + right.width, 800);
    assert_eq!(right.y + right.height, 600);

    let huge = m.to_image(Rect::new(0.0, 0.0, 2000.0, 2000.0));
    assert_eq!(huge, PixelRect::new(0, 0, 800, 600));
}

#[test]
fn test_point_mapping_inverts() {
    let m = ViewportMapping::fit(Size::new(1280.0, 720.0), Size::new(800.0, 600.0)).unwrap();
    let p = m.image_to_viewport_point(Point::new(400.0, 300.0));
    assert_relative_eq!(p.x, 640.0);
    assert_relative_eq!(p.y, 360.0);
    let back = m.viewport_to_image_point(p);
    assert_relative_eq!(back.x, 400.0);
    assert_relative_eq!(back.y, 300.0);
}

#[test]
fn test_clamped_within_moves_inside() {
    let bounds = Rect::new(160.0, 0.0, 960.0, 720.0);
    let r = Rect::new(1000.0, -20.0, 200.0, 100.0).clamped_within(&bounds);
    assert_relative_eq!(r.x, 920.0);
    assert_relative_eq!(r.y, 0.0);
    assert!(bounds.contains_rect(&r));
}

#[test]
fn test_clamped_within_pins_oversized_to_leading_edge() {
    let bounds = Rect::new(10.0, 10.0, 100.0, 100.0);
    let r = Rect::new(50.0, 50.0, 150.0, 20.0).clamped_within(&bounds);
    assert_relative_eq!(r.x, 10.0);
    assert_relative_eq!(r.y, 50.0);
}

#[test]
fn test_pixel_rect_bounds_and_display() {
    let r = PixelRect::new(10, 20, 30, 40);
    assert!(r.fits_within(40, 60));
    assert!(!r.fits_within(39, 60));
    assert!(!PixelRect::new(0, 0, 0, 5).fits_within(10, 10));
    assert_eq!(r.to_string(), "(10, 20) 30x40");
}

proptest! {
    #[test]
    fn prop_round_trip_within_one_pixel(
        scale in 0.01f64..=2.0,
        off_x in -500.0f64..500.0,
        off_y in -500.0f64..500.0,
        x in 0u32..1000,
        y in 0u32..1000,
        w in 1u32..1000,
        h in 1u32..1000,
    ) {
        let mapping = ViewportMapping {
            scale,
            offset: Point::new(off_x, off_y),
            viewport: Size::new(4000.0, 4000.0),
            image: Size::new(2000.0, 2000.0),
        };
        let roi = PixelRect::new(x, y, w, h);
        let back = mapping.to_image(mapping.to_viewport(roi));
        prop_assert!(back.x.abs_diff(roi.x) <= 1);
        prop_assert!(back.y.abs_diff(roi.y) <= 1);
        prop_assert!(back.width.abs_diff(roi.width) <= 1);
        prop_assert!(back.height.abs_diff(roi.height) <= 1);
    }
}
