//! Geometry and transform behaviour through the full request path

use image::{GenericImageView, ImageFormat};
use rstest::rstest;

use super::test_harness::{encode, photo, quadrants, TestHarness};

fn harness_with(name: &str, image: &image::DynamicImage) -> TestHarness {
    let harness = TestHarness::new();
    harness.add(name, &encode(image, ImageFormat::Png));
    harness
}

#[test]
fn test_resize_width_only_derives_height() {
    let harness = harness_with("photo.png", &photo(800, 600));
    let (image, content_type) = harness.get_image("/tests/photo.png", "resize=100x");
    assert_eq!(image.dimensions(), (100, 75));
    assert_eq!(content_type, "image/png");
}

#[rstest]
#[case("200x200", (200, 150))]
#[case("x60", (80, 60))]
#[case("100x10", (13, 10))]
#[case("1000x900", (1000, 750))]
fn test_resize_preserves_aspect_ratio(#[case] resize: &str, #[case] expected: (u32, u32)) {
    let harness = harness_with("photo.png", &photo(400, 300));
    let (image, _) = harness.get_image("/tests/photo.png", &format!("resize={}", resize));
    let (width, height) = image.dimensions();
    assert!((width as i64 - expected.0 as i64).abs() <= 1, "width {}", width);
    assert!((height as i64 - expected.1 as i64).abs() <= 1, "height {}", height);
}

#[rstest]
#[case("40x30,no-scale-up")]
#[case("100x100,no-scale-up")]
#[case("4000x3000,no-scale-up")]
fn test_no_scale_up_keeps_source_size(#[case] resize: &str) {
    let harness = harness_with("photo.png", &photo(40, 30));
    let (image, _) = harness.get_image("/tests/photo.png", &format!("resize={}", resize));
    assert_eq!(image.dimensions(), (40, 30));
}

#[rstest]
#[case("fit")]
#[case("crop")]
#[case("focalcrop")]
fn test_fit_synonyms_produce_exact_box(#[case] key: &str) {
    let harness = harness_with("photo.png", &photo(300, 200));
    let (image, _) = harness.get_image("/tests/photo.png", &format!("{}=50x80", key));
    assert_eq!(image.dimensions(), (50, 80));
}

#[test]
fn test_fit_synonyms_are_equivalent() {
    let harness = harness_with("photo.png", &photo(300, 200));
    let fit = harness.get_bytes("/tests/photo.png", "fit=60x60x20x80");
    let crop = harness.get_bytes("/tests/photo.png", "crop=60x60x20x80");
    let focalcrop = harness.get_bytes("/tests/photo.png", "focalcrop=60x60x20x80");
    assert_eq!(fit, crop);
    assert_eq!(fit, focalcrop);
}

#[test]
fn test_focal_point_selects_window() {
    let harness = harness_with("quad.png", &quadrants(200, 100));

    let (left, _) = harness.get_image("/tests/quad.png", "fit=50x50x0x0");
    let pixel = left.to_rgb8().get_pixel(5, 5).0;
    assert!(pixel[0] > 240 && pixel[1] < 15, "expected red, got {:?}", pixel);

    let (right, _) = harness.get_image("/tests/quad.png", "fit=50x50x100x0");
    let pixel = right.to_rgb8().get_pixel(45, 5).0;
    assert!(pixel[1] > 240 && pixel[0] < 15, "expected green, got {:?}", pixel);
}

#[test]
fn test_out_of_range_focal_point_is_client_error() {
    let harness = harness_with("photo.png", &photo(100, 100));
    let err = harness
        .service
        .handle_path("/tests/photo.png", "crop=100x100x150x150")
        .unwrap_err();
    assert_eq!(err.to_http_status(), 400);
}

#[rstest]
#[case("50x10")]
#[case("0x0")]
#[case("100x100")]
#[case("90x40")]
fn test_filename_focal_point_overrides_query(#[case] query_focal: &str) {
    let source = encode(&photo(320, 200), ImageFormat::Png);
    let harness = TestHarness::new();
    harness.add("seagull.png", &source);
    harness.add("seagull_focus-10x90.png", &source);

    let marked = harness.get_bytes(
        "/tests/seagull_focus-10x90.png",
        &format!("fit=100x100x{}", query_focal),
    );
    let expected = harness.get_bytes("/tests/seagull.png", "fit=100x100x10x90");
    assert_eq!(marked, expected);
}

#[test]
fn test_blur_zero_is_identical_to_no_blur() {
    let harness = harness_with("photo.png", &photo(64, 48));
    let plain = harness.get_bytes("/tests/photo.png", "resize=32x");
    let blurred = harness.get_bytes("/tests/photo.png", "resize=32x&blur=0");
    assert_eq!(plain, blurred);
}

#[rstest]
#[case("blur=")]
#[case("blur=soft")]
#[case("blur=-2")]
fn test_invalid_blur_is_client_error(#[case] query: &str) {
    let harness = harness_with("photo.png", &photo(16, 16));
    let err = harness.service.handle_path("/tests/photo.png", query).unwrap_err();
    assert_eq!(err.to_http_status(), 400);
}

#[test]
fn test_resize_too_big_is_rejected() {
    let harness = harness_with("photo.png", &photo(16, 16));
    let err = harness
        .service
        .handle_path("/tests/photo.png", "resize=100000x100000")
        .unwrap_err();
    assert_eq!(err.to_string(), "100000x100000 is too big");
}

#[test]
fn test_passport_overlay_is_composited() {
    let harness = harness_with(
        "white.png",
        &image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            40,
            40,
            image::Rgb([255, 255, 255]),
        )),
    );
    let (image, _) = harness.get_image("/tests/white.png", "overlay=passport");
    let rgb = image.to_rgb8();
    assert_eq!(image.dimensions(), (40, 40));
    // left half of the badge is opaque black, right half transparent
    assert!(rgb.get_pixel(5, 20)[0] < 10);
    assert!(rgb.get_pixel(35, 20)[0] > 245);
}

#[test]
fn test_missing_overlay_is_not_found() {
    let harness = harness_with("photo.png", &photo(16, 16));
    let err = harness
        .service
        .handle_path("/tests/photo.png", "overlay=nope.png")
        .unwrap_err();
    assert_eq!(err.to_http_status(), 404);
}
