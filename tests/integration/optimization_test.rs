//! Output format, quality and pass-through behaviour

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use rstest::rstest;

use super::test_harness::{encode, photo, TestHarness};

const SVG: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10"/></svg>"#;

fn harness() -> TestHarness {
    let harness = TestHarness::new();
    harness.add("photo.png", &encode(&photo(96, 64), ImageFormat::Png));
    harness.add("photo.jpg", &encode(&photo(96, 64), ImageFormat::Jpeg));
    harness.add(
        "flat.png",
        &encode(
            &DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([20, 40, 60]))),
            ImageFormat::Png,
        ),
    );
    harness.add(
        "fade.png",
        &encode(
            &DynamicImage::ImageRgba8(RgbaImage::from_fn(32, 32, |x, y| {
                Rgba([(x * 8) as u8, (y * 8) as u8, 100, (x * 8) as u8])
            })),
            ImageFormat::Png,
        ),
    );
    harness.add("logo.svg", SVG);
    harness
}

#[rstest]
#[case("/tests/photo.png", "", "image/png")]
#[case("/tests/photo.jpg", "", "image/jpeg")]
#[case("/tests/photo.png", "format=jpg", "image/jpeg")]
#[case("/tests/photo.png", "format=JPEG", "image/jpeg")]
#[case("/tests/photo.jpg", "format=png", "image/png")]
#[case("/tests/photo.jpg", "format=webp", "image/webp")]
#[case("/tests/photo.png", "format=auto", "image/jpeg")]
#[case("/tests/flat.png", "format=auto", "image/png")]
#[case("/tests/fade.png", "format=auto", "image/png")]
fn test_output_content_type(#[case] path: &str, #[case] query: &str, #[case] expected: &str) {
    let (_, content_type) = harness().get_image(path, query);
    assert_eq!(content_type, expected);
}

#[test]
fn test_jpeg_output_is_progressive() {
    let data = harness().get_bytes("/tests/photo.png", "format=jpg");
    assert_eq!(&data[0..2], &[0xFF, 0xD8]);
    assert!(data.windows(2).any(|w| w == [0xFF, 0xC2]));
}

#[test]
fn test_unsupported_format_is_client_error() {
    let err = harness()
        .service
        .handle_path("/tests/photo.png", "format=tiff")
        .unwrap_err();
    assert_eq!(err.to_http_status(), 400);
    assert_eq!(err.to_string(), "tiff is not a supported output format");
}

#[rstest]
#[case("jpg")]
#[case("png")]
fn test_lower_quality_never_larger(#[case] format: &str) {
    let harness = harness();
    let low = harness.get_bytes("/tests/photo.png", &format!("format={}&quality=1", format));
    let high = harness.get_bytes("/tests/photo.png", &format!("format={}&quality=10", format));
    assert!(
        low.len() <= high.len(),
        "{}: quality=1 gave {} bytes, quality=10 gave {}",
        format,
        low.len(),
        high.len()
    );
}

#[test]
fn test_quantized_png_keeps_dimensions() {
    let (image, content_type) = harness().get_image("/tests/photo.png", "format=png&quality=60");
    assert_eq!(content_type, "image/png");
    assert_eq!((image.width(), image.height()), (96, 64));
}

#[rstest]
#[case("")]
#[case("resize=5x5&format=png")]
#[case("fit=3x3&blur=4&quality=10")]
fn test_svg_passes_through_untouched(#[case] query: &str) {
    let harness = harness();
    match harness.get("/tests/logo.svg", query) {
        its::service::ServiceResponse::Image {
            data,
            content_type,
            cache_control,
        } => {
            assert_eq!(data, SVG);
            assert_eq!(content_type, "image/svg+xml");
            assert_eq!(cache_control, "max-age=31536000");
        }
        other => panic!("unexpected response {:?}", other),
    }
}

#[test]
fn test_svg_detected_without_extension() {
    let harness = harness();
    harness.add("badge", SVG);
    assert_eq!(harness.get_bytes("/tests/badge", "resize=1x1"), SVG);
}
