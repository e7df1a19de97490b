//! Namespace resolution, redirects, source errors and colour handling

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use its::config::NamespaceConfig;
use its::error::ItsError;
use its::service::ServiceResponse;

use super::test_harness::{encode, photo, TestHarness};

fn redirecting() -> TestHarness {
    TestHarness::with_config(|config| {
        config.namespaces.insert(
            "station-images".to_string(),
            NamespaceConfig {
                redirect: true,
                url: Some("https://station.example.com/image-redirects/".to_string()),
                query_param: Some("url".to_string()),
                ..Default::default()
            },
        );
    })
}

#[test]
fn test_redirect_namespace_never_loads() {
    // nothing exists behind the redirect namespace; a load attempt would fail
    let response = redirecting()
        .service
        .handle_path("/station-images/ldn/kings-cross.jpg", "resize=100x&format=webp")
        .unwrap();
    assert_eq!(response.status(), 301);
    assert_eq!(
        response,
        ServiceResponse::Redirect {
            location: "https://station.example.com/image-redirects/?url=https://its.example.com/station-images/ldn/kings-cross.jpg.resize.100x.webp".to_string()
        }
    );
}

#[test]
fn test_unknown_namespace_is_bad_request() {
    let err = TestHarness::new()
        .service
        .handle_path("/elsewhere/a.png", "")
        .unwrap_err();
    assert_eq!(err.to_http_status(), 400);
    assert_eq!(err.to_string(), "elsewhere is not a configured namespace");
}

#[test]
fn test_missing_source_is_not_found() {
    let err = TestHarness::new()
        .service
        .handle_path("/tests/missing.png", "")
        .unwrap_err();
    assert_eq!(err.to_http_status(), 404);
}

#[test]
fn test_synonym_conflict() {
    let harness = TestHarness::new();
    harness.add("photo.png", &encode(&photo(10, 10), ImageFormat::Png));
    let err = harness
        .service
        .handle_path("/tests/photo.png", "fit=5x5&focalcrop=5x5x1x1")
        .unwrap_err();
    assert_eq!(err, ItsError::SynonymConflict);
}

#[test]
fn test_text_file_is_not_an_image() {
    let harness = TestHarness::new();
    harness.add("readme.txt", b"just some words");
    let err = harness
        .service
        .handle_path("/tests/readme.txt", "")
        .unwrap_err();
    assert_eq!(err.to_string(), "tests/readme.txt is not an image file");
    assert_eq!(err.to_http_status(), 400);
}

#[test]
fn test_gif_is_unsupported_file_type() {
    let harness = TestHarness::new();
    harness.add("anim.gif", b"GIF89a\x01\x00\x01\x00\x00\x00\x00;");
    let err = harness
        .service
        .handle_path("/tests/anim.gif", "")
        .unwrap_err();
    assert_eq!(err.to_string(), "tests/anim.gif is not a supported file type");
}

#[test]
fn test_decompression_bomb_rejected_before_decode() {
    let harness = TestHarness::with_config(|config| config.transform.max_pixels = 100);
    harness.add("big.png", &encode(&photo(20, 20), ImageFormat::Png));
    let err = harness
        .service
        .handle_path("/tests/big.png", "")
        .unwrap_err();
    assert_eq!(err.to_string(), "tests/big.png is too large. Please use a smaller one");
}

#[test]
fn test_traversal_outside_namespace_rejected() {
    let err = TestHarness::new()
        .service
        .handle_path("/tests/../../etc/passwd", "")
        .unwrap_err();
    assert_eq!(err.to_http_status(), 400);
}

#[test]
fn test_identity_request_preserves_pixels() {
    let source = DynamicImage::ImageRgb8(RgbImage::from_fn(12, 9, |x, y| {
        Rgb([(x * 20) as u8, (y * 25) as u8, 7])
    }));
    let harness = TestHarness::new();
    harness.add("exact.png", &encode(&source, ImageFormat::Png));

    let (image, _) = harness.get_image("/tests/exact.png", "utm_source=newsletter");
    assert_eq!(image.to_rgb8().into_raw(), source.to_rgb8().into_raw());
}

#[test]
fn test_responses_are_cacheable_for_a_year() {
    let harness = TestHarness::new();
    harness.add("photo.png", &encode(&photo(10, 10), ImageFormat::Png));
    match harness.get("/tests/photo.png", "") {
        ServiceResponse::Image { cache_control, .. } => {
            assert_eq!(cache_control, "max-age=31536000")
        }
        other => panic!("unexpected response {:?}", other),
    }
}
