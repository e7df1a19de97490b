//! The legacy path-segment grammar must serve exactly what the query form
//! serves.

use image::ImageFormat;
use rstest::rstest;

use super::test_harness::{encode, photo, TestHarness};

fn harness() -> TestHarness {
    let harness = TestHarness::new();
    harness.add("images/seagull.jpg", &encode(&photo(120, 80), ImageFormat::Jpeg));
    harness
}

#[rstest]
#[case("/tests/images/seagull.jpg.crop.40x40.png", "fit=40x40&format=png")]
#[case("/tests/images/seagull.jpg.fit.40x20.png", "fit=40x20&format=png")]
#[case("/tests/images/seagull.jpg.focalcrop.30x30.10.90.png", "fit=30x30x10x90&format=png")]
#[case("/tests/images/seagull.jpg.resize.60x60.png", "resize=60x60&format=png")]
#[case("/tests/images/seagull.jpg.resize.60x.png", "resize=60x&format=png")]
#[case("/tests/images/seagull.jpg.resize.x20.webp", "resize=x20&format=webp")]
#[case(
    "/tests/images/seagull.jpg.resize.60x60.passport.png",
    "resize=60x60&format=png&overlay=passport"
)]
#[case(
    "/tests/images/seagull.jpg.fit.50x50.passport.png",
    "fit=50x50&format=png&overlay=passport"
)]
fn test_legacy_path_matches_query(#[case] legacy: &str, #[case] query: &str) {
    let harness = harness();
    let from_legacy = harness.get_bytes(legacy, "");
    let from_query = harness.get_bytes("/tests/images/seagull.jpg", query);
    assert_eq!(from_legacy, from_query);
}

#[test]
fn test_legacy_path_ignores_query_string() {
    let harness = harness();
    let plain = harness.get_bytes("/tests/images/seagull.jpg.resize.60x.png", "");
    let with_query = harness.get_bytes("/tests/images/seagull.jpg.resize.60x.png", "blur=5");
    assert_eq!(plain, with_query);
}

#[test]
fn test_legacy_path_with_extensionless_source() {
    let harness = harness();
    let (image, content_type) = harness.get_image("/tests/images/seagull.resize.90x30.png", "");
    assert_eq!(content_type, "image/png");
    assert_eq!((image.width(), image.height()), (45, 30));
}

#[test]
fn test_legacy_focal_out_of_range_is_not_rewritten() {
    // not legacy grammar, so the whole name is looked up and missing
    let err = harness()
        .service
        .handle_path("/tests/images/seagull.jpg.focalcrop.30x30.150.90.png", "")
        .unwrap_err();
    assert_eq!(err.to_http_status(), 404);
}
