// Pipeline orchestration: colour handling, colour modes, identity and thread safety

use std::sync::Arc;
use std::thread;

use image::{ColorType, DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use its::config::TransformConfig;
use its::pipeline::TransformPipeline;
use its::query::RequestQuery;
use its::source::{DecodedImage, SourceFormat};
use its::transform::NoOverlays;

fn source() -> DecodedImage {
    let img = RgbaImage::from_fn(16, 12, |x, y| {
        Rgba([(x * 15) as u8, (y * 20) as u8, 128, (x * 16) as u8])
    });
    DecodedImage::new(DynamicImage::ImageRgba8(img), SourceFormat::Png)
}

fn decoded_rgba(data: &[u8]) -> Vec<u8> {
    image::load_from_memory(data).unwrap().to_rgba8().into_raw()
}

#[test]
fn test_failed_profile_conversion_keeps_original_pixels() {
    let mut broken = source();
    broken.icc_profile = Some(b"definitely not an icc profile".to_vec());
    let expected = broken.image.to_rgba8().into_raw();

    let pipeline = TransformPipeline::new(&TransformConfig::default()).unwrap();
    let out = pipeline
        .process(broken, &RequestQuery::new(), &NoOverlays)
        .unwrap();

    assert_eq!(out.content_type, "image/png");
    assert_eq!(decoded_rgba(&out.data), expected);

    // PNG output written by the pipeline never carries a profile
    let decoder = png::Decoder::new(std::io::Cursor::new(&out.data));
    let reader = decoder.read_info().unwrap();
    assert!(reader.info().icc_profile.is_none());
}

#[test]
fn test_srgb_profile_keeps_alpha() {
    let mut tagged = source();
    tagged.icc_profile = Some(lcms2::Profile::new_srgb().icc().unwrap());
    let alpha_before: Vec<u8> = tagged.image.to_rgba8().pixels().map(|p| p[3]).collect();

    let pipeline = TransformPipeline::new(&TransformConfig::default()).unwrap();
    let out = pipeline
        .process(tagged, &RequestQuery::new(), &NoOverlays)
        .unwrap();

    let decoded = image::load_from_memory(&out.data).unwrap().to_rgba8();
    let alpha_after: Vec<u8> = decoded.pixels().map(|p| p[3]).collect();
    assert_eq!(alpha_after, alpha_before);
}

#[test]
fn test_pipeline_is_shareable_across_threads() {
    let pipeline = Arc::new(TransformPipeline::new(&TransformConfig::default()).unwrap());

    let handles: Vec<_> = (1..=4u32)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            thread::spawn(move || {
                let query: RequestQuery = [("resize", format!("{}x", i * 4))].into_iter().collect();
                let out = pipeline.process(source(), &query, &NoOverlays).unwrap();
                image::load_from_memory(&out.data).unwrap().width()
            })
        })
        .collect();

    let widths: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(widths, vec![4, 8, 12, 16]);
}

fn grayscale_source() -> DecodedImage {
    let img = GrayImage::from_fn(64, 48, |x, y| Luma([((x * 3 + y * 2) % 256) as u8]));
    DecodedImage::new(DynamicImage::ImageLuma8(img), SourceFormat::Png)
}

#[test]
fn test_grayscale_png_stays_grayscale() {
    let pipeline = TransformPipeline::new(&TransformConfig::default()).unwrap();

    let identity = pipeline
        .process(grayscale_source(), &RequestQuery::new(), &NoOverlays)
        .unwrap();
    let decoded = image::load_from_memory(&identity.data).unwrap();
    assert_eq!(decoded.color(), ColorType::L8);
    assert_eq!(
        decoded.to_luma8().into_raw(),
        grayscale_source().image.to_luma8().into_raw()
    );

    let query: RequestQuery = [("resize", "32x")].into_iter().collect();
    let resized = pipeline
        .process(grayscale_source(), &query, &NoOverlays)
        .unwrap();
    let decoded = image::load_from_memory(&resized.data).unwrap();
    assert_eq!(decoded.color(), ColorType::L8);
    assert_eq!((decoded.width(), decoded.height()), (32, 24));
}

#[test]
fn test_mismatched_profile_keeps_colour_pixels() {
    let img = RgbImage::from_fn(8, 8, |x, _| Rgb([200, (x * 30) as u8, 20]));
    let mut tagged = DecodedImage::new(DynamicImage::ImageRgb8(img), SourceFormat::Png);
    let white = lcms2::white_point_from_temp(6504.0).unwrap();
    let gray = lcms2::Profile::new_gray(&white, &lcms2::ToneCurve::new(2.2)).unwrap();
    tagged.icc_profile = Some(gray.icc().unwrap());
    let expected = tagged.image.to_rgb8().into_raw();

    let pipeline = TransformPipeline::new(&TransformConfig::default()).unwrap();
    let out = pipeline
        .process(tagged, &RequestQuery::new(), &NoOverlays)
        .unwrap();

    let decoded = image::load_from_memory(&out.data).unwrap();
    assert_eq!(decoded.color(), ColorType::Rgb8);
    assert_eq!(decoded.to_rgb8().into_raw(), expected);
}
