//! Shared fixtures: a temporary `tests` namespace filled with synthesised
//! images and an [`ImageService`] configured to serve it.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use its::config::{Config, NamespaceConfig};
use its::loader::{FileSystemBackend, LoaderRegistry};
use its::service::{ImageService, ServiceResponse};
use tempfile::TempDir;

pub struct TestHarness {
    pub dir: TempDir,
    pub service: ImageService,
}

impl TestHarness {
    /// Service with a `tests` namespace rooted in a fresh temp dir
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let root = dir.path().to_string_lossy().into_owned();

        let mut config = Config::default();
        config.namespaces.clear();
        config
            .namespaces
            .insert("tests".to_string(), NamespaceConfig::file_system(&[&root]));
        config.overlay_root = dir.path().to_path_buf();
        config.overlays.clear();
        config
            .overlays
            .insert("passport".to_string(), "overlays/logo.png".to_string());
        customize(&mut config);

        let mut loaders = LoaderRegistry::new();
        loaders
            .register(Box::new(FileSystemBackend))
            .expect("register file system backend");

        let service = ImageService::with_loaders(config, loaders)
            .expect("build service")
            .with_origin("https", "its.example.com");

        write_file(
            &dir.path().join("overlays/logo.png"),
            &encode(&logo(), ImageFormat::Png),
        );

        Self { dir, service }
    }

    /// Write `bytes` under the namespace root
    pub fn add(&self, relative: &str, bytes: &[u8]) {
        write_file(&self.dir.path().join(relative), bytes);
    }

    pub fn get(&self, path: &str, query: &str) -> ServiceResponse {
        self.service
            .handle_path(path, query)
            .unwrap_or_else(|e| panic!("{}?{} failed: {}", path, query, e))
    }

    /// Decoded image of a successful request
    pub fn get_image(&self, path: &str, query: &str) -> (DynamicImage, &'static str) {
        match self.get(path, query) {
            ServiceResponse::Image {
                data, content_type, ..
            } => (
                image::load_from_memory(&data).expect("response decodes"),
                content_type,
            ),
            other => panic!("expected an image, got {:?}", other),
        }
    }

    pub fn get_bytes(&self, path: &str, query: &str) -> Vec<u8> {
        match self.get(path, query) {
            ServiceResponse::Image { data, .. } => data,
            other => panic!("expected an image, got {:?}", other),
        }
    }
}

fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, bytes).expect("write fixture");
}

pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).expect("encode fixture");
    out.into_inner()
}

/// Smooth photographic-looking gradient
pub fn photo(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) * 127 / (width + height).max(1)) as u8,
        ])
    }))
}

/// Image with one distinct colour per quadrant, for framing checks
pub fn quadrants(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        match (x < width / 2, y < height / 2) {
            (true, true) => Rgb([255, 0, 0]),
            (false, true) => Rgb([0, 255, 0]),
            (true, false) => Rgb([0, 0, 255]),
            (false, false) => Rgb([255, 255, 0]),
        }
    }))
}

/// Half-transparent badge used as the passport overlay
pub fn logo() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(20, 20, |x, _| {
        Rgba([0, 0, 0, if x < 10 { 255 } else { 0 }])
    }))
}
