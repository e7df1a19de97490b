// Configuration loading

use std::io::Write;

use its::config::{Config, LoaderKind, LogFormat};
use tempfile::NamedTempFile;

fn load(yaml: &str) -> Result<Config, String> {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file.flush().unwrap();
    Config::from_file(file.path())
}

#[test]
fn test_full_config_round_trip() {
    let config = load(
        r#"
namespaces:
  tests:
    loader: file_system
    folders: ["tests/images"]
  remote:
    loader: http
    prefixes: ["images.example.com/"]
  station-images:
    redirect: true
    url: "https://station.example.com/redirects/"
    query-param: url
overlays:
  passport: overlays/logo.png
overlay_root: /srv/its
transform:
  delimiters: "[x_]"
  focus_keyword: "fp-"
  max_pixels: 1000000
  default_quality: 85
  auto_png_max_colors: 64
  png_optimization_level: 4
  http_timeout_secs: 3
logging:
  level: debug
  format: json
"#,
    )
    .unwrap();

    assert_eq!(config.namespaces.len(), 3);
    assert_eq!(config.namespace("remote").unwrap().loader, Some(LoaderKind::Http));
    assert_eq!(config.overlay_root.to_str(), Some("/srv/its"));
    assert_eq!(config.transform.focus_keyword, "fp-");
    assert_eq!(config.transform.max_pixels, 1_000_000);
    assert_eq!(config.transform.auto_png_max_colors, 64);
    assert_eq!(config.transform.png_optimization_level, 4);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_unknown_loader_kind_fails() {
    let err = load("namespaces:\n  x:\n    loader: s3\n").unwrap_err();
    assert!(err.contains("s3") || err.contains("unknown variant"));
}

#[test]
fn test_empty_namespace_table_fails() {
    assert!(load("namespaces: {}\n").is_err());
}

#[test]
fn test_bad_delimiters_fail_validation() {
    assert!(load("transform:\n  delimiters: \"[\"\n").is_err());
}

#[test]
fn test_missing_file_reports_read_error() {
    let err = Config::from_file("/definitely/not/here.yaml").unwrap_err();
    assert!(err.contains("Failed to read config file"));
}
