//! Integration tests for kwtrends-config crate.

use kwtrends_config::{Config, ConfigError, ConfigLoader, CsvLayout};
use std::io::Write;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "provider:\n  geo: US\n  language: en-US\n  timeframe: today 12-m\nexport:\n  csv_layout: long\n  png_width: 800\n"
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(file.path()).unwrap();
    assert_eq!(config.provider.geo, "US");
    assert_eq!(config.provider.timeframe, "today 12-m");
    assert_eq!(config.export.csv_layout, CsvLayout::Long);
    assert_eq!(config.export.png_width, 800);
    assert_eq!(config.export.png_height, 600);
}

#[test]
fn test_invalid_file_fails_validation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "batching:\n  batch_size: 9\n").unwrap();

    let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let err = ConfigLoader::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn test_config_roundtrips_through_yaml() {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let parsed = ConfigLoader::from_yaml(&yaml).unwrap();
    assert_eq!(parsed.chart.colors, config.chart.colors);
    assert_eq!(parsed.provider.query_params(), config.provider.query_params());
}

#[test]
fn test_config_error_converts_to_trends_error() {
    let err: kwtrends_common::TrendsError = ConfigLoader::from_yaml("provider: 5").unwrap_err().into();
    assert!(err.to_string().starts_with("Configuration error"));
}
