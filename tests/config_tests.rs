use guji_layout::document::layout_block::{BlockType, ClassRole};
use guji_layout::utils::config::{AppConfig, PipelineConfig};
use guji_layout::utils::error::ConfigError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn write_config(json: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(json.as_bytes()).unwrap();
    temp_file
}

#[test]
fn test_parse_config_from_json() {
    let json = r#"{
        "max_file_size": 52428800,
        "model_directory": "weights",
        "layout_model": "guji_layout.onnx",
        "host_url": "127.0.0.1:8080",
        "pipeline": { "conf_threshold": 0.35, "workers": 4 }
    }"#;

    let config: AppConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.max_file_size, 52428800);
    assert_eq!(&*config.host_url, "127.0.0.1:8080");
    assert_eq!(config.layout_model_path(), Path::new("weights/guji_layout.onnx"));
    assert_eq!(config.pipeline.conf_threshold, 0.35);
    assert_eq!(config.pipeline.workers, 4);
    assert_eq!(config.pipeline.iou_threshold, 0.45);
    assert_eq!(config.pipeline.model_size, 640);
}

#[test]
fn test_load_config_from_file() {
    let temp_file = write_config(r#"{ "inference_pool_size": 2, "use_cuda": true }"#);

    let config = AppConfig::from_file(temp_file.path()).unwrap();

    assert_eq!(config.inference_pool_size, 2);
    assert!(config.use_cuda);
    assert_eq!(config.pipeline, PipelineConfig::default());
}

#[test]
fn test_load_with_explicit_path() {
    let temp_file = write_config(r#"{ "host_url": "0.0.0.0:9000" }"#);
    let config = AppConfig::load(Some(temp_file.path())).unwrap();
    assert_eq!(&*config.host_url, "0.0.0.0:9000");
}

#[test]
fn test_missing_file_is_io_error() {
    let result = AppConfig::from_file("/nonexistent/app_config.json");
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_malformed_json_is_parse_error() {
    let temp_file = write_config("{ not json");
    let result = AppConfig::from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn test_out_of_range_threshold_fails_validation() {
    let temp_file = write_config(r#"{ "pipeline": { "iou_threshold": 1.2 } }"#);
    let result = AppConfig::from_file(temp_file.path());
    assert!(matches!(result, Err(ConfigError::Invalid { .. })));
}

#[test]
fn test_zero_workers_fails_validation() {
    let config = PipelineConfig {
        workers: 0,
        ..PipelineConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_pool_size_fails_validation() {
    let config = AppConfig {
        inference_pool_size: 0,
        ..AppConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_default_class_map() {
    let classes = PipelineConfig::default().classes;

    assert!(classes.is_overview(0));
    assert!(classes.is_text_column(1));
    assert!(classes.is_text_column(2));
    assert_eq!(classes.block_type(3), BlockType::Illustration);
    assert_eq!(classes.block_type(4), BlockType::Seal);
    assert!(classes.skips_ocr(4));
    assert_eq!(classes.role(17), ClassRole::Other);
    assert_eq!(classes.block_type(17), BlockType::Unknown);
}

#[test]
fn test_custom_class_map_from_json() {
    let json = r#"{
        "classes": [
            { "id": 0, "name": "column", "role": "text_column", "block_type": "main_text" },
            { "id": 1, "name": "seal", "role": "seal", "block_type": "seal" }
        ]
    }"#;

    let config: PipelineConfig = serde_json::from_str(json).unwrap();

    config.validate().unwrap();
    assert!(config.classes.is_text_column(0));
    assert!(config.classes.skips_ocr(1));
    assert!(!config.classes.is_overview(0));
}

#[test]
fn test_duplicate_class_id_fails_validation() {
    let json = r#"{
        "classes": [
            { "id": 2, "name": "a", "role": "text_column", "block_type": "main_text" },
            { "id": 2, "name": "b", "role": "illustration", "block_type": "illustration" }
        ]
    }"#;

    let config: PipelineConfig = serde_json::from_str(json).unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
}

#[test]
fn test_empty_class_map_fails_validation() {
    let config: PipelineConfig = serde_json::from_str(r#"{ "classes": [] }"#).unwrap();
    assert!(config.validate().is_err());
}
