/*!
 * Tests for application configuration
 */

use anyhow::Result;
use std::path::PathBuf;
use tesstrain::app_config::{Config, LogLevel};
use crate::common;

/// Test that a missing config file yields the defaults
#[test]
fn test_load_or_default_withMissingFile_shouldUseDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = Config::load_or_default(temp_dir.path().join("absent.json"))?;

    assert_eq!(config, Config::default());
    assert_eq!(config.render_workers, 1);
    assert_eq!(config.feature_workers, 2);
    assert_eq!(config.log_level, LogLevel::Info);
    Ok(())
}

/// Test that values in the file override the defaults
#[test]
fn test_load_or_default_withPartialFile_shouldMergeDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "tesstrain.json",
        r#"{ "feature_workers": 4, "tool_timeout_secs": 600, "install_root": "/opt/tesseract" }"#,
    )?;

    let config = Config::load_or_default(&path)?;
    assert_eq!(config.feature_workers, 4);
    assert_eq!(config.render_workers, 1);
    assert_eq!(config.tool_timeout_secs, Some(600));
    assert_eq!(
        config.tool_search_dirs(),
        vec![
            PathBuf::from("/opt/tesseract"),
            PathBuf::from("/opt/tesseract/api"),
            PathBuf::from("/opt/tesseract/training"),
        ]
    );
    Ok(())
}

/// Test that malformed JSON is reported with the file name
#[test]
fn test_load_or_default_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "broken.json", "{ not json")?;

    let err = Config::load_or_default(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
    Ok(())
}

/// Test that zero workers and zero timeouts are rejected
#[test]
fn test_validate_withZeroLimits_shouldFail() {
    let config = Config {
        render_workers: 0,
        ..Config::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        feature_workers: 0,
        ..Config::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        tool_timeout_secs: Some(0),
        ..Config::default()
    };
    assert!(config.validate().is_err());

    assert!(Config::default().validate().is_ok());
}
