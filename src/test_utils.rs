//! Test utilities for Parley
//!
//! This module provides common test utilities including temporary directory
//! management, config file creation, and assertion helpers.

use crate::config::Config;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// # Returns
///
/// Returns a TempDir that will be cleaned up when dropped
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Create a test file with the given content
///
/// # Panics
///
/// Panics if file creation or writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: crate::error::Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration pointing at the given endpoint
pub fn test_config(url: &str) -> Config {
    let mut config = Config::default();
    config.endpoint.url = url.to_string();
    config.endpoint.timeout_seconds = 5;
    config
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
endpoint:
  url: http://localhost:8089/v1/models/test:generateContent
  api_key: test-key
  timeout_seconds: 30
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParleyError;
    use serial_test::serial;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "hello");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }

    #[test]
    fn test_assert_error_contains() {
        let result: crate::error::Result<()> =
            Err(ParleyError::Config("invalid url".to_string()).into());
        assert_error_contains(result, "invalid url");
    }

    #[test]
    #[serial]
    fn test_config_yaml_parses_and_validates() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "config.yaml", &test_config_yaml());
        let config = Config::load(path.to_str().unwrap(), &Default::default()).unwrap();
        assert_eq!(config.endpoint.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.endpoint.timeout_seconds, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config_points_at_url() {
        let config = test_config("http://127.0.0.1:9/gen");
        assert_eq!(config.endpoint.url, "http://127.0.0.1:9/gen");
        assert!(config.validate().is_ok());
    }
}
