//! Test utilities for SchoolFinder
//!
//! This module provides common test utilities including temporary directory
//! management, sample conversations, and assertion helpers.

use crate::config::Config;
use crate::error::Result;
use crate::storage::Message;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary directory for testing
///
/// Cleaned up when dropped.
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
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Create a test configuration with default values
pub fn test_config() -> Config {
    Config::default()
}

/// Create a test configuration YAML string
pub fn test_config_yaml() -> String {
    r#"
storage:
  storage_key: test_conversations
  max_conversations: 5
  title_max_chars: 20
  preview_max_chars: 30

chat:
  default_mode: classic
  response_delay_ms: 5
  welcome_message: Hello from the test suite
  reply: Canned test reply
"#
    .to_string()
}

/// A welcome message followed by one question and its answer
pub fn sample_exchange(question: &str, answer: &str) -> Vec<Message> {
    vec![
        Message::assistant("Welcome!"),
        Message::user(question).as_question(),
        Message::assistant(answer),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchoolfinderError;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_create_test_file() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "test.txt", "content");
        assert!(path.exists());
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "content");
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(SchoolfinderError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        let result: Result<()> = Ok(());
        assert_error_contains(result, "error");
    }

    #[test]
    #[should_panic(expected = "does not contain")]
    fn test_assert_error_contains_wrong_message() {
        let result: Result<()> = Err(SchoolfinderError::Config("different error".to_string()).into());
        assert_error_contains(result, "not present");
    }

    #[test]
    fn test_test_config() {
        let config = test_config();
        assert_eq!(config.chat.default_mode, "assistant");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_test_config_yaml() {
        let yaml = test_config_yaml();
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.storage.storage_key, "test_conversations");
        assert_eq!(config.chat.reply, "Canned test reply");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_exchange() {
        let messages = sample_exchange("Nearby schools?", "Here are three");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].is_question, Some(true));
        assert!(messages[2].is_assistant());
    }
}
