//! Application Configuration
//!
//! Configuration for the chat application layer and the assistant client.

use std::time::Duration;

use crate::domain::value_objects::{
    DEFAULT_CHAT_TYPE, DEFAULT_TITLE, MAX_MESSAGE_CHARS, MAX_TITLE_CHARS, MAX_UPLOAD_BYTES,
};

/// Poll loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Wait before each status check
    pub interval: Duration,
    /// Maximum number of status checks
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_attempts: 60,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Longest a caller can wait on the poll loop alone
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Assistant API client configuration
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub api_key: String,
    pub assistant_id: String,
    pub base_url: String,
    /// Timeout for each individual HTTP call
    pub request_timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            assistant_id: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AssistantConfig {
    pub fn new(api_key: impl Into<String>, assistant_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            assistant_id: assistant_id.into(),
            ..Default::default()
        }
    }

    /// Base URL without a trailing slash
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// Chat application configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub default_title: String,
    pub default_chat_type: String,
    pub max_title_chars: usize,
    pub max_message_chars: usize,
    pub max_upload_bytes: u64,
    /// Footer printed on every exported page
    pub export_footer: String,
    pub poll: PollConfig,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_TITLE.to_string(),
            default_chat_type: DEFAULT_CHAT_TYPE.to_string(),
            max_title_chars: MAX_TITLE_CHARS,
            max_message_chars: MAX_MESSAGE_CHARS,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            export_footer: "Desarrollado por AutomatizaFix - www.automatizafix.com".to_string(),
            poll: PollConfig::default(),
        }
    }
}

impl ChatConfig {
    /// Create config for development (finer poll interval, same budget)
    pub fn development() -> Self {
        Self {
            poll: PollConfig::new(Duration::from_millis(500), 120),
            ..Self::default()
        }
    }

    /// Request body limit for the upload route (file plus multipart framing)
    pub fn upload_body_limit(&self) -> usize {
        self.max_upload_bytes as usize + 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_poll_config() {
        let poll = PollConfig::default();
        assert_eq!(poll.interval, Duration::from_secs(1));
        assert_eq!(poll.max_attempts, 60);
        assert_eq!(poll.budget(), Duration::from_secs(60));
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let mut config = AssistantConfig::new("sk-test", "asst_1");
        assert_eq!(
            config.endpoint("/threads"),
            "https://api.openai.com/v1/threads"
        );

        config.base_url = "http://127.0.0.1:9999/".to_string();
        assert_eq!(
            config.endpoint("threads/t1/runs"),
            "http://127.0.0.1:9999/threads/t1/runs"
        );
    }

    #[test]
    fn test_default_chat_config() {
        let config = ChatConfig::default();
        assert_eq!(config.default_title, "Nueva Conversación");
        assert_eq!(config.default_chat_type, "control_fatalidad_tx");
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
        assert!(config.upload_body_limit() > config.max_upload_bytes as usize);
    }
}
