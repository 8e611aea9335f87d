//! Domain Value Objects
//!
//! Input validation for titles, chat types, message text and uploads, plus
//! the remote run status vocabulary.

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, ChatResult};

pub const DEFAULT_TITLE: &str = "Nueva Conversación";
pub const DEFAULT_CHAT_TYPE: &str = "control_fatalidad_tx";
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_CHAT_TYPE_CHARS: usize = 64;
pub const MAX_MESSAGE_CHARS: usize = 32_000;
/// Upload ceiling of the assistant file API
pub const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

/// MIME types accepted for upload
pub const ALLOWED_MIME_TYPES: [&str; 10] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "text/plain",
    "text/csv",
];

// ============================================================================
// Conversation title
// ============================================================================

/// Trimmed conversation title; blank input falls back to the default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTitle(String);

impl ConversationTitle {
    pub fn parse(raw: Option<&str>, default: &str, max_chars: usize) -> ChatResult<Self> {
        let title = match raw.map(str::trim) {
            Some(title) if !title.is_empty() => title,
            _ => default,
        };

        if title.chars().count() > max_chars {
            return Err(ChatError::InvalidInput(format!(
                "Title must be at most {max_chars} characters"
            )));
        }

        Ok(Self(title.to_string()))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

// ============================================================================
// Chat type
// ============================================================================

/// Chat category tag (`tipo_chat`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatType(String);

impl ChatType {
    pub fn parse(raw: Option<&str>, default: &str) -> ChatResult<Self> {
        let chat_type = match raw.map(str::trim) {
            Some(chat_type) if !chat_type.is_empty() => chat_type,
            _ => default,
        };

        let well_formed = chat_type.len() <= MAX_CHAT_TYPE_CHARS
            && chat_type
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

        if !well_formed {
            return Err(ChatError::InvalidInput("Invalid chat type".to_string()));
        }

        Ok(Self(chat_type.to_string()))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

// ============================================================================
// Message text
// ============================================================================

/// User message text: not blank, bounded length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    pub fn parse(raw: &str, max_chars: usize) -> ChatResult<Self> {
        if raw.trim().is_empty() {
            return Err(ChatError::InvalidInput("Message text is required".to_string()));
        }

        if raw.chars().count() > max_chars {
            return Err(ChatError::InvalidInput(format!(
                "Message must be at most {max_chars} characters"
            )));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

// ============================================================================
// Uploads
// ============================================================================

pub fn is_allowed_mime_type(mime_type: &str) -> bool {
    // Browsers may append parameters (`text/plain; charset=utf-8`).
    let essence = mime_type.split(';').next().unwrap_or("").trim();
    ALLOWED_MIME_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(essence))
}

/// Check an upload before it is forwarded to the assistant file API
pub fn validate_upload(file_name: &str, mime_type: &str, size: u64, max_bytes: u64) -> ChatResult<()> {
    if file_name.trim().is_empty() {
        return Err(ChatError::InvalidInput("File name is required".to_string()));
    }

    if size == 0 {
        return Err(ChatError::InvalidInput("File is empty".to_string()));
    }

    if !is_allowed_mime_type(mime_type) {
        return Err(ChatError::InvalidInput(
            "File type not allowed. Allowed types: PDF, DOCX, images, Excel, CSV, TXT".to_string(),
        ));
    }

    if size > max_bytes {
        return Err(ChatError::PayloadTooLarge(format!(
            "File exceeds the maximum allowed size of {}",
            format_file_size(max_bytes)
        )));
    }

    Ok(())
}

/// Human-readable size: `0 Bytes`, `1.5 KB`, `25 MB`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

// ============================================================================
// Run status
// ============================================================================

/// Status of a remote run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    /// Status added by the provider after this code was written
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Cancelled
                | RunStatus::Failed
                | RunStatus::Completed
                | RunStatus::Incomplete
                | RunStatus::Expired
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_defaults_and_trims() {
        let title = ConversationTitle::parse(None, DEFAULT_TITLE, MAX_TITLE_CHARS).unwrap();
        assert_eq!(title.into_inner(), "Nueva Conversación");

        let title = ConversationTitle::parse(Some("   "), DEFAULT_TITLE, MAX_TITLE_CHARS).unwrap();
        assert_eq!(title.into_inner(), "Nueva Conversación");

        let title =
            ConversationTitle::parse(Some("  Trabajo en altura "), DEFAULT_TITLE, MAX_TITLE_CHARS)
                .unwrap();
        assert_eq!(title.into_inner(), "Trabajo en altura");
    }

    #[test]
    fn test_title_length_counts_chars() {
        let exactly = "ñ".repeat(MAX_TITLE_CHARS);
        assert!(ConversationTitle::parse(Some(&exactly), DEFAULT_TITLE, MAX_TITLE_CHARS).is_ok());

        let too_long = "ñ".repeat(MAX_TITLE_CHARS + 1);
        assert!(matches!(
            ConversationTitle::parse(Some(&too_long), DEFAULT_TITLE, MAX_TITLE_CHARS),
            Err(ChatError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_chat_type() {
        assert_eq!(
            ChatType::parse(None, DEFAULT_CHAT_TYPE).unwrap().into_inner(),
            "control_fatalidad_tx"
        );
        assert!(ChatType::parse(Some("riesgo-electrico_2"), DEFAULT_CHAT_TYPE).is_ok());
        assert!(ChatType::parse(Some("drop table;"), DEFAULT_CHAT_TYPE).is_err());
    }

    #[test]
    fn test_message_text() {
        assert!(MessageText::parse("hello", MAX_MESSAGE_CHARS).is_ok());
        assert!(MessageText::parse("", MAX_MESSAGE_CHARS).is_err());
        assert!(MessageText::parse(" \n\t ", MAX_MESSAGE_CHARS).is_err());
        assert!(MessageText::parse(&"a".repeat(MAX_MESSAGE_CHARS + 1), MAX_MESSAGE_CHARS).is_err());
    }

    #[test]
    fn test_validate_upload() {
        assert!(validate_upload("norma.pdf", "application/pdf", 10, MAX_UPLOAD_BYTES).is_ok());
        assert!(validate_upload("notas.txt", "text/plain; charset=utf-8", 10, MAX_UPLOAD_BYTES).is_ok());

        assert!(matches!(
            validate_upload("app.exe", "application/x-msdownload", 10, MAX_UPLOAD_BYTES),
            Err(ChatError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_upload("big.pdf", "application/pdf", MAX_UPLOAD_BYTES + 1, MAX_UPLOAD_BYTES),
            Err(ChatError::PayloadTooLarge(_))
        ));
        assert!(validate_upload("empty.pdf", "application/pdf", 0, MAX_UPLOAD_BYTES).is_err());
        assert!(validate_upload(" ", "application/pdf", 10, MAX_UPLOAD_BYTES).is_err());
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(MAX_UPLOAD_BYTES), "25 MB");
    }

    #[test]
    fn test_run_status_wire_format() {
        let status: RunStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, RunStatus::InProgress);

        let status: RunStatus = serde_json::from_str("\"something_new\"").unwrap();
        assert_eq!(status, RunStatus::Unknown);

        assert!(RunStatus::Expired.is_terminal());
        assert!(!RunStatus::RequiresAction.is_terminal());
    }
}
