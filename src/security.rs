use regex::Regex;
use std::sync::OnceLock;

use crate::errors::{AppError, AppResult};

pub struct InputValidator;

fn snowflake_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{17,20}$").expect("snowflake pattern is valid"))
}

fn unsafe_filename_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).expect("filename pattern is valid")
    })
}

impl InputValidator {
    /// Discord channel ids are numeric snowflakes.
    pub fn validate_channel_id(channel_id: &str) -> AppResult<()> {
        let trimmed = channel_id.trim();

        if trimmed.is_empty() {
            return Err(AppError::validation("channel_id", "Channel id cannot be empty"));
        }

        if !snowflake_pattern().is_match(trimmed) {
            return Err(AppError::validation(
                "channel_id",
                &format!("'{}' is not a Discord channel id", trimmed),
            ));
        }

        Ok(())
    }

    pub fn sanitize_filename(filename: &str) -> String {
        let sanitized = unsafe_filename_chars().replace_all(filename.trim(), "_");

        // Limit length
        if sanitized.chars().count() > 255 {
            let truncated: String = sanitized.chars().take(252).collect();
            format!("{}...", truncated)
        } else {
            sanitized.to_string()
        }
    }
}
