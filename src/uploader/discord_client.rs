use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};
use std::path::Path;
use tokio::time::Duration;

use super::ChannelSender;
use crate::errors::{AppError, AppResult};
use crate::security::InputValidator;

const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Discord REST client authenticated as a bot
pub struct DiscordClient {
    client: Client,
    api_base: String,
    authorization: String,
}

impl DiscordClient {
    pub fn new(token: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(
                "DiscordBot (folder-poster, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .build()?;

        Ok(Self {
            client,
            api_base: DISCORD_API_BASE.to_string(),
            authorization: bot_authorization(token),
        })
    }

    /// Points the client at another API root, e.g. a local proxy.
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn build_form(file_name: &str, contents: Vec<u8>) -> AppResult<multipart::Form> {
        let file_name = InputValidator::sanitize_filename(file_name);
        let payload = serde_json::json!({
            "attachments": [{ "id": 0, "filename": file_name }]
        });

        let part = multipart::Part::bytes(contents)
            .file_name(file_name.clone())
            .mime_str(mime_type_for(&file_name))?;

        Ok(multipart::Form::new()
            .text("payload_json", payload.to_string())
            .part("files[0]", part))
    }
}

#[async_trait]
impl ChannelSender for DiscordClient {
    async fn open(&self) -> AppResult<()> {
        let response = self
            .client
            .get(format!("{}/users/@me", self.api_base))
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .send()
            .await?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(AppError::authentication(format!(
                "Discord rejected the bot token ({})",
                status
            )));
        }
        if !status.is_success() {
            let error_text = error_body(response).await;
            return Err(AppError::authentication(format!(
                "Discord API error {} while checking the bot token: {}",
                status, error_text
            )));
        }

        let user: serde_json::Value = response.json().await?;
        log::info!(
            "Connected to Discord as {}",
            user.get("username")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown user")
        );
        Ok(())
    }

    async fn close(&self) {
        log::info!("Discord session closed");
    }

    async fn send_file(
        &self,
        channel_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> AppResult<()> {
        InputValidator::validate_channel_id(channel_id)
            .map_err(|e| AppError::upload_failed(e.to_string()))?;

        let form = Self::build_form(file_name, contents)?;
        let url = format!("{}/channels/{}/messages", self.api_base, channel_id.trim());
        log::debug!("Posting {} to {}", file_name, url);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.authorization)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error_text = error_body(response).await;
        Err(AppError::upload_failed(format!(
            "Discord API error {} for channel {}: {}",
            status, channel_id, error_text
        )))
    }
}

fn bot_authorization(token: &str) -> String {
    let token = token.trim();
    if token.starts_with("Bot ") {
        token.to_string()
    } else {
        format!("Bot {}", token)
    }
}

fn mime_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

async fn error_body(response: reqwest::Response) -> String {
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    text.chars().take(300).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_authorization() {
        assert_eq!(bot_authorization("abc"), "Bot abc");
        assert_eq!(bot_authorization(" abc\n"), "Bot abc");
        assert_eq!(bot_authorization("Bot abc"), "Bot abc");
    }

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for("a.PNG"), "image/png");
        assert_eq!(mime_type_for("a.jpg"), "image/jpeg");
        assert_eq!(mime_type_for("a.JPEG"), "image/jpeg");
        assert_eq!(mime_type_for("a.gif"), "image/gif");
        assert_eq!(mime_type_for("a"), "application/octet-stream");
    }

    #[test]
    fn test_with_api_base_trims_slash() {
        let client = DiscordClient::new("T")
            .unwrap()
            .with_api_base("http://127.0.0.1:9/api/");
        assert_eq!(client.api_base, "http://127.0.0.1:9/api");
    }

    #[tokio::test]
    async fn test_invalid_channel_is_rejected_before_sending() {
        // Unroutable base: reaching the network would fail differently.
        let client = DiscordClient::new("T")
            .unwrap()
            .with_api_base("http://127.0.0.1:9");

        let result = client.send_file("C1", "x.png", vec![1, 2, 3]).await;
        match result {
            Err(AppError::UploadFailed { reason }) => assert!(reason.contains("channel_id")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
