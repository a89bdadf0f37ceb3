//! Telegram Bot API implementation of the session client.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::retry::{
    is_retryable_transport_error, retry_delay, should_retry_status, truncate_for_error,
};
use crate::types::{RawUpdate, SelfInfo, SessionClient, SessionError, WireUser};

const ERROR_BODY_MAX_CHARS: usize = 320;
// Long polls hold the connection open for the requested timeout; the
// request deadline must outlive it.
const POLL_TIMEOUT_GRACE_SECONDS: u64 = 10;
const POLLED_UPDATE_KINDS: [&str; 4] = [
    "message",
    "edited_message",
    "channel_post",
    "edited_channel_post",
];

#[derive(Debug, Clone)]
/// Connection settings for the Bot API transport.
pub struct TelegramClientConfig {
    pub api_base: String,
    pub bot_token: String,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ApiParameters>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

#[derive(Clone)]
pub struct TelegramSessionClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    retry_max_attempts: usize,
    retry_base_delay_ms: u64,
}

impl TelegramSessionClient {
    pub fn new(config: TelegramClientConfig) -> Result<Self, SessionError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("telerobot"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.trim().to_string(),
            retry_max_attempts: config.retry_max_attempts.max(1),
            retry_base_delay_ms: config.retry_base_delay_ms.max(1),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    async fn call<T>(
        &self,
        method: &str,
        payload: Value,
        timeout_override: Option<Duration>,
    ) -> Result<T, SessionError>
    where
        T: DeserializeOwned,
    {
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            let mut request = self.http.post(self.method_url(method)).json(&payload);
            if let Some(timeout) = timeout_override {
                request = request.timeout(timeout);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await?;
                    let envelope = match serde_json::from_str::<ApiEnvelope<T>>(&body) {
                        Ok(envelope) => envelope,
                        Err(error) => {
                            if !status.is_success() {
                                if attempt < self.retry_max_attempts
                                    && should_retry_status(status.as_u16())
                                {
                                    tokio::time::sleep(retry_delay(
                                        self.retry_base_delay_ms,
                                        attempt,
                                        None,
                                    ))
                                    .await;
                                    continue;
                                }
                                return Err(SessionError::HttpStatus {
                                    status: status.as_u16(),
                                    body: truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
                                });
                            }
                            return Err(SessionError::InvalidResponse(format!(
                                "failed to decode {method} response: {error}"
                            )));
                        }
                    };

                    if envelope.ok {
                        return envelope.result.ok_or_else(|| {
                            SessionError::InvalidResponse(format!(
                                "{method} response is missing its result"
                            ))
                        });
                    }

                    let retry_after = envelope
                        .parameters
                        .as_ref()
                        .and_then(|parameters| parameters.retry_after);
                    if attempt < self.retry_max_attempts && should_retry_status(status.as_u16()) {
                        tokio::time::sleep(retry_delay(
                            self.retry_base_delay_ms,
                            attempt,
                            retry_after,
                        ))
                        .await;
                        continue;
                    }
                    return Err(SessionError::Api {
                        description: envelope
                            .description
                            .unwrap_or_else(|| "unknown error".to_string()),
                    });
                }
                Err(error) => {
                    if attempt < self.retry_max_attempts && is_retryable_transport_error(&error) {
                        tokio::time::sleep(retry_delay(self.retry_base_delay_ms, attempt, None))
                            .await;
                        continue;
                    }
                    return Err(SessionError::Http(error));
                }
            }
        }
    }
}

#[async_trait]
impl SessionClient for TelegramSessionClient {
    async fn start(&self) -> Result<(), SessionError> {
        // The Bot API has no explicit connect step; an authenticated
        // self-lookup proves the credential is live.
        self.get_self().await.map(|_| ())
    }

    async fn get_self(&self) -> Result<SelfInfo, SessionError> {
        let me: WireUser = self.call("getMe", json!({}), None).await?;
        Ok(SelfInfo {
            id: me.id,
            username: me.username,
        })
    }

    async fn poll_updates(
        &self,
        offset: i64,
        timeout_seconds: u64,
    ) -> Result<Vec<RawUpdate>, SessionError> {
        let payload = json!({
            "offset": offset,
            "timeout": timeout_seconds,
            "allowed_updates": POLLED_UPDATE_KINDS,
        });
        let deadline =
            Duration::from_secs(timeout_seconds.saturating_add(POLL_TIMEOUT_GRACE_SECONDS));
        self.call("getUpdates", payload, Some(deadline)).await
    }

    async fn send_message(&self, peer: i64, text: &str) -> Result<(), SessionError> {
        let payload = json!({
            "chat_id": peer,
            "text": text,
        });
        self.call::<Value>("sendMessage", payload, None)
            .await
            .map(|_| ())
    }

    async fn edit_message(
        &self,
        peer: i64,
        message_id: i64,
        text: &str,
        html: bool,
    ) -> Result<(), SessionError> {
        let mut payload = json!({
            "chat_id": peer,
            "message_id": message_id,
            "text": text,
        });
        if html {
            payload["parse_mode"] = Value::String("HTML".to_string());
        }
        self.call::<Value>("editMessageText", payload, None)
            .await
            .map(|_| ())
    }

    async fn log_out(&self) -> Result<(), SessionError> {
        self.call::<bool>("logOut", json!({}), None)
            .await
            .map(|_| ())
    }
}
