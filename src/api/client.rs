//! API client for the comic platform's REST backend.
//!
//! Every endpoint answers with the same envelope: an HTTP-style numeric
//! `status`, an optional user-facing `message`, and an optional `data`
//! payload. [`Envelope`] models that shape once so call sites discriminate
//! success and failure explicitly instead of shape-checking ad hoc.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::models::{LoginPayload, UserIdentity};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The backend's uniform response envelope.
// Serde would otherwise infer a `T: Default` bound from the defaulted
// `data` field; `Option<T>` already defaults for any `T`.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct Envelope<T> {
    pub status: u16,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Explicit success/failure discrimination. A failure envelope
    /// becomes [`ApiError::Backend`] carrying the backend's message.
    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(ApiError::Backend {
                status: self.status,
                message: self.message.unwrap_or_default(),
            })
        }
    }

    /// Like [`into_result`], for endpoints where success without a
    /// payload would be a backend bug.
    ///
    /// [`into_result`]: Envelope::into_result
    pub fn require_data(self) -> Result<T, ApiError> {
        self.into_result()?
            .ok_or_else(|| ApiError::InvalidResponse("Missing data in success envelope".into()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// API client for the comic backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token: None,
        })
    }

    /// Client pointed at the configured (or env-overridden) base URL.
    pub fn from_config(config: &crate::config::Config) -> Result<Self, ApiError> {
        Self::new(config.api_base_url())
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Attach auth, send, and parse the envelope.
    ///
    /// The backend answers failures with an envelope too, so the body is
    /// parsed regardless of the HTTP status; only an unparseable body
    /// falls back to status-based errors.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let builder = match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => {
                debug!(status = envelope.status, "API response");
                Ok(envelope)
            }
            Err(_) if !status.is_success() => Err(ApiError::from_status(status, &body)),
            Err(e) => Err(ApiError::InvalidResponse(e.to_string())),
        }
    }

    // ===== Auth =====

    pub async fn login(&self, credentials: &LoginRequest) -> Result<Envelope<LoginPayload>, ApiError> {
        self.execute(self.client.post(self.url("/auth/login")).json(credentials))
            .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Envelope<()>, ApiError> {
        self.execute(self.client.post(self.url("/auth/register")).json(request))
            .await
    }

    pub async fn verify_email(&self, token: &str) -> Result<Envelope<UserIdentity>, ApiError> {
        self.execute(
            self.client
                .get(self.url("/auth/verify"))
                .query(&[("token", token)]),
        )
        .await
    }

    // ===== Engagement =====

    /// Reward grant after sustained reading. Idempotent on the backend;
    /// the actor is implied by the bearer token.
    pub async fn grant_reading_reward(&self) -> Result<Envelope<()>, ApiError> {
        self.execute(self.client.post(self.url("/comic/gain-exp")))
            .await
    }

    pub async fn purchase_chapter(&self, chapter_id: &str) -> Result<Envelope<()>, ApiError> {
        self.execute(
            self.client
                .post(self.url(&format!("/chapter/{}/buy", chapter_id))),
        )
        .await
    }

    pub async fn follow_comic(&self, comic_id: &str) -> Result<Envelope<()>, ApiError> {
        self.execute(
            self.client
                .post(self.url(&format!("/comic/{}/follow", comic_id))),
        )
        .await
    }

    pub async fn unfollow_comic(&self, comic_id: &str) -> Result<Envelope<()>, ApiError> {
        self.execute(
            self.client
                .post(self.url(&format!("/comic/{}/unfollow", comic_id))),
        )
        .await
    }

    pub async fn check_followed(&self, comic_id: &str) -> Result<Envelope<bool>, ApiError> {
        self.execute(
            self.client
                .get(self.url(&format!("/comic/{}/check-follow", comic_id))),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success_discrimination() {
        let envelope: Envelope<bool> = serde_json::from_str(
            r#"{"status":200,"data":true,"timestamp":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(envelope.is_success());
        assert_eq!(envelope.into_result().unwrap(), Some(true));
    }

    #[test]
    fn test_envelope_failure_carries_message() {
        let envelope: Envelope<()> =
            serde_json::from_str(r#"{"status":400,"message":"Chapter already purchased"}"#)
                .unwrap();
        assert!(!envelope.is_success());
        let err = envelope.into_result().unwrap_err();
        assert_eq!(err.user_message(), "Chapter already purchased");
    }

    #[test]
    fn test_envelope_deserializes_non_default_payloads() {
        // LoginPayload has no Default impl; the envelope must not demand one
        let envelope: Envelope<crate::models::LoginPayload> = serde_json::from_str(
            r#"{
                "status": 200,
                "data": {
                    "accessToken": "at",
                    "refreshToken": "rt",
                    "id": "u1",
                    "username": "reader",
                    "imgUrl": "img",
                    "vip": false,
                    "role": { "id": "r1", "name": "USER" }
                }
            }"#,
        )
        .unwrap();
        let payload = envelope.require_data().unwrap();
        assert_eq!(payload.username, "reader");
    }

    #[test]
    fn test_envelope_missing_data_on_success() {
        let envelope: Envelope<bool> = serde_json::from_str(r#"{"status":200}"#).unwrap();
        assert!(envelope.require_data().is_err());
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:8080/api/").unwrap();
        assert_eq!(
            client.url("/auth/login"),
            "http://localhost:8080/api/auth/login"
        );
    }
}
