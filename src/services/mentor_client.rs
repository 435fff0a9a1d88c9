// src/services/mentor_client.rs
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, info};

use crate::config::{ChatEndpoint, normalize_base_url};
use crate::error::ClientError;
use crate::message::{ChatPayload, OnboardingChatPayload};
use crate::services::sse_decoder::{ReplyStream, decode_reply_stream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMode {
    Backend,
    Demo,
}

/// Source of streamed mentor replies.
#[async_trait]
pub trait MentorClient: Send + Sync {
    fn mode(&self) -> ClientMode;

    async fn healthcheck(&self) -> Result<(), ClientError>;

    /// Start one exchange. The returned stream yields reply text in arrival
    /// order and ends at the sentinel or at end of body.
    async fn send_message_stream(
        &self,
        student_id: &str,
        message: &str,
    ) -> Result<ReplyStream, ClientError>;
}

/// Talks to the real mentor service over HTTP.
#[derive(Debug, Clone)]
pub struct BackendChatClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    endpoint: ChatEndpoint,
}

impl BackendChatClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            token: None,
            endpoint: ChatEndpoint::Mentor,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_endpoint(mut self, endpoint: ChatEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl MentorClient for BackendChatClient {
    fn mode(&self) -> ClientMode {
        ClientMode::Backend
    }

    async fn healthcheck(&self) -> Result<(), ClientError> {
        let response = self
            .authorize(self.http.get(self.url("/health")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::HealthCheck {
                status: response.status().as_u16(),
            });
        }
        debug!(base_url = %self.base_url, "mentor backend is healthy");
        Ok(())
    }

    async fn send_message_stream(
        &self,
        student_id: &str,
        message: &str,
    ) -> Result<ReplyStream, ClientError> {
        let request = self.http.post(self.url(self.endpoint.path()));
        let request = match self.endpoint {
            ChatEndpoint::Mentor => request.json(&ChatPayload {
                student_id: student_id.to_string(),
                message: message.to_string(),
            }),
            ChatEndpoint::Onboarding => request.json(&OnboardingChatPayload {
                message: message.to_string(),
            }),
        };

        let response = self.authorize(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), body = %body, "chat request rejected");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        info!(endpoint = self.endpoint.path(), "streaming mentor reply");
        let body = response.bytes_stream().map_err(reqwest::Error::without_url);
        Ok(decode_reply_stream(body))
    }
}
