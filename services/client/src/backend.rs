//! Mentor Backend Contract
//!
//! This module defines the `MentorBackend` trait, the only seam between the
//! session controller and the network, together with `HttpBackend`, its
//! `reqwest` implementation. Tests substitute a mock or an in-process server.

use crate::error::BackendError;
use async_trait::async_trait;
use bytes::Bytes;
use mentor_core::{Command, student::StudentState};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{fmt, time::Duration};
use tracing::debug;

/// Request body for `POST /chat/message/send`.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessagePayload<'a> {
    pub student_id: i64,
    pub text: &'a str,
}

/// The expert's answer to one chat message.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ChatReply {
    #[serde(rename = "user_message", alias = "reply_text")]
    pub reply_text: String,
    /// Side effects the backend already applied. A missing or null list
    /// means none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub commands: Vec<Command>,
}

/// Which material to download for a chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Theory,
    Practice,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Theory => "theory",
            ContentKind::Practice => "practice",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The calls the client makes against the mentor backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MentorBackend: Send + Sync {
    /// `GET /edu/student/{student_id}`: the full learner snapshot.
    async fn fetch_student(&self, student_id: i64) -> Result<StudentState, BackendError>;

    /// `POST /chat/message/send`: sends one message to the active expert.
    async fn send_message(&self, student_id: i64, text: &str) -> Result<ChatReply, BackendError>;

    /// `GET /edu/topic/download/{kind}/{content_id}`: opaque material bytes.
    async fn download_content(
        &self,
        kind: ContentKind,
        content_id: i64,
    ) -> Result<Bytes, BackendError>;
}

/// `MentorBackend` over HTTP with JSON bodies.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a backend client rooted at `base_url`.
    ///
    /// Every request is bounded by `timeout`; hitting it surfaces as
    /// [`BackendError::Transport`].
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wraps an existing `reqwest::Client`.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn checked(
        endpoint: &str,
        sent: Result<Response, reqwest::Error>,
    ) -> Result<Response, BackendError> {
        let response = sent.map_err(|source| BackendError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }
        Ok(response)
    }

    async fn body(endpoint: &str, response: Response) -> Result<Bytes, BackendError> {
        response
            .bytes()
            .await
            .map_err(|source| BackendError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })
    }

    async fn json<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T, BackendError> {
        let body = Self::body(endpoint, response).await?;
        serde_json::from_slice(&body).map_err(|source| BackendError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

#[async_trait]
impl MentorBackend for HttpBackend {
    async fn fetch_student(&self, student_id: i64) -> Result<StudentState, BackendError> {
        let endpoint = format!("/edu/student/{}", student_id);
        debug!(%endpoint, "GET");
        let sent = self.client.get(self.url(&endpoint)).send().await;
        let response = Self::checked(&endpoint, sent)?;
        Self::json(&endpoint, response).await
    }

    async fn send_message(&self, student_id: i64, text: &str) -> Result<ChatReply, BackendError> {
        let endpoint = "/chat/message/send";
        debug!(endpoint, student_id, "POST");
        let sent = self
            .client
            .post(self.url(endpoint))
            .json(&SendMessagePayload { student_id, text })
            .send()
            .await;
        let response = Self::checked(endpoint, sent)?;
        Self::json(endpoint, response).await
    }

    async fn download_content(
        &self,
        kind: ContentKind,
        content_id: i64,
    ) -> Result<Bytes, BackendError> {
        let endpoint = format!("/edu/topic/download/{}/{}", kind, content_id);
        debug!(%endpoint, "GET");
        let sent = self.client.get(self.url(&endpoint)).send().await;
        let response = Self::checked(&endpoint, sent)?;
        Self::body(&endpoint, response).await
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Command>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Command>>::deserialize(deserializer)?.unwrap_or_default())
}
