//! Outbound notification model and its JSON wire form.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto;
use crate::error::PushError;
use crate::tags::normalize_tags;

/// A notification to send. Built per call and consumed once.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Notification {
    /// Required, non-empty.
    pub title: String,
    pub message: Option<String>,
    /// Free-form category, sent as `type`.
    pub kind: Option<String>,
    /// Raw tags; normalized before sending.
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub action_url: Option<String>,
    /// Used locally to derive the encryption key; never transmitted.
    pub encryption_password: Option<String>,
}

impl Notification {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Title and message only.
    pub fn simple(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(title).message(message)
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    /// Encrypt title, message, image URL and action URL with `password`.
    pub fn encrypt_with(mut self, password: impl Into<String>) -> Self {
        self.encryption_password = Some(password.into());
        self
    }

    /// Validate, normalize tags, and encrypt if requested.
    ///
    /// Fails with [`PushError::Validation`] when the title is empty; nothing
    /// is sent in that case.
    pub fn to_wire(&self) -> Result<WireNotification, PushError> {
        if self.title.trim().is_empty() {
            return Err(PushError::validation("title is required"));
        }

        let tags = normalize_tags(&self.tags);
        if let Some(normalized) = &tags {
            if normalized.len() != self.tags.len() {
                tracing::debug!(before = ?self.tags, after = ?normalized, "tags normalized");
            }
        }

        let mut wire = WireNotification {
            title: self.title.clone(),
            message: self.message.clone().unwrap_or_default(),
            kind: non_empty(&self.kind),
            tags,
            image_url: non_empty(&self.image_url),
            action_url: non_empty(&self.action_url),
            iv: None,
        };

        if let Some(password) = non_empty(&self.encryption_password) {
            tracing::debug!("encrypting title, message, imageURL, actionURL");
            let (iv, iv_hex) = crypto::generate_iv();
            wire.title = crypto::encrypt_field(&wire.title, &password, &iv);
            wire.message = crypto::encrypt_field(&wire.message, &password, &iv);
            wire.image_url = wire
                .image_url
                .map(|u| crypto::encrypt_field(&u, &password, &iv));
            wire.action_url = wire
                .action_url
                .map(|u| crypto::encrypt_field(&u, &password, &iv));
            wire.iv = Some(iv_hex);
        }

        Ok(wire)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("title", &self.title)
            .field("message", &self.message)
            .field("kind", &self.kind)
            .field("tags", &self.tags)
            .field("image_url", &self.image_url)
            .field("action_url", &self.action_url)
            .field(
                "encryption_password",
                &self.encryption_password.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// JSON body as transmitted. Optional fields are omitted when absent.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WireNotification {
    pub title: String,
    pub message: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "actionURL", skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    /// Hex IV, present only when the payload is encrypted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,
}

/// Success body: `{"status": "...", "message": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}
