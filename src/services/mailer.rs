use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::core::config::Settings;

#[derive(Debug, Error)]
pub(crate) enum MailError {
    #[error("failed to build mail relay client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("mail relay request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EmailMessage {
    pub(crate) to: String,
    pub(crate) subject: String,
    pub(crate) body: String,
}

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

/// Thin client for an HTTP mail relay.
#[derive(Debug, Clone)]
pub(crate) struct Mailer {
    client: Client,
    relay_url: String,
    api_key: String,
    from_address: String,
}

impl Mailer {
    /// `None` when no relay is configured; notifications are then stored but not mailed.
    pub(crate) fn from_settings(settings: &Settings) -> Result<Option<Self>, MailError> {
        let mail = settings.mail();
        if !mail.is_enabled() {
            return Ok(None);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(mail.timeout_seconds))
            .build()
            .map_err(MailError::Client)?;

        Ok(Some(Self {
            client,
            relay_url: mail.relay_url.trim_end_matches('/').to_string(),
            api_key: mail.api_key.clone(),
            from_address: mail.from_address.clone(),
        }))
    }

    pub(crate) async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let payload = RelayPayload {
            from: &self.from_address,
            to: [&message.to],
            subject: &message.subject,
            text: &message.body,
        };

        let mut request = self.client.post(&self.relay_url).json(&payload);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await.map_err(MailError::Transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(MailError::Rejected { status: status.as_u16(), body })
    }
}
