use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::utilities::{app_state::SharedMailer, config::Config, errors::AppError};

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Email {
    pub subject: String,
    pub body: String,
    pub to: Vec<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), AppError>;
}

/// HTTP transport when an API key is configured, the log otherwise.
pub fn from_config(config: &Config) -> SharedMailer {
    match &config.email_api_key {
        Some(api_key) => Arc::new(HttpMailer::new(
            config.email_api_url.clone(),
            api_key.clone(),
            config.email_from.clone(),
        )),
        None => {
            info!("EMAIL_API_KEY not set, emails are written to the log.");
            Arc::new(LogMailer)
        }
    }
}

#[derive(Deserialize, Debug)]
struct MailResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    request_id: String,
}

#[derive(Serialize)]
struct EmailAddress {
    address: String,
}

#[derive(Serialize)]
struct Recipient {
    email_address: EmailAddress,
}

#[derive(Serialize)]
struct Payload {
    from: EmailAddress,
    to: Vec<Recipient>,
    subject: String,
    textbody: String,
}

/// Posts plain text emails to a ZeptoMail compatible JSON endpoint.
pub struct HttpMailer {
    api_url: String,
    api_key: String,
    from: String,
    client: Client,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            api_url,
            api_key,
            from,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: Email) -> Result<(), AppError> {
        let payload = Payload {
            from: EmailAddress {
                address: self.from.clone(),
            },
            to: email
                .to
                .iter()
                .map(|address| Recipient {
                    email_address: EmailAddress {
                        address: address.clone(),
                    },
                })
                .collect(),
            subject: email.subject.clone(),
            textbody: email.body,
        };

        debug!("Sending '{}' to {:?}", email.subject, email.to);

        let res = self
            .client
            .post(&self.api_url)
            .header("accept", "application/json")
            .header("content-type", "application/json")
            .header("authorization", format!("Zoho-enczapikey {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Email request failed: {e}")))?;

        let status = res.status();
        let body = res.json::<MailResponse>().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse email service response: {e}"))
        })?;

        if status.is_success() {
            info!(request_id = %body.request_id, "email accepted");
            Ok(())
        } else {
            Err(AppError::ExternalServiceError(format!(
                "Email service error (status {status}): {}",
                body.message
            )))
        }
    }
}

/// Writes emails to the log instead of delivering them.
#[derive(Clone, Copy, Default, Debug)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), AppError> {
        info!(to = ?email.to, subject = %email.subject, "email\n{}", email.body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_accepts_everything() {
        let email = Email {
            subject: "Hello".into(),
            body: "Body".into(),
            to: vec!["someone@example.com".into()],
        };
        assert!(LogMailer.send(email).await.is_ok());
    }
}
