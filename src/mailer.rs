//! Outgoing e-mail for contact submissions.
//!
//! Two messages go out per accepted submission: a notification to the site
//! owner and a confirmation to the submitter. Delivery is best-effort; see
//! [`dispatch_contact_emails`].
//!
//! # Providers
//!
//! | `mail.provider` | Behaviour |
//! |-----------------|-----------|
//! | `disabled` | no mailer, nothing is sent |
//! | `resend` | [`ResendMailer`]: `POST {mail.endpoint}` with a bearer API key |

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use portfolio_core::models::ContactSubmission;

use crate::config::MailConfig;

/// A single message ready to hand to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

/// Instantiate the configured mailer, or `None` when mail is disabled.
pub fn create_mailer(config: &MailConfig) -> Result<Option<Arc<dyn Mailer>>> {
    match config.provider.as_str() {
        "disabled" => Ok(None),
        "resend" => Ok(Some(Arc::new(ResendMailer::new(config)?))),
        other => bail!("Unknown mail provider: {}", other),
    }
}

// ============ Resend ============

/// Mailer backed by the Resend HTTP API.
pub struct ResendMailer {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ResendMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("mail.api_key required for resend provider"))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build mail HTTP client")?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .context("mail request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("mail provider returned {}: {}", status, body);
        }
        Ok(())
    }
}

// ============ Messages ============

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Message to the site owner announcing a new submission.
pub fn notification_email(config: &MailConfig, contact: &ContactSubmission) -> Option<OutgoingEmail> {
    let to = config.notify_to.clone()?;
    let subject_line = contact.subject.as_deref().unwrap_or("No Subject");
    let html = format!(
        "<h2>New Contact Form Submission</h2>\
         <p><strong>Name:</strong> {}</p>\
         <p><strong>Email:</strong> {}</p>\
         <p><strong>Subject:</strong> {}</p>\
         <p><strong>Message:</strong></p>\
         <div>{}</div>\
         <p>Submission #{} received {}.</p>",
        escape_html(&contact.name),
        escape_html(&contact.email),
        escape_html(contact.subject.as_deref().unwrap_or("No subject provided")),
        escape_html(&contact.message).replace('\n', "<br>"),
        contact.id,
        contact.created_at.format("%Y-%m-%d %H:%M UTC"),
    );
    Some(OutgoingEmail {
        from: config.from.clone(),
        to: vec![to],
        subject: format!("New Contact Form: {}", subject_line),
        html,
    })
}

/// Message to the submitter confirming receipt.
pub fn confirmation_email(config: &MailConfig, contact: &ContactSubmission) -> OutgoingEmail {
    let html = format!(
        "<h2>Thank you for reaching out!</h2>\
         <p>Hi {},</p>\
         <p>Thank you for your message. I've received your inquiry and will get back to you as soon as possible.</p>\
         <p><strong>Your message:</strong></p>\
         <p><em>\"{}\"</em></p>",
        escape_html(&contact.name),
        escape_html(&contact.message),
    );
    OutgoingEmail {
        from: config.from.clone(),
        to: vec![contact.email.clone()],
        subject: "Thank you for your message!".to_string(),
        html,
    }
}

/// Send the owner notification and the submitter confirmation on a
/// detached task. Failures are logged and never reach the caller.
pub fn dispatch_contact_emails(
    mailer: Arc<dyn Mailer>,
    config: &MailConfig,
    contact: &ContactSubmission,
) -> tokio::task::JoinHandle<()> {
    let mut messages = Vec::with_capacity(2);
    if let Some(notification) = notification_email(config, contact) {
        messages.push(("notification", notification));
    }
    messages.push(("confirmation", confirmation_email(config, contact)));
    let contact_id = contact.id;

    tokio::spawn(async move {
        for (kind, email) in messages {
            match mailer.send(&email).await {
                Ok(()) => tracing::info!(contact_id, kind, "contact email sent"),
                Err(e) => tracing::warn!(contact_id, kind, error = %e, "failed to send contact email"),
            }
        }
    })
}
