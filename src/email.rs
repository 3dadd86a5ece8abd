use std::future::Future;

use anyhow::anyhow;
use serde_json::json;

use crate::{config::Config, db::Role};

/// Resend-backed mail delivery. Without an api key every send is a logged
/// no-op, so local runs and tests never touch the network.
#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    api_key: Option<String>,
    from: String,
}

impl Mailer {
    pub fn new(config: &Config) -> Mailer {
        Mailer {
            http: reqwest::Client::new(),
            api_key: config.resend_api_key.clone(),
            from: config.email_from.clone(),
        }
    }

    async fn send(&self, to: &str, subject: &str, html: String) -> anyhow::Result<()> {
        let Some(api_key) = &self.api_key else {
            tracing::debug!(to, subject, "email delivery disabled, skipping");
            return Ok(());
        };

        let res = self
            .http
            .post("https://api.resend.com/emails")
            .bearer_auth(api_key)
            .json(&json!({
                "from": self.from,
                "to": to,
                "subject": subject,
                "html": html,
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("resend returned {status}: {body}"));
        }

        Ok(())
    }

    pub async fn send_welcome(&self, to: &str, name: &str, role: Role) -> anyhow::Result<()> {
        let role_text = match role {
            Role::Lawyer => "lawyer",
            Role::Client => "client",
        };
        self.send(
            to,
            "Welcome to LawLink!",
            format!(
                "<h1>Welcome to LawLink!</h1>\
                 <p>Hi {name},</p>\
                 <p>Your {role_text} account was created successfully.</p>\
                 <p>Head to your dashboard to get started.</p>"
            ),
        )
        .await
    }

    pub async fn send_consultation_confirmation(
        &self,
        to: &str,
        name: &str,
        lawyer_name: &str,
        scheduled_at: &str,
        title: &str,
    ) -> anyhow::Result<()> {
        self.send(
            to,
            "Consultation booked - LawLink",
            format!(
                "<h1>Consultation booked</h1>\
                 <p>Hi {name},</p>\
                 <p>Your consultation with <strong>{lawyer_name}</strong> is scheduled.</p>\
                 <p><strong>When:</strong> {scheduled_at}</p>\
                 <p><strong>Subject:</strong> {title}</p>\
                 <p>See your dashboard for details.</p>"
            ),
        )
        .await
    }
}

/// Fire-and-forget helper: delivery failures are logged, never surfaced.
pub fn spawn_send(fut: impl Future<Output = anyhow::Result<()>> + Send + 'static) {
    tokio::spawn(async move {
        if let Err(err) = fut.await {
            tracing::warn!("email delivery failed: {err:#}");
        }
    });
}
