use anyhow::anyhow;

use crate::{AppResult, GetField, config::Config};

pub(crate) struct CheckoutArgs<'a> {
    pub consultation_id: &'a str,
    pub client_id: &'a str,
    pub lawyer_id: &'a str,
    pub lawyer_name: &'a str,
    pub title: &'a str,
    pub amount_cents: i64,
}

pub(crate) struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Thin client for Stripe's hosted Checkout. Session creation is the only
/// call we make; confirmation arrives over the webhook.
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: Option<String>,
    app_url: String,
}

impl StripeClient {
    pub fn new(config: &Config) -> StripeClient {
        StripeClient {
            http: reqwest::Client::new(),
            secret_key: config.stripe_secret_key.clone(),
            app_url: config.app_url.clone(),
        }
    }

    pub(crate) async fn create_checkout_session(
        &self,
        args: &CheckoutArgs<'_>,
    ) -> AppResult<CheckoutSession> {
        let Some(secret_key) = &self.secret_key else {
            return Err(anyhow!("STRIPE_SECRET_KEY not configured").into());
        };

        let product_name = format!("Consultation with {}", args.lawyer_name);
        let amount = args.amount_cents.to_string();
        let success_url = format!(
            "{}/dashboard?payment=success&consultationId={}",
            self.app_url, args.consultation_id
        );
        let cancel_url = format!("{}/dashboard?payment=cancelled", self.app_url);

        let form = [
            ("mode", "payment"),
            ("payment_method_types[0]", "card"),
            ("line_items[0][price_data][currency]", "brl"),
            ("line_items[0][price_data][product_data][name]", &product_name),
            ("line_items[0][price_data][product_data][description]", args.title),
            ("line_items[0][price_data][unit_amount]", &amount),
            ("line_items[0][quantity]", "1"),
            ("success_url", &success_url),
            ("cancel_url", &cancel_url),
            ("metadata[consultationId]", args.consultation_id),
            ("metadata[clientId]", args.client_id),
            ("metadata[lawyerId]", args.lawyer_id),
        ];

        let res = self
            .http
            .post("https://api.stripe.com/v1/checkout/sessions")
            .bearer_auth(secret_key)
            .form(&form)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(anyhow!("stripe checkout failed with {status}: {body}").into());
        }

        let body: serde_json::Value = res.json().await?;
        Ok(CheckoutSession {
            id: body.get_str_field("id")?,
            url: body.get_str_field("url")?,
        })
    }
}
