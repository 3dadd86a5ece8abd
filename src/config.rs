use anyhow::Context;

#[derive(Clone)]
pub struct OAuthKeys {
    pub client_id: String,
    pub client_secret: String,
}

/// Environment-backed configuration, read once at startup. Optional secrets
/// disable their integration instead of aborting.
#[derive(Clone)]
pub struct Config {
    pub app_url: String,
    pub database_url: String,
    pub stripe_secret_key: Option<String>,
    pub resend_api_key: Option<String>,
    pub email_from: String,
    pub google: Option<OAuthKeys>,
    pub facebook: Option<OAuthKeys>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        Ok(Config {
            app_url: dotenv::var("APP_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned()),
            database_url: dotenv::var("DATABASE_URL").context("DATABASE_URL is required")?,
            stripe_secret_key: dotenv::var("STRIPE_SECRET_KEY").ok(),
            resend_api_key: dotenv::var("RESEND_API_KEY").ok(),
            email_from: dotenv::var("EMAIL_FROM")
                .unwrap_or_else(|_| "noreply@lawlink.example".to_owned()),
            google: oauth_keys("GOOGLE"),
            facebook: oauth_keys("FACEBOOK"),
        })
    }

    /// Config for tests and local tooling: in-memory db, no integrations.
    pub fn for_tests() -> Config {
        Config {
            app_url: "http://localhost:8080".to_owned(),
            database_url: "sqlite::memory:".to_owned(),
            stripe_secret_key: None,
            resend_api_key: None,
            email_from: "noreply@lawlink.example".to_owned(),
            google: None,
            facebook: None,
        }
    }
}

fn oauth_keys(prefix: &str) -> Option<OAuthKeys> {
    let client_id = dotenv::var(format!("{prefix}_CLIENT_ID")).ok()?;
    let client_secret = dotenv::var(format!("{prefix}_CLIENT_SECRET")).ok()?;
    Some(OAuthKeys {
        client_id,
        client_secret,
    })
}
