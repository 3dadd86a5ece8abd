use std::fmt;

use oauth2::{AuthUrl, Client, ClientId, ClientSecret, RedirectUrl, TokenUrl, basic::BasicClient};
use serde::Deserialize;

use crate::{AppResult, config::Config};

type HappyClient = Client<
    oauth2::StandardErrorResponse<oauth2::basic::BasicErrorResponseType>,
    oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, oauth2::basic::BasicTokenType>,
    oauth2::StandardTokenIntrospectionResponse<
        oauth2::EmptyExtraTokenFields,
        oauth2::basic::BasicTokenType,
    >,
    oauth2::StandardRevocableToken,
    oauth2::StandardErrorResponse<oauth2::RevocationErrorResponseType>,
    oauth2::EndpointSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointNotSet,
    oauth2::EndpointSet,
>;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Google,
    Facebook,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Facebook => "facebook",
        }
    }

    pub(crate) fn userinfo_url(&self) -> &'static str {
        match self {
            Provider::Google => "https://www.googleapis.com/oauth2/v2/userinfo",
            Provider::Facebook => "https://graph.facebook.com/me?fields=id,name,email,picture",
        }
    }

    fn auth_url(&self) -> &'static str {
        match self {
            Provider::Google => "https://accounts.google.com/o/oauth2/auth",
            Provider::Facebook => "https://www.facebook.com/v19.0/dialog/oauth",
        }
    }

    fn token_url(&self) -> &'static str {
        match self {
            Provider::Google => "https://oauth2.googleapis.com/token",
            Provider::Facebook => "https://graph.facebook.com/v19.0/oauth/access_token",
        }
    }

    pub(crate) fn scopes(&self) -> &'static [&'static str] {
        match self {
            Provider::Google => &["openid", "email", "profile"],
            Provider::Facebook => &["email", "public_profile"],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured OAuth clients; a provider without keys stays `None` and its
/// login route reports that instead of panicking.
#[derive(Clone)]
pub struct Clients {
    google: Option<HappyClient>,
    facebook: Option<HappyClient>,
}

impl Clients {
    pub fn from_config(config: &Config) -> Clients {
        Clients {
            google: build(config, Provider::Google, config.google.as_ref()),
            facebook: build(config, Provider::Facebook, config.facebook.as_ref()),
        }
    }

    pub fn get(&self, provider: Provider) -> AppResult<HappyClient> {
        match provider {
            Provider::Google => self.google.clone(),
            Provider::Facebook => self.facebook.clone(),
        }
        .ok_or(format!("OAuth provider {provider} keys not supplied").into())
    }
}

fn build(
    config: &Config,
    provider: Provider,
    keys: Option<&crate::config::OAuthKeys>,
) -> Option<HappyClient> {
    let keys = keys?;

    let auth_url = AuthUrl::new(provider.auth_url().to_owned()).ok()?;
    let token_url = TokenUrl::new(provider.token_url().to_owned()).ok()?;
    let redirect_url =
        RedirectUrl::new(format!("{}/auth/{provider}/callback", config.app_url)).ok()?;

    Some(
        BasicClient::new(ClientId::new(keys.client_id.clone()))
            .set_client_secret(ClientSecret::new(keys.client_secret.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url),
    )
}
