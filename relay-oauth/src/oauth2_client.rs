use anyhow::{anyhow, Result};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{AuthUrl, ClientId, ClientSecret, RefreshToken, RequestTokenError, TokenResponse, TokenUrl};
use relay_core::CredentialSet;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Trades a tenant's long-lived refresh token for a short-lived access token.
///
/// Built per request from a [`CredentialSet`]; nothing is cached.
pub struct OAuth2RefreshTokenClient {
    client: BasicClient,
    refresh_token: RefreshToken,
}

impl OAuth2RefreshTokenClient {
    pub fn new(
        credentials: &CredentialSet,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Result<Self> {
        let client = BasicClient::new(
            ClientId::new(credentials.client_id.clone()),
            Some(ClientSecret::new(credentials.client_secret.clone())),
            AuthUrl::new(auth_url.into())?,
            Some(TokenUrl::new(token_url.into())?),
        );

        Ok(Self {
            client,
            refresh_token: RefreshToken::new(credentials.refresh_token.clone()),
        })
    }

    /// Exchange the refresh token.
    ///
    /// A rejection from the token endpoint is reported by its OAuth error
    /// code (`invalid_grant`, `invalid_client`, ...).
    pub async fn access_token(&self) -> Result<String> {
        let token = self
            .client
            .exchange_refresh_token(&self.refresh_token)
            .request_async(async_http_client)
            .await
            .map_err(|err| match err {
                RequestTokenError::ServerResponse(resp) => anyhow!("{}", resp.error().as_ref()),
                other => anyhow!("{:#}", anyhow::Error::new(other)),
            })?;

        Ok(token.access_token().secret().to_string())
    }
}
