//! OAuth 2.0 token refresh for YouTube API access.
//!
//! Interactive sign-in happens outside this crate; the resulting tokens are handed to a
//! [`TokenStore`]. What lives here is the launch-time restoration of a previous sign-in: the
//! stored refresh token is exchanged for a fresh access token, and an invalid grant signs the
//! user out.

use crate::error::Error;
use crate::token_store::{Credentials, TokenKind, TokenStore};
use oauth2::basic::{BasicClient, BasicErrorResponseType};
use oauth2::{ClientId, ClientSecret, RefreshToken, RequestTokenError, TokenResponse, TokenUrl};
use oauth2::reqwest;
use tracing::instrument;

/// Google OAuth2 token endpoint.
pub const TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v3/token";

/// Exchanges refresh tokens for new access tokens.
#[derive(Clone)]
pub struct OAuthManager {
    client_id: String,
    client_secret: String,
    token_url: String,
}

impl std::fmt::Debug for OAuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthManager")
            .field("client_id", &self.client_id)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl OAuthManager {
    /// An empty `client_secret` means the client is public and no secret is sent.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: TOKEN_URL.to_string(),
        }
    }

    /// Uses a different token endpoint, e.g. a local test server.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Attempts to refresh an access token using `refresh_token`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(credentials))` - refresh succeeded. If the provider did not rotate the refresh
    ///   token, the one passed in is kept.
    /// * `Ok(None)` - the provider rejected the refresh token as an invalid grant, the user
    ///   has to sign in again
    /// * `Err(_)` - no client id is configured, or the exchange itself failed
    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh_token: &str) -> Result<Option<Credentials>, Error> {
        if self.client_id.is_empty() {
            return Err(Error::NoClientId);
        }

        let token_url = TokenUrl::new(self.token_url.clone())
            .map_err(|e| Error::OAuth(format!("invalid token endpoint: {e}")))?;
        let mut client =
            BasicClient::new(ClientId::new(self.client_id.clone())).set_token_uri(token_url);
        if !self.client_secret.is_empty() {
            client = client.set_client_secret(ClientSecret::new(self.client_secret.clone()));
        }

        let http_client = reqwest::ClientBuilder::new()
            // SSRF no thank you.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::OAuth(format!("build http client: {e}")))?;

        tracing::debug!("attempting to refresh OAuth token");
        match client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&http_client)
            .await
        {
            Ok(response) => {
                tracing::debug!("successfully refreshed OAuth token");
                Ok(Some(Credentials {
                    access_token: response.access_token().secret().clone(),
                    refresh_token: response
                        .refresh_token()
                        .map(|t| t.secret().clone())
                        .unwrap_or_else(|| refresh_token.to_string()),
                }))
            }
            Err(RequestTokenError::ServerResponse(ref response))
                if matches!(response.error(), BasicErrorResponseType::InvalidGrant) =>
            {
                tracing::warn!(error = %response, "OAuth refresh token considered invalid grant");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "OAuth token refresh failed");
                Err(Error::OAuth(e.to_string()))
            }
        }
    }
}

/// Restores the sign-in from a previous run.
///
/// Returns `true` if fresh credentials were stored. Without a stored refresh token there is
/// nothing to restore. An invalid grant clears the store so the user is asked to sign in.
#[instrument(skip_all)]
pub async fn restore_previous_sign_in(
    oauth: &OAuthManager,
    tokens: &dyn TokenStore,
) -> Result<bool, Error> {
    let Some(refresh_token) = tokens.read(TokenKind::Refresh).await? else {
        tracing::debug!("no stored refresh token, nothing to restore");
        return Ok(false);
    };

    match oauth.refresh(&refresh_token).await? {
        Some(credentials) => {
            tokens.save_credentials(&credentials).await?;
            tracing::info!("restored previous sign-in");
            Ok(true)
        }
        None => {
            tokens.clear().await?;
            tracing::info!("stored sign-in is no longer valid, signed out");
            Ok(false)
        }
    }
}
