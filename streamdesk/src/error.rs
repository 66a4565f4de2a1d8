//! Error taxonomy shared by every API client and workflow in this crate.
//!
//! Transport and decoding failures are normalized at the client boundary into a handful of
//! variants. Provider error bodies are decoded opportunistically and take precedence over the
//! generic [`Error::InvalidResponse`].

use crate::news::NewsErrorResponse;
use crate::youtube::YouTubeErrorResponse;
use http::StatusCode;

/// Everything that can go wrong between building a request and handing a typed result back.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The request could not be assembled (bad URL, unserializable payload, missing field).
    #[error("failed to construct request: {0}")]
    RequestConstruction(String),

    /// The network is not reachable at all.
    #[error("no network connectivity")]
    NoConnectivity,

    /// The server answered with something that is not a usable HTTP response.
    #[error("server unreachable or returned a malformed response")]
    ServerUnreachable,

    /// Any other transport failure.
    #[error("request failed")]
    RequestFailed,

    /// The server answered with a failure status and no recognizable error body.
    #[error("invalid response with status {status}")]
    InvalidResponse { status: StatusCode },

    /// A success response whose body did not decode into the expected type.
    #[error("failed to decode response body")]
    DecodingFailed,

    /// Structured error returned by the YouTube Data API.
    #[error("YouTube API error {}: {}", .0.error.code, .0.error.message)]
    YouTube(YouTubeErrorResponse),

    /// Structured error returned by the News API.
    #[error("News API error {}: {}", .0.code, .0.message)]
    News(NewsErrorResponse),

    /// No access token is stored, the user has to sign in.
    #[error("no access token available")]
    NoAccessToken,

    /// No OAuth client id is configured.
    #[error("no OAuth client id configured")]
    NoClientId,

    /// The token store could not be read or written.
    #[error("token storage failed: {0}")]
    TokenStorage(String),

    /// The OAuth token endpoint rejected or failed a refresh.
    #[error("OAuth exchange failed: {0}")]
    OAuth(String),
}

impl Error {
    /// Short headline suitable for an alert title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::RequestConstruction(_) => "Bad Request",
            Self::NoConnectivity => "No Internet Connection",
            Self::ServerUnreachable => "No Server Connection",
            Self::RequestFailed => "Request Failed",
            Self::InvalidResponse { .. } => "Invalid Response",
            Self::DecodingFailed => "Failed to Decode Response",
            Self::YouTube(_) => "YouTube Connection Failed",
            Self::News(_) => "News Unavailable",
            Self::NoAccessToken | Self::NoClientId | Self::OAuth(_) => {
                "YouTube Authentication Failed"
            }
            Self::TokenStorage(_) => "Credential Storage Failed",
        }
    }

    /// Message shown to the user underneath [`Self::title`].
    pub fn user_message(&self) -> String {
        match self {
            Self::RequestConstruction(_) => "Failed to create data request".into(),
            Self::NoConnectivity => "Please check internet connection and try again".into(),
            Self::ServerUnreachable => "Server connection failed, please try again later".into(),
            Self::RequestFailed => "The request could not be completed, please try again".into(),
            Self::InvalidResponse { .. } => {
                "The response was invalid, please try again later, or refresh the app".into()
            }
            Self::DecodingFailed => "Bad data returned from server".into(),
            Self::YouTube(response) => response.error.message.clone(),
            Self::News(response) => response.message.clone(),
            Self::NoAccessToken => "Access has expired, please sign in again.".into(),
            Self::NoClientId => {
                "No client ID, please contact support to resolve the issue.".into()
            }
            Self::TokenStorage(_) => "Your sign-in could not be saved, please try again.".into(),
            Self::OAuth(_) => "Signing in to YouTube failed, please sign in again.".into(),
        }
    }
}

impl From<crate::http::request::RequestDescriptorBuilderError> for Error {
    fn from(e: crate::http::request::RequestDescriptorBuilderError) -> Self {
        Self::RequestConstruction(e.to_string())
    }
}
