//! Generic JSON-over-HTTP client.

use crate::error::Error;
use crate::http::request::RequestDescriptor;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::instrument;

/// Headers whose values never show up in traffic logs.
const REDACTED_HEADERS: &[&str] = &["authorization", "x-api-key"];

/// JSON fields whose values never show up in traffic logs, at any depth.
const REDACTED_FIELDS: &[&str] = &["streamName", "access_token", "refresh_token"];

/// Executes [`RequestDescriptor`]s and decodes their JSON responses.
///
/// The client holds no per-API state; services share one instance (it is cheap to clone).
/// There is no retry and no timeout beyond the defaults of the underlying
/// [`reqwest::Client`]. Every failure is terminal for that call.
#[derive(Debug, Clone, Default)]
pub struct ApiClient {
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Sends the request and decodes a successful response body as `T`.
    ///
    /// # Errors
    ///
    /// * [`Error::RequestConstruction`] if the URL or request cannot be built
    /// * [`Error::NoConnectivity`], [`Error::ServerUnreachable`] or [`Error::RequestFailed`]
    ///   for transport failures
    /// * the descriptor's domain error, or [`Error::InvalidResponse`], for statuses above 299
    /// * [`Error::DecodingFailed`] if the body is not the expected JSON
    #[instrument(
        skip(self, descriptor),
        fields(method = %descriptor.method(), host = descriptor.host(), path = descriptor.path()),
        level = tracing::Level::DEBUG
    )]
    pub async fn send<T: DeserializeOwned>(&self, descriptor: &RequestDescriptor) -> Result<T, Error> {
        let body = self.execute(descriptor).await?;
        decode(&body)
    }

    /// Sends the request and discards the body of a successful response.
    ///
    /// For endpoints that answer `204 No Content`.
    #[instrument(
        skip(self, descriptor),
        fields(method = %descriptor.method(), host = descriptor.host(), path = descriptor.path()),
        level = tracing::Level::DEBUG
    )]
    pub async fn send_without_content(&self, descriptor: &RequestDescriptor) -> Result<(), Error> {
        self.execute(descriptor).await.map(|_| ())
    }

    async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Bytes, Error> {
        let url = descriptor.url()?;
        let method: http::Method = descriptor.method().into();

        let mut request = self.client.request(method.clone(), url.clone());
        for (name, value) in descriptor.headers() {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = descriptor.body() {
            request = request.body(body.clone());
        }

        if descriptor.log_traffic() {
            let headers: Vec<_> = descriptor
                .headers()
                .iter()
                .map(|(name, value)| {
                    if REDACTED_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
                        format!("{name}: <redacted>")
                    } else {
                        format!("{name}: {value}")
                    }
                })
                .collect();
            tracing::debug!(
                %method,
                %url,
                ?headers,
                body = descriptor.body().map(|b| redacted_body(b)).as_deref(),
                "sending request"
            );
        }

        let response = request.send().await.map_err(classify_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(classify_transport_error)?;

        if descriptor.log_traffic() {
            tracing::debug!(%status, body = %redacted_body(&body), "received response");
        }

        if status.as_u16() > 299 {
            if let Some(decode_error) = descriptor.error_decoder() {
                if let Some(e) = decode_error(status, &body) {
                    tracing::debug!(%status, error = %e, "server returned a domain error");
                    return Err(e);
                }
            }
            tracing::warn!(%status, "server returned an unrecognized error response");
            return Err(Error::InvalidResponse { status });
        }

        Ok(body)
    }
}

/// Decodes a JSON body, logging the details of any failure instead of surfacing them.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(
            category = ?e.classify(),
            line = e.line(),
            column = e.column(),
            target = std::any::type_name::<T>(),
            error = %e,
            "failed to decode response body"
        );
        Error::DecodingFailed
    })
}

/// Renders a body for traffic logs, masking [`REDACTED_FIELDS`] in JSON bodies.
fn redacted_body(body: &[u8]) -> String {
    fn mask(value: &mut serde_json::Value) {
        match value {
            serde_json::Value::Object(fields) => {
                for (name, value) in fields.iter_mut() {
                    if REDACTED_FIELDS.contains(&name.as_str()) {
                        *value = serde_json::Value::from("<redacted>");
                    } else {
                        mask(value);
                    }
                }
            }
            serde_json::Value::Array(values) => values.iter_mut().for_each(mask),
            _ => {}
        }
    }

    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(mut value) => {
            mask(&mut value);
            value.to_string()
        }
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

fn classify_transport_error(e: reqwest::Error) -> Error {
    let classified = if e.is_builder() {
        Error::RequestConstruction(e.to_string())
    } else if e.is_connect() || e.is_timeout() {
        Error::NoConnectivity
    } else if e.is_request() || e.is_body() || e.is_decode() || e.is_redirect() {
        // connected, but the server never produced a usable response
        Error::ServerUnreachable
    } else {
        Error::RequestFailed
    };
    tracing::warn!(error = %e, classified = ?classified, "transport failure");
    classified
}
