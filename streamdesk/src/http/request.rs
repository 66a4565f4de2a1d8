//! Declarative description of a single HTTP call.

use crate::error::Error;
use bytes::Bytes;
use derive_builder::Builder;
use http::StatusCode;
use indexmap::IndexMap;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Decodes a provider-specific error body from a failed response.
///
/// Returns `None` when the body does not have the provider's error shape, in which case the
/// client falls back to [`Error::InvalidResponse`].
pub type ErrorDecoder = fn(StatusCode, &[u8]) -> Option<Error>;

/// The HTTP verbs the upstream APIs use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Delete => http::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// One `name=value` pair of a URL query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryItem {
    pub name: String,
    pub value: String,
}

impl QueryItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Everything needed to issue one HTTP call, fixed before the call is made.
///
/// Descriptors are produced by the per-domain action enums and consumed by
/// [`ApiClient`](crate::http::ApiClient). Once built they cannot be modified.
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct RequestDescriptor {
    method: Method,

    #[builder(default)]
    scheme: Scheme,

    /// Host, optionally with a `:port` suffix.
    #[builder(setter(into))]
    host: String,

    /// Absolute path, always starting with `/`.
    #[builder(setter(into))]
    path: String,

    #[builder(setter(custom), default)]
    query: Vec<QueryItem>,

    #[builder(setter(custom), default)]
    headers: IndexMap<String, String>,

    #[builder(setter(into, strip_option), default)]
    body: Option<Bytes>,

    #[builder(setter(strip_option), default)]
    error_decoder: Option<ErrorDecoder>,

    /// Log request and response payloads at `debug` level.
    #[builder(default)]
    log_traffic: bool,
}

impl RequestDescriptor {
    pub fn builder() -> RequestDescriptorBuilder {
        RequestDescriptorBuilder::default()
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[QueryItem] {
        &self.query
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn error_decoder(&self) -> Option<ErrorDecoder> {
        self.error_decoder
    }

    pub fn log_traffic(&self) -> bool {
        self.log_traffic
    }

    /// Assembles `scheme://host/path?query` with the query items in their original order.
    pub fn url(&self) -> Result<Url, Error> {
        let mut url = Url::parse(&format!("{}://{}{}", self.scheme, self.host, self.path))
            .map_err(|e| {
                Error::RequestConstruction(format!(
                    "invalid URL for {}{}: {e}",
                    self.host, self.path
                ))
            })?;
        if !authority_matches(&url, &self.host) || url.path() != self.path {
            return Err(Error::RequestConstruction(format!(
                "{}{} does not form a URL on host {:?}",
                self.host, self.path, self.host
            )));
        }
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for item in &self.query {
                pairs.append_pair(&item.name, &item.value);
            }
        }
        Ok(url)
    }
}

/// Whether `url` points at exactly `host`, an optional `:port` included.
fn authority_matches(url: &Url, host: &str) -> bool {
    let (name, port) = match host.rsplit_once(':') {
        // a bracketed IPv6 literal without a port
        Some((_, tail)) if tail.ends_with(']') => (host, None),
        Some((name, port)) => match port.parse::<u16>() {
            Ok(port) => (name, Some(port)),
            Err(_) => return false,
        },
        None => (host, None),
    };
    let same_port = match port {
        Some(port) => url.port_or_known_default() == Some(port),
        None => url.port().is_none(),
    };
    same_port
        && url.username().is_empty()
        && url.host_str().is_some_and(|h| h.eq_ignore_ascii_case(name))
}

impl RequestDescriptorBuilder {
    /// Appends a query item; repeated names are kept as separate items.
    pub fn query_item(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.query
            .get_or_insert_with(Vec::new)
            .push(QueryItem::new(name, value));
        self
    }

    /// Appends several query items in order.
    pub fn query_items(&mut self, items: impl IntoIterator<Item = QueryItem>) -> &mut Self {
        self.query.get_or_insert_with(Vec::new).extend(items);
        self
    }

    /// Sets a header, replacing any earlier value under the same name.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), value.into());
        self
    }

    fn validate(&self) -> Result<(), String> {
        if let Some(host) = &self.host {
            if host.is_empty() {
                return Err("host must not be empty".into());
            }
            if let Some(c) = host
                .chars()
                .find(|&c| matches!(c, '/' | '?' | '#' | '@' | '\\') || c.is_whitespace())
            {
                return Err(format!("host {host:?} must not contain {c:?}"));
            }
        }
        if let Some(path) = &self.path {
            if !path.starts_with('/') {
                return Err(format!("path {path:?} must start with '/'"));
            }
        }
        Ok(())
    }
}

/// Flattens a typed payload into query items.
///
/// Each field becomes one item in declaration order. `null` fields are skipped, arrays expand
/// into one item per element under the same name, booleans render as `true`/`false` and
/// numbers in decimal.
pub fn query_items<T: Serialize + ?Sized>(payload: &T) -> Result<Vec<QueryItem>, Error> {
    let value = serde_json::to_value(payload)
        .map_err(|e| Error::RequestConstruction(format!("serialize query payload: {e}")))?;
    let Value::Object(fields) = value else {
        return Err(Error::RequestConstruction(
            "query payload must serialize to an object".into(),
        ));
    };

    let mut items = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        match value {
            Value::Array(values) => {
                for value in values {
                    if let Some(value) = render_query_value(value) {
                        items.push(QueryItem::new(name.clone(), value));
                    }
                }
            }
            value => {
                if let Some(value) = render_query_value(value) {
                    items.push(QueryItem::new(name, value));
                }
            }
        }
    }
    Ok(items)
}

fn render_query_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s),
        // nested objects/arrays have no query form; send them as compact JSON
        other => Some(other.to_string()),
    }
}

/// Serializes a write payload as a JSON request body.
///
/// Timestamps are [`jiff::Timestamp`]s and therefore encode as ISO 8601.
pub fn json_body<T: Serialize + ?Sized>(payload: &T) -> Result<Bytes, Error> {
    serde_json::to_vec(payload)
        .map(Bytes::from)
        .map_err(|e| Error::RequestConstruction(format!("serialize request body: {e}")))
}
