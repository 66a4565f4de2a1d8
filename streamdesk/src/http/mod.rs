//! Request descriptors and the generic JSON client that executes them.

pub mod client;
pub mod request;

pub use client::ApiClient;
pub use request::{
    ErrorDecoder, Method, QueryItem, RequestDescriptor, RequestDescriptorBuilder, Scheme,
    json_body, query_items,
};

/// Scheme and host an API is served from.
///
/// Production code uses the provider's public host; tests point this at a local server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiBase {
    pub scheme: Scheme,
    pub host: String,
}

impl ApiBase {
    pub fn new(scheme: Scheme, host: impl Into<String>) -> Self {
        Self {
            scheme,
            host: host.into(),
        }
    }

    pub fn https(host: impl Into<String>) -> Self {
        Self::new(Scheme::Https, host)
    }

    /// Starts a descriptor for `method` on `path` under this base.
    pub fn request(&self, method: Method, path: impl Into<String>) -> RequestDescriptorBuilder {
        let mut builder = RequestDescriptor::builder();
        builder
            .method(method)
            .scheme(self.scheme)
            .host(self.host.clone())
            .path(path);
        builder
    }
}
