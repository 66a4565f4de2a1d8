//! News API client.
//!
//! Article search and top headlines from <https://newsapi.org>, authenticated with an API key
//! sent in the `X-Api-Key` header.

pub mod action;
pub mod types;

pub use action::{NEWS_API_HOST, NewsAction};
pub use types::{
    Article, FetchNewsRequest, NewsErrorResponse, NewsResponse, Source, TopHeadlinesRequest,
};

use crate::error::Error;
use crate::http::{ApiBase, ApiClient};
use tracing::instrument;

/// Typed access to the News API.
#[derive(Debug, Clone)]
pub struct NewsService {
    client: ApiClient,
    base: ApiBase,
    api_key: String,
    log_traffic: bool,
}

impl NewsService {
    pub fn new(client: ApiClient, api_key: impl Into<String>) -> Self {
        Self::with_base(client, ApiBase::https(NEWS_API_HOST), api_key)
    }

    /// Points the service at a different host, e.g. a local test server.
    pub fn with_base(client: ApiClient, base: ApiBase, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base,
            api_key: api_key.into(),
            log_traffic: false,
        }
    }

    pub fn log_traffic(mut self, enabled: bool) -> Self {
        self.log_traffic = enabled;
        self
    }

    /// Searches all indexed articles.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn fetch_news(&self, request: &FetchNewsRequest) -> Result<Vec<Article>, Error> {
        self.articles(NewsAction::FetchNews(request.clone())).await
    }

    /// Fetches current top headlines.
    #[instrument(skip(self), level = tracing::Level::DEBUG)]
    pub async fn top_headlines(
        &self,
        request: &TopHeadlinesRequest,
    ) -> Result<Vec<Article>, Error> {
        self.articles(NewsAction::TopHeadlines(request.clone())).await
    }

    async fn articles(&self, action: NewsAction) -> Result<Vec<Article>, Error> {
        let descriptor = action.descriptor(&self.base, &self.api_key, self.log_traffic)?;
        let response: NewsResponse = self.client.send(&descriptor).await?;
        tracing::debug!(
            total_results = response.total_results,
            returned = response.articles.len(),
            "fetched articles"
        );
        Ok(response.articles)
    }
}
