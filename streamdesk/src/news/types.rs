//! News API request and response types.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Query for the `/v2/everything` endpoint.
///
/// Every populated field becomes one query parameter, in declaration order. List fields expand
/// into one parameter per entry.
///
/// See: <https://newsapi.org/docs/endpoints/everything>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchNewsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
    /// Keywords or phrases to search for in the article title and body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// One of `relevancy`, `popularity` or `publishedAt`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Oldest article date, ISO 8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Newest article date, ISO 8601.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_domains: Option<Vec<String>>,
}

/// Query for the `/v2/top-headlines` endpoint.
///
/// See: <https://newsapi.org/docs/endpoints/top-headlines>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopHeadlinesRequest {
    /// Two-letter ISO 3166-1 country code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub status: String,
    pub total_results: u64,
    pub articles: Vec<Article>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: Source,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: Timestamp,
    pub content: Option<String>,
}

/// The publication an article came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    pub id: Option<String>,
    pub name: String,
}

/// Error body the News API returns alongside a failure status.
///
/// ```json
/// {"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
}
