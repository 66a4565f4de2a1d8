//! Operations supported against the News API.

use crate::error::Error;
use crate::http::{ApiBase, Method, RequestDescriptor, query_items};
use crate::news::types::{FetchNewsRequest, NewsErrorResponse, TopHeadlinesRequest};
use http::StatusCode;

pub const NEWS_API_HOST: &str = "newsapi.org";
const API_KEY_HEADER: &str = "X-Api-Key";

/// One variant per News API operation, each carrying only what its request needs.
#[derive(Debug, Clone, PartialEq)]
pub enum NewsAction {
    /// Search every article the API indexes.
    FetchNews(FetchNewsRequest),
    /// Breaking headlines for a country, category or source.
    TopHeadlines(TopHeadlinesRequest),
}

impl NewsAction {
    pub fn method(&self) -> Method {
        match self {
            Self::FetchNews(_) | Self::TopHeadlines(_) => Method::Get,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::FetchNews(_) => "/v2/everything",
            Self::TopHeadlines(_) => "/v2/top-headlines",
        }
    }

    /// Builds the request for this operation, authenticated with `api_key`.
    pub fn descriptor(
        &self,
        base: &ApiBase,
        api_key: &str,
        log_traffic: bool,
    ) -> Result<RequestDescriptor, Error> {
        let query = match self {
            Self::FetchNews(request) => query_items(request)?,
            Self::TopHeadlines(request) => query_items(request)?,
        };
        Ok(base
            .request(self.method(), self.path())
            .query_items(query)
            .header(API_KEY_HEADER, api_key)
            .error_decoder(decode_news_error)
            .log_traffic(log_traffic)
            .build()?)
    }
}

fn decode_news_error(_status: StatusCode, body: &[u8]) -> Option<Error> {
    serde_json::from_slice::<NewsErrorResponse>(body)
        .ok()
        .map(Error::News)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fetch_news_descriptor() {
        let action = NewsAction::FetchNews(FetchNewsRequest {
            sources: Some("en".into()),
            q: Some("NFL".into()),
            page_size: Some(10),
            domains: Some(vec!["espn.com".into(), "nfl.com".into()]),
            ..Default::default()
        });
        let descriptor = action
            .descriptor(&ApiBase::https(NEWS_API_HOST), "key-123", false)
            .unwrap();

        assert_eq!(descriptor.method(), Method::Get);
        assert_eq!(descriptor.headers()[API_KEY_HEADER], "key-123");
        assert_eq!(
            descriptor.url().unwrap().as_str(),
            "https://newsapi.org/v2/everything?sources=en&q=NFL&pageSize=10&domains=espn.com&domains=nfl.com"
        );
        assert!(descriptor.body().is_none());
    }

    #[test]
    fn top_headlines_descriptor() {
        let action = NewsAction::TopHeadlines(TopHeadlinesRequest {
            country: Some("us".into()),
            category: Some("sports".into()),
            ..Default::default()
        });
        let descriptor = action
            .descriptor(&ApiBase::https(NEWS_API_HOST), "k", false)
            .unwrap();
        assert_eq!(
            descriptor.url().unwrap().as_str(),
            "https://newsapi.org/v2/top-headlines?country=us&category=sports"
        );
    }

    #[test]
    fn decodes_error_body() {
        let e = decode_news_error(
            StatusCode::UNAUTHORIZED,
            br#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#,
        );
        assert!(matches!(e, Some(Error::News(ref r)) if r.code == "apiKeyInvalid"));
        assert!(decode_news_error(StatusCode::UNAUTHORIZED, b"nope").is_none());
    }
}
