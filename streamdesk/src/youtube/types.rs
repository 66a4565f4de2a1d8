//! Shared types and streaming infrastructure for the YouTube API client.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

type OneFuturePage<'a, F, T> =
    Pin<Box<dyn Future<Output = Result<(F, (VecDeque<T>, Option<String>)), Error>> + 'a + Send>>;

/// A paginated stream that automatically fetches subsequent pages from a YouTube API list endpoint.
///
/// This stream yields items one by one, fetching the next page when the current page is
/// exhausted. Pages are requested lazily and strictly one at a time. The first error ends the
/// stream.
pub struct PagedStream<'a, T, F> {
    /// Current batch of items from the most recent API response
    current_items: VecDeque<T>,
    /// Future representing the currently pending API request, if any
    pending_request: Option<OneFuturePage<'a, F, T>>,
    /// Whether we've reached the end of all available data
    is_done: bool,
}

impl<'a, T, F> PagedStream<'a, T, F> {
    /// Creates a stream whose first page is fetched with `fetcher(None)`.
    pub fn new<Fut>(fetcher: F) -> Self
    where
        F: Fn(Option<String>) -> Fut,
        F: Send + 'a,
        Fut: Future<Output = Result<(VecDeque<T>, Option<String>), Error>> + Send + 'a,
    {
        let first_page = async move {
            let results = fetcher(None).await?;
            Ok((fetcher, results))
        };
        Self {
            pending_request: Some(Box::pin(first_page)),
            current_items: VecDeque::new(),
            is_done: false,
        }
    }
}

impl<T: Unpin, F> Unpin for PagedStream<'_, T, F> {}

impl<'a, T: Unpin, F, Fut> Stream for PagedStream<'a, T, F>
where
    F: Fn(Option<String>) -> Fut,
    F: Send + 'a,
    Fut: Future<Output = Result<(VecDeque<T>, Option<String>), Error>> + Send + 'a,
{
    type Item = Result<T, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(item) = self.current_items.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            if self.is_done {
                return Poll::Ready(None);
            }

            let Some(pending) = self.pending_request.as_mut() else {
                self.is_done = true;
                return Poll::Ready(None);
            };

            match pending.as_mut().poll(cx) {
                Poll::Ready(Ok((fetcher, (items, next_token)))) => {
                    self.current_items.extend(items);
                    match next_token {
                        // queue the next page, but only poll it once this one is drained
                        Some(next_token) => {
                            self.pending_request = Some(Box::pin(async move {
                                let results = fetcher(Some(next_token)).await?;
                                Ok((fetcher, results))
                            }));
                        }
                        None => {
                            self.is_done = true;
                            self.pending_request = None;
                        }
                    }
                }
                Poll::Ready(Err(e)) => {
                    self.pending_request = None;
                    self.is_done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Paging details for lists of resources.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// The total number of results in the result set.
    #[serde(default)]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(default)]
    pub results_per_page: u32,
}

/// Error body the YouTube Data API returns alongside a failure status.
///
/// Only the fields shown to users are kept; the `errors` array and `status` are ignored.
///
/// See: <https://developers.google.com/youtube/v3/docs/errors>
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YouTubeErrorResponse {
    pub error: YouTubeErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YouTubeErrorDetail {
    pub code: u16,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use tokio_stream::StreamExt;

    #[tokio::test]
    async fn follows_page_tokens_in_order() {
        let requested = Mutex::new(Vec::new());
        let stream = PagedStream::new(|page_token: Option<String>| {
            requested.lock().unwrap().push(page_token.clone());
            async move {
                Ok(match page_token.as_deref() {
                    None => (VecDeque::from([1, 2]), Some("p2".to_string())),
                    Some("p2") => (VecDeque::from([3]), Some("p3".to_string())),
                    Some(_) => (VecDeque::from([4]), None),
                })
            }
        });
        let items: Vec<u32> = stream.map(Result::unwrap).collect().await;

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(
            *requested.lock().unwrap(),
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
    }

    #[tokio::test]
    async fn error_ends_stream() {
        let stream = PagedStream::new(|page_token: Option<String>| async move {
            match page_token {
                None => Ok((VecDeque::from(["a"]), Some("next".to_string()))),
                Some(_) => Err(Error::DecodingFailed),
            }
        });
        let results: Vec<_> = stream.collect().await;

        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Ok("a")));
        assert!(matches!(results[1], Err(Error::DecodingFailed)));
    }
}
