//! Typed, authenticated access to the YouTube Data API v3.

use crate::error::Error;
use crate::http::{ApiBase, ApiClient};
use crate::token_store::TokenStore;
use crate::youtube::action::{YOUTUBE_API_HOST, YouTubeAction};
use crate::youtube::broadcasts::{
    BroadcastDraft, BroadcastTransition, LiveBroadcast, LiveBroadcastListResponse,
};
use crate::youtube::channels::{Channel, ChannelListResponse};
use crate::youtube::streams::LiveStream;
use crate::youtube::types::PagedStream;
use std::fmt;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::instrument;

/// Client for the YouTube Data API v3.
///
/// The access token is read from the [`TokenStore`] on every call, so a sign-in or disconnect
/// takes effect on the next request. Calls fail with [`Error::NoAccessToken`] when no token is
/// stored; the token is never refreshed implicitly.
#[derive(Clone)]
pub struct YouTubeService {
    client: ApiClient,
    base: ApiBase,
    tokens: Arc<dyn TokenStore>,
    log_traffic: bool,
}

impl fmt::Debug for YouTubeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YouTubeService")
            .field("base", &self.base)
            .field("log_traffic", &self.log_traffic)
            .finish_non_exhaustive()
    }
}

impl YouTubeService {
    pub fn new(client: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        Self::with_base(client, ApiBase::https(YOUTUBE_API_HOST), tokens)
    }

    /// Points the service at a different host, e.g. a local test server.
    pub fn with_base(client: ApiClient, base: ApiBase, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            base,
            tokens,
            log_traffic: false,
        }
    }

    pub fn log_traffic(mut self, enabled: bool) -> Self {
        self.log_traffic = enabled;
        self
    }

    /// The stored access token, or [`Error::NoAccessToken`].
    pub(crate) async fn access_token(&self) -> Result<String, Error> {
        self.tokens.access_token().await
    }

    async fn call<T: serde::de::DeserializeOwned>(&self, action: YouTubeAction) -> Result<T, Error> {
        let token = self.access_token().await?;
        let descriptor = action.descriptor(&self.base, &token, self.log_traffic)?;
        self.client.send(&descriptor).await
    }

    /// Creates a broadcast from the user's draft.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/insert>
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_broadcast(&self, draft: &BroadcastDraft) -> Result<LiveBroadcast, Error> {
        let broadcast: LiveBroadcast = self
            .call(YouTubeAction::CreateBroadcast(draft.clone()))
            .await?;
        tracing::debug!(broadcast_id = %broadcast.id, "created broadcast");
        Ok(broadcast)
    }

    /// Creates a single-use RTMP ingestion stream.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/live/docs/liveStreams/insert>
    #[instrument(skip(self))]
    pub async fn create_stream(&self) -> Result<LiveStream, Error> {
        let stream: LiveStream = self.call(YouTubeAction::CreateStream).await?;
        tracing::debug!(stream_id = %stream.id, "created stream");
        Ok(stream)
    }

    /// Binds a broadcast to a stream. Both must already exist.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/bind>
    #[instrument(skip(self))]
    pub async fn bind_broadcast(
        &self,
        broadcast_id: &str,
        stream_id: &str,
    ) -> Result<LiveBroadcast, Error> {
        let broadcast: LiveBroadcast = self
            .call(YouTubeAction::BindBroadcast {
                broadcast_id: broadcast_id.to_string(),
                stream_id: stream_id.to_string(),
            })
            .await?;
        tracing::debug!(broadcast_id, stream_id, "bound broadcast to stream");
        Ok(broadcast)
    }

    /// Changes the status of a broadcast, e.g. to end it.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/transition>
    #[instrument(skip(self))]
    pub async fn transition_broadcast(
        &self,
        broadcast_id: &str,
        status: BroadcastTransition,
    ) -> Result<LiveBroadcast, Error> {
        let broadcast: LiveBroadcast = self
            .call(YouTubeAction::TransitionBroadcast {
                broadcast_id: broadcast_id.to_string(),
                status,
            })
            .await?;
        tracing::debug!(broadcast_id, %status, "transitioned broadcast");
        Ok(broadcast)
    }

    /// Deletes a broadcast.
    ///
    /// Nothing calls this automatically; it is how callers clean up a broadcast left behind by
    /// a failed [`LivestreamWorkflow`](crate::workflow::LivestreamWorkflow) run.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/delete>
    #[instrument(skip(self))]
    pub async fn delete_broadcast(&self, broadcast_id: &str) -> Result<(), Error> {
        let token = self.access_token().await?;
        let descriptor = YouTubeAction::DeleteBroadcast {
            broadcast_id: broadcast_id.to_string(),
        }
        .descriptor(&self.base, &token, self.log_traffic)?;
        self.client.send_without_content(&descriptor).await?;
        tracing::debug!(broadcast_id, "deleted broadcast");
        Ok(())
    }

    /// Returns a paginated stream of every broadcast owned by the signed-in user.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/list>
    pub fn list_my_broadcasts(
        &self,
    ) -> impl Stream<Item = Result<LiveBroadcast, Error>> + use<'_> {
        PagedStream::new(move |page_token| async move {
            let response: LiveBroadcastListResponse = self
                .call(YouTubeAction::ListMyBroadcasts { page_token })
                .await?;
            tracing::debug!(
                total_results = response.page_info.total_results,
                returned_items = response.items.len(),
                "fetched live broadcasts"
            );
            Ok((response.items, response.next_page_token))
        })
    }

    /// Returns a paginated stream of the channels owned by the signed-in user.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/channels/list>
    pub fn list_my_channels(&self) -> impl Stream<Item = Result<Channel, Error>> + use<'_> {
        PagedStream::new(move |page_token| async move {
            let response: ChannelListResponse = self
                .call(YouTubeAction::ListMyChannels { page_token })
                .await?;
            tracing::debug!(
                total_results = response.page_info.total_results,
                returned_items = response.items.len(),
                "fetched channels"
            );
            Ok((response.items, response.next_page_token))
        })
    }
}
