//! State of the livestream bound during this run.

use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub stream_key: Option<String>,
    pub broadcast_id: Option<String>,
    pub stream_id: Option<String>,
    pub channel_id: Option<String>,
    pub ingestion_address: Option<String>,
}

/// Shared handle to the [`SessionState`].
///
/// Clones share the same state. The handle is constructed once and passed to whatever needs
/// it; nothing is global.
#[derive(Debug, Clone, Default)]
pub struct StreamSession {
    state: Arc<RwLock<SessionState>>,
}

impl StreamSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Records the result of binding a broadcast to a stream.
    ///
    /// The channel id is left untouched.
    pub async fn record_binding(
        &self,
        ingestion_address: impl Into<String>,
        stream_key: impl Into<String>,
        broadcast_id: impl Into<String>,
        stream_id: impl Into<String>,
    ) {
        let mut state = self.state.write().await;
        state.ingestion_address = Some(ingestion_address.into());
        state.stream_key = Some(stream_key.into());
        state.broadcast_id = Some(broadcast_id.into());
        state.stream_id = Some(stream_id.into());
    }

    pub async fn set_channel_id(&self, channel_id: impl Into<String>) {
        self.state.write().await.channel_id = Some(channel_id.into());
    }

    pub async fn reset(&self) {
        *self.state.write().await = SessionState::default();
    }

    /// The RTMP URL to publish video to.
    ///
    /// Joins the bound ingestion address with the stream key. Before anything is bound, the
    /// fallback address and stream name are joined instead.
    pub async fn publish_url(&self, fallback_address: &str, fallback_stream_name: &str) -> String {
        let state = self.state.read().await;
        match (&state.ingestion_address, &state.stream_key) {
            (Some(address), Some(key)) => join_publish_url(address, key),
            _ => join_publish_url(fallback_address, fallback_stream_name),
        }
    }
}

fn join_publish_url(address: &str, stream_name: &str) -> String {
    format!("{}/{}", address.trim_end_matches('/'), stream_name)
}
