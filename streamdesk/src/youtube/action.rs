//! Operations supported against the YouTube Data API v3.

use crate::error::Error;
use crate::http::{ApiBase, Method, RequestDescriptor, json_body};
use crate::youtube::broadcasts::{BroadcastDraft, BroadcastTransition, CreateBroadcastRequest};
use crate::youtube::streams::CreateStreamRequest;
use crate::youtube::types::YouTubeErrorResponse;
use http::StatusCode;

pub const YOUTUBE_API_HOST: &str = "www.googleapis.com";

/// Page size used for every `list` call; the API maximum.
const MAX_RESULTS: &str = "50";

/// One variant per YouTube operation, each carrying only what its request needs.
#[derive(Debug, Clone, PartialEq)]
pub enum YouTubeAction {
    /// `liveBroadcasts.insert`
    CreateBroadcast(BroadcastDraft),
    /// `liveStreams.insert`, always with the fixed [`CreateStreamRequest`] configuration.
    CreateStream,
    /// `liveBroadcasts.bind`
    BindBroadcast {
        broadcast_id: String,
        stream_id: String,
    },
    /// `liveBroadcasts.list` with `mine=true`
    ListMyBroadcasts { page_token: Option<String> },
    /// `channels.list` with `mine=true`
    ListMyChannels { page_token: Option<String> },
    /// `liveBroadcasts.transition`
    TransitionBroadcast {
        broadcast_id: String,
        status: BroadcastTransition,
    },
    /// `liveBroadcasts.delete`
    DeleteBroadcast { broadcast_id: String },
}

impl YouTubeAction {
    pub fn method(&self) -> Method {
        match self {
            Self::CreateBroadcast(_)
            | Self::CreateStream
            | Self::BindBroadcast { .. }
            | Self::TransitionBroadcast { .. } => Method::Post,
            Self::ListMyBroadcasts { .. } | Self::ListMyChannels { .. } => Method::Get,
            Self::DeleteBroadcast { .. } => Method::Delete,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::CreateBroadcast(_)
            | Self::ListMyBroadcasts { .. }
            | Self::DeleteBroadcast { .. } => "/youtube/v3/liveBroadcasts",
            Self::CreateStream => "/youtube/v3/liveStreams",
            Self::BindBroadcast { .. } => "/youtube/v3/liveBroadcasts/bind",
            Self::ListMyChannels { .. } => "/youtube/v3/channels",
            Self::TransitionBroadcast { .. } => "/youtube/v3/liveBroadcasts/transition",
        }
    }

    /// Builds the request for this operation, authorized with `access_token`.
    pub fn descriptor(
        &self,
        base: &ApiBase,
        access_token: &str,
        log_traffic: bool,
    ) -> Result<RequestDescriptor, Error> {
        let mut builder = base.request(self.method(), self.path());
        builder
            .header("Authorization", format!("Bearer {access_token}"))
            .error_decoder(decode_youtube_error)
            .log_traffic(log_traffic);

        match self {
            Self::CreateBroadcast(draft) => {
                builder
                    .query_item("part", "snippet,contentDetails,status")
                    .header("Content-Type", "application/json")
                    .body(json_body(&CreateBroadcastRequest::from(draft))?);
            }
            Self::CreateStream => {
                builder
                    .query_item("part", "snippet,cdn,contentDetails")
                    .header("Content-Type", "application/json")
                    .body(json_body(&CreateStreamRequest::default())?);
            }
            Self::BindBroadcast {
                broadcast_id,
                stream_id,
            } => {
                builder
                    .query_item("id", broadcast_id)
                    .query_item("part", "id,snippet,contentDetails,status")
                    .query_item("streamId", stream_id);
            }
            Self::ListMyBroadcasts { page_token } => {
                builder
                    .query_item("part", "id,snippet,status")
                    .query_item("mine", "true")
                    .query_item("maxResults", MAX_RESULTS);
                if let Some(token) = page_token {
                    builder.query_item("pageToken", token);
                }
            }
            Self::ListMyChannels { page_token } => {
                builder
                    .query_item("part", "id,snippet")
                    .query_item("mine", "true")
                    .query_item("maxResults", MAX_RESULTS);
                if let Some(token) = page_token {
                    builder.query_item("pageToken", token);
                }
            }
            Self::TransitionBroadcast {
                broadcast_id,
                status,
            } => {
                builder
                    .query_item("broadcastStatus", status.to_string())
                    .query_item("id", broadcast_id)
                    .query_item("part", "id,snippet,status");
            }
            Self::DeleteBroadcast { broadcast_id } => {
                builder.query_item("id", broadcast_id);
            }
        }

        Ok(builder.build()?)
    }
}

pub(crate) fn decode_youtube_error(_status: StatusCode, body: &[u8]) -> Option<Error> {
    serde_json::from_slice::<YouTubeErrorResponse>(body)
        .ok()
        .map(Error::YouTube)
}
