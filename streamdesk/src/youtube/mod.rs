//! YouTube Data API v3 client for live streaming.
//!
//! # Core Concepts: Broadcasts vs Streams
//!
//! ## [`LiveBroadcast`] - Viewer-Facing Events
//! - **What viewers see**: Title, description, scheduled time, privacy
//! - **Event lifecycle**: Created → Ready → Testing → Live → Complete
//! - **Relationship**: Each broadcast = exactly one YouTube video
//!
//! ## [`LiveStream`] - Ingestion Endpoint
//! - **Ingestion details**: RTMP address and stream key
//! - **Relationship**: Must be bound to a broadcast before video reaches viewers
//!
//! ## Going Live
//! 1. Create a [`LiveBroadcast`] from a [`BroadcastDraft`]
//! 2. Create a [`LiveStream`] (always single-use RTMP, variable resolution)
//! 3. Bind the broadcast to the stream
//! 4. Push video to `ingestion_address/stream_name`
//!
//! [`LivestreamWorkflow`](crate::workflow::LivestreamWorkflow) runs steps 1-3 and records the
//! result in the [`StreamSession`](crate::session::StreamSession).

pub mod action;
pub mod broadcasts;
pub mod channels;
pub mod service;
pub mod streams;
pub mod types;

pub use action::{YOUTUBE_API_HOST, YouTubeAction};
pub use broadcasts::{
    BroadcastDraft, BroadcastLifeCycleStatus, BroadcastTransition, CreateBroadcastRequest,
    LiveBroadcast, LiveBroadcastSnippet, LiveBroadcastStatus, PrivacyStatus,
};
pub use channels::{Channel, ChannelSnippet};
pub use service::YouTubeService;
pub use streams::{CreateStreamRequest, IngestionInfo, LiveStream, StreamCdn, StreamStatus};
pub use types::{PageInfo, PagedStream, YouTubeErrorDetail, YouTubeErrorResponse};
