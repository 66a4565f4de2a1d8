//! YouTube Live Streams API types.
//!
//! ## [`LiveStream`] - Technical Infrastructure
//! - **Technical config**: Resolution, frame rate, ingestion protocol
//! - **Ingestion details**: RTMP address and stream name (the stream key)
//! - **Relationship**: Bound to a broadcast before video is sent

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `liveStream` resource: the ingestion endpoint video is pushed to.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveStreams#resource>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStream {
    /// The ID that YouTube assigns to uniquely identify the stream.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<LiveStreamSnippet>,
    pub cdn: StreamCdn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LiveStreamStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamSnippet {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Timestamp>,
}

/// Ingestion settings of a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamCdn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingestion_type: Option<String>,
    pub ingestion_info: IngestionInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<String>,
}

/// Where to push video, and under which key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionInfo {
    /// Primary ingestion URL, e.g. `rtmp://a.rtmp.youtube.com/live2`.
    pub ingestion_address: String,
    /// The stream key to append to the ingestion address.
    pub stream_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_ingestion_address: Option<String>,
}

/// The status of a live stream.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveStreams#status>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StreamStatus {
    /// The stream is receiving data.
    Active,
    /// The stream exists but lacks valid CDN settings.
    Created,
    /// An error condition exists on the stream.
    Error,
    /// The stream is not receiving data.
    Inactive,
    /// The stream has valid CDN settings.
    Ready,
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Created => write!(f, "created"),
            Self::Error => write!(f, "error"),
            Self::Inactive => write!(f, "inactive"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStreamStatus {
    pub stream_status: StreamStatus,
}

/// Body of `liveStreams.insert`.
///
/// Every stream this crate creates uses the same configuration: a single-use RTMP endpoint
/// with variable resolution and frame rate.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveStreams/insert>
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStreamRequest {
    pub snippet: StreamSnippetRequest,
    pub cdn: StreamCdnRequest,
    pub content_details: StreamContentDetailsRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamSnippetRequest {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamCdnRequest {
    pub resolution: String,
    pub frame_rate: String,
    pub ingestion_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamContentDetailsRequest {
    pub is_reusable: bool,
}

impl Default for CreateStreamRequest {
    fn default() -> Self {
        Self {
            snippet: StreamSnippetRequest {
                title: "720p".into(),
            },
            cdn: StreamCdnRequest {
                resolution: "variable".into(),
                frame_rate: "variable".into(),
                ingestion_type: "rtmp".into(),
            },
            content_details: StreamContentDetailsRequest { is_reusable: false },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fixed_stream_configuration() {
        assert_eq!(
            serde_json::to_value(CreateStreamRequest::default()).unwrap(),
            serde_json::json!({
                "snippet": {"title": "720p"},
                "cdn": {"resolution": "variable", "frameRate": "variable", "ingestionType": "rtmp"},
                "contentDetails": {"isReusable": false}
            })
        );
    }

    #[test]
    fn ingestion_info_decodes() {
        let stream: LiveStream = serde_json::from_str(
            r#"{
                "kind": "youtube#liveStream",
                "id": "S1",
                "snippet": {"title": "720p", "publishedAt": "2025-10-21T12:00:00Z"},
                "cdn": {
                    "ingestionType": "rtmp",
                    "ingestionInfo": {
                        "streamName": "K1",
                        "ingestionAddress": "rtmp://a.rtmp.youtube.com/live2",
                        "backupIngestionAddress": "rtmp://b.rtmp.youtube.com/live2?backup=1"
                    },
                    "resolution": "variable",
                    "frameRate": "variable"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(stream.id, "S1");
        assert_eq!(stream.cdn.ingestion_info.stream_name, "K1");
        assert_eq!(
            stream.cdn.ingestion_info.ingestion_address,
            "rtmp://a.rtmp.youtube.com/live2"
        );
    }
}
