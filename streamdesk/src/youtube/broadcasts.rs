//! YouTube Live Broadcasts API types.
//!
//! ## [`LiveBroadcast`] - Viewer-Facing Events
//! - **What viewers see**: Title, description, scheduled time
//! - **Public metadata**: Privacy settings, recording options
//! - **Event lifecycle**: Created → Ready → Testing → Live → Complete
//! - **Relationship**: Each broadcast = exactly one YouTube video, bound to one stream

use crate::youtube::types::PageInfo;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Response structure for the `liveBroadcasts.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/list>
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBroadcastListResponse {
    #[serde(default)]
    pub items: VecDeque<LiveBroadcast>,
    #[serde(default)]
    pub page_info: PageInfo,
    /// Token for the next page of results, absent on the last page.
    pub next_page_token: Option<String>,
}

/// A `liveBroadcast` resource represents a viewer-facing live streaming event on YouTube.
///
/// Broadcasts must be bound to a [`LiveStream`](crate::youtube::LiveStream) before video can be
/// ingested for them.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts#resource>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBroadcast {
    /// The ID that YouTube assigns to uniquely identify the broadcast.
    pub id: String,
    pub snippet: LiveBroadcastSnippet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LiveBroadcastStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_details: Option<LiveBroadcastContentDetails>,
}

/// Basic details about the broadcast.
///
/// Only the subset of fields this crate uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBroadcastSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// The ID of the channel that is publishing the broadcast.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_start_time: Option<Timestamp>,
    /// Unset means the broadcast is scheduled to continue indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_end_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end_time: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBroadcastStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_cycle_status: Option<BroadcastLifeCycleStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_status: Option<PrivacyStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub made_for_kids: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveBroadcastContentDetails {
    /// The stream this broadcast is bound to, once bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bound_stream_id: Option<String>,
}

/// The broadcast's current lifecycle status.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts#status.lifeCycleStatus>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BroadcastLifeCycleStatus {
    Complete,
    Created,
    Live,
    LiveStarting,
    Ready,
    Revoked,
    TestStarting,
    Testing,
}

impl fmt::Display for BroadcastLifeCycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Created => write!(f, "created"),
            Self::Live => write!(f, "live"),
            Self::LiveStarting => write!(f, "liveStarting"),
            Self::Ready => write!(f, "ready"),
            Self::Revoked => write!(f, "revoked"),
            Self::TestStarting => write!(f, "testStarting"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Who can watch a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrivacyStatus {
    #[default]
    Public,
    Unlisted,
    Private,
}

impl PrivacyStatus {
    pub const ALL: [PrivacyStatus; 3] = [Self::Public, Self::Unlisted, Self::Private];

    /// Human-readable label for pickers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Unlisted => "Unlisted",
            Self::Private => "Private",
        }
    }
}

impl fmt::Display for PrivacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Unlisted => write!(f, "unlisted"),
            Self::Private => write!(f, "private"),
        }
    }
}

impl std::str::FromStr for PrivacyStatus {
    type Err = String;

    /// Accepts the wire name or the label, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let options: Vec<_> = Self::ALL.iter().map(|status| status.label()).collect();
                format!("unknown privacy status {s:?}, expected one of {}", options.join(", "))
            })
    }
}

/// Target status for `liveBroadcasts.transition`.
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/transition>
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BroadcastTransition {
    Testing,
    Live,
    Complete,
}

impl fmt::Display for BroadcastTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Testing => write!(f, "testing"),
            Self::Live => write!(f, "live"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// The user-edited description of a broadcast that is about to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastDraft {
    pub title: String,
    pub description: String,
    pub scheduled_start_time: Timestamp,
    pub privacy_status: PrivacyStatus,
    pub is_for_kids: bool,
}

impl Default for BroadcastDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            scheduled_start_time: Timestamp::now(),
            privacy_status: PrivacyStatus::Public,
            is_for_kids: false,
        }
    }
}

impl BroadcastDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// A draft can be submitted once it has a non-blank title.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Body of `liveBroadcasts.insert`.
///
/// Recording and playback settings are fixed; only the snippet and privacy come from the
/// [`BroadcastDraft`].
///
/// See: <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/insert>
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBroadcastRequest {
    pub snippet: BroadcastSnippetRequest,
    pub content_details: BroadcastContentDetailsRequest,
    pub status: BroadcastStatusRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastSnippetRequest {
    pub title: String,
    pub description: String,
    pub scheduled_start_time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastContentDetailsRequest {
    pub monitor_stream: MonitorStreamRequest,
    pub enable_dvr: bool,
    pub enable_embed: bool,
    pub enable_content_encryption: bool,
    pub enable_low_latency: bool,
    pub record_from_start: bool,
    pub start_with_slate: bool,
    pub enable_auto_start: bool,
    pub enable_auto_stop: bool,
}

impl Default for BroadcastContentDetailsRequest {
    fn default() -> Self {
        Self {
            monitor_stream: MonitorStreamRequest::default(),
            enable_dvr: true,
            enable_embed: false,
            enable_content_encryption: false,
            enable_low_latency: false,
            record_from_start: true,
            start_with_slate: false,
            enable_auto_start: true,
            enable_auto_stop: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStreamRequest {
    pub enable_monitor_stream: bool,
    pub broadcast_stream_delay_ms: u32,
}

impl Default for MonitorStreamRequest {
    fn default() -> Self {
        Self {
            enable_monitor_stream: false,
            broadcast_stream_delay_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastStatusRequest {
    pub privacy_status: PrivacyStatus,
    pub self_declared_made_for_kids: bool,
}

impl From<&BroadcastDraft> for CreateBroadcastRequest {
    fn from(draft: &BroadcastDraft) -> Self {
        Self {
            snippet: BroadcastSnippetRequest {
                title: draft.title.clone(),
                description: draft.description.clone(),
                scheduled_start_time: draft.scheduled_start_time,
            },
            content_details: BroadcastContentDetailsRequest::default(),
            status: BroadcastStatusRequest {
                privacy_status: draft.privacy_status,
                self_declared_made_for_kids: draft.is_for_kids,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn privacy_status_from_str() {
        assert_eq!("unlisted".parse(), Ok(PrivacyStatus::Unlisted));
        assert_eq!("Private".parse(), Ok(PrivacyStatus::Private));
        assert_eq!(" PUBLIC ".parse(), Ok(PrivacyStatus::Public));
        for status in PrivacyStatus::ALL {
            assert_eq!(status.to_string().parse(), Ok(status));
        }

        let e = "friends".parse::<PrivacyStatus>().unwrap_err();
        assert!(e.contains("Public, Unlisted, Private"), "{e}");
    }

    #[test]
    fn create_request_from_draft() {
        let draft = BroadcastDraft {
            title: "Friday night".into(),
            description: "Live from the stadium".into(),
            scheduled_start_time: "2025-10-24T23:00:00Z".parse().unwrap(),
            privacy_status: PrivacyStatus::Unlisted,
            is_for_kids: true,
        };
        assert_eq!(
            serde_json::to_value(CreateBroadcastRequest::from(&draft)).unwrap(),
            serde_json::json!({
                "snippet": {
                    "title": "Friday night",
                    "description": "Live from the stadium",
                    "scheduledStartTime": "2025-10-24T23:00:00Z"
                },
                "contentDetails": {
                    "monitorStream": {
                        "enableMonitorStream": false,
                        "broadcastStreamDelayMs": 60000
                    },
                    "enableDvr": true,
                    "enableEmbed": false,
                    "enableContentEncryption": false,
                    "enableLowLatency": false,
                    "recordFromStart": true,
                    "startWithSlate": false,
                    "enableAutoStart": true,
                    "enableAutoStop": false
                },
                "status": {
                    "privacyStatus": "unlisted",
                    "selfDeclaredMadeForKids": true
                }
            })
        );
    }

    #[test]
    fn blank_title_is_invalid() {
        assert!(!BroadcastDraft::new("   ").is_valid());
        assert!(BroadcastDraft::new("Game day").is_valid());
    }

    #[test]
    fn minimal_broadcast_decodes() {
        let broadcast: LiveBroadcast = serde_json::from_str(
            r#"{
                "kind": "youtube#liveBroadcast",
                "etag": "abc",
                "id": "B1",
                "snippet": {"title": "Game day", "description": "", "scheduledStartTime": "2025-10-24T23:00:00Z"},
                "status": {"lifeCycleStatus": "created", "privacyStatus": "public"}
            }"#,
        )
        .unwrap();
        assert_eq!(broadcast.id, "B1");
        let status = broadcast.status.unwrap();
        assert_eq!(status.life_cycle_status, Some(BroadcastLifeCycleStatus::Created));
        assert_eq!(status.privacy_status, Some(PrivacyStatus::Public));
        assert!(broadcast.content_details.is_none());
    }
}
