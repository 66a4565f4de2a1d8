//! The "go live" workflow: create a broadcast, create a stream, bind them.
//!
//! Progress is published on a [`tokio::sync::watch`] channel so a UI can follow along. Each
//! step is attempted exactly once, and the first failure ends the run. Nothing is rolled back:
//! if stream creation or binding fails, the broadcast created earlier is left on the account
//! and its id is available in the [`WorkflowState::Failed`] state for
//! [`YouTubeService::delete_broadcast`].

use crate::error::Error;
use crate::session::StreamSession;
use crate::token_store::TokenStore;
use crate::youtube::{BroadcastDraft, LiveBroadcast, LiveStream, YouTubeService};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::instrument;

/// The three live-streaming calls the workflow needs.
pub trait LiveStreamingApi: Send + Sync {
    fn create_broadcast(
        &self,
        draft: &BroadcastDraft,
    ) -> impl Future<Output = Result<LiveBroadcast, Error>> + Send;

    fn create_stream(&self) -> impl Future<Output = Result<LiveStream, Error>> + Send;

    fn bind_broadcast(
        &self,
        broadcast_id: &str,
        stream_id: &str,
    ) -> impl Future<Output = Result<LiveBroadcast, Error>> + Send;
}

impl LiveStreamingApi for YouTubeService {
    fn create_broadcast(
        &self,
        draft: &BroadcastDraft,
    ) -> impl Future<Output = Result<LiveBroadcast, Error>> + Send {
        YouTubeService::create_broadcast(self, draft)
    }

    fn create_stream(&self) -> impl Future<Output = Result<LiveStream, Error>> + Send {
        YouTubeService::create_stream(self)
    }

    fn bind_broadcast(
        &self,
        broadcast_id: &str,
        stream_id: &str,
    ) -> impl Future<Output = Result<LiveBroadcast, Error>> + Send {
        YouTubeService::bind_broadcast(self, broadcast_id, stream_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    /// Checking that an access token is stored.
    Authorize,
    CreateBroadcast,
    CreateStream,
    Bind,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authorize => write!(f, "authorize"),
            Self::CreateBroadcast => write!(f, "create broadcast"),
            Self::CreateStream => write!(f, "create stream"),
            Self::Bind => write!(f, "bind"),
        }
    }
}

/// Everything needed to start pushing video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundStream {
    pub ingestion_address: String,
    pub stream_key: String,
    pub broadcast_id: String,
    pub stream_id: String,
}

#[derive(Debug, Clone, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    CreatingBroadcast,
    CreatingStream {
        broadcast_id: String,
    },
    Binding {
        broadcast_id: String,
        stream_id: String,
    },
    Bound(BoundStream),
    Failed {
        step: WorkflowStep,
        error: Error,
        /// Broadcast created before the failure, if any. It is not cleaned up.
        orphaned_broadcast_id: Option<String>,
    },
}

impl WorkflowState {
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            Self::CreatingBroadcast | Self::CreatingStream { .. } | Self::Binding { .. }
        )
    }
}

/// Runs the go-live steps against a [`LiveStreamingApi`].
///
/// Concurrent runs are not coordinated; calling [`Self::run`] twice creates two broadcasts.
pub struct LivestreamWorkflow<A> {
    api: A,
    tokens: Arc<dyn TokenStore>,
    session: StreamSession,
    state: watch::Sender<WorkflowState>,
}

impl<A> fmt::Debug for LivestreamWorkflow<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivestreamWorkflow")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<A: LiveStreamingApi> LivestreamWorkflow<A> {
    pub fn new(api: A, tokens: Arc<dyn TokenStore>, session: StreamSession) -> Self {
        Self {
            api,
            tokens,
            session,
            state: watch::Sender::new(WorkflowState::Idle),
        }
    }

    /// Follows the state of the workflow.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    fn fail(
        &self,
        step: WorkflowStep,
        error: Error,
        orphaned_broadcast_id: Option<String>,
    ) -> Error {
        tracing::warn!(%step, %error, ?orphaned_broadcast_id, "livestream workflow failed");
        self.state.send_replace(WorkflowState::Failed {
            step,
            error: error.clone(),
            orphaned_broadcast_id,
        });
        error
    }

    /// Creates a broadcast from `draft`, creates a stream, and binds the two.
    ///
    /// On success the session records the ingestion address, stream key, broadcast id and
    /// stream id.
    ///
    /// # Errors
    ///
    /// [`Error::NoAccessToken`] if nobody is signed in, checked before any request is sent.
    /// Otherwise the error of the first step that failed; later steps are not attempted.
    #[instrument(skip_all, fields(title = %draft.title))]
    pub async fn run(&self, draft: &BroadcastDraft) -> Result<BoundStream, Error> {
        if let Err(e) = self.tokens.access_token().await {
            return Err(self.fail(WorkflowStep::Authorize, e, None));
        }
        if !draft.is_valid() {
            return Err(self.fail(
                WorkflowStep::CreateBroadcast,
                Error::RequestConstruction("broadcast title must not be empty".into()),
                None,
            ));
        }

        self.state.send_replace(WorkflowState::CreatingBroadcast);
        let broadcast = self
            .api
            .create_broadcast(draft)
            .await
            .map_err(|e| self.fail(WorkflowStep::CreateBroadcast, e, None))?;
        tracing::info!(broadcast_id = %broadcast.id, "created broadcast");

        self.state.send_replace(WorkflowState::CreatingStream {
            broadcast_id: broadcast.id.clone(),
        });
        let stream = self
            .api
            .create_stream()
            .await
            .map_err(|e| self.fail(WorkflowStep::CreateStream, e, Some(broadcast.id.clone())))?;
        tracing::info!(stream_id = %stream.id, "created stream");

        self.state.send_replace(WorkflowState::Binding {
            broadcast_id: broadcast.id.clone(),
            stream_id: stream.id.clone(),
        });
        let bound = self
            .api
            .bind_broadcast(&broadcast.id, &stream.id)
            .await
            .map_err(|e| self.fail(WorkflowStep::Bind, e, Some(broadcast.id.clone())))?;

        let ingestion = stream.cdn.ingestion_info;
        let result = BoundStream {
            ingestion_address: ingestion.ingestion_address,
            stream_key: ingestion.stream_name,
            broadcast_id: bound.id,
            stream_id: stream.id,
        };
        self.session
            .record_binding(
                result.ingestion_address.clone(),
                result.stream_key.clone(),
                result.broadcast_id.clone(),
                result.stream_id.clone(),
            )
            .await;
        tracing::info!(
            broadcast_id = %result.broadcast_id,
            stream_id = %result.stream_id,
            "broadcast bound to stream"
        );
        self.state.send_replace(WorkflowState::Bound(result.clone()));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ApiClient;
    use crate::session::SessionState;
    use crate::test_support::CannedServer;
    use crate::token_store::{MemoryTokenStore, TokenKind};
    use crate::youtube::{YouTubeErrorDetail, YouTubeErrorResponse};
    use http::StatusCode;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn broadcast(id: &str) -> LiveBroadcast {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "snippet": {"title": "Game day"},
        }))
        .unwrap()
    }

    fn stream(id: &str, address: &str, key: &str) -> LiveStream {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "cdn": {"ingestionInfo": {"ingestionAddress": address, "streamName": key}},
        }))
        .unwrap()
    }

    fn forbidden() -> Error {
        Error::YouTube(YouTubeErrorResponse {
            error: YouTubeErrorDetail {
                code: 403,
                message: "The user is not enabled for live streaming.".into(),
            },
        })
    }

    struct MockApi {
        broadcast: Result<LiveBroadcast, Error>,
        stream: Result<LiveStream, Error>,
        bind: Result<LiveBroadcast, Error>,
        broadcast_calls: AtomicUsize,
        stream_calls: AtomicUsize,
        bind_calls: AtomicUsize,
    }

    impl MockApi {
        fn succeeding() -> Self {
            Self {
                broadcast: Ok(broadcast("B1")),
                stream: Ok(stream("S1", "rtmp://x", "K1")),
                bind: Ok(broadcast("B1")),
                broadcast_calls: AtomicUsize::new(0),
                stream_calls: AtomicUsize::new(0),
                bind_calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> (usize, usize, usize) {
            (
                self.broadcast_calls.load(Ordering::SeqCst),
                self.stream_calls.load(Ordering::SeqCst),
                self.bind_calls.load(Ordering::SeqCst),
            )
        }
    }

    impl LiveStreamingApi for &MockApi {
        async fn create_broadcast(&self, _: &BroadcastDraft) -> Result<LiveBroadcast, Error> {
            self.broadcast_calls.fetch_add(1, Ordering::SeqCst);
            self.broadcast.clone()
        }

        async fn create_stream(&self) -> Result<LiveStream, Error> {
            self.stream_calls.fetch_add(1, Ordering::SeqCst);
            self.stream.clone()
        }

        async fn bind_broadcast(&self, _: &str, _: &str) -> Result<LiveBroadcast, Error> {
            self.bind_calls.fetch_add(1, Ordering::SeqCst);
            self.bind.clone()
        }
    }

    async fn signed_in() -> Arc<dyn TokenStore> {
        let tokens = MemoryTokenStore::default();
        tokens.save(TokenKind::Access, "ya29.token").await.unwrap();
        Arc::new(tokens)
    }

    #[tokio::test]
    async fn happy_path_records_session() {
        let api = MockApi::succeeding();
        let session = StreamSession::new();
        let workflow = LivestreamWorkflow::new(&api, signed_in().await, session.clone());

        let bound = workflow.run(&BroadcastDraft::new("Game day")).await.unwrap();
        assert_eq!(
            bound,
            BoundStream {
                ingestion_address: "rtmp://x".into(),
                stream_key: "K1".into(),
                broadcast_id: "B1".into(),
                stream_id: "S1".into(),
            }
        );
        assert_eq!(api.calls(), (1, 1, 1));

        let state = session.snapshot().await;
        assert_eq!(state.stream_key.as_deref(), Some("K1"));
        assert_eq!(state.broadcast_id.as_deref(), Some("B1"));
        assert_eq!(state.stream_id.as_deref(), Some("S1"));
        assert!(matches!(workflow.state(), WorkflowState::Bound(b) if b == bound));
    }

    #[tokio::test]
    async fn broadcast_failure_stops_workflow() {
        let api = MockApi {
            broadcast: Err(forbidden()),
            ..MockApi::succeeding()
        };
        let session = StreamSession::new();
        let workflow = LivestreamWorkflow::new(&api, signed_in().await, session.clone());

        let e = workflow.run(&BroadcastDraft::new("Game day")).await.unwrap_err();
        assert!(matches!(e, Error::YouTube(_)), "{e:?}");
        assert_eq!(api.calls(), (1, 0, 0));
        assert_eq!(session.snapshot().await, SessionState::default());
        assert!(matches!(
            workflow.state(),
            WorkflowState::Failed {
                step: WorkflowStep::CreateBroadcast,
                orphaned_broadcast_id: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn stream_failure_leaves_broadcast_behind() {
        let api = MockApi {
            stream: Err(Error::ServerUnreachable),
            ..MockApi::succeeding()
        };
        let workflow = LivestreamWorkflow::new(&api, signed_in().await, StreamSession::new());

        let e = workflow.run(&BroadcastDraft::new("Game day")).await.unwrap_err();
        assert!(matches!(e, Error::ServerUnreachable), "{e:?}");
        assert_eq!(api.calls(), (1, 1, 0));
        let WorkflowState::Failed {
            step,
            orphaned_broadcast_id,
            ..
        } = workflow.state()
        else {
            panic!("workflow should have failed");
        };
        assert_eq!(step, WorkflowStep::CreateStream);
        assert_eq!(orphaned_broadcast_id.as_deref(), Some("B1"));
    }

    #[tokio::test]
    async fn missing_token_makes_no_calls() {
        let api = MockApi::succeeding();
        let workflow = LivestreamWorkflow::new(
            &api,
            Arc::new(MemoryTokenStore::default()),
            StreamSession::new(),
        );

        let e = workflow.run(&BroadcastDraft::new("Game day")).await.unwrap_err();
        assert!(matches!(e, Error::NoAccessToken), "{e:?}");
        assert_eq!(api.calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn blank_title_makes_no_calls() {
        let api = MockApi::succeeding();
        let workflow = LivestreamWorkflow::new(&api, signed_in().await, StreamSession::new());

        let e = workflow.run(&BroadcastDraft::new("  ")).await.unwrap_err();
        assert!(matches!(e, Error::RequestConstruction(_)), "{e:?}");
        assert_eq!(api.calls(), (0, 0, 0));
    }

    #[tokio::test]
    async fn subscribers_see_final_state() {
        let api = MockApi::succeeding();
        let workflow = LivestreamWorkflow::new(&api, signed_in().await, StreamSession::new());
        let mut states = workflow.subscribe();
        assert!(matches!(*states.borrow_and_update(), WorkflowState::Idle));

        workflow.run(&BroadcastDraft::new("Game day")).await.unwrap();
        assert!(states.has_changed().unwrap());
        assert!(matches!(*states.borrow_and_update(), WorkflowState::Bound(_)));
        assert!(!workflow.state().is_running());
    }

    #[tokio::test]
    async fn runs_against_youtube_service() {
        let mut server = CannedServer::sequence(vec![
            (StatusCode::OK, r#"{"id":"B1","snippet":{"title":"Game day"}}"#),
            (
                StatusCode::OK,
                r#"{"id":"S1","cdn":{"ingestionInfo":{"ingestionAddress":"rtmp://x","streamName":"K1"}}}"#,
            ),
            (
                StatusCode::OK,
                r#"{"id":"B1","snippet":{"title":"Game day"},"contentDetails":{"boundStreamId":"S1"}}"#,
            ),
        ])
        .await;
        let tokens = signed_in().await;
        let yt = YouTubeService::with_base(ApiClient::default(), server.base(), Arc::clone(&tokens));
        let session = StreamSession::new();
        let workflow = LivestreamWorkflow::new(yt, tokens, session.clone());

        workflow.run(&BroadcastDraft::new("Game day")).await.unwrap();
        assert_eq!(
            session.publish_url("rtmp://fallback", "none").await,
            "rtmp://x/K1"
        );

        let paths: Vec<String> = [
            server.next_request().await,
            server.next_request().await,
            server.next_request().await,
        ]
        .iter()
        .map(|r| r.uri.path().to_string())
        .collect();
        assert_eq!(
            paths,
            vec![
                "/youtube/v3/liveBroadcasts",
                "/youtube/v3/liveStreams",
                "/youtube/v3/liveBroadcasts/bind",
            ]
        );
    }
}
