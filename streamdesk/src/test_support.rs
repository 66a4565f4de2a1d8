//! Local HTTP server answering requests with canned responses, for client and service tests.

use crate::http::{ApiBase, Scheme};
use bytes::Bytes;
use http::{HeaderMap, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper::{Request, Response, body};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// A request as the canned server saw it.
#[derive(Debug)]
pub(crate) struct RecordedRequest {
    pub method: http::Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// Decoded query pairs in wire order.
    pub fn query(&self) -> Vec<(String, String)> {
        form_urlencoded::parse(self.uri.query().unwrap_or("").as_bytes())
            .into_owned()
            .collect()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

pub(crate) struct CannedServer {
    addr: SocketAddr,
    requests: mpsc::UnboundedReceiver<RecordedRequest>,
}

impl CannedServer {
    /// Answers every request with the same response.
    pub async fn respond(status: StatusCode, body: &'static str) -> Self {
        Self::sequence(vec![(status, body)]).await
    }

    /// Answers requests with `responses` in order, repeating the last one once exhausted.
    pub async fn sequence(responses: Vec<(StatusCode, &'static str)>) -> Self {
        assert!(!responses.is_empty(), "canned server needs a response");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind to localhost");
        let addr = listener.local_addr().expect("get local address");
        let (tx, requests) = mpsc::unbounded_channel();
        let responses = Arc::new(responses);
        let served = Arc::new(AtomicUsize::new(0));

        tokio::spawn(async move {
            while let Ok((conn, _)) = listener.accept().await {
                let tx = tx.clone();
                let responses = Arc::clone(&responses);
                let served = Arc::clone(&served);
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<body::Incoming>| {
                        let tx = tx.clone();
                        let responses = Arc::clone(&responses);
                        let served = Arc::clone(&served);
                        async move {
                            let (parts, incoming) = req.into_parts();
                            let body = incoming.collect().await?.to_bytes();
                            let _ = tx.send(RecordedRequest {
                                method: parts.method,
                                uri: parts.uri,
                                headers: parts.headers,
                                body,
                            });
                            let n = served
                                .fetch_add(1, Ordering::SeqCst)
                                .min(responses.len() - 1);
                            let (status, text) = responses[n];
                            let mut response = Response::new(Full::new(Bytes::from_static(
                                text.as_bytes(),
                            )));
                            *response.status_mut() = status;
                            Ok::<_, hyper::Error>(response)
                        }
                    });
                    let _ = hyper::server::conn::http1::Builder::new()
                        .serve_connection(hyper_util::rt::TokioIo::new(conn), service)
                        .await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn base(&self) -> ApiBase {
        ApiBase::new(Scheme::Http, self.addr.to_string())
    }

    pub async fn next_request(&mut self) -> RecordedRequest {
        self.requests
            .recv()
            .await
            .expect("canned server recorded a request")
    }
}
