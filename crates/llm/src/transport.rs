use async_trait::async_trait;
use reqwest::Client as Http;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A fully-built provider call: one JSON POST.
#[derive(Clone)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl OutboundRequest {
    pub fn new<S: Into<String>>(url: S, body: Value) -> Self {
        Self { url: url.into(), headers: Vec::new(), body }
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// Headers and query strings carry keys; keep them out of logs.
impl fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.url.split('?').next().unwrap_or_default();
        let names: Vec<&str> = self.headers.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("OutboundRequest")
            .field("url", &path)
            .field("headers", &names)
            .finish_non_exhaustive()
    }
}

/// Status and body of a provider reply, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new<S: Into<String>>(status: u16, body: S) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("could not build HTTP client: {0}")]
    Build(String),
}

/// Outbound HTTP port. The dispatcher never touches `reqwest` directly.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_json(&self, request: OutboundRequest) -> Result<RawResponse, TransportError>;
}

/// Production transport over a pooled `reqwest` client.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http: Http,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = Http::builder()
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Build(e.without_url().to_string()))?;
        Ok(Self { http, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_err(&self, err: reqwest::Error) -> TransportError {
        // Gemini keys live in the URL, so never let it reach the message.
        let err = err.without_url();
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        tracing::debug!(request = ?request, "sending provider request");

        let mut builder = self.http.post(request.url.as_str()).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let resp = builder.send().await.map_err(|e| self.map_err(e))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| self.map_err(e))?;
        Ok(RawResponse { status, body })
    }
}

/// Scripted transport for tests.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Mutex, PoisonError};

    type Reply = Result<RawResponse, TransportError>;

    /// Replays scripted replies and records every request it sees.
    ///
    /// Replies registered with [`StaticTransport::on`] are served to requests
    /// whose URL contains the fragment; everything else drains the shared
    /// queue in order. An exhausted script answers with a `Request` error.
    #[derive(Default)]
    pub struct StaticTransport {
        replies: Mutex<VecDeque<Reply>>,
        routes: Mutex<Vec<(String, VecDeque<Reply>)>>,
        seen: Mutex<Vec<OutboundRequest>>,
    }

    impl StaticTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response<S: Into<String>>(self, status: u16, body: S) -> Self {
            self.push(Ok(RawResponse::new(status, body)));
            self
        }

        pub fn with_json(self, status: u16, body: Value) -> Self {
            self.with_response(status, body.to_string())
        }

        pub fn with_error(self, err: TransportError) -> Self {
            self.push(Err(err));
            self
        }

        pub fn on<F: Into<String>>(self, url_fragment: F, status: u16, body: Value) -> Self {
            self.route(url_fragment.into(), Ok(RawResponse::new(status, body.to_string())));
            self
        }

        pub fn on_error<F: Into<String>>(self, url_fragment: F, err: TransportError) -> Self {
            self.route(url_fragment.into(), Err(err));
            self
        }

        pub fn calls(&self) -> usize {
            self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
        }

        pub fn requests(&self) -> Vec<OutboundRequest> {
            self.seen.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        pub fn calls_matching(&self, url_fragment: &str) -> usize {
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .filter(|r| r.url.contains(url_fragment))
                .count()
        }

        fn push(&self, reply: Reply) {
            self.replies
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(reply);
        }

        fn route(&self, fragment: String, reply: Reply) {
            let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
            match routes.iter_mut().find(|(f, _)| *f == fragment) {
                Some((_, queue)) => queue.push_back(reply),
                None => routes.push((fragment, VecDeque::from([reply]))),
            }
        }

        fn next_reply(&self, url: &str) -> Option<Reply> {
            let routed = self
                .routes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter_mut()
                .find(|(fragment, queue)| url.contains(fragment.as_str()) && !queue.is_empty())
                .and_then(|(_, queue)| queue.pop_front());
            routed.or_else(|| {
                self.replies
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front()
            })
        }
    }

    #[async_trait]
    impl HttpTransport for StaticTransport {
        async fn post_json(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
            let reply = self.next_reply(&request.url);
            self.seen
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(request);
            reply.unwrap_or_else(|| Err(TransportError::Request("no scripted response".into())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::StaticTransport;
    use super::*;
    use serde_json::json;

    #[test]
    fn debug_hides_query_and_header_values() {
        let req = OutboundRequest::new("https://g.example/x?key=AIza-secret", json!({}))
            .header("Authorization", "Bearer sk-secret");
        let shown = format!("{:?}", req);
        assert!(shown.contains("https://g.example/x"));
        assert!(shown.contains("Authorization"));
        assert!(!shown.contains("secret"));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = OutboundRequest::new("u", json!({})).header("X-Api-Key", "k");
        assert_eq!(req.header_value("x-api-key"), Some("k"));
    }

    #[tokio::test]
    async fn static_transport_replays_in_order() {
        let t = StaticTransport::new()
            .with_response(200, "first")
            .with_error(TransportError::Connect("refused".into()));

        let first = t.post_json(OutboundRequest::new("a", json!({}))).await.unwrap();
        assert_eq!(first, RawResponse::new(200, "first"));
        assert!(t.post_json(OutboundRequest::new("b", json!({}))).await.is_err());
        assert!(t.post_json(OutboundRequest::new("c", json!({}))).await.is_err());
        assert_eq!(t.calls(), 3);
        assert_eq!(t.requests()[1].url, "b");
    }

    #[tokio::test]
    async fn routed_replies_win_over_the_queue() {
        let t = StaticTransport::new()
            .with_response(500, "queued")
            .on("api.x.ai", 200, json!({ "ok": true }));

        let routed = t.post_json(OutboundRequest::new("https://api.x.ai/v1", json!({}))).await.unwrap();
        assert_eq!(routed.status, 200);
        let queued = t.post_json(OutboundRequest::new("https://api.x.ai/v1", json!({}))).await.unwrap();
        assert_eq!(queued.status, 500);
        assert_eq!(t.calls_matching("x.ai"), 2);
    }

    #[test]
    fn reqwest_transport_builds() {
        let t = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        assert_eq!(t.timeout(), Duration::from_secs(5));
    }
}
