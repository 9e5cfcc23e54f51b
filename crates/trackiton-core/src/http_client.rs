use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::time::Instant;

/// HTTP GET request issued against the market-data API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: 10_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// HTTP response envelope returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok_json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport contract used by the backoff fetcher.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Production HTTP client using reqwest for real API calls.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(
                reqwest::Client::builder()
                    .user_agent(concat!("trackiton/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            ),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let timeout = std::time::Duration::from_millis(request.timeout_ms);
            let response = self
                .client
                .get(&request.url)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        HttpError::new(format!("request timeout: {}", e.without_url()))
                    } else if e.is_connect() {
                        HttpError::new(format!("connection failed: {}", e.without_url()))
                    } else {
                        HttpError::new(format!("request failed: {}", e.without_url()))
                    }
                })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| {
                HttpError::new(format!("failed to read response body: {}", e.without_url()))
            })?;

            Ok(HttpResponse { status, body })
        })
    }
}

/// One request observed by [`ScriptedHttpClient`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub at: Instant,
}

type Scripted = Result<HttpResponse, HttpError>;

#[derive(Debug)]
struct Route {
    pattern: String,
    responses: VecDeque<Scripted>,
}

/// Offline transport that replays canned responses, for deterministic tests.
///
/// Responses are matched by URL substring (e.g. `symbol=AAPL`) and consumed in
/// order; the last response of a route keeps being replayed once the queue is
/// down to one entry.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, pattern: impl Into<String>, body: impl Into<String>) -> Self {
        self.push(pattern.into(), Ok(HttpResponse::ok_json(body)))
    }

    pub fn respond_status(self, pattern: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.push(
            pattern.into(),
            Ok(HttpResponse {
                status,
                body: body.into(),
            }),
        )
    }

    pub fn fail(self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.push(pattern.into(), Err(HttpError::new(message)))
    }

    fn push(self, pattern: String, response: Scripted) -> Self {
        {
            let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
            match routes.iter_mut().find(|route| route.pattern == pattern) {
                Some(route) => route.responses.push_back(response),
                None => routes.push(Route {
                    pattern,
                    responses: VecDeque::from([response]),
                }),
            }
        }
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn next_response(&self, url: &str) -> Scripted {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(route) = routes.iter_mut().find(|route| url.contains(&route.pattern)) else {
            return Err(HttpError::new(format!("no scripted response for {url}")));
        };

        if route.responses.len() > 1 {
            route
                .responses
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::new("scripted route is empty")))
        } else {
            route
                .responses
                .front()
                .cloned()
                .unwrap_or_else(|| Err(HttpError::new("scripted route is empty")))
        }
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(RecordedCall {
                    url: request.url.clone(),
                    at: Instant::now(),
                });
            self.next_response(&request.url)
        })
    }
}
