//! In-memory transport for coordinator tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use crate::api::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::ApiError;

struct Route {
    method: Method,
    path: String,
    /// `None` simulates an unreachable server.
    response: Option<ApiResponse>,
}

struct Queued {
    route: Route,
    delay: Duration,
}

#[derive(Default)]
struct FakeInner {
    /// One-shot responses, used in order before the route table.
    queued: VecDeque<Queued>,
    routes: Vec<Route>,
    requests: Vec<ApiRequest>,
    delay: Option<Duration>,
}

/// Answers from a fixed route table and records every request.
#[derive(Clone, Default)]
pub struct FakeTransport {
    inner: Arc<Mutex<FakeInner>>,
}

#[allow(clippy::unwrap_used)]
impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with `status` and `body`. Later routes for the
    /// same request take precedence.
    pub fn route(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        self.inner.lock().unwrap().routes.insert(
            0,
            Route {
                method,
                path: path.to_owned(),
                response: Some(ApiResponse::new(status, body)),
            },
        );
        self
    }

    /// Fail `method path` at the transport level.
    pub fn unreachable(&self, method: Method, path: &str) -> &Self {
        self.inner.lock().unwrap().routes.insert(
            0,
            Route {
                method,
                path: path.to_owned(),
                response: None,
            },
        );
        self
    }

    /// Answer the next matching request once with `status` and `body`,
    /// after `delay`. Queued answers for the same request are used in the
    /// order they were queued.
    pub fn queue(
        &self,
        method: Method,
        path: &str,
        status: u16,
        body: Value,
        delay: Duration,
    ) -> &Self {
        self.inner.lock().unwrap().queued.push_back(Queued {
            route: Route {
                method,
                path: path.to_owned(),
                response: Some(ApiResponse::new(status, body)),
            },
            delay,
        });
        self
    }

    /// Delay every response.
    pub fn delay(&self, delay: Duration) -> &Self {
        self.inner.lock().unwrap().delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// `"METHOD /path"` for every request, in order.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect()
    }
}

impl Transport for FakeTransport {
    #[allow(clippy::unwrap_used)]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let (route, delay) = {
            let mut inner = self.inner.lock().unwrap();
            inner.requests.push(request.clone());
            let matches =
                |route: &Route| route.method == request.method && route.path == request.path;
            let queued = inner.queued.iter().position(|queued| matches(&queued.route));
            match queued.and_then(|index| inner.queued.remove(index)) {
                Some(queued) => (Some(queued.route.response), Some(queued.delay)),
                None => {
                    let route = inner
                        .routes
                        .iter()
                        .find(|route| matches(route))
                        .map(|route| route.response.clone());
                    (route, inner.delay)
                }
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match route {
            Some(Some(response)) => Ok(response),
            Some(None) => Err(ApiError::Transport("connection refused".into())),
            None => Ok(ApiResponse::new(
                404,
                serde_json::json!({"success": false, "message": "no such route"}),
            )),
        }
    }
}
