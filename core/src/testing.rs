//! Scripted transport for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::Value;

use crate::client::WdClient;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, HttpResponse, Transport};

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<HttpResponse>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<HttpResponse>>) -> Self {
        Self {
            responses: RefCell::new(responses.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response left".to_string())))
    }
}

pub fn ok(body: Value) -> Result<HttpResponse> {
    status(200, &body.to_string())
}

pub fn status(code: u16, body: &str) -> Result<HttpResponse> {
    Ok(HttpResponse {
        status: code,
        headers: Vec::new(),
        body: body.to_string(),
    })
}

pub fn client_with(responses: Vec<Result<HttpResponse>>) -> WdClient<ScriptedTransport> {
    let config = ClientConfig::new("http://wd.test", "test-token");
    WdClient::new(&config, ScriptedTransport::new(responses)).unwrap()
}

/// Body of a recorded request, decoded as JSON.
pub fn body_of(request: &HttpRequest) -> Value {
    serde_json::from_str(request.body.as_deref().unwrap_or("null")).unwrap()
}
