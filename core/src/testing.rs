//! In-memory transport for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, RestClient};

/// Answers requests from a fixed script, in order, and records them.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    responses: RefCell<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, status: u16, body: Value) -> Self {
        self.respond_text(status, body.to_string())
    }

    pub(crate) fn respond_text(self, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    pub(crate) fn fail(self, error: ApiError) -> Self {
        self.responses.borrow_mut().push_back(Err(error));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub(crate) fn request(&self, index: usize) -> HttpRequest {
        self.requests.borrow()[index].clone()
    }
}

impl RestClient for ScriptedClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response left".to_string())))
    }
}
