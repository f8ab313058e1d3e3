//! Scripted accrual client
//!
//! Replays a queue of canned outcomes, one per `fetch`, and records every
//! order number it was asked about. Used by worker tests in place of a live
//! authority.

use accrual_client::{AccrualApi, AccrualResponse, ClientError, ClientResult};
use http::StatusCode;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Step {
    Respond(AccrualResponse),
    Fail(String),
}

/// Accrual client that replays a fixed script
///
/// Once the script is exhausted the last step repeats; an empty script
/// answers `204 No Content`.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response
    pub fn then_respond(self, response: AccrualResponse) -> Self {
        self.steps.lock().push_back(Step::Respond(response));
        self
    }

    /// Queue a `200 OK` with a JSON body
    pub fn then_json<T: Serialize>(self, body: &T) -> Self {
        self.then_respond(AccrualResponse::json(body))
    }

    /// Queue an empty response with the given status
    pub fn then_status(self, status: StatusCode) -> Self {
        self.then_respond(AccrualResponse::new(status))
    }

    /// Queue a transport failure
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.steps.lock().push_back(Step::Fail(message.into()));
        self
    }

    /// Number of `fetch` calls so far
    pub fn calls(&self) -> usize {
        self.requested.lock().len()
    }

    /// Order numbers requested, in call order
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }

    fn next_step(&self) -> Step {
        let mut last = self.last.lock();
        if let Some(step) = self.steps.lock().pop_front() {
            *last = Some(step.clone());
            return step;
        }
        last.clone()
            .unwrap_or_else(|| Step::Respond(AccrualResponse::new(StatusCode::NO_CONTENT)))
    }
}

#[async_trait]
impl AccrualApi for ScriptedClient {
    async fn fetch(&self, order_number: &str) -> ClientResult<AccrualResponse> {
        self.requested.lock().push(order_number.to_string());
        match self.next_step() {
            Step::Respond(response) => Ok(response),
            Step::Fail(message) => Err(ClientError::Transport(message)),
        }
    }
}
