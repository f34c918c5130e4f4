//! Scripted transport backend.

use std::sync::{Arc, Mutex};

use crate::http::{HttpResponse, PreparedRequest, TransportBackend, TransportError};

/// What a [`MockBackend`] does on one call.
#[derive(Clone, Debug)]
pub enum MockOutcome {
    /// Return a response with this status and body.
    Respond(u16, Vec<u8>),
    /// Fail with a connection error.
    Fail,
}

/// Shared record of the requests a [`MockBackend`] executed.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    requests: Arc<Mutex<Vec<PreparedRequest>>>,
}

impl CallLog {
    /// Number of executed requests.
    pub fn count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Copies of the executed requests, oldest first.
    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn push(&self, request: &PreparedRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
    }
}

/// Backend replaying a script of outcomes. The last outcome repeats once the
/// script runs out; an empty script always fails.
#[derive(Debug)]
pub struct MockBackend {
    name: &'static str,
    tls: bool,
    available: bool,
    script: Mutex<Vec<MockOutcome>>,
    calls: CallLog,
}

impl MockBackend {
    /// Create a backend named `name`.
    pub fn new(name: &'static str, tls: bool, script: Vec<MockOutcome>) -> Self {
        Self {
            name,
            tls,
            available: true,
            script: Mutex::new(script),
            calls: CallLog::default(),
        }
    }

    /// Report the backend as unavailable for every request.
    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Handle on the request log, usable after the backend moved into a client.
    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }

    fn next_outcome(&self) -> MockOutcome {
        let Ok(mut script) = self.script.lock() else {
            return MockOutcome::Fail;
        };
        match script.len() {
            0 => MockOutcome::Fail,
            1 => script[0].clone(),
            _ => script.remove(0),
        }
    }
}

impl TransportBackend for MockBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn supports_tls(&self) -> bool {
        self.tls
    }

    fn is_available(&self, request: &PreparedRequest) -> bool {
        self.available && (!request.is_tls() || self.tls)
    }

    fn execute(&self, request: &PreparedRequest) -> Result<HttpResponse, TransportError> {
        self.calls.push(request);
        match self.next_outcome() {
            MockOutcome::Respond(status, body) => Ok(HttpResponse::new(status, body, self.name)),
            MockOutcome::Fail => Err(TransportError::Connect(format!("{} scripted failure", self.name))),
        }
    }
}
