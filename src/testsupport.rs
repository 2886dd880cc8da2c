//! Shared test fixtures for retry, client, and crew test modules.
//!
//! Everything here is deterministic: sleepers record instead of waiting and
//! scripted operations replay a fixed list of outcomes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::future::{ready, Ready};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::api::{GenerateRequest, ModelClient};
use crate::error::ApiError;
use crate::retry::{BlockingSleep, Classify, ErrorClass, Sleeper};

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory fixture with best-effort cleanup.
#[derive(Debug)]
pub struct TestTempDir {
    path: PathBuf,
}

impl TestTempDir {
    /// Create a unique temporary directory with a readable prefix.
    pub fn new(prefix: &str) -> Self {
        let suffix = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let dir = std::env::temp_dir().join(format!("jobcrew-{prefix}-{millis}-{suffix}"));
        fs::create_dir_all(&dir).expect("failed to create temporary fixture directory");
        Self { path: dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Build a child path under the fixture root.
    pub fn child(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }
}

impl Drop for TestTempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Sleeper that records requested waits and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.waits.lock().expect("sleeper lock").clone()
    }

    fn record(&self, duration: Duration) {
        self.waits.lock().expect("sleeper lock").push(duration);
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.record(duration);
    }
}

impl BlockingSleep for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.record(duration);
    }
}

/// Failure with a fixed classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestFailure {
    class: ErrorClass,
    message: String,
    hint: Option<Duration>,
}

impl TestFailure {
    pub fn rate_limited(message: &str) -> Self {
        Self::with_class(ErrorClass::RateLimited, message)
    }

    pub fn transient(message: &str) -> Self {
        Self::with_class(ErrorClass::Transient, message)
    }

    pub fn unclassified(message: &str) -> Self {
        Self::with_class(ErrorClass::Unclassified, message)
    }

    /// Attach a structured delay hint, as a `Retry-After` header would.
    pub fn with_hint(mut self, hint: Duration) -> Self {
        self.hint = Some(hint);
        self
    }

    fn with_class(class: ErrorClass, message: &str) -> Self {
        Self {
            class,
            message: message.to_string(),
            hint: None,
        }
    }
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TestFailure {}

impl Classify for TestFailure {
    fn classify(&self) -> ErrorClass {
        self.class
    }

    fn suggested_delay(&self) -> Option<Duration> {
        self.hint
    }
}

/// Operation that replays scripted outcomes and counts calls.
#[derive(Debug)]
pub struct ScriptedOperation<T> {
    outcomes: Mutex<VecDeque<Result<T, TestFailure>>>,
    fallback: Option<TestFailure>,
    calls: AtomicU32,
}

impl<T> ScriptedOperation<T> {
    /// Replay `outcomes` in order; panics if called more often.
    pub fn new(outcomes: Vec<Result<T, TestFailure>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            fallback: None,
            calls: AtomicU32::new(0),
        }
    }

    /// Fail with `failure` on every call.
    pub fn always(failure: TestFailure) -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            fallback: Some(failure),
            calls: AtomicU32::new(0),
        }
    }

    pub fn next_outcome(&self) -> Result<T, TestFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(outcome) = self.outcomes.lock().expect("script lock").pop_front() {
            return outcome;
        }
        match &self.fallback {
            Some(failure) => Err(failure.clone()),
            None => panic!("scripted operation called more times than scripted"),
        }
    }

    /// Async form of [`next_outcome`](Self::next_outcome).
    pub fn call(&self) -> Ready<Result<T, TestFailure>> {
        ready(self.next_outcome())
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Model client that replays scripted responses and records every request.
#[derive(Debug, Default)]
pub struct ScriptedModelClient {
    responses: Mutex<VecDeque<Result<String, ApiError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedModelClient {
    pub fn new(responses: Vec<Result<String, ApiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, ApiError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| {
                Err(ApiError::InvalidResponse(
                    "scripted client has no responses left".into(),
                ))
            })
    }
}
