//! Testing utilities including mock implementations.
//!
//! Useful for testing applications that use this library without real
//! service calls or a real clock.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::error::{ServiceError, ServiceResult};
use crate::keypool::Clock;
use crate::model::CompletionModel;
use crate::security::ApiKey;

/// A mock completion model with scripted responses and call tracking.
#[derive(Default)]
pub struct MockModel {
    /// Responses returned in order; the last one repeats.
    responses: Arc<RwLock<Vec<String>>>,

    /// When set, every call fails with this message.
    failure: Arc<RwLock<Option<String>>>,

    /// Calls made, for assertions.
    calls: Arc<RwLock<Vec<MockCall>>>,
}

/// Record of a call made to the mock model.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub key_suffix: String,
}

impl MockModel {
    /// Create a mock with no scripted responses (calls answer `{}`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.write().unwrap().push(response.into());
        self
    }

    /// Make every call fail.
    pub fn failing(self, message: impl Into<String>) -> Self {
        *self.failure.write().unwrap() = Some(message.into());
        self
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl CompletionModel for MockModel {
    async fn complete(&self, prompt: &str, key: &ApiKey) -> ServiceResult<String> {
        let call_index = {
            let mut calls = self.calls.write().unwrap();
            calls.push(MockCall {
                prompt: prompt.to_string(),
                key_suffix: key.suffix(),
            });
            calls.len() - 1
        };

        if let Some(message) = self.failure.read().unwrap().clone() {
            return Err(ServiceError::Api {
                status: 503,
                body: message,
            });
        }

        let responses = self.responses.read().unwrap();
        let response = responses
            .get(call_index)
            .or_else(|| responses.last())
            .cloned()
            .unwrap_or_else(|| "{}".to_string());
        Ok(response)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A manually-driven clock for quota-window tests.
///
/// Starts at a fixed date and only moves when [`advance`](Self::advance)
/// is called.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock at a fixed, arbitrary starting instant.
    pub fn new() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap())
    }

    /// Create a clock at a specific instant.
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).expect("duration in range");
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
