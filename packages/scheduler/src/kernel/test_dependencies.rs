// Test doubles for kernel dependencies.
//
// Provides a scriptable dispatch client that can be injected into
// SchedulerDeps for tests.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use super::traits::BaseDispatchClient;

// =============================================================================
// Recording Dispatch Client
// =============================================================================

/// Dispatch client that records every URL it is asked to call and replies
/// from a script keyed by URL fragment. Unscripted URLs get a 200.
#[derive(Default)]
pub struct RecordingDispatchClient {
    calls: Mutex<Vec<String>>,
    statuses: Mutex<Vec<(String, u16)>>,
    failures: Mutex<Vec<(String, String)>>,
}

impl RecordingDispatchClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `status` for any URL containing `url_fragment`.
    pub fn with_status(self, url_fragment: &str, status: u16) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .push((url_fragment.to_string(), status));
        self
    }

    /// Fail with a transport-level error for any URL containing
    /// `url_fragment` (stands in for timeouts and connection failures).
    pub fn with_failure(self, url_fragment: &str, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .push((url_fragment.to_string(), message.to_string()));
        self
    }

    /// Every URL dispatched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// How many dispatched URLs contain the fragment.
    pub fn call_count(&self, url_fragment: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.contains(url_fragment))
            .count()
    }

    /// Whether any dispatched URL contains the fragment.
    pub fn was_dispatched(&self, url_fragment: &str) -> bool {
        self.call_count(url_fragment) > 0
    }
}

#[async_trait]
impl BaseDispatchClient for RecordingDispatchClient {
    async fn dispatch(&self, url: &str) -> Result<u16> {
        self.calls.lock().unwrap().push(url.to_string());

        let failure = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, message)| message.clone());
        if let Some(message) = failure {
            anyhow::bail!("{message}");
        }

        let status = self
            .statuses
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, status)| *status);

        Ok(status.unwrap_or(200))
    }
}
