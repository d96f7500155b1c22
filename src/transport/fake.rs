//! In-process fake network agent for unit tests
//!
//! [`FakeNetworkAgent`] records every request it is asked to send and
//! answers from a queue of scripted results. Replies are delivered either
//! inline, or from a freshly spawned thread to mimic a transport that
//! completes on a background worker.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::callback::Callback;
use crate::error::{Result, SdkError};
use crate::transport::{ApiRequest, NetworkAgent, RawResponse};

/// Fake [`NetworkAgent`] with scripted replies.
#[derive(Debug, Default)]
pub struct FakeNetworkAgent {
    replies: Mutex<VecDeque<Result<RawResponse>>>,
    sent: Arc<Mutex<Vec<ApiRequest>>>,
    background: bool,
}

impl FakeNetworkAgent {
    /// Creates an agent that completes on the calling thread.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an agent that completes on a spawned thread.
    pub fn background() -> Self {
        Self {
            background: true,
            ..Self::default()
        }
    }

    /// Queues the next reply.
    pub fn reply(self, result: Result<RawResponse>) -> Self {
        self.replies
            .lock()
            .expect("fake replies lock")
            .push_back(result);
        self
    }

    /// Queues a JSON reply with the given status.
    pub fn reply_json(self, status: u16, value: serde_json::Value) -> Self {
        self.reply(Ok(RawResponse::json(status, &value)))
    }

    /// Returns the requests sent so far.
    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().expect("fake sent lock").clone()
    }

    /// Returns the single request sent so far.
    pub fn only_request(&self) -> ApiRequest {
        let sent = self.sent();
        assert_eq!(sent.len(), 1, "expected exactly one request, got {sent:?}");
        sent.into_iter().next().expect("one request")
    }
}

impl NetworkAgent for FakeNetworkAgent {
    fn send(&self, request: ApiRequest, completion: Callback<RawResponse>) {
        self.sent.lock().expect("fake sent lock").push(request);
        let reply = self
            .replies
            .lock()
            .expect("fake replies lock")
            .pop_front()
            .unwrap_or_else(|| Err(SdkError::Network("no scripted reply".to_string())));

        if self.background {
            std::thread::spawn(move || completion(reply));
        } else {
            completion(reply);
        }
    }
}
