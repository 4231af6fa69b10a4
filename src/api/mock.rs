//! Scripted transport for store tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::api::{ApiRequest, Envelope, Transport};
use crate::app::{Result, ShortlineError};

pub(crate) enum Reply {
    Ready(Result<Envelope>),
    Deferred(oneshot::Receiver<Result<Envelope>>),
}

#[derive(Default)]
pub(crate) struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_ok(&self, envelope: Envelope) {
        self.push(Reply::Ready(Ok(envelope)));
    }

    pub(crate) fn push_data(&self, data: Value) {
        self.push_ok(Envelope::with_data(data));
    }

    pub(crate) fn push_err(&self, status: u16, message: Option<&str>) {
        self.push(Reply::Ready(Err(ShortlineError::Api {
            status,
            message: message.map(String::from),
        })));
    }

    /// Queue a reply that resolves only when the returned sender fires.
    pub(crate) fn push_deferred(&self) -> oneshot::Sender<Result<Envelope>> {
        let (tx, rx) = oneshot::channel();
        self.push(Reply::Deferred(rx));
        tx
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub(crate) fn last_request(&self) -> Option<ApiRequest> {
        self.requests().pop()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests().len()
    }

    fn push(&self, reply: Reply) {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<Envelope> {
        let reply = {
            self.requests
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(request);
            self.replies
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
        };

        match reply {
            Some(Reply::Ready(result)) => result,
            Some(Reply::Deferred(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ShortlineError::Other("reply dropped".into()))),
            None => Err(ShortlineError::Other("no scripted reply".into())),
        }
    }
}
