use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;

use super::{OutgoingRequest, Transport, TransportError};
use crate::client::RawResponse;

/// What the mock does with every request it receives.
#[derive(Debug, Clone)]
pub(crate) enum Behaviour {
    /// Answers immediately.
    Respond { status: StatusCode, body: Bytes },
    /// Answers after a delay.
    Delay {
        delay: Duration,
        status: StatusCode,
        body: Bytes,
    },
    /// Never answers.
    Hang,
    /// Fails below HTTP.
    Fail(TransportError),
}

/// Scripted transport recording the requests it was given.
#[derive(Debug, Clone)]
pub(crate) struct MockTransport {
    behaviour: Behaviour,
    requests: Arc<Mutex<Vec<OutgoingRequest>>>,
}

impl MockTransport {
    pub(crate) fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            requests: Arc::default(),
        }
    }

    pub(crate) fn json(status: StatusCode, body: serde_json::Value) -> Self {
        Self::new(Behaviour::Respond {
            status,
            body: Bytes::from(body.to_string()),
        })
    }

    pub(crate) fn status(status: StatusCode) -> Self {
        Self::new(Behaviour::Respond {
            status,
            body: Bytes::new(),
        })
    }

    pub(crate) fn hang() -> Self {
        Self::new(Behaviour::Hang)
    }

    pub(crate) fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError> {
        let url = request.url.clone();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let (status, body) = match self.behaviour.clone() {
            Behaviour::Respond { status, body } => (status, body),
            Behaviour::Delay {
                delay,
                status,
                body,
            } => {
                tokio::time::sleep(delay).await;
                (status, body)
            }
            Behaviour::Hang => std::future::pending().await,
            Behaviour::Fail(error) => return Err(error),
        };

        Ok(RawResponse::new(status, url).with_body(body))
    }
}
