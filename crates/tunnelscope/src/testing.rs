//! In-process gateway double for unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::SecretString;

use tunnelscope_client::{ClientError, GatewayApi};

/// Canned answer for one gateway operation.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Success; the payload is the TCP endpoint for `resolve_tcp_url`.
    Ok(String),
    Rejected(u16, String),
    Unreachable,
    /// Never answers.
    Hang,
}

impl Reply {
    async fn into_result(self) -> Result<String, ClientError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Rejected(status, message) => {
                Err(ClientError::GatewayRejected { status, message })
            }
            Self::Unreachable => {
                let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
                Err(ClientError::SerializationError(decode))
            }
            Self::Hang => std::future::pending().await,
        }
    }
}

#[derive(Clone)]
pub struct FakeGateway {
    validate: Arc<Mutex<Reply>>,
    resolve: Arc<Mutex<Reply>>,
    validate_calls: Arc<AtomicUsize>,
    resolve_calls: Arc<AtomicUsize>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            validate: Arc::new(Mutex::new(Reply::Ok(String::new()))),
            resolve: Arc::new(Mutex::new(Reply::Ok("0.tcp.ngrok.io:12345".to_string()))),
            validate_calls: Arc::new(AtomicUsize::new(0)),
            resolve_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FakeGateway {
    pub fn with_validate(self, reply: Reply) -> Self {
        self.set_validate(reply);
        self
    }

    pub fn with_resolve(self, reply: Reply) -> Self {
        self.set_resolve(reply);
        self
    }

    pub fn set_validate(&self, reply: Reply) {
        *self.validate.lock().unwrap() = reply;
    }

    pub fn set_resolve(&self, reply: Reply) {
        *self.resolve.lock().unwrap() = reply;
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GatewayApi for FakeGateway {
    async fn validate_key(&self, _api_key: &SecretString) -> Result<(), ClientError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.validate.lock().unwrap().clone();
        reply.into_result().await.map(|_| ())
    }

    async fn resolve_tcp_url(&self, _api_key: &SecretString) -> Result<String, ClientError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.resolve.lock().unwrap().clone();
        reply.into_result().await
    }
}
