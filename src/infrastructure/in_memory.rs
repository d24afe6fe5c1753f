use crate::domain::message::BufferedMessage;
use crate::domain::payment::PaymentConfig;
use crate::domain::ports::{
    ConnectorOptions, HostRuntime, PaymentConfigSource, ProviderEnvironment, Transport,
    WalletProviderRef,
};
use crate::error::{BridgeError, PaymentError, ProviderError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;

/// A host runtime that records every delivery in memory.
///
/// Clones share the same log, so a test (or the replay CLI) can hand one clone to
/// the session and read deliveries back through another.
#[derive(Clone)]
pub struct RecordingHost {
    deliveries: Arc<Mutex<Vec<BufferedMessage>>>,
    available: Arc<AtomicBool>,
    fail_on: Option<String>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            deliveries: Arc::default(),
            available: Arc::new(AtomicBool::new(true)),
            fail_on: None,
        }
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes deliveries whose body equals `body` fail.
    #[must_use]
    pub fn failing_on(mut self, body: impl Into<String>) -> Self {
        self.fail_on = Some(body.into());
        self
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Snapshot of everything delivered so far, in order.
    pub fn deliveries(&self) -> Vec<BufferedMessage> {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn deliveries_to(&self, target: &str, method: &str) -> Vec<String> {
        self.deliveries()
            .into_iter()
            .filter(|m| m.target == target && m.method == method)
            .map(|m| m.body)
            .collect()
    }
}

impl HostRuntime for RecordingHost {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn deliver(&self, target: &str, method: &str, body: &str) -> Result<()> {
        if self.fail_on.as_deref() == Some(body) {
            return Err(BridgeError::DeliveryFailed {
                target: target.to_string(),
                method: method.to_string(),
                reason: "host rejected message".to_string(),
            });
        }
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(BufferedMessage::new(target, method, body));
        Ok(())
    }
}

/// A transport that records outbound events instead of sending them.
#[derive(Clone)]
pub struct InMemoryTransport {
    emitted: Arc<Mutex<Vec<(String, Value)>>>,
    connected: Arc<AtomicBool>,
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self {
            emitted: Arc::default(),
            connected: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> Vec<(String, Value)> {
        self.emitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Transport for InMemoryTransport {
    fn emit(&self, event: &str, payload: Value) -> Result<()> {
        if !self.is_connected() {
            return Err(BridgeError::TransportError("socket disconnected".to_string()));
        }
        self.emitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((event.to_string(), payload));
        Ok(())
    }

    fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

/// A payment config source serving a fixed response and counting fetches.
#[derive(Clone)]
pub struct StaticConfigSource {
    response: Arc<RwLock<std::result::Result<PaymentConfig, PaymentError>>>,
    fetches: Arc<AtomicUsize>,
}

impl StaticConfigSource {
    pub fn new(config: PaymentConfig) -> Self {
        Self::with_result(Ok(config))
    }

    pub fn failing(error: PaymentError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(result: std::result::Result<PaymentConfig, PaymentError>) -> Self {
        Self {
            response: Arc::new(RwLock::new(result)),
            fetches: Arc::default(),
        }
    }

    /// Swaps the served response, e.g. to model the server being fixed.
    pub async fn set_response(&self, result: std::result::Result<PaymentConfig, PaymentError>) {
        *self.response.write().await = result;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentConfigSource for StaticConfigSource {
    async fn fetch(&self) -> std::result::Result<PaymentConfig, PaymentError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.response.read().await.clone()
    }
}

/// A page with no wallet at all, as seen by a headless replay.
pub struct HeadlessEnvironment {
    user_agent: String,
}

impl HeadlessEnvironment {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

impl Default for HeadlessEnvironment {
    fn default() -> Self {
        Self::new(concat!("cardito-bridge/", env!("CARGO_PKG_VERSION")))
    }
}

#[async_trait]
impl ProviderEnvironment for HeadlessEnvironment {
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn injected_provider(&self) -> Option<WalletProviderRef> {
        None
    }

    fn has_connector(&self) -> bool {
        false
    }

    async fn init_connector(
        &self,
        _options: ConnectorOptions,
    ) -> std::result::Result<WalletProviderRef, ProviderError> {
        Err(ProviderError::new("connector library not loaded"))
    }
}
