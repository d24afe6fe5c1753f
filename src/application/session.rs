use super::gate::ReadinessGate;
use super::payment::PaymentFlow;
use super::provider::{ActiveWallet, ProviderSelector};
use super::relay::EventRelay;
use super::wallet::WalletOps;
use crate::config::BridgeConfig;
use crate::domain::event::LifecycleEvent;
use crate::domain::message::BufferedMessage;
use crate::domain::payment::{PaymentRequest, TxSubmission};
use crate::domain::ports::{
    HostRuntimeBox, PaymentConfigSourceBox, ProviderEnvironmentBox, Transport, TransportBox,
};
use crate::error::{BridgeError, PaymentError, Result};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// Everything one game session needs, owned in one place.
///
/// Built when the page boots and torn down with [`shutdown`]. The host talks to it
/// through the entry points below; the socket glue feeds it events and lifecycle
/// signals.
///
/// [`shutdown`]: BridgeSession::shutdown
pub struct BridgeSession {
    gate: Arc<ReadinessGate>,
    relay: EventRelay,
    payments: PaymentFlow,
    wallet: WalletOps,
    active_wallet: Arc<ActiveWallet>,
    transport: Mutex<Option<Arc<dyn Transport>>>,
}

impl BridgeSession {
    pub fn new(
        config: BridgeConfig,
        host: HostRuntimeBox,
        transport: Option<TransportBox>,
        environment: ProviderEnvironmentBox,
        config_source: PaymentConfigSourceBox,
    ) -> Self {
        let gate = Arc::new(ReadinessGate::new(host));
        let selector = Arc::new(ProviderSelector::new(
            environment,
            config.connector_project_id.clone(),
        ));
        let active_wallet = Arc::new(ActiveWallet::new());

        let relay = EventRelay::new(Arc::clone(&gate), &config);
        let payments = PaymentFlow::new(
            Arc::clone(&gate),
            Arc::clone(&selector),
            Arc::clone(&active_wallet),
            config_source,
            &config,
        );
        let wallet = WalletOps::new(Arc::clone(&gate), selector);

        info!(socket_url = %config.socket_url, "Bridge session started");
        Self {
            gate,
            relay,
            payments,
            wallet,
            active_wallet,
            transport: Mutex::new(transport.map(Arc::from)),
        }
    }

    fn transport_slot(&self) -> MutexGuard<'_, Option<Arc<dyn Transport>>> {
        self.transport.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A handle to the transport, taken without keeping the slot locked so host
    /// or transport callbacks may re-enter the session.
    fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.transport_slot().clone()
    }

    /// The host finished loading and can receive messages.
    pub fn runtime_ready(&self) {
        self.gate.mark_ready();
    }

    pub fn set_active_wallet(&self, address: &str) {
        self.active_wallet.set(address);
    }

    pub fn active_wallet(&self) -> Option<String> {
        self.active_wallet.get()
    }

    /// Forwards a host event to the lobby server.
    ///
    /// `json` may be empty, meaning `{}`. Failures are logged and returned; they
    /// never reach the host.
    pub fn emit(&self, event: &str, json: &str) -> Result<()> {
        let result = self.try_emit(event, json);
        if let Err(e) = &result {
            warn!(event, error = %e, "Emit failed");
        }
        result
    }

    fn try_emit(&self, event: &str, json: &str) -> Result<()> {
        let payload: Value = if json.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(json)?
        };
        let transport = self
            .transport()
            .ok_or_else(|| BridgeError::TransportError("socket not initialized".to_string()))?;
        info!(event, payload = %payload, "Emit");
        transport.emit(event, payload)
    }

    /// Disconnects and forgets the transport. Safe to call repeatedly.
    pub fn close(&self) {
        let transport = self.transport_slot().take();
        if let Some(transport) = transport {
            info!("Closing socket connection");
            transport.disconnect();
        }
    }

    pub async fn pay(&self, request: PaymentRequest) -> std::result::Result<TxSubmission, PaymentError> {
        self.payments.pay(request).await
    }

    pub async fn get_address(&self, reply_to: &str) -> std::result::Result<String, PaymentError> {
        self.wallet.get_address(reply_to).await
    }

    pub async fn sign_message(
        &self,
        reply_to: &str,
        message: &str,
    ) -> std::result::Result<String, PaymentError> {
        self.wallet.sign_message(reply_to, message).await
    }

    pub fn on_event(&self, name: &str, payload: Value) {
        self.relay.on_event(name, payload);
    }

    pub fn on_lifecycle(&self, event: LifecycleEvent) {
        let transport = self.transport();
        self.relay.on_lifecycle(event, transport.as_deref());
    }

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    pub fn pending(&self) -> usize {
        self.gate.pending()
    }

    /// Ends the session: closes the socket and returns messages the host never
    /// became ready to receive.
    pub fn shutdown(self) -> Vec<BufferedMessage> {
        self.close();
        let undelivered = self.gate.drain_pending();
        if !undelivered.is_empty() {
            warn!(count = undelivered.len(), "Session ended with undelivered host messages");
        }
        info!("Bridge session ended");
        undelivered
    }
}
