use super::gate::ReadinessGate;
use crate::config::{BridgeConfig, DIAGNOSTIC_ACK_EVENT, DIAGNOSTIC_EVENT};
use crate::domain::event::{LifecycleEvent, RelayEvent};
use crate::domain::message::BufferedMessage;
use crate::domain::ports::Transport;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Routes lobby server events to the host through the readiness gate.
///
/// Priority events reach both the lobby handler and the socket handler; every
/// other event only reaches the socket handler.
pub struct EventRelay {
    gate: Arc<ReadinessGate>,
    config: BridgeConfig,
}

impl EventRelay {
    pub fn new(gate: Arc<ReadinessGate>, config: &BridgeConfig) -> Self {
        Self {
            gate,
            config: config.clone(),
        }
    }

    /// Handles a server-pushed event.
    ///
    /// Acknowledgements of the connect diagnostic are logged and swallowed.
    pub fn on_event(&self, name: &str, payload: Value) {
        if name == DIAGNOSTIC_ACK_EVENT {
            info!(payload = %payload, "Server acknowledged client hello");
            return;
        }
        self.relay(RelayEvent::decode(name, payload));
    }

    /// Relays a locally synthesized lifecycle event.
    ///
    /// On `Connected` a `client_hello` diagnostic goes out on `transport`.
    pub fn on_lifecycle(&self, event: LifecycleEvent, transport: Option<&dyn Transport>) {
        match &event {
            LifecycleEvent::Connected { socket_id } => {
                info!(socket_id = %socket_id, "Socket connected");
                self.send_hello(transport);
            }
            LifecycleEvent::Disconnected { reason } => warn!(reason = %reason, "Socket disconnected"),
            LifecycleEvent::ConnectError { message } => {
                warn!(error = %message, "Socket connection error")
            }
            LifecycleEvent::ReconnectAttempt { attempt } => {
                info!(attempt, "Socket reconnect attempt")
            }
            LifecycleEvent::ReconnectFailed => warn!("Socket reconnect attempts exhausted"),
        }
        self.relay(RelayEvent::Lifecycle(event));
    }

    pub fn relay(&self, event: RelayEvent) {
        let priority = self.config.is_priority(event.name());
        let body = event.into_envelope().to_host_body();
        debug!(body = %body, priority, "Relaying event");

        if priority {
            self.gate
                .enqueue_or_deliver(BufferedMessage::to(&self.config.lobby_target, body.clone()));
        }
        self.gate
            .enqueue_or_deliver(BufferedMessage::to(&self.config.socket_target, body));

        // Redundant with mark_ready, kept so the buffer also drains on traffic.
        self.gate.flush();
    }

    fn send_hello(&self, transport: Option<&dyn Transport>) {
        let Some(transport) = transport else {
            warn!("Connected without a transport, skipping client hello");
            return;
        };
        let payload = json!({
            "platform": "webgl",
            "version": env!("CARGO_PKG_VERSION"),
        });
        if let Err(e) = transport.emit(DIAGNOSTIC_EVENT, payload) {
            warn!(error = %e, "Failed to send client hello");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::{InMemoryTransport, RecordingHost};

    fn setup() -> (RecordingHost, Arc<ReadinessGate>, EventRelay) {
        let host = RecordingHost::new();
        let gate = Arc::new(ReadinessGate::new(Box::new(host.clone())));
        let relay = EventRelay::new(Arc::clone(&gate), &BridgeConfig::default());
        (host, gate, relay)
    }

    #[test]
    fn test_priority_event_goes_to_two_targets() {
        let (host, gate, relay) = setup();
        gate.mark_ready();

        relay.on_event("lobby_state", json!({ "players": 2 }));

        let deliveries = host.deliveries();
        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[0].target, "LobbyManager");
        assert_eq!(deliveries[0].method, "OnLobbyEvent");
        assert_eq!(deliveries[1].target, "SocketManager");
        assert_eq!(deliveries[1].method, "OnSocketMessage");
        assert_eq!(deliveries[0].body, r#"lobby_state|{"players":2}"#);
        assert_eq!(deliveries[0].body, deliveries[1].body);
    }

    #[test]
    fn test_other_event_goes_to_fallback_only() {
        let (host, gate, relay) = setup();
        gate.mark_ready();

        relay.on_event("chat_message", json!({ "text": "gg" }));

        let deliveries = host.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].target, "SocketManager");
        assert_eq!(deliveries[0].body, r#"chat_message|{"text":"gg"}"#);
    }

    #[test]
    fn test_events_before_ready_are_buffered() {
        let (host, gate, relay) = setup();

        relay.on_event("game_start", Value::Null);
        relay.on_event("chat_message", json!({}));
        assert!(host.deliveries().is_empty());
        assert_eq!(gate.pending(), 3);

        gate.mark_ready();
        let bodies: Vec<String> = host.deliveries().into_iter().map(|m| m.body).collect();
        assert_eq!(
            bodies,
            vec!["game_start|{}", "game_start|{}", "chat_message|{}"]
        );
    }

    #[test]
    fn test_connected_sends_hello_and_relays() {
        let (host, gate, relay) = setup();
        gate.mark_ready();
        let transport = InMemoryTransport::new();

        relay.on_lifecycle(
            LifecycleEvent::Connected {
                socket_id: "abc".to_string(),
            },
            Some(&transport),
        );

        let emitted = transport.emitted();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].0, DIAGNOSTIC_EVENT);
        assert_eq!(emitted[0].1["platform"], "webgl");
        assert_eq!(
            host.deliveries_to("SocketManager", "OnSocketMessage"),
            vec![r#"connected|{"id":"abc"}"#.to_string()]
        );
    }

    #[test]
    fn test_hello_ack_is_not_relayed() {
        let (host, gate, relay) = setup();
        gate.mark_ready();

        relay.on_event(DIAGNOSTIC_ACK_EVENT, json!({ "ok": true }));

        assert!(host.deliveries().is_empty());
    }

    #[test]
    fn test_lifecycle_routing_follows_allow_list() {
        let host = RecordingHost::new();
        let gate = Arc::new(ReadinessGate::new(Box::new(host.clone())));
        let config = BridgeConfig::default().with_priority_events(["disconnected"]);
        let relay = EventRelay::new(Arc::clone(&gate), &config);
        gate.mark_ready();

        relay.on_lifecycle(
            LifecycleEvent::Disconnected {
                reason: "io server disconnect".to_string(),
            },
            None,
        );

        assert_eq!(host.deliveries().len(), 2);
    }
}
