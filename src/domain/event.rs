use serde_json::{Value, json};

/// A named event with its JSON payload, as pushed by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    pub name: String,
    pub payload: Value,
}

impl EventEnvelope {
    pub fn new(name: impl Into<String>, payload: Value) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Serializes to the host wire form `"<name>|<json>"`.
    ///
    /// An absent (`null`) payload is written as `{}`.
    pub fn to_host_body(&self) -> String {
        let json = if self.payload.is_null() {
            "{}".to_string()
        } else {
            self.payload.to_string()
        };
        format!("{}|{}", self.name, json)
    }
}

/// Connection lifecycle signals synthesized locally by the transport glue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Connected { socket_id: String },
    Disconnected { reason: String },
    ConnectError { message: String },
    ReconnectAttempt { attempt: u32 },
    ReconnectFailed,
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Connected { .. } => "connected",
            LifecycleEvent::Disconnected { .. } => "disconnected",
            LifecycleEvent::ConnectError { .. } => "connect_error",
            LifecycleEvent::ReconnectAttempt { .. } => "reconnect_attempt",
            LifecycleEvent::ReconnectFailed => "reconnect_failed",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            LifecycleEvent::Connected { socket_id } => json!({ "id": socket_id }),
            LifecycleEvent::Disconnected { reason } => json!({ "reason": reason }),
            LifecycleEvent::ConnectError { message } => json!({ "message": message }),
            LifecycleEvent::ReconnectAttempt { attempt } => json!({ "attempt": attempt }),
            LifecycleEvent::ReconnectFailed => json!({}),
        }
    }
}

/// An event at the relay boundary, decoded once.
///
/// Known lobby events keep their payload as-is; anything else travels in
/// [`RelayEvent::Other`] so new server events reach the host without a bridge
/// release.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    LobbyState(Value),
    Countdown(Value),
    GameStart(Value),
    ErrorToast(Value),
    Lifecycle(LifecycleEvent),
    Other(EventEnvelope),
}

impl RelayEvent {
    pub fn decode(name: &str, payload: Value) -> Self {
        match name {
            "lobby_state" => RelayEvent::LobbyState(payload),
            "lobby_countdown" => RelayEvent::Countdown(payload),
            "game_start" => RelayEvent::GameStart(payload),
            "error_toast" => RelayEvent::ErrorToast(payload),
            _ => RelayEvent::Other(EventEnvelope::new(name, payload)),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            RelayEvent::LobbyState(_) => "lobby_state",
            RelayEvent::Countdown(_) => "lobby_countdown",
            RelayEvent::GameStart(_) => "game_start",
            RelayEvent::ErrorToast(_) => "error_toast",
            RelayEvent::Lifecycle(event) => event.name(),
            RelayEvent::Other(envelope) => &envelope.name,
        }
    }

    pub fn into_envelope(self) -> EventEnvelope {
        let name = self.name().to_string();
        match self {
            RelayEvent::LobbyState(payload)
            | RelayEvent::Countdown(payload)
            | RelayEvent::GameStart(payload)
            | RelayEvent::ErrorToast(payload) => EventEnvelope::new(name, payload),
            RelayEvent::Lifecycle(event) => EventEnvelope::new(name, event.payload()),
            RelayEvent::Other(envelope) => envelope,
        }
    }
}
