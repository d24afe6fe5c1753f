//! Session configuration.
//!
//! [`BridgeConfig`] carries every tunable the bridge needs: where the lobby server
//! lives, which host objects receive relayed traffic, which events are routed to the
//! lobby handler, and the per-chain token precision table used for payments.

use std::collections::{HashMap, HashSet};

use crate::domain::message::HostTarget;

/// Default lobby server; the payment config lives under the same origin.
pub const DEFAULT_SOCKET_URL: &str = "https://api.cardito.app";

/// Path of the payment configuration endpoint, relative to the socket URL.
pub const PAYMENT_CONFIG_PATH: &str = "/config/payments";

/// Precision used when a chain is missing from the decimals table.
pub const DEFAULT_TOKEN_DECIMALS: u32 = 6;

pub const DEFAULT_CHAIN_ID: u64 = 1;
pub const DEFAULT_TOKEN_SYMBOL: &str = "USDC";

/// Events delivered to the lobby handler in addition to the generic socket handler.
pub const DEFAULT_PRIORITY_EVENTS: [&str; 4] =
    ["lobby_state", "lobby_countdown", "game_start", "error_toast"];

pub const DIAGNOSTIC_EVENT: &str = "client_hello";
pub const DIAGNOSTIC_ACK_EVENT: &str = "client_hello_ack";

/// One stablecoin per chain; values are the token's ERC-20 decimals.
const TOKEN_DECIMALS: [(u64, u32); 6] = [
    (1, 6),      // Ethereum USDC
    (56, 18),    // BNB Chain USDT
    (146, 6),    // Sonic
    (137, 6),    // Polygon USDT
    (8453, 6),   // Base USDC
    (42161, 6),  // Arbitrum USDC
];

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Base URL of the lobby server.
    pub socket_url: String,
    /// Project id passed to the multi-chain connector on mobile.
    pub connector_project_id: String,
    /// Events routed to both the lobby handler and the socket handler.
    pub priority_events: HashSet<String>,
    /// Catch-all receiver of every relayed event.
    pub socket_target: HostTarget,
    /// Receiver of priority lobby events.
    pub lobby_target: HostTarget,
    /// Host object receiving payment outcomes.
    pub store_object: String,
    /// Token decimals keyed by chain id.
    pub token_decimals: HashMap<u64, u32>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            socket_url: DEFAULT_SOCKET_URL.to_string(),
            connector_project_id: "7a03ac67d724cd7a88e72da1ec30c7f6".to_string(),
            priority_events: DEFAULT_PRIORITY_EVENTS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            socket_target: HostTarget::new("SocketManager", "OnSocketMessage"),
            lobby_target: HostTarget::new("LobbyManager", "OnLobbyEvent"),
            store_object: "StoreManager".to_string(),
            token_decimals: TOKEN_DECIMALS.into_iter().collect(),
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_socket_url(mut self, url: impl Into<String>) -> Self {
        self.socket_url = url.into();
        self
    }

    #[must_use]
    pub fn with_connector_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.connector_project_id = project_id.into();
        self
    }

    /// Replaces the priority allow-list.
    #[must_use]
    pub fn with_priority_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority_events = events.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_token_decimals(mut self, chain_id: u64, decimals: u32) -> Self {
        self.token_decimals.insert(chain_id, decimals);
        self
    }

    /// Decimals of the payment token on `chain_id`, falling back to
    /// [`DEFAULT_TOKEN_DECIMALS`].
    pub fn decimals_for(&self, chain_id: u64) -> u32 {
        self.token_decimals
            .get(&chain_id)
            .copied()
            .unwrap_or(DEFAULT_TOKEN_DECIMALS)
    }

    /// Full URL of the payment configuration endpoint.
    pub fn payment_config_url(&self) -> String {
        format!(
            "{}{}",
            self.socket_url.trim_end_matches('/'),
            PAYMENT_CONFIG_PATH
        )
    }

    pub fn is_priority(&self, event_name: &str) -> bool {
        self.priority_events.contains(event_name)
    }
}
