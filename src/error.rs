use thiserror::Error;

/// Errors raised by the relay side of the bridge (host delivery, transport, scripts).
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Delivery to {target}.{method} failed: {reason}")]
    DeliveryFailed {
        target: String,
        method: String,
        reason: String,
    },
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("Invalid JSON payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Script error: {0}")]
    ScriptError(String),
    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),
}

/// An error reported by a wallet provider.
///
/// Providers surface free-form text (JSON-RPC messages, wallet UI rejections), so the
/// message is kept verbatim and later classified by [`PaymentError::user_message`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failures of the payment and wallet flows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    #[error("No Web3 provider available (injected wallet or connector)")]
    NoProviderAvailable,
    #[error("Wallet mismatch: connected {connected}, active {active}")]
    WalletMismatch { connected: String, active: String },
    #[error("payment_config_invalid: {0}")]
    ConfigInvalid(String),
    #[error("Token {symbol} not supported on chain {chain_id}")]
    UnsupportedToken { chain_id: u64, symbol: String },
    #[error("Cannot switch chain to {chain}: {reason}")]
    ChainSwitchFailed { chain: String, reason: String },
    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount { amount: String, reason: String },
    #[error("{0}")]
    Provider(#[from] ProviderError),
    #[error("{0}")]
    TransferFailed(String),
}

pub const MSG_WALLET_MISMATCH: &str = "Your connected wallet does not match the active wallet.";
pub const MSG_UNSUPPORTED_TOKEN: &str = "Token not supported on this chain.";
pub const MSG_SWITCH_NETWORK: &str = "Please switch network in your wallet.";
pub const MSG_NETWORK_CHANGED: &str =
    "Your wallet switched networks. Please switch back and try again.";
pub const MSG_INSUFFICIENT: &str = "Not enough balance for this purchase.";
pub const MSG_REJECTED: &str = "Transaction was rejected.";
pub const MSG_NETWORK_MISMATCH: &str = "Network mismatch. Please change your network in wallet.";
pub const MSG_GENERIC: &str = "Payment failed. Please try again.";

impl PaymentError {
    /// The prose shown to the player for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            PaymentError::WalletMismatch { .. } => MSG_WALLET_MISMATCH,
            PaymentError::UnsupportedToken { .. } => MSG_UNSUPPORTED_TOKEN,
            PaymentError::ChainSwitchFailed { .. } => MSG_SWITCH_NETWORK,
            PaymentError::NoProviderAvailable
            | PaymentError::ConfigInvalid(_)
            | PaymentError::InvalidAmount { .. } => MSG_GENERIC,
            PaymentError::Provider(err) => classify_failure(&err.message),
            PaymentError::TransferFailed(raw) => classify_failure(raw),
        }
    }
}

/// Maps raw error text onto a user-facing message.
///
/// Order matters: "underlying network changed" must win over the generic
/// "network" match.
pub fn classify_failure(raw: &str) -> &'static str {
    if raw.contains("underlying network changed") {
        MSG_NETWORK_CHANGED
    } else if raw.contains("insufficient") || raw.contains("exceeds balance") {
        MSG_INSUFFICIENT
    } else if raw.contains("user rejected") {
        MSG_REJECTED
    } else if raw.contains("network") || raw.contains("chain") {
        MSG_NETWORK_MISMATCH
    } else {
        MSG_GENERIC
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
