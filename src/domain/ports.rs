use super::payment::{PaymentConfig, TransferCall};
use crate::error::{PaymentError, ProviderError, Result};
use async_trait::async_trait;
use serde_json::Value;

/// The host runtime's message channel (`SendMessage(object, method, body)`).
pub trait HostRuntime: Send + Sync {
    /// Whether the host has exposed its message function yet.
    fn is_available(&self) -> bool {
        true
    }

    fn deliver(&self, target: &str, method: &str, body: &str) -> Result<()>;
}

/// Outbound half of the lobby socket.
pub trait Transport: Send + Sync {
    fn emit(&self, event: &str, payload: Value) -> Result<()>;
    fn disconnect(&self);
}

/// The EIP-1193 subset the payment flow uses.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// `eth_requestAccounts`
    async fn request_accounts(&self) -> std::result::Result<Vec<String>, ProviderError>;
    /// `eth_chainId`, hex encoded.
    async fn chain_id(&self) -> std::result::Result<String, ProviderError>;
    /// `wallet_switchEthereumChain`
    async fn switch_chain(&self, chain_hex: &str) -> std::result::Result<(), ProviderError>;
    /// `personal_sign`
    async fn personal_sign(
        &self,
        message: &str,
        from: &str,
    ) -> std::result::Result<String, ProviderError>;
    /// Signs and sends an ERC-20 transfer, returning the transaction hash.
    async fn transfer(&self, call: TransferCall) -> std::result::Result<String, ProviderError>;
}

/// Options for initialising the multi-chain connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorOptions {
    pub project_id: String,
    pub chains: Vec<u64>,
    pub optional_chains: Vec<u64>,
    pub show_qr_modal: bool,
}

/// What the page offers for reaching a wallet.
#[async_trait]
pub trait ProviderEnvironment: Send + Sync {
    fn user_agent(&self) -> String;
    /// The wallet injected into the page, if any.
    fn injected_provider(&self) -> Option<WalletProviderRef>;
    /// Whether the connector library has been loaded.
    fn has_connector(&self) -> bool;
    async fn init_connector(
        &self,
        options: ConnectorOptions,
    ) -> std::result::Result<WalletProviderRef, ProviderError>;
}

/// Source of the remote payment configuration.
#[async_trait]
pub trait PaymentConfigSource: Send + Sync {
    async fn fetch(&self) -> std::result::Result<PaymentConfig, PaymentError>;
}

pub type HostRuntimeBox = Box<dyn HostRuntime>;
pub type TransportBox = Box<dyn Transport>;
pub type WalletProviderRef = std::sync::Arc<dyn WalletProvider>;
pub type ProviderEnvironmentBox = Box<dyn ProviderEnvironment>;
pub type PaymentConfigSourceBox = Box<dyn PaymentConfigSource>;
