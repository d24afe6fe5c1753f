use super::gate::ReadinessGate;
use super::provider::ProviderSelector;
use crate::config::DEFAULT_CHAIN_ID;
use crate::domain::message::BufferedMessage;
use crate::error::{PaymentError, ProviderError};
use std::sync::Arc;
use tracing::{error, info};

pub const METHOD_ADDRESS: &str = "OnWeb3Address";
pub const METHOD_SIGNATURE: &str = "OnWeb3Signature";
pub const METHOD_WEB3_ERROR: &str = "OnWeb3Error";

const FALLBACK_CONNECT_ERROR: &str = "Wallet connection failed";

/// Account requests from host objects: connect (get address) and sign.
///
/// Replies go to the requesting object through the gate.
pub struct WalletOps {
    gate: Arc<ReadinessGate>,
    selector: Arc<ProviderSelector>,
}

impl WalletOps {
    pub fn new(gate: Arc<ReadinessGate>, selector: Arc<ProviderSelector>) -> Self {
        Self { gate, selector }
    }

    pub async fn get_address(&self, reply_to: &str) -> Result<String, PaymentError> {
        let result = self.first_account().await;
        match &result {
            Ok(address) => {
                info!(address = %address, "Wallet address");
                self.reply(reply_to, METHOD_ADDRESS, address.clone());
            }
            Err(e) => {
                error!(error = %e, "Get address failed");
                let text = e.to_string();
                let text = if text.is_empty() {
                    FALLBACK_CONNECT_ERROR.to_string()
                } else {
                    text
                };
                self.reply(reply_to, METHOD_WEB3_ERROR, text);
            }
        }
        result
    }

    pub async fn sign_message(&self, reply_to: &str, message: &str) -> Result<String, PaymentError> {
        let result = self.sign(message).await;
        match &result {
            Ok(signature) => {
                info!(signature = %signature, "Message signed");
                self.reply(reply_to, METHOD_SIGNATURE, signature.clone());
            }
            Err(e) => {
                error!(error = %e, "Sign message failed");
                self.reply(reply_to, METHOD_WEB3_ERROR, e.to_string());
            }
        }
        result
    }

    async fn first_account(&self) -> Result<String, PaymentError> {
        let provider = self.selector.discover(DEFAULT_CHAIN_ID).await?;
        provider
            .request_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::new("No accounts returned by wallet").into())
    }

    async fn sign(&self, message: &str) -> Result<String, PaymentError> {
        let provider = self.selector.discover(DEFAULT_CHAIN_ID).await?;
        let from = provider
            .request_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::new("No accounts returned by wallet"))?;
        Ok(provider.personal_sign(message, &from).await?)
    }

    fn reply(&self, reply_to: &str, method: &str, body: String) {
        self.gate
            .enqueue_or_deliver(BufferedMessage::new(reply_to, method, body));
    }
}
