use super::gate::ReadinessGate;
use super::provider::{ActiveWallet, ProviderSelector};
use crate::config::BridgeConfig;
use crate::domain::message::BufferedMessage;
use crate::domain::payment::{
    PaymentConfig, PaymentRequest, TokenAmount, TransferCall, TxSubmission,
};
use crate::domain::ports::{PaymentConfigSourceBox, WalletProvider};
use crate::error::{PaymentError, ProviderError};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

pub const METHOD_TX_SUBMITTED: &str = "OnWebGLTxSubmitted";
pub const METHOD_STORE_ERROR: &str = "ShowStoreError";

/// Runs stablecoin purchases end to end.
///
/// A purchase is a straight line: discover provider, check the connected wallet
/// against the host's active wallet, load the payment config, resolve the token,
/// switch chain if needed, encode the amount, submit the transfer. The first
/// failing step aborts; nothing is retried. The outcome is reported to the host
/// store exactly once.
///
/// Concurrent purchases are not serialized; they share the config cache and the
/// active wallet.
pub struct PaymentFlow {
    gate: Arc<ReadinessGate>,
    selector: Arc<ProviderSelector>,
    active_wallet: Arc<ActiveWallet>,
    source: PaymentConfigSourceBox,
    cache: OnceCell<PaymentConfig>,
    config: BridgeConfig,
}

impl PaymentFlow {
    pub fn new(
        gate: Arc<ReadinessGate>,
        selector: Arc<ProviderSelector>,
        active_wallet: Arc<ActiveWallet>,
        source: PaymentConfigSourceBox,
        config: &BridgeConfig,
    ) -> Self {
        Self {
            gate,
            selector,
            active_wallet,
            source,
            cache: OnceCell::new(),
            config: config.clone(),
        }
    }

    /// Executes a purchase and reports the outcome to the host store.
    pub async fn pay(&self, request: PaymentRequest) -> Result<TxSubmission, PaymentError> {
        info!(
            sku = %request.sku,
            amount = %request.amount,
            token = %request.token_symbol,
            chain_id = request.chain_id,
            "Payment requested"
        );

        let outcome = self.execute(&request).await;
        match &outcome {
            Ok(submission) => match serde_json::to_string(submission) {
                Ok(body) => self.report(METHOD_TX_SUBMITTED, body),
                Err(e) => error!(error = %e, "Failed to encode transaction submission"),
            },
            Err(e) => {
                error!(sku = %request.sku, error = %e, "Payment failed");
                self.report(METHOD_STORE_ERROR, e.user_message().to_string());
            }
        }
        outcome
    }

    /// The cached payment config, fetching it on first use.
    ///
    /// Failed fetches leave the cache empty so the next purchase tries again.
    pub async fn payment_config(&self) -> Result<&PaymentConfig, PaymentError> {
        self.cache.get_or_try_init(|| self.source.fetch()).await
    }

    async fn execute(&self, request: &PaymentRequest) -> Result<TxSubmission, PaymentError> {
        let provider = self.selector.discover(request.chain_id).await?;

        self.check_wallet(provider.as_ref()).await?;

        let config = self.payment_config().await?;
        let token = config
            .token_address(request.chain_id, &request.token_symbol)
            .ok_or_else(|| PaymentError::UnsupportedToken {
                chain_id: request.chain_id,
                symbol: request.token_symbol.clone(),
            })?
            .to_string();

        self.ensure_chain(provider.as_ref(), request).await?;

        let decimals = self.config.decimals_for(request.chain_id);
        let amount = TokenAmount::parse_units(&request.amount, decimals)?;

        info!(
            token = %token,
            amount = %amount,
            treasury = %config.treasury,
            "Sending stablecoin payment"
        );
        let hash = provider
            .transfer(TransferCall {
                token,
                to: config.treasury.clone(),
                amount,
            })
            .await
            .map_err(|e| PaymentError::TransferFailed(e.message))?;
        info!(hash = %hash, "Transaction sent");

        Ok(TxSubmission {
            sku: request.sku.clone(),
            hash,
            chain_id: request.chain_id,
            token: request.token_symbol.clone(),
        })
    }

    async fn check_wallet(&self, provider: &dyn WalletProvider) -> Result<(), PaymentError> {
        let connected = provider
            .request_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::new("No accounts returned by wallet"))?
            .to_lowercase();

        if let Some(active) = self.active_wallet.get()
            && active != connected
        {
            warn!(connected = %connected, active = %active, "Wallet mismatch");
            return Err(PaymentError::WalletMismatch { connected, active });
        }
        Ok(())
    }

    async fn ensure_chain(
        &self,
        provider: &dyn WalletProvider,
        request: &PaymentRequest,
    ) -> Result<(), PaymentError> {
        let current = provider.chain_id().await?;
        let wanted = request.chain_hex();
        if current.eq_ignore_ascii_case(&wanted) {
            return Ok(());
        }

        warn!(from = %current, to = %wanted, "Switching chain");
        provider.switch_chain(&wanted).await.map_err(|e| {
            error!(error = %e, "Cannot switch chain");
            PaymentError::ChainSwitchFailed {
                chain: wanted.clone(),
                reason: e.message,
            }
        })
    }

    fn report(&self, method: &str, body: String) {
        self.gate
            .enqueue_or_deliver(BufferedMessage::new(&self.config.store_object, method, body));
    }
}
