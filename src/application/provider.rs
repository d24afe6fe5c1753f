use crate::domain::payment::is_mobile_user_agent;
use crate::domain::ports::{ConnectorOptions, ProviderEnvironmentBox, WalletProviderRef};
use crate::error::PaymentError;
use std::sync::{Mutex, PoisonError};
use tracing::{info, warn};

/// Picks the wallet channel for the current page.
///
/// Desktop browsers with an injected wallet use it directly. Mobile browsers use
/// the multi-chain connector in deep-link mode (no QR modal). Anything else has no
/// provider.
pub struct ProviderSelector {
    environment: ProviderEnvironmentBox,
    project_id: String,
}

impl ProviderSelector {
    pub fn new(environment: ProviderEnvironmentBox, project_id: impl Into<String>) -> Self {
        Self {
            environment,
            project_id: project_id.into(),
        }
    }

    pub async fn discover(&self, chain_id: u64) -> Result<WalletProviderRef, PaymentError> {
        let mobile = is_mobile_user_agent(&self.environment.user_agent());

        if !mobile && let Some(provider) = self.environment.injected_provider() {
            info!("Using injected provider (desktop)");
            return Ok(provider);
        }

        if mobile && self.environment.has_connector() {
            info!(chain_id, "Using connector provider");
            let options = ConnectorOptions {
                project_id: self.project_id.clone(),
                chains: vec![chain_id],
                optional_chains: vec![chain_id],
                show_qr_modal: false,
            };
            return self
                .environment
                .init_connector(options)
                .await
                .map_err(PaymentError::from);
        }

        warn!(mobile, "No wallet provider available");
        Err(PaymentError::NoProviderAvailable)
    }
}

/// The wallet address the host last registered as active, lower-cased.
#[derive(Default)]
pub struct ActiveWallet {
    address: Mutex<Option<String>>,
}

impl ActiveWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `address`; an empty string clears it.
    pub fn set(&self, address: &str) {
        let normalized = address.trim().to_lowercase();
        info!(address = %normalized, "Active wallet set");
        *self.address.lock().unwrap_or_else(PoisonError::into_inner) =
            (!normalized.is_empty()).then_some(normalized);
    }

    pub fn get(&self) -> Option<String> {
        self.address
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
