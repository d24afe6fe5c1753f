use crate::config::BridgeConfig;
use crate::domain::payment::{PaymentConfig, PaymentConfigResponse};
use crate::domain::ports::PaymentConfigSource;
use crate::error::PaymentError;
use async_trait::async_trait;
use tracing::{error, info};

/// Fetches the payment configuration from the lobby server over HTTP.
///
/// Performs a plain `GET <socket_url>/config/payments`; caching is left to the
/// caller.
#[derive(Clone)]
pub struct HttpConfigSource {
    client: reqwest::Client,
    url: String,
}

impl HttpConfigSource {
    pub fn new(config: &BridgeConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config.payment_config_url())
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PaymentConfigSource for HttpConfigSource {
    async fn fetch(&self) -> Result<PaymentConfig, PaymentError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.url, error = %e, "Failed to load payment config");
                PaymentError::ConfigInvalid(format!("request failed: {}", e))
            })?;

        let body: PaymentConfigResponse = response.json().await.map_err(|e| {
            error!(url = %self.url, error = %e, "Payment config is not valid JSON");
            PaymentError::ConfigInvalid(format!("malformed body: {}", e))
        })?;

        let config = PaymentConfig::try_from(body).inspect_err(|e| {
            error!(url = %self.url, error = %e, "Payment config rejected");
        })?;
        info!(
            treasury = %config.treasury,
            chains = config.tokens.len(),
            "Payment config loaded"
        );
        Ok(config)
    }
}
