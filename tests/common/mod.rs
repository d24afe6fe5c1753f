#![allow(dead_code)]

use async_trait::async_trait;
use cardito_bridge::application::session::BridgeSession;
use cardito_bridge::config::BridgeConfig;
use cardito_bridge::domain::payment::{PaymentConfig, TransferCall};
use cardito_bridge::domain::ports::{
    ConnectorOptions, ProviderEnvironment, WalletProvider, WalletProviderRef,
};
use cardito_bridge::error::ProviderError;
use cardito_bridge::infrastructure::in_memory::{
    InMemoryTransport, RecordingHost, StaticConfigSource,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/126.0";
pub const MOBILE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";

pub const TREASURY: &str = "0xtreasury00000000000000000000000000000001";
pub const POLYGON_USDC: &str = "0x3c499c542cef5e3811e1192ce70d8cc03d5c3359";

/// A wallet whose answers are set up front and whose calls are recorded.
pub struct FakeWallet {
    pub accounts: Vec<String>,
    pub chain: Mutex<String>,
    pub switch_error: Option<String>,
    pub transfer_error: Option<String>,
    pub tx_hash: String,
    pub transfers: Mutex<Vec<TransferCall>>,
    pub switches: Mutex<Vec<String>>,
}

impl FakeWallet {
    pub fn new(account: &str, chain_hex: &str) -> Self {
        Self {
            accounts: vec![account.to_string()],
            chain: Mutex::new(chain_hex.to_string()),
            switch_error: None,
            transfer_error: None,
            tx_hash: "0xhash".to_string(),
            transfers: Mutex::new(Vec::new()),
            switches: Mutex::new(Vec::new()),
        }
    }

    pub fn transfers(&self) -> Vec<TransferCall> {
        self.transfers.lock().unwrap().clone()
    }

    pub fn switches(&self) -> Vec<String> {
        self.switches.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.accounts.clone())
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        Ok(self.chain.lock().unwrap().clone())
    }

    async fn switch_chain(&self, chain_hex: &str) -> Result<(), ProviderError> {
        self.switches.lock().unwrap().push(chain_hex.to_string());
        if let Some(message) = &self.switch_error {
            return Err(ProviderError::new(message.clone()));
        }
        *self.chain.lock().unwrap() = chain_hex.to_string();
        Ok(())
    }

    async fn personal_sign(&self, message: &str, from: &str) -> Result<String, ProviderError> {
        Ok(format!("sig({},{})", message, from))
    }

    async fn transfer(&self, call: TransferCall) -> Result<String, ProviderError> {
        self.transfers.lock().unwrap().push(call);
        match &self.transfer_error {
            Some(message) => Err(ProviderError::new(message.clone())),
            None => Ok(self.tx_hash.clone()),
        }
    }
}

/// A page with a configurable user agent, injected wallet and connector.
pub struct FakeEnvironment {
    pub user_agent: String,
    pub injected: Option<Arc<FakeWallet>>,
    pub connector: Option<Arc<FakeWallet>>,
    pub connector_inits: Arc<Mutex<Vec<ConnectorOptions>>>,
}

impl FakeEnvironment {
    pub fn desktop(wallet: Arc<FakeWallet>) -> Self {
        Self {
            user_agent: DESKTOP_UA.to_string(),
            injected: Some(wallet),
            connector: None,
            connector_inits: Arc::default(),
        }
    }

    pub fn mobile(wallet: Arc<FakeWallet>) -> Self {
        Self {
            user_agent: MOBILE_UA.to_string(),
            injected: None,
            connector: Some(wallet),
            connector_inits: Arc::default(),
        }
    }
}

#[async_trait]
impl ProviderEnvironment for FakeEnvironment {
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn injected_provider(&self) -> Option<WalletProviderRef> {
        self.injected
            .clone()
            .map(|wallet| wallet as WalletProviderRef)
    }

    fn has_connector(&self) -> bool {
        self.connector.is_some()
    }

    async fn init_connector(
        &self,
        options: ConnectorOptions,
    ) -> Result<WalletProviderRef, ProviderError> {
        self.connector_inits.lock().unwrap().push(options);
        self.connector
            .clone()
            .map(|wallet| wallet as WalletProviderRef)
            .ok_or_else(|| ProviderError::new("connector missing"))
    }
}

pub fn payment_config() -> PaymentConfig {
    let mut polygon = HashMap::new();
    polygon.insert("USDC".to_string(), POLYGON_USDC.to_string());
    let mut bnb = HashMap::new();
    bnb.insert(
        "USDT".to_string(),
        "0x55d398326f99059ff775485246999027b3197955".to_string(),
    );

    let mut tokens = HashMap::new();
    tokens.insert(137, polygon);
    tokens.insert(56, bnb);
    PaymentConfig {
        treasury: TREASURY.to_string(),
        tokens,
    }
}

pub struct Harness {
    pub session: BridgeSession,
    pub host: RecordingHost,
    pub transport: InMemoryTransport,
    pub source: StaticConfigSource,
}

/// A ready session with the given environment and config source.
pub fn harness(environment: FakeEnvironment, source: StaticConfigSource) -> Harness {
    let host = RecordingHost::new();
    let transport = InMemoryTransport::new();
    let session = BridgeSession::new(
        BridgeConfig::default(),
        Box::new(host.clone()),
        Some(Box::new(transport.clone())),
        Box::new(environment),
        Box::new(source.clone()),
    );
    session.runtime_ready();
    Harness {
        session,
        host,
        transport,
        source,
    }
}

pub fn store_errors(host: &RecordingHost) -> Vec<String> {
    host.deliveries_to("StoreManager", "ShowStoreError")
}

pub fn store_submissions(host: &RecordingHost) -> Vec<String> {
    host.deliveries_to("StoreManager", "OnWebGLTxSubmitted")
}
