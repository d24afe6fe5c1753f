use crate::config::{DEFAULT_CHAIN_ID, DEFAULT_TOKEN_SYMBOL};
use crate::error::PaymentError;
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::warn;

/// A purchase requested by the host store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub sku: String,
    /// Human-readable decimal amount, e.g. `"12.5"`.
    pub amount: String,
    /// Upper-cased token symbol.
    pub token_symbol: String,
    pub chain_id: u64,
}

impl PaymentRequest {
    /// Builds a request, applying the store defaults (`USDC`, chain `1`).
    pub fn new(
        sku: impl Into<String>,
        amount: impl Into<String>,
        token_symbol: Option<&str>,
        chain_id: Option<u64>,
    ) -> Self {
        let token_symbol = token_symbol
            .map(str::trim)
            .filter(|symbol| !symbol.is_empty())
            .unwrap_or(DEFAULT_TOKEN_SYMBOL)
            .to_uppercase();
        Self {
            sku: sku.into(),
            amount: amount.into(),
            token_symbol,
            chain_id: chain_id.filter(|id| *id != 0).unwrap_or(DEFAULT_CHAIN_ID),
        }
    }

    /// The chain id in the `0x`-prefixed hex form wallets report.
    pub fn chain_hex(&self) -> String {
        chain_id_hex(self.chain_id)
    }
}

pub fn chain_id_hex(chain_id: u64) -> String {
    format!("{:#x}", chain_id)
}

/// Body of `GET /config/payments`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentConfigResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub treasury: Option<String>,
    /// `chainId -> symbol -> address`, kept loose so one odd entry cannot
    /// invalidate the rest of the table.
    #[serde(default)]
    pub tokens: Option<HashMap<String, Value>>,
}

/// Validated payment configuration: the treasury and the token table.
///
/// Addresses are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentConfig {
    pub treasury: String,
    pub tokens: HashMap<u64, HashMap<String, String>>,
}

impl PaymentConfig {
    pub fn token_address(&self, chain_id: u64, symbol: &str) -> Option<&str> {
        self.tokens
            .get(&chain_id)
            .and_then(|by_symbol| by_symbol.get(symbol))
            .map(String::as_str)
    }
}

impl TryFrom<PaymentConfigResponse> for PaymentConfig {
    type Error = PaymentError;

    fn try_from(response: PaymentConfigResponse) -> Result<Self, Self::Error> {
        if !response.ok {
            return Err(PaymentError::ConfigInvalid("ok=false".to_string()));
        }
        let treasury = response
            .treasury
            .filter(|treasury| !treasury.is_empty())
            .ok_or_else(|| PaymentError::ConfigInvalid("missing treasury".to_string()))?;
        let raw_tokens = response
            .tokens
            .ok_or_else(|| PaymentError::ConfigInvalid("missing token table".to_string()))?;

        let mut tokens = HashMap::with_capacity(raw_tokens.len());
        for (chain, by_symbol) in raw_tokens {
            let Ok(chain_id) = chain.trim().parse::<u64>() else {
                warn!(chain = %chain, "Skipping token table entry with non-numeric chain id");
                continue;
            };
            let Value::Object(by_symbol) = by_symbol else {
                warn!(chain_id, "Skipping token table entry that is not an object");
                continue;
            };
            let by_symbol = by_symbol
                .into_iter()
                .filter_map(|(symbol, address)| {
                    scalar_text(address).map(|address| (symbol.to_uppercase(), address.to_lowercase()))
                })
                .collect();
            tokens.insert(chain_id, by_symbol);
        }

        Ok(Self {
            treasury: treasury.to_lowercase(),
            tokens,
        })
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// A token amount in the token's smallest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TokenAmount(U256);

impl TokenAmount {
    /// Converts a decimal string into fixed-point units with `decimals` places.
    ///
    /// Trailing fractional zeros are ignored; any other fractional digit beyond
    /// `decimals` is rejected rather than rounded.
    pub fn parse_units(amount: &str, decimals: u32) -> Result<Self, PaymentError> {
        let invalid = |reason: &str| PaymentError::InvalidAmount {
            amount: amount.to_string(),
            reason: reason.to_string(),
        };

        let value = Decimal::from_str(amount.trim())
            .map_err(|_| invalid("not a decimal number"))?
            .normalize();
        if value.is_sign_negative() && !value.is_zero() {
            return Err(invalid("amount is negative"));
        }
        let scale = value.scale();
        if scale > decimals {
            return Err(invalid("fractional component exceeds token decimals"));
        }

        let mantissa = U256::from(value.mantissa().unsigned_abs());
        let factor = U256::from(10u8)
            .checked_pow(U256::from(decimals - scale))
            .ok_or_else(|| invalid("overflow"))?;
        mantissa
            .checked_mul(factor)
            .map(Self)
            .ok_or_else(|| invalid("overflow"))
    }

    pub fn value(&self) -> U256 {
        self.0
    }
}

impl From<TokenAmount> for U256 {
    fn from(amount: TokenAmount) -> Self {
        amount.0
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ERC-20 `transfer(to, amount)` call on `token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCall {
    pub token: String,
    pub to: String,
    pub amount: TokenAmount,
}

/// Reported to the host once the wallet accepts the transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxSubmission {
    pub sku: String,
    pub hash: String,
    pub chain_id: u64,
    pub token: String,
}

/// Mobile browsers get the deep-link connector instead of an injected wallet.
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    ["android", "iphone", "ipad", "ipod"]
        .iter()
        .any(|needle| ua.contains(needle))
}
