use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// A tradable asset: an ERC-20 token or the chain's native currency.
/// Route-graph nodes are keyed by `symbol`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Ticker symbol, e.g. "DAI". Unique within one route graph.
    pub symbol: String,
    /// Contract address. `Address::ZERO` for the native currency.
    pub address: Address,
    /// ERC-20 decimal count.
    pub decimals: u8,
    /// True for the chain's native currency (no contract, moved via value).
    pub native: bool,
}

impl Token {
    pub fn erc20(symbol: impl Into<String>, address: Address, decimals: u8) -> Self {
        Token {
            symbol: symbol.into(),
            address,
            decimals,
            native: false,
        }
    }

    pub fn native(symbol: impl Into<String>, decimals: u8) -> Self {
        Token {
            symbol: symbol.into(),
            address: Address::ZERO,
            decimals,
            native: true,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol)
    }
}
