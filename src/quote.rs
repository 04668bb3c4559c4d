//! Price discovery trait. The engine never talks to a chain itself; it
//! asks a [`QuoteProvider`] for expected outputs and builds call data
//! around the answers.

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::Token;

/// A pool the engine can trade through: the pool contract plus the
/// registry that describes it. Wells set `registry` to the pool itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub pool: Address,
    pub registry: Address,
}

impl Venue {
    pub fn new(pool: Address, registry: Address) -> Self {
        Venue { pool, registry }
    }

    /// A well is its own registry.
    pub fn well(pool: Address) -> Self {
        Venue {
            pool,
            registry: pool,
        }
    }
}

/// Supplies expected swap and liquidity outputs for a venue.
///
/// Implementations typically wrap an RPC provider and call the pool's
/// `get_dy` / quoting views; tests substitute fixed rates. Errors are
/// opaque to the engine and surface wrapped in the failing step's
/// workflow error.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Expected output of swapping `amount_in` of `token_in` for
    /// `token_out` through `venue`.
    async fn quote(
        &self,
        venue: &Venue,
        token_in: &Token,
        token_out: &Token,
        amount_in: U256,
    ) -> anyhow::Result<U256>;

    /// Input required to receive `amount_out` of `token_out`.
    async fn quote_reversed(
        &self,
        venue: &Venue,
        token_in: &Token,
        token_out: &Token,
        amount_out: U256,
    ) -> anyhow::Result<U256>;

    /// Expected LP tokens minted for depositing `amounts` (one entry per
    /// pool token, in pool order).
    async fn quote_add_liquidity(&self, venue: &Venue, amounts: &[U256]) -> anyhow::Result<U256>;

    /// Expected `token_out` received for burning `lp_amount` of the
    /// pool's LP token into a single token.
    async fn quote_remove_liquidity_one(
        &self,
        venue: &Venue,
        token_out: &Token,
        lp_amount: U256,
    ) -> anyhow::Result<U256>;
}
