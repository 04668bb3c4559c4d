//! Shared fixtures: a fixed-rate quote provider and well-known tokens.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use farm_flow::model::Token;
use farm_flow::quote::{QuoteProvider, Venue};
use farm_flow::workflow::{BuildOptions, RunMode};
use farm_flow::Slippage;

pub fn dai() -> Token {
    Token::erc20(
        "DAI",
        "0x6B175474E89094C44Da98b954EedeAC495271d0F"
            .parse()
            .unwrap(),
        18,
    )
}

pub fn usdc() -> Token {
    Token::erc20(
        "USDC",
        "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
            .parse()
            .unwrap(),
        6,
    )
}

pub fn bean() -> Token {
    Token::erc20(
        "BEAN",
        "0xBEA0000029AD1c77D3d5D23Ba2D8893dB9d1Efab"
            .parse()
            .unwrap(),
        6,
    )
}

pub fn weth() -> Token {
    Token::erc20(
        "WETH",
        "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"
            .parse()
            .unwrap(),
        18,
    )
}

pub fn eth() -> Token {
    Token::native("ETH", 18)
}

pub fn curve_venue() -> Venue {
    Venue::new(
        Address::repeat_byte(0x11),
        Address::repeat_byte(0x12),
    )
}

pub fn tricrypto_venue() -> Venue {
    Venue::new(
        Address::repeat_byte(0x21),
        Address::repeat_byte(0x22),
    )
}

pub fn well_venue() -> Venue {
    Venue::well(Address::repeat_byte(0x31))
}

/// Quotes from a static rate table; `out = in * num / den`. Reverse
/// quotes invert exactly, so forward/reverse comparisons in tests are
/// precise. Counts every quote issued.
pub struct MockQuoter {
    rates: HashMap<(Address, Address, Address), (u64, u64)>,
    calls: AtomicUsize,
}

impl MockQuoter {
    pub fn new() -> Self {
        MockQuoter {
            rates: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_rate(
        mut self,
        venue: &Venue,
        token_in: &Token,
        token_out: &Token,
        num: u64,
        den: u64,
    ) -> Self {
        self.rates
            .insert((venue.pool, token_in.address, token_out.address), (num, den));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn rate(&self, venue: &Venue, token_in: &Token, token_out: &Token) -> anyhow::Result<(u64, u64)> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rates
            .get(&(venue.pool, token_in.address, token_out.address))
            .copied()
            .ok_or_else(|| {
                anyhow::anyhow!("no rate for {} -> {}", token_in.symbol, token_out.symbol)
            })
    }
}

#[async_trait]
impl QuoteProvider for MockQuoter {
    async fn quote(
        &self,
        venue: &Venue,
        token_in: &Token,
        token_out: &Token,
        amount_in: U256,
    ) -> anyhow::Result<U256> {
        let (num, den) = self.rate(venue, token_in, token_out)?;
        Ok(amount_in * U256::from(num) / U256::from(den))
    }

    async fn quote_reversed(
        &self,
        venue: &Venue,
        token_in: &Token,
        token_out: &Token,
        amount_out: U256,
    ) -> anyhow::Result<U256> {
        let (num, den) = self.rate(venue, token_in, token_out)?;
        Ok(amount_out * U256::from(den) / U256::from(num))
    }

    async fn quote_add_liquidity(&self, _venue: &Venue, amounts: &[U256]) -> anyhow::Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(amounts.iter().copied().fold(U256::ZERO, |acc, a| acc + a))
    }

    async fn quote_remove_liquidity_one(
        &self,
        _venue: &Venue,
        _token_out: &Token,
        lp_amount: U256,
    ) -> anyhow::Result<U256> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(lp_amount)
    }
}

pub fn forward_opts(quoter: &MockQuoter) -> BuildOptions<'_> {
    BuildOptions {
        run_mode: RunMode::Forward,
        slippage: Some(Slippage::new(0.5).unwrap()),
        quoter,
    }
}

pub fn opts(run_mode: RunMode, slippage: Option<f64>, quoter: &MockQuoter) -> BuildOptions<'_> {
    BuildOptions {
        run_mode,
        slippage: slippage.map(|pct| Slippage::new(pct).unwrap()),
        quoter,
    }
}
