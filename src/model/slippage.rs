use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::amount::Amount;

#[derive(Debug, Error, PartialEq)]
#[error("slippage must be non-negative, got {0}%")]
pub struct InvalidSlippage(pub f64);

/// A percent slippage tolerance, e.g. `0.1` = 0.1%.
///
/// Applied with a fixed 10^6 precision so the minimum-out computed here
/// matches what the contracts compare against on chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slippage {
    percent: f64,
}

impl Slippage {
    pub const PRECISION: u64 = 1_000_000;

    pub fn new(percent: f64) -> Result<Self, InvalidSlippage> {
        if percent < 0.0 || !percent.is_finite() {
            return Err(InvalidSlippage(percent));
        }
        Ok(Slippage { percent })
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    fn factor(&self) -> U256 {
        let f = (Self::PRECISION as f64 * (1.0 - self.percent / 100.0)).floor();
        U256::from(f.max(0.0) as u64)
    }

    /// Minimum acceptable output for a quoted output (forward direction).
    pub fn apply_raw(&self, quoted: U256) -> U256 {
        quoted * self.factor() / U256::from(Self::PRECISION)
    }

    /// Maximum input for a target output (reverse direction); inverse of
    /// [`Slippage::apply_raw`] up to integer rounding.
    pub fn unapply_raw(&self, target: U256) -> U256 {
        let factor = self.factor();
        if factor.is_zero() {
            return U256::ZERO;
        }
        let scaled = target * U256::from(Self::PRECISION);
        // ceiling division so apply(unapply(x)) >= x
        (scaled + factor - U256::from(1u64)) / factor
    }

    pub fn apply(&self, amount: &Amount) -> Amount {
        Amount::new(self.apply_raw(amount.raw()), amount.decimals())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_slippage_is_identity() {
        let s = Slippage::new(0.0).unwrap();
        let x = U256::from(123_456_789u64);
        assert_eq!(s.apply_raw(x), x);
        assert_eq!(s.unapply_raw(x), x);
    }

    #[test]
    fn rejects_negative() {
        assert!(Slippage::new(-0.1).is_err());
        assert!(Slippage::new(f64::NAN).is_err());
    }

    #[test]
    fn apply_unapply_round_trip() {
        let s = Slippage::new(0.1).unwrap();
        let x = U256::from(1_000_000_000u64);
        let down = s.apply_raw(x);
        assert!(down < x);
        let up = s.unapply_raw(down);
        // ceiling division can overshoot by at most one raw unit
        let diff = if up > x { up - x } else { x - up };
        assert!(diff <= U256::from(1u64), "round trip drifted: {x} -> {up}");
    }
}
