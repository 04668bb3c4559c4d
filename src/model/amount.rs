use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by [`Amount`] construction and arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("cannot parse `{input}` as a decimal amount")]
    Parse { input: String },

    #[error("`{input}` has more than {decimals} fractional digits")]
    TooManyDecimals { input: String, decimals: u8 },

    #[error("decimals mismatch: {left} vs {right} (rescale explicitly first)")]
    DecimalMismatch { left: u8, right: u8 },

    #[error("rescaling from {from} to {to} decimals would drop non-zero digits")]
    PrecisionLoss { from: u8, to: u8 },

    #[error("amount arithmetic overflowed")]
    Overflow,

    #[error("amount arithmetic underflowed")]
    Underflow,
}

/// A fixed-point token quantity: a raw integer plus the token's decimal
/// count. All step inputs and outputs are expressed in this type.
///
/// Arithmetic between two amounts requires equal `decimals`; use
/// [`Amount::rescale`] to convert explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    raw: U256,
    decimals: u8,
}

impl Amount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Amount { raw, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Amount {
            raw: U256::ZERO,
            decimals,
        }
    }

    pub fn raw(&self) -> U256 {
        self.raw
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Parse a human-readable decimal string (e.g. `"100.5"`).
    ///
    /// Values representable within `decimals` precision round-trip
    /// losslessly through [`Amount::to_human`]; anything with more
    /// fractional digits is rejected rather than rounded.
    pub fn from_human(input: &str, decimals: u8) -> Result<Self, AmountError> {
        let s = input.trim();
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        if (int_part.is_empty() && frac_part.is_empty())
            || !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AmountError::Parse {
                input: input.to_string(),
            });
        }
        if frac_part.len() > decimals as usize {
            return Err(AmountError::TooManyDecimals {
                input: input.to_string(),
                decimals,
            });
        }

        let int_raw = if int_part.is_empty() {
            U256::ZERO
        } else {
            int_part.parse::<U256>().map_err(|_| AmountError::Parse {
                input: input.to_string(),
            })?
        };
        let frac_raw = if frac_part.is_empty() {
            U256::ZERO
        } else {
            // pad right to `decimals` digits
            let scale = pow10(decimals - frac_part.len() as u8);
            let frac = frac_part.parse::<U256>().map_err(|_| AmountError::Parse {
                input: input.to_string(),
            })?;
            frac.checked_mul(scale).ok_or(AmountError::Overflow)?
        };

        let raw = int_raw
            .checked_mul(pow10(decimals))
            .and_then(|v| v.checked_add(frac_raw))
            .ok_or(AmountError::Overflow)?;

        Ok(Amount { raw, decimals })
    }

    /// Render as a decimal string, trimming trailing fractional zeros.
    pub fn to_human(&self) -> String {
        let divisor = pow10(self.decimals);
        let int = self.raw / divisor;
        let frac = self.raw % divisor;
        if frac.is_zero() {
            return int.to_string();
        }
        let frac = format!("{frac:0>width$}", width = self.decimals as usize);
        format!("{int}.{}", frac.trim_end_matches('0'))
    }

    pub fn checked_add(&self, other: &Amount) -> Result<Amount, AmountError> {
        self.require_same_decimals(other)?;
        let raw = self
            .raw
            .checked_add(other.raw)
            .ok_or(AmountError::Overflow)?;
        Ok(Amount::new(raw, self.decimals))
    }

    pub fn checked_sub(&self, other: &Amount) -> Result<Amount, AmountError> {
        self.require_same_decimals(other)?;
        let raw = self
            .raw
            .checked_sub(other.raw)
            .ok_or(AmountError::Underflow)?;
        Ok(Amount::new(raw, self.decimals))
    }

    /// Convert to a different decimal count. Widening is exact; narrowing
    /// fails if it would drop non-zero digits.
    pub fn rescale(&self, decimals: u8) -> Result<Amount, AmountError> {
        if decimals == self.decimals {
            return Ok(self.clone());
        }
        if decimals > self.decimals {
            let raw = self
                .raw
                .checked_mul(pow10(decimals - self.decimals))
                .ok_or(AmountError::Overflow)?;
            return Ok(Amount::new(raw, decimals));
        }
        let factor = pow10(self.decimals - decimals);
        if !(self.raw % factor).is_zero() {
            return Err(AmountError::PrecisionLoss {
                from: self.decimals,
                to: decimals,
            });
        }
        Ok(Amount::new(self.raw / factor, decimals))
    }

    fn require_same_decimals(&self, other: &Amount) -> Result<(), AmountError> {
        if self.decimals != other.decimals {
            return Err(AmountError::DecimalMismatch {
                left: self.decimals,
                right: other.decimals,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_human())
    }
}

fn pow10(exp: u8) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_round_trips() {
        let a = Amount::from_human("100.5", 6).unwrap();
        assert_eq!(a.raw(), U256::from(100_500_000u64));
        assert_eq!(a.to_human(), "100.5");

        let b = Amount::from_human("0.000001", 6).unwrap();
        assert_eq!(b.raw(), U256::from(1u64));
        assert_eq!(b.to_human(), "0.000001");

        let c = Amount::from_human("42", 0).unwrap();
        assert_eq!(c.to_human(), "42");
    }

    #[test]
    fn rejects_over_precise_input() {
        let err = Amount::from_human("1.0000001", 6).unwrap_err();
        assert!(matches!(err, AmountError::TooManyDecimals { .. }));
    }

    #[test]
    fn rejects_garbage() {
        assert!(Amount::from_human("", 6).is_err());
        assert!(Amount::from_human("1.2.3", 6).is_err());
        assert!(Amount::from_human("-5", 6).is_err());
        assert!(Amount::from_human("abc", 6).is_err());
    }

    #[test]
    fn arithmetic_requires_equal_decimals() {
        let a = Amount::from_human("1", 6).unwrap();
        let b = Amount::from_human("1", 18).unwrap();
        assert_eq!(
            a.checked_add(&b).unwrap_err(),
            AmountError::DecimalMismatch { left: 6, right: 18 }
        );
        let c = a.checked_add(&a).unwrap();
        assert_eq!(c.to_human(), "2");
    }

    #[test]
    fn rescale_is_exact_or_fails() {
        let a = Amount::from_human("1.5", 6).unwrap();
        let wide = a.rescale(18).unwrap();
        assert_eq!(wide.to_human(), "1.5");
        assert_eq!(wide.rescale(6).unwrap(), a);

        let narrow = Amount::from_human("0.000001", 6).unwrap();
        assert!(matches!(
            narrow.rescale(3).unwrap_err(),
            AmountError::PrecisionLoss { .. }
        ));
    }
}
