//! Silo actions: deposits, deposit conversions, and yield claiming.

use alloy::primitives::{aliases::I96, Address, U256};
use alloy::sol_types::{SolCall, SolValue};

use crate::actions::AmountSource;
use crate::clipboard;
use crate::contracts::IFarmDiamond;
use crate::model::{Amount, FromMode, Token};
use crate::quote::Venue;
use crate::workflow::step::{CallDecoder, PreparedCall, Step};
use crate::workflow::{RunContext, WorkflowError};

/// Deposit tokens into the silo.
#[derive(Debug, Clone)]
pub struct Deposit {
    pub token: Token,
    pub from_mode: FromMode,
    pub amount_source: AmountSource,
}

impl Deposit {
    pub(crate) fn build(
        &self,
        flow: &Amount,
        ctx: &RunContext<'_>,
    ) -> Result<Step, WorkflowError> {
        let (amount, clip) = match &self.amount_source {
            AmountSource::Flow => (flow.raw(), clipboard::encode_empty()),
            AmountSource::Tag { tag, copy_slot } => {
                let source = ctx.find_tag("deposit", tag)?;
                // `amount` is the second argument, slot 1
                (U256::MAX, clipboard::encode_slot(source as u32, *copy_slot, 1))
            }
        };
        let call_data = IFarmDiamond::depositCall {
            token: self.token.address,
            amount,
            mode: self.from_mode.as_u8(),
        }
        .abi_encode();
        Ok(Step::new(
            "deposit",
            flow.clone(),
            None,
            PreparedCall {
                target: ctx.contracts.diamond,
                call_data: call_data.into(),
                clipboard: clip,
            },
            CallDecoder::Deposit,
        ))
    }
}

/// Convert a silo deposit from one token to another within the well it
/// backs. The conversion payload packs the kind, input amount, minimum
/// output and well address.
#[derive(Debug, Clone)]
pub struct Convert {
    pub venue: Venue,
    pub token_in: Token,
    pub token_out: Token,
    /// Protocol conversion kind discriminant.
    pub kind: U256,
    /// Stems of the crates being converted, paired with `amounts`.
    pub stems: Vec<I96>,
    pub amounts: Vec<U256>,
}

impl Convert {
    pub(crate) async fn build(
        &self,
        flow: &Amount,
        ctx: &RunContext<'_>,
    ) -> Result<Step, WorkflowError> {
        if ctx.run_mode.is_reverse() {
            return Err(ctx.not_invertible("convert"));
        }
        let slippage = ctx.require_slippage("convert")?;
        let out = ctx
            .quoter
            .quote(&self.venue, &self.token_in, &self.token_out, flow.raw())
            .await
            .map_err(|e| ctx.quote_error("convert", e))?;
        let min_out = slippage.apply_raw(out);
        let convert_data = (self.kind, flow.raw(), min_out, self.venue.pool).abi_encode();
        let call_data = IFarmDiamond::convertCall {
            convertData: convert_data.into(),
            stems: self.stems.clone(),
            amounts: self.amounts.clone(),
        }
        .abi_encode();
        Ok(Step::new(
            "convert",
            Amount::new(out, self.token_out.decimals),
            None,
            PreparedCall {
                target: ctx.contracts.diamond,
                call_data: call_data.into(),
                clipboard: clipboard::encode_empty(),
            },
            CallDecoder::Convert,
        ))
    }
}

/// Update a single token's grown stalk for an account. Pass-through.
#[derive(Debug, Clone)]
pub struct Mow {
    pub account: Address,
    pub token: Token,
}

impl Mow {
    pub(crate) fn build(&self, flow: &Amount, ctx: &RunContext<'_>) -> Step {
        let call_data = IFarmDiamond::mowCall {
            account: self.account,
            token: self.token.address,
        }
        .abi_encode();
        Step::new(
            "mow",
            flow.clone(),
            None,
            PreparedCall {
                target: ctx.contracts.diamond,
                call_data: call_data.into(),
                clipboard: clipboard::encode_empty(),
            },
            CallDecoder::Mow,
        )
    }
}

/// Claim earned beans and redeposit them in the same transaction.
/// Pass-through; the planted amount is only known on chain.
#[derive(Debug, Clone)]
pub struct Plant {}

impl Plant {
    pub(crate) fn build(&self, flow: &Amount, ctx: &RunContext<'_>) -> Step {
        let call_data = IFarmDiamond::plantCall {}.abi_encode();
        Step::new(
            "plant",
            flow.clone(),
            None,
            PreparedCall {
                target: ctx.contracts.diamond,
                call_data: call_data.into(),
                clipboard: clipboard::encode_empty(),
            },
            CallDecoder::Plant,
        )
    }
}
