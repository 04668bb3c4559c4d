//! Swap actions. `Exchange` and `ExchangeUnderlying` quote both ways;
//! `Shift` consumes whatever was pre-sent to the well, so its input
//! cannot be derived from a desired output and reverse estimation
//! refuses it.

use alloy::primitives::Address;
use alloy::sol_types::SolCall;

use crate::clipboard;
use crate::contracts::{IFarmDiamond, IWell};
use crate::model::{Amount, FromMode, ToMode, Token};
use crate::quote::Venue;
use crate::workflow::step::{CallDecoder, PreparedCall, Step};
use crate::workflow::{RunContext, WorkflowError};

/// Swap `token_in` for `token_out` through a registry pool.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub venue: Venue,
    pub token_in: Token,
    pub token_out: Token,
    pub from_mode: FromMode,
    pub to_mode: ToMode,
}

impl Exchange {
    pub(crate) async fn build(
        &self,
        flow: &Amount,
        ctx: &RunContext<'_>,
    ) -> Result<Step, WorkflowError> {
        let slippage = ctx.require_slippage("exchange")?;
        let (amount_in, min_out, amount_out) = if ctx.run_mode.is_reverse() {
            // `flow` is the output this swap must produce.
            let needed = ctx
                .quoter
                .quote_reversed(&self.venue, &self.token_in, &self.token_out, flow.raw())
                .await
                .map_err(|e| ctx.quote_error("exchange", e))?;
            let min_out = slippage.apply_raw(flow.raw());
            (needed, min_out, Amount::new(needed, self.token_in.decimals))
        } else {
            let out = ctx
                .quoter
                .quote(&self.venue, &self.token_in, &self.token_out, flow.raw())
                .await
                .map_err(|e| ctx.quote_error("exchange", e))?;
            let min_out = slippage.apply_raw(out);
            (flow.raw(), min_out, Amount::new(out, self.token_out.decimals))
        };
        let call_data = IFarmDiamond::exchangeCall {
            pool: self.venue.pool,
            registry: self.venue.registry,
            fromToken: self.token_in.address,
            toToken: self.token_out.address,
            amountIn: amount_in,
            minAmountOut: min_out,
            fromMode: self.from_mode.as_u8(),
            toMode: self.to_mode.as_u8(),
        }
        .abi_encode();
        Ok(Step::new(
            "exchange",
            amount_out,
            None,
            PreparedCall {
                target: ctx.contracts.diamond,
                call_data: call_data.into(),
                clipboard: clipboard::encode_empty(),
            },
            CallDecoder::Exchange,
        ))
    }
}

/// Swap between a metapool's underlying tokens. No registry argument;
/// otherwise identical to [`Exchange`].
#[derive(Debug, Clone)]
pub struct ExchangeUnderlying {
    pub venue: Venue,
    pub token_in: Token,
    pub token_out: Token,
    pub from_mode: FromMode,
    pub to_mode: ToMode,
}

impl ExchangeUnderlying {
    pub(crate) async fn build(
        &self,
        flow: &Amount,
        ctx: &RunContext<'_>,
    ) -> Result<Step, WorkflowError> {
        let slippage = ctx.require_slippage("exchange_underlying")?;
        let (amount_in, min_out, amount_out) = if ctx.run_mode.is_reverse() {
            let needed = ctx
                .quoter
                .quote_reversed(&self.venue, &self.token_in, &self.token_out, flow.raw())
                .await
                .map_err(|e| ctx.quote_error("exchange_underlying", e))?;
            let min_out = slippage.apply_raw(flow.raw());
            (needed, min_out, Amount::new(needed, self.token_in.decimals))
        } else {
            let out = ctx
                .quoter
                .quote(&self.venue, &self.token_in, &self.token_out, flow.raw())
                .await
                .map_err(|e| ctx.quote_error("exchange_underlying", e))?;
            let min_out = slippage.apply_raw(out);
            (flow.raw(), min_out, Amount::new(out, self.token_out.decimals))
        };
        let call_data = IFarmDiamond::exchangeUnderlyingCall {
            pool: self.venue.pool,
            fromToken: self.token_in.address,
            toToken: self.token_out.address,
            amountIn: amount_in,
            minAmountOut: min_out,
            fromMode: self.from_mode.as_u8(),
            toMode: self.to_mode.as_u8(),
        }
        .abi_encode();
        Ok(Step::new(
            "exchange_underlying",
            amount_out,
            None,
            PreparedCall {
                target: ctx.contracts.diamond,
                call_data: call_data.into(),
                clipboard: clipboard::encode_empty(),
            },
            CallDecoder::ExchangeUnderlying,
        ))
    }
}

/// Swap through a well by shifting its reserve imbalance. The well must
/// already hold the input tokens when this executes; the call itself is
/// made directly against the well contract.
#[derive(Debug, Clone)]
pub struct Shift {
    pub venue: Venue,
    pub token_in: Token,
    pub token_out: Token,
    pub recipient: Address,
}

impl Shift {
    pub(crate) async fn build(
        &self,
        flow: &Amount,
        ctx: &RunContext<'_>,
    ) -> Result<Step, WorkflowError> {
        if ctx.run_mode.is_reverse() {
            return Err(ctx.not_invertible("shift"));
        }
        let slippage = ctx.require_slippage("shift")?;
        let out = ctx
            .quoter
            .quote(&self.venue, &self.token_in, &self.token_out, flow.raw())
            .await
            .map_err(|e| ctx.quote_error("shift", e))?;
        let call_data = IWell::shiftCall {
            tokenOut: self.token_out.address,
            minAmountOut: slippage.apply_raw(out),
            recipient: self.recipient,
        }
        .abi_encode();
        Ok(Step::new(
            "shift",
            Amount::new(out, self.token_out.decimals),
            None,
            PreparedCall {
                target: self.venue.pool,
                call_data: call_data.into(),
                clipboard: clipboard::encode_empty(),
            },
            CallDecoder::Shift,
        ))
    }
}
