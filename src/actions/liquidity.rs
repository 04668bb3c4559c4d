//! Pool liquidity actions. Multi-token deposits have no unique inverse,
//! so both actions refuse reverse estimation.

use alloy::primitives::U256;
use alloy::sol_types::SolCall;

use crate::clipboard;
use crate::contracts::IFarmDiamond;
use crate::model::{Amount, FromMode, ToMode, Token};
use crate::quote::Venue;
use crate::workflow::step::{CallDecoder, PreparedCall, Step};
use crate::workflow::{RunContext, WorkflowError};

/// One entry of an [`AddLiquidity`] deposit template, in pool token
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquiditySlot {
    /// Deposit nothing for this pool token.
    Zero,
    /// Deposit the flow amount here.
    Flow,
    /// Deposit a fixed raw amount here.
    Fixed(U256),
}

/// Deposit into a pool and receive its LP token.
#[derive(Debug, Clone)]
pub struct AddLiquidity {
    pub venue: Venue,
    pub lp_token: Token,
    /// One slot per pool token; exactly where the flow lands is up to
    /// the caller.
    pub amounts: Vec<LiquiditySlot>,
    pub from_mode: FromMode,
    pub to_mode: ToMode,
}

impl AddLiquidity {
    pub(crate) async fn build(
        &self,
        flow: &Amount,
        ctx: &RunContext<'_>,
    ) -> Result<Step, WorkflowError> {
        if ctx.run_mode.is_reverse() {
            return Err(ctx.not_invertible("add_liquidity"));
        }
        let slippage = ctx.require_slippage("add_liquidity")?;
        let amounts: Vec<U256> = self
            .amounts
            .iter()
            .map(|slot| match slot {
                LiquiditySlot::Zero => U256::ZERO,
                LiquiditySlot::Flow => flow.raw(),
                LiquiditySlot::Fixed(v) => *v,
            })
            .collect();
        let lp_out = ctx
            .quoter
            .quote_add_liquidity(&self.venue, &amounts)
            .await
            .map_err(|e| ctx.quote_error("add_liquidity", e))?;
        let call_data = IFarmDiamond::addLiquidityCall {
            pool: self.venue.pool,
            registry: self.venue.registry,
            amounts,
            minAmountOut: slippage.apply_raw(lp_out),
            fromMode: self.from_mode.as_u8(),
            toMode: self.to_mode.as_u8(),
        }
        .abi_encode();
        Ok(Step::new(
            "add_liquidity",
            Amount::new(lp_out, self.lp_token.decimals),
            None,
            PreparedCall {
                target: ctx.contracts.diamond,
                call_data: call_data.into(),
                clipboard: clipboard::encode_empty(),
            },
            CallDecoder::AddLiquidity,
        ))
    }
}

/// Burn LP tokens for a single pool token.
#[derive(Debug, Clone)]
pub struct RemoveLiquidityOneToken {
    pub venue: Venue,
    pub token_out: Token,
    pub from_mode: FromMode,
    pub to_mode: ToMode,
}

impl RemoveLiquidityOneToken {
    pub(crate) async fn build(
        &self,
        flow: &Amount,
        ctx: &RunContext<'_>,
    ) -> Result<Step, WorkflowError> {
        if ctx.run_mode.is_reverse() {
            return Err(ctx.not_invertible("remove_liquidity_one_token"));
        }
        let slippage = ctx.require_slippage("remove_liquidity_one_token")?;
        let out = ctx
            .quoter
            .quote_remove_liquidity_one(&self.venue, &self.token_out, flow.raw())
            .await
            .map_err(|e| ctx.quote_error("remove_liquidity_one_token", e))?;
        let call_data = IFarmDiamond::removeLiquidityOneTokenCall {
            pool: self.venue.pool,
            registry: self.venue.registry,
            toToken: self.token_out.address,
            amountIn: flow.raw(),
            minAmountOut: slippage.apply_raw(out),
            fromMode: self.from_mode.as_u8(),
            toMode: self.to_mode.as_u8(),
        }
        .abi_encode();
        Ok(Step::new(
            "remove_liquidity_one_token",
            Amount::new(out, self.token_out.decimals),
            None,
            PreparedCall {
                target: ctx.contracts.diamond,
                call_data: call_data.into(),
                clipboard: clipboard::encode_empty(),
            },
            CallDecoder::RemoveLiquidityOneToken,
        ))
    }
}
