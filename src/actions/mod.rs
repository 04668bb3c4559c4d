//! The closed set of step generators a workflow can hold.
//!
//! Each action resolves into one encoded call against a known target.
//! Resolution is direction-aware: pass-through actions behave the same
//! both ways, swaps invert their quote, and anything whose input cannot
//! be derived from a desired output refuses reverse estimation.

pub mod exchange;
pub mod field;
pub mod liquidity;
pub mod silo;
pub mod token_ops;

use alloy::primitives::{Address, Bytes};

use crate::model::Amount;
use crate::workflow::step::{CallDecoder, PreparedCall, Step};
use crate::workflow::{RunContext, WorkflowError};

pub use exchange::{Exchange, ExchangeUnderlying, Shift};
pub use field::{Harvest, Rinse};
pub use liquidity::{AddLiquidity, LiquiditySlot, RemoveLiquidityOneToken};
pub use silo::{Convert, Deposit, Mow, Plant};
pub use token_ops::{Approve, TransferToken, UnwrapEth, WrapEth};

/// Where a step takes its amount from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountSource {
    /// The amount flowing out of the previous step.
    Flow,
    /// The word at `copy_slot` of a tagged earlier step's return data,
    /// spliced in on chain. The encoded argument carries a sentinel.
    Tag { tag: String, copy_slot: u16 },
}

/// A pre-encoded call supplied by the caller, passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCall {
    pub name: String,
    pub target: Address,
    pub call_data: Bytes,
    pub clipboard: Bytes,
}

#[derive(Debug, Clone)]
pub enum Action {
    Approve(Approve),
    TransferToken(TransferToken),
    WrapEth(WrapEth),
    UnwrapEth(UnwrapEth),
    Exchange(Exchange),
    ExchangeUnderlying(ExchangeUnderlying),
    AddLiquidity(AddLiquidity),
    RemoveLiquidityOneToken(RemoveLiquidityOneToken),
    Deposit(Deposit),
    Convert(Convert),
    Mow(Mow),
    Plant(Plant),
    Harvest(Harvest),
    Rinse(Rinse),
    Shift(Shift),
    Raw(RawCall),
}

impl Action {
    pub fn name(&self) -> &str {
        match self {
            Action::Approve(_) => "approve",
            Action::TransferToken(_) => "transfer_token",
            Action::WrapEth(_) => "wrap_eth",
            Action::UnwrapEth(_) => "unwrap_eth",
            Action::Exchange(_) => "exchange",
            Action::ExchangeUnderlying(_) => "exchange_underlying",
            Action::AddLiquidity(_) => "add_liquidity",
            Action::RemoveLiquidityOneToken(_) => "remove_liquidity_one_token",
            Action::Deposit(_) => "deposit",
            Action::Convert(_) => "convert",
            Action::Mow(_) => "mow",
            Action::Plant(_) => "plant",
            Action::Harvest(_) => "harvest",
            Action::Rinse(_) => "rinse",
            Action::Shift(_) => "shift",
            Action::Raw(raw) => &raw.name,
        }
    }

    /// The amount source of actions that support tag-driven splicing.
    pub(crate) fn amount_source(&self) -> Option<&AmountSource> {
        match self {
            Action::TransferToken(t) => Some(&t.amount_source),
            Action::Deposit(d) => Some(&d.amount_source),
            _ => None,
        }
    }

    /// Resolve this action into a step.
    ///
    /// Forward modes receive the amount flowing in and report the amount
    /// flowing out. In reverse estimation, `flow` is the output this
    /// step must produce and the returned `amount_out` is the input it
    /// requires; the engine rewrites the presentation afterwards.
    pub async fn build(
        &self,
        flow: &Amount,
        ctx: &RunContext<'_>,
    ) -> Result<Step, WorkflowError> {
        match self {
            Action::Approve(a) => a.build(flow, ctx),
            Action::TransferToken(a) => a.build(flow, ctx),
            Action::WrapEth(a) => a.build(flow, ctx),
            Action::UnwrapEth(a) => a.build(flow, ctx),
            Action::Exchange(a) => a.build(flow, ctx).await,
            Action::ExchangeUnderlying(a) => a.build(flow, ctx).await,
            Action::AddLiquidity(a) => a.build(flow, ctx).await,
            Action::RemoveLiquidityOneToken(a) => a.build(flow, ctx).await,
            Action::Deposit(a) => a.build(flow, ctx),
            Action::Convert(a) => a.build(flow, ctx).await,
            Action::Mow(a) => Ok(a.build(flow, ctx)),
            Action::Plant(a) => Ok(a.build(flow, ctx)),
            Action::Harvest(a) => Ok(a.build(flow, ctx)),
            Action::Rinse(a) => Ok(a.build(flow, ctx)),
            Action::Shift(a) => a.build(flow, ctx).await,
            Action::Raw(raw) => Ok(Step::new(
                raw.name.clone(),
                flow.clone(),
                None,
                PreparedCall {
                    target: raw.target,
                    call_data: raw.call_data.clone(),
                    clipboard: raw.clipboard.clone(),
                },
                CallDecoder::Opaque,
            )),
        }
    }
}
