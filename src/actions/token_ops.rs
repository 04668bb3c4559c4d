//! Token movement primitives: approvals, balance transfers, and native
//! currency wrapping. All of these pass the flow amount through
//! unchanged, so they are trivially invertible.

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;

use crate::actions::AmountSource;
use crate::clipboard;
use crate::contracts::{IERC20, IFarmDiamond};
use crate::model::{Amount, FromMode, ToMode, Token};
use crate::workflow::step::{CallDecoder, PreparedCall, Step};
use crate::workflow::{RunContext, WorkflowError, NATIVE_DECIMALS};

/// Approve `spender` to move the flow amount of `token`.
#[derive(Debug, Clone)]
pub struct Approve {
    pub token: Token,
    pub spender: Address,
}

impl Approve {
    pub(crate) fn build(
        &self,
        flow: &Amount,
        _ctx: &RunContext<'_>,
    ) -> Result<Step, WorkflowError> {
        let call_data = IERC20::approveCall {
            spender: self.spender,
            amount: flow.raw(),
        }
        .abi_encode();
        Ok(Step::new(
            "approve",
            flow.clone(),
            None,
            PreparedCall {
                target: self.token.address,
                call_data: call_data.into(),
                clipboard: clipboard::encode_empty(),
            },
            CallDecoder::Approve,
        ))
    }
}

/// Move tokens between balances and/or recipients.
#[derive(Debug, Clone)]
pub struct TransferToken {
    pub token: Token,
    pub recipient: Address,
    pub from_mode: FromMode,
    pub to_mode: ToMode,
    /// Usually [`AmountSource::Flow`]; a tag source splices a previous
    /// step's return value into the amount argument on chain.
    pub amount_source: AmountSource,
}

impl TransferToken {
    pub(crate) fn build(
        &self,
        flow: &Amount,
        ctx: &RunContext<'_>,
    ) -> Result<Step, WorkflowError> {
        let (amount, clip) = match &self.amount_source {
            AmountSource::Flow => (flow.raw(), clipboard::encode_empty()),
            AmountSource::Tag { tag, copy_slot } => {
                let source = ctx.find_tag("transfer_token", tag)?;
                // `amount` is the third argument, slot 2
                (U256::MAX, clipboard::encode_slot(source as u32, *copy_slot, 2))
            }
        };
        let call_data = IFarmDiamond::transferTokenCall {
            token: self.token.address,
            recipient: self.recipient,
            amount,
            fromMode: self.from_mode.as_u8(),
            toMode: self.to_mode.as_u8(),
        }
        .abi_encode();
        Ok(Step::new(
            "transfer_token",
            flow.clone(),
            None,
            PreparedCall {
                target: ctx.contracts.diamond,
                call_data: call_data.into(),
                clipboard: clip,
            },
            CallDecoder::TransferToken,
        ))
    }
}

/// Wrap the flow of native currency into the wrapped ERC-20. The call
/// carries the flow as attached value.
#[derive(Debug, Clone)]
pub struct WrapEth {
    pub to_mode: ToMode,
}

impl WrapEth {
    pub(crate) fn build(
        &self,
        flow: &Amount,
        ctx: &RunContext<'_>,
    ) -> Result<Step, WorkflowError> {
        let value = flow.rescale(NATIVE_DECIMALS)?;
        let call_data = IFarmDiamond::wrapEthCall {
            amount: value.raw(),
            mode: self.to_mode.as_u8(),
        }
        .abi_encode();
        Ok(Step::new(
            "wrap_eth",
            value.clone(),
            Some(value),
            PreparedCall {
                target: ctx.contracts.diamond,
                call_data: call_data.into(),
                clipboard: clipboard::encode_empty(),
            },
            CallDecoder::WrapEth,
        ))
    }
}

/// Unwrap the flow of wrapped ERC-20 back into native currency.
#[derive(Debug, Clone)]
pub struct UnwrapEth {
    pub from_mode: FromMode,
}

impl UnwrapEth {
    pub(crate) fn build(
        &self,
        flow: &Amount,
        ctx: &RunContext<'_>,
    ) -> Result<Step, WorkflowError> {
        let call_data = IFarmDiamond::unwrapEthCall {
            amount: flow.raw(),
            mode: self.from_mode.as_u8(),
        }
        .abi_encode();
        Ok(Step::new(
            "unwrap_eth",
            flow.clone(),
            None,
            PreparedCall {
                target: ctx.contracts.diamond,
                call_data: call_data.into(),
                clipboard: clipboard::encode_empty(),
            },
            CallDecoder::UnwrapEth,
        ))
    }
}
