//! Batch encoders: wrap a prepared workflow's steps into a single
//! `farm`, `advancedFarm` or `advancedPipe` call.
//!
//! `farm` targets the diamond and carries no clipboards; `advancedFarm`
//! targets the diamond and pairs each call with its clipboard;
//! `advancedPipe` goes through the depot and keeps each call's own
//! target.

use alloy::primitives::{Bytes, U256};
use alloy::sol_types::SolCall;
use thiserror::Error;

use crate::clipboard;
use crate::contracts::{AdvancedFarmCall, AdvancedPipeCall, IDepot, IFarmDiamond};
use crate::workflow::PreparedWorkflow;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("step {index} ({name}) carries a clipboard; use advancedFarm")]
    ClipboardNotSupported { index: usize, name: String },

    #[error(transparent)]
    Clipboard(#[from] clipboard::ClipboardError),

    #[error(transparent)]
    Abi(#[from] alloy::sol_types::Error),
}

/// Encode as a plain `farm(bytes[])` call. Fails if any step needs a
/// clipboard, since `farm` cannot splice return data.
pub fn encode_farm(workflow: &PreparedWorkflow) -> Result<Bytes, EncodeError> {
    let mut data = Vec::with_capacity(workflow.steps.len());
    for (index, step) in workflow.steps.iter().enumerate() {
        let call = step.prepare();
        let clip = clipboard::decode(&call.clipboard)?;
        if !clip.refs.is_empty() || clip.ether.is_some() {
            return Err(EncodeError::ClipboardNotSupported {
                index,
                name: step.name.clone(),
            });
        }
        data.push(call.call_data);
    }
    Ok(IFarmDiamond::farmCall { data }.abi_encode().into())
}

pub fn decode_farm(data: &[u8]) -> Result<Vec<Bytes>, EncodeError> {
    Ok(IFarmDiamond::farmCall::abi_decode(data)?.data)
}

/// Encode as `advancedFarm(AdvancedFarmCall[])`, clipboards included.
pub fn encode_advanced_farm(workflow: &PreparedWorkflow) -> Bytes {
    let data = workflow
        .steps
        .iter()
        .map(|step| {
            let call = step.prepare();
            AdvancedFarmCall {
                callData: call.call_data,
                clipboard: call.clipboard,
            }
        })
        .collect();
    IDepot::advancedFarmCall { data }.abi_encode().into()
}

pub fn decode_advanced_farm(data: &[u8]) -> Result<Vec<AdvancedFarmCall>, EncodeError> {
    Ok(IDepot::advancedFarmCall::abi_decode(data)?.data)
}

/// Encode as `advancedPipe(AdvancedPipeCall[], uint256)`, keeping each
/// step's own target. `value` is the native currency forwarded to the
/// pipeline, normally the workflow's accumulated total.
pub fn encode_advanced_pipe(workflow: &PreparedWorkflow, value: U256) -> Bytes {
    let pipes = workflow
        .steps
        .iter()
        .map(|step| {
            let call = step.prepare();
            AdvancedPipeCall {
                target: call.target,
                callData: call.call_data,
                clipboard: call.clipboard,
            }
        })
        .collect();
    IDepot::advancedPipeCall { pipes, value }.abi_encode().into()
}

pub fn decode_advanced_pipe(data: &[u8]) -> Result<(Vec<AdvancedPipeCall>, U256), EncodeError> {
    let call = IDepot::advancedPipeCall::abi_decode(data)?;
    Ok((call.pipes, call.value))
}
