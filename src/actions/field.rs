//! Field and barn claims. Both pass the flow through; what they claim is
//! independent of the amount moving through the workflow.

use alloy::primitives::U256;
use alloy::sol_types::SolCall;

use crate::clipboard;
use crate::contracts::IFarmDiamond;
use crate::model::{Amount, ToMode};
use crate::workflow::step::{CallDecoder, PreparedCall, Step};
use crate::workflow::RunContext;

/// Redeem harvestable plots for their pods' beans.
#[derive(Debug, Clone)]
pub struct Harvest {
    pub field_id: U256,
    pub plots: Vec<U256>,
    pub to_mode: ToMode,
}

impl Harvest {
    pub(crate) fn build(&self, flow: &Amount, ctx: &RunContext<'_>) -> Step {
        let call_data = IFarmDiamond::harvestCall {
            fieldId: self.field_id,
            plots: self.plots.clone(),
            mode: self.to_mode.as_u8(),
        }
        .abi_encode();
        Step::new(
            "harvest",
            flow.clone(),
            None,
            PreparedCall {
                target: ctx.contracts.diamond,
                call_data: call_data.into(),
                clipboard: clipboard::encode_empty(),
            },
            CallDecoder::Harvest,
        )
    }
}

/// Claim beans owed to fertilizer ids.
#[derive(Debug, Clone)]
pub struct Rinse {
    pub ids: Vec<U256>,
    pub to_mode: ToMode,
}

impl Rinse {
    pub(crate) fn build(&self, flow: &Amount, ctx: &RunContext<'_>) -> Step {
        let call_data = IFarmDiamond::claimFertilizedCall {
            ids: self.ids.clone(),
            mode: self.to_mode.as_u8(),
        }
        .abi_encode();
        Step::new(
            "rinse",
            flow.clone(),
            None,
            PreparedCall {
                target: ctx.contracts.diamond,
                call_data: call_data.into(),
                clipboard: clipboard::encode_empty(),
            },
            CallDecoder::ClaimFertilized,
        )
    }
}
