//! A built step: target, call data, clipboard, and enough typing to
//! decode the call data (and its return data) back into structured form.

use alloy::primitives::{aliases::I96, Address, Bytes, U256};
use alloy::sol_types::SolCall;
use thiserror::Error;

use crate::contracts::{IDepot, IERC20, IFarmDiamond, IWell};
use crate::model::Amount;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("abi decoding failed")]
    Abi(#[from] alloy::sol_types::Error),

    #[error("expected {expected} return payloads, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}

/// The encoded form of one step, ready to drop into a `farm` or
/// `advancedFarm` batch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PreparedCall {
    pub target: Address,
    pub call_data: Bytes,
    pub clipboard: Bytes,
}

/// One resolved step of a prepared workflow.
///
/// `amount_out` is denominated in the step's output token. For
/// reverse-estimated workflows the engine rewrites it so the field always
/// reads in forward order.
#[derive(Debug, Clone)]
pub struct Step {
    pub name: String,
    pub amount_out: Amount,
    /// Native currency this call must carry, if any (18 decimals).
    pub value: Option<Amount>,
    prepared: PreparedCall,
    decoder: CallDecoder,
}

impl Step {
    pub fn new(
        name: impl Into<String>,
        amount_out: Amount,
        value: Option<Amount>,
        prepared: PreparedCall,
        decoder: CallDecoder,
    ) -> Self {
        Step {
            name: name.into(),
            amount_out,
            value,
            prepared,
            decoder,
        }
    }

    /// The encoded call. Resolution happened at build time, so repeated
    /// calls return byte-identical data.
    pub fn prepare(&self) -> PreparedCall {
        self.prepared.clone()
    }

    pub fn target(&self) -> Address {
        self.prepared.target
    }

    /// Decode this step's call data back into typed arguments.
    pub fn decode(&self) -> Result<DecodedCall, DecodeError> {
        self.decoder.decode(&self.prepared.call_data)
    }

    /// Decode raw return data from executing this step.
    pub fn decode_result(&self, data: &[u8]) -> Result<DecodedResult, DecodeError> {
        self.decoder.decode_result(data)
    }
}

/// Which generated call struct a step's bytes correspond to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDecoder {
    Approve,
    TransferToken,
    WrapEth,
    UnwrapEth,
    Exchange,
    ExchangeUnderlying,
    AddLiquidity,
    RemoveLiquidityOneToken,
    Deposit,
    Convert,
    Mow,
    Plant,
    Harvest,
    ClaimFertilized,
    Shift,
    AdvancedPipe,
    /// Raw steps decode to their bytes unchanged.
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedCall {
    Approve {
        spender: Address,
        amount: U256,
    },
    TransferToken {
        token: Address,
        recipient: Address,
        amount: U256,
        from_mode: u8,
        to_mode: u8,
    },
    WrapEth {
        amount: U256,
        to_mode: u8,
    },
    UnwrapEth {
        amount: U256,
        from_mode: u8,
    },
    Exchange {
        pool: Address,
        registry: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        min_amount_out: U256,
        from_mode: u8,
        to_mode: u8,
    },
    ExchangeUnderlying {
        pool: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        min_amount_out: U256,
        from_mode: u8,
        to_mode: u8,
    },
    AddLiquidity {
        pool: Address,
        registry: Address,
        amounts: Vec<U256>,
        min_amount_out: U256,
        from_mode: u8,
        to_mode: u8,
    },
    RemoveLiquidityOneToken {
        pool: Address,
        registry: Address,
        token_out: Address,
        amount_in: U256,
        min_amount_out: U256,
        from_mode: u8,
        to_mode: u8,
    },
    Deposit {
        token: Address,
        amount: U256,
        from_mode: u8,
    },
    Convert {
        convert_data: Bytes,
        stems: Vec<I96>,
        amounts: Vec<U256>,
    },
    Mow {
        account: Address,
        token: Address,
    },
    Plant,
    Harvest {
        field_id: U256,
        plots: Vec<U256>,
        to_mode: u8,
    },
    ClaimFertilized {
        ids: Vec<U256>,
        to_mode: u8,
    },
    Shift {
        token_out: Address,
        min_amount_out: U256,
        recipient: Address,
    },
    AdvancedPipe {
        pipes: usize,
        value: U256,
    },
    Raw(Bytes),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedResult {
    None,
    Bool(bool),
    Amount(U256),
    Deposit {
        amount: U256,
        bdv: U256,
        stem: I96,
    },
    Convert {
        to_stem: I96,
        from_amount: U256,
        to_amount: U256,
        from_bdv: U256,
        to_bdv: U256,
    },
    Plant {
        beans: U256,
        stem: I96,
    },
    Raw(Bytes),
}

impl CallDecoder {
    pub fn decode(&self, data: &[u8]) -> Result<DecodedCall, DecodeError> {
        let decoded = match self {
            CallDecoder::Approve => {
                let c = IERC20::approveCall::abi_decode(data)?;
                DecodedCall::Approve {
                    spender: c.spender,
                    amount: c.amount,
                }
            }
            CallDecoder::TransferToken => {
                let c = IFarmDiamond::transferTokenCall::abi_decode(data)?;
                DecodedCall::TransferToken {
                    token: c.token,
                    recipient: c.recipient,
                    amount: c.amount,
                    from_mode: c.fromMode,
                    to_mode: c.toMode,
                }
            }
            CallDecoder::WrapEth => {
                let c = IFarmDiamond::wrapEthCall::abi_decode(data)?;
                DecodedCall::WrapEth {
                    amount: c.amount,
                    to_mode: c.mode,
                }
            }
            CallDecoder::UnwrapEth => {
                let c = IFarmDiamond::unwrapEthCall::abi_decode(data)?;
                DecodedCall::UnwrapEth {
                    amount: c.amount,
                    from_mode: c.mode,
                }
            }
            CallDecoder::Exchange => {
                let c = IFarmDiamond::exchangeCall::abi_decode(data)?;
                DecodedCall::Exchange {
                    pool: c.pool,
                    registry: c.registry,
                    token_in: c.fromToken,
                    token_out: c.toToken,
                    amount_in: c.amountIn,
                    min_amount_out: c.minAmountOut,
                    from_mode: c.fromMode,
                    to_mode: c.toMode,
                }
            }
            CallDecoder::ExchangeUnderlying => {
                let c = IFarmDiamond::exchangeUnderlyingCall::abi_decode(data)?;
                DecodedCall::ExchangeUnderlying {
                    pool: c.pool,
                    token_in: c.fromToken,
                    token_out: c.toToken,
                    amount_in: c.amountIn,
                    min_amount_out: c.minAmountOut,
                    from_mode: c.fromMode,
                    to_mode: c.toMode,
                }
            }
            CallDecoder::AddLiquidity => {
                let c = IFarmDiamond::addLiquidityCall::abi_decode(data)?;
                DecodedCall::AddLiquidity {
                    pool: c.pool,
                    registry: c.registry,
                    amounts: c.amounts,
                    min_amount_out: c.minAmountOut,
                    from_mode: c.fromMode,
                    to_mode: c.toMode,
                }
            }
            CallDecoder::RemoveLiquidityOneToken => {
                let c = IFarmDiamond::removeLiquidityOneTokenCall::abi_decode(data)?;
                DecodedCall::RemoveLiquidityOneToken {
                    pool: c.pool,
                    registry: c.registry,
                    token_out: c.toToken,
                    amount_in: c.amountIn,
                    min_amount_out: c.minAmountOut,
                    from_mode: c.fromMode,
                    to_mode: c.toMode,
                }
            }
            CallDecoder::Deposit => {
                let c = IFarmDiamond::depositCall::abi_decode(data)?;
                DecodedCall::Deposit {
                    token: c.token,
                    amount: c.amount,
                    from_mode: c.mode,
                }
            }
            CallDecoder::Convert => {
                let c = IFarmDiamond::convertCall::abi_decode(data)?;
                DecodedCall::Convert {
                    convert_data: c.convertData,
                    stems: c.stems,
                    amounts: c.amounts,
                }
            }
            CallDecoder::Mow => {
                let c = IFarmDiamond::mowCall::abi_decode(data)?;
                DecodedCall::Mow {
                    account: c.account,
                    token: c.token,
                }
            }
            CallDecoder::Plant => {
                IFarmDiamond::plantCall::abi_decode(data)?;
                DecodedCall::Plant
            }
            CallDecoder::Harvest => {
                let c = IFarmDiamond::harvestCall::abi_decode(data)?;
                DecodedCall::Harvest {
                    field_id: c.fieldId,
                    plots: c.plots,
                    to_mode: c.mode,
                }
            }
            CallDecoder::ClaimFertilized => {
                let c = IFarmDiamond::claimFertilizedCall::abi_decode(data)?;
                DecodedCall::ClaimFertilized {
                    ids: c.ids,
                    to_mode: c.mode,
                }
            }
            CallDecoder::Shift => {
                let c = IWell::shiftCall::abi_decode(data)?;
                DecodedCall::Shift {
                    token_out: c.tokenOut,
                    min_amount_out: c.minAmountOut,
                    recipient: c.recipient,
                }
            }
            CallDecoder::AdvancedPipe => {
                let c = IDepot::advancedPipeCall::abi_decode(data)?;
                DecodedCall::AdvancedPipe {
                    pipes: c.pipes.len(),
                    value: c.value,
                }
            }
            CallDecoder::Opaque => DecodedCall::Raw(Bytes::copy_from_slice(data)),
        };
        Ok(decoded)
    }

    pub fn decode_result(&self, data: &[u8]) -> Result<DecodedResult, DecodeError> {
        let decoded = match self {
            CallDecoder::Approve => {
                DecodedResult::Bool(IERC20::approveCall::abi_decode_returns(data)?)
            }
            CallDecoder::Shift => {
                DecodedResult::Amount(IWell::shiftCall::abi_decode_returns(data)?)
            }
            CallDecoder::Deposit => {
                let r = IFarmDiamond::depositCall::abi_decode_returns(data)?;
                DecodedResult::Deposit {
                    amount: r.amount_,
                    bdv: r.bdv,
                    stem: r.stem,
                }
            }
            CallDecoder::Convert => {
                let r = IFarmDiamond::convertCall::abi_decode_returns(data)?;
                DecodedResult::Convert {
                    to_stem: r.toStem,
                    from_amount: r.fromAmount,
                    to_amount: r.toAmount,
                    from_bdv: r.fromBdv,
                    to_bdv: r.toBdv,
                }
            }
            CallDecoder::Plant => {
                let r = IFarmDiamond::plantCall::abi_decode_returns(data)?;
                DecodedResult::Plant {
                    beans: r.beans,
                    stem: r.stem,
                }
            }
            CallDecoder::Opaque => DecodedResult::Raw(Bytes::copy_from_slice(data)),
            _ => DecodedResult::None,
        };
        Ok(decoded)
    }
}
