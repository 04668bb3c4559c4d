//! On-chain interfaces and well-known deployment addresses.
//!
//! All call data the engine produces is ABI-encoded through the typed
//! call structs generated here, and decoded back through the same
//! structs, so an encode/decode round trip is exact by construction.

use alloy::primitives::Address;
use alloy::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

sol! {
    /// The protocol diamond: every farmable facet function the engine
    /// targets, plus the `farm` batching entrypoint.
    #[derive(Debug, PartialEq, Eq)]
    interface IFarmDiamond {
        function transferToken(
            address token,
            address recipient,
            uint256 amount,
            uint8 fromMode,
            uint8 toMode
        ) external payable;

        function wrapEth(uint256 amount, uint8 mode) external payable;
        function unwrapEth(uint256 amount, uint8 mode) external payable;

        function exchange(
            address pool,
            address registry,
            address fromToken,
            address toToken,
            uint256 amountIn,
            uint256 minAmountOut,
            uint8 fromMode,
            uint8 toMode
        ) external payable;

        function exchangeUnderlying(
            address pool,
            address fromToken,
            address toToken,
            uint256 amountIn,
            uint256 minAmountOut,
            uint8 fromMode,
            uint8 toMode
        ) external payable;

        function addLiquidity(
            address pool,
            address registry,
            uint256[] amounts,
            uint256 minAmountOut,
            uint8 fromMode,
            uint8 toMode
        ) external payable;

        function removeLiquidityOneToken(
            address pool,
            address registry,
            address toToken,
            uint256 amountIn,
            uint256 minAmountOut,
            uint8 fromMode,
            uint8 toMode
        ) external payable;

        function deposit(address token, uint256 amount, uint8 mode)
            external
            payable
            returns (uint256 amount_, uint256 bdv, int96 stem);

        function convert(bytes convertData, int96[] stems, uint256[] amounts)
            external
            payable
            returns (int96 toStem, uint256 fromAmount, uint256 toAmount, uint256 fromBdv, uint256 toBdv);

        function mow(address account, address token) external payable;

        function plant() external payable returns (uint256 beans, int96 stem);

        function harvest(uint256 fieldId, uint256[] plots, uint8 mode) external payable;

        function claimFertilized(uint256[] ids, uint8 mode) external payable;

        function farm(bytes[] data) external payable returns (bytes[] results);
    }
}

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct AdvancedFarmCall {
        bytes callData;
        bytes clipboard;
    }

    #[derive(Debug, PartialEq, Eq)]
    struct AdvancedPipeCall {
        address target;
        bytes callData;
        bytes clipboard;
    }

    /// Advanced batching entrypoints. `advancedFarm` lives on the
    /// diamond; `advancedPipe` on the depot, forwarding through the
    /// pipeline contract.
    #[derive(Debug, PartialEq, Eq)]
    interface IDepot {
        function advancedFarm(AdvancedFarmCall[] data)
            external
            payable
            returns (bytes[] results);

        function advancedPipe(AdvancedPipeCall[] pipes, uint256 value)
            external
            payable
            returns (bytes[] results);
    }
}

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IWell {
        function shift(address tokenOut, uint256 minAmountOut, address recipient)
            external
            returns (uint256 amountOut);
    }
}

/// Deployment addresses every built step targets. Passed explicitly to
/// the workflow so tests and forks can point anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSet {
    pub diamond: Address,
    pub pipeline: Address,
    pub depot: Address,
}

impl ContractSet {
    pub fn new(diamond: Address, pipeline: Address, depot: Address) -> Self {
        ContractSet {
            diamond,
            pipeline,
            depot,
        }
    }

    /// The canonical mainnet deployment.
    pub fn mainnet() -> Self {
        ContractSet {
            diamond: "0xC1E088fC1323b20BCBee9bd1B9fC9546db5624C5"
                .parse()
                .unwrap(),
            pipeline: "0xb1bE0000C6B3C62749b5F0c92480146452D15423"
                .parse()
                .unwrap(),
            depot: "0xDEb0f00071497a5cc9b4A6B96068277e57A82Ae2"
                .parse()
                .unwrap(),
        }
    }
}
