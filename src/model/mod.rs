pub mod amount;
pub mod mode;
pub mod slippage;
pub mod token;

pub use amount::{Amount, AmountError};
pub use mode::{FromMode, ToMode};
pub use slippage::{InvalidSlippage, Slippage};
pub use token::Token;
