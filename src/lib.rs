//! farm-flow: an engine that compiles a sequence of independent on-chain
//! farm operations (approvals, deposits, exchanges, wraps, claims) into a
//! single atomic multi-call, plus a route graph that discovers which
//! sequence of exchange hops converts one asset into another.
//!
//! The engine prepares and decodes call data only. Submitting the
//! multi-call, handling receipts, and retrying transient failures belong
//! to the caller; quotes are obtained through the [`quote::QuoteProvider`]
//! seam the caller supplies.

pub mod actions;
pub mod clipboard;
pub mod contracts;
pub mod encode;
pub mod model;
pub mod quote;
pub mod route;
pub mod workflow;

pub use actions::Action;
pub use clipboard::ClipboardRef;
pub use contracts::ContractSet;
pub use model::{Amount, FromMode, Slippage, ToMode, Token};
pub use quote::{QuoteProvider, Venue};
pub use route::{Route, RouteError, RouteGraph};
pub use workflow::{
    BuildOptions, FarmWorkflow, PreparedCall, PreparedWorkflow, RunMode, WorkflowError,
};
