//! The workflow engine: an ordered list of step generators resolved into
//! encoded calls, threading each step's output into the next step's
//! input.

pub mod step;

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::debug;

use crate::actions::{Action, AmountSource};
use crate::clipboard::{self, ClipboardError};
use crate::contracts::ContractSet;
use crate::model::{Amount, AmountError, Slippage};
use crate::quote::QuoteProvider;

pub use step::{CallDecoder, DecodeError, DecodedCall, DecodedResult, PreparedCall, Step};

/// Native currency precision, used for the accumulated call value.
pub const NATIVE_DECIMALS: u8 = 18;

/// How a workflow build resolves amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Estimate forward: given an input, compute each step's output.
    Forward,
    /// Estimate in reverse: given a desired final output, compute the
    /// input required. Results are still presented in forward order.
    ReverseEstimate,
    /// Build for on-chain execution.
    Execute,
    /// Build for an `eth_call` dry run.
    StaticCall,
}

impl RunMode {
    /// True for modes that produce a transaction rather than an estimate.
    pub fn executes(self) -> bool {
        matches!(self, RunMode::Execute | RunMode::StaticCall)
    }

    pub fn is_reverse(self) -> bool {
        matches!(self, RunMode::ReverseEstimate)
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("duplicate step tag `{tag}`")]
    DuplicateTag { tag: String },

    #[error("step {index} ({name}) references unknown tag `{tag}`")]
    UnknownTag {
        index: usize,
        name: String,
        tag: String,
    },

    #[error("step {index} ({name}) requires a slippage tolerance")]
    MissingSlippage { index: usize, name: String },

    #[error(
        "step {index} ({name}) clipboard references step {copy_from}, which does not precede it"
    )]
    ForwardClipboardRef {
        index: usize,
        name: String,
        copy_from: u32,
    },

    #[error("step {index} ({name}) cannot be estimated in reverse")]
    NotInvertible { index: usize, name: String },

    #[error("quote failed for step {index} ({name})")]
    Quote {
        index: usize,
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// Per-step flags set when a generator is added.
#[derive(Debug, Clone, Default)]
pub struct StepOptions {
    /// Name under which later steps can reference this step's realized
    /// index.
    pub tag: Option<String>,
    /// Include this step only when building for execution, not during
    /// estimates.
    pub only_execute: bool,
    /// Leave this step out entirely.
    pub skip: bool,
}

/// Everything a generator sees while it resolves.
pub struct RunContext<'a> {
    pub run_mode: RunMode,
    pub slippage: Option<Slippage>,
    pub quoter: &'a dyn QuoteProvider,
    pub contracts: &'a ContractSet,
    /// Realized index of the step being built, in forward order.
    pub step_index: usize,
    tag_map: &'a HashMap<String, usize>,
}

impl RunContext<'_> {
    /// Realized index of a tagged earlier step.
    pub fn find_tag(&self, name: &str, tag: &str) -> Result<usize, WorkflowError> {
        self.tag_map
            .get(tag)
            .copied()
            .ok_or_else(|| WorkflowError::UnknownTag {
                index: self.step_index,
                name: name.to_string(),
                tag: tag.to_string(),
            })
    }

    /// The slippage tolerance, or the step's failure if none was given.
    /// Generators call this before issuing any quote.
    pub fn require_slippage(&self, name: &str) -> Result<Slippage, WorkflowError> {
        self.slippage.ok_or_else(|| WorkflowError::MissingSlippage {
            index: self.step_index,
            name: name.to_string(),
        })
    }

    pub fn quote_error(&self, name: &str, source: anyhow::Error) -> WorkflowError {
        WorkflowError::Quote {
            index: self.step_index,
            name: name.to_string(),
            source,
        }
    }

    pub fn not_invertible(&self, name: &str) -> WorkflowError {
        WorkflowError::NotInvertible {
            index: self.step_index,
            name: name.to_string(),
        }
    }
}

/// Inputs for one build pass.
pub struct BuildOptions<'a> {
    pub run_mode: RunMode,
    pub slippage: Option<Slippage>,
    pub quoter: &'a dyn QuoteProvider,
}

/// The result of resolving a workflow: encoded steps in forward order.
#[derive(Debug)]
pub struct PreparedWorkflow {
    pub steps: Vec<Step>,
    /// Final output for forward modes; required input for
    /// [`RunMode::ReverseEstimate`].
    pub amount_out: Amount,
    /// Sum of every step's attached native value, 18 decimals.
    pub total_value: Amount,
    pub run_mode: RunMode,
}

impl PreparedWorkflow {
    pub fn calls(&self) -> Vec<PreparedCall> {
        self.steps.iter().map(|s| s.prepare()).collect()
    }

    /// Decode the raw return payloads of an executed multi-call, one per
    /// step in order.
    pub fn decode_results(
        &self,
        returns: &[alloy::primitives::Bytes],
    ) -> Result<Vec<DecodedResult>, DecodeError> {
        if returns.len() != self.steps.len() {
            return Err(DecodeError::LengthMismatch {
                expected: self.steps.len(),
                got: returns.len(),
            });
        }
        self.steps
            .iter()
            .zip(returns)
            .map(|(step, data)| step.decode_result(data))
            .collect()
    }
}

/// An ordered, buildable sequence of farm actions.
///
/// Adding generators never quotes anything; all resolution happens in
/// [`FarmWorkflow::build`], which may be called repeatedly with
/// different amounts and run modes.
#[derive(Debug)]
pub struct FarmWorkflow {
    name: String,
    contracts: ContractSet,
    generators: Vec<(Action, StepOptions)>,
    declared_tags: HashSet<String>,
}

impl FarmWorkflow {
    pub fn new(name: impl Into<String>, contracts: ContractSet) -> Self {
        FarmWorkflow {
            name: name.into(),
            contracts,
            generators: Vec::new(),
            declared_tags: HashSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contracts(&self) -> &ContractSet {
        &self.contracts
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn add(&mut self, action: Action) -> Result<&mut Self, WorkflowError> {
        self.add_with(action, StepOptions::default())
    }

    pub fn add_tagged(
        &mut self,
        action: Action,
        tag: impl Into<String>,
    ) -> Result<&mut Self, WorkflowError> {
        self.add_with(
            action,
            StepOptions {
                tag: Some(tag.into()),
                ..StepOptions::default()
            },
        )
    }

    pub fn add_all(
        &mut self,
        actions: impl IntoIterator<Item = Action>,
    ) -> Result<&mut Self, WorkflowError> {
        for action in actions {
            self.add(action)?;
        }
        Ok(self)
    }

    /// Append a generator. Tag collisions and raw calls whose clipboard
    /// cannot possibly point backwards fail here, before anything is
    /// quoted.
    pub fn add_with(
        &mut self,
        action: Action,
        options: StepOptions,
    ) -> Result<&mut Self, WorkflowError> {
        if let Some(tag) = &options.tag {
            if !self.declared_tags.insert(tag.clone()) {
                return Err(WorkflowError::DuplicateTag { tag: tag.clone() });
            }
        }
        if let Action::Raw(raw) = &action {
            let clip = clipboard::decode(&raw.clipboard)?;
            for r in &clip.refs {
                if r.copy_from_step_index as usize >= self.generators.len() {
                    return Err(WorkflowError::ForwardClipboardRef {
                        index: self.generators.len(),
                        name: raw.name.clone(),
                        copy_from: r.copy_from_step_index,
                    });
                }
            }
        }
        self.generators.push((action, options));
        Ok(self)
    }

    /// Resolve every generator into an encoded step.
    ///
    /// Forward modes thread `amount` through the steps head to tail. In
    /// [`RunMode::ReverseEstimate`], `amount` is the desired final
    /// output; generators are resolved tail to head and the returned
    /// steps are re-ordered so callers always see forward order, with
    /// `amount_out` holding the required input.
    pub async fn build(
        &self,
        amount: Amount,
        opts: BuildOptions<'_>,
    ) -> Result<PreparedWorkflow, WorkflowError> {
        // Which generators actually become steps is independent of the
        // walk direction, so realized indices and the tag map can be
        // fixed up front.
        let realized: Vec<usize> = self
            .generators
            .iter()
            .enumerate()
            .filter(|(_, (_, o))| !o.skip && (!o.only_execute || opts.run_mode.executes()))
            .map(|(i, _)| i)
            .collect();
        let tag_map: HashMap<String, usize> = realized
            .iter()
            .enumerate()
            .filter_map(|(step_index, &gi)| {
                self.generators[gi]
                    .1
                    .tag
                    .clone()
                    .map(|tag| (tag, step_index))
            })
            .collect();

        // Every clipboard target is known before anything resolves, so
        // dangling and forward-pointing references fail here, before a
        // single quote is issued.
        self.check_clipboard_targets(&realized, &tag_map)?;

        let reverse = opts.run_mode.is_reverse();
        let mut flow = amount;
        let mut total_value = Amount::zero(NATIVE_DECIMALS);
        let mut steps: Vec<Step> = Vec::with_capacity(realized.len());

        let order: Vec<usize> = if reverse {
            (0..realized.len()).rev().collect()
        } else {
            (0..realized.len()).collect()
        };
        for step_index in order {
            let (action, _) = &self.generators[realized[step_index]];
            let ctx = RunContext {
                run_mode: opts.run_mode,
                slippage: opts.slippage,
                quoter: opts.quoter,
                contracts: &self.contracts,
                step_index,
                tag_map: &tag_map,
            };
            let mut step = action.build(&flow, &ctx).await?;
            debug!(
                workflow = %self.name,
                step = step_index,
                name = %step.name,
                amount_out = %step.amount_out,
                "built step"
            );

            let clip = clipboard::decode(&step.prepare().clipboard)?;
            for r in &clip.refs {
                if r.copy_from_step_index as usize >= step_index {
                    return Err(WorkflowError::ForwardClipboardRef {
                        index: step_index,
                        name: step.name.clone(),
                        copy_from: r.copy_from_step_index,
                    });
                }
            }

            if let Some(value) = &step.value {
                total_value = total_value.checked_add(value)?;
            }
            if reverse {
                // Present the step's forward output and keep walking
                // with the input this step requires.
                let required = step.amount_out.clone();
                step.amount_out = flow;
                flow = required;
            } else {
                flow = step.amount_out.clone();
            }
            steps.push(step);
        }
        if reverse {
            steps.reverse();
        }

        debug!(
            workflow = %self.name,
            steps = steps.len(),
            amount_out = %flow,
            total_value = %total_value,
            "workflow built"
        );
        Ok(PreparedWorkflow {
            steps,
            amount_out: flow,
            total_value,
            run_mode: opts.run_mode,
        })
    }

    /// Resolve every tag-sourced amount and raw clipboard against the
    /// realized step indices. Runs before the build walk.
    fn check_clipboard_targets(
        &self,
        realized: &[usize],
        tag_map: &HashMap<String, usize>,
    ) -> Result<(), WorkflowError> {
        for (step_index, &gi) in realized.iter().enumerate() {
            let (action, _) = &self.generators[gi];
            if let Some(AmountSource::Tag { tag, .. }) = action.amount_source() {
                let source =
                    tag_map
                        .get(tag)
                        .copied()
                        .ok_or_else(|| WorkflowError::UnknownTag {
                            index: step_index,
                            name: action.name().to_string(),
                            tag: tag.clone(),
                        })?;
                if source >= step_index {
                    return Err(WorkflowError::ForwardClipboardRef {
                        index: step_index,
                        name: action.name().to_string(),
                        copy_from: source as u32,
                    });
                }
            }
            if let Action::Raw(raw) = action {
                let clip = clipboard::decode(&raw.clipboard)?;
                for r in &clip.refs {
                    if r.copy_from_step_index as usize >= step_index {
                        return Err(WorkflowError::ForwardClipboardRef {
                            index: step_index,
                            name: raw.name.clone(),
                            copy_from: r.copy_from_step_index,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
