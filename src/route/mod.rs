//! Directed multigraph of swap routes between assets.
//!
//! Nodes are tokens keyed by symbol; edges carry a builder closure that
//! turns the hop into an [`Action`] once the caller's balance modes are
//! known. Path discovery is breadth-first, so the route found is always
//! among the shortest, and parallel edges are tried in the order they
//! were registered.

use std::collections::{HashMap, HashSet, VecDeque};

use alloy::primitives::Address;
use thiserror::Error;
use tracing::debug;

use crate::actions::{Action, Exchange, Shift, UnwrapEth, WrapEth};
use crate::model::{FromMode, ToMode, Token};
use crate::quote::Venue;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("unknown asset `{symbol}`")]
    UnknownAsset { symbol: String },

    #[error("no route from `{from}` to `{to}`")]
    NoPath { from: String, to: String },

    #[error(
        "hop {index} ({label}: {from} -> {to}) cannot deliver to an internal balance mid-route"
    )]
    IncompatibleModes {
        index: usize,
        label: String,
        from: String,
        to: String,
    },
}

type EdgeBuilder = Box<dyn Fn(FromMode, ToMode) -> Action + Send + Sync>;

/// One directed hop between two assets.
pub struct RouteEdge {
    pub from: String,
    pub to: String,
    pub label: &'static str,
    /// Whether this hop can deliver its output to an internal balance.
    /// Hops that cannot are only usable as the final leg of a route.
    pub internal_ok: bool,
    build: EdgeBuilder,
}

impl RouteEdge {
    pub fn build(&self, from_mode: FromMode, to_mode: ToMode) -> Action {
        (self.build)(from_mode, to_mode)
    }
}

impl std::fmt::Debug for RouteEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEdge")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("label", &self.label)
            .field("internal_ok", &self.internal_ok)
            .finish()
    }
}

/// A discovered path through the graph.
#[derive(Debug)]
pub struct Route<'g> {
    pub edges: Vec<&'g RouteEdge>,
}

impl Route<'_> {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Turn the route into workflow actions.
    ///
    /// The caller's modes apply only at the endpoints: the first hop
    /// draws from `from_mode` and the last delivers to `to_mode`. Every
    /// intermediate hand-off is pinned to the internal balance so the
    /// tokens never leave the protocol between hops.
    pub fn build_actions(
        &self,
        from_mode: FromMode,
        to_mode: ToMode,
    ) -> Result<Vec<Action>, RouteError> {
        let last = match self.edges.len().checked_sub(1) {
            Some(last) => last,
            None => return Ok(Vec::new()),
        };
        let mut actions = Vec::with_capacity(self.edges.len());
        for (i, edge) in self.edges.iter().enumerate() {
            let hop_out = if i == last { to_mode } else { ToMode::Internal };
            if hop_out == ToMode::Internal && !edge.internal_ok {
                return Err(RouteError::IncompatibleModes {
                    index: i,
                    label: edge.label.to_string(),
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                });
            }
            let hop_in = if i == 0 {
                from_mode
            } else {
                FromMode::InternalTolerant
            };
            actions.push(edge.build(hop_in, hop_out));
        }
        Ok(actions)
    }
}

/// The route graph. Mutable while venues are registered, then shared
/// immutably for discovery.
#[derive(Default)]
pub struct RouteGraph {
    nodes: HashMap<String, Token>,
    adjacency: HashMap<String, Vec<RouteEdge>>,
}

impl RouteGraph {
    pub fn new() -> Self {
        RouteGraph::default()
    }

    pub fn add_node(&mut self, token: Token) {
        self.adjacency.entry(token.symbol.clone()).or_default();
        self.nodes.insert(token.symbol.clone(), token);
    }

    pub fn token(&self, symbol: &str) -> Option<&Token> {
        self.nodes.get(symbol)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Outgoing edges of a node, in registration order.
    pub fn edges_from(&self, symbol: &str) -> &[RouteEdge] {
        self.adjacency.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Register a directed edge. Both endpoints must already be nodes.
    pub fn add_edge(
        &mut self,
        from: &str,
        to: &str,
        label: &'static str,
        internal_ok: bool,
        build: impl Fn(FromMode, ToMode) -> Action + Send + Sync + 'static,
    ) -> Result<(), RouteError> {
        let from = self.require_node(from)?.symbol.clone();
        let to = self.require_node(to)?.symbol.clone();
        self.adjacency
            .get_mut(&from)
            .ok_or(RouteError::UnknownAsset {
                symbol: from.clone(),
            })?
            .push(RouteEdge {
                from,
                to,
                label,
                internal_ok,
                build: Box::new(build),
            });
        Ok(())
    }

    /// Register `exchange` edges in both directions through a registry
    /// pool.
    pub fn set_bidirectional_exchange_edges(
        &mut self,
        venue: Venue,
        a: &str,
        b: &str,
    ) -> Result<(), RouteError> {
        for (from, to) in [(a, b), (b, a)] {
            let token_in = self.require_node(from)?.clone();
            let token_out = self.require_node(to)?.clone();
            self.add_edge(from, to, "exchange", true, move |from_mode, to_mode| {
                Action::Exchange(Exchange {
                    venue,
                    token_in: token_in.clone(),
                    token_out: token_out.clone(),
                    from_mode,
                    to_mode,
                })
            })?;
        }
        Ok(())
    }

    /// Register `shift` edges in both directions through a well. A
    /// shift delivers straight to `recipient`, so these edges can only
    /// close a route.
    pub fn set_bidirectional_well_edges(
        &mut self,
        venue: Venue,
        a: &str,
        b: &str,
        recipient: Address,
    ) -> Result<(), RouteError> {
        for (from, to) in [(a, b), (b, a)] {
            let token_in = self.require_node(from)?.clone();
            let token_out = self.require_node(to)?.clone();
            self.add_edge(from, to, "shift", false, move |_, _| {
                Action::Shift(Shift {
                    venue,
                    token_in: token_in.clone(),
                    token_out: token_out.clone(),
                    recipient,
                })
            })?;
        }
        Ok(())
    }

    /// Register wrap/unwrap edges between the native currency and its
    /// wrapped ERC-20.
    pub fn add_wrap_edges(&mut self, native: &str, wrapped: &str) -> Result<(), RouteError> {
        self.require_node(native)?;
        self.require_node(wrapped)?;
        self.add_edge(native, wrapped, "wrap", true, |_, to_mode| {
            Action::WrapEth(WrapEth { to_mode })
        })?;
        self.add_edge(wrapped, native, "unwrap", true, |from_mode, _| {
            Action::UnwrapEth(UnwrapEth { from_mode })
        })?;
        Ok(())
    }

    /// Find a shortest route between two assets. Returns an empty route
    /// when they are the same asset.
    pub fn find_path(&self, from: &str, to: &str) -> Result<Route<'_>, RouteError> {
        self.require_node(from)?;
        self.require_node(to)?;
        if from == to {
            return Ok(Route { edges: Vec::new() });
        }

        let mut visited: HashSet<&str> = HashSet::from([from]);
        let mut came_by: HashMap<&str, &RouteEdge> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::from([from]);
        'search: while let Some(node) = queue.pop_front() {
            for edge in &self.adjacency[node] {
                if visited.insert(&edge.to) {
                    came_by.insert(&edge.to, edge);
                    if edge.to == to {
                        break 'search;
                    }
                    queue.push_back(&edge.to);
                }
            }
        }

        if !came_by.contains_key(to) {
            return Err(RouteError::NoPath {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        let mut edges = Vec::new();
        let mut cursor = to;
        while cursor != from {
            let edge = came_by[cursor];
            edges.push(edge);
            cursor = &edge.from;
        }
        edges.reverse();
        debug!(
            from,
            to,
            hops = edges.len(),
            "route found"
        );
        Ok(Route { edges })
    }

    fn require_node(&self, symbol: &str) -> Result<&Token, RouteError> {
        self.nodes.get(symbol).ok_or_else(|| RouteError::UnknownAsset {
            symbol: symbol.to_string(),
        })
    }
}
