//! Error taxonomy for the toolbox, one variant family per component.
//!
//! Errors from provers never escape the proof engine: a prover returning an
//! error is turned into `false` and the engine rolls back to its last
//! checkpoint (see `engine::ProofEngine::checkpoint`). Errors from library
//! construction or parser initialization are fatal and surface to the caller.

use crate::intern::{LabTok, SymTok};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by the symbol/label interner and library store (C1/C2).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("identifier already exists: {0}")]
    DuplicateIdentifier(String),
    #[error("unknown identifier: {0:?}")]
    UnknownIdentifier(String),
    #[error("invalid name: {0:?}")]
    InvalidName(String),
}

/// Raised by `Lr1Parser::parse` only for library-level (fatal) failures; an
/// ordinary failed parse of a goal sentence is represented by a tree with
/// `label == LabTok(0)`, not by this error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to parse token stream at position {token_stream_position}")]
pub struct ParseFailure {
    pub token_stream_position: usize,
}

/// Raised when a unification attempt is structurally inconsistent.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unification failure")]
pub struct UnificationFailure;

/// Raised by the assertion matcher when the result vector would be empty
/// and the caller asked for at least one match via `?`-propagating helpers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no assertion matches the given goal")]
pub struct NoMatchingAssertion;

/// The reason a `process_label` step was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofErrorReason {
    StackUnderflow,
    FloatingTypeMismatch,
    EssentialMismatch,
    DistinctViolation,
}

/// Raised by the proof engine (C9) on any invariant violation while
/// processing a label.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("proof error processing label {label:?}: {reason:?}")]
pub struct ProofError {
    pub label: LabTok,
    pub reason: ProofErrorReason,
    /// The stack entries that were on top of the stack at the time of failure.
    pub on_stack: Vec<Vec<SymTok>>,
    /// The sentence that was expected to be produced by substitution, if any.
    pub to_subst: Option<Vec<SymTok>>,
    /// The substitution in effect for the current step, by variable label.
    pub subst_map: HashMap<LabTok, Vec<SymTok>>,
}

/// Raised by `Fof::replace` when a capture-avoiding substitution would
/// capture a free variable of the replacement term under a binder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("variable capture: {0:?} is free in the replacement and bound at this point")]
pub struct VariableCapture(pub String);

/// Diagnostic for a failed natural-deduction structural check. `check()`
/// itself stays a total boolean function (spec §7); this type exists only
/// for callers that want to know *why* instead of just *whether*.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("natural deduction check failed at node kind {node_kind}")]
pub struct NdCheckFailure {
    pub node_kind: &'static str,
}

/// Aggregate error type for the fatal, caller-visible failure modes of the
/// toolbox. Component-local error types (like `ProofError`) are used on
/// their own where a narrower type is more useful to the caller.
#[derive(Debug, Error)]
pub enum ToolboxError {
    #[error(transparent)]
    Library(#[from] LibraryError),
    #[error(transparent)]
    Parse(#[from] ParseFailure),
    #[error(transparent)]
    Unification(#[from] UnificationFailure),
    #[error(transparent)]
    NoMatch(#[from] NoMatchingAssertion),
    #[error(transparent)]
    Proof(#[from] ProofError),
    #[error(transparent)]
    Capture(#[from] VariableCapture),
    #[error(transparent)]
    Nd(#[from] NdCheckFailure),
    #[error("{0}")]
    Other(String),
}

impl From<&str> for ToolboxError {
    fn from(s: &str) -> Self {
        ToolboxError::Other(s.to_string())
    }
}
