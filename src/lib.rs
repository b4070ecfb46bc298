//! A parsing, unification, substitution and proof-building toolbox for a
//! Metamath-style formal system, plus an independent TSTP/natural-deduction
//! pipeline sharing only the interner and unifier with the core.
//!
//! The core data flow: a library (`library::Library`) is loaded, its
//! grammar extracted (`grammar::extract_grammar`) and compiled into an
//! LR(1) table (`lrparser::Lr1Parser`); every stored sentence parses into a
//! `tree::ParsingTree`. Goals are resolved against the library by
//! `matcher::AssertionMatcher`, which drives `unify` and `subst`, and the
//! result replays through `engine::ProofEngine`. `registry` memoizes
//! compile-once provers across proof steps. `tstp`/`nd`/`gapt` form a
//! separate pipeline for first-order formula exchange and natural-deduction
//! checking.

pub mod cache_store;
pub mod config;
pub mod engine;
pub mod error;
pub mod gapt;
pub mod grammar;
pub mod intern;
pub mod library;
pub mod lrparser;
pub mod matcher;
pub mod nd;
pub mod registry;
pub mod subst;
pub mod tree;
pub mod tstp;
pub mod uct;
pub mod unify;

pub use config::ToolboxOptions;
pub use error::ToolboxError;
pub use intern::{LabTok, SymTok};
pub use library::Library;
