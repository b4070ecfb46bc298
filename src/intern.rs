//! Bidirectional string<->small-integer interning for symbols and labels (C1).
//!
//! Identity `0` is reserved on both alphabets to mean "absent" (a failed
//! parse tree uses `LabTok(0)` as its label, see `tree::ParsingTree`).
//! Interners are append-only: once created, a symbol or label never changes
//! its identifier or is removed.

use crate::error::LibraryError;
use std::collections::HashMap;
use std::fmt;

/// 16-bit identifier of a symbol; `0` is reserved for "absent".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SymTok(pub u16);

/// 32-bit identifier of a label; `0` is reserved for "absent".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LabTok(pub u32);

impl fmt::Debug for SymTok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sym({})", self.0)
    }
}

impl fmt::Debug for LabTok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lab({})", self.0)
    }
}

impl SymTok {
    pub const ABSENT: SymTok = SymTok(0);
    #[inline]
    pub fn is_absent(self) -> bool {
        self.0 == 0
    }
}

impl LabTok {
    pub const ABSENT: LabTok = LabTok(0);
    #[inline]
    pub fn is_absent(self) -> bool {
        self.0 == 0
    }
}

/// A bidirectional string<->integer cache, generic over the token newtype.
///
/// Mirrors `StringCache<Tok>` from the original `mmpp` `Library`: `create`
/// fails on a duplicate name (distinct from `get_or_create`, which is
/// idempotent), and `0` is never handed out as a real identifier.
#[derive(Debug, Default)]
pub struct Interner<T> {
    by_name: HashMap<String, T>,
    by_tok: Vec<String>, // index 0 is a dummy placeholder for the reserved id.
}

pub trait Token: Copy + Eq + std::hash::Hash {
    fn from_index(i: u32) -> Self;
    fn index(self) -> u32;
}

impl Token for SymTok {
    fn from_index(i: u32) -> Self {
        SymTok(i as u16)
    }
    fn index(self) -> u32 {
        self.0 as u32
    }
}

impl Token for LabTok {
    fn from_index(i: u32) -> Self {
        LabTok(i)
    }
    fn index(self) -> u32 {
        self.0
    }
}

impl<T: Token> Interner<T> {
    pub fn new() -> Self {
        Interner {
            by_name: HashMap::new(),
            by_tok: vec![String::new()],
        }
    }

    /// Looks up an existing identifier, without creating one.
    pub fn get(&self, name: &str) -> Option<T> {
        self.by_name.get(name).copied()
    }

    /// Creates a fresh identifier for `name`. Fails if `name` is already
    /// interned.
    pub fn create(&mut self, name: &str) -> Result<T, LibraryError> {
        if self.by_name.contains_key(name) {
            return Err(LibraryError::DuplicateIdentifier(name.to_string()));
        }
        if name.is_empty() {
            return Err(LibraryError::InvalidName(name.to_string()));
        }
        let tok = T::from_index(self.by_tok.len() as u32);
        self.by_tok.push(name.to_string());
        self.by_name.insert(name.to_string(), tok);
        Ok(tok)
    }

    /// Returns the existing identifier for `name`, or creates one.
    pub fn get_or_create(&mut self, name: &str) -> Result<T, LibraryError> {
        if let Some(tok) = self.get(name) {
            return Ok(tok);
        }
        self.create(name)
    }

    /// Reverse lookup: distinguishes "absent" (identifier 0 or out of
    /// range) from "present but empty" by returning `None` only in the
    /// former case; an interned name is never empty (see `create`).
    pub fn resolve(&self, tok: T) -> Result<&str, LibraryError> {
        let idx = tok.index() as usize;
        if idx == 0 || idx >= self.by_tok.len() {
            return Err(LibraryError::UnknownIdentifier(format!("#{idx}")));
        }
        Ok(&self.by_tok[idx])
    }

    pub fn len(&self) -> usize {
        self.by_tok.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
