//! Char-level LR grammar for TSTP FOF/CNF syntax (C11), built directly over
//! the same `Grammar`/`Lr1Parser` machinery C4 extracts from a Metamath
//! library (spec §4.10: "an LR grammar over the same machinery as C4").
//! Grounded on `tstp_parser.h`'s `TokenType`/`Rule` ladder
//! (`original_source/provers/tstp/tstp_parser.h`): a `CHAR` terminal
//! promotes through `LETTER`/`ID`/`TERM`/`ATOM`/... nonterminals via
//! explicitly named rules, reusing the `ParsingTree<Token,Rule>` engine that
//! also drives the Metamath grammar. This module builds the equivalent
//! table here: `crate::grammar::Grammar`'s `Derivation` list populated by
//! hand instead of extracted from a `Library`, and `crate::lrparser::Lr1Parser`
//! built from it exactly as C4 builds one from the Metamath grammar.
//!
//! Every ASCII byte is its own terminal symbol (`char_sym`); identifiers and
//! numbers are built up one character at a time via left-recursive
//! `LID`/`UID`/`NUM` productions, each instance of the "append one char"
//! production carrying a distinct label that encodes which literal
//! character it consumed (`label_char`), since a production's literal
//! `rhs` positions are otherwise assumed fixed across every instance of
//! that production (true for every *other* rule here, where the same
//! literal punctuation/operator always appears in the same position).

use crate::grammar::{Derivation, Grammar};
use crate::intern::{LabTok, SymTok};

/// Maps one ASCII character to the terminal symbol the grammar shifts for
/// it. `SymTok(0)` is reserved ("absent"), so every byte is offset by one;
/// `None` outside 7-bit ASCII (TSTP surface syntax is ASCII-only).
pub fn char_sym(c: char) -> Option<SymTok> {
    let b = c as u32;
    if b < 127 {
        Some(SymTok((b + 1) as u16))
    } else {
        None
    }
}

fn sym_char(s: SymTok) -> char {
    char::from_u32((s.0 as u32).saturating_sub(1)).unwrap_or('\u{0}')
}

fn cs(c: char) -> SymTok {
    char_sym(c).unwrap_or_else(|| panic!("{c} is outside the grammar's ASCII alphabet"))
}

// --- nonterminal symbols, disjoint from the 1..=127 terminal range --------

pub const LID: SymTok = SymTok(500);
pub const UID: SymTok = SymTok(501);
pub const NUM: SymTok = SymTok(502);
pub const NAME: SymTok = SymTok(503);
pub const TERM: SymTok = SymTok(504);
pub const TERMLIST: SymTok = SymTok(505);
pub const VARLIST: SymTok = SymTok(506);
pub const FATOM: SymTok = SymTok(507);
pub const UFOF: SymTok = SymTok(508);
pub const AND_FOF: SymTok = SymTok(509);
pub const OR_FOF: SymTok = SymTok(510);
pub const FOF: SymTok = SymTok(511);
pub const CLAUSE: SymTok = SymTok(512);

// --- structural rule labels (fixed literal positions per rule) -----------

pub const R_NAME_FROM_LID: u32 = 1;
pub const R_NAME_FROM_NUM: u32 = 2;
pub const R_TERM_FROM_VAR: u32 = 3;
pub const R_TERM_FROM_CONST: u32 = 4;
pub const R_TERM_FROM_APP: u32 = 5;
pub const R_TERMLIST_ONE: u32 = 6;
pub const R_TERMLIST_EXTEND: u32 = 7;
pub const R_VARLIST_ONE: u32 = 8;
pub const R_VARLIST_EXTEND: u32 = 9;
pub const R_FATOM_FROM_TERM: u32 = 10;
pub const R_FATOM_EQUAL: u32 = 11;
pub const R_FATOM_NOT_EQUAL: u32 = 12;
pub const R_FATOM_DOLLAR_BARE: u32 = 13;
pub const R_FATOM_DOLLAR_APP: u32 = 14;
pub const R_UFOF_FROM_ATOM: u32 = 15;
pub const R_UFOF_NOT: u32 = 16;
pub const R_UFOF_FORALL: u32 = 17;
pub const R_UFOF_EXISTS: u32 = 18;
pub const R_UFOF_PAREN: u32 = 19;
pub const R_AND_FOF_FROM_UFOF: u32 = 20;
pub const R_AND_FOF_EXTEND: u32 = 21;
pub const R_OR_FOF_FROM_AND_FOF: u32 = 22;
pub const R_OR_FOF_EXTEND: u32 = 23;
pub const R_FOF_FROM_OR: u32 = 24;
pub const R_FOF_IMPLIES: u32 = 25;
pub const R_FOF_IFF: u32 = 26;
pub const R_FOF_XOR: u32 = 27;
pub const R_FOF_NAND: u32 = 28;
pub const R_FOF_NOR: u32 = 29;
pub const R_CLAUSE_BARE: u32 = 30;
pub const R_CLAUSE_WITH_SOURCE: u32 = 31;
pub const R_CLAUSE_WITH_USEFUL_INFO: u32 = 32;

// --- per-character labels for the LID/UID/NUM "append one char" rules ----

const LID_FIRST_BASE: u32 = 1_000;
const LID_EXT_BASE: u32 = 2_000;
const UID_FIRST_BASE: u32 = 3_000;
const UID_EXT_BASE: u32 = 4_000;
const NUM_FIRST_BASE: u32 = 5_000;
const NUM_EXT_BASE: u32 = 6_000;

/// Recovers the literal character an `LID`/`UID`/`NUM` "start"/"append"
/// production consumed, from its label alone (`children` never carries a
/// bare terminal position, see module docs). `None` for any other label.
pub(crate) fn label_char(label: LabTok) -> Option<char> {
    for base in [
        LID_FIRST_BASE,
        LID_EXT_BASE,
        UID_FIRST_BASE,
        UID_EXT_BASE,
        NUM_FIRST_BASE,
        NUM_EXT_BASE,
    ] {
        if label.0 >= base && label.0 < base + 128 {
            return char::from_u32(label.0 - base);
        }
    }
    None
}

fn lower() -> Vec<char> {
    ('a'..='z').collect()
}
fn upper() -> Vec<char> {
    ('A'..='Z').collect()
}
fn digit() -> Vec<char> {
    ('0'..='9').collect()
}

/// Builds the TSTP char grammar: every production `Lr1Parser::build` needs,
/// with no dependency on a Metamath `Library` (unlike `crate::grammar::extract_grammar`,
/// this grammar is static and the same for every input).
pub fn build() -> Grammar {
    let mut derivations = Vec::new();
    let mut ders_by_label = std::collections::HashMap::new();
    let mut push = |label: u32, lhs: SymTok, rhs: Vec<SymTok>| {
        let idx = derivations.len();
        let lab = LabTok(label);
        ders_by_label.insert(lab, idx);
        derivations.push(Derivation { label: lab, lhs, rhs });
    };

    // LID: a lowercase-led identifier, extended by lowercase/digit/'_'.
    for c in lower() {
        push(LID_FIRST_BASE + c as u32, LID, vec![cs(c)]);
    }
    for c in lower().into_iter().chain(digit()).chain(['_']) {
        push(LID_EXT_BASE + c as u32, LID, vec![LID, cs(c)]);
    }

    // UID: an uppercase-led identifier (a TSTP variable), extended by
    // uppercase/digit/'_'.
    for c in upper() {
        push(UID_FIRST_BASE + c as u32, UID, vec![cs(c)]);
    }
    for c in upper().into_iter().chain(digit()).chain(['_']) {
        push(UID_EXT_BASE + c as u32, UID, vec![UID, cs(c)]);
    }

    // NUM: an unsigned integer, used for numeric clause names.
    for c in digit() {
        push(NUM_FIRST_BASE + c as u32, NUM, vec![cs(c)]);
    }
    for c in digit() {
        push(NUM_EXT_BASE + c as u32, NUM, vec![NUM, cs(c)]);
    }

    push(R_NAME_FROM_LID, NAME, vec![LID]);
    push(R_NAME_FROM_NUM, NAME, vec![NUM]);

    push(R_TERM_FROM_VAR, TERM, vec![UID]);
    push(R_TERM_FROM_CONST, TERM, vec![LID]);
    push(R_TERM_FROM_APP, TERM, vec![LID, cs('('), TERMLIST, cs(')')]);

    push(R_TERMLIST_ONE, TERMLIST, vec![TERM]);
    push(R_TERMLIST_EXTEND, TERMLIST, vec![TERMLIST, cs(','), TERM]);

    push(R_VARLIST_ONE, VARLIST, vec![UID]);
    push(R_VARLIST_EXTEND, VARLIST, vec![VARLIST, cs(','), UID]);

    push(R_FATOM_FROM_TERM, FATOM, vec![TERM]);
    push(R_FATOM_EQUAL, FATOM, vec![TERM, cs('='), TERM]);
    push(R_FATOM_NOT_EQUAL, FATOM, vec![TERM, cs('!'), cs('='), TERM]);
    push(R_FATOM_DOLLAR_BARE, FATOM, vec![cs('$'), LID]);
    push(
        R_FATOM_DOLLAR_APP,
        FATOM,
        vec![cs('$'), LID, cs('('), TERMLIST, cs(')')],
    );

    push(R_UFOF_FROM_ATOM, UFOF, vec![FATOM]);
    push(R_UFOF_NOT, UFOF, vec![cs('~'), UFOF]);
    push(
        R_UFOF_FORALL,
        UFOF,
        vec![cs('!'), cs('['), VARLIST, cs(']'), cs(':'), UFOF],
    );
    push(
        R_UFOF_EXISTS,
        UFOF,
        vec![cs('?'), cs('['), VARLIST, cs(']'), cs(':'), UFOF],
    );
    push(R_UFOF_PAREN, UFOF, vec![cs('('), FOF, cs(')')]);

    push(R_AND_FOF_FROM_UFOF, AND_FOF, vec![UFOF]);
    push(R_AND_FOF_EXTEND, AND_FOF, vec![AND_FOF, cs('&'), UFOF]);

    push(R_OR_FOF_FROM_AND_FOF, OR_FOF, vec![AND_FOF]);
    push(R_OR_FOF_EXTEND, OR_FOF, vec![OR_FOF, cs('|'), AND_FOF]);

    push(R_FOF_FROM_OR, FOF, vec![OR_FOF]);
    push(R_FOF_IMPLIES, FOF, vec![OR_FOF, cs('='), cs('>'), OR_FOF]);
    push(
        R_FOF_IFF,
        FOF,
        vec![OR_FOF, cs('<'), cs('='), cs('>'), OR_FOF],
    );
    push(
        R_FOF_XOR,
        FOF,
        vec![OR_FOF, cs('<'), cs('~'), cs('>'), OR_FOF],
    );
    push(R_FOF_NAND, FOF, vec![OR_FOF, cs('~'), cs('&'), OR_FOF]);
    push(R_FOF_NOR, FOF, vec![OR_FOF, cs('~'), cs('|'), OR_FOF]);

    push(
        R_CLAUSE_BARE,
        CLAUSE,
        vec![
            LID,
            cs('('),
            NAME,
            cs(','),
            LID,
            cs(','),
            FOF,
            cs(')'),
            cs('.'),
        ],
    );
    push(
        R_CLAUSE_WITH_SOURCE,
        CLAUSE,
        vec![
            LID,
            cs('('),
            NAME,
            cs(','),
            LID,
            cs(','),
            FOF,
            cs(','),
            TERM,
            cs(')'),
            cs('.'),
        ],
    );
    push(
        R_CLAUSE_WITH_USEFUL_INFO,
        CLAUSE,
        vec![
            LID,
            cs('('),
            NAME,
            cs(','),
            LID,
            cs(','),
            FOF,
            cs(','),
            TERM,
            cs(','),
            TERM,
            cs(')'),
            cs('.'),
        ],
    );

    Grammar {
        derivations,
        ders_by_label,
        var_productions: std::collections::HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_sym_round_trips_through_sym_char() {
        for c in ['a', 'Z', '0', '(', '~', '$'] {
            assert_eq!(sym_char(char_sym(c).unwrap()), c);
        }
    }

    #[test]
    fn char_sym_rejects_non_ascii() {
        assert!(char_sym('\u{1F600}').is_none());
    }

    #[test]
    fn label_char_decodes_each_append_family() {
        assert_eq!(label_char(LabTok(LID_FIRST_BASE + 'a' as u32)), Some('a'));
        assert_eq!(label_char(LabTok(UID_EXT_BASE + 'X' as u32)), Some('X'));
        assert_eq!(label_char(LabTok(NUM_FIRST_BASE + '7' as u32)), Some('7'));
        assert_eq!(label_char(LabTok(R_FOF_NAND)), None);
    }

    #[test]
    fn build_produces_every_structural_rule() {
        let grammar = build();
        assert!(grammar.derivation_for(LabTok(R_FOF_IMPLIES)).is_some());
        assert!(grammar.derivation_for(LabTok(R_CLAUSE_WITH_USEFUL_INFO)).is_some());
        assert!(grammar
            .derivations
            .iter()
            .any(|d| d.lhs == LID && d.rhs.len() == 1));
    }
}
