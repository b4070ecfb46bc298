//! `mm-toolbox`: the CLI entry points contributed by the core (spec §6
//! "CLI registry"): `parse-tstp`, `convert-to-tstp`, `read-gapt`,
//! `subst-search`, `find-defs`. Modeled on `metamath-lsp/src/main.rs`'s
//! `clap` App/Arg wiring and its `ServerError` glue type, but using clap 4's
//! derive API (`#[command(...)]`/`#[arg(...)]`).

use clap::Parser;
use log::LevelFilter;
use metamath_toolbox::grammar::extract_grammar;
use metamath_toolbox::library::{Assertion, Library};
use metamath_toolbox::lrparser::Lr1Parser;
use metamath_toolbox::matcher::AssertionMatcher;
use metamath_toolbox::tstp;
use serde::Deserialize;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::process::ExitCode;

/// The CLI binary's own glue error, gathering `io`/`clap`/toolbox failures
/// behind one boxed trait object, mirroring `metamath-lsp`'s `ServerError`.
#[derive(Debug)]
struct BoxError(String);

impl fmt::Display for BoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for BoxError {}

impl From<std::io::Error> for BoxError {
    fn from(e: std::io::Error) -> Self {
        BoxError(e.to_string())
    }
}
impl From<serde_json::Error> for BoxError {
    fn from(e: serde_json::Error) -> Self {
        BoxError(e.to_string())
    }
}

#[derive(Parser, Debug)]
#[command(name = "mm-toolbox")]
struct Cli {
    /// Increase logging verbosity; repeatable (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Parses a TSTP `fof(...)`/`cnf(...)` annotated clause and prints its AST.
    ParseTstp { file: String },
    /// Parses a TSTP clause and re-emits it in canonical TSTP surface syntax.
    ConvertToTstp { file: String },
    /// Reads a GAPT proof document and prints each decoded step.
    ReadGapt { file: String },
    /// Loads a library fixture and searches for assertions matching a goal.
    SubstSearch { fixture: String, thesis: String },
    /// Loads a library fixture and lists every grammar production extracted from it.
    FindDefs { fixture: String },
}

fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// A minimal, self-contained library description for the CLI's own
/// demonstration commands. Loading a real Metamath database file is the
/// out-of-scope Reader's job (spec §6); this fixture format exists only so
/// `subst-search`/`find-defs` have something to run against from the
/// command line.
#[derive(Debug, Deserialize)]
struct LibraryFixture {
    constants: Vec<String>,
    variables: Vec<VarFixture>,
    assertions: Vec<AssertionFixture>,
    turnstile: String,
    start_type: String,
}

#[derive(Debug, Deserialize)]
struct VarFixture {
    label: String,
    name: String,
    typecode: String,
}

#[derive(Debug, Deserialize)]
struct AssertionFixture {
    label: String,
    #[serde(default)]
    float_hyps: Vec<String>,
    #[serde(default)]
    ess_hyps: Vec<String>,
    sentence: Vec<String>,
}

fn build_library(fixture: &LibraryFixture) -> Result<Library, BoxError> {
    let mut lib = Library::new();
    for c in &fixture.constants {
        let sym = lib
            .get_or_create_symbol(c)
            .map_err(|e| BoxError(e.to_string()))?;
        lib.add_constant(sym);
    }
    for v in &fixture.variables {
        let sym = lib
            .get_or_create_symbol(&v.name)
            .map_err(|e| BoxError(e.to_string()))?;
        let typecode = lib
            .lookup_symbol(&v.typecode)
            .ok_or_else(|| BoxError(format!("unknown typecode {}", v.typecode)))?;
        let label = lib
            .get_or_create_label(&v.label)
            .map_err(|e| BoxError(e.to_string()))?;
        lib.add_sentence(label, vec![typecode, sym]);
        lib.add_assertion(
            label,
            Assertion {
                valid: true,
                is_theorem: false,
                float_hyps: vec![],
                ess_hyps: vec![],
                opt_hyps: BTreeSet::new(),
                mand_dv: BTreeSet::new(),
                opt_dv: BTreeSet::new(),
                thesis: label,
                number: 0,
                proof: None,
                comment: String::new(),
                usage_disc: false,
                modif_disc: false,
            },
        );
        lib.declare_variable(label, sym, typecode);
    }
    for a in &fixture.assertions {
        let label = lib
            .get_or_create_label(&a.label)
            .map_err(|e| BoxError(e.to_string()))?;
        let mut sentence = Vec::with_capacity(a.sentence.len());
        for tok in &a.sentence {
            sentence.push(
                lib.lookup_symbol(tok)
                    .ok_or_else(|| BoxError(format!("unknown symbol {tok}")))?,
            );
        }
        lib.add_sentence(label, sentence);
        let float_hyps = a
            .float_hyps
            .iter()
            .map(|l| {
                lib.lookup_label(l)
                    .ok_or_else(|| BoxError(format!("unknown label {l}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let ess_hyps = a
            .ess_hyps
            .iter()
            .map(|l| {
                lib.lookup_label(l)
                    .ok_or_else(|| BoxError(format!("unknown label {l}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        lib.add_assertion(
            label,
            Assertion {
                valid: true,
                is_theorem: false,
                float_hyps,
                ess_hyps,
                opt_hyps: BTreeSet::new(),
                mand_dv: BTreeSet::new(),
                opt_dv: BTreeSet::new(),
                thesis: label,
                number: 0,
                proof: None,
                comment: String::new(),
                usage_disc: false,
                modif_disc: false,
            },
        );
    }
    Ok(lib)
}

fn run(cli: Cli) -> Result<(), BoxError> {
    match cli.command {
        Command::ParseTstp { file } => {
            let text = fs::read_to_string(file)?;
            let af = tstp::parse_annotated(text.trim()).map_err(|e| BoxError(e.to_string()))?;
            log::info!("parsed clause {} ({})", af.name, af.role);
            println!("{:#?}", af.formula);
            Ok(())
        }
        Command::ConvertToTstp { file } => {
            let text = fs::read_to_string(file)?;
            let af = tstp::parse_annotated(text.trim()).map_err(|e| BoxError(e.to_string()))?;
            println!("{}", tstp::write_annotated(&af));
            Ok(())
        }
        Command::ReadGapt { file } => {
            let text = fs::read_to_string(file)?;
            let steps =
                metamath_toolbox::gapt::read_document(&text).map_err(|e| BoxError(e.to_string()))?;
            for step in &steps {
                log::debug!("step rule={}", step.rule);
                println!("{}", metamath_toolbox::gapt::write_step(step));
            }
            Ok(())
        }
        Command::SubstSearch { fixture, thesis } => {
            let fixture_text = fs::read_to_string(fixture)?;
            let fixture: LibraryFixture = serde_json::from_str(&fixture_text)?;
            let lib = build_library(&fixture)?;
            let turnstile = lib
                .lookup_symbol(&fixture.turnstile)
                .ok_or_else(|| BoxError("unknown turnstile symbol".to_string()))?;
            let start_type = lib
                .lookup_symbol(&fixture.start_type)
                .ok_or_else(|| BoxError("unknown start type".to_string()))?;
            let grammar = extract_grammar(&lib, turnstile).map_err(|e| BoxError(format!("{e:?}")))?;
            let parser = Lr1Parser::build(&grammar, start_type).map_err(|e| BoxError(format!("{e:?}")))?;
            let mut matcher = AssertionMatcher::new(&lib, &grammar, &parser, start_type, turnstile);
            let thesis_sentence: Vec<_> = thesis
                .split_whitespace()
                .map(|tok| {
                    lib.lookup_symbol(tok)
                        .ok_or_else(|| BoxError(format!("unknown symbol {tok}")))
                })
                .collect::<Result<_, _>>()?;
            let results = matcher.unify_assertion(&[], &thesis_sentence, false);
            for r in &results {
                println!("{:?}", r.label);
            }
            Ok(())
        }
        Command::FindDefs { fixture } => {
            let fixture_text = fs::read_to_string(fixture)?;
            let fixture: LibraryFixture = serde_json::from_str(&fixture_text)?;
            let lib = build_library(&fixture)?;
            let turnstile = lib
                .lookup_symbol(&fixture.turnstile)
                .ok_or_else(|| BoxError("unknown turnstile symbol".to_string()))?;
            let grammar = extract_grammar(&lib, turnstile).map_err(|e| BoxError(format!("{e:?}")))?;
            for der in &grammar.derivations {
                println!("{:?} -> {:?}", der.lhs, der.rhs);
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = TermLogger::init(
        level_for(cli.verbose),
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
