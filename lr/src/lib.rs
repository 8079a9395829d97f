//! LR table construction and the table-driven parser.
//!
//! [`build`] turns grammar text into [`ParseTables`] for the requested
//! flavour, resolving shift/reduce conflicts by precedence and recording
//! everything else in a [`ConflictLog`]. [`parser::parse`] then runs the
//! shift-reduce loop; [`cache::TableCache`] persists tables keyed by the
//! grammar's canonical fingerprint.

use serde::{Deserialize, Serialize};
use grammar::ffn;
use grammar::{Grammar, GrammarError, PrecInherit, PrecedenceTable};

pub mod augment;
pub mod builder;
pub mod cache;
pub mod lalr;
pub mod lr1;
pub mod parser;
pub mod report;
pub mod slr;
pub mod tables;

pub use cache::{CacheError, TableCache};
pub use parser::{parse, ParseError, Semantics};
pub use tables::{ConflictLog, RrConflict, SrConflict};

use augment::Augmented;
use builder::{Builder, LrFlavor};
use lalr::LalrFlavor;
use lr1::Lr1Flavor;
use slr::SlrFlavor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableKind {
  Slr,
  Lr1,
  Lalr1,
}

impl TableKind {
  /// Stable name, used in the fingerprint and on the command line.
  pub fn name(self) -> &'static str {
    match self {
      TableKind::Slr => "slr",
      TableKind::Lr1 => "lr1",
      TableKind::Lalr1 => "lalr1",
    }
  }
}

/// The frozen build artifact: dense ACTION/GOTO tables plus the symbol and
/// production metadata the driver needs. Read-only after construction; may
/// be shared by any number of concurrent parses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTables {
  pub kind: TableKind,
  /// - positive: shift (n - 1)
  /// - zero: error
  /// - negative: reduce (-n - 1)
  /// - `i32::MIN`: accept
  pub action: Vec<Vec<i32>>,
  /// - positive: goto (n - 1)
  /// - zero: error
  pub goto: Vec<Vec<u32>>,
  pub prods: Vec<ProductionMeta>,
  /// terminal names by column index; EOF is the extra column `terms.len()`
  pub terms: Vec<String>,
  /// nonterminal names by GOTO column index (augmented start included)
  pub nts: Vec<String>,
  pub eof: usize,
  pub start_state: u32,
  pub accept_prod: usize,
  pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionMeta {
  /// GOTO column of the LHS
  pub nt: u32,
  pub rhs_len: usize,
  /// opaque semantic-action reference from the grammar text
  pub action: Option<String>,
  /// explicit precedence tag, if any
  pub prec: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Shift(u32),
  Reduce(usize),
  Accept,
  Error,
}

impl ParseTables {
  pub fn state_count(&self) -> usize {
    self.action.len()
  }

  pub fn term_index(&self, kind: &str) -> Option<usize> {
    if kind == grammar::lexer::EOF {
      return Some(self.eof);
    }
    self.terms.iter().position(|term| term == kind)
  }

  pub fn action_at(&self, state: u32, term_index: usize) -> Action {
    match self.action[state as usize][term_index] {
      0 => Action::Error,
      tables::ACCEPT => Action::Accept,
      cell if cell > 0 => Action::Shift(cell as u32 - 1),
      cell => Action::Reduce(!cell as usize),
    }
  }

  pub fn goto_at(&self, state: u32, nt: u32) -> Option<u32> {
    match self.goto[state as usize][nt as usize] {
      0 => None,
      cell => Some(cell - 1),
    }
  }

  /// Terminal names with a non-error ACTION entry in `state`, in column
  /// order (`"$"` last).
  pub fn expected(&self, state: u32) -> Vec<String> {
    let row = &self.action[state as usize];
    (0..=self.eof)
      .filter(|&ix| row[ix] != 0)
      .map(|ix| {
        if ix == self.eof {
          grammar::lexer::EOF.to_owned()
        } else {
          self.terms[ix].clone()
        }
      })
      .collect()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
  Grammar(GrammarError),
  /// more conflicts than the grammar author declared to expect
  TooManyConflicts {
    log: ConflictLog,
    expected: usize,
  },
}

impl std::fmt::Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      Error::Grammar(err) => write!(f, "{}", err),
      Error::TooManyConflicts { log, expected } => {
        write!(
          f,
          "{} unresolved conflicts ({} shift/reduce, {} reduce/reduce), expected at most {}",
          log.total(),
          log.sr.len(),
          log.rr.len(),
          expected,
        )
      }
    }
  }
}

impl std::error::Error for Error {}

impl From<GrammarError> for Error {
  fn from(err: GrammarError) -> Self {
    Error::Grammar(err)
  }
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
  /// conflicts tolerated before the build is rejected
  pub expected_conflicts: usize,
  pub prec_inherit: PrecInherit,
  /// explicit start symbol; defaults to the first LHS
  pub start: Option<String>,
}

/// Build parse tables from grammar text.
pub fn build(
  text: &str,
  token_kinds: &[&str],
  precedence: PrecedenceTable,
  kind: TableKind,
  options: &BuildOptions,
) -> Result<(ParseTables, ConflictLog), Error> {
  let grammar = grammar::build(text, token_kinds, precedence, options.start.as_deref())?;
  build_from_grammar(grammar, kind, options)
}

/// Build parse tables from an already-constructed grammar.
pub fn build_from_grammar(
  grammar: Grammar,
  kind: TableKind,
  options: &BuildOptions,
) -> Result<(ParseTables, ConflictLog), Error> {
  let fingerprint = cache::fingerprint(&grammar, kind);
  let aug = augment::augment(grammar);
  let ffn = ffn::compute(&aug.grammar);

  let (action, goto, log, start_state) = match kind {
    TableKind::Slr => run_builder::<SlrFlavor>(&aug, &ffn, options.prec_inherit),
    TableKind::Lr1 => run_builder::<Lr1Flavor>(&aug, &ffn, options.prec_inherit),
    TableKind::Lalr1 => run_builder::<LalrFlavor>(&aug, &ffn, options.prec_inherit),
  };

  if log.total() > options.expected_conflicts {
    return Err(Error::TooManyConflicts {
      log,
      expected: options.expected_conflicts,
    });
  }

  let grammar = &aug.grammar;
  let prods = grammar.prods.iter()
    .map(|prod| ProductionMeta {
      nt: prod.nt.id(),
      rhs_len: prod.symbols.len(),
      action: prod.action.clone(),
      prec: prod.prec.clone(),
    })
    .collect();

  let terms = (0..grammar.terms.len())
    .map(|ix| grammar.term_name_by_index(ix).to_owned())
    .collect();
  let nts = (0..grammar.nts.len())
    .map(|ix| grammar.nt_name(grammar::NonterminalId::from(ix as u32)).to_owned())
    .collect();

  let tables = ParseTables {
    kind,
    action,
    goto,
    prods,
    terms,
    nts,
    eof: aug.eof,
    start_state,
    accept_prod: aug.accept_prod,
    fingerprint,
  };

  Ok((tables, log))
}

fn run_builder<T: LrFlavor>(
  aug: &Augmented,
  ffn: &ffn::Ffn,
  inherit: PrecInherit,
) -> (Vec<Vec<i32>>, Vec<Vec<u32>>, ConflictLog, u32) {
  let mut builder = Builder::<T>::new(aug, ffn);
  let start_state = builder::gen_states(&mut builder, aug);
  let (action, goto, log) = tables::gen_tables(&builder, aug, inherit);
  (action, goto, log, start_state)
}
