//! An LR parser generator.
//!
//! A [`Generator`] couples a regex lexer with a precedence table; its
//! [`build`](Generator::build) turns grammar text into SLR(1), LR(1) or
//! LALR(1) parse tables and [`parse`](Generator::parse) runs the
//! shift-reduce driver over an input string, dispatching to user
//! [`Semantics`].
//!
//! ```
//! use lrgen::{Generator, LexRule, Assoc, TableKind, BuildOptions, Semantics, Token};
//!
//! struct Eval;
//!
//! impl Semantics for Eval {
//!   type Value = i64;
//!
//!   fn shift(&mut self, token: &Token) -> i64 {
//!     token.text.parse().unwrap_or(0)
//!   }
//!
//!   fn reduce(&mut self, _prod: usize, args: Vec<i64>) -> i64 {
//!     match args.len() {
//!       3 => args[0] + args[2],
//!       _ => args[0],
//!     }
//!   }
//! }
//!
//! let generator = Generator::new(&[
//!   LexRule::new(r"\d+", "n"),
//!   LexRule::with_prec(r"\+", "+", 1, Assoc::LeftAssoc),
//!   LexRule::new(r"[ \t]+", ""),
//! ]).unwrap();
//!
//! let (tables, log) = generator
//!   .build("E -> E + E | n ;", TableKind::Lalr1, &BuildOptions::default())
//!   .unwrap();
//! assert!(log.is_empty());
//!
//! let value = generator.parse(&tables, "1 + 2 + 3", &mut Eval).unwrap();
//! assert_eq!(value, 6);
//! ```

pub mod report;
pub mod spec;

pub use grammar::lexer::{LexRule, Lexer, LexerError, Token};
pub use grammar::{Assoc, GrammarError, PrecInherit, PrecedenceTable};
pub use lr::{
  parse, Action, BuildOptions, CacheError, ConflictLog, Error, ParseError,
  ParseTables, Semantics, TableCache, TableKind,
};

/// A lexer plus a precedence table, ready to build tables for grammars over
/// the lexer's token kinds.
#[derive(Debug)]
pub struct Generator {
  lexer: Lexer,
  precedence: PrecedenceTable,
}

impl Generator {
  /// Compile the lexer rules. Operator rules (`LexRule::with_prec`) seed
  /// the precedence table with their token kind.
  pub fn new(rules: &[LexRule]) -> Result<Self, LexerError> {
    let lexer = Lexer::new(rules)?;

    let mut precedence = PrecedenceTable::new();
    for rule in rules {
      if let Some((level, assoc)) = rule.prec {
        precedence.declare(&rule.kind, level, assoc);
      }
    }

    Ok(Self { lexer, precedence })
  }

  /// Declare a precedence entry that is not a token kind, e.g. a tag for
  /// `%prec NEG`.
  pub fn declare_prec(&mut self, name: impl Into<String>, level: u32, assoc: Assoc) {
    self.precedence.declare(name, level, assoc);
  }

  pub fn lexer(&self) -> &Lexer {
    &self.lexer
  }

  pub fn precedence(&self) -> &PrecedenceTable {
    &self.precedence
  }

  pub fn build(
    &self,
    grammar_text: &str,
    kind: TableKind,
    options: &BuildOptions,
  ) -> Result<(ParseTables, ConflictLog), Error> {
    let kinds = self.token_kinds();
    lr::build(grammar_text, &kinds, self.precedence.clone(), kind, options)
  }

  /// Like [`build`](Self::build), but consult `cache` first. Returns
  /// whether the tables came from the cache; an unusable artifact is
  /// ignored and rebuilt (and re-stored).
  pub fn build_cached(
    &self,
    grammar_text: &str,
    kind: TableKind,
    options: &BuildOptions,
    cache: &TableCache,
  ) -> Result<(ParseTables, ConflictLog, bool), Error> {
    let kinds = self.token_kinds();
    let grammar = grammar::build(
      grammar_text,
      &kinds,
      self.precedence.clone(),
      options.start.as_deref(),
    )?;

    let fingerprint = lr::cache::fingerprint(&grammar, kind);
    if let Ok(Some(tables)) = cache.load(&fingerprint) {
      if tables_fit_grammar(&tables, &grammar) {
        return Ok((tables, ConflictLog::default(), true));
      }
    }

    let (tables, log) = lr::build_from_grammar(grammar, kind, options)?;
    // storing is best effort; a read-only cache directory only costs the
    // next run a rebuild
    let _ = cache.store(&tables);
    Ok((tables, log, false))
  }

  pub fn parse<S: Semantics>(
    &self,
    tables: &ParseTables,
    input: &str,
    semantics: &mut S,
  ) -> Result<S::Value, ParseError> {
    lr::parse(tables, self.lexer.scan(input), semantics)
  }

  fn token_kinds(&self) -> Vec<&str> {
    self.lexer.kinds().iter().map(String::as_str).collect()
  }
}

/// Loaded tables must agree with the grammar on the terminal set and on
/// the nonterminals (the tables carry one extra, the augmented start).
fn tables_fit_grammar(tables: &ParseTables, grammar: &grammar::Grammar) -> bool {
  if tables.terms.len() != grammar.terms.len()
    || tables.nts.len() != grammar.nts.len() + 1
  {
    return false;
  }

  let terms_match = tables.terms.iter().enumerate()
    .all(|(ix, name)| grammar.term_name_by_index(ix) == name);
  let nts_match = tables.nts.iter().take(grammar.nts.len()).enumerate()
    .all(|(ix, name)| {
      grammar.nts.get_by_left(&grammar::NonterminalId::from(ix as u32))
        .map(|nt_name| nt_name == name)
        .unwrap_or(false)
    });

  terms_match && nts_match
}
