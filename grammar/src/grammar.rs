//! The frozen grammar value: productions, symbol tables and precedence.

use std::fmt;
use crate::symbol::{NonterminalId, Symbol, TermId};
use crate::{BiMap, Map};

/// A context-free grammar, canonicalised and frozen. All analyses
/// (`ffn::compute`, the automaton builders) take `&Grammar`.
#[derive(Debug)]
pub struct Grammar {
  /// Production id is the index into this vector, in declaration order.
  pub prods: Vec<Production>,
  pub terms: BiMap<TermId, String>,
  pub nts: BiMap<NonterminalId, String>,
  /// Productions of each nonterminal. A list rather than a range: the same
  /// LHS may be declared in non-adjacent groups (`A -> B C; ...; A -> a`).
  pub nt_prods: Map<NonterminalId, Vec<usize>>,
  pub start_nt: NonterminalId,
  pub precedence: PrecedenceTable,
}

#[derive(Debug, Clone)]
pub struct Production {
  pub nt: NonterminalId,
  pub symbols: Vec<Symbol>,
  /// Opaque semantic-action reference, dispatched by the parser driver.
  pub action: Option<String>,
  /// Explicit precedence tag. Untagged productions may inherit the
  /// precedence of their rightmost terminal, see [`Grammar::prod_prec`].
  pub prec: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Assoc {
  LeftAssoc,
  RightAssoc,
  NonAssoc,
}

impl fmt::Display for Assoc {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Assoc::LeftAssoc => write!(f, "left"),
      Assoc::RightAssoc => write!(f, "right"),
      Assoc::NonAssoc => write!(f, "nonassoc"),
    }
  }
}

/// Terminal name (or explicit tag) -> (binding level, associativity).
/// Higher level binds tighter. Missing entries mean "unspecified".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecedenceTable {
  entries: Map<String, (u32, Assoc)>,
}

impl PrecedenceTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// First declaration of a name wins.
  pub fn declare(&mut self, name: impl Into<String>, level: u32, assoc: Assoc) {
    self.entries.entry(name.into()).or_insert((level, assoc));
  }

  pub fn get(&self, name: &str) -> Option<(u32, Assoc)> {
    self.entries.get(name).copied()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Entries in sorted name order, for the canonical fingerprint.
  pub fn sorted(&self) -> Vec<(&str, u32, Assoc)> {
    let mut entries = self.entries.iter()
      .map(|(name, &(level, assoc))| (name.as_str(), level, assoc))
      .collect::<Vec<_>>();
    entries.sort();
    entries
  }
}

/// Whether untagged productions inherit the precedence of their rightmost
/// terminal. `Rightmost` is the standard rule and the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrecInherit {
  #[default]
  Rightmost,
  ExplicitOnly,
}

impl Grammar {
  /// Index of the virtual EOF terminal, one past the real terminals.
  pub fn eof_index(&self) -> usize {
    self.terms.len()
  }

  pub fn term_name(&self, term: TermId) -> &str {
    self.terms.get_by_left(&term).map(String::as_str).unwrap_or("$")
  }

  pub fn nt_name(&self, nt: NonterminalId) -> &str {
    self.nts.get_by_left(&nt).unwrap()
  }

  /// Terminal name for an ACTION-table column index (EOF included).
  pub fn term_name_by_index(&self, index: usize) -> &str {
    if index == self.eof_index() {
      "$"
    } else {
      self.terms.get_by_left(&TermId::from(index as u32))
        .map(String::as_str)
        .unwrap_or("$")
    }
  }

  /// Precedence of a production: its explicit tag, or under
  /// [`PrecInherit::Rightmost`] the entry of its rightmost terminal.
  pub fn prod_prec(&self, prod_ix: usize, inherit: PrecInherit) -> Option<(u32, Assoc)> {
    let prod = &self.prods[prod_ix];
    if let Some(tag) = &prod.prec {
      return self.precedence.get(tag);
    }

    if inherit == PrecInherit::ExplicitOnly {
      return None;
    }

    prod.symbols.iter().rev()
      .find_map(|sym| {
        match sym {
          Symbol::Terminal(term) => Some(self.term_name(*term)),
          Symbol::Nonterminal(_) => None,
        }
      })
      .and_then(|name| self.precedence.get(name))
  }

  pub fn term_prec(&self, index: usize) -> Option<(u32, Assoc)> {
    if index == self.eof_index() {
      return None;
    }
    self.precedence.get(self.term_name_by_index(index))
  }
}

impl Production {
  pub fn fmt(&self, grammar: &Grammar, f: &mut impl fmt::Write) -> fmt::Result {
    write!(f, "{} ->", grammar.nt_name(self.nt))?;
    for sym in &self.symbols {
      match sym {
        Symbol::Terminal(term) => write!(f, " {}", grammar.term_name(*term))?,
        Symbol::Nonterminal(nt) => write!(f, " {}", grammar.nt_name(*nt))?,
      }
    }
    Ok(())
  }

  pub fn to_string(&self, grammar: &Grammar) -> String {
    let mut s = String::new();
    self.fmt(grammar, &mut s).unwrap();
    s
  }
}
