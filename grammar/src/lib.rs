//! Grammar representation and analysis.
//!
//! A grammar text plus the companion lexer's token-kind set builds a frozen
//! [`Grammar`]; [`ffn::compute`] derives the nullable/FIRST/FOLLOW fixed
//! points that the LR automaton builders consume.

pub mod ffn;
pub mod grammar;
pub mod lexer;
pub mod parse;
pub mod symbol;

pub use grammar::{Assoc, Grammar, PrecInherit, PrecedenceTable, Production};
pub use lexer::{LexRule, Lexer, LexerError, Token};
pub use symbol::{NonterminalId, NonterminalIdGen, Symbol, TermId, TermIdGen};

// Deterministic maps throughout: rebuilding the same grammar must produce
// byte-identical tables, so iteration order can never depend on hashing.
pub type Map<K, V> = indexmap::IndexMap<K, V>;
pub type Set<T> = indexmap::IndexSet<T>;
pub type HashMap<K, V> = std::collections::HashMap<K, V, fnv::FnvBuildHasher>;
pub type BiMap<L, R> = bimap::BiBTreeMap<L, R>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarError {
  pub kind: GrammarErrorKind,
  pub message: String,
  pub span: (usize, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarErrorKind {
  ParseError,
  NameConflict,
  NameNotFound,
  Unreachable,
}

impl std::fmt::Display for GrammarError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let kind = match self.kind {
      GrammarErrorKind::ParseError => "syntax error",
      GrammarErrorKind::NameConflict => "name conflict",
      GrammarErrorKind::NameNotFound => "name not found",
      GrammarErrorKind::Unreachable => "unreachable nonterminal",
    };
    write!(f, "{}: {}", kind, self.message)
  }
}

impl std::error::Error for GrammarError {}

/// Build a grammar from its text form.
///
/// Any rule symbol whose name is in `token_kinds` is a terminal; every
/// other name must be defined as the LHS of some rule. The first LHS is
/// the start symbol unless `start` designates one.
pub fn build(
  text: &str,
  token_kinds: &[&str],
  precedence: PrecedenceTable,
  start: Option<&str>,
) -> Result<Grammar, GrammarError> {
  let rules = parse::parse(text).map_err(|err| GrammarError {
    kind: GrammarErrorKind::ParseError,
    message: err.message,
    span: err.span,
  })?;

  if rules.is_empty() {
    return Err(GrammarError {
      kind: GrammarErrorKind::ParseError,
      message: "grammar has no rules".into(),
      span: (0, text.len()),
    });
  }

  let mut term_id_gen = TermIdGen::default();
  let mut terms = BiMap::new();
  for &kind in token_kinds {
    // the empty kind is the lexer's skip channel; "$" is reserved for EOF
    if kind.is_empty() || kind == lexer::EOF || kind == lexer::UNKNOWN {
      continue;
    }
    if terms.get_by_right(kind).is_none() {
      terms.insert(term_id_gen.gen(), kind.to_owned());
    }
  }

  let mut nt_id_gen = NonterminalIdGen::default();
  let mut nts = BiMap::<NonterminalId, String>::new();
  for rule in &rules {
    if terms.get_by_right(&rule.lhs.1).is_some() {
      return Err(GrammarError {
        kind: GrammarErrorKind::NameConflict,
        message: format!("rule name `{}` collides with a token kind", rule.lhs.1),
        span: rule.lhs.0,
      });
    }
    if nts.get_by_right(&rule.lhs.1).is_none() {
      nts.insert(nt_id_gen.gen(), rule.lhs.1.clone());
    }
  }

  let mut prods = vec![];
  let mut nt_prods = Map::<NonterminalId, Vec<usize>>::new();
  for &nt in nts.left_values() {
    nt_prods.insert(nt, vec![]);
  }

  for rule in &rules {
    let nt = *nts.get_by_right(&rule.lhs.1).unwrap();

    for alt in &rule.alts {
      let mut symbols = vec![];
      for (span, name) in &alt.symbols {
        if let Some(&term) = terms.get_by_right(name) {
          symbols.push(Symbol::Terminal(term));
        } else if let Some(&sym_nt) = nts.get_by_right(name) {
          symbols.push(Symbol::Nonterminal(sym_nt));
        } else {
          return Err(GrammarError {
            kind: GrammarErrorKind::NameNotFound,
            message: format!(
              "`{}` is neither a token kind nor a defined nonterminal", name),
            span: *span,
          });
        }
      }

      if let Some((span, tag)) = &alt.prec {
        if precedence.get(tag).is_none() {
          return Err(GrammarError {
            kind: GrammarErrorKind::NameNotFound,
            message: format!("precedence tag `{}` is not declared", tag),
            span: *span,
          });
        }
      }

      nt_prods.get_mut(&nt).unwrap().push(prods.len());
      prods.push(Production {
        nt,
        symbols,
        action: alt.action.clone(),
        prec: alt.prec.as_ref().map(|(_, tag)| tag.clone()),
      });
    }
  }

  let start_nt = match start {
    Some(name) => {
      *nts.get_by_right(name).ok_or_else(|| GrammarError {
        kind: GrammarErrorKind::NameNotFound,
        message: format!("start symbol `{}` has no rules", name),
        span: (0, text.len()),
      })?
    }
    None => *nts.get_by_right(rules[0].lhs.1.as_str()).unwrap(),
  };

  check_reachable(&rules, &nts, &prods, &nt_prods, start_nt)?;

  Ok(Grammar {
    prods,
    terms,
    nts,
    nt_prods,
    start_nt,
    precedence,
  })
}

fn check_reachable(
  rules: &[parse::RuleDecl],
  nts: &BiMap<NonterminalId, String>,
  prods: &[Production],
  nt_prods: &Map<NonterminalId, Vec<usize>>,
  start_nt: NonterminalId,
) -> Result<(), GrammarError> {
  let mut reachable = Set::new();
  let mut stack = vec![start_nt];

  while let Some(nt) = stack.pop() {
    if !reachable.insert(nt) {
      continue;
    }
    for &prod_ix in &nt_prods[&nt] {
      for sym in &prods[prod_ix].symbols {
        if let Symbol::Nonterminal(sym_nt) = sym {
          if !reachable.contains(sym_nt) {
            stack.push(*sym_nt);
          }
        }
      }
    }
  }

  for &nt in nts.left_values() {
    if !reachable.contains(&nt) {
      let name = nts.get_by_left(&nt).unwrap();
      let span = rules.iter()
        .find(|rule| &rule.lhs.1 == name)
        .map(|rule| rule.lhs.0)
        .unwrap_or((0, 0));
      return Err(GrammarError {
        kind: GrammarErrorKind::Unreachable,
        message: format!("nonterminal `{}` is not reachable from the start symbol", name),
        span,
      });
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn classify_symbols() {
    let grammar = build(
      "E -> E + T | T ; T -> n ;",
      &["+", "n"],
      PrecedenceTable::new(),
      None,
    ).unwrap();

    assert_eq!(grammar.terms.len(), 2);
    assert_eq!(grammar.nts.len(), 2);
    assert_eq!(grammar.prods.len(), 3);
    assert_eq!(grammar.nt_name(grammar.start_nt), "E");

    let e = *grammar.nts.get_by_right("E").unwrap();
    let plus = *grammar.terms.get_by_right("+").unwrap();
    assert_eq!(
      grammar.prods[0].symbols,
      vec![
        Symbol::Nonterminal(e),
        Symbol::Terminal(plus),
        Symbol::Nonterminal(*grammar.nts.get_by_right("T").unwrap()),
      ],
    );
  }

  #[test]
  fn split_rule_groups_share_a_nonterminal() {
    let grammar = build(
      "A -> B ; B -> b ; A -> a ;",
      &["a", "b"],
      PrecedenceTable::new(),
      None,
    ).unwrap();

    let a = *grammar.nts.get_by_right("A").unwrap();
    assert_eq!(grammar.nt_prods[&a], vec![0, 2]);
  }

  #[test]
  fn undefined_symbol_is_an_error() {
    let err = build(
      "E -> T ;",
      &["n"],
      PrecedenceTable::new(),
      None,
    ).unwrap_err();

    assert_eq!(err.kind, GrammarErrorKind::NameNotFound);
    assert!(err.message.contains("`T`"));
  }

  #[test]
  fn lhs_colliding_with_token_kind_is_an_error() {
    let err = build(
      "n -> n n ;",
      &["n"],
      PrecedenceTable::new(),
      None,
    ).unwrap_err();

    assert_eq!(err.kind, GrammarErrorKind::NameConflict);
  }

  #[test]
  fn unreachable_nonterminal_is_an_error() {
    let err = build(
      "S -> a ; Dead -> a ;",
      &["a"],
      PrecedenceTable::new(),
      None,
    ).unwrap_err();

    assert_eq!(err.kind, GrammarErrorKind::Unreachable);
    assert!(err.message.contains("`Dead`"));
  }

  #[test]
  fn explicit_start_symbol() {
    let grammar = build(
      "Helper -> a S ; S -> a ; S -> Helper ;",
      &["a"],
      PrecedenceTable::new(),
      Some("S"),
    ).unwrap();

    assert_eq!(grammar.nt_name(grammar.start_nt), "S");
  }

  #[test]
  fn unknown_prec_tag_is_an_error() {
    let err = build(
      "E -> E + E %prec ADD | n ;",
      &["+", "n"],
      PrecedenceTable::new(),
      None,
    ).unwrap_err();

    assert_eq!(err.kind, GrammarErrorKind::NameNotFound);
    assert!(err.message.contains("ADD"));
  }
}
