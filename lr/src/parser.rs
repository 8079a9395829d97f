//! The table-driven shift-reduce driver.
//!
//! The driver owns its stack for the duration of a parse and holds the
//! tables by shared reference, so any number of parses may run over one
//! table set concurrently. Malformed input never panics; it surfaces as a
//! [`ParseError`] carrying the offending token and the terminals the
//! current state would have accepted.

use std::fmt;
use grammar::lexer::{Token, EOF};
use crate::{Action, ParseTables};

/// Semantic-action dispatch. `reduce` receives the popped values in
/// left-to-right order (none for an epsilon production); action failures
/// travel inside the caller's `Value` type.
pub trait Semantics {
  type Value;

  /// Value of a shifted token.
  fn shift(&mut self, token: &Token) -> Self::Value;

  /// Value of a reduction by production `prod` (an index into
  /// [`ParseTables::prods`]).
  fn reduce(&mut self, prod: usize, args: Vec<Self::Value>) -> Self::Value;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
  /// token kind the parser choked on; `"$"` for end of input
  pub kind: String,
  pub text: String,
  pub pos: usize,
  pub state: u32,
  /// terminals for which the state has a non-error ACTION entry
  pub expected: Vec<String>,
}

impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "unexpected {} at offset {} in state {}, expected one of: {}",
      if self.kind == EOF { "end of input".to_owned() } else { format!("`{}`", self.text) },
      self.pos,
      self.state,
      self.expected.join(", "),
    )
  }
}

impl std::error::Error for ParseError {}

/// Run the shift-reduce loop over `tokens`, dispatching to `semantics`.
///
/// The iterator is expected to end with the synthetic `("$", "", eof_pos)`
/// token; plain exhaustion is tolerated and treated the same.
pub fn parse<S, I>(
  tables: &ParseTables,
  tokens: I,
  semantics: &mut S,
) -> Result<S::Value, ParseError>
where
  S: Semantics,
  I: IntoIterator<Item = Token>,
{
  let mut tokens = tokens.into_iter();
  let mut stack: Vec<(u32, S::Value)> = vec![];
  let mut state = tables.start_state;
  let mut token = tokens.next();
  let mut last_pos = 0;

  loop {
    let term_ix = match &token {
      None => Some(tables.eof),
      Some(tok) if tok.kind == EOF => {
        last_pos = tok.pos;
        Some(tables.eof)
      }
      Some(tok) => {
        last_pos = tok.pos;
        tables.term_index(&tok.kind)
      }
    };

    // a kind outside the terminal set (e.g. the lexer's unknown-input
    // channel) is rejected like an error cell
    let action = match term_ix {
      Some(ix) => tables.action_at(state, ix),
      None => Action::Error,
    };

    match action {
      Action::Shift(next) => {
        match token.take() {
          Some(tok) => {
            let value = semantics.shift(&tok);
            stack.push((state, value));
            state = next;
            token = tokens.next();
          }
          // no shift entry exists in the EOF column
          None => return Err(parse_error(tables, state, &token, last_pos)),
        }
      }
      Action::Reduce(prod_ix) => {
        let meta = &tables.prods[prod_ix];
        let n = meta.rhs_len;
        let state0 = if n == 0 { state } else { stack[stack.len() - n].0 };
        let args = stack.drain(stack.len() - n..)
          .map(|(_, value)| value)
          .collect::<Vec<_>>();

        let value = semantics.reduce(prod_ix, args);

        match tables.goto_at(state0, meta.nt) {
          Some(next) => {
            stack.push((state0, value));
            state = next;
          }
          None => return Err(parse_error(tables, state0, &token, last_pos)),
        }
      }
      Action::Accept => {
        // the sole value below the augmented frame is the parse result
        return match stack.pop() {
          Some((_, value)) => Ok(value),
          None => Err(parse_error(tables, state, &token, last_pos)),
        };
      }
      Action::Error => {
        return Err(parse_error(tables, state, &token, last_pos));
      }
    }
  }
}

fn parse_error(
  tables: &ParseTables,
  state: u32,
  token: &Option<Token>,
  last_pos: usize,
) -> ParseError {
  let (kind, text, pos) = match token {
    Some(tok) => (tok.kind.clone(), tok.text.clone(), tok.pos),
    None => (EOF.to_owned(), String::new(), last_pos),
  };

  ParseError {
    kind,
    text,
    pos,
    state,
    expected: tables.expected(state),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use grammar::lexer::{LexRule, Lexer};
  use grammar::{Assoc, PrecedenceTable};
  use crate::{build, BuildOptions, TableKind};

  /// Renders reductions as parenthesised terms, making associativity and
  /// precedence of the parse visible in the result string.
  struct Sexpr;

  impl Semantics for Sexpr {
    type Value = String;

    fn shift(&mut self, token: &Token) -> String {
      token.text.clone()
    }

    fn reduce(&mut self, _prod: usize, args: Vec<String>) -> String {
      match args.len() {
        0 => "()".to_owned(),
        1 => args.into_iter().next().unwrap(),
        _ => format!("({})", args.join(" ")),
      }
    }
  }

  fn expr_lexer() -> Lexer {
    Lexer::new(&[
      LexRule::new("n", "n"),
      LexRule::new(r"\+", "+"),
      LexRule::new(r"\*", "*"),
      LexRule::new("==", "=="),
      LexRule::new(r"[ \t]+", ""),
    ]).unwrap()
  }

  fn expr_precedence() -> PrecedenceTable {
    let mut precedence = PrecedenceTable::new();
    precedence.declare("+", 1, Assoc::LeftAssoc);
    precedence.declare("*", 2, Assoc::LeftAssoc);
    precedence.declare("==", 1, Assoc::NonAssoc);
    precedence
  }

  fn expr_tables(kind: TableKind) -> ParseTables {
    let (tables, log) = build(
      "E -> E + E | E * E | E == E | n ;",
      &["n", "+", "*", "=="],
      expr_precedence(),
      kind,
      &BuildOptions::default(),
    ).unwrap();
    assert!(log.is_empty());
    tables
  }

  fn run(tables: &ParseTables, input: &str) -> Result<String, ParseError> {
    parse(tables, expr_lexer().scan(input), &mut Sexpr)
  }

  #[test]
  fn precedence_groups_the_tighter_operator() {
    let tables = expr_tables(TableKind::Lalr1);
    assert_eq!(run(&tables, "n + n * n").unwrap(), "(n + (n * n))");
    assert_eq!(run(&tables, "n * n + n").unwrap(), "((n * n) + n)");
  }

  #[test]
  fn left_associativity_groups_to_the_left() {
    let tables = expr_tables(TableKind::Lalr1);
    assert_eq!(run(&tables, "n + n + n").unwrap(), "((n + n) + n)");
  }

  #[test]
  fn nonassoc_chain_is_rejected_at_the_second_operator() {
    let tables = expr_tables(TableKind::Lalr1);

    assert_eq!(run(&tables, "n == n").unwrap(), "(n == n)");

    let err = run(&tables, "n == n == n").unwrap_err();
    assert_eq!(err.kind, "==");
    assert_eq!(err.pos, 7);
    assert!(!err.expected.is_empty());
  }

  #[test]
  fn all_flavours_agree_on_the_parse() {
    for kind in [TableKind::Slr, TableKind::Lr1, TableKind::Lalr1] {
      let tables = expr_tables(kind);
      assert_eq!(run(&tables, "n + n * n").unwrap(), "(n + (n * n))", "{:?}", kind);
    }
  }

  #[test]
  fn epsilon_start_accepts_only_the_empty_input() {
    let (tables, _) = build(
      "S -> ;",
      &["a"],
      PrecedenceTable::new(),
      TableKind::Lalr1,
      &BuildOptions::default(),
    ).unwrap();

    let lexer = Lexer::new(&[LexRule::new("a", "a")]).unwrap();

    // the epsilon action fires with no arguments
    let value = parse(&tables, lexer.scan(""), &mut Sexpr).unwrap();
    assert_eq!(value, "()");

    let err = parse(&tables, lexer.scan("a"), &mut Sexpr).unwrap_err();
    assert_eq!(err.kind, "a");
    assert_eq!(err.expected, vec!["$"]);
  }

  #[test]
  fn error_carries_the_expected_terminal_set() {
    let tables = expr_tables(TableKind::Lalr1);

    let err = run(&tables, "n +").unwrap_err();
    assert_eq!(err.kind, "$");
    assert_eq!(err.expected, vec!["n"]);
  }

  #[test]
  fn unknown_token_kinds_are_rejected() {
    let tables = expr_tables(TableKind::Lalr1);

    // "?" matches no lexer rule and arrives as the unknown kind
    let err = run(&tables, "n ? n").unwrap_err();
    assert_eq!(err.kind, grammar::lexer::UNKNOWN);
    assert_eq!(err.pos, 2);
  }
}
