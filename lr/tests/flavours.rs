//! Cross-flavour behaviour on grammars with interesting conflict shapes.

use pretty_assertions::assert_eq;
use grammar::lexer::{LexRule, Lexer, Token};
use grammar::PrecedenceTable;
use lr::{build, parse, BuildOptions, ConflictLog, ParseTables, Semantics, TableKind};

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

fn stmt_lexer() -> Lexer {
  Lexer::new(&[
    LexRule::new("if", "if"),
    LexRule::new("else", "else"),
    LexRule::new("x", "x"),
    LexRule::new(r"[ \t\n]+", ""),
  ]).unwrap()
}

fn dangling_else(kind: TableKind, budget: usize) -> (ParseTables, ConflictLog) {
  build(
    "S -> if S else S | if S | x ;",
    &["if", "else", "x"],
    PrecedenceTable::new(),
    kind,
    &BuildOptions {
      expected_conflicts: budget,
      ..BuildOptions::default()
    },
  ).unwrap()
}

#[test]
fn dangling_else_defaults_to_shift() {
  let (tables, log) = dangling_else(TableKind::Lalr1, 1);

  // exactly the one classic conflict, on `else`
  assert_eq!(log.rr.len(), 0);
  assert_eq!(log.sr.len(), 1);
  assert_eq!(log.sr[0].terminal, "else");

  // shift wins, so the else binds to the nearest if
  let result = parse(&tables, stmt_lexer().scan("if if x else x"), &mut Sexpr).unwrap();
  assert_eq!(result, "(if (if x else x))");
}

#[test]
fn all_flavours_bind_the_dangling_else_alike() {
  for kind in [TableKind::Slr, TableKind::Lr1, TableKind::Lalr1] {
    let (tables, log) = dangling_else(kind, 10);
    assert!(log.rr.is_empty(), "{:?}", kind);
    assert!(!log.sr.is_empty(), "{:?}", kind);

    let result = parse(&tables, stmt_lexer().scan("if if x else x"), &mut Sexpr).unwrap();
    assert_eq!(result, "(if (if x else x))", "{:?}", kind);

    let result = parse(&tables, stmt_lexer().scan("if x else if x"), &mut Sexpr).unwrap();
    assert_eq!(result, "(if x else (if x))", "{:?}", kind);
  }
}

#[test]
fn lr1_resolves_what_slr_cannot() {
  // LR(1) but not SLR(1): in SLR the d-reduction fires on the whole
  // FOLLOW(A) and collides with the shift of a
  let text = "S -> A a | b A c | d c | b d a ; A -> d ;";
  let kinds = ["a", "b", "c", "d"];

  let (_, log) = build(
    text,
    &kinds,
    PrecedenceTable::new(),
    TableKind::Lr1,
    &BuildOptions::default(),
  ).unwrap();
  assert!(log.is_empty());

  let slr = build(
    text,
    &kinds,
    PrecedenceTable::new(),
    TableKind::Slr,
    &BuildOptions::default(),
  );
  assert!(slr.is_err());
}

#[test]
fn lalr_tables_stay_deterministic_across_builds() {
  let (first, _) = dangling_else(TableKind::Lalr1, 1);
  let (second, _) = dangling_else(TableKind::Lalr1, 1);
  assert_eq!(first, second);
}
