//! ACTION/GOTO table generation and conflict resolution.
//!
//! Table cells use the dense encoding documented on [`crate::ParseTables`].
//! Conflicts that precedence/associativity cannot settle are resolved by
//! the default rules (shift beats reduce, the earlier production beats the
//! later one) and recorded in the [`ConflictLog`]; both partitions of the
//! log always exist, so counting them never touches a missing key.

use grammar::{Assoc, PrecInherit, Symbol};
use crate::augment::Augmented;
use crate::builder::{decode_item, Builder, LrFlavor};

/// ACTION cell value for ACCEPT.
pub const ACCEPT: i32 = i32::MIN;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictLog {
  pub sr: Vec<SrConflict>,
  pub rr: Vec<RrConflict>,
}

impl ConflictLog {
  pub fn total(&self) -> usize {
    self.sr.len() + self.rr.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sr.is_empty() && self.rr.is_empty()
  }
}

/// A shift/reduce conflict that was resolved in favour of shift because
/// precedence information was missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrConflict {
  pub state: u32,
  pub state_items: Vec<String>,
  pub terminal: String,
  pub shift_state: u32,
  pub reduce_prod: u32,
  /// display form of the losing production
  pub reduce: String,
}

/// A reduce/reduce conflict, resolved in favour of the production declared
/// earlier. Precedence never participates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RrConflict {
  pub state: u32,
  pub state_items: Vec<String>,
  pub terminal: String,
  pub kept_prod: u32,
  pub dropped_prod: u32,
  pub kept: String,
  pub dropped: String,
}

/// Generates the ACTION and GOTO tables.
///
/// entry in ACTION table:
/// - positive: shift
/// - negative: reduce
/// - zero: error
/// - `i32::MIN`: accept
///
/// entry in GOTO table:
/// - positive: goto
/// - zero: error
pub fn gen_tables<T: LrFlavor>(
  builder: &Builder<T>,
  aug: &Augmented,
  inherit: PrecInherit,
) -> (Vec<Vec<i32>>, Vec<Vec<u32>>, ConflictLog) {
  let grammar = builder.grammar;
  let num_states = builder.states.len();
  let mut action = vec![vec![0i32; builder.eof + 1]; num_states];
  let mut goto = vec![vec![0u32; grammar.nts.len()]; num_states];
  let mut log = ConflictLog::default();

  for (from_state, (_, state)) in builder.states.iter().enumerate() {
    for item in &state.items {
      let (prod_ix, dot) = decode_item(builder.max_nsym_p1, item.key);
      let symbols = &grammar.prods[prod_ix].symbols;

      if dot < symbols.len() {
        // shift or goto
        let sym = &symbols[dot];
        let to_state = state.transitions[sym];
        match sym {
          Symbol::Terminal(term) => {
            let cell = &mut action[from_state][term.index()];
            if *cell < 0 && *cell != ACCEPT {
              let reduce_prod = !*cell as usize;
              match resolve_sr_conflict(builder, reduce_prod, term.index(), inherit) {
                SrResolution::Shift => *cell = to_state as i32 + 1,
                SrResolution::Reduce => {}
                SrResolution::Error => *cell = 0,
                SrResolution::Default => {
                  log.sr.push(SrConflict {
                    state: from_state as u32,
                    state_items: builder.fmt_state_items(state),
                    terminal: grammar.term_name(*term).to_owned(),
                    shift_state: to_state,
                    reduce_prod: reduce_prod as u32,
                    reduce: grammar.prods[reduce_prod].to_string(grammar),
                  });
                  *cell = to_state as i32 + 1;
                }
              }
            } else if *cell != ACCEPT {
              debug_assert!(*cell == 0 || *cell == to_state as i32 + 1);
              *cell = to_state as i32 + 1;
            }
          }
          Symbol::Nonterminal(nt) => {
            goto[from_state][nt.index()] = to_state + 1;
          }
        }
      } else if prod_ix == aug.accept_prod {
        action[from_state][builder.eof] = ACCEPT;
      } else {
        // reduce, keyed by the item lookaheads (LR family) or by FOLLOW of
        // the LHS (SLR)
        let nt = grammar.prods[prod_ix].nt;
        let lookaheads = if T::LOOKAHEADS {
          item.lookaheads.clone()
        } else {
          builder.ffn.follow[&nt].clone()
        };

        for lookahead in lookaheads.iter() {
          let cell = &mut action[from_state][lookahead];
          if *cell == ACCEPT {
            // the accept entry of the augmented rule wins
          } else if *cell > 0 {
            match resolve_sr_conflict(builder, prod_ix, lookahead, inherit) {
              SrResolution::Shift => {}
              SrResolution::Reduce => *cell = !(prod_ix as i32),
              SrResolution::Error => *cell = 0,
              SrResolution::Default => {
                log.sr.push(SrConflict {
                  state: from_state as u32,
                  state_items: builder.fmt_state_items(state),
                  terminal: grammar.term_name_by_index(lookahead).to_owned(),
                  shift_state: *cell as u32 - 1,
                  reduce_prod: prod_ix as u32,
                  reduce: grammar.prods[prod_ix].to_string(grammar),
                });
              }
            }
          } else if *cell < 0 {
            let other = !*cell as usize;
            let (kept, dropped) = if prod_ix < other {
              (prod_ix, other)
            } else {
              (other, prod_ix)
            };
            if kept != dropped {
              log.rr.push(RrConflict {
                state: from_state as u32,
                state_items: builder.fmt_state_items(state),
                terminal: grammar.term_name_by_index(lookahead).to_owned(),
                kept_prod: kept as u32,
                dropped_prod: dropped as u32,
                kept: grammar.prods[kept].to_string(grammar),
                dropped: grammar.prods[dropped].to_string(grammar),
              });
              *cell = !(kept as i32);
            }
          } else {
            *cell = !(prod_ix as i32);
          }
        }
      }
    }
  }

  (action, goto, log)
}

enum SrResolution {
  Shift,
  Reduce,
  Error,
  /// no precedence information; shift wins and the conflict is logged
  Default,
}

fn resolve_sr_conflict<T: LrFlavor>(
  builder: &Builder<T>,
  prod_ix: usize,
  term_index: usize,
  inherit: PrecInherit,
) -> SrResolution {
  let grammar = builder.grammar;
  match (grammar.prod_prec(prod_ix, inherit), grammar.term_prec(term_index)) {
    (Some((prod_level, _)), Some((term_level, assoc))) => {
      if term_level > prod_level {
        SrResolution::Shift
      } else if term_level < prod_level {
        SrResolution::Reduce
      } else {
        match assoc {
          Assoc::LeftAssoc => SrResolution::Reduce,
          Assoc::RightAssoc => SrResolution::Shift,
          Assoc::NonAssoc => SrResolution::Error,
        }
      }
    }
    _ => SrResolution::Default,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use grammar::{Grammar, PrecedenceTable};
  use crate::augment;
  use crate::builder::{gen_states, Builder};
  use crate::lalr::LalrFlavor;
  use crate::slr::SlrFlavor;

  fn tables_of(
    grammar: Grammar,
  ) -> (Vec<Vec<i32>>, Vec<Vec<u32>>, ConflictLog, Vec<String>) {
    let aug = augment::augment(grammar);
    let ffn = grammar::ffn::compute(&aug.grammar);
    let mut builder = Builder::<LalrFlavor>::new(&aug, &ffn);
    gen_states(&mut builder, &aug);
    let (action, goto, log) = gen_tables(&builder, &aug, PrecInherit::Rightmost);

    let terms = (0..=builder.eof)
      .map(|ix| aug.grammar.term_name_by_index(ix).to_owned())
      .collect();

    (action, goto, log, terms)
  }

  #[test]
  fn conflict_free_grammar_has_an_empty_log() {
    let grammar = grammar::build(
      "S -> C C ; C -> c C | d ;",
      &["c", "d"],
      PrecedenceTable::new(),
      None,
    ).unwrap();

    let (action, _, log, terms) = tables_of(grammar);

    assert!(log.is_empty());
    assert_eq!(log.total(), 0);

    // exactly one accept cell, in the EOF column
    let eof = terms.iter().position(|t| t == "$").unwrap();
    let accepts = action.iter()
      .filter(|row| row[eof] == ACCEPT)
      .count();
    assert_eq!(accepts, 1);
  }

  #[test]
  fn dangling_conflicts_default_to_shift_and_are_logged() {
    // ambiguous expression grammar without precedence: one s/r conflict
    // per (E . op E, op) pair
    let grammar = grammar::build(
      "E -> E + E | n ;",
      &["+", "n"],
      PrecedenceTable::new(),
      None,
    ).unwrap();

    let (action, _, log, terms) = tables_of(grammar);

    assert!(!log.sr.is_empty());
    assert!(log.rr.is_empty());
    assert_eq!(log.total(), log.sr.len());

    // the conflicted cell holds the shift
    let plus = terms.iter().position(|t| t == "+").unwrap();
    let state = log.sr[0].state as usize;
    assert!(action[state][plus] > 0);
    assert_eq!(log.sr[0].reduce, "E -> E + E");
  }

  #[test]
  fn rr_conflicts_keep_the_earlier_production() {
    // both A -> a and B -> a reduce on $ in the same state
    let grammar = grammar::build(
      "S -> A | B ; A -> a ; B -> a ;",
      &["a"],
      PrecedenceTable::new(),
      None,
    ).unwrap();

    let (action, _, log, terms) = tables_of(grammar);

    assert_eq!(log.rr.len(), 1);
    assert_eq!(log.rr[0].kept, "A -> a");
    assert_eq!(log.rr[0].dropped, "B -> a");
    assert!(log.rr[0].kept_prod < log.rr[0].dropped_prod);

    let eof = terms.iter().position(|t| t == "$").unwrap();
    let state = log.rr[0].state as usize;
    assert_eq!(action[state][eof], !(log.rr[0].kept_prod as i32));
  }

  #[test]
  fn precedence_resolves_silently() {
    let mut precedence = PrecedenceTable::new();
    precedence.declare("+", 1, Assoc::LeftAssoc);
    precedence.declare("*", 2, Assoc::LeftAssoc);

    let grammar = grammar::build(
      "E -> E + E | E * E | n ;",
      &["+", "*", "n"],
      precedence,
      None,
    ).unwrap();

    let (_, _, log, _) = tables_of(grammar);
    assert!(log.is_empty());
  }

  #[test]
  fn nonassoc_tie_leaves_an_error_cell() {
    let mut precedence = PrecedenceTable::new();
    precedence.declare("==", 1, Assoc::NonAssoc);

    let grammar = grammar::build(
      "E -> E == E | n ;",
      &["==", "n"],
      precedence,
      None,
    ).unwrap();

    let (action, _, log, terms) = tables_of(grammar);
    assert!(log.is_empty());

    // after E == E . with lookahead ==, neither shift nor reduce survives
    let eq = terms.iter().position(|t| t == "==").unwrap();
    let eof = terms.iter().position(|t| t == "$").unwrap();
    let error_rows = action.iter()
      .filter(|row| row[eq] == 0 && row[eof] < 0 && row[eof] != ACCEPT)
      .count();
    assert!(error_rows > 0);
  }

  #[test]
  fn slr_reduces_on_follow() {
    let grammar = grammar::build(
      "E -> T + E | T ; T -> x ;",
      &["+", "x"],
      PrecedenceTable::new(),
      None,
    ).unwrap();

    let aug = augment::augment(grammar);
    let ffn = grammar::ffn::compute(&aug.grammar);
    let mut builder = Builder::<SlrFlavor>::new(&aug, &ffn);
    gen_states(&mut builder, &aug);
    let (action, _, log) = gen_tables(&builder, &aug, PrecInherit::Rightmost);

    assert!(log.is_empty());

    // T -> x . reduces on both + and $ (FOLLOW(T)), nowhere else
    let x_reduce_row = action.iter()
      .find(|row| row.iter().any(|&cell| cell < 0 && cell != ACCEPT && !cell == 2))
      .unwrap();
    let plus = 0;
    let eof = builder.eof;
    assert!(x_reduce_row[plus] < 0);
    assert!(x_reduce_row[eof] < 0);
  }
}
