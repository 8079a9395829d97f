//! compute FIRST, FOLLOW, and NULLABLE sets.

use bit_set::BitSet;
use crate::grammar::Grammar;
use crate::symbol::{NonterminalId, Symbol};
use crate::Map;

/// Fixed points of the grammar analyses. Terminal sets are indexed by
/// terminal index; the EOF index may appear in FOLLOW sets. `A` is nullable
/// iff `nullable` contains its nonterminal index, which doubles as the
/// epsilon marker of `FIRST(A)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ffn {
  pub nullable: BitSet,
  pub first: Map<NonterminalId, BitSet>,
  pub follow: Map<NonterminalId, BitSet>,
}

pub fn compute(grammar: &Grammar) -> Ffn {
  let nullable = compute_nullable(grammar);
  let first = compute_first(grammar, &nullable);
  let follow = compute_follow(grammar, &nullable, &first);

  Ffn {
    nullable,
    first,
    follow,
  }
}

impl Ffn {
  pub fn nullable_nt(&self, nt: NonterminalId) -> bool {
    self.nullable.contains(nt.index())
  }

  /// FIRST of a symbol string followed by the lookahead set `last`.
  /// `last` contributes iff the whole string is nullable.
  pub fn first_of(
    &self,
    result: &mut BitSet,
    symbols: &[Symbol],
    last: Option<&BitSet>,
  ) {
    symbols_first(result, &self.nullable, &self.first, symbols, last);
  }
}

fn symbols_first(
  result: &mut BitSet,
  nullable: &BitSet,
  first: &Map<NonterminalId, BitSet>,
  symbols: &[Symbol],
  last: Option<&BitSet>,
) {
  for sym in symbols {
    match sym {
      Symbol::Terminal(term) => {
        result.insert(term.index());
        return;
      }
      Symbol::Nonterminal(nt) => {
        result.union_with(&first[nt]);
        if !nullable.contains(nt.index()) {
          return;
        }
      }
    }
  }

  if let Some(last) = last {
    result.union_with(last);
  }
}

fn compute_nullable(grammar: &Grammar) -> BitSet {
  let mut nullable = BitSet::with_capacity(grammar.nts.len());

  let mut changed = true;
  while changed {
    changed = false;
    for prod in &grammar.prods {
      if nullable.contains(prod.nt.index()) {
        continue;
      }

      let prod_nullable = prod.symbols.iter().all(|sym| {
        match sym {
          Symbol::Terminal(_) => false,
          Symbol::Nonterminal(nt) => nullable.contains(nt.index()),
        }
      });

      if prod_nullable {
        nullable.insert(prod.nt.index());
        changed = true;
      }
    }
  }

  nullable
}

fn compute_first(grammar: &Grammar, nullable: &BitSet) -> Map<NonterminalId, BitSet> {
  let mut first = Map::new();
  for &nt in grammar.nts.left_values() {
    first.insert(nt, BitSet::with_capacity(grammar.eof_index() + 1));
  }

  let mut buf = BitSet::with_capacity(grammar.eof_index() + 1);
  let mut changed = true;
  while changed {
    changed = false;
    for prod in &grammar.prods {
      buf.clear();
      symbols_first(&mut buf, nullable, &first, &prod.symbols, None);

      let nt_first = first.get_mut(&prod.nt).unwrap();
      if !buf.is_subset(nt_first) {
        nt_first.union_with(&buf);
        changed = true;
      }
    }
  }

  first
}

fn compute_follow(
  grammar: &Grammar,
  nullable: &BitSet,
  first: &Map<NonterminalId, BitSet>,
) -> Map<NonterminalId, BitSet> {
  let mut follow = Map::new();
  for &nt in grammar.nts.left_values() {
    follow.insert(nt, BitSet::with_capacity(grammar.eof_index() + 1));
  }
  follow.get_mut(&grammar.start_nt).unwrap().insert(grammar.eof_index());

  loop {
    let mut changed = false;

    for prod in &grammar.prods {
      // FOLLOW contribution of the suffix right of the current symbol.
      // While the scan has only crossed nullable symbols, it includes
      // FOLLOW(lhs); that keeps the lhs propagation alive through interior
      // nullable suffixes, not just for the rightmost symbol.
      let mut suffix: Option<BitSet> = None;

      for sym in prod.symbols.iter().rev() {
        match sym {
          Symbol::Terminal(term) => {
            let mut set = BitSet::with_capacity(grammar.eof_index() + 1);
            set.insert(term.index());
            suffix = Some(set);
          }
          Symbol::Nonterminal(nt) => {
            let mut sf = match suffix {
              Some(sf) => sf,
              None => follow[&prod.nt].clone(),
            };

            let nt_follow = follow.get_mut(nt).unwrap();
            if !sf.is_subset(nt_follow) {
              nt_follow.union_with(&sf);
              changed = true;
            }

            suffix = Some(if nullable.contains(nt.index()) {
              sf.union_with(&first[nt]);
              sf
            } else {
              first[nt].clone()
            });
          }
        }
      }
    }

    if !changed {
      break;
    }
  }

  follow
}
