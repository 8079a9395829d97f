//! LALR(1): states are identified by their kernel cores; a revisited state
//! absorbs the incoming lookaheads and goes back on the worklist when they
//! grew, which propagates them through the existing closure. The resulting
//! ACTION table matches merging the full LR(1) collection by equal cores.

use crate::builder::{KernelItemSet, LrFlavor, State, StateStore};

pub enum LalrFlavor {}

impl LrFlavor for LalrFlavor {
  type StateKey = Vec<u32>;

  const LOOKAHEADS: bool = true;

  fn store_state(
    states: &mut StateStore<Self::StateKey>,
    kernel_item_set: KernelItemSet,
  ) -> (u32, bool) {
    let key = kernel_item_set.iter().map(|item| item.key).collect::<Vec<_>>();

    if let Some((ix, _, state)) = states.get_full_mut(&key) {
      let mut changed = false;
      // state.items begins with the kernel in the same sorted order
      for (old, new) in state.items.iter_mut().zip(&kernel_item_set) {
        if !new.lookaheads.is_subset(&old.lookaheads) {
          old.lookaheads.union_with(&new.lookaheads);
          changed = true;
        }
      }
      (ix as u32, changed)
    } else {
      let ix = states.insert_full(key, State::new(kernel_item_set)).0;
      (ix as u32, true)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use grammar::{Grammar, PrecedenceTable};
  use crate::augment::{self, Augmented};
  use crate::builder::{gen_states, Builder};
  use crate::lr1::Lr1Flavor;

  fn prepare(text: &str, kinds: &[&str]) -> Augmented {
    let grammar: Grammar = grammar::build(
      text,
      kinds,
      PrecedenceTable::new(),
      None,
    ).unwrap();

    augment::augment(grammar)
  }

  #[test]
  fn merges_lr1_states_with_equal_cores() {
    let aug = prepare("S -> C C ; C -> c C | d ;", &["c", "d"]);
    let ffn = grammar::ffn::compute(&aug.grammar);

    let mut lr1 = Builder::<Lr1Flavor>::new(&aug, &ffn);
    gen_states(&mut lr1, &aug);

    let mut lalr = Builder::<LalrFlavor>::new(&aug, &ffn);
    gen_states(&mut lalr, &aug);

    // LALR state count = LR(1) state count minus the merges
    let mut cores = std::collections::BTreeSet::new();
    for (key, _) in &lr1.states {
      cores.insert(key.iter().map(|(core, _)| *core).collect::<Vec<_>>());
    }
    let merges = lr1.states.len() - cores.len();

    assert!(merges > 0);
    assert_eq!(lalr.states.len(), lr1.states.len() - merges);
    assert_eq!(lalr.states.len(), 7);
  }

  #[test]
  fn merged_lookaheads_are_unions() {
    let aug = prepare("S -> C C ; C -> c C | d ;", &["c", "d"]);
    let ffn = grammar::ffn::compute(&aug.grammar);

    let mut lr1 = Builder::<Lr1Flavor>::new(&aug, &ffn);
    gen_states(&mut lr1, &aug);

    let mut lalr = Builder::<LalrFlavor>::new(&aug, &ffn);
    gen_states(&mut lalr, &aug);

    // every LR(1) item's lookaheads are contained in the LALR item that
    // shares its core
    for (_, lr1_state) in &lr1.states {
      let core = lr1_state.items[..lr1_state.kernel_len].iter()
        .map(|item| item.key)
        .collect::<Vec<_>>();

      let (_, lalr_state) = lalr.states.iter()
        .find(|(key, _)| **key == core)
        .unwrap();

      for item in &lr1_state.items {
        let merged = lalr_state.items.iter()
          .find(|lalr_item| lalr_item.key == item.key)
          .unwrap();
        assert!(item.lookaheads.is_subset(&merged.lookaheads));
      }
    }
  }
}
