//! Canonical LR(1): states are identified by their kernel items together
//! with the lookahead sets, so cores are never merged.

use crate::builder::{KernelItemSet, LrFlavor, State, StateStore};

pub enum Lr1Flavor {}

impl LrFlavor for Lr1Flavor {
  type StateKey = Vec<(u32, Vec<usize>)>;

  const LOOKAHEADS: bool = true;

  fn store_state(
    states: &mut StateStore<Self::StateKey>,
    kernel_item_set: KernelItemSet,
  ) -> (u32, bool) {
    let key = kernel_item_set.iter()
      .map(|item| (item.key, item.lookaheads.iter().collect::<Vec<_>>()))
      .collect::<Vec<_>>();

    if let Some(ix) = states.get_index_of(&key) {
      (ix as u32, false)
    } else {
      let ix = states.insert_full(key, State::new(kernel_item_set)).0;
      (ix as u32, true)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use grammar::PrecedenceTable;
  use crate::augment;
  use crate::builder::{gen_states, Builder};

  #[test]
  fn lookaheads_split_states() {
    // S -> C C ; C -> c C | d: canonical LR(1) keeps the c/d states
    // separate per lookahead context (dragon-book grammar 4.55)
    let grammar = grammar::build(
      "S -> C C ; C -> c C | d ;",
      &["c", "d"],
      PrecedenceTable::new(),
      None,
    ).unwrap();

    let aug = augment::augment(grammar);
    let ffn = grammar::ffn::compute(&aug.grammar);
    let mut builder = Builder::<Lr1Flavor>::new(&aug, &ffn);
    gen_states(&mut builder, &aug);

    assert_eq!(builder.states.len(), 10);
  }
}
