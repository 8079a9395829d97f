//! SLR(1): LR(0) item sets, reductions keyed by FOLLOW of the LHS.

use crate::builder::{KernelItemSet, LrFlavor, State, StateStore};

pub enum SlrFlavor {}

impl LrFlavor for SlrFlavor {
  type StateKey = Vec<u32>;

  const LOOKAHEADS: bool = false;

  fn store_state(
    states: &mut StateStore<Self::StateKey>,
    kernel_item_set: KernelItemSet,
  ) -> (u32, bool) {
    let key = kernel_item_set.iter().map(|item| item.key).collect::<Vec<_>>();

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
  fn states_of_a_small_expression_grammar() {
    // E -> T plus E | T ; T -> x     (dragon-book SLR example)
    let grammar = grammar::build(
      "E -> T + E | T ; T -> x ;",
      &["+", "x"],
      PrecedenceTable::new(),
      None,
    ).unwrap();

    let aug = augment::augment(grammar);
    let ffn = grammar::ffn::compute(&aug.grammar);
    let mut builder = Builder::<SlrFlavor>::new(&aug, &ffn);
    let start = gen_states(&mut builder, &aug);

    assert_eq!(start, 0);
    // kernels: start, {_E -> E.}, {E -> T.+E, E -> T.}, {T -> x.},
    // {E -> T+.E}, {E -> T+E.}
    assert_eq!(builder.states.len(), 6);

    // revisiting a state never re-queues it
    let kernel = builder.states[0].items.clone();
    let kernel = kernel[..builder.states[0].kernel_len].to_vec();
    let (ix, changed) = SlrFlavor::store_state(&mut builder.states, kernel);
    assert_eq!(ix, 0);
    assert!(!changed);
  }
}
