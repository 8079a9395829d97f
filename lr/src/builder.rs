//! The canonical-collection builder shared by every table flavour.
//!
//! States are kept in an insertion-ordered store keyed by their kernel; the
//! flavour decides what the kernel key is (with or without lookaheads) and
//! how a revisited state absorbs new lookaheads. Items are the flat
//! encoding `prod_ix * max_nsym_p1 + dot` plus a lookahead bitset, which
//! stays empty for SLR.

use std::collections::VecDeque;
use std::hash::Hash;
use bit_set::BitSet;
use fnv::FnvBuildHasher;
use grammar::ffn::Ffn;
use grammar::{Grammar, HashMap, Map, Symbol};
use indexmap::IndexMap;
use crate::augment::Augmented;

pub struct Builder<'a, T: LrFlavor> {
  pub grammar: &'a Grammar,
  pub ffn: &'a Ffn,
  pub states: StateStore<T::StateKey>,
  /// eof is the terminal index one past the real terminals
  pub eof: usize,
  /// max number of RHS symbols in productions, plus one.
  pub max_nsym_p1: u32,
}

pub type StateStore<Key> = IndexMap<Key, State, FnvBuildHasher>;

/// sorted by item key.
pub type KernelItemSet = Vec<Item>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
  /// production and dot
  pub key: u32,
  pub lookaheads: BitSet,
}

#[derive(Debug)]
pub struct State {
  /// Starts with the sorted `kernel_len` kernel items, closure items follow.
  pub items: Vec<Item>,
  pub kernel_len: usize,
  /// symbol -> index of destination state
  pub transitions: Map<Symbol, u32>,
}

impl State {
  pub fn new(items: KernelItemSet) -> Self {
    State {
      kernel_len: items.len(),
      items,
      transitions: Map::new(),
    }
  }
}

pub trait LrFlavor {
  type StateKey: Eq + Hash;

  /// Whether closure carries per-item lookahead sets.
  const LOOKAHEADS: bool;

  /// Returns the index of the state and whether the state has changed,
  /// which puts it back on the worklist.
  fn store_state(
    states: &mut StateStore<Self::StateKey>,
    kernel_item_set: KernelItemSet,
  ) -> (u32, bool);
}

pub fn encode_item(max_nsym_p1: u32, prod_ix: usize, dot: usize) -> u32 {
  prod_ix as u32 * max_nsym_p1 + dot as u32
}

pub fn decode_item(max_nsym_p1: u32, key: u32) -> (usize, usize) {
  ((key / max_nsym_p1) as usize, (key % max_nsym_p1) as usize)
}

impl<'a, T: LrFlavor> Builder<'a, T> {
  pub fn new(aug: &'a Augmented, ffn: &'a Ffn) -> Self {
    Self {
      grammar: &aug.grammar,
      ffn,
      states: StateStore::default(),
      eof: aug.eof,
      max_nsym_p1: aug.grammar.prods.iter()
        .map(|prod| prod.symbols.len())
        .max()
        .unwrap() as u32
        + 1,
    }
  }
}

/// Build the canonical collection, returning the start state.
pub fn gen_states<T: LrFlavor>(
  builder: &mut Builder<T>,
  aug: &Augmented,
) -> u32 {
  let mut start_lookaheads = BitSet::new();
  if T::LOOKAHEADS {
    start_lookaheads.insert(builder.eof);
  }

  let start_item_set = vec![
    Item {
      key: encode_item(builder.max_nsym_p1, aug.accept_prod, 0),
      lookaheads: start_lookaheads,
    }
  ];

  let (start_state, _) = T::store_state(&mut builder.states, start_item_set);

  let mut queue = VecDeque::new();
  queue.push_back(start_state);

  while let Some(state_ix) = queue.pop_front() {
    let state = &mut builder.states[state_ix as usize];
    compute_closure::<T>(builder.grammar, builder.ffn, builder.max_nsym_p1, state);

    let transitions = compute_transitions(builder.grammar, builder.max_nsym_p1, state);
    for (sym, mut kernel_item_set) in transitions {
      kernel_item_set.sort_by_key(|item| item.key);

      let (next_state, changed) = T::store_state(&mut builder.states, kernel_item_set);
      if changed {
        queue.push_back(next_state);
      }
      builder.states[state_ix as usize].transitions.insert(sym, next_state);
    }
  }

  start_state
}

fn compute_closure<T: LrFlavor>(
  grammar: &Grammar,
  ffn: &Ffn,
  max_nsym_p1: u32,
  state: &mut State,
) {
  let items = &mut state.items;
  // nt -> start index of its (contiguous) items
  let mut nt_starts = HashMap::default();
  let mut first = BitSet::with_capacity(grammar.eof_index() + 1);

  for (i, item) in items.iter().enumerate() {
    if let (prod, 0) = decode_item(max_nsym_p1, item.key) {
      let nt = grammar.prods[prod].nt;
      nt_starts.entry(nt).or_insert(i);
    }
  }

  let mut i = 0;
  while i < items.len() {
    let (prod, dot) = decode_item(max_nsym_p1, items[i].key);
    let prod = &grammar.prods[prod];
    if dot == prod.symbols.len() {
      i += 1;
      continue;
    }

    if let Symbol::Nonterminal(nt) = &prod.symbols[dot] {
      if T::LOOKAHEADS {
        first.clear();
        ffn.first_of(&mut first, &prod.symbols[dot + 1..], Some(&items[i].lookaheads));
      }

      if let Some(&nt_start) = nt_starts.get(nt) {
        if T::LOOKAHEADS {
          let mut changed = false;
          for j in nt_start .. nt_start + grammar.nt_prods[nt].len() {
            if !first.is_subset(&items[j].lookaheads) {
              items[j].lookaheads.union_with(&first);
              changed = true;
            }
          }

          // rescan items that may propagate the grown lookaheads
          if changed {
            if i > nt_start {
              i = nt_start;
            }
          } else {
            i += 1;
          }
        } else {
          i += 1;
        }
      } else {
        nt_starts.insert(*nt, items.len());

        for &prod_ix in &grammar.nt_prods[nt] {
          items.push(Item {
            key: encode_item(max_nsym_p1, prod_ix, 0),
            lookaheads: first.clone(),
          });
        }

        i += 1;
      }
    } else {
      i += 1;
    }
  }
}

fn compute_transitions(
  grammar: &Grammar,
  max_nsym_p1: u32,
  state: &State,
) -> Map<Symbol, Vec<Item>> {
  let mut transitions = Map::<_, Vec<Item>>::new();

  for item in &state.items {
    let (prod_ix, dot) = decode_item(max_nsym_p1, item.key);
    let prod = &grammar.prods[prod_ix];
    if dot == prod.symbols.len() {
      continue;
    }

    transitions.entry(prod.symbols[dot])
      .or_default()
      .push(Item {
        key: encode_item(max_nsym_p1, prod_ix, dot + 1),
        lookaheads: item.lookaheads.clone(),
      });
  }

  transitions
}

impl<'a, T: LrFlavor> Builder<'a, T> {
  pub fn fmt_item(
    &self,
    item: &Item,
    f: &mut impl std::fmt::Write,
  ) -> std::fmt::Result {
    let (prod, dot) = decode_item(self.max_nsym_p1, item.key);
    let nt = self.grammar.prods[prod].nt;
    let symbols = &self.grammar.prods[prod].symbols;

    write!(f, "{} ->", self.grammar.nt_name(nt))?;

    for (i, sym) in symbols.iter().enumerate() {
      if i == dot {
        write!(f, " .")?;
      }

      match sym {
        Symbol::Terminal(term) => write!(f, " {}", self.grammar.term_name(*term))?,
        Symbol::Nonterminal(nt) => write!(f, " {}", self.grammar.nt_name(*nt))?,
      }
    }

    if dot == symbols.len() {
      write!(f, " .")?;
    }

    if T::LOOKAHEADS {
      write!(f, "      ")?;

      let mut slash = false;
      for lookahead in item.lookaheads.iter() {
        if slash {
          write!(f, " / ")?;
        }
        slash = true;

        write!(f, "{}", self.grammar.term_name_by_index(lookahead))?;
      }
    }

    Ok(())
  }

  pub fn fmt_state_items(&self, state: &State) -> Vec<String> {
    state.items.iter()
      .map(|item| {
        let mut buf = String::new();
        self.fmt_item(item, &mut buf).unwrap();
        buf
      })
      .collect()
  }
}
