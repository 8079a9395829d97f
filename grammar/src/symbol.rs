//! Interned symbol identifiers.
//!
//! Terminals and nonterminals are identified by dense `u32` ids; names live
//! in the grammar's bidirectional maps. The two id spaces are disjoint.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(u32);

impl TermId {
  pub fn id(self) -> u32 {
    self.0
  }

  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl From<u32> for TermId {
  fn from(id: u32) -> Self {
    TermId(id)
  }
}

#[derive(Default)]
pub struct TermIdGen(u32);

impl TermIdGen {
  pub fn gen(&mut self) -> TermId {
    let i = self.0;
    self.0 += 1;
    TermId(i)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonterminalId(u32);

impl NonterminalId {
  pub fn id(self) -> u32 {
    self.0
  }

  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl From<u32> for NonterminalId {
  fn from(id: u32) -> Self {
    NonterminalId(id)
  }
}

#[derive(Default)]
pub struct NonterminalIdGen(u32);

impl NonterminalIdGen {
  pub fn gen(&mut self) -> NonterminalId {
    let i = self.0;
    self.0 += 1;
    NonterminalId(i)
  }

  /// Continue generating ids after `max`.
  pub fn after(max: u32) -> Self {
    NonterminalIdGen(max + 1)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
  Terminal(TermId),
  Nonterminal(NonterminalId),
}
