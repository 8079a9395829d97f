//! The table cache: tables persisted between runs, keyed by the grammar's
//! canonical fingerprint.
//!
//! The stored artifact is versioned and sparse; anything that fails
//! validation on the way back in is a [`CacheError::Mismatch`] and callers
//! rebuild from the grammar instead.

use std::fmt;
use std::fs;
use std::hash::Hasher;
use std::io;
use std::path::PathBuf;
use fnv::FnvHasher;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use grammar::{Grammar, Symbol};
use crate::{ParseTables, ProductionMeta, TableKind};

const VERSION: u32 = 1;

/// Canonical fingerprint of a grammar and table flavour: sorted productions
/// as `lhs | rhs... | prec_tag`, the precedence table in sorted order, then
/// the flavour name, hashed to a hex key.
pub fn fingerprint(grammar: &Grammar, kind: TableKind) -> String {
  let mut lines = grammar.prods.iter()
    .map(|prod| {
      let rhs = prod.symbols.iter()
        .map(|sym| {
          match sym {
            Symbol::Terminal(term) => grammar.term_name(*term),
            Symbol::Nonterminal(nt) => grammar.nt_name(*nt),
          }
        })
        .join(" ");

      format!(
        "{} | {} | {}",
        grammar.nt_name(prod.nt),
        rhs,
        prod.prec.as_deref().unwrap_or(""),
      )
    })
    .collect::<Vec<_>>();
  lines.sort();

  let mut text = lines.join("\n");
  for (name, level, assoc) in grammar.precedence.sorted() {
    text.push_str(&format!("\n%prec {} {} {}", name, level, assoc));
  }
  text.push_str(&format!("\n%kind {}", kind.name()));

  let mut hasher = FnvHasher::default();
  hasher.write(text.as_bytes());
  format!("{:016x}", hasher.finish())
}

#[derive(Debug)]
pub enum CacheError {
  Io(io::Error),
  Codec(String),
  /// the stored artifact is not usable for this grammar
  Mismatch(String),
}

impl fmt::Display for CacheError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      CacheError::Io(err) => write!(f, "cache io error: {}", err),
      CacheError::Codec(msg) => write!(f, "cache codec error: {}", msg),
      CacheError::Mismatch(msg) => write!(f, "cached tables rejected: {}", msg),
    }
  }
}

impl std::error::Error for CacheError {}

/// Versioned on-disk form. ACTION and GOTO are stored sparse, as
/// `(state, column, cell)` triples of the non-error entries.
#[derive(Debug, Serialize, Deserialize)]
struct Artifact {
  version: u32,
  fingerprint: String,
  kind: TableKind,
  terms: Vec<String>,
  nts: Vec<String>,
  state_count: u32,
  start_state: u32,
  accept_prod: u32,
  actions: Vec<(u32, u32, i32)>,
  gotos: Vec<(u32, u32, u32)>,
  prods: Vec<ProductionMeta>,
}

/// A directory of table artifacts, one file per fingerprint. Concurrent
/// readers are fine; writers need external mutual exclusion per key.
#[derive(Debug, Clone)]
pub struct TableCache {
  dir: PathBuf,
}

impl TableCache {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  fn path(&self, fingerprint: &str) -> PathBuf {
    self.dir.join(format!("{}.tables", fingerprint))
  }

  pub fn store(&self, tables: &ParseTables) -> Result<(), CacheError> {
    fs::create_dir_all(&self.dir).map_err(CacheError::Io)?;

    let bytes = bincode::serialize(&encode(tables))
      .map_err(|err| CacheError::Codec(err.to_string()))?;
    fs::write(self.path(&tables.fingerprint), bytes).map_err(CacheError::Io)
  }

  /// `Ok(None)` when no artifact exists for the fingerprint;
  /// `Err(Mismatch)` when one exists but fails validation.
  pub fn load(&self, fingerprint: &str) -> Result<Option<ParseTables>, CacheError> {
    let bytes = match fs::read(self.path(fingerprint)) {
      Ok(bytes) => bytes,
      Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(err) => return Err(CacheError::Io(err)),
    };

    let artifact = bincode::deserialize::<Artifact>(&bytes)
      .map_err(|err| CacheError::Codec(err.to_string()))?;

    decode(artifact, fingerprint).map(Some)
  }
}

fn encode(tables: &ParseTables) -> Artifact {
  let actions = tables.action.iter().enumerate()
    .flat_map(|(state, row)| {
      row.iter().enumerate()
        .filter(|(_, &cell)| cell != 0)
        .map(move |(col, &cell)| (state as u32, col as u32, cell))
    })
    .collect();

  let gotos = tables.goto.iter().enumerate()
    .flat_map(|(state, row)| {
      row.iter().enumerate()
        .filter(|(_, &cell)| cell != 0)
        .map(move |(col, &cell)| (state as u32, col as u32, cell))
    })
    .collect();

  Artifact {
    version: VERSION,
    fingerprint: tables.fingerprint.clone(),
    kind: tables.kind,
    terms: tables.terms.clone(),
    nts: tables.nts.clone(),
    state_count: tables.state_count() as u32,
    start_state: tables.start_state,
    accept_prod: tables.accept_prod as u32,
    actions,
    gotos,
    prods: tables.prods.clone(),
  }
}

fn decode(artifact: Artifact, fingerprint: &str) -> Result<ParseTables, CacheError> {
  if artifact.version != VERSION {
    return Err(CacheError::Mismatch(format!(
      "version {} (expected {})", artifact.version, VERSION)));
  }
  if artifact.fingerprint != fingerprint {
    return Err(CacheError::Mismatch(format!(
      "fingerprint {} (expected {})", artifact.fingerprint, fingerprint)));
  }

  let state_count = artifact.state_count as usize;
  let eof = artifact.terms.len();

  if artifact.start_state as usize >= state_count {
    return Err(CacheError::Mismatch("start state out of range".into()));
  }
  if artifact.accept_prod as usize >= artifact.prods.len() {
    return Err(CacheError::Mismatch("accept production out of range".into()));
  }
  if artifact.prods.iter().any(|prod| prod.nt as usize >= artifact.nts.len()) {
    return Err(CacheError::Mismatch("production LHS out of range".into()));
  }

  let mut action = vec![vec![0i32; eof + 1]; state_count];
  for (state, col, cell) in artifact.actions {
    if state as usize >= state_count || col as usize > eof {
      return Err(CacheError::Mismatch("ACTION entry out of range".into()));
    }
    action[state as usize][col as usize] = cell;
  }

  let mut goto = vec![vec![0u32; artifact.nts.len()]; state_count];
  for (state, col, cell) in artifact.gotos {
    if state as usize >= state_count || col as usize >= artifact.nts.len()
      || cell as usize > state_count
    {
      return Err(CacheError::Mismatch("GOTO entry out of range".into()));
    }
    goto[state as usize][col as usize] = cell;
  }

  Ok(ParseTables {
    kind: artifact.kind,
    action,
    goto,
    prods: artifact.prods,
    terms: artifact.terms,
    nts: artifact.nts,
    eof,
    start_state: artifact.start_state,
    accept_prod: artifact.accept_prod as usize,
    fingerprint: artifact.fingerprint,
  })
}
