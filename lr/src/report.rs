//! Rendering of conflict logs for the diagnostic stream.

use std::fmt::Write;
use crate::{ConflictLog, RrConflict, SrConflict};

pub fn render(log: &ConflictLog) -> String {
  let mut buf = String::new();

  for conflict in &log.sr {
    render_sr(conflict, &mut buf);
  }
  for conflict in &log.rr {
    render_rr(conflict, &mut buf);
  }

  buf
}

fn render_sr(conflict: &SrConflict, buf: &mut String) {
  writeln!(
    buf,
    "shift-reduce conflict in state {} on `{}`:\n",
    conflict.state,
    conflict.terminal,
  ).unwrap();
  for item in &conflict.state_items {
    writeln!(buf, "  {}", item).unwrap();
  }
  writeln!(buf, "\nwhich can shift `{}`\nor reduce by:\n\n  {}\n",
    conflict.terminal,
    conflict.reduce,
  ).unwrap();
  writeln!(buf, "resolved as shift (no precedence given)\n").unwrap();
}

fn render_rr(conflict: &RrConflict, buf: &mut String) {
  writeln!(
    buf,
    "reduce-reduce conflict in state {} on `{}`:\n",
    conflict.state,
    conflict.terminal,
  ).unwrap();
  for item in &conflict.state_items {
    writeln!(buf, "  {}", item).unwrap();
  }
  writeln!(buf, "\nwhich can be reduced by:\n\n  {}\n\nor:\n\n  {}\n",
    conflict.kept,
    conflict.dropped,
  ).unwrap();
  writeln!(buf, "resolved in favour of the earlier production\n").unwrap();
}
