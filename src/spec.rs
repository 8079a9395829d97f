//! The self-contained parser-spec file format consumed by the CLI.
//!
//! Directive lines start with `%`; everything else is grammar text:
//!
//! ```text
//! %token n /[0-9]+/
//! %token + "+"
//! %skip /[ \t\n]+/
//! %left 1 +
//! %left 2 *
//! %nonassoc 3 ==
//! %start E
//! %expect 0
//!
//! E -> E + E | E * E | E == E | n ;
//! ```
//!
//! `%token NAME "literal"` escapes the literal; `%token NAME /regex/`
//! passes the pattern through to the lexer. `//` comments run to the end
//! of the line.

use grammar::lexer::LexRule;
use grammar::{Assoc, PrecedenceTable};

#[derive(Debug, Default)]
pub struct SpecFile {
  pub lex_rules: Vec<LexRule>,
  pub precedence: PrecedenceTable,
  pub start: Option<String>,
  pub expected_conflicts: usize,
  pub grammar: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecError {
  pub line: usize,
  pub message: String,
}

impl std::fmt::Display for SpecError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "line {}: {}", self.line, self.message)
  }
}

impl std::error::Error for SpecError {}

impl SpecFile {
  pub fn parse(text: &str) -> Result<SpecFile, SpecError> {
    let mut spec = SpecFile::default();

    for (ix, raw_line) in text.lines().enumerate() {
      let line_no = ix + 1;
      let line = strip_comment(raw_line);
      let trimmed = line.trim();

      if !trimmed.starts_with('%') {
        spec.grammar.push_str(line);
        spec.grammar.push('\n');
        continue;
      }

      let mut words = trimmed.split_whitespace();
      let directive = words.next().unwrap_or("");
      match directive {
        "%token" => {
          let rest = trimmed["%token".len()..].trim_start();
          let (name, rest) = rest.split_once(char::is_whitespace)
            .ok_or_else(|| SpecError {
              line: line_no,
              message: "expected token name and pattern".into(),
            })?;
          let pattern = parse_pattern(rest.trim(), line_no)?;
          spec.lex_rules.push(LexRule::new(pattern, name));
        }
        "%skip" => {
          let rest = trimmed["%skip".len()..].trim();
          let pattern = parse_pattern(rest, line_no)?;
          spec.lex_rules.push(LexRule::new(pattern, ""));
        }
        "%left" | "%right" | "%nonassoc" => {
          let assoc = match directive {
            "%left" => Assoc::LeftAssoc,
            "%right" => Assoc::RightAssoc,
            _ => Assoc::NonAssoc,
          };
          let level = expect_word(&mut words, line_no, "precedence level")?;
          let level = level.parse::<u32>().map_err(|_| SpecError {
            line: line_no,
            message: format!("precedence level must be an integer, got `{}`", level),
          })?;

          let mut any = false;
          for name in words.by_ref() {
            spec.precedence.declare(name, level, assoc);
            any = true;
          }
          if !any {
            return Err(SpecError {
              line: line_no,
              message: format!("`{}` needs at least one name", directive),
            });
          }
        }
        "%start" => {
          let name = expect_word(&mut words, line_no, "start symbol")?;
          spec.start = Some(name.to_owned());
        }
        "%expect" => {
          let count = expect_word(&mut words, line_no, "conflict count")?;
          spec.expected_conflicts = count.parse().map_err(|_| SpecError {
            line: line_no,
            message: format!("conflict count must be an integer, got `{}`", count),
          })?;
        }
        other => {
          return Err(SpecError {
            line: line_no,
            message: format!("unknown directive `{}`", other),
          });
        }
      }
    }

    if spec.lex_rules.iter().all(|rule| rule.kind.is_empty()) {
      return Err(SpecError {
        line: 0,
        message: "no %token declarations".into(),
      });
    }

    Ok(spec)
  }
}

fn strip_comment(line: &str) -> &str {
  match line.find("//") {
    Some(ix) => &line[..ix],
    None => line,
  }
}

fn expect_word<'a>(
  words: &mut impl Iterator<Item = &'a str>,
  line: usize,
  what: &str,
) -> Result<&'a str, SpecError> {
  words.next().ok_or_else(|| SpecError {
    line,
    message: format!("expected {}", what),
  })
}

/// `"literal"` (escaped) or `/regex/` (verbatim).
fn parse_pattern(text: &str, line: usize) -> Result<String, SpecError> {
  if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
    Ok(regex::escape(&text[1..text.len() - 1]))
  } else if text.len() >= 2 && text.starts_with('/') && text.ends_with('/') {
    Ok(text[1..text.len() - 1].to_owned())
  } else {
    Err(SpecError {
      line,
      message: format!("expected \"literal\" or /regex/, got `{}`", text),
    })
  }
}
