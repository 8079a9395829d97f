//! The companion lexer: an ordered list of regex rules.
//!
//! Rules are tried in declaration order at each input position and the
//! first match wins, so a keyword that is a prefix of another must be
//! declared after the longer one. A rule whose kind is the empty string
//! skips its match (whitespace, comments). Input that no rule matches is
//! folded into a token of kind [`UNKNOWN`]; the parser driver rejects it
//! with the expected-terminal set of the state it died in.

use regex::Regex;
use crate::grammar::Assoc;

/// Kind of tokens produced for unmatched input.
pub const UNKNOWN: &str = "@UNK";

/// Kind of the synthetic end-of-input token.
pub const EOF: &str = "$";

#[derive(Debug, Clone)]
pub struct LexRule {
  pub pattern: String,
  pub kind: String,
  /// Operator information for the precedence table, as in
  /// `("\\*", "*", Some((2, LeftAssoc)))`.
  pub prec: Option<(u32, Assoc)>,
}

impl LexRule {
  pub fn new(pattern: impl Into<String>, kind: impl Into<String>) -> Self {
    Self {
      pattern: pattern.into(),
      kind: kind.into(),
      prec: None,
    }
  }

  pub fn with_prec(pattern: impl Into<String>, kind: impl Into<String>, level: u32, assoc: Assoc) -> Self {
    Self {
      pattern: pattern.into(),
      kind: kind.into(),
      prec: Some((level, assoc)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
  pub rule: usize,
  pub pattern: String,
  pub message: String,
}

#[derive(Debug)]
struct CompiledRule {
  re: Regex,
  kind: String,
}

/// A compiled lexer. `scan` yields `(kind, lexeme, position)` records and
/// terminates with the synthetic `("$", "", eof_position)` token.
#[derive(Debug)]
pub struct Lexer {
  rules: Vec<CompiledRule>,
  kinds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: String,
  pub text: String,
  pub pos: usize,
}

impl Lexer {
  pub fn new(rules: &[LexRule]) -> Result<Self, LexerError> {
    let mut compiled = vec![];
    let mut kinds = vec![];

    for (i, rule) in rules.iter().enumerate() {
      let re = Regex::new(&format!("^(?:{})", rule.pattern))
        .map_err(|err| LexerError {
          rule: i,
          pattern: rule.pattern.clone(),
          message: err.to_string(),
        })?;

      if !rule.kind.is_empty() && !kinds.contains(&rule.kind) {
        kinds.push(rule.kind.clone());
      }

      compiled.push(CompiledRule {
        re,
        kind: rule.kind.clone(),
      });
    }

    Ok(Lexer {
      rules: compiled,
      kinds,
    })
  }

  /// Token kinds this lexer can produce, in rule order. This is the
  /// terminal name set the grammar classifies symbols against.
  pub fn kinds(&self) -> &[String] {
    &self.kinds
  }

  pub fn scan<'a>(&'a self, input: &'a str) -> Tokens<'a> {
    Tokens {
      lexer: self,
      input,
      pos: 0,
      eof_sent: false,
    }
  }

  /// First rule matching a non-empty prefix of `rest`, if any.
  fn match_at<'a>(&self, rest: &'a str) -> Option<(&str, &'a str)> {
    for rule in &self.rules {
      if let Some(m) = rule.re.find(rest) {
        if m.end() > 0 {
          return Some((&rule.kind, &rest[..m.end()]));
        }
      }
    }
    None
  }
}

pub struct Tokens<'a> {
  lexer: &'a Lexer,
  input: &'a str,
  pos: usize,
  eof_sent: bool,
}

impl<'a> Iterator for Tokens<'a> {
  type Item = Token;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if self.pos >= self.input.len() {
        if self.eof_sent {
          return None;
        }
        self.eof_sent = true;
        return Some(Token {
          kind: EOF.to_owned(),
          text: String::new(),
          pos: self.input.len(),
        });
      }

      match self.lexer.match_at(&self.input[self.pos..]) {
        Some((kind, text)) => {
          let pos = self.pos;
          self.pos += text.len();

          if kind.is_empty() {
            continue;
          }

          return Some(Token {
            kind: kind.to_owned(),
            text: text.to_owned(),
            pos,
          });
        }
        None => {
          // fold the unmatched run into one token; scanning resumes at the
          // next position some rule matches
          let start = self.pos;
          let mut end = self.pos;
          while end < self.input.len() {
            end += self.input[end..].chars().next().map(char::len_utf8).unwrap_or(1);
            if self.lexer.match_at(&self.input[end..]).is_some() {
              break;
            }
          }
          self.pos = end;

          return Some(Token {
            kind: UNKNOWN.to_owned(),
            text: self.input[start..end].to_owned(),
            pos: start,
          });
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn rules() -> Vec<LexRule> {
    vec![
      LexRule::new(r"\d+", "num"),
      LexRule::new(r"\+", "+"),
      LexRule::new(r"\*", "*"),
      LexRule::new(r"[ \t\n]+", ""),
    ]
  }

  fn kinds(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.kind.as_str()).collect()
  }

  #[test]
  fn scan_expression() {
    let lexer = Lexer::new(&rules()).unwrap();
    let tokens = lexer.scan("12 + 3*4").collect::<Vec<_>>();

    assert_eq!(kinds(&tokens), ["num", "+", "num", "*", "num", "$"]);
    assert_eq!(tokens[0], Token { kind: "num".into(), text: "12".into(), pos: 0 });
    assert_eq!(tokens[3], Token { kind: "*".into(), text: "*".into(), pos: 6 });
    assert_eq!(tokens[5], Token { kind: "$".into(), text: "".into(), pos: 8 });
  }

  #[test]
  fn first_match_wins() {
    // rule order decides: "==" must be declared before "="
    let lexer = Lexer::new(&[
      LexRule::new("==", "=="),
      LexRule::new("=", "="),
    ]).unwrap();

    let tokens = lexer.scan("===").collect::<Vec<_>>();
    assert_eq!(kinds(&tokens), ["==", "=", "$"]);
  }

  #[test]
  fn unmatched_input_becomes_unknown() {
    let lexer = Lexer::new(&rules()).unwrap();
    let tokens = lexer.scan("1 ?! 2").collect::<Vec<_>>();

    assert_eq!(kinds(&tokens), ["num", UNKNOWN, "num", "$"]);
    assert_eq!(tokens[1].text, "?!");
    assert_eq!(tokens[1].pos, 2);
  }

  #[test]
  fn empty_input_scans_to_eof_only() {
    let lexer = Lexer::new(&rules()).unwrap();
    let tokens = lexer.scan("").collect::<Vec<_>>();
    assert_eq!(kinds(&tokens), ["$"]);
  }

  #[test]
  fn bad_pattern_is_rejected() {
    let err = Lexer::new(&[LexRule::new("(", "lparen")]).unwrap_err();
    assert_eq!(err.rule, 0);
    assert_eq!(err.pattern, "(");
  }

  #[test]
  fn skip_rules_produce_no_tokens() {
    let lexer = Lexer::new(&rules()).unwrap();
    let tokens = lexer.scan("   ").collect::<Vec<_>>();
    assert_eq!(kinds(&tokens), ["$"]);
  }
}
