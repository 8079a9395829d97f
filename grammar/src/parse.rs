//! Scanner and parser for grammar text.
//!
//! The surface syntax is a sequence of rules separated by `;`:
//!
//! ```text
//! E -> E plus E %prec ADD { add }
//!    | E mult E
//!    |
//!    ;
//! ```
//!
//! Symbol names are whitespace-separated and may be arbitrary punctuation
//! (`+`, `==`, ...) as long as they avoid the delimiters `;`, `|`, `{` and
//! `}`. An empty alternative is an epsilon production. `%prec NAME` attaches
//! an explicit precedence tag, `{ ... }` an opaque semantic-action
//! reference.

use std::iter::Peekable;
use std::str::CharIndices;

pub type Span = (usize, usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
  Name,
  Arrow,
  Or,
  Semi,
  Prec,
  Action,
}

#[derive(Debug, Clone)]
pub struct Token<'a> {
  pub kind: TokenKind,
  pub text: &'a str,
  pub span: Span,
}

#[derive(Debug)]
pub struct RuleDecl {
  pub lhs: (Span, String),
  pub alts: Vec<AltDecl>,
}

#[derive(Debug)]
pub struct AltDecl {
  pub symbols: Vec<(Span, String)>,
  pub prec: Option<(Span, String)>,
  pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTextError {
  pub message: String,
  pub span: Span,
}

struct Scanner<'a> {
  input: &'a str,
  chars: Peekable<CharIndices<'a>>,
}

fn is_name_char(c: char) -> bool {
  !c.is_whitespace() && !matches!(c, ';' | '|' | '{' | '}')
}

impl<'a> Scanner<'a> {
  fn new(input: &'a str) -> Self {
    Self {
      input,
      chars: input.char_indices().peekable(),
    }
  }
}

impl<'a> Iterator for Scanner<'a> {
  type Item = Result<Token<'a>, ParseTextError>;

  fn next(&mut self) -> Option<Self::Item> {
    while let Some(&(_, c)) = self.chars.peek() {
      if !c.is_whitespace() {
        break;
      }
      self.chars.next();
    }

    let &(i, c) = self.chars.peek()?;
    self.chars.next();

    match c {
      ';' => Some(Ok(Token {
        kind: TokenKind::Semi,
        text: &self.input[i..i + 1],
        span: (i, i + 1),
      })),
      '|' => Some(Ok(Token {
        kind: TokenKind::Or,
        text: &self.input[i..i + 1],
        span: (i, i + 1),
      })),
      '}' => Some(Err(ParseTextError {
        message: "unmatched `}`".into(),
        span: (i, i + 1),
      })),
      '{' => {
        let mut depth = 1usize;
        loop {
          match self.chars.next() {
            Some((_, '{')) => {
              depth += 1;
            }
            Some((j, '}')) => {
              depth -= 1;
              if depth == 0 {
                let text = self.input[i + 1..j].trim();
                return Some(Ok(Token {
                  kind: TokenKind::Action,
                  text,
                  span: (i, j + 1),
                }));
              }
            }
            Some(_) => {}
            None => {
              return Some(Err(ParseTextError {
                message: "unclosed action block".into(),
                span: (i, self.input.len()),
              }));
            }
          }
        }
      }
      _ => {
        let mut end = i + c.len_utf8();
        while let Some(&(j, c)) = self.chars.peek() {
          if !is_name_char(c) {
            break;
          }
          end = j + c.len_utf8();
          self.chars.next();
        }

        let text = &self.input[i..end];
        let kind = match text {
          "->" => TokenKind::Arrow,
          "%prec" => TokenKind::Prec,
          _ => TokenKind::Name,
        };

        Some(Ok(Token { kind, text, span: (i, end) }))
      }
    }
  }
}

/// Parse grammar text into rule declarations. Symbol classification
/// (terminal vs nonterminal) happens later, against the lexer's token kinds.
pub fn parse(input: &str) -> Result<Vec<RuleDecl>, ParseTextError> {
  let mut tokens = Scanner::new(input).peekable();
  let mut rules = vec![];

  loop {
    let lhs = match tokens.next().transpose()? {
      None => break,
      Some(tok) if tok.kind == TokenKind::Name => (tok.span, tok.text.to_owned()),
      Some(tok) => {
        return Err(ParseTextError {
          message: format!("expected rule name, found `{}`", tok.text),
          span: tok.span,
        });
      }
    };

    match tokens.next().transpose()? {
      Some(tok) if tok.kind == TokenKind::Arrow => {}
      Some(tok) => {
        return Err(ParseTextError {
          message: format!("expected `->`, found `{}`", tok.text),
          span: tok.span,
        });
      }
      None => {
        return Err(ParseTextError {
          message: "expected `->`, found end of input".into(),
          span: (input.len(), input.len()),
        });
      }
    }

    let mut alts = vec![];
    let mut alt = AltDecl { symbols: vec![], prec: None, action: None };

    loop {
      let tok = match tokens.next().transpose()? {
        None => {
          alts.push(alt);
          rules.push(RuleDecl { lhs, alts });
          return Ok(rules);
        }
        Some(tok) => tok,
      };

      match tok.kind {
        TokenKind::Semi => {
          alts.push(alt);
          break;
        }
        TokenKind::Or => {
          alts.push(alt);
          alt = AltDecl { symbols: vec![], prec: None, action: None };
        }
        TokenKind::Name => {
          if alt.prec.is_some() || alt.action.is_some() {
            return Err(ParseTextError {
              message: format!("symbol `{}` after `%prec` or action", tok.text),
              span: tok.span,
            });
          }
          alt.symbols.push((tok.span, tok.text.to_owned()));
        }
        TokenKind::Prec => {
          match tokens.next().transpose()? {
            Some(name) if name.kind == TokenKind::Name => {
              if alt.prec.is_some() {
                return Err(ParseTextError {
                  message: "duplicate `%prec` tag".into(),
                  span: name.span,
                });
              }
              alt.prec = Some((name.span, name.text.to_owned()));
            }
            Some(other) => {
              return Err(ParseTextError {
                message: format!("expected tag name after `%prec`, found `{}`", other.text),
                span: other.span,
              });
            }
            None => {
              return Err(ParseTextError {
                message: "expected tag name after `%prec`".into(),
                span: tok.span,
              });
            }
          }
        }
        TokenKind::Action => {
          if alt.action.is_some() {
            return Err(ParseTextError {
              message: "duplicate semantic action".into(),
              span: tok.span,
            });
          }
          alt.action = Some(tok.text.to_owned());
        }
        TokenKind::Arrow => {
          return Err(ParseTextError {
            message: "unexpected `->`".into(),
            span: tok.span,
          });
        }
      }
    }

    rules.push(RuleDecl { lhs, alts });
  }

  Ok(rules)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn alt_names(alt: &AltDecl) -> Vec<&str> {
    alt.symbols.iter().map(|(_, name)| name.as_str()).collect()
  }

  #[test]
  fn rules() {
    let rules = parse("E -> E + E %prec ADD { add } | n ; F -> ;").unwrap();

    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].lhs.1, "E");
    assert_eq!(rules[0].alts.len(), 2);
    assert_eq!(alt_names(&rules[0].alts[0]), ["E", "+", "E"]);
    assert_eq!(rules[0].alts[0].prec.as_ref().unwrap().1, "ADD");
    assert_eq!(rules[0].alts[0].action.as_deref(), Some("add"));
    assert_eq!(alt_names(&rules[0].alts[1]), ["n"]);

    assert_eq!(rules[1].lhs.1, "F");
    assert_eq!(rules[1].alts.len(), 1);
    assert!(rules[1].alts[0].symbols.is_empty());
  }

  #[test]
  fn epsilon_alternative() {
    let rules = parse("A -> n A | ;").unwrap();
    assert_eq!(rules[0].alts.len(), 2);
    assert!(rules[0].alts[1].symbols.is_empty());
  }

  #[test]
  fn trailing_semi_optional() {
    let rules = parse("S -> a b").unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(alt_names(&rules[0].alts[0]), ["a", "b"]);
  }

  #[test]
  fn punctuation_names() {
    let rules = parse("E -> E == E ;").unwrap();
    assert_eq!(alt_names(&rules[0].alts[0]), ["E", "==", "E"]);
  }

  #[test]
  fn missing_arrow() {
    let err = parse("E E -> n ;").unwrap_err();
    assert!(err.message.contains("expected `->`"));
  }

  #[test]
  fn unclosed_action() {
    let err = parse("E -> n { oops ;").unwrap_err();
    assert!(err.message.contains("unclosed action block"));
  }
}
