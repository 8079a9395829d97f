//! Diagnostic rendering for the CLI.

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use grammar::{GrammarError, GrammarErrorKind};

/// Emit a grammar error against its source text on stderr.
pub fn report_grammar_error(name: &str, input: &str, error: &GrammarError) {
  let writer = StandardStream::stderr(ColorChoice::Auto);
  let config = term::Config::default();
  let files = SimpleFile::new(name, input);

  let message = match error.kind {
    GrammarErrorKind::ParseError => "syntax error",
    GrammarErrorKind::NameConflict => "name conflict",
    GrammarErrorKind::NameNotFound => "name not found",
    GrammarErrorKind::Unreachable => "unreachable nonterminal",
  };

  let span = error.span.0..error.span.1.max(error.span.0);
  let diagnostic = Diagnostic::error()
    .with_message(message)
    .with_labels(vec![
      Label::primary((), span).with_message(&error.message)
    ]);

  let _ = term::emit(&mut writer.lock(), &config, &files, &diagnostic);
}
