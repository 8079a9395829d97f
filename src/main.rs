use std::env;
use std::fs;
use std::process;
use getopts::Options;
use lrgen::spec::SpecFile;
use lrgen::{report, BuildOptions, Error, Generator, TableCache, TableKind};

fn main() {
  let args = env::args().collect::<Vec<_>>();
  let prog = args[0].clone();
  let mut opts = Options::new();
  opts.optopt("t", "type",
    "Type of parse table. Defaults to LALR1.\n\
      Supported types: SLR, LR1, LALR1 (case insensitive)",
    "TYPE");
  opts.optopt("c", "cache", "Directory for cached tables", "DIR");
  opts.optflag("h", "help", "Print this message");

  let matches = match opts.parse(&args[1..]) {
    Ok(m) => m,
    Err(err) => {
      eprintln!("{}", err);
      process::exit(2);
    }
  };

  if matches.opt_present("h") {
    print_usage(prog, opts);
    return;
  }

  let kind = match matches.opt_str("t").as_deref().map(str::to_lowercase).as_deref() {
    None | Some("lalr1") => TableKind::Lalr1,
    Some("slr") => TableKind::Slr,
    Some("lr1") => TableKind::Lr1,
    Some(other) => {
      eprintln!("unknown table type `{}`", other);
      process::exit(2);
    }
  };

  let path = if matches.free.len() == 1 {
    matches.free[0].clone()
  } else {
    print_usage(prog, opts);
    process::exit(2);
  };

  let input = match fs::read_to_string(&path) {
    Ok(input) => input,
    Err(err) => {
      eprintln!("{}: {}", path, err);
      process::exit(2);
    }
  };

  process::exit(run(&path, &input, kind, matches.opt_str("c")));
}

fn run(path: &str, input: &str, kind: TableKind, cache_dir: Option<String>) -> i32 {
  let spec = match SpecFile::parse(input) {
    Ok(spec) => spec,
    Err(err) => {
      eprintln!("{}: {}", path, err);
      return 1;
    }
  };

  let mut generator = match Generator::new(&spec.lex_rules) {
    Ok(generator) => generator,
    Err(err) => {
      eprintln!(
        "{}: bad pattern `{}` for token `{}`: {}",
        path, err.pattern, spec.lex_rules[err.rule].kind, err.message,
      );
      return 1;
    }
  };

  for (name, level, assoc) in spec.precedence.sorted() {
    generator.declare_prec(name, level, assoc);
  }

  let options = BuildOptions {
    expected_conflicts: spec.expected_conflicts,
    start: spec.start.clone(),
    ..BuildOptions::default()
  };

  let result = match &cache_dir {
    Some(dir) => {
      let cache = TableCache::new(dir);
      generator.build_cached(&spec.grammar, kind, &options, &cache)
    }
    None => generator.build(&spec.grammar, kind, &options)
      .map(|(tables, log)| (tables, log, false)),
  };

  match result {
    Ok((tables, log, cached)) => {
      if !log.is_empty() {
        eprint!("{}", lr::report::render(&log));
        eprintln!(
          "warning: {} conflicts within the expected budget of {}",
          log.total(),
          spec.expected_conflicts,
        );
      }

      println!(
        "{}: {} tables{}: {} states, {} terminals, {} nonterminals, {} productions",
        path,
        tables.kind.name(),
        if cached { " (cached)" } else { "" },
        tables.state_count(),
        tables.terms.len(),
        tables.nts.len(),
        tables.prods.len(),
      );
      0
    }
    Err(Error::Grammar(err)) => {
      report::report_grammar_error(path, &spec.grammar, &err);
      1
    }
    Err(err @ Error::TooManyConflicts { .. }) => {
      if let Error::TooManyConflicts { log, .. } = &err {
        eprint!("{}", lr::report::render(log));
      }
      eprintln!("{}: {}", path, err);
      1
    }
  }
}

fn print_usage(prog: String, opts: Options) {
  let brief = format!("Usage: {} [options] FILE", prog);
  print!("{}", opts.usage(&brief));
}
