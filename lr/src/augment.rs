use grammar::{Grammar, NonterminalId, NonterminalIdGen, Production, Symbol};

/// Grammar with the augmented start rule `S' -> S` appended.
///
/// EOF is the virtual terminal one past the real ones, so ACCEPT becomes an
/// ordinary ACTION entry in the EOF column and the driver needs no
/// out-of-band accept flag.
#[derive(Debug)]
pub struct Augmented {
  pub grammar: Grammar,
  /// The real start symbol, before augmentation.
  pub real_start: NonterminalId,
  pub accept_prod: usize,
  /// EOF terminal index.
  pub eof: usize,
}

pub fn augment(mut grammar: Grammar) -> Augmented {
  let max_nt_id = grammar.nts
    .left_values()
    .map(|nt| nt.id())
    .max()
    .unwrap();
  let mut nt_id_gen = NonterminalIdGen::after(max_nt_id);

  let real_start = grammar.start_nt;
  let aug_start = nt_id_gen.gen();
  let accept_prod = grammar.prods.len();

  grammar.prods.push(Production {
    nt: aug_start,
    symbols: vec![Symbol::Nonterminal(real_start)],
    action: None,
    prec: None,
  });

  let aug_name = format!("_{}", grammar.nt_name(real_start));
  grammar.nts.insert(aug_start, aug_name);
  grammar.nt_prods.insert(aug_start, vec![accept_prod]);

  let eof = grammar.eof_index();
  grammar.start_nt = aug_start;

  Augmented {
    grammar,
    real_start,
    accept_prod,
    eof,
  }
}
