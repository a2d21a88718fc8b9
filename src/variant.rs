//! Shorthand grammars of the mutation catalogue.
//!
//! Every shorthand starts with a gene identifier followed by `_` and one of four
//! type-specific encodings:
//!
//! | shape                  | example                     |
//! |------------------------|-----------------------------|
//! | nucleotide substitution| `rpoB_c-61t`                |
//! | protein substitution   | `rpoB_S450L`, `katG_W91!`   |
//! | deletion               | `fabG1_-15_del_1_cg_c`      |
//! | insertion              | `katG_315_ins_3_a_aacg`     |
//!
//! Shape is decided by the string alone; at most one grammar accepts a given
//! string. Nucleotide bases are lower-case (`acgt`), amino acids upper-case, so
//! `rpoB_C61T` is a protein change and never a nucleotide one.
use std::sync::LazyLock;

use regex::{Captures, Regex};

static NUCLEOTIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)_([acgt])(-?\d+)([acgt])$").expect("valid nucleotide grammar"));
static PROTEIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)_([A-Z])(\d+)([A-Z!*])$").expect("valid protein grammar"));
static DELETION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)_(-?\d+)_del_(\d+)_([acgt]+)_([acgt]+)$").expect("valid deletion grammar"));
static INSERTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)_(-?\d+)_ins_(\d+)_([acgt]+)_([acgt]+)$").expect("valid insertion grammar"));

/// `<gene>_<ref><pos><alt>` on the nucleotide level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NucleotideChange {
    pub gene: String,
    pub reference: char,
    pub position: i64,
    pub alternate: char,
}

/// `<gene>_<refAA><pos><altAA>` with one-letter amino acid codes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProteinChange {
    pub gene: String,
    pub reference: char,
    pub position: i64,
    pub alternate: char,
}

/// Declared indel: `<gene>_<pos>_{del|ins}_<len>_<ref>_<alt>`.
///
/// Alleles are kept as written (forward reference strand, lower-case).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Indel {
    pub gene: String,
    pub position: i64,
    pub length: usize,
    pub reference: String,
    pub alternate: String,
}

impl Indel {
    /// Render back to deletion shorthand.
    pub fn to_deletion_shorthand(&self) -> String {
        format!("{}_{}_del_{}_{}_{}", self.gene, self.position, self.length, self.reference, self.alternate)
    }
}

/// The four shorthand shapes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VariantShape {
    Nucleotide(NucleotideChange),
    Protein(ProteinChange),
    Deletion(Indel),
    Insertion(Indel),
}

impl VariantShape {
    /// Gene identifier the shorthand is prefixed with.
    pub fn gene(&self) -> &str {
        match self {
            VariantShape::Nucleotide(v) => &v.gene,
            VariantShape::Protein(v) => &v.gene,
            VariantShape::Deletion(v) | VariantShape::Insertion(v) => &v.gene,
        }
    }
}

fn first_char(caps: &Captures<'_>, i: usize) -> Option<char> { caps[i].chars().next() }

fn indel(caps: &Captures<'_>) -> Option<Indel> {
    Some(Indel {
        gene: caps[1].to_string(),
        position: caps[2].parse().ok()?,
        length: caps[3].parse().ok()?,
        reference: caps[4].to_string(),
        alternate: caps[5].to_string(),
    })
}

/// Match `raw` against the grammars in fixed order; the first structural match wins.
///
/// Returns `None` when no grammar accepts the string, or when a numeric field
/// overflows.
pub fn parse(raw: &str) -> Option<VariantShape> {
    if let Some(c) = NUCLEOTIDE.captures(raw) {
        return Some(VariantShape::Nucleotide(NucleotideChange {
            gene: c[1].to_string(),
            reference: first_char(&c, 2)?,
            position: c[3].parse().ok()?,
            alternate: first_char(&c, 4)?,
        }));
    }
    if let Some(c) = PROTEIN.captures(raw) {
        return Some(VariantShape::Protein(ProteinChange {
            gene: c[1].to_string(),
            reference: first_char(&c, 2)?,
            position: c[3].parse().ok()?,
            alternate: first_char(&c, 4)?,
        }));
    }
    if let Some(c) = DELETION.captures(raw) {
        return indel(&c).map(VariantShape::Deletion);
    }
    if let Some(c) = INSERTION.captures(raw) {
        return indel(&c).map(VariantShape::Insertion);
    }
    None
}
