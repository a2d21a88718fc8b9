//! Variant classification: one shorthand string in, one typed outcome out.
//!
//! [`classify`] parses the shorthand with [`crate::variant::parse`], resolves the
//! gene where the grammar needs it (biotype for nucleotide changes, strand for
//! indels), runs the alignment search for indels and renders the descriptor.
//!
//! Failures are values, not panics: every row of a catalogue gets either a
//! [`Classified`] or a [`FailReason`].
//!
//! # Examples
//! ```
//! use cathgvs::classify::classify;
//! use cathgvs::gene::{GeneIndex, GffRow};
//! let rows = vec![GffRow::from_fields(&[
//!     "NC_000962.3", ".", "gene", "759807", "763325", ".", "+", ".", "Name=rpoB;locus_tag=Rv0667",
//! ]).unwrap()];
//! let index = GeneIndex::from_rows(rows);
//! let c = classify("rpoB_S450L", &index).unwrap();
//! assert_eq!(c.hgvs, "p.Ser450Leu");
//! ```
use tracing::trace;

use crate::coords;
use crate::gene::GeneIndex;
use crate::hgvs::{three_letter, Descriptor, VariantType};
use crate::search;
use crate::variant::{self, Indel, VariantShape};

/// Why a shorthand could not be translated.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// Declared indel length disagrees with the allele strings; flanking context
    /// was omitted and may be recovered from the reference.
    #[error("length mismatch")]
    LengthMismatch,
    /// No alignment offset explains the allele pair.
    #[error("invalid indel")]
    InvalidIndel,
    /// The shorthand matches none of the grammars.
    #[error("does not match indel or variant")]
    NoGrammarMatch,
    /// The gene identifier is not in the annotation.
    #[error("unknown gene: {0}")]
    UnknownGene(String),
}

impl FailReason {
    /// Whether the deletion imputer can retry this failure.
    pub fn is_recoverable(&self) -> bool { matches!(self, FailReason::LengthMismatch) }
}

/// A successfully translated shorthand.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Classified {
    /// Gene identifier as written in the shorthand.
    pub gene: String,
    pub variant_type: VariantType,
    /// Descriptor text; `|`-separated when the indel is ambiguous. Never empty.
    pub hgvs: String,
}

pub type Classification = Result<Classified, FailReason>;

/// Classify a single shorthand string.
pub fn classify(raw: &str, genes: &GeneIndex) -> Classification {
    let shape = variant::parse(raw).ok_or(FailReason::NoGrammarMatch)?;
    let gene = shape.gene().to_string();
    let descriptor = match shape {
        VariantShape::Nucleotide(v) => {
            let kind = if genes.lookup(&v.gene)?.is_rrna() { VariantType::NonCoding } else { VariantType::Coding };
            Descriptor::Substitution { kind, position: v.position, reference: v.reference, alternate: v.alternate }
        }
        VariantShape::Protein(v) => Descriptor::Protein {
            position: v.position,
            reference: three_letter(v.reference).ok_or(FailReason::NoGrammarMatch)?,
            alternate: three_letter(v.alternate).ok_or(FailReason::NoGrammarMatch)?,
        },
        VariantShape::Deletion(d) => deletion(&d, genes)?,
        VariantShape::Insertion(d) => insertion(&d, genes)?,
    };
    let out = Classified { gene, variant_type: descriptor.variant_type(), hgvs: descriptor.to_string() };
    trace!(raw, hgvs = %out.hgvs, "classified");
    Ok(out)
}

fn deletion(d: &Indel, genes: &GeneIndex) -> Result<Descriptor, FailReason> {
    if d.reference.len().checked_sub(d.alternate.len()) != Some(d.length) {
        return Err(FailReason::LengthMismatch);
    }
    let offsets = search::deletion_offsets(&d.reference, &d.alternate, d.length);
    if offsets.is_empty() { return Err(FailReason::InvalidIndel); }
    let strand = genes.lookup(&d.gene)?.strand;
    let spans = offsets
        .into_iter()
        .map(|k| coords::deletion_span(strand, d.position, k, d.length))
        .collect::<Option<Vec<_>>>()
        .ok_or(FailReason::NoGrammarMatch)?;
    Ok(Descriptor::Deletion(spans))
}

fn insertion(d: &Indel, genes: &GeneIndex) -> Result<Descriptor, FailReason> {
    if d.alternate.len().checked_sub(d.reference.len()) != Some(d.length) {
        return Err(FailReason::LengthMismatch);
    }
    let offsets = search::insertion_offsets(&d.reference, &d.alternate, d.length);
    if offsets.is_empty() { return Err(FailReason::InvalidIndel); }
    let strand = genes.lookup(&d.gene)?.strand;
    let sites = offsets
        .into_iter()
        .map(|k| {
            let bases = coords::inserted_bases(strand, &d.alternate[k..k + d.length]);
            coords::insertion_flanks(strand, d.position, k).map(|flanks| (flanks, bases))
        })
        .collect::<Option<Vec<_>>>()
        .ok_or(FailReason::NoGrammarMatch)?;
    Ok(Descriptor::Insertion(sites))
}
