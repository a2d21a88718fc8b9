//! Deletion context imputation.
//!
//! Some catalogue deletions declare an edit longer than their explicit alleles
//! can hold, because flanking bases were left out. The full reference allele
//! is read back from the genome: the window starts at the gene boundary on the
//! gene's strand, offset by the declared position, and spans the declared
//! length plus the alternate allele.
//!
//! Insertions cannot be reconstructed from the reference alone and are
//! reported as unsupported.
use tracing::debug;

use crate::gene::{GeneIndex, Strand};
use crate::reference::Reference;
use crate::variant::{self, Indel, VariantShape};

/// Why a complete variant could not be built.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImputeError {
    #[error("Not assuming for insertions")]
    InsertionNotSupported,
    #[error("unknown gene: {0}")]
    UnknownGene(String),
    #[error("reference window {start}..{end} outside sequence")]
    WindowOutOfBounds { start: i64, end: i64 },
    #[error("not an indel")]
    NotAnIndel,
}

/// Half-open reference window `[start, end)` holding the full deletion context.
///
/// The correction term compensates for 0-based slicing of 1-based gene
/// coordinates; it differs between promoter (negative) and in-gene positions.
/// Arithmetic saturates at the `i64` limits; such a window never fits a reference.
pub fn deletion_window(strand: Strand, gene_start: i64, gene_end: i64, d: &Indel) -> (i64, i64) {
    let start = match strand {
        Strand::Forward => gene_start.saturating_add(d.position).saturating_add(if d.position < 0 { -1 } else { -2 }),
        Strand::Reverse => gene_end.saturating_sub(d.position).saturating_add(if d.position < 0 { -1 } else { 0 }),
    };
    let span = d.length.saturating_add(d.alternate.len());
    (start, start.saturating_add(i64::try_from(span).unwrap_or(i64::MAX)))
}

/// Rebuild the full-length deletion shorthand for `raw`.
pub fn complete_variant(raw: &str, genes: &GeneIndex, reference: &Reference) -> Result<String, ImputeError> {
    let d = match variant::parse(raw) {
        Some(VariantShape::Deletion(d)) => d,
        Some(VariantShape::Insertion(_)) => return Err(ImputeError::InsertionNotSupported),
        _ => return Err(ImputeError::NotAnIndel),
    };
    let gene = genes.lookup(&d.gene).map_err(|_| ImputeError::UnknownGene(d.gene.clone()))?;
    let (start, end) = deletion_window(gene.strand, gene.start, gene.end, &d);
    let bases = reference.window(start, end).ok_or(ImputeError::WindowOutOfBounds { start, end })?;
    let full = Indel { reference: bases, ..d };
    debug!(raw, strand = %gene.strand, complete = %full.to_deletion_shorthand(), start, end, "imputed deletion context");
    Ok(full.to_deletion_shorthand())
}
