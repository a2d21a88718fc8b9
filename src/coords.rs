//! Strand-aware mapping from declared gene-relative positions to HGVS numbering.
//!
//! Catalogue indels are declared on the forward reference strand. On a
//! forward-strand gene the HGVS position grows with the alignment offset and is
//! added to the declared position. On a reverse-strand gene it shrinks, so the
//! offset terms are subtracted, and inserted bases must additionally be
//! reverse-complemented into the gene's sense. Both corrections are required
//! independently; applying only one of them yields a wrong but plausible
//! descriptor.
use bio::alphabets::dna;

use crate::gene::Strand;

/// Inclusive HGVS span.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Span {
    pub start: i64,
    pub end: i64,
}

/// Span deleted when `length` bases are removed at alignment offset `offset`
/// of an indel declared at `position`.
///
/// `None` when the span does not fit in `i64`.
pub fn deletion_span(strand: Strand, position: i64, offset: usize, length: usize) -> Option<Span> {
    let (k, l) = (i64::try_from(offset).ok()?, i64::try_from(length).ok()?);
    match strand {
        Strand::Forward => {
            let start = position.checked_add(k)?;
            Some(Span { start, end: start.checked_add(l)?.checked_sub(1)? })
        }
        Strand::Reverse => {
            let end = position.checked_sub(k)?;
            Some(Span { start: end.checked_sub(l)?.checked_add(1)?, end })
        }
    }
}

/// Flanking positions between which bases are inserted at alignment offset `offset`.
///
/// `None` when either flank does not fit in `i64`.
pub fn insertion_flanks(strand: Strand, position: i64, offset: usize) -> Option<Span> {
    let k = i64::try_from(offset).ok()?;
    match strand {
        Strand::Forward => {
            let end = position.checked_add(k)?;
            Some(Span { start: end.checked_sub(1)?, end })
        }
        Strand::Reverse => {
            let start = position.checked_sub(k)?;
            Some(Span { start, end: start.checked_add(1)? })
        }
    }
}

/// Inserted bases in the gene's sense, upper-cased.
///
/// `forward` is the slice of the alternate allele as written on the forward
/// reference strand.
pub fn inserted_bases(strand: Strand, forward: &str) -> String {
    let upper = forward.to_ascii_uppercase();
    match strand {
        Strand::Forward => upper,
        Strand::Reverse => String::from_utf8_lossy(&dna::revcomp(upper.as_bytes())).into_owned(),
    }
}

#[cfg(test)]
mod strand_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn forward_deletion_adds_offset() {
        assert_eq!(deletion_span(Strand::Forward, -15, 1, 1), Some(Span { start: -14, end: -14 }));
        assert_eq!(deletion_span(Strand::Forward, 100, 2, 3), Some(Span { start: 102, end: 104 }));
    }

    #[test]
    fn reverse_deletion_subtracts_from_position() {
        assert_eq!(deletion_span(Strand::Reverse, 100, 1, 1), Some(Span { start: 99, end: 99 }));
        assert_eq!(deletion_span(Strand::Reverse, 100, 2, 3), Some(Span { start: 96, end: 98 }));
    }

    #[test]
    fn insertion_flanks_by_strand() {
        assert_eq!(insertion_flanks(Strand::Forward, 315, 1), Some(Span { start: 315, end: 316 }));
        assert_eq!(insertion_flanks(Strand::Reverse, 315, 1), Some(Span { start: 314, end: 315 }));
    }

    #[test]
    fn positions_at_the_i64_limits_do_not_wrap() {
        assert_eq!(deletion_span(Strand::Forward, i64::MAX, 1, 1), None);
        assert_eq!(deletion_span(Strand::Reverse, i64::MIN, 1, 1), None);
        assert_eq!(insertion_flanks(Strand::Forward, i64::MAX, 1), None);
        assert_eq!(insertion_flanks(Strand::Reverse, i64::MIN + 1, 1), None);
        assert_eq!(deletion_span(Strand::Forward, i64::MAX - 1, 1, 1), Some(Span { start: i64::MAX, end: i64::MAX }));
    }

    #[test]
    fn reverse_strand_bases_are_reverse_complemented() {
        assert_eq!(inserted_bases(Strand::Forward, "acg"), "ACG");
        // complement of ACG is TGC, reversed: CGT
        assert_eq!(inserted_bases(Strand::Reverse, "acg"), "CGT");
        assert_eq!(inserted_bases(Strand::Reverse, "aatt"), "AATT");
        assert_eq!(inserted_bases(Strand::Reverse, "gg"), "CC");
    }
}
