//! Alignment offsets for declared indels.
//!
//! A catalogue indel declares an anchor-prefixed reference allele, an alternate
//! allele and an edit length. The edit can usually be placed at more than one
//! offset inside a repeated motif; both searches here return **every** offset
//! that explains the allele pair, in increasing order, and never pick one.
//!
//! Offset `0` is the anchor base and is never part of the edit.
//!
//! # Examples
//! ```
//! use cathgvs::search::{deletion_offsets, insertion_offsets};
//! // deleting one `a` from a run of three `a`s: three placements
//! assert_eq!(deletion_offsets("caaa", "caa", 1), vec![1, 2, 3]);
//! assert_eq!(insertion_offsets("ct", "cagt", 2), vec![1]);
//! ```

/// Offsets `k` in `1..=len(reference) - length` where removing `length` bases
/// from `reference` at `k` leaves exactly `alternate`.
pub fn deletion_offsets(reference: &str, alternate: &str, length: usize) -> Vec<usize> {
    let (r, a) = (reference.as_bytes(), alternate.as_bytes());
    if length == 0 || r.len() < length || r.len() - length != a.len() { return Vec::new(); }
    (1..=r.len() - length)
        .filter(|&k| r[..k] == a[..k] && r[k + length..] == a[k..])
        .collect()
}

/// Offsets `k` in `1..=len(reference)` where inserting `alternate[k..k + length]`
/// into `reference` at `k` reproduces `alternate`.
pub fn insertion_offsets(reference: &str, alternate: &str, length: usize) -> Vec<usize> {
    let (r, a) = (reference.as_bytes(), alternate.as_bytes());
    if length == 0 || r.len() + length != a.len() { return Vec::new(); }
    (1..=r.len())
        .filter(|&k| r[..k] == a[..k] && r[k..] == a[k + length..])
        .collect()
}
