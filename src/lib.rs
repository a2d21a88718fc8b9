#![forbid(unsafe_code)]
//! # cathgvs
//!
//! Translate the shorthand variant notation of a drug-resistance mutation
//! catalogue (e.g. the WHO *M. tuberculosis* catalogue) into HGVS descriptors,
//! using a GFF3 gene annotation and the reference genome sequence.
//!
//! ## Shorthand dialects
//! - nucleotide substitution: `rpoB_c-61t` → `c.-61C>T` (`n.` for rRNA genes)
//! - protein substitution: `rpoB_S450L` → `p.Ser450Leu`
//! - deletion: `fabG1_-15_del_1_cg_c` → `c.-14del`
//! - insertion: `katG_315_ins_3_a_aacg` → `c.314_315insCGT` on a reverse-strand gene
//!
//! Indels that can be placed at several offsets inside a repeat keep **all**
//! placements, joined with `|`. Deletions whose declared length exceeds their
//! explicit alleles get their flanking context read back from the reference and
//! are classified a second time.
//!
//! ## Examples
//! ```rust
//! use cathgvs::gene::{GeneIndex, GffRow};
//! let genes = GeneIndex::from_rows(vec![GffRow::from_fields(&[
//!     "NC_000962.3", ".", "gene", "100", "500", ".", "+", ".", "Name=rpoB;locus_tag=Rv0667",
//! ]).unwrap()]);
//! let c = cathgvs::classify("rpoB_c-61t", &genes).unwrap();
//! assert_eq!((c.gene.as_str(), c.variant_type.as_str(), c.hgvs.as_str()), ("rpoB", "c", "c.-61C>T"));
//! assert_eq!(cathgvs::classify("rpoB_LoF", &genes), Err(cathgvs::FailReason::NoGrammarMatch));
//! ```

pub mod catalogue;
pub mod classify;
pub mod coords;
pub mod gene;
pub mod hgvs;
pub mod impute;
pub mod pipeline;
pub mod reference;
pub mod search;
pub mod variant;

pub use classify::{classify, Classification, Classified, FailReason};
pub use pipeline::{run, PipelineOpts, Summary};

/// Crate version string (from `CARGO_PKG_VERSION`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
