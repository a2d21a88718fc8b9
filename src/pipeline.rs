//! Two-pass batch translation of a catalogue.
//!
//! ```text
//! rows ──► pass 1: classify ──► LengthMismatch rows ──► impute ──► pass 2: classify
//! ```
//!
//! Rows share only the read-only [`GeneIndex`] and [`Reference`]; each row is
//! mutated in place by the pass that owns it. Classification passes run on a
//! local Rayon pool, so output order is the catalogue order for any thread count.
//! Imputation is a single bounded retry.
use std::path::PathBuf;

use anyhow::Result;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

use crate::catalogue::{self, CatalogueColumns, CatalogueRow};
use crate::classify::{classify, FailReason};
use crate::gene::{self, GeneIndex};
use crate::impute;
use crate::reference::{self, Reference};

/// Inputs and settings for [`run`].
#[derive(Clone, Debug)]
pub struct PipelineOpts {
    pub gff: PathBuf,
    pub reference: PathBuf,
    pub catalogue: PathBuf,
    /// Output CSV path; `-` writes to stdout.
    pub output: PathBuf,
    /// Worker threads; `None` uses all logical cores.
    pub threads: Option<usize>,
    pub columns: CatalogueColumns,
}

/// Per-outcome row counts after both passes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    pub rows: usize,
    pub classified: usize,
    pub imputed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn of(rows: &[CatalogueRow]) -> Self {
        Summary {
            rows: rows.len(),
            classified: rows.iter().filter(|r| !r.fail).count(),
            imputed: rows.iter().filter(|r| r.complete_variant_fail == Some(false)).count(),
            failed: rows.iter().filter(|r| r.fail).count(),
        }
    }
}

/// Pass 1: classify every row by its variant name.
pub fn classify_rows(rows: &mut [CatalogueRow], genes: &GeneIndex) {
    rows.par_iter_mut().for_each(|row| {
        let outcome = classify(&row.variant, genes);
        debug!(variant = %row.variant, ok = outcome.is_ok(), "pass 1");
        row.apply(outcome);
    });
}

/// Build complete deletion shorthands for rows that failed with a length mismatch.
///
/// Returns the indices of the rows that received a complete variant.
pub fn impute_rows(rows: &mut [CatalogueRow], genes: &GeneIndex, reference: &Reference) -> Vec<usize> {
    let mut pending: Vec<usize> = (0..rows.len())
        .filter(|&i| rows[i].fail_reason.as_ref().is_some_and(FailReason::is_recoverable))
        .collect();
    pending.sort_by_cached_key(|&i| rows[i].variant.to_lowercase());

    let mut imputed = Vec::new();
    for i in pending {
        let outcome = impute::complete_variant(&rows[i].variant, genes, reference);
        if outcome.is_ok() { imputed.push(i); }
        rows[i].apply_imputation(outcome);
    }
    imputed.sort_unstable();
    info!(imputed = imputed.len(), "imputed deletion context");
    imputed
}

/// Pass 2: re-classify rows whose complete variant was built.
pub fn reclassify_rows(rows: &mut [CatalogueRow], genes: &GeneIndex) {
    rows.par_iter_mut()
        .filter(|r| r.complete_variant_fail == Some(false))
        .for_each(|row| {
            if let Some(v) = row.complete_variant.clone() {
                let outcome = classify(&v, genes);
                debug!(variant = %v, ok = outcome.is_ok(), "pass 2");
                row.apply(outcome);
            }
        });
}

/// Run both passes over already-loaded inputs.
pub fn translate(rows: &mut [CatalogueRow], genes: &GeneIndex, reference: &Reference) -> Summary {
    classify_rows(rows, genes);
    info!(rows = rows.len(), failed = rows.iter().filter(|r| r.fail).count(), "pass 1 done");
    impute_rows(rows, genes, reference);
    reclassify_rows(rows, genes);
    let summary = Summary::of(rows);
    info!(?summary, "pass 2 done");
    summary
}

/// Load inputs, translate the catalogue and write the annotated table.
pub fn run(opts: &PipelineOpts) -> Result<Summary> {
    let genes = gene::load_gff(&opts.gff)?;
    let reference = reference::load_reference(&opts.reference)?;
    let entries = catalogue::load_catalogue(&opts.catalogue, &opts.columns)?;
    let mut rows = catalogue::prepare(&entries);

    let n = opts.threads.unwrap_or_else(num_cpus::get).max(1);
    let pool = ThreadPoolBuilder::new().num_threads(n).build()?;
    info!(threads = n, genes = genes.len(), "translating catalogue");
    let summary = pool.install(|| translate(&mut rows, &genes, &reference));

    catalogue::write_csv(&rows, &opts.output)?;
    Ok(summary)
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use crate::catalogue::CatalogueEntry;
    use crate::gene::GffRow;
    use crate::impute::ImputeError;
    use pretty_assertions::assert_eq;

    fn genes() -> GeneIndex {
        GeneIndex::from_rows([
            GffRow::from_fields(&["NC_000962.3", ".", "gene", "100", "500", ".", "+", ".", "Name=rpoB;locus_tag=Rv0667"]).unwrap(),
        ])
    }

    fn rows(variants: &[&str]) -> Vec<CatalogueRow> {
        let entries: Vec<CatalogueEntry> = variants
            .iter()
            .map(|v| CatalogueEntry { variant: v.to_string(), drug: "RIF".into(), grading: "1) Assoc w R".into(), genome_position: "1".into() })
            .collect();
        catalogue::prepare(&entries)
    }

    #[test]
    fn end_to_end_nucleotide_change() {
        let mut rows = rows(&["rpoB_c-61t"]);
        translate(&mut rows, &genes(), &Reference::new("ACGT".repeat(200)));
        let r = &rows[0];
        assert_eq!(r.gene.as_deref(), Some("rpoB"));
        assert_eq!(r.variant_type.map(|t| t.as_str()), Some("c"));
        assert_eq!(r.hgvs.as_deref(), Some("c.-61C>T"));
        assert!(!r.fail);
        assert_eq!(r.complete_variant, None);
    }

    #[test]
    fn length_mismatch_is_recovered_from_reference() {
        // gene start 100, position 10 -> window starts at index 108
        let mut seq = "n".repeat(108);
        seq.push_str("gcgcaaaa");
        let mut rows = rows(&["rpoB_10_del_2_g_g", "rpoB_S450L", "rpoB_12_ins_4_a_a"]);
        let summary = translate(&mut rows, &genes(), &Reference::new(seq));

        assert_eq!(rows[0].complete_variant.as_deref(), Some("rpoB_10_del_2_gcg_g"));
        assert_eq!(rows[0].hgvs.as_deref(), Some("c.11_12del"));
        assert!(!rows[0].fail);
        assert_eq!(rows[1].hgvs.as_deref(), Some("p.Ser450Leu"));
        assert_eq!(rows[2].complete_variant_fail, Some(true));
        assert_eq!(rows[2].complete_variant_fail_reason, Some(ImputeError::InsertionNotSupported));
        assert_eq!(rows[2].fail_reason, Some(FailReason::LengthMismatch));
        assert_eq!(summary, Summary { rows: 3, classified: 2, imputed: 1, failed: 1 });
    }

    #[test]
    fn unknown_genes_fail_one_row_only() {
        let mut rows = rows(&["embB_c-16t", "rpoB_c-61t"]);
        translate(&mut rows, &genes(), &Reference::default());
        assert_eq!(rows[0].fail_reason, Some(FailReason::UnknownGene("embB".into())));
        assert!(!rows[1].fail);
    }

    #[test]
    fn imputation_outside_reference_is_recorded() {
        let mut rows = rows(&["rpoB_10_del_2_g_g"]);
        translate(&mut rows, &genes(), &Reference::new("ACGT"));
        assert_eq!(rows[0].complete_variant_fail, Some(true));
        assert!(matches!(rows[0].complete_variant_fail_reason, Some(ImputeError::WindowOutOfBounds { .. })));
        assert_eq!(rows[0].fail_reason, Some(FailReason::LengthMismatch));
    }
}
