//! Catalogue ingestion and the annotated output table.
//!
//! ### Input
//! A delimited table (CSV, or TSV for `.tsv`/`.txt`) with a header row. Four
//! columns are read, by name (see [`CatalogueColumns`]): the variant name, the
//! drug, the confidence grading and the genome position. Entries graded
//! `combo` are dropped, and a variant listed with synonyms, e.g.
//! `rpoB_S450L (rpoB_S531L)`, is classified by its primary name only.
//!
//! ### Output
//! One row per surviving entry, written through a `polars` [`DataFrame`].
use std::fs::File;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use regex::Regex;
use tracing::{info, warn};

use crate::classify::{Classification, FailReason};
use crate::hgvs::VariantType;
use crate::impute::ImputeError;

static SYNONYMS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.*) \((.*)\)").expect("valid synonym pattern"));

/// Header names of the catalogue columns that are read.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CatalogueColumns {
    pub variant: String,
    pub drug: String,
    pub grading: String,
    pub genome_position: String,
}

impl Default for CatalogueColumns {
    fn default() -> Self {
        CatalogueColumns {
            variant: "variant (common_name)".into(),
            drug: "drug".into(),
            grading: "FINAL CONFIDENCE GRADING".into(),
            genome_position: "Genome position".into(),
        }
    }
}

/// A catalogue entry as read, before filtering.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CatalogueEntry {
    pub variant: String,
    pub drug: String,
    pub grading: String,
    pub genome_position: String,
}

/// One output row, filled in by the classification passes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogueRow {
    /// Primary shorthand that is classified.
    pub variant: String,
    pub drug: String,
    /// Grading up to the first `)`, e.g. `1` for `1) Assoc w R`.
    pub classification: String,
    pub genome_position: String,
    /// Variant name exactly as it appeared in the catalogue, synonyms included.
    pub original_notation: String,
    pub gene: Option<String>,
    pub variant_type: Option<VariantType>,
    pub hgvs: Option<String>,
    pub fail: bool,
    pub fail_reason: Option<FailReason>,
    pub complete_variant: Option<String>,
    pub complete_variant_fail: Option<bool>,
    pub complete_variant_fail_reason: Option<ImputeError>,
}

impl CatalogueRow {
    pub fn from_entry(e: &CatalogueEntry) -> Self {
        CatalogueRow {
            variant: primary_variant(&e.variant).to_string(),
            drug: e.drug.clone(),
            classification: e.grading.split(')').next().unwrap_or_default().to_string(),
            genome_position: format_position(&e.genome_position),
            original_notation: e.variant.clone(),
            ..Default::default()
        }
    }

    /// Record a classification outcome, overwriting any earlier one.
    pub fn apply(&mut self, outcome: Classification) {
        match outcome {
            Ok(c) => {
                self.gene = Some(c.gene);
                self.variant_type = Some(c.variant_type);
                self.hgvs = Some(c.hgvs);
                self.fail = false;
                self.fail_reason = None;
            }
            Err(reason) => {
                self.gene = None;
                self.variant_type = None;
                self.hgvs = None;
                self.fail = true;
                self.fail_reason = Some(reason);
            }
        }
    }

    /// Record the outcome of deletion imputation.
    pub fn apply_imputation(&mut self, outcome: Result<String, ImputeError>) {
        match outcome {
            Ok(v) => {
                self.complete_variant = Some(v);
                self.complete_variant_fail = Some(false);
            }
            Err(e) => {
                self.complete_variant_fail = Some(true);
                self.complete_variant_fail_reason = Some(e);
            }
        }
    }
}

/// Variant name without a trailing ` (synonym, ...)` list.
pub fn primary_variant(name: &str) -> &str {
    match SYNONYMS.captures(name).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => name,
    }
}

/// Render a genome position as an integer when it parses as a number.
pub fn format_position(raw: &str) -> String {
    let t = raw.trim();
    match t.parse::<f64>() {
        Ok(v) if v.is_finite() => format!("{v:.0}"),
        _ => t.to_string(),
    }
}

/// Drop `combo` entries and build output rows in catalogue order.
pub fn prepare(entries: &[CatalogueEntry]) -> Vec<CatalogueRow> {
    let rows: Vec<CatalogueRow> = entries
        .iter()
        .filter(|e| e.grading.trim() != "combo")
        .map(CatalogueRow::from_entry)
        .collect();
    info!(entries = entries.len(), rows = rows.len(), "prepared catalogue");
    rows
}

fn delimiter_for(p: &Path) -> u8 {
    match p.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
        Some(e) if e == "tsv" || e == "txt" => b'\t',
        _ => b',',
    }
}

/// Read catalogue entries from a delimited file.
pub fn load_catalogue<P: AsRef<Path>>(path: P, columns: &CatalogueColumns) -> Result<Vec<CatalogueEntry>> {
    let p = path.as_ref();
    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter_for(p))
        .flexible(true)
        .from_path(p)
        .with_context(|| format!("opening catalogue {}", p.display()))?;
    let headers = rdr.headers()?.clone();
    let find = |name: &str| -> Result<usize> {
        match headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name.trim())) {
            Some(i) => Ok(i),
            None => bail!("catalogue {} has no column {:?}", p.display(), name),
        }
    };
    let (iv, id, ig, ip) = (find(&columns.variant)?, find(&columns.drug)?, find(&columns.grading)?, find(&columns.genome_position)?);

    let mut out = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let r = rec?;
        let field = |j: usize| r.get(j).unwrap_or("").trim().to_string();
        let entry = CatalogueEntry { variant: field(iv), drug: field(id), grading: field(ig), genome_position: field(ip) };
        if entry.variant.is_empty() {
            warn!(line = i + 2, "skipping catalogue row without a variant name");
            continue;
        }
        out.push(entry);
    }
    Ok(out)
}

fn opt_strings<T: ToString>(rows: &[CatalogueRow], f: impl Fn(&CatalogueRow) -> Option<&T>) -> Vec<Option<String>> {
    rows.iter().map(|r| f(r).map(|v| v.to_string())).collect()
}

/// Build the output table, columns in row-field order.
pub fn to_dataframe(rows: &[CatalogueRow]) -> PolarsResult<DataFrame> {
    df!(
        "variant"                      => rows.iter().map(|r| r.variant.clone()).collect::<Vec<_>>(),
        "drug"                         => rows.iter().map(|r| r.drug.clone()).collect::<Vec<_>>(),
        "classification"               => rows.iter().map(|r| r.classification.clone()).collect::<Vec<_>>(),
        "genome_position"              => rows.iter().map(|r| r.genome_position.clone()).collect::<Vec<_>>(),
        "original_notation"            => rows.iter().map(|r| r.original_notation.clone()).collect::<Vec<_>>(),
        "gene"                         => opt_strings(rows, |r| r.gene.as_ref()),
        "type"                         => opt_strings(rows, |r| r.variant_type.as_ref()),
        "hgvs"                         => opt_strings(rows, |r| r.hgvs.as_ref()),
        "fail"                         => rows.iter().map(|r| r.fail).collect::<Vec<_>>(),
        "fail_reason"                  => opt_strings(rows, |r| r.fail_reason.as_ref()),
        "complete_variant"             => opt_strings(rows, |r| r.complete_variant.as_ref()),
        "complete_variant_fail"        => rows.iter().map(|r| r.complete_variant_fail).collect::<Vec<_>>(),
        "complete_variant_fail_reason" => opt_strings(rows, |r| r.complete_variant_fail_reason.as_ref()),
    )
}

/// Write rows as CSV to `path`, or to stdout when `path` is `-`.
pub fn write_csv<P: AsRef<Path>>(rows: &[CatalogueRow], path: P) -> Result<()> {
    let p = path.as_ref();
    let mut df = to_dataframe(rows)?;
    if p == Path::new("-") {
        CsvWriter::new(std::io::stdout()).include_header(true).finish(&mut df)?;
    } else {
        let f = File::create(p).with_context(|| format!("creating output {}", p.display()))?;
        CsvWriter::new(f).include_header(true).finish(&mut df)?;
    }
    info!(rows = rows.len(), path = %p.display(), "wrote annotated catalogue");
    Ok(())
}

#[cfg(test)]
mod catalogue_tests {
    use super::*;
    use crate::classify::Classified;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn entry(variant: &str, grading: &str) -> CatalogueEntry {
        CatalogueEntry { variant: variant.into(), drug: "RIF".into(), grading: grading.into(), genome_position: "761155.0".into() }
    }

    #[test]
    fn synonyms_are_stripped_but_kept_as_original() {
        let row = CatalogueRow::from_entry(&entry("rpoB_S450L (rpoB_S531L, rpoB_S456L)", "1) Assoc w R"));
        assert_eq!(row.variant, "rpoB_S450L");
        assert_eq!(row.original_notation, "rpoB_S450L (rpoB_S531L, rpoB_S456L)");
        assert_eq!(row.classification, "1");
        assert_eq!(row.genome_position, "761155");
    }

    #[test]
    fn combo_entries_are_excluded() {
        let rows = prepare(&[entry("rpoB_S450L", "1) Assoc w R"), entry("katG_S315T", "combo")]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].variant, "rpoB_S450L");
    }

    #[test]
    fn positions_that_are_not_numbers_are_kept() {
        assert_eq!(format_position(" 4247429 "), "4247429");
        assert_eq!(format_position(""), "");
        assert_eq!(format_position("4247429,4247431"), "4247429,4247431");
    }

    #[test]
    fn apply_overwrites_previous_outcome() {
        let mut row = CatalogueRow::from_entry(&entry("fabG1_-15_del_3_cg_c", "2) Assoc w R - Interim"));
        row.apply(Err(FailReason::LengthMismatch));
        assert!(row.fail);
        row.apply(Ok(Classified { gene: "fabG1".into(), variant_type: VariantType::Coding, hgvs: "c.-14_-12del".into() }));
        assert!(!row.fail);
        assert_eq!(row.fail_reason, None);
        assert_eq!(row.hgvs.as_deref(), Some("c.-14_-12del"));
    }

    #[test]
    fn loads_tsv_by_header_name() {
        let mut f = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        writeln!(f, "drug\tvariant (common_name)\tGenome position\tFINAL CONFIDENCE GRADING").unwrap();
        writeln!(f, "Rifampicin\trpoB_S450L\t761155\t1) Assoc w R").unwrap();
        writeln!(f, "Isoniazid\t\t1\t3) Uncertain significance").unwrap();
        let got = load_catalogue(f.path(), &CatalogueColumns::default()).unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].drug, "Rifampicin");
        assert_eq!(got[0].grading, "1) Assoc w R");
    }

    #[test]
    fn missing_column_is_an_error() {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(f, "drug,variant").unwrap();
        assert!(load_catalogue(f.path(), &CatalogueColumns::default()).is_err());
    }

    #[test]
    fn dataframe_has_all_columns() {
        let mut row = CatalogueRow::from_entry(&entry("katG_LoF", "1) Assoc w R"));
        row.apply(Err(FailReason::NoGrammarMatch));
        let df = to_dataframe(&[row]).unwrap();
        assert_eq!(df.width(), 13);
        assert_eq!(df.height(), 1);
    }
}
