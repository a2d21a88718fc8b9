//! Gene annotation index: **gene records** keyed by locus tag *and* display name.
//!
//! Records are built from GFF3 rows. Each row's free-text attributes column is
//! searched for `Name=<value>;...;locus_tag=<value>`; when present, the record is
//! registered under both identifiers. The two keys point at the same slot in an
//! arena of records, so a lookup by `rpoB` and by `Rv0667` always yields the
//! identical [`GeneRecord`].
//!
//! # Examples
//! ```
//! use cathgvs::gene::{GeneIndex, GffRow, Strand};
//! let row = GffRow::from_fields(&[
//!     "NC_000962.3", ".", "gene", "100", "500", ".", "+", ".", "Name=rpoB;locus_tag=Rv0667",
//! ]).unwrap();
//! let index = GeneIndex::from_rows(vec![row]);
//! assert_eq!(index.lookup("rpoB").unwrap().strand, Strand::Forward);
//! assert_eq!(index.lookup("Rv0667").unwrap().display_name.as_deref(), Some("rpoB"));
//! ```
use core::fmt;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;
use tracing::{debug, warn};

use crate::FailReason;

static ATTRIBUTE_ALIASES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Name=([^;]+).*locus_tag=([^;|\n]+)").expect("valid attribute pattern"));

/// Reading direction of a gene relative to the reference sequence.
///
/// GFF `+` is [`Strand::Forward`]; every other value (including `-`, `.` and `?`)
/// is folded into [`Strand::Reverse`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Strand { Forward, Reverse }

impl Strand {
    /// Normalise a GFF strand column.
    pub fn from_gff(s: &str) -> Self {
        if s.trim() == "+" { Strand::Forward } else { Strand::Reverse }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Strand::Forward => "+", Strand::Reverse => "-" })
    }
}

/// One annotated feature. Immutable once the index is built.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneRecord {
    /// Locus tag such as `Rv0667`, if the attributes carried one.
    pub locus_tag: Option<String>,
    /// Display name such as `rpoB`, if the attributes carried one.
    pub display_name: Option<String>,
    /// Sequence (contig) identifier, GFF column 1.
    pub sequence_id: String,
    /// Feature type, GFF column 3 (`gene`, `rRNA`, `CDS`, ...).
    pub biotype: String,
    /// 1-based inclusive start.
    pub start: i64,
    /// 1-based inclusive end.
    pub end: i64,
    pub strand: Strand,
    /// Annotation source, GFF column 2.
    pub source: String,
    /// GFF score; `.` is `None`.
    pub score: Option<f64>,
}

impl GeneRecord {
    /// `true` for ribosomal RNA features, which are described with `n.` rather than `c.`.
    pub fn is_rrna(&self) -> bool { self.biotype == "rRNA" }
}

/// A single parsed annotation row, before indexing.
#[derive(Clone, Debug, PartialEq)]
pub struct GffRow {
    pub record: GeneRecord,
}

impl GffRow {
    /// Build a row from the nine positional GFF fields.
    ///
    /// Returns `None` when there are fewer than nine fields or the coordinates are
    /// not integers. Rows whose attributes do not carry both aliases are kept but
    /// contribute no lookup key.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        if fields.len() < 9 { return None; }
        let f = |i: usize| fields[i].as_ref().trim();
        let start = f(3).parse::<i64>().ok()?;
        let end = f(4).parse::<i64>().ok()?;
        let (display_name, locus_tag) = match extract_aliases(f(8)) {
            Some((name, tag)) => (Some(name), Some(tag)),
            None => (None, None),
        };
        Some(GffRow {
            record: GeneRecord {
                locus_tag,
                display_name,
                sequence_id: f(0).to_string(),
                biotype: f(2).to_string(),
                start,
                end,
                strand: Strand::from_gff(f(6)),
                source: f(1).to_string(),
                score: f(5).parse::<f64>().ok(),
            },
        })
    }
}

/// Extract `(display_name, locus_tag)` from a GFF attributes string.
pub fn extract_aliases(attributes: &str) -> Option<(String, String)> {
    let caps = ATTRIBUTE_ALIASES.captures(attributes)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Lookup from gene identifier (locus tag or display name) to [`GeneRecord`].
#[derive(Clone, Debug, Default)]
pub struct GeneIndex {
    records: Vec<GeneRecord>,
    keys: HashMap<String, usize>,
}

impl GeneIndex {
    /// Index rows in order. A key seen twice resolves to the later row.
    pub fn from_rows<I: IntoIterator<Item = GffRow>>(rows: I) -> Self {
        let mut index = GeneIndex::default();
        for row in rows {
            let rec = row.record;
            if rec.locus_tag.is_none() && rec.display_name.is_none() { continue; }
            let slot = index.records.len();
            for key in [rec.locus_tag.clone(), rec.display_name.clone()].into_iter().flatten() {
                index.keys.insert(key, slot);
            }
            index.records.push(rec);
        }
        debug!(records = index.records.len(), keys = index.keys.len(), "built gene index");
        index
    }

    /// Resolve a gene identifier.
    pub fn lookup(&self, id: &str) -> Result<&GeneRecord, FailReason> {
        self.keys
            .get(id)
            .map(|&slot| &self.records[slot])
            .ok_or_else(|| FailReason::UnknownGene(id.to_string()))
    }

    /// Number of distinct lookup keys.
    pub fn len(&self) -> usize { self.keys.len() }

    pub fn is_empty(&self) -> bool { self.keys.is_empty() }
}

/// Read a GFF3 file into a [`GeneIndex`].
///
/// Comment lines (`#`) are skipped. Malformed rows are logged and skipped.
pub fn load_gff<P: AsRef<Path>>(path: P) -> anyhow::Result<GeneIndex> {
    let p = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .flexible(true)
        .quoting(false)
        .from_path(p)
        .with_context(|| format!("opening annotation {}", p.display()))?;
    let mut rows = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let r = rec.with_context(|| format!("reading annotation {}", p.display()))?;
        let fields: Vec<&str> = r.iter().collect();
        match GffRow::from_fields(&fields) {
            Some(row) => rows.push(row),
            None => warn!(line = i + 1, "skipping malformed annotation row"),
        }
    }
    Ok(GeneIndex::from_rows(rows))
}
