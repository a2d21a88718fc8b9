//! Reference genome input.
//!
//! Two layouts are accepted:
//! - **FASTA/FASTQ** (first byte `>` or `@`): parsed with `needletail`; the first
//!   record's sequence is used.
//! - **Plain sequence**: every line concatenated with line terminators removed.
//!
//! Either way the result is one contiguous base string indexed from 0.
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use needletail::parse_fastx_file;
use tracing::info;

/// A loaded reference sequence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Reference {
    seq: Vec<u8>,
}

impl Reference {
    pub fn new(seq: impl Into<Vec<u8>>) -> Self { Reference { seq: seq.into() } }

    pub fn len(&self) -> usize { self.seq.len() }

    pub fn is_empty(&self) -> bool { self.seq.is_empty() }

    /// Lower-cased bases of the half-open window `[start, end)`, or `None` when
    /// the window is empty, reversed or falls outside the sequence.
    pub fn window(&self, start: i64, end: i64) -> Option<String> {
        if start < 0 || end <= start { return None; }
        let (s, e) = (start as usize, end as usize);
        let bases = self.seq.get(s..e)?;
        Some(String::from_utf8_lossy(bases).to_ascii_lowercase())
    }
}

/// Load a reference from disk.
pub fn load_reference<P: AsRef<Path>>(path: P) -> Result<Reference> {
    let p = path.as_ref();
    let mut first = [0u8; 1];
    let n = File::open(p)
        .and_then(|mut f| f.read(&mut first))
        .with_context(|| format!("opening reference {}", p.display()))?;

    let seq = if n == 1 && (first[0] == b'>' || first[0] == b'@') {
        let mut reader = parse_fastx_file(p).with_context(|| format!("parsing reference {}", p.display()))?;
        match reader.next() {
            Some(record) => record?.seq().to_vec(),
            None => Vec::new(),
        }
    } else {
        let mut seq = Vec::new();
        for line in BufReader::new(File::open(p)?).lines() {
            seq.extend_from_slice(line?.trim_end_matches('\r').as_bytes());
        }
        seq
    };
    info!(path = %p.display(), bases = seq.len(), "loaded reference");
    Ok(Reference::new(seq))
}

#[cfg(test)]
mod reference_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn plain_lines_are_concatenated() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "ACGT\nacgt\r\nTT").unwrap();
        let r = load_reference(f.path()).unwrap();
        assert_eq!(r.len(), 10);
        assert_eq!(r.window(2, 6).as_deref(), Some("gtac"));
    }

    #[test]
    fn fasta_header_is_not_part_of_the_sequence() {
        let mut f = tempfile::Builder::new().suffix(".fa").tempfile().unwrap();
        write!(f, ">NC_000962.3 test\nTTGACC\nGATGAC\n").unwrap();
        let r = load_reference(f.path()).unwrap();
        assert_eq!(r.window(0, 12).as_deref(), Some("ttgaccgatgac"));
    }

    #[test]
    fn out_of_range_windows_are_none() {
        let r = Reference::new("ACGT");
        assert_eq!(r.window(-1, 2), None);
        assert_eq!(r.window(2, 9), None);
        assert_eq!(r.window(3, 3), None);
        assert_eq!(r.window(3, 4).as_deref(), Some("t"));
    }
}
