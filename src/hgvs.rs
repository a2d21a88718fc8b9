//! HGVS descriptor formatting.
//!
//! Pure templating: a [`Descriptor`] carries already-resolved positions and
//! bases, and its `Display` implementation renders the canonical text.
//! Ambiguous indels render each alternative and join them with `|`.
use core::fmt;

use crate::coords::Span;

/// Variant type prefix of a descriptor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum VariantType {
    /// Coding DNA (`c.`).
    Coding,
    /// Non-coding RNA gene (`n.`), used for rRNA features.
    NonCoding,
    /// Protein (`p.`).
    Protein,
}

impl VariantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantType::Coding => "c",
            VariantType::NonCoding => "n",
            VariantType::Protein => "p",
        }
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// One-letter to three-letter amino acid codes (20 standard residues plus stop).
///
/// The catalogue writes stop as `!`; `*` is accepted as well.
pub const AMINO_ACIDS: &[(char, &str)] = &[
    ('A', "Ala"), ('R', "Arg"), ('N', "Asn"), ('D', "Asp"), ('C', "Cys"),
    ('E', "Glu"), ('Q', "Gln"), ('G', "Gly"), ('H', "His"), ('I', "Ile"),
    ('L', "Leu"), ('K', "Lys"), ('M', "Met"), ('F', "Phe"), ('P', "Pro"),
    ('S', "Ser"), ('T', "Thr"), ('W', "Trp"), ('Y', "Tyr"), ('V', "Val"),
    ('!', "Ter"),
];

/// Expand a one-letter amino acid code.
pub fn three_letter(aa: char) -> Option<&'static str> {
    let aa = match aa.to_ascii_uppercase() { '*' => '!', c => c };
    AMINO_ACIDS.iter().find(|(one, _)| *one == aa).map(|(_, three)| *three)
}

/// A formatted-to-be HGVS description.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Descriptor {
    /// `<t>.<pos><REF>><ALT>`
    Substitution { kind: VariantType, position: i64, reference: char, alternate: char },
    /// `p.<Ref3><pos><Alt3>`
    Protein { position: i64, reference: &'static str, alternate: &'static str },
    /// `c.<pos>del` or `c.<start>_<end>del`, one entry per alignment.
    Deletion(Vec<Span>),
    /// `c.<start>_<end>ins<BASES>`, one entry per alignment.
    Insertion(Vec<(Span, String)>),
}

impl Descriptor {
    pub fn variant_type(&self) -> VariantType {
        match self {
            Descriptor::Substitution { kind, .. } => *kind,
            Descriptor::Protein { .. } => VariantType::Protein,
            Descriptor::Deletion(_) | Descriptor::Insertion(_) => VariantType::Coding,
        }
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Substitution { kind, position, reference, alternate } => write!(
                f,
                "{}.{}{}>{}",
                kind,
                position,
                reference.to_ascii_uppercase(),
                alternate.to_ascii_uppercase()
            ),
            Descriptor::Protein { position, reference, alternate } => write!(f, "p.{reference}{position}{alternate}"),
            Descriptor::Deletion(spans) => {
                for (i, s) in spans.iter().enumerate() {
                    if i > 0 { f.write_str("|")?; }
                    if s.start == s.end { write!(f, "c.{}del", s.start)?; } else { write!(f, "c.{}_{}del", s.start, s.end)?; }
                }
                Ok(())
            }
            Descriptor::Insertion(sites) => {
                for (i, (s, bases)) in sites.iter().enumerate() {
                    if i > 0 { f.write_str("|")?; }
                    write!(f, "c.{}_{}ins{}", s.start, s.end, bases)?;
                }
                Ok(())
            }
        }
    }
}
