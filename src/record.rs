use crate::genotype::Allele;
use crate::population::Header;
use std::fmt;

/// CHROM, POS, ID, REF, ALT, QUAL, FILTER, INFO, FORMAT
pub const FIXED_COLUMNS: usize = 9;

const CONTIG: usize = 0;
const POSITION: usize = 1;
const REF_ALLELE: usize = 3;
const ALT_ALLELE: usize = 4;

/// Separator between alternate alleles in the ALT column
const ALT_LIST_SEPARATOR: char = ',';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locus<'a> {
    pub contig: &'a str,
    pub position: &'a str,
}

impl<'a> Locus<'a> {
    /// Best-effort locus of a row that may be truncated
    fn of_fields(fields: &[&'a str]) -> Self {
        Self {
            contig: fields.get(CONTIG).copied().unwrap_or(""),
            position: fields.get(POSITION).copied().unwrap_or(""),
        }
    }
}

impl fmt::Display for Locus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.contig, self.position)
    }
}

/// A data row that passed validation, borrowing from the tokenized line
#[derive(Debug, Clone)]
pub struct VariantRecord<'a> {
    pub locus: Locus<'a>,
    pub ref_allele: &'a str,
    pub alt_allele: &'a str,
    /// Raw genotype fields, aligned with the header's sample columns
    pub samples: &'a [&'a str],
}

impl VariantRecord<'_> {
    pub fn allele(&self, allele: Allele) -> &str {
        match allele {
            Allele::Ref => self.ref_allele,
            Allele::Alt => self.alt_allele,
        }
    }
}

/// Why a data row was skipped. Rejections are reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    ColumnCount {
        locus: String,
        expected: usize,
        found: usize,
    },
    MultiAllelic {
        locus: String,
        alt: String,
    },
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowRejection::ColumnCount {
                locus,
                expected,
                found,
            } => write!(
                f,
                "Incorrect number of columns found for locus {} ({} sample columns, header declares {}). Skipping this locus.",
                locus, found, expected
            ),
            RowRejection::MultiAllelic { locus, alt } => write!(
                f,
                "Multiple alternative alleles ({}) found for locus {}. Skipping this locus.",
                alt, locus
            ),
        }
    }
}

/// Check a tokenized data row against the header.
///
/// Column count is checked before the ALT field, since a truncated row has
/// no reliable ALT column.
pub fn validate<'a>(fields: &'a [&'a str], header: &Header) -> Result<VariantRecord<'a>, RowRejection> {
    let locus = Locus::of_fields(fields);
    let expected = header.n_samples();
    let found = fields.len().saturating_sub(FIXED_COLUMNS);

    if fields.len() < FIXED_COLUMNS || found != expected {
        return Err(RowRejection::ColumnCount {
            locus: locus.to_string(),
            expected,
            found,
        });
    }

    let alt_allele = fields[ALT_ALLELE];
    if alt_allele.contains(ALT_LIST_SEPARATOR) {
        return Err(RowRejection::MultiAllelic {
            locus: locus.to_string(),
            alt: alt_allele.to_string(),
        });
    }

    Ok(VariantRecord {
        locus,
        ref_allele: fields[REF_ALLELE],
        alt_allele,
        samples: &fields[FIXED_COLUMNS..],
    })
}
