use thiserror::Error;

/// One of the two alleles at a bi-allelic site.
///
/// The discriminant is the column of the allele in a `TallyTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allele {
    Ref = 0,
    Alt = 1,
}

impl Allele {
    pub const ALL: [Allele; 2] = [Allele::Ref, Allele::Alt];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single genotype call as written in a sample field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlleleCall {
    Ref,
    Alt,
    Missing,
}

impl AlleleCall {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'0' => Some(AlleleCall::Ref),
            b'1' => Some(AlleleCall::Alt),
            b'.' => Some(AlleleCall::Missing),
            _ => None,
        }
    }

    pub fn allele(self) -> Option<Allele> {
        match self {
            AlleleCall::Ref => Some(Allele::Ref),
            AlleleCall::Alt => Some(Allele::Alt),
            AlleleCall::Missing => None,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GenotypeError {
    #[error("genotype '{0}' is shorter than the expected call/separator/call shape")]
    TooShort(String),

    #[error("genotype '{field}' has unsupported call '{call}' (expected 0, 1 or .)")]
    UnsupportedCall { field: String, call: char },
}

/// Unphased diploid genotype read from a sample field.
///
/// Only single-character calls at offsets 0 and 2 are understood (`0/1`,
/// `1|1`, `./.`, `0/1:35:...`). The separator is not interpreted, so phased
/// genotypes are counted the same as unphased ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genotype {
    pub first: AlleleCall,
    pub second: AlleleCall,
}

impl Genotype {
    pub fn parse(field: &str) -> Result<Self, GenotypeError> {
        let bytes = field.as_bytes();
        if bytes.len() < 3 {
            return Err(GenotypeError::TooShort(field.to_string()));
        }

        let call = |offset: usize| {
            AlleleCall::from_byte(bytes[offset]).ok_or_else(|| GenotypeError::UnsupportedCall {
                field: field.to_string(),
                call: field
                    .get(offset..)
                    .and_then(|rest| rest.chars().next())
                    .unwrap_or(char::REPLACEMENT_CHARACTER),
            })
        };

        Ok(Self {
            first: call(0)?,
            second: call(2)?,
        })
    }

    pub fn calls(&self) -> [AlleleCall; 2] {
        [self.first, self.second]
    }

    pub fn has_missing(&self) -> bool {
        self.calls().contains(&AlleleCall::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unphased() {
        let gt = Genotype::parse("0/1").unwrap();
        assert_eq!(gt.first, AlleleCall::Ref);
        assert_eq!(gt.second, AlleleCall::Alt);
        assert!(!gt.has_missing());
    }

    #[test]
    fn test_parse_with_format_fields() {
        let gt = Genotype::parse("1|1:12:99").unwrap();
        assert_eq!(gt.calls(), [AlleleCall::Alt, AlleleCall::Alt]);
    }

    #[test]
    fn test_parse_missing() {
        let gt = Genotype::parse("0/.").unwrap();
        assert!(gt.has_missing());
        assert_eq!(gt.first.allele(), Some(Allele::Ref));
        assert_eq!(gt.second.allele(), None);
    }

    #[test]
    fn test_parse_rejects_short_field() {
        assert_eq!(Genotype::parse("."), Err(GenotypeError::TooShort(".".to_string())));
        assert!(Genotype::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_multi_allelic_call() {
        assert_eq!(
            Genotype::parse("0/2"),
            Err(GenotypeError::UnsupportedCall {
                field: "0/2".to_string(),
                call: '2'
            })
        );
    }
}
