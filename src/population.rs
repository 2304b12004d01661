use crate::error::{BnvError, Result};
use crate::record::FIXED_COLUMNS;
use crate::tally::TallyTable;
use clap::ValueEnum;

/// Synthetic group collecting every column without a name prefix
pub const UNIDENTIFIABLE_GROUP: &str = "Unidentifiable";

/// What to do with a sample column whose name starts with a digit
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnresolvedPolicy {
    /// Abort the run
    Fatal,
    /// Collapse all such columns into the `Unidentifiable` group
    Group,
    /// Leave the column without a group; its samples are never counted
    Drop,
}

impl UnresolvedPolicy {
    pub fn describe(self) -> &'static str {
        match self {
            UnresolvedPolicy::Fatal => "abort on unresolvable sample columns",
            UnresolvedPolicy::Group => "collapse unresolvable sample columns into 'Unidentifiable'",
            UnresolvedPolicy::Drop => "ignore samples in unresolvable columns",
        }
    }
}

/// Leading run of non-digit characters of a sample column name.
///
/// Any Unicode digit ends the prefix. `PopA12` gives `PopA`; `12PopA` and
/// the empty string give `None`.
pub fn group_prefix(column: &str) -> Option<&str> {
    let end = column
        .find(char::is_numeric)
        .unwrap_or(column.len());
    if end == 0 {
        None
    } else {
        Some(&column[..end])
    }
}

/// Distinct groups in canonical (lexicographic) order.
///
/// This order is the column order of the counts matrix.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupRegistry {
    groups: Vec<String>,
}

impl GroupRegistry {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut groups: Vec<String> = names.into_iter().map(Into::into).collect();
        groups.sort();
        groups.dedup();
        Self { groups }
    }

    pub fn names(&self) -> &[String] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn index_of(&self, group: &str) -> Option<usize> {
        self.groups
            .binary_search_by(|probe| probe.as_str().cmp(group))
            .ok()
    }

    /// Zeroed tally table with one row per group
    pub fn new_tally(&self) -> TallyTable {
        TallyTable::new(self.len())
    }
}

/// Resolved sample-column header of a VCF file. Immutable once built.
#[derive(Debug, Clone)]
pub struct Header {
    sample_columns: Vec<String>,
    /// Registry index per sample column, `None` when unresolved
    column_groups: Vec<Option<usize>>,
    registry: GroupRegistry,
    policy: UnresolvedPolicy,
}

impl Header {
    /// Build from a tokenized `#CHROM ...` line
    pub fn parse(fields: &[&str], policy: UnresolvedPolicy) -> Result<Self> {
        if fields.len() < FIXED_COLUMNS {
            return Err(BnvError::InvalidFormat(format!(
                "header line has {} columns, expected at least {}",
                fields.len(),
                FIXED_COLUMNS
            )));
        }
        Self::resolve(&fields[FIXED_COLUMNS..], policy)
    }

    /// Build from the sample column names alone
    pub fn resolve<S: AsRef<str>>(sample_columns: &[S], policy: UnresolvedPolicy) -> Result<Self> {
        let mut names: Vec<Option<&str>> = Vec::with_capacity(sample_columns.len());
        for column in sample_columns {
            let column = column.as_ref();
            let name = match (group_prefix(column), policy) {
                (Some(prefix), _) => Some(prefix),
                (None, UnresolvedPolicy::Group) => Some(UNIDENTIFIABLE_GROUP),
                (None, UnresolvedPolicy::Drop) => None,
                (None, UnresolvedPolicy::Fatal) => {
                    return Err(BnvError::UnresolvedPopulation {
                        column: column.to_string(),
                    })
                }
            };
            names.push(name);
        }

        let registry = GroupRegistry::from_names(names.iter().flatten().copied());
        let column_groups = names
            .iter()
            .map(|name| name.and_then(|n| registry.index_of(n)))
            .collect();

        Ok(Self {
            sample_columns: sample_columns.iter().map(|c| c.as_ref().to_string()).collect(),
            column_groups,
            registry,
            policy,
        })
    }

    pub fn sample_columns(&self) -> &[String] {
        &self.sample_columns
    }

    pub fn n_samples(&self) -> usize {
        self.sample_columns.len()
    }

    pub fn column_groups(&self) -> &[Option<usize>] {
        &self.column_groups
    }

    /// Group name of a sample column
    pub fn group_of(&self, column: usize) -> Option<&str> {
        self.column_groups
            .get(column)
            .copied()
            .flatten()
            .map(|idx| self.registry.names()[idx].as_str())
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    pub fn policy(&self) -> UnresolvedPolicy {
        self.policy
    }

    pub fn n_unresolved(&self) -> usize {
        self.column_groups.iter().filter(|g| g.is_none()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_prefix() {
        assert_eq!(group_prefix("Pop1_01"), Some("Pop"));
        assert_eq!(group_prefix("PopA12"), Some("PopA"));
        assert_eq!(group_prefix("Mexico"), Some("Mexico"));
        assert_eq!(group_prefix("12PopA"), None);
        assert_eq!(group_prefix(""), None);
    }

    #[test]
    fn test_group_prefix_stops_at_non_ascii_digits() {
        assert_eq!(group_prefix("Pop\u{0663}x"), Some("Pop"));
        assert_eq!(group_prefix("Muestra\u{FF11}\u{FF12}"), Some("Muestra"));
        assert_eq!(group_prefix("\u{0663}Pop"), None);
    }

    #[test]
    fn test_registry_sorted_and_deduplicated() {
        let registry = GroupRegistry::from_names(["PopB", "PopA", "PopB", "PopA"]);
        assert_eq!(registry.names(), &["PopA".to_string(), "PopB".to_string()]);
        assert_eq!(registry.index_of("PopB"), Some(1));
        assert_eq!(registry.index_of("PopC"), None);
    }

    #[test]
    fn test_resolve_groups_columns_by_prefix() {
        let header = Header::resolve(&["PopB1", "PopA1", "PopA2"], UnresolvedPolicy::Fatal).unwrap();
        assert_eq!(header.registry().names(), &["PopA".to_string(), "PopB".to_string()]);
        assert_eq!(header.column_groups(), &[Some(1), Some(0), Some(0)]);
        assert_eq!(header.group_of(0), Some("PopB"));
        assert_eq!(header.group_of(2), Some("PopA"));
        assert_eq!(header.group_of(3), None);
    }

    #[test]
    fn test_fatal_policy_rejects_digit_prefixed_column() {
        let err = Header::resolve(&["PopA1", "42"], UnresolvedPolicy::Fatal).unwrap_err();
        match err {
            BnvError::UnresolvedPopulation { column } => assert_eq!(column, "42"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_group_policy_collapses_unresolved_columns() {
        let header = Header::resolve(&["7a", "Zeta1", "8b"], UnresolvedPolicy::Group).unwrap();
        assert_eq!(
            header.registry().names(),
            &[UNIDENTIFIABLE_GROUP.to_string(), "Zeta".to_string()]
        );
        assert_eq!(header.column_groups(), &[Some(0), Some(1), Some(0)]);
        assert_eq!(header.n_unresolved(), 0);
    }

    #[test]
    fn test_drop_policy_leaves_columns_unresolved() {
        let header = Header::resolve(&["7a", "Zeta1"], UnresolvedPolicy::Drop).unwrap();
        assert_eq!(header.registry().names(), &["Zeta".to_string()]);
        assert_eq!(header.column_groups(), &[None, Some(0)]);
        assert_eq!(header.n_unresolved(), 1);
    }

    #[test]
    fn test_parse_skips_fixed_columns() {
        let fields = [
            "#CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT", "Pop1_01", "Pop2_01",
        ];
        let header = Header::parse(&fields, UnresolvedPolicy::Fatal).unwrap();
        assert_eq!(header.n_samples(), 2);
        assert_eq!(header.sample_columns()[1], "Pop2_01");
    }

    #[test]
    fn test_parse_rejects_truncated_header() {
        let fields = ["#CHROM", "POS", "ID"];
        assert!(matches!(
            Header::parse(&fields, UnresolvedPolicy::Group),
            Err(BnvError::InvalidFormat(_))
        ));
    }
}
