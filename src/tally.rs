use crate::genotype::{Allele, Genotype};
use crate::population::Header;
use crate::record::VariantRecord;
use clap::ValueEnum;
use ndarray::Array2;

/// How a genotype with one missing call (`0/.`) is counted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MissingCallPolicy {
    /// Any `.` drops the whole sample for that locus
    #[default]
    SkipSample,
    /// The non-missing call is still counted
    CountPresent,
}

/// Per-locus allele counts: one row per group, one column per allele
#[derive(Debug, Clone, PartialEq)]
pub struct TallyTable {
    counts: Array2<u32>,
}

impl TallyTable {
    pub fn new(n_groups: usize) -> Self {
        Self {
            counts: Array2::zeros((n_groups, Allele::ALL.len())),
        }
    }

    pub fn n_groups(&self) -> usize {
        self.counts.nrows()
    }

    pub fn increment(&mut self, group: usize, allele: Allele) {
        self.counts[[group, allele.index()]] += 1;
    }

    pub fn count(&self, group: usize, allele: Allele) -> u32 {
        self.counts[[group, allele.index()]]
    }

    /// Sum over all groups and both alleles
    pub fn total(&self) -> u32 {
        self.counts.sum()
    }

    /// Counts of one allele in group order, each value followed by `delimiter`
    pub fn line(&self, allele: Allele, delimiter: char) -> String {
        let mut line = String::new();
        for group in 0..self.n_groups() {
            line.push_str(&self.count(group, allele).to_string());
            line.push(delimiter);
        }
        line
    }
}

/// Count the genotype calls of one validated row.
///
/// Returns a fresh table; nothing carries over between loci. Samples in
/// unresolved columns and samples with unparseable genotypes are skipped.
pub fn accumulate(record: &VariantRecord<'_>, header: &Header, policy: MissingCallPolicy) -> TallyTable {
    let mut tally = header.registry().new_tally();

    for (field, group) in record.samples.iter().zip(header.column_groups()) {
        let Some(group) = *group else {
            continue;
        };

        let genotype = match Genotype::parse(field) {
            Ok(genotype) => genotype,
            Err(e) => {
                log::debug!("{}: skipping sample, {}", record.locus, e);
                continue;
            }
        };

        if genotype.has_missing() && policy == MissingCallPolicy::SkipSample {
            continue;
        }

        for call in genotype.calls() {
            if let Some(allele) = call.allele() {
                tally.increment(group, allele);
            }
        }
    }

    tally
}
