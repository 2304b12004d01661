use crate::error::Result;
use crate::genotype::Allele;
use crate::population::GroupRegistry;
use crate::record::VariantRecord;
use crate::tally::TallyTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// First field of the last locus-list line
pub const POPULATION_ORDER_LABEL: &str = "#Population order:";

/// Writes the locus list and the counts matrix in lockstep.
///
/// Every accepted locus adds two lines to each output (ref, then alt), so
/// line N of the locus list describes line N of the counts matrix.
pub struct LocusWriter<L: Write, C: Write> {
    loci: L,
    counts: C,
    delimiter: char,
    loci_written: usize,
}

impl LocusWriter<BufWriter<File>, BufWriter<File>> {
    pub fn create(loci_path: &Path, counts_path: &Path, delimiter: char) -> Result<Self> {
        log::debug!("Opening locus list {}", loci_path.display());
        let loci = BufWriter::new(File::create(loci_path)?);
        log::debug!("Opening counts matrix {}", counts_path.display());
        let counts = BufWriter::new(File::create(counts_path)?);
        Ok(Self::new(loci, counts, delimiter))
    }
}

impl<L: Write, C: Write> LocusWriter<L, C> {
    pub fn new(loci: L, counts: C, delimiter: char) -> Self {
        Self {
            loci,
            counts,
            delimiter,
            loci_written: 0,
        }
    }

    /// Optional leading locus-list line naming the matrix columns
    pub fn write_column_header(&mut self, registry: &GroupRegistry) -> Result<()> {
        let d = self.delimiter;
        write!(self.loci, "contig{d}position{d}allele")?;
        for group in registry.names() {
            write!(self.loci, "{d}{group}")?;
        }
        writeln!(self.loci)?;
        Ok(())
    }

    /// Write the ref and alt lines of one accepted locus to both outputs
    pub fn write_locus(&mut self, record: &VariantRecord<'_>, tally: &TallyTable) -> Result<()> {
        let d = self.delimiter;
        for allele in Allele::ALL {
            writeln!(
                self.loci,
                "{}{d}{}{d}{}",
                record.locus.contig,
                record.locus.position,
                record.allele(allele)
            )?;
            writeln!(self.counts, "{}", tally.line(allele, d))?;
        }
        self.loci_written += 1;
        Ok(())
    }

    /// Append the population-order trailer and flush both outputs
    pub fn finish(mut self, registry: &GroupRegistry) -> Result<(L, C)> {
        write!(self.loci, "{}{}", POPULATION_ORDER_LABEL, self.delimiter)?;
        for group in registry.names() {
            write!(self.loci, "{}{}", group, self.delimiter)?;
        }
        writeln!(self.loci)?;

        self.loci.flush()?;
        self.counts.flush()?;
        log::debug!("Flushed {} loci to both outputs", self.loci_written);
        Ok((self.loci, self.counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::{Header, UnresolvedPolicy};
    use crate::record::validate;
    use crate::tally::{accumulate, MissingCallPolicy};
    use crate::tokenizer::tokenize;

    fn to_string(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_write_locus_keeps_outputs_aligned() {
        let header = Header::resolve(&["PopA1", "PopB1"], UnresolvedPolicy::Fatal).unwrap();
        let mut writer = LocusWriter::new(Vec::new(), Vec::new(), '\t');

        for line in [
            "chr1\t100\t.\tA\tG\t.\t.\t.\tGT\t0/0\t0/1",
            "chr2\t5\t.\tC\tT\t.\t.\t.\tGT\t1/1\t./.",
        ] {
            let fields = tokenize(line, '\t');
            let record = validate(&fields, &header).unwrap();
            let tally = accumulate(&record, &header, MissingCallPolicy::SkipSample);
            writer.write_locus(&record, &tally).unwrap();
        }

        let (loci, counts) = writer.finish(header.registry()).unwrap();
        assert_eq!(
            to_string(loci),
            "chr1\t100\tA\nchr1\t100\tG\nchr2\t5\tC\nchr2\t5\tT\n#Population order:\tPopA\tPopB\t\n"
        );
        assert_eq!(to_string(counts), "2\t1\t\n0\t1\t\n0\t0\t\n2\t0\t\n");
    }

    #[test]
    fn test_column_header_line() {
        let registry = GroupRegistry::from_names(["PopB", "PopA"]);
        let mut writer = LocusWriter::new(Vec::new(), Vec::new(), '\t');
        writer.write_column_header(&registry).unwrap();
        let (loci, counts) = writer.finish(&registry).unwrap();
        assert_eq!(
            to_string(loci),
            "contig\tposition\tallele\tPopA\tPopB\n#Population order:\tPopA\tPopB\t\n"
        );
        assert!(counts.is_empty());
    }
}
