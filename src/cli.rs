use crate::error::{BnvError, Result};
use crate::population::UnresolvedPolicy;
use crate::tally::MissingCallPolicy;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "bnvtools",
    version = "0.1.0",
    about = "Per-population allele counts from VCF files and FPKM matrices from CuffDiff output",
    long_about = r#"
bnvtools - genomics data wrangling utilities

encode:
  Reads a VCF file, groups sample columns into populations by the leading
  non-digit part of their names, and counts reference/alternate genotype
  calls per population for every bi-allelic locus.

  Output:
  - <input>.loci: contig, position and allele, two lines per locus (ref, alt),
    followed by a '#Population order:' line
  - <input>.counts: ref counts line and alt counts line per locus, one
    column per population in the order given by the .loci trailer

fpkm-matrix:
  Reads a CuffDiff read group tracking file and writes one line of FPKM
  values per gene, clustered by condition and ordered by replicate.

  Output:
  - <input>.matrix: gene followed by its FPKM values
  - <input>.key: gene followed by condition(replicate count) entries

Example:
  bnvtools encode --input samples.vcf --unidentifiable group
  bnvtools fpkm-matrix --cuffdiff genes.read_group_tracking --gene-list genes.txt
"#
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Encode per-population allele counts from a VCF file
    Encode(EncodeArgs),
    /// Extract an FPKM matrix from CuffDiff output
    FpkmMatrix(FpkmArgs),
}

#[derive(Args)]
pub struct EncodeArgs {
    /// Input VCF file
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: PathBuf,

    /// Locus list output (default: <input>.loci)
    #[arg(long = "loci-out", value_name = "FILE")]
    pub loci_out: Option<PathBuf>,

    /// Counts matrix output (default: <input>.counts)
    #[arg(long = "counts-out", value_name = "FILE")]
    pub counts_out: Option<PathBuf>,

    /// Handling of sample columns whose name has no leading non-digit prefix
    #[arg(long = "unidentifiable", value_enum, default_value_t = UnresolvedPolicy::Fatal)]
    pub unidentifiable: UnresolvedPolicy,

    /// Handling of genotypes with one missing call, such as 0/.
    #[arg(long = "missing-calls", value_enum, default_value_t = MissingCallPolicy::SkipSample)]
    pub missing_calls: MissingCallPolicy,

    /// Start the locus list with a column header line
    #[arg(long = "column-header")]
    pub column_header: bool,

    /// Overwrite existing output files
    #[arg(short = '9', long = "clobber")]
    pub clobber: bool,
}

impl EncodeArgs {
    pub fn loci_path(&self) -> PathBuf {
        self.loci_out
            .clone()
            .unwrap_or_else(|| derived_path(&self.input, "loci"))
    }

    pub fn counts_path(&self) -> PathBuf {
        self.counts_out
            .clone()
            .unwrap_or_else(|| derived_path(&self.input, "counts"))
    }
}

#[derive(Args)]
pub struct FpkmArgs {
    /// CuffDiff read group tracking file
    #[arg(short = 'c', long = "cuffdiff", value_name = "FILE")]
    pub cuffdiff: PathBuf,

    /// File listing genes of interest, one per line
    #[arg(short = 'g', long = "gene-list", value_name = "FILE")]
    pub gene_list: Option<PathBuf>,

    /// Matrix output (default: <cuffdiff>.matrix)
    #[arg(long = "matrix-out", value_name = "FILE")]
    pub matrix_out: Option<PathBuf>,

    /// Key output (default: <cuffdiff>.key)
    #[arg(long = "key-out", value_name = "FILE")]
    pub key_out: Option<PathBuf>,

    /// Overwrite existing output files
    #[arg(short = '9', long = "clobber")]
    pub clobber: bool,
}

impl FpkmArgs {
    pub fn matrix_path(&self) -> PathBuf {
        self.matrix_out
            .clone()
            .unwrap_or_else(|| derived_path(&self.cuffdiff, "matrix"))
    }

    pub fn key_path(&self) -> PathBuf {
        self.key_out
            .clone()
            .unwrap_or_else(|| derived_path(&self.cuffdiff, "key"))
    }
}

/// `<input>.<extension>`, appended rather than replacing any existing extension
pub fn derived_path(input: &Path, extension: &str) -> PathBuf {
    let mut path = input.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Refuse to replace existing outputs unless `clobber` is set
pub fn check_outputs(outputs: &[&Path], clobber: bool) -> Result<()> {
    for output in outputs {
        if output.exists() {
            if !clobber {
                return Err(BnvError::OutputExists {
                    path: output.display().to_string(),
                });
            }
            log::warn!("Overwriting existing output {}", output.display());
        }
    }
    Ok(())
}
