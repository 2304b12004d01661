use anyhow::Result;
use clap::Parser;

mod cli;
mod encoder;
mod error;
mod fpkm;
mod fpkm_writer;
mod genotype;
mod locus_writer;
mod population;
mod record;
mod tally;
mod tokenizer;

use cli::{check_outputs, Cli, Command, EncodeArgs, FpkmArgs};
use encoder::{Encoder, EncoderConfig};
use fpkm_writer::FpkmWriter;
use tokenizer::DEFAULT_DELIMITER;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Encode(args) => run_encode(&args),
        Command::FpkmMatrix(args) => run_fpkm_matrix(&args),
    }
}

fn run_encode(args: &EncodeArgs) -> Result<()> {
    let loci_path = args.loci_path();
    let counts_path = args.counts_path();

    log::info!("=== BNV Allele Count Encoder ===");
    log::info!("Input file: {}", args.input.display());
    log::info!("Locus list: {}", loci_path.display());
    log::info!("Counts matrix: {}", counts_path.display());

    check_outputs(&[loci_path.as_path(), counts_path.as_path()], args.clobber)?;

    let encoder = Encoder::new(EncoderConfig {
        unresolved: args.unidentifiable,
        missing_calls: args.missing_calls,
        column_header: args.column_header,
        delimiter: DEFAULT_DELIMITER,
    });
    let summary = encoder.encode_file(&args.input, &loci_path, &counts_path)?;

    log::info!("=== SUCCESS ===");
    log::info!("Total lines processed: {}", summary.lines_read);
    log::info!("Loci encoded: {}", summary.loci_accepted);
    log::info!("Loci skipped: {}", summary.loci_skipped());

    Ok(())
}

fn run_fpkm_matrix(args: &FpkmArgs) -> Result<()> {
    let matrix_path = args.matrix_path();
    let key_path = args.key_path();

    log::info!("=== FPKM Matrix Extractor ===");
    log::info!("CuffDiff file: {}", args.cuffdiff.display());

    let allowlist = match &args.gene_list {
        Some(path) => Some(fpkm::load_gene_list(path)?),
        None => {
            log::info!("No gene of interest list set");
            None
        }
    };

    check_outputs(&[matrix_path.as_path(), key_path.as_path()], args.clobber)?;

    let (table, summary) = fpkm::read_cuffdiff_file(&args.cuffdiff, allowlist.as_ref())?;
    FpkmWriter::new(&matrix_path, &key_path).write(&table)?;

    log::info!("=== SUCCESS ===");
    log::info!("Total lines processed: {}", summary.lines_read);
    log::info!("Genes written: {}", summary.genes);

    Ok(())
}
