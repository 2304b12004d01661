use crate::error::{BnvError, Result};
use crate::locus_writer::LocusWriter;
use crate::population::{Header, UnresolvedPolicy};
use crate::record::{validate, RowRejection};
use crate::tally::{accumulate, MissingCallPolicy};
use crate::tokenizer::{classify, tokenize, trim_line_terminator, LineKind, DEFAULT_DELIMITER};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::time::Instant;

/// Options for one encoder run
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub unresolved: UnresolvedPolicy,
    pub missing_calls: MissingCallPolicy,
    /// Also write a `contig position allele groups...` line before the loci
    pub column_header: bool,
    pub delimiter: char,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            unresolved: UnresolvedPolicy::Fatal,
            missing_calls: MissingCallPolicy::default(),
            column_header: false,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    pub lines_read: u64,
    pub loci_accepted: u64,
    pub skipped_column_count: u64,
    pub skipped_multi_allelic: u64,
    /// Genotype calls added to the counts matrix over all loci
    pub calls_counted: u64,
    /// Counts-matrix column order
    pub groups: Vec<String>,
}

impl EncodeSummary {
    pub fn loci_skipped(&self) -> u64 {
        self.skipped_column_count + self.skipped_multi_allelic
    }

    fn record_rejection(&mut self, rejection: &RowRejection) {
        match rejection {
            RowRejection::ColumnCount { .. } => self.skipped_column_count += 1,
            RowRejection::MultiAllelic { .. } => self.skipped_multi_allelic += 1,
        }
    }
}

pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Encode a VCF file into a locus list and a counts matrix
    pub fn encode_file(&self, input: &Path, loci_path: &Path, counts_path: &Path) -> Result<EncodeSummary> {
        if !input.exists() {
            return Err(BnvError::FileNotFound {
                path: input.display().to_string(),
            });
        }

        let file_size = std::fs::metadata(input)?.len();
        log::info!("File size: {:.2} MB", file_size as f64 / (1024.0 * 1024.0));

        let reader = BufReader::new(File::open(input)?);
        let writer = LocusWriter::create(loci_path, counts_path, self.config.delimiter)?;
        let (summary, _, _) = self.encode(reader, writer)?;

        log::info!("Locus list written to {}", loci_path.display());
        log::info!("Counts matrix written to {}", counts_path.display());
        Ok(summary)
    }

    /// Single forward pass: header once, then one validate/tally/write step per row.
    ///
    /// Returns the run summary along with the writer's underlying outputs.
    pub fn encode<R, L, C>(&self, mut reader: R, mut writer: LocusWriter<L, C>) -> Result<(EncodeSummary, L, C)>
    where
        R: BufRead,
        L: Write,
        C: Write,
    {
        let start_time = Instant::now();
        let delimiter = self.config.delimiter;

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Reading VCF...");

        let mut summary = EncodeSummary::default();
        let mut header: Option<Header> = None;
        let mut buf = String::new();

        loop {
            buf.clear();
            if reader.read_line(&mut buf)? == 0 {
                break;
            }
            summary.lines_read += 1;
            if summary.lines_read % 1000 == 0 {
                pb.set_message(format!("Processed {} lines", summary.lines_read));
                pb.tick();
            }

            let line = trim_line_terminator(&buf);
            match classify(line) {
                LineKind::Blank | LineKind::Meta => continue,
                LineKind::Header => {
                    if header.is_some() {
                        return Err(BnvError::InvalidFormat(format!(
                            "second header line found at line {}",
                            summary.lines_read
                        )));
                    }
                    let fields = tokenize(line, delimiter);
                    let parsed = Header::parse(&fields, self.config.unresolved)?;
                    log::info!(
                        "Found {} sample columns in {} groups: {}",
                        parsed.n_samples(),
                        parsed.registry().len(),
                        parsed.registry().names().join(", ")
                    );
                    log::info!("Unresolved sample columns: {}", parsed.policy().describe());
                    for (column, name) in parsed.sample_columns().iter().enumerate() {
                        log::debug!("{} -> {}", name, parsed.group_of(column).unwrap_or("<none>"));
                    }
                    if parsed.registry().is_empty() {
                        log::warn!("No population groups found in header; counts lines will be empty");
                    } else if parsed.n_unresolved() > 0 {
                        log::info!("{} sample columns have no group and are ignored", parsed.n_unresolved());
                    }
                    if self.config.column_header {
                        writer.write_column_header(parsed.registry())?;
                    }
                    header = Some(parsed);
                }
                LineKind::Data => {
                    let header = header.as_ref().ok_or(BnvError::MissingHeader)?;
                    let fields = tokenize(line, delimiter);
                    match validate(&fields, header) {
                        Ok(record) => {
                            let tally = accumulate(&record, header, self.config.missing_calls);
                            writer.write_locus(&record, &tally)?;
                            summary.loci_accepted += 1;
                            summary.calls_counted += u64::from(tally.total());
                        }
                        Err(rejection) => {
                            log::warn!("{}", rejection);
                            summary.record_rejection(&rejection);
                        }
                    }
                }
            }
        }

        let header = header.ok_or(BnvError::MissingHeader)?;
        summary.groups = header.registry().names().to_vec();
        let (loci, counts) = writer.finish(header.registry())?;

        pb.finish_with_message(format!("Processed {} lines", summary.lines_read));
        log::info!(
            "Encoding completed in {:.2} seconds",
            start_time.elapsed().as_secs_f64()
        );
        log::info!(
            "Accepted {} loci, skipped {} ({} column count, {} multi-allelic)",
            summary.loci_accepted,
            summary.loci_skipped(),
            summary.skipped_column_count,
            summary.skipped_multi_allelic
        );
        log::info!("Genotype calls counted: {}", summary.calls_counted);
        log::info!("Population order: {}", summary.groups.join(", "));

        Ok((summary, loci, counts))
    }
}
