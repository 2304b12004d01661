use crate::error::{BnvError, Result};
use csv::ReaderBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::time::Instant;

/// tracking_id, condition, replicate, raw_frags, internal_scaled_frags,
/// external_scaled_frags, FPKM, effective_length, status
pub const CUFFDIFF_COLUMNS: usize = 9;

const TRACKING_ID: usize = 0;
const CONDITION: usize = 1;
const REPLICATE: usize = 2;
const FPKM: usize = 6;

/// Marks a CuffDiff header line
const HEADER_MARKER: &str = "tracking_id";

/// One expression value from a CuffDiff read-group tracking file
#[derive(Debug, Clone, PartialEq)]
pub struct FpkmRecord {
    pub tracking_id: String,
    pub condition: String,
    pub replicate: u32,
    pub fpkm: f64,
}

impl FpkmRecord {
    fn from_fields(record: &csv::StringRecord, line: u64) -> Result<Self> {
        if record.len() < CUFFDIFF_COLUMNS {
            return Err(BnvError::InvalidFormat(format!(
                "line {} has {} values, expected at least {}",
                line,
                record.len(),
                CUFFDIFF_COLUMNS
            )));
        }

        let replicate_str = &record[REPLICATE];
        let replicate = replicate_str.trim().parse().map_err(|_| {
            BnvError::InvalidFormat(format!("Invalid replicate '{}' on line {}", replicate_str, line))
        })?;

        let fpkm_str = &record[FPKM];
        let fpkm = fpkm_str.trim().parse().map_err(|_| {
            BnvError::InvalidFormat(format!("Invalid FPKM value '{}' on line {}", fpkm_str, line))
        })?;

        Ok(Self {
            tracking_id: record[TRACKING_ID].to_string(),
            condition: record[CONDITION].to_string(),
            replicate,
            fpkm,
        })
    }
}

/// Replicate values of one condition, ordered by replicate index
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionReplicates {
    pub condition: String,
    pub replicates: BTreeMap<u32, f64>,
}

/// All values of one gene, conditions in first-seen order
#[derive(Debug, Clone, PartialEq)]
pub struct GeneExpression {
    pub gene: String,
    pub conditions: Vec<ConditionReplicates>,
}

impl GeneExpression {
    fn new(gene: &str) -> Self {
        Self {
            gene: gene.to_string(),
            conditions: Vec::new(),
        }
    }

    fn insert(&mut self, condition: &str, replicate: u32, fpkm: f64) {
        let position = match self.conditions.iter().position(|c| c.condition == condition) {
            Some(position) => position,
            None => {
                self.conditions.push(ConditionReplicates {
                    condition: condition.to_string(),
                    replicates: BTreeMap::new(),
                });
                self.conditions.len() - 1
            }
        };
        // A repeated replicate keeps the last value seen
        self.conditions[position].replicates.insert(replicate, fpkm);
    }

    /// Matrix values: by condition, then by ascending replicate
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.conditions
            .iter()
            .flat_map(|c| c.replicates.values().copied())
    }

    /// Key entries such as `treated(3)`
    pub fn key_entries(&self) -> impl Iterator<Item = String> + '_ {
        self.conditions
            .iter()
            .map(|c| format!("{}({})", c.condition, c.replicates.len()))
    }
}

/// Genes in first-seen order
#[derive(Debug, Clone, Default)]
pub struct FpkmTable {
    genes: Vec<GeneExpression>,
    index: HashMap<String, usize>,
}

impl FpkmTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: &FpkmRecord) {
        let idx = match self.index.get(&record.tracking_id) {
            Some(&idx) => idx,
            None => {
                self.genes.push(GeneExpression::new(&record.tracking_id));
                self.index
                    .insert(record.tracking_id.clone(), self.genes.len() - 1);
                self.genes.len() - 1
            }
        };
        self.genes[idx].insert(&record.condition, record.replicate, record.fpkm);
    }

    pub fn genes(&self) -> &[GeneExpression] {
        &self.genes
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FpkmSummary {
    pub lines_read: u64,
    pub rows_kept: u64,
    pub rows_filtered: u64,
    pub genes: usize,
}

/// Read a gene-of-interest list, one gene per line
pub fn load_gene_list(path: &Path) -> Result<HashSet<String>> {
    if !path.exists() {
        return Err(BnvError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let genes = parse_gene_list(BufReader::new(File::open(path)?))?;
    log::info!("Loaded {} genes of interest from {}", genes.len(), path.display());
    Ok(genes)
}

pub fn parse_gene_list<R: BufRead>(reader: R) -> Result<HashSet<String>> {
    let mut genes = HashSet::new();
    for line in reader.lines() {
        let line = line?;
        let gene = line.trim();
        if !gene.is_empty() {
            genes.insert(gene.to_string());
        }
    }
    Ok(genes)
}

/// Load a CuffDiff read-group tracking file into an `FpkmTable`
pub fn read_cuffdiff_file(path: &Path, allowlist: Option<&HashSet<String>>) -> Result<(FpkmTable, FpkmSummary)> {
    if !path.exists() {
        return Err(BnvError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    read_cuffdiff(File::open(path)?, allowlist)
}

pub fn read_cuffdiff<R: Read>(reader: R, allowlist: Option<&HashSet<String>>) -> Result<(FpkmTable, FpkmSummary)> {
    let start_time = Instant::now();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Reading CuffDiff output...");

    let mut table = FpkmTable::new();
    let mut summary = FpkmSummary::default();

    for result in reader.records() {
        let record = result?;
        summary.lines_read += 1;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(summary.lines_read);

        if summary.lines_read % 1000 == 0 {
            pb.set_message(format!("Processed {} lines", summary.lines_read));
            pb.tick();
        }

        if record.iter().any(|field| field.contains(HEADER_MARKER)) {
            continue;
        }

        let fpkm_record = FpkmRecord::from_fields(&record, line)?;
        if let Some(allowlist) = allowlist {
            if !allowlist.contains(&fpkm_record.tracking_id) {
                summary.rows_filtered += 1;
                continue;
            }
        }

        table.insert(&fpkm_record);
        summary.rows_kept += 1;
    }

    summary.genes = table.n_genes();
    pb.finish_with_message(format!("Processed {} lines", summary.lines_read));
    log::info!(
        "Read {} lines in {:.2} seconds: {} values kept for {} genes, {} filtered out",
        summary.lines_read,
        start_time.elapsed().as_secs_f64(),
        summary.rows_kept,
        summary.genes,
        summary.rows_filtered
    );

    Ok((table, summary))
}
