use crate::error::Result;
use crate::fpkm::FpkmTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct FpkmWriter {
    matrix_path: PathBuf,
    key_path: PathBuf,
}

impl FpkmWriter {
    pub fn new(matrix_path: &Path, key_path: &Path) -> Self {
        Self {
            matrix_path: matrix_path.to_path_buf(),
            key_path: key_path.to_path_buf(),
        }
    }

    /// Write the expression matrix and its key, one line per gene in each
    pub fn write(&self, table: &FpkmTable) -> Result<()> {
        log::info!("Writing FPKM matrix for {} genes", table.n_genes());

        let mut matrix = BufWriter::new(File::create(&self.matrix_path)?);
        write_matrix(table, &mut matrix)?;
        matrix.flush()?;
        log::debug!("Written {} matrix lines to {}", table.n_genes(), self.matrix_path.display());

        let mut key = BufWriter::new(File::create(&self.key_path)?);
        write_key(table, &mut key)?;
        key.flush()?;
        log::debug!("Written {} key lines to {}", table.n_genes(), self.key_path.display());

        log::info!("FPKM files created successfully:");
        log::info!("  1. {} - values per gene, by condition then replicate", self.matrix_path.display());
        log::info!("  2. {} - conditions and replicate counts per gene", self.key_path.display());
        Ok(())
    }
}

/// Shortest round-trip form of an FPKM value.
///
/// Exponents from -4 to 15 print as a decimal that always keeps a fractional
/// part (`3.0`, `0.125`). Outside that range the mantissa is followed by a
/// signed exponent of at least two digits (`1e-05`, `2.5e+16`).
pub fn format_fpkm(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() || value == 0.0 {
        return format!("{:?}", value);
    }

    let scientific = format!("{:e}", value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return format!("{:?}", value);
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return format!("{:?}", value);
    };

    if (-4..16).contains(&exponent) {
        format!("{:?}", value)
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// `gene<TAB>v1<TAB>v2...` for every gene
pub fn write_matrix<W: Write>(table: &FpkmTable, writer: &mut W) -> Result<()> {
    for gene in table.genes() {
        write!(writer, "{}", gene.gene)?;
        for value in gene.values() {
            write!(writer, "\t{}", format_fpkm(value))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// `gene<TAB>condition(N)...` for every gene
pub fn write_key<W: Write>(table: &FpkmTable, writer: &mut W) -> Result<()> {
    for gene in table.genes() {
        write!(writer, "{}", gene.gene)?;
        for entry in gene.key_entries() {
            write!(writer, "\t{}", entry)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fpkm::read_cuffdiff;
    use std::io::Cursor;
    use tempfile::tempdir;

    const TRACKING: &str = "GENE_B\tq1\t1\t0\t0\t0\t2.5\t-\tOK\n\
GENE_B\tq1\t0\t0\t0\t0\t0\t-\tOK\n\
GENE_A\tq2\t0\t0\t0\t0\t12\t-\tOK\n\
GENE_B\tq2\t0\t0\t0\t0\t0.125\t-\tOK\n";

    #[test]
    fn test_format_fpkm() {
        assert_eq!(format_fpkm(0.0), "0.0");
        assert_eq!(format_fpkm(12.0), "12.0");
        assert_eq!(format_fpkm(0.125), "0.125");
        assert_eq!(format_fpkm(0.0001), "0.0001");
        assert_eq!(format_fpkm(1e15), "1000000000000000.0");
    }

    #[test]
    fn test_format_fpkm_exponent_range() {
        assert_eq!(format_fpkm(0.00001), "1e-05");
        assert_eq!(format_fpkm(0.000025), "2.5e-05");
        assert_eq!(format_fpkm(1e16), "1e+16");
        assert_eq!(format_fpkm(1.5e120), "1.5e+120");
        assert_eq!(format_fpkm(-3e-7), "-3e-07");
        assert_eq!(format_fpkm(f64::INFINITY), "inf");
        assert_eq!(format_fpkm(f64::NAN), "nan");
    }

    #[test]
    fn test_matrix_keeps_tiny_values() {
        let input = "G\tc\t0\t0\t0\t0\t0.00001\t-\tOK\nG\tc\t1\t0\t0\t0\t1.5\t-\tOK\n";
        let (table, _) = read_cuffdiff(Cursor::new(input), None).unwrap();
        let mut matrix = Vec::new();
        write_matrix(&table, &mut matrix).unwrap();
        assert_eq!(String::from_utf8(matrix).unwrap(), "G\t1e-05\t1.5\n");
    }

    #[test]
    fn test_matrix_and_key_lines() {
        let (table, _) = read_cuffdiff(Cursor::new(TRACKING), None).unwrap();

        let mut matrix = Vec::new();
        write_matrix(&table, &mut matrix).unwrap();
        assert_eq!(
            String::from_utf8(matrix).unwrap(),
            "GENE_B\t0.0\t2.5\t0.125\nGENE_A\t12.0\n"
        );

        let mut key = Vec::new();
        write_key(&table, &mut key).unwrap();
        assert_eq!(String::from_utf8(key).unwrap(), "GENE_B\tq1(2)\tq2(1)\nGENE_A\tq2(1)\n");
    }

    #[test]
    fn test_write_files() {
        let dir = tempdir().unwrap();
        let matrix_path = dir.path().join("genes.matrix");
        let key_path = dir.path().join("genes.key");
        let (table, _) = read_cuffdiff(Cursor::new(TRACKING), None).unwrap();

        FpkmWriter::new(&matrix_path, &key_path).write(&table).unwrap();

        let matrix = std::fs::read_to_string(&matrix_path).unwrap();
        let key = std::fs::read_to_string(&key_path).unwrap();
        assert_eq!(matrix.lines().count(), 2);
        assert_eq!(key.lines().count(), 2);
        assert!(key.starts_with("GENE_B\tq1(2)"));
    }
}
