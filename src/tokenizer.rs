/// Field delimiter used by VCF and CuffDiff text files
pub const DEFAULT_DELIMITER: char = '\t';

/// What a raw VCF line is, decided from its comment markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `##` metadata, ignored
    Meta,
    /// Single `#` column header
    Header,
    /// Variant data row
    Data,
    Blank,
}

/// Classify a line that has already had its terminator trimmed
pub fn classify(line: &str) -> LineKind {
    if line.is_empty() {
        LineKind::Blank
    } else if line.starts_with("##") {
        LineKind::Meta
    } else if line.starts_with('#') {
        LineKind::Header
    } else {
        LineKind::Data
    }
}

/// Strip a trailing `\n` or `\r\n`
pub fn trim_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Split a record on `delimiter`, keeping empty fields.
///
/// The caller decides which fields are fixed columns and which are samples.
pub fn tokenize(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_empty_fields() {
        assert_eq!(tokenize("a\t\tb\t", '\t'), vec!["a", "", "b", ""]);
        assert_eq!(tokenize("", '\t'), vec![""]);
    }

    #[test]
    fn test_tokenize_custom_delimiter() {
        assert_eq!(tokenize("x,y", ','), vec!["x", "y"]);
    }

    #[test]
    fn test_trim_line_terminator() {
        assert_eq!(trim_line_terminator("chr1\t100\n"), "chr1\t100");
        assert_eq!(trim_line_terminator("chr1\t100\r\n"), "chr1\t100");
        assert_eq!(trim_line_terminator("chr1\t100"), "chr1\t100");
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("##fileformat=VCFv4.2"), LineKind::Meta);
        assert_eq!(classify("#CHROM\tPOS"), LineKind::Header);
        assert_eq!(classify("chr1\t100"), LineKind::Data);
        assert_eq!(classify(""), LineKind::Blank);
    }
}
