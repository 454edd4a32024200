//! Read options.

use crate::filter::{CompiledFilter, FilterSpec};
use crate::types::normalize_name;

/// Shape of the rows a read produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowFormat {
    /// Values in column order.
    #[default]
    Array,
    /// Name/value pairs in column order.
    Object,
}

/// Options controlling a row read.
///
/// Built with chained `with_*` calls:
///
/// ```
/// use xport_core::{ReadOptions, RowFormat};
///
/// let options = ReadOptions::new()
///     .with_row_format(RowFormat::Object)
///     .with_keep(["POP", "SEEDWT"])
///     .with_round_precision(2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Only read the member with this name (case-insensitive). None
    /// reads whatever member the file carries.
    pub dataset: Option<String>,
    /// Row shape.
    pub row_format: RowFormat,
    /// Columns to emit, case-insensitive. Empty keeps all columns.
    pub keep: Vec<String>,
    /// Suppress the leading header pseudo-row.
    pub skip_header: bool,
    /// Text encoding label for character columns (an `encoding_rs`
    /// label such as "windows-1252"). None decodes bytes one-to-one.
    pub encoding: Option<String>,
    /// Round numeric values to this many decimal places.
    pub round_precision: Option<u32>,
    /// Declarative row filter, compiled against member metadata when
    /// the read starts.
    pub filter: Option<FilterSpec>,
    /// Pre-compiled row predicate. Takes precedence over `filter`.
    pub predicate: Option<CompiledFilter>,
    /// Number of accepted rows to skip before emitting.
    pub start: usize,
    /// Maximum number of rows to emit. None reads to the end.
    pub length: Option<usize>,
}

impl ReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    #[must_use]
    pub fn with_row_format(mut self, row_format: RowFormat) -> Self {
        self.row_format = row_format;
        self
    }

    #[must_use]
    pub fn with_keep<I, S>(mut self, keep: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep = keep.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn skip_header(mut self) -> Self {
        self.skip_header = true;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_round_precision(mut self, precision: u32) -> Self {
        self.round_precision = Some(precision);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn with_predicate(mut self, predicate: CompiledFilter) -> Self {
        self.predicate = Some(predicate);
        self
    }

    #[must_use]
    pub fn with_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// True when the requested dataset matches `name`, ignoring case.
    /// No requested dataset matches everything.
    #[must_use]
    pub(crate) fn dataset_matches(&self, name: &str) -> bool {
        self.dataset
            .as_deref()
            .is_none_or(|wanted| normalize_name(wanted) == normalize_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ReadOptions::new();
        assert_eq!(options.row_format, RowFormat::Array);
        assert!(options.keep.is_empty());
        assert!(!options.skip_header);
        assert_eq!(options.start, 0);
        assert!(options.length.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let options = ReadOptions::new()
            .with_dataset("seed")
            .with_row_format(RowFormat::Object)
            .with_keep(["POP"])
            .skip_header()
            .with_round_precision(2)
            .with_start(5)
            .with_length(10);
        assert_eq!(options.dataset.as_deref(), Some("seed"));
        assert_eq!(options.row_format, RowFormat::Object);
        assert_eq!(options.keep, vec!["POP"]);
        assert!(options.skip_header);
        assert_eq!(options.round_precision, Some(2));
        assert_eq!(options.start, 5);
        assert_eq!(options.length, Some(10));
    }

    #[test]
    fn test_dataset_matches_ignores_case() {
        let options = ReadOptions::new().with_dataset("Seed");
        assert!(options.dataset_matches("SEED"));
        assert!(!options.dataset_matches("DM"));
        assert!(ReadOptions::new().dataset_matches("ANYTHING"));
    }
}
