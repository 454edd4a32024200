//! Library orchestrator: lazily parses the file headers once, then
//! serves metadata and row reads off the cached layout.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use serde::Serialize;
use tracing::debug;

use crate::cursor::RowCursor;
use crate::error::{Result, XportError};
use crate::filter::CompiledFilter;
use crate::header::{
    LibraryHeader, MEMBER_HEADER_PREFIX, RECORD_LEN, obs_sentinel_pattern, parse_library_header,
};
use crate::types::{
    DatasetMetadata, Member, ReadOptions, Row, RowFormat, SourceSystem, Value, VariableMetadata,
    normalize_name,
};

/// A page of buffered rows from [`Library::get_data`].
#[derive(Debug, Clone, Serialize)]
pub struct DataPage {
    pub rows: Vec<Row>,
    /// Index of the last observation visited in the file, counting
    /// every row walked including filtered-out ones.
    pub last_index: u64,
    /// True when the data ended before the row cap was hit.
    pub end_reached: bool,
}

/// Options for [`Library::get_unique_values`].
#[derive(Debug, Clone, Default)]
pub struct UniqueOptions {
    /// Columns to collect, case-insensitive.
    pub columns: Vec<String>,
    /// Per-column cap on distinct values; 0 collects all.
    pub limit: usize,
    /// Also count occurrences per distinct value.
    pub add_count: bool,
    /// Sort each column's values instead of first-seen order.
    pub sort: bool,
}

impl UniqueOptions {
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub fn with_counts(mut self) -> Self {
        self.add_count = true;
        self
    }

    #[must_use]
    pub fn sorted(mut self) -> Self {
        self.sort = true;
        self
    }
}

/// Distinct values collected for one column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnValues {
    /// Distinct values, first-seen order unless sorting was requested.
    pub values: Vec<Value>,
    /// Occurrence counts keyed by the value's string form; missing
    /// values count under the literal key "null".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<HashMap<String, u64>>,
}

/// Unique-value results keyed by the requested column name.
pub type UniqueValues = HashMap<String, ColumnValues>;

/// A transport file on disk.
///
/// Construction is cheap; the header and member layout parse on the
/// first call that needs them and stay cached. Each row read opens its
/// own file handle, so cursors are independent of each other.
pub struct Library {
    path: PathBuf,
    header: Option<LibraryHeader>,
    member: Option<Member>,
    file_size: u64,
}

impl Library {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header: None,
            member: None,
            file_size: 0,
        }
    }

    /// The file path this library reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<File> {
        File::open(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                XportError::FileNotFound {
                    path: self.path.clone(),
                }
            } else {
                e.into()
            }
        })
    }

    /// Parse the library header and member layout, once.
    ///
    /// Scans the record stream for member header and OBS sentinel
    /// records; when a file carries several members only the last one
    /// is kept, a deliberate limitation of this reader.
    fn ensure_parsed(&mut self) -> Result<()> {
        if self.member.is_some() {
            return Ok(());
        }

        let mut file = self.open()?;
        self.file_size = file.metadata()?.len();

        let mut head = [0u8; 3 * RECORD_LEN];
        file.read_exact(&mut head).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                XportError::invalid_format("file truncated before library header completes")
            } else {
                e.into()
            }
        })?;
        let header = parse_library_header(&head)?;

        file.seek(SeekFrom::Start(0))?;
        let obs_pattern = obs_sentinel_pattern();
        let (member_offsets, obs_offsets) = scan_sentinels(
            BufReader::new(file),
            MEMBER_HEADER_PREFIX.as_bytes(),
            &obs_pattern,
        )?;

        let member_offset = *member_offsets.last().ok_or_else(|| {
            XportError::missing_header("MEMBER HEADER")
        })?;
        let obs_offset = obs_offsets
            .iter()
            .copied()
            .find(|&offset| offset > member_offset)
            .ok_or_else(|| XportError::missing_header("OBS HEADER"))?;
        let obs_start = obs_offset + RECORD_LEN as u64;

        let mut file = self.open()?;
        file.seek(SeekFrom::Start(member_offset))?;
        let mut block = vec![0u8; (obs_offset - member_offset) as usize];
        file.read_exact(&mut block)?;
        let member = Member::parse(&block, obs_start)?;

        debug!(
            path = %self.path.display(),
            member = %member.name,
            obs_start,
            "parsed transport file layout"
        );

        self.header = Some(header);
        self.member = Some(member);
        Ok(())
    }

    /// File-level header metadata.
    pub fn header(&mut self) -> Result<&LibraryHeader> {
        self.ensure_parsed()?;
        self.header
            .as_ref()
            .ok_or_else(|| XportError::missing_header("LIBRARY HEADER"))
    }

    /// The parsed member.
    pub fn member(&mut self) -> Result<&Member> {
        self.ensure_parsed()?;
        self.member
            .as_ref()
            .ok_or_else(|| XportError::missing_header("MEMBER HEADER"))
    }

    /// Per-variable metadata in declared column order.
    pub fn get_metadata(&mut self) -> Result<Vec<VariableMetadata>> {
        self.ensure_parsed()?;
        let member = self.member()?;
        let dataset = member.name.clone();
        Ok(member
            .ordered_variables()
            .map(|variable| VariableMetadata::from_variable(&dataset, variable))
            .collect())
    }

    /// Dataset-level metadata in a dataset-JSON-like shape, including
    /// the estimated record count.
    pub fn get_dataset_metadata(&mut self) -> Result<DatasetMetadata> {
        self.ensure_parsed()?;
        let header = self.header.clone().unwrap_or_default();
        let source_system = SourceSystem {
            name: match (header.sas_symbol.is_empty(), header.os_name.is_empty()) {
                (false, false) => format!("{} on {}", header.sas_symbol, header.os_name),
                (false, true) => header.sas_symbol.clone(),
                _ => header.os_name.clone(),
            },
            version: header.sas_version,
        };
        let file_size = self.file_size;
        let member = self.member()?;
        Ok(DatasetMetadata::from_member(member, source_system, file_size))
    }

    /// Open a lazy row cursor over the member's observations.
    ///
    /// The cursor owns its file handle; dropping it closes the file.
    pub fn read(&mut self, options: ReadOptions) -> Result<RowCursor> {
        self.ensure_parsed()?;
        let member = self
            .member
            .as_ref()
            .ok_or_else(|| XportError::missing_header("MEMBER HEADER"))?;
        if !options.dataset_matches(&member.name) {
            return Err(XportError::invalid_format(format!(
                "dataset not present in file: {}",
                options.dataset.as_deref().unwrap_or_default()
            )));
        }

        let encoding = match &options.encoding {
            Some(label) => Some(Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                XportError::UnknownEncoding {
                    label: label.clone(),
                }
            })?),
            None => None,
        };
        let predicate = match (&options.predicate, &options.filter) {
            (Some(predicate), _) => Some(predicate.clone()),
            (None, Some(spec)) => Some(CompiledFilter::compile(spec, member)?),
            (None, None) => None,
        };

        let mut file = self.open()?;
        file.seek(SeekFrom::Start(member.obs_start))?;
        Ok(RowCursor::new(file, member, options, encoding, predicate))
    }

    /// Read a buffered page of rows.
    ///
    /// `options.start` skips that many accepted rows, `options.length`
    /// caps the page size. The returned page records how far into the
    /// file the read got so a caller can resume.
    pub fn get_data(&mut self, options: ReadOptions) -> Result<DataPage> {
        let options = ReadOptions {
            skip_header: true,
            ..options
        };
        let mut cursor = self.read(options)?;
        let mut rows = Vec::new();
        for row in cursor.by_ref() {
            rows.push(row?);
        }
        Ok(DataPage {
            rows,
            last_index: cursor.rows_visited(),
            end_reached: cursor.finished(),
        })
    }

    /// Collect distinct values for the requested columns.
    ///
    /// All names resolve against the member before any data is read;
    /// unresolved names error together. With a limit, a column stops
    /// collecting once it holds `limit` distinct values and the scan
    /// stops early when every column is capped.
    pub fn get_unique_values(&mut self, options: &UniqueOptions) -> Result<UniqueValues> {
        self.ensure_parsed()?;
        let member = self
            .member
            .as_ref()
            .ok_or_else(|| XportError::missing_header("MEMBER HEADER"))?;

        let mut missing = Vec::new();
        for name in &options.columns {
            if member.variable(name).is_none() {
                missing.push(name.clone());
            }
        }
        if !missing.is_empty() {
            return Err(XportError::ColumnsNotFound { names: missing });
        }

        // Projection order is declared column order; map each requested
        // name to its slot in the projected row.
        let kept: Vec<&str> = member
            .variable_order
            .iter()
            .filter(|name| {
                options
                    .columns
                    .iter()
                    .any(|wanted| normalize_name(wanted) == normalize_name(name))
            })
            .map(String::as_str)
            .collect();
        let slots: Vec<usize> = options
            .columns
            .iter()
            .map(|wanted| {
                kept.iter()
                    .position(|name| normalize_name(name) == normalize_name(wanted))
                    .unwrap_or_default()
            })
            .collect();

        let read_options = ReadOptions::new()
            .with_keep(options.columns.clone())
            .with_row_format(RowFormat::Array)
            .skip_header();
        let cursor = self.read(read_options)?;

        let mut collected: Vec<(Vec<Value>, HashSet<String>, HashMap<String, u64>)> =
            options.columns.iter().map(|_| Default::default()).collect();

        for row in cursor {
            let Row::Array(values) = row? else {
                continue;
            };
            let mut all_capped = true;
            for (slot, (uniques, seen, counts)) in slots.iter().zip(collected.iter_mut()) {
                let Some(value) = values.get(*slot) else {
                    continue;
                };
                let key = value.count_key();
                let capped = options.limit > 0 && uniques.len() >= options.limit;
                if !capped && seen.insert(key.clone()) {
                    uniques.push(value.clone());
                }
                if options.add_count && seen.contains(&key) {
                    *counts.entry(key).or_insert(0) += 1;
                }
                if !(options.limit > 0 && uniques.len() >= options.limit) {
                    all_capped = false;
                }
            }
            if options.limit > 0 && all_capped && !options.add_count {
                break;
            }
        }

        let mut result = UniqueValues::with_capacity(options.columns.len());
        for (name, (mut uniques, _, counts)) in options.columns.iter().zip(collected) {
            if options.sort {
                uniques.sort_by(compare_values);
            }
            result.insert(
                name.clone(),
                ColumnValues {
                    values: uniques,
                    counts: options.add_count.then_some(counts),
                },
            );
        }
        Ok(result)
    }

    /// Export the member to `<NAME>.csv` under `out_dir`.
    ///
    /// Quoting is minimal: fields quote only on embedded commas or
    /// quotes, with quotes doubled. Missing values render empty.
    /// Returns the paths written; a dataset filter that excludes the
    /// member writes nothing.
    pub fn to_csv(&mut self, out_dir: &Path, options: ReadOptions) -> Result<Vec<PathBuf>> {
        self.ensure_parsed()?;
        let member = self
            .member
            .as_ref()
            .ok_or_else(|| XportError::missing_header("MEMBER HEADER"))?;
        if !options.dataset_matches(&member.name) {
            return Ok(Vec::new());
        }
        let member_name = member.name.clone();

        let write_header = !options.skip_header;
        let read_options = ReadOptions {
            skip_header: true,
            row_format: RowFormat::Array,
            ..options
        };
        let keep: Vec<String> = read_options.keep.iter().map(|n| normalize_name(n)).collect();
        let header_names: Vec<String> = self
            .member()?
            .ordered_variables()
            .filter(|variable| keep.is_empty() || keep.contains(&normalize_name(&variable.name)))
            .map(|variable| variable.name.clone())
            .collect();

        let cursor = self.read(read_options)?;

        std::fs::create_dir_all(out_dir)?;
        let out_path = out_dir.join(format!("{member_name}.csv"));
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Necessary)
            .from_path(&out_path)?;

        if write_header {
            writer.write_record(&header_names)?;
        }
        for row in cursor {
            let row = row?;
            writer.write_record(row.values().map(Value::csv_field))?;
        }
        writer.flush()?;

        debug!(path = %out_path.display(), "wrote CSV export");
        Ok(vec![out_path])
    }
}

/// Sort distinct values: missing first, then numbers ascending, then
/// strings lexically. Mixed types compare equal so the sort is stable.
fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Value::Missing, Value::Missing) => Ordering::Equal,
        (Value::Missing, _) => Ordering::Less,
        (_, Value::Missing) => Ordering::Greater,
        (Value::Num(x), Value::Num(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Char(x), Value::Char(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// One forward pass over the record stream collecting the offsets of
/// every member header record and every OBS sentinel record.
fn scan_sentinels<R: Read>(
    mut reader: R,
    member_pattern: &[u8],
    obs_pattern: &[u8],
) -> Result<(Vec<u64>, Vec<u64>)> {
    const CHUNK: usize = 64 * 1024;
    let overlap = obs_pattern.len().max(member_pattern.len()) - 1;

    let mut member_offsets = Vec::new();
    let mut obs_offsets = Vec::new();
    let mut buf = Vec::with_capacity(CHUNK + overlap);
    let mut base: u64 = 0;

    loop {
        let mut chunk = vec![0u8; CHUNK];
        let n = read_some(&mut reader, &mut chunk)?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        find_all(&buf, member_pattern, base, &mut member_offsets);
        find_all(&buf, obs_pattern, base, &mut obs_offsets);

        if buf.len() > overlap {
            let cut = buf.len() - overlap;
            base += cut as u64;
            buf.drain(..cut);
        }
    }
    member_offsets.dedup();
    obs_offsets.dedup();
    Ok((member_offsets, obs_offsets))
}

/// Read until the buffer has data or the stream ends.
fn read_some<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
}

fn find_all(haystack: &[u8], needle: &[u8], base: u64, out: &mut Vec<u64>) {
    if needle.is_empty() || haystack.len() < needle.len() {
        return;
    }
    for (i, window) in haystack.windows(needle.len()).enumerate() {
        if window == needle {
            let offset = base + i as u64;
            if out.last() != Some(&offset) && !out.contains(&offset) {
                out.push(offset);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_sentinels_across_chunks() {
        let pattern = obs_sentinel_pattern();
        let mut data = vec![b'x'; 70_000];
        data.extend_from_slice(&pattern);
        data.extend(vec![b'y'; 100]);
        let (_, obs) = scan_sentinels(
            std::io::Cursor::new(data),
            MEMBER_HEADER_PREFIX.as_bytes(),
            &pattern,
        )
        .unwrap();
        assert_eq!(obs, vec![70_000]);
    }

    #[test]
    fn test_scan_finds_member_and_obs() {
        let obs = obs_sentinel_pattern();
        let mut data = Vec::new();
        data.extend(vec![b' '; 240]);
        data.extend_from_slice(MEMBER_HEADER_PREFIX.as_bytes());
        data.extend(vec![b'0'; 32]);
        data.extend(vec![b' '; 400]);
        data.extend_from_slice(&obs);
        data.extend(vec![b' '; 2]);
        let (members, obs_hits) = scan_sentinels(
            std::io::Cursor::new(data),
            MEMBER_HEADER_PREFIX.as_bytes(),
            &obs,
        )
        .unwrap();
        assert_eq!(members, vec![240]);
        assert_eq!(obs_hits, vec![240 + 48 + 32 + 400]);
    }

    #[test]
    fn test_missing_file_error() {
        let mut library = Library::new("/definitely/not/here.xpt");
        assert!(matches!(
            library.get_metadata(),
            Err(XportError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_compare_values_ordering() {
        use std::cmp::Ordering;
        assert_eq!(
            compare_values(&Value::Missing, &Value::Num(1.0)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Num(2.0), &Value::Num(1.0)),
            Ordering::Greater
        );
        assert_eq!(
            compare_values(&Value::from("a"), &Value::from("b")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::from("a"), &Value::Num(1.0)),
            Ordering::Equal
        );
    }
}
