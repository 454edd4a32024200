//! Streaming row reader.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};

use encoding_rs::Encoding;
use tracing::trace;

use crate::error::Result;
use crate::filter::CompiledFilter;
use crate::float::{ibm_to_ieee, missing_value};
use crate::types::{Member, ReadOptions, Row, RowFormat, Value, VarType, normalize_name};

/// One column's slice of the row buffer.
#[derive(Debug, Clone)]
struct ColumnPlan {
    name: String,
    label: String,
    var_type: VarType,
    offset: usize,
    length: usize,
    keep: bool,
}

/// Lazy row iterator over a member's observations.
///
/// Yields an optional header pseudo-row first (column names for array
/// rows, name/label pairs for object rows), then decoded data rows.
/// Rows are read on demand; dropping the cursor closes the file. A
/// trailing fragment shorter than one row is discarded silently.
pub struct RowCursor {
    reader: BufReader<File>,
    columns: Vec<ColumnPlan>,
    row_width: usize,
    row_format: RowFormat,
    encoding: Option<&'static Encoding>,
    round_precision: Option<u32>,
    predicate: Option<CompiledFilter>,
    header: Option<Row>,
    row_buf: Vec<u8>,
    /// Raw rows consumed from the file so far.
    visited: u64,
    /// Rows that passed the predicate so far.
    accepted: u64,
    /// Rows emitted to the caller (after the start offset).
    emitted: usize,
    start: usize,
    limit: Option<usize>,
    finished: bool,
}

impl RowCursor {
    /// `file` must be positioned at the member's first observation.
    pub(crate) fn new(
        file: File,
        member: &Member,
        options: ReadOptions,
        encoding: Option<&'static Encoding>,
        predicate: Option<CompiledFilter>,
    ) -> Self {
        let keep: Vec<String> = options.keep.iter().map(|name| normalize_name(name)).collect();
        let mut columns = Vec::with_capacity(member.variable_order.len());
        let mut offset = 0;
        for variable in member.ordered_variables() {
            let length = variable.length as usize;
            columns.push(ColumnPlan {
                name: variable.name.clone(),
                label: variable.label.clone(),
                var_type: variable.var_type,
                offset,
                length,
                keep: keep.is_empty() || keep.contains(&normalize_name(&variable.name)),
            });
            offset += length;
        }

        let header = (!options.skip_header).then(|| header_row(&columns, options.row_format));

        Self {
            reader: BufReader::new(file),
            row_width: offset,
            columns,
            row_format: options.row_format,
            encoding,
            round_precision: options.round_precision,
            predicate,
            header,
            row_buf: vec![0; offset],
            visited: 0,
            accepted: 0,
            emitted: 0,
            start: options.start,
            limit: options.length,
            finished: false,
        }
    }

    /// Count of raw rows consumed from the file so far.
    #[must_use]
    pub fn rows_visited(&self) -> u64 {
        self.visited
    }

    /// True once the end of the observation data was reached, as
    /// opposed to stopping at the row cap.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Read the next raw row into the row buffer. A short tail is
    /// treated as end of data.
    fn fill_row(&mut self) -> Result<bool> {
        match self.reader.read_exact(&mut self.row_buf) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.finished = true;
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn decode_cell(&self, column: &ColumnPlan) -> Value {
        let bytes = &self.row_buf[column.offset..column.offset + column.length];
        match column.var_type {
            VarType::Num => {
                if missing_value(bytes).is_some() {
                    Value::Missing
                } else {
                    let mut v = ibm_to_ieee(bytes);
                    if let Some(precision) = self.round_precision {
                        v = round_to(v, precision);
                    }
                    Value::Num(v)
                }
            }
            VarType::Char => Value::Char(decode_text(bytes, self.encoding)),
        }
    }

    /// Decode the buffered row, applying the predicate if any.
    ///
    /// With a predicate attached the full row is decoded so every
    /// column is available to the conditions, then projected down to
    /// the kept columns. Without one, skipped columns are never
    /// decoded.
    fn decode_row(&self) -> Option<Row> {
        if let Some(predicate) = &self.predicate {
            let full: Vec<Value> = self.columns.iter().map(|c| self.decode_cell(c)).collect();
            if !predicate.matches(&full) {
                return None;
            }
            Some(self.shape_row(
                self.columns
                    .iter()
                    .zip(full)
                    .filter(|(column, _)| column.keep),
            ))
        } else {
            Some(self.shape_row(
                self.columns
                    .iter()
                    .filter(|column| column.keep)
                    .map(|column| (column, self.decode_cell(column))),
            ))
        }
    }

    fn shape_row<'a, I>(&self, cells: I) -> Row
    where
        I: Iterator<Item = (&'a ColumnPlan, Value)>,
    {
        match self.row_format {
            RowFormat::Array => Row::Array(cells.map(|(_, value)| value).collect()),
            RowFormat::Object => Row::Object(
                cells
                    .map(|(column, value)| (column.name.clone(), value))
                    .collect(),
            ),
        }
    }
}

impl Iterator for RowCursor {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(header) = self.header.take() {
            return Some(Ok(header));
        }
        loop {
            if self.limit.is_some_and(|limit| self.emitted >= limit) {
                return None;
            }
            match self.fill_row() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(e) => return Some(Err(e)),
            }
            self.visited += 1;
            let Some(row) = self.decode_row() else {
                continue;
            };
            self.accepted += 1;
            if self.accepted as usize <= self.start {
                continue;
            }
            self.emitted += 1;
            trace!(row = self.visited, "decoded row");
            return Some(Ok(row));
        }
    }
}

fn header_row(columns: &[ColumnPlan], row_format: RowFormat) -> Row {
    let kept = columns.iter().filter(|column| column.keep);
    match row_format {
        RowFormat::Array => Row::Array(kept.map(|c| Value::Char(c.name.clone())).collect()),
        RowFormat::Object => Row::Object(
            kept.map(|c| (c.name.clone(), Value::Char(c.label.clone())))
                .collect(),
        ),
    }
}

/// Decode a character field, dropping trailing pad bytes.
///
/// Without an encoding, bytes map to chars one-to-one (latin1-like),
/// so no byte pattern can fail to decode.
fn decode_text(bytes: &[u8], encoding: Option<&'static Encoding>) -> String {
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |i| i + 1);
    let bytes = &bytes[..end];
    match encoding {
        Some(encoding) => encoding.decode_without_bom_handling(bytes).0.into_owned(),
        None => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}
