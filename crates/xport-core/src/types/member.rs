//! Member (dataset) descriptor.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::{Result, XportError};
use crate::header::{
    RECORD_LEN, align_to_record, parse_descriptor_size, parse_member_data, parse_member_second,
    parse_namestr_records, parse_variable_count, parse_xpt_datetime, validate_dscrptr_header,
    validate_member_header, validate_namestr_header,
};
use crate::types::{Variable, normalize_name};

/// One dataset within a transport file: its identity, timestamps, and
/// the ordered variable descriptors that define the row layout.
///
/// A transport file may technically carry several members; this reader
/// keeps only the last one parsed.
#[derive(Debug, Clone, Default)]
pub struct Member {
    /// Dataset name, e.g. `DM` or `SEED`.
    pub name: String,
    /// Dataset label.
    pub label: String,
    /// Dataset type field, usually `DATA` or blank.
    pub dataset_type: String,
    /// Created datetime, raw fixed-width text.
    pub created_raw: String,
    /// Modified datetime, raw fixed-width text.
    pub modified_raw: String,
    /// Created datetime, when parseable.
    pub created: Option<NaiveDateTime>,
    /// Modified datetime, when parseable.
    pub modified: Option<NaiveDateTime>,
    /// NAMESTR descriptor size for this member (140 or 136).
    pub descriptor_size: usize,
    /// Absolute byte offset of the first observation in the file.
    pub obs_start: u64,
    /// Variables keyed by normalized (uppercased) name.
    pub variables: HashMap<String, Variable>,
    /// Original variable names sorted ascending by `var_num` (stable).
    pub variable_order: Vec<String>,
}

impl Member {
    /// Parse a member from its header block.
    ///
    /// `block` must start at the member header record and extend at
    /// least through the NAMESTR records. `obs_start` is the absolute
    /// file offset of the first observation, located separately by the
    /// OBS sentinel scan.
    pub fn parse(block: &[u8], obs_start: u64) -> Result<Self> {
        if block.len() < 5 * RECORD_LEN {
            return Err(XportError::invalid_format(
                "file truncated inside member header block",
            ));
        }

        validate_member_header(&block[..RECORD_LEN])?;
        let descriptor_size = parse_descriptor_size(&block[..RECORD_LEN])?;
        validate_dscrptr_header(&block[RECORD_LEN..2 * RECORD_LEN])?;

        let (name, created_raw) = parse_member_data(&block[2 * RECORD_LEN..3 * RECORD_LEN])?;
        let (modified_raw, label, dataset_type) =
            parse_member_second(&block[3 * RECORD_LEN..4 * RECORD_LEN])?;

        let count_record = &block[4 * RECORD_LEN..5 * RECORD_LEN];
        validate_namestr_header(count_record)?;
        let count = parse_variable_count(count_record)?;

        let namestr_bytes = count * descriptor_size;
        let namestr_block = block
            .get(5 * RECORD_LEN..5 * RECORD_LEN + namestr_bytes)
            .ok_or_else(|| {
                XportError::invalid_format("file truncated inside NAMESTR records")
            })?;
        let mut parsed = parse_namestr_records(namestr_block, count, descriptor_size)?;
        parsed.sort_by_key(|variable| variable.var_num);

        debug!(member = %name, variables = count, obs_start, "parsed member header");

        let mut variables = HashMap::with_capacity(count);
        let mut variable_order = Vec::with_capacity(count);
        for variable in parsed {
            variable_order.push(variable.name.clone());
            variables.insert(normalize_name(&variable.name), variable);
        }

        Ok(Self {
            name,
            label,
            dataset_type,
            created: parse_xpt_datetime(&created_raw),
            modified: parse_xpt_datetime(&modified_raw),
            created_raw,
            modified_raw,
            descriptor_size,
            obs_start,
            variables,
            variable_order,
        })
    }

    /// Look up a variable by name, case-insensitively.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(&normalize_name(name))
    }

    /// Iterate variables in declared column order.
    pub fn ordered_variables(&self) -> impl Iterator<Item = &Variable> {
        self.variable_order
            .iter()
            .filter_map(|name| self.variables.get(&normalize_name(name)))
    }

    /// Width of one observation in bytes: the sum of variable lengths.
    #[must_use]
    pub fn row_width(&self) -> usize {
        self.ordered_variables()
            .map(|variable| variable.length as usize)
            .sum()
    }

    /// Total header size in bytes preceding the observations:
    /// 3 library records, 4 member records, 1 NAMESTR-count record,
    /// the NAMESTR block padded to a record boundary, and the OBS
    /// sentinel record.
    #[must_use]
    pub fn header_size(&self) -> usize {
        let namestr_block = align_to_record(self.variable_order.len() * self.descriptor_size);
        (3 + 4 + 1) * RECORD_LEN + namestr_block + RECORD_LEN
    }

    /// Estimate the observation count from the file size.
    ///
    /// The transport format stores no row count; the estimate divides
    /// the post-header byte count by the row width. The tail padding of
    /// the final record can never hold a full row, so the floor is
    /// exact for well-formed files.
    #[must_use]
    pub fn estimate_record_count(&self, file_size: u64) -> u64 {
        let row_width = self.row_width() as u64;
        if row_width == 0 {
            return 0;
        }
        let header = self.header_size() as u64;
        if file_size <= header {
            return 0;
        }
        (file_size - header) / row_width
    }
}
