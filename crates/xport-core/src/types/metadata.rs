//! Serializable metadata shapes.

use serde::Serialize;

use crate::types::{Member, Variable};

/// Per-variable metadata, one entry per column in declared order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VariableMetadata {
    /// Owning dataset name.
    pub dataset: String,
    pub name: String,
    pub label: String,
    /// Storage length in bytes.
    pub length: u16,
    /// "Num" or "Char".
    #[serde(rename = "type")]
    pub var_type: String,
    /// Reconstructed display format, e.g. `DATE9.`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Reconstructed input format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub informat: Option<String>,
}

impl VariableMetadata {
    #[must_use]
    pub fn from_variable(dataset: &str, variable: &Variable) -> Self {
        Self {
            dataset: dataset.to_string(),
            name: variable.name.clone(),
            label: variable.label.clone(),
            length: variable.length,
            var_type: variable.var_type.as_str().to_string(),
            format: variable.format_spec(),
            informat: variable.informat_spec(),
        }
    }
}

/// One column in dataset-level metadata, with the semantic type names
/// used by dataset-JSON consumers ("string"/"double").
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    pub name: String,
    pub label: String,
    pub data_type: String,
    pub length: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_format: Option<String>,
}

impl ColumnMetadata {
    #[must_use]
    pub fn from_variable(variable: &Variable) -> Self {
        Self {
            name: variable.name.clone(),
            label: variable.label.clone(),
            data_type: variable.var_type.semantic_type().to_string(),
            length: variable.length,
            display_format: variable.format_spec(),
        }
    }
}

/// The system that wrote the file, taken from the library header.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceSystem {
    /// SAS symbol plus operating system, e.g. "SAS on LIN X64".
    pub name: String,
    /// SAS version string.
    pub version: String,
}

/// Dataset-level metadata in a dataset-JSON-like shape.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub name: String,
    pub label: String,
    /// Estimated observation count derived from the file size.
    pub records: u64,
    pub source_system: SourceSystem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_date_time: Option<String>,
    pub columns: Vec<ColumnMetadata>,
}

impl DatasetMetadata {
    /// Build from a parsed member, the source system, and file size.
    #[must_use]
    pub fn from_member(member: &Member, source_system: SourceSystem, file_size: u64) -> Self {
        Self {
            name: member.name.clone(),
            label: member.label.clone(),
            records: member.estimate_record_count(file_size),
            source_system,
            creation_date_time: member
                .created
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            modified_date_time: member
                .modified
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            columns: member.ordered_variables().map(ColumnMetadata::from_variable).collect(),
        }
    }
}
