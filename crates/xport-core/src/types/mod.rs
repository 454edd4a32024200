//! Core types for XPORT file handling.

mod member;
mod metadata;
mod options;
mod value;
mod variable;

pub use member::Member;
pub use metadata::{ColumnMetadata, DatasetMetadata, SourceSystem, VariableMetadata};
pub use options::{ReadOptions, RowFormat};
pub use value::{Row, Value};
pub use variable::{Justification, VarType, Variable};

/// Normalize a name for case-insensitive matching.
///
/// Keep lists, dataset-name filters, filter columns, and unique-value
/// resolution all match through this one routine.
#[must_use]
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}
