//! Variable (column) descriptor types.

use std::fmt;

/// Variable data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    /// Numeric (IBM hex float on disk).
    Num,
    /// Character (fixed-width, space-padded text).
    Char,
}

impl VarType {
    /// Map the NAMESTR type code (1=numeric, 2=character).
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Num),
            2 => Some(Self::Char),
            _ => None,
        }
    }

    /// The metadata name of the type ("Num" or "Char").
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Num => "Num",
            Self::Char => "Char",
        }
    }

    /// The semantic type used in dataset-level metadata.
    #[must_use]
    pub const fn semantic_type(self) -> &'static str {
        match self {
            Self::Num => "double",
            Self::Char => "string",
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format field justification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justification {
    #[default]
    Left,
    Right,
}

impl Justification {
    /// Map the NAMESTR `nfj` code (0=left, 1=right).
    #[must_use]
    pub const fn from_nfj(code: i64) -> Self {
        if code == 1 { Self::Right } else { Self::Left }
    }
}

/// One column's descriptor, decoded from a NAMESTR record.
///
/// Immutable once parsed. `var_num` is the 1-based declared position;
/// the member's column order sorts ascending by it.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub label: String,
    pub var_type: VarType,
    /// Storage length in bytes within an observation. Always > 0.
    pub length: u16,
    /// 1-based declared position number, unique within a member.
    pub var_num: u16,
    pub format_name: String,
    pub format_width: u16,
    pub format_decimals: u16,
    pub format_justification: Justification,
    pub informat_name: String,
    pub informat_width: u16,
    pub informat_decimals: u16,
}

impl Variable {
    /// Reconstructed display format, e.g. `DATE9.` or `BEST8.2`.
    ///
    /// A decimals value of zero is omitted so `DATE9.` never renders
    /// as `DATE9.0`. Returns None when no format name was declared.
    #[must_use]
    pub fn format_spec(&self) -> Option<String> {
        build_spec(&self.format_name, self.format_width, self.format_decimals)
    }

    /// Reconstructed input format, same shape as [`Self::format_spec`].
    #[must_use]
    pub fn informat_spec(&self) -> Option<String> {
        build_spec(
            &self.informat_name,
            self.informat_width,
            self.informat_decimals,
        )
    }
}

fn build_spec(name: &str, width: u16, decimals: u16) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    let mut spec = format!("{name}{width}.");
    if decimals != 0 {
        spec.push_str(&decimals.to_string());
    }
    Some(spec)
}
