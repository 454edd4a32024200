//! Library (file-level) header parsing.
//!
//! The first three records of a transport file:
//!
//! 1. Fixed sentinel: `HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!...`
//! 2. Real header: SAS symbols, SASLIB, SAS version, OS, created datetime
//! 3. Second header: modified datetime
//!
//! # Real header layout
//!
//! | Offset | Length | Field       |
//! |--------|--------|-------------|
//! | 0-7    | 8      | sas_symbol1 |
//! | 8-15   | 8      | sas_symbol2 |
//! | 16-23  | 8      | saslib      |
//! | 24-31  | 8      | sasver      |
//! | 32-39  | 8      | sas_os      |
//! | 40-63  | 24     | blanks      |
//! | 64-79  | 16     | created     |

use chrono::NaiveDateTime;

use crate::error::{Result, XportError};

use super::datetime::parse_xpt_datetime;

/// Record length in bytes.
pub const RECORD_LEN: usize = 80;

/// Library header sentinel prefix.
pub const LIBRARY_HEADER_PREFIX: &str = "HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!";

/// File-level metadata parsed from the library header block.
#[derive(Debug, Clone, Default)]
pub struct LibraryHeader {
    /// First SAS symbol field ("SAS").
    pub sas_symbol: String,
    /// SAS version that produced the file.
    pub sas_version: String,
    /// Operating system that produced the file.
    pub os_name: String,
    /// Created datetime, raw fixed-width text.
    pub created_raw: String,
    /// Modified datetime, raw fixed-width text.
    pub modified_raw: String,
    /// Created datetime, when parseable.
    pub created: Option<NaiveDateTime>,
    /// Modified datetime, when parseable.
    pub modified: Option<NaiveDateTime>,
}

/// Validate the library sentinel record.
pub fn validate_library_header(record: &[u8]) -> Result<()> {
    if record.len() < RECORD_LEN {
        return Err(XportError::invalid_format("library header record too short"));
    }
    if !record.starts_with(LIBRARY_HEADER_PREFIX.as_bytes()) {
        return Err(XportError::missing_header("LIBRARY HEADER"));
    }
    Ok(())
}

/// Parse the 3x80-byte library header block at the start of the file.
///
/// The sentinel and the fixed SAS/SASLIB symbol fields are matched
/// literally; a mismatch means the file is not a transport file and
/// aborts the whole operation.
pub fn parse_library_header(block: &[u8]) -> Result<LibraryHeader> {
    if block.len() < 3 * RECORD_LEN {
        return Err(XportError::invalid_format(
            "file truncated before library header completes",
        ));
    }
    validate_library_header(&block[..RECORD_LEN])?;

    let real = &block[RECORD_LEN..2 * RECORD_LEN];
    if &real[0..8] != b"SAS     " || &real[8..16] != b"SAS     " || &real[16..24] != b"SASLIB  " {
        return Err(XportError::invalid_format(
            "library real header symbols do not match",
        ));
    }

    let second = &block[2 * RECORD_LEN..3 * RECORD_LEN];
    let created_raw = read_string(real, 64, 16);
    let modified_raw = read_string(second, 0, 16);
    let created = parse_xpt_datetime(&created_raw);
    let modified = parse_xpt_datetime(&modified_raw);

    Ok(LibraryHeader {
        sas_symbol: read_string(real, 0, 8),
        sas_version: read_string(real, 24, 8),
        os_name: read_string(real, 32, 8),
        created_raw,
        modified_raw,
        created,
        modified,
    })
}

/// Read a string from a byte slice, trimming surrounding spaces.
pub(crate) fn read_string(data: &[u8], offset: usize, len: usize) -> String {
    data.get(offset..offset + len)
        .map(|slice| String::from_utf8_lossy(slice).trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_str(buf: &mut [u8], offset: usize, value: &str) {
        buf[offset..offset + value.len()].copy_from_slice(value.as_bytes());
    }

    fn sample_block() -> Vec<u8> {
        let mut block = vec![b' '; 3 * RECORD_LEN];
        write_str(&mut block, 0, LIBRARY_HEADER_PREFIX);
        for i in 48..78 {
            block[i] = b'0';
        }
        write_str(&mut block, 80, "SAS     SAS     SASLIB  ");
        write_str(&mut block, 80 + 24, "9.4");
        write_str(&mut block, 80 + 32, "LIN X64");
        write_str(&mut block, 80 + 64, "15MAR24:14:30:45");
        write_str(&mut block, 160, "16MAR24:08:00:00");
        block
    }

    #[test]
    fn test_parse_library_header() {
        let header = parse_library_header(&sample_block()).unwrap();
        assert_eq!(header.sas_symbol, "SAS");
        assert_eq!(header.sas_version, "9.4");
        assert_eq!(header.os_name, "LIN X64");
        assert_eq!(header.created_raw, "15MAR24:14:30:45");
        assert_eq!(header.modified_raw, "16MAR24:08:00:00");
        assert!(header.created.is_some());
        assert!(header.modified.is_some());
    }

    #[test]
    fn test_rejects_wrong_sentinel() {
        let mut block = sample_block();
        block[20] = b'X';
        assert!(matches!(
            parse_library_header(&block),
            Err(XportError::MissingHeader { .. })
        ));
    }

    #[test]
    fn test_rejects_wrong_symbols() {
        let mut block = sample_block();
        block[80] = b'X';
        assert!(matches!(
            parse_library_header(&block),
            Err(XportError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_rejects_short_block() {
        assert!(parse_library_header(&[0u8; 100]).is_err());
    }
}
