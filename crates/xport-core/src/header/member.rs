//! Member (dataset-level) header record parsing.
//!
//! Each member carries, in order:
//!
//! 1. Member header: `HEADER RECORD*******MEMBER  HEADER RECORD!!!!!!!...`
//!    with the NAMESTR descriptor size (140 or 136, OS-dependent) in
//!    the trailing digits
//! 2. DSCRPTR header: `HEADER RECORD*******DSCRPTR HEADER RECORD!!!!!!!...`
//! 3. Member data: dataset name, SAS version, OS, created datetime
//! 4. Member second: modified datetime, label, type
//! 5. NAMESTR header: variable count in the zero-fill digits
//! 6. NAMESTR records, padded to the next 80-byte boundary
//! 7. OBS header: marks the start of observation data

use crate::error::{Result, XportError};

use super::library::{RECORD_LEN, read_string};

/// Member header sentinel prefix.
pub const MEMBER_HEADER_PREFIX: &str = "HEADER RECORD*******MEMBER  HEADER RECORD!!!!!!!";

/// DSCRPTR header sentinel prefix.
pub const DSCRPTR_HEADER_PREFIX: &str = "HEADER RECORD*******DSCRPTR HEADER RECORD!!!!!!!";

/// NAMESTR header sentinel prefix.
pub const NAMESTR_HEADER_PREFIX: &str = "HEADER RECORD*******NAMESTR HEADER RECORD!!!!!!!";

/// OBS header sentinel prefix.
pub const OBS_HEADER_PREFIX: &str = "HEADER RECORD*******OBS     HEADER RECORD!!!!!!!";

/// Validate a member header record.
pub fn validate_member_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, MEMBER_HEADER_PREFIX, "MEMBER HEADER")
}

/// Validate a DSCRPTR header record.
pub fn validate_dscrptr_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, DSCRPTR_HEADER_PREFIX, "DSCRPTR HEADER")
}

/// Validate a NAMESTR header record.
pub fn validate_namestr_header(record: &[u8]) -> Result<()> {
    validate_prefix(record, NAMESTR_HEADER_PREFIX, "NAMESTR HEADER")
}

fn validate_prefix(record: &[u8], prefix: &str, expected: &'static str) -> Result<()> {
    if record.len() < RECORD_LEN {
        return Err(XportError::invalid_format(format!(
            "{expected} record too short"
        )));
    }
    if !record.starts_with(prefix.as_bytes()) {
        return Err(XportError::missing_header(expected));
    }
    Ok(())
}

/// The byte pattern that identifies the OBS sentinel record: the
/// prefix plus its 30-digit zero fill. The library parser scans the
/// raw stream for this pattern to locate the observation boundary.
#[must_use]
pub fn obs_sentinel_pattern() -> Vec<u8> {
    let mut pattern = OBS_HEADER_PREFIX.as_bytes().to_vec();
    pattern.extend(std::iter::repeat_n(b'0', 30));
    pattern
}

/// Parse the NAMESTR descriptor size from the member header record.
///
/// The size sits at offset 74-77 as 4 ASCII digits and is 140
/// (standard) or 136 (VAX/VMS, shorter reserved tail).
pub fn parse_descriptor_size(record: &[u8]) -> Result<usize> {
    if record.len() < 78 {
        return Err(XportError::invalid_format("member header record too short"));
    }
    let size = read_string(record, 74, 4)
        .parse::<usize>()
        .map_err(|_| XportError::NumericParse {
            field: "NAMESTR descriptor size".to_string(),
        })?;
    if size != 140 && size != 136 {
        return Err(XportError::invalid_format(format!(
            "unsupported NAMESTR descriptor size: {size}"
        )));
    }
    Ok(size)
}

/// Parse the variable count from the NAMESTR header record.
///
/// The count sits at offset 54-57 as 4 ASCII digits.
pub fn parse_variable_count(record: &[u8]) -> Result<usize> {
    if record.len() < 58 {
        return Err(XportError::invalid_format(
            "NAMESTR header record too short",
        ));
    }
    read_string(record, 54, 4)
        .parse::<usize>()
        .map_err(|_| XportError::NumericParse {
            field: "variable count".to_string(),
        })
}

/// Parse the dataset name from the member data record (offset 8-15).
///
/// The record must open with the literal `SAS` symbol and carry the
/// `SASDATA` marker at offset 16; anything else is not a member
/// header block.
pub fn parse_member_data(record: &[u8]) -> Result<(String, String)> {
    if record.len() < RECORD_LEN {
        return Err(XportError::invalid_format("member data record too short"));
    }
    if &record[0..8] != b"SAS     " || &record[16..24] != b"SASDATA " {
        return Err(XportError::invalid_format(
            "member data record symbols do not match",
        ));
    }
    let name = read_string(record, 8, 8);
    if name.is_empty() {
        return Err(XportError::invalid_format("empty dataset name"));
    }
    let created = read_string(record, 64, 16);
    Ok((name, created))
}

/// Parse the member second record: modified datetime (offset 0-15),
/// label (32-71), and dataset type (72-79).
pub fn parse_member_second(record: &[u8]) -> Result<(String, String, String)> {
    if record.len() < RECORD_LEN {
        return Err(XportError::invalid_format("member second record too short"));
    }
    let modified = read_string(record, 0, 16);
    let label = read_string(record, 32, 40);
    let dataset_type = read_string(record, 72, 8);
    Ok((modified, label, dataset_type))
}

/// Align a size up to the next 80-byte record boundary.
#[must_use]
pub const fn align_to_record(size: usize) -> usize {
    if size % RECORD_LEN == 0 {
        size
    } else {
        size + (RECORD_LEN - (size % RECORD_LEN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_header(prefix: &str) -> [u8; RECORD_LEN] {
        let mut record = [b' '; RECORD_LEN];
        record[..prefix.len()].copy_from_slice(prefix.as_bytes());
        for i in 48..78 {
            record[i] = b'0';
        }
        record
    }

    #[test]
    fn test_validate_headers() {
        assert!(validate_member_header(&fixed_header(MEMBER_HEADER_PREFIX)).is_ok());
        assert!(validate_dscrptr_header(&fixed_header(DSCRPTR_HEADER_PREFIX)).is_ok());
        assert!(validate_namestr_header(&fixed_header(NAMESTR_HEADER_PREFIX)).is_ok());

        let invalid = [b'X'; RECORD_LEN];
        assert!(validate_member_header(&invalid).is_err());
        assert!(validate_namestr_header(&invalid).is_err());
    }

    #[test]
    fn test_parse_descriptor_size() {
        let mut record = fixed_header(MEMBER_HEADER_PREFIX);
        record[74..78].copy_from_slice(b"0140");
        assert_eq!(parse_descriptor_size(&record).unwrap(), 140);

        record[74..78].copy_from_slice(b"0136");
        assert_eq!(parse_descriptor_size(&record).unwrap(), 136);

        record[74..78].copy_from_slice(b"0200");
        assert!(parse_descriptor_size(&record).is_err());
    }

    #[test]
    fn test_parse_variable_count() {
        let mut record = fixed_header(NAMESTR_HEADER_PREFIX);
        record[54..58].copy_from_slice(b"0023");
        assert_eq!(parse_variable_count(&record).unwrap(), 23);
    }

    #[test]
    fn test_parse_member_data() {
        let mut record = [b' '; RECORD_LEN];
        record[0..8].copy_from_slice(b"SAS     ");
        record[8..12].copy_from_slice(b"SEED");
        record[16..24].copy_from_slice(b"SASDATA ");
        record[64..80].copy_from_slice(b"15MAR24:14:30:45");

        let (name, created) = parse_member_data(&record).unwrap();
        assert_eq!(name, "SEED");
        assert_eq!(created, "15MAR24:14:30:45");
    }

    #[test]
    fn test_parse_member_data_rejects_bad_symbols() {
        let record = [b' '; RECORD_LEN];
        assert!(parse_member_data(&record).is_err());
    }

    #[test]
    fn test_parse_member_second() {
        let mut record = [b' '; RECORD_LEN];
        record[0..16].copy_from_slice(b"15MAR24:14:30:45");
        record[32..44].copy_from_slice(b"Seed dataset");
        record[72..76].copy_from_slice(b"DATA");

        let (modified, label, dataset_type) = parse_member_second(&record).unwrap();
        assert_eq!(modified, "15MAR24:14:30:45");
        assert_eq!(label, "Seed dataset");
        assert_eq!(dataset_type, "DATA");
    }

    #[test]
    fn test_align_to_record() {
        assert_eq!(align_to_record(0), 0);
        assert_eq!(align_to_record(80), 80);
        assert_eq!(align_to_record(81), 160);
        assert_eq!(align_to_record(140), 160);
        assert_eq!(align_to_record(840), 880);
    }

    #[test]
    fn test_obs_sentinel_pattern() {
        let pattern = obs_sentinel_pattern();
        assert_eq!(pattern.len(), 78);
        assert!(pattern.starts_with(OBS_HEADER_PREFIX.as_bytes()));
        assert!(pattern.ends_with(b"000000"));
    }
}
