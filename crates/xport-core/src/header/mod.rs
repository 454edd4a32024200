//! XPORT header record parsing.
//!
//! A transport file is a sequence of 80-byte records:
//! - Library header sentinel + 2 real header records (file metadata)
//! - Per member: 4 header records, 1 NAMESTR-count record, the NAMESTR
//!   block padded to a record boundary, and the OBS sentinel record
//!   marking the start of observation data.

pub mod datetime;
pub mod library;
pub mod member;
pub mod namestr;

pub use datetime::parse_xpt_datetime;
pub use library::{LIBRARY_HEADER_PREFIX, LibraryHeader, RECORD_LEN, parse_library_header};
pub use member::{
    DSCRPTR_HEADER_PREFIX, MEMBER_HEADER_PREFIX, NAMESTR_HEADER_PREFIX, OBS_HEADER_PREFIX,
    align_to_record, obs_sentinel_pattern, parse_descriptor_size, parse_member_data,
    parse_member_second, parse_variable_count, validate_dscrptr_header, validate_member_header,
    validate_namestr_header,
};
pub use namestr::{NAMESTR_LEN, NAMESTR_LEN_VAX, parse_namestr, parse_namestr_records};
