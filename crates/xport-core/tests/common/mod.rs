//! Test fixtures: synthesize V5 transport files in memory.
//!
//! The crate's public API only reads transport files, so the encoder
//! here lives with the tests. Fixtures keep the observation section an
//! exact multiple of the 80-byte record length so no padding records
//! are involved.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;

pub const RECORD_LEN: usize = 80;

/// Encode an IEEE double as an 8-byte IBM hex float.
///
/// Every finite f64 within the IBM exponent range is exactly
/// representable (56 mantissa bits against IEEE's 53), so decoding the
/// result gives back the input bit for bit.
#[must_use]
pub fn ieee_to_ibm(value: f64) -> [u8; 8] {
    if value == 0.0 {
        return [0; 8];
    }
    let sign = if value < 0.0 { 0x80u8 } else { 0 };
    let mut fraction = value.abs();
    let mut exponent = 0i32;
    while fraction >= 1.0 {
        fraction /= 16.0;
        exponent += 1;
    }
    while fraction < 1.0 / 16.0 {
        fraction *= 16.0;
        exponent -= 1;
    }
    let mantissa = (fraction * (1u64 << 56) as f64) as u64;

    let mut bytes = [0u8; 8];
    bytes[0] = sign | ((exponent + 64) as u8);
    for (i, slot) in bytes[1..].iter_mut().enumerate() {
        *slot = ((mantissa >> (8 * (6 - i))) & 0xFF) as u8;
    }
    bytes
}

/// A column in a synthesized dataset.
pub enum Col {
    Char {
        name: &'static str,
        label: &'static str,
        len: u16,
    },
    Num {
        name: &'static str,
        label: &'static str,
    },
}

impl Col {
    fn name(&self) -> &'static str {
        match self {
            Col::Char { name, .. } | Col::Num { name, .. } => name,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Col::Char { label, .. } | Col::Num { label, .. } => label,
        }
    }

    fn len(&self) -> u16 {
        match self {
            Col::Char { len, .. } => *len,
            Col::Num { .. } => 8,
        }
    }

    fn type_code(&self) -> i16 {
        match self {
            Col::Char { .. } => 2,
            Col::Num { .. } => 1,
        }
    }
}

/// One cell of a synthesized row.
#[derive(Clone, Copy)]
pub enum Cell {
    Str(&'static str),
    Num(f64),
    /// A missing numeric value with the given sentinel byte.
    Missing(u8),
}

fn fixed_header(prefix: &str) -> [u8; RECORD_LEN] {
    let mut record = [b' '; RECORD_LEN];
    record[..prefix.len()].copy_from_slice(prefix.as_bytes());
    for slot in &mut record[48..78] {
        *slot = b'0';
    }
    record
}

fn write_str(buf: &mut [u8], offset: usize, value: &str) {
    buf[offset..offset + value.len()].copy_from_slice(value.as_bytes());
}

fn namestr(col: &Col, var_num: i16, position: i32) -> [u8; 140] {
    let mut buf = [0u8; 140];
    buf[0..2].copy_from_slice(&col.type_code().to_be_bytes());
    buf[4..6].copy_from_slice(&(col.len() as i16).to_be_bytes());
    buf[6..8].copy_from_slice(&var_num.to_be_bytes());
    for slot in &mut buf[8..64] {
        *slot = b' ';
    }
    write_str(&mut buf, 8, col.name());
    write_str(&mut buf, 16, col.label());
    for slot in &mut buf[70..84] {
        *slot = b' ';
    }
    buf[84..88].copy_from_slice(&position.to_be_bytes());
    buf
}

/// Build a complete single-member V5 transport file.
pub fn build_xpt(dataset: &str, label: &str, cols: &[Col], rows: &[Vec<Cell>]) -> Vec<u8> {
    let mut out = Vec::new();

    // Library header: sentinel + real header + second header.
    out.extend(fixed_header(
        "HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!",
    ));
    let mut real = [b' '; RECORD_LEN];
    write_str(&mut real, 0, "SAS     SAS     SASLIB  ");
    write_str(&mut real, 24, "9.4");
    write_str(&mut real, 32, "LIN X64");
    write_str(&mut real, 64, "15MAR24:10:20:30");
    out.extend(real);
    let mut second = [b' '; RECORD_LEN];
    write_str(&mut second, 0, "15MAR24:10:20:30");
    out.extend(second);

    // Member header block.
    let mut member = fixed_header("HEADER RECORD*******MEMBER  HEADER RECORD!!!!!!!");
    member[74..78].copy_from_slice(b"0140");
    out.extend(member);
    out.extend(fixed_header(
        "HEADER RECORD*******DSCRPTR HEADER RECORD!!!!!!!",
    ));
    let mut data = [b' '; RECORD_LEN];
    write_str(&mut data, 0, "SAS     ");
    write_str(&mut data, 8, dataset);
    write_str(&mut data, 16, "SASDATA ");
    write_str(&mut data, 24, "9.4");
    write_str(&mut data, 32, "LIN X64");
    write_str(&mut data, 64, "15MAR24:10:20:30");
    out.extend(data);
    let mut fourth = [b' '; RECORD_LEN];
    write_str(&mut fourth, 0, "15MAR24:10:20:30");
    write_str(&mut fourth, 32, label);
    write_str(&mut fourth, 72, "DATA");
    out.extend(fourth);

    // NAMESTR count record plus the descriptors, padded to a record.
    let mut count = fixed_header("HEADER RECORD*******NAMESTR HEADER RECORD!!!!!!!");
    count[54..58].copy_from_slice(format!("{:04}", cols.len()).as_bytes());
    out.extend(count);
    let namestr_start = out.len();
    let mut position = 0i32;
    for (i, col) in cols.iter().enumerate() {
        out.extend(namestr(col, (i + 1) as i16, position));
        position += i32::from(col.len());
    }
    let padded = namestr_start + (cols.len() * 140).div_ceil(RECORD_LEN) * RECORD_LEN;
    out.resize(padded, b' ');

    // OBS sentinel, then the fixed-width rows.
    out.extend(fixed_header("HEADER RECORD*******OBS     HEADER RECORD!!!!!!!"));
    for row in rows {
        for (col, cell) in cols.iter().zip(row) {
            match (col, cell) {
                (Col::Char { len, .. }, Cell::Str(text)) => {
                    let mut field = vec![b' '; *len as usize];
                    field[..text.len()].copy_from_slice(text.as_bytes());
                    out.extend(field);
                }
                (Col::Num { .. }, Cell::Num(value)) => out.extend(ieee_to_ibm(*value)),
                (Col::Num { .. }, Cell::Missing(sentinel)) => {
                    let mut field = [0u8; 8];
                    field[0] = *sentinel;
                    out.extend(field);
                }
                _ => panic!("cell type does not match column type"),
            }
        }
    }
    out
}

/// The standard fixture: an alfalfa-yield-style dataset `SEED` with 6
/// columns and 40 rows (row width 48, so the observation section is an
/// exact multiple of 80 bytes).
///
/// Row `i`: POP = "min" for the first 20 rows and "max" after,
/// SAMPLE = i % 5, REP = i % 2 + 1, SEEDWT = 64 + i, HARV1 = 171.7 + i,
/// HARV2 = 180.3 + i. Row 7's SEEDWT is a standard missing value and
/// row 13's HARV2 is special missing `A`.
pub fn seed_fixture() -> Vec<u8> {
    let cols = seed_columns();
    let mut rows = Vec::new();
    for i in 0..40 {
        let f = f64::from(i);
        rows.push(vec![
            Cell::Str(if i < 20 { "min" } else { "max" }),
            Cell::Num(f64::from(i % 5)),
            Cell::Num(f64::from(i % 2 + 1)),
            if i == 7 {
                Cell::Missing(b'.')
            } else {
                Cell::Num(64.0 + f)
            },
            Cell::Num(171.7 + f),
            if i == 13 {
                Cell::Missing(b'A')
            } else {
                Cell::Num(180.3 + f)
            },
        ]);
    }
    build_xpt("SEED", "Alfalfa yield trial", &cols, &rows)
}

pub fn seed_columns() -> Vec<Col> {
    vec![
        Col::Char {
            name: "POP",
            label: "Population",
            len: 8,
        },
        Col::Num {
            name: "SAMPLE",
            label: "Sample number",
        },
        Col::Num {
            name: "REP",
            label: "Replicate",
        },
        Col::Num {
            name: "SEEDWT",
            label: "Seed weight",
        },
        Col::Num {
            name: "HARV1",
            label: "First harvest yield",
        },
        Col::Num {
            name: "HARV2",
            label: "Second harvest yield",
        },
    ]
}

/// Write fixture bytes to a temp file; keep the directory guard alive
/// for the duration of the test.
pub fn write_temp(bytes: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("fixture.xpt");
    std::fs::write(&path, bytes).expect("write fixture");
    (dir, path)
}
