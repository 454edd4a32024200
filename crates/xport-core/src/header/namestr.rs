//! NAMESTR (variable descriptor) record parsing.
//!
//! Each NAMESTR is a fixed big-endian C struct of 140 bytes (136 under
//! VAX/VMS, where the reserved tail is truncated):
//!
//! | Offset | Field  | Type     | Description                     |
//! |--------|--------|----------|---------------------------------|
//! | 0-1    | ntype  | short    | 1=NUMERIC, 2=CHAR               |
//! | 2-3    | nhfun  | short    | Name hash (always 0)            |
//! | 4-5    | nlng   | short    | Variable length in observation  |
//! | 6-7    | nvar0  | short    | Variable number                 |
//! | 8-15   | nname  | char[8]  | Variable name                   |
//! | 16-55  | nlabel | char[40] | Variable label                  |
//! | 56-63  | nform  | char[8]  | Format name                     |
//! | 64-65  | nfl    | short    | Format field width              |
//! | 66-67  | nfd    | short    | Format decimals                 |
//! | 68-69  | nfj    | short    | 0=left justified, 1=right       |
//! | 70-71  | nfill  | char[2]  | Padding                         |
//! | 72-79  | niform | char[8]  | Informat name                   |
//! | 80-81  | nifl   | short    | Informat width                  |
//! | 82-83  | nifd   | short    | Informat decimals               |
//! | 84-87  | npos   | long     | Position in observation         |
//! | 88-    | rest   | char[52] | Reserved (48 under VAX/VMS)     |

use crate::error::{Result, XportError};
use crate::record::{Endian, FieldKind, FieldValue, RecordLayout};
use crate::types::{Justification, VarType, Variable};

/// Standard NAMESTR length.
pub const NAMESTR_LEN: usize = 140;

/// VAX/VMS NAMESTR length.
pub const NAMESTR_LEN_VAX: usize = 136;

/// Field table for a NAMESTR of the given descriptor size.
fn namestr_layout(descriptor_size: usize) -> RecordLayout {
    let reserved = descriptor_size - 88;
    RecordLayout::new(
        Endian::Big,
        &[
            FieldKind::I16,          // 0: ntype
            FieldKind::I16,          // 1: nhfun
            FieldKind::I16,          // 2: nlng
            FieldKind::I16,          // 3: nvar0
            FieldKind::Text(8),      // 4: nname
            FieldKind::Text(40),     // 5: nlabel
            FieldKind::Text(8),      // 6: nform
            FieldKind::I16,          // 7: nfl
            FieldKind::I16,          // 8: nfd
            FieldKind::I16,          // 9: nfj
            FieldKind::Pad(2),       // nfill
            FieldKind::Text(8),      // 10: niform
            FieldKind::I16,          // 11: nifl
            FieldKind::I16,          // 12: nifd
            FieldKind::I32,          // 13: npos
            FieldKind::Pad(reserved),
        ],
    )
}

/// Decode one NAMESTR slice into a [`Variable`].
///
/// String fields are trimmed of surrounding whitespace after decode.
///
/// # Errors
/// `InvalidNamestr` for an unknown type code, zero length, or empty
/// name; `SizeMismatch` when the slice is shorter than the descriptor.
pub fn parse_namestr(data: &[u8], descriptor_size: usize, index: usize) -> Result<Variable> {
    let layout = namestr_layout(descriptor_size);
    let values = layout.unpack(data)?;

    let type_code = int_at(&values, 0);
    let var_type = VarType::from_code(type_code).ok_or_else(|| XportError::InvalidNamestr {
        index,
        message: format!("invalid type code: {type_code}"),
    })?;

    let length = int_at(&values, 2);
    if length <= 0 {
        return Err(XportError::InvalidNamestr {
            index,
            message: "variable length is zero".to_string(),
        });
    }

    let name = text_at(&values, 4);
    if name.is_empty() {
        return Err(XportError::InvalidNamestr {
            index,
            message: "empty variable name".to_string(),
        });
    }

    Ok(Variable {
        name,
        label: text_at(&values, 5),
        var_type,
        length: length as u16,
        var_num: int_at(&values, 3) as u16,
        format_name: text_at(&values, 6),
        format_width: int_at(&values, 7) as u16,
        format_decimals: int_at(&values, 8) as u16,
        format_justification: Justification::from_nfj(int_at(&values, 9)),
        informat_name: text_at(&values, 10),
        informat_width: int_at(&values, 11) as u16,
        informat_decimals: int_at(&values, 12) as u16,
    })
}

/// Decode `count` consecutive NAMESTR slices.
pub fn parse_namestr_records(
    data: &[u8],
    count: usize,
    descriptor_size: usize,
) -> Result<Vec<Variable>> {
    let mut variables = Vec::with_capacity(count);
    for index in 0..count {
        let offset = index * descriptor_size;
        let slice =
            data.get(offset..offset + descriptor_size)
                .ok_or_else(|| XportError::InvalidNamestr {
                    index,
                    message: "NAMESTR data out of bounds".to_string(),
                })?;
        variables.push(parse_namestr(slice, descriptor_size, index)?);
    }
    Ok(variables)
}

fn int_at(values: &[FieldValue], index: usize) -> i64 {
    values[index].as_int().unwrap_or(0)
}

fn text_at(values: &[FieldValue], index: usize) -> String {
    values[index]
        .as_text()
        .map(|text| text.trim().to_string())
        .unwrap_or_default()
}
