//! Fixed-layout binary record packing and unpacking.
//!
//! The variable descriptor (NAMESTR) is a fixed C struct on disk. A
//! [`RecordLayout`] is built from an ordered list of typed fields; the
//! layout computes each field's byte offset and the total struct size,
//! then decodes buffers into typed values. Packing is the inverse and
//! exists for completeness and tests; the read path never packs.

use crate::error::{Result, XportError};

/// Byte order for multi-byte scalar fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// One typed field in a fixed-layout record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Padding bytes: skipped on unpack, zeroed on pack.
    Pad(usize),
    /// Fixed-width text, right-padded. Unpacked without trimming;
    /// trimming is the caller's responsibility.
    Text(usize),
    /// Pascal string: a length byte followed by up to `width - 1`
    /// content bytes.
    PascalText(usize),
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl FieldKind {
    /// Width of the field in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Pad(w) | Self::Text(w) | Self::PascalText(w) => w,
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    const fn is_pad(self) -> bool {
        matches!(self, Self::Pad(_))
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Uint(u64),
    Float(f64),
}

impl FieldValue {
    /// The value as a signed integer, if it is one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Uint(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// The value as text, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// A fixed-size record layout: non-pad fields with computed offsets.
#[derive(Debug, Clone)]
pub struct RecordLayout {
    endian: Endian,
    fields: Vec<(FieldKind, usize)>,
    size: usize,
}

impl RecordLayout {
    /// Build a layout from an ordered field list, summing widths into
    /// per-field offsets and the total record size.
    #[must_use]
    pub fn new(endian: Endian, kinds: &[FieldKind]) -> Self {
        let mut fields = Vec::with_capacity(kinds.len());
        let mut offset = 0usize;
        for &kind in kinds {
            if !kind.is_pad() {
                fields.push((kind, offset));
            }
            offset += kind.width();
        }
        Self {
            endian,
            fields,
            size: offset,
        }
    }

    /// Total record size in bytes, padding included.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of value-bearing (non-pad) fields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Decode a buffer into one value per non-pad field.
    ///
    /// # Errors
    /// Returns [`XportError::SizeMismatch`] when the buffer is smaller
    /// than the computed record size.
    pub fn unpack(&self, data: &[u8]) -> Result<Vec<FieldValue>> {
        if data.len() < self.size {
            return Err(XportError::SizeMismatch {
                expected: self.size,
                actual: data.len(),
            });
        }
        Ok(self
            .fields
            .iter()
            .map(|&(kind, offset)| self.read_field(data, kind, offset))
            .collect())
    }

    /// Encode values into a zero-padded buffer of the record size.
    ///
    /// # Errors
    /// Returns [`XportError::SizeMismatch`] when the value count does
    /// not match the field count, and `InvalidFormat` when a value's
    /// type does not fit its field.
    pub fn pack(&self, values: &[FieldValue]) -> Result<Vec<u8>> {
        if values.len() != self.fields.len() {
            return Err(XportError::SizeMismatch {
                expected: self.fields.len(),
                actual: values.len(),
            });
        }
        let mut buf = vec![0u8; self.size];
        for (&(kind, offset), value) in self.fields.iter().zip(values) {
            self.write_field(&mut buf, kind, offset, value)?;
        }
        Ok(buf)
    }

    fn read_field(&self, data: &[u8], kind: FieldKind, offset: usize) -> FieldValue {
        let slice = &data[offset..offset + kind.width()];
        let be = self.endian == Endian::Big;
        match kind {
            FieldKind::Pad(_) => unreachable!("pad fields carry no value"),
            FieldKind::Text(_) => {
                FieldValue::Text(String::from_utf8_lossy(slice).into_owned())
            }
            FieldKind::PascalText(width) => {
                let len = (slice[0] as usize).min(width - 1);
                FieldValue::Text(String::from_utf8_lossy(&slice[1..1 + len]).into_owned())
            }
            FieldKind::I8 => FieldValue::Int(i64::from(slice[0] as i8)),
            FieldKind::U8 => FieldValue::Uint(u64::from(slice[0])),
            FieldKind::I16 => {
                let raw = [slice[0], slice[1]];
                let v = if be {
                    i16::from_be_bytes(raw)
                } else {
                    i16::from_le_bytes(raw)
                };
                FieldValue::Int(i64::from(v))
            }
            FieldKind::U16 => {
                let raw = [slice[0], slice[1]];
                let v = if be {
                    u16::from_be_bytes(raw)
                } else {
                    u16::from_le_bytes(raw)
                };
                FieldValue::Uint(u64::from(v))
            }
            FieldKind::I32 => {
                let raw = [slice[0], slice[1], slice[2], slice[3]];
                let v = if be {
                    i32::from_be_bytes(raw)
                } else {
                    i32::from_le_bytes(raw)
                };
                FieldValue::Int(i64::from(v))
            }
            FieldKind::U32 => {
                let raw = [slice[0], slice[1], slice[2], slice[3]];
                let v = if be {
                    u32::from_be_bytes(raw)
                } else {
                    u32::from_le_bytes(raw)
                };
                FieldValue::Uint(u64::from(v))
            }
            FieldKind::F32 => {
                let raw = [slice[0], slice[1], slice[2], slice[3]];
                let v = if be {
                    f32::from_be_bytes(raw)
                } else {
                    f32::from_le_bytes(raw)
                };
                FieldValue::Float(f64::from(v))
            }
            FieldKind::F64 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(slice);
                let v = if be {
                    f64::from_be_bytes(raw)
                } else {
                    f64::from_le_bytes(raw)
                };
                FieldValue::Float(v)
            }
        }
    }

    fn write_field(
        &self,
        buf: &mut [u8],
        kind: FieldKind,
        offset: usize,
        value: &FieldValue,
    ) -> Result<()> {
        let be = self.endian == Endian::Big;
        let type_error = || {
            XportError::invalid_format(format!("value {value:?} does not fit field {kind:?}"))
        };
        match kind {
            FieldKind::Pad(_) => unreachable!("pad fields carry no value"),
            FieldKind::Text(width) => {
                let text = value.as_text().ok_or_else(type_error)?;
                let bytes = text.as_bytes();
                let len = bytes.len().min(width);
                buf[offset..offset + len].copy_from_slice(&bytes[..len]);
                for slot in &mut buf[offset + len..offset + width] {
                    *slot = b' ';
                }
            }
            FieldKind::PascalText(width) => {
                let text = value.as_text().ok_or_else(type_error)?;
                let bytes = text.as_bytes();
                let len = bytes.len().min(width - 1);
                buf[offset] = len as u8;
                buf[offset + 1..offset + 1 + len].copy_from_slice(&bytes[..len]);
            }
            FieldKind::I8 => {
                let v = value.as_int().ok_or_else(type_error)?;
                buf[offset] = (v as i8) as u8;
            }
            FieldKind::U8 => {
                let v = value.as_int().ok_or_else(type_error)?;
                buf[offset] = v as u8;
            }
            FieldKind::I16 => {
                let v = value.as_int().ok_or_else(type_error)? as i16;
                let raw = if be { v.to_be_bytes() } else { v.to_le_bytes() };
                buf[offset..offset + 2].copy_from_slice(&raw);
            }
            FieldKind::U16 => {
                let v = value.as_int().ok_or_else(type_error)? as u16;
                let raw = if be { v.to_be_bytes() } else { v.to_le_bytes() };
                buf[offset..offset + 2].copy_from_slice(&raw);
            }
            FieldKind::I32 => {
                let v = value.as_int().ok_or_else(type_error)? as i32;
                let raw = if be { v.to_be_bytes() } else { v.to_le_bytes() };
                buf[offset..offset + 4].copy_from_slice(&raw);
            }
            FieldKind::U32 => {
                let v = value.as_int().ok_or_else(type_error)? as u32;
                let raw = if be { v.to_be_bytes() } else { v.to_le_bytes() };
                buf[offset..offset + 4].copy_from_slice(&raw);
            }
            FieldKind::F32 => {
                let FieldValue::Float(v) = value else {
                    return Err(type_error());
                };
                let v = *v as f32;
                let raw = if be { v.to_be_bytes() } else { v.to_le_bytes() };
                buf[offset..offset + 4].copy_from_slice(&raw);
            }
            FieldKind::F64 => {
                let FieldValue::Float(v) = value else {
                    return Err(type_error());
                };
                let raw = if be { v.to_be_bytes() } else { v.to_le_bytes() };
                buf[offset..offset + 8].copy_from_slice(&raw);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layout() -> RecordLayout {
        RecordLayout::new(
            Endian::Big,
            &[
                FieldKind::I16,
                FieldKind::Text(4),
                FieldKind::Pad(2),
                FieldKind::I32,
            ],
        )
    }

    #[test]
    fn test_size_and_offsets() {
        let layout = sample_layout();
        assert_eq!(layout.size(), 12);
        assert_eq!(layout.field_count(), 3);
    }

    #[test]
    fn test_unpack_big_endian() {
        let layout = sample_layout();
        let mut data = vec![0u8; 12];
        data[0..2].copy_from_slice(&(-3i16).to_be_bytes());
        data[2..6].copy_from_slice(b"AB  ");
        data[8..12].copy_from_slice(&70000i32.to_be_bytes());

        let values = layout.unpack(&data).unwrap();
        assert_eq!(values[0], FieldValue::Int(-3));
        assert_eq!(values[1], FieldValue::Text("AB  ".to_string()));
        assert_eq!(values[2], FieldValue::Int(70000));
    }

    #[test]
    fn test_unpack_short_buffer() {
        let layout = sample_layout();
        let result = layout.unpack(&[0u8; 11]);
        assert!(matches!(
            result,
            Err(XportError::SizeMismatch {
                expected: 12,
                actual: 11
            })
        ));
    }

    #[test]
    fn test_text_is_not_trimmed() {
        let layout = RecordLayout::new(Endian::Big, &[FieldKind::Text(6)]);
        let values = layout.unpack(b"ab    ").unwrap();
        assert_eq!(values[0].as_text(), Some("ab    "));
    }

    #[test]
    fn test_pack_unpack_roundtrip() {
        let layout = sample_layout();
        let values = vec![
            FieldValue::Int(12),
            FieldValue::Text("XY".to_string()),
            FieldValue::Int(-1),
        ];
        let packed = layout.pack(&values).unwrap();
        assert_eq!(packed.len(), 12);
        let unpacked = layout.unpack(&packed).unwrap();
        assert_eq!(unpacked[0], FieldValue::Int(12));
        // Text fields pack space-padded
        assert_eq!(unpacked[1].as_text(), Some("XY  "));
        assert_eq!(unpacked[2], FieldValue::Int(-1));
    }

    #[test]
    fn test_pack_value_count_mismatch() {
        let layout = sample_layout();
        assert!(layout.pack(&[FieldValue::Int(1)]).is_err());
    }

    #[test]
    fn test_little_endian_scalars() {
        let layout = RecordLayout::new(Endian::Little, &[FieldKind::U16, FieldKind::F64]);
        let packed = layout
            .pack(&[FieldValue::Int(513), FieldValue::Float(2.5)])
            .unwrap();
        assert_eq!(&packed[0..2], &[0x01, 0x02]);
        let values = layout.unpack(&packed).unwrap();
        assert_eq!(values[0], FieldValue::Uint(513));
        assert_eq!(values[1], FieldValue::Float(2.5));
    }

    #[test]
    fn test_pascal_text() {
        let layout = RecordLayout::new(Endian::Big, &[FieldKind::PascalText(6)]);
        let packed = layout
            .pack(&[FieldValue::Text("hello".to_string())])
            .unwrap();
        assert_eq!(packed[0], 5);
        let values = layout.unpack(&packed).unwrap();
        assert_eq!(values[0].as_text(), Some("hello"));
    }
}
