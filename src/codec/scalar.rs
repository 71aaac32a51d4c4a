//! Scalar encoding and decoding
//!
//! Byte layout per type tag:
//! - int:    i32 LE (4 bytes)
//! - float:  f64 LE (8 bytes)
//! - string: u32 LE length + UTF-8 bytes, no terminator, no padding

use crate::errors::{ColumnarError, ColumnarResult};

use super::types::{ColumnType, Value};

/// Size of the string length prefix
pub const STRING_PREFIX_LEN: usize = 4;

/// Appends the encoding of `value` under `tag` to `buf`.
///
/// # Errors
///
/// `UnsupportedType` if the value does not fit the tag (wrong variant,
/// an int outside int32, `Null`, or a string longer than `u32::MAX`).
pub fn encode_value(tag: ColumnType, value: &Value, buf: &mut Vec<u8>) -> ColumnarResult<()> {
    match (tag, value) {
        (ColumnType::Int, Value::Int(v)) => {
            let narrow = i32::try_from(*v).map_err(|_| {
                ColumnarError::UnsupportedType(format!("{} does not fit in int32", v))
            })?;
            buf.extend_from_slice(&narrow.to_le_bytes());
        }
        (ColumnType::Float, Value::Float(v)) => {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        (ColumnType::String, Value::Str(s)) => {
            let len = u32::try_from(s.len()).map_err(|_| {
                ColumnarError::UnsupportedType(format!(
                    "string of {} bytes exceeds the u32 length prefix",
                    s.len()
                ))
            })?;
            buf.extend_from_slice(&len.to_le_bytes());
            buf.extend_from_slice(s.as_bytes());
        }
        (tag, value) => {
            return Err(ColumnarError::UnsupportedType(format!(
                "cannot encode {:?} as {}",
                value, tag
            )))
        }
    }
    Ok(())
}

/// Encodes a whole column into one contiguous payload.
pub fn encode_column(tag: ColumnType, values: &[Value]) -> ColumnarResult<Vec<u8>> {
    let capacity = tag.fixed_width().unwrap_or(16) * values.len();
    let mut buf = Vec::with_capacity(capacity);
    for value in values {
        encode_value(tag, value, &mut buf)?;
    }
    Ok(buf)
}

fn take<'a>(data: &'a [u8], offset: usize, len: usize, what: &str) -> ColumnarResult<&'a [u8]> {
    let end = offset.checked_add(len).filter(|end| *end <= data.len());
    match end {
        Some(end) => Ok(&data[offset..end]),
        None => Err(ColumnarError::corrupt_at_offset(
            offset as u64,
            format!(
                "truncated {}: need {} bytes, {} available",
                what,
                len,
                data.len().saturating_sub(offset)
            ),
        )),
    }
}

/// Decodes one value starting at `offset`.
///
/// Returns the value and the offset just past it.
///
/// # Errors
///
/// `CorruptData` if fewer bytes remain than the value needs, or a string
/// body is not valid UTF-8.
pub fn decode_value(tag: ColumnType, data: &[u8], offset: usize) -> ColumnarResult<(Value, usize)> {
    match tag {
        ColumnType::Int => {
            let bytes = take(data, offset, 4, "int32")?;
            let v = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            Ok((Value::Int(v as i64), offset + 4))
        }
        ColumnType::Float => {
            let bytes = take(data, offset, 8, "float64")?;
            let mut raw = [0u8; 8];
            raw.copy_from_slice(bytes);
            Ok((Value::Float(f64::from_le_bytes(raw)), offset + 8))
        }
        ColumnType::String => {
            let prefix = take(data, offset, STRING_PREFIX_LEN, "string length prefix")?;
            let len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
            let body_start = offset + STRING_PREFIX_LEN;
            let body = take(data, body_start, len, "string body")?;
            let s = std::str::from_utf8(body).map_err(|e| {
                ColumnarError::corrupt_at_offset(body_start as u64, format!("invalid UTF-8: {}", e))
            })?;
            Ok((Value::Str(s.to_string()), body_start + len))
        }
    }
}

/// Decodes a payload that must consist of whole values and nothing else.
///
/// # Errors
///
/// `CorruptData` if a fixed-width payload is not a multiple of the width,
/// or the last string would run past the end of `data`.
pub fn decode_column(tag: ColumnType, data: &[u8]) -> ColumnarResult<Vec<Value>> {
    if let Some(width) = tag.fixed_width() {
        if data.len() % width != 0 {
            return Err(ColumnarError::CorruptData(format!(
                "{} payload of {} bytes is not a multiple of {}",
                tag,
                data.len(),
                width
            )));
        }
    }

    let mut values = Vec::with_capacity(data.len() / tag.fixed_width().unwrap_or(8));
    let mut offset = 0;
    while offset < data.len() {
        let (value, next) = decode_value(tag, data, offset)?;
        values.push(value);
        offset = next;
    }
    Ok(values)
}

/// Smallest number of bytes one value of `tag` can occupy
fn min_encoded_width(tag: ColumnType) -> usize {
    tag.fixed_width().unwrap_or(STRING_PREFIX_LEN)
}

/// Decodes exactly `count` values from the start of `data`.
///
/// Returns the values and the number of bytes consumed. Trailing bytes are
/// left for the caller to judge.
///
/// # Errors
///
/// `CorruptData` if `data` is too short to hold `count` values, checked
/// before anything is allocated.
pub fn decode_exact(tag: ColumnType, data: &[u8], count: usize) -> ColumnarResult<(Vec<Value>, usize)> {
    let max_count = data.len() / min_encoded_width(tag);
    if count > max_count {
        return Err(ColumnarError::CorruptData(format!(
            "{} rows declared but {} bytes hold at most {} {} values",
            count,
            data.len(),
            max_count,
            tag
        )));
    }

    let mut values = Vec::with_capacity(count);
    let mut offset = 0;
    for _ in 0..count {
        let (value, next) = decode_value(tag, data, offset)?;
        values.push(value);
        offset = next;
    }
    Ok((values, offset))
}
