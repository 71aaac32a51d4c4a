//! Binary codec for column values
//!
//! Every multi-byte quantity is little-endian. Decoding never reads past
//! the buffer it was given: short input is `CorruptData`.

mod checksum;
mod scalar;
mod types;

pub use checksum::{compute_checksum, format_checksum, parse_checksum};
pub use scalar::{decode_column, decode_exact, decode_value, encode_column, encode_value, STRING_PREFIX_LEN};
pub use types::{Column, ColumnType, Schema, Value};
