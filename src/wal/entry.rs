//! Tagged record codec
//!
//! The unit of both the WAL and segment bodies.
//!
//! ```text
//! Set:    ['s'][key_len: u16 LE][key][value_len: u16 LE][value]
//! Delete: ['d'][key_len: u16 LE][key]
//! ```

use bytes::{Buf, BufMut};

use crate::error::{Result, StrataError};
use crate::memtable::Pair;

/// Tag byte of a set record
pub const SET_TAG: u8 = b's';

/// Tag byte of a delete (tombstone) record
pub const DELETE_TAG: u8 = b'd';

/// Size of a length prefix
const LEN_PREFIX: usize = 2;

/// A single decoded mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Set a key to a value
    Set { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Delete { key: Vec<u8> },
}

impl Record {
    /// Decode the next record from `buf`.
    ///
    /// Returns `Ok(None)` when `buf` is exhausted exactly at a record
    /// boundary. A truncated record or an unknown tag is a
    /// [`StrataError::MalformedEncoding`].
    pub fn decode(buf: &mut impl Buf) -> Result<Option<Record>> {
        if !buf.has_remaining() {
            return Ok(None);
        }

        let tag = buf.get_u8();
        let key = read_field(buf, "key")?;
        match tag {
            SET_TAG => {
                let value = read_field(buf, "value")?;
                Ok(Some(Record::Set { key, value }))
            }
            DELETE_TAG => Ok(Some(Record::Delete { key })),
            other => Err(StrataError::MalformedEncoding(format!(
                "unknown record tag 0x{:02x}",
                other
            ))),
        }
    }

    /// Convert into the memtable representation
    pub fn into_pair(self) -> Pair {
        match self {
            Record::Set { key, value } => Pair::live(key, value),
            Record::Delete { key } => Pair::tombstone(key),
        }
    }
}

/// Encode a set record without building a [`Record`]
pub fn encode_set(buf: &mut impl BufMut, key: &[u8], value: &[u8]) -> Result<()> {
    let key_len = checked_len("key", key)?;
    let value_len = checked_len("value", value)?;
    buf.put_u8(SET_TAG);
    buf.put_u16_le(key_len);
    buf.put_slice(key);
    buf.put_u16_le(value_len);
    buf.put_slice(value);
    Ok(())
}

/// Encode a delete record without building a [`Record`]
pub fn encode_delete(buf: &mut impl BufMut, key: &[u8]) -> Result<()> {
    let key_len = checked_len("key", key)?;
    buf.put_u8(DELETE_TAG);
    buf.put_u16_le(key_len);
    buf.put_slice(key);
    Ok(())
}

/// Encode the record form of a memtable pair
pub fn encode_pair(buf: &mut impl BufMut, pair: &Pair) -> Result<()> {
    if pair.live {
        encode_set(buf, &pair.key, &pair.value)
    } else {
        encode_delete(buf, &pair.key)
    }
}

/// Length of `bytes` as a u16 length prefix
fn checked_len(field: &'static str, bytes: &[u8]) -> Result<u16> {
    u16::try_from(bytes.len()).map_err(|_| StrataError::EntryTooLarge {
        field,
        len: bytes.len(),
    })
}

fn read_field(buf: &mut impl Buf, field: &str) -> Result<Vec<u8>> {
    if buf.remaining() < LEN_PREFIX {
        return Err(StrataError::MalformedEncoding(format!(
            "truncated {} length prefix",
            field
        )));
    }
    let len = buf.get_u16_le() as usize;
    if buf.remaining() < len {
        return Err(StrataError::MalformedEncoding(format!(
            "truncated {}: expected {} bytes, {} left",
            field,
            len,
            buf.remaining()
        )));
    }
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    Ok(bytes)
}
