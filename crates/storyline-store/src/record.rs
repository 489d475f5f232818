//! Log record framing.

use sha2::{Digest, Sha256};

use crate::config::StoreConfig;

const OP_PUT: u8 = 1;
const OP_DELETE: u8 = 2;
const PREFIX_LEN: usize = 1 + 4 + 4;
const CHECKSUM_LEN: usize = 8;

/// A single logged mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Record<'a> {
    Put { key: &'a str, value: &'a [u8] },
    Delete { key: &'a str },
}

/// Outcome of decoding the bytes at the current log position.
#[derive(Debug)]
pub(crate) enum Decoded<'a> {
    /// A valid record and the number of bytes it occupies.
    Record(Record<'a>, usize),
    /// The buffer ends before the record does.
    Incomplete,
    /// The record is fully present but its checksum does not match.
    ChecksumMismatch { len: usize },
    /// The record framing itself is invalid.
    Malformed(String),
}

impl Record<'_> {
    /// Encodes the record with its trailing checksum.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn encode(&self) -> Vec<u8> {
        // Key and value lengths are bounded by `StoreConfig` before a record
        // is built, so both fit in a u32.
        let (op, key, value): (u8, &str, &[u8]) = match *self {
            Record::Put { key, value } => (OP_PUT, key, value),
            Record::Delete { key } => (OP_DELETE, key, &[]),
        };

        let mut bytes = Vec::with_capacity(PREFIX_LEN + key.len() + value.len() + CHECKSUM_LEN);
        bytes.push(op);
        bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
        bytes.extend_from_slice(key.as_bytes());
        bytes.extend_from_slice(value);
        let checksum = checksum(&bytes);
        bytes.extend_from_slice(&checksum);
        bytes
    }

    pub(crate) fn key(&self) -> &str {
        match self {
            Record::Put { key, .. } | Record::Delete { key } => key,
        }
    }
}

/// Decodes the record at the start of `buf`.
///
/// Lengths above the bounds in `config` are reported as `Malformed` before
/// the buffer length is consulted: no such record can have been written, so
/// a short buffer behind one is damage rather than an unfinished append.
pub(crate) fn decode<'a>(buf: &'a [u8], config: &StoreConfig) -> Decoded<'a> {
    if buf.len() < PREFIX_LEN {
        return Decoded::Incomplete;
    }

    let op = buf[0];
    let key_len = u32::from_le_bytes([buf[1], buf[2], buf[3], buf[4]]);
    let value_len = u32::from_le_bytes([buf[5], buf[6], buf[7], buf[8]]);
    if key_len > config.max_key_size {
        return Decoded::Malformed(format!(
            "key length {key_len} exceeds bound {}",
            config.max_key_size
        ));
    }
    if value_len > config.max_value_size {
        return Decoded::Malformed(format!(
            "value length {value_len} exceeds bound {}",
            config.max_value_size
        ));
    }
    let (key_len, value_len) = (key_len as usize, value_len as usize);
    let Some(len) = PREFIX_LEN
        .checked_add(key_len)
        .and_then(|n| n.checked_add(value_len))
        .and_then(|n| n.checked_add(CHECKSUM_LEN))
    else {
        return Decoded::Malformed("record length overflows".to_owned());
    };
    if buf.len() < len {
        return Decoded::Incomplete;
    }

    let body_end = len - CHECKSUM_LEN;
    if checksum(&buf[..body_end]) != buf[body_end..len] {
        return Decoded::ChecksumMismatch { len };
    }

    let key_end = PREFIX_LEN + key_len;
    let Ok(key) = std::str::from_utf8(&buf[PREFIX_LEN..key_end]) else {
        return Decoded::Malformed("key is not valid UTF-8".to_owned());
    };
    let record = match op {
        OP_PUT => Record::Put {
            key,
            value: &buf[key_end..body_end],
        },
        OP_DELETE if value_len == 0 => Record::Delete { key },
        OP_DELETE => return Decoded::Malformed("delete record carries a value".to_owned()),
        other => return Decoded::Malformed(format!("unknown op {other}")),
    };
    Decoded::Record(record, len)
}

fn checksum(bytes: &[u8]) -> [u8; CHECKSUM_LEN] {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&digest[..CHECKSUM_LEN]);
    out
}
