//! Storyline Store — a durable, key-ordered map from string keys to bytes.
//!
//! Entries live in memory in a `BTreeMap` and every mutation is first
//! appended to a single log file and synced. Opening a store replays the
//! log, so committed entries survive a restart with identical contents and
//! ordering.
//!
//! # Log Format
//!
//! ```text
//! header: [magic "STLG"][format:u16][map_id:u8][max_key:u32][max_value:u32][max_entries:u64]
//! record: [op:u8][key_len:u32][value_len:u32][key][value][checksum:8B]
//! ```
//!
//! Integers are little endian. The checksum is the first eight bytes of the
//! SHA-256 digest of everything preceding it in the record.

pub mod config;
pub mod durable_map;
pub mod error;
mod record;

pub use config::StoreConfig;
pub use durable_map::DurableMap;
pub use error::StoreError;
