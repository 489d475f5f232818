//! Store configuration and the log header that records it.

use crate::error::StoreError;

/// Magic bytes opening every log file.
pub const MAGIC: &[u8; 4] = b"STLG";

/// Version tag of the log layout.
pub const FORMAT_VERSION: u16 = 1;

/// Size of the encoded header in bytes.
pub const HEADER_LEN: usize = 4 + 2 + 1 + 4 + 4 + 8;

/// Constants fixed when a store is created.
///
/// They are written to the log header; reopening a log with different values
/// is rejected rather than reinterpreting existing entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Identifies which map a log belongs to.
    pub map_id: u8,
    /// Largest accepted key, in bytes.
    pub max_key_size: u32,
    /// Largest accepted value, in bytes.
    pub max_value_size: u32,
    /// Largest number of live entries.
    pub max_entries: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            map_id: 0,
            max_key_size: 44,
            max_value_size: 64 * 1024,
            max_entries: 100_000,
        }
    }
}

impl StoreConfig {
    pub(crate) fn encode_header(&self) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        header[0..4].copy_from_slice(MAGIC);
        header[4..6].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
        header[6] = self.map_id;
        header[7..11].copy_from_slice(&self.max_key_size.to_le_bytes());
        header[11..15].copy_from_slice(&self.max_value_size.to_le_bytes());
        header[15..23].copy_from_slice(&self.max_entries.to_le_bytes());
        header
    }

    /// Checks that `bytes` starts with a header written by this
    /// configuration.
    pub(crate) fn verify_header(&self, bytes: &[u8]) -> Result<(), StoreError> {
        if bytes.len() < HEADER_LEN || &bytes[0..4] != MAGIC {
            return Err(StoreError::Corrupt {
                offset: 0,
                reason: "missing or unrecognized header".to_owned(),
            });
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        let max_key_size = u32::from_le_bytes([bytes[7], bytes[8], bytes[9], bytes[10]]);
        let max_value_size = u32::from_le_bytes([bytes[11], bytes[12], bytes[13], bytes[14]]);
        let mut entries = [0u8; 8];
        entries.copy_from_slice(&bytes[15..23]);
        let max_entries = u64::from_le_bytes(entries);

        let checks = [
            ("format version", u64::from(version), u64::from(FORMAT_VERSION)),
            ("map id", u64::from(bytes[6]), u64::from(self.map_id)),
            ("max key size", u64::from(max_key_size), u64::from(self.max_key_size)),
            ("max value size", u64::from(max_value_size), u64::from(self.max_value_size)),
            ("max entries", max_entries, self.max_entries),
        ];
        for (field, stored, configured) in checks {
            if stored != configured {
                return Err(StoreError::ConfigMismatch {
                    field,
                    stored,
                    configured,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_written_by_config_verifies_against_same_config() {
        let config = StoreConfig::default();

        let header = config.encode_header();

        assert!(config.verify_header(&header).is_ok());
    }

    #[test]
    fn test_header_rejects_different_map_id() {
        // Arrange
        let header = StoreConfig::default().encode_header();
        let other = StoreConfig {
            map_id: 7,
            ..StoreConfig::default()
        };

        // Act
        let result = other.verify_header(&header);

        // Assert
        match result.unwrap_err() {
            StoreError::ConfigMismatch {
                field,
                stored,
                configured,
            } => {
                assert_eq!(field, "map id");
                assert_eq!(stored, 0);
                assert_eq!(configured, 7);
            }
            other => panic!("expected ConfigMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_header_rejects_foreign_file() {
        let result = StoreConfig::default().verify_header(b"not a storyline log at all");

        assert!(matches!(result, Err(StoreError::Corrupt { offset: 0, .. })));
    }
}
