//! Named ROM regions and construction-time validation.

use std::collections::BTreeMap;

use thiserror::Error;

/// A ROM set that cannot drive the board. Emulation must not start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RomError {
    #[error("ROM region `{table}` is missing")]
    Missing { table: &'static str },
    #[error("ROM region `{table}` is {actual} bytes, need at least {expected}")]
    Undersized {
        table: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// ROM and PROM images keyed by region name, as supplied by the host.
#[derive(Debug, Clone, Default)]
pub struct RomSet {
    regions: BTreeMap<String, Vec<u8>>,
}

impl RomSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a region.
    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.regions.insert(name.into(), data);
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, data: Vec<u8>) -> Self {
        self.insert(name, data);
        self
    }

    /// Fetch a region, checking it holds at least `expected` bytes. Only the
    /// first `expected` bytes are returned.
    pub fn region(&self, table: &'static str, expected: usize) -> Result<&[u8], RomError> {
        let data = self
            .regions
            .get(table)
            .ok_or(RomError::Missing { table })?;
        if data.len() < expected {
            return Err(RomError::Undersized {
                table,
                expected,
                actual: data.len(),
            });
        }
        if data.len() > expected {
            log::debug!("ROM region `{table}`: using {expected} of {} bytes", data.len());
        }
        Ok(&data[..expected])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_region() {
        let roms = RomSet::new();
        assert_eq!(
            roms.region("road", 0x4000),
            Err(RomError::Missing { table: "road" })
        );
    }

    #[test]
    fn oversized_region_is_truncated() {
        let roms = RomSet::new().with("edge", vec![7; 0x180]);
        assert_eq!(roms.region("edge", 0x100).map(<[u8]>::len), Ok(0x100));
    }

    #[test]
    fn diagnostic_names_the_table() {
        let roms = RomSet::new().with("road enable", vec![0; 0x10]);
        let err = roms.region("road enable", 0x20).expect_err("too small");
        assert_eq!(
            err.to_string(),
            "ROM region `road enable` is 16 bytes, need at least 32"
        );
    }
}
