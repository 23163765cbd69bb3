//! Error types for stigmergy_core.
//!
//! Only construction can fail. Once an engine exists, every operation is
//! total: economic rejections are reported through outcome values and
//! out-of-range spatial queries read as zero.

use stigmergy_data::ColonyId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Grid dimensions that cannot hold a single cell.
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    /// A command or lookup named a colony that does not exist.
    #[error("Unknown colony: {0}")]
    UnknownColony(ColonyId),

    /// Configuration rejected at construction time.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    #[must_use]
    pub fn invalid_grid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidGrid(msg.into())
    }

    #[must_use]
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_grid("0x0");
        assert_eq!(err.to_string(), "Invalid grid: 0x0");
        let err = CoreError::UnknownColony(ColonyId(7));
        assert_eq!(err.to_string(), "Unknown colony: colony#7");
    }
}
