use crate::state::CoreId;
use thiserror::Error;

/// Remediation hint attached to every range-discovery failure.
pub const RANGE_REMEDIATION: &str =
    "range discovery unavailable; check power-management driver configuration";

/// Top-level error type shared by every freqplot crate.
#[derive(Debug, Error)]
pub enum FreqError {
    /// Invalid core selection or configuration value. Fatal at startup.
    #[error("config error: {0}")]
    Config(String),

    /// The kernel does not expose the interface needed for range discovery.
    #[error("unsupported platform: {0} ({RANGE_REMEDIATION})")]
    UnsupportedPlatform(String),

    /// The frequency acquisition mechanism itself is unusable.
    #[error("read error: {0}")]
    Read(String),

    /// A core outside the configured selection was referenced.
    #[error("unknown core: {0}")]
    UnknownCore(CoreId),

    #[error("invalid state: cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state:  &'static str,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T, E = FreqError> = std::result::Result<T, E>;
