use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FreqError;

/// 0-based logical core index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoreId(pub usize);

impl CoreId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cpu{}", self.0)
    }
}

/// One frequency sample (MHz) for one core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyReading {
    pub core: CoreId,
    pub mhz:  f64,
}

impl FrequencyReading {
    pub fn new(core: CoreId, mhz: f64) -> Self {
        Self { core, mhz }
    }
}

/// Operable (min, max) frequency in MHz. Only used for display scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyRange {
    pub min: f64,
    pub max: f64,
}

impl FrequencyRange {
    /// Build a range, swapping the bounds if they arrive reversed.
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Build a range from kernel sysfs values, which are reported in kHz.
    pub fn from_khz(min: u64, max: u64) -> Self {
        Self::new(min as f64 / 1000.0, max as f64 / 1000.0)
    }

    /// Smallest range covering both `self` and `other`.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Display bounds widened by `fraction` on both ends
    /// (0.01 gives the usual 99 % / 101 % axis limits).
    #[must_use]
    pub fn padded(self, fraction: f64) -> Self {
        Self {
            min: self.min * (1.0 - fraction),
            max: self.max * (1.0 + fraction),
        }
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `mhz` inside the range as a fraction in `[0, 1]`.
    #[must_use]
    pub fn fraction(&self, mhz: f64) -> f64 {
        if self.span() <= 0.0 {
            return 0.0;
        }
        ((mhz - self.min) / self.span()).clamp(0.0, 1.0)
    }
}

/// Frequency acquisition strategy, selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// System-metrics library (`sysinfo`).
    #[default]
    Library,
    /// Direct parsing of the kernel's sysfs and `/proc/cpuinfo` text.
    Direct,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Library => f.write_str("library"),
            Strategy::Direct  => f.write_str("direct"),
        }
    }
}

impl FromStr for Strategy {
    type Err = FreqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "library" => Ok(Strategy::Library),
            "direct"  => Ok(Strategy::Direct),
            other     => Err(FreqError::Config(format!(
                "unknown strategy '{other}' (expected 'library' or 'direct')"
            ))),
        }
    }
}

/// History of a single core as seen at snapshot time.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreSeries {
    pub core:     CoreId,
    pub range:    FrequencyRange,
    /// Readings in MHz, oldest first. The x-axis is the insertion index.
    pub readings: Vec<f64>,
}

impl CoreSeries {
    #[must_use]
    pub fn latest(&self) -> Option<f64> {
        self.readings.last().copied()
    }
}

/// Immutable point-in-time view of every selected core's history.
///
/// Produced by the sample controller, consumed by a renderer. It is a plain
/// copy, so holding one never blocks further sampling.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Number of successful ticks that fed this snapshot.
    pub tick:     u64,
    pub taken_at: DateTime<Local>,
    /// Per-core series in the configured selection order.
    pub cores:    Vec<CoreSeries>,
    /// Union of all per-core ranges.
    pub range:    FrequencyRange,
    /// Cores whose reading was unavailable during the latest tick.
    pub skipped:  Vec<CoreId>,
    /// Capacity of every per-core history.
    pub capacity: usize,
}

impl Snapshot {
    /// Series for `core`, if it is part of the selection.
    #[must_use]
    pub fn series(&self, core: CoreId) -> Option<&CoreSeries> {
        self.cores.iter().find(|s| s.core == core)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_from_khz_converts_to_mhz() {
        let range = FrequencyRange::from_khz(800_000, 1_600_000);
        assert_eq!(range, FrequencyRange { min: 800.0, max: 1600.0 });
    }

    #[test]
    fn range_new_orders_bounds() {
        let range = FrequencyRange::new(3000.0, 1000.0);
        assert_eq!(range.min, 1000.0);
        assert_eq!(range.max, 3000.0);
    }

    #[test]
    fn range_union_and_padding() {
        let a = FrequencyRange::new(800.0, 2000.0);
        let b = FrequencyRange::new(1200.0, 3000.0);
        let padded = a.union(b).padded(0.01);
        assert!((padded.min - 792.0).abs() < 1e-9);
        assert!((padded.max - 3030.0).abs() < 1e-9);
    }

    #[test]
    fn range_fraction_is_clamped() {
        let range = FrequencyRange::new(1000.0, 2000.0);
        assert_eq!(range.fraction(1500.0), 0.5);
        assert_eq!(range.fraction(500.0), 0.0);
        assert_eq!(range.fraction(2500.0), 1.0);
        assert_eq!(FrequencyRange::new(1.0, 1.0).fraction(1.0), 0.0);
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("Direct".parse::<Strategy>().unwrap(), Strategy::Direct);
        assert_eq!("library".parse::<Strategy>().unwrap(), Strategy::Library);
        assert!("psutil".parse::<Strategy>().is_err());
    }

    #[test]
    fn core_id_display() {
        assert_eq!(CoreId(7).to_string(), "cpu7");
    }
}
