use freq_core::{CoreId, FreqError, Result, Strategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Root configuration structure parsed from `freqplot.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FreqConfig {
    /// Acquisition and history settings.
    pub sampling: SamplingConfig,
    /// Terminal output settings.
    pub display: DisplayConfig,
}

impl FreqConfig {
    /// Reject values the sampler cannot run with.
    pub fn validate(&self) -> Result<()> {
        let s = &self.sampling;
        if s.interval_ms == 0 {
            return Err(FreqError::Config("sampling.interval_ms must be > 0".into()));
        }
        if s.history == 0 {
            return Err(FreqError::Config("sampling.history must be > 0".into()));
        }
        if let Some(cores) = &s.cores {
            let mut seen = HashSet::new();
            for core in cores {
                if !seen.insert(*core) {
                    return Err(FreqError::Config(format!(
                        "sampling.cores lists {core} more than once"
                    )));
                }
            }
        }

        let d = &self.display;
        if d.max_legend_rows == 0 {
            return Err(FreqError::Config("display.max_legend_rows must be > 0".into()));
        }
        if !(0.0..1.0).contains(&d.range_padding) {
            return Err(FreqError::Config(
                "display.range_padding must be within [0, 1)".into(),
            ));
        }
        Ok(())
    }
}

/// Sampling cadence, history depth, strategy and core selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Tick period in milliseconds.
    pub interval_ms: u64,
    /// Number of readings kept per core.
    pub history: usize,
    /// How frequencies are acquired.
    pub strategy: Strategy,
    /// Cores to sample. `None` = every discoverable core.
    pub cores: Option<Vec<CoreId>>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            history:     30,
            strategy:    Strategy::Library,
            cores:       None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Legend entries per column before wrapping into a new column.
    pub max_legend_rows: usize,
    /// Fraction added below the minimum and above the maximum frequency.
    pub range_padding: f64,
    /// Clear the terminal before each frame.
    pub clear_screen: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_legend_rows: 20,
            range_padding:   0.01,
            clear_screen:    true,
        }
    }
}
