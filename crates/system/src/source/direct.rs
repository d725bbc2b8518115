use super::{cpufreq_file, online_cores, FrequencySource, SYSFS_CPU_ROOT};
use freq_core::{CoreId, FreqError, FrequencyRange, FrequencyReading, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// Live processor info, one `cpu MHz` line per logical core.
pub const PROC_CPUINFO: &str = "/proc/cpuinfo";

/// Per-core list of frequencies (kHz) the driver can switch between.
const AVAILABLE_FREQUENCIES: &str = "scaling_available_frequencies";

/// Reads frequencies straight from kernel text interfaces.
///
/// - range: `<sysfs>/cpuN/cpufreq/scaling_available_frequencies`
/// - current: `cpu MHz` lines of `/proc/cpuinfo`
/// - cores: `<sysfs>/online`
#[derive(Debug, Clone)]
pub struct DirectSource {
    sysfs_root: PathBuf,
    cpuinfo:    PathBuf,
}

impl DirectSource {
    pub fn new() -> Self {
        Self::with_paths(SYSFS_CPU_ROOT, PROC_CPUINFO)
    }

    /// Use alternative locations for the sysfs cpu root and the cpuinfo file.
    pub fn with_paths(sysfs_root: impl Into<PathBuf>, cpuinfo: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_root: sysfs_root.into(),
            cpuinfo:    cpuinfo.into(),
        }
    }
}

impl Default for DirectSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencySource for DirectSource {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn cores(&mut self) -> Result<Vec<CoreId>> {
        online_cores(&self.sysfs_root)
    }

    fn range(&mut self, core: CoreId) -> Result<FrequencyRange> {
        let path = cpufreq_file(&self.sysfs_root, core, AVAILABLE_FREQUENCIES);
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            FreqError::UnsupportedPlatform(format!("cannot read '{}': {e}", path.display()))
        })?;

        let (min, max) = parse_available_frequencies(&raw).ok_or_else(|| {
            FreqError::UnsupportedPlatform(format!(
                "'{}' lists no usable frequencies",
                path.display()
            ))
        })?;
        Ok(FrequencyRange::from_khz(min, max))
    }

    fn poll_all(&mut self, cores: &[CoreId]) -> Result<Vec<FrequencyReading>> {
        let raw = std::fs::read_to_string(&self.cpuinfo).map_err(|e| {
            FreqError::Read(format!("cannot read '{}': {e}", self.cpuinfo.display()))
        })?;

        let entries = parse_core_mhz(&raw);
        if entries.is_empty() {
            return Err(FreqError::Read(format!(
                "no 'cpu MHz' entries in '{}'",
                self.cpuinfo.display()
            )));
        }

        let per_core: HashMap<CoreId, f64> = entries
            .into_iter()
            .filter_map(|(core, mhz)| mhz.map(|mhz| (core, mhz)))
            .collect();
        if per_core.is_empty() {
            return Err(FreqError::Read(format!(
                "every 'cpu MHz' entry in '{}' is malformed",
                self.cpuinfo.display()
            )));
        }

        Ok(cores
            .iter()
            .filter_map(|&core| {
                per_core
                    .get(&core)
                    .map(|&mhz| FrequencyReading::new(core, mhz))
            })
            .collect())
    }
}

/// Parse a whitespace-separated list of integers and return `(min, max)`.
///
/// Tokens that are not integers are ignored; `None` if nothing parses.
pub fn parse_available_frequencies(raw: &str) -> Option<(u64, u64)> {
    raw.split_whitespace()
        .filter_map(|tok| tok.parse::<u64>().ok())
        .fold(None, |acc, v| match acc {
            None             => Some((v, v)),
            Some((lo, hi))   => Some((lo.min(v), hi.max(v))),
        })
}

/// Extract the `cpu MHz : <value>` values of a cpuinfo document in order.
///
/// A matching key with an unparsable value keeps its slot as `None`; lines
/// with any other key are skipped.
pub fn parse_cpu_mhz(raw: &str) -> Vec<Option<f64>> {
    parse_core_mhz(raw).into_iter().map(|(_, mhz)| mhz).collect()
}

/// Like [`parse_cpu_mhz`], with each value attributed to a core.
///
/// An entry belongs to the core named by the `processor : N` line of its
/// block. Documents without `processor` lines fall back to file order, so
/// entry `i` belongs to core `i`.
pub fn parse_core_mhz(raw: &str) -> Vec<(CoreId, Option<f64>)> {
    let mut entries = Vec::new();
    let mut processor = None;

    for line in raw.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        if key.trim() == "processor" {
            processor = value.trim().parse::<usize>().ok().map(CoreId);
        } else if is_cpu_mhz_key(key) {
            let core = processor.take().unwrap_or(CoreId(entries.len()));
            let mhz = value.trim().parse::<f64>().ok().filter(|v| v.is_finite());
            entries.push((core, mhz));
        }
    }
    entries
}

// "cpu MHz", with any run of spaces or tabs around and between the words.
fn is_cpu_mhz_key(key: &str) -> bool {
    let mut words = key.split_whitespace();
    matches!(
        (words.next(), words.next(), words.next()),
        (Some("cpu"), Some("MHz"), None)
    )
}
