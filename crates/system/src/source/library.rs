use super::{cpufreq_file, FrequencySource, SYSFS_CPU_ROOT};
use freq_core::{CoreId, FreqError, FrequencyRange, FrequencyReading, Result};
use std::path::{Path, PathBuf};
use sysinfo::{CpuRefreshKind, RefreshKind, System};

/// Frequencies from the `sysinfo` crate.
///
/// `sysinfo` has no notion of an operable range, so the bounds come from the
/// cpufreq policy limits the kernel publishes next to the live value.
pub struct LibrarySource {
    system:     System,
    sysfs_root: PathBuf,
}

impl LibrarySource {
    pub fn new() -> Self {
        Self::with_sysfs_root(SYSFS_CPU_ROOT)
    }

    pub fn with_sysfs_root(sysfs_root: impl Into<PathBuf>) -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing().with_frequency()),
        );
        Self {
            system,
            sysfs_root: sysfs_root.into(),
        }
    }
}

impl Default for LibrarySource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencySource for LibrarySource {
    fn name(&self) -> &'static str {
        "library"
    }

    fn cores(&mut self) -> Result<Vec<CoreId>> {
        match self.system.cpus().len() {
            0 => Err(FreqError::Read("sysinfo reports no CPUs".into())),
            n => Ok((0..n).map(CoreId).collect()),
        }
    }

    fn range(&mut self, core: CoreId) -> Result<FrequencyRange> {
        policy_range(&self.sysfs_root, core)
    }

    fn poll_all(&mut self, cores: &[CoreId]) -> Result<Vec<FrequencyReading>> {
        self.system.refresh_cpu_frequency();

        let current: Vec<u64> = self.system.cpus().iter().map(|c| c.frequency()).collect();
        if current.is_empty() {
            return Err(FreqError::Read("sysinfo reports no CPUs".into()));
        }

        Ok(select_readings(&current, cores))
    }
}

/// Pick the requested cores out of a per-core MHz list.
///
/// Cores past the end of the list, and cores reporting 0 (sysinfo's value
/// for "unknown"), are left out.
fn select_readings(current: &[u64], cores: &[CoreId]) -> Vec<FrequencyReading> {
    cores
        .iter()
        .filter_map(|&core| match current.get(core.index()) {
            Some(&mhz) if mhz > 0 => Some(FrequencyReading::new(core, mhz as f64)),
            _ => None,
        })
        .collect()
}

fn policy_range(root: &Path, core: CoreId) -> Result<FrequencyRange> {
    let min = read_khz(&cpufreq_file(root, core, "scaling_min_freq"))?;
    let max = read_khz(&cpufreq_file(root, core, "scaling_max_freq"))?;
    Ok(FrequencyRange::from_khz(min, max))
}

fn read_khz(path: &Path) -> Result<u64> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        FreqError::UnsupportedPlatform(format!("cannot read '{}': {e}", path.display()))
    })?;
    raw.trim().parse::<u64>().map_err(|e| {
        FreqError::UnsupportedPlatform(format!("'{}' is not a frequency: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn select_skips_unknown_and_out_of_range_cores() {
        let readings = select_readings(&[2400, 0, 1800], &[CoreId(2), CoreId(1), CoreId(0), CoreId(5)]);
        assert_eq!(
            readings,
            vec![
                FrequencyReading::new(CoreId(2), 1800.0),
                FrequencyReading::new(CoreId(0), 2400.0),
            ]
        );
    }

    #[test]
    fn range_from_policy_limits() {
        let dir = tempfile::tempdir().unwrap();
        let freq_dir = dir.path().join("cpu1").join("cpufreq");
        fs::create_dir_all(&freq_dir).unwrap();
        fs::write(freq_dir.join("scaling_min_freq"), "400000\n").unwrap();
        fs::write(freq_dir.join("scaling_max_freq"), "4200000\n").unwrap();

        let range = policy_range(dir.path(), CoreId(1)).unwrap();
        assert_eq!(range, FrequencyRange::new(400.0, 4200.0));
    }

    #[test]
    fn missing_policy_is_unsupported_platform() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            policy_range(dir.path(), CoreId(0)),
            Err(FreqError::UnsupportedPlatform(_))
        ));
    }
}
