//! Frequency acquisition strategies.
//!
//! Both strategies implement [`FrequencySource`]; one is picked at startup
//! by [`open`] and never swapped while sampling.

pub mod direct;
pub mod library;

pub use direct::DirectSource;
pub use library::LibrarySource;

use freq_core::{CoreId, FreqError, FrequencyRange, FrequencyReading, Result, Strategy};

/// Capability: read the current frequency of a set of cores.
///
/// Calls may block on file or library I/O, so the async driver runs them on
/// the blocking pool.
pub trait FrequencySource: Send {
    /// Short identifier used in logs, e.g. `"direct"`.
    fn name(&self) -> &'static str;

    /// Online cores this source can read, ascending. May be sparse.
    fn cores(&mut self) -> Result<Vec<CoreId>>;

    /// Operable (min, max) frequency of `core`, in MHz.
    ///
    /// Fails with `UnsupportedPlatform` when the kernel interface is absent.
    fn range(&mut self, core: CoreId) -> Result<FrequencyRange>;

    /// One reading per requested core, in request order.
    ///
    /// A core whose value is unavailable this cycle is left out of the
    /// result. An `Err` means the mechanism as a whole is unusable.
    fn poll_all(&mut self, cores: &[CoreId]) -> Result<Vec<FrequencyReading>>;
}

/// Construct the source for `strategy` against the live system.
pub fn open(strategy: Strategy) -> Box<dyn FrequencySource> {
    match strategy {
        Strategy::Library => Box::new(LibrarySource::new()),
        Strategy::Direct  => Box::new(DirectSource::new()),
    }
}

/// Kernel location of the per-core `cpufreq` directories.
pub const SYSFS_CPU_ROOT: &str = "/sys/devices/system/cpu";

/// Parse a kernel cpu list such as `0-3,6,8-9` into core ids.
///
/// `None` if any element is malformed.
pub fn parse_cpu_list(raw: &str) -> Option<Vec<CoreId>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(Vec::new());
    }

    let mut cores = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        match part.split_once('-') {
            Some((lo, hi)) => {
                let lo = lo.trim().parse::<usize>().ok()?;
                let hi = hi.trim().parse::<usize>().ok()?;
                if lo > hi {
                    return None;
                }
                cores.extend((lo..=hi).map(CoreId));
            }
            None => cores.push(CoreId(part.parse::<usize>().ok()?)),
        }
    }
    cores.sort_unstable();
    cores.dedup();
    Some(cores)
}

/// Online cores according to `<root>/online`.
pub(crate) fn online_cores(root: &std::path::Path) -> Result<Vec<CoreId>> {
    let path = root.join("online");
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| FreqError::Read(format!("cannot read '{}': {e}", path.display())))?;
    parse_cpu_list(&raw)
        .filter(|cores| !cores.is_empty())
        .ok_or_else(|| FreqError::Read(format!("'{}' lists no usable cores", path.display())))
}

pub(crate) fn cpufreq_file(root: &std::path::Path, core: CoreId, file: &str) -> std::path::PathBuf {
    root.join(format!("cpu{}", core.index()))
        .join("cpufreq")
        .join(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_list_ranges_and_singles() {
        let cores = parse_cpu_list("0-3,6,8-9\n").unwrap();
        let ids: Vec<usize> = cores.iter().map(|c| c.index()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 6, 8, 9]);
        assert_eq!(parse_cpu_list("0\n").unwrap(), vec![CoreId(0)]);
    }

    #[test]
    fn cpu_list_rejects_garbage() {
        assert!(parse_cpu_list("0-x").is_none());
        assert!(parse_cpu_list("5-2").is_none());
        assert!(parse_cpu_list("1,,2").is_none());
    }

    #[test]
    fn online_cores_from_sysfs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("online"), "0-1,3\n").unwrap();
        assert_eq!(
            online_cores(dir.path()).unwrap(),
            vec![CoreId(0), CoreId(1), CoreId(3)]
        );
    }

    #[test]
    fn online_cores_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(online_cores(dir.path()), Err(FreqError::Read(_))));
    }

    #[test]
    fn cpufreq_path_layout() {
        let path = cpufreq_file(std::path::Path::new("/sys/devices/system/cpu"), CoreId(3), "scaling_max_freq");
        assert_eq!(
            path,
            std::path::Path::new("/sys/devices/system/cpu/cpu3/cpufreq/scaling_max_freq")
        );
    }
}
