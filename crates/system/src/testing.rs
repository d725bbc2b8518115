//! In-memory frequency source for controller and driver tests.

use crate::source::FrequencySource;
use freq_core::{CoreId, FreqError, FrequencyRange, FrequencyReading, Result};
use std::collections::HashMap;

type PollFn = Box<dyn FnMut(&[CoreId]) -> Result<Vec<FrequencyReading>> + Send>;

pub struct FakeSource {
    cores:    usize,
    default:  Option<FrequencyRange>,
    ranges:   HashMap<CoreId, FrequencyRange>,
    poll:     PollFn,
}

impl FakeSource {
    pub fn new<F>(cores: usize, poll: F) -> Self
    where
        F: FnMut(&[CoreId]) -> Result<Vec<FrequencyReading>> + Send + 'static,
    {
        Self {
            cores,
            default: Some(FrequencyRange::new(800.0, 4000.0)),
            ranges: HashMap::new(),
            poll: Box::new(poll),
        }
    }

    /// Every poll returns `n * 100` MHz for every requested core, where `n`
    /// counts polls from 1.
    pub fn counting(cores: usize) -> Self {
        let mut n = 0u64;
        Self::new(cores, move |requested| {
            n += 1;
            Ok(requested
                .iter()
                .map(|&core| FrequencyReading::new(core, (n * 100) as f64))
                .collect())
        })
    }

    pub fn with_range(mut self, core: CoreId, range: FrequencyRange) -> Self {
        self.ranges.insert(core, range);
        self
    }

    /// Range discovery fails like a kernel without cpufreq support.
    pub fn without_range(mut self) -> Self {
        self.default = None;
        self
    }
}

impl FrequencySource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn cores(&mut self) -> Result<Vec<CoreId>> {
        Ok((0..self.cores).map(CoreId).collect())
    }

    fn range(&mut self, core: CoreId) -> Result<FrequencyRange> {
        self.ranges
            .get(&core)
            .copied()
            .or(self.default)
            .ok_or_else(|| FreqError::UnsupportedPlatform(format!("{core}: no cpufreq")))
    }

    fn poll_all(&mut self, cores: &[CoreId]) -> Result<Vec<FrequencyReading>> {
        (self.poll)(cores)
    }
}
