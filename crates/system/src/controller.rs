use crate::history::SeriesBuffer;
use crate::source::FrequencySource;
use chrono::Local;
use freq_core::{CoreId, CoreSeries, FreqError, FrequencyRange, Result, Snapshot};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Lifecycle of a [`SampleController`].
///
/// `Uninitialized → Ready → Running → (Stopped | Failed)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Ready,
    Running,
    Stopped,
    Failed,
}

impl ControllerState {
    pub fn as_str(self) -> &'static str {
        match self {
            ControllerState::Uninitialized => "uninitialized",
            ControllerState::Ready         => "ready",
            ControllerState::Running       => "running",
            ControllerState::Stopped       => "stopped",
            ControllerState::Failed        => "failed",
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that exists once a core selection has been accepted.
struct Session {
    source: Box<dyn FrequencySource>,
    cores:  Vec<CoreId>,
    /// Per-core ranges, same order as `cores`.
    ranges: Vec<FrequencyRange>,
    range:  FrequencyRange,
    buffer: SeriesBuffer,
    ticks:  u64,
    /// Cores without a reading in the latest tick.
    skipped: Vec<CoreId>,
}

/// Pulls readings from a [`FrequencySource`] into per-core histories and
/// hands out immutable [`Snapshot`]s.
///
/// The controller exclusively owns its histories; renderers only ever get
/// copies.
pub struct SampleController {
    capacity: usize,
    state:    ControllerState,
    session:  Option<Session>,
}

impl SampleController {
    /// New controller keeping up to `capacity` readings per core.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: ControllerState::Uninitialized,
            session: None,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Selected cores in configured order; empty before initialisation.
    pub fn cores(&self) -> &[CoreId] {
        self.session.as_ref().map_or(&[], |s| s.cores.as_slice())
    }

    /// Validate `cores` against what `source` can see, discover the display
    /// ranges and move to `Ready`.
    ///
    /// On error the controller keeps its previous state.
    pub fn initialize(
        &mut self,
        cores: Vec<CoreId>,
        mut source: Box<dyn FrequencySource>,
    ) -> Result<()> {
        if matches!(self.state, ControllerState::Ready | ControllerState::Running) {
            return Err(self.invalid("initialize"));
        }
        if cores.is_empty() {
            return Err(FreqError::Config("core selection is empty".into()));
        }

        let available = source.cores()?;
        if let Some(core) = cores.iter().find(|c| !available.contains(c)) {
            return Err(FreqError::Config(format!(
                "{core} is not among the {} online cores",
                available.len()
            )));
        }

        let buffer = SeriesBuffer::new(&cores, self.capacity)?;

        let mut ranges = Vec::with_capacity(cores.len());
        for &core in &cores {
            ranges.push(source.range(core)?);
        }
        let range = ranges
            .iter()
            .copied()
            .reduce(FrequencyRange::union)
            .ok_or_else(|| FreqError::Config("core selection is empty".into()))?;

        info!(
            source = source.name(),
            cores = cores.len(),
            capacity = self.capacity,
            "Sampler ready ({:.0}-{:.0} MHz)",
            range.min,
            range.max
        );

        self.session = Some(Session {
            source,
            cores,
            ranges,
            range,
            buffer,
            ticks: 0,
            skipped: Vec::new(),
        });
        self.state = ControllerState::Ready;
        Ok(())
    }

    /// `Ready → Running`.
    pub fn start(&mut self) -> Result<()> {
        if self.state != ControllerState::Ready {
            return Err(self.invalid("start"));
        }
        self.state = ControllerState::Running;
        info!("Sampling started");
        Ok(())
    }

    /// `Ready | Running → Stopped`. Calling it again is a no-op, and a
    /// `Failed` controller stays `Failed`.
    pub fn stop(&mut self) {
        match self.state {
            ControllerState::Ready | ControllerState::Running => {
                self.state = ControllerState::Stopped;
                info!("Sampling stopped");
            }
            ControllerState::Uninitialized
            | ControllerState::Stopped
            | ControllerState::Failed => {}
        }
    }

    /// Run one sampling cycle and return the updated snapshot.
    ///
    /// Cores missing from the poll are skipped for this cycle only. A poll
    /// that fails as a whole moves the controller to `Failed`.
    pub fn tick(&mut self) -> Result<Snapshot> {
        if self.state != ControllerState::Running {
            return Err(self.invalid("tick"));
        }
        let Some(session) = self.session.as_mut() else {
            return Err(self.invalid("tick"));
        };

        if let Err(e) = session.sample() {
            error!("Frequency poll failed: {e}");
            self.state = ControllerState::Failed;
            return Err(e);
        }

        Ok(session.snapshot(self.capacity))
    }

    /// Current histories without sampling.
    pub fn snapshot(&self) -> Result<Snapshot> {
        self.session
            .as_ref()
            .map(|s| s.snapshot(self.capacity))
            .ok_or_else(|| self.invalid("snapshot"))
    }

    fn invalid(&self, action: &'static str) -> FreqError {
        FreqError::InvalidState {
            action,
            state: self.state.as_str(),
        }
    }
}

impl Session {
    fn sample(&mut self) -> Result<()> {
        let readings = self.source.poll_all(&self.cores)?;

        let mut by_core: HashMap<CoreId, f64> = HashMap::with_capacity(readings.len());
        for reading in readings {
            by_core.insert(reading.core, reading.mhz);
        }

        if let Some(&stray) = by_core
            .keys()
            .filter(|core| !self.cores.contains(core))
            .min()
        {
            return Err(FreqError::UnknownCore(stray));
        }

        if !self.cores.iter().any(|core| by_core.contains_key(core)) {
            return Err(FreqError::Read("no reading for any selected core".into()));
        }

        self.skipped.clear();
        for &core in &self.cores {
            match by_core.remove(&core) {
                Some(mhz) => self.buffer.append(core, mhz)?,
                None => self.skipped.push(core),
            }
        }

        self.ticks += 1;
        if !self.skipped.is_empty() {
            warn!(
                tick = self.ticks,
                "No frequency reading for {:?}; skipping this cycle",
                self.skipped
            );
        }
        debug!(tick = self.ticks, sampled = self.cores.len() - self.skipped.len(), "Tick");
        Ok(())
    }

    fn snapshot(&self, capacity: usize) -> Snapshot {
        let cores = self
            .buffer
            .iter()
            .zip(&self.ranges)
            .map(|((core, history), &range)| CoreSeries {
                core,
                range,
                readings: history.to_vec(),
            })
            .collect();

        Snapshot {
            tick: self.ticks,
            taken_at: Local::now(),
            cores,
            range: self.range,
            skipped: self.skipped.clone(),
            capacity,
        }
    }
}
