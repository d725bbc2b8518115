use freq_core::{CoreId, FreqError, Result};
use std::collections::HashMap;
use std::num::NonZeroUsize;

/// Rolling history of one core's frequency samples.
///
/// Fixed-size slot array with a head index and a count; nothing is
/// reallocated after construction. Once full, each push overwrites the
/// oldest sample.
#[derive(Debug, Clone)]
pub struct CoreHistory {
    slots: Box<[f64]>,
    head:  usize,
    len:   usize,
}

impl CoreHistory {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: vec![0.0; capacity.get()].into_boxed_slice(),
            head:  0,
            len:   0,
        }
    }

    /// Push a new sample, evicting the oldest if at capacity.
    pub fn push(&mut self, value: f64) {
        let cap = self.slots.len();
        if self.len < cap {
            self.slots[(self.head + self.len) % cap] = value;
            self.len += 1;
        } else {
            self.slots[self.head] = value;
            self.head = (self.head + 1) % cap;
        }
    }

    /// Samples oldest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let cap = self.slots.len();
        (0..self.len).map(move |i| self.slots[(self.head + i) % cap])
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

/// Per-core histories for a fixed core selection.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    /// Histories in selection order.
    series: Vec<(CoreId, CoreHistory)>,
    index:  HashMap<CoreId, usize>,
}

impl SeriesBuffer {
    /// One empty history of `capacity` slots per core in `cores`.
    pub fn new(cores: &[CoreId], capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| FreqError::Config("history capacity must be at least 1".into()))?;

        let mut series = Vec::with_capacity(cores.len());
        let mut index = HashMap::with_capacity(cores.len());
        for &core in cores {
            if index.insert(core, series.len()).is_some() {
                return Err(FreqError::Config(format!("{core} selected more than once")));
            }
            series.push((core, CoreHistory::new(capacity)));
        }

        Ok(Self { series, index })
    }

    /// Record `mhz` for `core`. Unknown cores are rejected.
    pub fn append(&mut self, core: CoreId, mhz: f64) -> Result<()> {
        let slot = *self.index.get(&core).ok_or(FreqError::UnknownCore(core))?;
        self.series[slot].1.push(mhz);
        Ok(())
    }

    /// Current contents for `core`, oldest first.
    pub fn snapshot(&self, core: CoreId) -> Result<Vec<f64>> {
        self.history(core).map(CoreHistory::to_vec)
    }

    pub fn history(&self, core: CoreId) -> Result<&CoreHistory> {
        self.index
            .get(&core)
            .map(|&slot| &self.series[slot].1)
            .ok_or(FreqError::UnknownCore(core))
    }

    /// Cores in selection order.
    pub fn cores(&self) -> impl Iterator<Item = CoreId> + '_ {
        self.series.iter().map(|(core, _)| *core)
    }

    /// `(core, history)` pairs in selection order.
    pub fn iter(&self) -> impl Iterator<Item = (CoreId, &CoreHistory)> + '_ {
        self.series.iter().map(|(core, history)| (*core, history))
    }

    pub fn capacity(&self) -> usize {
        self.series.first().map_or(0, |(_, h)| h.capacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn history_evicts_oldest_first() {
        let mut history = CoreHistory::new(cap(3));
        for v in [10.0, 20.0, 30.0, 40.0] {
            history.push(v);
        }
        assert_eq!(history.to_vec(), vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn history_partial_fill_keeps_order() {
        let mut history = CoreHistory::new(cap(5));
        history.push(1.0);
        history.push(2.0);
        assert_eq!(history.len(), 2);
        assert_eq!(history.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn history_wraps_many_times() {
        let mut history = CoreHistory::new(cap(4));
        for v in 0..103 {
            history.push(v as f64);
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.to_vec(), vec![99.0, 100.0, 101.0, 102.0]);
    }

    #[test]
    fn history_capacity_one() {
        let mut history = CoreHistory::new(cap(1));
        history.push(5.0);
        history.push(6.0);
        assert_eq!(history.to_vec(), vec![6.0]);
    }

    #[test]
    fn buffer_len_is_min_of_appends_and_capacity() {
        let cores = [CoreId(0), CoreId(2)];
        let mut buffer = SeriesBuffer::new(&cores, 3).unwrap();
        for n in 1..=5usize {
            for &core in &cores {
                buffer.append(core, n as f64).unwrap();
            }
            for &core in &cores {
                assert_eq!(buffer.history(core).unwrap().len(), n.min(3));
            }
        }
    }

    #[test]
    fn buffer_cores_are_independent() {
        let mut buffer = SeriesBuffer::new(&[CoreId(0), CoreId(1)], 3).unwrap();
        buffer.append(CoreId(0), 1.0).unwrap();
        buffer.append(CoreId(0), 2.0).unwrap();
        buffer.append(CoreId(1), 9.0).unwrap();

        assert_eq!(buffer.snapshot(CoreId(0)).unwrap(), vec![1.0, 2.0]);
        assert_eq!(buffer.snapshot(CoreId(1)).unwrap(), vec![9.0]);
    }

    #[test]
    fn buffer_rejects_unknown_core() {
        let mut buffer = SeriesBuffer::new(&[CoreId(0)], 3).unwrap();
        assert!(matches!(
            buffer.append(CoreId(4), 1.0),
            Err(FreqError::UnknownCore(CoreId(4)))
        ));
        assert!(buffer.snapshot(CoreId(4)).is_err());
    }

    #[test]
    fn buffer_rejects_zero_capacity_and_duplicates() {
        assert!(matches!(
            SeriesBuffer::new(&[CoreId(0)], 0),
            Err(FreqError::Config(_))
        ));
        assert!(matches!(
            SeriesBuffer::new(&[CoreId(1), CoreId(1)], 3),
            Err(FreqError::Config(_))
        ));
    }

    #[test]
    fn buffer_preserves_selection_order() {
        let buffer = SeriesBuffer::new(&[CoreId(3), CoreId(0), CoreId(2)], 2).unwrap();
        let order: Vec<_> = buffer.cores().collect();
        assert_eq!(order, vec![CoreId(3), CoreId(0), CoreId(2)]);
        assert_eq!(buffer.capacity(), 2);
    }
}
