//! Slices tubes into centrifuge-sized batches.

use spindle_core::{Batch, ConfigResult, ConfigurationError, Marker, Tube};
use tracing::debug;

/// Splits a tube sequence into batches that fit the centrifuge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPartitioner {
    capacity: usize,
}

impl BatchPartitioner {
    /// `capacity` is the centrifuge slot count; it must be even and non-zero.
    pub fn new(capacity: usize) -> ConfigResult<Self> {
        if capacity == 0 {
            return Err(ConfigurationError::ZeroCapacity);
        }
        if capacity % 2 == 1 {
            return Err(ConfigurationError::OddCapacity(capacity));
        }
        Ok(Self { capacity })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of batches `tube_count` tubes will need.
    pub fn batch_count(&self, tube_count: usize) -> usize {
        tube_count.div_ceil(self.capacity)
    }

    /// Consecutive groups of at most `capacity` tubes, marked A, B, C, ...
    pub fn partition(&self, tubes: &[Tube]) -> Vec<Batch> {
        let batches: Vec<Batch> = tubes
            .chunks(self.capacity)
            .enumerate()
            .map(|(i, chunk)| Batch::new(Marker::for_index(i), chunk.to_vec()))
            .collect();

        debug!(
            tubes = tubes.len(),
            capacity = self.capacity,
            batches = batches.len(),
            "partitioned tubes into batches"
        );
        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tubes(ids: &[u32]) -> Vec<Tube> {
        ids.iter().copied().map(Tube::new).collect()
    }

    #[test]
    fn single_batch_when_everything_fits() {
        let p = BatchPartitioner::new(8).unwrap();
        let batches = p.partition(&tubes(&[1, 1, 2, 2]));
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].marker.labels(), ["A"]);
        assert_eq!(batches[0].tubes, tubes(&[1, 1, 2, 2]));
    }

    #[test]
    fn last_batch_takes_remainder() {
        let p = BatchPartitioner::new(4).unwrap();
        let batches = p.partition(&tubes(&[1, 1, 1, 2, 2, 2, 3, 3, 3]));
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].tubes, tubes(&[1, 1, 1, 2]));
        assert_eq!(batches[1].tubes, tubes(&[2, 2, 3, 3]));
        assert_eq!(batches[2].tubes, tubes(&[3]));
        assert_eq!(batches[2].marker.labels(), ["C"]);
        assert_eq!(p.batch_count(9), 3);
    }

    #[test]
    fn markers_continue_past_z() {
        let p = BatchPartitioner::new(2).unwrap();
        let batches = p.partition(&tubes(&[1; 56]));
        assert_eq!(batches.len(), 28);
        assert_eq!(batches[25].marker.labels(), ["Z"]);
        assert_eq!(batches[26].marker.labels(), ["AA"]);
        assert_eq!(batches[27].marker.labels(), ["AB"]);
    }

    #[test]
    fn odd_or_zero_capacity_rejected() {
        assert_eq!(BatchPartitioner::new(5), Err(ConfigurationError::OddCapacity(5)));
        assert_eq!(BatchPartitioner::new(0), Err(ConfigurationError::ZeroCapacity));
    }
}
