//! Batch combining — halve tube counts and merge adjacent batches.
//!
//! Physically, the technician pours one tube into another tube with the
//! same short id. Volume is conserved, tube count per id is halved.

use spindle_core::{Batch, ConfigResult, ConfigurationError};
use tracing::debug;

/// A copy of `batch` keeping, for each short id, the first `count / 2`
/// tubes with that id.
///
/// Ids are visited in first-appearance order. An odd per-id count rounds
/// down, so a lone tube of some id disappears from the batch entirely.
pub fn combine_tubes(batch: &Batch) -> Batch {
    let mut tubes = Vec::with_capacity(batch.len() / 2);
    for short_id in batch.distinct_short_ids() {
        let same: Vec<_> = batch
            .tubes
            .iter()
            .filter(|t| t.short_id == short_id)
            .copied()
            .collect();
        tubes.extend_from_slice(&same[..same.len() / 2]);
    }
    Batch::new(batch.marker.clone(), tubes)
}

/// Combine tubes in every batch, then merge batches pairwise in list order.
///
/// Returns half as many batches. An odd batch count (including a single
/// batch) cannot be paired and is rejected.
pub fn combine_batches(batches: &[Batch]) -> ConfigResult<Vec<Batch>> {
    if batches.len() % 2 == 1 {
        return Err(ConfigurationError::UnpairedBatch {
            count: batches.len(),
        });
    }

    let combined: Vec<Batch> = batches
        .chunks_exact(2)
        .map(|pair| {
            let first = combine_tubes(&pair[0]);
            let second = combine_tubes(&pair[1]);
            let mut tubes = first.tubes;
            tubes.extend(second.tubes);
            Batch::new(first.marker.merged_with(&second.marker), tubes)
        })
        .collect();

    debug!(
        before = batches.len(),
        after = combined.len(),
        tubes = combined.iter().map(Batch::len).sum::<usize>(),
        "combined batches"
    );
    Ok(combined)
}
