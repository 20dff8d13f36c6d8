//! Tube allocation — split each item's volume across centrifuge tubes.

use spindle_core::{ConfigResult, ConfigurationError, Item, MAX_TUBES_PER_ITEM, Tube};
use tracing::debug;

/// Tubes produced for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct TubeAllocation {
    /// Flat tube sequence, grouped by item in item order.
    pub tubes: Vec<Tube>,
    pub tubes_per_item: usize,
    /// Volume poured into each tube (mL).
    pub aliquot_volume: f64,
}

/// Expand `items` into tubes tagged with each item's 1-based index.
///
/// `floor(start_volume / tube_volume)` tubes per item, bumped to the next
/// even number when any cycle combines so every halving divides evenly.
pub fn allocate_tubes(
    items: &[Item],
    start_volume: f64,
    tube_volume: f64,
    combine_occurs: bool,
) -> ConfigResult<TubeAllocation> {
    if items.is_empty() {
        return Err(ConfigurationError::NoItems);
    }
    if !tube_volume.is_finite() || tube_volume <= 0.0 {
        return Err(ConfigurationError::NonPositiveVolume {
            field: "tube_volume",
            value: tube_volume,
        });
    }
    if !start_volume.is_finite() || start_volume <= 0.0 {
        return Err(ConfigurationError::NonPositiveVolume {
            field: "start_volume",
            value: start_volume,
        });
    }

    let ratio = (start_volume / tube_volume).floor();
    if ratio > MAX_TUBES_PER_ITEM as f64 {
        return Err(ConfigurationError::TooManyTubes {
            per_item: ratio,
            limit: MAX_TUBES_PER_ITEM,
        });
    }
    let mut tubes_per_item = ratio as usize;
    if tubes_per_item == 0 {
        return Err(ConfigurationError::InsufficientStartVolume {
            start_volume,
            tube_volume,
        });
    }
    if tubes_per_item % 2 == 1 && combine_occurs {
        tubes_per_item += 1;
    }

    let tubes: Vec<Tube> = (1..=items.len() as u32)
        .flat_map(|short_id| std::iter::repeat_n(Tube::new(short_id), tubes_per_item))
        .collect();
    let aliquot_volume = (start_volume / tubes_per_item as f64).min(tube_volume);

    debug!(
        items = items.len(),
        tubes_per_item,
        total = tubes.len(),
        aliquot_volume,
        "allocated tubes"
    );

    Ok(TubeAllocation {
        tubes,
        tubes_per_item,
        aliquot_volume,
    })
}
