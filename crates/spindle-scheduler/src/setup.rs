//! Everything the technician does before the first spin.

use spindle_core::{Batch, Item};

use crate::allocator::TubeAllocation;
use crate::cycle_table::CycleTable;
use crate::pipeline::Step;

/// Setup steps, in order: fetch supplies, chill (cold runs only),
/// aliquot items into tubes, group tubes into batches.
pub fn plan_setup(
    table: &CycleTable,
    items: &[Item],
    allocation: &TubeAllocation,
    tube_volume: f64,
    capacity: usize,
    batches: &[Batch],
) -> Vec<Step> {
    let tube_count = allocation.tubes.len();
    let mut steps = vec![Step::FetchSupplies {
        media: table.media_volumes(tube_count),
        tube_count,
        tube_volume,
    }];

    if table.is_cold() {
        steps.push(Step::PrepareIceBath);
        steps.push(Step::ChillTubes {
            tube_count,
            tube_volume,
        });
    }

    steps.push(Step::AliquotItems {
        items: items.to_vec(),
        tubes_per_item: allocation.tubes_per_item,
        aliquot_volume: allocation.aliquot_volume,
        tube_volume,
    });
    steps.push(Step::GroupBatches {
        capacity,
        batches: batches.to_vec(),
    });
    steps
}
