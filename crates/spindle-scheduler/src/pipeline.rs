//! Pipeline scheduler — orders centrifuge and bench work across batches.
//!
//! The centrifuge holds one batch at a time. Bench work (decanting,
//! resuspending, combining) happens while the next batch spins, so the
//! scheduler keeps a two-slot window: the batch in the centrifuge and the
//! batch that just came out of it.
//!
//! For each cycle:
//! 1. Combine the batch list if the previous cycle ends with a combine.
//! 2. Remove the batch left spinning by the previous cycle. If only one
//!    batch remains, finish it before the next spin; otherwise start the
//!    next spin first and finish it while the centrifuge runs.
//! 3. Down the batch list: remove the spinning batch, start the next one,
//!    then finish the removed one.
//! 4. The last batch stays in the centrifuge for the next cycle.
//!
//! After the last cycle the final batch is removed and finished, and the
//! last combine (if any) is applied.

use serde::Serialize;
use tracing::{debug, info};

use spindle_core::{
    Batch, CentrifugeSettings, ConfigResult, ConfigurationError, Cycle, Item, ResuspendSettings,
};

use crate::combiner::combine_batches;
use crate::cycle_table::{CycleTable, MediaVolume};
use crate::relabel::RelabeledTube;

/// One scheduler decision. The emitter renders each into directives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    FetchSupplies {
        media: Vec<MediaVolume>,
        tube_count: usize,
        tube_volume: f64,
    },
    PrepareIceBath,
    ChillTubes {
        tube_count: usize,
        tube_volume: f64,
    },
    AliquotItems {
        items: Vec<Item>,
        tubes_per_item: usize,
        aliquot_volume: f64,
        tube_volume: f64,
    },
    GroupBatches {
        capacity: usize,
        batches: Vec<Batch>,
    },
    Centrifuge {
        batch: Batch,
        settings: CentrifugeSettings,
    },
    RemoveTubes {
        batch: Batch,
    },
    Decant {
        batch: Batch,
    },
    Resuspend {
        batch: Batch,
        settings: ResuspendSettings,
    },
    CombineTubes {
        batch: Batch,
    },
    /// Caller-supplied work while the last spin finishes.
    ExtraInstructions,
    Relabel {
        tubes: Vec<RelabeledTube>,
        items: Vec<Item>,
    },
}

impl Step {
    /// The batch this step acts on, for per-batch steps.
    pub fn batch(&self) -> Option<&Batch> {
        match self {
            Step::Centrifuge { batch, .. }
            | Step::RemoveTubes { batch }
            | Step::Decant { batch }
            | Step::Resuspend { batch, .. }
            | Step::CombineTubes { batch } => Some(batch),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::FetchSupplies { .. } => "fetch_supplies",
            Step::PrepareIceBath => "prepare_ice_bath",
            Step::ChillTubes { .. } => "chill_tubes",
            Step::AliquotItems { .. } => "aliquot_items",
            Step::GroupBatches { .. } => "group_batches",
            Step::Centrifuge { .. } => "centrifuge",
            Step::RemoveTubes { .. } => "remove_tubes",
            Step::Decant { .. } => "decant",
            Step::Resuspend { .. } => "resuspend",
            Step::CombineTubes { .. } => "combine_tubes",
            Step::ExtraInstructions => "extra_instructions",
            Step::Relabel { .. } => "relabel",
        }
    }
}

/// Output of the pipeline: ordered steps plus the batches that survive
/// the last cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub steps: Vec<Step>,
    pub final_batches: Vec<Batch>,
}

/// Walks the cycle table over a batch list with a two-slot window.
#[derive(Debug, Clone, Copy)]
pub struct PipelineScheduler<'a> {
    table: &'a CycleTable,
}

impl<'a> PipelineScheduler<'a> {
    pub fn new(table: &'a CycleTable) -> Self {
        Self { table }
    }

    /// Check every combine in the table will see an even batch list.
    pub fn check_pairing(&self, batch_count: usize) -> ConfigResult<()> {
        if batch_count == 0 {
            return Err(ConfigurationError::NoTubes);
        }
        let mut count = batch_count;
        for cycle in self.table {
            if cycle.combine {
                if count % 2 == 1 {
                    return Err(ConfigurationError::UnpairedBatch { count });
                }
                count /= 2;
            }
        }
        Ok(())
    }

    /// Order all centrifuge and bench steps for `batches`.
    ///
    /// Pairing is checked up front so a bad configuration fails before
    /// any step is produced.
    pub fn schedule(&self, batches: Vec<Batch>) -> ConfigResult<Schedule> {
        self.check_pairing(batches.len())?;

        let mut batches = batches;
        let mut steps = Vec::new();
        let mut previous: Option<&Cycle> = None;
        // Batch left in the centrifuge at the end of the previous cycle.
        let mut finished: Option<Batch> = None;

        for (i, cycle) in self.table.iter().enumerate() {
            if previous.is_some_and(|p| p.combine) {
                batches = combine_batches(&batches)?;
            }
            let Some((first, rest)) = batches.split_first() else {
                return Err(ConfigurationError::NoTubes);
            };

            match (finished.take(), previous) {
                (Some(done), Some(prev_cycle)) => {
                    steps.push(Step::RemoveTubes {
                        batch: done.clone(),
                    });
                    if rest.is_empty() {
                        // `first` holds `done`'s tubes; finish them before spinning again.
                        finish(&mut steps, done, prev_cycle);
                        steps.push(centrifuge(first, cycle));
                    } else {
                        steps.push(centrifuge(first, cycle));
                        finish(&mut steps, done, prev_cycle);
                    }
                }
                _ => steps.push(centrifuge(first, cycle)),
            }

            let mut in_flight = first.clone();
            for next in rest {
                steps.push(Step::RemoveTubes {
                    batch: in_flight.clone(),
                });
                steps.push(centrifuge(next, cycle));
                finish(&mut steps, in_flight, cycle);
                in_flight = next.clone();
            }

            debug!(
                cycle = i,
                batches = batches.len(),
                spinning = %in_flight.marker,
                "scheduled cycle"
            );
            finished = Some(in_flight);
            previous = Some(cycle);
        }

        steps.push(Step::ExtraInstructions);

        let last = self.table.last();
        if let Some(done) = finished {
            steps.push(Step::RemoveTubes {
                batch: done.clone(),
            });
            finish(&mut steps, done, last);
        }
        if last.combine {
            batches = combine_batches(&batches)?;
        }

        info!(
            cycles = self.table.len(),
            steps = steps.len(),
            final_batches = batches.len(),
            "pipeline scheduled"
        );

        Ok(Schedule {
            steps,
            final_batches: batches,
        })
    }
}

fn centrifuge(batch: &Batch, cycle: &Cycle) -> Step {
    Step::Centrifuge {
        batch: batch.clone(),
        settings: cycle.centrifuge.clone(),
    }
}

/// Decant, resuspend, and (when the cycle combines) combine `batch`.
fn finish(steps: &mut Vec<Step>, batch: Batch, cycle: &Cycle) {
    steps.push(Step::Decant {
        batch: batch.clone(),
    });
    if cycle.combine {
        steps.push(Step::Resuspend {
            batch: batch.clone(),
            settings: cycle.resuspend.clone(),
        });
        steps.push(Step::CombineTubes { batch });
    } else {
        steps.push(Step::Resuspend {
            batch,
            settings: cycle.resuspend.clone(),
        });
    }
}
