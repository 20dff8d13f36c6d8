//! Cycle runner — wires allocation, batching, scheduling and rendering.
//!
//! Everything is validated and planned before the first directive is
//! rendered, so a bad configuration produces an error and no output.

use tracing::info;

use spindle_core::{Batch, ConfigResult, CycleOptions, Directive, InstructionSink};

use crate::allocator::allocate_tubes;
use crate::cycle_table::CycleTable;
use crate::emitter::{InstructionEmitter, TechnicianEmitter};
use crate::partition::BatchPartitioner;
use crate::pipeline::{PipelineScheduler, Step};
use crate::relabel::{RelabeledTube, relabel_tubes};
use crate::setup::plan_setup;

/// Work handed to the technician while the last spin runs.
type ExtraInstructions<'a> = Box<dyn FnMut(&mut dyn InstructionSink) + 'a>;

/// Steps for a run before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub steps: Vec<Step>,
    pub final_batches: Vec<Batch>,
    pub tubes: Vec<RelabeledTube>,
}

/// A fully rendered run.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRun {
    pub steps: Vec<Step>,
    pub directives: Vec<Directive>,
    pub final_batches: Vec<Batch>,
    /// Surviving tubes, relabeled to their item ids.
    pub tubes: Vec<RelabeledTube>,
}

pub struct CycleRunner<'a> {
    options: &'a CycleOptions,
    table: CycleTable,
    partitioner: BatchPartitioner,
    extra: Option<ExtraInstructions<'a>>,
}

impl<'a> CycleRunner<'a> {
    /// Validate `options` and build the cycle table and partitioner.
    pub fn new(options: &'a CycleOptions) -> ConfigResult<Self> {
        options.validate()?;
        let table = CycleTable::from_options(options)?;
        let partitioner = BatchPartitioner::new(options.centrifuge_slots)?;
        Ok(Self {
            options,
            table,
            partitioner,
            extra: None,
        })
    }

    /// Register work for the technician to do while the last batch spins.
    ///
    /// Called once, after the final centrifuge start and before the final
    /// removal.
    pub fn with_extra_instructions<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut dyn InstructionSink) + 'a,
    {
        self.extra = Some(Box::new(hook));
        self
    }

    /// Allocate, partition and schedule the whole run.
    pub fn plan(&self) -> ConfigResult<RunPlan> {
        let options = self.options;
        let allocation = allocate_tubes(
            &options.items,
            options.start_volume,
            options.tube_volume,
            options.any_combine(),
        )?;
        let batches = self.partitioner.partition(&allocation.tubes);

        let scheduler = PipelineScheduler::new(&self.table);
        scheduler.check_pairing(batches.len())?;

        let mut steps = plan_setup(
            &self.table,
            &options.items,
            &allocation,
            options.tube_volume,
            self.partitioner.capacity(),
            &batches,
        );
        let schedule = scheduler.schedule(batches)?;
        steps.extend(schedule.steps);

        let tubes = relabel_tubes(&schedule.final_batches, &options.items);
        steps.push(Step::Relabel {
            tubes: tubes.clone(),
            items: options.items.clone(),
        });

        Ok(RunPlan {
            steps,
            final_batches: schedule.final_batches,
            tubes,
        })
    }

    /// Plan and render with the default technician wording.
    pub fn run(self) -> ConfigResult<CycleRun> {
        let mut emitter = TechnicianEmitter::new(self.table.is_cold());
        self.run_with(&mut emitter)
    }

    /// Plan and render with a custom emitter.
    pub fn run_with<E>(mut self, emitter: &mut E) -> ConfigResult<CycleRun>
    where
        E: InstructionEmitter + ?Sized,
    {
        let RunPlan {
            steps,
            final_batches,
            tubes,
        } = self.plan()?;

        let mut directives: Vec<Directive> = Vec::new();
        for step in &steps {
            match step {
                Step::ExtraInstructions => {
                    if let Some(hook) = self.extra.as_mut() {
                        hook(&mut directives);
                    }
                }
                _ => emitter.emit(step, &mut directives),
            }
        }

        info!(
            items = self.options.items.len(),
            cycles = self.table.len(),
            cold = self.table.is_cold(),
            steps = steps.len(),
            directives = directives.len(),
            tubes = tubes.len(),
            "centrifuge cycle run rendered"
        );

        Ok(CycleRun {
            steps,
            directives,
            final_batches,
            tubes,
        })
    }
}

/// Validate, schedule and render a run with no extra instructions.
pub fn centrifuge_resuspend_cycle(options: &CycleOptions) -> ConfigResult<CycleRun> {
    CycleRunner::new(options)?.run()
}
