//! spindle-scheduler — pipelined centrifuge/resuspend cycles.
//!
//! Turns a set of items and a cycle table into one ordered instruction
//! stream for a single operator. While one batch spins, the operator
//! decants and resuspends the batch that came out before it.
//!
//! # Architecture
//!
//! ```text
//! CycleRunner
//!   ├── allocator   (items → tubes, evenness correction for combines)
//!   ├── partition   (tubes → capacity-bounded batches A, B, C, ...)
//!   ├── setup       (supplies, ice bath, aliquoting, batch grouping)
//!   ├── pipeline    (two-slot schedule across cycles → Steps)
//!   │     ├── cycle_table
//!   │     └── combiner (halve tubes, merge adjacent batches)
//!   ├── emitter     (Steps → Directives)
//!   └── relabel     (short ids → item ids)
//! ```

pub mod allocator;
pub mod combiner;
pub mod cycle_table;
pub mod emitter;
pub mod partition;
pub mod pipeline;
pub mod relabel;
pub mod runner;
pub mod setup;

pub use allocator::{TubeAllocation, allocate_tubes};
pub use combiner::{combine_batches, combine_tubes};
pub use cycle_table::{CycleTable, MediaVolume};
pub use emitter::{InstructionEmitter, TechnicianEmitter};
pub use partition::BatchPartitioner;
pub use pipeline::{PipelineScheduler, Schedule, Step};
pub use relabel::{RelabeledTube, relabel_tubes};
pub use runner::{CycleRun, CycleRunner, RunPlan, centrifuge_resuspend_cycle};
