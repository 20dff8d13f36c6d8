pub mod config;
pub mod directive;
pub mod error;
pub mod types;
pub mod units;

pub use config::{CycleOptions, CycleSpec, MAX_TUBES_PER_ITEM};
pub use directive::{Cell, Directive, InstructionSink, TimerDuration};
pub use error::{ConfigResult, ConfigurationError};
pub use types::*;
