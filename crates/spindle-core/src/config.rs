//! Cycle options parser.
//!
//! A run is described by one options record, usually loaded from TOML:
//!
//! ```toml
//! start_volume = 2.0
//! tube_volume = 1.0
//! centrifuge_slots = 8
//! cold = true
//!
//! [[cycles]]
//! cent_temp = 4.0
//! cent_rpm = 4000
//! cent_time = 10.0
//! sus_media = "water"
//! sus_volume = 1.0
//! combine = true
//!
//! [[items]]
//! id = "1042"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigResult, ConfigurationError};
use crate::types::{CentrifugeSettings, Cycle, Item, ResuspendSettings};

/// Upper bound on `floor(start_volume / tube_volume)`.
pub const MAX_TUBES_PER_ITEM: usize = 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleOptions {
    /// Volume each item starts with (mL).
    pub start_volume: f64,
    /// Volume of one centrifuge tube (mL).
    pub tube_volume: f64,
    /// Number of slots in the centrifuge. Must be even.
    pub centrifuge_slots: usize,
    /// Optional declared number of cycles, checked against `cycles`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_count: Option<usize>,
    /// Work on ice between spins.
    #[serde(default)]
    pub cold: bool,
    pub cycles: Vec<CycleSpec>,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// One `[[cycles]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSpec {
    pub cent_temp: f64,
    pub cent_rpm: u32,
    pub cent_time: f64,
    pub sus_media: String,
    pub sus_volume: f64,
    #[serde(default)]
    pub combine: bool,
}

impl CycleSpec {
    pub fn to_cycle(&self) -> Cycle {
        Cycle {
            centrifuge: CentrifugeSettings {
                rpm: self.cent_rpm,
                time_minutes: self.cent_time,
                temp_celsius: self.cent_temp,
            },
            resuspend: ResuspendSettings {
                media: self.sus_media.clone(),
                volume_ml: self.sus_volume,
            },
            combine: self.combine,
        }
    }
}

impl CycleOptions {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let options: CycleOptions = toml::from_str(content)?;
        Ok(options)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// True when any cycle ends with a combine.
    pub fn any_combine(&self) -> bool {
        self.cycles.iter().any(|c| c.combine)
    }

    /// Static checks that need nothing beyond the options themselves.
    ///
    /// Batch pairing for combines depends on the tube count and is checked
    /// by the scheduler before it emits anything.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.items.is_empty() {
            return Err(ConfigurationError::NoItems);
        }
        positive("start_volume", self.start_volume)?;
        positive("tube_volume", self.tube_volume)?;
        if self.start_volume < self.tube_volume {
            return Err(ConfigurationError::InsufficientStartVolume {
                start_volume: self.start_volume,
                tube_volume: self.tube_volume,
            });
        }
        let per_item = (self.start_volume / self.tube_volume).floor();
        if per_item > MAX_TUBES_PER_ITEM as f64 {
            return Err(ConfigurationError::TooManyTubes {
                per_item,
                limit: MAX_TUBES_PER_ITEM,
            });
        }
        if self.centrifuge_slots == 0 {
            return Err(ConfigurationError::ZeroCapacity);
        }
        if self.centrifuge_slots % 2 == 1 {
            return Err(ConfigurationError::OddCapacity(self.centrifuge_slots));
        }
        if self.cycles.is_empty() {
            return Err(ConfigurationError::NoCycles);
        }
        if let Some(expected) = self.cycle_count {
            if expected != self.cycles.len() {
                return Err(ConfigurationError::CycleCountMismatch {
                    expected,
                    actual: self.cycles.len(),
                });
            }
        }
        for (i, cycle) in self.cycles.iter().enumerate() {
            if cycle.cent_rpm == 0 {
                return Err(ConfigurationError::InvalidCentrifugeSetting {
                    cycle: i,
                    reason: "rpm must be positive".to_string(),
                });
            }
            if !cycle.cent_time.is_finite() || cycle.cent_time <= 0.0 {
                return Err(ConfigurationError::InvalidCentrifugeSetting {
                    cycle: i,
                    reason: format!("spin time must be positive, got {}", cycle.cent_time),
                });
            }
            positive("sus_volume", cycle.sus_volume)?;
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositiveVolume { field, value })
    }
}
