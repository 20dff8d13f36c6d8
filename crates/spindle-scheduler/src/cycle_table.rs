//! Ordered cycle settings for a run.

use spindle_core::{ConfigResult, ConfigurationError, Cycle, CycleOptions};

/// Total volume of one resuspension media needed for a run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MediaVolume {
    pub media: String,
    pub volume_ml: f64,
}

/// Ordered, non-empty list of cycles plus the run-wide cold flag.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleTable {
    cycles: Vec<Cycle>,
    cold: bool,
}

impl CycleTable {
    pub fn new(cycles: Vec<Cycle>, cold: bool) -> ConfigResult<Self> {
        if cycles.is_empty() {
            return Err(ConfigurationError::NoCycles);
        }
        Ok(Self { cycles, cold })
    }

    pub fn from_options(options: &CycleOptions) -> ConfigResult<Self> {
        let table = Self::new(
            options.cycles.iter().map(|c| c.to_cycle()).collect(),
            options.cold,
        )?;
        if let Some(expected) = options.cycle_count {
            if expected != table.len() {
                return Err(ConfigurationError::CycleCountMismatch {
                    expected,
                    actual: table.len(),
                });
            }
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Non-empty by construction.
    pub fn last(&self) -> &Cycle {
        &self.cycles[self.cycles.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cycle> {
        self.cycles.iter()
    }

    pub fn is_cold(&self) -> bool {
        self.cold
    }

    /// Media needed for `tube_count` tubes, in order of first use.
    ///
    /// Each tube receives every cycle's resuspension volume once.
    pub fn media_volumes(&self, tube_count: usize) -> Vec<MediaVolume> {
        let mut volumes: Vec<MediaVolume> = Vec::new();
        for cycle in &self.cycles {
            let media = &cycle.resuspend.media;
            let per_tube = cycle.resuspend.volume_ml;
            match volumes.iter_mut().find(|v| &v.media == media) {
                Some(entry) => entry.volume_ml += per_tube * tube_count as f64,
                None => volumes.push(MediaVolume {
                    media: media.clone(),
                    volume_ml: per_tube * tube_count as f64,
                }),
            }
        }
        volumes
    }
}

impl<'a> IntoIterator for &'a CycleTable {
    type Item = &'a Cycle;
    type IntoIter = std::slice::Iter<'a, Cycle>;

    fn into_iter(self) -> Self::IntoIter {
        self.cycles.iter()
    }
}
