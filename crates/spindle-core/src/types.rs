//! Shared types used across Spindle crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A source sample that gets split into tubes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }

    /// Human-facing name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A processing unit. The short id is the 1-based index of the item the
/// tube was aliquoted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tube {
    pub short_id: u32,
}

impl Tube {
    pub fn new(short_id: u32) -> Self {
        Self { short_id }
    }
}

impl fmt::Display for Tube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id)
    }
}

/// Ordered labels naming a batch.
///
/// A freshly partitioned batch has one label. Merging two batches
/// concatenates their labels, so the marker records merge history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marker(Vec<String>);

impl Marker {
    /// Marker for the batch at `index` in partition order.
    ///
    /// Labels use bijective base-26: `A`..`Z`, then `AA`..`AZ`, `BA`, ...
    /// `ZZ`, `AAA`.
    pub fn for_index(index: usize) -> Self {
        let mut n = index + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(char::from(b'A' + rem as u8));
            n = (n - 1) / 26;
        }
        Self(vec![letters.into_iter().rev().collect()])
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    /// Number of original batches this marker covers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_merged(&self) -> bool {
        self.0.len() > 1
    }

    /// This marker's labels followed by `other`'s.
    pub fn merged_with(&self, other: &Marker) -> Marker {
        let mut labels = self.0.clone();
        labels.extend(other.0.iter().cloned());
        Marker(labels)
    }

    /// English list of labels: "A", "A and B", "A, B, and C".
    pub fn to_sentence(&self) -> String {
        to_sentence(&self.0)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sentence())
    }
}

/// A group of tubes that fits in one centrifuge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub marker: Marker,
    pub tubes: Vec<Tube>,
}

impl Batch {
    pub fn new(marker: Marker, tubes: Vec<Tube>) -> Self {
        Self { marker, tubes }
    }

    pub fn len(&self) -> usize {
        self.tubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tubes.is_empty()
    }

    /// An odd tube count needs a dummy tube to balance the rotor.
    pub fn needs_balance(&self) -> bool {
        self.tubes.len() % 2 == 1
    }

    /// Distinct short ids in order of first appearance.
    pub fn distinct_short_ids(&self) -> Vec<u32> {
        let mut seen = Vec::new();
        for tube in &self.tubes {
            if !seen.contains(&tube.short_id) {
                seen.push(tube.short_id);
            }
        }
        seen
    }
}

/// Centrifuge run parameters for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentrifugeSettings {
    pub rpm: u32,
    pub time_minutes: f64,
    pub temp_celsius: f64,
}

/// Resuspension parameters for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResuspendSettings {
    pub media: String,
    pub volume_ml: f64,
}

/// One centrifuge → decant → resuspend round, optionally followed by a
/// combine that halves the tube count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    pub centrifuge: CentrifugeSettings,
    pub resuspend: ResuspendSettings,
    pub combine: bool,
}

/// Join items as an English list with a serial comma.
pub fn to_sentence<T: fmt::Display>(items: &[T]) -> String {
    match items {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => {
            let head: Vec<String> = init.iter().map(|i| i.to_string()).collect();
            format!("{}, and {last}", head.join(", "))
        }
    }
}
