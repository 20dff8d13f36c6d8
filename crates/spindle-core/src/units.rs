//! Unit symbols and quantity display.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use thiserror::Error;

// Volume
pub const MICROLITERS: &str = "µl";
pub const MILLILITERS: &str = "ml";

// Weight
pub const NANOGRAMS: &str = "ng";

// Concentration
pub const PICOMOLAR: &str = "pM";
pub const NANOMOLAR: &str = "nM";
pub const MICROMOLAR: &str = "µM";
pub const MILLIMOLAR: &str = "mM";
pub const MOLAR: &str = "M";

// Temperature
pub const DEGREES_C: &str = "°C";

// Time
pub const MINUTES: &str = "min";
pub const SECONDS: &str = "sec";
pub const HOURS: &str = "hr";

// Force
pub const TIMES_G: &str = "x g";

// Nucleic acid length
pub const BASEPAIRS: &str = "bp";
pub const KILOBASEPAIRS: &str = "kbp";
pub const MEGABASEPAIRS: &str = "mbp";
pub const GIGABASEPAIRS: &str = "gbp";

// Voltage
pub const VOLTS: &str = "V";

const UNIT_TABLE: &[(&str, &str)] = &[
    ("MICROLITERS", MICROLITERS),
    ("MILLILITERS", MILLILITERS),
    ("NANOGRAMS", NANOGRAMS),
    ("PICOMOLAR", PICOMOLAR),
    ("NANOMOLAR", NANOMOLAR),
    ("MICROMOLAR", MICROMOLAR),
    ("MILLIMOLAR", MILLIMOLAR),
    ("MOLAR", MOLAR),
    ("DEGREES_C", DEGREES_C),
    ("MINUTES", MINUTES),
    ("SECONDS", SECONDS),
    ("HOURS", HOURS),
    ("TIMES_G", TIMES_G),
    ("BASEPAIRS", BASEPAIRS),
    ("KILOBASEPAIRS", KILOBASEPAIRS),
    ("MEGABASEPAIRS", MEGABASEPAIRS),
    ("GIGABASEPAIRS", GIGABASEPAIRS),
    ("VOLTS", VOLTS),
];

#[derive(Debug, Error)]
pub enum UnitError {
    #[error("unknown unit name: {0}")]
    BadUnitName(String),

    #[error("object type {0} has no measure in its data object")]
    MissingMeasure(String),

    #[error("object type {name} has a malformed measure: {reason}")]
    MalformedMeasure { name: String, reason: String },

    #[error("invalid key pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Look up a unit symbol by its constant name, case-insensitively.
pub fn unit_for(name: &str) -> Result<&'static str, UnitError> {
    let wanted = name.to_ascii_uppercase();
    UNIT_TABLE
        .iter()
        .find(|(constant, _)| *constant == wanted)
        .map(|(_, symbol)| *symbol)
        .ok_or_else(|| UnitError::BadUnitName(name.to_string()))
}

/// A number paired with its unit symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantity {
    pub qty: f64,
    pub units: &'static str,
}

impl Quantity {
    pub fn new(qty: f64, units: &'static str) -> Self {
        Self { qty, units }
    }

    pub fn milliliters(qty: f64) -> Self {
        Self::new(qty, MILLILITERS)
    }

    pub fn minutes(qty: f64) -> Self {
        Self::new(qty, MINUTES)
    }

    pub fn celsius(qty: f64) -> Self {
        Self::new(qty, DEGREES_C)
    }
}

/// Decimal places kept when a quantity is shown to a technician.
const DISPLAY_DECIMALS: usize = 3;

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fixed = format!("{:.*}", DISPLAY_DECIMALS, self.qty);
        let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
        let qty = if trimmed == "-0" { "0" } else { trimmed };
        write!(f, "{qty} {}", self.units)
    }
}

/// Derive `<prefix>_qty` quantities from option keys that name their unit.
///
/// `sus_volume_milliliters = 1.5` yields `sus_volume_qty = 1.5 ml`. Keys
/// ending in anything other than `microliters`, `milliliters` or `minutes`
/// are skipped.
pub fn quantities_from_options(
    options: &BTreeMap<String, f64>,
) -> Result<BTreeMap<String, Quantity>, UnitError> {
    let key_re = Regex::new(r"^(.+_)([a-z]+)$")?;
    let mut quantities = BTreeMap::new();

    for (key, value) in options {
        let Some(caps) = key_re.captures(key) else {
            continue;
        };
        let units = match &caps[2] {
            "microliters" => MICROLITERS,
            "milliliters" => MILLILITERS,
            "minutes" => MINUTES,
            _ => continue,
        };
        quantities.insert(format!("{}qty", &caps[1]), Quantity::new(*value, units));
    }

    Ok(quantities)
}

/// Key for the measure declared in an object type's data object.
///
/// The data object must carry `{"measure": {"type": ..., "unit": ...}}`;
/// the key is the type name, an underscore, and the unit symbol
/// (`concentration_µM`).
pub fn measure_key(
    object_type: &str,
    data_object: &serde_json::Value,
) -> Result<String, UnitError> {
    let measure = data_object
        .get("measure")
        .ok_or_else(|| UnitError::MissingMeasure(object_type.to_string()))?;

    let field = |name: &str| {
        measure
            .get(name)
            .and_then(|v| v.as_str())
            .ok_or_else(|| UnitError::MalformedMeasure {
                name: object_type.to_string(),
                reason: format!("missing string field `{name}`"),
            })
    };

    let type_name = field("type")?;
    let unit = unit_for(field("unit")?)?;
    Ok(format!("{type_name}_{unit}"))
}
