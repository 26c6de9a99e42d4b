//! An unknown-aware measured amount.
//!
//! Composition sheets mix numbers with tokens such as "N.D" or "<LOQ". Those tokens mean the
//! nutrient was not measured to a usable precision, which is not the same thing as zero, so they
//! are carried as [`Level::Unknown`] and every aggregation skips them.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Amount reported for a trace ("trace", "미량") entry.
pub const TRACE_AMOUNT: f64 = 0.001;

const UNKNOWN_TOKENS: &[&str] = &[
    "", "n.d", "n.d.", "nd", "not detected", "<loq", "< loq", "below loq", "unknown", "nan", "-",
];
const TRACE_TOKENS: &[&str] = &["trace", "미량"];

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Level {
    Known(f64),
    #[default]
    Unknown,
}

impl Level {
    pub fn known(self) -> Option<f64> {
        match self {
            Level::Known(value) => Some(value),
            Level::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Level::Known(_))
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Level {
        match self {
            Level::Known(value) => Level::Known(f(value)),
            Level::Unknown => Level::Unknown,
        }
    }

    /// Sums the known members; Unknown only when no member is known.
    pub fn sum<I: IntoIterator<Item = Level>>(levels: I) -> Level {
        levels
            .into_iter()
            .filter_map(Level::known)
            .fold(Level::Unknown, |acc, value| match acc {
                Level::Known(total) => Level::Known(total + value),
                Level::Unknown => Level::Known(value),
            })
    }

    /// Linear mix `Σ ratio_i × level_i`.
    ///
    /// Components with a zero ratio do not contribute. Any contributing Unknown makes the mix
    /// Unknown: an unmeasured share cannot be filled in with zero.
    pub fn mix<I: IntoIterator<Item = (f64, Level)>>(parts: I) -> Level {
        let mut total = 0.0;
        for (ratio, level) in parts {
            if ratio == 0.0 {
                continue;
            }
            match level {
                Level::Known(value) => total += ratio * value,
                Level::Unknown => return Level::Unknown,
            }
        }
        Level::Known(total)
    }

    /// Parses a catalog cell.
    pub fn parse(raw: &str) -> Result<Level, String> {
        let token = raw.trim();
        let lowered = token.to_lowercase();
        if UNKNOWN_TOKENS.contains(&lowered.as_str()) {
            return Ok(Level::Unknown);
        }
        if TRACE_TOKENS.contains(&lowered.as_str()) {
            return Ok(Level::Known(TRACE_AMOUNT));
        }
        let value: f64 = token
            .parse()
            .map_err(|_| format!("unrecognised composition value '{}'", raw))?;
        Level::from_number(value)
    }

    fn from_number(value: f64) -> Result<Level, String> {
        if value.is_nan() {
            Ok(Level::Unknown)
        } else if value < 0.0 {
            Err(format!("composition values must be non-negative, got {}", value))
        } else {
            Ok(Level::Known(value))
        }
    }
}

impl From<f64> for Level {
    fn from(value: f64) -> Self {
        Level::Known(value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Known(value) => write!(f, "{}", value),
            Level::Unknown => write!(f, "unknown"),
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Level::Known(value) => serializer.serialize_f64(*value),
            Level::Unknown => serializer.serialize_none(),
        }
    }
}

struct LevelVisitor;

impl<'de> Visitor<'de> for LevelVisitor {
    type Value = Level;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a non-negative number, null, or a detection-limit token")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Level, E> {
        Level::from_number(value).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Level, E> {
        Level::from_number(value as f64).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Level, E> {
        Ok(Level::Known(value as f64))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Level, E> {
        Level::parse(value).map_err(E::custom)
    }

    fn visit_none<E: de::Error>(self) -> Result<Level, E> {
        Ok(Level::Unknown)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Level, E> {
        Ok(Level::Unknown)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Level, D::Error> {
        deserializer.deserialize_any(LevelVisitor)
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LevelVisitor)
    }
}
