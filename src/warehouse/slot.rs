//! Slot identifiers for rack storage

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a storage slot in the warehouse
///
/// A slot is addressed by a column letter and a numeric position, and is
/// rendered in the canonical `<letter><position>` form used on the physical
/// rack labels (`E1`, `M28`, ...). Identifiers are unique across the whole
/// topology because racks own disjoint position ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId {
    /// Column letter (`A`..`Z`, uppercase)
    column: char,
    /// Numeric position within the column, starting at 1
    position: u32,
}

impl SlotId {
    /// Create a new slot ID
    ///
    /// The column letter is normalized to uppercase. Callers constructing
    /// ids from untrusted input should go through [`SlotId::from_str`],
    /// which validates both components.
    pub fn new(column: char, position: u32) -> Self {
        Self {
            column: column.to_ascii_uppercase(),
            position,
        }
    }

    /// Column letter of this slot
    pub fn column(&self) -> char {
        self.column
    }

    /// Numeric position of this slot
    pub fn position(&self) -> u32 {
        self.position
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.position)
    }
}

impl FromStr for SlotId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let column = chars
            .next()
            .ok_or_else(|| Error::InvalidArgument("empty slot id".to_string()))?;
        if !column.is_ascii_alphabetic() {
            return Err(Error::InvalidArgument(format!(
                "slot id '{}' must start with a column letter",
                s
            )));
        }

        let digits = chars.as_str();
        let position: u32 = digits.parse().map_err(|_| {
            Error::InvalidArgument(format!("slot id '{}' has an invalid position", s))
        })?;
        if position == 0 {
            return Err(Error::InvalidArgument(format!(
                "slot id '{}' has position 0, positions start at 1",
                s
            )));
        }

        Ok(SlotId::new(column, position))
    }
}

// Slots travel through records and config files in their label form,
// so they serialize as the canonical string rather than a struct.
impl Serialize for SlotId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
