//! Rack definitions and the per-rack fill order

use crate::error::{Error, Result};
use crate::warehouse::slot::SlotId;
use serde::{Deserialize, Serialize};
use std::ops::{Range, RangeInclusive};

/// Group label stamped on assignments when no explicit label is configured.
/// Also the label of the hardcoded fallback pair.
pub const DEFAULT_RACK_LABEL: &str = "COLMEIA";

/// Boundary between the outer columns (filled first, ascending from here)
/// and the inner columns (filled afterwards, descending below here).
const OUTER_PIVOT: char = 'E';

/// Static description of one rack, as it appears in the engine config
///
/// Positions form a half-open range: `RACK1` spanning physical positions
/// 1 through 28 is declared as `first_position = 1, end_position = 29`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RackConfig {
    /// Rack name, unique within the topology (`RACK1`, `RACK2`, ...)
    pub name: String,
    /// Group label stamped on assignments and inventory records
    #[serde(default = "default_label")]
    pub label: String,
    /// First position owned by this rack (inclusive)
    pub first_position: u32,
    /// End of the position range (exclusive)
    pub end_position: u32,
    /// First column letter (inclusive)
    #[serde(default = "default_first_column")]
    pub first_column: char,
    /// Last column letter (inclusive)
    #[serde(default = "default_last_column")]
    pub last_column: char,
}

fn default_label() -> String {
    DEFAULT_RACK_LABEL.to_string()
}

fn default_first_column() -> char {
    'A'
}

fn default_last_column() -> char {
    'M'
}

impl RackConfig {
    /// The plant's standard three-rack layout, used when no config file
    /// overrides it: positions 1..29, 29..57 and 57..82, columns A..M.
    pub fn standard_layout() -> Vec<RackConfig> {
        let rack = |name: &str, first: u32, end: u32| RackConfig {
            name: name.to_string(),
            label: default_label(),
            first_position: first,
            end_position: end,
            first_column: 'A',
            last_column: 'M',
        };
        vec![
            rack("RACK1", 1, 29),
            rack("RACK2", 29, 57),
            rack("RACK3", 57, 82),
        ]
    }
}

/// A validated rack, ready to emit its fill order
#[derive(Debug, Clone)]
pub struct Rack {
    name: String,
    label: String,
    positions: Range<u32>,
    columns: RangeInclusive<char>,
}

impl Rack {
    /// Validate a [`RackConfig`] into a usable rack
    pub fn from_config(config: RackConfig) -> Result<Self> {
        if config.name.trim().is_empty() {
            return Err(Error::Config("rack name must not be empty".to_string()));
        }
        if config.first_position == 0 {
            return Err(Error::Config(format!(
                "rack '{}': positions start at 1",
                config.name
            )));
        }
        if config.end_position <= config.first_position {
            return Err(Error::Config(format!(
                "rack '{}': end_position {} must be greater than first_position {}",
                config.name, config.end_position, config.first_position
            )));
        }

        let first_column = config.first_column.to_ascii_uppercase();
        let last_column = config.last_column.to_ascii_uppercase();
        if !first_column.is_ascii_uppercase() || !last_column.is_ascii_uppercase() {
            return Err(Error::Config(format!(
                "rack '{}': columns must be letters A-Z",
                config.name
            )));
        }
        if first_column > last_column {
            return Err(Error::Config(format!(
                "rack '{}': first_column '{}' is past last_column '{}'",
                config.name, first_column, last_column
            )));
        }

        Ok(Self {
            name: config.name,
            label: config.label,
            positions: config.first_position..config.end_position,
            columns: first_column..=last_column,
        })
    }

    /// Rack name (`RACK1`, ...)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Group label stamped on assignments from this rack
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Position range owned by this rack (half-open)
    pub fn positions(&self) -> Range<u32> {
        self.positions.clone()
    }

    /// Whether a slot belongs to this rack
    pub fn contains(&self, slot: SlotId) -> bool {
        self.positions.contains(&slot.position()) && self.columns.contains(&slot.column())
    }

    /// Total number of slots in this rack
    pub fn slot_count(&self) -> usize {
        let columns = (*self.columns.end() as u8 - *self.columns.start() as u8) as usize + 1;
        self.positions.len() * columns
    }

    /// Emit every slot of this rack in fill order.
    ///
    /// Two phases, reflecting how the racks are worked on the floor:
    ///
    /// 1. Outer columns (E and up) position by position: `E1, F1, .. M1,
    ///    E2, ..` so the ergonomic outer columns fill across the whole rack
    ///    first.
    /// 2. Inner columns (D down to A) column by column: `D1, D2, .. then
    ///    C1, ..` so no inner column is touched before the one outside it
    ///    is full.
    ///
    /// Columns outside this rack's configured letter range are skipped.
    /// The iterator is lazy, finite and restartable.
    pub fn fill_order(&self) -> impl Iterator<Item = SlotId> + '_ {
        let (first, last) = (*self.columns.start(), *self.columns.end());

        let outer_from = first.max(OUTER_PIVOT);
        let outer = self.positions.clone().flat_map(move |pos| {
            ascending(outer_from, last).map(move |column| SlotId::new(column, pos))
        });

        let inner_from = last.min(prev_letter(OUTER_PIVOT));
        let inner_positions = self.positions.clone();
        let inner = descending(inner_from, first).flat_map(move |column| {
            inner_positions
                .clone()
                .map(move |pos| SlotId::new(column, pos))
        });

        outer.chain(inner)
    }
}

fn prev_letter(c: char) -> char {
    (c as u8 - 1) as char
}

/// Letters `from..=to` ascending; empty when `from > to`
fn ascending(from: char, to: char) -> impl Iterator<Item = char> + Clone {
    (from as u8..=to as u8).map(|c| c as char)
}

/// Letters `from` down to `down_to` descending; empty when `from < down_to`
fn descending(from: char, down_to: char) -> impl Iterator<Item = char> + Clone {
    (down_to as u8..=from as u8).rev().map(|c| c as char)
}
