//! Quest reward table access and the CSV decoder for it.

use crate::domain::RewardRecord;
use crate::error::{CurveError, Result};
use std::collections::HashMap;

pub const ID_COLUMN: &str = "ID";
pub const TIER_COLUMN_PREFIX: &str = "Difficulty_";

/// Point lookup by exact row key. Implementations never need to support iteration.
pub trait RewardTable: Send + Sync {
    fn get_row(&self, key: u32) -> Option<&RewardRecord>;
}

/// Turns the raw bytes of the reward file into a [`RewardTable`].
pub trait TableDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Box<dyn RewardTable>>;
}

#[derive(Clone, Debug, Default)]
pub struct MapRewardTable {
    rows: HashMap<u32, RewardRecord>,
}

impl MapRewardTable {
    pub fn insert(&mut self, rec: RewardRecord) -> Option<RewardRecord> {
        self.rows.insert(rec.id, rec)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<RewardRecord> for MapRewardTable {
    fn from_iter<I: IntoIterator<Item = RewardRecord>>(iter: I) -> Self {
        let mut t = Self::default();
        for rec in iter {
            t.insert(rec);
        }
        t
    }
}

impl RewardTable for MapRewardTable {
    fn get_row(&self, key: u32) -> Option<&RewardRecord> {
        self.rows.get(&key)
    }
}

/// Decodes a comma-separated export of the reward table:
/// an `ID` column plus `Difficulty_0..Difficulty_N`, any other columns ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct CsvTableDecoder;

impl CsvTableDecoder {
    pub fn parse(text: &str) -> Result<MapRewardTable> {
        let mut lines = text
            .split('\n')
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let (_, header) = lines
            .next()
            .ok_or_else(|| CurveError::Format("reward table is empty".into()))?;
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();

        let id_col = columns
            .iter()
            .position(|c| *c == ID_COLUMN)
            .ok_or_else(|| CurveError::Format("reward table has no ID column".into()))?;

        // (tier index, column position), ordered by tier index
        let mut tier_cols: Vec<(usize, usize)> = Vec::new();
        for (pos, name) in columns.iter().enumerate() {
            if let Some(suffix) = name.strip_prefix(TIER_COLUMN_PREFIX) {
                let idx = suffix.parse::<usize>().map_err(|_| {
                    CurveError::Format(format!("reward table column {name:?} has no tier index"))
                })?;
                tier_cols.push((idx, pos));
            }
        }
        tier_cols.sort_unstable();
        for (expected, (idx, _)) in tier_cols.iter().enumerate() {
            if *idx != expected {
                return Err(CurveError::Format(format!(
                    "reward table tier columns are not contiguous: missing {TIER_COLUMN_PREFIX}{expected}"
                )));
            }
        }

        let mut table = MapRewardTable::default();
        for (n, line) in lines {
            let cells: Vec<&str> = line.split(',').map(str::trim).collect();
            if cells.len() != columns.len() {
                return Err(CurveError::Format(format!(
                    "reward table line {n}: got {} fields, expected {}",
                    cells.len(),
                    columns.len()
                )));
            }
            let int = |pos: usize| -> Result<i64> {
                cells[pos].parse::<i64>().map_err(|e| {
                    CurveError::Format(format!(
                        "reward table line {n} column {}: {:?} is not an integer ({e})",
                        columns[pos], cells[pos]
                    ))
                })
            };
            let id = u32::try_from(int(id_col)?).map_err(|_| {
                CurveError::Format(format!("reward table line {n}: ID out of range"))
            })?;
            let difficulty_tiers = tier_cols
                .iter()
                .map(|(_, pos)| int(*pos))
                .collect::<Result<Vec<_>>>()?;
            if table
                .insert(RewardRecord {
                    id,
                    difficulty_tiers,
                })
                .is_some()
            {
                return Err(CurveError::Format(format!(
                    "reward table line {n}: duplicate ID {id}"
                )));
            }
        }
        Ok(table)
    }
}

impl TableDecoder for CsvTableDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Box<dyn RewardTable>> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CurveError::Format(format!("reward table is not UTF-8: {e}")))?;
        Ok(Box::new(Self::parse(text)?))
    }
}
