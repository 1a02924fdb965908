// xpcurve_core/src/domain.rs
use crate::error::{CurveError, Result};
use std::fmt;

/// One row of `gametables/xp.txt`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XpRecord {
    pub level: u32,
    /// Cumulative XP needed to reach `level` from level 1.
    pub total: i64,
    pub per_kill: i64,
    pub junk: i64,
    pub stats: i64,
    pub divisor: i64,
}

/// One row of the quest reward table, as materialized by a [`crate::table::reward::TableDecoder`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewardRecord {
    pub id: u32,
    pub difficulty_tiers: Vec<i64>,
}

impl RewardRecord {
    pub fn tier(&self, index: usize) -> Result<i64> {
        self.difficulty_tiers.get(index).copied().ok_or_else(|| {
            CurveError::Format(format!(
                "reward row {} has {} difficulty tiers, need index {}",
                self.id,
                self.difficulty_tiers.len(),
                index
            ))
        })
    }
}

/// One entry of the generated experience curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputRow {
    pub reward_xp: i64,
    pub threshold_xp: i64,
}

/// Opaque build identifier; only ever compared for equality.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BuildVersion(String);

impl BuildVersion {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(CurveError::Precondition(
                "failed to get current build number".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
