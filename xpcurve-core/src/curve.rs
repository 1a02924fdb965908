//! Joins the xp table with the quest reward table into the experience curve.
//!
//! Levels `1..level_cap` are walked in order. Each level's threshold comes from
//! the xp table; its reward is read from the reward row keyed by
//! [`reward_key`] and rounded to the level band's granularity.

use crate::domain::OutputRow;
use crate::error::{CurveError, Result};
use crate::table::reward::RewardTable;
use crate::table::xp::XpTable;

/// Reward rows are keyed one past the level they describe.
pub const REWARD_KEY_OFFSET: u32 = 1;
/// Base quest reward column within a reward row's difficulty tiers.
pub const REWARD_TIER: usize = 3;

#[inline]
pub fn reward_key(level: u32) -> u32 {
    level + REWARD_KEY_OFFSET
}

/// Rounding step for the reward shown at `level`.
pub fn granularity(level: u32) -> i64 {
    match level {
        0..=5 => 10,
        6..=14 => 25,
        _ => 50,
    }
}

/// Nearest multiple of `step`, halves rounded away from zero. `None` when the
/// result does not fit in an `i64`.
pub fn round_to_multiple(value: i64, step: i64) -> Option<i64> {
    debug_assert!(step > 0);
    let q = value / step;
    let r = value % step;
    // |r| >= step/2, compared without losing the half on odd steps
    let q = if 2 * r.abs() >= step { q + value.signum() } else { q };
    q.checked_mul(step)
}

pub fn build(xp: &XpTable, rewards: &dyn RewardTable) -> Result<Vec<OutputRow>> {
    let cap = xp.level_cap.ok_or_else(|| {
        CurveError::Precondition("xp table never reaches the capped total; level cap unbounded".into())
    })?;

    // cap comes from the input; holes are only found while walking
    let mut out = Vec::new();
    for level in 1..cap {
        let rec = xp
            .get(level)
            .ok_or_else(|| CurveError::Format(format!("no xp data for level {level}")))?;
        let key = reward_key(level);
        let row = rewards.get_row(key).ok_or_else(|| {
            CurveError::Format(format!("no quest xp data for level {level} (row {key})"))
        })?;
        let raw = row.tier(REWARD_TIER)?;
        let reward_xp = round_to_multiple(raw, granularity(level)).ok_or_else(|| {
            CurveError::Format(format!("quest xp {raw} for level {level} is out of range"))
        })?;
        out.push(OutputRow {
            reward_xp,
            threshold_xp: rec.total,
        });
    }
    Ok(out)
}
