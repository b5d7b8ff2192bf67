//! Candidate ranking.
//!
//! Imposes a total order over the eligible candidates for a slot.
//! Successive tie-breaks, stated direction wins:
//!
//! 1. Role-hour deficit (higher wins)
//! 2. Monthly-target deficit (higher wins)
//! 3. Soft preference score (higher wins)
//! 4. Same-weekday prior-assignment count (lower wins)
//! 5. Total assignment count (lower wins)
//! 6. Avoid-next-day penalty from yesterday's shift (0 beats 1)
//! 7. Raw accumulated hours (lower wins)
//! 8. Seeded pseudorandom tiebreak
//!
//! The final key makes the order total and fully deterministic for a
//! fixed seed, independent of input ordering or map iteration.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::state::RosterState;
use crate::models::{PreferenceBook, ShiftCatalog, Slot};

/// Ranking inputs shared across a run.
#[derive(Debug)]
pub struct RankContext<'a> {
    /// Shift catalog, for the avoid-next-day penalty.
    pub catalog: &'a ShiftCatalog,
    /// Resolved preferences, for the soft score.
    pub prefs: &'a PreferenceBook,
    /// Fair-share hour goal per role.
    pub role_targets: &'a BTreeMap<String, f64>,
    /// Rescaled monthly target per staff member.
    pub staff_targets: &'a BTreeMap<String, f64>,
}

/// Ranks eligible candidates for slots.
#[derive(Debug, Clone, Copy)]
pub struct CandidateRanker {
    seed: u64,
}

#[derive(Debug)]
struct RankKey {
    role_deficit: f64,
    target_deficit: f64,
    pref_score: i64,
    weekday_count: u32,
    total_count: u32,
    avoid_penalty: u8,
    hours: f64,
    tiebreak: u64,
}

impl CandidateRanker {
    /// Creates a ranker with the run's tiebreak seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Orders `candidates` for `slot`, best first.
    pub fn rank(
        &self,
        candidates: Vec<String>,
        slot: &Slot,
        state: &RosterState,
        ctx: &RankContext<'_>,
    ) -> Vec<String> {
        let mut keyed: Vec<(RankKey, String)> = candidates
            .into_iter()
            .map(|id| (self.key_for(&id, slot, state, ctx), id))
            .collect();
        keyed.sort_by(|a, b| compare_keys(&a.0, &b.0));
        keyed.into_iter().map(|(_, id)| id).collect()
    }

    fn key_for(
        &self,
        staff: &str,
        slot: &Slot,
        state: &RosterState,
        ctx: &RankContext<'_>,
    ) -> RankKey {
        let role_target = ctx.role_targets.get(&slot.role).copied().unwrap_or(0.0);
        let staff_target = ctx.staff_targets.get(staff).copied().unwrap_or(0.0);

        RankKey {
            role_deficit: role_target - state.role_hours(staff, &slot.role),
            target_deficit: staff_target - state.hours(staff),
            pref_score: ctx.prefs.prefer_score(staff, slot.day, &slot.shift_code),
            weekday_count: state.weekday_count(staff, slot.day),
            total_count: state.assignment_count(staff),
            avoid_penalty: self.avoid_next_penalty(staff, slot, state, ctx),
            hours: state.hours(staff),
            tiebreak: self.tiebreak(staff, slot),
        }
    }

    /// 1 when yesterday's shift discourages today's code, else 0.
    fn avoid_next_penalty(
        &self,
        staff: &str,
        slot: &Slot,
        state: &RosterState,
        ctx: &RankContext<'_>,
    ) -> u8 {
        let Some(yesterday) = slot.day.pred_opt() else {
            return 0;
        };
        let discouraged = state.assignments_on(staff, yesterday).iter().any(|a| {
            ctx.catalog
                .get(&a.shift_code)
                .map(|s| s.avoids_next(&slot.shift_code))
                .unwrap_or(false)
        });
        u8::from(discouraged)
    }

    /// Deterministic pseudorandom tiebreak for (seed, slot, staff).
    fn tiebreak(&self, staff: &str, slot: &Slot) -> u64 {
        use chrono::Datelike;

        // FNV-1a fold of the identifying tuple, then one RNG draw.
        let mut h: u64 = 0xcbf2_9ce4_8422_2325 ^ self.seed;
        let mut eat = |bytes: &[u8]| {
            for &b in bytes {
                h ^= u64::from(b);
                h = h.wrapping_mul(0x0000_0100_0000_01b3);
            }
        };
        eat(staff.as_bytes());
        eat(slot.role.as_bytes());
        eat(slot.shift_code.as_bytes());
        eat(&slot.day.num_days_from_ce().to_le_bytes());
        eat(&slot.ordinal.to_le_bytes());
        StdRng::seed_from_u64(h).random()
    }
}

fn compare_keys(a: &RankKey, b: &RankKey) -> Ordering {
    desc_f64(a.role_deficit, b.role_deficit)
        .then_with(|| desc_f64(a.target_deficit, b.target_deficit))
        .then_with(|| b.pref_score.cmp(&a.pref_score))
        .then_with(|| a.weekday_count.cmp(&b.weekday_count))
        .then_with(|| a.total_count.cmp(&b.total_count))
        .then_with(|| a.avoid_penalty.cmp(&b.avoid_penalty))
        .then_with(|| asc_f64(a.hours, b.hours))
        .then_with(|| a.tiebreak.cmp(&b.tiebreak))
}

fn desc_f64(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn asc_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
