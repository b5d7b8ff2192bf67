//! Target derivation and end-of-run statistics.

use std::collections::BTreeMap;

use crate::models::{
    Assignment, PreferenceBook, PreferenceKind, RequestStats, RuleSet, Staff,
};

/// Per-staff hour targets, rescaled so they sum to the demanded hours.
///
/// Each base target is the configured monthly hours scaled by the staff
/// member's contract ratio. Rescaling preserves the ratios while
/// matching the actual workload; when every ratio is zero, the demand
/// is split evenly instead.
pub fn compute_targets(
    staff: &[Staff],
    rules: &RuleSet,
    total_hours: f64,
) -> BTreeMap<String, f64> {
    let bases: Vec<(String, f64)> = staff
        .iter()
        .map(|s| (s.id.clone(), rules.monthly_target_hours * s.target_ratio))
        .collect();
    let base_sum: f64 = bases.iter().map(|(_, b)| b).sum();

    if base_sum <= 0.0 {
        let share = if staff.is_empty() {
            0.0
        } else {
            total_hours / staff.len() as f64
        };
        return bases.into_iter().map(|(id, _)| (id, share)).collect();
    }

    let scale = total_hours / base_sum;
    bases.into_iter().map(|(id, b)| (id, b * scale)).collect()
}

/// Fair-share hour goal per role: total demanded hours for the role
/// split evenly over its qualified headcount.
pub fn compute_role_targets(
    staff: &[Staff],
    role_hours: &BTreeMap<String, f64>,
) -> BTreeMap<String, f64> {
    role_hours
        .iter()
        .map(|(role, &total)| {
            let qualified = staff.iter().filter(|s| s.qualifies_for(role)).count();
            (role.clone(), total / qualified.max(1) as f64)
        })
        .collect()
}

/// Worked hours per staff member from the final assignments.
///
/// Leave credits count toward targets during the search but are not
/// worked hours, so this tally excludes them. Every known staff member
/// appears, at zero if unassigned.
pub fn hours_by_staff(staff: &[Staff], assignments: &[Assignment]) -> BTreeMap<String, f64> {
    let mut hours: BTreeMap<String, f64> =
        staff.iter().map(|s| (s.id.clone(), 0.0)).collect();
    for a in assignments {
        *hours.entry(a.staff_id.clone()).or_insert(0.0) += a.hours;
    }
    hours
}

/// Tallies request satisfaction against the final assignments.
pub fn request_stats(prefs: &PreferenceBook, assignments: &[Assignment]) -> RequestStats {
    let mut stats = RequestStats::default();
    for entry in prefs.entries() {
        let matched = assignments
            .iter()
            .any(|a| entry.matches(&a.staff_id, a.day, &a.shift_code));
        match (entry.kind, matched) {
            (PreferenceKind::Avoid, true) => stats.avoid_violated += 1,
            (PreferenceKind::Avoid, false) => stats.avoid_honored += 1,
            (PreferenceKind::Prefer, true) => stats.prefer_met += 1,
            (PreferenceKind::Prefer, false) => stats.prefer_unmet += 1,
        }
    }
    stats
}
