//! Preference assertions, name aliasing, and the resolved book.
//!
//! Preferences arrive keyed either by staff ID or by a free-text name.
//! Name keys go through a dedicated normalization + lookup directory
//! rather than inline string transforms; unresolvable names are
//! dropped with a warning, never guessed. Avoid assertions are hard —
//! honored during search and enforced again in reconciliation. Prefer
//! assertions contribute a soft ranking score.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::ConfigWarning;
use crate::models::Staff;

/// How a preference assertion is keyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaffKey {
    /// Exact staff ID.
    Id(String),
    /// Free-text name, resolved through the [`NameDirectory`].
    Name(String),
}

/// Whether an assertion repels or attracts an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreferenceKind {
    /// Hard: the pairing must not survive the run.
    Avoid,
    /// Soft: the pairing is preferred, weighted by intensity.
    Prefer,
}

/// A single preference assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceAssertion {
    /// Who the assertion is about.
    pub key: StaffKey,
    /// Day the assertion applies to.
    pub day: NaiveDate,
    /// Restricts the assertion to one shift code; `None` is day-wide.
    pub shift_code: Option<String>,
    /// Kind: hard avoid or soft prefer.
    pub kind: PreferenceKind,
    /// Intensity for soft scoring; ignored for avoids.
    pub weight: i32,
}

impl PreferenceAssertion {
    /// Creates a day-wide hard avoid.
    pub fn avoid(key: StaffKey, day: NaiveDate) -> Self {
        Self {
            key,
            day,
            shift_code: None,
            kind: PreferenceKind::Avoid,
            weight: 0,
        }
    }

    /// Creates a day-wide soft prefer with the given intensity.
    pub fn prefer(key: StaffKey, day: NaiveDate, weight: i32) -> Self {
        Self {
            key,
            day,
            shift_code: None,
            kind: PreferenceKind::Prefer,
            weight,
        }
    }

    /// Restricts the assertion to a shift code.
    pub fn with_shift(mut self, code: impl Into<String>) -> Self {
        self.shift_code = Some(code.into());
        self
    }
}

/// Normalized name → staff ID lookup.
///
/// Staff IDs and display names register automatically; extra aliases
/// (nicknames, initials, spreadsheet spellings) register explicitly.
#[derive(Debug, Clone, Default)]
pub struct NameDirectory {
    by_key: HashMap<String, String>,
}

/// Lowercases, trims, and collapses internal whitespace.
fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl NameDirectory {
    /// Builds a directory from the roster plus explicit aliases.
    ///
    /// Aliases win over display names on collision: a deliberate
    /// registration beats an incidental one.
    pub fn build(staff: &[Staff], aliases: &[(String, String)]) -> Self {
        let mut by_key = HashMap::new();
        for s in staff {
            by_key.insert(normalize(&s.id), s.id.clone());
            by_key.insert(normalize(&s.name), s.id.clone());
        }
        for (alias, staff_id) in aliases {
            by_key.insert(normalize(alias), staff_id.clone());
        }
        Self { by_key }
    }

    /// Resolves a key to a staff ID.
    pub fn resolve<'a>(&'a self, key: &'a StaffKey) -> Option<&'a str> {
        match key {
            StaffKey::Id(id) => Some(id.as_str()),
            StaffKey::Name(name) => self.by_key.get(&normalize(name)).map(String::as_str),
        }
    }
}

/// An assertion with its key resolved to a staff ID.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPreference {
    /// Resolved staff ID.
    pub staff_id: String,
    /// Day the assertion applies to.
    pub day: NaiveDate,
    /// Shift restriction; `None` is day-wide.
    pub shift_code: Option<String>,
    /// Kind: hard avoid or soft prefer.
    pub kind: PreferenceKind,
    /// Intensity for soft scoring.
    pub weight: i32,
}

impl ResolvedPreference {
    /// Whether this assertion covers (`staff`, `day`, `shift`).
    pub fn matches(&self, staff: &str, day: NaiveDate, shift_code: &str) -> bool {
        self.staff_id == staff
            && self.day == day
            && match &self.shift_code {
                None => true,
                Some(c) => c == shift_code,
            }
    }
}

/// Resolved preference assertions indexed for engine queries.
#[derive(Debug, Clone, Default)]
pub struct PreferenceBook {
    entries: Vec<ResolvedPreference>,
}

impl PreferenceBook {
    /// Resolves assertions against the directory.
    ///
    /// Name keys that match nothing produce a warning and are dropped.
    pub fn resolve(
        assertions: &[PreferenceAssertion],
        directory: &NameDirectory,
    ) -> (Self, Vec<ConfigWarning>) {
        let mut entries = Vec::with_capacity(assertions.len());
        let mut warnings = Vec::new();
        for a in assertions {
            match directory.resolve(&a.key) {
                Some(staff_id) => entries.push(ResolvedPreference {
                    staff_id: staff_id.to_string(),
                    day: a.day,
                    shift_code: a.shift_code.clone(),
                    kind: a.kind,
                    weight: a.weight,
                }),
                None => {
                    if let StaffKey::Name(name) = &a.key {
                        warnings.push(ConfigWarning::UnresolvedName { name: name.clone() });
                    }
                }
            }
        }
        (Self { entries }, warnings)
    }

    /// Whether a hard avoid covers (`staff`, `day`, `shift`).
    pub fn hard_avoid(&self, staff: &str, day: NaiveDate, shift_code: &str) -> bool {
        self.entries.iter().any(|e| {
            e.kind == PreferenceKind::Avoid && e.matches(staff, day, shift_code)
        })
    }

    /// Summed prefer weight for (`staff`, `day`, `shift`).
    pub fn prefer_score(&self, staff: &str, day: NaiveDate, shift_code: &str) -> i64 {
        self.entries
            .iter()
            .filter(|e| e.kind == PreferenceKind::Prefer && e.matches(staff, day, shift_code))
            .map(|e| i64::from(e.weight))
            .sum()
    }

    /// All resolved assertions, for satisfaction statistics.
    pub fn entries(&self) -> &[ResolvedPreference] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn roster() -> Vec<Staff> {
        vec![
            Staff::new("s1", "Kim Min-ji").with_role("nurse"),
            Staff::new("s2", "Lee Ha-eun").with_role("nurse"),
        ]
    }

    #[test]
    fn test_directory_resolves_id_name_alias() {
        let aliases = vec![("MJ".to_string(), "s1".to_string())];
        let dir = NameDirectory::build(&roster(), &aliases);

        assert_eq!(dir.resolve(&StaffKey::Id("s1".into())), Some("s1"));
        assert_eq!(dir.resolve(&StaffKey::Name("kim min-ji".into())), Some("s1"));
        // Normalization: case and internal whitespace.
        assert_eq!(
            dir.resolve(&StaffKey::Name("  KIM   MIN-JI ".into())),
            Some("s1")
        );
        assert_eq!(dir.resolve(&StaffKey::Name("mj".into())), Some("s1"));
        assert_eq!(dir.resolve(&StaffKey::Name("nobody".into())), None);
    }

    #[test]
    fn test_unresolved_name_warns_and_drops() {
        let dir = NameDirectory::build(&roster(), &[]);
        let assertions = vec![PreferenceAssertion::avoid(
            StaffKey::Name("ghost".into()),
            d(5),
        )];
        let (book, warnings) = PreferenceBook::resolve(&assertions, &dir);
        assert!(book.entries().is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_hard_avoid_wildcard_and_exact() {
        let dir = NameDirectory::build(&roster(), &[]);
        let assertions = vec![
            PreferenceAssertion::avoid(StaffKey::Id("s1".into()), d(5)),
            PreferenceAssertion::avoid(StaffKey::Id("s2".into()), d(6)).with_shift("N"),
        ];
        let (book, _) = PreferenceBook::resolve(&assertions, &dir);

        // Day-wide avoid hits every shift.
        assert!(book.hard_avoid("s1", d(5), "D"));
        assert!(book.hard_avoid("s1", d(5), "N"));
        assert!(!book.hard_avoid("s1", d(6), "D"));
        // Shift-scoped avoid hits only its shift.
        assert!(book.hard_avoid("s2", d(6), "N"));
        assert!(!book.hard_avoid("s2", d(6), "D"));
    }

    #[test]
    fn test_prefer_score_sums() {
        let dir = NameDirectory::build(&roster(), &[]);
        let assertions = vec![
            PreferenceAssertion::prefer(StaffKey::Id("s1".into()), d(5), 2),
            PreferenceAssertion::prefer(StaffKey::Id("s1".into()), d(5), 3).with_shift("D"),
        ];
        let (book, _) = PreferenceBook::resolve(&assertions, &dir);

        assert_eq!(book.prefer_score("s1", d(5), "D"), 5);
        assert_eq!(book.prefer_score("s1", d(5), "N"), 2);
        assert_eq!(book.prefer_score("s2", d(5), "D"), 0);
    }
}
