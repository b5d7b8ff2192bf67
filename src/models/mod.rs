//! Rostering domain models.
//!
//! Core data types for describing a rostering problem and its
//! solution: who can work (staff, leave, preferences), what must be
//! worked (shifts, demand lines, slots), the rules that bind a run,
//! and the outcome with its diagnostics.
//!
//! | Type | Meaning |
//! |------|---------|
//! | `Staff` | A rosterable person with role qualifications |
//! | `Shift` | A named time-of-day span, possibly wrapping midnight |
//! | `DemandLine` | Recurring (role, shift) requirement with headcount |
//! | `Slot` | One required seat on a (day, role, shift) |
//! | `Assignment` | A staff member committed to a seat |
//! | `LeaveRecord` | Dated availability modifier for one person |
//! | `PreferenceAssertion` | Hard avoid or soft prefer for a pairing |
//! | `RuleSet` | Merged hard/soft configuration for one run |
//! | `RosterOutcome` | Final roster plus diagnostics |

pub mod calendar;

mod demand;
mod leave;
mod preference;
mod roster;
mod rules;
mod shift;
mod staff;

pub use demand::{expand_demand, Demand, DemandLine, Slot};
pub use leave::{LeaveBook, LeaveKind, LeaveRecord};
pub use preference::{
    NameDirectory, PreferenceAssertion, PreferenceBook, PreferenceKind, ResolvedPreference,
    StaffKey,
};
pub use roster::{
    Assignment, OverrideRecord, RequestStats, RosterOutcome, RosterRequest, Transfer,
};
pub use rules::{AreaQuota, DayBan, RuleSet};
pub use shift::{Shift, ShiftCatalog, DAY_MIN};
pub use staff::Staff;
