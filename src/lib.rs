//! Duty roster engine for shift-based staffing.
//!
//! Builds a feasible, fair monthly roster across named (role, shift)
//! demand lines, honoring hard safety rules and soft staff preferences.
//! The core is an ordered backtracking search over staffing slots,
//! followed by deterministic repair passes and a greedy hour-balancing
//! pass. Import/export, persistence, and transport are callers'
//! concerns — this crate consumes normalized records and produces a
//! roster with diagnostics.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Staff`, `Shift`, `DemandLine`, `Slot`,
//!   `Assignment`, `LeaveRecord`, `PreferenceAssertion`, `RuleSet`,
//!   `RosterOutcome`
//! - **`engine`**: The assignment engine — eligibility, hard-rule
//!   evaluation, candidate ranking, backtracking search, repair passes,
//!   hour balancing
//! - **`validation`**: Input integrity checks (duplicate IDs, dangling
//!   staff references)
//! - **`error`**: `RosterError` and non-fatal `ConfigWarning`
//!
//! # Pipeline
//!
//! ```text
//! validate → expand demand → index eligibility → backtracking search
//!          → rest / cap / gap / request repair → hour balancing → report
//! ```
//!
//! A run is single-threaded and fully deterministic for a fixed seed.
//! Only search exhaustion aborts a run; coverage shortfalls and
//! incomplete balancing are reported in the outcome, since an imperfect
//! roster remains operationally useful.
//!
//! # References
//!
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Ernst et al. (2004), "Staff Scheduling and Rostering: A Review"

pub mod engine;
pub mod error;
pub mod models;
pub mod validation;

pub use engine::{SolveOptions, Solver};
pub use error::{ConfigWarning, RosterError};
pub use models::{RosterOutcome, RosterRequest};
