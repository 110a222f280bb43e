//! Exercise and period lifecycle state machine.
//!
//! The fiscal calendar gates all posting: an entry may only be created or
//! mutated while its period is open and its exercise is open or in
//! provisional close.

pub mod calendar;
pub mod exercise;
pub mod period;

#[cfg(test)]
mod calendar_props;

pub use calendar::{generate_monthly_periods, resolve_period};
pub use exercise::{Exercise, ExerciseStatus};
pub use period::{ensure_posting_allowed, posting_allowed, Period, PeriodStatus};
