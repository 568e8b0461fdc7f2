//! Domain models for the BK subsystem.
//!
//! Case records (violations, achievements, permits, counseling notes) are
//! tenant scoped: every record carries the `school_id` of the student it
//! was created for.

pub mod achievement;
pub mod caller;
pub mod category;
pub mod counseling;
pub mod permit;
pub mod roster;
pub mod violation;
