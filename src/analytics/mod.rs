//! Pure classification, aggregation and summary logic.
//!
//! Everything in this module is synchronous and deterministic: no I/O, no
//! clocks, no randomness. The reference date is always passed in by the
//! caller, so the same inputs produce the same report every time.

pub mod aggregate;
pub mod category;
pub mod report;
pub mod summary;

pub use aggregate::{aggregate, Bucket, TrackedEvent};
pub use category::{Category, CategoryRule, RuleSet};
pub use report::{TallyReport, View};
pub use summary::{summarize, Summary};
