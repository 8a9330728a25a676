//! # availability-engine
//!
//! Rule-based availability resolution for booking calendars.
//!
//! Given a set of opening-hour rules (some permanent, some valid only between
//! two dates), the engine answers whether a date, a point in time, or a booking
//! of a given duration is allowed. Windows that close at midnight, bookings
//! that run past midnight, and a buffer offset in front of every booking are
//! handled explicitly so day boundaries never double-book or reject a valid
//! slot.
//!
//! ## Modules
//!
//! - [`resolver`] — per-date rule selection and validity queries
//! - [`rule`] — rules, weekly schedules, and the raw record format
//! - [`time`] — time of day (with `24:00`), windows, and booking intervals
//! - [`merge`] — coalescing overlapping windows
//! - [`weekly`] — per-weekday merged windows for display
//! - [`error`] — Error types

pub mod error;
pub mod merge;
pub mod resolver;
pub mod rule;
pub mod time;
pub mod weekly;

pub use error::AvailabilityError;
pub use merge::merge_ranges;
pub use resolver::AvailabilityResolver;
pub use rule::{Rule, RuleRecord, RulesDocument, WeekSchedule};
pub use time::{TimeInterval, TimeOfDay, TimeRange};
pub use weekly::WeeklyRanges;
