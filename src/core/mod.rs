//! Core business logic - framework-agnostic entry editing, aggregation, export and
//! staff administration.
//!
//! Every operation takes the store handle (and a notifier where it reports to users)
//! as an argument; nothing here holds global state.

/// Month/process/day aggregation of production entries
pub mod aggregate;
/// Append-only activity log
pub mod audit;
/// Off-day calendar
pub mod calendar;
/// Date key normalization and display
pub mod date;
/// Field-level entry diffs for the activity log
pub mod diff;
/// Plan creation, actual recording, editing and deletion of entries
pub mod entry;
/// CSV report serialization
pub mod export;
/// User-facing notifications
pub mod notify;
/// Role-based authorization
pub mod permissions;
/// Staff account administration
pub mod users;
