//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Production entry commands
pub mod entry;

/// General utility commands
pub mod general;

/// Reporting and export commands
pub mod report;

/// Staff administration commands
pub mod users;

// Export commands
pub use entry::*;
pub use general::*;
pub use report::*;
pub use users::*;
