//! Audit trail for ledger mutations
//!
//! Every create, update, delete, and deactivation of a user-visible entity
//! is appended to a JSON-lines log with before/after snapshots.
//!
//! - `AuditEntry`: one logged operation.
//! - `AuditLogger`: appends entries to, and reads them back from, the log file.
//! - `generate_diff`: one-line summary of top-level field changes.
//!
//! Recomputing a budget's spent amount is derived state and is not audited.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
