//! # Repository Modules
//!
//! One repository per table, each owning the SQL that touches it:
//!
//! - [`item`] - stock items and the compound mutation transactions
//! - [`audit`] - append-only audit trail reads (appends are crate-private)

pub mod audit;
pub mod item;

pub use audit::AuditRepository;
pub use item::{Adjustment, ItemRepository};
