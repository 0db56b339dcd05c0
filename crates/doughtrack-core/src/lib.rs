//! # doughtrack-core: Pure Business Logic for DoughTrack
//!
//! This crate is the **heart** of DoughTrack. It contains the ledger's
//! business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     DoughTrack Architecture                         │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │              Presentation (external collaborator)             │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │ request/response                   │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │              doughtrack-api (command surface)                 │ │
//! │  │   create_item, list_items, adjust_stock, list_audit_log, ... │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │            ★ doughtrack-core (THIS CRATE) ★                   │ │
//! │  │                                                               │ │
//! │  │   ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌───────────┐   │ │
//! │  │   │   types   │ │validation │ │   stock   │ │ ownership │   │ │
//! │  │   │ Item      │ │  rules    │ │ next_qty  │ │  guard    │   │ │
//! │  │   │ AuditMeta │ │  coerce   │ │ invariant │ │           │   │ │
//! │  │   └───────────┘ └───────────┘ └───────────┘ └───────────┘   │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS         │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │              doughtrack-db (persistence layer)                │ │
//! │  │        SQLite queries, migrations, repositories               │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, AuditLogEntry, Principal, enums)
//! - [`error`] - Domain error types
//! - [`validation`] - Payload validation with full per-field error reporting
//! - [`stock`] - Quantity adjustment arithmetic and the non-negative rule
//! - [`ownership`] - The single authorization guard for item mutations
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Explicit Errors**: All errors are typed, never strings or panics
//! 4. **One guard per invariant**: ownership and non-negative stock are
//!    each enforced by exactly one function, not re-implemented per caller

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ownership;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, FieldIssue, ValidationError};
pub use ownership::ensure_owner;
pub use stock::next_quantity;
pub use types::*;
pub use validation::{
    validate_adjustment, validate_item, AdjustmentPayload, ItemPayload, NumericInput,
    ValidAdjustment, ValidItem,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of an item name, in characters.
///
/// ## Business Reason
/// Matches the limit the stock-take UI was designed around; anything longer
/// is almost certainly a paste error.
pub const MAX_NAME_LEN: usize = 100;

/// Default number of audit log entries returned when no limit is given.
pub const DEFAULT_AUDIT_LIMIT: u32 = 100;

/// Hard cap on audit log entries returned by a single query.
pub const MAX_AUDIT_LIMIT: u32 = 500;
