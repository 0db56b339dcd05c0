//! # DoughTrack Database Layer
//!
//! SQLite persistence for the DoughTrack stock ledger.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        doughtrack-db                                │
//! │                                                                     │
//! │  ┌──────────┐    ┌──────────────┐    ┌───────────────────────────┐  │
//! │  │  pool    │───►│ repository   │───►│  SQLite (WAL)             │  │
//! │  │ Database │    │ item / audit │    │  items, audit_log         │  │
//! │  └──────────┘    └──────────────┘    └───────────────────────────┘  │
//! │       │                                                             │
//! │  ┌──────────┐                                                       │
//! │  │migrations│  embedded, run once at startup                        │
//! │  └──────────┘                                                       │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use doughtrack_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("doughtrack.db")).await?;
//! let item = db.items().create(&owner, fields).await?;
//! db.close().await;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{Adjustment, AuditRepository, ItemRepository};
