//! # DoughTrack API
//!
//! The command surface of the DoughTrack stock ledger: validated,
//! owner-scoped, fully audited commands over `doughtrack-core` and
//! `doughtrack-db`.
//!
//! ## Usage
//! ```rust,ignore
//! use doughtrack_api::Inventory;
//! use doughtrack_core::Principal;
//! use doughtrack_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("doughtrack.db")).await?;
//! let inventory = Inventory::new(db);
//!
//! let mario = Principal::new("user_mario", "Mario Rossi");
//! let item = inventory.create_item(&mario, &payload).await?;
//! ```
//!
//! Transport is the embedder's business; these methods are plain async
//! functions returning serde-ready values.

pub mod error;
pub mod service;

pub use error::{ApiError, ApiResult, ErrorCode};
pub use service::{
    AdjustStockResponse, DeleteItemResponse, Inventory, ListAuditQuery, ListItemsQuery,
};
