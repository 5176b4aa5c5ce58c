//! # billforge-db: Database Layer for billforge
//!
//! This crate provides database access for the billforge billing
//! system. It uses SQLite for local storage with sqlx for async
//! operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        billforge Data Flow                              │
//! │                                                                         │
//! │  Caller (HTTP layer, CLI, renderers)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   billforge-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │    │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │   │    │
//! │  │   │               │    │ ProductCatalog │    │              │   │    │
//! │  │   │ SqlitePool    │◄───│ InvoiceRepo    │    │ 001_init.sql │   │    │
//! │  │   │ WAL + FK +    │    │ Sequencer      │    │ ...          │   │    │
//! │  │   │ busy timeout  │    │ DamageLedger   │    │              │   │    │
//! │  │   │               │    │ Reports        │    │              │   │    │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (single shop, single file)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and combined error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use billforge_core::types::{Customer, GstRate, InvoiceRequestLine, ProductKey};
//! use billforge_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/billforge.db")).await?;
//!
//! let created = db
//!     .invoices(GstRate::from_bps(1800))
//!     .create(
//!         &Customer::named("Asha"),
//!         &[InvoiceRequestLine::new(ProductKey::new("Rice", Some("5kg")), 3)],
//!     )
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{BillingError, BillingResult, DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::ProductCatalog;
pub use repository::damage::DamageLedger;
pub use repository::invoice::InvoiceRepository;
pub use repository::report::{Period, ReportRepository};
pub use repository::sequence::InvoiceSequencer;
