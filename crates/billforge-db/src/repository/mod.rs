//! # Repository Module
//!
//! Database repository implementations for billforge.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                 │
//! │                                                                 │
//! │  The Repository pattern abstracts database access behind a      │
//! │  clean API.                                                     │
//! │                                                                 │
//! │  Caller                                                         │
//! │       │                                                         │
//! │       │  db.catalog().get_by_full_name("Rice (5kg)")            │
//! │       │  db.invoices(rate).create(&customer, &lines)            │
//! │       ▼                                                         │
//! │  Repository struct over the shared SqlitePool                   │
//! │       │                                                         │
//! │       │  SQL                                                    │
//! │       ▼                                                         │
//! │  SQLite Database                                                │
//! │                                                                 │
//! │  Benefits:                                                      │
//! │  • Clean separation of concerns                                 │
//! │  • SQL is isolated in one place                                 │
//! │  • Transaction boundaries live with the queries they protect    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::ProductCatalog`] - Product CRUD and stock corrections
//! - [`sequence::InvoiceSequencer`] - Durable invoice number allocation
//! - [`invoice::InvoiceRepository`] - Atomic invoice creation and reads
//! - [`damage::DamageLedger`] - Damaged-stock moves and event history
//! - [`report::ReportRepository`] - Read-only aggregate queries

pub mod catalog;
pub mod damage;
pub mod invoice;
pub mod report;
pub mod sequence;

#[cfg(test)]
pub(crate) mod testing {
    use crate::pool::{Database, DbConfig};

    /// Fresh in-memory database with migrations applied.
    pub async fn test_database() -> Database {
        Database::new(DbConfig::in_memory())
            .await
            .expect("in-memory database")
    }
}
