//! # Repository Module
//!
//! Database repositories for the KPR storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  state.db.catalog().get(7)                                     │
//! │       ▼                                                                 │
//! │  CatalogRepository / UserRepository                                    │
//! │       │                                                                 │
//! │       │  Query::new("... WHERE id = ?").bind(7)                        │
//! │       ▼                                                                 │
//! │  Storage  ── renders markers, binds values ──►  SQLite | Postgres      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories never see backend-specific SQL. They hold a cloned
//! [`crate::Storage`] handle and write `?` markers only.
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Products, colors and galleries
//! - [`user::UserRepository`] - Accounts, password changes, admin seeding

pub mod catalog;
pub mod user;
