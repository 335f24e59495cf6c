//! # kpr-core: Pure Domain Logic for the KPR Storefront
//!
//! This crate holds the catalog and account types shared by the database
//! layer and the HTTP API. It performs no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        KPR Storefront Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Frontend (vitrine / admin)                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kpr-api (axum)                               │   │
//! │  │    /api/produtos, /api/auth/login, /api/auth/alterar-senha      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kpr-core (THIS CRATE) ★                         │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │Validation │  │   rules   │  │   │
//! │  │   │   Color   │  │ centavos  │  │   Error   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kpr-db (Database Layer)                      │   │
//! │  │         SQLite / Postgres storage, catalog repository           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Color, AdminUser, Role)
//! - [`money`] - Money type stored as integer centavos
//! - [`error`] - Validation error type
//! - [`validation`] - Input validation for catalog writes and passwords
//!
//! ## Example Usage
//!
//! ```rust
//! use kpr_core::money::Money;
//!
//! let price = Money::from_decimal(499.9).unwrap();
//! assert_eq!(price.cents(), 49990);
//! assert_eq!(price.to_decimal(), 499.9);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Email of the single seeded administrator account.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@kpr.com";

/// Password the administrator account is seeded with on first boot.
///
/// Meant to be changed through `POST /api/auth/alterar-senha` right after
/// deployment.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Display name of the seeded administrator.
pub const DEFAULT_ADMIN_NAME: &str = "Admin";

/// Minimum length accepted for a new password.
pub const MIN_PASSWORD_LENGTH: usize = 6;
