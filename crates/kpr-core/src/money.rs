//! # Money Module
//!
//! Provides the `Money` type for catalog prices.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Admin form sends:      { "preco": 499.9 }                             │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  Money::from_decimal  →  49990 centavos                                │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  produtos.preco_centavos = 49990   (BIGINT on both backends)           │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  JSON response:         { "preco": 499.9 }                             │
//! │                                                                         │
//! │  The float only exists at the JSON boundary. Storage never sees it,   │
//! │  so SQLite REAL vs Postgres NUMERIC differences can't leak through.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kpr_core::money::Money;
//!
//! let price = Money::from_cents(1099); // R$ 10,99
//! assert_eq!(price.to_string(), "R$ 10,99");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos (the smallest BRL unit).
///
/// ## Serialization
/// Serializes as a decimal number (`499.9`), deserializes from any JSON
/// number. The JSON contract with the storefront predates this type and
/// uses plain decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from centavos.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount, rounding to the nearest centavo.
    ///
    /// ## Errors
    /// `InvalidFormat` for NaN/infinite values or amounts that don't fit in i64 centavos.
    ///
    /// ## Example
    /// ```rust
    /// use kpr_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(10.99).unwrap().cents(), 1099);
    /// assert_eq!(Money::from_decimal(0.005).unwrap().cents(), 1);
    /// assert!(Money::from_decimal(f64::NAN).is_err());
    /// ```
    pub fn from_decimal(value: f64) -> Result<Self, ValidationError> {
        let cents = (value * 100.0).round();

        if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
            return Err(ValidationError::InvalidFormat {
                field: "preco".to_string(),
                reason: "valor numérico inválido".to_string(),
            });
        }

        Ok(Money(cents as i64))
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value as a decimal amount (for JSON only).
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

/// Formats as Brazilian currency: `R$ 1234,50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}R$ {},{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::from_decimal(value).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
