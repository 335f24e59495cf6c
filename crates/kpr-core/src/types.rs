//! # Domain Types
//!
//! Core domain types used throughout the KPR storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Color       │   │  gallery URL    │       │
//! │  │  ─────────────  │ 1 │  ─────────────  │ 1 │  ─────────────  │       │
//! │  │  id (int)       │──►│  nome           │──►│  url (String)   │       │
//! │  │  nome, tipo     │ N │  hex            │ N │  (ordered)      │       │
//! │  │  preco (Money?) │   │  gallery: Vec   │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │      User       │   │      Role       │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  email (unique) │   │  Admin          │                             │
//! │  │  senha_hash     │   │  Customer       │                             │
//! │  │  papel: Role    │   └─────────────────┘                             │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Drafts vs Validated Types
//! Request bodies deserialize into `*Draft` types where every field is
//! optional. [`crate::validation`] turns a draft into a [`NewProduct`] or a
//! [`ProductUpdate`], so a missing field becomes a 400 with a readable message
//! instead of a deserializer rejection.
//!
//! JSON field names (`nome`, `tipo`, `preco`, `cores`, `gallery`) are the
//! storefront's existing contract and are kept as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Catalog
// =============================================================================

/// A color variant of a product with its ordered image gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Color {
    /// Display name, e.g. "Preto".
    pub nome: String,

    /// Hex string as entered, e.g. "#000000" or "#ccc".
    pub hex: String,

    /// Image URLs in display order.
    pub gallery: Vec<String>,
}

/// A catalog product with its colors, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Generated identifier.
    pub id: i64,

    /// Display name.
    pub nome: String,

    /// Category, e.g. "masculino" / "feminino".
    pub tipo: String,

    /// Optional price. Serialized as `null` when absent.
    pub preco: Option<Money>,

    /// When the product was created.
    #[ts(as = "String")]
    pub criado_em: DateTime<Utc>,

    /// Color variants. Order carries no meaning.
    pub cores: Vec<Color>,
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub nome: String,
    pub tipo: String,
    pub preco: Option<Money>,
    /// Never empty.
    pub cores: Vec<Color>,
}

/// Validated input for updating a product.
///
/// `cores: None` means "no colors in the request": the existing colors are
/// still removed, and none are reinserted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub nome: String,
    pub tipo: String,
    pub preco: Option<Money>,
    pub cores: Option<Vec<Color>>,
}

/// Raw product request body (`POST` / `PUT /api/produtos`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductDraft {
    #[ts(optional)]
    pub nome: Option<String>,
    #[ts(optional)]
    pub tipo: Option<String>,
    #[ts(optional)]
    pub preco: Option<Money>,
    #[ts(optional)]
    pub cores: Option<Vec<ColorDraft>>,
}

/// Raw color entry inside a [`ProductDraft`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ColorDraft {
    #[ts(optional)]
    pub nome: Option<String>,
    #[ts(optional)]
    pub hex: Option<String>,
    #[ts(optional)]
    pub gallery: Option<Vec<String>>,
}

// =============================================================================
// Users
// =============================================================================

/// Authorization role attached to a user.
///
/// Only `Admin` may mutate the catalog. The storefront ships with a single
/// admin account; `Customer` exists so the role check is a real check and
/// not an email comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

impl Role {
    /// The value stored in `usuarios.papel`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Customer => "customer",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "customer" => Ok(Role::Customer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// bcrypt hash, never serialized.
    pub senha_hash: String,
    pub nome: String,
    pub papel: Role,
    pub criado_em: DateTime<Utc>,
}

/// The part of a user that is safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub nome: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id,
            email: user.email.clone(),
            nome: user.nome.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_storage_text() {
        for role in [Role::Admin, Role::Customer] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
        assert!(Role::Admin.is_admin());
        assert!(!Role::Customer.is_admin());
    }

    #[test]
    fn test_product_json_shape() {
        let product = Product {
            id: 7,
            nome: "Air Street".to_string(),
            tipo: "masculino".to_string(),
            preco: None,
            criado_em: DateTime::parse_from_rfc3339("2026-01-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            cores: vec![Color {
                nome: "Preto".to_string(),
                hex: "#000".to_string(),
                gallery: vec!["a.jpg".to_string()],
            }],
        };

        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["id"], 7);
        assert!(json["preco"].is_null());
        assert_eq!(json["cores"][0]["gallery"][0], "a.jpg");
    }

    #[test]
    fn test_draft_accepts_missing_fields() {
        let draft: ProductDraft = serde_json::from_str(r#"{"nome":"X"}"#).unwrap();
        assert_eq!(draft.nome.as_deref(), Some("X"));
        assert!(draft.tipo.is_none());
        assert!(draft.cores.is_none());
    }
}
