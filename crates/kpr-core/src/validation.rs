//! # Validation Module
//!
//! Input validation for catalog writes and account changes.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Admin form (JavaScript)                                      │
//! │  └── Fills defaults, immediate feedback                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── JSON deserialization into *Draft types                            │
//! │  └── THIS MODULE: required fields, non-empty lists                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database                                                     │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE (usuarios.email)                                           │
//! │  └── Foreign keys with ON DELETE CASCADE                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kpr_core::validation::validate_new_product;
//! use kpr_core::{ColorDraft, ProductDraft};
//!
//! let draft = ProductDraft {
//!     nome: Some("Air Street".into()),
//!     tipo: Some("masculino".into()),
//!     preco: None,
//!     cores: Some(vec![ColorDraft {
//!         nome: Some("Preto".into()),
//!         hex: Some("#000000".into()),
//!         gallery: Some(vec!["img/preto-1.jpg".into()]),
//!     }]),
//! };
//!
//! let product = validate_new_product(draft).unwrap();
//! assert_eq!(product.cores.len(), 1);
//! ```

use crate::error::ValidationError;
use crate::types::{Color, ColorDraft, NewProduct, ProductDraft, ProductUpdate};
use crate::MIN_PASSWORD_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Product Validators
// =============================================================================

/// Validates a create request.
///
/// ## Rules
/// - `nome` and `tipo` present and not blank
/// - `preco`, if present, not negative
/// - `cores` present with at least one color, each valid per [`validate_color`]
pub fn validate_new_product(draft: ProductDraft) -> ValidationResult<NewProduct> {
    let nome = validate_product_name(draft.nome)?;
    let tipo = validate_product_type(draft.tipo)?;
    let preco = validate_price(draft.preco)?;
    let cores = match draft.cores {
        Some(cores) => validate_colors(cores)?,
        None => return Err(ValidationError::required("cores")),
    };

    Ok(NewProduct {
        nome,
        tipo,
        preco,
        cores,
    })
}

/// Validates an update request.
///
/// Same rules as [`validate_new_product`], except `cores` may be omitted.
/// When it is supplied it must still hold at least one color.
pub fn validate_product_update(draft: ProductDraft) -> ValidationResult<ProductUpdate> {
    let nome = validate_product_name(draft.nome)?;
    let tipo = validate_product_type(draft.tipo)?;
    let preco = validate_price(draft.preco)?;
    let cores = draft.cores.map(validate_colors).transpose()?;

    Ok(ProductUpdate {
        nome,
        tipo,
        preco,
        cores,
    })
}

fn validate_product_name(nome: Option<String>) -> ValidationResult<String> {
    required_text("nome", nome)
}

fn validate_product_type(tipo: Option<String>) -> ValidationResult<String> {
    required_text("tipo", tipo)
}

fn validate_price(preco: Option<crate::Money>) -> ValidationResult<Option<crate::Money>> {
    match preco {
        Some(price) if price.is_negative() => Err(ValidationError::MustBeNonNegative {
            field: "preco".to_string(),
        }),
        other => Ok(other),
    }
}

fn validate_colors(cores: Vec<ColorDraft>) -> ValidationResult<Vec<Color>> {
    if cores.is_empty() {
        return Err(ValidationError::Empty {
            field: "cores".to_string(),
        });
    }

    cores.into_iter().map(validate_color).collect()
}

/// Validates one color entry.
///
/// ## Rules
/// - `nome` and `hex` present and not blank
/// - `gallery` has at least one non-blank URL
///
/// `hex` is stored as typed; the admin form sends whatever the user entered.
pub fn validate_color(draft: ColorDraft) -> ValidationResult<Color> {
    let nome = required_text("cores.nome", draft.nome)?;
    let hex = required_text("cores.hex", draft.hex)?;

    let gallery = draft
        .gallery
        .ok_or_else(|| ValidationError::required("cores.gallery"))?;
    if gallery.is_empty() {
        return Err(ValidationError::Empty {
            field: "cores.gallery".to_string(),
        });
    }

    let gallery = gallery
        .into_iter()
        .map(|url| required_text("cores.gallery", Some(url)))
        .collect::<ValidationResult<Vec<_>>>()?;

    Ok(Color { nome, hex, gallery })
}

// =============================================================================
// Account Validators
// =============================================================================

/// Validates a new password.
///
/// ## Rules
/// - At least [`MIN_PASSWORD_LENGTH`] characters (counted as chars, not bytes)
pub fn validate_new_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "senhaNova".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// Trims `value` and rejects it when missing or blank.
fn required_text(field: &str, value: Option<String>) -> ValidationResult<String> {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    Ok(value)
}

// =============================================================================
// Unit Tests
// =============================================================================
