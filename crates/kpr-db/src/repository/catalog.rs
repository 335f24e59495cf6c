//! # Catalog Repository
//!
//! Maps the three catalog tables to nested [`Product`] values and back.
//!
//! ## Shape Translation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  produtos (id, nome, tipo, preco_centavos, criado_em)                  │
//! │     │ 1:N  cores.produto_id   ON DELETE CASCADE                         │
//! │     ▼                                                                   │
//! │  cores (id, produto_id, nome, hex)                                     │
//! │     │ 1:N  galeria.cor_id     ON DELETE CASCADE                         │
//! │     ▼                                                                   │
//! │  galeria (id, cor_id, url)                                             │
//! │                                                                         │
//! │            ══════ assemble ══════►                                      │
//! │                                                                         │
//! │  Product { id, nome, tipo, preco, criado_em,                           │
//! │            cores: [Color { nome, hex, gallery: [url, ...] }] }          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reads
//! `list` issues three queries (products, colors, images) and groups the
//! rows in memory. Colors and images come back in insertion order (`id`).
//!
//! ## Writes
//! `create`, `update` and `delete` each run in one transaction. If any
//! statement fails the transaction handle is dropped and every row it wrote
//! is rolled back.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::query::Query;
use crate::storage::{Storage, Transaction};
use kpr_core::{Color, Money, NewProduct, Product, ProductUpdate};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    nome: String,
    tipo: String,
    preco_centavos: Option<i64>,
    criado_em: String,
}

impl ProductRow {
    fn into_product(self, cores: Vec<Color>) -> DbResult<Product> {
        Ok(Product {
            id: self.id,
            nome: self.nome,
            tipo: self.tipo,
            preco: self.preco_centavos.map(Money::from_cents),
            criado_em: parse_timestamp(&self.criado_em)?,
            cores,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ColorRow {
    id: i64,
    produto_id: i64,
    nome: String,
    hex: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    cor_id: i64,
    url: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CountRow {
    total: i64,
}

const PRODUCT_COLUMNS: &str = "id, nome, tipo, preco_centavos, criado_em";

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = db.catalog();
///
/// let id = catalog.create(&new_product).await?;
/// let product = catalog.get(id).await?;
/// let all = catalog.list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    storage: Storage,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(storage: Storage) -> Self {
        CatalogRepository { storage }
    }

    /// Lists every product, newest (highest id) first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products: Vec<ProductRow> = self
            .storage
            .fetch_all(Query::new(format!(
                "SELECT {} FROM produtos ORDER BY id DESC",
                PRODUCT_COLUMNS
            )))
            .await?;

        if products.is_empty() {
            return Ok(Vec::new());
        }

        let colors: Vec<ColorRow> = self
            .storage
            .fetch_all(Query::new(
                "SELECT id, produto_id, nome, hex FROM cores ORDER BY id",
            ))
            .await?;

        let images: Vec<ImageRow> = self
            .storage
            .fetch_all(Query::new("SELECT cor_id, url FROM galeria ORDER BY id"))
            .await?;

        debug!(
            products = products.len(),
            colors = colors.len(),
            images = images.len(),
            "Listed catalog rows"
        );

        let mut colors_by_product = assemble_colors(colors, images);

        products
            .into_iter()
            .map(|row| {
                let cores = colors_by_product.remove(&row.id).unwrap_or_default();
                row.into_product(cores)
            })
            .collect()
    }

    /// Gets one product with its colors and galleries.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - No product with that id
    pub async fn get(&self, id: i64) -> DbResult<Option<Product>> {
        let row: Option<ProductRow> = self
            .storage
            .fetch_one(
                Query::new(format!("SELECT {} FROM produtos WHERE id = ?", PRODUCT_COLUMNS))
                    .bind(id),
            )
            .await?;

        let Some(row) = row else {
            debug!(id, "Product not found");
            return Ok(None);
        };

        let colors: Vec<ColorRow> = self
            .storage
            .fetch_all(
                Query::new(
                    "SELECT id, produto_id, nome, hex FROM cores WHERE produto_id = ? ORDER BY id",
                )
                .bind(id),
            )
            .await?;

        let images: Vec<ImageRow> = self
            .storage
            .fetch_all(
                Query::new(
                    "SELECT g.cor_id, g.url FROM galeria g \
                     INNER JOIN cores c ON c.id = g.cor_id \
                     WHERE c.produto_id = ? ORDER BY g.id",
                )
                .bind(id),
            )
            .await?;

        let cores = assemble_colors(colors, images)
            .remove(&id)
            .unwrap_or_default();

        row.into_product(cores).map(Some)
    }

    /// Inserts a product with its colors and galleries.
    ///
    /// ## Returns
    /// The new product id.
    pub async fn create(&self, product: &NewProduct) -> DbResult<i64> {
        let mut tx = self.storage.begin().await?;

        let id = tx
            .execute(
                Query::new(
                    "INSERT INTO produtos (nome, tipo, preco_centavos, criado_em) VALUES (?, ?, ?, ?)",
                )
                .bind(&product.nome)
                .bind(&product.tipo)
                .bind(product.preco.map(|p| p.cents()))
                .bind(now_timestamp()),
            )
            .await?
            .inserted_id
            .ok_or_else(missing_insert_id)?;

        insert_colors(&mut tx, id, &product.cores).await?;
        tx.commit().await?;

        info!(id, cores = product.cores.len(), "Product created");
        Ok(id)
    }

    /// Replaces a product's fields and, when given, its colors.
    ///
    /// Existing colors are always removed (cascading to their images). When
    /// `update.cores` is `Some`, the new set is inserted in their place.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No product with that id
    pub async fn update(&self, id: i64, update: &ProductUpdate) -> DbResult<()> {
        let mut tx = self.storage.begin().await?;

        let outcome = tx
            .execute(
                Query::new("UPDATE produtos SET nome = ?, tipo = ?, preco_centavos = ? WHERE id = ?")
                    .bind(&update.nome)
                    .bind(&update.tipo)
                    .bind(update.preco.map(|p| p.cents()))
                    .bind(id),
            )
            .await?;

        if outcome.rows_affected == 0 {
            return Err(DbError::not_found("Produto", id));
        }

        tx.execute(Query::new("DELETE FROM cores WHERE produto_id = ?").bind(id))
            .await?;

        if let Some(cores) = &update.cores {
            insert_colors(&mut tx, id, cores).await?;
        }

        tx.commit().await?;

        info!(
            id,
            cores = update.cores.as_ref().map_or(0, Vec::len),
            "Product updated"
        );
        Ok(())
    }

    /// Deletes a product. Colors and images go with it.
    ///
    /// ## Returns
    /// `true` if a row was removed, `false` if the id did not exist.
    pub async fn delete(&self, id: i64) -> DbResult<bool> {
        let mut tx = self.storage.begin().await?;

        let outcome = tx
            .execute(Query::new("DELETE FROM produtos WHERE id = ?").bind(id))
            .await?;

        tx.commit().await?;

        let removed = outcome.rows_affected > 0;
        info!(id, removed, "Product deleted");
        Ok(removed)
    }

    /// Number of products in the catalog.
    pub async fn count(&self) -> DbResult<i64> {
        let row: Option<CountRow> = self
            .storage
            .fetch_one(Query::new("SELECT COUNT(*) AS total FROM produtos"))
            .await?;

        Ok(row.map_or(0, |r| r.total))
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn insert_colors(tx: &mut Transaction, produto_id: i64, cores: &[Color]) -> DbResult<()> {
    for cor in cores {
        let cor_id = tx
            .execute(
                Query::new("INSERT INTO cores (produto_id, nome, hex) VALUES (?, ?, ?)")
                    .bind(produto_id)
                    .bind(&cor.nome)
                    .bind(&cor.hex),
            )
            .await?
            .inserted_id
            .ok_or_else(missing_insert_id)?;

        for url in &cor.gallery {
            tx.execute(
                Query::new("INSERT INTO galeria (cor_id, url) VALUES (?, ?)")
                    .bind(cor_id)
                    .bind(url),
            )
            .await?;
        }
    }

    Ok(())
}

/// Groups color and image rows into `produto_id → [Color]`.
///
/// Input order is preserved within each group.
fn assemble_colors(colors: Vec<ColorRow>, images: Vec<ImageRow>) -> HashMap<i64, Vec<Color>> {
    let mut gallery_by_color: HashMap<i64, Vec<String>> = HashMap::new();
    for image in images {
        gallery_by_color.entry(image.cor_id).or_default().push(image.url);
    }

    let mut colors_by_product: HashMap<i64, Vec<Color>> = HashMap::new();
    for color in colors {
        colors_by_product
            .entry(color.produto_id)
            .or_default()
            .push(Color {
                nome: color.nome,
                hex: color.hex,
                gallery: gallery_by_color.remove(&color.id).unwrap_or_default(),
            });
    }

    colors_by_product
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(value: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::Internal(format!("invalid timestamp '{}': {}", value, e)))
}

fn missing_insert_id() -> DbError {
    DbError::Internal("insert did not report a row id".to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn catalog() -> CatalogRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().catalog()
    }

    fn color(nome: &str, hex: &str, urls: usize) -> Color {
        Color {
            nome: nome.to_string(),
            hex: hex.to_string(),
            gallery: (0..urls).map(|i| format!("img/{}-{}.jpg", nome, i)).collect(),
        }
    }

    fn sneaker(nome: &str, cores: Vec<Color>) -> NewProduct {
        NewProduct {
            nome: nome.to_string(),
            tipo: "masculino".to_string(),
            preco: Some(Money::from_cents(49990)),
            cores,
        }
    }

    #[tokio::test]
    async fn test_create_then_get_round_trips_nested_shape() {
        let catalog = catalog().await;
        let input = sneaker(
            "Air Street",
            vec![color("Preto", "#000000", 3), color("Branco", "#fff", 3)],
        );

        let id = catalog.create(&input).await.unwrap();
        let product = catalog.get(id).await.unwrap().unwrap();

        assert_eq!(product.id, id);
        assert_eq!(product.nome, input.nome);
        assert_eq!(product.tipo, input.tipo);
        assert_eq!(product.preco, input.preco);
        assert_eq!(product.cores, input.cores);
    }

    #[tokio::test]
    async fn test_missing_price_stays_absent() {
        let catalog = catalog().await;
        let mut input = sneaker("Sem preço", vec![color("Azul", "#00f", 1)]);
        input.preco = None;

        let id = catalog.create(&input).await.unwrap();
        assert_eq!(catalog.get(id).await.unwrap().unwrap().preco, None);
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_none() {
        let catalog = catalog().await;
        assert!(catalog.get(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_is_repeatable() {
        let catalog = catalog().await;
        let a = catalog
            .create(&sneaker("A", vec![color("Preto", "#000", 2)]))
            .await
            .unwrap();
        let b = catalog
            .create(&sneaker("B", vec![color("Rosa", "#f0c", 1), color("Cinza", "#999", 2)]))
            .await
            .unwrap();

        let first = catalog.list().await.unwrap();
        let second = catalog.list().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.iter().map(|p| p.id).collect::<Vec<_>>(), vec![b, a]);
        assert_eq!(first[0].cores.len(), 2);
        assert_eq!(first[1].cores[0].gallery.len(), 2);
    }

    #[tokio::test]
    async fn test_update_replaces_colors() {
        let catalog = catalog().await;
        let id = catalog
            .create(&sneaker("Runner", vec![color("Preto", "#000", 2), color("Verde", "#0f0", 1)]))
            .await
            .unwrap();

        let update = ProductUpdate {
            nome: "Runner 2".to_string(),
            tipo: "feminino".to_string(),
            preco: None,
            cores: Some(vec![color("Lilás", "#c8a2c8", 4)]),
        };
        catalog.update(id, &update).await.unwrap();

        let product = catalog.get(id).await.unwrap().unwrap();
        assert_eq!(product.nome, "Runner 2");
        assert_eq!(product.tipo, "feminino");
        assert_eq!(product.preco, None);
        assert_eq!(product.cores, update.cores.unwrap());
    }

    #[tokio::test]
    async fn test_update_without_colors_clears_them() {
        let catalog = catalog().await;
        let id = catalog
            .create(&sneaker("Runner", vec![color("Preto", "#000", 2)]))
            .await
            .unwrap();

        let update = ProductUpdate {
            nome: "Runner".to_string(),
            tipo: "masculino".to_string(),
            preco: Some(Money::from_cents(100)),
            cores: None,
        };
        catalog.update(id, &update).await.unwrap();

        let product = catalog.get(id).await.unwrap().unwrap();
        assert!(product.cores.is_empty());
        assert_eq!(orphan_images(&catalog).await, 0);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let catalog = catalog().await;
        let update = ProductUpdate {
            nome: "X".to_string(),
            tipo: "masculino".to_string(),
            preco: None,
            cores: Some(vec![color("Preto", "#000", 1)]),
        };

        let err = catalog.update(42, &update).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(catalog.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_cascades_and_is_idempotent() {
        let catalog = catalog().await;
        let id = catalog
            .create(&sneaker("Court", vec![color("Preto", "#000", 3), color("Azul", "#00f", 2)]))
            .await
            .unwrap();

        assert!(catalog.delete(id).await.unwrap());
        assert!(catalog.get(id).await.unwrap().is_none());
        assert_eq!(count_rows(&catalog, "cores").await, 0);
        assert_eq!(count_rows(&catalog, "galeria").await, 0);

        assert!(!catalog.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_create_leaves_no_rows() {
        let catalog = catalog().await;
        catalog
            .storage
            .execute(Query::new(
                "CREATE TRIGGER rejeita_imagem BEFORE INSERT ON galeria \
                 WHEN NEW.url = 'quebrada.jpg' \
                 BEGIN SELECT RAISE(ABORT, 'imagem rejeitada'); END",
            ))
            .await
            .unwrap();

        let mut broken = color("Azul", "#00f", 1);
        broken.gallery.push("quebrada.jpg".to_string());
        let input = sneaker("Meio gravado", vec![color("Preto", "#000", 2), broken]);

        assert!(catalog.create(&input).await.is_err());
        assert_eq!(catalog.count().await.unwrap(), 0);
        assert_eq!(count_rows(&catalog, "cores").await, 0);
        assert_eq!(count_rows(&catalog, "galeria").await, 0);

        let id = catalog
            .create(&sneaker("Inteiro", vec![color("Preto", "#000", 2)]))
            .await
            .unwrap();
        assert_eq!(catalog.list().await.unwrap()[0].id, id);
        assert_eq!(count_rows(&catalog, "galeria").await, 2);
    }

    async fn count_rows(catalog: &CatalogRepository, table: &str) -> i64 {
        catalog
            .storage
            .fetch_one::<CountRow>(Query::new(format!("SELECT COUNT(*) AS total FROM {}", table)))
            .await
            .unwrap()
            .unwrap()
            .total
    }

    async fn orphan_images(catalog: &CatalogRepository) -> i64 {
        catalog
            .storage
            .fetch_one::<CountRow>(Query::new(
                "SELECT COUNT(*) AS total FROM galeria g \
                 LEFT JOIN cores c ON c.id = g.cor_id WHERE c.id IS NULL",
            ))
            .await
            .unwrap()
            .unwrap()
            .total
    }
}
