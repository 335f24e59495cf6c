//! # User Repository
//!
//! Account lookups, password changes and the default admin seed.
//!
//! ## Default Admin
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database::new()                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ensure_default_admin()                                                │
//! │       │                                                                 │
//! │       ├── any row with papel = 'admin'?  ── yes ──► nothing to do       │
//! │       │                                                                 │
//! │       └── no ──► INSERT admin@kpr.com / bcrypt("admin123") / 'admin'   │
//! │                                                                         │
//! │  Running it again never adds a second admin.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::query::Query;
use crate::repository::catalog::parse_timestamp;
use crate::storage::Storage;
use kpr_core::{Role, User, DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_NAME, DEFAULT_ADMIN_PASSWORD};

/// bcrypt work factor for stored passwords.
pub const BCRYPT_COST: u32 = 10;

/// Hashes a plaintext password with [`BCRYPT_COST`].
///
/// Runs on tokio's blocking pool; a cost-10 hash takes tens of milliseconds.
pub async fn hash_password(plain: &str) -> DbResult<String> {
    let plain = plain.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, BCRYPT_COST))
        .await
        .map_err(|e| DbError::Internal(format!("password hashing task failed: {}", e)))?
        .map_err(|e| DbError::Internal(e.to_string()))
}

/// Checks a plaintext password against a stored hash, off the async workers.
///
/// A malformed hash counts as a mismatch.
pub async fn verify_password(plain: &str, hash: &str) -> DbResult<bool> {
    let (plain, hash) = (plain.to_string(), hash.to_string());
    tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash).unwrap_or(false))
        .await
        .map_err(|e| DbError::Internal(format!("password check task failed: {}", e)))
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    senha: String,
    nome: String,
    papel: String,
    criado_em: String,
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> DbResult<Self> {
        let papel = row
            .papel
            .parse::<Role>()
            .map_err(DbError::Internal)?;

        Ok(User {
            id: row.id,
            email: row.email,
            senha_hash: row.senha,
            nome: row.nome,
            papel,
            criado_em: parse_timestamp(&row.criado_em)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CountRow {
    total: i64,
}

const USER_COLUMNS: &str = "id, email, senha, nome, papel, criado_em";

/// Repository for user accounts.
#[derive(Debug, Clone)]
pub struct UserRepository {
    storage: Storage,
}

impl UserRepository {
    pub fn new(storage: Storage) -> Self {
        UserRepository { storage }
    }

    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let row: Option<UserRow> = self
            .storage
            .fetch_one(
                Query::new(format!("SELECT {} FROM usuarios WHERE email = ?", USER_COLUMNS))
                    .bind(email),
            )
            .await?;

        row.map(User::try_from).transpose()
    }

    pub async fn find_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let row: Option<UserRow> = self
            .storage
            .fetch_one(
                Query::new(format!("SELECT {} FROM usuarios WHERE id = ?", USER_COLUMNS))
                    .bind(id),
            )
            .await?;

        row.map(User::try_from).transpose()
    }

    /// Inserts an account. `senha_hash` must already be hashed.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - The email is taken
    pub async fn insert(
        &self,
        email: &str,
        senha_hash: &str,
        nome: &str,
        papel: Role,
    ) -> DbResult<i64> {
        let outcome = self
            .storage
            .execute(
                Query::new(
                    "INSERT INTO usuarios (email, senha, nome, papel, criado_em) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(email)
                .bind(senha_hash)
                .bind(nome)
                .bind(papel.as_str())
                .bind(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            )
            .await?;

        let id = outcome
            .inserted_id
            .ok_or_else(|| DbError::Internal("insert did not report a row id".to_string()))?;

        debug!(id, %papel, "User inserted");
        Ok(id)
    }

    /// Stores a new password hash.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - No user with that id
    pub async fn update_password(&self, id: i64, senha_hash: &str) -> DbResult<()> {
        let outcome = self
            .storage
            .execute(
                Query::new("UPDATE usuarios SET senha = ? WHERE id = ?")
                    .bind(senha_hash)
                    .bind(id),
            )
            .await?;

        if outcome.rows_affected == 0 {
            return Err(DbError::not_found("Usuário", id));
        }

        info!(id, "Password changed");
        Ok(())
    }

    pub async fn count_admins(&self) -> DbResult<i64> {
        let row: Option<CountRow> = self
            .storage
            .fetch_one(
                Query::new("SELECT COUNT(*) AS total FROM usuarios WHERE papel = ?")
                    .bind(Role::Admin.as_str()),
            )
            .await?;

        Ok(row.map_or(0, |r| r.total))
    }

    /// Inserts the default admin unless an admin already exists.
    ///
    /// ## Returns
    /// `true` when the admin was created by this call.
    pub async fn ensure_default_admin(&self) -> DbResult<bool> {
        if self.count_admins().await? > 0 {
            debug!("Admin already present, skipping seed");
            return Ok(false);
        }

        let hash = hash_password(DEFAULT_ADMIN_PASSWORD).await?;
        self.insert(DEFAULT_ADMIN_EMAIL, &hash, DEFAULT_ADMIN_NAME, Role::Admin)
            .await?;

        info!(email = DEFAULT_ADMIN_EMAIL, "Default admin created");
        Ok(true)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_default_admin_is_seeded_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        assert_eq!(users.count_admins().await.unwrap(), 1);
        assert!(!users.ensure_default_admin().await.unwrap());
        assert!(!users.ensure_default_admin().await.unwrap());
        assert_eq!(users.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_seeded_admin_credentials() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let admin = db
            .users()
            .find_by_email(DEFAULT_ADMIN_EMAIL)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(admin.nome, DEFAULT_ADMIN_NAME);
        assert_eq!(admin.papel, Role::Admin);
        assert!(verify_password(DEFAULT_ADMIN_PASSWORD, &admin.senha_hash).await.unwrap());
        assert!(!verify_password("wrong", &admin.senha_hash).await.unwrap());

        let by_id = db.users().find_by_id(admin.id).await.unwrap().unwrap();
        assert_eq!(by_id, admin);
    }

    #[tokio::test]
    async fn test_unseeded_database_has_no_users() {
        let db = Database::new(DbConfig::in_memory().seed_admin(false))
            .await
            .unwrap();

        assert_eq!(db.users().count_admins().await.unwrap(), 0);
        assert!(db.users().ensure_default_admin().await.unwrap());
        assert_eq!(db.users().count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db
            .users()
            .insert(DEFAULT_ADMIN_EMAIL, "x", "Outro", Role::Customer)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_password() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();
        let admin = users.find_by_email(DEFAULT_ADMIN_EMAIL).await.unwrap().unwrap();

        let hash = hash_password("nova-senha").await.unwrap();
        users.update_password(admin.id, &hash).await.unwrap();

        let reloaded = users.find_by_id(admin.id).await.unwrap().unwrap();
        assert!(verify_password("nova-senha", &reloaded.senha_hash).await.unwrap());

        assert!(users.update_password(9999, &hash).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_a_mismatch() {
        assert!(!verify_password("admin123", "not-a-bcrypt-hash").await.unwrap());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_hashing_leaves_the_runtime_free() {
        let hashing = tokio::spawn(async { hash_password("segredo").await });

        // On a single-threaded runtime this loop only keeps spinning if the
        // hash runs somewhere other than the runtime thread.
        let mut polls = 0u32;
        while !hashing.is_finished() {
            polls += 1;
            tokio::task::yield_now().await;
        }

        let hash = hashing.await.unwrap().unwrap();
        assert!(polls > 1);
        assert!(verify_password("segredo", &hash).await.unwrap());
    }
}
