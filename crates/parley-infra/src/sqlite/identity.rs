//! SQLite identity repository implementation.

use parley_core::repository::identity::IdentityRepository;
use parley_types::error::RepositoryError;
use parley_types::identity::{Identity, IdentityId, Plan};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, map_sqlx_error, parse_datetime, parse_identity_id};

/// SQLite-backed implementation of `IdentityRepository`.
pub struct SqliteIdentityRepository {
    pool: DatabasePool,
}

impl SqliteIdentityRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct IdentityRow {
    id: String,
    display_name: String,
    email: String,
    password_hash: String,
    plan: String,
    created_at: String,
}

impl IdentityRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            display_name: row.try_get("display_name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            plan: row.try_get("plan")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_identity(self) -> Result<Identity, RepositoryError> {
        Ok(Identity {
            id: parse_identity_id(&self.id)?,
            display_name: self.display_name,
            email: self.email,
            password_hash: self.password_hash,
            plan: self.plan.parse().map_err(RepositoryError::Query)?,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

const SELECT_IDENTITY: &str =
    "SELECT id, display_name, email, password_hash, plan, created_at FROM identities";

impl IdentityRepository for SqliteIdentityRepository {
    async fn create(&self, identity: &Identity) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO identities (id, display_name, email, password_hash, plan, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(identity.id.to_string())
        .bind(&identity.display_name)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .bind(identity.plan.to_string())
        .bind(format_datetime(&identity.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn get_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_IDENTITY} WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| {
            IdentityRow::from_row(&r)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_identity()
        })
        .transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Identity>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_IDENTITY} WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| {
            IdentityRow::from_row(&r)
                .map_err(|e| RepositoryError::Query(e.to_string()))?
                .into_identity()
        })
        .transpose()
    }

    async fn update_plan(&self, id: &IdentityId, plan: Plan) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE identities SET plan = ? WHERE id = ?")
            .bind(plan.to_string())
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
