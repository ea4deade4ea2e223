//! PostgreSQL profile store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_core::{Address, Profile, ProfileChanges, StoreError};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

use super::ProfileStore;

pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the profile and address tables if they do not exist
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                id UUID PRIMARY KEY,
                email TEXT NOT NULL,
                name TEXT NOT NULL,
                phone TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                deleted_at TIMESTAMPTZ
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS addresses (
                id UUID PRIMARY KEY,
                user_id UUID NOT NULL REFERENCES profiles (id),
                street TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT,
                postal_code TEXT NOT NULL,
                country TEXT NOT NULL,
                is_default BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS addresses_user_id_idx ON addresses (user_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Profile row from database
#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    name: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            email: row.email,
            name: row.name,
            phone: row.phone,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// Address row from database
#[derive(Debug, FromRow)]
struct AddressRow {
    id: Uuid,
    user_id: Uuid,
    street: String,
    city: String,
    state: Option<String>,
    postal_code: String,
    country: String,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Address {
            id: row.id,
            user_id: row.user_id,
            street: row.street,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            country: row.country,
            is_default: row.is_default,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn insert_if_absent(&self, profile: &Profile) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO profiles (id, email, name, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(&profile.phone)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            SELECT id, email, name, phone, created_at, updated_at, deleted_at
            FROM profiles
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
        at: DateTime<Utc>,
    ) -> Result<Option<Profile>, StoreError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            UPDATE profiles SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                updated_at = $4
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, email, name, phone, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.phone)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles SET deleted_at = $2, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn add_address(&self, address: &Address) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO addresses (
                id, user_id, street, city, state, postal_code, country, is_default, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(address.id)
        .bind(address.user_id)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.postal_code)
        .bind(&address.country)
        .bind(address.is_default)
        .bind(address.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn addresses(&self, user_id: Uuid) -> Result<Vec<Address>, StoreError> {
        let rows: Vec<AddressRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, street, city, state, postal_code, country, is_default, created_at
            FROM addresses
            WHERE user_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Address::from).collect())
    }

    async fn is_ready(&self) -> bool {
        gatehouse_core::database::ping(&self.pool).await
    }
}
