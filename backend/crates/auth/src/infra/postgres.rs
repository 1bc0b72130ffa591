//! PostgreSQL identity store

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    account::{Account, NewAccount},
    profile::{NewProfile, Profile},
};
use crate::domain::repository::{IdentityStore, Registered};
use crate::domain::services::CredentialHasher;
use crate::domain::value_object::{
    account_id::AccountId, account_role::AccountRole, password::PasswordDigest,
    password::RawPassword, username::Username,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed identity store
///
/// Registration runs the pre-check and both inserts in one transaction; the
/// unique constraints on `accounts.username`, `profiles.email` and
/// `profiles.account_id` catch any racer that slipped past the pre-check.
#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
    hasher: CredentialHasher,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool, hasher: CredentialHasher) -> Self {
        Self { pool, hasher }
    }
}

impl IdentityStore for PgIdentityStore {
    async fn create_account(
        &self,
        account: NewAccount,
        profile: NewProfile,
        password: RawPassword,
    ) -> AuthResult<Registered> {
        // Hashing is slow; keep it outside the transaction
        let password_hash = self.hasher.hash(password).await?;

        let account = Account::create(account, password_hash);
        let profile = Profile::create(profile, account.account_id);

        let mut tx = self.pool.begin().await?;

        let taken: i64 = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*) FROM accounts WHERE username = $1)
              + (SELECT COUNT(*) FROM profiles WHERE email = $2)
            "#,
        )
        .bind(account.username.as_str())
        .bind(profile.email.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if taken > 0 {
            tx.rollback().await?;
            return Err(AuthError::DuplicateIdentity);
        }

        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                username,
                password_hash,
                role,
                is_active,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.username.as_str())
        .bind(account.password_hash.as_phc_string())
        .bind(account.role.code())
        .bind(account.is_active)
        .bind(account.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO profiles (
                profile_id,
                account_id,
                first_name,
                last_name,
                email,
                profile_image,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(profile.profile_id.as_uuid())
        .bind(profile.account_id.as_uuid())
        .bind(profile.first_name.as_deref())
        .bind(profile.last_name.as_deref())
        .bind(profile.email.as_str())
        .bind(profile.profile_image.as_deref())
        .bind(profile.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Registered { account, profile })
    }

    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT account_id, username, password_hash, role, is_active, created_at
            FROM accounts
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT account_id, username, password_hash, role, is_active, created_at
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_active_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT account_id, username, password_hash, role, is_active, created_at
            FROM accounts
            WHERE account_id = $1 AND is_active
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn list_active(&self) -> AuthResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT account_id, username, password_hash, role, is_active, created_at
            FROM accounts
            WHERE is_active
            ORDER BY created_at, account_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AccountRow::into_account).collect()
    }

    async fn find_by_ids(&self, account_ids: &[AccountId]) -> AuthResult<Vec<Account>> {
        let mut seen = HashSet::new();
        let ids: Vec<Uuid> = account_ids
            .iter()
            .map(|id| id.into_uuid())
            .filter(|id| seen.insert(*id))
            .collect();

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT account_id, username, password_hash, role, is_active, created_at
            FROM accounts
            WHERE account_id = ANY($1)
            ORDER BY created_at, account_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AccountRow::into_account).collect()
    }

    async fn activate(&self, account_id: &AccountId) -> AuthResult<bool> {
        let updated = sqlx::query("UPDATE accounts SET is_active = TRUE WHERE account_id = $1")
            .bind(account_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    username: String,
    password_hash: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let username = Username::from_db(&self.username)
            .map_err(|e| AuthError::Internal(format!("Invalid stored username: {}", e)))?;

        let role = AccountRole::from_code(&self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid stored role: {}", self.role)))?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            username,
            password_hash: PasswordDigest::from_phc_string(self.password_hash)?,
            role,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}
