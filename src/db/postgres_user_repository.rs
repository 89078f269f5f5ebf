use crate::{
    db::user_repository::UserRepository,
    models::user::{ExternalIdentity, User},
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PostgresUserRepository {
    pub pool: PgPool,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, display_name, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, display_name, is_active, created_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_user_by_external_account(
        &self,
        provider: &str,
        uid: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.display_name, u.is_active, u.created_at
            FROM external_accounts ea
            JOIN users u ON u.id = ea.user_id
            WHERE ea.provider = $1 AND ea.uid = $2
            "#,
        )
        .bind(provider)
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_user_with_external_account(
        &self,
        identity: &ExternalIdentity,
        is_active: bool,
        invite_pending: bool,
    ) -> Result<User, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, display_name, is_active)
            VALUES ($1, $2, $3)
            RETURNING id, email, display_name, is_active, created_at
            "#,
        )
        .bind(&identity.email)
        .bind(&identity.display_name)
        .bind(is_active)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO external_accounts (user_id, provider, uid)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user.id)
        .bind(&identity.provider)
        .bind(&identity.uid)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, invite_pending)
            VALUES ($1, $2)
            "#,
        )
        .bind(user.id)
        .bind(invite_pending)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }
}
