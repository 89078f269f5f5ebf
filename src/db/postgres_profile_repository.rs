use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::{db::profile_repository::ProfileRepository, models::profile::UserProfile};

pub struct PostgresProfileRepository {
    pub pool: PgPool,
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, user_id, title, invite_pending
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, sqlx::Error> {
        // The no-op update makes RETURNING yield the existing row on conflict,
        // so racing first reads all get the same profile.
        sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE
            SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, title, invite_pending
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .inspect_err(|err| error!(%user_id, ?err, "failed to get or create user profile"))
    }

    async fn apply_invite_state(
        &self,
        user_id: Uuid,
        is_active: bool,
        invite_pending: bool,
    ) -> Result<UserProfile, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE users SET is_active = $1 WHERE id = $2")
            .bind(is_active)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, invite_pending)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
            SET invite_pending = EXCLUDED.invite_pending
            RETURNING id, user_id, title, invite_pending
            "#,
        )
        .bind(user_id)
        .bind(invite_pending)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(profile)
    }
}
