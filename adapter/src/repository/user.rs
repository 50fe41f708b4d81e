use crate::database::{model::user::UserRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::id::{ChatId, UserId};
use kernel::model::user::{
    event::{CompleteProfile, CreateUser, UpdateTimezone},
    User,
};
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

const USER_SELECT: &str = r#"
    SELECT
        user_id,
        chat_id,
        username,
        full_name,
        company,
        role,
        ai_experience,
        email,
        timezone,
        is_profile_complete,
        created_at
    FROM users
"#;

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, event: CreateUser) -> AppResult<()> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (user_id, chat_id, username)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(UserId::new())
        .bind(event.chat_id)
        .bind(event.username)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No user record has been created".into(),
            ));
        }

        Ok(())
    }

    async fn find_by_chat_id(&self, chat_id: ChatId) -> AppResult<Option<User>> {
        let sql = format!("{USER_SELECT} WHERE chat_id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(chat_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map(|row| row.map(User::from))
            .map_err(AppError::SpecificOperationError)
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let sql = format!("{USER_SELECT} ORDER BY created_at DESC");
        sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(self.db.inner_ref())
            .await
            .map(|rows| rows.into_iter().map(User::from).collect())
            .map_err(AppError::SpecificOperationError)
    }

    // 登録フロー完了時にプロフィールを確定させる
    async fn complete_profile(&self, event: CompleteProfile) -> AppResult<()> {
        let res = sqlx::query(
            r#"
            UPDATE users
            SET
                full_name = $2,
                company = $3,
                role = $4,
                ai_experience = $5,
                email = $6,
                is_profile_complete = TRUE
            WHERE chat_id = $1
            "#,
        )
        .bind(event.chat_id)
        .bind(event.full_name)
        .bind(event.company)
        .bind(event.role)
        .bind(event.ai_experience.as_ref())
        .bind(event.email)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "ユーザー（chat_id={}）が見つかりませんでした。",
                event.chat_id
            )));
        }

        Ok(())
    }

    async fn update_timezone(&self, event: UpdateTimezone) -> AppResult<()> {
        let res = sqlx::query(
            r#"
            UPDATE users SET timezone = $2 WHERE chat_id = $1
            "#,
        )
        .bind(event.chat_id)
        .bind(event.timezone.name())
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "ユーザー（chat_id={}）が見つかりませんでした。",
                event.chat_id
            )));
        }

        Ok(())
    }

    async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)
    }

    async fn count_profile_complete(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_profile_complete")
            .fetch_one(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)
    }
}
