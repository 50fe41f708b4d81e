use crate::database::{
    model::registration::{BookingEventRow, BookingUserRow, CancelledRow, RegistrationRow},
    ConnectionPool,
};
use async_trait::async_trait;
use chrono_tz::Tz;
use derive_new::new;
use kernel::model::id::{ChatId, EventId, RegistrationId};
use kernel::model::registration::{
    event::CreateRegistration, BookingOutcome, CancelledRegistration, NewBooking, Registration,
};
use kernel::repository::registration::RegistrationRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct RegistrationRepositoryImpl {
    db: ConnectionPool,
}

// 一覧系クエリの共通 SELECT 句
const REGISTRATION_SELECT: &str = r#"
    SELECT
        r.registration_id,
        r.registered_at,
        u.user_id,
        u.chat_id,
        u.username,
        u.full_name,
        u.timezone,
        e.event_id,
        e.title,
        e.event_datetime,
        e.description,
        e.webinar_link
    FROM registrations AS r
    INNER JOIN users AS u ON r.user_id = u.user_id
    INNER JOIN events AS e ON r.event_id = e.event_id
"#;

#[async_trait]
impl RegistrationRepository for RegistrationRepositoryImpl {
    // 座席を予約する
    async fn book(&self, event: CreateRegistration) -> AppResult<BookingOutcome> {
        let mut tx = self.db.begin().await?;

        // 事前のチェックとして、以下を順に調べる。
        // - プロフィール登録まで済んだユーザーが存在するか
        // - 指定のイベントが存在するか
        // - 同じ (ユーザー, イベント) の登録がすでにないか
        // - 定員に空きがあるか
        //
        // イベント行は FOR UPDATE でロックする。定員チェックと INSERT が
        // 同じロックの下で直列化されるため、最後の 1 席に同時に予約が来ても
        // 片方は必ず定員チェックで弾かれる。

        // ① ユーザーの存在とプロフィール完了の確認
        let user = sqlx::query_as::<_, BookingUserRow>(
            r#"
            SELECT user_id, timezone, is_profile_complete
            FROM users
            WHERE chat_id = $1
            "#,
        )
        .bind(event.chat_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(user) = user else {
            return Ok(BookingOutcome::UserNotFound);
        };
        if !user.is_profile_complete {
            return Ok(BookingOutcome::UserNotFound);
        }

        // ② イベント行をロックして存在を確認する
        let event_row = sqlx::query_as::<_, BookingEventRow>(
            r#"
            SELECT event_id, title, description, event_datetime, webinar_link, capacity
            FROM events
            WHERE event_id = $1
            FOR UPDATE
            "#,
        )
        .bind(event.event_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(event_row) = event_row else {
            return Ok(BookingOutcome::EventNotFound);
        };

        // ③ 二重登録の確認
        let duplicated = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM registrations
            WHERE user_id = $1 AND event_id = $2
            "#,
        )
        .bind(user.user_id)
        .bind(event.event_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if duplicated > 0 {
            return Ok(BookingOutcome::AlreadyRegistered);
        }

        // ④ 定員の確認
        let registered = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM registrations WHERE event_id = $1
            "#,
        )
        .bind(event.event_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if registered >= i64::from(event_row.capacity) {
            return Ok(BookingOutcome::EventFull);
        }

        // ⑤ 登録レコードを追加する
        let registration_id = RegistrationId::new();
        let res = sqlx::query(
            r#"
            INSERT INTO registrations (registration_id, user_id, event_id)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(registration_id)
        .bind(user.user_id)
        .bind(event.event_id)
        .execute(&mut *tx)
        .await;

        let res = match res {
            // UNIQUE (user_id, event_id) 違反は二重登録として扱う
            Err(e) if is_unique_violation(&e) => {
                return Ok(BookingOutcome::AlreadyRegistered);
            }
            Err(e) => return Err(AppError::SpecificOperationError(e)),
            Ok(res) => res,
        };

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No registration record has been created".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        let seats_left = (i64::from(event_row.capacity) - registered - 1).max(0);
        let timezone = user.timezone.parse().unwrap_or(Tz::UTC);
        Ok(BookingOutcome::Booked(NewBooking {
            registration_id,
            seats_left,
            event: event_row.into(),
            timezone,
        }))
    }

    // 参加登録をキャンセルする
    async fn cancel(
        &self,
        registration_id: RegistrationId,
    ) -> AppResult<Option<CancelledRegistration>> {
        let mut tx = self.db.begin().await?;

        // 削除前に、リマインダー解除のキーになる情報を取得しておく
        let row = sqlx::query_as::<_, CancelledRow>(
            r#"
            SELECT r.registration_id, r.event_id, u.chat_id, e.title
            FROM registrations AS r
            INNER JOIN users AS u ON r.user_id = u.user_id
            INNER JOIN events AS e ON r.event_id = e.event_id
            WHERE r.registration_id = $1
            "#,
        )
        .bind(registration_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let res = sqlx::query(
            r#"
            DELETE FROM registrations WHERE registration_id = $1
            "#,
        )
        .bind(registration_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No registration record has been deleted".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(Some(CancelledRegistration {
            registration_id: row.registration_id,
            chat_id: row.chat_id,
            event_id: row.event_id,
            event_title: row.title,
        }))
    }

    async fn find_by_chat_id(&self, chat_id: ChatId) -> AppResult<Vec<Registration>> {
        let sql = format!("{REGISTRATION_SELECT} WHERE u.chat_id = $1 ORDER BY r.registered_at ASC");
        sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(chat_id)
            .fetch_all(self.db.inner_ref())
            .await
            .map(|rows| rows.into_iter().map(Registration::from).collect())
            .map_err(AppError::SpecificOperationError)
    }

    async fn find_by_event_id(&self, event_id: EventId) -> AppResult<Vec<Registration>> {
        let sql = format!("{REGISTRATION_SELECT} WHERE e.event_id = $1 ORDER BY r.registered_at ASC");
        sqlx::query_as::<_, RegistrationRow>(&sql)
            .bind(event_id)
            .fetch_all(self.db.inner_ref())
            .await
            .map(|rows| rows.into_iter().map(Registration::from).collect())
            .map_err(AppError::SpecificOperationError)
    }

    async fn find_all(&self) -> AppResult<Vec<Registration>> {
        let sql = format!("{REGISTRATION_SELECT} ORDER BY r.registered_at DESC");
        sqlx::query_as::<_, RegistrationRow>(&sql)
            .fetch_all(self.db.inner_ref())
            .await
            .map(|rows| rows.into_iter().map(Registration::from).collect())
            .map_err(AppError::SpecificOperationError)
    }

    async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM registrations")
            .fetch_one(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        db_err.is_unique_violation()
    } else {
        false
    }
}
