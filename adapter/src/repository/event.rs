use crate::database::{model::event::EventRow, ConnectionPool};
use async_trait::async_trait;
use chrono::Utc;
use derive_new::new;
use kernel::model::event::{
    event::{CreateEvent, DeleteEvent, UpdateEvent},
    EventListing, PaginatedEvents,
};
use kernel::model::id::EventId;
use kernel::repository::event::EventRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct EventRepositoryImpl {
    db: ConnectionPool,
}

// 登録数を数えながらイベントを引く共通 SELECT 句
const EVENT_SELECT: &str = r#"
    SELECT
        e.event_id,
        e.title,
        e.description,
        e.event_datetime,
        e.webinar_link,
        e.capacity,
        e.image_url,
        e.created_at,
        COUNT(r.registration_id) AS registration_count
    FROM events AS e
    LEFT JOIN registrations AS r ON r.event_id = e.event_id
"#;

#[async_trait]
impl EventRepository for EventRepositoryImpl {
    async fn create(&self, event: CreateEvent) -> AppResult<EventId> {
        let event_id = EventId::new();
        let res = sqlx::query(
            r#"
            INSERT INTO events
            (event_id, title, description, event_datetime, webinar_link, capacity, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(event_id)
        .bind(event.title)
        .bind(event.description)
        .bind(event.event_datetime)
        .bind(event.webinar_link)
        .bind(event.capacity)
        .bind(event.image_url)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No event record has been created".into(),
            ));
        }

        Ok(event_id)
    }

    async fn find_all(&self) -> AppResult<Vec<EventListing>> {
        let sql = format!("{EVENT_SELECT} GROUP BY e.event_id ORDER BY e.event_datetime DESC");
        sqlx::query_as::<_, EventRow>(&sql)
            .fetch_all(self.db.inner_ref())
            .await
            .map(|rows| rows.into_iter().map(EventListing::from).collect())
            .map_err(AppError::SpecificOperationError)
    }

    // これから開催されるイベントを開催日時の早い順で返す
    async fn find_upcoming(&self) -> AppResult<Vec<EventListing>> {
        let sql = format!(
            "{EVENT_SELECT} WHERE e.event_datetime > $1 GROUP BY e.event_id ORDER BY e.event_datetime ASC"
        );
        sqlx::query_as::<_, EventRow>(&sql)
            .bind(Utc::now())
            .fetch_all(self.db.inner_ref())
            .await
            .map(|rows| rows.into_iter().map(EventListing::from).collect())
            .map_err(AppError::SpecificOperationError)
    }

    async fn find_by_id(&self, event_id: EventId) -> AppResult<Option<EventListing>> {
        let sql = format!("{EVENT_SELECT} WHERE e.event_id = $1 GROUP BY e.event_id");
        sqlx::query_as::<_, EventRow>(&sql)
            .bind(event_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map(|row| row.map(EventListing::from))
            .map_err(AppError::SpecificOperationError)
    }

    // None のフィールドは既存値を維持する
    async fn update(&self, event: UpdateEvent) -> AppResult<()> {
        let res = sqlx::query(
            r#"
            UPDATE events
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                event_datetime = COALESCE($4, event_datetime),
                webinar_link = COALESCE($5, webinar_link),
                capacity = COALESCE($6, capacity),
                image_url = COALESCE($7, image_url)
            WHERE event_id = $1
            "#,
        )
        .bind(event.event_id)
        .bind(event.title)
        .bind(event.description)
        .bind(event.event_datetime)
        .bind(event.webinar_link)
        .bind(event.capacity)
        .bind(event.image_url)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "イベント（{}）が見つかりませんでした。",
                event.event_id
            )));
        }

        Ok(())
    }

    // 参加登録は外部キーの ON DELETE CASCADE で一緒に削除される
    async fn delete(&self, event: DeleteEvent) -> AppResult<()> {
        let res = sqlx::query(
            r#"
            DELETE FROM events WHERE event_id = $1
            "#,
        )
        .bind(event.event_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "イベント（{}）が見つかりませんでした。",
                event.event_id
            )));
        }

        Ok(())
    }

    async fn find_page(&self, limit: i64, offset: i64) -> AppResult<PaginatedEvents> {
        let total = self.count().await?;
        let sql = format!(
            "{EVENT_SELECT} GROUP BY e.event_id ORDER BY e.event_datetime DESC LIMIT $1 OFFSET $2"
        );
        let items = sqlx::query_as::<_, EventRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.db.inner_ref())
            .await
            .map(|rows| rows.into_iter().map(EventListing::from).collect())
            .map_err(AppError::SpecificOperationError)?;

        Ok(PaginatedEvents { total, items })
    }

    async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)
    }
}
