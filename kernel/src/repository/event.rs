use crate::model::event::{
    event::{CreateEvent, DeleteEvent, UpdateEvent},
    EventListing, PaginatedEvents,
};
use crate::model::id::EventId;
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait EventRepository: Send + Sync {
    // イベントを作成する
    async fn create(&self, event: CreateEvent) -> AppResult<EventId>;
    // すべてのイベントを登録数つきで取得する（開催日時の新しい順）
    async fn find_all(&self) -> AppResult<Vec<EventListing>>;
    // これから開催されるイベントを取得する（開催日時の早い順）
    async fn find_upcoming(&self) -> AppResult<Vec<EventListing>>;
    // イベント ID から取得する
    async fn find_by_id(&self, event_id: EventId) -> AppResult<Option<EventListing>>;
    // イベントを更新する
    async fn update(&self, event: UpdateEvent) -> AppResult<()>;
    // イベントを削除する。参加登録は外部キーの CASCADE で一緒に消える
    async fn delete(&self, event: DeleteEvent) -> AppResult<()>;
    // エクスポート API 向けのページネーション取得
    async fn find_page(&self, limit: i64, offset: i64) -> AppResult<PaginatedEvents>;
    // 統計用のカウント
    async fn count(&self) -> AppResult<i64>;
}
