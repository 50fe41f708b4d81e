use crate::model::id::{ChatId, EventId, RegistrationId};
use crate::model::registration::{
    event::CreateRegistration, BookingOutcome, CancelledRegistration, Registration,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    // 座席を予約する。定員・重複のチェックは単一トランザクション内で行う
    async fn book(&self, event: CreateRegistration) -> AppResult<BookingOutcome>;
    // 参加登録をキャンセルする。存在しなければ None を返す
    async fn cancel(
        &self,
        registration_id: RegistrationId,
    ) -> AppResult<Option<CancelledRegistration>>;
    // ユーザーの参加登録一覧を取得する
    async fn find_by_chat_id(&self, chat_id: ChatId) -> AppResult<Vec<Registration>>;
    // イベントに紐づく参加登録一覧を取得する
    async fn find_by_event_id(&self, event_id: EventId) -> AppResult<Vec<Registration>>;
    // 管理画面向けの全参加登録一覧（登録日時の新しい順）
    async fn find_all(&self) -> AppResult<Vec<Registration>>;
    // 統計用のカウント
    async fn count(&self) -> AppResult<i64>;
}
