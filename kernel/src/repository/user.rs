use crate::model::id::ChatId;
use crate::model::user::{
    event::{CompleteProfile, CreateUser, UpdateTimezone},
    User,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    // 初回コンタクト時にユーザーを作成する
    async fn create(&self, event: CreateUser) -> AppResult<()>;
    // チャット ID からユーザーを取得する
    async fn find_by_chat_id(&self, chat_id: ChatId) -> AppResult<Option<User>>;
    // 管理画面向けの全ユーザー一覧
    async fn find_all(&self) -> AppResult<Vec<User>>;
    // 登録フロー完了時にプロフィールを確定させる
    async fn complete_profile(&self, event: CompleteProfile) -> AppResult<()>;
    // タイムゾーン設定を更新する
    async fn update_timezone(&self, event: UpdateTimezone) -> AppResult<()>;
    // 統計用のカウント
    async fn count(&self) -> AppResult<i64>;
    async fn count_profile_complete(&self) -> AppResult<i64>;
}
