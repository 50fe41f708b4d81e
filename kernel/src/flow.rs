use crate::model::chat::OutboundMessage;
use crate::model::id::ChatId;
use crate::model::session::{start_prompt, CompletedProfile, RegistrationSession, StepReply};
use crate::model::user::AiExperience;
use crate::repository::session::SessionRepository;
use shared::error::AppResult;
use std::sync::Arc;

/// 登録フローの進行役
///
/// ステップ遷移のロジックは `RegistrationSession` が持ち、ここでは
/// セッションの取り出し・保存・破棄だけを受け持つ。プロフィールの
/// 永続化はフローの外（呼び出し側）の責務。
pub struct RegistrationFlow {
    sessions: Arc<dyn SessionRepository>,
}

/// フローへの入力 1 回分の結果
#[derive(Debug)]
pub enum FlowReply {
    /// 進行中のセッションがない。/start からやり直してもらう
    NotInProgress,
    /// フロー継続中。次に送るプロンプトを返す
    Continue(OutboundMessage),
    /// フロー完了。収集したプロフィールを返す
    Completed(CompletedProfile),
}

impl RegistrationFlow {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// フローを開始する。進行中のセッションがあれば破棄して最初から始める
    pub async fn start(&self, chat_id: ChatId) -> AppResult<OutboundMessage> {
        let session = RegistrationSession::new();
        self.sessions.store(chat_id, &session).await?;
        Ok(start_prompt())
    }

    pub async fn advance_text(&self, chat_id: ChatId, input: &str) -> AppResult<FlowReply> {
        let Some(mut session) = self.sessions.find(chat_id).await? else {
            return Ok(FlowReply::NotInProgress);
        };
        let reply = session.apply_text(input);
        self.finish_step(chat_id, session, reply).await
    }

    pub async fn advance_choice(
        &self,
        chat_id: ChatId,
        choice: AiExperience,
    ) -> AppResult<FlowReply> {
        let Some(mut session) = self.sessions.find(chat_id).await? else {
            return Ok(FlowReply::NotInProgress);
        };
        let reply = session.apply_choice(choice);
        self.finish_step(chat_id, session, reply).await
    }

    pub async fn is_in_progress(&self, chat_id: ChatId) -> AppResult<bool> {
        Ok(self
            .sessions
            .find(chat_id)
            .await?
            .is_some_and(|s| !s.is_complete()))
    }

    pub async fn is_complete(&self, chat_id: ChatId) -> AppResult<bool> {
        Ok(self
            .sessions
            .find(chat_id)
            .await?
            .is_some_and(|s| s.is_complete()))
    }

    pub async fn discard(&self, chat_id: ChatId) -> AppResult<()> {
        self.sessions.delete(chat_id).await
    }

    // 遷移後のセッションを保存してから応答を返す
    // 完了時も Complete 状態のまま一度保存し、破棄は呼び出し側に任せる
    async fn finish_step(
        &self,
        chat_id: ChatId,
        session: RegistrationSession,
        reply: StepReply,
    ) -> AppResult<FlowReply> {
        self.sessions.store(chat_id, &session).await?;
        Ok(match reply {
            StepReply::Next(prompt) | StepReply::Repeat(prompt) => FlowReply::Continue(prompt),
            StepReply::Completed(profile) => FlowReply::Completed(profile),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemorySessionRepository {
        sessions: Mutex<HashMap<ChatId, RegistrationSession>>,
    }

    #[async_trait]
    impl SessionRepository for InMemorySessionRepository {
        async fn find(&self, chat_id: ChatId) -> AppResult<Option<RegistrationSession>> {
            Ok(self.sessions.lock().unwrap().get(&chat_id).cloned())
        }

        async fn store(
            &self,
            chat_id: ChatId,
            session: &RegistrationSession,
        ) -> AppResult<()> {
            self.sessions
                .lock()
                .unwrap()
                .insert(chat_id, session.clone());
            Ok(())
        }

        async fn delete(&self, chat_id: ChatId) -> AppResult<()> {
            self.sessions.lock().unwrap().remove(&chat_id);
            Ok(())
        }
    }

    fn flow() -> RegistrationFlow {
        RegistrationFlow::new(Arc::new(InMemorySessionRepository::default()))
    }

    #[tokio::test]
    async fn full_flow_collects_exactly_the_given_inputs() -> AppResult<()> {
        let flow = flow();
        let chat_id = ChatId::new(100);

        flow.start(chat_id).await?;
        assert!(flow.is_in_progress(chat_id).await?);

        flow.advance_text(chat_id, "山田 太郎").await?;
        flow.advance_text(chat_id, "Example Inc.").await?;
        flow.advance_text(chat_id, "Backend Engineer").await?;
        flow.advance_choice(chat_id, AiExperience::AiAgents).await?;

        let FlowReply::Completed(profile) = flow.advance_text(chat_id, "taro@example.com").await?
        else {
            panic!("flow should complete on the fifth accepted input");
        };

        assert!(flow.is_complete(chat_id).await?);
        assert!(!flow.is_in_progress(chat_id).await?);
        assert_eq!(profile.full_name, "山田 太郎");
        assert_eq!(profile.email, "taro@example.com");

        flow.discard(chat_id).await?;
        assert!(!flow.is_complete(chat_id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn step_without_session_asks_for_restart() -> AppResult<()> {
        let flow = flow();
        let chat_id = ChatId::new(200);

        assert!(matches!(
            flow.advance_text(chat_id, "山田 太郎").await?,
            FlowReply::NotInProgress
        ));
        assert!(matches!(
            flow.advance_choice(chat_id, AiExperience::Other).await?,
            FlowReply::NotInProgress
        ));
        Ok(())
    }

    #[tokio::test]
    async fn restart_discards_previous_progress() -> AppResult<()> {
        let flow = flow();
        let chat_id = ChatId::new(300);

        flow.start(chat_id).await?;
        flow.advance_text(chat_id, "山田 太郎").await?;
        flow.advance_text(chat_id, "Example Inc.").await?;

        // start し直すと最初のステップからやり直しになる
        flow.start(chat_id).await?;
        let FlowReply::Continue(prompt) = flow.advance_text(chat_id, "佐藤 花子").await? else {
            panic!("restarted flow should accept the first step again");
        };
        assert!(prompt.text.contains("佐藤 花子"));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_email_keeps_the_flow_on_the_email_step() -> AppResult<()> {
        let flow = flow();
        let chat_id = ChatId::new(400);

        flow.start(chat_id).await?;
        flow.advance_text(chat_id, "山田 太郎").await?;
        flow.advance_text(chat_id, "Example Inc.").await?;
        flow.advance_text(chat_id, "Backend Engineer").await?;
        flow.advance_choice(chat_id, AiExperience::BasicAi).await?;

        assert!(matches!(
            flow.advance_text(chat_id, "not-an-email").await?,
            FlowReply::Continue(_)
        ));
        assert!(flow.is_in_progress(chat_id).await?);

        assert!(matches!(
            flow.advance_text(chat_id, "taro@example.com").await?,
            FlowReply::Completed(_)
        ));
        Ok(())
    }
}
