use crate::model::callback::CallbackAction;
use crate::model::chat::{InlineButton, InlineKeyboard, OutboundMessage};
use crate::model::user::AiExperience;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// 登録フローのステップ
/// 順番は固定で、スキップも後戻りもできない
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStep {
    FullName,
    Company,
    Role,
    AiExperience,
    Email,
    Complete,
}

/// 登録フロー途中のセッション状態
/// ユーザーごとに 1 つだけ持ち、完了または TTL 失効で破棄される
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationSession {
    pub step: RegistrationStep,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub role: Option<String>,
    pub ai_experience: Option<AiExperience>,
    pub email: Option<String>,
}

/// 完了したセッションから取り出したプロフィール一式
/// 永続化はこの型を受け取った呼び出し側の責務
#[derive(Debug, Clone)]
pub struct CompletedProfile {
    pub full_name: String,
    pub company: String,
    pub role: String,
    pub ai_experience: AiExperience,
    pub email: String,
}

/// 1 ステップ分の入力に対する応答
#[derive(Debug)]
pub enum StepReply {
    /// 入力を受理して次のステップへ進んだ
    Next(OutboundMessage),
    /// 入力を拒否した。同じステップのプロンプトを繰り返す
    Repeat(OutboundMessage),
    /// 最後のステップを受理してフローが完了した
    Completed(CompletedProfile),
}

impl Default for RegistrationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationSession {
    pub fn new() -> Self {
        Self {
            step: RegistrationStep::FullName,
            full_name: None,
            company: None,
            role: None,
            ai_experience: None,
            email: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.step == RegistrationStep::Complete
    }

    /// フリーテキスト入力を現在のステップに適用する
    pub fn apply_text(&mut self, input: &str) -> StepReply {
        let input = input.trim();
        match self.step {
            RegistrationStep::FullName => {
                if input.is_empty() {
                    return StepReply::Repeat(OutboundMessage::text(
                        "お名前を教えてください（フルネーム）",
                    ));
                }
                self.full_name = Some(input.to_string());
                self.step = RegistrationStep::Company;
                StepReply::Next(OutboundMessage::text(format!(
                    "ありがとうございます、{input}さん！👋\n\nお勤め先の会社を教えてください。"
                )))
            }
            RegistrationStep::Company => {
                if input.is_empty() {
                    return StepReply::Repeat(OutboundMessage::text(
                        "お勤め先の会社を教えてください。",
                    ));
                }
                self.company = Some(input.to_string());
                self.step = RegistrationStep::Role;
                StepReply::Next(OutboundMessage::text(format!(
                    "会社：{input} ✅\n\nそこでの役割を教えてください。"
                )))
            }
            RegistrationStep::Role => {
                if input.is_empty() {
                    return StepReply::Repeat(OutboundMessage::text(
                        "そこでの役割を教えてください。",
                    ));
                }
                self.role = Some(input.to_string());
                self.step = RegistrationStep::AiExperience;
                StepReply::Next(ai_experience_prompt(input))
            }
            // AI 経験はボタン選択のみ。テキストが来たら選択肢を出し直す
            RegistrationStep::AiExperience => StepReply::Repeat(choice_only_prompt()),
            RegistrationStep::Email => {
                // 簡易バリデーション：@ と . を含むこと
                if !input.contains('@') || !input.contains('.') {
                    return StepReply::Repeat(OutboundMessage::text(
                        "正しいメールアドレスを入力してください：",
                    ));
                }
                self.email = Some(input.to_string());
                self.step = RegistrationStep::Complete;
                match self.completed_profile() {
                    Some(profile) => StepReply::Completed(profile),
                    // ステップ順に進んでいれば起こらないが、保険として繰り返しに落とす
                    None => StepReply::Repeat(OutboundMessage::text(
                        "登録情報が不足しています。/start からやり直してください。",
                    )),
                }
            }
            RegistrationStep::Complete => StepReply::Repeat(OutboundMessage::text(
                "登録は完了しています。/events でイベントを確認できます。",
            )),
        }
    }

    /// AI 経験の選択を適用する（AiExperience ステップでのみ有効）
    pub fn apply_choice(&mut self, choice: AiExperience) -> StepReply {
        if self.step != RegistrationStep::AiExperience {
            return StepReply::Repeat(OutboundMessage::text(
                "いまは選択の操作はできません。メッセージで入力を続けてください。",
            ));
        }
        self.ai_experience = Some(choice);
        self.step = RegistrationStep::Email;
        StepReply::Next(OutboundMessage::text(format!(
            "AI経験：{} ✅\n\nZoomリンク付きのカレンダー招待をお送りするため、メールアドレスを教えてください：",
            choice.label()
        )))
    }

    fn completed_profile(&self) -> Option<CompletedProfile> {
        Some(CompletedProfile {
            full_name: self.full_name.clone()?,
            company: self.company.clone()?,
            role: self.role.clone()?,
            ai_experience: self.ai_experience?,
            email: self.email.clone()?,
        })
    }
}

/// フロー開始時の最初のプロンプト
pub fn start_prompt() -> OutboundMessage {
    OutboundMessage::text(
        "👋 AIコミュニティへようこそ！\n\n\
         登録を完了するために、いくつか質問させてください。\n\n\
         お名前を教えてください（フルネーム）",
    )
}

fn ai_experience_prompt(role: &str) -> OutboundMessage {
    OutboundMessage::with_keyboard(
        format!("役割：{role} ✅\n\nあなたに最も近いものはどれですか？\n\n以下から1つ選んでください："),
        ai_experience_keyboard(),
    )
}

fn choice_only_prompt() -> OutboundMessage {
    OutboundMessage::with_keyboard(
        "ボタンから1つ選んでください：".to_string(),
        ai_experience_keyboard(),
    )
}

fn ai_experience_keyboard() -> InlineKeyboard {
    InlineKeyboard::single_column(AiExperience::iter().map(|option| {
        InlineButton::new(option.label().to_string(), CallbackAction::AiExperience(option))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advance_through_texts(session: &mut RegistrationSession, inputs: &[&str]) {
        for input in inputs {
            assert!(matches!(
                session.apply_text(input),
                StepReply::Next(_) | StepReply::Completed(_)
            ));
        }
    }

    #[test]
    fn completes_after_exactly_five_accepted_inputs() {
        let mut session = RegistrationSession::new();
        advance_through_texts(&mut session, &["山田 太郎", "Example Inc.", "Backend Engineer"]);
        assert_eq!(session.step, RegistrationStep::AiExperience);

        assert!(matches!(
            session.apply_choice(AiExperience::BasicAi),
            StepReply::Next(_)
        ));
        assert_eq!(session.step, RegistrationStep::Email);

        let StepReply::Completed(profile) = session.apply_text("taro@example.com") else {
            panic!("email step should complete the flow");
        };
        assert!(session.is_complete());

        // 収集されたフィールドが入力とちょうど一致すること
        assert_eq!(profile.full_name, "山田 太郎");
        assert_eq!(profile.company, "Example Inc.");
        assert_eq!(profile.role, "Backend Engineer");
        assert_eq!(profile.ai_experience, AiExperience::BasicAi);
        assert_eq!(profile.email, "taro@example.com");
    }

    #[test]
    fn invalid_email_never_advances() {
        let mut session = RegistrationSession::new();
        advance_through_texts(&mut session, &["山田 太郎", "Example Inc.", "Backend Engineer"]);
        session.apply_choice(AiExperience::Other);

        for bad in ["taro", "taro@example", "taro.example.com"] {
            assert!(matches!(session.apply_text(bad), StepReply::Repeat(_)));
            assert_eq!(session.step, RegistrationStep::Email);
        }
        assert!(!session.is_complete());
    }

    #[test]
    fn ai_experience_step_rejects_free_text() {
        let mut session = RegistrationSession::new();
        advance_through_texts(&mut session, &["山田 太郎", "Example Inc.", "Backend Engineer"]);

        assert!(matches!(
            session.apply_text("ChatGPT を使っています"),
            StepReply::Repeat(_)
        ));
        assert_eq!(session.step, RegistrationStep::AiExperience);
    }

    #[test]
    fn choice_is_rejected_outside_ai_experience_step() {
        let mut session = RegistrationSession::new();
        assert!(matches!(
            session.apply_choice(AiExperience::BasicAi),
            StepReply::Repeat(_)
        ));
        assert_eq!(session.step, RegistrationStep::FullName);
    }

    #[test]
    fn empty_input_repeats_the_prompt() {
        let mut session = RegistrationSession::new();
        assert!(matches!(session.apply_text("   "), StepReply::Repeat(_)));
        assert_eq!(session.step, RegistrationStep::FullName);
    }

    #[test]
    fn ai_experience_prompt_lists_all_seven_options() {
        let mut session = RegistrationSession::new();
        advance_through_texts(&mut session, &["山田 太郎", "Example Inc.", "Backend Engineer"]);
        let StepReply::Repeat(message) = session.apply_text("text") else {
            panic!("text on the choice step should repeat");
        };
        let keyboard = message.keyboard.expect("choice prompt must carry buttons");
        assert_eq!(keyboard.rows.len(), 7);
    }
}
