use crate::model::id::{EventId, RegistrationId};
use crate::model::user::AiExperience;
use chrono_tz::Tz;

/// インラインボタンに載せるアクション
///
/// ボタンのコールバックデータは `register_<id>` のような区切り文字列として
/// やり取りされるが、境界でこの型に変換してから扱う。未知のトークンや
/// 不正な ID はこの時点で弾く。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// イベントへの参加登録
    Register(EventId),
    /// 参加登録のキャンセル
    CancelRegistration(RegistrationId),
    /// 満席イベントのボタン（押しても案内を返すだけ）
    EventFull(EventId),
    /// 登録フローの AI 経験の選択
    AiExperience(AiExperience),
    /// タイムゾーンの選択
    Timezone(Tz),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(rest) = data.strip_prefix("register_") {
            return rest.parse().ok().map(Self::Register);
        }
        if let Some(rest) = data.strip_prefix("cancel_") {
            return rest.parse().ok().map(Self::CancelRegistration);
        }
        if let Some(rest) = data.strip_prefix("full_") {
            return rest.parse().ok().map(Self::EventFull);
        }
        if let Some(rest) = data.strip_prefix("ai_exp_") {
            return rest.parse().ok().map(Self::AiExperience);
        }
        if let Some(rest) = data.strip_prefix("timezone_") {
            return rest.parse().ok().map(Self::Timezone);
        }
        None
    }
}

impl std::fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallbackAction::Register(event_id) => write!(f, "register_{event_id}"),
            CallbackAction::CancelRegistration(registration_id) => {
                write!(f, "cancel_{registration_id}")
            }
            CallbackAction::EventFull(event_id) => write!(f, "full_{event_id}"),
            CallbackAction::AiExperience(option) => write!(f, "ai_exp_{}", option.as_ref()),
            CallbackAction::Timezone(tz) => write!(f, "timezone_{}", tz.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_token_round_trip() {
        let action = CallbackAction::Register(EventId::new());
        assert_eq!(CallbackAction::parse(&action.to_string()), Some(action));
    }

    #[test]
    fn cancel_token_round_trip() {
        let action = CallbackAction::CancelRegistration(RegistrationId::new());
        assert_eq!(CallbackAction::parse(&action.to_string()), Some(action));
    }

    #[test]
    fn ai_experience_token_round_trip() {
        let action = CallbackAction::AiExperience(AiExperience::BasicAi);
        assert_eq!(action.to_string(), "ai_exp_basic_ai");
        assert_eq!(CallbackAction::parse("ai_exp_basic_ai"), Some(action));
    }

    #[test]
    fn timezone_token_round_trip() {
        let action = CallbackAction::Timezone(chrono_tz::Asia::Tokyo);
        assert_eq!(action.to_string(), "timezone_Asia/Tokyo");
        assert_eq!(CallbackAction::parse("timezone_Asia/Tokyo"), Some(action));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert_eq!(CallbackAction::parse("register_42"), None);
        assert_eq!(CallbackAction::parse("ai_exp_quantum"), None);
        assert_eq!(CallbackAction::parse("timezone_Mars/Olympus"), None);
        assert_eq!(CallbackAction::parse("unknown_action"), None);
    }
}
