use crate::model::callback::CallbackAction;
use derive_new::new;

/// ボットから送る 1 通のメッセージ
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: InlineKeyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// メッセージに添えるインラインボタン（行 × 列）
#[derive(Debug, Clone, Default)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// 1 行 1 ボタンのキーボードを組み立てる
    pub fn single_column(buttons: impl IntoIterator<Item = InlineButton>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }
}

#[derive(Debug, Clone, new)]
pub struct InlineButton {
    pub label: String,
    pub action: CallbackAction,
}
