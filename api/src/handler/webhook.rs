use crate::model::chat::{CallbackQuery, ChatCommand, IncomingMessage, TelegramUpdate};
use adapter::scheduler::{ReminderKey, ReminderRequest};
use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use chrono_tz::Tz;
use kernel::flow::FlowReply;
use kernel::model::callback::CallbackAction;
use kernel::model::chat::{InlineButton, InlineKeyboard, OutboundMessage};
use kernel::model::event::EventListing;
use kernel::model::id::{ChatId, EventId, RegistrationId};
use kernel::model::registration::{event::CreateRegistration, BookingOutcome};
use kernel::model::session::CompletedProfile;
use kernel::model::user::{event::CreateUser, event::UpdateTimezone, AiExperience, User};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

const SECRET_TOKEN_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// タイムゾーン選択肢として提示する代表的な地域
const TIMEZONE_CHOICES: &[Tz] = &[
    chrono_tz::Asia::Tokyo,
    chrono_tz::Asia::Singapore,
    chrono_tz::Europe::London,
    chrono_tz::Europe::Berlin,
    chrono_tz::America::New_York,
    chrono_tz::America::Los_Angeles,
    chrono_tz::UTC,
];

/// チャットからの更新を受け付けるエンドポイント
///
/// 永続化エラーなどはここで握りつぶしてユーザーには汎用メッセージを返し、
/// HTTP としては 200 を返す（失敗応答を返すと同じ更新が再送されてくるため）
pub async fn handle_telegram_webhook(
    headers: HeaderMap,
    State(registry): State<AppRegistry>,
    Json(update): Json<TelegramUpdate>,
) -> AppResult<StatusCode> {
    verify_secret_token(&headers, &registry)?;

    if let Err(e) = dispatch_update(&registry, &update).await {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            update_id = update.update_id,
            "チャット更新の処理に失敗しました"
        );
        if let Some(chat_id) = update.chat_id() {
            let _ = registry
                .notifier()
                .send_message(
                    chat_id,
                    OutboundMessage::text(
                        "エラーが発生しました。しばらくしてからもう一度お試しください。",
                    ),
                )
                .await;
        }
    }

    Ok(StatusCode::OK)
}

fn verify_secret_token(headers: &HeaderMap, registry: &AppRegistry) -> AppResult<()> {
    let config = registry.app_config();
    let provided = headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if provided != Some(config.http.secret_key.as_str()) {
        return Err(AppError::UnauthenticatedError);
    }
    Ok(())
}

async fn dispatch_update(registry: &AppRegistry, update: &TelegramUpdate) -> AppResult<()> {
    if let Some(callback) = &update.callback_query {
        return handle_callback(registry, callback).await;
    }
    if let Some(message) = &update.message {
        return handle_message(registry, message).await;
    }
    // 関心のない種類の更新は黙って読み捨てる
    Ok(())
}

// ----------------------------------------------
// テキストメッセージの処理
// ----------------------------------------------

async fn handle_message(registry: &AppRegistry, message: &IncomingMessage) -> AppResult<()> {
    let chat_id = ChatId::new(message.chat.id);
    let Some(text) = &message.text else {
        return send(registry, chat_id, command_hint()).await;
    };

    if text.starts_with('/') {
        return match ChatCommand::parse(text) {
            Some(command) => handle_command(registry, chat_id, message, command).await,
            None => send(registry, chat_id, command_hint()).await,
        };
    }

    // コマンド以外のテキストは、登録フロー進行中であればその入力として扱う
    match registry.registration_flow().advance_text(chat_id, text).await? {
        FlowReply::NotInProgress => send(registry, chat_id, command_hint()).await,
        FlowReply::Continue(prompt) => send(registry, chat_id, prompt).await,
        FlowReply::Completed(profile) => complete_registration(registry, chat_id, profile).await,
    }
}

async fn handle_command(
    registry: &AppRegistry,
    chat_id: ChatId,
    message: &IncomingMessage,
    command: ChatCommand,
) -> AppResult<()> {
    match command {
        ChatCommand::Start => handle_start(registry, chat_id, message).await,
        ChatCommand::Events => handle_events(registry, chat_id).await,
        ChatCommand::MyEvents => handle_my_events(registry, chat_id).await,
        ChatCommand::Help => send(registry, chat_id, OutboundMessage::text(help_text())).await,
        ChatCommand::Profile => handle_profile(registry, chat_id).await,
        ChatCommand::EditProfile => handle_edit_profile(registry, chat_id).await,
        ChatCommand::Timezone(zone) => handle_timezone(registry, chat_id, zone).await,
    }
}

async fn handle_start(
    registry: &AppRegistry,
    chat_id: ChatId,
    message: &IncomingMessage,
) -> AppResult<()> {
    let user = registry.user_repository().find_by_chat_id(chat_id).await?;

    match user {
        None => {
            let username = message.from.as_ref().and_then(|u| u.username.clone());
            registry
                .user_repository()
                .create(CreateUser::new(chat_id, username))
                .await?;
            let prompt = registry.registration_flow().start(chat_id).await?;
            send(registry, chat_id, prompt).await
        }
        // ユーザーは作成済みだがプロフィールが未完了の場合は、フローをやり直す
        Some(user) if !user.is_profile_complete => {
            let prompt = registry.registration_flow().start(chat_id).await?;
            send(registry, chat_id, prompt).await
        }
        Some(user) => {
            let text = format!(
                "おかえりなさい、{}さん！😊\n\n登録は完了しています。\n\n{}",
                user.display_name(),
                help_text()
            );
            send(registry, chat_id, OutboundMessage::text(text)).await
        }
    }
}

async fn handle_events(registry: &AppRegistry, chat_id: ChatId) -> AppResult<()> {
    let events = registry.event_repository().find_upcoming().await?;
    if events.is_empty() {
        return send(
            registry,
            chat_id,
            OutboundMessage::text("現在参加できるイベントはありません。"),
        )
        .await;
    }

    let timezone = user_timezone(registry, chat_id).await?;
    let mut text = String::from("🗓 参加できるイベント:\n\n");
    let mut buttons = Vec::new();
    for listing in &events {
        text.push_str(&format_event_block(listing, timezone));
        buttons.push(event_button(listing));
    }

    send(
        registry,
        chat_id,
        OutboundMessage::with_keyboard(text, InlineKeyboard::single_column(buttons)),
    )
    .await
}

async fn handle_my_events(registry: &AppRegistry, chat_id: ChatId) -> AppResult<()> {
    let Some(user) = registry.user_repository().find_by_chat_id(chat_id).await? else {
        return send(
            registry,
            chat_id,
            OutboundMessage::text("まだ登録されていません。/start から始めてください。"),
        )
        .await;
    };

    let registrations = registry
        .registration_repository()
        .find_by_chat_id(chat_id)
        .await?;
    if registrations.is_empty() {
        return send(
            registry,
            chat_id,
            OutboundMessage::text("参加登録中のイベントはありません。"),
        )
        .await;
    }

    let timezone = user.timezone;
    let mut text = String::from("📋 参加登録中のイベント:\n\n");
    let mut buttons = Vec::new();
    for registration in &registrations {
        let event_time = registration
            .event
            .event_datetime
            .with_timezone(&timezone)
            .format("%Y-%m-%d %H:%M");
        let registered_at = registration
            .registered_at
            .with_timezone(&timezone)
            .format("%Y-%m-%d %H:%M");
        text.push_str(&format!(
            "📅 {}\n🕐 {}\n✅ 登録日時: {}\n\n",
            registration.event.title, event_time, registered_at
        ));
        buttons.push(InlineButton::new(
            format!("「{}」をキャンセル", truncate(&registration.event.title, 30)),
            CallbackAction::CancelRegistration(registration.registration_id),
        ));
    }

    send(
        registry,
        chat_id,
        OutboundMessage::with_keyboard(text, InlineKeyboard::single_column(buttons)),
    )
    .await
}

async fn handle_profile(registry: &AppRegistry, chat_id: ChatId) -> AppResult<()> {
    let user = registry.user_repository().find_by_chat_id(chat_id).await?;
    let message = match user {
        Some(user) if user.is_profile_complete => OutboundMessage::text(profile_text(&user)),
        _ => OutboundMessage::text(
            "プロフィールの登録が完了していません。/start から登録してください。",
        ),
    };
    send(registry, chat_id, message).await
}

async fn handle_edit_profile(registry: &AppRegistry, chat_id: ChatId) -> AppResult<()> {
    let user = registry.user_repository().find_by_chat_id(chat_id).await?;
    if user.is_none() {
        return send(
            registry,
            chat_id,
            OutboundMessage::text("まだ登録されていません。/start から始めてください。"),
        )
        .await;
    }
    // 登録フローを最初からやり直してもらう
    let prompt = registry.registration_flow().start(chat_id).await?;
    send(registry, chat_id, prompt).await
}

async fn handle_timezone(
    registry: &AppRegistry,
    chat_id: ChatId,
    zone: Option<String>,
) -> AppResult<()> {
    let Some(zone) = zone else {
        // 引数なしの場合は選択肢を提示する
        let buttons = TIMEZONE_CHOICES.iter().map(|tz| {
            InlineButton::new(tz.name().to_string(), CallbackAction::Timezone(*tz))
        });
        return send(
            registry,
            chat_id,
            OutboundMessage::with_keyboard(
                "タイムゾーンを選んでください。\n（一覧にない場合は /timezone Asia/Tokyo のように指定できます）",
                InlineKeyboard::single_column(buttons),
            ),
        )
        .await;
    };

    // 未知のゾーン名はユーザー入力エラーとして打ち返す
    let Ok(timezone) = zone.parse::<Tz>() else {
        return send(
            registry,
            chat_id,
            OutboundMessage::text(format!(
                "「{zone}」は不明なタイムゾーンです。例: /timezone Asia/Tokyo"
            )),
        )
        .await;
    };

    apply_timezone(registry, chat_id, timezone).await
}

// ----------------------------------------------
// コールバック（ボタン押下）の処理
// ----------------------------------------------

async fn handle_callback(registry: &AppRegistry, callback: &CallbackQuery) -> AppResult<()> {
    // ボタンのローディング表示を止める。失敗しても処理は続行する
    if let Err(e) = registry.notifier().answer_callback(&callback.id).await {
        tracing::warn!(error.message = %e, "answerCallbackQuery に失敗しました");
    }

    let chat_id = ChatId::new(callback.from.id);
    let action = callback
        .data
        .as_deref()
        .and_then(CallbackAction::parse);

    let Some(action) = action else {
        tracing::warn!(data = ?callback.data, "不明なコールバックデータを受信しました");
        return send(
            registry,
            chat_id,
            OutboundMessage::text("不明な操作です。もう一度お試しください。"),
        )
        .await;
    };

    match action {
        CallbackAction::Register(event_id) => handle_booking(registry, chat_id, event_id).await,
        CallbackAction::CancelRegistration(registration_id) => {
            handle_cancellation(registry, chat_id, registration_id).await
        }
        CallbackAction::EventFull(_) => {
            send(
                registry,
                chat_id,
                OutboundMessage::text("このイベントはすでに満席です！"),
            )
            .await
        }
        CallbackAction::AiExperience(choice) => handle_ai_experience(registry, chat_id, choice).await,
        CallbackAction::Timezone(timezone) => apply_timezone(registry, chat_id, timezone).await,
    }
}

// 座席予約のひと通り：予約 → リマインダー登録 → 結果の通知
async fn handle_booking(
    registry: &AppRegistry,
    chat_id: ChatId,
    event_id: EventId,
) -> AppResult<()> {
    let outcome = registry
        .registration_repository()
        .book(CreateRegistration::new(chat_id, event_id))
        .await?;

    let message = match outcome {
        BookingOutcome::Booked(booking) => {
            registry.reminder_scheduler().schedule(ReminderRequest::new(
                chat_id,
                booking.event.clone(),
                booking.timezone,
            ));
            let event_time = booking
                .event
                .event_datetime
                .with_timezone(&booking.timezone)
                .format("%Y-%m-%d %H:%M");
            OutboundMessage::text(format!(
                "✅ イベントへの参加登録が完了しました！\n\n📅 {}\n🕐 {}\n👥 残り席数: {}\n\n開催の前日にリマインダーをお送りします。",
                booking.event.title, event_time, booking.seats_left
            ))
        }
        BookingOutcome::UserNotFound => OutboundMessage::text(
            "参加登録にはプロフィールの登録が必要です。/start から登録を完了してください。",
        ),
        BookingOutcome::EventNotFound => {
            OutboundMessage::text("イベントが見つかりませんでした。")
        }
        BookingOutcome::AlreadyRegistered => {
            OutboundMessage::text("すでにこのイベントに登録済みです！")
        }
        BookingOutcome::EventFull => {
            OutboundMessage::text("申し訳ありません。このイベントは満席になりました。")
        }
    };

    send(registry, chat_id, message).await
}

// キャンセルのひと通り：削除 → リマインダー解除 → 結果の通知
async fn handle_cancellation(
    registry: &AppRegistry,
    chat_id: ChatId,
    registration_id: RegistrationId,
) -> AppResult<()> {
    let cancelled = registry
        .registration_repository()
        .cancel(registration_id)
        .await?;

    let message = match cancelled {
        Some(cancelled) => {
            registry.reminder_scheduler().cancel(ReminderKey {
                chat_id: cancelled.chat_id,
                event_id: cancelled.event_id,
            });
            OutboundMessage::text(format!(
                "❌ 参加登録をキャンセルしました。\n\nイベント: {}\n気が変わったらいつでも登録し直せます。",
                cancelled.event_title
            ))
        }
        None => OutboundMessage::text("参加登録が見つかりませんでした。"),
    };

    send(registry, chat_id, message).await
}

async fn handle_ai_experience(
    registry: &AppRegistry,
    chat_id: ChatId,
    choice: AiExperience,
) -> AppResult<()> {
    match registry
        .registration_flow()
        .advance_choice(chat_id, choice)
        .await?
    {
        FlowReply::NotInProgress => {
            send(
                registry,
                chat_id,
                OutboundMessage::text("登録フローが始まっていません。/start からやり直してください。"),
            )
            .await
        }
        FlowReply::Continue(prompt) => send(registry, chat_id, prompt).await,
        FlowReply::Completed(profile) => complete_registration(registry, chat_id, profile).await,
    }
}

// フロー完了後の後始末：プロフィール永続化 → セッション破棄 → サマリ送信
async fn complete_registration(
    registry: &AppRegistry,
    chat_id: ChatId,
    profile: CompletedProfile,
) -> AppResult<()> {
    let summary = completion_text(&profile);
    registry
        .user_repository()
        .complete_profile(profile_event(chat_id, profile))
        .await?;
    registry.registration_flow().discard(chat_id).await?;
    send(registry, chat_id, OutboundMessage::text(summary)).await
}

async fn apply_timezone(registry: &AppRegistry, chat_id: ChatId, timezone: Tz) -> AppResult<()> {
    let user = registry.user_repository().find_by_chat_id(chat_id).await?;
    if user.is_none() {
        return send(
            registry,
            chat_id,
            OutboundMessage::text("まだ登録されていません。/start から始めてください。"),
        )
        .await;
    }

    registry
        .user_repository()
        .update_timezone(UpdateTimezone::new(chat_id, timezone))
        .await?;
    send(
        registry,
        chat_id,
        OutboundMessage::text(format!(
            "タイムゾーンを {} に設定しました。今後の日時表示とリマインダーに反映されます。",
            timezone.name()
        )),
    )
    .await
}

// ----------------------------------------------
// メッセージ組み立て
// ----------------------------------------------

async fn send(registry: &AppRegistry, chat_id: ChatId, message: OutboundMessage) -> AppResult<()> {
    registry.notifier().send_message(chat_id, message).await
}

// イベント一覧などの日時表示に使うタイムゾーン
// 未登録ユーザーには UTC で表示する
async fn user_timezone(registry: &AppRegistry, chat_id: ChatId) -> AppResult<Tz> {
    Ok(registry
        .user_repository()
        .find_by_chat_id(chat_id)
        .await?
        .map(|user| user.timezone)
        .unwrap_or(Tz::UTC))
}

fn format_event_block(listing: &EventListing, timezone: Tz) -> String {
    let event = &listing.event;
    let event_time = event
        .event_datetime
        .with_timezone(&timezone)
        .format("%Y-%m-%d %H:%M");
    let mut block = format!("📅 {}\n", event.title);
    if let Some(description) = &event.description {
        block.push_str(&format!("📝 {}\n", truncate(description, 100)));
    }
    block.push_str(&format!("🕐 {event_time}\n"));
    block.push_str(&format!("👥 残り席数: {}\n\n", listing.seats_left()));
    block
}

fn event_button(listing: &EventListing) -> InlineButton {
    let title = truncate(&listing.event.title, 30);
    if listing.is_full() {
        InlineButton::new(
            format!("「{title}」- 満席"),
            CallbackAction::EventFull(listing.event.event_id),
        )
    } else {
        InlineButton::new(
            format!("「{title}」に参加する"),
            CallbackAction::Register(listing.event.event_id),
        )
    }
}

fn profile_text(user: &User) -> String {
    let ai_experience = user
        .ai_experience
        .map(|v| v.label().to_string())
        .unwrap_or_else(|| "未設定".into());
    format!(
        "あなたのプロフィール:\n👤 名前: {}\n🏢 会社: {}\n💼 役割: {}\n🤖 AI経験: {}\n📧 メール: {}\n🌏 タイムゾーン: {}\n\n/edit_profile で登録し直せます。",
        user.full_name.as_deref().unwrap_or("未設定"),
        user.company.as_deref().unwrap_or("未設定"),
        user.role.as_deref().unwrap_or("未設定"),
        ai_experience,
        user.email.as_deref().unwrap_or("未設定"),
        user.timezone.name(),
    )
}

fn completion_text(profile: &CompletedProfile) -> String {
    format!(
        "🎉 登録が完了しました！\n\nあなたのプロフィール:\n👤 名前: {}\n🏢 会社: {}\n💼 役割: {}\n🤖 AI経験: {}\n📧 メール: {}\n\n{}",
        profile.full_name,
        profile.company,
        profile.role,
        profile.ai_experience.label(),
        profile.email,
        help_text(),
    )
}

fn profile_event(
    chat_id: ChatId,
    profile: CompletedProfile,
) -> kernel::model::user::event::CompleteProfile {
    kernel::model::user::event::CompleteProfile::new(
        chat_id,
        profile.full_name,
        profile.company,
        profile.role,
        profile.ai_experience,
        profile.email,
    )
}

fn help_text() -> &'static str {
    "使えるコマンド:\n\
     /events - 参加できるイベントの一覧\n\
     /my_events - 参加登録中のイベント\n\
     /profile - プロフィールの確認\n\
     /edit_profile - プロフィールの再登録\n\
     /timezone - タイムゾーンの設定\n\
     /help - このヘルプ"
}

fn command_hint() -> OutboundMessage {
    OutboundMessage::text(format!(
        "コマンドで操作してください。\n\n{}",
        help_text()
    ))
}

// 文字数ベースで切り詰める（バイト境界で壊さない）
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(max_chars).collect();
        truncated.push('…');
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use kernel::model::event::Event;

    fn listing(title: &str, capacity: i32, registration_count: i64) -> EventListing {
        EventListing {
            event: Event {
                event_id: EventId::new(),
                title: title.into(),
                description: Some("ハンズオン形式の勉強会です".into()),
                event_datetime: Utc::now() + Duration::days(7),
                webinar_link: None,
                capacity,
                image_url: None,
                created_at: Utc::now(),
            },
            registration_count,
        }
    }

    #[test]
    fn event_button_encodes_register_action_when_seats_remain() {
        let listing = listing("Rust勉強会", 10, 3);
        let button = event_button(&listing);
        assert!(matches!(button.action, CallbackAction::Register(_)));
        assert!(button.label.contains("参加する"));
    }

    #[test]
    fn event_button_encodes_full_action_when_sold_out() {
        let listing = listing("Rust勉強会", 5, 5);
        let button = event_button(&listing);
        assert!(matches!(button.action, CallbackAction::EventFull(_)));
        assert!(button.label.contains("満席"));
    }

    #[test]
    fn event_block_shows_seats_left_in_the_given_timezone() {
        let listing = listing("Rust勉強会", 10, 4);
        let block = format_event_block(&listing, chrono_tz::Asia::Tokyo);
        assert!(block.contains("残り席数: 6"));
        assert!(block.contains("Rust勉強会"));
    }

    #[test]
    fn truncate_respects_character_boundaries() {
        assert_eq!(truncate("こんにちは", 10), "こんにちは");
        assert_eq!(truncate("こんにちは世界", 5), "こんにちは…");
    }
}
