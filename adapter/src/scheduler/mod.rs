use chrono::{Duration, Utc};
use chrono_tz::Tz;
use derive_new::new;
use kernel::model::chat::OutboundMessage;
use kernel::model::id::{ChatId, EventId};
use kernel::model::registration::RegistrationEvent;
use kernel::notifier::Notifier;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::time::Instant;

/// リマインダージョブのキー
/// 同じ (ユーザー, イベント) への再スケジュールは前のジョブを置き換える
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReminderKey {
    pub chat_id: ChatId,
    pub event_id: EventId,
}

/// スケジュール要求。発火時のメッセージ組み立てに必要な情報を持つ
#[derive(Debug, Clone, new)]
pub struct ReminderRequest {
    pub chat_id: ChatId,
    pub event: RegistrationEvent,
    pub timezone: Tz,
}

impl ReminderRequest {
    pub fn key(&self) -> ReminderKey {
        ReminderKey {
            chat_id: self.chat_id,
            event_id: self.event.event_id,
        }
    }
}

struct PendingJob {
    seq: u64,
    request: ReminderRequest,
}

#[derive(Default)]
struct SchedulerState {
    next_seq: u64,
    // キーごとに有効なジョブは 1 件だけ
    pending: HashMap<ReminderKey, PendingJob>,
    // 発火予定時刻の早い順に取り出すキュー
    // キャンセル・置き換えで無効になったエントリは取り出し時に読み捨てる
    queue: BinaryHeap<Reverse<(Instant, u64, ReminderKey)>>,
}

enum NextAction {
    Fire(ReminderRequest),
    Sleep(Instant),
    Idle,
}

/// イベント開始の約 24 時間前に一度だけ通知を送るスケジューラ
///
/// ジョブはプロセス内のキューで管理し、`run` を 1 タスクだけ起動して
/// 発火を担わせる。送信の失敗は記録するだけでリトライしない。
pub struct ReminderScheduler {
    state: Mutex<SchedulerState>,
    notify: Notify,
    notifier: Arc<dyn Notifier>,
}

/// イベント開始何時間前にリマインダーを送るか
const REMINDER_LEAD_HOURS: i64 = 24;

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: Mutex::new(SchedulerState::default()),
            notify: Notify::new(),
            notifier,
        }
    }

    /// リマインダーを登録する
    /// 発火予定時刻がすでに過去の場合は何もしない（直前のイベントには
    /// リマインダーを送らない）
    pub fn schedule(&self, request: ReminderRequest) {
        let fire_at = request.event.event_datetime - Duration::hours(REMINDER_LEAD_HOURS);
        let now = Utc::now();
        if fire_at <= now {
            tracing::info!(
                chat_id = %request.chat_id,
                event_id = %request.event.event_id,
                "リマインダー時刻を過ぎているためスケジュールしません"
            );
            return;
        }

        let delay = (fire_at - now).to_std().unwrap_or_default();
        let deadline = Instant::now() + delay;
        let key = request.key();

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let seq = state.next_seq;
        state.next_seq += 1;
        // 既存ジョブがあればこの insert で置き換わる
        state.pending.insert(key, PendingJob { seq, request });
        state.queue.push(Reverse((deadline, seq, key)));
        drop(state);

        tracing::info!(
            chat_id = %key.chat_id,
            event_id = %key.event_id,
            fire_at = %fire_at,
            "リマインダーを登録しました"
        );
        self.notify.notify_one();
    }

    /// リマインダーを解除する。ジョブがなくても警告を残すだけでエラーにしない
    pub fn cancel(&self, key: ReminderKey) {
        let removed = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.pending.remove(&key)
        };
        match removed {
            Some(_) => tracing::info!(
                chat_id = %key.chat_id,
                event_id = %key.event_id,
                "リマインダーを解除しました"
            ),
            None => tracing::warn!(
                chat_id = %key.chat_id,
                event_id = %key.event_id,
                "解除対象のリマインダーがありませんでした"
            ),
        }
        self.notify.notify_one();
    }

    /// 発火待ちのジョブ数
    pub fn pending_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pending
            .len()
    }

    /// 発火ループ。アプリケーションから 1 タスクだけ起動する
    pub async fn run(self: Arc<Self>) {
        loop {
            match self.next_action() {
                NextAction::Fire(request) => self.fire(request).await,
                NextAction::Sleep(deadline) => {
                    tokio::select! {
                        _ = tokio::time::sleep_until(deadline) => {}
                        _ = self.notify.notified() => {}
                    }
                }
                NextAction::Idle => self.notify.notified().await,
            }
        }
    }

    fn next_action(&self) -> NextAction {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            let Some(Reverse((deadline, seq, key))) = state.queue.peek().copied() else {
                return NextAction::Idle;
            };
            // キャンセル済み・置き換え済みのエントリは捨てる
            let valid = state
                .pending
                .get(&key)
                .map(|job| job.seq == seq)
                .unwrap_or(false);
            if !valid {
                state.queue.pop();
                continue;
            }
            if deadline > Instant::now() {
                return NextAction::Sleep(deadline);
            }
            state.queue.pop();
            if let Some(job) = state.pending.remove(&key) {
                return NextAction::Fire(job.request);
            }
        }
    }

    async fn fire(&self, request: ReminderRequest) {
        let chat_id = request.chat_id;
        let message = compose_reminder(&request);
        // 送信失敗は記録するだけでリトライしない
        match self.notifier.send_message(chat_id, message).await {
            Ok(()) => tracing::info!(
                chat_id = %chat_id,
                event_id = %request.event.event_id,
                "リマインダーを送信しました"
            ),
            Err(e) => tracing::error!(
                error.message = %e,
                chat_id = %chat_id,
                event_id = %request.event.event_id,
                "リマインダーの送信に失敗しました"
            ),
        }
    }
}

// ユーザーのタイムゾーンで開催日時を表示する
fn compose_reminder(request: &ReminderRequest) -> OutboundMessage {
    let event = &request.event;
    let local_time = event.event_datetime.with_timezone(&request.timezone);
    let mut text = format!(
        "⏰ イベントのリマインダーです！\n\n📅 {}\n🕐 {}（{}）\n",
        event.title,
        local_time.format("%Y-%m-%d %H:%M"),
        request.timezone.name(),
    );
    if let Some(description) = &event.description {
        text.push_str(&format!("📝 {description}\n"));
    }
    if let Some(link) = &event.webinar_link {
        text.push_str(&format!("🔗 参加リンク: {link}\n"));
    }
    text.push_str("\nぜひご参加ください！");
    OutboundMessage::text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kernel::model::id::EventId;
    use shared::error::AppResult;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(ChatId, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send_message(&self, chat_id: ChatId, message: OutboundMessage) -> AppResult<()> {
            self.sent.lock().unwrap().push((chat_id, message.text));
            Ok(())
        }

        async fn answer_callback(&self, _callback_id: &str) -> AppResult<()> {
            Ok(())
        }
    }

    fn request(chat_id: i64, hours_from_now: i64) -> ReminderRequest {
        ReminderRequest {
            chat_id: ChatId::new(chat_id),
            event: RegistrationEvent {
                event_id: EventId::new(),
                title: "Rust勉強会".into(),
                event_datetime: Utc::now() + Duration::hours(hours_from_now),
                description: Some("もくもく会".into()),
                webinar_link: Some("https://example.com/meet".into()),
            },
            timezone: chrono_tz::Asia::Tokyo,
        }
    }

    async fn settle() {
        // 発火タスクに処理の機会を与える
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn past_reminder_time_schedules_nothing() {
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = Arc::new(ReminderScheduler::new(notifier.clone()));

        // 開始まで 24 時間を切っているイベントにはジョブを作らない
        scheduler.schedule(request(1, 1));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reminder_fires_once_at_the_deadline() {
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = Arc::new(ReminderScheduler::new(notifier.clone()));
        tokio::spawn(scheduler.clone().run());

        scheduler.schedule(request(1, 25));
        assert_eq!(scheduler.pending_count(), 1);

        tokio::time::sleep(std::time::Duration::from_secs(2 * 3600)).await;
        settle().await;

        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChatId::new(1));
        assert!(sent[0].1.contains("Rust勉強会"));
        assert!(sent[0].1.contains("Asia/Tokyo"));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_the_same_key_replaces_the_job() {
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = Arc::new(ReminderScheduler::new(notifier.clone()));
        tokio::spawn(scheduler.clone().run());

        let first = request(1, 25);
        let mut second = first.clone();
        second.event.event_datetime = Utc::now() + Duration::hours(30);

        scheduler.schedule(first);
        scheduler.schedule(second);
        // 同じキーなので pending は 1 件のまま
        assert_eq!(scheduler.pending_count(), 1);

        tokio::time::sleep(std::time::Duration::from_secs(10 * 3600)).await;
        settle().await;

        // 置き換え後のジョブだけが一度発火する
        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_reminder_never_fires() {
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = Arc::new(ReminderScheduler::new(notifier.clone()));
        tokio::spawn(scheduler.clone().run());

        let request = request(1, 25);
        let key = request.key();
        scheduler.schedule(request);
        scheduler.cancel(key);
        assert_eq!(scheduler.pending_count(), 0);

        tokio::time::sleep(std::time::Duration::from_secs(2 * 3600)).await;
        settle().await;

        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_a_missing_job_is_not_an_error() {
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = Arc::new(ReminderScheduler::new(notifier));

        scheduler.cancel(ReminderKey {
            chat_id: ChatId::new(9),
            event_id: EventId::new(),
        });
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reminders_for_different_users_fire_independently() {
        let notifier = Arc::new(RecordingNotifier::default());
        let scheduler = Arc::new(ReminderScheduler::new(notifier.clone()));
        tokio::spawn(scheduler.clone().run());

        scheduler.schedule(request(1, 25));
        scheduler.schedule(request(2, 26));
        assert_eq!(scheduler.pending_count(), 2);

        tokio::time::sleep(std::time::Duration::from_secs(3 * 3600)).await;
        settle().await;

        let sent = notifier.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, ChatId::new(1));
        assert_eq!(sent[1].0, ChatId::new(2));
    }
}
