//! Integration tests for the command handlers.

use async_trait::async_trait;
use gurubell_app::commands::{scraping, settings, token};
use gurubell_app::state::{AppState, Services};
use gurubell_core::{AppConfig, BearerToken, JobRecord, NotificationPreferences, WatchEvent};
use gurubell_db::{MemorySettingsStore, SettingsStore, SqliteSettingsStore};
use gurubell_notify::{AlertAction, AlertKind, DesktopAlert, NotificationSink, NotifyError};
use gurubell_scheduler::PollState;
use gurubell_source::{JobSource, RawResponse, RequestError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedReceiver;

const CATEGORY: &str = "Programming & Development";

#[derive(Default)]
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<RawResponse, RequestError>>>,
    calls: AtomicUsize,
    last_token: Mutex<Option<String>>,
}

impl ScriptedSource {
    fn push(&self, result: Result<RawResponse, RequestError>) {
        self.responses.lock().unwrap().push_back(result);
    }
}

#[async_trait]
impl JobSource for ScriptedSource {
    async fn fetch_jobs(&self, token: &BearerToken) -> Result<RawResponse, RequestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = Some(token.expose().to_string());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}

#[derive(Default)]
struct RecordingSink {
    shown: Mutex<Vec<DesktopAlert>>,
}

impl RecordingSink {
    fn kinds(&self) -> Vec<AlertKind> {
        self.shown.lock().unwrap().iter().map(|a| a.kind).collect()
    }
}

impl NotificationSink for RecordingSink {
    fn show(&self, alert: &DesktopAlert) -> Result<(), NotifyError> {
        self.shown.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

struct Harness {
    state: AppState,
    ui: UnboundedReceiver<WatchEvent>,
    source: Arc<ScriptedSource>,
    sink: Arc<RecordingSink>,
    store: Arc<dyn SettingsStore>,
}

async fn harness_with_store(store: Arc<dyn SettingsStore>) -> Harness {
    let source = Arc::new(ScriptedSource::default());
    let sink = Arc::new(RecordingSink::default());
    let services = Services {
        source: source.clone(),
        settings: store.clone(),
        sink: sink.clone(),
    };
    let (state, ui) = AppState::new(AppConfig::default(), services)
        .await
        .expect("create app state");
    Harness {
        state,
        ui,
        source,
        sink,
        store,
    }
}

async fn harness() -> Harness {
    harness_with_store(Arc::new(MemorySettingsStore::new())).await
}

fn page(ids: &[&str]) -> Result<RawResponse, RequestError> {
    Ok(RawResponse::new(
        ids.iter()
            .map(|id| JobRecord::new(*id, format!("Job {id}"), CATEGORY))
            .collect(),
    ))
}

#[tokio::test]
async fn test_save_and_get_token() {
    let h = harness().await;

    token::save_token(&h.state, "  abc123 \n".to_string())
        .await
        .expect("save token");
    assert_eq!(token::get_token(&h.state).await.expect("get"), "abc123");
    assert_eq!(h.sink.kinds(), vec![AlertKind::TokenSaved]);
}

#[tokio::test]
async fn test_saving_empty_token_clears_without_alert() {
    let h = harness().await;
    token::save_token(&h.state, "abc".to_string()).await.expect("save");
    token::save_token(&h.state, "   ".to_string()).await.expect("clear");

    assert_eq!(token::get_token(&h.state).await.expect("get"), "");
    assert_eq!(h.sink.kinds(), vec![AlertKind::TokenSaved]);
}

#[tokio::test]
async fn test_start_without_token_fails_before_network() {
    let h = harness().await;

    let err = scraping::start_job_scraping(&h.state, None)
        .await
        .expect_err("no token");
    assert_eq!(err.code, "TOKEN_REQUIRED");

    let err = scraping::fetch_jobs_manual(&h.state, Some("   ".to_string()))
        .await
        .expect_err("blank token");
    assert_eq!(err.code, "TOKEN_REQUIRED");
    assert_eq!(h.source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_start_uses_stored_token() {
    let h = harness().await;
    token::save_token(&h.state, "stored".to_string()).await.expect("save");
    h.source.push(page(&[]));

    scraping::start_job_scraping(&h.state, None)
        .await
        .expect("start");
    assert_eq!(h.source.last_token.lock().unwrap().as_deref(), Some("stored"));

    let status = scraping::get_scraping_status(&h.state);
    assert_eq!(status.state, PollState::Active);
    assert_eq!(status.active_timers, 1);
    assert!(!status.token_expired);

    scraping::stop_job_scraping(&h.state);
    let status = scraping::get_scraping_status(&h.state);
    assert_eq!(status.state, PollState::Stopped);
    assert_eq!(status.active_timers, 0);
}

#[tokio::test]
async fn test_start_with_rejected_token_alerts_once() {
    let mut h = harness().await;
    h.source.push(Err(RequestError::http(401, "Unauthorized")));

    let err = scraping::start_job_scraping(&h.state, Some("bad".to_string()))
        .await
        .expect_err("rejected");
    assert_eq!(err.code, "TOKEN_EXPIRED");

    match h.ui.recv().await.expect("ui event") {
        WatchEvent::TokenExpired(payload) => assert_eq!(payload.status_code, 401),
        other => panic!("expected token-expired, got {other:?}"),
    }
    assert_eq!(h.sink.kinds(), vec![AlertKind::TokenExpired]);
    assert!(scraping::get_scraping_status(&h.state).token_expired);
}

#[tokio::test]
async fn test_start_with_server_error_is_request_failed() {
    let h = harness().await;
    h.source.push(Err(RequestError::http(503, "Service Unavailable")));

    let err = scraping::start_job_scraping(&h.state, Some("tok".to_string()))
        .await
        .expect_err("server error");
    assert_eq!(err.code, "REQUEST_FAILED");
    assert_eq!(err.details, Some(serde_json::json!({ "statusCode": 503 })));
    assert_eq!(scraping::get_scraping_status(&h.state).state, PollState::Stopped);
}

#[tokio::test]
async fn test_manual_fetch_updates_feed() {
    let h = harness().await;
    h.source.push(page(&["1", "2"]));

    let jobs = scraping::fetch_jobs_manual(&h.state, Some("tok".to_string()))
        .await
        .expect("fetch");
    assert_eq!(jobs.len(), 2);

    let feed = scraping::get_job_feed(&h.state);
    assert_eq!(feed.total_jobs, 2);
    assert!(feed.last_updated.is_some());
    assert_eq!(h.state.scheduler.previous_jobs(), jobs);
}

#[tokio::test]
async fn test_manual_fetch_with_expired_token() {
    let mut h = harness().await;
    h.source.push(Err(RequestError::http(403, "Forbidden")));

    let err = scraping::fetch_jobs_manual(&h.state, Some("tok".to_string()))
        .await
        .expect_err("expired");
    assert_eq!(err.code, "TOKEN_EXPIRED");
    assert_eq!(err.details, Some(serde_json::json!({ "statusCode": 403 })));
    assert!(matches!(
        h.ui.recv().await.expect("ui event"),
        WatchEvent::TokenExpired(_)
    ));
}

#[tokio::test]
async fn test_close_delivers_queued_expiry_alert() {
    let h = harness().await;
    h.source.push(Err(RequestError::http(401, "Token expired")));

    let err = scraping::fetch_jobs_manual(&h.state, Some("tok".to_string()))
        .await
        .expect_err("expired");
    assert_eq!(err.code, "TOKEN_EXPIRED");

    h.state.close().await;
    assert_eq!(h.sink.kinds(), vec![AlertKind::TokenExpired]);
    assert_eq!(h.state.scheduler.state(), PollState::Stopped);
}

#[tokio::test]
async fn test_validate_token_reports_expiry() {
    let h = harness().await;
    h.source.push(Err(RequestError::http(401, "Token expired")));
    h.source.push(page(&[]));
    h.source.push(Err(RequestError::http(500, "internal error")));

    let result = token::validate_token(&h.state, Some("tok".to_string()))
        .await
        .expect("validate");
    assert!(!result.valid);
    assert_eq!(result.expired, Some(true));
    assert_eq!(result.status_code, Some(401));
    assert_eq!(result.error.as_deref(), Some("Token expired"));

    let result = token::validate_token(&h.state, Some("tok".to_string()))
        .await
        .expect("validate");
    assert!(result.valid);
    assert_eq!(
        serde_json::to_value(&result).expect("serialize"),
        serde_json::json!({ "valid": true })
    );

    let err = token::validate_token(&h.state, Some("tok".to_string()))
        .await
        .expect_err("server error");
    assert_eq!(err.code, "REQUEST_FAILED");
    assert_eq!(scraping::get_scraping_status(&h.state).state, PollState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_reach_ui_and_feed() {
    let mut h = harness().await;
    h.source.push(page(&[]));
    h.source.push(page(&["1"]));
    h.source.push(page(&["1", "2"]));

    scraping::start_job_scraping(&h.state, Some("tok".to_string()))
        .await
        .expect("start");

    assert!(matches!(h.ui.recv().await, Some(WatchEvent::JobsUpdated(_))));
    assert!(matches!(h.ui.recv().await, Some(WatchEvent::JobsUpdated(_))));
    match h.ui.recv().await {
        Some(WatchEvent::NewJobs(payload)) => assert_eq!(payload.count, 1),
        other => panic!("expected new-jobs-notification, got {other:?}"),
    }

    let status = scraping::get_scraping_status(&h.state);
    assert_eq!(status.total_jobs, 2);
    assert_eq!(status.new_jobs_count, 1);
    assert_eq!(h.sink.kinds(), vec![AlertKind::NewJobs]);

    scraping::clear_new_jobs(&h.state);
    assert_eq!(scraping::get_scraping_status(&h.state).new_jobs_count, 0);
    h.state.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_disabled_notifications_still_update_feed() {
    let mut h = harness().await;
    settings::save_notification_settings(
        &h.state,
        NotificationPreferences {
            system_notifications_enabled: false,
            ..NotificationPreferences::default()
        },
    )
    .await
    .expect("save settings");

    h.source.push(page(&[]));
    h.source.push(page(&["1"]));
    h.source.push(page(&["1", "2"]));
    scraping::start_job_scraping(&h.state, Some("tok".to_string()))
        .await
        .expect("start");

    h.ui.recv().await;
    h.ui.recv().await;
    assert!(matches!(h.ui.recv().await, Some(WatchEvent::NewJobs(_))));
    assert!(h.sink.kinds().is_empty());
    h.state.shutdown();
}

#[tokio::test]
async fn test_notification_settings_round_trip() {
    let h = harness().await;
    assert_eq!(
        settings::get_notification_settings(&h.state)
            .await
            .expect("get"),
        NotificationPreferences::default()
    );

    let prefs = NotificationPreferences {
        system_notifications_enabled: true,
        sound_enabled: false,
        show_job_titles: false,
    };
    settings::save_notification_settings(&h.state, prefs)
        .await
        .expect("save");
    assert_eq!(h.state.preferences(), prefs);
    assert_eq!(
        h.store.get("soundEnabled").await.expect("raw get"),
        Some(serde_json::json!(false))
    );
}

#[tokio::test]
async fn test_alert_actions() {
    let mut h = harness().await;

    token::handle_alert_action(&h.state, AlertAction::UpdateTokenNow);
    assert_eq!(h.ui.recv().await, Some(WatchEvent::ShowTokenUpdateModal));

    // Nothing expired yet, so there is nothing to snooze.
    token::handle_alert_action(&h.state, AlertAction::RemindMeLater);
    assert!(!token::snooze_token_reminder(&h.state));
    assert_eq!(h.state.scheduler.active_reminder_count(), 0);
}

#[tokio::test]
async fn test_save_token_cancels_reminders() {
    let mut h = harness().await;
    h.source.push(Err(RequestError::http(401, "Unauthorized")));
    let _ = scraping::start_job_scraping(&h.state, Some("old".to_string())).await;
    h.ui.recv().await;
    assert_eq!(h.state.scheduler.active_reminder_count(), 1);

    token::save_token(&h.state, "new".to_string()).await.expect("save");
    assert_eq!(h.state.scheduler.active_reminder_count(), 0);
    assert!(!scraping::get_scraping_status(&h.state).token_expired);

    h.source.push(Err(RequestError::http(401, "Unauthorized")));
    let _ = scraping::start_job_scraping(&h.state, None).await;
    h.ui.recv().await;
    token::dismiss_token_reminders(&h.state);
    assert_eq!(h.state.scheduler.active_reminder_count(), 0);
}

#[tokio::test]
async fn test_sqlite_settings_survive_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.db");

    {
        let db = gurubell_db::Database::open(&path).await.expect("open");
        let h = harness_with_store(Arc::new(SqliteSettingsStore::new(db))).await;
        token::save_token(&h.state, "persisted".to_string())
            .await
            .expect("save");
    }

    let db = gurubell_db::Database::open(&path).await.expect("reopen");
    let h = harness_with_store(Arc::new(SqliteSettingsStore::new(db))).await;
    assert_eq!(token::get_token(&h.state).await.expect("get"), "persisted");
}
