//! Application state management.

use crate::error::CommandError;
use crate::feed::JobFeed;
use gurubell_core::{AppConfig, NotificationPreferences, WatchEvent};
use gurubell_db::{load_preferences, SettingsStore};
use gurubell_notify::{AlertSettings, NotificationDispatcher, NotificationSink};
use gurubell_scheduler::{PollScheduler, SchedulerSettings};
use gurubell_source::{CategoryFilter, JobSource};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The collaborators a host plugs into the application.
pub struct Services {
    /// Where jobs come from
    pub source: Arc<dyn JobSource>,
    /// Where the token and preferences live
    pub settings: Arc<dyn SettingsStore>,
    /// Where desktop alerts go
    pub sink: Arc<dyn NotificationSink>,
}

/// State shared by all command handlers.
///
/// Owns the poll scheduler and an event pump task that turns scheduler
/// events into desktop alerts, keeps the [`JobFeed`] current and forwards
/// UI events to the host.
pub struct AppState {
    /// Loaded configuration
    pub config: AppConfig,
    /// Key-value settings store
    pub settings: Arc<dyn SettingsStore>,
    /// The single poll session of this process
    pub scheduler: PollScheduler,
    /// Alert renderer and delivery
    pub dispatcher: Arc<NotificationDispatcher>,
    preferences: Arc<RwLock<NotificationPreferences>>,
    feed: Arc<RwLock<JobFeed>>,
    ui_events: UnboundedSender<WatchEvent>,
    closing: CancellationToken,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl AppState {
    /// Build the state and start the event pump.
    ///
    /// Returns the receiving end of the UI event stream. Must be called from
    /// within a Tokio runtime.
    pub async fn new(
        config: AppConfig,
        services: Services,
    ) -> Result<(Self, UnboundedReceiver<WatchEvent>), CommandError> {
        let preferences = load_preferences(services.settings.as_ref()).await?;
        tracing::debug!(?preferences, "Loaded notification preferences");

        let (watch_tx, watch_rx) = unbounded_channel();
        let (ui_tx, ui_rx) = unbounded_channel();

        let scheduler = PollScheduler::new(
            services.source,
            CategoryFilter::from_config(&config.source),
            SchedulerSettings::from_config(&config),
            watch_tx,
        );
        let dispatcher = Arc::new(NotificationDispatcher::new(
            services.sink,
            AlertSettings::from_config(&config.notifications),
        ));
        let preferences = Arc::new(RwLock::new(preferences));
        let feed = Arc::new(RwLock::new(JobFeed::default()));
        let closing = CancellationToken::new();

        let pump = tokio::spawn(pump_events(
            watch_rx,
            closing.clone(),
            Arc::clone(&dispatcher),
            Arc::clone(&preferences),
            Arc::clone(&feed),
            ui_tx.clone(),
        ));

        let state = Self {
            config,
            settings: services.settings,
            scheduler,
            dispatcher,
            preferences,
            feed,
            ui_events: ui_tx,
            closing,
            pump: Mutex::new(Some(pump)),
        };
        Ok((state, ui_rx))
    }

    /// Current notification preferences.
    pub fn preferences(&self) -> NotificationPreferences {
        *read(&self.preferences)
    }

    /// Replace the cached notification preferences.
    pub fn set_preferences(&self, preferences: NotificationPreferences) {
        *write(&self.preferences) = preferences;
    }

    /// Snapshot of the in-app feed.
    pub fn feed(&self) -> JobFeed {
        read(&self.feed).clone()
    }

    /// Mutate the in-app feed.
    pub fn update_feed(&self, f: impl FnOnce(&mut JobFeed)) {
        f(&mut write(&self.feed));
    }

    /// Send an event straight to the UI, bypassing the alert dispatcher.
    pub fn emit_ui(&self, event: WatchEvent) {
        if self.ui_events.send(event).is_err() {
            tracing::debug!("UI event receiver dropped");
        }
    }

    /// Stop polling and reminders, e.g. when the host closes.
    pub fn shutdown(&self) {
        tracing::info!("Shutting down, cancelling timers");
        self.scheduler.shutdown();
    }

    /// Shut down and wait for the event pump to deliver queued alerts.
    pub async fn close(&self) {
        self.shutdown();
        self.closing.cancel();

        let pump = self
            .pump
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(pump) = pump {
            if let Err(err) = pump.await {
                tracing::warn!(error = %err, "Event pump failed");
            }
        }
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        let pump = self
            .pump
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(pump) = pump {
            pump.abort();
        }
    }
}

async fn pump_events(
    mut events: UnboundedReceiver<WatchEvent>,
    closing: CancellationToken,
    dispatcher: Arc<NotificationDispatcher>,
    preferences: Arc<RwLock<NotificationPreferences>>,
    feed: Arc<RwLock<JobFeed>>,
    ui: UnboundedSender<WatchEvent>,
) {
    let handle = |event: WatchEvent| {
        let prefs = *read(&preferences);
        dispatcher.dispatch(&event, &prefs);
        write(&feed).apply(&event);

        if event.is_ui_event() && ui.send(event).is_err() {
            tracing::debug!("UI event receiver dropped");
        }
    };

    loop {
        tokio::select! {
            biased;
            event = events.recv() => match event {
                Some(event) => handle(event),
                None => break,
            },
            () = closing.cancelled() => {
                while let Ok(event) = events.try_recv() {
                    handle(event);
                }
                break;
            }
        }
    }
    tracing::debug!("Event pump stopped");
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
