//! Notification settings command handlers.

use crate::error::CommandError;
use crate::state::AppState;
use gurubell_core::NotificationPreferences;
use gurubell_db::{load_preferences, save_preferences};

/// Read the stored notification preferences.
pub async fn get_notification_settings(
    state: &AppState,
) -> Result<NotificationPreferences, CommandError> {
    let preferences = load_preferences(state.settings.as_ref()).await?;
    state.set_preferences(preferences);
    Ok(preferences)
}

/// Persist notification preferences; they apply to the next alert.
pub async fn save_notification_settings(
    state: &AppState,
    preferences: NotificationPreferences,
) -> Result<(), CommandError> {
    save_preferences(state.settings.as_ref(), &preferences).await?;
    state.set_preferences(preferences);
    tracing::info!(?preferences, "Notification preferences updated");
    Ok(())
}
