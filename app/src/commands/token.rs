//! Token command handlers.

use super::resolve_token;
use crate::error::CommandError;
use crate::state::AppState;
use gurubell_core::{BearerToken, WatchEvent};
use gurubell_notify::AlertAction;
use gurubell_scheduler::ValidationOutcome;
use serde::Serialize;
use tracing::info;

/// Result of `validate_token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenValidation {
    /// Whether the search endpoint accepted the token
    pub valid: bool,
    /// Set when the token was rejected as expired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired: Option<bool>,
    /// HTTP status of the rejection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Error message of the rejection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Persist a new token.
///
/// A blank token clears the stored one without further effect. Anything else
/// resets token tracking, cancels reminders and confirms with an alert.
pub async fn save_token(state: &AppState, token: String) -> Result<(), CommandError> {
    let token = match BearerToken::new(token) {
        Ok(token) => token,
        Err(_) => {
            gurubell_db::save_token(state.settings.as_ref(), None).await?;
            info!("Stored token cleared");
            return Ok(());
        }
    };

    gurubell_db::save_token(state.settings.as_ref(), Some(&token)).await?;
    state.scheduler.on_token_saved();
    state
        .dispatcher
        .dispatch(&WatchEvent::TokenSaved, &state.preferences());
    info!("Token saved");
    Ok(())
}

/// The stored token, or an empty string.
pub async fn get_token(state: &AppState) -> Result<String, CommandError> {
    let token = gurubell_db::load_token(state.settings.as_ref()).await?;
    Ok(token.map(|t| t.expose().to_string()).unwrap_or_default())
}

/// Check a token against the search endpoint.
///
/// A rejected token is reported in the result, not as an error; the poll
/// session is left alone either way.
pub async fn validate_token(
    state: &AppState,
    token: Option<String>,
) -> Result<TokenValidation, CommandError> {
    let token = resolve_token(state, token).await?;

    match state.scheduler.validate(&token).await? {
        ValidationOutcome::Valid => Ok(TokenValidation {
            valid: true,
            expired: None,
            status_code: None,
            error: None,
        }),
        ValidationOutcome::Expired(err) => Ok(TokenValidation {
            valid: false,
            expired: Some(true),
            status_code: Some(err.status_or_zero()),
            error: Some(err.message),
        }),
    }
}

/// Stop reminding about the expired token until it expires again.
pub fn dismiss_token_reminders(state: &AppState) {
    state.scheduler.dismiss_reminders();
}

/// "Remind Me Later": push the next reminder out by the snooze delay.
///
/// Returns `false` when no expiry is being tracked.
pub fn snooze_token_reminder(state: &AppState) -> bool {
    state.scheduler.snooze_reminders()
}

/// "Update Token Now": ask the UI to open the token editor.
pub fn open_token_editor(state: &AppState) {
    state.emit_ui(WatchEvent::ShowTokenUpdateModal);
}

/// Route a button press on the token-expired alert.
pub fn handle_alert_action(state: &AppState, action: AlertAction) {
    match action {
        AlertAction::UpdateTokenNow => open_token_editor(state),
        AlertAction::RemindMeLater => {
            snooze_token_reminder(state);
        }
    }
}
