//! Command handlers.
//!
//! Every handler takes the shared [`AppState`](crate::state::AppState) and
//! returns a serializable result or a [`CommandError`](crate::error::CommandError).

pub mod scraping;
pub mod settings;
pub mod token;

use crate::error::CommandError;
use crate::state::AppState;
use gurubell_core::BearerToken;

/// Use the explicit token when one was passed, else the stored one.
///
/// Fails with `TOKEN_REQUIRED` before any network call when neither exists.
pub(crate) async fn resolve_token(
    state: &AppState,
    token: Option<String>,
) -> Result<BearerToken, CommandError> {
    if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
        return Ok(BearerToken::new(token)?);
    }

    gurubell_db::load_token(state.settings.as_ref())
        .await?
        .ok_or_else(CommandError::token_required)
}
