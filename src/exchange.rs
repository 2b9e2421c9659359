//! Installation token exchange.

use crate::error::{Error, Result};
use crate::github::{AppProvider, InstallationId, InstallationToken};
use crate::jwt;
use crate::key::CanonicalKey;

/// Exchange a freshly signed app JWT for an access token scoped to
/// `installation_id`.
///
/// The JWT used for resolution is not reused, so the token request always
/// carries a full validity window.
pub async fn exchange<P>(
    app_id: &str,
    key: &CanonicalKey,
    installation_id: InstallationId,
    provider: &P,
) -> Result<InstallationToken>
where
    P: AppProvider + ?Sized,
{
    let assertion = jwt::sign(app_id, key)?;

    let token = provider
        .create_installation_token(&assertion, installation_id)
        .await
        .map_err(|error| Error::TokenExchangeFailure(error.to_string()))?;

    if token.value().is_empty() {
        return Err(Error::TokenExchangeFailure(
            "GitHub returned an empty token".to_string(),
        ));
    }

    tracing::debug!(
        installation_id,
        expires_at = token.expires_at(),
        "created installation access token"
    );

    Ok(token)
}
