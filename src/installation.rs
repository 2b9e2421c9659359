//! Installation resolution: an explicit id, or the app's only installation.

use crate::error::{Error, Result};
use crate::github::{AppProvider, InstallationId};
use crate::jwt::SignedAssertion;

/// Resolve the installation to act as.
///
/// Makes no network call when `explicit` is set.
pub async fn resolve<P>(
    explicit: Option<InstallationId>,
    assertion: &SignedAssertion,
    provider: &P,
) -> Result<InstallationId>
where
    P: AppProvider + ?Sized,
{
    if let Some(id) = explicit {
        tracing::debug!(installation_id = id, "using explicit installation id");
        return Ok(id);
    }

    let installations = provider
        .list_installations(assertion)
        .await
        .map_err(|error| Error::InstallationLookupFailure(error.to_string()))?;

    match installations.as_slice() {
        [] => Err(Error::NoInstallationFound),
        [only] => {
            tracing::debug!(
                installation_id = only.id,
                account = only.account.as_ref().map(|a| a.login.as_str()),
                "resolved the app's only installation"
            );
            Ok(only.id)
        }
        many => Err(Error::AmbiguousInstallation { count: many.len() }),
    }
}
