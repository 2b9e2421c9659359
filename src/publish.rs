//! Credential publication.

use anyhow::Context;

use crate::actions::ActionOutput;
use crate::error::Result;
use crate::github::{InstallationId, InstallationToken};
use crate::redact::Redactor;

pub const INSTALLATION_ID_OUTPUT: &str = "installation-id";
pub const ACCESS_TOKEN_OUTPUT: &str = "access-token";

/// Publish the installation id and token as outputs.
///
/// The token is registered with `redactor` and masked on the runner before
/// any output containing it is written.
pub fn publish<O>(
    installation_id: InstallationId,
    token: &InstallationToken,
    redactor: &Redactor,
    output: &mut O,
) -> Result<()>
where
    O: ActionOutput + ?Sized,
{
    redactor.register(token.value());
    output
        .add_mask(token.value())
        .context("failed to mask access token")?;

    output
        .set_output(INSTALLATION_ID_OUTPUT, &installation_id.to_string())
        .context("failed to set installation-id output")?;
    output
        .set_output(ACCESS_TOKEN_OUTPUT, token.value())
        .context("failed to set access-token output")?;

    tracing::info!("Installation ID: {installation_id}");
    if let Some(expires_at) = token.expires_at() {
        tracing::info!("Access token expires at {expires_at}");
    }

    Ok(())
}
