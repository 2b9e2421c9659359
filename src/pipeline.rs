//! normalize key -> sign app JWT -> resolve installation -> exchange token
//! -> publish outputs -> configure git. The first failure ends the run.

use crate::actions::ActionOutput;
use crate::config::Inputs;
use crate::error::Result;
use crate::git::{self, CommandRunner, GitCredentialState};
use crate::github::{AppProvider, InstallationId};
use crate::redact::Redactor;
use crate::{exchange, installation, jwt, key, publish};

/// What a successful run produced. The token itself is only available
/// through the published outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub installation_id: InstallationId,
    pub git: GitCredentialState,
}

pub async fn run<P, O, R>(
    inputs: &Inputs,
    provider: &P,
    output: &mut O,
    runner: &R,
    redactor: &Redactor,
) -> Result<Outcome>
where
    P: AppProvider + ?Sized,
    O: ActionOutput + ?Sized,
    R: CommandRunner + ?Sized,
{
    let key = key::normalize(inputs.private_key())?;
    let assertion = jwt::sign(&inputs.app_id, &key)?;

    let installation_id =
        installation::resolve(inputs.installation_id, &assertion, provider).await?;

    let token = exchange::exchange(&inputs.app_id, &key, installation_id, provider).await?;

    publish::publish(installation_id, &token, redactor, output)?;

    let git = git::configure(inputs.set_git_credentials, &token, runner, redactor).await?;

    Ok(Outcome {
        installation_id,
        git,
    })
}
