//! Run inputs. An empty string means "not set".

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::{Error, Result};
use crate::github::{InstallationId, DEFAULT_API_URL};

/// Validated inputs for one run.
pub struct Inputs {
    pub app_id: String,
    pub private_key: SecretString,
    pub installation_id: Option<InstallationId>,
    pub set_git_credentials: bool,
    pub api_url: String,
}

impl Inputs {
    /// Inputs with no explicit installation, git configuration enabled and
    /// the public GitHub API.
    pub fn new(app_id: impl Into<String>, private_key: impl Into<String>) -> Self {
        let private_key: String = private_key.into();
        Self {
            app_id: app_id.into(),
            private_key: SecretString::new(private_key.into()),
            installation_id: None,
            set_git_credentials: true,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Build inputs from raw string values, applying defaults and validation.
    pub fn from_raw(raw: RawInputs) -> Result<Self> {
        let app_id = present(raw.app_id)
            .ok_or_else(|| Error::invalid_input("app-id", "input required and not supplied"))?;
        let private_key = present(raw.private_key)
            .ok_or_else(|| Error::invalid_input("private-key", "input required and not supplied"))?;

        let installation_id = present(raw.installation_id)
            .map(|value| parse_installation_id(&value))
            .transpose()?;

        let set_git_credentials = match present(raw.set_git_credentials) {
            Some(value) => parse_bool_input("set-git-credentials", &value)?,
            None => true,
        };

        let api_url = present(raw.api_url).unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            app_id: app_id.trim().to_string(),
            private_key: SecretString::new(private_key.into()),
            installation_id,
            set_git_credentials,
            api_url,
        })
    }

    pub fn with_installation_id(mut self, installation_id: InstallationId) -> Self {
        self.installation_id = Some(installation_id);
        self
    }

    pub fn with_git_credentials(mut self, enabled: bool) -> Self {
        self.set_git_credentials = enabled;
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn private_key(&self) -> &str {
        self.private_key.expose_secret()
    }
}

impl fmt::Debug for Inputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inputs")
            .field("app_id", &self.app_id)
            .field("private_key", &"[REDACTED]")
            .field("installation_id", &self.installation_id)
            .field("set_git_credentials", &self.set_git_credentials)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Unvalidated input strings, as read from flags or the environment.
#[derive(Default)]
pub struct RawInputs {
    pub app_id: Option<String>,
    pub private_key: Option<String>,
    pub installation_id: Option<String>,
    pub set_git_credentials: Option<String>,
    pub api_url: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

pub fn parse_installation_id(value: &str) -> Result<InstallationId> {
    match value.trim().parse::<InstallationId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::invalid_input(
            "installation-id",
            format!("'{}' is not a positive integer", value.trim()),
        )),
    }
}

/// Boolean input parsing as workflow runners define it: only the YAML 1.2
/// core-schema spellings are accepted.
pub fn parse_bool_input(name: &'static str, value: &str) -> Result<bool> {
    match value.trim() {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        other => Err(Error::invalid_input(
            name,
            format!(
                "'{other}' does not meet YAML 1.2 \"Core Schema\" specification. \
                 Support boolean input list: `true | True | TRUE | false | False | FALSE`"
            ),
        )),
    }
}
