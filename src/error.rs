//! Error types for the token exchange pipeline. Every variant is fatal.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required input is missing or an input value is malformed.
    #[error("Invalid input '{name}': {message}")]
    InvalidInput { name: &'static str, message: String },

    /// The private key could not be parsed as an RSA key in any accepted encoding.
    #[error("Invalid private key: {0}")]
    InvalidKeyFormat(String),

    /// The app JWT could not be produced.
    #[error("Failed to sign app JWT: {0}")]
    SigningFailure(String),

    /// Listing the app's installations failed before a count was known.
    #[error("Failed to list app installations: {0}")]
    InstallationLookupFailure(String),

    #[error("No installations found for this app")]
    NoInstallationFound,

    /// More than one installation exists and none was chosen explicitly.
    #[error("Detected {count} installations. Please provide an 'installation-id' input.")]
    AmbiguousInstallation { count: usize },

    /// The provider refused or failed to issue an installation token.
    #[error("Failed to create installation access token: {0}")]
    TokenExchangeFailure(String),

    /// `git config` did not apply the credential rewrite.
    #[error("Failed to configure git credentials: {0}")]
    CredentialConfigurationFailure(String),

    #[error("An unexpected error occurred: {0}")]
    UnexpectedFailure(#[from] anyhow::Error),
}

impl Error {
    pub fn invalid_input(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            name,
            message: message.into(),
        }
    }

    /// True for conditions caused by the app's installation state rather than
    /// by infrastructure (network, signing, local tooling).
    pub fn is_installation_state(&self) -> bool {
        matches!(
            self,
            Self::NoInstallationFound | Self::AmbiguousInstallation { .. }
        )
    }
}
