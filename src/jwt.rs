//! RS256 app JWT signing.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::key::CanonicalKey;

/// Back-dating applied to `iat` to tolerate clock drift.
const CLOCK_DRIFT_SECS: u64 = 30;
/// Lifetime of the JWT from `iat`; GitHub's maximum.
const LIFETIME_SECS: u64 = 600;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JwtClaims {
    iat: u64,    // Issued at time
    exp: u64,    // Expiration time
    iss: String, // Issuer (GitHub App ID)
}

/// A signed app JWT, usable as a bearer credential until `expires_at`.
pub struct SignedAssertion {
    token: SecretString,
    issuer: String,
    /// Seconds since the Unix epoch.
    expires_at: u64,
}

impl SignedAssertion {
    pub fn bearer(&self) -> &str {
        self.token.expose_secret()
    }

}

impl fmt::Debug for SignedAssertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedAssertion")
            .field("token", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Sign an app JWT for `app_id`, valid from now.
pub fn sign(app_id: &str, key: &CanonicalKey) -> Result<SignedAssertion> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|error| Error::SigningFailure(format!("system time before UNIX epoch: {error}")))?
        .as_secs();
    sign_at(app_id, key, now)
}

/// Sign an app JWT as if the current time were `now` (seconds since epoch).
pub fn sign_at(app_id: &str, key: &CanonicalKey, now: u64) -> Result<SignedAssertion> {
    let iat = now.saturating_sub(CLOCK_DRIFT_SECS);
    let claims = JwtClaims {
        iat,
        exp: iat + LIFETIME_SECS,
        iss: app_id.to_string(),
    };

    let header = Header::new(Algorithm::RS256);
    let encoding_key = EncodingKey::from_rsa_pem(key.pem().as_bytes()).map_err(|error| {
        Error::SigningFailure(format!("app JWTs require an RSA private key: {error}"))
    })?;

    let token = encode(&header, &claims, &encoding_key)
        .map_err(|error| Error::SigningFailure(format!("failed to encode JWT: {error}")))?;

    tracing::debug!(iss = app_id, exp = claims.exp, "signed app JWT");

    Ok(SignedAssertion {
        token: SecretString::new(token.into()),
        issuer: claims.iss,
        expires_at: claims.exp,
    })
}
