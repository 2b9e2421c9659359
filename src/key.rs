//! Private key normalization to PKCS#8 PEM.

use std::fmt;

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::der::asn1::AnyRef;
use rsa::pkcs8::{
    AlgorithmIdentifierRef, DecodePrivateKey, EncodePrivateKey, LineEnding, ObjectIdentifier,
    PrivateKeyInfo, SecretDocument,
};
use rsa::RsaPrivateKey;
use secrecy::{ExposeSecret, SecretString};
use sec1::EcPrivateKey;

use crate::error::{Error, Result};

const RSA_PRIVATE_KEY_TAG: &str = "RSA PRIVATE KEY";
const PRIVATE_KEY_TAG: &str = "PRIVATE KEY";
const ENCRYPTED_PRIVATE_KEY_TAG: &str = "ENCRYPTED PRIVATE KEY";
const EC_PRIVATE_KEY_TAG: &str = "EC PRIVATE KEY";
const OPENSSH_PRIVATE_KEY_TAG: &str = "OPENSSH PRIVATE KEY";

/// `rsaEncryption` from RFC 8017.
const RSA_ENCRYPTION_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
/// `id-ecPublicKey` from RFC 5480.
const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// A private key encoded as PKCS#8 PEM with LF line endings.
///
/// Only RSA keys can sign an app JWT; other key families are carried through
/// unchanged so the signer reports them.
pub struct CanonicalKey(SecretString);

impl CanonicalKey {
    pub fn pem(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CanonicalKey([REDACTED])")
    }
}

/// Parse `raw` as a private key in any accepted encoding and return it as
/// PKCS#8 PEM.
///
/// RSA keys are decoded and re-encoded. EC keys (SEC1 or PKCS#8) are checked
/// for structure and wrapped as PKCS#8 without interpreting the key itself.
///
/// # Errors
///
/// Returns [`Error::InvalidKeyFormat`] if:
/// - the input is empty or not PEM
/// - the key is OpenSSH-format or encrypted
/// - the DER payload does not decode as a private key
pub fn normalize(raw: &str) -> Result<CanonicalKey> {
    let text = unescape_newlines(raw.trim());
    if text.is_empty() {
        return Err(invalid("private key is empty"));
    }

    let block = pem::parse(text.as_bytes())
        .map_err(|error| invalid(format!("input is not a PEM-encoded key: {error}")))?;

    let encoded = match block.tag() {
        RSA_PRIVATE_KEY_TAG => {
            let key = RsaPrivateKey::from_pkcs1_der(block.contents())
                .map_err(|error| invalid(format!("malformed PKCS#1 RSA key: {error}")))?;
            rsa_to_pkcs8(&key)?
        }
        PRIVATE_KEY_TAG => {
            let info = PrivateKeyInfo::try_from(block.contents())
                .map_err(|error| invalid(format!("malformed PKCS#8 key: {error}")))?;
            if info.algorithm.oid == RSA_ENCRYPTION_OID {
                let key = RsaPrivateKey::from_pkcs8_der(block.contents())
                    .map_err(|error| invalid(format!("malformed PKCS#8 RSA key: {error}")))?;
                rsa_to_pkcs8(&key)?
            } else {
                tracing::debug!(algorithm = %info.algorithm.oid, "private key is not RSA");
                to_pem(&info)?
            }
        }
        EC_PRIVATE_KEY_TAG => sec1_to_pkcs8(block.contents())?,
        ENCRYPTED_PRIVATE_KEY_TAG => {
            return Err(invalid("encrypted private keys are not supported"));
        }
        OPENSSH_PRIVATE_KEY_TAG => {
            return Err(invalid(concat!(
                "GitHub App authentication requires an RSA private key; ",
                "the input appears to contain an OpenSSH-format key ",
                "(try converting with: ssh-keygen -p -m pem -f <keyfile>)"
            )));
        }
        other => return Err(invalid(format!("unsupported PEM block '{other}'"))),
    };

    Ok(CanonicalKey(SecretString::new(encoded.into())))
}

fn rsa_to_pkcs8(key: &RsaPrivateKey) -> Result<String> {
    let encoded = key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|error| invalid(format!("failed to re-encode key as PKCS#8: {error}")))?;
    Ok(encoded.as_str().to_owned())
}

/// Wrap a SEC1 `ECPrivateKey` in a PKCS#8 envelope naming its curve.
fn sec1_to_pkcs8(der: &[u8]) -> Result<String> {
    let key = EcPrivateKey::try_from(der)
        .map_err(|error| invalid(format!("malformed EC private key: {error}")))?;
    let curve = key
        .parameters
        .and_then(|parameters| parameters.named_curve())
        .ok_or_else(|| invalid("EC private key does not name its curve"))?;

    let algorithm = AlgorithmIdentifierRef {
        oid: EC_PUBLIC_KEY_OID,
        parameters: Some(AnyRef::from(&curve)),
    };
    to_pem(&PrivateKeyInfo::new(algorithm, der))
}

fn to_pem(info: &PrivateKeyInfo<'_>) -> Result<String> {
    SecretDocument::try_from(info)
        .and_then(|document| Ok(document.to_pem(PRIVATE_KEY_TAG, LineEnding::LF)?))
        .map(|encoded| encoded.as_str().to_owned())
        .map_err(|error| invalid(format!("failed to encode key as PKCS#8: {error}")))
}

/// Keys stored in single-line secrets often carry literal `\n` sequences.
fn unescape_newlines(text: &str) -> String {
    if !text.contains('\n') && text.contains("\\n") {
        text.replace("\\n", "\n")
    } else {
        text.to_owned()
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidKeyFormat(message.into())
}
