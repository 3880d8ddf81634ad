//! Session token validation.
//!
//! Tokens are HS256 JWTs issued by an external authority, carrying exactly
//! one authorized project path as a claim. Validation is pure: the signature
//! is checked against a shared secret, claims are decoded, and expiry is
//! enforced. The filesystem is never touched here.
//!
//! The session identifier is *derived* from the token (hex SHA-256) rather
//! than using the raw credential, so the credential never appears in
//! archive-root directory listings or gateway URLs.

use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The one project path this token authorizes.
    pub path: String,
    /// Expiry as a Unix timestamp. Optional: some issuers mint
    /// non-expiring editor tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued-at as a Unix timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// The identity a validated credential establishes.
#[derive(Debug, Clone)]
pub enum Identity {
    /// A token verified against the shared secret.
    Authorized {
        /// Derived session identifier (hex SHA-256 of the raw token).
        session_id: String,
        /// The project path the token authorizes.
        authorized_path: String,
    },
    /// No credential supplied; only produced when the validator is
    /// configured to allow anonymous binding.
    Anonymous,
}

/// Verifies bearer credentials against a shared secret.
pub struct TokenValidator {
    secret: Vec<u8>,
    credentials_required: bool,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("secret", &"[REDACTED]")
            .field("credentials_required", &self.credentials_required)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct Header {
    alg: String,
}

impl TokenValidator {
    /// Create a validator over the given shared secret.
    ///
    /// When `credentials_required` is false, a missing credential validates
    /// as [`Identity::Anonymous`] instead of failing; some front-end
    /// variants permit anonymous session initialization.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>, credentials_required: bool) -> Self {
        Self {
            secret: secret.into(),
            credentials_required,
        }
    }

    /// Validate a credential and extract the identity it establishes.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingCredential`] if no credential is given and
    ///   anonymous binding is not allowed
    /// - [`AuthError::Malformed`] if the token is not a three-part JWT or
    ///   its claims do not decode
    /// - [`AuthError::BadSignature`] if the HMAC does not verify
    /// - [`AuthError::Expired`] if the `exp` claim is in the past
    pub fn validate(&self, credential: Option<&str>) -> Result<Identity, AuthError> {
        let Some(token) = credential else {
            if self.credentials_required {
                return Err(AuthError::MissingCredential);
            }
            return Ok(Identity::Anonymous);
        };

        let claims = self.verify(token)?;

        Ok(Identity::Authorized {
            session_id: derive_session_id(token),
            authorized_path: claims.path,
        })
    }

    /// Verify a token's signature and expiry, returning its claims.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`TokenValidator::validate`] for a present
    /// credential.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut parts = token.splitn(3, '.');
        let (Some(header_b64), Some(payload_b64), Some(sig_b64)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::Malformed {
                reason: "expected three dot-separated segments".to_owned(),
            });
        };

        let header_bytes = B64.decode(header_b64).map_err(|e| AuthError::Malformed {
            reason: format!("header encoding: {e}"),
        })?;
        let header: Header =
            serde_json::from_slice(&header_bytes).map_err(|e| AuthError::Malformed {
                reason: format!("header decoding: {e}"),
            })?;
        // Pinning the algorithm defeats alg-confusion ("none") tokens.
        if header.alg != "HS256" {
            return Err(AuthError::Malformed {
                reason: format!("unsupported algorithm '{}'", header.alg),
            });
        }

        let signature = B64.decode(sig_b64).map_err(|e| AuthError::Malformed {
            reason: format!("signature encoding: {e}"),
        })?;

        let expected = self.sign(header_b64, payload_b64);
        if expected.ct_eq(&signature).unwrap_u8() != 1 {
            return Err(AuthError::BadSignature);
        }

        let payload_bytes = B64.decode(payload_b64).map_err(|e| AuthError::Malformed {
            reason: format!("payload encoding: {e}"),
        })?;
        let claims: SessionClaims =
            serde_json::from_slice(&payload_bytes).map_err(|e| AuthError::Malformed {
                reason: format!("claims decoding: {e}"),
            })?;

        if let Some(exp) = claims.exp {
            let now = chrono::Utc::now().timestamp();
            if exp < now {
                return Err(AuthError::Expired { expired_at: exp });
            }
        }

        Ok(claims)
    }

    /// Mint a signed token for the given claims.
    ///
    /// Token issuance belongs to the external identity service; this helper
    /// exists for tests and local development tooling.
    #[must_use]
    pub fn issue(&self, claims: &SessionClaims) -> String {
        let header = B64.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        // SessionClaims serialization cannot fail: all fields are plain data.
        let payload = B64.encode(serde_json::to_vec(claims).unwrap_or_default());
        let signature = B64.encode(self.sign(&header, &payload));
        format!("{header}.{payload}.{signature}")
    }

    fn sign(&self, header_b64: &str, payload_b64: &str) -> Vec<u8> {
        // HMAC-SHA256 accepts any key length per RFC 2104, so new_from_slice
        // will never fail here.
        #[allow(clippy::unwrap_used)]
        let mut mac = HmacSha256::new_from_slice(&self.secret).unwrap();
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(payload_b64.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Derive the stable session identifier for a raw token.
///
/// Hex SHA-256: filesystem-safe, stable across calls, and does not leak the
/// credential into directory listings.
#[must_use]
pub fn derive_session_id(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn make_validator() -> TokenValidator {
        TokenValidator::new(b"test-secret".to_vec(), true)
    }

    fn claims_for(path: &str) -> SessionClaims {
        SessionClaims {
            path: path.to_owned(),
            exp: None,
            iat: None,
        }
    }

    #[test]
    fn issued_token_validates() {
        let validator = make_validator();
        let token = validator.issue(&claims_for("proj1/main"));

        let identity = validator.validate(Some(&token)).unwrap();
        match identity {
            Identity::Authorized {
                authorized_path, ..
            } => assert_eq!(authorized_path, "proj1/main"),
            Identity::Anonymous => panic!("expected authorized identity"),
        }
    }

    #[test]
    fn missing_credential_fails_when_required() {
        let validator = make_validator();
        let err = validator.validate(None).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredential));
    }

    #[test]
    fn missing_credential_is_anonymous_when_allowed() {
        let validator = TokenValidator::new(b"test-secret".to_vec(), false);
        let identity = validator.validate(None).unwrap();
        assert!(matches!(identity, Identity::Anonymous));
    }

    #[test]
    fn wrong_secret_is_bad_signature() {
        let issuer = TokenValidator::new(b"secret-a".to_vec(), true);
        let verifier = TokenValidator::new(b"secret-b".to_vec(), true);

        let token = issuer.issue(&claims_for("proj1/main"));
        let err = verifier.validate(Some(&token)).unwrap_err();
        assert!(matches!(err, AuthError::BadSignature));
    }

    #[test]
    fn tampered_payload_is_bad_signature() {
        let validator = make_validator();
        let token = validator.issue(&claims_for("proj1/main"));

        let forged_payload = B64.encode(br#"{"path":"proj2/secret"}"#);
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = &forged_payload;
        let forged = parts.join(".");

        let err = validator.validate(Some(&forged)).unwrap_err();
        assert!(matches!(err, AuthError::BadSignature));
    }

    #[test]
    fn two_part_token_is_malformed() {
        let validator = make_validator();
        let err = validator.validate(Some("not.a-jwt")).unwrap_err();
        assert!(matches!(err, AuthError::Malformed { .. }));
    }

    #[test]
    fn none_algorithm_is_rejected() {
        let validator = make_validator();
        let header = B64.encode(br#"{"alg":"none"}"#);
        let payload = B64.encode(br#"{"path":"proj1/main"}"#);
        let token = format!("{header}.{payload}.");

        let err = validator.validate(Some(&token)).unwrap_err();
        assert!(matches!(err, AuthError::Malformed { .. }));
    }

    #[test]
    fn expired_token_is_rejected() {
        let validator = make_validator();
        let token = validator.issue(&SessionClaims {
            path: "proj1/main".to_owned(),
            exp: Some(chrono::Utc::now().timestamp() - 60),
            iat: None,
        });

        let err = validator.validate(Some(&token)).unwrap_err();
        assert!(matches!(err, AuthError::Expired { .. }));
    }

    #[test]
    fn future_expiry_is_accepted() {
        let validator = make_validator();
        let token = validator.issue(&SessionClaims {
            path: "proj1/main".to_owned(),
            exp: Some(chrono::Utc::now().timestamp() + 3600),
            iat: None,
        });

        assert!(validator.validate(Some(&token)).is_ok());
    }

    #[test]
    fn session_id_is_stable_and_not_the_token() {
        let validator = make_validator();
        let token = validator.issue(&claims_for("proj1/main"));

        let a = derive_session_id(&token);
        let b = derive_session_id(&token);
        assert_eq!(a, b);
        assert_ne!(a, token);
        assert_eq!(a.len(), 64);
    }
}
