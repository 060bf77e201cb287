use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use thiserror::Error;

use crate::claims::Claims;

/// Error type for token issuance.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),
}

/// Uniform verification failure.
///
/// Expired, tampered, and malformed tokens all collapse into this single
/// outcome; callers only observe valid or invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Token rejected")]
pub struct TokenRejected;

/// Signs claims into compact JWT strings.
///
/// Uses HS256 (HMAC with SHA-256).
pub struct TokenSigner {
    encoding_key: EncodingKey,
    algorithm: Algorithm,
}

impl TokenSigner {
    /// Create a signer from a secret key.
    ///
    /// The secret should be at least 256 bits (32 bytes) for HS256 and
    /// come from configuration, never from code.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a signed token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }
}

/// Validates signed tokens and returns their claims.
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenVerifier {
    /// Create a verifier from the secret key matching the signer.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Decode and validate a token.
    ///
    /// Checks the signature and structure, then re-checks expiry against
    /// the decoded `exp` claim on top of the library's own validation.
    /// A token is accepted while `now <= exp`.
    ///
    /// # Errors
    /// * `TokenRejected` - Signature invalid, structure malformed, or expired
    pub fn verify(&self, token: &str) -> Result<Claims, TokenRejected> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|_| TokenRejected)?;

        let claims = token_data.claims;
        if claims.is_expired(Utc::now().timestamp()) {
            return Err(TokenRejected);
        }

        Ok(claims)
    }
}

/// Issues and verifies both token classes.
///
/// Holds one signer/verifier pair per class. Access and refresh secrets
/// are distinct, so a token of one class can never verify as the other.
pub struct TokenAuthority {
    access_signer: TokenSigner,
    access_verifier: TokenVerifier,
    refresh_signer: TokenSigner,
    refresh_verifier: TokenVerifier,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenAuthority {
    /// Create a token authority.
    ///
    /// # Arguments
    /// * `access_secret` - Signing secret for access tokens
    /// * `refresh_secret` - Signing secret for refresh tokens
    /// * `access_ttl` - Access token lifetime (typically 30 minutes)
    /// * `refresh_ttl` - Refresh token lifetime (typically 7 days)
    pub fn new(
        access_secret: &[u8],
        refresh_secret: &[u8],
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            access_signer: TokenSigner::new(access_secret),
            access_verifier: TokenVerifier::new(access_secret),
            refresh_signer: TokenSigner::new(refresh_secret),
            refresh_verifier: TokenVerifier::new(refresh_secret),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issue a short-lived access token for `sub`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_access(&self, sub: &str, role: Option<&str>) -> Result<String, TokenError> {
        let claims = Claims::new(sub, role.map(str::to_string), self.access_ttl);
        self.access_signer.sign(&claims)
    }

    /// Issue a refresh token for `sub`, used solely to mint new access tokens.
    ///
    /// Refresh tokens are stateless: validity rests entirely on signature
    /// and expiry, there is no server-side revocation.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_refresh(&self, sub: &str, role: Option<&str>) -> Result<String, TokenError> {
        let claims = Claims::new(sub, role.map(str::to_string), self.refresh_ttl);
        self.refresh_signer.sign(&claims)
    }

    /// Verify an access token.
    ///
    /// # Errors
    /// * `TokenRejected` - Invalid, expired, or not an access token
    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenRejected> {
        self.access_verifier.verify(token)
    }

    /// Verify a refresh token.
    ///
    /// # Errors
    /// * `TokenRejected` - Invalid, expired, or not a refresh token
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenRejected> {
        self.refresh_verifier.verify(token)
    }

    /// Refresh token lifetime.
    ///
    /// The refresh cookie Max-Age is derived from this so the cookie and
    /// the token expiry share one source of truth.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}
