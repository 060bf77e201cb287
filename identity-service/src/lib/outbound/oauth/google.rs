use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::ExternalIdentity;
use crate::domain::identity::ports::ExternalVerifier;

/// Google implementation of the external identity bridge.
///
/// Exchanges an ID token for verified claims via the tokeninfo endpoint
/// and checks the token was minted for this application (`aud`).
pub struct GoogleVerifier {
    http: reqwest::Client,
    client_id: String,
    tokeninfo_url: String,
}

impl GoogleVerifier {
    /// Create a verifier.
    ///
    /// # Arguments
    /// * `client_id` - OAuth client id the token audience must match
    /// * `tokeninfo_url` - Provider verification endpoint
    pub fn new(client_id: String, tokeninfo_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            tokeninfo_url,
        }
    }
}

/// Fields of the tokeninfo response this service consumes.
#[derive(Debug, Deserialize)]
struct TokenInfoResponse {
    sub: String,
    aud: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

#[async_trait]
impl ExternalVerifier for GoogleVerifier {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityError> {
        let response = self
            .http
            .get(&self.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| IdentityError::ExternalProvider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::ExternalProvider(format!(
                "Token verification returned {}",
                response.status()
            )));
        }

        let info: TokenInfoResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::ExternalProvider(e.to_string()))?;

        if info.aud != self.client_id {
            tracing::warn!(aud = %info.aud, "ID token audience mismatch");
            return Err(IdentityError::ExternalProvider(
                "ID token audience mismatch".to_string(),
            ));
        }

        Ok(ExternalIdentity {
            subject: info.sub,
            name: info.name.unwrap_or_else(|| info.email.clone()),
            email: info.email,
            picture: info.picture,
        })
    }
}
