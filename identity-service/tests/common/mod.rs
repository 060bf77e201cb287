use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::TokenAuthority;
use chrono::Duration;
use identity_service::domain::identity::errors::IdentityError;
use identity_service::domain::identity::models::ExternalIdentity;
use identity_service::domain::identity::models::Identity;
use identity_service::domain::identity::models::IdentityId;
use identity_service::domain::identity::ports::ExternalVerifier;
use identity_service::domain::identity::ports::IdentityRepository;
use identity_service::domain::identity::service::IdentityService;
use identity_service::inbound::http::router::create_router;
use uuid::Uuid;

pub const ACCESS_SECRET: &[u8] = b"test-access-secret-at-least-32-bytes!";
pub const REFRESH_SECRET: &[u8] = b"test-refresh-secret-at-least-32-byte!";

/// Provider token the stub verifier accepts.
pub const VALID_PROVIDER_TOKEN: &str = "stub-google-id-token";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        let repository = Arc::new(InMemoryIdentityRepository::new());
        let external_verifier = Arc::new(StubExternalVerifier);
        let identity_service = Arc::new(IdentityService::new(repository, external_verifier));

        let tokens = Arc::new(TokenAuthority::new(
            ACCESS_SECRET,
            REFRESH_SECRET,
            Duration::minutes(30),
            Duration::days(7),
        ));

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let application = create_router(identity_service, tokens);
        tokio::spawn(async move {
            axum::serve(listener, application)
                .await
                .expect("Server failed");
        });

        let api_client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build api client");

        Self {
            address,
            api_client,
        }
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    pub fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.patch(format!("{}{}", self.address, path))
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(format!("{}{}", self.address, path))
    }
}

/// In-memory credential store with the same single-row atomicity as the
/// Postgres adapter.
pub struct InMemoryIdentityRepository {
    identities: Mutex<HashMap<Uuid, Identity>>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self {
            identities: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn create(&self, identity: Identity) -> Result<Identity, IdentityError> {
        let mut identities = self.identities.lock().unwrap();

        if identities
            .values()
            .any(|existing| existing.email == identity.email)
        {
            return Err(IdentityError::EmailAlreadyExists(
                identity.email.as_str().to_string(),
            ));
        }

        identities.insert(identity.id.0, identity.clone());
        Ok(identity)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, IdentityError> {
        let identities = self.identities.lock().unwrap();
        Ok(identities
            .values()
            .find(|identity| identity.email.as_str() == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, IdentityError> {
        let identities = self.identities.lock().unwrap();
        Ok(identities.get(&id.0).cloned())
    }

    async fn update(&self, identity: Identity) -> Result<Identity, IdentityError> {
        let mut identities = self.identities.lock().unwrap();

        if !identities.contains_key(&identity.id.0) {
            return Err(IdentityError::NotFound(identity.id.to_string()));
        }

        if identities
            .values()
            .any(|existing| existing.id != identity.id && existing.email == identity.email)
        {
            return Err(IdentityError::EmailAlreadyExists(
                identity.email.as_str().to_string(),
            ));
        }

        identities.insert(identity.id.0, identity.clone());
        Ok(identity)
    }

    async fn delete(&self, id: &IdentityId) -> Result<(), IdentityError> {
        let mut identities = self.identities.lock().unwrap();
        identities
            .remove(&id.0)
            .map(|_| ())
            .ok_or(IdentityError::NotFound(id.to_string()))
    }
}

/// Stub provider bridge: one well-known token verifies, everything else
/// fails the exchange.
pub struct StubExternalVerifier;

#[async_trait]
impl ExternalVerifier for StubExternalVerifier {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityError> {
        if token == VALID_PROVIDER_TOKEN {
            Ok(ExternalIdentity {
                subject: "google-oauth2|1234567890".to_string(),
                email: "oauth.user@example.com".to_string(),
                name: "OAuth User".to_string(),
                picture: Some("https://example.com/avatar.png".to_string()),
            })
        } else {
            Err(IdentityError::ExternalProvider(
                "Token was not accepted by provider".to_string(),
            ))
        }
    }
}
