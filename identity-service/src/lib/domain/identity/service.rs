use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::RegisterIdentityCommand;
use crate::domain::identity::models::Role;
use crate::domain::identity::models::UpdateIdentityCommand;
use crate::identity::ports::ExternalVerifier;
use crate::identity::ports::IdentityRepository;
use crate::identity::ports::IdentityServicePort;

/// Domain service implementation for identity operations.
///
/// Concrete implementation of IdentityServicePort with dependency injection.
pub struct IdentityService<IR, EV>
where
    IR: IdentityRepository,
    EV: ExternalVerifier,
{
    repository: Arc<IR>,
    external_verifier: Arc<EV>,
    password_hasher: auth::PasswordHasher,
}

impl<IR, EV> IdentityService<IR, EV>
where
    IR: IdentityRepository,
    EV: ExternalVerifier,
{
    /// Create a new identity service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Identity persistence implementation
    /// * `external_verifier` - External provider bridge implementation
    pub fn new(repository: Arc<IR>, external_verifier: Arc<EV>) -> Self {
        Self {
            repository,
            external_verifier,
            password_hasher: auth::PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl<IR, EV> IdentityServicePort for IdentityService<IR, EV>
where
    IR: IdentityRepository,
    EV: ExternalVerifier,
{
    async fn register(&self, command: RegisterIdentityCommand) -> Result<Identity, IdentityError> {
        let password_hash = self
            .password_hasher
            .hash(&command.password)
            .map_err(|e| IdentityError::Unknown(format!("Password hashing failed: {}", e)))?;

        let identity = Identity {
            id: IdentityId::new(),
            email: command.email,
            password_hash: Some(password_hash),
            role: Role::Standard,
            name: command.name,
            picture: command.picture,
            created_at: Utc::now(),
        };

        self.repository.create(identity).await
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let identity = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        // OAuth-only accounts have no hash and cannot log in with a password
        let stored_hash = identity
            .password_hash
            .as_deref()
            .ok_or(IdentityError::InvalidCredentials)?;

        if !self.password_hasher.verify(password, stored_hash) {
            return Err(IdentityError::InvalidCredentials);
        }

        Ok(identity)
    }

    async fn resolve(&self, email: &str) -> Result<Identity, IdentityError> {
        self.repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| IdentityError::NotFound(email.to_string()))
    }

    async fn signin_external(&self, provider_token: &str) -> Result<Identity, IdentityError> {
        let external = self.external_verifier.verify(provider_token).await?;

        let email = EmailAddress::new(external.email)?;

        if let Some(existing) = self.repository.find_by_email(email.as_str()).await? {
            return Ok(existing);
        }

        tracing::info!(email = %email, "Creating identity from external provider");

        let identity = Identity {
            id: IdentityId::new(),
            email,
            password_hash: None,
            role: Role::Standard,
            name: external.name,
            picture: external.picture,
            created_at: Utc::now(),
        };

        self.repository.create(identity).await
    }

    async fn update_identity(
        &self,
        id: &IdentityId,
        command: UpdateIdentityCommand,
    ) -> Result<Identity, IdentityError> {
        let mut identity = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(IdentityError::NotFound(id.to_string()))?;

        if let Some(new_name) = command.name {
            identity.name = new_name;
        }

        if let Some(new_email) = command.email {
            identity.email = new_email;
        }

        if let Some(new_picture) = command.picture {
            identity.picture = Some(new_picture);
        }

        if let Some(new_password) = command.password {
            identity.password_hash = Some(
                self.password_hasher
                    .hash(&new_password)
                    .map_err(|e| IdentityError::Unknown(format!("Password hashing failed: {}", e)))?,
            );
        }

        self.repository.update(identity).await
    }

    async fn delete_identity(&self, id: &IdentityId) -> Result<(), IdentityError> {
        self.repository.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::domain::identity::models::ExternalIdentity;

    // Define mocks in the test module using mockall
    mock! {
        pub TestIdentityRepository {}

        #[async_trait]
        impl IdentityRepository for TestIdentityRepository {
            async fn create(&self, identity: Identity) -> Result<Identity, IdentityError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, IdentityError>;
            async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, IdentityError>;
            async fn update(&self, identity: Identity) -> Result<Identity, IdentityError>;
            async fn delete(&self, id: &IdentityId) -> Result<(), IdentityError>;
        }
    }

    mock! {
        pub TestExternalVerifier {}

        #[async_trait]
        impl ExternalVerifier for TestExternalVerifier {
            async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityError>;
        }
    }

    fn local_identity(email: &str, password_hash: Option<String>) -> Identity {
        Identity {
            id: IdentityId::new(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash,
            role: Role::Standard,
            name: "Test Account".to_string(),
            picture: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut repository = MockTestIdentityRepository::new();
        let verifier = MockTestExternalVerifier::new();

        repository
            .expect_create()
            .withf(|identity| {
                identity.email.as_str() == "a@b.com"
                    && identity.role == Role::Standard
                    && identity
                        .password_hash
                        .as_deref()
                        .is_some_and(|h| h.starts_with("$argon2"))
            })
            .times(1)
            .returning(Ok);

        let service = IdentityService::new(Arc::new(repository), Arc::new(verifier));

        let command = RegisterIdentityCommand::new(
            "Alice".to_string(),
            EmailAddress::new("a@b.com".to_string()).unwrap(),
            "secret123".to_string(),
            None,
        );

        let identity = service.register(command).await.unwrap();
        assert_eq!(identity.email.as_str(), "a@b.com");
        assert_eq!(identity.role, Role::Standard);
        // Password is hashed with real Argon2
        assert!(identity.password_hash.unwrap().starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut repository = MockTestIdentityRepository::new();
        let verifier = MockTestExternalVerifier::new();

        repository.expect_create().times(1).returning(|identity| {
            Err(IdentityError::EmailAlreadyExists(
                identity.email.as_str().to_string(),
            ))
        });

        let service = IdentityService::new(Arc::new(repository), Arc::new(verifier));

        let command = RegisterIdentityCommand::new(
            "Alice".to_string(),
            EmailAddress::new("a@b.com".to_string()).unwrap(),
            "secret123".to_string(),
            None,
        );

        let result = service.register(command).await;
        assert!(matches!(
            result.unwrap_err(),
            IdentityError::EmailAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut repository = MockTestIdentityRepository::new();
        let verifier = MockTestExternalVerifier::new();

        let hash = auth::PasswordHasher::new().hash("secret123").unwrap();
        let identity = local_identity("a@b.com", Some(hash));
        let returned = identity.clone();

        repository
            .expect_find_by_email()
            .withf(|email| email == "a@b.com")
            .times(1)
            .returning(move |_| Ok(Some(returned.clone())));

        let service = IdentityService::new(Arc::new(repository), Arc::new(verifier));

        let authenticated = service.authenticate("a@b.com", "secret123").await.unwrap();
        assert_eq!(authenticated.id, identity.id);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password() {
        let mut repository = MockTestIdentityRepository::new();
        let verifier = MockTestExternalVerifier::new();

        let hash = auth::PasswordHasher::new().hash("secret123").unwrap();
        let identity = local_identity("a@b.com", Some(hash));

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(identity.clone())));

        let service = IdentityService::new(Arc::new(repository), Arc::new(verifier));

        let result = service.authenticate("a@b.com", "wrong_password").await;
        assert!(matches!(
            result.unwrap_err(),
            IdentityError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email_is_same_error() {
        let mut repository = MockTestIdentityRepository::new();
        let verifier = MockTestExternalVerifier::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = IdentityService::new(Arc::new(repository), Arc::new(verifier));

        // Same uniform error as a wrong password
        let result = service.authenticate("nobody@b.com", "whatever").await;
        assert!(matches!(
            result.unwrap_err(),
            IdentityError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_authenticate_external_only_account() {
        let mut repository = MockTestIdentityRepository::new();
        let verifier = MockTestExternalVerifier::new();

        let identity = local_identity("a@b.com", None);
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(identity.clone())));

        let service = IdentityService::new(Arc::new(repository), Arc::new(verifier));

        let result = service.authenticate("a@b.com", "anything").await;
        assert!(matches!(
            result.unwrap_err(),
            IdentityError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut repository = MockTestIdentityRepository::new();
        let verifier = MockTestExternalVerifier::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let service = IdentityService::new(Arc::new(repository), Arc::new(verifier));

        let result = service.resolve("ghost@b.com").await;
        assert!(matches!(result.unwrap_err(), IdentityError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_signin_external_creates_new_identity() {
        let mut repository = MockTestIdentityRepository::new();
        let mut verifier = MockTestExternalVerifier::new();

        verifier
            .expect_verify()
            .withf(|token| token == "provider-token")
            .times(1)
            .returning(|_| {
                Ok(ExternalIdentity {
                    subject: "google-oauth2|12345".to_string(),
                    email: "new@b.com".to_string(),
                    name: "New Person".to_string(),
                    picture: Some("https://example.com/p.jpg".to_string()),
                })
            });

        repository
            .expect_find_by_email()
            .withf(|email| email == "new@b.com")
            .times(1)
            .returning(|_| Ok(None));

        repository
            .expect_create()
            .withf(|identity| {
                identity.email.as_str() == "new@b.com"
                    && identity.password_hash.is_none()
                    && identity.role == Role::Standard
            })
            .times(1)
            .returning(Ok);

        let service = IdentityService::new(Arc::new(repository), Arc::new(verifier));

        let identity = service.signin_external("provider-token").await.unwrap();
        assert_eq!(identity.name, "New Person");
        assert!(identity.password_hash.is_none());
    }

    #[tokio::test]
    async fn test_signin_external_resolves_existing_identity() {
        let mut repository = MockTestIdentityRepository::new();
        let mut verifier = MockTestExternalVerifier::new();

        verifier.expect_verify().times(1).returning(|_| {
            Ok(ExternalIdentity {
                subject: "google-oauth2|12345".to_string(),
                email: "a@b.com".to_string(),
                name: "Alice".to_string(),
                picture: None,
            })
        });

        let existing = local_identity("a@b.com", None);
        let expected_id = existing.id;
        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));
        repository.expect_create().times(0);

        let service = IdentityService::new(Arc::new(repository), Arc::new(verifier));

        let identity = service.signin_external("provider-token").await.unwrap();
        assert_eq!(identity.id, expected_id);
    }

    #[tokio::test]
    async fn test_signin_external_provider_failure() {
        let repository = MockTestIdentityRepository::new();
        let mut verifier = MockTestExternalVerifier::new();

        verifier
            .expect_verify()
            .times(1)
            .returning(|_| Err(IdentityError::ExternalProvider("exchange failed".to_string())));

        let service = IdentityService::new(Arc::new(repository), Arc::new(verifier));

        let result = service.signin_external("bad-token").await;
        assert!(matches!(
            result.unwrap_err(),
            IdentityError::ExternalProvider(_)
        ));
    }

    #[tokio::test]
    async fn test_update_identity_rehashes_password() {
        let mut repository = MockTestIdentityRepository::new();
        let verifier = MockTestExternalVerifier::new();

        let identity = local_identity("a@b.com", Some("$argon2id$old".to_string()));
        let id = identity.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(identity.clone())));
        repository
            .expect_update()
            .withf(|identity| {
                identity.name == "Renamed"
                    && identity
                        .password_hash
                        .as_deref()
                        .is_some_and(|h| h.starts_with("$argon2") && !h.contains("old"))
            })
            .times(1)
            .returning(Ok);

        let service = IdentityService::new(Arc::new(repository), Arc::new(verifier));

        let command = UpdateIdentityCommand {
            name: Some("Renamed".to_string()),
            email: None,
            password: Some("new_password".to_string()),
            picture: None,
        };

        let updated = service.update_identity(&id, command).await.unwrap();
        assert_eq!(updated.name, "Renamed");
    }

    #[tokio::test]
    async fn test_delete_identity_not_found() {
        let mut repository = MockTestIdentityRepository::new();
        let verifier = MockTestExternalVerifier::new();

        repository
            .expect_delete()
            .times(1)
            .returning(|id| Err(IdentityError::NotFound(id.to_string())));

        let service = IdentityService::new(Arc::new(repository), Arc::new(verifier));

        let result = service.delete_identity(&IdentityId::new()).await;
        assert!(matches!(result.unwrap_err(), IdentityError::NotFound(_)));
    }
}
