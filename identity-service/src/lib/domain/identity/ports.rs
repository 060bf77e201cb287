use async_trait::async_trait;

use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::ExternalIdentity;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::RegisterIdentityCommand;
use crate::domain::identity::models::UpdateIdentityCommand;

/// Port for identity domain service operations.
#[async_trait]
pub trait IdentityServicePort: Send + Sync + 'static {
    /// Register a new local account.
    ///
    /// # Arguments
    /// * `command` - Validated command with name, email, password, picture
    ///
    /// # Returns
    /// Created identity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterIdentityCommand) -> Result<Identity, IdentityError>;

    /// Verify credentials and return the matching identity.
    ///
    /// Unknown email, wrong password, and accounts without a stored
    /// password all resolve to `InvalidCredentials` so callers cannot
    /// enumerate registered addresses.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Credentials were not accepted
    /// * `DatabaseError` - Database operation failed
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;

    /// Load the identity a verified token subject refers to.
    ///
    /// # Errors
    /// * `NotFound` - Subject resolves to no record
    /// * `DatabaseError` - Database operation failed
    async fn resolve(&self, email: &str) -> Result<Identity, IdentityError>;

    /// Sign in through the external OAuth bridge.
    ///
    /// Verifies the provider token, then resolves the existing identity
    /// by email or creates a new password-less one.
    ///
    /// # Errors
    /// * `ExternalProvider` - Provider exchange failed
    /// * `InvalidEmail` - Provider returned an unusable email
    /// * `DatabaseError` - Database operation failed
    async fn signin_external(&self, provider_token: &str) -> Result<Identity, IdentityError>;

    /// Update existing identity with optional fields.
    ///
    /// # Errors
    /// * `NotFound` - Identity does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update_identity(
        &self,
        id: &IdentityId,
        command: UpdateIdentityCommand,
    ) -> Result<Identity, IdentityError>;

    /// Delete existing identity.
    ///
    /// # Errors
    /// * `NotFound` - Identity does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_identity(&self, id: &IdentityId) -> Result<(), IdentityError>;
}

/// Persistence operations for the identity aggregate.
///
/// Every operation is a single atomic row access; no multi-row
/// transaction spans the store.
#[async_trait]
pub trait IdentityRepository: Send + Sync + 'static {
    /// Persist new identity to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, identity: Identity) -> Result<Identity, IdentityError>;

    /// Retrieve identity by email address.
    ///
    /// # Returns
    /// Optional identity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, IdentityError>;

    /// Retrieve identity by identifier.
    ///
    /// # Returns
    /// Optional identity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &IdentityId) -> Result<Option<Identity>, IdentityError>;

    /// Update existing identity in storage.
    ///
    /// # Errors
    /// * `NotFound` - Identity does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, identity: Identity) -> Result<Identity, IdentityError>;

    /// Remove identity from storage.
    ///
    /// # Errors
    /// * `NotFound` - Identity does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &IdentityId) -> Result<(), IdentityError>;
}

/// Proof-of-identity delegation to a third-party provider.
///
/// Isolates provider-specific protocol detail from local session
/// issuance; implementations exchange the provider token for verified
/// claims and nothing else.
#[async_trait]
pub trait ExternalVerifier: Send + Sync + 'static {
    /// Verify a provider token and return the mapped claims.
    ///
    /// # Errors
    /// * `ExternalProvider` - Exchange failed or the token was not accepted
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, IdentityError>;
}
