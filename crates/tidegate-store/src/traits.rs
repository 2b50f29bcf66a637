//! Capability traits implemented by storage backends.
//!
//! Each trait is generic over the entity type it serves; the entity's
//! marker trait supplies the key type. Implementations handle the actual
//! database operations and are registered with the resolution layer so
//! callers can obtain them by entity type alone.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::StoreResult;
use crate::entity::{AuthorizationEntity, TokenEntity};

// =============================================================================
// Authorization Store
// =============================================================================

/// Storage operations for authorization entities.
///
/// An authorization groups the tokens issued for one consent decision.
/// Implementations persist entities of type `A`; the key type comes from
/// the entity's [`AuthorizationEntity`] implementation.
#[async_trait]
pub trait AuthorizationStore<A: AuthorizationEntity>: Send + Sync {
    /// Find an authorization by its identifier.
    ///
    /// Returns `None` if no authorization with this identifier exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    async fn find_by_id(&self, id: &A::Key) -> StoreResult<Option<A>>;

    /// List the authorizations granted by a subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    async fn find_by_subject(&self, subject: &str) -> StoreResult<Vec<A>>;

    /// Create a new authorization.
    ///
    /// # Errors
    ///
    /// Returns an error if an authorization with the same identifier
    /// already exists or the store operation fails.
    async fn create(&self, authorization: &A) -> StoreResult<()>;

    /// Update an existing authorization.
    ///
    /// # Errors
    ///
    /// Returns an error if the authorization does not exist, was modified
    /// concurrently, or the store operation fails.
    async fn update(&self, authorization: &A) -> StoreResult<()>;

    /// Delete an authorization.
    ///
    /// # Errors
    ///
    /// Returns an error if the authorization does not exist or the store
    /// operation fails.
    async fn delete(&self, id: &A::Key) -> StoreResult<()>;

    /// Count the stored authorizations.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    async fn count(&self) -> StoreResult<u64>;

    /// Remove authorizations that are no longer valid and were created
    /// before `threshold`. Returns the number of removed rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    async fn prune(&self, threshold: OffsetDateTime) -> StoreResult<u64>;
}

// =============================================================================
// Token Store
// =============================================================================

/// Storage operations for token entities.
#[async_trait]
pub trait TokenStore<T: TokenEntity>: Send + Sync {
    /// Find a token by its identifier.
    ///
    /// Returns `None` if no token with this identifier exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    async fn find_by_id(&self, id: &T::Key) -> StoreResult<Option<T>>;

    /// Find a token by its reference identifier.
    ///
    /// Reference identifiers stand in for the user-visible token value
    /// when the payload is stored server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    async fn find_by_reference_id(&self, reference_id: &str) -> StoreResult<Option<T>>;

    /// List the tokens issued to a subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    async fn find_by_subject(&self, subject: &str) -> StoreResult<Vec<T>>;

    /// Create a new token.
    ///
    /// # Errors
    ///
    /// Returns an error if a token with the same identifier already
    /// exists or the store operation fails.
    async fn create(&self, token: &T) -> StoreResult<()>;

    /// Update an existing token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token does not exist, was modified
    /// concurrently, or the store operation fails.
    async fn update(&self, token: &T) -> StoreResult<()>;

    /// Delete a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token does not exist or the store
    /// operation fails.
    async fn delete(&self, id: &T::Key) -> StoreResult<()>;

    /// Count the stored tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    async fn count(&self) -> StoreResult<u64>;

    /// Remove tokens that are no longer valid and were created before
    /// `threshold`. Returns the number of removed rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails.
    async fn prune(&self, threshold: OffsetDateTime) -> StoreResult<u64>;
}

impl<A: AuthorizationEntity> std::fmt::Debug for dyn AuthorizationStore<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn AuthorizationStore")
    }
}

impl<T: TokenEntity> std::fmt::Debug for dyn TokenStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn TokenStore")
    }
}
