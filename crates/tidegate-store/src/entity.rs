//! Entity marker traits for the store families.
//!
//! A storage backend is generic over the entity types it persists. The
//! marker traits in this module declare which types belong to which store
//! family and which key type identifies their rows. Implementing a marker
//! is how a custom entity joins a family:
//!
//! ```ignore
//! use tidegate_store::TokenEntity;
//!
//! struct SessionToken {
//!     id: uuid::Uuid,
//!     // ...
//! }
//!
//! impl TokenEntity for SessionToken {
//!     type Key = uuid::Uuid;
//!
//!     fn key(&self) -> &Self::Key {
//!         &self.id
//!     }
//! }
//! ```
//!
//! The default models in [`crate::models`] implement the markers for any
//! valid key type.

use std::fmt::Debug;
use std::hash::Hash;

/// Key types usable as entity identifiers.
///
/// Implemented automatically for every type satisfying the bounds, which
/// covers `Uuid`, `String` and the integer types.
pub trait EntityKey: Clone + Debug + Eq + Hash + Send + Sync + 'static {}

impl<K> EntityKey for K where K: Clone + Debug + Eq + Hash + Send + Sync + 'static {}

/// Marker for entities persisted by the application store family.
///
/// Applications are the OAuth clients registered with the server. The
/// authorization and token store families reference an application entity
/// type as a companion, so the marker exists even though this crate does
/// not define an application store.
pub trait ApplicationEntity: Send + Sync + 'static {
    /// Key type identifying a stored application.
    type Key: EntityKey;

    /// The identifier of this entity instance.
    fn key(&self) -> &Self::Key;
}

/// Marker for entities persisted by the authorization store family.
pub trait AuthorizationEntity: Send + Sync + 'static {
    /// Key type identifying a stored authorization.
    type Key: EntityKey;

    /// The identifier of this entity instance.
    fn key(&self) -> &Self::Key;
}

/// Marker for entities persisted by the token store family.
pub trait TokenEntity: Send + Sync + 'static {
    /// Key type identifying a stored token.
    type Key: EntityKey;

    /// The identifier of this entity instance.
    fn key(&self) -> &Self::Key;
}
