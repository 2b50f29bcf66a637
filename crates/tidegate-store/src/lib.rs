//! # tidegate-store
//!
//! Storage abstraction layer for the Tidegate authorization server.
//!
//! This crate defines the capability traits and entity types that all
//! storage backends must implement. It does not contain any backend
//! implementations - those are provided by separate crates.
//!
//! ## Overview
//!
//! Persistence in Tidegate is organized around *store families*. A family
//! groups the entities served by one kind of store:
//!
//! - [`AuthorizationStore`] persists authorization entities
//! - [`TokenStore`] persists token entities
//!
//! Each capability trait is generic over the entity type it serves, and an
//! entity joins a family by implementing the matching marker trait
//! ([`AuthorizationEntity`], [`TokenEntity`]). The crate ships Uuid-keyed
//! default models ([`Authorization`], [`Token`], [`Application`]) so that
//! applications without custom entities need no extra type definitions.
//!
//! ## Example
//!
//! ```ignore
//! use tidegate_store::{StoreResult, Token, TokenStore};
//!
//! async fn redeem(store: &dyn TokenStore<Token>, reference_id: &str) -> StoreResult<()> {
//!     if let Some(mut token) = store.find_by_reference_id(reference_id).await? {
//!         token.status = tidegate_store::statuses::REDEEMED.to_string();
//!         store.update(&token).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Storage Backends
//!
//! To implement a storage backend, implement the capability traits for the
//! entity types the backend supports:
//!
//! ```ignore
//! use async_trait::async_trait;
//! use tidegate_store::{StoreResult, Token, TokenStore};
//!
//! struct MyTokenStore {
//!     // ...
//! }
//!
//! #[async_trait]
//! impl TokenStore<Token> for MyTokenStore {
//!     async fn find_by_id(&self, id: &uuid::Uuid) -> StoreResult<Option<Token>> {
//!         // Implementation
//!     }
//!     // ... other methods
//! }
//! ```

mod entity;
mod error;
mod models;
mod traits;

pub use entity::{ApplicationEntity, AuthorizationEntity, EntityKey, TokenEntity};
pub use error::{ErrorCategory, StoreError};
pub use models::{Application, Authorization, Token, authorization_types, statuses, token_types};
pub use traits::{AuthorizationStore, TokenStore};

/// Type alias for a store result.
pub type StoreResult<T> = Result<T, StoreError>;

/// Type alias for a shared authorization store trait object.
pub type DynAuthorizationStore<A> = std::sync::Arc<dyn AuthorizationStore<A>>;

/// Type alias for a shared token store trait object.
pub type DynTokenStore<T> = std::sync::Arc<dyn TokenStore<T>>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tidegate_store::prelude::*;
/// ```
pub mod prelude {
    pub use crate::entity::{ApplicationEntity, AuthorizationEntity, EntityKey, TokenEntity};
    pub use crate::error::{ErrorCategory, StoreError};
    pub use crate::models::{Application, Authorization, Token};
    pub use crate::traits::{AuthorizationStore, TokenStore};
    pub use crate::{DynAuthorizationStore, DynTokenStore, StoreResult};
}
