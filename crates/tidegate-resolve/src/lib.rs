//! # tidegate-resolve
//!
//! Store resolution and service registry for the Tidegate authorization
//! server.
//!
//! This crate turns the entity types of `tidegate-store` into live store
//! instances. Storage backends register their concrete stores with a
//! [`ServiceRegistry`] at startup; at runtime the resolvers map any
//! entity type to the store serving it:
//!
//! - [`AuthorizationStoreResolver`] resolves authorization stores; the
//!   derivation also depends on the configured default application and
//!   token entity types ([`StoreOptions`]).
//! - [`TokenStoreResolver`] resolves token stores from the entity type
//!   alone.
//!
//! Resolution order for an entity type:
//!
//! 1. a store registered directly under the capability trait object wins
//!    (application override);
//! 2. otherwise the concrete store binding is derived from the binding
//!    table and memoized per entity type;
//! 3. the bound concrete store is fetched from the registry, being
//!    constructed on first use if it was registered lazily.
//!
//! Both failure modes - an entity type no store family knows, and a bound
//! store missing from the registry - are startup wiring defects surfaced
//! as [`ResolveError`] values.
//!
//! ## Example
//!
//! ```ignore
//! use tidegate_resolve::ResolverBuilder;
//! use tidegate_store::{Application, Authorization, Token};
//!
//! let resolvers = ResolverBuilder::new()
//!     .with_authorization_store::<Authorization, Application, Token, _, _>(|_| {
//!         MemoryAuthorizationStore::new()
//!     })
//!     .with_token_store::<Token, _, _>(|_| MemoryTokenStore::new())
//!     .build();
//!
//! let tokens = resolvers.tokens().get::<Token>()?;
//! ```

mod bindings;
mod builder;
mod error;
mod options;
mod registry;
mod resolver;
mod types;

pub use bindings::{AuthorizationBinding, AuthorizationBindings, TokenBinding, TokenBindings};
pub use builder::{ResolverBuilder, StoreResolvers};
pub use error::{ErrorCategory, ResolveError};
pub use options::{StoreOptions, StoreOptionsHandle};
pub use registry::ServiceRegistry;
pub use resolver::{AuthorizationStoreResolver, TokenStoreResolver};
pub use types::TypeTag;

/// Type alias for a resolution result.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tidegate_resolve::prelude::*;
/// ```
pub mod prelude {
    pub use crate::ResolveResult;
    pub use crate::bindings::{
        AuthorizationBinding, AuthorizationBindings, TokenBinding, TokenBindings,
    };
    pub use crate::builder::{ResolverBuilder, StoreResolvers};
    pub use crate::error::{ErrorCategory, ResolveError};
    pub use crate::options::{StoreOptions, StoreOptionsHandle};
    pub use crate::registry::ServiceRegistry;
    pub use crate::resolver::{AuthorizationStoreResolver, TokenStoreResolver};
    pub use crate::types::TypeTag;
}
