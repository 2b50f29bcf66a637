//! Entity-to-store binding tables.
//!
//! Without runtime reflection the mapping from an entity type to the
//! concrete store serving it has to be declared up front: binding a store
//! records, per entity type, which concrete service type to fetch from
//! the registry and how to widen it to the capability trait object.
//! Derivation then reduces to a table lookup.
//!
//! The authorization family is keyed by the (entity, application, token)
//! type triple: the store built for an authorization entity also depends
//! on the companion application and token entity types it joins against.
//! The token family is a single hierarchy and keyed by the entity type
//! alone.

use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;

use tidegate_store::{
    ApplicationEntity, AuthorizationEntity, AuthorizationStore, DynAuthorizationStore,
    DynTokenStore, TokenEntity, TokenStore,
};

use crate::ResolveResult;
use crate::registry::ServiceRegistry;
use crate::types::TypeTag;

type FetchFn<S> = Arc<dyn Fn(&ServiceRegistry) -> ResolveResult<S> + Send + Sync>;

// =============================================================================
// Authorization Bindings
// =============================================================================

/// Derived binding for one authorization entity type.
pub struct AuthorizationBinding<A: AuthorizationEntity> {
    store: TypeTag,
    key: TypeTag,
    fetch: FetchFn<DynAuthorizationStore<A>>,
}

impl<A: AuthorizationEntity> AuthorizationBinding<A> {
    /// The concrete store service type this binding resolves to.
    #[must_use]
    pub fn store(&self) -> TypeTag {
        self.store
    }

    /// The key type extracted from the entity.
    #[must_use]
    pub fn key(&self) -> TypeTag {
        self.key
    }

    /// Fetch the store behind this binding from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ResolveError::MissingRegistration`] if the bound
    /// concrete store was never registered.
    pub fn resolve(&self, registry: &ServiceRegistry) -> ResolveResult<DynAuthorizationStore<A>> {
        (self.fetch)(registry)
    }
}

/// Bindings for the authorization store family.
#[derive(Default)]
pub struct AuthorizationBindings {
    entries: DashMap<(TypeId, TypeId, TypeId), Arc<dyn Any + Send + Sync>>,
}

impl AuthorizationBindings {
    /// Create an empty binding table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Bind entity `A`, under companions `App` and `Tok`, to the concrete
    /// store `S`.
    ///
    /// Replaces any previous binding for the same triple. The store itself
    /// must be registered with the service registry separately.
    pub fn bind<A, App, Tok, S>(&self)
    where
        A: AuthorizationEntity,
        App: ApplicationEntity,
        Tok: TokenEntity,
        S: AuthorizationStore<A> + Send + Sync + 'static,
    {
        let binding = AuthorizationBinding::<A> {
            store: TypeTag::of::<S>(),
            key: TypeTag::of::<A::Key>(),
            fetch: Arc::new(|registry| {
                let store: DynAuthorizationStore<A> = registry.get_required::<S>()?;
                Ok(store)
            }),
        };
        let erased: Arc<dyn Any + Send + Sync> = Arc::new(binding);
        self.entries.insert(
            (TypeId::of::<A>(), TypeId::of::<App>(), TypeId::of::<Tok>()),
            erased,
        );
    }

    /// Look up the binding for entity `A` under the given companion
    /// defaults.
    #[must_use]
    pub fn find<A: AuthorizationEntity>(
        &self,
        application: TypeTag,
        token: TypeTag,
    ) -> Option<Arc<AuthorizationBinding<A>>> {
        let key = (TypeId::of::<A>(), application.id(), token.id());
        let erased = self.entries.get(&key)?.value().clone();
        erased.downcast::<AuthorizationBinding<A>>().ok()
    }

    /// Number of registered bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no bindings are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Token Bindings
// =============================================================================

/// Derived binding for one token entity type.
pub struct TokenBinding<T: TokenEntity> {
    store: TypeTag,
    key: TypeTag,
    fetch: FetchFn<DynTokenStore<T>>,
}

impl<T: TokenEntity> TokenBinding<T> {
    /// The concrete store service type this binding resolves to.
    #[must_use]
    pub fn store(&self) -> TypeTag {
        self.store
    }

    /// The key type extracted from the entity.
    #[must_use]
    pub fn key(&self) -> TypeTag {
        self.key
    }

    /// Fetch the store behind this binding from the registry.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ResolveError::MissingRegistration`] if the bound
    /// concrete store was never registered.
    pub fn resolve(&self, registry: &ServiceRegistry) -> ResolveResult<DynTokenStore<T>> {
        (self.fetch)(registry)
    }
}

/// Bindings for the token store family.
#[derive(Default)]
pub struct TokenBindings {
    entries: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl TokenBindings {
    /// Create an empty binding table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Bind entity `T` to the concrete store `S`.
    ///
    /// Replaces any previous binding for `T`. The store itself must be
    /// registered with the service registry separately.
    pub fn bind<T, S>(&self)
    where
        T: TokenEntity,
        S: TokenStore<T> + Send + Sync + 'static,
    {
        let binding = TokenBinding::<T> {
            store: TypeTag::of::<S>(),
            key: TypeTag::of::<T::Key>(),
            fetch: Arc::new(|registry| {
                let store: DynTokenStore<T> = registry.get_required::<S>()?;
                Ok(store)
            }),
        };
        let erased: Arc<dyn Any + Send + Sync> = Arc::new(binding);
        self.entries.insert(TypeId::of::<T>(), erased);
    }

    /// Look up the binding for entity `T`.
    #[must_use]
    pub fn find<T: TokenEntity>(&self) -> Option<Arc<TokenBinding<T>>> {
        let erased = self.entries.get(&TypeId::of::<T>())?.value().clone();
        erased.downcast::<TokenBinding<T>>().ok()
    }

    /// Number of registered bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no bindings are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
