//! Startup wiring for the resolution layer.
//!
//! The builder assembles the service registry, the binding tables and the
//! two resolvers. Storage backend crates expose helpers that call into it
//! for their concrete store types; applications call it directly when
//! wiring custom entities.

use std::sync::Arc;

use tidegate_store::{
    ApplicationEntity, AuthorizationEntity, AuthorizationStore, DynAuthorizationStore,
    DynTokenStore, TokenEntity, TokenStore,
};

use crate::bindings::{AuthorizationBindings, TokenBindings};
use crate::options::{StoreOptions, StoreOptionsHandle};
use crate::registry::ServiceRegistry;
use crate::resolver::{AuthorizationStoreResolver, TokenStoreResolver};

/// Builder assembling the service registry, binding tables and resolvers.
///
/// ```ignore
/// use tidegate_resolve::ResolverBuilder;
/// use tidegate_store::Token;
///
/// let resolvers = ResolverBuilder::new()
///     .with_token_store::<Token, MemoryTokenStore<Token>, _>(|_| MemoryTokenStore::new())
///     .build();
///
/// let store = resolvers.tokens().get::<Token>()?;
/// ```
pub struct ResolverBuilder {
    registry: Arc<ServiceRegistry>,
    authorizations: Arc<AuthorizationBindings>,
    tokens: Arc<TokenBindings>,
    options: StoreOptions,
}

impl ResolverBuilder {
    /// Create a builder with default options and an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ServiceRegistry::new()),
            authorizations: Arc::new(AuthorizationBindings::new()),
            tokens: Arc::new(TokenBindings::new()),
            options: StoreOptions::default(),
        }
    }

    /// Replace the default entity type options.
    #[must_use]
    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Register a concrete authorization store for entity `A` under
    /// companions `App` and `Tok`.
    ///
    /// The store is constructed lazily on first resolution and retained
    /// in the registry. The binding is only derived while `App` and `Tok`
    /// are the configured defaults.
    #[must_use]
    pub fn with_authorization_store<A, App, Tok, S, F>(self, factory: F) -> Self
    where
        A: AuthorizationEntity,
        App: ApplicationEntity,
        Tok: TokenEntity,
        S: AuthorizationStore<A> + Send + Sync + 'static,
        F: Fn(&ServiceRegistry) -> S + Send + Sync + 'static,
    {
        self.authorizations.bind::<A, App, Tok, S>();
        self.registry.register_factory(factory);
        self
    }

    /// Register a concrete token store for entity `T`.
    ///
    /// The store is constructed lazily on first resolution and retained
    /// in the registry.
    #[must_use]
    pub fn with_token_store<T, S, F>(self, factory: F) -> Self
    where
        T: TokenEntity,
        S: TokenStore<T> + Send + Sync + 'static,
        F: Fn(&ServiceRegistry) -> S + Send + Sync + 'static,
    {
        self.tokens.bind::<T, S>();
        self.registry.register_factory(factory);
        self
    }

    /// Register a ready store directly under the capability type for `A`.
    ///
    /// Overrides win over derivation: the resolver returns this instance
    /// without consulting the binding table.
    #[must_use]
    pub fn with_authorization_override<A: AuthorizationEntity>(
        self,
        store: impl AuthorizationStore<A> + 'static,
    ) -> Self {
        let store: DynAuthorizationStore<A> = Arc::new(store);
        self.registry.register::<dyn AuthorizationStore<A>>(store);
        self
    }

    /// Register a ready store directly under the capability type for `T`.
    ///
    /// Overrides win over derivation: the resolver returns this instance
    /// without consulting the binding table.
    #[must_use]
    pub fn with_token_override<T: TokenEntity>(
        self,
        store: impl TokenStore<T> + 'static,
    ) -> Self {
        let store: DynTokenStore<T> = Arc::new(store);
        self.registry.register::<dyn TokenStore<T>>(store);
        self
    }

    /// Register an auxiliary service that store factories may depend on,
    /// such as a connection pool.
    #[must_use]
    pub fn with_service<S: Send + Sync + 'static>(self, service: S) -> Self {
        self.registry.register(Arc::new(service));
        self
    }

    /// Assemble the resolvers.
    #[must_use]
    pub fn build(self) -> StoreResolvers {
        let options = StoreOptionsHandle::new(self.options);
        StoreResolvers {
            authorizations: AuthorizationStoreResolver::new(
                self.authorizations,
                options.clone(),
                Arc::clone(&self.registry),
            ),
            tokens: TokenStoreResolver::new(self.tokens, Arc::clone(&self.registry)),
            registry: self.registry,
            options,
        }
    }
}

impl Default for ResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The assembled resolution layer.
///
/// Holds both resolvers plus the shared registry and options handle.
/// Intended to live for the process lifetime, typically behind an `Arc`.
pub struct StoreResolvers {
    authorizations: AuthorizationStoreResolver,
    tokens: TokenStoreResolver,
    registry: Arc<ServiceRegistry>,
    options: StoreOptionsHandle,
}

impl StoreResolvers {
    /// The authorization store resolver.
    #[must_use]
    pub fn authorizations(&self) -> &AuthorizationStoreResolver {
        &self.authorizations
    }

    /// The token store resolver.
    #[must_use]
    pub fn tokens(&self) -> &TokenStoreResolver {
        &self.tokens
    }

    /// The shared service registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ServiceRegistry> {
        &self.registry
    }

    /// The shared options handle; replacing its snapshot affects entity
    /// types that have not been resolved yet.
    #[must_use]
    pub fn options(&self) -> &StoreOptionsHandle {
        &self.options
    }
}

impl std::fmt::Debug for StoreResolvers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreResolvers")
            .field("authorizations", &self.authorizations)
            .field("tokens", &self.tokens)
            .field("registry", &self.registry)
            .finish()
    }
}
