//! Authorization store resolution.

use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

use dashmap::DashMap;

use tidegate_store::{AuthorizationEntity, AuthorizationStore, DynAuthorizationStore};

use crate::ResolveResult;
use crate::bindings::{AuthorizationBinding, AuthorizationBindings};
use crate::error::ResolveError;
use crate::options::StoreOptionsHandle;
use crate::registry::ServiceRegistry;

/// Resolves a store for any authorization entity type.
///
/// Derivation consults the options snapshot for the default application
/// and token entity types, so which concrete store serves an entity can
/// depend on configuration, not on the entity type alone. The derived
/// binding is memoized per entity type and never invalidated.
pub struct AuthorizationStoreResolver {
    cache: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    bindings: Arc<AuthorizationBindings>,
    options: StoreOptionsHandle,
    registry: Arc<ServiceRegistry>,
}

impl AuthorizationStoreResolver {
    /// Create a resolver over the given bindings, options and registry.
    #[must_use]
    pub fn new(
        bindings: Arc<AuthorizationBindings>,
        options: StoreOptionsHandle,
        registry: Arc<ServiceRegistry>,
    ) -> Self {
        Self {
            cache: DashMap::new(),
            bindings,
            options,
            registry,
        }
    }

    /// Return a store serving the authorization entity type `A`.
    ///
    /// A store registered directly under `dyn AuthorizationStore<A>` is
    /// returned as-is, bypassing derivation entirely.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::IncompatibleEntity`] if `A` is not bound to
    /// a store under the configured default entity types, and
    /// [`ResolveError::MissingRegistration`] if the bound concrete store
    /// is absent from the service registry. Both indicate startup wiring
    /// defects and are not retryable.
    pub fn get<A: AuthorizationEntity>(&self) -> ResolveResult<DynAuthorizationStore<A>> {
        if let Some(store) = self.registry.try_get::<dyn AuthorizationStore<A>>() {
            return Ok(store);
        }

        let binding = self.binding::<A>()?;
        binding.resolve(&self.registry)
    }

    /// Number of memoized bindings.
    #[must_use]
    pub fn cached_bindings(&self) -> usize {
        self.cache.len()
    }

    fn binding<A: AuthorizationEntity>(&self) -> ResolveResult<Arc<AuthorizationBinding<A>>> {
        let key = TypeId::of::<A>();
        if let Some(hit) = self.cache.get(&key) {
            if let Ok(binding) = hit.value().clone().downcast::<AuthorizationBinding<A>>() {
                return Ok(binding);
            }
        }

        let derived = self.derive::<A>()?;
        // First writer wins; a caller that lost the race adopts the
        // retained binding.
        let retained = self
            .cache
            .entry(key)
            .or_insert_with(|| {
                let erased: Arc<dyn Any + Send + Sync> = derived.clone();
                erased
            })
            .clone();
        // The entry is keyed by `A`, so the retained value is always an
        // `AuthorizationBinding<A>`.
        Ok(retained
            .downcast::<AuthorizationBinding<A>>()
            .unwrap_or(derived))
    }

    fn derive<A: AuthorizationEntity>(&self) -> ResolveResult<Arc<AuthorizationBinding<A>>> {
        let options = self.options.current();
        let binding = self
            .bindings
            .find::<A>(options.default_application(), options.default_token())
            .ok_or_else(|| ResolveError::incompatible_entity(type_name::<A>(), "authorization"))?;
        tracing::debug!(
            entity = type_name::<A>(),
            store = binding.store().name(),
            key = binding.key().name(),
            "derived authorization store binding"
        );
        Ok(binding)
    }
}

impl std::fmt::Debug for AuthorizationStoreResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationStoreResolver")
            .field("cached_bindings", &self.cache.len())
            .field("bindings", &self.bindings.len())
            .finish()
    }
}
