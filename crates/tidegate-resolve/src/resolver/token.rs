//! Token store resolution.

use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

use dashmap::DashMap;

use tidegate_store::{DynTokenStore, TokenEntity, TokenStore};

use crate::ResolveResult;
use crate::bindings::{TokenBinding, TokenBindings};
use crate::error::ResolveError;
use crate::registry::ServiceRegistry;

/// Resolves a store for any token entity type.
///
/// The token family is a single hierarchy, so derivation depends on the
/// entity type alone. The derived binding is memoized per entity type and
/// never invalidated.
pub struct TokenStoreResolver {
    cache: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    bindings: Arc<TokenBindings>,
    registry: Arc<ServiceRegistry>,
}

impl TokenStoreResolver {
    /// Create a resolver over the given bindings and registry.
    #[must_use]
    pub fn new(bindings: Arc<TokenBindings>, registry: Arc<ServiceRegistry>) -> Self {
        Self {
            cache: DashMap::new(),
            bindings,
            registry,
        }
    }

    /// Return a store serving the token entity type `T`.
    ///
    /// A store registered directly under `dyn TokenStore<T>` is returned
    /// as-is, bypassing derivation entirely.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::IncompatibleEntity`] if `T` is not bound to
    /// a store, and [`ResolveError::MissingRegistration`] if the bound
    /// concrete store is absent from the service registry. Both indicate
    /// startup wiring defects and are not retryable.
    pub fn get<T: TokenEntity>(&self) -> ResolveResult<DynTokenStore<T>> {
        if let Some(store) = self.registry.try_get::<dyn TokenStore<T>>() {
            return Ok(store);
        }

        let binding = self.binding::<T>()?;
        binding.resolve(&self.registry)
    }

    /// Number of memoized bindings.
    #[must_use]
    pub fn cached_bindings(&self) -> usize {
        self.cache.len()
    }

    fn binding<T: TokenEntity>(&self) -> ResolveResult<Arc<TokenBinding<T>>> {
        let key = TypeId::of::<T>();
        if let Some(hit) = self.cache.get(&key) {
            if let Ok(binding) = hit.value().clone().downcast::<TokenBinding<T>>() {
                return Ok(binding);
            }
        }

        let derived = self.derive::<T>()?;
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
        // The entry is keyed by `T`, so the retained value is always a
        // `TokenBinding<T>`.
        Ok(retained.downcast::<TokenBinding<T>>().unwrap_or(derived))
    }

    fn derive<T: TokenEntity>(&self) -> ResolveResult<Arc<TokenBinding<T>>> {
        let binding = self
            .bindings
            .find::<T>()
            .ok_or_else(|| ResolveError::incompatible_entity(type_name::<T>(), "token"))?;
        tracing::debug!(
            entity = type_name::<T>(),
            store = binding.store().name(),
            key = binding.key().name(),
            "derived token store binding"
        );
        Ok(binding)
    }
}

impl std::fmt::Debug for TokenStoreResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStoreResolver")
            .field("cached_bindings", &self.cache.len())
            .field("bindings", &self.bindings.len())
            .finish()
    }
}
