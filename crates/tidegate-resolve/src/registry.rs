//! Type-keyed service registry.
//!
//! The registry is the resolution layer's stand-in for a dependency
//! injection container: services are registered under a Rust type at
//! startup and fetched back by that type at runtime. It is passed to the
//! resolvers at construction rather than looked up ambiently, and it owns
//! the lifetime of everything it hands out.
//!
//! Services registered with [`ServiceRegistry::register_factory`] are
//! constructed on first request and retained for the registry's lifetime.

use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::ResolveResult;
use crate::error::ResolveError;

/// Type-erased constructor for a lazily built service.
type ServiceFactory = Arc<dyn Fn(&ServiceRegistry) -> Arc<dyn Any + Send + Sync> + Send + Sync>;

enum ServiceEntry {
    Ready(Arc<dyn Any + Send + Sync>),
    Lazy(ServiceFactory),
}

/// Type-keyed service registry with lazily constructed singletons.
///
/// The registry key is the service type itself, which may be a trait
/// object type: registering an `Arc<dyn TokenStore<T>>` under
/// `dyn TokenStore<T>` is how an application overrides store resolution
/// for a single entity type.
///
/// All operations are safe for concurrent use. Under concurrent first
/// requests for a lazily registered service the constructor may run more
/// than once; exactly one result is retained and every caller observes
/// the retained instance, so constructors must restrict themselves to
/// pure wiring.
#[derive(Default)]
pub struct ServiceRegistry {
    // Values wrap the service as `Arc<S>` inside the erased `Arc`, which
    // lets unsized service types share the table with concrete ones.
    entries: DashMap<TypeId, ServiceEntry>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Register a ready service instance under the type `S`.
    ///
    /// Replaces any previous registration for `S`.
    pub fn register<S>(&self, service: Arc<S>)
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let erased: Arc<dyn Any + Send + Sync> = Arc::new(service);
        self.entries
            .insert(TypeId::of::<S>(), ServiceEntry::Ready(erased));
    }

    /// Register a constructor that builds the service on first request.
    ///
    /// The constructor receives the registry so it can resolve its own
    /// dependencies. The constructed instance is retained for the
    /// registry's lifetime; replaces any previous registration for `S`.
    pub fn register_factory<S, F>(&self, factory: F)
    where
        S: Send + Sync + 'static,
        F: Fn(&ServiceRegistry) -> S + Send + Sync + 'static,
    {
        let factory: ServiceFactory = Arc::new(move |registry| {
            let service: Arc<S> = Arc::new(factory(registry));
            let erased: Arc<dyn Any + Send + Sync> = Arc::new(service);
            erased
        });
        self.entries
            .insert(TypeId::of::<S>(), ServiceEntry::Lazy(factory));
    }

    /// Fetch the service registered under `S`, building it if it was
    /// registered lazily.
    ///
    /// Returns `None` if nothing is registered under `S`.
    #[must_use]
    pub fn try_get<S>(&self) -> Option<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        let key = TypeId::of::<S>();
        let factory = {
            let entry = self.entries.get(&key)?;
            match entry.value() {
                ServiceEntry::Ready(erased) => return downcast::<S>(erased),
                ServiceEntry::Lazy(factory) => factory.clone(),
            }
        };

        // Construct outside the map so the factory can resolve its own
        // dependencies from this registry without deadlocking on a shard.
        let built = factory(self);
        tracing::debug!(service = type_name::<S>(), "constructed service instance");

        let retained = match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => match occupied.get() {
                // Another caller finished construction first; adopt theirs.
                ServiceEntry::Ready(erased) => erased.clone(),
                ServiceEntry::Lazy(_) => {
                    occupied.insert(ServiceEntry::Ready(built.clone()));
                    built
                }
            },
            Entry::Vacant(vacant) => {
                vacant.insert(ServiceEntry::Ready(built.clone()));
                built
            }
        };
        downcast::<S>(&retained)
    }

    /// Fetch the service registered under `S`, failing if absent.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingRegistration`] if nothing is
    /// registered under `S`. Absence is a wiring defect, not a runtime
    /// data condition.
    pub fn get_required<S>(&self) -> ResolveResult<Arc<S>>
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.try_get::<S>()
            .ok_or_else(|| ResolveError::missing_registration(type_name::<S>()))
    }

    /// Returns `true` if a service is registered under `S`.
    #[must_use]
    pub fn contains<S>(&self) -> bool
    where
        S: ?Sized + 'static,
    {
        self.entries.contains_key(&TypeId::of::<S>())
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.len())
            .finish()
    }
}

fn downcast<S>(erased: &Arc<dyn Any + Send + Sync>) -> Option<Arc<S>>
where
    S: ?Sized + Send + Sync + 'static,
{
    erased.downcast_ref::<Arc<S>>().cloned()
}
