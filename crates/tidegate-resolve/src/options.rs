//! Store resolution options.
//!
//! Options carry the default entity types used when deriving a
//! multi-parameter store binding. They are held behind an atomic pointer
//! swap so running resolvers observe configuration reloads without locks;
//! a reload affects entity types that have not been resolved yet, while
//! already derived bindings stay fixed for the process lifetime.

use std::sync::Arc;

use arc_swap::ArcSwap;

use tidegate_store::{
    Application, ApplicationEntity, Authorization, AuthorizationEntity, Token, TokenEntity,
};

use crate::types::TypeTag;

/// Default entity types used during store derivation.
///
/// Out of the box the options select the Uuid-keyed models shipped with
/// `tidegate-store`; deployments with custom entities swap in their own
/// types:
///
/// ```ignore
/// let options = StoreOptions::new()
///     .with_default_token::<SessionToken>();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    default_application: TypeTag,
    default_authorization: TypeTag,
    default_token: TypeTag,
}

impl StoreOptions {
    /// Options selecting the built-in Uuid-keyed entity models.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_application: TypeTag::of::<Application>(),
            default_authorization: TypeTag::of::<Authorization>(),
            default_token: TypeTag::of::<Token>(),
        }
    }

    /// Use `App` as the default application entity type.
    #[must_use]
    pub fn with_default_application<App: ApplicationEntity>(mut self) -> Self {
        self.default_application = TypeTag::of::<App>();
        self
    }

    /// Use `A` as the default authorization entity type.
    #[must_use]
    pub fn with_default_authorization<A: AuthorizationEntity>(mut self) -> Self {
        self.default_authorization = TypeTag::of::<A>();
        self
    }

    /// Use `T` as the default token entity type.
    #[must_use]
    pub fn with_default_token<T: TokenEntity>(mut self) -> Self {
        self.default_token = TypeTag::of::<T>();
        self
    }

    /// The default application entity type.
    #[must_use]
    pub fn default_application(&self) -> TypeTag {
        self.default_application
    }

    /// The default authorization entity type.
    #[must_use]
    pub fn default_authorization(&self) -> TypeTag {
        self.default_authorization
    }

    /// The default token entity type.
    #[must_use]
    pub fn default_token(&self) -> TypeTag {
        self.default_token
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle to the current options snapshot.
///
/// Reads are single atomic pointer loads and never block; [`replace`]
/// swaps the snapshot for every holder at once.
///
/// [`replace`]: StoreOptionsHandle::replace
#[derive(Clone)]
pub struct StoreOptionsHandle {
    inner: Arc<ArcSwap<StoreOptions>>,
}

impl StoreOptionsHandle {
    /// Create a handle over the given initial options.
    #[must_use]
    pub fn new(options: StoreOptions) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(options)),
        }
    }

    /// Get the current options snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<StoreOptions> {
        self.inner.load_full()
    }

    /// Replace the options snapshot.
    pub fn replace(&self, options: StoreOptions) {
        self.inner.store(Arc::new(options));
    }
}

impl Default for StoreOptionsHandle {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl std::fmt::Debug for StoreOptionsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreOptionsHandle")
            .field("current", &self.current())
            .finish()
    }
}
