//! Integration tests for store resolution.
//!
//! These tests exercise the full flow from startup wiring to resolved
//! store instances, using in-memory stores as stand-ins for a real
//! storage backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use tidegate_resolve::{
    ResolverBuilder, ServiceRegistry, StoreOptions, TokenBindings, TokenStoreResolver,
};
use tidegate_store::{
    Application, Authorization, AuthorizationStore, StoreError, StoreResult, Token, TokenEntity,
    TokenStore, authorization_types, statuses, token_types,
};

// =============================================================================
// Fixtures
// =============================================================================

/// Generic in-memory store usable with any token entity type.
///
/// Only the key-addressed operations are modeled; subject and reference
/// lookups are backend concerns these tests never exercise.
struct KeyedTokenStore<T: TokenEntity> {
    rows: Mutex<HashMap<T::Key, T>>,
}

impl<T: TokenEntity> KeyedTokenStore<T> {
    fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<T: TokenEntity + Clone> TokenStore<T> for KeyedTokenStore<T> {
    async fn find_by_id(&self, id: &T::Key) -> StoreResult<Option<T>> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn find_by_reference_id(&self, _reference_id: &str) -> StoreResult<Option<T>> {
        Ok(None)
    }

    async fn find_by_subject(&self, _subject: &str) -> StoreResult<Vec<T>> {
        Ok(Vec::new())
    }

    async fn create(&self, token: &T) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(token.key()) {
            return Err(StoreError::already_exists("Token", format!("{:?}", token.key())));
        }
        rows.insert(token.key().clone(), token.clone());
        Ok(())
    }

    async fn update(&self, token: &T) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(token.key()) {
            Some(row) => {
                *row = token.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("Token", format!("{:?}", token.key()))),
        }
    }

    async fn delete(&self, id: &T::Key) -> StoreResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Token", format!("{id:?}")))
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }

    async fn prune(&self, _threshold: OffsetDateTime) -> StoreResult<u64> {
        Ok(0)
    }
}

/// In-memory authorization store over the default model.
#[derive(Default)]
struct MemoryAuthorizationStore {
    rows: Mutex<HashMap<Uuid, Authorization>>,
}

#[async_trait]
impl AuthorizationStore<Authorization> for MemoryAuthorizationStore {
    async fn find_by_id(&self, id: &Uuid) -> StoreResult<Option<Authorization>> {
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn find_by_subject(&self, subject: &str) -> StoreResult<Vec<Authorization>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.subject == subject)
            .cloned()
            .collect())
    }

    async fn create(&self, authorization: &Authorization) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&authorization.id) {
            return Err(StoreError::already_exists(
                "Authorization",
                authorization.id.to_string(),
            ));
        }
        rows.insert(authorization.id, authorization.clone());
        Ok(())
    }

    async fn update(&self, authorization: &Authorization) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&authorization.id) {
            Some(row) => {
                *row = authorization.clone();
                Ok(())
            }
            None => Err(StoreError::not_found(
                "Authorization",
                authorization.id.to_string(),
            )),
        }
    }

    async fn delete(&self, id: &Uuid) -> StoreResult<()> {
        self.rows
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("Authorization", id.to_string()))
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.rows.lock().unwrap().len() as u64)
    }

    async fn prune(&self, threshold: OffsetDateTime) -> StoreResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|_, a| a.is_valid() || a.creation_date >= threshold);
        Ok((before - rows.len()) as u64)
    }
}

/// A custom token entity outside the shipped models.
#[derive(Debug, Clone)]
struct SessionToken {
    id: Uuid,
    label: String,
}

impl TokenEntity for SessionToken {
    type Key = Uuid;

    fn key(&self) -> &Uuid {
        &self.id
    }
}

/// A token entity never bound to any store.
#[derive(Debug, Clone)]
struct OrphanToken {
    id: Uuid,
}

impl TokenEntity for OrphanToken {
    type Key = Uuid;

    fn key(&self) -> &Uuid {
        &self.id
    }
}

fn create_test_token(subject: &str) -> Token {
    Token {
        id: Uuid::new_v4(),
        application_id: "test-client".to_string(),
        authorization_id: None,
        subject: subject.to_string(),
        token_type: token_types::ACCESS_TOKEN.to_string(),
        status: statuses::VALID.to_string(),
        reference_id: None,
        payload: None,
        creation_date: OffsetDateTime::now_utc(),
        expiration_date: Some(OffsetDateTime::now_utc() + Duration::hours(1)),
        redemption_date: None,
        concurrency_token: None,
    }
}

fn create_test_authorization(subject: &str) -> Authorization {
    Authorization {
        id: Uuid::new_v4(),
        application_id: "test-client".to_string(),
        subject: subject.to_string(),
        scopes: "openid offline_access".to_string(),
        status: statuses::VALID.to_string(),
        authorization_type: authorization_types::PERMANENT.to_string(),
        creation_date: OffsetDateTime::now_utc(),
        concurrency_token: None,
    }
}

// =============================================================================
// Direct Registration (overrides)
// =============================================================================

#[test]
fn test_direct_registration_bypasses_derivation() {
    let resolvers = ResolverBuilder::new().build();

    let override_store: Arc<dyn TokenStore<Token>> = Arc::new(KeyedTokenStore::<Token>::new());
    resolvers
        .registry()
        .register::<dyn TokenStore<Token>>(override_store.clone());

    let resolved = resolvers.tokens().get::<Token>().unwrap();
    assert!(
        Arc::ptr_eq(&resolved, &override_store),
        "override must be returned as-is"
    );
    assert_eq!(
        resolvers.tokens().cached_bindings(),
        0,
        "derivation must not run for direct registrations"
    );
}

#[test]
fn test_builder_override_helper() {
    let resolvers = ResolverBuilder::new()
        .with_token_override::<Token>(KeyedTokenStore::<Token>::new())
        .build();

    assert!(resolvers.tokens().get::<Token>().is_ok());
    assert_eq!(resolvers.tokens().cached_bindings(), 0);
}

// =============================================================================
// Derivation and Memoization
// =============================================================================

#[test]
fn test_derivation_is_memoized_and_construction_lazy() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();

    let resolvers = ResolverBuilder::new()
        .with_token_store::<Token, KeyedTokenStore<Token>, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            KeyedTokenStore::new()
        })
        .build();

    // Nothing is constructed until the first resolution.
    assert_eq!(built.load(Ordering::SeqCst), 0);

    let first = resolvers.tokens().get::<Token>().unwrap();
    let second = resolvers.tokens().get::<Token>().unwrap();

    assert!(
        Arc::ptr_eq(&first, &second),
        "repeat resolutions must reuse the retained store"
    );
    assert_eq!(built.load(Ordering::SeqCst), 1, "store built exactly once");
    assert_eq!(resolvers.tokens().cached_bindings(), 1);
}

#[test]
fn test_unbound_entity_is_incompatible() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();

    let resolvers = ResolverBuilder::new()
        .with_token_store::<Token, KeyedTokenStore<Token>, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            KeyedTokenStore::new()
        })
        .build();

    let err = resolvers.tokens().get::<OrphanToken>().unwrap_err();
    assert!(err.is_incompatible_entity());
    assert!(err.to_string().contains("OrphanToken"));

    // The failure happens before any registry call.
    assert_eq!(built.load(Ordering::SeqCst), 0);
    assert_eq!(resolvers.tokens().cached_bindings(), 0);
}

#[test]
fn test_bound_but_unregistered_store_fails() {
    // Bind the entity without ever registering the concrete store.
    let bindings = Arc::new(TokenBindings::new());
    bindings.bind::<Token, KeyedTokenStore<Token>>();
    let registry = Arc::new(ServiceRegistry::new());

    let resolver = TokenStoreResolver::new(bindings, registry);
    let err = resolver.get::<Token>().unwrap_err();

    assert!(err.is_missing_registration());
    assert!(err.to_string().contains("KeyedTokenStore"));
    // The derivation itself succeeded and is cached.
    assert_eq!(resolver.cached_bindings(), 1);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_concurrent_first_resolution() {
    let resolvers = ResolverBuilder::new()
        .with_token_store::<Token, KeyedTokenStore<Token>, _>(|_| KeyedTokenStore::new())
        .build();

    let stores: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| resolvers.tokens().get::<Token>().unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let first = &stores[0];
    for store in &stores {
        assert!(
            Arc::ptr_eq(store, first),
            "every caller must observe the retained store instance"
        );
    }
    assert_eq!(
        resolvers.tokens().cached_bindings(),
        1,
        "the cache must end with exactly one entry"
    );
}

// =============================================================================
// Resolved Stores in Use
// =============================================================================

#[tokio::test]
async fn test_custom_token_entity_resolution() {
    let resolvers = ResolverBuilder::new()
        .with_token_store::<SessionToken, KeyedTokenStore<SessionToken>, _>(|_| {
            KeyedTokenStore::new()
        })
        .build();

    let store = resolvers.tokens().get::<SessionToken>().unwrap();

    let token = SessionToken {
        id: Uuid::new_v4(),
        label: "cli-session".to_string(),
    };
    store.create(&token).await.unwrap();

    let found = store.find_by_id(&token.id).await.unwrap().unwrap();
    assert_eq!(found.label, "cli-session");
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_authorization_store_resolution() {
    let resolvers = ResolverBuilder::new()
        .with_authorization_store::<Authorization, Application, Token, MemoryAuthorizationStore, _>(
            |_| MemoryAuthorizationStore::default(),
        )
        .build();

    let store = resolvers.authorizations().get::<Authorization>().unwrap();

    let granted = create_test_authorization("alice");
    store.create(&granted).await.unwrap();

    let mut revoked = create_test_authorization("alice");
    revoked.status = statuses::REVOKED.to_string();
    revoked.creation_date = OffsetDateTime::now_utc() - Duration::days(30);
    store.create(&revoked).await.unwrap();

    let found = store.find_by_subject("alice").await.unwrap();
    assert_eq!(found.len(), 2);

    // Pruning drops the stale revoked grant only.
    let removed = store
        .prune(OffsetDateTime::now_utc() - Duration::days(1))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_default_token_model_roundtrip() {
    let resolvers = ResolverBuilder::new()
        .with_token_store::<Token, KeyedTokenStore<Token>, _>(|_| KeyedTokenStore::new())
        .build();

    let store = resolvers.tokens().get::<Token>().unwrap();

    let token = create_test_token("alice");
    store.create(&token).await.unwrap();
    assert!(
        store.create(&token).await.unwrap_err().is_conflict(),
        "duplicate create must conflict"
    );

    let mut redeemed = store.find_by_id(&token.id).await.unwrap().unwrap();
    redeemed.status = statuses::REDEEMED.to_string();
    redeemed.redemption_date = Some(OffsetDateTime::now_utc());
    store.update(&redeemed).await.unwrap();

    let found = store.find_by_id(&token.id).await.unwrap().unwrap();
    assert!(found.is_redeemed());
    assert!(!found.is_valid());

    store.delete(&token.id).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);
}

// =============================================================================
// Options-Dependent Derivation
// =============================================================================

#[test]
fn test_options_steer_authorization_derivation() {
    // The store is bound under a non-default companion token type.
    let resolvers = ResolverBuilder::new()
        .with_authorization_store::<Authorization, Application, Token<String>, MemoryAuthorizationStore, _>(
            |_| MemoryAuthorizationStore::default(),
        )
        .build();

    // Under the default options the binding is invisible.
    let err = resolvers.authorizations().get::<Authorization>().unwrap_err();
    assert!(err.is_incompatible_entity());

    // After a configuration reload the same entity type derives.
    resolvers
        .options()
        .replace(StoreOptions::new().with_default_token::<Token<String>>());
    assert!(resolvers.authorizations().get::<Authorization>().is_ok());
    assert_eq!(resolvers.authorizations().cached_bindings(), 1);
}
