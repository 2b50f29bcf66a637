//! Store resolvers.
//!
//! A resolver turns an entity type into a live store instance: a store
//! registered directly under the capability type is honored first,
//! otherwise the concrete store binding is derived from the binding table
//! and fetched from the service registry. Derived bindings are memoized
//! per entity type for the process lifetime.
//!
//! Resolvers are intended to be shared as singletons across concurrent
//! callers; resolution is synchronous and holds no lock across registry
//! calls.

mod authorization;
mod token;

pub use authorization::AuthorizationStoreResolver;
pub use token::TokenStoreResolver;
