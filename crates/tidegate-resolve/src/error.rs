//! Resolution error types.
//!
//! Both variants indicate startup wiring defects: they are surfaced
//! synchronously to the caller, are not retryable, and should fail the
//! application loudly rather than be handled locally.

use std::fmt;

/// Errors that can occur while resolving a store.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The entity type is not bound to any store in its family.
    #[error(
        "no {family} store can be built for entity type `{entity}`: \
         the type is not bound to a registered store under the configured defaults"
    )]
    IncompatibleEntity {
        /// The entity type that could not be resolved.
        entity: &'static str,
        /// The store family that was asked for it.
        family: &'static str,
    },

    /// The derived or requested service is absent from the registry.
    #[error("service `{service}` is not registered in the service registry")]
    MissingRegistration {
        /// The service type that was requested.
        service: &'static str,
    },
}

impl ResolveError {
    /// Creates a new `IncompatibleEntity` error.
    #[must_use]
    pub fn incompatible_entity(entity: &'static str, family: &'static str) -> Self {
        Self::IncompatibleEntity { entity, family }
    }

    /// Creates a new `MissingRegistration` error.
    #[must_use]
    pub fn missing_registration(service: &'static str) -> Self {
        Self::MissingRegistration { service }
    }

    /// Returns `true` if this is an incompatible entity error.
    #[must_use]
    pub fn is_incompatible_entity(&self) -> bool {
        matches!(self, Self::IncompatibleEntity { .. })
    }

    /// Returns `true` if this is a missing registration error.
    #[must_use]
    pub fn is_missing_registration(&self) -> bool {
        matches!(self, Self::MissingRegistration { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IncompatibleEntity { .. } => ErrorCategory::Configuration,
            Self::MissingRegistration { .. } => ErrorCategory::Wiring,
        }
    }
}

/// Categories of resolution errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The requested entity type does not fit the configured families.
    Configuration,
    /// A service expected at startup was never registered.
    Wiring,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Wiring => write!(f, "wiring"),
        }
    }
}
