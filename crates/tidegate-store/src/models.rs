//! Default entity models.
//!
//! These are the entity types the resolvers fall back to when an
//! application does not declare its own. Each model is generic over its
//! key type with a `Uuid` default and implements the matching marker
//! trait from [`crate::entity`] for any valid key.
//!
//! Custom entities usually start as a copy of these structs with extra
//! columns; only the marker implementation is required for resolution.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::entity::{ApplicationEntity, AuthorizationEntity, EntityKey, TokenEntity};

/// Well-known status values shared by authorizations and tokens.
pub mod statuses {
    /// The entity is registered but not yet usable.
    pub const INACTIVE: &str = "inactive";
    /// The entity has been exchanged and cannot be used again.
    pub const REDEEMED: &str = "redeemed";
    /// The entity was rejected by the resource owner.
    pub const REJECTED: &str = "rejected";
    /// The entity was explicitly revoked.
    pub const REVOKED: &str = "revoked";
    /// The entity is active.
    pub const VALID: &str = "valid";
}

/// Well-known authorization kinds.
pub mod authorization_types {
    /// One-off authorization attached to a single token exchange.
    pub const AD_HOC: &str = "ad-hoc";
    /// Durable authorization reused across token exchanges.
    pub const PERMANENT: &str = "permanent";
}

/// Well-known token kinds.
pub mod token_types {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const AUTHORIZATION_CODE: &str = "authorization_code";
    pub const DEVICE_CODE: &str = "device_code";
    pub const ID_TOKEN: &str = "id_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const USER_CODE: &str = "user_code";
}

/// An OAuth client application registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application<K = Uuid> {
    /// Unique identifier for this application record.
    pub id: K,

    /// The OAuth client identifier presented during requests.
    pub client_id: String,

    /// Hash of the client secret (None for public clients).
    /// The plaintext secret is returned to the client once and never stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret_hash: Option<String>,

    /// Human-readable name shown on consent screens.
    pub display_name: String,

    /// Redirect URIs allowed for this client (space-separated).
    pub redirect_uris: String,

    /// Permissions granted to this client (space-separated).
    pub permissions: String,

    /// Opaque write-stamp used to detect concurrent updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency_token: Option<String>,
}

impl<K: EntityKey> ApplicationEntity for Application<K> {
    type Key = K;

    fn key(&self) -> &K {
        &self.id
    }
}

/// A grant given by a resource owner to a client application.
///
/// An authorization groups the tokens issued for one consent decision so
/// they can be revoked together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization<K = Uuid> {
    /// Unique identifier for this authorization record.
    pub id: K,

    /// Client identifier of the application this grant was given to.
    pub application_id: String,

    /// Subject (resource owner) that granted the authorization.
    pub subject: String,

    /// Granted scopes (space-separated).
    pub scopes: String,

    /// Status of the authorization (see [`statuses`]).
    pub status: String,

    /// Kind of authorization (see [`authorization_types`]).
    pub authorization_type: String,

    /// When this authorization was created.
    #[serde(with = "time::serde::rfc3339")]
    pub creation_date: OffsetDateTime,

    /// Opaque write-stamp used to detect concurrent updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency_token: Option<String>,
}

impl<K: EntityKey> AuthorizationEntity for Authorization<K> {
    type Key = K;

    fn key(&self) -> &K {
        &self.id
    }
}

impl<K> Authorization<K> {
    /// Returns `true` if this authorization is still usable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status == statuses::VALID
    }
}

/// A token issued under an authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token<K = Uuid> {
    /// Unique identifier for this token record.
    pub id: K,

    /// Client identifier of the application the token was issued to.
    pub application_id: String,

    /// Identifier of the authorization this token belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_id: Option<String>,

    /// Subject the token was issued for.
    pub subject: String,

    /// Kind of token (see [`token_types`]).
    pub token_type: String,

    /// Status of the token (see [`statuses`]).
    pub status: String,

    /// Reference identifier used to look the token up from its
    /// user-visible form (None for self-contained tokens).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,

    /// Serialized token payload (None until the token is materialized).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    /// When this token was created.
    #[serde(with = "time::serde::rfc3339")]
    pub creation_date: OffsetDateTime,

    /// When this token expires (None = no expiration).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expiration_date: Option<OffsetDateTime>,

    /// When this token was redeemed (None = not redeemed).
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub redemption_date: Option<OffsetDateTime>,

    /// Opaque write-stamp used to detect concurrent updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency_token: Option<String>,
}

impl<K: EntityKey> TokenEntity for Token<K> {
    type Key = K;

    fn key(&self) -> &K {
        &self.id
    }
}

impl<K> Token<K> {
    /// Returns `true` if this token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expiration_date
            .map(|exp| OffsetDateTime::now_utc() > exp)
            .unwrap_or(false)
    }

    /// Returns `true` if this token has been redeemed.
    #[must_use]
    pub fn is_redeemed(&self) -> bool {
        self.redemption_date.is_some()
    }

    /// Returns `true` if this token is usable (valid status, not expired).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status == statuses::VALID && !self.is_expired()
    }
}
