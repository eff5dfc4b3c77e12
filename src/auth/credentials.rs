//! Password verification seam.
//!
//! Logins are checked against the `[auth.credentials]` table of Argon2 hashes.
//! Accepting any password requires `auth.trust_upstream = true`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::password::{check_hash, verify_password};
use crate::config::AuthConfig;
use crate::{PortalError, Result};

/// Verifies a username/password pair.
pub trait CredentialVerifier: Send + Sync {
    /// Returns true if the password is acceptable for the username.
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Accepts every password.
///
/// Only for deployments where the password was already checked upstream of
/// this service.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpstreamVerified;

impl CredentialVerifier for UpstreamVerified {
    fn verify(&self, _username: &str, _password: &str) -> bool {
        true
    }
}

/// Username → Argon2 PHC hash table.
///
/// An empty table rejects every password.
#[derive(Debug, Clone, Default)]
pub struct HashedCredentials {
    hashes: BTreeMap<String, String>,
}

/// Table used when nothing else is configured.
pub(crate) static NO_CREDENTIALS: HashedCredentials = HashedCredentials::empty();

impl HashedCredentials {
    /// Create an empty table.
    pub const fn empty() -> Self {
        Self {
            hashes: BTreeMap::new(),
        }
    }

    /// Build a table, checking that every entry is a PHC hash.
    pub fn from_hashes(hashes: BTreeMap<String, String>) -> Result<Self> {
        for (username, hash) in &hashes {
            check_hash(hash).map_err(|e| {
                PortalError::Config(format!("auth.credentials.{username}: {e}"))
            })?;
        }
        Ok(Self { hashes })
    }

    /// Number of configured users.
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl CredentialVerifier for HashedCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        self.hashes
            .get(username)
            .is_some_and(|hash| matches!(verify_password(password, hash), Ok(true)))
    }
}

/// Fixed username → plaintext password table, for tests and local demos.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    passwords: HashMap<String, String>,
}

impl StaticCredentials {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    pub fn with(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.passwords.insert(username.into(), password.into());
        self
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        self.passwords
            .get(username)
            .is_some_and(|expected| expected == password)
    }
}

/// Build the login verifier from the `[auth]` section.
pub fn verifier_from_config(config: &AuthConfig) -> Result<Arc<dyn CredentialVerifier>> {
    if config.trust_upstream {
        tracing::warn!("auth.trust_upstream is set: passwords are not checked");
        return Ok(Arc::new(UpstreamVerified));
    }

    let table = HashedCredentials::from_hashes(config.credentials.clone())?;
    if table.is_empty() {
        tracing::warn!("auth.credentials is empty: every login will be rejected");
    } else {
        tracing::info!("Loaded {} credential(s)", table.len());
    }
    Ok(Arc::new(table))
}
