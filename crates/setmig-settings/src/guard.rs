//! Capability checks at the store boundary
//!
//! Permission enforcement is supplied by the caller rather than baked into a
//! store: a [`GuardedStore`] wraps any [`SettingsStore`] and rejects calls the
//! wrapped credential does not grant.

use crate::{Scope, Setting, SettingSet, SettingsError, SettingsStore};
use std::fmt;

/// A single access right over a settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ReadSettings,
    WriteSettings,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ReadSettings => "read-settings",
            Capability::WriteSettings => "write-settings",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities held by a caller.
#[derive(Debug, Clone, Default)]
pub struct Credential {
    capabilities: Vec<Capability>,
}

impl Credential {
    pub fn with(capabilities: &[Capability]) -> Self {
        Self {
            capabilities: capabilities.to_vec(),
        }
    }

    pub fn read_only() -> Self {
        Self::with(&[Capability::ReadSettings])
    }

    pub fn read_write() -> Self {
        Self::with(&[Capability::ReadSettings, Capability::WriteSettings])
    }

    pub fn grants(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Store wrapper that checks a credential before delegating.
pub struct GuardedStore<S> {
    inner: S,
    credential: Credential,
}

impl<S: SettingsStore> GuardedStore<S> {
    pub fn new(inner: S, credential: Credential) -> Self {
        Self { inner, credential }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn check(&self, capability: Capability) -> Result<(), SettingsError> {
        if self.credential.grants(capability) {
            Ok(())
        } else {
            Err(SettingsError::PermissionDenied(capability))
        }
    }
}

impl<S: SettingsStore> SettingsStore for GuardedStore<S> {
    fn authority(&self) -> &str {
        self.inner.authority()
    }

    fn query(&self, scope: Scope) -> Result<SettingSet, SettingsError> {
        self.check(Capability::ReadSettings)?;
        self.inner.query(scope)
    }

    fn insert(&mut self, scope: Scope, setting: &Setting) -> Result<(), SettingsError> {
        self.check(Capability::WriteSettings)?;
        self.inner.insert(scope, setting)
    }
}
