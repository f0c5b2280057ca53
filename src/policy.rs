//! The eligibility gate: which types may be isolated at all.
//!
//! Isolation duplicates a type's class-level state per thread, which is only
//! sound for types the application has audited for it. The gate is a
//! namespace allow-list over fully-qualified Rust type paths: a type is
//! eligible when its `std::any::type_name` path starts with one of the
//! protected prefixes. Both registration and every construction request are
//! checked, so an ineligible request never touches the isolation machinery.

use std::any::{type_name, Any};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Namespace allow-list deciding which types may be isolated.
///
/// The policy is plain data and can be embedded in application configuration;
/// it serializes as `{ "protected_prefixes": ["my_app::generators"] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    protected_prefixes: Vec<String>,
}

impl EligibilityPolicy {
    /// A policy protecting every type whose path starts with one of `prefixes`.
    pub fn protecting<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected_prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// A policy protecting the namespace that contains `T`.
    ///
    /// Convenient for callers that isolate a single module of legacy types:
    /// the prefix is `T`'s path with the final segment removed.
    pub fn protecting_namespace_of<T: Any>() -> Self {
        let full = type_name::<T>();
        let prefix = full.rsplit_once("::").map_or(full, |(namespace, _)| namespace);
        Self::protecting([prefix])
    }

    /// Adds one more protected prefix.
    #[must_use]
    pub fn protect(mut self, prefix: impl Into<String>) -> Self {
        self.protected_prefixes.push(prefix.into());
        self
    }

    /// Whether `type_name` falls inside a protected namespace.
    #[inline]
    pub fn is_eligible(&self, type_name: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| type_name.starts_with(prefix.as_str()))
    }

    /// The protected prefixes, in registration order.
    pub fn prefixes(&self) -> &[String] {
        &self.protected_prefixes
    }

    /// Registration-time check, reported as a configuration error.
    pub(crate) fn check_registration(&self, type_name: &'static str) -> Result<()> {
        if self.is_eligible(type_name) {
            Ok(())
        } else {
            Err(Error::Configuration { type_name })
        }
    }

    /// Call-time check, reported as an illegal-argument error.
    pub(crate) fn check_construction(&self, type_name: &'static str) -> Result<()> {
        if self.is_eligible(type_name) {
            Ok(())
        } else {
            Err(Error::IllegalArgument { type_name })
        }
    }
}
