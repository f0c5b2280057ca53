//! The isolated-type registry: one loading context per (thread, target type).
//!
//! A [`Registry`] owns, for a single target type, a map from thread identity
//! to that thread's private [`LoadingContext`]. Contexts are created lazily
//! on a thread's first `get` and handed back unchanged on every later `get`
//! from the same thread. Distinct threads always receive distinct contexts,
//! hence distinct type definitions, hence disjoint class-level state.
//!
//! The map is the only shared mutable state in the crate. Its lock protects
//! the map alone; the contexts it hands out are thread-confined by
//! construction and need no further synchronization.

use std::any::type_name;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::definition::{Isolate, TypeDefinition};
use crate::error::{Error, Result};
use crate::policy::EligibilityPolicy;

/// One thread's private view of a target type.
///
/// Owns the thread-private [`TypeDefinition`] built by
/// [`Isolate::define`]. The context stays valid until the owning registry's
/// [`Registry::remove`] revokes it; there is no automatic teardown when the
/// owning thread exits, so release is always explicit.
pub struct LoadingContext {
    definition: TypeDefinition,
    policy: Arc<EligibilityPolicy>,
    owner: ThreadId,
    revoked: AtomicBool,
}

impl LoadingContext {
    /// The thread-private definition of the target type.
    #[inline]
    pub fn definition(&self) -> &TypeDefinition {
        &self.definition
    }

    /// The thread this context was created for.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.owner
    }

    /// Whether [`Registry::remove`] has invalidated this context.
    #[inline]
    pub fn is_revoked(&self) -> bool {
        self.revoked.load(Ordering::Acquire)
    }

    pub(crate) fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    fn revoke(&self) {
        self.revoked.store(true, Ordering::Release);
    }
}

impl std::fmt::Debug for LoadingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingContext")
            .field("definition", &self.definition)
            .field("owner", &self.owner)
            .field("revoked", &self.is_revoked())
            .finish()
    }
}

struct RegistryState {
    contexts: HashMap<ThreadId, Arc<LoadingContext>>,
    /// Set by `remove`, under the same lock that guards the map, so a racing
    /// `get` sees pre-removal or post-removal state but never a mix.
    removed: bool,
}

/// Per-thread loading contexts for one target type.
///
/// Created by [`Registry::create`], which consults the eligibility gate
/// before anything else. A registry is shared freely across threads; each
/// calling thread only ever sees its own context.
pub struct Registry<T: Isolate> {
    state: RwLock<RegistryState>,
    policy: Arc<EligibilityPolicy>,
    _target: PhantomData<fn() -> T>,
}

impl<T: Isolate> Registry<T> {
    /// Registers `T` for isolation under `policy`.
    ///
    /// Fails with [`Error::Configuration`] when `T` is outside the protected
    /// namespaces. No context is built eagerly.
    pub fn create(policy: EligibilityPolicy) -> Result<Self> {
        if let Err(err) = policy.check_registration(type_name::<T>()) {
            warn!(target_type = type_name::<T>(), "rejected isolation registration");
            return Err(err);
        }
        debug!(target_type = type_name::<T>(), "registered type for per-thread isolation");
        Ok(Self {
            state: RwLock::new(RegistryState {
                contexts: HashMap::new(),
                removed: false,
            }),
            policy: Arc::new(policy),
            _target: PhantomData,
        })
    }

    /// Returns the calling thread's context, building it on first call.
    ///
    /// Idempotent per thread: repeated calls return the same context until
    /// [`Registry::remove`]. Distinct threads always receive distinct
    /// contexts; the fresh definition is built outside the map lock, so one
    /// thread's first `get` never serializes another's.
    pub fn get(&self) -> Result<Arc<LoadingContext>> {
        let caller = thread::current().id();
        {
            let state = self.state.read();
            if state.removed {
                return Err(Error::Lifecycle { type_name: type_name::<T>() });
            }
            if let Some(context) = state.contexts.get(&caller) {
                return Ok(Arc::clone(context));
            }
        }

        // Only the calling thread can insert under its own id, so building
        // the definition before taking the write lock cannot race a
        // duplicate insert.
        let fresh = Arc::new(LoadingContext {
            definition: T::define(),
            policy: Arc::clone(&self.policy),
            owner: caller,
            revoked: AtomicBool::new(false),
        });
        debug!(
            target_type = type_name::<T>(),
            thread = ?caller,
            definition = ?fresh.definition().id(),
            "created loading context"
        );

        let mut state = self.state.write();
        if state.removed {
            return Err(Error::Lifecycle { type_name: type_name::<T>() });
        }
        Ok(Arc::clone(state.contexts.entry(caller).or_insert(fresh)))
    }

    /// Releases every per-thread context for the target type.
    ///
    /// Atomic with respect to concurrent `get` calls: the removal flag and
    /// the revocation of every outstanding context happen under the map's
    /// write lock. Safe to call from any thread, and idempotent. Subsequent
    /// `get` calls report [`Error::Lifecycle`]; re-registration goes through
    /// a fresh [`Registry::create`].
    pub fn remove(&self) {
        let mut state = self.state.write();
        state.removed = true;
        for context in state.contexts.values() {
            context.revoke();
        }
        let released = state.contexts.len();
        state.contexts.clear();
        debug!(
            target_type = type_name::<T>(),
            released,
            "removed all loading contexts"
        );
    }

    /// Number of live per-thread contexts.
    pub fn context_count(&self) -> usize {
        self.state.read().contexts.len()
    }

    /// The policy this registry was created with.
    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }
}

impl<T: Isolate> std::fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("target_type", &type_name::<T>())
            .field("contexts", &self.context_count())
            .finish()
    }
}
