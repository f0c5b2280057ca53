//! # `cloister` - Per-Thread Type Isolation Toolkit
//!
//! A protective toolkit for using "badly written," non-reentrant types from
//! many threads at once. Instead of serializing every caller behind a mutex,
//! `cloister` gives each thread its own independently built *definition* of
//! the target type, so any class-level state attached to that definition
//! (counters, caches — the moral equivalent of static fields) has a new,
//! private home per thread. Isolation is structural, not cooperative: the
//! target type's own code needs no locking and no edits.
//!
//! ## Safety Guarantees
//!
//! ### State Isolation
//! - **One context per (thread, type)**: a thread's first
//!   [`Registry::get`] lazily builds its private [`LoadingContext`]; every
//!   later call returns the same one. Two threads never share a context.
//! - **Fresh definitions**: each context owns a [`TypeDefinition`] built by
//!   a fresh [`Isolate::define`] call, so closure-captured class-level state
//!   is disjoint across threads by construction.
//! - **Gated access**: an eligibility policy (a protected-namespace
//!   allow-list) is consulted at registration *and* again on every
//!   construction, so unprotected types never reach the machinery.
//!
//! ### Concurrency Safety
//! - The registry map is the only shared mutable state, guarded by its own
//!   lock; context contents are thread-confined and lock-free to use.
//! - [`Registry::remove`] revokes every outstanding context atomically with
//!   respect to racing [`Registry::get`] calls.
//!
//! ## Core Abstractions
//!
//! 1. **Registry** ([`Registry`]): per-thread loading contexts for one
//!    target type; `create` / `get` / `remove`.
//! 2. **Type definitions** ([`TypeDefinition`], [`Isolate`]): an explicit
//!    factory-function registry per target type, standing in for runtime
//!    member reflection.
//! 3. **Blueprints** ([`Blueprint`]): immutable-once-built descriptions of
//!    one construction — constructor or named factory, arguments, explicit
//!    parameter types for overload disambiguation, optional result
//!    interface.
//! 4. **Engine** ([`new_object`]): resolves and invokes the requested
//!    member inside a context and returns the object, optionally viewed
//!    through the requested trait object.
//!
//! ## Example
//!
//! ```rust
//! use std::cell::Cell;
//! use cloister::{new_object, Blueprint, EligibilityPolicy, Isolate, Registry, TypeDefinition};
//!
//! // A non-reentrant legacy type: interior mutability, not Sync.
//! struct Sequencer {
//!     at: Cell<i32>,
//! }
//!
//! impl Sequencer {
//!     fn next(&self) -> i32 {
//!         self.at.set(self.at.get() + 1);
//!         self.at.get()
//!     }
//! }
//!
//! impl Isolate for Sequencer {
//!     fn define() -> TypeDefinition {
//!         TypeDefinition::builder::<Self>()
//!             .constructor0(|| Ok(Sequencer { at: Cell::new(0) }))
//!             .factory1("starting_at", |seed: i32| Ok(Sequencer { at: Cell::new(seed) }))
//!             .finish()
//!     }
//! }
//!
//! # fn main() -> cloister::Result<()> {
//! let policy = EligibilityPolicy::protecting_namespace_of::<Sequencer>();
//! let registry = Registry::<Sequencer>::create(policy)?;
//!
//! // This thread's private context; other threads would get their own.
//! let context = registry.get()?;
//!
//! let plan = Blueprint::for_target::<Sequencer>()
//!     .factory_method("starting_at")
//!     .arguments([cloister::Arg::new(10_i32)]);
//! let sequencer: Sequencer = new_object(&context, &plan)?.downcast()?;
//! assert_eq!(sequencer.next(), 11);
//!
//! registry.remove();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod blueprint;
pub mod definition;
pub mod engine;
pub mod error;
pub mod policy;
pub mod registry;

pub use blueprint::{Arg, ArgType, Blueprint};
pub use definition::{DefinitionBuilder, DefinitionId, Isolate, TypeDefinition};
pub use engine::{new_object, Instance};
pub use error::{BoxError, Error, Result};
pub use policy::EligibilityPolicy;
pub use registry::{LoadingContext, Registry};
