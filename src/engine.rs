//! The construction engine: turns a (context, blueprint) pair into an object.
//!
//! Resolution order follows the contract exactly: eligibility gate first
//! (so illegal requests never touch the isolation machinery), then the
//! context's lifecycle, then name resolution against the context's
//! definition, then exact-signature member lookup, invocation, and the
//! optional interface cast.

use std::any::{type_name, Any};

use tracing::{debug, warn};

use crate::blueprint::Blueprint;
use crate::error::{Error, Result};
use crate::registry::LoadingContext;

/// A type-erased construction result.
///
/// Holds either the concrete constructed value or, when the blueprint
/// requested a result interface, the boxed trait object. Recover it with
/// [`Instance::downcast`].
pub struct Instance {
    value: Box<dyn Any>,
    concrete: &'static str,
}

impl Instance {
    /// Whether the held value is an `R`.
    pub fn is<R: Any>(&self) -> bool {
        self.value.is::<R>()
    }

    /// Takes the held value as `R`.
    ///
    /// `R` is the concrete target type, or `Box<dyn Trait>` when the
    /// blueprint requested that interface. A wrong `R` is a
    /// [`Error::TypeMismatch`].
    pub fn downcast<R: Any>(self) -> Result<R> {
        match self.value.downcast::<R>() {
            Ok(boxed) => Ok(*boxed),
            Err(_) => Err(Error::TypeMismatch {
                type_name: self.concrete,
                interface: type_name::<R>(),
            }),
        }
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Instance of `{}`", self.concrete)
    }
}

/// Builds one object inside `context` as described by `blueprint`.
///
/// # Errors
///
/// - [`Error::IllegalArgument`] when the blueprint's target type is outside
///   the protected namespaces; checked before anything else happens.
/// - [`Error::Lifecycle`] when the context was revoked by
///   [`Registry::remove`](crate::Registry::remove).
/// - [`Error::Construction`] when the target name does not match the
///   context's definition, no member matches the requested signature, the
///   argument count is wrong, or the invoked member fails (the member's own
///   failure is preserved as the cause).
/// - [`Error::TypeMismatch`] when a requested result interface was never
///   registered by the definition.
pub fn new_object(context: &LoadingContext, blueprint: &Blueprint) -> Result<Instance> {
    if let Err(err) = context.policy().check_construction(blueprint.target_name()) {
        warn!(
            target_type = blueprint.target_name(),
            "rejected construction of unprotected type"
        );
        return Err(err);
    }
    if context.is_revoked() {
        return Err(Error::Lifecycle {
            type_name: blueprint.target_name(),
        });
    }

    let definition = context.definition();
    if definition.type_id() != blueprint.target_id() {
        return Err(Error::construction(format!(
            "loading context defines `{}`, not `{}`",
            definition.type_name(),
            blueprint.target_name()
        )));
    }

    let signature = blueprint.signature();
    let requested = blueprint.signature_display();
    let value = definition.call(blueprint.factory(), &signature, &requested, blueprint.args())?;

    let value = match blueprint.result_interface() {
        None => value,
        Some((interface_id, interface_name)) => {
            definition.cast_interface(interface_id, interface_name, value)?
        }
    };

    debug!(
        target_type = definition.type_name(),
        definition = ?definition.id(),
        factory = blueprint.factory().unwrap_or("<constructor>"),
        "constructed object"
    );
    Ok(Instance {
        value,
        concrete: definition.type_name(),
    })
}
