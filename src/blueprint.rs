//! Declarative construction blueprints.
//!
//! A [`Blueprint`] describes *how* to build one object of a target type:
//! default constructor, constructor with arguments, or a named factory
//! method, optionally exposed through a result interface instead of the
//! concrete type. The builder is fluent and side-effect-free; nothing
//! happens until the blueprint is handed to
//! [`new_object`](crate::new_object) together with a loading context.
//!
//! Argument values are shareable, so a blueprint may be reused for any
//! number of constructions, though nothing requires it to be.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A type-erased argument value for a constructor or factory method.
///
/// The value's runtime type is recorded at capture time and used for
/// overload resolution unless the blueprint supplies explicit
/// [`ArgType`]s.
#[derive(Clone)]
pub struct Arg {
    value: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
}

impl Arg {
    /// Captures `value` together with its runtime type.
    pub fn new<A: Any + Send + Sync>(value: A) -> Self {
        Self {
            value: Arc::new(value),
            type_id: TypeId::of::<A>(),
            type_name: type_name::<A>(),
        }
    }

    /// The captured value's `TypeId`.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The captured value's fully-qualified type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrows the value as `A`, if that is what was captured.
    pub(crate) fn downcast_ref<A: Any>(&self) -> Option<&A> {
        self.value.downcast_ref()
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Arg<{}>", self.type_name)
    }
}

/// An explicit parameter type used verbatim for overload resolution.
///
/// Exists to disambiguate overloads that differ only in numeric type, where
/// inference from a value alone would pick the wrong member (`i32` vs `i64`
/// and friends).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgType {
    id: TypeId,
    name: &'static str,
}

impl ArgType {
    /// The explicit parameter type `A`.
    pub fn of<A: Any>() -> Self {
        Self {
            id: TypeId::of::<A>(),
            name: type_name::<A>(),
        }
    }

    /// The parameter's `TypeId`.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The parameter's fully-qualified type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// An immutable-once-built description of one construction.
///
/// Seed it with [`Blueprint::for_target`] and refine it with the chainable
/// methods; no field excludes another. An absent factory method means
/// "construct via a constructor"; absent arguments mean no-argument
/// construction, exactly as an explicitly empty argument-type list does.
#[derive(Debug, Clone)]
pub struct Blueprint {
    target_id: TypeId,
    target_name: &'static str,
    result_interface: Option<(TypeId, &'static str)>,
    factory_method: Option<String>,
    arguments: Vec<Arg>,
    argument_types: Option<Vec<ArgType>>,
}

impl Blueprint {
    /// Starts a blueprint for building a `T`.
    ///
    /// `T` needs no trait beyond `Any`: eligibility is the gate's decision,
    /// made when the blueprint is consumed, so a blueprint naming an
    /// unprotected type is representable and rejected at that point.
    pub fn for_target<T: Any>() -> Self {
        Self {
            target_id: TypeId::of::<T>(),
            target_name: type_name::<T>(),
            result_interface: None,
            factory_method: None,
            arguments: Vec::new(),
            argument_types: None,
        }
    }

    /// Requests the constructed object through interface `I` (a trait
    /// object type such as `dyn Generator`) instead of the concrete type.
    #[must_use]
    pub fn implementing<I: Any + ?Sized>(mut self) -> Self {
        self.result_interface = Some((TypeId::of::<I>(), type_name::<I>()));
        self
    }

    /// Constructs through the named factory method instead of a constructor.
    #[must_use]
    pub fn factory_method(mut self, name: impl Into<String>) -> Self {
        self.factory_method = Some(name.into());
        self
    }

    /// Supplies the ordered argument values.
    #[must_use]
    pub fn arguments(mut self, args: impl IntoIterator<Item = Arg>) -> Self {
        self.arguments = args.into_iter().collect();
        self
    }

    /// Supplies explicit ordered parameter types, used verbatim for member
    /// resolution in place of the arguments' inferred runtime types.
    #[must_use]
    pub fn argument_types(mut self, types: impl IntoIterator<Item = ArgType>) -> Self {
        self.argument_types = Some(types.into_iter().collect());
        self
    }

    /// The target type's `TypeId`.
    #[inline]
    pub fn target_id(&self) -> TypeId {
        self.target_id
    }

    /// The target type's fully-qualified name.
    #[inline]
    pub fn target_name(&self) -> &'static str {
        self.target_name
    }

    /// The requested factory method, if any.
    pub fn factory(&self) -> Option<&str> {
        self.factory_method.as_deref()
    }

    /// The ordered argument values.
    pub fn args(&self) -> &[Arg] {
        &self.arguments
    }

    /// The requested result interface, if any, as (id, name).
    pub(crate) fn result_interface(&self) -> Option<(TypeId, &'static str)> {
        self.result_interface
    }

    /// The signature used for member resolution: explicit types verbatim
    /// when supplied, otherwise the arguments' inferred runtime types.
    pub(crate) fn signature(&self) -> Vec<TypeId> {
        match &self.argument_types {
            Some(types) => types.iter().map(ArgType::id).collect(),
            None => self.arguments.iter().map(Arg::type_id).collect(),
        }
    }

    /// Human-readable rendering of the resolution signature, for errors.
    pub(crate) fn signature_display(&self) -> String {
        let names: Vec<&str> = match &self.argument_types {
            Some(types) => types.iter().map(|t| t.name).collect(),
            None => self.arguments.iter().map(Arg::type_name).collect(),
        };
        names.join(", ")
    }
}
