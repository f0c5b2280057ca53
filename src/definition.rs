//! Per-thread type definitions: the factory-function registry that stands in
//! for reflective member lookup.
//!
//! Rust has no runtime member reflection, so a target type opts into
//! isolation by implementing [`Isolate`] and describing its constructors,
//! factory methods, and exposable interfaces in a [`TypeDefinition`]. The
//! crucial property is freshness: [`Isolate::define`] is called once per
//! loading context, and any class-level state the type needs (counters,
//! caches — the moral equivalent of static fields) is created *inside*
//! `define` and captured by the registered closures. Two definitions
//! therefore never share that state, which is exactly what makes one
//! definition per thread an isolation mechanism.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::blueprint::{Arg, ArgType};
use crate::error::{BoxError, Error, Result};

/// Identity of one freshly built [`TypeDefinition`].
///
/// Two definitions built by separate `define` calls always compare unequal,
/// even for the same target type; this is how callers observe that two
/// threads really were given distinct definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefinitionId(u64);

static NEXT_DEFINITION_ID: AtomicU64 = AtomicU64::new(1);

impl DefinitionId {
    fn next() -> Self {
        Self(NEXT_DEFINITION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A type that can be isolated per thread.
///
/// Implementations build a fresh definition on every call. State created in
/// `define` and captured by the registered members plays the role of the
/// type's static fields: shared between objects built from the same
/// definition, invisible to every other definition.
pub trait Isolate: Any + Sized {
    /// Builds a fresh definition, including fresh class-level state.
    fn define() -> TypeDefinition;
}

type Invoke = Box<dyn Fn(&[Arg]) -> Result<Box<dyn Any>> + Send + Sync>;
type InterfaceCast = Box<dyn Fn(Box<dyn Any>) -> Option<Box<dyn Any>> + Send + Sync>;

#[derive(PartialEq, Eq, Hash)]
struct MemberKey {
    /// `None` for a constructor, `Some` for a named factory method.
    name: Option<Box<str>>,
    params: Box<[TypeId]>,
}

struct Member {
    params: Box<[ArgType]>,
    invoke: Invoke,
}

struct InterfaceEntry {
    cast: InterfaceCast,
}

/// The member table of one per-context type definition.
///
/// Maps (member name, exact parameter signature) to an invokable factory
/// closure, and interface types to casters that re-box a constructed value
/// as that trait object.
pub struct TypeDefinition {
    id: DefinitionId,
    type_id: TypeId,
    type_name: &'static str,
    members: HashMap<MemberKey, Member>,
    interfaces: HashMap<TypeId, InterfaceEntry>,
}

impl TypeDefinition {
    /// Starts building a definition for `T`.
    pub fn builder<T: Any>() -> DefinitionBuilder<T> {
        DefinitionBuilder {
            def: TypeDefinition {
                id: DefinitionId::next(),
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                members: HashMap::new(),
                interfaces: HashMap::new(),
            },
            _target: PhantomData,
        }
    }

    /// This definition's unique identity.
    #[inline]
    pub fn id(&self) -> DefinitionId {
        self.id
    }

    /// The defined type's `TypeId`.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The defined type's fully-qualified name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Resolves and invokes the member with the exact signature.
    ///
    /// `requested` is the caller-facing rendering of the signature, used in
    /// the no-match error together with the candidate list.
    pub(crate) fn call(
        &self,
        factory: Option<&str>,
        signature: &[TypeId],
        requested: &str,
        args: &[Arg],
    ) -> Result<Box<dyn Any>> {
        let key = MemberKey {
            name: factory.map(Box::from),
            params: Box::from(signature),
        };
        if let Some(member) = self.members.get(&key) {
            return (member.invoke)(args);
        }
        let what = match factory {
            None => "constructor".to_string(),
            Some(name) => format!("factory method `{name}`"),
        };
        let mut candidates = self.member_displays();
        candidates.sort_unstable();
        Err(Error::construction(format!(
            "no {what} on `{}` matching ({requested}); candidates: {}",
            self.type_name,
            if candidates.is_empty() {
                "<none>".to_string()
            } else {
                candidates.join(", ")
            },
        )))
    }

    /// Re-boxes `value` as the interface registered under `interface_id`.
    pub(crate) fn cast_interface(
        &self,
        interface_id: TypeId,
        interface_name: &'static str,
        value: Box<dyn Any>,
    ) -> Result<Box<dyn Any>> {
        let entry = self.interfaces.get(&interface_id).ok_or(Error::TypeMismatch {
            type_name: self.type_name,
            interface: interface_name,
        })?;
        (entry.cast)(value).ok_or_else(|| {
            Error::construction(format!(
                "definition for `{}` produced a value of a different type",
                self.type_name
            ))
        })
    }

    fn member_displays(&self) -> Vec<String> {
        self.members
            .iter()
            .map(|(key, member)| {
                let params: Vec<&str> = member.params.iter().map(ArgType::name).collect();
                match &key.name {
                    None => format!("constructor({})", params.join(", ")),
                    Some(name) => format!("{name}({})", params.join(", ")),
                }
            })
            .collect()
    }
}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("members", &self.members.len())
            .field("interfaces", &self.interfaces.len())
            .finish()
    }
}

/// Fluent registration of a type's constructors, factory methods, and
/// interfaces.
///
/// Registered closures return `Result<T, BoxError>`; a failure raised by one
/// surfaces from construction as [`Error::Construction`] with the failure as
/// its cause.
pub struct DefinitionBuilder<T: Any> {
    def: TypeDefinition,
    _target: PhantomData<fn() -> T>,
}

impl<T: Any> DefinitionBuilder<T> {
    /// Registers the zero-argument constructor.
    #[must_use]
    pub fn constructor0<F>(self, f: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let label = format!("constructor of `{}`", type_name::<T>());
        self.register(None, Vec::new(), move |args| {
            expect_arity(args, 0, &label)?;
            finish_member(f(), &label)
        })
    }

    /// Registers a one-argument constructor taking `A`.
    #[must_use]
    pub fn constructor1<A, F>(self, f: F) -> Self
    where
        A: Any + Clone,
        F: Fn(A) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let label = format!("constructor of `{}`", type_name::<T>());
        self.register(None, vec![ArgType::of::<A>()], move |args| {
            expect_arity(args, 1, &label)?;
            let a = arg_at::<A>(args, 0, &label)?;
            finish_member(f(a), &label)
        })
    }

    /// Registers a two-argument constructor taking `A` and `B`.
    #[must_use]
    pub fn constructor2<A, B, F>(self, f: F) -> Self
    where
        A: Any + Clone,
        B: Any + Clone,
        F: Fn(A, B) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let label = format!("constructor of `{}`", type_name::<T>());
        self.register(
            None,
            vec![ArgType::of::<A>(), ArgType::of::<B>()],
            move |args| {
                expect_arity(args, 2, &label)?;
                let a = arg_at::<A>(args, 0, &label)?;
                let b = arg_at::<B>(args, 1, &label)?;
                finish_member(f(a, b), &label)
            },
        )
    }

    /// Registers the zero-argument factory method `name`.
    #[must_use]
    pub fn factory0<F>(self, name: &str, f: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let label = format!("factory `{}::{name}`", type_name::<T>());
        self.register(Some(name), Vec::new(), move |args| {
            expect_arity(args, 0, &label)?;
            finish_member(f(), &label)
        })
    }

    /// Registers the one-argument factory method `name` taking `A`.
    #[must_use]
    pub fn factory1<A, F>(self, name: &str, f: F) -> Self
    where
        A: Any + Clone,
        F: Fn(A) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let label = format!("factory `{}::{name}`", type_name::<T>());
        self.register(Some(name), vec![ArgType::of::<A>()], move |args| {
            expect_arity(args, 1, &label)?;
            let a = arg_at::<A>(args, 0, &label)?;
            finish_member(f(a), &label)
        })
    }

    /// Registers the two-argument factory method `name` taking `A` and `B`.
    #[must_use]
    pub fn factory2<A, B, F>(self, name: &str, f: F) -> Self
    where
        A: Any + Clone,
        B: Any + Clone,
        F: Fn(A, B) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        let label = format!("factory `{}::{name}`", type_name::<T>());
        self.register(
            Some(name),
            vec![ArgType::of::<A>(), ArgType::of::<B>()],
            move |args| {
                expect_arity(args, 2, &label)?;
                let a = arg_at::<A>(args, 0, &label)?;
                let b = arg_at::<B>(args, 1, &label)?;
                finish_member(f(a, b), &label)
            },
        )
    }

    /// Registers interface `I` (a trait object type) with the caster that
    /// re-boxes a constructed `T` as `Box<I>`.
    ///
    /// Rust cannot discover trait implementations at runtime, so a
    /// definition opts in per interface; requesting an unregistered
    /// interface is a type-mismatch error at construction time.
    #[must_use]
    pub fn interface<I, F>(mut self, cast: F) -> Self
    where
        I: Any + ?Sized,
        F: Fn(T) -> Box<I> + Send + Sync + 'static,
    {
        let entry = InterfaceEntry {
            cast: Box::new(move |value: Box<dyn Any>| {
                let concrete = value.downcast::<T>().ok()?;
                Some(Box::new(cast(*concrete)) as Box<dyn Any>)
            }),
        };
        self.def.interfaces.insert(TypeId::of::<I>(), entry);
        self
    }

    /// Finishes the definition.
    pub fn finish(self) -> TypeDefinition {
        self.def
    }

    fn register<F>(mut self, name: Option<&str>, params: Vec<ArgType>, invoke: F) -> Self
    where
        F: Fn(&[Arg]) -> Result<Box<dyn Any>> + Send + Sync + 'static,
    {
        let key = MemberKey {
            name: name.map(Box::from),
            params: params.iter().map(ArgType::id).collect(),
        };
        let member = Member {
            params: params.into_boxed_slice(),
            invoke: Box::new(invoke),
        };
        self.def.members.insert(key, member);
        self
    }
}

fn expect_arity(args: &[Arg], expected: usize, label: &str) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::construction(format!(
            "{label} takes {expected} argument(s), {} supplied",
            args.len()
        )))
    }
}

fn arg_at<A: Any + Clone>(args: &[Arg], index: usize, label: &str) -> Result<A> {
    let arg = &args[index];
    arg.downcast_ref::<A>().cloned().ok_or_else(|| {
        Error::construction(format!(
            "{label} argument {index} is `{}`, expected `{}`",
            arg.type_name(),
            type_name::<A>()
        ))
    })
}

fn finish_member<T: Any>(built: Result<T, BoxError>, label: &str) -> Result<Box<dyn Any>> {
    match built {
        Ok(value) => Ok(Box::new(value) as Box<dyn Any>),
        Err(cause) => Err(Error::construction_with(format!("{label} failed"), cause)),
    }
}
