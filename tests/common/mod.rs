//! Demo legacy types shared by the integration suites.
//!
//! `NumberGenerator` stands in for the "badly written" library type:
//! a naively mutated interior counter (not `Sync`), plus class-level state
//! (a birth counter) that lives with whichever definition constructed the
//! object.

#![allow(dead_code)]

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cloister::{EligibilityPolicy, Isolate, TypeDefinition};

/// The result interface the demo type can be exposed through.
pub trait Generator {
    fn add_and_get(&self, delta: i32) -> i32;
}

pub struct NumberGenerator {
    counter: Cell<i32>,
    births: Arc<AtomicUsize>,
}

impl NumberGenerator {
    fn with_seed(seed: i32, births: &Arc<AtomicUsize>) -> Self {
        births.fetch_add(1, Ordering::Relaxed);
        Self {
            counter: Cell::new(seed),
            births: Arc::clone(births),
        }
    }

    pub fn add_and_get(&self, delta: i32) -> i32 {
        self.counter.set(self.counter.get() + delta);
        self.counter.get()
    }

    /// How many objects this object's *definition* has constructed so far.
    /// Stands in for a static field: shared within a definition, invisible
    /// outside it.
    pub fn births(&self) -> usize {
        self.births.load(Ordering::Relaxed)
    }
}

impl Generator for NumberGenerator {
    fn add_and_get(&self, delta: i32) -> i32 {
        NumberGenerator::add_and_get(self, delta)
    }
}

impl Isolate for NumberGenerator {
    fn define() -> TypeDefinition {
        // Class-level state: created freshly per definition, captured by
        // every member below.
        let births = Arc::new(AtomicUsize::new(0));
        let b0 = Arc::clone(&births);
        let b1 = Arc::clone(&births);
        let b2 = Arc::clone(&births);
        let b3 = Arc::clone(&births);
        TypeDefinition::builder::<Self>()
            .constructor0(move || Ok(Self::with_seed(0, &b0)))
            .constructor1(move |seed: i32| Ok(Self::with_seed(seed, &b1)))
            .factory1("create", move |seed: i32| Ok(Self::with_seed(seed, &b2)))
            .factory1("create", move |seed: i64| {
                Ok(Self::with_seed(i32::try_from(seed)?, &b3))
            })
            .interface::<dyn Generator, _>(|generator| Box::new(generator))
            .finish()
    }
}

/// Policy protecting the namespace the demo types live in, wherever the
/// test binary puts it.
pub fn demo_policy() -> EligibilityPolicy {
    EligibilityPolicy::protecting_namespace_of::<NumberGenerator>()
}
