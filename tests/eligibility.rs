//! The eligibility gate: protected-namespace policy at registration time,
//! at construction time, and loaded from configuration.

mod common;

use cloister::{new_object, Blueprint, EligibilityPolicy, Error, Registry};
use common::{demo_policy, NumberGenerator};

#[test]
fn registering_an_unprotected_type_is_a_configuration_error() {
    let foreign = EligibilityPolicy::protecting(["com::example::legacy"]);
    let err = Registry::<NumberGenerator>::create(foreign).unwrap_err();

    assert!(matches!(err, Error::Configuration { .. }));
    assert!(err.to_string().contains("is not protected"));
    assert!(err.to_string().contains("NumberGenerator"));
}

#[test]
fn constructing_an_unprotected_type_is_rejected_before_resolution() {
    let registry = Registry::<NumberGenerator>::create(demo_policy()).unwrap();
    let context = registry.get().unwrap();

    // A general-purpose type outside every protected namespace.
    let plan = Blueprint::for_target::<String>();
    let err = new_object(&context, &plan).unwrap_err();

    assert!(matches!(err, Error::IllegalArgument { .. }));
    let message = err.to_string();
    assert!(message.contains("is not protected"));
    assert!(message.contains("String"));
}

#[test]
fn gate_runs_even_when_the_context_could_never_build_the_type() {
    // The blueprint names an eligible namespace the context knows nothing
    // about: the gate passes, and resolution fails instead.
    let policy = demo_policy().protect("alloc::string");
    let registry = Registry::<NumberGenerator>::create(policy).unwrap();
    let context = registry.get().unwrap();

    let plan = Blueprint::for_target::<String>();
    let err = new_object(&context, &plan).unwrap_err();

    assert!(matches!(err, Error::Construction { .. }));
    assert!(err.to_string().contains("loading context defines"));
}

#[test]
fn policy_can_be_loaded_from_configuration() {
    let raw = r#"{ "protected_prefixes": ["my_app::generators", "my_app::codecs"] }"#;
    let policy: EligibilityPolicy = serde_json::from_str(raw).unwrap();

    assert!(policy.is_eligible("my_app::generators::NumberGenerator"));
    assert!(policy.is_eligible("my_app::codecs::Mp3"));
    assert!(!policy.is_eligible("my_app::io::Socket"));

    let round = serde_json::to_string(&policy).unwrap();
    let back: EligibilityPolicy = serde_json::from_str(&round).unwrap();
    assert_eq!(policy, back);
}
