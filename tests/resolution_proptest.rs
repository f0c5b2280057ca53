//! Property tests for the eligibility prefix algebra and for member
//! resolution agreeing between the type-inference path and the
//! explicit-type path.

mod common;

use cloister::{new_object, Arg, ArgType, Blueprint, EligibilityPolicy, Error, Registry};
use common::{demo_policy, NumberGenerator};
use proptest::prelude::*;

proptest! {
    #[test]
    fn eligibility_is_exactly_prefix_membership(
        prefixes in proptest::collection::vec("[a-z]{1,6}(::[a-z]{1,6}){0,2}", 0..4),
        name in "[a-z]{1,6}(::[a-z]{1,6}){0,3}",
    ) {
        let policy = EligibilityPolicy::protecting(prefixes.clone());
        let expected = prefixes.iter().any(|p| name.starts_with(p.as_str()));
        prop_assert_eq!(policy.is_eligible(&name), expected);
    }

    #[test]
    fn explicit_types_and_inference_resolve_the_same_member(seed in -1000_i32..1000) {
        let registry = Registry::<NumberGenerator>::create(demo_policy()).unwrap();
        let context = registry.get().unwrap();

        let inferred = Blueprint::for_target::<NumberGenerator>()
            .factory_method("create")
            .arguments([Arg::new(seed)]);
        let explicit = inferred.clone().argument_types([ArgType::of::<i32>()]);

        let a: NumberGenerator = new_object(&context, &inferred).unwrap().downcast().unwrap();
        let b: NumberGenerator = new_object(&context, &explicit).unwrap().downcast().unwrap();
        prop_assert_eq!(a.add_and_get(7), b.add_and_get(7));
    }

    #[test]
    fn surplus_arguments_always_fail_resolution(extra in 2_usize..5) {
        let registry = Registry::<NumberGenerator>::create(demo_policy()).unwrap();
        let context = registry.get().unwrap();

        let args: Vec<Arg> = (0..extra).map(|i| Arg::new(i as i32)).collect();
        let plan = Blueprint::for_target::<NumberGenerator>()
            .factory_method("create")
            .arguments(args);

        let err = new_object(&context, &plan).unwrap_err();
        let is_construction = matches!(err, Error::Construction { .. });
        prop_assert!(is_construction);
    }
}
