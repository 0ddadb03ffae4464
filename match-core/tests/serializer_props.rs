//! Property tests for the request-body serializers.

use match_core::validation::{self, NON_FIELD_ERRORS};
use match_core::{CohortInput, FromJson, NewTag, UserInput};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        ".{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::hash_map("[a-zA-Z]{1,10}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn cohort_size_accepted_iff_positive_u32(size in any::<i64>()) {
        let body = json!({"programme": 1, "cohortSize": size, "createdBy": 1});
        let result = CohortInput::from_json(&body);
        let in_range = size >= 1 && u32::try_from(size).is_ok();
        prop_assert_eq!(result.is_ok(), in_range);
        if let Err(errors) = result {
            let expected = if size < 1 {
                validation::MIN_ONE.to_owned()
            } else {
                validation::too_large(u64::from(u32::MAX))
            };
            prop_assert_eq!(errors.messages("cohortSize"), [expected]);
        }
    }

    #[test]
    fn serializers_never_panic_on_arbitrary_json(value in arb_json()) {
        let _ = UserInput::from_json(&value);
        let _ = CohortInput::from_json(&value);
        let _ = NewTag::from_json(&value);
    }

    #[test]
    fn non_object_bodies_report_non_field_error(n in any::<i64>()) {
        let errors = match NewTag::from_json(&json!(n)) {
            Ok(tag) => return Err(TestCaseError::fail(format!("number accepted as tag: {tag:?}"))),
            Err(errors) => errors,
        };
        prop_assert_eq!(errors.len(), 1);
        prop_assert!(errors.get(NON_FIELD_ERRORS).is_some());
    }

    #[test]
    fn non_blank_tag_names_round_trip_trimmed(name in "[a-z][a-z0-9 -]{0,40}[a-z0-9]") {
        let body = json!({"name": format!("  {name}  ")});
        let tag = match NewTag::from_json(&body) {
            Ok(tag) => tag,
            Err(e) => return Err(TestCaseError::fail(format!("valid tag rejected: {e}"))),
        };
        prop_assert_eq!(tag.name, name);
    }
}
