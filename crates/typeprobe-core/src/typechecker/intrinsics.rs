//! Marker types behind `expectType(...)` chains.
//!
//! A call to `expectType` has an `Assertions` type whose members are one
//! method per assertion name, a `not` member with the negated mirror and a
//! sentinel property carrying the received type. Calling a method yields an
//! object with a sentinel property describing the assertion. The compiler
//! recognizes calls purely through these sentinel properties.

use super::types::{
    ObjectShape, ParameterInfo, PropertyInfo, Signature, TypeData, TypeId, TypeStore,
};

/// Property carrying the received type on `expectType(...)`
pub const EXPECT_CALL_PROPERTY: &str = "[typeprobe.expectCall]";
/// Property describing an assertion on `expectType(...).toXyz(...)`
pub const ASSERTION_CALL_PROPERTY: &str = "[typeprobe.assertionCall]";
/// Property marking the placeholder for a type argument that was not given
pub const NOT_PROVIDED_PROPERTY: &str = "[typeprobe.notProvided]";

pub const ASSERTION_NAME_PROPERTY: &str = "assertionName";
pub const ASSERTION_STATE_PROPERTY: &str = "assertionState";
pub const RECEIVED_TYPE_PROPERTY: &str = "receivedType";
pub const EXPECTED_TYPE_PROPERTY: &str = "expectedType";
pub const NEGATION_PROPERTY: &str = "not";

pub const EXPECT_TYPE_NAME: &str = "expectType";
/// Module specifiers `expectType` can be imported from
pub const MARKER_MODULES: &[&str] = &["typeprobe", "types-testing"];

/// `assertionState` of a plain assertion
pub const STATE_NORMAL: f64 = 0.0;
/// `assertionState` of an assertion reached through `.not`
pub const STATE_NEGATED: f64 = -1.0;

/// Methods declared on `Assertions`, with whether each takes an expected type
pub const ASSERTION_METHODS: &[(&str, bool)] = &[
    ("toBeAny", false),
    ("toBeUnknown", false),
    ("toBeNever", false),
    ("toBeVoid", false),
    ("toBeUndefined", false),
    ("toBeNull", false),
    ("toBeString", false),
    ("toBeNumber", false),
    ("toBeBoolean", false),
    ("toBeStringLiteral", false),
    ("toBeNumberLiteral", false),
    ("toBeBooleanLiteral", false),
    ("toBeTrue", false),
    ("toBeFalse", false),
    ("toBeObject", false),
    ("toBeArray", false),
    ("toBeTuple", false),
    ("toBeFunction", false),
    ("toBeClass", false),
    ("toBeUnion", false),
    ("toBeIntersection", false),
    ("toBe", true),
    ("toEqual", true),
    ("toStrictEqual", true),
    ("toExtends", true),
    ("toAssignable", true),
    ("toCompatible", true),
    ("toExtendsMutually", true),
    ("toAssignableMutually", true),
    ("toMutual", true),
    ("toExtendsEitherWay", true),
    ("toAssignableEitherWay", true),
    ("toRelate", true),
];

pub fn assertion_state(negated: bool) -> f64 {
    if negated {
        STATE_NEGATED
    } else {
        STATE_NORMAL
    }
}

/// `<T = NotProvided>(value?: T) => Assertions<T>`
pub fn expect_type_function(store: &TypeStore) -> TypeId {
    let received = store.common().received_parameter;
    store.function(Signature {
        type_parameters: vec![received],
        parameters: vec![ParameterInfo {
            name: "value".to_string(),
            type_id: received,
            optional: true,
            rest: false,
        }],
        return_type: store.assertions(received, false),
    })
}

/// True for the placeholder standing in for an omitted type argument
pub fn is_not_provided(store: &TypeStore, id: TypeId) -> bool {
    if id == store.common().not_provided {
        return true;
    }
    match &*store.data(id) {
        TypeData::Object { shape, .. } => shape.property(NOT_PROVIDED_PROPERTY).is_some(),
        _ => false,
    }
}

/// Members of `Assertions<received>`
pub fn assertions_shape(store: &TypeStore, received: TypeId, negated: bool) -> ObjectShape {
    let mut properties: Vec<PropertyInfo> = ASSERTION_METHODS
        .iter()
        .map(|(name, needs_expected)| {
            let method = assertion_method(store, name, *needs_expected, received, negated);
            PropertyInfo::new(*name, method).method(true)
        })
        .collect();
    properties.push(PropertyInfo::new(
        NEGATION_PROPERTY,
        store.assertions(received, !negated),
    ));
    properties.push(PropertyInfo::new(EXPECT_CALL_PROPERTY, received));

    ObjectShape {
        properties,
        ..ObjectShape::default()
    }
}

/// `<E = NotProvided>(expected?: E) => AssertionCall` or `() => AssertionCall`
fn assertion_method(
    store: &TypeStore,
    name: &str,
    needs_expected: bool,
    received: TypeId,
    negated: bool,
) -> TypeId {
    let signature = if needs_expected {
        let expected = store.common().expected_parameter;
        Signature {
            type_parameters: vec![expected],
            parameters: vec![ParameterInfo {
                name: "expected".to_string(),
                type_id: expected,
                optional: true,
                rest: false,
            }],
            return_type: assertion_call(store, name, received, expected, negated),
        }
    } else {
        Signature {
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: assertion_call(
                store,
                name,
                received,
                store.common().not_provided,
                negated,
            ),
        }
    };
    store.function(signature)
}

fn assertion_call(
    store: &TypeStore,
    name: &str,
    received: TypeId,
    expected: TypeId,
    negated: bool,
) -> TypeId {
    let details = store.object(ObjectShape {
        properties: vec![
            PropertyInfo::new(ASSERTION_NAME_PROPERTY, store.string_literal(name, false)),
            PropertyInfo::new(
                ASSERTION_STATE_PROPERTY,
                store.number_literal(assertion_state(negated), false),
            ),
            PropertyInfo::new(RECEIVED_TYPE_PROPERTY, received),
            PropertyInfo::new(EXPECTED_TYPE_PROPERTY, expected),
        ],
        ..ObjectShape::default()
    });
    store.object(ObjectShape {
        properties: vec![PropertyInfo::new(ASSERTION_CALL_PROPERTY, details)],
        ..ObjectShape::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertions_shape_exposes_markers() {
        let store = TypeStore::new(true);
        let string = store.common().string;
        let shape = assertions_shape(&store, string, false);

        assert_eq!(shape.property(EXPECT_CALL_PROPERTY).map(|p| p.type_id), Some(string));
        let not = shape.property(NEGATION_PROPERTY).expect("not member");
        assert_eq!(not.type_id, store.assertions(string, true));
        assert!(shape.property("toBe").is_some());
        assert_eq!(shape.properties.len(), ASSERTION_METHODS.len() + 2);
    }

    #[test]
    fn test_not_provided_detection() {
        let store = TypeStore::new(true);
        assert!(is_not_provided(&store, store.common().not_provided));
        assert!(!is_not_provided(&store, store.common().empty_object));
        assert!(!is_not_provided(&store, store.common().never));
    }

    #[test]
    fn test_identical_instantiations_share_ids() {
        let store = TypeStore::new(true);
        let number = store.common().number;
        let first = assertions_shape(&store, number, true);
        let second = assertions_shape(&store, number, true);
        assert_eq!(first, second);
    }
}
