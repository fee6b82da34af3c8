use super::factory::Assertion;
use crate::typechecker::{Intrinsic, LiteralValue, TypeChecker, TypeId};

fn is_intrinsic(checker: &TypeChecker, received: TypeId, intrinsic: Intrinsic) -> bool {
    checker.intrinsic_of(received) == Some(intrinsic)
}

fn is_string_literal(checker: &TypeChecker, received: TypeId) -> bool {
    matches!(checker.literal_of(received), Some(LiteralValue::String(_)))
}

fn is_number_literal(checker: &TypeChecker, received: TypeId) -> bool {
    matches!(checker.literal_of(received), Some(LiteralValue::Number(_)))
}

fn is_boolean_literal(checker: &TypeChecker, received: TypeId, value: Option<bool>) -> bool {
    match checker.literal_of(received) {
        Some(LiteralValue::Boolean(flag)) => value.map_or(true, |value| value == flag),
        _ => false,
    }
}

pub static TO_BE_ANY: Assertion = Assertion::without_type_argument("toBeAny", |checker, received| {
    is_intrinsic(checker, received, Intrinsic::Any)
});

pub static TO_BE_UNKNOWN: Assertion =
    Assertion::without_type_argument("toBeUnknown", |checker, received| {
        is_intrinsic(checker, received, Intrinsic::Unknown)
    });

pub static TO_BE_NEVER: Assertion = Assertion::without_type_argument("toBeNever", |checker, received| {
    is_intrinsic(checker, received, Intrinsic::Never)
});

pub static TO_BE_VOID: Assertion = Assertion::without_type_argument("toBeVoid", |checker, received| {
    is_intrinsic(checker, received, Intrinsic::Void)
});

pub static TO_BE_UNDEFINED: Assertion =
    Assertion::without_type_argument("toBeUndefined", |checker, received| {
        is_intrinsic(checker, received, Intrinsic::Undefined)
    });

pub static TO_BE_NULL: Assertion = Assertion::without_type_argument("toBeNull", |checker, received| {
    is_intrinsic(checker, received, Intrinsic::Null)
});

pub static TO_BE_STRING: Assertion = Assertion::without_type_argument("toBeString", |checker, received| {
    is_intrinsic(checker, received, Intrinsic::String) || is_string_literal(checker, received)
});

pub static TO_BE_STRING_LITERAL: Assertion =
    Assertion::without_type_argument("toBeStringLiteral", is_string_literal);

pub static TO_BE_NUMBER: Assertion = Assertion::without_type_argument("toBeNumber", |checker, received| {
    is_intrinsic(checker, received, Intrinsic::Number) || is_number_literal(checker, received)
});

pub static TO_BE_NUMBER_LITERAL: Assertion =
    Assertion::without_type_argument("toBeNumberLiteral", is_number_literal);

pub static TO_BE_BOOLEAN: Assertion =
    Assertion::without_type_argument("toBeBoolean", |checker, received| {
        is_intrinsic(checker, received, Intrinsic::Boolean)
            || is_boolean_literal(checker, received, None)
    });

pub static TO_BE_BOOLEAN_LITERAL: Assertion =
    Assertion::without_type_argument("toBeBooleanLiteral", |checker, received| {
        is_boolean_literal(checker, received, None)
    });

pub static TO_BE_TRUE: Assertion = Assertion::without_type_argument("toBeTrue", |checker, received| {
    received == checker.true_type() || is_boolean_literal(checker, received, Some(true))
});

pub static TO_BE_FALSE: Assertion = Assertion::without_type_argument("toBeFalse", |checker, received| {
    received == checker.false_type() || is_boolean_literal(checker, received, Some(false))
});

pub static TO_BE_OBJECT: Assertion = Assertion::without_type_argument("toBeObject", |checker, received| {
    checker.is_object_type(received)
});

pub static TO_BE_ARRAY: Assertion = Assertion::without_type_argument("toBeArray", |checker, received| {
    checker.is_array_type(received) || checker.is_tuple_type(received)
});

pub static TO_BE_TUPLE: Assertion = Assertion::without_type_argument("toBeTuple", |checker, received| {
    checker.is_tuple_type(received)
});

pub static TO_BE_FUNCTION: Assertion =
    Assertion::without_type_argument("toBeFunction", |checker, received| {
        !checker.call_signatures(received).is_empty()
    });

pub static TO_BE_CLASS: Assertion = Assertion::without_type_argument("toBeClass", |checker, received| {
    checker.is_class_instance(received)
});

pub static TO_BE_UNION: Assertion = Assertion::without_type_argument("toBeUnion", |checker, received| {
    checker.is_union_type(received)
});

pub static TO_BE_INTERSECTION: Assertion =
    Assertion::without_type_argument("toBeIntersection", |checker, received| {
        checker.is_intersection_type(received)
    });

/// Mutual assignability, with `any` only equal to itself
pub static TO_BE: Assertion = Assertion::with_type_argument("toBe", |checker, received, expected| {
    let received_any = is_intrinsic(checker, received, Intrinsic::Any);
    let expected_any = is_intrinsic(checker, expected, Intrinsic::Any);
    if received_any || expected_any {
        return received_any && expected_any;
    }
    checker.is_type_assignable_to(received, expected) && checker.is_type_assignable_to(expected, received)
});
