//! The fixed catalog of type assertions.
//!
//! Every entry maps a marker-method name to a static [`Assertion`]. Aliases
//! point at the same static item, so `toEqual` and `toBe` are one assertion.

pub mod factory;
mod to_be;
mod to_extends;

pub use factory::{Assertion, AssertionFn, BinaryPredicate, UnaryPredicate};
pub use to_be::*;
pub use to_extends::*;

static CATALOG: &[(&str, &Assertion)] = &[
    ("toBeAny", &TO_BE_ANY),
    ("toBeUnknown", &TO_BE_UNKNOWN),
    ("toBeNever", &TO_BE_NEVER),
    ("toBeVoid", &TO_BE_VOID),
    ("toBeUndefined", &TO_BE_UNDEFINED),
    ("toBeNull", &TO_BE_NULL),
    ("toBeString", &TO_BE_STRING),
    ("toBeNumber", &TO_BE_NUMBER),
    ("toBeBoolean", &TO_BE_BOOLEAN),
    ("toBeStringLiteral", &TO_BE_STRING_LITERAL),
    ("toBeNumberLiteral", &TO_BE_NUMBER_LITERAL),
    ("toBeBooleanLiteral", &TO_BE_BOOLEAN_LITERAL),
    ("toBeTrue", &TO_BE_TRUE),
    ("toBeFalse", &TO_BE_FALSE),
    ("toBeObject", &TO_BE_OBJECT),
    ("toBeArray", &TO_BE_ARRAY),
    ("toBeTuple", &TO_BE_TUPLE),
    ("toBeFunction", &TO_BE_FUNCTION),
    ("toBeClass", &TO_BE_CLASS),
    ("toBeUnion", &TO_BE_UNION),
    ("toBeIntersection", &TO_BE_INTERSECTION),
    ("toBe", &TO_BE),
    ("toEqual", &TO_BE),
    ("toStrictEqual", &TO_BE),
    ("toExtends", &TO_EXTENDS),
    ("toAssignable", &TO_EXTENDS),
    ("toCompatible", &TO_EXTENDS),
    ("toExtendsMutually", &TO_EXTENDS_MUTUALLY),
    ("toAssignableMutually", &TO_EXTENDS_MUTUALLY),
    ("toMutual", &TO_EXTENDS_MUTUALLY),
    ("toExtendsEitherWay", &TO_EXTENDS_EITHER_WAY),
    ("toAssignableEitherWay", &TO_EXTENDS_EITHER_WAY),
    ("toRelate", &TO_EXTENDS_EITHER_WAY),
];

/// Assertion registered under `name`
pub fn lookup(name: &str) -> Option<&'static Assertion> {
    CATALOG
        .iter()
        .find(|(entry, _)| *entry == name)
        .map(|(_, assertion)| *assertion)
}

/// Every registered name, aliases included, in catalog order
pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerOptions;
    use crate::typechecker::intrinsics::ASSERTION_METHODS;
    use crate::typechecker::types::{ObjectShape, ParameterInfo, PropertyInfo, Signature};
    use crate::typechecker::TypeChecker;

    fn checker(strict: bool) -> TypeChecker {
        TypeChecker::empty(&CompilerOptions {
            strict: Some(strict),
            ..CompilerOptions::default()
        })
    }

    #[test]
    fn test_catalog_matches_marker_methods() {
        let catalog: Vec<&str> = names().collect();
        let methods: Vec<&str> = ASSERTION_METHODS.iter().map(|(name, _)| *name).collect();
        assert_eq!(catalog.len(), methods.len());
        for (name, needs_expected) in ASSERTION_METHODS {
            let assertion = lookup(name).unwrap_or_else(|| panic!("missing {}", name));
            assert_eq!(assertion.needs_type_argument(), *needs_expected, "{}", name);
        }
    }

    #[test]
    fn test_aliases_share_identity() {
        let to_be = lookup("toBe").unwrap();
        assert!(std::ptr::eq(to_be, lookup("toEqual").unwrap()));
        assert!(std::ptr::eq(to_be, lookup("toStrictEqual").unwrap()));
        assert!(std::ptr::eq(lookup("toExtends").unwrap(), lookup("toCompatible").unwrap()));
        assert!(std::ptr::eq(lookup("toMutual").unwrap(), lookup("toExtendsMutually").unwrap()));
        assert!(std::ptr::eq(lookup("toRelate").unwrap(), lookup("toAssignableEitherWay").unwrap()));
        assert!(lookup("toBeSomething").is_none());
    }

    #[test]
    fn test_primitive_predicates() {
        let checker = checker(true);
        let store = checker.store();
        let common = *store.common();
        let hello = store.string_literal("hello", false);
        let one = store.number_literal(1.0, true);

        assert!(TO_BE_STRING.evaluate(&checker, common.string, None));
        assert!(TO_BE_STRING.evaluate(&checker, hello, None));
        assert!(!TO_BE_STRING_LITERAL.evaluate(&checker, common.string, None));
        assert!(TO_BE_STRING_LITERAL.evaluate(&checker, hello, None));
        assert!(TO_BE_NUMBER.evaluate(&checker, one, None));
        assert!(TO_BE_NUMBER_LITERAL.evaluate(&checker, one, None));
        assert!(!TO_BE_NUMBER.evaluate(&checker, hello, None));
        assert!(TO_BE_ANY.evaluate(&checker, common.any, None));
        assert!(!TO_BE_ANY.evaluate(&checker, common.unknown, None));
        assert!(TO_BE_NEVER.evaluate(&checker, common.never, None));
        assert!(TO_BE_NULL.evaluate(&checker, common.null, None));
        assert!(TO_BE_UNDEFINED.evaluate(&checker, common.undefined, None));
        assert!(TO_BE_VOID.evaluate(&checker, common.void, None));
    }

    #[test]
    fn test_boolean_predicates() {
        let checker = checker(true);
        let store = checker.store();
        let common = *store.common();
        let fresh_true = store.boolean_literal(true, true);

        assert!(TO_BE_BOOLEAN.evaluate(&checker, common.boolean, None));
        assert!(TO_BE_BOOLEAN.evaluate(&checker, common.false_type, None));
        assert!(!TO_BE_BOOLEAN_LITERAL.evaluate(&checker, common.boolean, None));
        assert!(TO_BE_TRUE.evaluate(&checker, common.true_type, None));
        assert!(TO_BE_TRUE.evaluate(&checker, fresh_true, None));
        assert!(!TO_BE_TRUE.evaluate(&checker, common.boolean, None));
        assert!(TO_BE_FALSE.evaluate(&checker, common.false_type, None));
        assert!(!TO_BE_FALSE.evaluate(&checker, common.true_type, None));
    }

    #[test]
    fn test_structural_predicates() {
        let checker = checker(true);
        let store = checker.store();
        let common = *store.common();
        let array = store.array(common.string, false);
        let tuple = store.tuple(vec![common.string, common.number], false);
        let function = store.function(Signature {
            type_parameters: Vec::new(),
            parameters: vec![ParameterInfo {
                name: "value".to_string(),
                type_id: common.number,
                optional: false,
                rest: false,
            }],
            return_type: common.void,
        });
        let object = store.object(ObjectShape {
            properties: vec![PropertyInfo::new("a", common.string)],
            ..ObjectShape::default()
        });
        let union = store.union(vec![common.string, common.number]);
        let intersection = store.intersection(vec![object, function]);

        assert!(TO_BE_ARRAY.evaluate(&checker, array, None));
        assert!(TO_BE_ARRAY.evaluate(&checker, tuple, None));
        assert!(!TO_BE_TUPLE.evaluate(&checker, array, None));
        assert!(TO_BE_TUPLE.evaluate(&checker, tuple, None));
        assert!(TO_BE_FUNCTION.evaluate(&checker, function, None));
        assert!(!TO_BE_FUNCTION.evaluate(&checker, object, None));
        assert!(TO_BE_OBJECT.evaluate(&checker, object, None));
        assert!(TO_BE_OBJECT.evaluate(&checker, array, None));
        assert!(!TO_BE_OBJECT.evaluate(&checker, common.string, None));
        assert!(TO_BE_UNION.evaluate(&checker, union, None));
        assert!(!TO_BE_UNION.evaluate(&checker, common.string, None));
        assert!(TO_BE_INTERSECTION.evaluate(&checker, intersection, None));
        assert!(!TO_BE_CLASS.evaluate(&checker, object, None));
    }

    #[test]
    fn test_to_be_treats_any_as_distinct() {
        let checker = checker(true);
        let common = *checker.store().common();

        assert!(TO_BE.evaluate(&checker, common.any, Some(common.any)));
        assert!(!TO_BE.evaluate(&checker, common.any, Some(common.string)));
        assert!(!TO_BE.evaluate(&checker, common.string, Some(common.any)));
        assert!(TO_BE.evaluate(&checker, common.string, Some(common.string)));
        assert!(!TO_BE.evaluate(&checker, common.string, None));
    }

    #[test]
    fn test_relation_predicates() {
        let checker = checker(true);
        let store = checker.store();
        let common = *store.common();
        let literal = store.string_literal("a", false);

        assert!(TO_EXTENDS.evaluate(&checker, literal, Some(common.string)));
        assert!(!TO_EXTENDS.evaluate(&checker, common.string, Some(literal)));
        assert!(!TO_EXTENDS_MUTUALLY.evaluate(&checker, literal, Some(common.string)));
        assert!(TO_EXTENDS_EITHER_WAY.evaluate(&checker, common.string, Some(literal)));
        assert!(!TO_EXTENDS_EITHER_WAY.evaluate(&checker, common.string, Some(common.number)));
    }
}
