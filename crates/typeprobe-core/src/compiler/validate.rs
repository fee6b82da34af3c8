use crate::assertions::Assertion;
use crate::typechecker::{TypeChecker, TypeId};

pub struct ValidateAssertionParams<'a> {
    pub checker: &'a TypeChecker,
    pub received: TypeId,
    pub expected: Option<TypeId>,
    pub is_negated: bool,
}

/// Evaluate `assertion`, inverted when the call went through `.not`
pub fn validate_assertion(assertion: &Assertion, params: ValidateAssertionParams<'_>) -> bool {
    let result = assertion.evaluate(params.checker, params.received, params.expected);
    if params.is_negated {
        !result
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertions;
    use crate::config::CompilerOptions;
    use proptest::prelude::*;

    fn checker() -> TypeChecker {
        TypeChecker::empty(&CompilerOptions {
            strict: Some(true),
            ..CompilerOptions::default()
        })
    }

    /// A handful of distinct types to relate
    fn sample_types(checker: &TypeChecker) -> Vec<TypeId> {
        let store = checker.store();
        let common = *store.common();
        vec![
            common.any,
            common.unknown,
            common.never,
            common.string,
            common.number,
            common.boolean,
            common.null,
            common.undefined,
            store.string_literal("a", false),
            store.number_literal(2.0, false),
            store.array(common.number, false),
            store.union(vec![common.string, common.number]),
        ]
    }

    #[test]
    fn test_negation_inverts() {
        let checker = checker();
        let string = checker.store().common().string;
        let to_be_string = assertions::lookup("toBeString").unwrap();
        let params = |is_negated| ValidateAssertionParams {
            checker: &checker,
            received: string,
            expected: None,
            is_negated,
        };
        assert!(validate_assertion(to_be_string, params(false)));
        assert!(!validate_assertion(to_be_string, params(true)));
    }

    proptest! {
        #[test]
        fn test_negated_is_the_inverse(name_index in 0usize..33, received in 0usize..12, expected in proptest::option::of(0usize..12)) {
            let checker = checker();
            let types = sample_types(&checker);
            let name = assertions::names().nth(name_index).unwrap();
            let assertion = assertions::lookup(name).unwrap();
            let run = |is_negated| validate_assertion(assertion, ValidateAssertionParams {
                checker: &checker,
                received: types[received],
                expected: expected.map(|index| types[index]),
                is_negated,
            });
            prop_assert_eq!(run(true), !run(false));
        }
    }
}
