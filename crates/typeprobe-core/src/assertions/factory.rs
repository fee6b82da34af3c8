use crate::typechecker::{TypeChecker, TypeId};
use std::fmt;

pub type UnaryPredicate = fn(&TypeChecker, TypeId) -> bool;
pub type BinaryPredicate = fn(&TypeChecker, TypeId, TypeId) -> bool;

/// Raw predicate of an assertion
#[derive(Clone, Copy)]
pub enum AssertionFn {
    /// Looks at the received type only
    Unary(UnaryPredicate),
    /// Relates the received type to an expected type argument
    Binary(BinaryPredicate),
}

/// A named predicate over static types
pub struct Assertion {
    pub name: &'static str,
    pub predicate: AssertionFn,
}

impl Assertion {
    pub const fn without_type_argument(name: &'static str, predicate: UnaryPredicate) -> Self {
        Assertion {
            name,
            predicate: AssertionFn::Unary(predicate),
        }
    }

    pub const fn with_type_argument(name: &'static str, predicate: BinaryPredicate) -> Self {
        Assertion {
            name,
            predicate: AssertionFn::Binary(predicate),
        }
    }

    /// Whether the assertion relates the received type to an expected one
    pub fn needs_type_argument(&self) -> bool {
        matches!(self.predicate, AssertionFn::Binary(_))
    }

    /// Apply the predicate; a binary predicate without an expected type fails
    pub fn evaluate(&self, checker: &TypeChecker, received: TypeId, expected: Option<TypeId>) -> bool {
        match (self.predicate, expected) {
            (AssertionFn::Unary(predicate), _) => predicate(checker, received),
            (AssertionFn::Binary(predicate), Some(expected)) => predicate(checker, received, expected),
            (AssertionFn::Binary(_), None) => false,
        }
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion")
            .field("name", &self.name)
            .field("needs_type_argument", &self.needs_type_argument())
            .finish()
    }
}

impl PartialEq for Assertion {
    /// Aliases share one static item, so identity is equality
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for Assertion {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerOptions;

    fn always(_: &TypeChecker, _: TypeId) -> bool {
        true
    }

    fn same(_: &TypeChecker, received: TypeId, expected: TypeId) -> bool {
        received == expected
    }

    #[test]
    fn test_arity_flag() {
        assert!(!Assertion::without_type_argument("a", always).needs_type_argument());
        assert!(Assertion::with_type_argument("b", same).needs_type_argument());
    }

    #[test]
    fn test_binary_without_expected_fails() {
        let checker = TypeChecker::empty(&CompilerOptions::default());
        let string = checker.store().common().string;
        let assertion = Assertion::with_type_argument("same", same);

        assert!(assertion.evaluate(&checker, string, Some(string)));
        assert!(!assertion.evaluate(&checker, string, None));
    }

    #[test]
    fn test_unary_ignores_expected() {
        let checker = TypeChecker::empty(&CompilerOptions::default());
        let number = checker.store().common().number;
        let assertion = Assertion::without_type_argument("always", always);
        assert!(assertion.evaluate(&checker, number, None));
        assert!(assertion.evaluate(&checker, number, Some(number)));
    }
}
