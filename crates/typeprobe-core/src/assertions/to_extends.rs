use super::factory::Assertion;

pub static TO_EXTENDS: Assertion = Assertion::with_type_argument("toExtends", |checker, received, expected| {
    checker.is_type_assignable_to(received, expected)
});

pub static TO_EXTENDS_MUTUALLY: Assertion =
    Assertion::with_type_argument("toExtendsMutually", |checker, received, expected| {
        checker.is_type_assignable_to(received, expected)
            && checker.is_type_assignable_to(expected, received)
    });

pub static TO_EXTENDS_EITHER_WAY: Assertion =
    Assertion::with_type_argument("toExtendsEitherWay", |checker, received, expected| {
        checker.is_type_assignable_to(received, expected)
            || checker.is_type_assignable_to(expected, received)
    });
