use super::generics::{instantiate_signature, TypeMapping};
use super::type_checker::TypeChecker;
use super::types::{Intrinsic, ObjectShape, PropertyInfo, Signature, TypeData, TypeId};
use rustc_hash::FxHashSet;

/// Past this depth a comparison is assumed to hold
const MAX_RELATION_DEPTH: usize = 40;

/// Structural assignability between two types of one checker
pub struct TypeCompatibility<'c> {
    checker: &'c TypeChecker,
    /// Pairs currently being compared; revisiting one assumes success
    assumptions: FxHashSet<(TypeId, TypeId)>,
    depth: usize,
    /// Parameters compare in both directions (method members)
    bivariant: bool,
}

impl<'c> TypeCompatibility<'c> {
    pub fn new(checker: &'c TypeChecker) -> Self {
        TypeCompatibility {
            checker,
            assumptions: FxHashSet::default(),
            depth: 0,
            bivariant: false,
        }
    }

    /// Check if `source` is assignable to `target`
    pub fn is_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        if source == target {
            return true;
        }

        let store = self.checker.store();
        let common = *store.common();

        // Top and bottom types
        if target == common.any || target == common.unknown {
            return true;
        }
        if source == common.any {
            return target != common.never;
        }
        if source == common.never {
            return true;
        }
        if target == common.never || source == common.unknown {
            return false;
        }

        // null and undefined
        if source == common.null || source == common.undefined {
            if !store.strict_null_checks() {
                return true;
            }
            if source == common.undefined && target == common.void {
                return true;
            }
        }

        let source_data = store.data(source);
        let target_data = store.data(target);

        if let TypeData::Union { members, .. } = &*source_data {
            return members.iter().all(|member| self.is_assignable(*member, target));
        }
        if let TypeData::Union { members, .. } = &*target_data {
            return members.iter().any(|member| self.is_assignable(source, *member));
        }
        if let TypeData::Intersection(members) = &*target_data {
            return members.iter().all(|member| self.is_assignable(source, *member));
        }
        if let TypeData::Intersection(members) = &*source_data {
            if members.iter().any(|member| self.is_assignable(*member, target)) {
                return true;
            }
            return self.is_object_like(target) && self.is_structurally_assignable(source, target);
        }

        // Type parameters relate only through their constraint
        if let TypeData::Parameter(_) = &*source_data {
            return match store.type_parameter(source).and_then(|info| info.constraint) {
                Some(constraint) => self.is_assignable(constraint, target),
                None => false,
            };
        }
        if let TypeData::Parameter(_) = &*target_data {
            return false;
        }

        match (&*source_data, &*target_data) {
            (TypeData::Literal { value: s, .. }, TypeData::Literal { value: t, .. }) => {
                return s == t;
            }
            (TypeData::Literal { value, .. }, TypeData::Intrinsic(intrinsic)) => {
                return value.base() == *intrinsic;
            }
            (TypeData::Intrinsic(_), TypeData::Literal { .. }) => return false,
            (TypeData::Intrinsic(s), TypeData::Intrinsic(t)) => {
                return s == t;
            }
            (TypeData::Intrinsic(Intrinsic::NonPrimitive), _) => {
                return self.checker.apparent_shape(target).is_empty();
            }
            (TypeData::Intrinsic(intrinsic), _) if !self.has_wrapper(*intrinsic) => return false,
            (_, TypeData::Intrinsic(Intrinsic::NonPrimitive)) => {
                return self.is_object_like(source);
            }
            (_, TypeData::Intrinsic(_)) => return false,
            _ => {}
        }

        match (&*source_data, &*target_data) {
            (
                TypeData::Array {
                    element: s,
                    readonly: s_readonly,
                },
                TypeData::Array {
                    element: t,
                    readonly: t_readonly,
                },
            ) => {
                return (*t_readonly || !*s_readonly) && self.is_assignable(*s, *t);
            }
            (
                TypeData::Tuple {
                    elements,
                    readonly: s_readonly,
                },
                TypeData::Array {
                    element,
                    readonly: t_readonly,
                },
            ) => {
                return (*t_readonly || !*s_readonly)
                    && elements.iter().all(|e| self.is_assignable(*e, *element));
            }
            (TypeData::Array { .. }, TypeData::Tuple { .. }) => return false,
            (
                TypeData::Tuple {
                    elements: s,
                    readonly: s_readonly,
                },
                TypeData::Tuple {
                    elements: t,
                    readonly: t_readonly,
                },
            ) => {
                return (*t_readonly || !*s_readonly)
                    && s.len() == t.len()
                    && s.iter().zip(t.iter()).all(|(s, t)| self.is_assignable(*s, *t));
            }
            (
                TypeData::Named { decl: sd, args: sa },
                TypeData::Named { decl: td, args: ta },
            ) if sd == td && sa.len() == ta.len() => {
                if sa.iter().zip(ta.iter()).all(|(s, t)| self.is_assignable(*s, *t)) {
                    return true;
                }
            }
            (
                TypeData::Assertions {
                    received: s,
                    negated: sn,
                },
                TypeData::Assertions {
                    received: t,
                    negated: tn,
                },
            ) if sn == tn => {
                return self.is_assignable(*s, *t) && self.is_assignable(*t, *s);
            }
            _ => {}
        }

        if !self.is_object_like(target) {
            return false;
        }
        self.is_structurally_assignable(source, target)
    }

    /// Primitives with a library interface compare structurally against objects
    fn has_wrapper(&self, intrinsic: Intrinsic) -> bool {
        matches!(
            intrinsic,
            Intrinsic::String | Intrinsic::Number | Intrinsic::Boolean
        )
    }

    fn is_object_like(&self, id: TypeId) -> bool {
        match &*self.checker.store().data(id) {
            TypeData::Object { .. }
            | TypeData::Named { .. }
            | TypeData::Array { .. }
            | TypeData::Tuple { .. }
            | TypeData::Assertions { .. } => true,
            TypeData::Intrinsic(intrinsic) => *intrinsic == Intrinsic::NonPrimitive,
            TypeData::Intersection(members) => members.iter().any(|m| self.is_object_like(*m)),
            _ => false,
        }
    }

    fn is_structurally_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        if self.depth >= MAX_RELATION_DEPTH || self.assumptions.contains(&(source, target)) {
            return true;
        }

        self.assumptions.insert((source, target));
        self.depth += 1;
        let source_shape = self.checker.apparent_shape(source);
        let target_shape = self.checker.apparent_shape(target);
        let allows_implicit_index = matches!(
            &*self.checker.store().data(source),
            TypeData::Object { .. } | TypeData::Intersection(_)
        );
        let result = self.is_shape_assignable(&source_shape, &target_shape, allows_implicit_index);
        self.depth -= 1;
        self.assumptions.remove(&(source, target));
        result
    }

    fn is_shape_assignable(
        &mut self,
        source: &ObjectShape,
        target: &ObjectShape,
        allows_implicit_index: bool,
    ) -> bool {
        for property in &target.properties {
            match source.property(&property.name) {
                Some(source_property) => {
                    if !self.is_property_assignable(source_property, property) {
                        return false;
                    }
                }
                None if property.optional => {}
                None => return false,
            }
        }

        for signature in &target.call_signatures {
            if !source
                .call_signatures
                .iter()
                .any(|s| self.is_signature_assignable(s, signature))
            {
                return false;
            }
        }
        for signature in &target.construct_signatures {
            if !source
                .construct_signatures
                .iter()
                .any(|s| self.is_signature_assignable(s, signature))
            {
                return false;
            }
        }

        if let Some(index) = target.string_index {
            match source.string_index {
                Some(source_index) => {
                    if !self.is_assignable(source_index, index) {
                        return false;
                    }
                }
                None if !allows_implicit_index => return false,
                None => {}
            }
            let properties: Vec<TypeId> = source.properties.iter().map(|p| p.type_id).collect();
            if !properties.into_iter().all(|p| self.is_assignable(p, index)) {
                return false;
            }
        }

        if let Some(index) = target.number_index {
            match source.number_index.or(source.string_index) {
                Some(source_index) => {
                    if !self.is_assignable(source_index, index) {
                        return false;
                    }
                }
                None if !allows_implicit_index => return false,
                None => {}
            }
        }

        true
    }

    fn is_property_assignable(&mut self, source: &PropertyInfo, target: &PropertyInfo) -> bool {
        if source.optional && !target.optional {
            return false;
        }

        let store = self.checker.store();
        let undefined = store.common().undefined;
        let source_type = if source.optional {
            store.union(vec![source.type_id, undefined])
        } else {
            source.type_id
        };
        let target_type = if target.optional {
            store.union(vec![target.type_id, undefined])
        } else {
            target.type_id
        };

        let saved = self.bivariant;
        self.bivariant = target.is_method || source.is_method;
        let result = self.is_assignable(source_type, target_type);
        self.bivariant = saved;
        result
    }

    /// Generic signatures are compared with their type parameters erased
    fn is_signature_assignable(&mut self, source: &Signature, target: &Signature) -> bool {
        let bivariant = std::mem::replace(&mut self.bivariant, false);
        let source = self.erase(source);
        let target = self.erase(target);

        let result = self.compare_signatures(&source, &target, bivariant);
        self.bivariant = bivariant;
        result
    }

    fn compare_signatures(&mut self, source: &Signature, target: &Signature, bivariant: bool) -> bool {
        if !target.has_rest() && source.min_argument_count() > target.parameters.len() {
            return false;
        }

        let strict = self.checker.options().strict_function_types_enabled() && !bivariant;
        let count = source.parameters.len().max(target.parameters.len());
        for index in 0..count {
            let (Some(s), Some(t)) = (
                self.parameter_type_at(source, index),
                self.parameter_type_at(target, index),
            ) else {
                continue;
            };
            let related = if strict {
                self.is_assignable(t, s)
            } else {
                self.is_assignable(t, s) || self.is_assignable(s, t)
            };
            if !related {
                return false;
            }
        }

        target.return_type == self.checker.store().common().void
            || self.is_assignable(source.return_type, target.return_type)
    }

    /// Type of the argument at `index`, expanding a trailing rest parameter
    fn parameter_type_at(&self, signature: &Signature, index: usize) -> Option<TypeId> {
        match signature.parameters.get(index) {
            Some(parameter) if parameter.rest => Some(self.checker.element_type(parameter.type_id)),
            Some(parameter) => Some(parameter.type_id),
            None => signature
                .parameters
                .last()
                .filter(|last| last.rest)
                .map(|last| self.checker.element_type(last.type_id)),
        }
    }

    fn erase(&self, signature: &Signature) -> Signature {
        if signature.type_parameters.is_empty() {
            return signature.clone();
        }
        let any = self.checker.store().common().any;
        let mapping: TypeMapping = signature
            .type_parameters
            .iter()
            .map(|parameter| (*parameter, any))
            .collect();
        instantiate_signature(self.checker.store(), signature, &mapping)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::CompilerOptions;
    use crate::typechecker::types::{ObjectShape, ParameterInfo, PropertyInfo, Signature};
    use crate::typechecker::TypeChecker;

    fn strict_checker() -> TypeChecker {
        TypeChecker::empty(&CompilerOptions {
            strict: Some(true),
            ..CompilerOptions::default()
        })
    }

    #[test]
    fn test_top_and_bottom_types() {
        let checker = strict_checker();
        let common = *checker.store().common();

        assert!(checker.is_type_assignable_to(common.string, common.unknown));
        assert!(checker.is_type_assignable_to(common.any, common.string));
        assert!(!checker.is_type_assignable_to(common.any, common.never));
        assert!(checker.is_type_assignable_to(common.never, common.string));
        assert!(!checker.is_type_assignable_to(common.unknown, common.string));
        assert!(checker.is_type_assignable_to(common.unknown, common.any));
    }

    #[test]
    fn test_literals_and_unions() {
        let checker = strict_checker();
        let store = checker.store();
        let common = *store.common();

        assert!(checker.is_type_assignable_to(common.true_type, common.boolean));
        assert!(!checker.is_type_assignable_to(common.boolean, common.true_type));
        let a = store.string_literal("a", false);
        let fresh_a = store.string_literal("a", true);
        assert!(checker.is_type_assignable_to(fresh_a, a));
        let either = store.union(vec![common.string, common.number]);
        assert!(checker.is_type_assignable_to(a, either));
        assert!(!checker.is_type_assignable_to(either, common.string));
    }

    #[test]
    fn test_null_depends_on_strictness() {
        let strict = strict_checker();
        let common = *strict.store().common();
        assert!(!strict.is_type_assignable_to(common.null, common.string));
        assert!(strict.is_type_assignable_to(common.undefined, common.void));

        let loose = TypeChecker::empty(&CompilerOptions::default());
        let common = *loose.store().common();
        assert!(loose.is_type_assignable_to(common.null, common.string));
    }

    #[test]
    fn test_arrays_and_tuples() {
        let checker = strict_checker();
        let store = checker.store();
        let common = *store.common();
        let strings = store.array(common.string, false);
        let readonly_strings = store.array(common.string, true);
        let pair = store.tuple(vec![common.string, common.string], false);

        assert!(checker.is_type_assignable_to(strings, readonly_strings));
        assert!(!checker.is_type_assignable_to(readonly_strings, strings));
        assert!(checker.is_type_assignable_to(pair, strings));
        assert!(!checker.is_type_assignable_to(strings, pair));
    }

    #[test]
    fn test_object_properties() {
        let checker = strict_checker();
        let store = checker.store();
        let common = *store.common();
        let wide = store.object(ObjectShape {
            properties: vec![
                PropertyInfo::new("a", common.string),
                PropertyInfo::new("b", common.number),
            ],
            ..ObjectShape::default()
        });
        let narrow = store.object(ObjectShape {
            properties: vec![PropertyInfo::new("a", common.string)],
            ..ObjectShape::default()
        });
        let optional = store.object(ObjectShape {
            properties: vec![PropertyInfo::new("a", common.string).optional(true)],
            ..ObjectShape::default()
        });

        assert!(checker.is_type_assignable_to(wide, narrow));
        assert!(!checker.is_type_assignable_to(narrow, wide));
        assert!(checker.is_type_assignable_to(narrow, optional));
        assert!(!checker.is_type_assignable_to(optional, narrow));
        assert!(checker.is_type_assignable_to(wide, common.empty_object));
        assert!(checker.is_type_assignable_to(wide, common.non_primitive));
        assert!(!checker.is_type_assignable_to(common.string, common.non_primitive));
    }

    #[test]
    fn test_function_parameters_are_contravariant_when_strict() {
        let checker = strict_checker();
        let store = checker.store();
        let common = *store.common();
        let literal = store.string_literal("a", false);
        let function = |parameter| {
            store.function(Signature {
                type_parameters: Vec::new(),
                parameters: vec![ParameterInfo {
                    name: "x".to_string(),
                    type_id: parameter,
                    optional: false,
                    rest: false,
                }],
                return_type: common.void,
            })
        };
        let takes_string = function(common.string);
        let takes_literal = function(literal);

        assert!(checker.is_type_assignable_to(takes_string, takes_literal));
        assert!(!checker.is_type_assignable_to(takes_literal, takes_string));

        let loose = TypeChecker::empty(&CompilerOptions::default());
        let store = loose.store();
        let narrow = store.function(Signature {
            type_parameters: Vec::new(),
            parameters: vec![ParameterInfo {
                name: "x".to_string(),
                type_id: store.string_literal("a", false),
                optional: false,
                rest: false,
            }],
            return_type: store.common().void,
        });
        let wide = store.function(Signature {
            type_parameters: Vec::new(),
            parameters: vec![ParameterInfo {
                name: "x".to_string(),
                type_id: store.common().string,
                optional: false,
                rest: false,
            }],
            return_type: store.common().void,
        });
        assert!(loose.is_type_assignable_to(narrow, wide));
    }

    #[test]
    fn test_fewer_parameters_are_assignable() {
        let checker = strict_checker();
        let store = checker.store();
        let common = *store.common();
        let none = store.function(Signature {
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            return_type: common.number,
        });
        let one = store.function(Signature {
            type_parameters: Vec::new(),
            parameters: vec![ParameterInfo {
                name: "x".to_string(),
                type_id: common.string,
                optional: false,
                rest: false,
            }],
            return_type: common.void,
        });

        assert!(checker.is_type_assignable_to(none, one));
        assert!(!checker.is_type_assignable_to(one, none));
    }
}
