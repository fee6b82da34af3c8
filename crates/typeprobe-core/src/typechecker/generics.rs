use super::type_checker::TypeChecker;
use super::types::{AliasInfo, ObjectShape, Signature, TypeData, TypeId, TypeStore};
use rustc_hash::{FxHashMap, FxHashSet};

/// Type parameter -> type argument
pub type TypeMapping = FxHashMap<TypeId, TypeId>;

/// Maximum structural depth explored while inferring type arguments
const MAX_INFERENCE_DEPTH: usize = 8;

/// Substitutes type parameters with concrete types in a type
pub fn instantiate_type(store: &TypeStore, id: TypeId, mapping: &TypeMapping) -> TypeId {
    if mapping.is_empty() {
        return id;
    }

    let data = store.data(id);
    match &*data {
        TypeData::Parameter(_) => mapping.get(&id).copied().unwrap_or(id),
        TypeData::Intrinsic(_) | TypeData::Literal { .. } => id,
        TypeData::Union { members, alias } => {
            let members = instantiate_all(store, members, mapping);
            let union = store.union(members);
            match alias {
                Some(alias) => store.with_alias(union, instantiate_alias(store, alias, mapping)),
                None => union,
            }
        }
        TypeData::Intersection(members) => {
            store.intersection(instantiate_all(store, members, mapping))
        }
        TypeData::Array { element, readonly } => {
            store.array(instantiate_type(store, *element, mapping), *readonly)
        }
        TypeData::Tuple { elements, readonly } => {
            store.tuple(instantiate_all(store, elements, mapping), *readonly)
        }
        TypeData::Object { shape, alias } => {
            let object = store.object(instantiate_shape(store, shape, mapping));
            match alias {
                Some(alias) => store.with_alias(object, instantiate_alias(store, alias, mapping)),
                None => object,
            }
        }
        TypeData::Named { decl, args } => store.named(*decl, instantiate_all(store, args, mapping)),
        TypeData::Assertions { received, negated } => {
            store.assertions(instantiate_type(store, *received, mapping), *negated)
        }
    }
}

fn instantiate_all(store: &TypeStore, ids: &[TypeId], mapping: &TypeMapping) -> Vec<TypeId> {
    ids.iter()
        .map(|id| instantiate_type(store, *id, mapping))
        .collect()
}

fn instantiate_alias(store: &TypeStore, alias: &AliasInfo, mapping: &TypeMapping) -> AliasInfo {
    AliasInfo {
        name: alias.name.clone(),
        args: instantiate_all(store, &alias.args, mapping),
    }
}

pub fn instantiate_shape(store: &TypeStore, shape: &ObjectShape, mapping: &TypeMapping) -> ObjectShape {
    if mapping.is_empty() {
        return shape.clone();
    }

    let mut properties = shape.properties.clone();
    for property in &mut properties {
        property.type_id = instantiate_type(store, property.type_id, mapping);
    }
    ObjectShape {
        properties,
        call_signatures: shape
            .call_signatures
            .iter()
            .map(|s| instantiate_signature(store, s, mapping))
            .collect(),
        construct_signatures: shape
            .construct_signatures
            .iter()
            .map(|s| instantiate_signature(store, s, mapping))
            .collect(),
        string_index: shape
            .string_index
            .map(|id| instantiate_type(store, id, mapping)),
        number_index: shape
            .number_index
            .map(|id| instantiate_type(store, id, mapping)),
    }
}

/// Substitute inside a signature; type parameters bound by `mapping` are
/// removed from its own list
pub fn instantiate_signature(store: &TypeStore, signature: &Signature, mapping: &TypeMapping) -> Signature {
    if mapping.is_empty() {
        return signature.clone();
    }

    let mut parameters = signature.parameters.clone();
    for parameter in &mut parameters {
        parameter.type_id = instantiate_type(store, parameter.type_id, mapping);
    }
    Signature {
        type_parameters: signature
            .type_parameters
            .iter()
            .copied()
            .filter(|p| !mapping.contains_key(p))
            .collect(),
        parameters,
        return_type: instantiate_type(store, signature.return_type, mapping),
    }
}

/// Map a declaration's type parameters onto `args`, filling omitted
/// trailing arguments from defaults or `any`
pub fn declaration_mapping(store: &TypeStore, type_parameters: &[TypeId], args: &[TypeId]) -> TypeMapping {
    let mut mapping = TypeMapping::default();
    for (index, parameter) in type_parameters.iter().enumerate() {
        let arg = match args.get(index) {
            Some(arg) => *arg,
            None => store
                .type_parameter(*parameter)
                .and_then(|info| info.default)
                .map(|default| instantiate_type(store, default, &mapping))
                .unwrap_or(store.common().any),
        };
        mapping.insert(*parameter, arg);
    }
    mapping
}

/// Collects type argument candidates for a generic call
pub struct InferenceContext {
    parameters: Vec<TypeId>,
    candidates: FxHashMap<TypeId, Vec<TypeId>>,
    visited: FxHashSet<(TypeId, TypeId)>,
}

impl InferenceContext {
    pub fn new(parameters: Vec<TypeId>) -> Self {
        InferenceContext {
            parameters,
            candidates: FxHashMap::default(),
            visited: FxHashSet::default(),
        }
    }

    pub fn has_candidates(&self, parameter: TypeId) -> bool {
        self.candidates.get(&parameter).is_some_and(|c| !c.is_empty())
    }

    /// Record what `source` says about the parameters inside `target`
    pub fn infer(&mut self, checker: &TypeChecker, source: TypeId, target: TypeId) {
        self.infer_inner(checker, source, target, 0);
    }

    fn infer_inner(&mut self, checker: &TypeChecker, source: TypeId, target: TypeId, depth: usize) {
        if depth > MAX_INFERENCE_DEPTH || !self.visited.insert((source, target)) {
            return;
        }

        let store = checker.store();
        if self.parameters.contains(&target) {
            self.candidates.entry(target).or_default().push(source);
            return;
        }

        let target_data = store.data(target);
        let source_data = store.data(source);

        if let TypeData::Union { members, .. } = &*target_data {
            let (naked, others): (Vec<TypeId>, Vec<TypeId>) = members
                .iter()
                .copied()
                .partition(|m| self.parameters.contains(m));
            for other in &others {
                self.infer_inner(checker, source, *other, depth + 1);
            }
            if let Some(parameter) = naked.first() {
                let remaining: Vec<TypeId> = store
                    .union_members(source)
                    .into_iter()
                    .filter(|s| !others.iter().any(|o| checker.is_type_assignable_to(*s, *o)))
                    .collect();
                if !remaining.is_empty() {
                    let candidate = store.union(remaining);
                    self.candidates.entry(*parameter).or_default().push(candidate);
                }
            }
            return;
        }

        if let TypeData::Union { members, .. } = &*source_data {
            for member in members {
                self.infer_inner(checker, *member, target, depth + 1);
            }
            return;
        }

        match (&*source_data, &*target_data) {
            (TypeData::Array { element: s, .. }, TypeData::Array { element: t, .. }) => {
                self.infer_inner(checker, *s, *t, depth + 1);
            }
            (TypeData::Tuple { elements, .. }, TypeData::Array { element: t, .. }) => {
                for element in elements {
                    self.infer_inner(checker, *element, *t, depth + 1);
                }
            }
            (TypeData::Tuple { elements: s, .. }, TypeData::Tuple { elements: t, .. }) => {
                for (s, t) in s.iter().zip(t.iter()) {
                    self.infer_inner(checker, *s, *t, depth + 1);
                }
            }
            (
                TypeData::Named { decl: sd, args: sa },
                TypeData::Named { decl: td, args: ta },
            ) if sd == td => {
                for (s, t) in sa.iter().zip(ta.iter()) {
                    self.infer_inner(checker, *s, *t, depth + 1);
                }
            }
            (
                TypeData::Assertions { received: s, .. },
                TypeData::Assertions { received: t, .. },
            ) => {
                self.infer_inner(checker, *s, *t, depth + 1);
            }
            (_, TypeData::Object { .. } | TypeData::Named { .. }) => {
                let source_shape = checker.apparent_shape(source);
                let target_shape = checker.apparent_shape(target);
                for property in &target_shape.properties {
                    if let Some(source_property) = source_shape.property(&property.name) {
                        self.infer_inner(
                            checker,
                            source_property.type_id,
                            property.type_id,
                            depth + 1,
                        );
                    }
                }
                if let (Some(s), Some(t)) = (
                    source_shape.call_signatures.last(),
                    target_shape.call_signatures.first(),
                ) {
                    self.infer_signature(checker, s, t, depth + 1);
                }
                if let Some(index) = target_shape.string_index {
                    for property in &source_shape.properties {
                        self.infer_inner(checker, property.type_id, index, depth + 1);
                    }
                    if let Some(source_index) = source_shape.string_index {
                        self.infer_inner(checker, source_index, index, depth + 1);
                    }
                }
                if let (Some(s), Some(t)) = (source_shape.number_index, target_shape.number_index) {
                    self.infer_inner(checker, s, t, depth + 1);
                }
            }
            _ => {}
        }
    }

    fn infer_signature(&mut self, checker: &TypeChecker, source: &Signature, target: &Signature, depth: usize) {
        for (s, t) in source.parameters.iter().zip(target.parameters.iter()) {
            self.infer_inner(checker, s.type_id, t.type_id, depth);
        }
        self.infer_inner(checker, source.return_type, target.return_type, depth);
    }

    /// Final type arguments for `signature`
    pub fn mapping(&self, checker: &TypeChecker, signature: &Signature) -> TypeMapping {
        let store = checker.store();
        let mut mapping = TypeMapping::default();

        for parameter in &self.parameters {
            let info = store.type_parameter(*parameter);
            let inferred = match self.candidates.get(parameter) {
                Some(candidates) if !candidates.is_empty() => {
                    let widen = !has_primitive_constraint(checker, *parameter)
                        && !is_top_level_in(store, *parameter, signature.return_type);
                    let candidates: Vec<TypeId> = candidates
                        .iter()
                        .map(|c| if widen { store.widen_literal(*c) } else { *c })
                        .collect();
                    choose_candidate(checker, &candidates)
                }
                _ => info
                    .as_ref()
                    .and_then(|info| info.default.or(info.constraint))
                    .map(|fallback| instantiate_type(store, fallback, &mapping))
                    .unwrap_or(store.common().unknown),
            };
            mapping.insert(*parameter, inferred);
        }

        mapping
    }

    /// Inferences made so far, with `unknown` for the rest; used to give
    /// function arguments a contextual signature
    pub fn partial_mapping(&self, checker: &TypeChecker) -> TypeMapping {
        let store = checker.store();
        self.parameters
            .iter()
            .map(|parameter| {
                let inferred = match self.candidates.get(parameter) {
                    Some(candidates) if !candidates.is_empty() => {
                        let widened: Vec<TypeId> =
                            candidates.iter().map(|c| store.widen_literal(*c)).collect();
                        choose_candidate(checker, &widened)
                    }
                    _ => store.common().unknown,
                };
                (*parameter, inferred)
            })
            .collect()
    }
}

/// A candidate every other candidate is assignable to, else their union
fn choose_candidate(checker: &TypeChecker, candidates: &[TypeId]) -> TypeId {
    for candidate in candidates {
        if candidates
            .iter()
            .all(|other| checker.is_type_assignable_to(*other, *candidate))
        {
            return *candidate;
        }
    }
    checker.store().union(candidates.to_vec())
}

fn has_primitive_constraint(checker: &TypeChecker, parameter: TypeId) -> bool {
    let store = checker.store();
    let Some(constraint) = store.type_parameter(parameter).and_then(|info| info.constraint) else {
        return false;
    };
    store.union_members(constraint).into_iter().any(|member| {
        matches!(
            &*store.data(member),
            TypeData::Literal { .. }
        ) || [store.common().string, store.common().number, store.common().boolean]
            .contains(&member)
    })
}

fn is_top_level_in(store: &TypeStore, parameter: TypeId, return_type: TypeId) -> bool {
    store.union_members(return_type).contains(&parameter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompilerOptions;
    use crate::typechecker::types::{ParameterInfo, PropertyInfo};

    fn checker() -> TypeChecker {
        TypeChecker::empty(&CompilerOptions::default())
    }

    #[test]
    fn test_instantiate_type() {
        let checker = checker();
        let store = checker.store();
        let t = store.new_type_parameter("T");
        let boxed = store.object(ObjectShape {
            properties: vec![PropertyInfo::new("value", store.array(t, false))],
            ..ObjectShape::default()
        });

        let mut mapping = TypeMapping::default();
        mapping.insert(t, store.common().string);
        let instantiated = instantiate_type(store, boxed, &mapping);

        let shape = checker.apparent_shape(instantiated);
        assert_eq!(
            shape.property("value").map(|p| p.type_id),
            Some(store.array(store.common().string, false))
        );
        assert_eq!(instantiate_type(store, boxed, &TypeMapping::default()), boxed);
    }

    #[test]
    fn test_infer_widens_unless_top_level() {
        let checker = checker();
        let store = checker.store();
        let t = store.new_type_parameter("T");
        let literal = store.string_literal("a", true);

        let identity = Signature {
            type_parameters: vec![t],
            parameters: vec![ParameterInfo {
                name: "x".to_string(),
                type_id: t,
                optional: false,
                rest: false,
            }],
            return_type: t,
        };
        let mut context = InferenceContext::new(vec![t]);
        context.infer(&checker, literal, t);
        assert_eq!(context.mapping(&checker, &identity).get(&t), Some(&literal));

        let boxed = Signature {
            return_type: store.array(t, false),
            ..identity
        };
        assert_eq!(
            context.mapping(&checker, &boxed).get(&t),
            Some(&store.common().string)
        );
    }

    #[test]
    fn test_infer_through_arrays_and_defaults() {
        let checker = checker();
        let store = checker.store();
        let t = store.new_type_parameter("T");
        let u = store.new_type_parameter("U");
        store.set_type_parameter_bounds(u, None, Some(store.common().boolean));

        let signature = Signature {
            type_parameters: vec![t, u],
            parameters: vec![ParameterInfo {
                name: "items".to_string(),
                type_id: store.array(t, false),
                optional: false,
                rest: false,
            }],
            return_type: store.common().void,
        };
        let mut context = InferenceContext::new(vec![t, u]);
        context.infer(&checker, store.array(store.common().number, false), store.array(t, false));
        let mapping = context.mapping(&checker, &signature);

        assert_eq!(mapping.get(&t), Some(&store.common().number));
        assert_eq!(mapping.get(&u), Some(&store.common().boolean));
    }
}
