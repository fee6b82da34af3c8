use super::display::{type_to_string, TypeFormat};
use super::generics::{declaration_mapping, instantiate_shape};
use super::intrinsics::assertions_shape;
use super::pass::CheckPass;
use super::type_compat::TypeCompatibility;
use super::types::{
    DeclId, DeclKind, Intrinsic, LiteralValue, ObjectShape, PropertyInfo, Signature, TypeData,
    TypeId, TypeStore,
};
use super::TypeCheckError;
use crate::ast::{NodeId, Script};
use crate::config::CompilerOptions;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// One file handed to the checker
#[derive(Debug, Clone)]
pub struct CheckInput<'a> {
    pub script: &'a Script,
    /// Index of the file every resolvable module specifier of this file points to
    pub imports: FxHashMap<String, usize>,
}

impl<'a> CheckInput<'a> {
    pub fn new(script: &'a Script) -> Self {
        Self {
            script,
            imports: FxHashMap::default(),
        }
    }
}

/// Semantic diagnostic of the file at `file` (index into the checked inputs)
#[derive(Debug, Clone)]
pub struct FileTypeError {
    pub file: usize,
    pub error: TypeCheckError,
}

/// The bound and checked type universe of one program
///
/// Built once by [`TypeChecker::check`]; afterwards every query is read-only
/// apart from the interning and shape caches of the store.
pub struct TypeChecker {
    store: TypeStore,
    node_types: FxHashMap<NodeId, TypeId>,
    options: CompilerOptions,
}

impl TypeChecker {
    /// A checker with no files and no library, for type-level work
    pub fn empty(options: &CompilerOptions) -> Self {
        TypeChecker {
            store: TypeStore::new(options.strict_null_checks_enabled()),
            node_types: FxHashMap::default(),
            options: options.clone(),
        }
    }

    /// Bind and check `files` together with the built-in library
    pub fn check(files: &[CheckInput<'_>], options: &CompilerOptions) -> (TypeChecker, Vec<FileTypeError>) {
        CheckPass::run(TypeChecker::empty(options), files)
    }

    pub fn store(&self) -> &TypeStore {
        &self.store
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Static type recorded for an expression node
    pub fn type_of_node(&self, node: NodeId) -> Option<TypeId> {
        self.node_types.get(&node).copied()
    }

    pub(crate) fn record_node_type(&mut self, node: NodeId, type_id: TypeId) {
        self.node_types.insert(node, type_id);
    }

    pub fn type_data(&self, id: TypeId) -> Rc<TypeData> {
        self.store.data(id)
    }

    pub fn is_type_assignable_to(&self, source: TypeId, target: TypeId) -> bool {
        TypeCompatibility::new(self).is_assignable(source, target)
    }

    pub fn type_to_string(&self, id: TypeId, format: TypeFormat) -> String {
        type_to_string(&self.store, id, format)
    }

    pub fn true_type(&self) -> TypeId {
        self.store.common().true_type
    }

    pub fn false_type(&self) -> TypeId {
        self.store.common().false_type
    }

    pub fn intrinsic_of(&self, id: TypeId) -> Option<Intrinsic> {
        self.store.as_intrinsic(id)
    }

    pub fn literal_of(&self, id: TypeId) -> Option<LiteralValue> {
        match &*self.store.data(id) {
            TypeData::Literal { value, .. } => Some(value.clone()),
            _ => None,
        }
    }

    pub fn is_array_type(&self, id: TypeId) -> bool {
        matches!(&*self.store.data(id), TypeData::Array { .. })
    }

    pub fn is_tuple_type(&self, id: TypeId) -> bool {
        matches!(&*self.store.data(id), TypeData::Tuple { .. })
    }

    pub fn is_union_type(&self, id: TypeId) -> bool {
        matches!(&*self.store.data(id), TypeData::Union { .. })
    }

    pub fn is_intersection_type(&self, id: TypeId) -> bool {
        matches!(&*self.store.data(id), TypeData::Intersection(_))
    }

    /// Types with object structure: object literals, interfaces, class
    /// instances, arrays, tuples and functions
    pub fn is_object_type(&self, id: TypeId) -> bool {
        matches!(
            &*self.store.data(id),
            TypeData::Object { .. }
                | TypeData::Named { .. }
                | TypeData::Array { .. }
                | TypeData::Tuple { .. }
                | TypeData::Assertions { .. }
        )
    }

    /// Instance type of a class declaration
    pub fn is_class_instance(&self, id: TypeId) -> bool {
        match &*self.store.data(id) {
            TypeData::Named { decl, .. } => self.store.decl(*decl).kind == DeclKind::Class,
            _ => false,
        }
    }

    /// Properties of an object-like type; primitives have none
    pub fn properties_of_type(&self, id: TypeId) -> Vec<PropertyInfo> {
        match &*self.store.data(id) {
            TypeData::Intrinsic(_) | TypeData::Literal { .. } => Vec::new(),
            _ => self.apparent_shape(id).properties.clone(),
        }
    }

    pub fn property_of_type(&self, id: TypeId, name: &str) -> Option<PropertyInfo> {
        self.properties_of_type(id)
            .into_iter()
            .find(|property| property.name == name)
    }

    pub fn call_signatures(&self, id: TypeId) -> Vec<Signature> {
        self.apparent_shape(id).call_signatures.clone()
    }

    pub fn construct_signatures(&self, id: TypeId) -> Vec<Signature> {
        self.apparent_shape(id).construct_signatures.clone()
    }

    /// Element type of an array, tuple or array-constrained type parameter
    pub fn element_type(&self, id: TypeId) -> TypeId {
        match &*self.store.data(id) {
            TypeData::Array { element, .. } => *element,
            TypeData::Tuple { elements, .. } => self.store.union(elements.clone()),
            TypeData::Parameter(_) => match self.store.type_parameter(id).and_then(|p| p.constraint) {
                Some(constraint) => self.element_type(constraint),
                None => self.store.common().unknown,
            },
            _ => self.store.common().any,
        }
    }

    /// Members visible on a value of type `id`, including those of the
    /// library interfaces behind primitives and arrays
    pub fn apparent_shape(&self, id: TypeId) -> Rc<ObjectShape> {
        let data = self.store.data(id);
        if let TypeData::Object { shape, .. } = &*data {
            return shape.clone();
        }
        if let Some(shape) = self.store.cached_shape(id) {
            return shape;
        }

        let well_known = self.store.well_known();
        let shape = match &*data {
            TypeData::Named { decl, args } => self.instantiate_decl(*decl, args),
            TypeData::Array { element, readonly } => {
                let decl = if *readonly {
                    well_known.readonly_array.or(well_known.array)
                } else {
                    well_known.array
                };
                self.instantiate_optional_decl(decl, &[*element])
            }
            TypeData::Tuple { elements, readonly } => self.tuple_shape(elements, *readonly),
            TypeData::Intrinsic(Intrinsic::String)
            | TypeData::Literal {
                value: LiteralValue::String(_),
                ..
            } => self.instantiate_optional_decl(well_known.string, &[]),
            TypeData::Intrinsic(Intrinsic::Number)
            | TypeData::Literal {
                value: LiteralValue::Number(_),
                ..
            } => self.instantiate_optional_decl(well_known.number, &[]),
            TypeData::Intrinsic(Intrinsic::Boolean)
            | TypeData::Literal {
                value: LiteralValue::Boolean(_),
                ..
            } => self.instantiate_optional_decl(well_known.boolean, &[]),
            TypeData::Assertions { received, negated } => {
                assertions_shape(&self.store, *received, *negated)
            }
            TypeData::Intersection(members) => self.intersection_shape(members),
            TypeData::Union { members, .. } => self.union_shape(members),
            TypeData::Parameter(_) => match self.store.type_parameter(id).and_then(|p| p.constraint) {
                Some(constraint) => (*self.apparent_shape(constraint)).clone(),
                None => ObjectShape::default(),
            },
            _ => ObjectShape::default(),
        };

        let shape = Rc::new(shape);
        self.store.cache_shape(id, shape.clone());
        shape
    }

    fn instantiate_decl(&self, decl: DeclId, args: &[TypeId]) -> ObjectShape {
        let info = self.store.decl(decl);
        let Some(template) = info.template else {
            return ObjectShape::default();
        };
        let mapping = declaration_mapping(&self.store, &info.type_parameters, args);
        instantiate_shape(&self.store, &template, &mapping)
    }

    fn instantiate_optional_decl(&self, decl: Option<DeclId>, args: &[TypeId]) -> ObjectShape {
        decl.map(|decl| self.instantiate_decl(decl, args))
            .unwrap_or_default()
    }

    fn tuple_shape(&self, elements: &[TypeId], readonly: bool) -> ObjectShape {
        let well_known = self.store.well_known();
        let decl = if readonly {
            well_known.readonly_array.or(well_known.array)
        } else {
            well_known.array
        };
        let element = self.store.union(elements.to_vec());
        let mut shape = self.instantiate_optional_decl(decl, &[element]);

        for (index, element) in elements.iter().enumerate() {
            shape.set_property(PropertyInfo::new(index.to_string(), *element).readonly(readonly));
        }
        shape.set_property(
            PropertyInfo::new("length", self.store.number_literal(elements.len() as f64, false))
                .readonly(true),
        );
        shape
    }

    fn intersection_shape(&self, members: &[TypeId]) -> ObjectShape {
        let mut merged = ObjectShape::default();
        for member in members {
            let shape = self.apparent_shape(*member);
            for property in &shape.properties {
                match merged.property(&property.name).cloned() {
                    Some(existing) => {
                        let type_id = self.store.intersection(vec![existing.type_id, property.type_id]);
                        merged.set_property(PropertyInfo {
                            type_id,
                            optional: existing.optional && property.optional,
                            readonly: existing.readonly && property.readonly,
                            ..existing
                        });
                    }
                    None => merged.properties.push(property.clone()),
                }
            }
            merged.call_signatures.extend(shape.call_signatures.iter().cloned());
            merged
                .construct_signatures
                .extend(shape.construct_signatures.iter().cloned());
            merged.string_index = merge_index(&self.store, merged.string_index, shape.string_index);
            merged.number_index = merge_index(&self.store, merged.number_index, shape.number_index);
        }
        merged
    }

    /// Properties present on every member; signatures only when all members agree
    fn union_shape(&self, members: &[TypeId]) -> ObjectShape {
        let shapes: Vec<Rc<ObjectShape>> = members.iter().map(|m| self.apparent_shape(*m)).collect();
        let Some((first, rest)) = shapes.split_first() else {
            return ObjectShape::default();
        };

        let mut shape = ObjectShape::default();
        for property in &first.properties {
            let others: Option<Vec<&PropertyInfo>> =
                rest.iter().map(|s| s.property(&property.name)).collect();
            let Some(others) = others else {
                continue;
            };
            let mut types = vec![property.type_id];
            types.extend(others.iter().map(|p| p.type_id));
            shape.properties.push(PropertyInfo {
                name: property.name.clone(),
                type_id: self.store.union(types),
                optional: property.optional || others.iter().any(|p| p.optional),
                readonly: property.readonly || others.iter().any(|p| p.readonly),
                is_method: property.is_method && others.iter().all(|p| p.is_method),
            });
        }
        if rest.iter().all(|s| s.call_signatures == first.call_signatures) {
            shape.call_signatures = first.call_signatures.clone();
        }
        if rest
            .iter()
            .all(|s| s.construct_signatures == first.construct_signatures)
        {
            shape.construct_signatures = first.construct_signatures.clone();
        }
        if let Some(index) = first.string_index {
            let others: Option<Vec<TypeId>> = rest.iter().map(|s| s.string_index).collect();
            if let Some(mut others) = others {
                others.push(index);
                shape.string_index = Some(self.store.union(others));
            }
        }
        if let Some(index) = first.number_index {
            let others: Option<Vec<TypeId>> = rest.iter().map(|s| s.number_index).collect();
            if let Some(mut others) = others {
                others.push(index);
                shape.number_index = Some(self.store.union(others));
            }
        }
        shape
    }
}

fn merge_index(store: &TypeStore, current: Option<TypeId>, next: Option<TypeId>) -> Option<TypeId> {
    match (current, next) {
        (Some(a), Some(b)) => Some(store.intersection(vec![a, b])),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typechecker::types::ObjectShape;

    #[test]
    fn test_tuple_shape_has_indices_and_length() {
        let checker = TypeChecker::empty(&CompilerOptions::default());
        let store = checker.store();
        let common = *store.common();
        let pair = store.tuple(vec![common.string, common.number], true);

        let shape = checker.apparent_shape(pair);
        let first = shape.property("0").unwrap();
        assert_eq!(first.type_id, common.string);
        assert!(first.readonly);
        assert_eq!(
            shape.property("length").map(|p| p.type_id),
            Some(store.number_literal(2.0, false))
        );
    }

    #[test]
    fn test_union_shape_keeps_common_properties() {
        let checker = TypeChecker::empty(&CompilerOptions::default());
        let store = checker.store();
        let common = *store.common();
        let a = store.object(ObjectShape {
            properties: vec![
                PropertyInfo::new("kind", store.string_literal("a", false)),
                PropertyInfo::new("only_a", common.number),
            ],
            ..ObjectShape::default()
        });
        let b = store.object(ObjectShape {
            properties: vec![PropertyInfo::new("kind", store.string_literal("b", false))],
            ..ObjectShape::default()
        });

        let union = store.union(vec![a, b]);
        let properties = checker.properties_of_type(union);
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].name, "kind");
        assert_eq!(
            properties[0].type_id,
            store.union(vec![
                store.string_literal("a", false),
                store.string_literal("b", false)
            ])
        );
    }

    #[test]
    fn test_primitives_have_no_properties() {
        let checker = TypeChecker::empty(&CompilerOptions::default());
        assert!(checker
            .properties_of_type(checker.store().common().string)
            .is_empty());
    }

    #[test]
    fn test_intersection_merges_properties() {
        let checker = TypeChecker::empty(&CompilerOptions::default());
        let store = checker.store();
        let common = *store.common();
        let a = store.object(ObjectShape {
            properties: vec![PropertyInfo::new("a", common.string)],
            ..ObjectShape::default()
        });
        let b = store.object(ObjectShape {
            properties: vec![PropertyInfo::new("b", common.number)],
            ..ObjectShape::default()
        });
        let both = store.intersection(vec![a, b]);
        let names: Vec<String> = checker
            .properties_of_type(both)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }
}
