use id_arena::{Arena, Id};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

pub type TypeId = Id<TypeEntry>;

/// Arena slot holding one interned type
#[derive(Debug)]
pub struct TypeEntry {
    data: Rc<TypeData>,
}

/// Intrinsic (keyword) types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Intrinsic {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    /// The `object` keyword
    NonPrimitive,
}

impl Intrinsic {
    pub fn name(self) -> &'static str {
        match self {
            Intrinsic::Any => "any",
            Intrinsic::Unknown => "unknown",
            Intrinsic::Never => "never",
            Intrinsic::Void => "void",
            Intrinsic::Undefined => "undefined",
            Intrinsic::Null => "null",
            Intrinsic::String => "string",
            Intrinsic::Number => "number",
            Intrinsic::Boolean => "boolean",
            Intrinsic::BigInt => "bigint",
            Intrinsic::Symbol => "symbol",
            Intrinsic::NonPrimitive => "object",
        }
    }

    /// Primitive value types that can never overlap with each other
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            Intrinsic::String
                | Intrinsic::Number
                | Intrinsic::Boolean
                | Intrinsic::BigInt
                | Intrinsic::Symbol
                | Intrinsic::Null
                | Intrinsic::Undefined
                | Intrinsic::Void
        )
    }
}

/// Number literal stored by bit pattern so it can be hashed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumberLiteral(u64);

impl NumberLiteral {
    pub fn new(value: f64) -> Self {
        // -0 and 0 are the same literal type
        let value = if value == 0.0 { 0.0 } else { value };
        NumberLiteral(value.to_bits())
    }

    pub fn value(self) -> f64 {
        f64::from_bits(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LiteralValue {
    String(String),
    Number(NumberLiteral),
    Boolean(bool),
}

impl LiteralValue {
    /// Intrinsic type a literal widens to
    pub fn base(&self) -> Intrinsic {
        match self {
            LiteralValue::String(_) => Intrinsic::String,
            LiteralValue::Number(_) => Intrinsic::Number,
            LiteralValue::Boolean(_) => Intrinsic::Boolean,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyInfo {
    pub name: String,
    pub type_id: TypeId,
    pub optional: bool,
    pub readonly: bool,
    /// Declared with method syntax; parameters compare bivariantly
    pub is_method: bool,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        PropertyInfo {
            name: name.into(),
            type_id,
            optional: false,
            readonly: false,
            is_method: false,
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn method(mut self, is_method: bool) -> Self {
        self.is_method = is_method;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterInfo {
    pub name: String,
    pub type_id: TypeId,
    pub optional: bool,
    pub rest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// `Parameter` types owned by this signature
    pub type_parameters: Vec<TypeId>,
    pub parameters: Vec<ParameterInfo>,
    pub return_type: TypeId,
}

impl Signature {
    pub fn min_argument_count(&self) -> usize {
        self.parameters
            .iter()
            .take_while(|p| !p.optional && !p.rest)
            .count()
    }

    pub fn has_rest(&self) -> bool {
        self.parameters.last().is_some_and(|p| p.rest)
    }

    /// Upper bound on argument count, `None` with a rest parameter
    pub fn max_argument_count(&self) -> Option<usize> {
        if self.has_rest() {
            None
        } else {
            Some(self.parameters.len())
        }
    }
}

/// Structural members of an object-like type
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ObjectShape {
    pub properties: Vec<PropertyInfo>,
    pub call_signatures: Vec<Signature>,
    pub construct_signatures: Vec<Signature>,
    pub string_index: Option<TypeId>,
    pub number_index: Option<TypeId>,
}

impl ObjectShape {
    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.call_signatures.is_empty()
            && self.construct_signatures.is_empty()
            && self.string_index.is_none()
            && self.number_index.is_none()
    }

    /// Add or replace a property, keeping declaration order
    pub fn set_property(&mut self, property: PropertyInfo) {
        match self.properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
    }
}

/// Name a type was declared under, kept for display
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AliasInfo {
    pub name: String,
    pub args: Vec<TypeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeParameterId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Interface,
    Class,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(Intrinsic),
    /// Fresh literals come straight from literal expressions and widen on
    /// mutable locations
    Literal {
        value: LiteralValue,
        fresh: bool,
    },
    /// Normalized: flat, deduplicated, ordered by type id
    Union {
        members: Vec<TypeId>,
        alias: Option<AliasInfo>,
    },
    Intersection(Vec<TypeId>),
    Array {
        element: TypeId,
        readonly: bool,
    },
    Tuple {
        elements: Vec<TypeId>,
        readonly: bool,
    },
    Object {
        shape: Rc<ObjectShape>,
        alias: Option<AliasInfo>,
    },
    /// Interface or class instance, members resolved on demand
    Named {
        decl: DeclId,
        args: Vec<TypeId>,
    },
    Parameter(TypeParameterId),
    /// Result type of `expectType`, members synthesized on demand
    Assertions {
        received: TypeId,
        negated: bool,
    },
}

#[derive(Debug, Clone)]
pub struct TypeParameterInfo {
    pub name: String,
    pub constraint: Option<TypeId>,
    pub default: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct NamedDecl {
    pub name: String,
    pub kind: DeclKind,
    pub type_parameters: Vec<TypeId>,
    pub template: Option<Rc<ObjectShape>>,
}

/// Declarations of the built-in library the checker maps intrinsics onto
#[derive(Debug, Clone, Copy, Default)]
pub struct WellKnownDecls {
    pub array: Option<DeclId>,
    pub readonly_array: Option<DeclId>,
    pub string: Option<DeclId>,
    pub number: Option<DeclId>,
    pub boolean: Option<DeclId>,
}

/// Frequently used type ids, created with the store
#[derive(Debug, Clone, Copy)]
pub struct CommonTypes {
    pub any: TypeId,
    pub unknown: TypeId,
    pub never: TypeId,
    pub void: TypeId,
    pub undefined: TypeId,
    pub null: TypeId,
    pub string: TypeId,
    pub number: TypeId,
    pub boolean: TypeId,
    pub bigint: TypeId,
    pub symbol: TypeId,
    pub non_primitive: TypeId,
    pub true_type: TypeId,
    pub false_type: TypeId,
    pub empty_object: TypeId,
    pub not_provided: TypeId,
    /// `T` of `expectType<T = NotProvided>`
    pub received_parameter: TypeId,
    /// `E` of `toBe<E = NotProvided>`
    pub expected_parameter: TypeId,
}

/// Interning arena for every type of one program
pub struct TypeStore {
    arena: RefCell<Arena<TypeEntry>>,
    interned: RefCell<FxHashMap<Rc<TypeData>, TypeId>>,
    type_parameters: RefCell<Vec<TypeParameterInfo>>,
    decls: RefCell<Vec<NamedDecl>>,
    shapes: RefCell<FxHashMap<TypeId, Rc<ObjectShape>>>,
    well_known: RefCell<WellKnownDecls>,
    strict_null_checks: bool,
    common: CommonTypes,
}

impl TypeStore {
    pub fn new(strict_null_checks: bool) -> Self {
        let arena = RefCell::new(Arena::new());
        let interned = RefCell::new(FxHashMap::default());
        let intern = |data: TypeData| -> TypeId {
            let data = Rc::new(data);
            let id = arena.borrow_mut().alloc(TypeEntry { data: data.clone() });
            interned.borrow_mut().insert(data, id);
            id
        };

        let any = intern(TypeData::Intrinsic(Intrinsic::Any));
        let unknown = intern(TypeData::Intrinsic(Intrinsic::Unknown));
        let never = intern(TypeData::Intrinsic(Intrinsic::Never));
        let void = intern(TypeData::Intrinsic(Intrinsic::Void));
        let undefined = intern(TypeData::Intrinsic(Intrinsic::Undefined));
        let null = intern(TypeData::Intrinsic(Intrinsic::Null));
        let string = intern(TypeData::Intrinsic(Intrinsic::String));
        let number = intern(TypeData::Intrinsic(Intrinsic::Number));
        let boolean = intern(TypeData::Intrinsic(Intrinsic::Boolean));
        let bigint = intern(TypeData::Intrinsic(Intrinsic::BigInt));
        let symbol = intern(TypeData::Intrinsic(Intrinsic::Symbol));
        let non_primitive = intern(TypeData::Intrinsic(Intrinsic::NonPrimitive));
        let true_type = intern(TypeData::Literal {
            value: LiteralValue::Boolean(true),
            fresh: false,
        });
        let false_type = intern(TypeData::Literal {
            value: LiteralValue::Boolean(false),
            fresh: false,
        });
        let empty_object = intern(TypeData::Object {
            shape: Rc::new(ObjectShape::default()),
            alias: None,
        });
        let not_provided = intern(TypeData::Object {
            shape: Rc::new(ObjectShape {
                properties: vec![PropertyInfo::new(
                    super::intrinsics::NOT_PROVIDED_PROPERTY,
                    true_type,
                )],
                ..ObjectShape::default()
            }),
            alias: None,
        });
        let received_parameter = intern(TypeData::Parameter(TypeParameterId(0)));
        let expected_parameter = intern(TypeData::Parameter(TypeParameterId(1)));

        let type_parameters = vec![
            TypeParameterInfo {
                name: "T".to_string(),
                constraint: None,
                default: Some(not_provided),
            },
            TypeParameterInfo {
                name: "E".to_string(),
                constraint: None,
                default: Some(not_provided),
            },
        ];

        TypeStore {
            arena,
            interned,
            type_parameters: RefCell::new(type_parameters),
            decls: RefCell::new(Vec::new()),
            shapes: RefCell::new(FxHashMap::default()),
            well_known: RefCell::new(WellKnownDecls::default()),
            strict_null_checks,
            common: CommonTypes {
                any,
                unknown,
                never,
                void,
                undefined,
                null,
                string,
                number,
                boolean,
                bigint,
                symbol,
                non_primitive,
                true_type,
                false_type,
                empty_object,
                not_provided,
                received_parameter,
                expected_parameter,
            },
        }
    }

    pub fn common(&self) -> &CommonTypes {
        &self.common
    }

    pub fn strict_null_checks(&self) -> bool {
        self.strict_null_checks
    }

    pub fn intern(&self, data: TypeData) -> TypeId {
        if let Some(id) = self.interned.borrow().get(&data) {
            return *id;
        }
        let data = Rc::new(data);
        let id = self.arena.borrow_mut().alloc(TypeEntry { data: data.clone() });
        self.interned.borrow_mut().insert(data, id);
        id
    }

    pub fn data(&self, id: TypeId) -> Rc<TypeData> {
        self.arena.borrow()[id].data.clone()
    }

    pub fn type_count(&self) -> usize {
        self.arena.borrow().len()
    }

    pub fn intrinsic(&self, intrinsic: Intrinsic) -> TypeId {
        let common = &self.common;
        match intrinsic {
            Intrinsic::Any => common.any,
            Intrinsic::Unknown => common.unknown,
            Intrinsic::Never => common.never,
            Intrinsic::Void => common.void,
            Intrinsic::Undefined => common.undefined,
            Intrinsic::Null => common.null,
            Intrinsic::String => common.string,
            Intrinsic::Number => common.number,
            Intrinsic::Boolean => common.boolean,
            Intrinsic::BigInt => common.bigint,
            Intrinsic::Symbol => common.symbol,
            Intrinsic::NonPrimitive => common.non_primitive,
        }
    }

    pub fn as_intrinsic(&self, id: TypeId) -> Option<Intrinsic> {
        match *self.data(id) {
            TypeData::Intrinsic(intrinsic) => Some(intrinsic),
            _ => None,
        }
    }

    pub fn is_intrinsic(&self, id: TypeId, intrinsic: Intrinsic) -> bool {
        self.as_intrinsic(id) == Some(intrinsic)
    }

    pub fn literal(&self, value: LiteralValue, fresh: bool) -> TypeId {
        self.intern(TypeData::Literal { value, fresh })
    }

    pub fn string_literal(&self, value: &str, fresh: bool) -> TypeId {
        self.literal(LiteralValue::String(value.to_string()), fresh)
    }

    pub fn number_literal(&self, value: f64, fresh: bool) -> TypeId {
        self.literal(LiteralValue::Number(NumberLiteral::new(value)), fresh)
    }

    pub fn boolean_literal(&self, value: bool, fresh: bool) -> TypeId {
        self.literal(LiteralValue::Boolean(value), fresh)
    }

    pub fn array(&self, element: TypeId, readonly: bool) -> TypeId {
        self.intern(TypeData::Array { element, readonly })
    }

    pub fn tuple(&self, elements: Vec<TypeId>, readonly: bool) -> TypeId {
        self.intern(TypeData::Tuple { elements, readonly })
    }

    pub fn object(&self, shape: ObjectShape) -> TypeId {
        self.intern(TypeData::Object {
            shape: Rc::new(shape),
            alias: None,
        })
    }

    pub fn function(&self, signature: Signature) -> TypeId {
        self.object(ObjectShape {
            call_signatures: vec![signature],
            ..ObjectShape::default()
        })
    }

    pub fn named(&self, decl: DeclId, args: Vec<TypeId>) -> TypeId {
        self.intern(TypeData::Named { decl, args })
    }

    pub fn assertions(&self, received: TypeId, negated: bool) -> TypeId {
        self.intern(TypeData::Assertions { received, negated })
    }

    /// Attach a display alias to object and union types
    pub fn with_alias(&self, id: TypeId, alias: AliasInfo) -> TypeId {
        match &*self.data(id) {
            TypeData::Object { shape, alias: None } => self.intern(TypeData::Object {
                shape: shape.clone(),
                alias: Some(alias),
            }),
            TypeData::Union {
                members,
                alias: None,
            } => self.intern(TypeData::Union {
                members: members.clone(),
                alias: Some(alias),
            }),
            _ => id,
        }
    }

    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat = Vec::with_capacity(members.len());
        for member in members {
            match &*self.data(member) {
                TypeData::Union { members, .. } => flat.extend(members.iter().copied()),
                _ => flat.push(member),
            }
        }

        if flat.contains(&self.common.any) {
            return self.common.any;
        }
        if flat.contains(&self.common.unknown) {
            return self.common.unknown;
        }
        flat.retain(|id| *id != self.common.never);

        // Literals collapse into their primitive, and literal duplicates
        // differing only in freshness collapse into one
        let mut seen_literals: Vec<LiteralValue> = Vec::new();
        let mut reduced = Vec::with_capacity(flat.len());
        for id in flat.iter().copied() {
            if let TypeData::Literal { value, .. } = &*self.data(id) {
                if flat.contains(&self.intrinsic(value.base())) || seen_literals.contains(value) {
                    continue;
                }
                seen_literals.push(value.clone());
            }
            if !reduced.contains(&id) {
                reduced.push(id);
            }
        }

        let has_true = seen_literals.contains(&LiteralValue::Boolean(true));
        let has_false = seen_literals.contains(&LiteralValue::Boolean(false));
        if has_true && has_false {
            reduced.retain(|id| {
                !matches!(
                    &*self.data(*id),
                    TypeData::Literal {
                        value: LiteralValue::Boolean(_),
                        ..
                    }
                )
            });
            reduced.push(self.common.boolean);
        }

        if !self.strict_null_checks && reduced.len() > 1 {
            let nullable = [self.common.null, self.common.undefined];
            if reduced.iter().any(|id| !nullable.contains(id)) {
                reduced.retain(|id| !nullable.contains(id));
            }
        }

        reduced.sort_by_key(|id| id.index());
        reduced.dedup();
        match reduced.len() {
            0 => self.common.never,
            1 => reduced[0],
            _ => self.intern(TypeData::Union {
                members: reduced,
                alias: None,
            }),
        }
    }

    pub fn intersection(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: Vec<TypeId> = Vec::with_capacity(members.len());
        for member in members {
            let data = self.data(member);
            let parts = match &*data {
                TypeData::Intersection(parts) => parts.clone(),
                _ => vec![member],
            };
            for part in parts {
                if !flat.contains(&part) {
                    flat.push(part);
                }
            }
        }

        if flat.contains(&self.common.any) {
            return self.common.any;
        }
        if flat.contains(&self.common.never) {
            return self.common.never;
        }
        flat.retain(|id| *id != self.common.unknown);

        // Distribute over unions: (A | B) & C == (A & C) | (B & C)
        if let Some(position) = flat
            .iter()
            .position(|id| matches!(&*self.data(*id), TypeData::Union { .. }))
        {
            if let TypeData::Union { members, .. } = &*self.data(flat[position]) {
                if members.len() <= 32 {
                    let distributed = members
                        .iter()
                        .map(|member| {
                            let mut parts = flat.clone();
                            parts[position] = *member;
                            self.intersection(parts)
                        })
                        .collect();
                    return self.union(distributed);
                }
            }
        }

        // Disjoint primitives and differing literals reduce to never
        let mut unit: Option<TypeId> = None;
        let mut kept = Vec::with_capacity(flat.len());
        for id in flat {
            let data = self.data(id);
            let primitive = match &*data {
                TypeData::Intrinsic(intrinsic) if intrinsic.is_primitive() => {
                    Some((Some(*intrinsic), None))
                }
                TypeData::Literal { value, .. } => Some((Some(value.base()), Some(value.clone()))),
                _ => None,
            };
            let Some((base, literal)) = primitive else {
                kept.push(id);
                continue;
            };
            match unit {
                None => unit = Some(id),
                Some(current) => {
                    let current_data = self.data(current);
                    let merged = match (&*current_data, base, literal) {
                        (TypeData::Intrinsic(c), Some(b), Some(_)) if *c == b => Some(id),
                        (TypeData::Literal { value, .. }, Some(b), None) if value.base() == b => {
                            Some(current)
                        }
                        (TypeData::Literal { value: a, .. }, _, Some(b)) if *a == b => {
                            Some(current)
                        }
                        (TypeData::Intrinsic(c), Some(b), None) if *c == b => Some(current),
                        _ => None,
                    };
                    match merged {
                        Some(merged) => unit = Some(merged),
                        None => return self.common.never,
                    }
                }
            }
        }
        if let Some(unit) = unit {
            kept.insert(0, unit);
        }

        match kept.len() {
            0 => self.common.unknown,
            1 => kept[0],
            _ => self.intern(TypeData::Intersection(kept)),
        }
    }

    /// Fresh literals become their primitive; other types are unchanged
    pub fn widen_literal(&self, id: TypeId) -> TypeId {
        match &*self.data(id) {
            TypeData::Literal { value, fresh: true } => self.intrinsic(value.base()),
            TypeData::Union { members, alias } if alias.is_none() => {
                let widened: Vec<TypeId> = members.iter().map(|m| self.widen_literal(*m)).collect();
                if widened == *members {
                    id
                } else {
                    self.union(widened)
                }
            }
            _ => id,
        }
    }

    /// Widening for a mutable declaration: fresh literals, and `null` /
    /// `undefined` outside strict null checking
    pub fn widen_for_declaration(&self, id: TypeId) -> TypeId {
        if !self.strict_null_checks && (id == self.common.null || id == self.common.undefined) {
            return self.common.any;
        }
        if let TypeData::Array { element, readonly } = &*self.data(id) {
            if *element == self.common.never {
                return self.array(self.common.any, *readonly);
            }
        }
        self.widen_literal(id)
    }

    /// Drop freshness so a literal survives later widening
    pub fn regular_literal(&self, id: TypeId) -> TypeId {
        match &*self.data(id) {
            TypeData::Literal { value, fresh: true } => self.literal(value.clone(), false),
            TypeData::Union { members, alias } if alias.is_none() => {
                self.union(members.iter().map(|m| self.regular_literal(*m)).collect())
            }
            _ => id,
        }
    }

    pub fn is_fresh_literal(&self, id: TypeId) -> bool {
        matches!(&*self.data(id), TypeData::Literal { fresh: true, .. })
    }

    /// Remove `null` and `undefined` members
    pub fn non_nullable(&self, id: TypeId) -> TypeId {
        match &*self.data(id) {
            TypeData::Union { members, .. } => self.union(
                members
                    .iter()
                    .copied()
                    .filter(|m| *m != self.common.null && *m != self.common.undefined)
                    .collect(),
            ),
            _ if id == self.common.null || id == self.common.undefined => self.common.never,
            _ => id,
        }
    }

    pub fn union_members(&self, id: TypeId) -> Vec<TypeId> {
        match &*self.data(id) {
            TypeData::Union { members, .. } => members.clone(),
            _ => vec![id],
        }
    }

    // Type parameters

    pub fn new_type_parameter(&self, name: impl Into<String>) -> TypeId {
        let id = {
            let mut parameters = self.type_parameters.borrow_mut();
            parameters.push(TypeParameterInfo {
                name: name.into(),
                constraint: None,
                default: None,
            });
            TypeParameterId((parameters.len() - 1) as u32)
        };
        self.intern(TypeData::Parameter(id))
    }

    pub fn type_parameter(&self, id: TypeId) -> Option<TypeParameterInfo> {
        match *self.data(id) {
            TypeData::Parameter(parameter) => self
                .type_parameters
                .borrow()
                .get(parameter.0 as usize)
                .cloned(),
            _ => None,
        }
    }

    pub fn set_type_parameter_bounds(
        &self,
        id: TypeId,
        constraint: Option<TypeId>,
        default: Option<TypeId>,
    ) {
        if let TypeData::Parameter(parameter) = *self.data(id) {
            if let Some(info) = self.type_parameters.borrow_mut().get_mut(parameter.0 as usize) {
                info.constraint = constraint;
                info.default = default;
            }
        }
    }

    // Named declarations

    pub fn new_decl(&self, name: impl Into<String>, kind: DeclKind) -> DeclId {
        let mut decls = self.decls.borrow_mut();
        decls.push(NamedDecl {
            name: name.into(),
            kind,
            type_parameters: Vec::new(),
            template: None,
        });
        DeclId((decls.len() - 1) as u32)
    }

    pub fn decl(&self, decl: DeclId) -> NamedDecl {
        self.decls.borrow()[decl.0 as usize].clone()
    }

    pub fn set_decl_type_parameters(&self, decl: DeclId, type_parameters: Vec<TypeId>) {
        self.decls.borrow_mut()[decl.0 as usize].type_parameters = type_parameters;
    }

    /// Publish the member template of a declaration; resolved shapes built
    /// from an older template are discarded
    pub fn set_decl_template(&self, decl: DeclId, template: ObjectShape) {
        self.decls.borrow_mut()[decl.0 as usize].template = Some(Rc::new(template));
        self.shapes.borrow_mut().clear();
    }

    /// The instance type of a declaration over its own type parameters
    pub fn decl_self_type(&self, decl: DeclId) -> TypeId {
        let type_parameters = self.decl(decl).type_parameters;
        self.named(decl, type_parameters)
    }

    pub fn well_known(&self) -> WellKnownDecls {
        *self.well_known.borrow()
    }

    pub fn set_well_known(&self, update: impl FnOnce(&mut WellKnownDecls)) {
        update(&mut self.well_known.borrow_mut());
        self.shapes.borrow_mut().clear();
    }

    pub(crate) fn cached_shape(&self, id: TypeId) -> Option<Rc<ObjectShape>> {
        self.shapes.borrow().get(&id).cloned()
    }

    pub(crate) fn cache_shape(&self, id: TypeId, shape: Rc<ObjectShape>) {
        self.shapes.borrow_mut().insert(id, shape);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_shares_ids() {
        let store = TypeStore::new(true);
        let a = store.array(store.common().string, false);
        let b = store.array(store.common().string, false);
        assert_eq!(a, b);
        assert_ne!(a, store.array(store.common().number, false));
    }

    #[test]
    fn test_union_normalization() {
        let store = TypeStore::new(true);
        let common = *store.common();
        let literal = store.string_literal("a", true);

        assert_eq!(store.union(vec![literal, common.string]), common.string);
        assert_eq!(store.union(vec![common.string, common.never]), common.string);
        assert_eq!(store.union(vec![common.string, common.any]), common.any);
        assert_eq!(
            store.union(vec![common.true_type, common.false_type]),
            common.boolean
        );
        assert_eq!(
            store.union(vec![common.number, common.string]),
            store.union(vec![common.string, common.number])
        );
        assert_eq!(store.union(Vec::new()), common.never);
    }

    #[test]
    fn test_union_drops_null_without_strict_null_checks() {
        let store = TypeStore::new(false);
        let common = *store.common();
        assert_eq!(store.union(vec![common.string, common.null]), common.string);
        assert_eq!(store.union(vec![common.null]), common.null);
    }

    #[test]
    fn test_intersection_normalization() {
        let store = TypeStore::new(true);
        let common = *store.common();
        let literal = store.string_literal("a", false);

        assert_eq!(
            store.intersection(vec![common.string, common.number]),
            common.never
        );
        assert_eq!(store.intersection(vec![common.string, literal]), literal);
        assert_eq!(
            store.intersection(vec![common.unknown, common.number]),
            common.number
        );
        let both = store.union(vec![common.string, common.number]);
        assert_eq!(store.intersection(vec![both, common.string]), common.string);
    }

    #[test]
    fn test_widening() {
        let store = TypeStore::new(true);
        let common = *store.common();
        let fresh = store.number_literal(1.0, true);
        let regular = store.number_literal(1.0, false);

        assert_eq!(store.widen_literal(fresh), common.number);
        assert_eq!(store.widen_literal(regular), regular);
        assert_eq!(store.regular_literal(fresh), regular);
    }

    #[test]
    fn test_negative_zero_is_zero() {
        assert_eq!(NumberLiteral::new(-0.0), NumberLiteral::new(0.0));
    }
}
