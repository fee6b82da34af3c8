use super::types::{DeclId, TypeId};
use crate::ast::expression::Expression;
use crate::ast::statement::{
    ClassDeclaration, FunctionDeclaration, TypeAliasDeclaration, VariableDeclarator, VariableKind,
};
use crate::span::Span;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

/// Kind of symbol (variable, function, class, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Const,
    Function,
    Class,
    Interface,
    TypeAlias,
    TypeParameter,
    Parameter,
    Import,
    Namespace,
    /// `expectType` and other checker-provided values
    Intrinsic,
}

/// Where the type of a symbol comes from
#[derive(Debug, Clone)]
pub enum Declaration<'a> {
    Variable {
        declarator: &'a VariableDeclarator,
        kind: VariableKind,
    },
    /// Overloads and implementation, in source order
    Functions(Vec<&'a FunctionDeclaration>),
    Class {
        class: &'a ClassDeclaration,
        decl: DeclId,
    },
    Interface {
        decl: DeclId,
    },
    TypeAlias(&'a TypeAliasDeclaration),
    /// `import { name } from "..."` resolved against file `file`
    Import {
        file: usize,
        name: String,
    },
    /// `import * as ns from "..."`
    Namespace {
        file: usize,
    },
    DefaultExport(&'a Expression),
    /// Parameters, loop bindings and type parameters, typed up front
    Resolved(TypeId),
    ExpectType,
}

/// A symbol in the symbol table
#[derive(Debug, Clone)]
pub struct Symbol<'a> {
    pub name: String,
    pub kind: SymbolKind,
    pub declaration: Declaration<'a>,
    pub span: Span,
    /// Scope the declaration's own names resolve in
    pub scope: ScopeId,
    pub file: usize,
    /// Type as a value, once resolved
    pub value_type: Option<TypeId>,
    /// Currently resolving (for cycle detection)
    pub resolving: bool,
    pub is_exported: bool,
}

impl<'a> Symbol<'a> {
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        declaration: Declaration<'a>,
        span: Span,
        scope: ScopeId,
        file: usize,
    ) -> Self {
        let value_type = match &declaration {
            Declaration::Resolved(id) => Some(*id),
            _ => None,
        };
        Self {
            name: name.into(),
            kind,
            declaration,
            span,
            scope,
            file,
            value_type,
            resolving: false,
            is_exported: false,
        }
    }

    pub fn is_value(&self) -> bool {
        !matches!(
            self.kind,
            SymbolKind::Interface | SymbolKind::TypeAlias | SymbolKind::TypeParameter
        )
    }
}

/// A scope containing symbols; values and types live in separate namespaces
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    values: FxHashMap<String, SymbolId>,
    types: FxHashMap<String, SymbolId>,
}

impl Scope {
    pub fn with_parent(parent: ScopeId) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }
}

/// Symbol table managing scopes
#[derive(Debug, Default)]
pub struct SymbolTable<'a> {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol<'a>>,
}

impl<'a> SymbolTable<'a> {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            symbols: Vec::new(),
        }
    }

    /// The outermost scope
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Enter a new scope nested in `parent`
    pub fn create_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope::with_parent(parent));
        ScopeId((self.scopes.len() - 1) as u32)
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol<'a> {
        &self.symbols[id.0 as usize]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol<'a> {
        &mut self.symbols[id.0 as usize]
    }

    pub fn add_symbol(&mut self, symbol: Symbol<'a>) -> SymbolId {
        self.symbols.push(symbol);
        SymbolId((self.symbols.len() - 1) as u32)
    }

    /// Declare a value in `scope`
    pub fn declare_value(&mut self, scope: ScopeId, id: SymbolId) -> Result<(), String> {
        let name = self.symbol(id).name.clone();
        let values = &mut self.scopes[scope.0 as usize].values;
        if values.contains_key(&name) {
            return Err(format!("Duplicate identifier '{}'.", name));
        }
        values.insert(name, id);
        Ok(())
    }

    /// Declare a type in `scope`
    pub fn declare_type(&mut self, scope: ScopeId, id: SymbolId) -> Result<(), String> {
        let name = self.symbol(id).name.clone();
        let types = &mut self.scopes[scope.0 as usize].types;
        if types.contains_key(&name) {
            return Err(format!("Duplicate identifier '{}'.", name));
        }
        types.insert(name, id);
        Ok(())
    }

    /// Look up a value in this scope or parent scopes
    pub fn lookup_value(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.lookup(scope, |s| s.values.get(name).copied())
    }

    /// Look up a type in this scope or parent scopes
    pub fn lookup_type(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.lookup(scope, |s| s.types.get(name).copied())
    }

    /// Look up a value only in this scope (not parent scopes)
    pub fn lookup_value_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes[scope.0 as usize].values.get(name).copied()
    }

    /// Look up a type only in this scope (not parent scopes)
    pub fn lookup_type_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scopes[scope.0 as usize].types.get(name).copied()
    }

    fn lookup(&self, scope: ScopeId, find: impl Fn(&Scope) -> Option<SymbolId>) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = &self.scopes[id.0 as usize];
            if let Some(symbol) = find(scope) {
                return Some(symbol);
            }
            current = scope.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typechecker::types::TypeStore;

    fn resolved<'a>(name: &str, kind: SymbolKind, type_id: TypeId) -> Symbol<'a> {
        Symbol::new(
            name,
            kind,
            Declaration::Resolved(type_id),
            Span::dummy(),
            ScopeId(0),
            0,
        )
    }

    #[test]
    fn test_lookup_walks_parents() {
        let store = TypeStore::new(true);
        let mut table = SymbolTable::new();
        let root = table.root();
        let inner = table.create_scope(root);

        let x = table.add_symbol(resolved("x", SymbolKind::Variable, store.common().string));
        table.declare_value(root, x).unwrap();

        assert_eq!(table.lookup_value(inner, "x"), Some(x));
        assert_eq!(table.lookup_value_local(inner, "x"), None);
        assert_eq!(table.symbol(x).value_type, Some(store.common().string));
    }

    #[test]
    fn test_values_and_types_are_separate() {
        let store = TypeStore::new(true);
        let mut table = SymbolTable::new();
        let root = table.root();

        let value = table.add_symbol(resolved("A", SymbolKind::Const, store.common().number));
        let typ = table.add_symbol(resolved("A", SymbolKind::TypeParameter, store.common().string));
        table.declare_value(root, value).unwrap();
        table.declare_type(root, typ).unwrap();

        assert_eq!(table.lookup_value(root, "A"), Some(value));
        assert_eq!(table.lookup_type(root, "A"), Some(typ));
        assert!(!table.symbol(typ).is_value());
    }

    #[test]
    fn test_duplicate_declaration() {
        let store = TypeStore::new(true);
        let mut table = SymbolTable::new();
        let root = table.root();
        let first = table.add_symbol(resolved("x", SymbolKind::Variable, store.common().any));
        let second = table.add_symbol(resolved("x", SymbolKind::Variable, store.common().any));

        table.declare_value(root, first).unwrap();
        assert_eq!(
            table.declare_value(root, second),
            Err("Duplicate identifier 'x'.".to_string())
        );
    }
}
