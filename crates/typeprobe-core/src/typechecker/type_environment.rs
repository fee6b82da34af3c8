use super::symbol_table::{ScopeId, SymbolId};
use super::types::{DeclId, TypeId};
use crate::ast::statement::{ClassDeclaration, InterfaceDeclaration};
use rustc_hash::{FxHashMap, FxHashSet};

/// Syntax an interface or class template is built from
#[derive(Debug, Clone)]
pub enum DeclSource<'a> {
    /// Every merged declaration with the scope holding its type parameters
    /// and the file it appears in
    Interface(Vec<(&'a InterfaceDeclaration, ScopeId, usize)>),
    Class {
        class: &'a ClassDeclaration,
        scope: ScopeId,
        file: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateState {
    Pending,
    /// Members published so far are usable, the rest are being inferred
    Resolving,
    Done,
}

/// A type alias with its type parameters
#[derive(Debug, Clone)]
pub struct AliasEntry {
    pub type_parameters: Vec<TypeId>,
    /// Scope the type parameters are declared in
    pub scope: ScopeId,
    /// Resolved body over `type_parameters`
    pub body: Option<TypeId>,
}

/// Type environment managing type aliases, interfaces and classes
#[derive(Debug, Default)]
pub struct TypeEnvironment<'a> {
    decl_sources: FxHashMap<DeclId, DeclSource<'a>>,
    template_states: FxHashMap<DeclId, TemplateState>,
    aliases: FxHashMap<SymbolId, AliasEntry>,
    alias_instances: FxHashMap<(SymbolId, Vec<TypeId>), TypeId>,
    /// Aliases whose body is being resolved (for cycle detection)
    resolving_aliases: FxHashSet<SymbolId>,
}

impl<'a> TypeEnvironment<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_interface(
        &mut self,
        decl: DeclId,
        interface: &'a InterfaceDeclaration,
        scope: ScopeId,
        file: usize,
    ) {
        match self.decl_sources.get_mut(&decl) {
            Some(DeclSource::Interface(parts)) => parts.push((interface, scope, file)),
            _ => {
                self.decl_sources
                    .insert(decl, DeclSource::Interface(vec![(interface, scope, file)]));
                self.template_states.insert(decl, TemplateState::Pending);
            }
        }
    }

    pub fn register_class(&mut self, decl: DeclId, class: &'a ClassDeclaration, scope: ScopeId, file: usize) {
        self.decl_sources
            .insert(decl, DeclSource::Class { class, scope, file });
        self.template_states.insert(decl, TemplateState::Pending);
    }

    pub fn decl_source(&self, decl: DeclId) -> Option<DeclSource<'a>> {
        self.decl_sources.get(&decl).cloned()
    }

    /// Every registered declaration, in registration order of their ids
    pub fn decls(&self) -> Vec<DeclId> {
        let mut decls: Vec<DeclId> = self.decl_sources.keys().copied().collect();
        decls.sort();
        decls
    }

    pub fn template_state(&self, decl: DeclId) -> TemplateState {
        self.template_states
            .get(&decl)
            .copied()
            .unwrap_or(TemplateState::Done)
    }

    pub fn set_template_state(&mut self, decl: DeclId, state: TemplateState) {
        self.template_states.insert(decl, state);
    }

    pub fn register_alias(&mut self, symbol: SymbolId, type_parameters: Vec<TypeId>, scope: ScopeId) {
        self.aliases.insert(
            symbol,
            AliasEntry {
                type_parameters,
                scope,
                body: None,
            },
        );
    }

    pub fn alias(&self, symbol: SymbolId) -> Option<&AliasEntry> {
        self.aliases.get(&symbol)
    }

    pub fn set_alias_body(&mut self, symbol: SymbolId, body: TypeId) {
        if let Some(entry) = self.aliases.get_mut(&symbol) {
            entry.body = Some(body);
        }
    }

    /// Mark an alias as resolving; false when it already is (a cycle)
    pub fn begin_alias(&mut self, symbol: SymbolId) -> bool {
        self.resolving_aliases.insert(symbol)
    }

    pub fn end_alias(&mut self, symbol: SymbolId) {
        self.resolving_aliases.remove(&symbol);
    }

    pub fn alias_instance(&self, symbol: SymbolId, args: &[TypeId]) -> Option<TypeId> {
        self.alias_instances.get(&(symbol, args.to_vec())).copied()
    }

    pub fn cache_alias_instance(&mut self, symbol: SymbolId, args: Vec<TypeId>, instance: TypeId) {
        self.alias_instances.insert((symbol, args), instance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typechecker::types::TypeStore;

    #[test]
    fn test_alias_cycle_detection() {
        let mut env = TypeEnvironment::new();
        let symbol = SymbolId(3);
        env.register_alias(symbol, Vec::new(), ScopeId(0));

        assert!(env.begin_alias(symbol));
        assert!(!env.begin_alias(symbol));
        env.end_alias(symbol);
        assert!(env.begin_alias(symbol));
    }

    #[test]
    fn test_alias_instances_are_cached_by_arguments() {
        let store = TypeStore::new(true);
        let common = *store.common();
        let mut env = TypeEnvironment::new();
        let symbol = SymbolId(0);
        let boxed = store.array(common.string, false);

        env.cache_alias_instance(symbol, vec![common.string], boxed);
        assert_eq!(env.alias_instance(symbol, &[common.string]), Some(boxed));
        assert_eq!(env.alias_instance(symbol, &[common.number]), None);
    }

    #[test]
    fn test_unregistered_decls_count_as_done() {
        let env = TypeEnvironment::new();
        assert_eq!(env.template_state(DeclId(7)), TemplateState::Done);
    }
}
