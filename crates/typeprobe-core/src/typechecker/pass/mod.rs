//! The walk that binds every file and records the static type of every
//! expression into a [`TypeChecker`].
//!
//! Binding happens per block: declarations are hoisted into the block's
//! scope before any of its statements is checked. Symbol types are resolved
//! lazily and cached on the symbol, so a use may come before its declaration.

mod calls;
mod declarations;
mod expressions;
mod resolve;
mod statements;

use super::builtins::{LIB_FIRST_NODE_ID, LIB_SOURCE};
use super::display::TypeFormat;
use super::symbol_table::{Declaration, ScopeId, Symbol, SymbolId, SymbolKind, SymbolTable};
use super::type_checker::{CheckInput, FileTypeError, TypeChecker};
use super::type_environment::TypeEnvironment;
use super::types::{CommonTypes, Intrinsic, TypeData, TypeId, TypeStore};
use super::TypeCheckError;
use crate::ast::statement::{Block, Parameter, TypeParameter};
use crate::ast::expression::Expression;
use crate::ast::types::Type;
use crate::ast::Script;
use crate::diagnostics::{CollectingDiagnosticHandler, DiagnosticHandler};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::span::Span;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;
use tracing::debug;

/// Names a module makes visible to importers
#[derive(Debug, Default)]
struct Exports {
    values: FxHashMap<String, SymbolId>,
    types: FxHashMap<String, SymbolId>,
}

struct SourceContext<'a> {
    script: &'a Script,
    imports: FxHashMap<String, usize>,
    /// Scope of the file's top-level declarations
    scope: ScopeId,
    is_lib: bool,
    exports: Exports,
}

/// The function whose body is being checked
struct FunctionContext {
    declared_return: Option<TypeId>,
    contextual_return: Option<TypeId>,
    returns: Vec<TypeId>,
}

/// Syntax shared by function declarations, methods, constructors, function
/// expressions, arrows and signature types
#[derive(Clone, Copy)]
pub(super) struct FunctionParts<'a> {
    pub type_parameters: Option<&'a [TypeParameter]>,
    pub parameters: &'a [Parameter],
    pub return_type: Option<&'a Type>,
    pub body: Option<FunctionBody<'a>>,
    pub span: Span,
}

#[derive(Clone, Copy)]
pub(super) enum FunctionBody<'a> {
    Block(&'a Block),
    Expression(&'a Expression),
}

/// When a function's body is checked while building its signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BodyMode {
    /// Never; a missing return annotation means `any`
    SignatureOnly,
    /// Only to infer a missing return type, at most once per function
    Declaration,
    /// Always, unless already checked
    Statement,
    /// Every time, the contextual type may differ between checks
    Expression,
}

pub(crate) struct CheckPass<'a> {
    checker: TypeChecker,
    symbols: SymbolTable<'a>,
    env: TypeEnvironment<'a>,
    sources: Vec<SourceContext<'a>>,
    global_scope: ScopeId,
    diagnostics: Vec<FileTypeError>,
    reported: FxHashSet<(usize, usize, String)>,
    /// File and scope the current node belongs to
    file: usize,
    scope: ScopeId,
    functions: Vec<FunctionContext>,
    this_types: Vec<TypeId>,
    /// Depth of enclosing `as const` expressions
    const_context: usize,
    /// Depth of overload trials whose diagnostics are discarded
    speculative: usize,
    /// Nesting of the expression being checked
    expression_depth: usize,
    checked_bodies: FxHashSet<(usize, usize)>,
    inferred_returns: FxHashMap<(usize, usize), TypeId>,
    abstract_constructors: FxHashSet<TypeId>,
}

impl<'a> CheckPass<'a> {
    fn new(checker: TypeChecker) -> Self {
        let mut symbols = SymbolTable::new();
        let root = symbols.root();
        let expect_type = symbols.add_symbol(Symbol::new(
            super::intrinsics::EXPECT_TYPE_NAME,
            SymbolKind::Intrinsic,
            Declaration::ExpectType,
            Span::dummy(),
            root,
            0,
        ));
        let _ = symbols.declare_value(root, expect_type);
        let global_scope = symbols.create_scope(root);

        CheckPass {
            checker,
            symbols,
            env: TypeEnvironment::new(),
            sources: Vec::new(),
            global_scope,
            diagnostics: Vec::new(),
            reported: FxHashSet::default(),
            file: 0,
            scope: global_scope,
            functions: Vec::new(),
            this_types: Vec::new(),
            const_context: 0,
            speculative: 0,
            expression_depth: 0,
            checked_bodies: FxHashSet::default(),
            inferred_returns: FxHashMap::default(),
            abstract_constructors: FxHashSet::default(),
        }
    }

    /// Bind and check `files` against the built-in library
    pub(crate) fn run(checker: TypeChecker, files: &[CheckInput<'_>]) -> (TypeChecker, Vec<FileTypeError>) {
        let lib = parse_lib();
        let mut pass = CheckPass::new(checker);

        for input in files {
            pass.add_source(input.script, input.imports.clone(), false);
        }
        let lib_index = pass.add_source(&lib, FxHashMap::default(), true);

        pass.bind_source(lib_index);
        pass.register_well_known();
        for index in 0..files.len() {
            pass.bind_source(index);
        }
        pass.build_pending_templates();

        for index in 0..files.len() {
            pass.check_source(index);
        }

        debug!(
            files = files.len(),
            types = pass.checker.store().type_count(),
            diagnostics = pass.diagnostics.len(),
            "checked program"
        );
        pass.finish()
    }

    fn add_source(&mut self, script: &'a Script, imports: FxHashMap<String, usize>, is_lib: bool) -> usize {
        let scope = if script.is_module() && !is_lib {
            self.symbols.create_scope(self.global_scope)
        } else {
            self.global_scope
        };
        self.sources.push(SourceContext {
            script,
            imports,
            scope,
            is_lib,
            exports: Exports::default(),
        });
        self.sources.len() - 1
    }

    fn bind_source(&mut self, index: usize) {
        let source = &self.sources[index];
        let (script, scope) = (source.script, source.scope);
        self.file = index;
        self.scope = scope;
        self.bind_statements(&script.statements, scope);
    }

    fn check_source(&mut self, index: usize) {
        let source = &self.sources[index];
        let (script, scope) = (source.script, source.scope);
        self.file = index;
        self.scope = scope;
        self.check_statements(&script.statements);
    }

    /// Record the library interfaces primitives and arrays map onto
    fn register_well_known(&mut self) {
        let global = self.global_scope;
        let lookup = |pass: &Self, name: &str| {
            pass.symbols
                .lookup_type_local(global, name)
                .and_then(|id| match pass.symbols.symbol(id).declaration {
                    Declaration::Interface { decl } => Some(decl),
                    _ => None,
                })
        };
        let array = lookup(self, "Array");
        let readonly_array = lookup(self, "ReadonlyArray");
        let string = lookup(self, "String");
        let number = lookup(self, "Number");
        let boolean = lookup(self, "Boolean");
        self.checker.store().set_well_known(|known| {
            known.array = array;
            known.readonly_array = readonly_array;
            known.string = string;
            known.number = number;
            known.boolean = boolean;
        });
    }

    fn finish(mut self) -> (TypeChecker, Vec<FileTypeError>) {
        self.diagnostics
            .sort_by_key(|diagnostic| (diagnostic.file, diagnostic.error.span.start));
        (self.checker, self.diagnostics)
    }

    // Shared helpers

    pub(super) fn store(&self) -> &TypeStore {
        self.checker.store()
    }

    pub(super) fn common(&self) -> CommonTypes {
        *self.checker.store().common()
    }

    pub(super) fn display(&self, id: TypeId) -> String {
        self.checker.type_to_string(id, TypeFormat::DEFAULT)
    }

    pub(super) fn strict_null_checks(&self) -> bool {
        self.store().strict_null_checks()
    }

    /// Report a semantic error in the current file
    pub(super) fn error(&mut self, span: Span, message: impl Into<String>) {
        if self.speculative > 0 {
            return;
        }
        let message = message.into();
        if self.sources[self.file].is_lib {
            debug!(%message, "library diagnostic");
            return;
        }
        if !self.reported.insert((self.file, span.start, message.clone())) {
            return;
        }
        self.diagnostics.push(FileTypeError {
            file: self.file,
            error: TypeCheckError::new(message, span),
        });
    }

    /// Run `f` as if at the top of `file` in `scope`, outside any function
    pub(super) fn isolated<R>(&mut self, file: usize, scope: ScopeId, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved_file = std::mem::replace(&mut self.file, file);
        let saved_scope = std::mem::replace(&mut self.scope, scope);
        let saved_functions = std::mem::take(&mut self.functions);
        let saved_this = std::mem::take(&mut self.this_types);
        let saved_const = std::mem::replace(&mut self.const_context, 0);
        let saved_speculative = std::mem::replace(&mut self.speculative, 0);

        let result = f(self);

        self.file = saved_file;
        self.scope = saved_scope;
        self.functions = saved_functions;
        self.this_types = saved_this;
        self.const_context = saved_const;
        self.speculative = saved_speculative;
        result
    }

    pub(super) fn in_scope<R>(&mut self, scope: ScopeId, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = saved;
        result
    }

    pub(super) fn is_assignable(&mut self, source: TypeId, target: TypeId) -> bool {
        self.ensure_named_templates(source);
        self.ensure_named_templates(target);
        self.checker.is_type_assignable_to(source, target)
    }

    /// Report `Type 'S' is not assignable to type 'T'.` unless it is
    pub(super) fn check_assignable(&mut self, source: TypeId, target: TypeId, span: Span) -> bool {
        if self.is_assignable(source, target) {
            return true;
        }
        let message = format!(
            "Type '{}' is not assignable to type '{}'.",
            self.display(source),
            self.display(target)
        );
        self.error(span, message);
        false
    }

    /// Make sure the templates behind the top level of `id` are built
    pub(super) fn ensure_named_templates(&mut self, id: TypeId) {
        let data = self.store().data(id);
        match &*data {
            TypeData::Named { decl, .. } => self.ensure_template(*decl),
            TypeData::Union { members, .. } | TypeData::Intersection(members) => {
                for member in members {
                    self.ensure_named_templates(*member);
                }
            }
            TypeData::Parameter(_) => {
                if let Some(constraint) = self.store().type_parameter(id).and_then(|p| p.constraint) {
                    if constraint != id {
                        self.ensure_named_templates(constraint);
                    }
                }
            }
            _ => {}
        }
    }

    /// A contextual type whose literals should survive widening
    pub(super) fn is_literal_context(&self, contextual: Option<TypeId>) -> bool {
        contextual.is_some_and(|c| self.literal_context(c, false, 0))
    }

    fn literal_context(&self, contextual: TypeId, via_parameter: bool, depth: usize) -> bool {
        if depth > 8 {
            return false;
        }
        let store = self.store();
        store.union_members(contextual).into_iter().any(|member| {
            match &*store.data(member) {
                TypeData::Literal { .. } => true,
                TypeData::Intrinsic(
                    Intrinsic::String | Intrinsic::Number | Intrinsic::Boolean | Intrinsic::BigInt,
                ) => via_parameter,
                TypeData::Parameter(_) => store
                    .type_parameter(member)
                    .and_then(|p| p.constraint)
                    .is_some_and(|c| self.literal_context(c, true, depth + 1)),
                _ => false,
            }
        })
    }

    /// Null and undefined members of `id` under strict null checking
    pub(super) fn nullish_members(&self, id: TypeId) -> Vec<TypeId> {
        if !self.strict_null_checks() {
            return Vec::new();
        }
        let common = self.common();
        self.store()
            .union_members(id)
            .into_iter()
            .filter(|m| *m == common.null || *m == common.undefined)
            .collect()
    }
}

/// Parse the built-in library; its diagnostics are internal and only logged
fn parse_lib() -> Script {
    let handler: Arc<dyn DiagnosticHandler> = Arc::new(CollectingDiagnosticHandler::new());
    let mut lexer = Lexer::new(LIB_SOURCE, handler.clone());
    let tokens = lexer.tokenize();
    let mut parser = Parser::new(tokens, handler.clone()).with_first_node_id(LIB_FIRST_NODE_ID);
    let script = parser
        .parse()
        .unwrap_or_else(|_| Script::new(Vec::new(), Span::dummy()));
    if handler.has_errors() {
        debug!(errors = handler.error_count(), "library failed to parse cleanly");
    }
    script
}
