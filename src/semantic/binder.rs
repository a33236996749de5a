//! Binder: builds the reference oracle's symbol table and resolution map.
//!
//! One pass per scope in two phases: declarations are hoisted first so
//! forward references and `alias` chains resolve regardless of statement
//! order, then every identifier occurrence (expression and type position
//! alike) is resolved and recorded against its `NodeId`.

use std::collections::HashMap;

use crate::semantic::symbols::{
    BuiltinType, FunctionSig, SymbolId, SymbolKind, SymbolTable, TypeAliasInfo, VariableInfo,
};
use crate::syntax::ast::{
    Block, ClosureExpr, Expr, ExprKind, FnDecl, Ident, NodeId, Stmt, StmtKind, TypeExpr,
    TypeExprKind, TypeParam, Unit,
};

/// Symbols of the predeclared global types.
#[derive(Debug, Clone, Copy)]
pub struct Builtins {
    pub number: SymbolId,
    pub string: SymbolId,
    pub boolean: SymbolId,
    pub void: SymbolId,
    pub array: SymbolId,
}

/// The bound view of one compilation unit: symbol table plus the
/// identifier-occurrence resolutions keyed by `NodeId`. Implements
/// [`crate::semantic::SemanticOracle`]; see `infer.rs` for the inference
/// half.
#[derive(Debug)]
pub struct Analysis {
    pub(crate) table: SymbolTable,
    pub(crate) resolutions: HashMap<NodeId, SymbolId>,
    pub(crate) builtins: Builtins,
}

impl Analysis {
    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn builtins(&self) -> Builtins {
        self.builtins
    }

    pub(crate) fn lookup_ident(&self, ident: &Ident) -> Option<SymbolId> {
        self.resolutions.get(&ident.id).copied()
    }

    /// Canonical (alias-rooted) symbol of an identifier occurrence.
    pub(crate) fn canonical_ident(&self, ident: &Ident) -> Option<SymbolId> {
        self.lookup_ident(ident).map(|s| self.table.root(s))
    }
}

/// Bind one compilation unit and produce its [`Analysis`].
pub fn bind_unit(unit: &Unit) -> Analysis {
    let mut binder = Binder::new();
    binder.enter_scope();
    binder.declare_stmts(&unit.stmts);
    binder.resolve_stmts(&unit.stmts);
    binder.exit_scope();
    Analysis {
        table: binder.table,
        resolutions: binder.resolutions,
        builtins: binder.builtins,
    }
}

struct Binder {
    table: SymbolTable,
    resolutions: HashMap<NodeId, SymbolId>,
    scopes: Vec<HashMap<String, SymbolId>>,
    builtins: Builtins,
}

impl Binder {
    fn new() -> Self {
        let mut table = SymbolTable::new();
        let number = table.intern("number", SymbolKind::Builtin(BuiltinType::Number));
        let string = table.intern("string", SymbolKind::Builtin(BuiltinType::Str));
        let boolean = table.intern("bool", SymbolKind::Builtin(BuiltinType::Bool));
        let void = table.intern("void", SymbolKind::Builtin(BuiltinType::Void));
        let array = table.intern("Array", SymbolKind::Builtin(BuiltinType::Array));

        let mut globals = HashMap::new();
        for (name, id) in [
            ("number", number),
            ("string", string),
            ("bool", boolean),
            ("void", void),
            ("Array", array),
        ] {
            globals.insert(name.to_string(), id);
        }

        Binder {
            table,
            resolutions: HashMap::new(),
            scopes: vec![globals],
            builtins: Builtins {
                number,
                string,
                boolean,
                void,
                array,
            },
        }
    }

    fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, id: SymbolId) {
        // scope stack is never empty while binding
        self.scopes
            .last_mut()
            .expect("binder always has an active scope")
            .insert(name.to_string(), id);
    }

    fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn record(&mut self, id: NodeId, symbol: SymbolId) {
        self.resolutions.insert(id, symbol);
    }

    // --- Declaration phase (hoisting) ---

    fn declare_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::Function(decl) => {
                    let sym = self
                        .table
                        .intern(&decl.name.name, SymbolKind::Function(FunctionSig::default()));
                    self.declare(&decl.name.name, sym);
                    self.record(decl.name.id, sym);
                }
                StmtKind::TypeAlias(decl) => {
                    let sym = self.table.intern(
                        &decl.name.name,
                        SymbolKind::TypeAlias(TypeAliasInfo {
                            params: Vec::new(),
                            target: decl.target.clone(),
                        }),
                    );
                    self.declare(&decl.name.name, sym);
                    self.record(decl.name.id, sym);
                }
                StmtKind::Alias(decl) => {
                    let sym = self
                        .table
                        .intern(&decl.name.name, SymbolKind::Alias { target: None });
                    self.declare(&decl.name.name, sym);
                    self.record(decl.name.id, sym);
                }
                StmtKind::Let(decl) => {
                    let sym = self.table.intern(
                        &decl.name.name,
                        SymbolKind::Variable(VariableInfo {
                            annotation: decl.ty.clone(),
                            init: decl.init.clone(),
                        }),
                    );
                    self.declare(&decl.name.name, sym);
                    self.record(decl.name.id, sym);
                }
                StmtKind::Return(_) | StmtKind::Expr(_) => {}
            }
        }
    }

    // --- Resolution phase ---

    fn resolve_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            match &stmt.kind {
                StmtKind::Function(decl) => self.resolve_fn_decl(decl),
                StmtKind::TypeAlias(decl) => {
                    self.enter_scope();
                    let params = self.declare_type_params(&decl.params);
                    self.resolve_type(&decl.target);
                    self.exit_scope();
                    // declaration phase interned this symbol
                    let sym = self.resolutions[&decl.name.id];
                    self.table.set_type_alias_info(
                        sym,
                        TypeAliasInfo {
                            params,
                            target: decl.target.clone(),
                        },
                    );
                }
                StmtKind::Alias(decl) => {
                    if let Some(target) = self.lookup(&decl.target.name) {
                        self.record(decl.target.id, target);
                        let sym = self.resolutions[&decl.name.id];
                        self.table.set_alias_target(sym, target);
                    }
                }
                StmtKind::Let(decl) => {
                    if let Some(ty) = &decl.ty {
                        self.resolve_type(ty);
                    }
                    if let Some(init) = &decl.init {
                        self.resolve_expr(init);
                    }
                }
                StmtKind::Return(value) => {
                    if let Some(value) = value {
                        self.resolve_expr(value);
                    }
                }
                StmtKind::Expr(expr) => self.resolve_expr(expr),
            }
        }
    }

    fn resolve_fn_decl(&mut self, decl: &FnDecl) {
        self.enter_scope();
        let type_params = self.declare_type_params(&decl.type_params);
        self.declare_and_resolve_params(&decl.params);
        if let Some(ret) = &decl.return_type {
            self.resolve_type(ret);
        }
        if let Some(body) = &decl.body {
            self.resolve_block(body);
        }
        self.exit_scope();

        // declaration phase interned this symbol
        let sym = self.resolutions[&decl.name.id];
        self.table.set_function_sig(
            sym,
            FunctionSig {
                type_params,
                params: decl.params.iter().map(|p| p.ty.clone()).collect(),
                ret: decl.return_type.clone(),
            },
        );
    }

    fn resolve_closure(&mut self, closure: &ClosureExpr) {
        self.enter_scope();
        self.declare_type_params(&closure.type_params);
        self.declare_and_resolve_params(&closure.params);
        if let Some(ret) = &closure.return_type {
            self.resolve_type(ret);
        }
        self.resolve_block(&closure.body);
        self.exit_scope();
    }

    fn resolve_block(&mut self, block: &Block) {
        self.declare_stmts(&block.stmts);
        self.resolve_stmts(&block.stmts);
    }

    fn declare_type_params(&mut self, params: &[TypeParam]) -> Vec<SymbolId> {
        let symbols: Vec<SymbolId> = params
            .iter()
            .map(|tp| {
                let sym = self.table.intern(&tp.name.name, SymbolKind::TypeParam);
                self.declare(&tp.name.name, sym);
                self.record(tp.name.id, sym);
                sym
            })
            .collect();
        // constraints may reference sibling type parameters
        for tp in params {
            if let Some(constraint) = &tp.constraint {
                self.resolve_type(constraint);
            }
        }
        symbols
    }

    fn declare_and_resolve_params(&mut self, params: &[crate::syntax::ast::Param]) {
        for param in params {
            let sym = self.table.intern(
                &param.name.name,
                SymbolKind::Variable(VariableInfo {
                    annotation: param.ty.clone(),
                    init: None,
                }),
            );
            self.declare(&param.name.name, sym);
            self.record(param.name.id, sym);
        }
        for param in params {
            if let Some(ty) = &param.ty {
                self.resolve_type(ty);
            }
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Ident(ident) => {
                if let Some(sym) = self.lookup(&ident.name) {
                    self.record(ident.id, sym);
                }
            }
            ExprKind::Number(_) | ExprKind::Str(_) | ExprKind::Bool(_) => {}
            ExprKind::Array(items) => {
                for item in items {
                    self.resolve_expr(item);
                }
            }
            ExprKind::Member { object, .. } => self.resolve_expr(object),
            ExprKind::Call(call) => {
                self.resolve_expr(&call.callee);
                if let Some(type_args) = &call.type_args {
                    for arg in type_args {
                        self.resolve_type(arg);
                    }
                }
                for arg in &call.args {
                    self.resolve_expr(arg);
                }
            }
            ExprKind::Closure(closure) => self.resolve_closure(closure),
            ExprKind::Paren(inner) => self.resolve_expr(inner),
            ExprKind::Binary { lhs, rhs, .. } => {
                self.resolve_expr(lhs);
                self.resolve_expr(rhs);
            }
        }
    }

    fn resolve_type(&mut self, ty: &TypeExpr) {
        match &ty.kind {
            TypeExprKind::Ref { name, args } => {
                if let Some(sym) = self.lookup(&name.name) {
                    self.record(name.id, sym);
                }
                for arg in args {
                    self.resolve_type(arg);
                }
            }
            TypeExprKind::Array(inner) => self.resolve_type(inner),
            TypeExprKind::Object(members) => {
                for member in members {
                    self.resolve_type(&member.ty);
                }
            }
            TypeExprKind::Union(members) | TypeExprKind::Intersection(members) => {
                for member in members {
                    self.resolve_type(member);
                }
            }
            TypeExprKind::Paren(inner) => self.resolve_type(inner),
        }
    }
}
