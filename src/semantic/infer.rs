//! Type inference for the reference oracle.
//!
//! Provides the oracle operations the expansion engine consumes at call
//! sites: conversion of written type arguments into semantic types, and
//! structural inference of type arguments from value arguments when none
//! are written. Inference matches declared parameter annotations against
//! argument types, expanding alias applications structurally where shapes
//! disagree. All walks are depth-capped; on exhaustion the oracle simply
//! reports "no resolved type arguments" and the engine degrades per its
//! diagnostic taxonomy.

use std::collections::HashMap;

use crate::semantic::binder::Analysis;
use crate::semantic::symbols::{BuiltinType, SymbolId, SymbolKind};
use crate::semantic::types::{Prim, Property, Type};
use crate::syntax::ast::{
    CallExpr, Expr, ExprKind, BinOp, ObjectMember, TypeExpr, TypeExprKind,
};

/// Cap on inference recursion (alias expansion, initializer chasing).
const MAX_INFER_DEPTH: usize = 32;

impl Analysis {
    // ------------------------------------------------------------------
    // Syntax -> semantic conversion
    // ------------------------------------------------------------------

    /// Convert a written type expression into its semantic value, following
    /// the recorded identifier resolutions.
    pub fn type_from_syntax(&self, ty: &TypeExpr) -> Type {
        match &ty.kind {
            TypeExprKind::Ref { name, args } => {
                let converted: Vec<Type> = args.iter().map(|a| self.type_from_syntax(a)).collect();
                let Some(sym) = self.canonical_ident(name) else {
                    return Type::Reference {
                        symbol: None,
                        name: name.name.clone(),
                        args: converted,
                    };
                };
                match &self.table.get(sym).kind {
                    SymbolKind::Builtin(BuiltinType::Number) => Type::Prim(Prim::Number),
                    SymbolKind::Builtin(BuiltinType::Str) => Type::Prim(Prim::Str),
                    SymbolKind::Builtin(BuiltinType::Bool) => Type::Prim(Prim::Bool),
                    SymbolKind::Builtin(BuiltinType::Void) => Type::Prim(Prim::Void),
                    SymbolKind::Builtin(BuiltinType::Array) => Type::Reference {
                        symbol: Some(sym),
                        name: "Array".to_string(),
                        args: converted,
                    },
                    SymbolKind::TypeParam => Type::Param {
                        symbol: sym,
                        name: name.name.clone(),
                    },
                    SymbolKind::TypeAlias(_) => Type::Alias {
                        symbol: sym,
                        name: self.table.get(sym).name.clone(),
                        args: converted,
                    },
                    _ => Type::Reference {
                        symbol: Some(sym),
                        name: name.name.clone(),
                        args: converted,
                    },
                }
            }
            TypeExprKind::Array(inner) => Type::Reference {
                symbol: Some(self.builtins.array),
                name: "Array".to_string(),
                args: vec![self.type_from_syntax(inner)],
            },
            TypeExprKind::Object(members) => {
                Type::Object(members.iter().map(|m| self.property_from_member(m)).collect())
            }
            TypeExprKind::Union(members) => {
                Type::Union(members.iter().map(|m| self.type_from_syntax(m)).collect())
            }
            TypeExprKind::Intersection(members) => Type::Intersection(
                members.iter().map(|m| self.type_from_syntax(m)).collect(),
            ),
            TypeExprKind::Paren(inner) => self.type_from_syntax(inner),
        }
    }

    fn property_from_member(&self, member: &ObjectMember) -> Property {
        Property {
            name: member.name.clone(),
            optional: member.optional,
            ty: self.type_from_syntax(&member.ty),
        }
    }

    // ------------------------------------------------------------------
    // Semantic -> syntax conversion (the oracle's canonical printer)
    // ------------------------------------------------------------------

    /// Canonical type-to-syntax conversion at full fidelity. Performs no
    /// substitution; the materializer uses it as its terminal fallback.
    pub fn type_to_syntax_value(&self, ty: &Type) -> TypeExpr {
        match ty {
            Type::Param { name, .. } => TypeExpr::reference(name.clone(), Vec::new()),
            Type::Alias { name, args, .. } => TypeExpr::reference(
                name.clone(),
                args.iter().map(|a| self.type_to_syntax_value(a)).collect(),
            ),
            Type::Reference { name, args, .. } => {
                if name == "Array" && args.len() == 1 {
                    TypeExpr::synthetic(TypeExprKind::Array(Box::new(
                        self.type_to_syntax_value(&args[0]),
                    )))
                } else {
                    TypeExpr::reference(
                        name.clone(),
                        args.iter().map(|a| self.type_to_syntax_value(a)).collect(),
                    )
                }
            }
            Type::Object(props) => TypeExpr::synthetic(TypeExprKind::Object(
                props
                    .iter()
                    .map(|p| ObjectMember {
                        name: p.name.clone(),
                        optional: p.optional,
                        ty: self.type_to_syntax_value(&p.ty),
                    })
                    .collect(),
            )),
            Type::Union(members) => TypeExpr::synthetic(TypeExprKind::Union(
                members.iter().map(|m| self.type_to_syntax_value(m)).collect(),
            )),
            Type::Intersection(members) => TypeExpr::synthetic(TypeExprKind::Intersection(
                members.iter().map(|m| self.type_to_syntax_value(m)).collect(),
            )),
            Type::Prim(prim) => TypeExpr::reference(prim.name(), Vec::new()),
        }
    }

    // ------------------------------------------------------------------
    // Call-site type arguments
    // ------------------------------------------------------------------

    /// Resolved type arguments for a call: the written ones when present,
    /// otherwise structural inference from the value arguments. `None` means
    /// the call's signature could not be resolved or inference failed.
    pub fn infer_call_type_args(&self, call: &CallExpr, depth: usize) -> Option<Vec<Type>> {
        if depth > MAX_INFER_DEPTH {
            return None;
        }
        let ExprKind::Ident(callee) = &call.callee.kind else {
            return None;
        };
        let sym = self.canonical_ident(callee)?;
        let SymbolKind::Function(sig) = &self.table.get(sym).kind else {
            return None;
        };

        if sig.type_params.is_empty() {
            return Some(Vec::new());
        }

        if let Some(explicit) = &call.type_args {
            return Some(explicit.iter().map(|t| self.type_from_syntax(t)).collect());
        }

        let mut subst: HashMap<SymbolId, Type> = HashMap::new();
        for (annotation, arg) in sig.params.iter().zip(call.args.iter()) {
            let Some(annotation) = annotation else { continue };
            let Some(arg_ty) = self.type_of_expr(arg, depth + 1) else {
                continue;
            };
            self.unify(annotation, &arg_ty, &mut subst, depth + 1);
        }

        sig.type_params
            .iter()
            .map(|tp| subst.get(tp).cloned())
            .collect()
    }

    // ------------------------------------------------------------------
    // Expression typing
    // ------------------------------------------------------------------

    /// Best-effort type of a value expression. Only the shapes inference
    /// needs are covered; everything else is `None`.
    pub fn type_of_expr(&self, expr: &Expr, depth: usize) -> Option<Type> {
        if depth > MAX_INFER_DEPTH {
            return None;
        }
        match &expr.kind {
            ExprKind::Number(_) => Some(Type::Prim(Prim::Number)),
            ExprKind::Str(_) => Some(Type::Prim(Prim::Str)),
            ExprKind::Bool(_) => Some(Type::Prim(Prim::Bool)),
            ExprKind::Ident(ident) => {
                let sym = self.canonical_ident(ident)?;
                match &self.table.get(sym).kind {
                    SymbolKind::Variable(info) => match &info.annotation {
                        Some(annotation) => Some(self.type_from_syntax(annotation)),
                        None => info
                            .init
                            .as_ref()
                            .and_then(|init| self.type_of_expr(init, depth + 1)),
                    },
                    _ => None,
                }
            }
            ExprKind::Array(items) => {
                let element = items
                    .iter()
                    .find_map(|item| self.type_of_expr(item, depth + 1))?;
                Some(Type::Reference {
                    symbol: Some(self.builtins.array),
                    name: "Array".to_string(),
                    args: vec![element],
                })
            }
            ExprKind::Paren(inner) => self.type_of_expr(inner, depth + 1),
            ExprKind::Binary { op, .. } => match op {
                BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                    Some(Type::Prim(Prim::Number))
                }
                BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt => Some(Type::Prim(Prim::Bool)),
            },
            ExprKind::Call(call) => self.return_type_of_call(call, depth + 1),
            ExprKind::Member { .. } | ExprKind::Closure(_) => None,
        }
    }

    /// Declared return type of a resolved call, with the call's type
    /// arguments substituted in.
    fn return_type_of_call(&self, call: &CallExpr, depth: usize) -> Option<Type> {
        if depth > MAX_INFER_DEPTH {
            return None;
        }
        let ExprKind::Ident(callee) = &call.callee.kind else {
            return None;
        };
        let sym = self.canonical_ident(callee)?;
        let SymbolKind::Function(sig) = &self.table.get(sym).kind else {
            return None;
        };
        let ret = sig.ret.as_ref()?;
        let ret_ty = self.type_from_syntax(ret);
        if sig.type_params.is_empty() {
            return Some(ret_ty);
        }

        let type_args = self.infer_call_type_args(call, depth + 1)?;
        if type_args.len() != sig.type_params.len() {
            return None;
        }
        let map: HashMap<SymbolId, Type> = sig
            .type_params
            .iter()
            .copied()
            .zip(type_args)
            .collect();
        Some(self.substitute(&ret_ty, &map))
    }

    /// Replace bound type parameters inside a semantic type value.
    pub fn substitute(&self, ty: &Type, map: &HashMap<SymbolId, Type>) -> Type {
        match ty {
            Type::Param { symbol, .. } => map.get(symbol).cloned().unwrap_or_else(|| ty.clone()),
            Type::Alias { symbol, name, args } => Type::Alias {
                symbol: *symbol,
                name: name.clone(),
                args: args.iter().map(|a| self.substitute(a, map)).collect(),
            },
            Type::Reference { symbol, name, args } => Type::Reference {
                symbol: *symbol,
                name: name.clone(),
                args: args.iter().map(|a| self.substitute(a, map)).collect(),
            },
            Type::Object(props) => Type::Object(
                props
                    .iter()
                    .map(|p| Property {
                        name: p.name.clone(),
                        optional: p.optional,
                        ty: self.substitute(&p.ty, map),
                    })
                    .collect(),
            ),
            Type::Union(members) => {
                Type::Union(members.iter().map(|m| self.substitute(m, map)).collect())
            }
            Type::Intersection(members) => Type::Intersection(
                members.iter().map(|m| self.substitute(m, map)).collect(),
            ),
            Type::Prim(_) => ty.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Structural unification
    // ------------------------------------------------------------------

    /// Match a declared parameter annotation against an argument type,
    /// binding any type parameters the annotation references. First binding
    /// wins; later conflicting matches are ignored.
    fn unify(
        &self,
        annotation: &TypeExpr,
        arg: &Type,
        subst: &mut HashMap<SymbolId, Type>,
        depth: usize,
    ) {
        if depth > MAX_INFER_DEPTH {
            return;
        }
        match &annotation.kind {
            TypeExprKind::Paren(inner) => self.unify(inner, arg, subst, depth + 1),
            TypeExprKind::Ref { name, args } => {
                let Some(sym) = self.canonical_ident(name) else {
                    return;
                };
                match &self.table.get(sym).kind {
                    SymbolKind::TypeParam => {
                        subst.entry(sym).or_insert_with(|| arg.clone());
                    }
                    SymbolKind::TypeAlias(info) => {
                        // same alias applied on both sides: match arguments
                        if let Type::Alias {
                            symbol,
                            args: arg_args,
                            ..
                        } = arg
                        {
                            if *symbol == sym && arg_args.len() == args.len() {
                                for (site_arg, bound) in args.iter().zip(arg_args.iter()) {
                                    self.unify(site_arg, bound, subst, depth + 1);
                                }
                                return;
                            }
                        }
                        // otherwise match the alias target structurally and
                        // map its own parameters back onto the written args
                        if info.params.len() == args.len() {
                            let peeled = self.peel_alias(arg, depth + 1);
                            let mut local: HashMap<SymbolId, Type> = HashMap::new();
                            self.unify(&info.target, &peeled, &mut local, depth + 1);
                            for (param, site_arg) in info.params.iter().zip(args.iter()) {
                                if let Some(bound) = local.get(param) {
                                    let bound = bound.clone();
                                    self.unify(site_arg, &bound, subst, depth + 1);
                                }
                            }
                        }
                    }
                    SymbolKind::Builtin(BuiltinType::Array) => {
                        if args.len() == 1 {
                            if let Type::Reference {
                                symbol: Some(arg_sym),
                                args: arg_args,
                                ..
                            } = &self.peel_alias(arg, depth + 1)
                            {
                                if *arg_sym == self.builtins.array && arg_args.len() == 1 {
                                    self.unify(&args[0], &arg_args[0], subst, depth + 1);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            TypeExprKind::Array(inner) => {
                if let Type::Reference {
                    symbol: Some(arg_sym),
                    args: arg_args,
                    ..
                } = &self.peel_alias(arg, depth + 1)
                {
                    if *arg_sym == self.builtins.array && arg_args.len() == 1 {
                        self.unify(inner, &arg_args[0], subst, depth + 1);
                    }
                }
            }
            TypeExprKind::Object(members) => {
                if let Type::Object(props) = &self.peel_alias(arg, depth + 1) {
                    for member in members {
                        if let Some(prop) = props.iter().find(|p| p.name == member.name) {
                            self.unify(&member.ty, &prop.ty, subst, depth + 1);
                        }
                    }
                }
            }
            TypeExprKind::Union(members) => {
                if let Type::Union(arg_members) = arg {
                    if arg_members.len() == members.len() {
                        for (member, arg_member) in members.iter().zip(arg_members.iter()) {
                            self.unify(member, arg_member, subst, depth + 1);
                        }
                    }
                }
            }
            TypeExprKind::Intersection(members) => {
                if let Type::Intersection(arg_members) = arg {
                    if arg_members.len() == members.len() {
                        for (member, arg_member) in members.iter().zip(arg_members.iter()) {
                            self.unify(member, arg_member, subst, depth + 1);
                        }
                    }
                }
            }
        }
    }

    /// Expand alias applications until a non-alias shape (or the depth cap)
    /// is reached.
    fn peel_alias(&self, ty: &Type, depth: usize) -> Type {
        let mut current = ty.clone();
        let mut steps = 0;
        while let Type::Alias { symbol, args, .. } = &current {
            if steps > depth + MAX_INFER_DEPTH {
                break;
            }
            steps += 1;
            let SymbolKind::TypeAlias(info) = &self.table.get(*symbol).kind else {
                break;
            };
            if info.params.len() != args.len() {
                break;
            }
            let target = self.type_from_syntax(&info.target);
            let map: HashMap<SymbolId, Type> = info
                .params
                .iter()
                .copied()
                .zip(args.iter().cloned())
                .collect();
            current = self.substitute(&target, &map);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use crate::semantic::binder::bind_unit;
    use crate::semantic::types::{Prim, Type};
    use crate::syntax::ast::{ExprKind, StmtKind};
    use crate::syntax::parser::parse;

    fn first_call(source: &str) -> (crate::semantic::binder::Analysis, crate::syntax::ast::CallExpr) {
        let unit = parse(source, "test.spl").expect("test source parses");
        let analysis = bind_unit(&unit);
        let call = unit
            .stmts
            .iter()
            .find_map(|s| match &s.kind {
                StmtKind::Let(l) => match l.init.as_ref().map(|e| &e.kind) {
                    Some(ExprKind::Call(c)) => Some(c.clone()),
                    _ => None,
                },
                StmtKind::Expr(e) => match &e.kind {
                    ExprKind::Call(c) => Some(c.clone()),
                    _ => None,
                },
                _ => None,
            })
            .expect("test source contains a call");
        (analysis, call)
    }

    #[test]
    fn explicit_type_args_are_converted() {
        let (analysis, call) = first_call(
            "function f<T>(x: T): T { return x; }\n\
             f<number>(1);\n",
        );
        let args = analysis.infer_call_type_args(&call, 0).unwrap();
        assert_eq!(args, vec![Type::Prim(Prim::Number)]);
    }

    #[test]
    fn type_args_are_inferred_from_value_arguments() {
        let (analysis, call) = first_call(
            "function f<T>(x: T[]): T { return x[0]; }\n\
             let xs: number[] = [];\n\
             f(xs);\n",
        );
        let args = analysis.infer_call_type_args(&call, 0).unwrap();
        assert_eq!(args, vec![Type::Prim(Prim::Number)]);
    }

    #[test]
    fn inference_expands_aliases_structurally() {
        let (analysis, call) = first_call(
            "type Boxed<P> = { value: P };\n\
             function f<T>(x: Boxed<T>): T { return x.value; }\n\
             let b: { value: string } = [];\n\
             f(b);\n",
        );
        let args = analysis.infer_call_type_args(&call, 0).unwrap();
        assert_eq!(args, vec![Type::Prim(Prim::Str)]);
    }

    #[test]
    fn inference_fails_without_enough_evidence() {
        let (analysis, call) = first_call(
            "function f<T>(): T[] { return []; }\n\
             f();\n",
        );
        assert!(analysis.infer_call_type_args(&call, 0).is_none());
    }

    #[test]
    fn initializer_types_chain_through_calls() {
        let unit = parse(
            "function make<T>(seed: T): T[] { return [seed]; }\n\
             let xs = make<string>(\"a\");\n\
             function len<T>(items: T[]): number { return 0; }\n\
             len(xs);\n",
            "test.spl",
        )
        .expect("test source parses");
        let analysis = bind_unit(&unit);
        // the trailing expression statement is the `len(xs)` call; its type
        // argument comes from xs's initializer, itself a generic call
        let call = unit
            .stmts
            .iter()
            .rev()
            .find_map(|s| match &s.kind {
                StmtKind::Expr(e) => match &e.kind {
                    ExprKind::Call(c) => Some(c.clone()),
                    _ => None,
                },
                _ => None,
            })
            .expect("test source ends with a call statement");
        let args = analysis.infer_call_type_args(&call, 0).unwrap();
        assert_eq!(args, vec![Type::Prim(Prim::Str)]);
    }
}
