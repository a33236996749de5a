//! Deterministic source rendering for Splice ASTs.
//!
//! Output is stable across runs: two-space indentation, one statement per
//! line, leading comments re-emitted above their statement. The expansion
//! pipeline's output contract ("round-trip unchanged in structure") is
//! defined in terms of this printer.

use crate::syntax::ast::{
    Block, ClosureExpr, Expr, ExprKind, FnDecl, Param, Stmt, StmtKind, TypeExpr, TypeExprKind,
    TypeParam, Unit,
};

/// Render a whole compilation unit.
pub fn print_unit(unit: &Unit) -> String {
    let mut printer = Printer::new();
    for stmt in &unit.stmts {
        printer.stmt(stmt);
    }
    printer.out
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Printer {
            out: String::new(),
            indent: 0,
        }
    }

    fn line_start(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        for comment in &stmt.leading_comments {
            self.line_start();
            self.out.push_str("// ");
            self.out.push_str(comment);
            self.out.push('\n');
        }
        self.line_start();
        match &stmt.kind {
            StmtKind::Function(decl) => self.fn_decl(decl),
            StmtKind::TypeAlias(decl) => {
                self.out.push_str("type ");
                self.out.push_str(&decl.name.name);
                self.type_params(&decl.params);
                self.out.push_str(" = ");
                self.ty(&decl.target);
                self.out.push(';');
            }
            StmtKind::Alias(decl) => {
                self.out.push_str("alias ");
                self.out.push_str(&decl.name.name);
                self.out.push_str(" = ");
                self.out.push_str(&decl.target.name);
                self.out.push(';');
            }
            StmtKind::Let(decl) => {
                self.out
                    .push_str(if decl.is_const { "const " } else { "let " });
                self.out.push_str(&decl.name.name);
                if let Some(ty) = &decl.ty {
                    self.out.push_str(": ");
                    self.ty(ty);
                }
                if let Some(init) = &decl.init {
                    self.out.push_str(" = ");
                    self.expr(init);
                }
                self.out.push(';');
            }
            StmtKind::Return(value) => {
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(value);
                }
                self.out.push(';');
            }
            StmtKind::Expr(expr) => {
                self.expr(expr);
                self.out.push(';');
            }
        }
        self.out.push('\n');
    }

    fn fn_decl(&mut self, decl: &FnDecl) {
        if decl.is_declare {
            self.out.push_str("declare ");
        }
        if decl.is_async {
            self.out.push_str("async ");
        }
        self.out.push_str("function");
        if decl.is_generator {
            self.out.push('*');
        }
        self.out.push(' ');
        self.out.push_str(&decl.name.name);
        self.type_params(&decl.type_params);
        self.params(&decl.params);
        if let Some(ret) = &decl.return_type {
            self.out.push_str(": ");
            self.ty(ret);
        }
        match &decl.body {
            Some(body) => {
                self.out.push(' ');
                self.block(body);
            }
            None => self.out.push(';'),
        }
    }

    fn closure(&mut self, closure: &ClosureExpr) {
        if closure.is_async {
            self.out.push_str("async ");
        }
        self.out.push_str("function");
        if closure.is_generator {
            self.out.push('*');
        }
        self.out.push(' ');
        self.type_params(&closure.type_params);
        self.params(&closure.params);
        if let Some(ret) = &closure.return_type {
            self.out.push_str(": ");
            self.ty(ret);
        }
        self.out.push(' ');
        self.block(&closure.body);
    }

    fn block(&mut self, block: &Block) {
        if block.stmts.is_empty() {
            self.out.push_str("{}");
            return;
        }
        self.out.push_str("{\n");
        self.indent += 1;
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.line_start();
        self.out.push('}');
    }

    fn type_params(&mut self, params: &[TypeParam]) {
        if params.is_empty() {
            return;
        }
        self.out.push('<');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&param.name.name);
            if let Some(constraint) = &param.constraint {
                self.out.push_str(" extends ");
                self.ty(constraint);
            }
        }
        self.out.push('>');
    }

    fn params(&mut self, params: &[Param]) {
        self.out.push('(');
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.out.push_str(&param.name.name);
            if let Some(ty) = &param.ty {
                self.out.push_str(": ");
                self.ty(ty);
            }
        }
        self.out.push(')');
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Ident(ident) => self.out.push_str(&ident.name),
            ExprKind::Number(n) => self.out.push_str(&n.to_string()),
            ExprKind::Str(s) => {
                self.out.push('"');
                self.out.push_str(s);
                self.out.push('"');
            }
            ExprKind::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            ExprKind::Array(items) => {
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(item);
                }
                self.out.push(']');
            }
            ExprKind::Member { object, property } => {
                self.expr(object);
                self.out.push('.');
                self.out.push_str(property);
            }
            ExprKind::Call(call) => {
                self.expr(&call.callee);
                if let Some(type_args) = &call.type_args {
                    self.out.push('<');
                    for (i, arg) in type_args.iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(", ");
                        }
                        self.ty(arg);
                    }
                    self.out.push('>');
                }
                self.out.push('(');
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(arg);
                }
                self.out.push(')');
            }
            ExprKind::Closure(closure) => self.closure(closure),
            ExprKind::Paren(inner) => {
                self.out.push('(');
                self.expr(inner);
                self.out.push(')');
            }
            ExprKind::Binary { op, lhs, rhs } => {
                self.expr(lhs);
                self.out.push(' ');
                self.out.push_str(op.symbol());
                self.out.push(' ');
                self.expr(rhs);
            }
        }
    }

    fn ty(&mut self, ty: &TypeExpr) {
        match &ty.kind {
            TypeExprKind::Ref { name, args } => {
                self.out.push_str(&name.name);
                if !args.is_empty() {
                    self.out.push('<');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(", ");
                        }
                        self.ty(arg);
                    }
                    self.out.push('>');
                }
            }
            TypeExprKind::Array(inner) => {
                // composite element types keep their grouping in print form
                let needs_parens = matches!(
                    inner.kind,
                    TypeExprKind::Union(_) | TypeExprKind::Intersection(_)
                );
                if needs_parens {
                    self.out.push('(');
                }
                self.ty(inner);
                if needs_parens {
                    self.out.push(')');
                }
                self.out.push_str("[]");
            }
            TypeExprKind::Object(members) => {
                if members.is_empty() {
                    self.out.push_str("{}");
                    return;
                }
                self.out.push_str("{ ");
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.out.push_str(&member.name);
                    if member.optional {
                        self.out.push('?');
                    }
                    self.out.push_str(": ");
                    self.ty(&member.ty);
                }
                self.out.push_str(" }");
            }
            TypeExprKind::Union(members) => self.composite(members, " | ", false),
            TypeExprKind::Intersection(members) => self.composite(members, " & ", true),
            TypeExprKind::Paren(inner) => {
                self.out.push('(');
                self.ty(inner);
                self.out.push(')');
            }
        }
    }

    fn composite(&mut self, members: &[TypeExpr], separator: &str, tight: bool) {
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                self.out.push_str(separator);
            }
            // a union member inside an intersection must keep its grouping
            let needs_parens = tight && matches!(member.kind, TypeExprKind::Union(_));
            if needs_parens {
                self.out.push('(');
            }
            self.ty(member);
            if needs_parens {
                self.out.push(')');
            }
        }
    }
}
