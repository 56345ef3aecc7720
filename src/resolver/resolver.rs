//! Scope and declaration resolution.
//!
//! Builds the `ScopeTree` for a program and checks that every identifier
//! refers to a declaration visible at its use. Declarations take effect
//! in source order, and every local of a function, however deeply nested,
//! lives in that function's scope.

use std::collections::HashSet;

use log::debug;

use crate::{
    ast::{
        ast::{Block, Decl, FuncDecl, ImportDecl, Program, Stmt, StructDecl, VarDecl},
        expressions::{Expr, ExprKind, LiteralKind},
        statements::{ElseBody, IfStmt, SimpleKind, SimpleStmt},
        types::{NamedType, Type, TypeExpr},
    },
    driver::CompileOptions,
    errors::errors::{Diagnostics, Error, ErrorImpl},
    symbols::symbol_table::{ScopeId, ScopeKind, ScopeTree, Signature, Symbol, SymbolKind},
    Position,
};

/// A package the compiler knows, with its single entry point.
pub struct Builtin {
    pub path: &'static str,
    /// Qualifier used at call sites.
    pub package: &'static str,
    pub member: &'static str,
}

pub const BUILTINS: [Builtin; 3] = [
    Builtin {
        path: "fmt",
        package: "fmt",
        member: "Println",
    },
    Builtin {
        path: "time",
        package: "time",
        member: "Now",
    },
    Builtin {
        path: "math/rand",
        package: "rand",
        member: "Intn",
    },
];

impl Builtin {
    pub fn for_path(path: &str) -> Option<&'static Builtin> {
        BUILTINS.iter().find(|builtin| builtin.path == path)
    }

    pub fn signature(&self) -> Signature {
        match self.member {
            "Println" => Signature::variadic(Type::Void),
            "Intn" => Signature::new(vec![Type::Int], Type::Int),
            _ => Signature::new(vec![], Type::Int),
        }
    }
}

pub struct Resolver<'a> {
    scopes: ScopeTree,
    current: ScopeId,
    /// Names the current function body has resolved outside its own scope.
    outer_uses: HashSet<String>,
    diagnostics: Diagnostics,
    options: &'a CompileOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        let scopes = ScopeTree::new();
        let current = scopes.global();
        Resolver {
            scopes,
            current,
            outer_uses: HashSet::new(),
            diagnostics: Diagnostics::new(),
            options,
        }
    }

    /// Records a recoverable error, or hands it back when failing fast.
    fn report(&mut self, error: Error) -> Result<(), Error> {
        if self.options.fail_fast {
            return Err(error);
        }
        debug!("resolver: {}", error);
        self.diagnostics.push(error);
        Ok(())
    }

    fn resolve_program(&mut self, program: &Program) -> Result<(), Error> {
        if program.package.name != "main" {
            self.report(Error::new(
                ErrorImpl::InvalidPackageName {
                    name: program.package.name.clone(),
                },
                program.package.position.clone(),
            ))?;
        }

        for import in program.imports.iter() {
            if let Err(error) = self.resolve_import(import) {
                self.report(error)?;
            }
        }

        for decl in program.decls.iter() {
            let result = match decl {
                Decl::Struct(decl) => self.resolve_struct(decl),
                Decl::Func(decl) => self.resolve_func(decl),
                Decl::Var(decl) => self.resolve_var_decl(decl),
            };
            if let Err(error) = result {
                self.report(error)?;
            }
        }

        Ok(())
    }

    fn resolve_import(&mut self, import: &ImportDecl) -> Result<(), Error> {
        let Some(builtin) = Builtin::for_path(&import.path) else {
            return Err(Error::new(
                ErrorImpl::UnsupportedImport {
                    path: import.path.clone(),
                },
                import.position.clone(),
            ));
        };

        if self.scopes.find_scope(builtin.package).is_some() {
            return Ok(());
        }

        let global = self.scopes.global();
        let scope = self
            .scopes
            .create_scope(builtin.package, ScopeKind::Package, Some(global));
        self.scopes.insert(
            scope,
            Symbol::function(builtin.member, builtin.signature(), import.position.clone()),
        )
    }

    fn check_scope_name(&self, name: &str, position: &Position) -> Result<(), Error> {
        if self.scopes.find_scope(name).is_some() {
            return Err(Error::new(
                ErrorImpl::DuplicateDeclaration {
                    name: name.to_string(),
                },
                position.clone(),
            ));
        }
        Ok(())
    }

    fn resolve_named_type(&self, named: &NamedType) -> Result<Type, Error> {
        if let Some(ty) = Type::from_builtin(&named.name) {
            return Ok(ty);
        }

        match self.scopes.find_scope(&named.name) {
            Some(scope) if self.scopes.scope(scope).kind == ScopeKind::Struct => {
                Ok(Type::Struct(named.name.clone()))
            }
            _ => Err(Error::new(
                ErrorImpl::UnknownType {
                    type_: named.name.clone(),
                },
                named.position.clone(),
            )),
        }
    }

    /// Resolves a type outside variable declarations, where arrays are not allowed.
    fn resolve_scalar_type(&self, ty: &TypeExpr) -> Result<Type, Error> {
        match ty {
            TypeExpr::Named(named) => self.resolve_named_type(named),
            TypeExpr::Array { position, .. } => Err(Error::new(
                ErrorImpl::UnsupportedArrayType,
                position.clone(),
            )),
        }
    }

    fn resolve_struct(&mut self, decl: &StructDecl) -> Result<(), Error> {
        self.check_scope_name(&decl.name, &decl.position)?;

        let global = self.scopes.global();
        let scope = self
            .scopes
            .create_scope(&decl.name, ScopeKind::Struct, Some(global));

        for field in decl.fields.iter() {
            let ty = self.resolve_scalar_type(&field.ty)?;
            if let Type::Struct(_) = ty {
                return Err(Error::new(
                    ErrorImpl::NestedStruct {
                        field: field.names.join(", "),
                    },
                    field.position.clone(),
                ));
            }

            for name in field.names.iter() {
                self.scopes.insert(
                    scope,
                    Symbol::new(name, ty.clone(), SymbolKind::Field, field.position.clone()),
                )?;
            }
        }

        Ok(())
    }

    /// Parameter types, filling grouped names from the type that follows them.
    fn resolve_params(&self, decl: &FuncDecl) -> Result<Vec<Type>, Error> {
        let mut types = vec![Type::Void; decl.params.len()];
        let mut group_type: Option<Type> = None;

        for (i, param) in decl.params.iter().enumerate().rev() {
            if let Some(ty) = &param.ty {
                group_type = Some(self.resolve_scalar_type(ty)?);
            }

            match &group_type {
                Some(ty) => types[i] = ty.clone(),
                None => {
                    return Err(Error::new(
                        ErrorImpl::MissingParameterType {
                            name: param.name.clone(),
                        },
                        param.position.clone(),
                    ))
                }
            }
        }

        Ok(types)
    }

    fn resolve_func(&mut self, decl: &FuncDecl) -> Result<(), Error> {
        let params = self.resolve_params(decl)?;
        let return_type = match &decl.result {
            Some(ty) => self.resolve_scalar_type(ty)?,
            None => Type::Void,
        };

        self.check_scope_name(&decl.name, &decl.position)?;

        // Declared before the body so recursive calls resolve
        let global = self.scopes.global();
        self.scopes.insert(
            global,
            Symbol::function(
                &decl.name,
                Signature::new(params.clone(), return_type),
                decl.position.clone(),
            ),
        )?;

        let scope = self
            .scopes
            .create_scope(&decl.name, ScopeKind::Function, Some(global));

        for (param, ty) in decl.params.iter().zip(params) {
            let symbol = Symbol::new(&param.name, ty, SymbolKind::Parameter, param.position.clone());
            if let Err(error) = self.scopes.insert(scope, symbol) {
                self.report(error)?;
            }
        }

        let caller = self.current;
        self.current = scope;
        self.outer_uses.clear();
        let result = self.resolve_stmts(&decl.body.stmts);
        self.outer_uses.clear();
        self.current = caller;

        result
    }

    fn array_size(&self, size: &Option<Box<Expr>>, position: &Position) -> Result<u32, Error> {
        let Some(size) = size else {
            return Err(Error::new(ErrorImpl::MissingArraySize, position.clone()));
        };

        let value = match &size.kind {
            ExprKind::Literal(literal) => match literal.kind {
                LiteralKind::Int(value) | LiteralKind::Octal(value) | LiteralKind::Hex(value) => {
                    u32::try_from(value).ok()
                }
                _ => None,
            },
            _ => None,
        };

        value.ok_or_else(|| {
            Error::new(
                ErrorImpl::NonConstantArraySize {
                    found: size.to_string(),
                },
                size.position.clone(),
            )
        })
    }

    fn resolve_var_decl(&mut self, decl: &VarDecl) -> Result<(), Error> {
        for value in decl.values.iter() {
            self.resolve_expr(value)?;
        }

        let (ty, array_size) = match &decl.ty {
            TypeExpr::Named(named) => (self.resolve_named_type(named)?, None),
            TypeExpr::Array {
                size,
                elem,
                position,
            } => (
                self.resolve_named_type(elem)?,
                Some(self.array_size(size, position)?),
            ),
        };

        for name in decl.names.iter() {
            // A local may not rebind a name this body already resolved outward
            if self.current != self.scopes.global() && self.outer_uses.contains(&name.name) {
                return Err(Error::new(
                    ErrorImpl::DeclaredAfterOuterUse {
                        name: name.name.clone(),
                    },
                    name.position.clone(),
                ));
            }

            let mut symbol = Symbol::new(
                &name.name,
                ty.clone(),
                SymbolKind::Variable,
                name.position.clone(),
            );
            symbol.is_constant = decl.is_constant;
            symbol.array_size = array_size;
            self.scopes.insert(self.current, symbol)?;
        }

        Ok(())
    }

    fn resolve_stmts(&mut self, stmts: &[Stmt]) -> Result<(), Error> {
        for stmt in stmts.iter() {
            if let Err(error) = self.resolve_stmt(stmt) {
                self.report(error)?;
            }
        }
        Ok(())
    }

    fn resolve_block(&mut self, block: &Block) -> Result<(), Error> {
        self.resolve_stmts(&block.stmts)
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Var(decl) => self.resolve_var_decl(decl),
            Stmt::Simple(stmt) => self.resolve_simple(stmt),
            Stmt::If(stmt) => self.resolve_if(stmt),
            Stmt::For(stmt) => {
                if let Some(init) = &stmt.init {
                    self.resolve_simple(init)?;
                }
                if let Some(cond) = &stmt.cond {
                    self.resolve_expr(&cond.expr)?;
                }
                if let Some(post) = &stmt.post {
                    self.resolve_simple(post)?;
                }
                self.resolve_block(&stmt.body)
            }
            Stmt::Return(stmt) => match &stmt.value {
                Some(value) => self.resolve_expr(value),
                None => Ok(()),
            },
            Stmt::Block(block) => self.resolve_block(block),
        }
    }

    fn resolve_if(&mut self, stmt: &IfStmt) -> Result<(), Error> {
        if let Some(init) = &stmt.init {
            self.resolve_simple(init)?;
        }
        self.resolve_expr(&stmt.condition.expr)?;
        self.resolve_block(&stmt.then_block)?;

        match stmt.else_branch.as_ref().map(|branch| &branch.body) {
            Some(ElseBody::Block(block)) => self.resolve_block(block),
            Some(ElseBody::If(nested)) => self.resolve_if(nested),
            None => Ok(()),
        }
    }

    fn resolve_simple(&mut self, stmt: &SimpleStmt) -> Result<(), Error> {
        match &stmt.kind {
            SimpleKind::Expr(expr) => self.resolve_expr(expr),
            SimpleKind::Assign(assign) => {
                self.resolve_expr(&assign.target)?;
                self.resolve_expr(&assign.value)
            }
            SimpleKind::IncDec(inc_dec) => self.resolve_expr(&inc_dec.target),
        }
    }

    fn is_package(&self, name: &str) -> bool {
        self.scopes
            .find_scope(name)
            .is_some_and(|scope| self.scopes.scope(scope).kind == ScopeKind::Package)
    }

    pub fn resolve_expr(&mut self, expr: &Expr) -> Result<(), Error> {
        match &expr.kind {
            ExprKind::Literal(_) => Ok(()),
            ExprKind::Ident(name) => {
                if let Some(scope) = self.scopes.lookup_scope(self.current, name) {
                    if scope != self.current {
                        self.outer_uses.insert(name.clone());
                    }
                    return Ok(());
                }

                let error = if self.is_package(name) {
                    ErrorImpl::PackageAsValue {
                        package: name.clone(),
                    }
                } else {
                    ErrorImpl::UndeclaredIdentifier { name: name.clone() }
                };
                Err(Error::new(error, expr.position.clone()))
            }
            ExprKind::Selector(selector) => {
                // `pkg.Member` is checked against the package when typing
                if let ExprKind::Ident(name) = &selector.base.kind {
                    if self.scopes.lookup(self.current, name).is_none() && self.is_package(name) {
                        return Ok(());
                    }
                }
                self.resolve_expr(&selector.base)
            }
            ExprKind::Binary(binary) => {
                self.resolve_expr(&binary.left)?;
                self.resolve_expr(&binary.right)
            }
            ExprKind::Unary(unary) => self.resolve_expr(&unary.operand),
            ExprKind::Call(call) => {
                self.resolve_expr(&call.callee)?;
                for arg in call.args.iter() {
                    self.resolve_expr(arg)?;
                }
                Ok(())
            }
            ExprKind::Index(index) => {
                self.resolve_expr(&index.base)?;
                self.resolve_expr(&index.index)
            }
            ExprKind::Paren(inner) => self.resolve_expr(inner),
        }
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }
}

/// Runs scope resolution over `program`.
///
/// Returns the populated scope tree, or every error found.
pub fn resolve(program: &Program, options: &CompileOptions) -> Result<ScopeTree, Diagnostics> {
    debug!("resolving {}", program.file);

    let mut resolver = Resolver::new(options);
    if let Err(error) = resolver.resolve_program(program) {
        resolver.diagnostics.push(error);
    }

    if !resolver.diagnostics.is_empty() {
        return Err(resolver.diagnostics);
    }

    debug!("resolved {} scopes", resolver.scopes.len());
    Ok(resolver.scopes)
}
