use log::debug;

use crate::{
    ast::{
        ast::{Block, Decl, FuncDecl, Program, Stmt, VarDecl},
        expressions::{BinaryOp, CallExpr, Expr, ExprKind, LiteralKind, UnaryOp},
        statements::{AssignStmt, Condition, ElseBody, IfStmt, SimpleKind, SimpleStmt},
        types::Type,
    },
    driver::CompileOptions,
    errors::errors::{Diagnostics, Error, ErrorImpl},
    symbols::symbol_table::{ScopeId, ScopeKind, ScopeTree, Signature, Symbol, SymbolKind},
    Position,
};

fn type_list(types: &[Type]) -> String {
    let names: Vec<String> = types.iter().map(Type::to_string).collect();
    format!("[{}]", names.join(", "))
}

pub struct TypeChecker<'a> {
    scopes: &'a ScopeTree,
    current: ScopeId,
    /// Declared result of the function being checked.
    return_type: Type,
    diagnostics: Diagnostics,
    options: &'a CompileOptions,
}

impl<'a> TypeChecker<'a> {
    pub fn new(scopes: &'a ScopeTree, options: &'a CompileOptions) -> Self {
        TypeChecker {
            scopes,
            current: scopes.global(),
            return_type: Type::Void,
            diagnostics: Diagnostics::new(),
            options,
        }
    }

    fn report(&mut self, error: Error) -> Result<(), Error> {
        if self.options.fail_fast {
            return Err(error);
        }
        debug!("type checker: {}", error);
        self.diagnostics.push(error);
        Ok(())
    }

    fn fetch_symbol(&self, name: &str, position: &Position) -> Result<&'a Symbol, Error> {
        self.scopes.lookup(self.current, name).ok_or_else(|| {
            Error::new(
                ErrorImpl::UndeclaredIdentifier {
                    name: name.to_string(),
                },
                position.clone(),
            )
        })
    }

    /// Like `fetch_symbol`, rejecting arrays, which are only usable
    /// through an index.
    fn fetch_scalar(&self, name: &str, position: &Position) -> Result<&'a Symbol, Error> {
        let symbol = self.fetch_symbol(name, position)?;
        if symbol.is_array() {
            return Err(Error::new(
                ErrorImpl::ArrayAsValue {
                    name: name.to_string(),
                },
                position.clone(),
            ));
        }
        Ok(symbol)
    }

    /// The package scope an identifier names, unless a variable shadows it.
    fn package_scope(&self, expr: &Expr) -> Option<ScopeId> {
        let ExprKind::Ident(name) = &expr.kind else {
            return None;
        };
        if self.scopes.lookup(self.current, name).is_some() {
            return None;
        }
        self.scopes
            .find_scope(name)
            .filter(|&scope| self.scopes.scope(scope).kind == ScopeKind::Package)
    }

    fn builtin_member(&self, package: ScopeId, member: &str, position: &Position) -> Result<&'a Symbol, Error> {
        let scope = self.scopes.scope(package);
        scope.get(member).ok_or_else(|| {
            Error::new(
                ErrorImpl::UnknownBuiltin {
                    package: scope.name.clone(),
                    member: member.to_string(),
                },
                position.clone(),
            )
        })
    }

    fn callee_signature(&self, callee: &Expr) -> Result<&'a Signature, Error> {
        let symbol = match &callee.kind {
            ExprKind::Paren(inner) => return self.callee_signature(inner),
            ExprKind::Ident(name) => self.fetch_symbol(name, &callee.position)?,
            ExprKind::Selector(selector) => match self.package_scope(&selector.base) {
                Some(package) => self.builtin_member(package, &selector.field, &callee.position)?,
                None => {
                    return Err(Error::new(
                        ErrorImpl::NotCallable {
                            name: callee.to_string(),
                        },
                        callee.position.clone(),
                    ))
                }
            },
            _ => {
                return Err(Error::new(
                    ErrorImpl::NotCallable {
                        name: callee.to_string(),
                    },
                    callee.position.clone(),
                ))
            }
        };

        symbol.signature.as_ref().ok_or_else(|| {
            Error::new(
                ErrorImpl::NotCallable {
                    name: symbol.name.clone(),
                },
                callee.position.clone(),
            )
        })
    }

    fn check_call(&self, call: &CallExpr, position: &Position) -> Result<Type, Error> {
        let signature = self.callee_signature(&call.callee)?;

        let mut args = vec![];
        for arg in call.args.iter() {
            args.push(self.check_expr(arg)?);
        }

        if signature.variadic {
            if let Some(arg) = args.iter().find(|ty| **ty == Type::Void) {
                return Err(Error::new(
                    ErrorImpl::ArgumentTypeMatchError {
                        expected: String::from("a value"),
                        received: arg.to_string(),
                    },
                    position.clone(),
                ));
            }
            return Ok(signature.return_type.clone());
        }

        let function = call.callee.to_string();
        if args.len() > signature.params.len() {
            return Err(Error::new(
                ErrorImpl::UnexpectedArguments {
                    function,
                    expected: signature.params.len(),
                    received: args.len(),
                },
                position.clone(),
            ));
        }
        if args.len() < signature.params.len() {
            return Err(Error::new(
                ErrorImpl::MissingArguments {
                    function,
                    expected: signature.params.len(),
                    received: args.len(),
                },
                position.clone(),
            ));
        }
        if args != signature.params {
            return Err(Error::new(
                ErrorImpl::ArgumentTypeMatchError {
                    expected: type_list(&signature.params),
                    received: type_list(&args),
                },
                position.clone(),
            ));
        }

        Ok(signature.return_type.clone())
    }

    /// Result type of `left operator right`.
    fn binary_type(
        &self,
        left: &Type,
        operator: BinaryOp,
        right: &Type,
        position: &Position,
    ) -> Result<Type, Error> {
        let operator_text = operator.to_string();
        let invalid = |ty: &Type| {
            Error::new(
                ErrorImpl::InvalidOperand {
                    operator: operator_text.clone(),
                    type_: ty.to_string(),
                },
                position.clone(),
            )
        };

        if matches!(left, Type::Struct(_)) || matches!(right, Type::Struct(_)) {
            return Err(Error::new(
                ErrorImpl::StructOperand {
                    operator: operator_text.clone(),
                },
                position.clone(),
            ));
        }
        for ty in [left, right] {
            if matches!(ty, Type::Void | Type::Function) {
                return Err(invalid(ty));
            }
        }

        let Some(unified) = left.unify(right) else {
            return Err(Error::new(
                ErrorImpl::TypeMismatch {
                    left: left.to_string(),
                    right: right.to_string(),
                    operator: operator_text.clone(),
                },
                position.clone(),
            ));
        };

        let valid = match operator {
            BinaryOp::And | BinaryOp::Or => unified == Type::Bool,
            BinaryOp::Equals | BinaryOp::NotEquals => true,
            BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessEquals | BinaryOp::GreaterEquals => {
                unified.is_numeric() || unified == Type::String
            }
            BinaryOp::Add => unified.is_numeric() || unified == Type::String,
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => unified.is_numeric(),
            BinaryOp::Mod => unified.is_integer(),
        };
        if !valid {
            return Err(invalid(&unified));
        }

        if operator.is_arithmetic() {
            Ok(unified)
        } else {
            Ok(Type::Bool)
        }
    }

    /// Computes the type of an expression.
    pub fn check_expr(&self, expr: &Expr) -> Result<Type, Error> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(match literal.kind {
                LiteralKind::Int(_) | LiteralKind::Octal(_) | LiteralKind::Hex(_) => Type::Int,
                LiteralKind::Decimal(_) | LiteralKind::Scientific(_) => Type::Float64,
                LiteralKind::String => Type::String,
                LiteralKind::Char(_) => Type::Rune,
                LiteralKind::Bool(_) => Type::Bool,
            }),
            ExprKind::Ident(name) => Ok(self.fetch_scalar(name, &expr.position)?.ty.clone()),
            ExprKind::Paren(inner) => self.check_expr(inner),
            ExprKind::Binary(binary) => {
                let left = self.check_expr(&binary.left)?;
                let right = self.check_expr(&binary.right)?;
                self.binary_type(&left, binary.operator, &right, &expr.position)
            }
            ExprKind::Unary(unary) => {
                let operand = self.check_expr(&unary.operand)?;
                let valid = match unary.operator {
                    UnaryOp::Negate => operand.is_numeric(),
                    UnaryOp::Not => operand == Type::Bool,
                };
                if !valid {
                    return Err(Error::new(
                        ErrorImpl::InvalidOperand {
                            operator: unary.operator.to_string(),
                            type_: operand.to_string(),
                        },
                        expr.position.clone(),
                    ));
                }
                Ok(operand)
            }
            ExprKind::Call(call) => self.check_call(call, &expr.position),
            ExprKind::Selector(selector) => {
                if let Some(package) = self.package_scope(&selector.base) {
                    return Ok(self
                        .builtin_member(package, &selector.field, &expr.position)?
                        .ty
                        .clone());
                }

                let base = self.check_expr(&selector.base)?;
                let Type::Struct(name) = &base else {
                    return Err(Error::new(
                        ErrorImpl::NotAStruct {
                            type_: base.to_string(),
                        },
                        expr.position.clone(),
                    ));
                };

                let scope = self.scopes.require_scope(name, &expr.position)?;
                match self.scopes.scope(scope).get(&selector.field) {
                    Some(field) => Ok(field.ty.clone()),
                    None => Err(Error::new(
                        ErrorImpl::UnknownField {
                            struct_name: name.clone(),
                            field: selector.field.clone(),
                        },
                        expr.position.clone(),
                    )),
                }
            }
            ExprKind::Index(index) => {
                let array = match index.base.as_ident() {
                    Some(name) => Some(self.fetch_symbol(name, &index.base.position)?),
                    None => None,
                };
                let Some(array) = array.filter(|symbol| symbol.is_array()) else {
                    return Err(Error::new(
                        ErrorImpl::NotIndexable {
                            name: index.base.to_string(),
                        },
                        expr.position.clone(),
                    ));
                };

                let index_type = self.check_expr(&index.index)?;
                if !index_type.is_integer() {
                    return Err(Error::new(
                        ErrorImpl::TypeMismatch {
                            left: Type::Int.to_string(),
                            right: index_type.to_string(),
                            operator: String::from("[]"),
                        },
                        index.index.position.clone(),
                    ));
                }

                Ok(array.ty.clone())
            }
        }
    }

    fn check_condition(&self, condition: &Condition) -> Result<(), Error> {
        let ty = self.check_expr(&condition.expr)?;
        if ty != Type::Bool {
            return Err(Error::new(
                ErrorImpl::NonBooleanCondition {
                    type_: ty.to_string(),
                    tree: condition.expr.to_string(),
                },
                condition.expr.position.clone(),
            ));
        }
        Ok(())
    }

    fn mismatch(slot: &Type, value: &Type, operator: &str, position: &Position) -> Error {
        Error::new(
            ErrorImpl::TypeMismatch {
                left: slot.to_string(),
                right: value.to_string(),
                operator: operator.to_string(),
            },
            position.clone(),
        )
    }

    /// Type of an assignable expression, rejecting constants and non-lvalues.
    fn check_target(&self, target: &Expr, operator: &str) -> Result<Type, Error> {
        match &target.kind {
            ExprKind::Paren(inner) => self.check_target(inner, operator),
            ExprKind::Ident(name) => {
                let symbol = self.fetch_scalar(name, &target.position)?;
                if symbol.is_constant {
                    return Err(Error::new(
                        ErrorImpl::AssignToConstant { name: name.clone() },
                        target.position.clone(),
                    ));
                }
                if symbol.kind == SymbolKind::Function {
                    return Err(Error::new(
                        ErrorImpl::InvalidOperand {
                            operator: operator.to_string(),
                            type_: symbol.ty.to_string(),
                        },
                        target.position.clone(),
                    ));
                }
                Ok(symbol.ty.clone())
            }
            ExprKind::Index(_) | ExprKind::Selector(_) => self.check_expr(target),
            _ => {
                let ty = self.check_expr(target)?;
                Err(Error::new(
                    ErrorImpl::InvalidOperand {
                        operator: operator.to_string(),
                        type_: ty.to_string(),
                    },
                    target.position.clone(),
                ))
            }
        }
    }

    fn check_assign(&self, assign: &AssignStmt, position: &Position) -> Result<(), Error> {
        let operator = assign.operator.to_string();
        let target = self.check_target(&assign.target, &operator)?;
        let value = self.check_expr(&assign.value)?;

        let stored = match assign.operator.binary_operator() {
            None => value,
            Some(binary) => match self.binary_type(&target, binary, &value, position) {
                Ok(ty) => ty,
                Err(error) if matches!(error.get_impl(), ErrorImpl::TypeMismatch { .. }) => {
                    return Err(Self::mismatch(&target, &value, &operator, position))
                }
                Err(error) => return Err(error),
            },
        };

        if !target.accepts(&stored) {
            return Err(Self::mismatch(&target, &stored, &operator, position));
        }
        Ok(())
    }

    fn check_simple(&self, stmt: &SimpleStmt) -> Result<(), Error> {
        match &stmt.kind {
            SimpleKind::Expr(expr) => self.check_expr(expr).map(|_| ()),
            SimpleKind::Assign(assign) => self.check_assign(assign, &stmt.position),
            SimpleKind::IncDec(inc_dec) => {
                let operator = inc_dec.operator.to_string();
                let ty = self.check_target(&inc_dec.target, &operator)?;
                if !ty.is_numeric() {
                    return Err(Error::new(
                        ErrorImpl::InvalidOperand {
                            operator,
                            type_: ty.to_string(),
                        },
                        stmt.position.clone(),
                    ));
                }
                Ok(())
            }
        }
    }

    fn check_var_decl(&self, decl: &VarDecl) -> Result<(), Error> {
        for (name, value) in decl.names.iter().zip(decl.values.iter()) {
            let value_type = self.check_expr(value)?;
            let symbol = self.fetch_symbol(&name.name, &name.position)?;
            if !symbol.ty.accepts(&value_type) {
                return Err(Self::mismatch(&symbol.ty, &value_type, "=", &value.position));
            }
        }
        Ok(())
    }

    fn check_stmts(&mut self, stmts: &[Stmt]) -> Result<(), Error> {
        for stmt in stmts.iter() {
            if let Err(error) = self.check_stmt(stmt) {
                self.report(error)?;
            }
        }
        Ok(())
    }

    fn check_block(&mut self, block: &Block) -> Result<(), Error> {
        self.check_stmts(&block.stmts)
    }

    fn check_if(&mut self, stmt: &IfStmt) -> Result<(), Error> {
        if let Some(init) = &stmt.init {
            self.check_simple(init)?;
        }
        self.check_condition(&stmt.condition)?;
        self.check_block(&stmt.then_block)?;

        match stmt.else_branch.as_ref().map(|branch| &branch.body) {
            Some(ElseBody::Block(block)) => self.check_block(block),
            Some(ElseBody::If(nested)) => self.check_if(nested),
            None => Ok(()),
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Var(decl) => self.check_var_decl(decl),
            Stmt::Simple(stmt) => self.check_simple(stmt),
            Stmt::If(stmt) => self.check_if(stmt),
            Stmt::For(stmt) => {
                if let Some(init) = &stmt.init {
                    self.check_simple(init)?;
                }
                if let Some(cond) = &stmt.cond {
                    self.check_condition(cond)?;
                }
                if let Some(post) = &stmt.post {
                    self.check_simple(post)?;
                }
                self.check_block(&stmt.body)
            }
            Stmt::Return(stmt) => {
                let received = match &stmt.value {
                    Some(value) => self.check_expr(value)?,
                    None => Type::Void,
                };
                if received != self.return_type {
                    return Err(Error::new(
                        ErrorImpl::ReturnTypeMismatch {
                            expected: self.return_type.to_string(),
                            received: received.to_string(),
                        },
                        stmt.position.clone(),
                    ));
                }
                Ok(())
            }
            Stmt::Block(block) => self.check_block(block),
        }
    }

    fn check_func(&mut self, decl: &FuncDecl) -> Result<(), Error> {
        let scope = self.scopes.require_scope(&decl.name, &decl.position)?;
        let global = self.scopes.global();
        let return_type = self
            .scopes
            .lookup(global, &decl.name)
            .and_then(|symbol| symbol.signature.as_ref())
            .map(|signature| signature.return_type.clone())
            .unwrap_or(Type::Void);

        self.current = scope;
        self.return_type = return_type;
        let result = self.check_stmts(&decl.body.stmts);
        self.current = global;
        self.return_type = Type::Void;

        result
    }

    fn check_program(&mut self, program: &Program) -> Result<(), Error> {
        for decl in program.decls.iter() {
            let result = match decl {
                Decl::Struct(_) => Ok(()),
                Decl::Func(decl) => self.check_func(decl),
                Decl::Var(decl) => self.check_var_decl(decl),
            };
            if let Err(error) = result {
                self.report(error)?;
            }
        }
        Ok(())
    }
}

/// Runs type checking over a resolved program.
pub fn type_check(
    program: &Program,
    scopes: &ScopeTree,
    options: &CompileOptions,
) -> Result<(), Diagnostics> {
    debug!("type checking {}", program.file);

    let mut checker = TypeChecker::new(scopes, options);
    if let Err(error) = checker.check_program(program) {
        checker.diagnostics.push(error);
    }

    if checker.diagnostics.is_empty() {
        Ok(())
    } else {
        Err(checker.diagnostics)
    }
}
