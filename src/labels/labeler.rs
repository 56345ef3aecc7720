use log::debug;

use crate::{
    ast::{
        ast::{Block, Decl, FuncDecl, Program, Stmt, VarDecl},
        expressions::{Expr, ExprKind, LiteralKind},
        statements::{Condition, ElseBody, IfStmt, SimpleKind, SimpleStmt},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
    symbols::symbol_table::{ScopeId, ScopeKind, ScopeTree, Signature, SymbolKind},
    Position,
};

use super::location::{Location, Region, RegionCounters};

/// The location an operand is read from: its own address, or for a
/// parenthesized expression the address of what it wraps.
pub fn effective_location(expr: &Expr) -> Option<Location> {
    match (&expr.kind, expr.address.get()) {
        (_, Some(location)) => Some(location),
        (ExprKind::Paren(inner), None) => effective_location(inner),
        _ => None,
    }
}

/// Names an identifier that refers to an imported package rather than
/// a declared symbol.
pub fn package_qualifier(scopes: &ScopeTree, current: ScopeId, expr: &Expr) -> Option<ScopeId> {
    let name = expr.as_ident()?;
    if scopes.lookup(current, name).is_some() {
        return None;
    }
    scopes
        .find_scope(name)
        .filter(|&scope| scopes.scope(scope).kind == ScopeKind::Package)
}

/// Signature of the function a call expression targets.
pub fn callee_signature<'s>(scopes: &'s ScopeTree, current: ScopeId, callee: &Expr) -> Option<&'s Signature> {
    let symbol = match &callee.kind {
        ExprKind::Paren(inner) => return callee_signature(scopes, current, inner),
        ExprKind::Ident(name) => scopes.lookup(current, name)?,
        ExprKind::Selector(selector) => {
            let package = package_qualifier(scopes, current, &selector.base)?;
            scopes.scope(package).get(&selector.field)?
        }
        _ => return None,
    };
    symbol.signature.as_ref()
}

pub struct Labeler<'a> {
    scopes: &'a mut ScopeTree,
    counters: RegionCounters,
    current: ScopeId,
}

impl<'a> Labeler<'a> {
    pub fn new(scopes: &'a mut ScopeTree) -> Self {
        let current = scopes.global();
        Labeler {
            scopes,
            counters: RegionCounters::new(),
            current,
        }
    }

    fn missing(node: &str, position: &Position) -> Error {
        Error::new(
            ErrorImpl::MissingLocation {
                node: node.to_string(),
            },
            position.clone(),
        )
    }

    /// Entry points and result slots of imported built-ins.
    fn place_builtins(&mut self) -> Result<(), Error> {
        let packages: Vec<ScopeId> = self
            .scopes
            .ids()
            .filter(|&id| self.scopes.scope(id).kind == ScopeKind::Package)
            .collect();

        for package in packages {
            for symbol in self.scopes.scope_mut(package).symbols_mut() {
                symbol.assign_location(self.counters.allocate(Region::Global))?;
                if let Some(signature) = symbol.signature.as_mut() {
                    if signature.return_type != Type::Void {
                        signature.return_location = Some(self.counters.allocate(Region::Global));
                    }
                }
            }
        }
        Ok(())
    }

    fn place_globals(&mut self) -> Result<(), Error> {
        let global = self.scopes.global();
        for symbol in self.scopes.scope_mut(global).symbols_mut() {
            if symbol.kind != SymbolKind::Function {
                symbol.assign_location(self.counters.allocate(Region::Global))?;
            }
        }
        Ok(())
    }

    fn label_expr(&mut self, expr: &mut Expr, region: Region) -> Result<(), Error> {
        let position = expr.position.clone();
        match &mut expr.kind {
            ExprKind::Literal(literal) => {
                let region = match literal.kind {
                    LiteralKind::String | LiteralKind::Char(_) => Region::String,
                    _ => Region::Const,
                };
                expr.address
                    .assign(self.counters.allocate(region), "address", &position)
            }
            ExprKind::Ident(name) => {
                let location = self
                    .scopes
                    .lookup(self.current, name)
                    .and_then(|symbol| symbol.location)
                    .ok_or_else(|| Self::missing(name, &position))?;
                expr.address.assign(location, "address", &position)
            }
            ExprKind::Binary(binary) => {
                expr.address
                    .assign(self.counters.allocate(region), "address", &position)?;
                self.label_expr(&mut binary.left, region)?;
                self.label_expr(&mut binary.right, region)
            }
            ExprKind::Unary(unary) => {
                expr.address
                    .assign(self.counters.allocate(region), "address", &position)?;
                self.label_expr(&mut unary.operand, region)
            }
            ExprKind::Index(index) => {
                expr.address
                    .assign(self.counters.allocate(region), "address", &position)?;
                self.label_expr(&mut index.base, region)?;
                self.label_expr(&mut index.index, region)
            }
            ExprKind::Call(call) => {
                let result = callee_signature(self.scopes, self.current, &call.callee)
                    .and_then(|signature| signature.return_location);
                if let Some(location) = result {
                    expr.address.assign(location, "address", &position)?;
                }

                self.label_expr(&mut call.callee, region)?;
                for arg in call.args.iter_mut() {
                    self.label_expr(arg, region)?;
                }
                Ok(())
            }
            ExprKind::Selector(selector) => {
                if let Some(package) = package_qualifier(self.scopes, self.current, &selector.base) {
                    let location = self
                        .scopes
                        .scope(package)
                        .get(&selector.field)
                        .and_then(|symbol| symbol.location)
                        .ok_or_else(|| Self::missing(&selector.field, &position))?;
                    return expr.address.assign(location, "address", &position);
                }

                self.label_expr(&mut selector.base, region)?;
                let location = effective_location(&selector.base)
                    .ok_or_else(|| Self::missing(&selector.base.to_string(), &position))?;
                expr.address.assign(location, "address", &position)
            }
            ExprKind::Paren(inner) => self.label_expr(inner, region),
        }
    }

    fn label_simple(&mut self, stmt: &mut SimpleStmt, region: Region) -> Result<(), Error> {
        match &mut stmt.kind {
            SimpleKind::Expr(expr) => self.label_expr(expr, region),
            SimpleKind::Assign(assign) => {
                self.label_expr(&mut assign.target, region)?;
                self.label_expr(&mut assign.value, region)
            }
            SimpleKind::IncDec(inc_dec) => self.label_expr(&mut inc_dec.target, region),
        }
    }

    fn label_var_decl(&mut self, decl: &mut VarDecl, region: Region) -> Result<(), Error> {
        for value in decl.values.iter_mut() {
            self.label_expr(value, region)?;
        }
        Ok(())
    }

    fn label_stmts(&mut self, stmts: &mut [Stmt], region: Region) -> Result<(), Error> {
        for stmt in stmts.iter_mut() {
            self.label_stmt(stmt, region)?;
        }
        Ok(())
    }

    fn label_condition(&mut self, condition: &mut Condition, region: Region) -> Result<(), Error> {
        self.label_expr(&mut condition.expr, region)
    }

    fn label_if(&mut self, stmt: &mut IfStmt, region: Region) -> Result<(), Error> {
        if let Some(init) = stmt.init.as_mut() {
            self.label_simple(init, region)?;
        }
        self.label_condition(&mut stmt.condition, region)?;

        let block = &mut stmt.then_block;
        let then_entry = self.counters.allocate(region);
        block.address.assign(then_entry, "address", &block.position)?;
        stmt.condition
            .if_true
            .assign(then_entry, "if_true", &stmt.position)?;
        self.label_stmts(&mut block.stmts, region)?;
        block
            .follow
            .assign(self.counters.allocate(region), "follow", &block.position)?;

        if let Some(branch) = stmt.else_branch.as_mut() {
            let else_entry = self.counters.allocate(region);
            branch.address.assign(else_entry, "address", &stmt.position)?;
            stmt.condition
                .if_false
                .assign(else_entry, "if_false", &stmt.position)?;

            match &mut branch.body {
                ElseBody::Block(block) => self.label_stmts(&mut block.stmts, region)?,
                ElseBody::If(nested) => self.label_if(nested, region)?,
            }
        }
        Ok(())
    }

    fn label_block(&mut self, block: &mut Block, region: Region) -> Result<(), Error> {
        self.label_stmts(&mut block.stmts, region)
    }

    fn label_stmt(&mut self, stmt: &mut Stmt, region: Region) -> Result<(), Error> {
        match stmt {
            Stmt::Var(decl) => self.label_var_decl(decl, region),
            Stmt::Simple(stmt) => self.label_simple(stmt, region),
            Stmt::If(stmt) => self.label_if(stmt, region),
            Stmt::For(stmt) => {
                if let Some(init) = stmt.init.as_mut() {
                    init.address
                        .assign(self.counters.allocate(region), "address", &init.position)?;
                    self.label_simple(init, region)?;
                }
                if let Some(cond) = stmt.cond.as_mut() {
                    cond.address
                        .assign(self.counters.allocate(region), "address", &stmt.position)?;
                    self.label_condition(cond, region)?;
                }
                if let Some(post) = stmt.post.as_mut() {
                    post.address
                        .assign(self.counters.allocate(region), "address", &post.position)?;
                    self.label_simple(post, region)?;
                }

                let body_entry = self.counters.allocate(region);
                stmt.body
                    .address
                    .assign(body_entry, "address", &stmt.body.position)?;
                if let Some(cond) = stmt.cond.as_mut() {
                    cond.if_true.assign(body_entry, "if_true", &stmt.position)?;
                }
                self.label_block(&mut stmt.body, region)
            }
            Stmt::Return(stmt) => match stmt.value.as_mut() {
                Some(value) => self.label_expr(value, region),
                None => Ok(()),
            },
            Stmt::Block(block) => self.label_block(block, region),
        }
    }

    fn label_func(&mut self, decl: &mut FuncDecl) -> Result<(), Error> {
        let scope = self.scopes.require_scope(&decl.name, &decl.position)?;
        let global = self.scopes.global();

        let first = self.counters.allocate(Region::Function);
        decl.first.assign(first, "first", &decl.position)?;
        self.scopes
            .scope_mut(global)
            .get_mut(&decl.name)
            .ok_or_else(|| Self::missing(&decl.name, &decl.position))?
            .assign_location(first)?;

        for symbol in self.scopes.scope_mut(scope).symbols_mut() {
            symbol.assign_location(self.counters.allocate(Region::Function))?;
        }

        if let Some(signature) = self
            .scopes
            .scope_mut(global)
            .get_mut(&decl.name)
            .and_then(|symbol| symbol.signature.as_mut())
        {
            if signature.return_type != Type::Void {
                signature.return_location = Some(self.counters.allocate(Region::Function));
            }
        }

        self.current = scope;
        let result = self.label_block(&mut decl.body, Region::Function);
        self.current = global;
        result?;

        decl.follow.assign(
            self.counters.allocate(Region::Function),
            "follow",
            &decl.position,
        )
    }

    fn label_program(&mut self, program: &mut Program) -> Result<(), Error> {
        self.place_builtins()?;
        self.place_globals()?;

        for decl in program.decls.iter_mut() {
            match decl {
                Decl::Struct(_) => {}
                Decl::Func(decl) => self.label_func(decl)?,
                Decl::Var(decl) => self.label_var_decl(decl, Region::Global)?,
            }
        }
        Ok(())
    }
}

/// Assigns storage locations to every symbol and value-producing node.
///
/// Returns the final state of the region counters.
pub fn assign_labels(program: &mut Program, scopes: &mut ScopeTree) -> Result<RegionCounters, Error> {
    debug!("labeling {}", program.file);

    let mut labeler = Labeler::new(scopes);
    labeler.label_program(program)?;

    for region in Region::ALL {
        debug!(
            "{}: {} locations, {} bytes",
            region,
            labeler.counters.allocated(region),
            labeler.counters.size(region)
        );
    }
    Ok(labeler.counters)
}
