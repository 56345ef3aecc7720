use std::{collections::HashMap, fmt::Display};

use log::{debug, trace};

use crate::{
    ast::types::Type,
    errors::errors::{Error, ErrorImpl},
    labels::location::Location,
    Position,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Field,
    Function,
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Variable => write!(f, "variable"),
            SymbolKind::Parameter => write!(f, "parameter"),
            SymbolKind::Field => write!(f, "field"),
            SymbolKind::Function => write!(f, "function"),
        }
    }
}

/// Parameter and return types of a function symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<Type>,
    /// Accepts any number of non-void arguments (`fmt.Println`).
    pub variadic: bool,
    pub return_type: Type,
    /// Slot the callee writes its result to, set when labeling.
    pub return_location: Option<Location>,
}

impl Signature {
    pub fn new(params: Vec<Type>, return_type: Type) -> Self {
        Signature {
            params,
            variadic: false,
            return_type,
            return_location: None,
        }
    }

    pub fn variadic(return_type: Type) -> Self {
        Signature {
            params: vec![],
            variadic: true,
            return_type,
            return_location: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub kind: SymbolKind,
    pub is_constant: bool,
    /// Element count for arrays, `None` for scalars.
    pub array_size: Option<u32>,
    pub location: Option<Location>,
    pub signature: Option<Signature>,
    pub position: Position,
}

impl Symbol {
    pub fn new(name: &str, ty: Type, kind: SymbolKind, position: Position) -> Self {
        Symbol {
            name: name.to_string(),
            ty,
            kind,
            is_constant: false,
            array_size: None,
            location: None,
            signature: None,
            position,
        }
    }

    pub fn function(name: &str, signature: Signature, position: Position) -> Self {
        Symbol {
            signature: Some(signature),
            ..Symbol::new(name, Type::Function, SymbolKind::Function, position)
        }
    }

    pub fn is_array(&self) -> bool {
        self.array_size.is_some()
    }

    /// Sets the storage location. A symbol is placed exactly once.
    pub fn assign_location(&mut self, location: Location) -> Result<(), Error> {
        if self.location.is_some() {
            return Err(Error::new(
                ErrorImpl::AttributeReassigned {
                    attribute: format!("location of {}", self.name),
                },
                self.position.clone(),
            ));
        }
        self.location = Some(location);
        Ok(())
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.name)?;
        if let Some(size) = self.array_size {
            write!(f, "[{}]", size)?;
        }
        write!(f, "{} {}", self.ty, self.kind)?;
        if self.is_constant {
            write!(f, " const")?;
        }
        if let Some(signature) = &self.signature {
            let params: Vec<String> = signature.params.iter().map(Type::to_string).collect();
            write!(f, " ({}", params.join(", "))?;
            if signature.variadic {
                write!(f, "...")?;
            }
            write!(f, ") {}", signature.return_type)?;
        }
        if let Some(location) = self.location {
            write!(f, " @ {}", location)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Function,
    Struct,
    Package,
}

impl Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeKind::Global => write!(f, "global"),
            ScopeKind::Function => write!(f, "function"),
            ScopeKind::Struct => write!(f, "struct"),
            ScopeKind::Package => write!(f, "package"),
        }
    }
}

/// Index of a scope inside its `ScopeTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

/// Declarations of one scope, kept in insertion order.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    pub name: String,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    fn new(name: &str, kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        SymbolTable {
            name: name.to_string(),
            kind,
            parent,
            symbols: vec![],
            index: HashMap::new(),
        }
    }

    /// Adds a symbol; a name already present in this scope is reported.
    pub fn insert(&mut self, symbol: Symbol) -> Result<(), Error> {
        if self.index.contains_key(&symbol.name) {
            return Err(Error::new(
                ErrorImpl::DuplicateDeclaration {
                    name: symbol.name.clone(),
                },
                symbol.position.clone(),
            ));
        }

        trace!("{}: declared {}", self.name, symbol);
        self.index.insert(symbol.name.clone(), self.symbols.len());
        self.symbols.push(symbol);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.symbols[i]),
            None => None,
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> std::slice::IterMut<'_, Symbol> {
        self.symbols.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Every scope of one compilation.
///
/// Scopes refer to their parent by id. Function, struct and package
/// scopes are also registered by name so later passes can re-enter them.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<SymbolTable>,
    registry: HashMap<String, ScopeId>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        ScopeTree::new()
    }
}

impl ScopeTree {
    pub fn new() -> Self {
        ScopeTree {
            scopes: vec![SymbolTable::new("global", ScopeKind::Global, None)],
            registry: HashMap::new(),
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn create_scope(&mut self, name: &str, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(SymbolTable::new(name, kind, parent));
        if kind != ScopeKind::Global {
            self.registry.insert(name.to_string(), id);
        }
        debug!("created {} scope {}", kind, name);
        id
    }

    /// Looks up a registered function, struct or package scope.
    pub fn find_scope(&self, name: &str) -> Option<ScopeId> {
        self.registry.get(name).copied()
    }

    /// Like `find_scope`, failing with an internal error when absent.
    pub fn require_scope(&self, name: &str, position: &Position) -> Result<ScopeId, Error> {
        self.find_scope(name).ok_or_else(|| {
            Error::new(
                ErrorImpl::MissingScope {
                    name: name.to_string(),
                },
                position.clone(),
            )
        })
    }

    pub fn scope(&self, id: ScopeId) -> &SymbolTable {
        &self.scopes[id.0]
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> &mut SymbolTable {
        &mut self.scopes[id.0]
    }

    pub fn insert(&mut self, scope: ScopeId, symbol: Symbol) -> Result<(), Error> {
        self.scope_mut(scope).insert(symbol)
    }

    /// Resolves `name` starting at `from` and walking up the parents.
    pub fn lookup(&self, from: ScopeId, name: &str) -> Option<&Symbol> {
        self.lookup_scope(from, name)
            .and_then(|scope| self.scope(scope).get(name))
    }

    /// The scope that declares `name` as seen from `from`.
    pub fn lookup_scope(&self, from: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.scope(id);
            if scope.get(name).is_some() {
                return Some(id);
            }
            current = scope.parent;
        }
        None
    }

    pub fn lookup_mut(&mut self, from: ScopeId, name: &str) -> Option<&mut Symbol> {
        let scope = self.lookup_scope(from, name)?;
        self.scope_mut(scope).get_mut(name)
    }

    pub fn ids(&self) -> impl Iterator<Item = ScopeId> {
        (0..self.scopes.len()).map(ScopeId)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl Display for ScopeTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for scope in self.scopes.iter() {
            write!(f, "scope {} ({}", scope.name, scope.kind)?;
            if let Some(parent) = scope.parent {
                write!(f, ", parent {}", self.scope(parent).name)?;
            }
            writeln!(f, ")")?;
            for symbol in scope.symbols() {
                writeln!(f, "  {}", symbol)?;
            }
        }
        Ok(())
    }
}
