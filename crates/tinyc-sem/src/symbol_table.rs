//! Symbol table and scope management (§4.8).
//!
//! Grounded on `original_source/src/semantic/symbol_table.h`'s
//! `SymbolInfo`/`Scope`/`SymbolTable`/`TypeUtils` quartet. Scopes form
//! an arena (`IndexVec<ScopeId, Scope>`) owned by `SymbolTable` rather
//! than the original's `Scope*` parent pointers and
//! `vector<unique_ptr<Scope>>` children, matching the arena-over-
//! raw-pointers idiom `tinyc-util`'s other typed-index collections use.

use indexmap::IndexMap;
use tinyc_par::ast::DataType;
use tinyc_util::{define_idx, IndexVec, Symbol};

define_idx!(ScopeId);

/// §3 Symbol "symbol kind".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
    Constant,
    TypeName,
    Label,
}

/// Ports `SymbolInfo` field-for-field; array/constant-value fields are
/// folded into `data_type`/`param_types` rather than kept as separate
/// `array_size`/`constant_value` strings, since nothing in this
/// language's accepted grammar (§1) produces an array type or a named
/// constant yet (§9 Open Questions).
#[derive(Clone, Debug)]
pub struct SymbolInfo {
    pub name: Symbol,
    pub kind: SymbolKind,
    pub data_type: DataType,
    pub line: u32,
    pub column: u32,
    pub scope_level: u32,
    pub initialized: bool,
    pub used: bool,
    pub param_types: Vec<DataType>,
    pub return_type: DataType,
}

impl SymbolInfo {
    pub fn new(
        name: Symbol,
        kind: SymbolKind,
        data_type: DataType,
        line: u32,
        column: u32,
        scope_level: u32,
    ) -> Self {
        SymbolInfo {
            name,
            kind,
            data_type,
            line,
            column,
            scope_level,
            initialized: false,
            used: false,
            param_types: Vec::new(),
            return_type: DataType::Void,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scope {
    pub level: u32,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    symbols: IndexMap<Symbol, SymbolInfo>,
}

impl Scope {
    fn find_local(&self, name: Symbol) -> Option<&SymbolInfo> {
        self.symbols.get(&name)
    }

    fn add_symbol(&mut self, info: SymbolInfo) -> bool {
        if self.symbols.contains_key(&info.name) {
            return false;
        }
        self.symbols.insert(info.name, info);
        true
    }

    pub fn is_defined(&self, name: Symbol) -> bool {
        self.symbols.contains_key(&name)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &SymbolInfo> {
        self.symbols.values()
    }
}

/// §4.8's scope-stack interface. The global scope (level 0) always
/// exists and is never popped — `exit_scope` at that level is a no-op
/// (§3 "Scope invariant", §8 "Scope stack integrity").
pub struct SymbolTable {
    scopes: IndexVec<ScopeId, Scope>,
    stack: Vec<ScopeId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut scopes: IndexVec<ScopeId, Scope> = IndexVec::new();
        let global = scopes.push(Scope {
            level: 0,
            parent: None,
            children: Vec::new(),
            symbols: IndexMap::new(),
        });
        SymbolTable { scopes, stack: vec![global] }
    }

    fn current(&self) -> ScopeId {
        *self.stack.last().expect("global scope is never popped off the stack")
    }

    pub fn current_scope_level(&self) -> u32 {
        self.scopes[self.current()].level
    }

    pub fn global_scope(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn enter_scope(&mut self) -> ScopeId {
        let parent = self.current();
        let level = self.scopes[parent].level + 1;
        let id = self.scopes.push(Scope {
            level,
            parent: Some(parent),
            children: Vec::new(),
            symbols: IndexMap::new(),
        });
        self.scopes[parent].children.push(id);
        self.stack.push(id);
        id
    }

    pub fn exit_scope(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub fn add_symbol(&mut self, info: SymbolInfo) -> bool {
        let cur = self.current();
        self.scopes[cur].add_symbol(info)
    }

    pub fn find_symbol(&self, name: Symbol) -> Option<&SymbolInfo> {
        let mut cur = Some(self.current());
        while let Some(id) = cur {
            if let Some(info) = self.scopes[id].find_local(name) {
                return Some(info);
            }
            cur = self.scopes[id].parent;
        }
        None
    }

    pub fn find_local(&self, name: Symbol) -> Option<&SymbolInfo> {
        self.scopes[self.current()].find_local(name)
    }

    pub fn is_defined(&self, name: Symbol) -> bool {
        self.find_symbol(name).is_some()
    }

    pub fn is_locally_defined(&self, name: Symbol) -> bool {
        self.find_local(name).is_some()
    }

    pub fn mark_used(&mut self, name: Symbol) {
        let mut cur = Some(self.current());
        while let Some(id) = cur {
            if let Some(info) = self.scopes[id].symbols.get_mut(&name) {
                info.used = true;
                return;
            }
            cur = self.scopes[id].parent;
        }
    }

    pub fn mark_initialized(&mut self, name: Symbol) {
        let mut cur = Some(self.current());
        while let Some(id) = cur {
            if let Some(info) = self.scopes[id].symbols.get_mut(&name) {
                info.initialized = true;
                return;
            }
            cur = self.scopes[id].parent;
        }
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.scopes.as_slice().iter().map(|s| s.symbols.len()).sum()
    }

    /// §4.9's post-walk sweep input: every variable never marked used,
    /// across every scope in the table.
    pub fn unused_variables(&self) -> Vec<&SymbolInfo> {
        self.scopes
            .as_slice()
            .iter()
            .flat_map(|s| s.symbols.values())
            .filter(|s| s.kind == SymbolKind::Variable && !s.used)
            .collect()
    }

    /// Every variable never marked initialized, across every scope.
    pub fn uninitialized_variables(&self) -> Vec<&SymbolInfo> {
        self.scopes
            .as_slice()
            .iter()
            .flat_map(|s| s.symbols.values())
            .filter(|s| s.kind == SymbolKind::Variable && !s.initialized)
            .collect()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::intern(s)
    }

    #[test]
    fn global_scope_exit_is_a_no_op() {
        let mut table = SymbolTable::new();
        assert_eq!(table.current_scope_level(), 0);
        table.exit_scope();
        assert_eq!(table.current_scope_level(), 0);
    }

    #[test]
    fn shadowing_does_not_overwrite_the_outer_binding() {
        let mut table = SymbolTable::new();
        table.add_symbol(SymbolInfo::new(sym("x"), SymbolKind::Variable, DataType::Int, 1, 1, 0));
        table.enter_scope();
        table.add_symbol(SymbolInfo::new(sym("x"), SymbolKind::Variable, DataType::Float, 2, 1, 1));
        assert_eq!(table.find_symbol(sym("x")).unwrap().data_type, DataType::Float);
        table.exit_scope();
        assert_eq!(table.find_symbol(sym("x")).unwrap().data_type, DataType::Int);
    }

    #[test]
    fn adding_a_duplicate_in_the_same_scope_fails() {
        let mut table = SymbolTable::new();
        assert!(table.add_symbol(SymbolInfo::new(sym("x"), SymbolKind::Variable, DataType::Int, 1, 1, 0)));
        assert!(!table.add_symbol(SymbolInfo::new(sym("x"), SymbolKind::Variable, DataType::Int, 2, 1, 0)));
    }

    #[test]
    fn mark_used_and_initialized_reach_through_enclosing_scopes() {
        let mut table = SymbolTable::new();
        table.add_symbol(SymbolInfo::new(sym("x"), SymbolKind::Variable, DataType::Int, 1, 1, 0));
        table.enter_scope();
        table.mark_used(sym("x"));
        table.mark_initialized(sym("x"));
        table.exit_scope();
        let info = table.find_symbol(sym("x")).unwrap();
        assert!(info.used);
        assert!(info.initialized);
    }

    #[test]
    fn unused_variables_excludes_functions_and_parameters() {
        let mut table = SymbolTable::new();
        table.add_symbol(SymbolInfo::new(sym("f"), SymbolKind::Function, DataType::Int, 1, 1, 0));
        table.add_symbol(SymbolInfo::new(sym("unused"), SymbolKind::Variable, DataType::Int, 2, 1, 0));
        let names: Vec<_> = table.unused_variables().iter().map(|s| s.name).collect();
        assert_eq!(names, vec![sym("unused")]);
    }
}
