use std::fmt;

use super::ast_node::{DeclKind, ExpKind, NodeKind, ParamKind, TreeNode};
use super::datatype::{ExpType, IdCategory};
use super::scope::ScopeId;

/// Number of chains in each scope's hash table.
pub const SIZE: usize = 256;

/// Power of two used as multiplier in the hash function.
const SHIFT: u32 = 4;

/// The polynomial hash spreading identifiers over a scope's chains.
fn hash(key: &str) -> usize {
    let mut temp = 0usize;
    for byte in key.bytes() {
        temp = ((temp << SHIFT) + byte as usize) % SIZE;
    }
    temp
}


/// The record kept for each declared identifier: its type, category,
/// parameter position, assigned memory location and every source line that
/// references it. The first line is the declaration line.
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    name: String,
    exp_type: ExpType,
    category: IdCategory,

    /// 0-based position for parameters, -1 otherwise.
    param_index: i32,

    /// Word offset; the interpretation depends on the owning scope and the
    /// category (global base, frame offset, or unused for parameters).
    memloc: i32,

    lines: Vec<i32>,
    scope_id: ScopeId,
}

impl SymbolEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exp_type(&self) -> ExpType {
        self.exp_type
    }

    pub fn category(&self) -> IdCategory {
        self.category
    }

    pub fn param_index(&self) -> i32 {
        self.param_index
    }

    pub fn memloc(&self) -> i32 {
        self.memloc
    }

    /// Source lines referencing this entry, declaration first.
    pub fn lines(&self) -> &[i32] {
        &self.lines
    }

    /// The scope the entry was declared in.
    pub fn scope_id(&self) -> ScopeId {
        self.scope_id
    }
}


/// One scope of the program: the global scope, or a function/compound
/// scope named after its enclosing function. Symbols live in a chained
/// hash table of `SIZE` buckets.
#[derive(Debug, Clone)]
pub struct Scope {
    id: ScopeId,
    name: String,
    nested_level: usize,
    bucket: Vec<Vec<SymbolEntry>>,
    parent: Option<ScopeId>,

    /// Highest `param_index + 1` inserted into this scope.
    max_param_num: i32,

    /// End-of-locals offset: the frame size the generator reserves when
    /// calling into this scope.
    mem_size: i32,
}

impl Scope {
    fn new(id: ScopeId, name: &str, nested_level: usize, parent: Option<ScopeId>, mem_size: i32) -> Self {
        Scope {
            id,
            name: name.to_string(),
            nested_level,
            bucket: vec![Vec::new(); SIZE],
            parent,
            max_param_num: 0,
            mem_size,
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nested_level(&self) -> usize {
        self.nested_level
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn max_param_num(&self) -> i32 {
        self.max_param_num
    }

    pub fn mem_size(&self) -> i32 {
        self.mem_size
    }

    fn entry(&self, name: &str) -> Option<&SymbolEntry> {
        self.bucket[hash(name)].iter().find(|entry| entry.name == name)
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut SymbolEntry> {
        self.bucket[hash(name)].iter_mut().find(|entry| entry.name == name)
    }

    fn add_entry(&mut self, entry: SymbolEntry) {
        // New entries go to the chain front, like the original list links.
        self.bucket[hash(&entry.name)].insert(0, entry);
    }

    /// All entries of this scope in bucket order.
    pub fn entries(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.bucket.iter().flatten()
    }
}


/// The declaration-site data the table reads off an AST node when
/// allocating an entry.
#[derive(Debug, Copy, Clone)]
pub struct Declaration<'a> {
    pub name: &'a str,
    pub lineno: i32,
    pub array_size: Option<i32>,
}

impl<'a> Declaration<'a> {
    pub fn of(name: &'a str, lineno: i32) -> Self {
        Declaration { name, lineno, array_size: None }
    }

    /// Extract the declaration view of a declaring or referencing node.
    pub fn from_node(node: &'a TreeNode) -> Option<Declaration<'a>> {
        match &node.kind {
            NodeKind::Decl(DeclKind::ArrVar(name, size)) => Some(Declaration {
                name,
                lineno: node.lineno,
                array_size: Some(*size),
            }),
            NodeKind::Decl(DeclKind::Var(name) | DeclKind::Func(name))
            | NodeKind::Exp(ExpKind::Id(name) | ExpKind::ArrId(name) | ExpKind::Call(name))
            | NodeKind::Param(ParamKind::Scalar(name) | ParamKind::Array(name)) => {
                Some(Declaration::of(name, node.lineno))
            }
            _ => None,
        }
    }
}


/// The scoped symbol table.
///
/// Scopes live in an insertion-ordered registry and stay registered after
/// they are popped, so post-analysis printing and lookup of a function's
/// scope by name keep working. A cursor tracks the current scope during
/// each tree walk; the analyser pushes and pops it, the generator re-enters
/// stamped scopes with `set_current`.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: ScopeId,

    /// Next free local frame offset. Offsets 0 and 1 hold the saved frame
    /// pointer and the saved stack pointer.
    location: i32,

    /// Next free global word, past the built-in function slots.
    global_location: i32,
}

impl SymbolTable {

    /// Create a table holding the global scope and the two built-in
    /// functions `input(): Int` and `output(arg: Int): Void`, each with a
    /// registered scope shaped like a user function's.
    pub fn new() -> SymbolTable {
        let mut table = SymbolTable {
            scopes: vec![Scope::new(ScopeId::global(), "global", 0, None, 1)],
            current: ScopeId::global(),
            location: 2,
            global_location: 1,
        };

        table.insert(
            ScopeId::global(),
            Declaration::of("input", -1),
            ExpType::Integer,
            IdCategory::Func,
            -1,
        );
        table.push("input");
        table.pop();

        table.insert(
            ScopeId::global(),
            Declaration::of("output", -1),
            ExpType::Void,
            IdCategory::Func,
            -1,
        );
        table.push("output");
        let output_scope = table.top();
        table.insert(
            output_scope,
            Declaration::of("arg", -1),
            ExpType::Integer,
            IdCategory::ParamVar,
            0,
        );
        table.pop();

        table.reset_local_cursor();
        table
    }

    /// Create a child scope of the current one and make it current.
    pub fn push(&mut self, name: &str) -> ScopeId {
        let id = ScopeId::new(self.scopes.len());
        let nested_level = self.scope(self.current).nested_level + 1;
        self.scopes.push(Scope::new(id, name, nested_level, Some(self.current), 2));
        self.current = id;
        id
    }

    /// Leave the current scope. The scope stays in the registry.
    pub fn pop(&mut self) {
        if let Some(parent) = self.scope(self.current).parent {
            self.current = parent;
        }
    }

    pub fn top(&self) -> ScopeId {
        self.current
    }

    /// Re-enter a scope recorded earlier, e.g. one stamped into a compound
    /// node during analysis.
    pub fn set_current(&mut self, scope: ScopeId) {
        self.current = scope;
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    /// All scopes ever created, in creation order.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// Insert a declaration into `scope`, allocating its memory location and
    /// seeding its line list. Re-inserting a name already declared in the
    /// scope only appends the reference line; type, category and location
    /// are left untouched.
    pub fn insert(
        &mut self,
        scope: ScopeId,
        decl: Declaration<'_>,
        exp_type: ExpType,
        category: IdCategory,
        param_index: i32,
    ) {
        if let Some(entry) = self.scope_mut(scope).entry_mut(decl.name) {
            entry.lines.push(decl.lineno);
            return;
        }

        let memloc = if scope == ScopeId::global() {
            let memloc = match decl.array_size {
                None => {
                    let memloc = self.global_location;
                    self.global_location += 1;
                    memloc
                }
                Some(size) => {
                    // Arrays record one past their last element; indexing
                    // subtracts element offsets from it.
                    self.global_location += size;
                    let memloc = self.global_location;
                    self.global_location += 1;
                    memloc
                }
            };
            let used = self.global_location;
            self.scope_mut(scope).mem_size = used;
            memloc
        } else if category != IdCategory::ParamVar {
            let memloc = match decl.array_size {
                None => {
                    let memloc = self.location;
                    self.location += 1;
                    memloc
                }
                Some(size) => {
                    // Local arrays record their first element offset.
                    let memloc = self.location;
                    self.location += size + 1;
                    memloc
                }
            };
            self.scope_mut(scope).mem_size = self.location;
            self.propagate_frame_size(scope);
            memloc
        } else {
            // Parameters are addressed by position above the frame pointer,
            // not by a frame offset.
            let location = self.location;
            let top = self.current;
            self.scope_mut(top).mem_size = location;
            0
        };

        if param_index >= 0 {
            self.scope_mut(scope).max_param_num = param_index + 1;
        }

        self.scope_mut(scope).add_entry(SymbolEntry {
            name: decl.name.to_string(),
            exp_type,
            category,
            param_index,
            memloc,
            lines: vec![decl.lineno],
            scope_id: scope,
        });
    }

    /// A function's locals may be declared in nested compounds that share
    /// its name; the frame size carries upward so the scope the generator
    /// consults sees the final figure.
    fn propagate_frame_size(&mut self, scope: ScopeId) {
        let name = self.scope(scope).name.clone();
        let location = self.location;
        let mut cursor = Some(self.current);
        while let Some(id) = cursor {
            if self.scope(id).name != name {
                break;
            }
            self.scope_mut(id).mem_size = location;
            cursor = self.scope(id).parent;
        }
    }

    /// Find `name` in `scope` or the nearest enclosing scope that declares
    /// it. First match wins, so inner declarations shadow outer ones.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&SymbolEntry> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            if let Some(entry) = self.scope(id).entry(name) {
                return Some(entry);
            }
            cursor = self.scope(id).parent;
        }
        None
    }

    /// Find `name` in `scope` alone, without walking ancestors.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&SymbolEntry> {
        self.scope(scope).entry(name)
    }

    /// The scope along the ancestor chain that owns `name`.
    pub fn find_scope_of(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            if self.scope(id).entry(name).is_some() {
                return Some(id);
            }
            cursor = self.scope(id).parent;
        }
        None
    }

    /// The first registered scope carrying `name`; for a function name this
    /// is its body scope, where its parameters live.
    pub fn scope_by_name(&self, name: &str) -> Option<ScopeId> {
        self.scopes.iter().find(|scope| scope.name == name).map(|scope| scope.id)
    }

    /// The parameter entries of a function ordered by position. Empty when
    /// the function is unknown or takes no parameters.
    pub fn param_list(&self, func_name: &str) -> Vec<&SymbolEntry> {
        let scope = match self.scope_by_name(func_name) {
            Some(id) => self.scope(id),
            None => return Vec::new(),
        };
        let mut params: Vec<&SymbolEntry> = scope
            .entries()
            .filter(|entry| entry.category == IdCategory::ParamVar)
            .collect();
        params.sort_by_key(|entry| entry.param_index);
        params
    }

    /// True iff this very entry is declared in the global scope. A local
    /// that shadows a global of the same name is not global.
    pub fn is_global(&self, entry: &SymbolEntry) -> bool {
        match self.lookup_local(ScopeId::global(), &entry.name) {
            Some(found) => found.scope_id == entry.scope_id,
            None => false,
        }
    }

    /// Reset the local frame cursor past the two reserved control slots.
    pub fn reset_local_cursor(&mut self) {
        self.location = 2;
    }
}


/// The symbol-table dump written to the listing when analysis tracing is
/// on: function declarations with parameters, the global scope with memory
/// offsets, per-function parameter and local tables, and a cross-reference
/// of every identifier.
impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let global = self.scope(ScopeId::global());

        writeln!(f, "\n<FUNCTION DECLARATION>")?;
        for entry in global.entries() {
            if entry.category != IdCategory::Func {
                continue;
            }
            writeln!(f, "function Name   Type   ")?;
            writeln!(f, "-------------   -------")?;
            writeln!(f, "{:<15} {:<11} ", entry.name, entry.exp_type)?;
            writeln!(f, "\nparam           paramtype")?;
            writeln!(f, "--------        ------------------")?;
            for param in self.param_list(&entry.name) {
                writeln!(f, "{:<15} {:<11} ", param.name, param.exp_type)?;
            }
        }

        writeln!(f, "\n<FUNCTION AND GLOBAL VAR>")?;
        writeln!(f, "Name          Type          Data Type")?;
        writeln!(f, "-------       ---------     ---------------")?;
        for entry in global.entries() {
            writeln!(
                f,
                "{:<13} {:<13} {:<11} {:4}",
                entry.name, entry.category, entry.exp_type, entry.memloc
            )?;
        }

        writeln!(f, "\n<FUNCTION PARAM AND LOCAL VAR>")?;
        for scope in self.scopes.iter() {
            // The global and built-in scopes were already covered above.
            if scope.id.index() < 3 {
                continue;
            }
            writeln!(
                f,
                "function name: {} (nested level: {})",
                scope.name, scope.nested_level
            )?;
            writeln!(f, "   ID Name      ID Type     Data Type")?;
            writeln!(f, "------------  -----------  ------------")?;
            for entry in scope.entries() {
                writeln!(
                    f,
                    "{:<13} {:<13} {:<11} {:4}",
                    entry.name, entry.category, entry.exp_type, entry.memloc
                )?;
            }
        }

        writeln!(f, "\n\nVariable Name   Type        Nested Level  Scope        Line Numbers")?;
        writeln!(f, "-------------   -------     ------------  -------      ------------")?;
        for scope in self.scopes.iter() {
            for entry in scope.entries() {
                write!(
                    f,
                    "{:<15} {:<11} {:<13} {:<10} ",
                    entry.name, entry.exp_type, scope.nested_level, scope.name
                )?;
                for line in &entry.lines {
                    write!(f, "{:4} ", line)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
