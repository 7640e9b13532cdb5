
/// Scope Id defines the unique id associated with every scope in the
/// registry regardless of position in the scope tree. Ids index into the
/// symbol table's insertion-ordered scope registry, so a scope stays
/// reachable after it has been popped from the scope stack.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct ScopeId {
    id: usize,
}

impl ScopeId {
    /// The root scope every symbol table starts with.
    pub fn global() -> Self {
        ScopeId { id: 0 }
    }

    pub(super) fn new(id: usize) -> Self {
        ScopeId { id }
    }

    pub(super) fn index(&self) -> usize {
        self.id
    }
}
