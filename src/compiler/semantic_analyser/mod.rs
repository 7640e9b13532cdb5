mod cminus_semantic_analyser;
pub mod diagnostics;

use super::ast::AbstractSyntaxTree;
use super::ast::symbol_table::SymbolTable;
use self::diagnostics::Listing;

// Abstract Definitions

/// SemanticAnalyser takes an AbstractSyntaxTree, populates a scoped symbol
/// table and reports semantic diagnostics to a listing.
pub trait SemanticAnalyser {
    /// Generate default analyser configuration
    fn default() -> Self;

    /// Analyse an abstract syntax tree into an annotated program
    fn analyse(self, tree: AbstractSyntaxTree) -> AnnotatedProgram;
}

/// The analyser output: the scope-stamped tree, the populated symbol table
/// and the diagnostic listing the two phases wrote.
pub struct AnnotatedProgram {
    pub tree: AbstractSyntaxTree,
    pub symbols: SymbolTable,
    pub listing: Listing,
}

impl AnnotatedProgram {
    pub fn has_errors(&self) -> bool {
        self.listing.has_error()
    }
}

// Concrete Definition Export
pub use self::cminus_semantic_analyser::CMinusSemanticAnalyser;
