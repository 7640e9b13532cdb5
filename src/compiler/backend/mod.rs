mod builtin_functions;
mod tm_code_generator;

use super::ast::AbstractSyntaxTree;
use super::ast::symbol_table::SymbolTable;
use super::program_code::ProgramCode;

// Abstract Definitions

/// BackEndGenerator takes an analysed AbstractSyntaxTree and generates
/// ProgramCode for the target machine.
pub trait BackEndGenerator {
    /// Generate default generator configuration
    fn default() -> Self;

    /// Generate program code from a scope-stamped tree and its symbol table.
    /// `source_name` only appears in the emitted header comment.
    fn generate(self, tree: AbstractSyntaxTree, symbols: SymbolTable, source_name: &str) -> ProgramCode;
}

// Concrete Definition Export
pub use self::tm_code_generator::TmCodeGenerator;
