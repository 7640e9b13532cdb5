pub mod ast;
pub mod backend;
pub mod program_code;
pub mod semantic_analyser;

#[cfg(test)]
mod test;

use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use simple_error::bail;

// Interface Definitions
use self::ast::AbstractSyntaxTree;
use self::backend::BackEndGenerator;
use self::program_code::ProgramCode;
use self::semantic_analyser::diagnostics::Listing;
use self::semantic_analyser::SemanticAnalyser;

// Concrete Definitions Re-Export
pub use self::backend::TmCodeGenerator;
pub use self::semantic_analyser::CMinusSemanticAnalyser;


/// What a compilation run produced: the diagnostic listing, and the program
/// code unless diagnostics suppressed generation.
pub struct CompilerOutput {
    pub listing: Listing,
    pub code: Option<ProgramCode>,
}

/// Compiler is a simple class that holds a compilation configuration.
/// Compiler takes two typed parameters defining the SemanticAnalyser and
/// the BackEndGenerator being used. The front end is a collaborator: the
/// compiler's input is an already-built abstract syntax tree.
///
/// # Compilation Diagram
/// AbstractSyntaxTree -> SemanticAnalyser -> AnnotatedProgram -> BackEndGenerator -> ProgramCode
pub struct Compiler<A: SemanticAnalyser, G: BackEndGenerator> {
    analyser: A,
    generator: G,
}

impl<A: SemanticAnalyser, G: BackEndGenerator> Compiler<A, G> {

    /// Default generates a default compiler configuration, determined by
    /// the default methods of the analyser and generator.
    pub fn default() -> Self {
        Compiler {
            analyser: A::default(),
            generator: G::default(),
        }
    }

    /// Create a compiler from a preconfigured analyser and generator.
    pub fn new(analyser: A, generator: G) -> Self {
        Compiler { analyser, generator }
    }

    /// Run both analysis phases over the tree and, when the listing stayed
    /// clean, generate code. Any diagnostic suppresses generation.
    pub fn compile(self, tree: AbstractSyntaxTree, source_name: &str) -> CompilerOutput {
        let program = self.analyser.analyse(tree);
        if program.has_errors() {
            return CompilerOutput {
                listing: program.listing,
                code: None,
            };
        }

        let code = self.generator.generate(program.tree, program.symbols, source_name);
        CompilerOutput {
            listing: program.listing,
            code: Some(code),
        }
    }

    /// Compile and write the textual instruction records to
    /// `dest_filename`.
    /// @return: Ok on a clean compile. Otherwise the suppression error or
    /// the IO error from a failed write.
    pub fn compile_and_save(
        self,
        tree: AbstractSyntaxTree,
        source_name: &str,
        dest_filename: &Path,
    ) -> Result<(), Box<dyn Error>> {
        let output = self.compile(tree, source_name);
        let code = match output.code {
            Some(code) => code,
            None => bail!(
                "code generation suppressed by {} diagnostic(s)",
                output.listing.lines().len()
            ),
        };

        let mut file = File::create(dest_filename)?;
        file.write_all(code.to_string().as_bytes())?;
        Ok(())
    }
}
