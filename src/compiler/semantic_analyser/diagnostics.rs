use std::fmt;

/// The semantic error classes the analyser can report. Any of them raises
/// the listing's error flag, which the driver polls before running the
/// generator.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SemanticError {
    /// A variable reference with no declaration in scope.
    UndefinedVariable { name: String, lineno: i32 },

    /// A call to a function with no declaration in scope.
    UndefinedFunction { name: String, lineno: i32 },

    /// A variable declared with the `void` type.
    VoidVariable { lineno: i32 },

    /// A `return` that disagrees with the enclosing function's return type.
    ReturnTypeMismatch { lineno: i32 },

    /// A type clash in an assignment, an iteration condition or an operand.
    TypeMismatch { lineno: i32 },

    /// A call whose argument list disagrees with the declaration, in arity
    /// or positional type.
    InvalidCall { lineno: i32 },
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticError::UndefinedVariable { name, lineno } => {
                write!(f, "error: Undeclared variable {} at line {}", name, lineno)
            }
            SemanticError::UndefinedFunction { name, lineno } => {
                write!(f, "error: Undeclared function {} at line {}", name, lineno)
            }
            SemanticError::VoidVariable { lineno } => {
                write!(f, "error: Variable type cannot be Void at line {}", lineno)
            }
            SemanticError::ReturnTypeMismatch { lineno } => {
                write!(f, "Type error at line {}: return type inconsistance", lineno)
            }
            SemanticError::TypeMismatch { lineno } => {
                write!(f, "error: Type inconsistance at line {}", lineno)
            }
            SemanticError::InvalidCall { lineno } => {
                write!(f, "Type error at line {}: invalid function call", lineno)
            }
        }
    }
}


/// Listing is the append-only sink diagnostics and trace output are written
/// to, in source order. Reporting any semantic error raises the error flag.
#[derive(Debug, Default)]
pub struct Listing {
    lines: Vec<String>,
    error: bool,
}

impl Listing {
    pub fn new() -> Self {
        Listing { lines: Vec::new(), error: false }
    }

    /// Append a diagnostic and raise the error flag.
    pub fn report(&mut self, error: SemanticError) {
        self.lines.push(error.to_string());
        self.error = true;
    }

    /// Append free-form trace output, one entry per line.
    pub fn write(&mut self, text: &str) {
        for line in text.lines() {
            self.lines.push(line.to_string());
        }
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
