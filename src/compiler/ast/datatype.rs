use strum_macros::Display;

/// Semantic types an expression or declaration can carry. C-Minus has
/// integers, integer arrays and the void return type; `Err` marks entries
/// whose type could not be resolved. The serialized forms are the column
/// values of the symbol-table dump.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
pub enum ExpType {
    #[strum(serialize = "Int")]
    Integer,
    #[strum(serialize = "Void")]
    Void,
    #[strum(serialize = "IntArray")]
    IntegerArray,
    #[strum(serialize = "error")]
    Err,
}

/// What kind of name a symbol entry declares. `Default` marks a use site
/// that has been bound back to its declaration; it carries no new type
/// information.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
pub enum IdCategory {
    #[strum(serialize = "Variable")]
    NormalVar,
    #[strum(serialize = "Function")]
    Func,
    #[strum(serialize = "ParamVar")]
    ParamVar,
    #[strum(serialize = "Default")]
    Default,
}
