use strum_macros::Display;

/// Binary operators of the C-Minus expression grammar. The serialized form
/// is the source-level symbol, used in generated instruction comments.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
#[allow(non_camel_case_types)]
pub enum Operator {
    #[strum(serialize = "+")]
    PLUS,
    #[strum(serialize = "-")]
    MINUS,
    #[strum(serialize = "*")]
    TIMES,
    #[strum(serialize = "/")]
    OVER,

    #[strum(serialize = "<")]
    LESS_THAN,
    #[strum(serialize = "<=")]
    LESS_EQUAL,
    #[strum(serialize = ">")]
    GREATER_THAN,
    #[strum(serialize = ">=")]
    GREATER_EQUAL,
    #[strum(serialize = "==")]
    EQUAL,
    #[strum(serialize = "!=")]
    NOT_EQUAL,
}

impl Operator {
    /// True for the six comparison operators, which lower to a branch and a
    /// 0/1 select rather than a single arithmetic opcode.
    pub fn is_comparison(&self) -> bool {
        !matches!(self, Operator::PLUS | Operator::MINUS | Operator::TIMES | Operator::OVER)
    }
}
