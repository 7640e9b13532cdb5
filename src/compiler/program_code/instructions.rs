use strum_macros::{Display, EnumString};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::ToPrimitive;
use enum_assoc::Assoc;

use super::registers::Reg;
use std::fmt;


/// TmOpcode is an enum of the instructions understood by the TM machine.
/// Each opcode is set to its TM instruction code. Opcodes come in two record
/// shapes: register-only (`op r,s,t`) and register-memory (`op r,d(s)`), told
/// apart by `is_register_memory`.
#[derive(Debug,
         Eq, PartialEq,
         Copy, Clone,
         FromPrimitive, ToPrimitive,
         EnumString, Display,
         Assoc)]
#[func(pub const fn is_register_memory(&self) -> bool)]
#[repr(u32)]
pub enum TmOpcode {
    #[assoc(is_register_memory = false)]
    HALT = 0,
    #[assoc(is_register_memory = false)]
    IN   = 1,
    #[assoc(is_register_memory = false)]
    OUT  = 2,
    #[assoc(is_register_memory = false)]
    ADD  = 3,
    #[assoc(is_register_memory = false)]
    SUB  = 4,
    #[assoc(is_register_memory = false)]
    MUL  = 5,
    #[assoc(is_register_memory = false)]
    DIV  = 6,

    #[assoc(is_register_memory = true)]
    LD   = 7,
    #[assoc(is_register_memory = true)]
    ST   = 8,
    #[assoc(is_register_memory = true)]
    LDA  = 9,
    #[assoc(is_register_memory = true)]
    LDC  = 10,
    #[assoc(is_register_memory = true)]
    JLT  = 11,
    #[assoc(is_register_memory = true)]
    JLE  = 12,
    #[assoc(is_register_memory = true)]
    JGT  = 13,
    #[assoc(is_register_memory = true)]
    JGE  = 14,
    #[assoc(is_register_memory = true)]
    JEQ  = 15,
    #[assoc(is_register_memory = true)]
    JNE  = 16,
}

impl TmOpcode {

    /// Converts the opcode into the value representing its instruction code.
    /// @returns: &self's representation as u32. This is not an option as all
    ///           opcodes have a valid u32 code.
    #[allow(dead_code)] // Part of the library interface
    pub fn as_u32(&self) -> u32 {
        // Safe to unwrap here as enum should always map to an integer.
        self.to_u32().unwrap()
    }
}


/// A single TM instruction record. The two shapes match the two emission
/// forms of the TM assembly format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Register-only record `op r,s,t`.
    RegisterOnly {
        op: TmOpcode,
        r: Reg,
        s: Reg,
        t: Reg,
        comment: String,
    },

    /// Register-memory record `op r,d(s)`. For jump opcodes `d(s)` names a
    /// code location relative to register `s`; for loads and stores it names
    /// a data address.
    RegisterMemory {
        op: TmOpcode,
        r: Reg,
        d: i32,
        s: Reg,
        comment: String,
    },
}

impl Instruction {
    pub fn opcode(&self) -> TmOpcode {
        match self {
            Instruction::RegisterOnly { op, .. } => *op,
            Instruction::RegisterMemory { op, .. } => *op,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::RegisterOnly { op, r, s, t, comment } => {
                write!(f, "{:>5}  {},{},{} \t{}", op.to_string(), r, s, t, comment)
            }
            Instruction::RegisterMemory { op, r, d, s, comment } => {
                write!(f, "{:>5}  {},{}({}) \t{}", op.to_string(), r, d, s, comment)
            }
        }
    }
}
