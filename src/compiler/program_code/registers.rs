/// Register index into the TM register file.
pub type Reg = u8;

// The TM machine has eight registers. Register 7 is the program counter;
// the other assignments are a convention of this generator.

/// Primary accumulator, holds the result of the last evaluated expression.
pub const AC: Reg = 0;
/// Secondary accumulator, scratch register for addresses and spilled operands.
pub const AC1: Reg = 1;
/// Frame pointer of the active function frame.
pub const FP: Reg = 3;
/// Always holds zero after the standard prelude.
pub const ZERO: Reg = 4;
/// Stack pointer, next free slot of the downward-growing temporary stack.
pub const SP: Reg = 5;
/// Global base pointer, globals live at small positive offsets from it.
pub const GP: Reg = 6;
/// Program counter.
pub const PC: Reg = 7;
