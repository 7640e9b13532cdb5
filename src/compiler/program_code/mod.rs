pub mod instructions;
pub mod registers;

use self::instructions::{Instruction, TmOpcode};
use self::registers::{Reg, PC};
use std::fmt;


/// One location of the instruction buffer. Comments attached to a slot are
/// printed before its instruction in the textual output.
#[derive(Debug, Clone, Default)]
struct CodeSlot {
    comments: Vec<String>,
    instruction: Option<Instruction>,
}

/// ProgramCode is the emission sink for TM instruction records.
///
/// The sink keeps a location cursor so that slots can be reserved with
/// `emit_skip`, filled in later with `emit_backup` + an emit call, and the
/// cursor returned to the stream head with `emit_restore`. This is what the
/// generator's back-patching of forward jumps is built on.
#[derive(Debug, Clone)]
pub struct ProgramCode {
    slots: Vec<CodeSlot>,

    /// Next location to emit at.
    emit_loc: usize,

    /// Highest location emitted or skipped so far; `emit_restore` returns
    /// the cursor here.
    high_emit_loc: usize,
}

impl ProgramCode {

    pub fn new() -> ProgramCode {
        ProgramCode {
            slots: vec![],
            emit_loc: 0,
            high_emit_loc: 0,
        }
    }

    fn slot_mut(&mut self, loc: usize) -> &mut CodeSlot {
        if loc >= self.slots.len() {
            self.slots.resize_with(loc + 1, CodeSlot::default);
        }
        &mut self.slots[loc]
    }

    fn advance(&mut self) {
        self.emit_loc += 1;
        if self.high_emit_loc < self.emit_loc {
            self.high_emit_loc = self.emit_loc;
        }
    }

    /// Emit a register-only record `op r,s,t` at the cursor.
    pub fn emit_ro(&mut self, op: TmOpcode, r: Reg, s: Reg, t: Reg, comment: &str) {
        debug_assert!(!op.is_register_memory(), "{} is not a register-only opcode", op);
        let loc = self.emit_loc;
        self.slot_mut(loc).instruction = Some(Instruction::RegisterOnly {
            op, r, s, t,
            comment: comment.to_string(),
        });
        self.advance();
    }

    /// Emit a register-memory record `op r,d(s)` at the cursor.
    pub fn emit_rm(&mut self, op: TmOpcode, r: Reg, d: i32, s: Reg, comment: &str) {
        debug_assert!(op.is_register_memory(), "{} is not a register-memory opcode", op);
        let loc = self.emit_loc;
        self.slot_mut(loc).instruction = Some(Instruction::RegisterMemory {
            op, r, d, s,
            comment: comment.to_string(),
        });
        self.advance();
    }

    /// Emit a register-memory record whose target is the absolute code
    /// location `target`. The displacement is computed against the program
    /// counter, which holds the location after this instruction at run time.
    pub fn emit_rm_abs(&mut self, op: TmOpcode, r: Reg, target: usize, comment: &str) {
        let d = target as i32 - (self.emit_loc as i32 + 1);
        self.emit_rm(op, r, d, PC, comment);
    }

    /// Attach a comment line to the slot at the cursor.
    pub fn emit_comment(&mut self, comment: &str) {
        let loc = self.emit_loc;
        self.slot_mut(loc).comments.push(comment.to_string());
    }

    /// Skip `n` locations, reserving them for later back-patching.
    /// @return: the first reserved location.
    pub fn emit_skip(&mut self, n: usize) -> usize {
        let loc = self.emit_loc;
        self.emit_loc += n;
        if self.high_emit_loc < self.emit_loc {
            self.high_emit_loc = self.emit_loc;
        }
        loc
    }

    /// Move the cursor back to a previously reserved location.
    pub fn emit_backup(&mut self, loc: usize) {
        debug_assert!(loc <= self.high_emit_loc, "backup beyond the emitted stream");
        self.emit_loc = loc;
    }

    /// Return the cursor to the head of the stream after a back-patch.
    pub fn emit_restore(&mut self) {
        self.emit_loc = self.high_emit_loc;
    }

    /// The instruction stored at `loc`, if that slot has been filled.
    pub fn instruction_at(&self, loc: usize) -> Option<&Instruction> {
        self.slots.get(loc).and_then(|slot| slot.instruction.as_ref())
    }

    /// Iterate the filled instruction slots in location order.
    pub fn instructions(&self) -> impl Iterator<Item = (usize, &Instruction)> {
        self.slots.iter()
            .enumerate()
            .filter_map(|(loc, slot)| slot.instruction.as_ref().map(|instr| (loc, instr)))
    }

    /// Number of locations emitted or reserved.
    pub fn len(&self) -> usize {
        self.high_emit_loc
    }

    pub fn is_empty(&self) -> bool {
        self.high_emit_loc == 0
    }
}

impl fmt::Display for ProgramCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (loc, slot) in self.slots.iter().enumerate() {
            for comment in &slot.comments {
                writeln!(f, "* {}", comment)?;
            }
            if let Some(instruction) = &slot.instruction {
                writeln!(f, "{:3}:  {}", loc, instruction)?;
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::registers::{AC, SP};

    #[test]
    fn cursor_advances_per_record() {
        let mut code = ProgramCode::new();
        code.emit_rm(TmOpcode::LDC, AC, 3, 0, "load const");
        code.emit_ro(TmOpcode::HALT, 0, 0, 0, "");
        assert_eq!(code.len(), 2);
        assert_eq!(code.instruction_at(1).unwrap().opcode(), TmOpcode::HALT);
    }

    #[test]
    fn skip_backup_restore_round_trip() {
        let mut code = ProgramCode::new();
        code.emit_rm(TmOpcode::LDC, AC, 0, 0, "before the hole");
        let hole = code.emit_skip(1);
        code.emit_rm(TmOpcode::LDC, AC, 1, 0, "after the hole");
        let resume = code.emit_skip(0);

        code.emit_backup(hole);
        code.emit_rm_abs(TmOpcode::JEQ, AC, resume, "patched jump");
        code.emit_restore();
        code.emit_ro(TmOpcode::HALT, 0, 0, 0, "");

        assert_eq!(hole, 1);
        // The patched jump lands on the instruction after the hole's successor.
        match code.instruction_at(hole).unwrap() {
            Instruction::RegisterMemory { op, d, s, .. } => {
                assert_eq!(*op, TmOpcode::JEQ);
                assert_eq!(hole as i32 + 1 + d, resume as i32);
                assert_eq!(*s, PC);
            }
            other => panic!("expected a register-memory record, got {:?}", other),
        }
        // Restore resumed at the head, not inside the patch.
        assert_eq!(code.instruction_at(3).unwrap().opcode(), TmOpcode::HALT);
    }

    #[test]
    fn comments_precede_their_slot_in_display() {
        let mut code = ProgramCode::new();
        code.emit_comment("Standard prelude:");
        code.emit_rm(TmOpcode::LD, SP, 0, AC, "load maxaddress from location 0");
        let text = code.to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "* Standard prelude:");
        assert!(lines.next().unwrap().starts_with("  0:"));
    }

    #[test]
    fn opcode_record_shapes() {
        assert!(TmOpcode::LD.is_register_memory());
        assert!(TmOpcode::JEQ.is_register_memory());
        assert!(!TmOpcode::ADD.is_register_memory());
        assert!(!TmOpcode::HALT.is_register_memory());
        assert_eq!(TmOpcode::HALT.as_u32(), 0);
    }
}
