use super::tm_code_generator::TmBackend;
use super::super::program_code::instructions::TmOpcode;
use super::super::program_code::registers::{AC, FP};

/// Names of the functions every program can call without declaring them.
/// The analyser registers their symbol entries; the bodies are emitted here.
pub const INPUT: &str = "input";
pub const OUTPUT: &str = "output";

/// Emit the built-in function bodies. Both are wrapped in the standard
/// prologue and epilogue so call sites treat them like user functions:
/// `input()` reads an integer into the accumulator, `output(arg)` loads its
/// single parameter from the frame and writes it.
pub(super) fn emit_builtin_functions(backend: &mut TmBackend) {
    backend.before_func_decl(INPUT);
    backend.code_mut().emit_ro(TmOpcode::IN, AC, 0, 0, "read integer value");
    backend.after_func_decl();

    backend.before_func_decl(OUTPUT);
    backend.code_mut().emit_rm(TmOpcode::LD, AC, 2, FP, "load output param");
    backend.code_mut().emit_ro(TmOpcode::OUT, AC, 0, 0, "write integer value");
    backend.after_func_decl();
}
