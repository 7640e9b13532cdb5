use super::builtin_functions::emit_builtin_functions;
use super::BackEndGenerator;
use super::super::ast::symbol_table::{SymbolEntry, SymbolTable};
use super::super::ast::{
    AbstractSyntaxTree, DeclKind, ExpKind, ExpType, IdCategory, NodeKind, Operator, ScopeId,
    StmtKind, TreeNode,
};
use super::super::program_code::instructions::TmOpcode as OP;
use super::super::program_code::registers::{Reg, AC, AC1, FP, GP, PC, SP, ZERO};
use super::super::program_code::ProgramCode;

/// Whether a variable access should leave the value or the address in the
/// accumulator. Addresses are wanted for assignment targets and for arrays
/// passed by reference.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum AccessMode {
    Load,
    LoadAddress,
}

/// TmBackend walks a scope-stamped tree and emits TM instruction records.
/// It re-enters the scopes recorded during analysis instead of rebuilding
/// the table, and owns all emission state the walk needs: the output
/// buffer and the reserved slot for the jump over the current function.
pub(super) struct TmBackend {
    code: ProgramCode,
    symbols: SymbolTable,

    /// Reserved slot patched with the jump over the current function body,
    /// so straight-line execution never falls into function code.
    function_skip: usize,

    trace: bool,
}

impl TmBackend {

    pub(super) fn new(symbols: SymbolTable, trace: bool) -> Self {
        TmBackend {
            code: ProgramCode::new(),
            symbols,
            function_skip: 0,
            trace,
        }
    }

    pub(super) fn code_mut(&mut self) -> &mut ProgramCode {
        &mut self.code
    }

    fn trace_comment(&mut self, text: &str) {
        if self.trace {
            self.code.emit_comment(text);
        }
    }

    /// Look up a name the analyser already resolved. A miss here means the
    /// generator was handed an unanalysed tree.
    fn entry(&self, name: &str) -> SymbolEntry {
        match self.symbols.lookup(self.symbols.top(), name) {
            Some(entry) => entry.clone(),
            None => panic!("identifier '{}' out of scope", name),
        }
    }

    /// Emit the whole program: prelude, built-in bodies, user declarations
    /// and the final halt.
    pub(super) fn generate(mut self, root: &TreeNode, source_name: &str) -> ProgramCode {
        self.code.emit_comment("C-Minus compilation to TM code");
        let file_comment = format!("File: {}", source_name);
        self.code.emit_comment(&file_comment);

        self.code.emit_comment("Standard prelude:");
        self.code.emit_rm(OP::LD, SP, 0, AC, "load maxaddress from location 0");
        self.code.emit_rm(OP::ST, AC, 0, AC, "clear location 0");
        self.code.emit_rm(OP::LDA, FP, 0, SP, "set initial fp");
        self.code.emit_rm(OP::LD, ZERO, 0, AC, "load zero register");
        self.code.emit_comment("End of standard prelude.");

        emit_builtin_functions(&mut self);

        self.symbols.set_current(ScopeId::global());
        self.gen(Some(root));

        self.code.emit_comment("End of execution.");
        self.code.emit_ro(OP::HALT, 0, 0, 0, "");
        self.code
    }

    /// Recursive code generation over a node and its sibling chain.
    fn gen(&mut self, node: Option<&TreeNode>) {
        let mut cursor = node;
        while let Some(t) = cursor {
            match &t.kind {
                NodeKind::Stmt(StmtKind::Compound) => self.gen_compound(t),
                NodeKind::Stmt(StmtKind::If) => self.gen_if(t),
                NodeKind::Stmt(StmtKind::Iter) => self.gen_while(t),
                NodeKind::Stmt(StmtKind::Return) => self.gen_return(t),
                NodeKind::Exp(_) => self.gen_exp(t),
                NodeKind::Decl(DeclKind::Func(_)) => self.gen_function(t),
                // variable declarations emit no code
                _ => {}
            }
            cursor = t.sibling.as_deref();
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn gen_compound(&mut self, t: &TreeNode) {
        if let Some(scope) = t.scope {
            self.symbols.set_current(scope);
        }
        // children: [local declarations, statements]
        self.gen(t.children[1].as_deref());
        self.symbols.pop();
    }

    fn gen_if(&mut self, t: &TreeNode) {
        self.trace_comment("-> if");
        self.gen(t.children[0].as_deref());
        let jump_to_else = self.code.emit_skip(1);
        self.code.emit_comment("if: jump to else belongs here");

        self.gen(t.children[1].as_deref());
        let jump_to_end = self.code.emit_skip(1);
        self.code.emit_comment("if: jump to end belongs here");

        let else_location = self.code.emit_skip(0);
        self.code.emit_backup(jump_to_else);
        self.code.emit_rm_abs(OP::JEQ, AC, else_location, "if: jmp to else");
        self.code.emit_restore();

        self.gen(t.children[2].as_deref());
        let end_location = self.code.emit_skip(0);
        self.code.emit_backup(jump_to_end);
        self.code.emit_rm_abs(OP::LDA, PC, end_location, "jmp to end");
        self.code.emit_restore();
        self.trace_comment("<- if");
    }

    fn gen_while(&mut self, t: &TreeNode) {
        self.trace_comment("-> while");
        let test_location = self.code.emit_skip(0);
        self.code.emit_comment("while: jump after body comes back here");
        self.gen(t.children[0].as_deref());
        let jump_to_exit = self.code.emit_skip(1);

        self.gen(t.children[1].as_deref());
        self.code.emit_rm_abs(OP::LDA, PC, test_location, "while: go for test");

        let exit_location = self.code.emit_skip(0);
        self.code.emit_backup(jump_to_exit);
        self.code.emit_rm_abs(OP::JEQ, AC, exit_location, "while end");
        self.code.emit_restore();
        self.trace_comment("<- while");
    }

    fn gen_return(&mut self, t: &TreeNode) {
        self.trace_comment("-> return");
        if let Some(value) = t.children[0].as_deref() {
            self.gen(Some(value));
        }
        self.after_func_decl();
        self.trace_comment("<- return");
    }

    // ------------------------------------------------------------------
    // Functions and calls
    // ------------------------------------------------------------------

    fn gen_function(&mut self, t: &TreeNode) {
        let name = match &t.kind {
            NodeKind::Decl(DeclKind::Func(name)) => name.as_str(),
            _ => return,
        };

        if name != "main" {
            self.before_func_decl(name);
        } else {
            // main is entered by falling through, so its frame is carved in
            // place instead of by a call sequence
            let frame_size = self
                .symbols
                .scope_by_name(name)
                .map(|scope| self.symbols.scope(scope).mem_size())
                .unwrap_or(2);
            self.code.emit_rm(OP::LDA, FP, 0, SP, "set main function fp");
            self.code.emit_rm(OP::LDC, AC, frame_size, 0, "set main function's local var offset");
            self.code.emit_ro(OP::SUB, SP, FP, AC, "set main function sp");
        }

        // children: [return type, parameters, body]
        self.gen(t.children[2].as_deref());

        if name != "main" {
            self.after_func_decl();
        }
    }

    /// Callee prologue: store the function's entry address into its global
    /// slot and reserve the jump that skips the body in straight-line
    /// execution.
    pub(super) fn before_func_decl(&mut self, name: &str) {
        let loc = self.code.emit_skip(0);
        self.code.emit_rm(OP::LDC, AC, loc as i32 + 3, 0, "get function location");
        let memloc = self.entry(name).memloc();
        self.code.emit_rm(OP::ST, AC, memloc, GP, "set function pointer");
        self.function_skip = self.code.emit_skip(1);
    }

    /// Callee epilogue: restore the caller's stack and frame pointers and
    /// jump to the saved return address, then patch the reserved skip slot
    /// to land past the body.
    pub(super) fn after_func_decl(&mut self) {
        self.code.emit_rm(OP::LD, AC1, -1, FP, "get old sp");
        self.code.emit_rm(OP::LDA, SP, 0, AC1, "restore old sp");
        self.code.emit_rm(OP::LD, AC1, 1, FP, "get return addr");
        self.push_temp(AC1, "save return addr in sp stack");
        self.code.emit_rm(OP::LD, AC1, 0, FP, "get old fp");
        self.code.emit_rm(OP::LDA, FP, 0, AC1, "restore old fp");
        self.pop_temp(AC1, "get return addr from stack");
        self.code.emit_rm(OP::LDA, PC, 0, AC1, "jump to return addr");

        let after_body = self.code.emit_skip(0);
        self.code.emit_backup(self.function_skip);
        self.code.emit_rm(OP::LDC, PC, after_body as i32, 0, "function skip");
        self.code.emit_restore();
    }

    /// Caller side of the calling convention. With `n` the callee's
    /// parameter count and `m` its frame size, relative to the caller's
    /// `sp`: arguments land at `sp-(n-1) .. sp`, the return address at
    /// `sp-n`, the saved frame pointer at `sp-(n+1)` and the saved stack
    /// pointer at `sp-(n+2)`. The new frame pointer is `sp-(n+1)` and the
    /// new stack pointer `m` slots below it.
    fn before_func_call(&mut self, t: &TreeNode) {
        let name = match &t.kind {
            NodeKind::Exp(ExpKind::Call(name)) => name.clone(),
            _ => return,
        };
        let callee_scope = match self.symbols.scope_by_name(&name) {
            Some(scope) => scope,
            None => panic!("call to unanalysed function '{}'", name),
        };
        let param_num = self.symbols.scope(callee_scope).max_param_num();
        let frame_size = self.symbols.scope(callee_scope).mem_size();

        self.gen_args_reversed(t.children[0].as_deref(), param_num, 0);

        // the return-address constant is patched once the jump below is
        // emitted, landing execution on the record after it
        let return_addr_slot = self.code.emit_skip(1);
        self.code.emit_rm(OP::ST, AC1, -param_num, SP, "set return address");
        self.code.emit_rm(OP::LDA, AC1, 0, FP, "get old fp");
        self.code.emit_rm(OP::ST, AC1, -(param_num + 1), SP, "set control link (old fp)");
        self.code.emit_rm(OP::LDA, AC1, 0, SP, "get old sp");
        self.code.emit_rm(OP::ST, AC1, -(param_num + 2), SP, "set control link (old sp)");
        self.code.emit_rm(OP::LDA, FP, -(param_num + 1), SP, "get new fp");
        self.code.emit_rm(OP::LDC, AC, frame_size, 0, "set frame size");
        self.code.emit_ro(OP::SUB, SP, FP, AC, "get new sp");
        let memloc = self.entry(&name).memloc();
        self.code.emit_rm(OP::LD, PC, memloc, GP, "moving pc");

        let return_location = self.code.emit_skip(0);
        self.code.emit_backup(return_addr_slot);
        self.code.emit_rm(OP::LDC, AC1, return_location as i32, 0, "set return addr val");
        self.code.emit_restore();
    }

    /// Evaluate actuals in reverse source order so the leftmost argument
    /// lands at the lowest stack offset.
    fn gen_args_reversed(&mut self, arg: Option<&TreeNode>, param_num: i32, position: i32) {
        let arg = match arg {
            Some(node) => node,
            None => return,
        };
        self.gen_args_reversed(arg.sibling.as_deref(), param_num, position + 1);
        self.gen_exp(arg);
        self.code.emit_rm(OP::ST, AC, position - (param_num - 1), SP, "save arg in frame slot");
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn gen_exp(&mut self, t: &TreeNode) {
        match &t.kind {
            NodeKind::Exp(ExpKind::Const(value)) => {
                self.trace_comment("-> Const");
                self.code.emit_rm(OP::LDC, AC, *value, 0, "load const");
                self.trace_comment("<- Const");
            }
            NodeKind::Exp(ExpKind::Id(_)) => {
                self.trace_comment("-> Id");
                self.gen_variable_access(AccessMode::Load, t, "load Id");
                self.trace_comment("<- Id");
            }
            NodeKind::Exp(ExpKind::ArrId(_)) => {
                self.trace_comment("-> ArrId");
                self.gen_variable_access(AccessMode::Load, t, "load ArrId");
                self.trace_comment("<- ArrId");
            }
            NodeKind::Exp(ExpKind::Call(_)) => {
                self.trace_comment("-> Call");
                self.before_func_call(t);
                self.trace_comment("<- Call");
            }
            NodeKind::Exp(ExpKind::Op(operator)) => {
                let operator = *operator;
                self.gen_operator(t, operator);
            }
            NodeKind::Exp(ExpKind::Assign) => {
                self.gen_assignment(t);
            }
            _ => {}
        }
    }

    fn gen_operator(&mut self, t: &TreeNode, operator: Operator) {
        self.trace_comment("-> Op");
        self.gen(t.children[0].as_deref());
        self.push_temp(AC, "op: push left");
        self.gen(t.children[1].as_deref());
        self.pop_temp(AC1, "op: load left");

        let comment = format!("op {}", operator);
        match operator {
            Operator::PLUS => self.code.emit_ro(OP::ADD, AC, AC1, AC, &comment),
            Operator::MINUS => self.code.emit_ro(OP::SUB, AC, AC1, AC, &comment),
            Operator::TIMES => self.code.emit_ro(OP::MUL, AC, AC1, AC, &comment),
            Operator::OVER => self.code.emit_ro(OP::DIV, AC, AC1, AC, &comment),
            _ => {
                // comparisons subtract and select 0 or 1 through a branch
                let branch = match operator {
                    Operator::LESS_THAN => OP::JLT,
                    Operator::LESS_EQUAL => OP::JLE,
                    Operator::GREATER_THAN => OP::JGT,
                    Operator::GREATER_EQUAL => OP::JGE,
                    Operator::EQUAL => OP::JEQ,
                    _ => OP::JNE,
                };
                self.code.emit_ro(OP::SUB, AC, AC1, AC, &comment);
                self.code.emit_rm(branch, AC, 2, PC, "br if true");
                self.code.emit_rm(OP::LDC, AC, 0, 0, "false case");
                self.code.emit_rm(OP::LDA, PC, 1, PC, "unconditional jmp");
                self.code.emit_rm(OP::LDC, AC, 1, 0, "true case");
            }
        }
        self.trace_comment("<- Op");
    }

    fn gen_assignment(&mut self, t: &TreeNode) {
        self.trace_comment("-> Assign");
        if let Some(target) = t.children[0].as_deref() {
            self.gen_variable_access(AccessMode::LoadAddress, target, "assignment target");
            self.push_temp(AC, "save target addr in sp stack");
            self.gen(t.children[1].as_deref());
            self.pop_temp(AC1, "load target addr from sp stack");
            self.code.emit_rm(OP::ST, AC, 0, AC1, "assignment done");
        }
        self.trace_comment("<- Assign");
    }

    /// Compute a variable's address from its declaration, classified by
    /// scope and shape:
    ///
    /// | case                | base (ac1)              | offset (ac)  |
    /// |---------------------|-------------------------|--------------|
    /// | global scalar       | gp                      | memloc       |
    /// | global array        | gp + memloc             | -index       |
    /// | local scalar        | fp                      | -memloc      |
    /// | local array         | fp - memloc             | -index       |
    /// | param scalar        | fp                      | 2 + position |
    /// | param array         | loaded from fp + 2 + position | -index |
    ///
    /// An array named without an index evaluates to its base address, which
    /// is how arrays are passed by reference.
    fn gen_variable_access(&mut self, mode: AccessMode, t: &TreeNode, comment: &str) {
        let name = match t.name() {
            Some(name) => name.to_string(),
            None => return,
        };
        let entry = self.entry(&name);
        let is_global = self.symbols.is_global(&entry);
        let is_param = entry.category() == IdCategory::ParamVar;
        let is_array = entry.exp_type() == ExpType::IntegerArray;
        let is_indexed = matches!(t.kind, NodeKind::Exp(ExpKind::ArrId(_)));

        // base address into ac1
        if is_global {
            if is_array {
                self.code.emit_rm(OP::LDA, AC1, entry.memloc(), GP, "get base addr global array");
            } else {
                self.code.emit_rm(OP::LDA, AC1, 0, GP, "get base addr global var");
            }
        } else if is_param {
            if is_array {
                // the parameter slot holds the array's base address
                self.code.emit_rm(OP::LD, AC1, 2 + entry.param_index(), FP, "get base addr param array");
            } else {
                self.code.emit_rm(OP::LDA, AC1, 0, FP, "get base addr param var");
            }
        } else if is_array {
            self.code.emit_rm(OP::LDA, AC1, -entry.memloc(), FP, "get base addr local array");
        } else {
            self.code.emit_rm(OP::LDA, AC1, 0, FP, "get base addr local var");
        }

        // offset into ac
        if is_array {
            if is_indexed {
                self.push_temp(AC1, "keep base for index calc");
                self.gen(t.children[0].as_deref());
                self.pop_temp(AC1, "get base again");
                self.code.emit_ro(OP::SUB, AC, ZERO, AC, "negate index offset");
            } else {
                self.code.emit_rm(OP::LDA, AC, 0, AC1, comment);
                return;
            }
        } else {
            let offset = if is_global {
                entry.memloc()
            } else if is_param {
                2 + entry.param_index()
            } else {
                -entry.memloc()
            };
            self.code.emit_rm(OP::LDC, AC, offset, 0, "get addr offset");
        }

        self.code.emit_ro(OP::ADD, AC, AC, AC1, "get target address");
        match mode {
            AccessMode::Load => self.code.emit_rm(OP::LD, AC, 0, AC, comment),
            AccessMode::LoadAddress => self.code.emit_rm(OP::LDA, AC, 0, AC, comment),
        }
    }

    // ------------------------------------------------------------------
    // Temporary stack
    // ------------------------------------------------------------------

    /// Spill a register to the sp stack.
    fn push_temp(&mut self, register: Reg, comment: &str) {
        self.code.emit_rm(OP::ST, register, 0, SP, comment);
        self.code.emit_rm(OP::LDA, SP, -1, SP, "stack pushed");
    }

    /// Reload the most recent spill from the sp stack.
    fn pop_temp(&mut self, register: Reg, comment: &str) {
        self.code.emit_rm(OP::LDA, SP, 1, SP, "stack popped");
        self.code.emit_rm(OP::LD, register, 0, SP, comment);
    }
}


/// TmCodeGenerator is the concrete BackEndGenerator for the TM machine.
pub struct TmCodeGenerator {
    trace: bool,
}

impl TmCodeGenerator {
    /// Emit the construct-bracketing trace comments into the output.
    pub fn with_trace(mut self) -> Self {
        self.trace = true;
        self
    }
}

impl BackEndGenerator for TmCodeGenerator {
    fn default() -> Self {
        TmCodeGenerator { trace: false }
    }

    fn generate(self, tree: AbstractSyntaxTree, symbols: SymbolTable, source_name: &str) -> ProgramCode {
        let backend = TmBackend::new(symbols, self.trace);
        backend.generate(tree.root(), source_name)
    }
}
