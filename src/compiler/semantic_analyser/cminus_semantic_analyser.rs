use super::diagnostics::{Listing, SemanticError};
use super::{AnnotatedProgram, SemanticAnalyser};
use super::super::ast::{
    AbstractSyntaxTree, DeclKind, ExpKind, ExpType, IdCategory, NodeKind, ParamKind, StmtKind,
    TreeNode, MAXCHILDREN,
};
use super::super::ast::symbol_table::{Declaration, SymbolTable};

/// A visit hook of the traversal kernel.
type VisitHook = fn(&mut CMinusSemanticAnalyser, &mut TreeNode);

/// A parameter waiting for its function's body scope. Parameters are seen
/// before the compound statement that owns them, so they are carried over
/// and inserted when the scope is pushed.
struct PendingParam {
    name: String,
    lineno: i32,
    is_array: bool,
}

/// CMinusSemanticAnalyser is a concrete SemanticAnalyser.
///
/// It runs the traversal kernel twice over the tree: once to build the
/// scoped symbol table (declaration insertion, scope stamping, use-site
/// resolution), and once to type-check iteration conditions, returns,
/// calls and operands against the populated table.
pub struct CMinusSemanticAnalyser {
    table: SymbolTable,
    listing: Listing,

    /// Name for the next pushed compound scope; set by function
    /// declarations so a body scope carries its function's name.
    scope_name: String,

    pending_params: Vec<PendingParam>,
    trace: bool,
}

impl CMinusSemanticAnalyser {

    pub fn new() -> Self {
        CMinusSemanticAnalyser {
            table: SymbolTable::new(),
            listing: Listing::new(),
            scope_name: String::from("global"),
            pending_params: Vec::new(),
            trace: false,
        }
    }

    /// Append the symbol-table dump to the listing after table
    /// construction.
    pub fn with_trace(mut self) -> Self {
        self.trace = true;
        self
    }

    /// Generic recursive traversal: apply `pre` in preorder and `post` in
    /// postorder to the node and each child, then walk the sibling chain.
    fn traverse(&mut self, t: &mut TreeNode, pre: VisitHook, post: VisitHook) {
        pre(self, t);
        for i in 0..MAXCHILDREN {
            if let Some(child) = t.children[i].as_deref_mut() {
                self.traverse(child, pre, post);
            }
        }
        post(self, t);
        if let Some(sibling) = t.sibling.as_deref_mut() {
            self.traverse(sibling, pre, post);
        }
    }

    /// Phase A: populate the symbol table and stamp compound scopes.
    pub fn build_symtab(&mut self, tree: &mut AbstractSyntaxTree) {
        self.traverse(tree.root_mut(), Self::insert_node, Self::after_insert_node);
        if self.trace {
            self.listing.write("\nSymbol table:\n");
            let dump = self.table.to_string();
            self.listing.write(&dump);
        }
    }

    /// Phase B: type-check against the populated table, re-entering the
    /// scopes stamped in phase A.
    pub fn type_check(&mut self, tree: &mut AbstractSyntaxTree) {
        self.traverse(tree.root_mut(), Self::before_check_node, Self::check_node);
    }

    // ------------------------------------------------------------------
    // Phase A hooks
    // ------------------------------------------------------------------

    fn insert_node(&mut self, t: &mut TreeNode) {
        match &t.kind {
            NodeKind::Stmt(StmtKind::Compound) => {
                let name = self.scope_name.clone();
                let scope = self.table.push(&name);
                t.scope = Some(scope);

                // Parameters of the enclosing function share its body scope.
                let pending = std::mem::take(&mut self.pending_params);
                for (index, param) in pending.iter().enumerate() {
                    let exp_type = if param.is_array {
                        ExpType::IntegerArray
                    } else {
                        ExpType::Integer
                    };
                    self.table.insert(
                        scope,
                        Declaration::of(&param.name, param.lineno),
                        exp_type,
                        IdCategory::ParamVar,
                        index as i32,
                    );
                }
            }
            NodeKind::Exp(ExpKind::Assign) => {
                self.check_assignment(t);
            }
            NodeKind::Exp(ExpKind::Id(name)) => {
                self.resolve_use(name.clone(), t.lineno, IdCategory::Default);
            }
            NodeKind::Exp(ExpKind::ArrId(name)) => {
                self.resolve_use(name.clone(), t.lineno, IdCategory::NormalVar);
            }
            NodeKind::Exp(ExpKind::Call(name)) => {
                self.resolve_use(name.clone(), t.lineno, IdCategory::Func);
            }
            NodeKind::Decl(DeclKind::Func(name)) => {
                let return_type = t.children[0]
                    .as_deref()
                    .and_then(TreeNode::declared_type)
                    .unwrap_or(ExpType::Void);
                let top = self.table.top();
                self.table.insert(
                    top,
                    Declaration::of(name, t.lineno),
                    return_type,
                    IdCategory::Func,
                    -1,
                );
                self.scope_name = name.clone();
            }
            NodeKind::Decl(DeclKind::Var(_)) => {
                let declared = t.children[0].as_deref().and_then(TreeNode::declared_type);
                if declared == Some(ExpType::Void) {
                    self.listing.report(SemanticError::VoidVariable { lineno: t.lineno });
                } else if let Some(decl) = Declaration::from_node(t) {
                    let top = self.table.top();
                    self.table.insert(
                        top,
                        decl,
                        declared.unwrap_or(ExpType::Integer),
                        IdCategory::NormalVar,
                        -1,
                    );
                }
            }
            NodeKind::Decl(DeclKind::ArrVar(..)) => {
                let declared = t.children[0].as_deref().and_then(TreeNode::declared_type);
                if declared == Some(ExpType::Void) {
                    // arrays of void are forbidden
                    self.listing.report(SemanticError::VoidVariable { lineno: t.lineno });
                } else if let Some(decl) = Declaration::from_node(t) {
                    let top = self.table.top();
                    self.table.insert(top, decl, ExpType::IntegerArray, IdCategory::NormalVar, -1);
                }
            }
            NodeKind::Param(ParamKind::Scalar(name)) => {
                self.pending_params.push(PendingParam {
                    name: name.clone(),
                    lineno: t.lineno,
                    is_array: false,
                });
            }
            NodeKind::Param(ParamKind::Array(name)) => {
                self.pending_params.push(PendingParam {
                    name: name.clone(),
                    lineno: t.lineno,
                    is_array: true,
                });
            }
            _ => {}
        }
    }

    fn after_insert_node(&mut self, t: &mut TreeNode) {
        match &t.kind {
            NodeKind::Stmt(StmtKind::Compound) => {
                self.table.pop();
            }
            NodeKind::Decl(DeclKind::Func(_)) => {
                self.table.reset_local_cursor();
            }
            _ => {}
        }
    }

    /// Bind a use site back to its declaration, appending the reference
    /// line to the declaration's line list. Misses are undeclared names.
    fn resolve_use(&mut self, name: String, lineno: i32, category: IdCategory) {
        let top = self.table.top();
        match self.table.find_scope_of(top, &name) {
            Some(owner) => {
                let exp_type = self
                    .table
                    .lookup_local(owner, &name)
                    .map(|entry| entry.exp_type())
                    .unwrap_or(ExpType::Err);
                // The re-insert records the reference line only.
                self.table.insert(owner, Declaration::of(&name, lineno), exp_type, category, -1);
            }
            None => {
                let error = if category == IdCategory::Func {
                    SemanticError::UndefinedFunction { name, lineno }
                } else {
                    SemanticError::UndefinedVariable { name, lineno }
                };
                self.listing.report(error);
            }
        }
    }

    /// Check the value side of an assignment against the target's type.
    /// An integer target accepts constants, operator results, integer
    /// variables and calls returning integer; an array target accepts only
    /// another array.
    fn check_assignment(&mut self, t: &TreeNode) {
        let (target, value) = match (t.children[0].as_deref(), t.children[1].as_deref()) {
            (Some(target), Some(value)) => (target, value),
            _ => return,
        };
        let top = self.table.top();

        match &target.kind {
            NodeKind::Exp(ExpKind::Id(name)) => {
                let target_type = match self.table.lookup(top, name).map(|entry| entry.exp_type()) {
                    Some(exp_type) => exp_type,
                    None => return, // the use site reports the miss
                };
                match &value.kind {
                    NodeKind::Exp(ExpKind::ArrId(_)) => {
                        // an indexed array is an integer element
                        if target_type != ExpType::Integer {
                            self.listing.report(SemanticError::TypeMismatch { lineno: t.lineno });
                        }
                    }
                    NodeKind::Exp(ExpKind::Id(value_name) | ExpKind::Call(value_name)) => {
                        let value_type =
                            self.table.lookup(top, value_name).map(|entry| entry.exp_type());
                        if let Some(value_type) = value_type {
                            if value_type != target_type {
                                self.listing
                                    .report(SemanticError::TypeMismatch { lineno: t.lineno });
                            }
                        }
                    }
                    NodeKind::Exp(ExpKind::Const(_) | ExpKind::Op(_)) => {
                        if target_type != ExpType::Integer {
                            self.listing.report(SemanticError::TypeMismatch { lineno: t.lineno });
                        }
                    }
                    _ => {}
                }
            }
            NodeKind::Exp(ExpKind::ArrId(_)) => match &value.kind {
                NodeKind::Exp(ExpKind::Id(value_name) | ExpKind::Call(value_name)) => {
                    let value_type =
                        self.table.lookup(top, value_name).map(|entry| entry.exp_type());
                    if let Some(value_type) = value_type {
                        if value_type != ExpType::Integer {
                            self.listing.report(SemanticError::TypeMismatch { lineno: t.lineno });
                        }
                    }
                }
                // constants, operator results and array elements are integers
                _ => {}
            },
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Phase B hooks
    // ------------------------------------------------------------------

    fn before_check_node(&mut self, t: &mut TreeNode) {
        if let NodeKind::Stmt(StmtKind::Compound) = t.kind {
            if let Some(scope) = t.scope {
                self.table.set_current(scope);
            }
        }
    }

    fn check_node(&mut self, t: &mut TreeNode) {
        match &t.kind {
            NodeKind::Stmt(StmtKind::Compound) => {
                self.table.pop();
            }
            NodeKind::Stmt(StmtKind::Iter) => {
                self.check_iteration(t);
            }
            NodeKind::Stmt(StmtKind::Return) => {
                self.check_return(t);
            }
            NodeKind::Exp(ExpKind::Call(_)) => {
                self.check_call(t);
            }
            NodeKind::Exp(ExpKind::Op(_)) => {
                self.check_operands(t);
            }
            _ => {}
        }
    }

    /// The type an expression evaluates to, if the table can determine it.
    /// `None` when it names something undeclared.
    fn synthesized_type(&self, node: &TreeNode) -> Option<ExpType> {
        match &node.kind {
            NodeKind::Exp(ExpKind::Const(_) | ExpKind::Op(_)) => Some(ExpType::Integer),
            // an indexed array is an integer element
            NodeKind::Exp(ExpKind::ArrId(_)) => Some(ExpType::Integer),
            NodeKind::Exp(ExpKind::Id(name) | ExpKind::Call(name)) => self
                .table
                .lookup(self.table.top(), name)
                .map(|entry| entry.exp_type()),
            _ => None,
        }
    }

    fn check_iteration(&mut self, t: &TreeNode) {
        let cond = match t.children[0].as_deref() {
            Some(cond) => cond,
            None => return,
        };
        if let NodeKind::Exp(ExpKind::Id(name) | ExpKind::Call(name)) = &cond.kind {
            let top = self.table.top();
            let cond_type = self.table.lookup(top, name).map(|entry| entry.exp_type());
            if let Some(cond_type) = cond_type {
                if cond_type != ExpType::Integer {
                    self.listing.report(SemanticError::TypeMismatch { lineno: cond.lineno });
                }
            }
        }
    }

    /// A bare `return;` is only legal in a void function; `return e;` must
    /// match the enclosing function's declared return type.
    fn check_return(&mut self, t: &TreeNode) {
        let top = self.table.top();
        let function_name = self.table.scope(top).name().to_string();
        let declared = match self.table.lookup(top, &function_name).map(|entry| entry.exp_type()) {
            Some(declared) => declared,
            None => return,
        };

        match t.children[0].as_deref() {
            None => {
                if declared != ExpType::Void {
                    self.listing.report(SemanticError::ReturnTypeMismatch { lineno: t.lineno });
                }
            }
            Some(value) => {
                if let Some(actual) = self.synthesized_type(value) {
                    if actual != declared {
                        self.listing.report(SemanticError::ReturnTypeMismatch { lineno: t.lineno });
                    }
                }
            }
        }
    }

    /// Walk the ordered actual arguments against the callee's positional
    /// parameter list; any arity or positional type disagreement reports a
    /// single invalid-call diagnostic.
    fn check_call(&mut self, t: &TreeNode) {
        let name = match &t.kind {
            NodeKind::Exp(ExpKind::Call(name)) => name.clone(),
            _ => return,
        };
        if self.table.scope_by_name(&name).is_none() {
            return; // an undeclared callee was reported in phase A
        }
        let declared: Vec<ExpType> = self
            .table
            .param_list(&name)
            .iter()
            .map(|entry| entry.exp_type())
            .collect();

        let mut count = 0usize;
        let mut mismatch = false;
        let mut actual = t.children[0].as_deref();
        while let Some(arg) = actual {
            if let Some(&param_type) = declared.get(count) {
                if let Some(arg_type) = self.synthesized_type(arg) {
                    if arg_type != param_type {
                        mismatch = true;
                    }
                }
            }
            count += 1;
            actual = arg.sibling.as_deref();
        }

        if mismatch || count != declared.len() {
            self.listing.report(SemanticError::InvalidCall { lineno: t.lineno });
        }
    }

    /// Both operands of a binary operator must resolve to integers.
    fn check_operands(&mut self, t: &TreeNode) {
        for child in [t.children[0].as_deref(), t.children[1].as_deref()] {
            let operand = match child {
                Some(operand) => operand,
                None => continue,
            };
            if let NodeKind::Exp(ExpKind::Id(name) | ExpKind::Call(name)) = &operand.kind {
                let top = self.table.top();
                let operand_type = self.table.lookup(top, name).map(|entry| entry.exp_type());
                if let Some(operand_type) = operand_type {
                    if operand_type != ExpType::Integer {
                        self.listing.report(SemanticError::TypeMismatch { lineno: t.lineno });
                        return; // one diagnostic per operator node
                    }
                }
            }
        }
    }
}

impl SemanticAnalyser for CMinusSemanticAnalyser {
    fn default() -> Self {
        Self::new()
    }

    fn analyse(mut self, mut tree: AbstractSyntaxTree) -> AnnotatedProgram {
        self.build_symtab(&mut tree);
        self.type_check(&mut tree);
        AnnotatedProgram {
            tree,
            symbols: self.table,
            listing: self.listing,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::symbol_table::SymbolTable;
    use crate::compiler::ast::{ExpType, IdCategory, Operator, ScopeId};
    use crate::compiler::test::fixtures::*;

    fn analyse(tree: AbstractSyntaxTree) -> AnnotatedProgram {
        CMinusSemanticAnalyser::new().analyse(tree)
    }

    fn lookup_global<'a>(symbols: &'a SymbolTable, name: &str) -> Option<ExpType> {
        symbols.lookup(ScopeId::global(), name).map(|entry| entry.exp_type())
    }

    #[test]
    fn declarations_reach_the_table() {
        // int x; int arr[5];
        // int g(int a, int b[]) { return a; }
        // void main(void) { x = g(x, arr); }
        let program = program(vec![
            var_decl("x", ExpType::Integer, 1),
            arr_var_decl("arr", 5, 1),
            func_decl(
                "g",
                ExpType::Integer,
                vec![scalar_param("a", 2), array_param("b", 2)],
                compound(vec![], vec![return_stmt(Some(id("a", 3)), 3)], 2),
                2,
            ),
            func_decl(
                "main",
                ExpType::Void,
                vec![],
                compound(
                    vec![],
                    vec![assign(id("x", 5), call("g", vec![id("x", 5), id("arr", 5)], 5), 5)],
                    4,
                ),
                4,
            ),
        ]);
        let result = analyse(program);

        assert!(!result.has_errors());
        assert_eq!(lookup_global(&result.symbols, "x"), Some(ExpType::Integer));
        assert_eq!(lookup_global(&result.symbols, "g"), Some(ExpType::Integer));
        assert_eq!(lookup_global(&result.symbols, "main"), Some(ExpType::Void));

        let g_scope = result.symbols.scope_by_name("g").unwrap();
        assert_eq!(result.symbols.scope(g_scope).max_param_num(), 2);
        let params = result.symbols.param_list("g");
        assert_eq!(params[0].name(), "a");
        assert_eq!(params[0].exp_type(), ExpType::Integer);
        assert_eq!(params[0].category(), IdCategory::ParamVar);
        assert_eq!(params[1].name(), "b");
        assert_eq!(params[1].exp_type(), ExpType::IntegerArray);
    }

    #[test]
    fn compound_nodes_are_scope_stamped() {
        let program = program(vec![func_decl(
            "main",
            ExpType::Void,
            vec![],
            compound(vec![var_decl("i", ExpType::Integer, 2)], vec![], 1),
            1,
        )]);
        let result = analyse(program);

        let body = result.tree.root().child(2).unwrap();
        let scope = body.scope.expect("body scope must be stamped");
        assert_eq!(result.symbols.scope(scope).name(), "main");
        assert_eq!(result.symbols.scope(scope).nested_level(), 1);
        assert!(result.symbols.lookup_local(scope, "i").is_some());
    }

    #[test]
    fn use_sites_append_reference_lines() {
        // int x; void main(void) { x = 3; x = 4; }
        let program = program(vec![
            var_decl("x", ExpType::Integer, 1),
            func_decl(
                "main",
                ExpType::Void,
                vec![],
                compound(
                    vec![],
                    vec![
                        assign(id("x", 3), const_exp(3, 3), 3),
                        assign(id("x", 4), const_exp(4, 4), 4),
                    ],
                    2,
                ),
                2,
            ),
        ]);
        let result = analyse(program);
        let entry = result.symbols.lookup(ScopeId::global(), "x").unwrap();
        assert_eq!(entry.lines(), &[1, 3, 4]);
    }

    #[test]
    fn undeclared_variable_is_reported() {
        // void main(void) { y = 1; }
        let program = program(vec![func_decl(
            "main",
            ExpType::Void,
            vec![],
            compound(vec![], vec![assign(id("y", 1), const_exp(1, 1), 1)], 1),
            1,
        )]);
        let result = analyse(program);
        assert!(result.has_errors());
        assert_eq!(result.listing.lines(), &["error: Undeclared variable y at line 1"]);
    }

    #[test]
    fn undeclared_function_is_reported() {
        let program = program(vec![func_decl(
            "main",
            ExpType::Void,
            vec![],
            compound(vec![], vec![call("missing", vec![], 2)], 1),
            1,
        )]);
        let result = analyse(program);
        assert_eq!(result.listing.lines(), &["error: Undeclared function missing at line 2"]);
    }

    #[test]
    fn void_variable_is_rejected() {
        let program = program(vec![var_decl("x", ExpType::Void, 1)]);
        let result = analyse(program);
        assert_eq!(result.listing.lines(), &["error: Variable type cannot be Void at line 1"]);
        assert!(result.symbols.lookup(ScopeId::global(), "x").is_none());
    }

    #[test]
    fn return_type_mismatches_are_reported_both_ways() {
        // int f(void) { return; } void g(void) { return 1; }
        let program = program(vec![
            func_decl(
                "f",
                ExpType::Integer,
                vec![],
                compound(vec![], vec![return_stmt(None, 2)], 1),
                1,
            ),
            func_decl(
                "g",
                ExpType::Void,
                vec![],
                compound(vec![], vec![return_stmt(Some(const_exp(1, 4)), 4)], 3),
                3,
            ),
        ]);
        let result = analyse(program);
        assert_eq!(
            result.listing.lines(),
            &[
                "Type error at line 2: return type inconsistance",
                "Type error at line 4: return type inconsistance",
            ]
        );
    }

    #[test]
    fn matching_return_passes() {
        let program = program(vec![func_decl(
            "f",
            ExpType::Integer,
            vec![scalar_param("x", 1)],
            compound(vec![], vec![return_stmt(Some(id("x", 2)), 2)], 1),
            1,
        )]);
        assert!(!analyse(program).has_errors());
    }

    #[test]
    fn assigning_void_call_result_is_a_type_mismatch() {
        // void p(void) { } int a[4]; void main(void) { a[0] = p(); }
        let program = program(vec![
            func_decl("p", ExpType::Void, vec![], compound(vec![], vec![], 1), 1),
            arr_var_decl("a", 4, 2),
            func_decl(
                "main",
                ExpType::Void,
                vec![],
                compound(
                    vec![],
                    vec![assign(
                        arr_id("a", const_exp(0, 4), 4),
                        call("p", vec![], 4),
                        4,
                    )],
                    3,
                ),
                3,
            ),
        ]);
        let result = analyse(program);
        assert_eq!(result.listing.lines(), &["error: Type inconsistance at line 4"]);
    }

    #[test]
    fn array_to_scalar_assignment_is_a_type_mismatch() {
        // int a[4]; int x; void main(void) { x = a; }
        let program = program(vec![
            arr_var_decl("a", 4, 1),
            var_decl("x", ExpType::Integer, 2),
            func_decl(
                "main",
                ExpType::Void,
                vec![],
                compound(vec![], vec![assign(id("x", 4), id("a", 4), 4)], 3),
                3,
            ),
        ]);
        let result = analyse(program);
        assert_eq!(result.listing.lines(), &["error: Type inconsistance at line 4"]);
    }

    #[test]
    fn call_arity_mismatch_is_reported() {
        // int g(int x, int y) { return x + y; } void main(void) { g(1); }
        let program = program(vec![
            func_decl(
                "g",
                ExpType::Integer,
                vec![scalar_param("x", 1), scalar_param("y", 1)],
                compound(
                    vec![],
                    vec![return_stmt(Some(op(Operator::PLUS, id("x", 1), id("y", 1), 1)), 1)],
                    1,
                ),
                1,
            ),
            func_decl(
                "main",
                ExpType::Void,
                vec![],
                compound(vec![], vec![call("g", vec![const_exp(1, 2)], 2)], 2),
                2,
            ),
        ]);
        let result = analyse(program);
        assert_eq!(result.listing.lines(), &["Type error at line 2: invalid function call"]);
    }

    #[test]
    fn call_positional_type_mismatch_is_reported() {
        // void f(int a[]) { } void main(void) { f(3); }
        let program = program(vec![
            func_decl(
                "f",
                ExpType::Void,
                vec![array_param("a", 1)],
                compound(vec![], vec![], 1),
                1,
            ),
            func_decl(
                "main",
                ExpType::Void,
                vec![],
                compound(vec![], vec![call("f", vec![const_exp(3, 2)], 2)], 2),
                2,
            ),
        ]);
        let result = analyse(program);
        assert_eq!(result.listing.lines(), &["Type error at line 2: invalid function call"]);
    }

    #[test]
    fn array_argument_matches_array_parameter() {
        // void f(int a[]) { } void main(void) { int b[10]; f(b); }
        let program = program(vec![
            func_decl(
                "f",
                ExpType::Void,
                vec![array_param("a", 1)],
                compound(vec![], vec![], 1),
                1,
            ),
            func_decl(
                "main",
                ExpType::Void,
                vec![],
                compound(
                    vec![arr_var_decl("b", 10, 3)],
                    vec![call("f", vec![id("b", 4)], 4)],
                    2,
                ),
                2,
            ),
        ]);
        assert!(!analyse(program).has_errors());
    }

    #[test]
    fn void_call_operand_is_a_type_mismatch() {
        // void p(void) { } int x; void main(void) { x = 1 + p(); }
        let program = program(vec![
            func_decl("p", ExpType::Void, vec![], compound(vec![], vec![], 1), 1),
            var_decl("x", ExpType::Integer, 2),
            func_decl(
                "main",
                ExpType::Void,
                vec![],
                compound(
                    vec![],
                    vec![assign(
                        id("x", 4),
                        op(Operator::PLUS, const_exp(1, 4), call("p", vec![], 4), 4),
                        4,
                    )],
                    3,
                ),
                3,
            ),
        ]);
        let result = analyse(program);
        assert_eq!(result.listing.lines(), &["error: Type inconsistance at line 4"]);
    }

    #[test]
    fn void_call_iteration_condition_is_a_type_mismatch() {
        // void p(void) { } void main(void) { while (p()) ; }
        let program = program(vec![
            func_decl("p", ExpType::Void, vec![], compound(vec![], vec![], 1), 1),
            func_decl(
                "main",
                ExpType::Void,
                vec![],
                compound(
                    vec![],
                    vec![while_stmt(call("p", vec![], 3), compound(vec![], vec![], 3), 3)],
                    2,
                ),
                2,
            ),
        ]);
        let result = analyse(program);
        assert_eq!(result.listing.lines(), &["error: Type inconsistance at line 3"]);
    }

    #[test]
    fn shadowing_resolves_to_the_inner_declaration() {
        // int x; void main(void) { int x; x = 1; }
        let program = program(vec![
            var_decl("x", ExpType::Integer, 1),
            func_decl(
                "main",
                ExpType::Void,
                vec![],
                compound(
                    vec![var_decl("x", ExpType::Integer, 3)],
                    vec![assign(id("x", 4), const_exp(1, 4), 4)],
                    2,
                ),
                2,
            ),
        ]);
        let result = analyse(program);
        assert!(!result.has_errors());

        let body_scope = result.tree.root().sibling.as_ref().unwrap().child(2).unwrap().scope.unwrap();
        let inner = result.symbols.lookup(body_scope, "x").unwrap();
        assert_eq!(inner.memloc(), 2);
        assert!(!result.symbols.is_global(inner));
        // the use line went to the inner declaration
        assert_eq!(inner.lines(), &[3, 4]);
        let outer = result.symbols.lookup(ScopeId::global(), "x").unwrap();
        assert_eq!(outer.lines(), &[1]);
        assert_eq!(outer.memloc(), 3);
    }

    #[test]
    fn analysis_reports_and_continues() {
        // void main(void) { y = 1; z = 2; }
        let program = program(vec![func_decl(
            "main",
            ExpType::Void,
            vec![],
            compound(
                vec![],
                vec![
                    assign(id("y", 1), const_exp(1, 1), 1),
                    assign(id("z", 2), const_exp(2, 2), 2),
                ],
                1,
            ),
            1,
        )]);
        let result = analyse(program);
        assert_eq!(
            result.listing.lines(),
            &[
                "error: Undeclared variable y at line 1",
                "error: Undeclared variable z at line 2",
            ]
        );
    }
}
