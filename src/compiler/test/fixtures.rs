//! Hand-built AST fragments shared by the unit and pipeline tests. The
//! builders mirror what a front end would produce for the commented source.

use crate::compiler::ast::{
    AbstractSyntaxTree, DeclKind, ExpKind, ExpType, NodeKind, Operator, ParamKind, StmtKind,
    TreeNode, TypeKind,
};

/// Chain nodes into a sibling list, returning its head.
pub fn chain(nodes: Vec<TreeNode>) -> Option<TreeNode> {
    let mut head: Option<TreeNode> = None;
    let mut nodes = nodes;
    while let Some(mut node) = nodes.pop() {
        if let Some(next) = head.take() {
            node = node.with_sibling(next);
        }
        head = Some(node);
    }
    head
}

/// A whole program from its top-level declaration list.
pub fn program(decls: Vec<TreeNode>) -> AbstractSyntaxTree {
    AbstractSyntaxTree::new(chain(decls).expect("a program needs at least one declaration"))
}

pub fn type_node(exp_type: ExpType, lineno: i32) -> TreeNode {
    TreeNode::new(NodeKind::Type(TypeKind::TypeName(exp_type)), lineno)
}

pub fn const_exp(value: i32, lineno: i32) -> TreeNode {
    TreeNode::new(NodeKind::Exp(ExpKind::Const(value)), lineno)
}

pub fn id(name: &str, lineno: i32) -> TreeNode {
    TreeNode::new(NodeKind::Exp(ExpKind::Id(name.to_string())), lineno)
}

pub fn arr_id(name: &str, index: TreeNode, lineno: i32) -> TreeNode {
    TreeNode::new(NodeKind::Exp(ExpKind::ArrId(name.to_string())), lineno).with_child(0, index)
}

pub fn call(name: &str, args: Vec<TreeNode>, lineno: i32) -> TreeNode {
    let mut node = TreeNode::new(NodeKind::Exp(ExpKind::Call(name.to_string())), lineno);
    node.children[0] = chain(args).map(Box::new);
    node
}

pub fn op(operator: Operator, lhs: TreeNode, rhs: TreeNode, lineno: i32) -> TreeNode {
    TreeNode::new(NodeKind::Exp(ExpKind::Op(operator)), lineno)
        .with_child(0, lhs)
        .with_child(1, rhs)
}

pub fn assign(target: TreeNode, value: TreeNode, lineno: i32) -> TreeNode {
    TreeNode::new(NodeKind::Exp(ExpKind::Assign), lineno)
        .with_child(0, target)
        .with_child(1, value)
}

pub fn var_decl(name: &str, exp_type: ExpType, lineno: i32) -> TreeNode {
    TreeNode::new(NodeKind::Decl(DeclKind::Var(name.to_string())), lineno)
        .with_child(0, type_node(exp_type, lineno))
}

pub fn arr_var_decl(name: &str, size: i32, lineno: i32) -> TreeNode {
    TreeNode::new(NodeKind::Decl(DeclKind::ArrVar(name.to_string(), size)), lineno)
        .with_child(0, type_node(ExpType::Integer, lineno))
}

pub fn scalar_param(name: &str, lineno: i32) -> TreeNode {
    TreeNode::new(NodeKind::Param(ParamKind::Scalar(name.to_string())), lineno)
}

pub fn array_param(name: &str, lineno: i32) -> TreeNode {
    TreeNode::new(NodeKind::Param(ParamKind::Array(name.to_string())), lineno)
}

pub fn compound(decls: Vec<TreeNode>, stmts: Vec<TreeNode>, lineno: i32) -> TreeNode {
    let mut node = TreeNode::new(NodeKind::Stmt(StmtKind::Compound), lineno);
    node.children[0] = chain(decls).map(Box::new);
    node.children[1] = chain(stmts).map(Box::new);
    node
}

pub fn func_decl(
    name: &str,
    return_type: ExpType,
    params: Vec<TreeNode>,
    body: TreeNode,
    lineno: i32,
) -> TreeNode {
    let mut node = TreeNode::new(NodeKind::Decl(DeclKind::Func(name.to_string())), lineno)
        .with_child(0, type_node(return_type, lineno))
        .with_child(2, body);
    node.children[1] = chain(params).map(Box::new);
    node
}

pub fn while_stmt(cond: TreeNode, body: TreeNode, lineno: i32) -> TreeNode {
    TreeNode::new(NodeKind::Stmt(StmtKind::Iter), lineno)
        .with_child(0, cond)
        .with_child(1, body)
}

pub fn if_stmt(cond: TreeNode, then_part: TreeNode, else_part: Option<TreeNode>, lineno: i32) -> TreeNode {
    let mut node = TreeNode::new(NodeKind::Stmt(StmtKind::If), lineno)
        .with_child(0, cond)
        .with_child(1, then_part);
    node.children[2] = else_part.map(Box::new);
    node
}

pub fn return_stmt(value: Option<TreeNode>, lineno: i32) -> TreeNode {
    let mut node = TreeNode::new(NodeKind::Stmt(StmtKind::Return), lineno);
    node.children[0] = value.map(Box::new);
    node
}
