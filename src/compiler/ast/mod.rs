pub mod ast_node;
pub mod datatype;
pub mod operators;
pub mod scope;
pub mod symbol_table;

pub use self::{
    ast_node::{DeclKind, ExpKind, NodeKind, ParamKind, StmtKind, TreeNode, TypeKind, MAXCHILDREN},
    datatype::{ExpType, IdCategory},
    operators::Operator,
    scope::ScopeId,
};

/// Intermediate representation of the compiler model.
/// The tree is built from `TreeNode`s by the front end; each node is
/// representative of a statement, expression, declaration, parameter or
/// type involved in the construction of a program. The top-level
/// declarations hang off the root's sibling chain.
pub struct AbstractSyntaxTree {
    root: TreeNode,
}

impl AbstractSyntaxTree {
    pub fn new(root: TreeNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut TreeNode {
        &mut self.root
    }

    pub fn into_root(self) -> TreeNode {
        self.root
    }
}
