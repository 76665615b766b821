//! The checker that applies the algebra rules to one parsed expression.
use super::rules::{algebra, propagation};
use crate::expression::{BinaryOp, Expr, OperandTable};
use crate::store::{DimensionSet, ResultKind};

/// Type inference, constraint propagation and consistency checks over one
/// expression tree. The tree is borrowed; every call takes the operand table
/// describing the (partial) resolution it should be evaluated against.
pub struct TypeChecker<'a> {
    expr: &'a Expr,
}

impl<'a> TypeChecker<'a> {
    pub fn new(expr: &'a Expr) -> Self {
        Self { expr }
    }

    pub fn expr(&self) -> &'a Expr {
        self.expr
    }

    pub fn kind(&self, operands: &OperandTable) -> ResultKind {
        algebra::infer_kind(self.expr, operands)
    }

    pub fn dimensions(&self, operands: &OperandTable) -> DimensionSet {
        algebra::infer_dimensions(self.expr, operands)
    }

    /// Narrows the candidates of every group slot as far as the tree shape allows.
    pub fn reduce_choices(&self, operands: &mut OperandTable) {
        propagation::reduce_choices(self.expr, operands);
    }

    /// Whether a fully fixed resolution is internally consistent at every node.
    pub fn verify(&self, operands: &OperandTable) -> bool {
        verify_node(self.expr, operands)
    }
}

fn verify_node(expr: &Expr, operands: &OperandTable) -> bool {
    let Expr::Binary(op, lhs, rhs) = expr else { return true };

    if !verify_node(lhs, operands) || !verify_node(rhs, operands) {
        return false;
    }

    let single = |e: &Expr| algebra::infer_dimensions(e, operands).as_single();

    match op {
        BinaryOp::Add | BinaryOp::Sub => match algebra::infer_kind(expr, operands) {
            ResultKind::Scalar => true,
            ResultKind::Vector => matches!((single(lhs), single(rhs)), (Some(l), Some(r)) if l == r),
            ResultKind::Invalid => false,
        },
        BinaryOp::Dot => matches!((single(lhs), single(rhs)), (Some(l), Some(r)) if l == r),
        BinaryOp::Cross => {
            single(lhs) == Some(algebra::CROSS_DIMENSION) && single(rhs) == Some(algebra::CROSS_DIMENSION)
        }
        BinaryOp::Mul | BinaryOp::Div => algebra::infer_kind(expr, operands) != ResultKind::Invalid,
    }
}
