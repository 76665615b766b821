//! Kind and dimension inference for the scalar/vector algebra.
use crate::expression::{BinaryOp, Expr, OperandLeaf, OperandTable};
use crate::store::{DimensionSet, ResultKind};

/// The only dimension a cross product is defined for.
pub(crate) const CROSS_DIMENSION: u32 = 3;

/// Combines the kinds of two operands under `op`.
pub(crate) fn combine_kinds(op: BinaryOp, lhs: ResultKind, rhs: ResultKind) -> ResultKind {
    use ResultKind::*;

    if lhs == Invalid || rhs == Invalid {
        return Invalid;
    }

    match op {
        BinaryOp::Add | BinaryOp::Sub => {
            if lhs == rhs { lhs } else { Invalid }
        }
        BinaryOp::Mul => match (lhs, rhs) {
            (Vector, Vector) => Invalid,
            (Vector, _) | (_, Vector) => Vector,
            _ => Scalar,
        },
        BinaryOp::Div => {
            if rhs == Vector { Invalid } else { lhs }
        }
        BinaryOp::Dot => {
            if lhs == Vector && rhs == Vector { Scalar } else { Invalid }
        }
        BinaryOp::Cross => {
            if lhs == Vector && rhs == Vector { Vector } else { Invalid }
        }
    }
}

pub(crate) fn leaf_kind(leaf: &OperandLeaf) -> ResultKind {
    match leaf {
        OperandLeaf::Scalar(_) => ResultKind::Scalar,
        OperandLeaf::FixedVector { .. } | OperandLeaf::Group { .. } => ResultKind::Vector,
    }
}

/// Infers the kind of `expr`. A group always reports `Vector`, whatever
/// dimension it ends up with, so this is decidable before expansion.
pub(crate) fn infer_kind(expr: &Expr, operands: &OperandTable) -> ResultKind {
    match expr {
        Expr::Leaf(slot) => operands.get(*slot).map_or(ResultKind::Invalid, leaf_kind),
        Expr::Constant => ResultKind::Scalar,
        Expr::Binary(op, lhs, rhs) => combine_kinds(*op, infer_kind(lhs, operands), infer_kind(rhs, operands)),
    }
}

/// Infers the candidate dimensions of `expr`. Only meaningful for vector kinds.
pub(crate) fn infer_dimensions(expr: &Expr, operands: &OperandTable) -> DimensionSet {
    match expr {
        Expr::Leaf(slot) => match operands.get(*slot) {
            Some(OperandLeaf::FixedVector { dimension, .. }) => DimensionSet::single(*dimension),
            Some(OperandLeaf::Group { candidates, .. }) => candidates.clone(),
            Some(OperandLeaf::Scalar(_)) | None => DimensionSet::empty(),
        },
        Expr::Constant => DimensionSet::empty(),
        Expr::Binary(op, lhs, rhs) => {
            let left = infer_dimensions(lhs, operands);
            match op {
                BinaryOp::Add | BinaryOp::Sub => left.intersect(&infer_dimensions(rhs, operands)),
                BinaryOp::Mul => left.union(&infer_dimensions(rhs, operands)),
                BinaryOp::Div => left,
                BinaryOp::Dot => DimensionSet::empty(),
                BinaryOp::Cross => DimensionSet::single(CROSS_DIMENSION)
                    .intersect(&left)
                    .intersect(&infer_dimensions(rhs, operands)),
            }
        }
    }
}
