//! Narrows group candidates using the tree structure before expansion.
use super::algebra::{infer_dimensions, CROSS_DIMENSION};
use crate::expression::{BinaryOp, Expr, OperandTable};
use crate::store::DimensionSet;

/// Pushes known dimension restrictions down the tree, once, top to bottom.
///
/// Sums and dot products require equal dimensions on both sides, so both
/// children are limited to their common candidates. Other operators carry no
/// generic restriction and are only recursed into.
pub(crate) fn reduce_choices(expr: &Expr, operands: &mut OperandTable) {
    let Expr::Binary(op, lhs, rhs) = expr else { return };

    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Dot => {
            let common = infer_dimensions(lhs, operands).intersect(&infer_dimensions(rhs, operands));
            limit_result(lhs, operands, &common);
            limit_result(rhs, operands, &common);
        }
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Cross => {}
    }

    reduce_choices(lhs, operands);
    reduce_choices(rhs, operands);
}

/// Restricts the dimensions `expr` may result in to `dimensions`.
pub(crate) fn limit_result(expr: &Expr, operands: &mut OperandTable, dimensions: &DimensionSet) {
    match expr {
        Expr::Leaf(slot) => operands.restrict(*slot, dimensions),
        Expr::Constant => {}
        Expr::Binary(op, lhs, rhs) => match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
                limit_result(lhs, operands, dimensions);
                limit_result(rhs, operands, dimensions);
            }
            BinaryOp::Div => limit_result(lhs, operands, dimensions),
            // The result of a dot product is a scalar, unrelated to its operands' dimension.
            BinaryOp::Dot => {}
            // Cross validity is left to verification.
            BinaryOp::Cross => {
                if !dimensions.contains(CROSS_DIMENSION) {
                    limit_result(lhs, operands, dimensions);
                    limit_result(rhs, operands, dimensions);
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{parse, OperandLeaf};
    use crate::store::QuantityType;
    use std::collections::BTreeMap;

    fn group(name: &str, dimensions: &[u32]) -> OperandLeaf {
        let members: BTreeMap<_, _> = dimensions
            .iter()
            .map(|&d| (d, QuantityType::new("geometry", format!("{}{}", name, d))))
            .collect();
        OperandLeaf::Group { quantity: QuantityType::new("geometry", name), candidates: members.keys().copied().collect(), members }
    }

    fn fixed(dimension: u32) -> OperandLeaf {
        OperandLeaf::FixedVector { quantity: QuantityType::new("geometry", format!("Fixed{}", dimension)), dimension }
    }

    fn candidates(table: &OperandTable, slot: usize) -> Vec<u32> {
        match table.get(slot) {
            Some(OperandLeaf::Group { candidates, .. }) => candidates.iter().collect(),
            other => panic!("slot {} is not a group: {:?}", slot, other),
        }
    }

    #[test]
    fn test_sum_restricts_group_to_fixed_dimension() {
        let expr = parse("{0} + {1}", 2).unwrap();
        let mut table = OperandTable::new(vec![group("Position", &[2, 3, 4]), fixed(3)]);
        reduce_choices(&expr, &mut table);
        assert_eq!(candidates(&table, 0), vec![3]);
    }

    #[test]
    fn test_dot_restricts_to_overlap() {
        let expr = parse("{0} . {1}", 2).unwrap();
        let mut table = OperandTable::new(vec![group("Position", &[2, 3, 4]), group("Direction", &[3, 4, 5])]);
        reduce_choices(&expr, &mut table);
        assert_eq!(candidates(&table, 0), vec![3, 4]);
        assert_eq!(candidates(&table, 1), vec![3, 4]);
    }

    #[test]
    fn test_division_only_restricts_dividend() {
        let expr = parse("{0} / {2} - {1}", 3).unwrap();
        let scalar = OperandLeaf::Scalar(QuantityType::parse("Time"));
        let mut table = OperandTable::new(vec![group("Position", &[2, 3]), fixed(2), scalar]);
        reduce_choices(&expr, &mut table);
        assert_eq!(candidates(&table, 0), vec![2]);
    }

    #[test]
    fn test_cross_does_not_restrict_when_three_is_allowed() {
        let expr = parse("({0} x {1}) + {2}", 3).unwrap();
        let mut table = OperandTable::new(vec![group("Position", &[2, 3]), group("Direction", &[2, 3]), group("Torque", &[2, 3])]);
        reduce_choices(&expr, &mut table);
        assert_eq!(candidates(&table, 0), vec![2, 3]);
        assert_eq!(candidates(&table, 2), vec![3]);
    }
}
