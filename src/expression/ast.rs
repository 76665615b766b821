//! The derivation expression tree and the per-slot operand table it refers to.
//!
//! The tree itself is immutable once parsed. Everything that changes during
//! propagation and expansion (the candidate dimensions of group operands)
//! lives in an [`OperandTable`], so branching the search clones the table and
//! never the tree. A placeholder that appears several times in the expression
//! refers to one table slot, which makes fixing a slot tree-wide by construction.

use crate::store::{Classification, Dimension, DimensionSet, OperandClassifier, QuantityType};
use std::collections::BTreeMap;
use std::fmt;

/// The six binary operators of the derivation algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Dot,
    Cross,
}

impl BinaryOp {
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '+' => Some(BinaryOp::Add),
            '-' => Some(BinaryOp::Sub),
            '*' => Some(BinaryOp::Mul),
            '/' => Some(BinaryOp::Div),
            '.' => Some(BinaryOp::Dot),
            'x' => Some(BinaryOp::Cross),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
            BinaryOp::Dot => '.',
            BinaryOp::Cross => 'x',
        }
    }
}

/// A node of the expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A `{i}` placeholder, referring to slot `i` of the operand table.
    Leaf(usize),
    /// The literal `1`.
    Constant,
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    /// Whether slot `slot` is referenced anywhere in the tree.
    pub fn references(&self, slot: usize) -> bool {
        match self {
            Expr::Leaf(index) => *index == slot,
            Expr::Constant => false,
            Expr::Binary(_, lhs, rhs) => lhs.references(slot) || rhs.references(slot),
        }
    }
}

/// Canonical infix form, parenthesizing every binary node.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Leaf(slot) => write!(f, "{{{}}}", slot),
            Expr::Constant => write!(f, "1"),
            Expr::Binary(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
        }
    }
}

/// The classification of one signature slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandLeaf {
    Scalar(QuantityType),
    FixedVector { quantity: QuantityType, dimension: Dimension },
    /// A group operand. `candidates` only ever shrinks.
    Group {
        quantity: QuantityType,
        members: BTreeMap<Dimension, QuantityType>,
        candidates: DimensionSet,
    },
}

impl OperandLeaf {
    pub fn classify(quantity: &QuantityType, classifier: &impl OperandClassifier) -> Self {
        match classifier.classify(quantity) {
            Classification::Scalar => OperandLeaf::Scalar(quantity.clone()),
            Classification::FixedVector(dimension) | Classification::GroupMember(dimension) => {
                OperandLeaf::FixedVector { quantity: quantity.clone(), dimension }
            }
            Classification::Group(members) => {
                let candidates = members.keys().copied().collect();
                OperandLeaf::Group { quantity: quantity.clone(), members, candidates }
            }
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, OperandLeaf::Group { .. })
    }

    /// The concrete type bound to this slot, once no choice remains.
    pub fn concrete_type(&self) -> Option<&QuantityType> {
        match self {
            OperandLeaf::Scalar(quantity) | OperandLeaf::FixedVector { quantity, .. } => Some(quantity),
            OperandLeaf::Group { members, candidates, .. } => candidates.as_single().and_then(|d| members.get(&d)),
        }
    }
}

/// Per-slot operand state for one (partial) resolution of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandTable {
    leaves: Vec<OperandLeaf>,
}

impl OperandTable {
    pub fn new(leaves: Vec<OperandLeaf>) -> Self {
        Self { leaves }
    }

    pub fn classify(signature: &[QuantityType], classifier: &impl OperandClassifier) -> Self {
        Self::new(signature.iter().map(|q| OperandLeaf::classify(q, classifier)).collect())
    }

    pub fn get(&self, slot: usize) -> Option<&OperandLeaf> { self.leaves.get(slot) }

    /// Slot indices holding a group, in signature order.
    pub fn group_slots(&self) -> Vec<usize> {
        self.leaves.iter().enumerate().filter(|(_, leaf)| leaf.is_group()).map(|(i, _)| i).collect()
    }

    /// Group slots that `expr` refers to, in signature order.
    pub fn referenced_group_slots(&self, expr: &Expr) -> Vec<usize> {
        self.group_slots().into_iter().filter(|&slot| expr.references(slot)).collect()
    }

    /// Narrows the candidates of a group slot to those also in `dimensions`.
    /// Non-group slots are left untouched.
    pub fn restrict(&mut self, slot: usize, dimensions: &DimensionSet) {
        if let Some(OperandLeaf::Group { candidates, .. }) = self.leaves.get_mut(slot) {
            *candidates = candidates.intersect(dimensions);
        }
    }

    /// Fixes a group slot to one dimension.
    pub fn fix(&mut self, slot: usize, dimension: Dimension) {
        self.restrict(slot, &DimensionSet::single(dimension));
    }

    /// The concrete per-slot signature as seen through `expr`, or `None` while
    /// a referenced group still holds a choice.
    ///
    /// A group slot the tree never refers to keeps its declared group type.
    pub fn concrete_signature(&self, expr: &Expr) -> Option<Vec<QuantityType>> {
        self.leaves
            .iter()
            .enumerate()
            .map(|(slot, leaf)| match leaf {
                OperandLeaf::Group { quantity, .. } if !expr.references(slot) => Some(quantity.clone()),
                _ => leaf.concrete_type().cloned(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_group() -> OperandLeaf {
        let members: BTreeMap<_, _> = (2..=4).map(|d| (d, QuantityType::new("geometry", format!("Position{}", d)))).collect();
        let candidates = members.keys().copied().collect();
        OperandLeaf::Group { quantity: QuantityType::new("geometry", "Position"), members, candidates }
    }

    #[test]
    fn test_fixing_binds_member_type() {
        let expr = Expr::binary(BinaryOp::Mul, Expr::Leaf(0), Expr::Leaf(1));
        let mut table = OperandTable::new(vec![OperandLeaf::Scalar(QuantityType::parse("Time")), position_group()]);
        assert_eq!(table.group_slots(), vec![1]);
        assert_eq!(table.concrete_signature(&expr), None);

        table.fix(1, 3);
        let signature = table.concrete_signature(&expr).unwrap();
        assert_eq!(signature[1], QuantityType::parse("geometry::Position3"));
    }

    #[test]
    fn test_unreferenced_group_keeps_declared_type() {
        let expr = Expr::binary(BinaryOp::Div, Expr::Leaf(0), Expr::Leaf(2));
        let mut table = OperandTable::new(vec![position_group(), position_group(), OperandLeaf::Scalar(QuantityType::parse("Time"))]);
        assert_eq!(table.referenced_group_slots(&expr), vec![0]);

        table.fix(0, 2);
        let signature = table.concrete_signature(&expr).unwrap();
        assert_eq!(signature[0], QuantityType::parse("geometry::Position2"));
        assert_eq!(signature[1], QuantityType::parse("geometry::Position"));
    }

    #[test]
    fn test_fixing_outside_candidates_leaves_no_choice() {
        let mut table = OperandTable::new(vec![position_group()]);
        table.restrict(0, &[2, 3].into_iter().collect());
        table.fix(0, 4);
        assert_eq!(table.get(0).and_then(OperandLeaf::concrete_type), None);
    }

    #[test]
    fn test_canonical_display() {
        let expr = Expr::binary(BinaryOp::Div, Expr::Leaf(0), Expr::binary(BinaryOp::Cross, Expr::Leaf(1), Expr::Constant));
        assert_eq!(expr.to_string(), "({0} / ({1} x 1))");
        assert!(expr.references(1));
        assert!(!expr.references(2));
    }
}
