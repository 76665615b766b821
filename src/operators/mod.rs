//! Complementary operator overloads synthesized from simple derivations.
pub mod policy;
pub mod searcher;

use crate::expression::BinaryOp;
use crate::store::QuantityType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use policy::validate;
pub use searcher::search;

/// Which operand of `result = lhs op rhs` gets an inverse overload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorImplementation {
    #[default]
    None,
    LeftHandSide,
    RightHandSide,
    All,
    /// Each side whose operand lives outside the target's module.
    Suitable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOperator {
    pub fn from_binary(op: BinaryOp) -> Option<Self> {
        match op {
            BinaryOp::Add => Some(ArithmeticOperator::Add),
            BinaryOp::Sub => Some(ArithmeticOperator::Sub),
            BinaryOp::Mul => Some(ArithmeticOperator::Mul),
            BinaryOp::Div => Some(ArithmeticOperator::Div),
            BinaryOp::Dot | BinaryOp::Cross => None,
        }
    }

    pub fn as_binary(self) -> BinaryOp {
        match self {
            ArithmeticOperator::Add => BinaryOp::Add,
            ArithmeticOperator::Sub => BinaryOp::Sub,
            ArithmeticOperator::Mul => BinaryOp::Mul,
            ArithmeticOperator::Div => BinaryOp::Div,
        }
    }

    pub fn inverse(self) -> Self {
        match self {
            ArithmeticOperator::Add => ArithmeticOperator::Sub,
            ArithmeticOperator::Sub => ArithmeticOperator::Add,
            ArithmeticOperator::Mul => ArithmeticOperator::Div,
            ArithmeticOperator::Div => ArithmeticOperator::Mul,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorOperand {
    Quantity(QuantityType),
    /// The constant `1`.
    Dimensionless,
}

impl fmt::Display for OperatorOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorOperand::Quantity(quantity) => write!(f, "{}", quantity),
            OperatorOperand::Dimensionless => write!(f, "1"),
        }
    }
}

/// One overload: `lhs operator rhs -> result`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperatorDerivation {
    pub result: QuantityType,
    pub operator: ArithmeticOperator,
    pub lhs: OperatorOperand,
    pub rhs: OperatorOperand,
}

impl fmt::Display for OperatorDerivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} -> {}", self.lhs, self.operator.as_binary().symbol(), self.rhs, self.result)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperatorPolicyError {
    #[error("operator overloads require a derivation over one or two operands, found {operands}")]
    RequireOneOrTwoOperands { operands: usize },
    #[error("expression '{expression}' is not a single arithmetic operation that can be inverted")]
    IncompatibleExpression { expression: String },
}
