//! Checks that a derivation is simple enough to carry an operator policy.
use super::{ArithmeticOperator, OperatorImplementation, OperatorPolicyError};
use crate::expression::{parse, Expr};
use crate::resolver::DerivationDefinition;

/// One side of an invertible operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Slot(usize),
    Constant,
}

/// The single arithmetic node an operator policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Invertible {
    pub operator: ArithmeticOperator,
    pub lhs: Side,
    pub rhs: Side,
}

/// Validates the operator policy of `definition`. A `None` policy is always valid.
pub fn validate(definition: &DerivationDefinition) -> Result<(), OperatorPolicyError> {
    if definition.operator_implementation == OperatorImplementation::None {
        return Ok(());
    }
    invertible(&definition.expression, definition.signature.len()).map(|_| ())
}

/// Reduces `expression` to its single invertible operation.
///
/// Two operands need two distinct placeholders; one operand needs its
/// placeholder paired with the constant.
pub(crate) fn invertible(expression: &str, operands: usize) -> Result<Invertible, OperatorPolicyError> {
    if !(1..=2).contains(&operands) {
        return Err(OperatorPolicyError::RequireOneOrTwoOperands { operands });
    }

    let incompatible = || OperatorPolicyError::IncompatibleExpression { expression: expression.to_string() };

    let expr = parse(expression, operands).map_err(|_| incompatible())?;
    let Expr::Binary(op, lhs, rhs) = &expr else {
        return Err(incompatible());
    };
    let operator = ArithmeticOperator::from_binary(*op).ok_or_else(incompatible)?;

    let (lhs, rhs) = match (side(lhs), side(rhs)) {
        (Some(lhs), Some(rhs)) => (lhs, rhs),
        _ => return Err(incompatible()),
    };

    let valid = match (lhs, rhs, operands) {
        (Side::Slot(a), Side::Slot(b), 2) => a != b,
        (Side::Slot(_), Side::Constant, 1) | (Side::Constant, Side::Slot(_), 1) => true,
        _ => false,
    };

    if valid {
        Ok(Invertible { operator, lhs, rhs })
    } else {
        Err(incompatible())
    }
}

fn side(node: &Expr) -> Option<Side> {
    match node {
        Expr::Leaf(slot) => Some(Side::Slot(*slot)),
        Expr::Constant => Some(Side::Constant),
        Expr::Binary(..) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::QuantityType;
    use rstest::rstest;

    fn definition(expression: &str, operands: usize, policy: OperatorImplementation) -> DerivationDefinition {
        let signature = (0..operands).map(|i| QuantityType::new("physics", format!("Q{}", i)));
        DerivationDefinition::new(expression, signature).with_operators(policy)
    }

    #[rstest]
    #[case("{0} * {1}", 2, None)]
    #[case("{1} / {0}", 2, None)]
    #[case("1 / {0}", 1, None)]
    #[case("{0} * 1", 1, None)]
    #[case("{0} * {1} / {2}", 3, Some(OperatorPolicyError::RequireOneOrTwoOperands { operands: 3 }))]
    #[case("{0}", 1, Some(OperatorPolicyError::IncompatibleExpression { expression: "{0}".into() }))]
    #[case("{0} * {0}", 2, Some(OperatorPolicyError::IncompatibleExpression { expression: "{0} * {0}".into() }))]
    #[case("{0} . {1}", 2, Some(OperatorPolicyError::IncompatibleExpression { expression: "{0} . {1}".into() }))]
    #[case("({0} * {1}) / {1}", 2, Some(OperatorPolicyError::IncompatibleExpression { expression: "({0} * {1}) / {1}".into() }))]
    #[case("{0} * 1", 2, Some(OperatorPolicyError::IncompatibleExpression { expression: "{0} * 1".into() }))]
    fn test_policy_validation(#[case] expression: &str, #[case] operands: usize, #[case] expected: Option<OperatorPolicyError>) {
        let definition = definition(expression, operands, OperatorImplementation::All);
        assert_eq!(validate(&definition).err(), expected);
    }

    #[test]
    fn test_none_policy_accepts_anything() {
        let definition = definition("{0} . {1} + {2}", 3, OperatorImplementation::None);
        assert!(validate(&definition).is_ok());
    }
}
