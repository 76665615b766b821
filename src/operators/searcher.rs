//! Proposes the overloads implied by a resolved one- or two-operand derivation.
//!
//! For `r = a op b` the forward overload is `a op b -> r`; isolating `a` or `b`
//! rewrites it with the inverse operator. Subtraction and division are not
//! commutative, so their right-hand inverses keep `a` on the left.
use super::policy::{invertible, Side};
use super::{ArithmeticOperator, OperatorDerivation, OperatorImplementation, OperatorOperand, OperatorPolicyError};
use crate::expansion::ResolvedDerivation;
use crate::store::{Classification, OperandClassifier, QuantityType, ResultKind};
use crate::type_system::combine_kinds;
use std::collections::HashSet;
use tracing::trace;

/// A side of the operation, bound to its concrete quantity.
#[derive(Debug, Clone)]
struct Bound {
    operand: OperatorOperand,
    kind: ResultKind,
}

impl Bound {
    fn quantity(&self) -> Option<&QuantityType> {
        match &self.operand {
            OperatorOperand::Quantity(quantity) => Some(quantity),
            OperatorOperand::Dimensionless => None,
        }
    }
}

/// Proposes the overloads `policy` asks for, in emission order without duplicates.
///
/// `target` is the quantity the derivation is declared on; for a group target
/// the result is bound to the member matching the derivation's dimension.
pub fn search(
    target: &QuantityType,
    derivation: &ResolvedDerivation,
    policy: OperatorImplementation,
    classifier: &impl OperandClassifier,
) -> Result<Vec<OperatorDerivation>, OperatorPolicyError> {
    if policy == OperatorImplementation::None {
        return Ok(Vec::new());
    }

    let operation = invertible(&derivation.expression, derivation.signature.len())?;

    let bind = |side: Side| -> Option<Bound> {
        match side {
            Side::Constant => Some(Bound { operand: OperatorOperand::Dimensionless, kind: ResultKind::Scalar }),
            Side::Slot(slot) => derivation.signature.get(slot).map(|quantity| Bound {
                operand: OperatorOperand::Quantity(quantity.clone()),
                kind: kind_of(&classifier.classify(quantity)),
            }),
        }
    };
    let (Some(lhs), Some(rhs)) = (bind(operation.lhs), bind(operation.rhs)) else {
        return Err(OperatorPolicyError::IncompatibleExpression { expression: derivation.expression.clone() });
    };

    let result = result_quantity(target, derivation, classifier);
    let product = Bound { operand: OperatorOperand::Quantity(result), kind: derivation.kind };

    let (isolate_lhs, isolate_rhs) = match policy {
        OperatorImplementation::None => (false, false),
        OperatorImplementation::LeftHandSide => (true, false),
        OperatorImplementation::RightHandSide => (false, true),
        OperatorImplementation::All => (true, true),
        OperatorImplementation::Suitable => (outside(&lhs, target), outside(&rhs, target)),
    };

    let operator = operation.operator;
    let inverse = operator.inverse();
    let mut proposals = vec![propose(operator, &lhs, &rhs, &product)];

    if isolate_lhs {
        proposals.push(propose(inverse, &product, &rhs, &lhs));
    }
    if isolate_rhs {
        proposals.push(match operator {
            ArithmeticOperator::Add | ArithmeticOperator::Mul => propose(inverse, &product, &lhs, &rhs),
            ArithmeticOperator::Sub | ArithmeticOperator::Div => propose(operator, &lhs, &product, &rhs),
        });
    }

    let mut seen = HashSet::new();
    let derivations = proposals
        .into_iter()
        .flatten()
        .filter(|proposal| seen.insert(proposal.clone()))
        .collect::<Vec<_>>();

    trace!(quantity = %target, expression = %derivation.expression, overloads = derivations.len(), "operator overloads proposed");
    Ok(derivations)
}

/// `lhs op rhs -> result`, unless `result` is the constant or the operand
/// kinds cannot produce its kind.
fn propose(op: ArithmeticOperator, lhs: &Bound, rhs: &Bound, result: &Bound) -> Option<OperatorDerivation> {
    let quantity = result.quantity()?;
    if combine_kinds(op.as_binary(), lhs.kind, rhs.kind) != result.kind {
        return None;
    }
    Some(OperatorDerivation {
        result: quantity.clone(),
        operator: op,
        lhs: lhs.operand.clone(),
        rhs: rhs.operand.clone(),
    })
}

fn outside(side: &Bound, target: &QuantityType) -> bool {
    side.quantity().is_some_and(|quantity| quantity.module != target.module)
}

fn kind_of(classification: &Classification) -> ResultKind {
    match classification {
        Classification::Scalar => ResultKind::Scalar,
        _ => ResultKind::Vector,
    }
}

fn result_quantity(target: &QuantityType, derivation: &ResolvedDerivation, classifier: &impl OperandClassifier) -> QuantityType {
    match (classifier.classify(target), derivation.dimension) {
        (Classification::Group(members), Some(dimension)) => {
            members.get(&dimension).cloned().unwrap_or_else(|| target.clone())
        }
        _ => target.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Dimension, QuantityPopulation};
    use rstest::rstest;

    fn population() -> QuantityPopulation {
        let mut population = QuantityPopulation::new();
        population
            .add_scalar("kinematics::Time")
            .add_scalar("kinematics::Speed")
            .add_scalar("geometry::Length")
            .add_vector("geometry::Position3", 3)
            .add_vector("kinematics::Velocity3", 3);
        population
    }

    fn derivation(expression: &str, signature: &[&str], kind: ResultKind, dimension: Option<Dimension>) -> ResolvedDerivation {
        ResolvedDerivation {
            expression: expression.into(),
            rendered: expression.into(),
            signature: signature.iter().map(|s| QuantityType::parse(s)).collect(),
            kind,
            dimension,
        }
    }

    fn overloads(target: &str, derivation: &ResolvedDerivation, policy: OperatorImplementation) -> Vec<String> {
        search(&QuantityType::parse(target), derivation, policy, &population())
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[rstest]
    #[case(OperatorImplementation::None, vec![])]
    #[case(OperatorImplementation::All, vec![
        "geometry::Length / kinematics::Time -> kinematics::Speed",
        "kinematics::Speed * kinematics::Time -> geometry::Length",
        "geometry::Length / kinematics::Speed -> kinematics::Time",
    ])]
    #[case(OperatorImplementation::LeftHandSide, vec![
        "geometry::Length / kinematics::Time -> kinematics::Speed",
        "kinematics::Speed * kinematics::Time -> geometry::Length",
    ])]
    #[case(OperatorImplementation::RightHandSide, vec![
        "geometry::Length / kinematics::Time -> kinematics::Speed",
        "geometry::Length / kinematics::Speed -> kinematics::Time",
    ])]
    #[case(OperatorImplementation::Suitable, vec![
        "geometry::Length / kinematics::Time -> kinematics::Speed",
        "kinematics::Speed * kinematics::Time -> geometry::Length",
    ])]
    fn test_policy_selects_sides(#[case] policy: OperatorImplementation, #[case] expected: Vec<&str>) {
        let speed = derivation("{0} / {1}", &["geometry::Length", "kinematics::Time"], ResultKind::Scalar, None);
        assert_eq!(overloads("kinematics::Speed", &speed, policy), expected);
    }

    #[test]
    fn test_subtraction_keeps_minuend_on_the_left() {
        let delta = derivation("{0} - {1}", &["geometry::Length", "geometry::Length"], ResultKind::Scalar, None);
        assert_eq!(
            overloads("geometry::Distance", &delta, OperatorImplementation::All),
            vec![
                "geometry::Length - geometry::Length -> geometry::Distance",
                "geometry::Distance + geometry::Length -> geometry::Length",
                "geometry::Length - geometry::Distance -> geometry::Length",
            ]
        );
    }

    #[test]
    fn test_vector_inverse_with_invalid_kinds_is_skipped() {
        let velocity = derivation("{0} / {1}", &["geometry::Position3", "kinematics::Time"], ResultKind::Vector, Some(3));
        assert_eq!(
            overloads("kinematics::Velocity3", &velocity, OperatorImplementation::All),
            vec![
                "geometry::Position3 / kinematics::Time -> kinematics::Velocity3",
                "kinematics::Velocity3 * kinematics::Time -> geometry::Position3",
            ]
        );
    }

    #[test]
    fn test_symmetric_inverses_are_deduplicated() {
        let area = derivation("{0} * {1}", &["geometry::Length", "geometry::Length"], ResultKind::Scalar, None);
        assert_eq!(
            overloads("geometry::Area", &area, OperatorImplementation::All),
            vec![
                "geometry::Length * geometry::Length -> geometry::Area",
                "geometry::Area / geometry::Length -> geometry::Length",
            ]
        );
    }

    #[test]
    fn test_constant_is_never_isolated() {
        let frequency = derivation("1 / {0}", &["kinematics::Time"], ResultKind::Scalar, None);
        assert_eq!(
            overloads("kinematics::Frequency", &frequency, OperatorImplementation::All),
            vec!["1 / kinematics::Time -> kinematics::Frequency", "1 / kinematics::Frequency -> kinematics::Time"]
        );
    }

    #[test]
    fn test_group_target_binds_member() {
        let mut population = population();
        population.add_group("kinematics::Velocity", [(3, "kinematics::Velocity3")]);
        let velocity = derivation("{0} / {1}", &["geometry::Position3", "kinematics::Time"], ResultKind::Vector, Some(3));

        let result = search(&QuantityType::parse("kinematics::Velocity"), &velocity, OperatorImplementation::LeftHandSide, &population).unwrap();
        assert_eq!(result[0].result, QuantityType::parse("kinematics::Velocity3"));
    }

    #[test]
    fn test_non_invertible_expression_is_rejected() {
        let dot = derivation("{0} . {1}", &["geometry::Position3", "geometry::Position3"], ResultKind::Scalar, None);
        let error = search(&QuantityType::parse("geometry::Length"), &dot, OperatorImplementation::All, &population()).unwrap_err();
        assert!(matches!(error, OperatorPolicyError::IncompatibleExpression { .. }));
    }
}
