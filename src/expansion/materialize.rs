//! Turns resolved operand tables into concrete derivations, dropping duplicates.
use super::permutations::{permutations, PermutedSignature};
use crate::config::ResolverConfig;
use crate::expression::{BinaryOp, Expr, OperandTable};
use crate::store::{Dimension, QuantityType, ResultKind};
use crate::type_system::TypeChecker;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One fully dimension-fixed, verified outcome of a derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDerivation {
    /// Canonical infix form, parseable again against `signature`.
    pub expression: String,
    /// The same expression with dot and cross products rendered as helper calls.
    pub rendered: String,
    /// The concrete type bound to each slot.
    pub signature: Vec<QuantityType>,
    pub kind: ResultKind,
    /// The resulting dimension, for vector results.
    pub dimension: Option<Dimension>,
}

impl ResolvedDerivation {
    /// The signature, plus every distinct reordering of it when `permutations` is set.
    pub fn signatures(&self, permutations_enabled: bool) -> Vec<PermutedSignature> {
        if permutations_enabled {
            permutations(&self.signature)
        } else {
            vec![PermutedSignature::identity(&self.signature)]
        }
    }
}

pub struct Materializer<'c, 'a> {
    checker: &'c TypeChecker<'a>,
    config: &'c ResolverConfig,
    seen: HashSet<Vec<QuantityType>>,
}

impl<'c, 'a> Materializer<'c, 'a> {
    pub fn new(checker: &'c TypeChecker<'a>, config: &'c ResolverConfig) -> Self {
        Self { checker, config, seen: HashSet::new() }
    }

    /// Materializes every table in order, keeping the first of each concrete signature.
    pub fn materialize_all(&mut self, resolved: &[OperandTable]) -> Vec<ResolvedDerivation> {
        resolved.iter().filter_map(|operands| self.materialize(operands)).collect()
    }

    /// Returns `None` for a duplicate signature or a table that still holds a choice.
    pub fn materialize(&mut self, operands: &OperandTable) -> Option<ResolvedDerivation> {
        let expr = self.checker.expr();
        let signature = operands.concrete_signature(expr)?;
        if !self.seen.insert(signature.clone()) {
            return None;
        }

        let kind = self.checker.kind(operands);
        let dimension = match kind {
            ResultKind::Vector => self.checker.dimensions(operands).as_single(),
            _ => None,
        };

        Some(ResolvedDerivation {
            expression: strip_outer(expr, expr.to_string(), true),
            rendered: strip_outer(expr, self.render(expr, operands), false),
            signature,
            kind,
            dimension,
        })
    }

    fn render(&self, expr: &Expr, operands: &OperandTable) -> String {
        match expr {
            Expr::Leaf(_) | Expr::Constant => expr.to_string(),
            Expr::Binary(op, lhs, rhs) => {
                let (left, right) = (self.render(lhs, operands), self.render(rhs, operands));
                match op {
                    BinaryOp::Dot => match TypeChecker::new(lhs).dimensions(operands).as_single() {
                        Some(dimension) => format!("{}({}, {})", self.config.dot_helper_for(dimension), left, right),
                        None => format!("({} . {})", left, right),
                    },
                    BinaryOp::Cross => format!("{}({}, {})", self.config.cross_helper, left, right),
                    _ => format!("({} {} {})", left, op.symbol(), right),
                }
            }
        }
    }
}

/// Drops the parentheses wrapping a root infix node.
fn strip_outer(expr: &Expr, text: String, canonical: bool) -> String {
    let wrapped = match expr {
        Expr::Binary(BinaryOp::Dot | BinaryOp::Cross, ..) => canonical,
        Expr::Binary(..) => true,
        _ => false,
    };
    if wrapped && text.starts_with('(') && text.ends_with(')') {
        text[1..text.len() - 1].to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expansion::ExpansionEngine;
    use crate::expression::parse;
    use crate::store::QuantityPopulation;

    fn population() -> QuantityPopulation {
        let mut population = QuantityPopulation::new();
        population
            .add_scalar("kinematics::Time")
            .add_group("geometry::Position", [(2, "geometry::Position2"), (3, "geometry::Position3")])
            .add_group("geometry::Direction", [(2, "geometry::Direction2"), (3, "geometry::Direction3")]);
        population
    }

    fn materialize(expression: &str, signature: &[&str], config: &ResolverConfig) -> Vec<ResolvedDerivation> {
        let signature: Vec<QuantityType> = signature.iter().map(|s| QuantityType::parse(s)).collect();
        let expr = parse(expression, signature.len()).unwrap();
        let checker = TypeChecker::new(&expr);
        let mut operands = OperandTable::classify(&signature, &population());
        checker.reduce_choices(&mut operands);
        let resolved = ExpansionEngine::new(&checker).expand(&operands);
        Materializer::new(&checker, config).materialize_all(&resolved)
    }

    #[test]
    fn test_rendering_uses_helpers() {
        let config = ResolverConfig::default();
        let results = materialize("({0} . {1}) * {2}", &["geometry::Position", "geometry::Direction", "kinematics::Time"], &config);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].expression, "({0} . {1}) * {2}");
        assert_eq!(results[0].rendered, "PureScalarMaths.Dot2({0}, {1}) * {2}");
        assert_eq!(results[1].rendered, "PureScalarMaths.Dot3({0}, {1}) * {2}");
        assert!(results.iter().all(|r| r.kind == ResultKind::Scalar && r.dimension.is_none()));
    }

    #[test]
    fn test_cross_root_keeps_call_form() {
        let config = ResolverConfig { cross_helper: "Cross".into(), ..ResolverConfig::default() };
        let results = materialize("{0} x {1}", &["geometry::Position", "geometry::Direction"], &config);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].expression, "{0} x {1}");
        assert_eq!(results[0].rendered, "Cross({0}, {1})");
        assert_eq!(results[0].dimension, Some(3));
    }

    #[test]
    fn test_duplicate_signatures_are_dropped() {
        let config = ResolverConfig::default();
        let checker_expr = parse("{0} / {1}", 2).unwrap();
        let checker = TypeChecker::new(&checker_expr);
        let signature = [QuantityType::parse("geometry::Position"), QuantityType::parse("kinematics::Time")];
        let mut operands = OperandTable::classify(&signature, &population());
        operands.fix(0, 2);

        let mut materializer = Materializer::new(&checker, &config);
        assert!(materializer.materialize(&operands).is_some());
        assert!(materializer.materialize(&operands).is_none());
    }

    #[test]
    fn test_choices_in_unreferenced_slots_collapse() {
        let config = ResolverConfig::default();
        let expr = parse("{0} / {2}", 3).unwrap();
        let checker = TypeChecker::new(&expr);
        let signature = [
            QuantityType::parse("geometry::Position"),
            QuantityType::parse("geometry::Direction"),
            QuantityType::parse("kinematics::Time"),
        ];
        let mut operands = OperandTable::classify(&signature, &population());
        operands.fix(0, 3);

        let tables: Vec<OperandTable> = [2, 3]
            .into_iter()
            .map(|dimension| {
                let mut table = operands.clone();
                table.fix(1, dimension);
                table
            })
            .collect();

        let results = Materializer::new(&checker, &config).materialize_all(&tables);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].signature[1], QuantityType::parse("geometry::Direction"));
        assert_eq!(results[0].dimension, Some(3));
    }
}
