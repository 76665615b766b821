//! Type checking for derivation expressions.
//!
//! [`TypeChecker`] decides what kind of quantity an expression produces,
//! narrows the dimensions group operands may take, and checks a fully
//! dimension-fixed resolution for consistency. The per-operator tables live
//! under `rules`.

pub use self::checker::TypeChecker;
pub(crate) use self::rules::algebra::combine_kinds;

mod checker;
mod rules {
    pub mod algebra;
    pub mod propagation;
}
