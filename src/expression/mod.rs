//! Derivation expressions: the tree, its operands, and the parser.
pub mod ast;
pub mod parser;

pub use ast::{BinaryOp, Expr, OperandLeaf, OperandTable};
pub use parser::{parse, ParseError};
