//! Error taxonomy of derivation resolution and the rules checking a result
//! against its declared target.
pub mod error;
pub(crate) mod rules {
    pub mod target;
}

pub use error::{DiagnosticCode, ResolutionError};
