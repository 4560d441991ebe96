use thiserror::Error;

use crate::market::Formulation;

/// Ways a market system can fail to clear.
///
/// Every variant is deterministic in its inputs, so none of them is worth
/// retrying with the same parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EquilibriumError {
    /// Negative discriminant: no real equilibrium exists.
    #[error("no real equilibrium: discriminant {discriminant} is negative")]
    Domain { discriminant: f64 },

    /// Real roots exist but each leaves some good with a negative quantity (or spend).
    #[error("no feasible equilibrium among roots {roots:?}")]
    Infeasible { roots: Vec<f64> },

    /// An aggregate the closed form divides by is zero.
    #[error("degenerate market system: {aggregate} is zero")]
    DegenerateSystem { aggregate: &'static str },

    /// Finite parameters whose products or sums left the range of `f64`.
    #[error("market system overflows: {aggregate} is not finite")]
    Overflow { aggregate: &'static str },

    #[error("good `{good}` has invalid {field}: {value}")]
    InvalidParameter {
        good: String,
        field: &'static str,
        value: f64,
    },

    #[error("good `{good}` has no exogenous price")]
    MissingPrice { good: String },

    #[error("{formulation:?} is only defined for {supported}, got {goods} goods")]
    Arity {
        formulation: Formulation,
        supported: &'static str,
        goods: usize,
    },

    #[error("malformed market input: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for EquilibriumError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
