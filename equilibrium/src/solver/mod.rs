pub mod aggregate;
pub mod expanded;
pub mod roots;

pub use aggregate::{Aggregates, expanded_discriminant};
pub use expanded::ExpandedTerms;
pub use roots::QuadraticRoots;

use crate::error::EquilibriumError;
use crate::market::{Formulation, Root};
use crate::types::{Good, Quantity};

/// One root of a formulation, mapped back to per-good quantities
/// (in the order the goods were passed).
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub root: Root,
    pub quantities: Vec<Quantity>,
}

/// Every candidate solution of `formulation`, preferred root first.
///
/// Feasibility is not checked here.
pub fn candidates(
    formulation: Formulation,
    goods: &[&Good],
    pool: f64,
) -> Result<Vec<Candidate>, EquilibriumError> {
    match formulation {
        Formulation::SurplusSplit => hand_expanded(goods, pool),
        Formulation::ProportionalSurplus | Formulation::SpendSplit => {
            let roots = QuadraticRoots::solve(Aggregates::of(goods.iter().copied()), pool)?;
            let root_kinds: &[Root] = match roots {
                QuadraticRoots::Repeated(_) => &[Root::Repeated],
                QuadraticRoots::Pair { .. } => &[Root::Upper, Root::Lower],
            };
            Ok(root_kinds
                .iter()
                .zip(roots.candidates())
                .map(|(&root, t)| Candidate {
                    root,
                    quantities: goods.iter().map(|g| g.capacity * t).collect(),
                })
                .collect())
        }
        Formulation::FixedPrices => fixed_prices(goods, pool),
    }
}

fn hand_expanded(goods: &[&Good], pool: f64) -> Result<Vec<Candidate>, EquilibriumError> {
    let Some(terms) = expanded::terms(goods, pool) else {
        return Err(EquilibriumError::Arity {
            formulation: Formulation::SurplusSplit,
            supported: "2 or 3",
            goods: goods.len(),
        });
    };
    // The expansion divides by each capacity.
    if let Some(good) = goods.iter().find(|g| g.capacity <= 0.0) {
        return Err(EquilibriumError::InvalidParameter {
            good: good.label.clone(),
            field: "capacity",
            value: good.capacity,
        });
    }
    if !(terms.radicand.is_finite() && terms.denominator.is_finite() && terms.numerator.is_finite()) {
        return Err(EquilibriumError::Overflow {
            aggregate: "hand-expanded terms",
        });
    }
    if terms.denominator == 0.0 {
        return Err(EquilibriumError::DegenerateSystem {
            aggregate: "capacity-weighted slope sum",
        });
    }
    if terms.radicand < 0.0 {
        return Err(EquilibriumError::Domain {
            discriminant: terms.radicand,
        });
    }

    // Capacities are positive, so the larger root takes the sign of the denominator.
    let upper = terms.denominator.signum();
    let signs = if terms.radicand == 0.0 {
        vec![(Root::Repeated, 1.0)]
    } else {
        vec![(Root::Upper, upper), (Root::Lower, -upper)]
    };
    Ok(signs
        .iter()
        .filter_map(|&(root, sign)| {
            expanded::quantities(goods, pool, sign).map(|quantities| Candidate { root, quantities })
        })
        .collect())
}

fn fixed_prices(goods: &[&Good], pool: f64) -> Result<Vec<Candidate>, EquilibriumError> {
    let mut priced_capacity = 0.0;
    for good in goods {
        let Some(price) = good.price else {
            return Err(EquilibriumError::MissingPrice {
                good: good.label.clone(),
            });
        };
        priced_capacity += price * good.capacity;
    }
    if !priced_capacity.is_finite() {
        return Err(EquilibriumError::Overflow {
            aggregate: "price-weighted capacity sum",
        });
    }
    if priced_capacity == 0.0 {
        return Err(EquilibriumError::DegenerateSystem {
            aggregate: "price-weighted capacity sum",
        });
    }

    let t = pool / priced_capacity;
    Ok(vec![Candidate {
        root: Root::Linear,
        quantities: goods.iter().map(|g| g.capacity * t).collect(),
    }])
}
