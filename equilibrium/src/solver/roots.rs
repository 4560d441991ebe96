use crate::error::EquilibriumError;

use super::aggregate::Aggregates;

/// Real roots of `(W/2)*t^2 - L*t - P = 0` in the common scale `t = Q/R`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuadraticRoots {
    /// Discriminant exactly zero.
    Repeated(f64),
    /// `upper > lower`.
    Pair { upper: f64, lower: f64 },
}

impl QuadraticRoots {
    pub fn solve(agg: Aggregates, pool: f64) -> Result<Self, EquilibriumError> {
        if agg.weight == 0.0 {
            return Err(EquilibriumError::DegenerateSystem {
                aggregate: "capacity-weighted slope sum",
            });
        }
        if !agg.linear.is_finite() || !agg.weight.is_finite() {
            return Err(EquilibriumError::Overflow {
                aggregate: "capacity-weighted sums",
            });
        }
        let discriminant = agg.discriminant(pool);
        if !discriminant.is_finite() {
            return Err(EquilibriumError::Overflow {
                aggregate: "discriminant",
            });
        }
        if discriminant < 0.0 {
            return Err(EquilibriumError::Domain { discriminant });
        }
        if discriminant == 0.0 {
            return Ok(Self::Repeated(agg.linear / agg.weight));
        }

        // q carries the sign of L so the sum never cancels; the second root
        // comes from the product of roots, -2P/W.
        let sign = if agg.linear >= 0.0 { 1.0 } else { -1.0 };
        let q = (agg.linear + sign * discriminant.sqrt()) / 2.0;
        let first = q / (agg.weight / 2.0);
        let second = -pool / q;

        Ok(Self::Pair {
            upper: first.max(second),
            lower: first.min(second),
        })
    }

    /// Candidate scales, upper first.
    pub fn candidates(&self) -> Vec<f64> {
        match *self {
            Self::Repeated(t) => vec![t],
            Self::Pair { upper, lower } => vec![upper, lower],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residual(agg: Aggregates, pool: f64, t: f64) -> f64 {
        agg.weight / 2.0 * t * t - agg.linear * t - pool
    }

    #[test]
    fn pair_roots_satisfy_the_quadratic() {
        let agg = Aggregates {
            linear: 18.0,
            weight: 2.0,
        };
        let QuadraticRoots::Pair { upper, lower } = QuadraticRoots::solve(agg, 20.0).unwrap()
        else {
            panic!("expected two roots");
        };
        assert!(upper > 0.0 && lower < 0.0);
        assert!(residual(agg, 20.0, upper).abs() < 1e-9);
        assert!(residual(agg, 20.0, lower).abs() < 1e-9);
    }

    #[test]
    fn negative_linear_term_keeps_small_root_accurate() {
        // Naive (L + sqrt(D))/W loses almost every digit here.
        let agg = Aggregates {
            linear: -1.0e8,
            weight: 1.0,
        };
        let QuadraticRoots::Pair { upper, .. } = QuadraticRoots::solve(agg, 1.0).unwrap() else {
            panic!("expected two roots");
        };
        // upper ~= P / |L|
        assert!((upper - 1.0e-8).abs() < 1e-20);
    }

    #[test]
    fn zero_discriminant_is_repeated() {
        let agg = Aggregates {
            linear: 4.0,
            weight: 2.0,
        };
        assert_eq!(
            QuadraticRoots::solve(agg, -4.0).unwrap(),
            QuadraticRoots::Repeated(2.0)
        );
    }

    #[test]
    fn negative_discriminant_is_domain_error() {
        let agg = Aggregates {
            linear: 1.0,
            weight: 2.0,
        };
        assert!(matches!(
            QuadraticRoots::solve(agg, -1.0),
            Err(EquilibriumError::Domain { .. })
        ));
    }

    #[test]
    fn zero_weight_is_degenerate() {
        let agg = Aggregates {
            linear: 3.0,
            weight: 0.0,
        };
        assert!(matches!(
            QuadraticRoots::solve(agg, 1.0),
            Err(EquilibriumError::DegenerateSystem { .. })
        ));
    }

    #[test]
    fn overflowing_sums_are_rejected() {
        let agg = Aggregates {
            linear: f64::INFINITY,
            weight: 2.0,
        };
        assert!(matches!(
            QuadraticRoots::solve(agg, 1.0),
            Err(EquilibriumError::Overflow { .. })
        ));

        // L^2 overflows although L itself is finite
        let agg = Aggregates {
            linear: 1e200,
            weight: 2.0,
        };
        assert_eq!(
            QuadraticRoots::solve(agg, 1.0),
            Err(EquilibriumError::Overflow {
                aggregate: "discriminant"
            })
        );
    }
}
