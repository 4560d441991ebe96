use crate::types::Good;

/// The two sums every general-N closed form is built from.
///
/// With `Q_x = R_x * t` the surplus identity collapses to
/// `(W/2)*t^2 - L*t - P = 0`, where
/// - `L = Σ R*(A*S - I)` (the linear term), and
/// - `W = Σ R^2*S` (the capacity-weighted slope).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregates {
    pub linear: f64,
    pub weight: f64,
}

impl Aggregates {
    pub fn of<'a>(goods: impl IntoIterator<Item = &'a Good>) -> Self {
        let mut linear = 0.0;
        let mut weight = 0.0;
        for good in goods {
            // Difference per good first: A*S and I are often of similar size.
            linear += good.capacity * (good.endowment * good.slope - good.intercept);
            weight += good.capacity * good.capacity * good.slope;
        }
        Self { linear, weight }
    }

    /// `L^2 + 2*P*W`.
    ///
    /// Same value as [`expanded_discriminant`], without summing the
    /// O(N^2) cross terms that cancel against each other.
    pub fn discriminant(&self, pool: f64) -> f64 {
        self.linear * self.linear + 2.0 * pool * self.weight
    }
}

/// The discriminant as the literal quadratic form over every pair of goods:
///
/// `Σx Σy (Ax*Sx*Ay*Sy - 2*Ax*Sx*Iy + Ix*Iy)*Rx*Ry + Σx 2*P*Rx^2*Sx`
pub fn expanded_discriminant(goods: &[Good], pool: f64) -> f64 {
    let mut total = 0.0;
    for x in goods {
        for y in goods {
            let rr = x.capacity * y.capacity;
            total += x.endowment * y.endowment * x.slope * y.slope * rr;
            total -= 2.0 * x.endowment * y.intercept * x.slope * rr;
            total += x.intercept * y.intercept * rr;
        }
        total += 2.0 * pool * x.capacity * x.capacity * x.slope;
    }
    total
}
