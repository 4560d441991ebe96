//! Hand-expanded two- and three-good surplus splits.
//!
//! These are the closed forms as they were first derived, symbol by symbol,
//! before the general-N sums existed. They stay as the `SurplusSplit`
//! formulation and as regression fixtures for the general form, so the
//! expressions are kept term for term rather than simplified.

use crate::types::Good;

/// Radicand, denominator and numerator of a hand-expanded split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpandedTerms {
    pub radicand: f64,
    pub denominator: f64,
    pub numerator: f64,
}

pub fn terms(goods: &[&Good], p: f64) -> Option<ExpandedTerms> {
    match goods {
        [a, b] => Some(two_goods_terms(a, b, p)),
        [a, b, c] => Some(three_goods_terms(a, b, c, p)),
        _ => None,
    }
}

/// Quantities for the root picked by `sign` (+1 or -1).
///
/// The caller checks the radicand and denominator first.
pub fn quantities(goods: &[&Good], p: f64, sign: f64) -> Option<Vec<f64>> {
    match goods {
        [a, b] => Some(two_goods(a, b, p, sign).to_vec()),
        [a, b, c] => Some(three_goods(a, b, c, p, sign).to_vec()),
        _ => None,
    }
}

fn two_goods_terms(a: &Good, b: &Good, p: f64) -> ExpandedTerms {
    let (aa, ia, sa, ra) = (a.endowment, a.intercept, a.slope, a.capacity);
    let (ab, ib, sb, rb) = (b.endowment, b.intercept, b.slope, b.capacity);

    let radicand = aa.powi(2) * ra.powi(2) * sa.powi(2) + 2.0 * aa * ab * ra * rb * sa * sb
        - 2.0 * aa * ia * ra.powi(2) * sa
        - 2.0 * aa * ib * ra * rb * sa
        + ab.powi(2) * rb.powi(2) * sb.powi(2)
        - 2.0 * ab * ia * ra * rb * sb
        - 2.0 * ab * ib * rb.powi(2) * sb
        + ia.powi(2) * ra.powi(2)
        + 2.0 * ia * ib * ra * rb
        + ib.powi(2) * rb.powi(2)
        + 2.0 * p * ra.powi(2) * sa
        + 2.0 * p * rb.powi(2) * sb;
    let denominator = ra.powi(2) * sa + rb.powi(2) * sb;
    let numerator = aa * ra * sa + ab * rb * sb - ia * ra - ib * rb;

    ExpandedTerms {
        radicand,
        denominator,
        numerator,
    }
}

fn two_goods(a: &Good, b: &Good, p: f64, sign: f64) -> [f64; 2] {
    let (ra, rb) = (a.capacity, b.capacity);
    let t = two_goods_terms(a, b, p);
    let root = t.radicand.sqrt();

    let qa = ra * (rb * t.numerator / t.denominator + sign * rb * root / t.denominator) / rb;
    let qb = rb * t.numerator / t.denominator + sign * rb * root / t.denominator;
    [qa, qb]
}

fn three_goods_terms(a: &Good, b: &Good, c: &Good, p: f64) -> ExpandedTerms {
    let (aa, ia, sa, ra) = (a.endowment, a.intercept, a.slope, a.capacity);
    let (ab, ib, sb, rb) = (b.endowment, b.intercept, b.slope, b.capacity);
    let (ac, ic, sc, rc) = (c.endowment, c.intercept, c.slope, c.capacity);

    let radicand = aa.powi(2) * ra.powi(2) * sa.powi(2)
        + 2.0 * aa * ab * ra * rb * sa * sb
        + 2.0 * aa * ac * ra * rc * sa * sc
        - 2.0 * aa * ia * ra.powi(2) * sa
        - 2.0 * aa * ib * ra * rb * sa
        - 2.0 * aa * ic * ra * rc * sa
        + ab.powi(2) * rb.powi(2) * sb.powi(2)
        + 2.0 * ab * ac * rb * rc * sb * sc
        - 2.0 * ab * ia * ra * rb * sb
        - 2.0 * ab * ib * rb.powi(2) * sb
        - 2.0 * ab * ic * rb * rc * sb
        + ac.powi(2) * rc.powi(2) * sc.powi(2)
        - 2.0 * ac * ia * ra * rc * sc
        - 2.0 * ac * ib * rb * rc * sc
        - 2.0 * ac * ic * rc.powi(2) * sc
        + ia.powi(2) * ra.powi(2)
        + 2.0 * ia * ib * ra * rb
        + 2.0 * ia * ic * ra * rc
        + ib.powi(2) * rb.powi(2)
        + 2.0 * ib * ic * rb * rc
        + ic.powi(2) * rc.powi(2)
        + 2.0 * p * ra.powi(2) * sa
        + 2.0 * p * rb.powi(2) * sb
        + 2.0 * p * rc.powi(2) * sc;
    let denominator = ra.powi(2) * sa + rb.powi(2) * sb + rc.powi(2) * sc;
    let numerator = aa * ra * sa + ab * rb * sb + ac * rc * sc - ia * ra - ib * rb - ic * rc;

    ExpandedTerms {
        radicand,
        denominator,
        numerator,
    }
}

fn three_goods(a: &Good, b: &Good, c: &Good, p: f64, sign: f64) -> [f64; 3] {
    let (ra, rb, rc) = (a.capacity, b.capacity, c.capacity);
    let t = three_goods_terms(a, b, c, p);
    let root = t.radicand.sqrt();

    let qa = ra * (t.numerator + sign * root) / t.denominator;
    let qb = rb * (t.numerator + sign * root) / t.denominator;
    let qc = rc * t.numerator / t.denominator + sign * rc * root / t.denominator;
    [qa, qb, qc]
}
