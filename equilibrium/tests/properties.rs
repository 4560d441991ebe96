//! Property tests for the market solver
//!
//! Each property is checked over seeded random draws, so any failure is
//! reproducible from the seed alone.

use equilibrium::{EquilibriumError, Formulation, Good, MarketSystem, Root};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// === TEST FIXTURES ===

const DRAWS: usize = 50;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// Goods whose marginal price at zero purchase is negative, so the
/// surplus identity always has a positive upper root for `pool > 0`.
fn surplus_goods(rng: &mut StdRng, n: usize) -> Vec<Good> {
    (0..n)
        .map(|i| {
            Good::new(
                format!("good_{i}"),
                rng.random_range(5.0..20.0),
                rng.random_range(0.1..2.0),
                rng.random_range(0.5..2.0),
                rng.random_range(0.5..3.0),
            )
        })
        .collect()
}

/// Goods priced above zero at every non-negative quantity.
fn priced_goods(rng: &mut StdRng, n: usize) -> Vec<Good> {
    (0..n)
        .map(|i| {
            Good::new(
                format!("good_{i}"),
                rng.random_range(0.0..2.0),
                rng.random_range(3.0..6.0),
                rng.random_range(0.5..1.0),
                rng.random_range(0.5..3.0),
            )
        })
        .collect()
}

fn system(goods: &[Good], pool: f64) -> MarketSystem {
    let mut system = MarketSystem::new(pool);
    for good in goods {
        system.add_good(good.clone());
    }
    system
}

/// Quantities in insertion order.
fn quantities(system: &MarketSystem, formulation: Formulation) -> Vec<f64> {
    let eq = system.solve(formulation).unwrap();
    system.goods().map(|(id, _)| eq.quantity(id).unwrap()).collect()
}

// === TRANSPORT PARITY AND CLOSING IDENTITIES ===

#[test]
fn quantities_are_proportional_to_capacity() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..DRAWS {
        let n = rng.random_range(2..=4);
        let goods = surplus_goods(&mut rng, n);
        let sys = system(&goods, rng.random_range(1.0..100.0));

        let q = quantities(&sys, Formulation::ProportionalSurplus);
        let scale = q[0] / goods[0].capacity;
        for (good, qx) in goods.iter().zip(&q) {
            assert!(*qx >= 0.0);
            assert!(close(qx / good.capacity, scale), "{qx} / {} != {scale}", good.capacity);
        }
    }
}

#[test]
fn surplus_identity_closes_on_pool() {
    let mut rng = StdRng::seed_from_u64(2);
    for _ in 0..DRAWS {
        let n = rng.random_range(2..=4);
        let goods = surplus_goods(&mut rng, n);
        let pool = rng.random_range(1.0..100.0);
        let sys = system(&goods, pool);

        let eq = sys.solve(Formulation::ProportionalSurplus).unwrap();
        assert_eq!(eq.root, Root::Upper);
        let surplus: f64 = goods
            .iter()
            .zip(sys.goods())
            .map(|(good, (id, _))| good.cost(eq.quantity(id).unwrap()))
            .sum();
        assert!(close(surplus, pool), "surplus {surplus} vs pool {pool}");
        assert!(close(eq.total_spend(), pool));
    }
}

#[test]
fn four_goods_solve_through_the_general_form() {
    let goods = vec![
        Good::new("grain", 12.0, 1.0, 0.8, 1.0),
        Good::new("salt", 6.0, 0.5, 1.5, 0.5),
        Good::new("wool", 9.0, 2.0, 1.0, 2.0),
        Good::new("iron", 15.0, 1.5, 0.6, 1.5),
    ];
    let sys = system(&goods, 40.0);
    let eq = sys.solve(Formulation::ProportionalSurplus).unwrap();
    assert_eq!(eq.allocations.len(), 4);
    assert!(close(eq.total_spend(), 40.0));

    // The hand expansions stop at three goods.
    assert!(matches!(
        sys.solve(Formulation::SurplusSplit),
        Err(EquilibriumError::Arity { goods: 4, .. })
    ));
}

#[test]
fn spend_split_spends_invert_to_quantities() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..DRAWS {
        let n = rng.random_range(2..=4);
        let goods = priced_goods(&mut rng, n);
        let pool = rng.random_range(1.0..100.0);
        let sys = system(&goods, pool);

        let eq = sys.solve(Formulation::SpendSplit).unwrap();
        for (id, good) in sys.goods() {
            let a = eq.allocation(id).unwrap();
            assert!(a.spend >= 0.0);
            let back = good.quantity_for_spend(a.spend).unwrap();
            assert!(close(back, a.quantity), "{back} vs {}", a.quantity);
        }
        assert!(close(eq.total_spend(), pool));
    }
}

#[test]
fn fixed_prices_exhaust_the_budget() {
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..DRAWS {
        let n = rng.random_range(2..=4);
        let goods: Vec<Good> = surplus_goods(&mut rng, n)
            .into_iter()
            .map(|g| {
                let price = rng.random_range(0.5..5.0);
                g.with_price(price)
            })
            .collect();
        let pool = rng.random_range(1.0..100.0);
        let sys = system(&goods, pool);

        let eq = sys.solve(Formulation::FixedPrices).unwrap();
        assert_eq!(eq.root, Root::Linear);
        let budget: f64 = goods
            .iter()
            .zip(sys.goods())
            .map(|(good, (id, _))| good.price.unwrap() * eq.quantity(id).unwrap())
            .sum();
        assert!(close(budget, pool));
        for (id, good) in sys.goods() {
            assert_eq!(eq.allocation(id).unwrap().unit_price, good.price.unwrap());
        }
    }
}

#[test]
fn fixed_prices_require_every_price() {
    let goods = vec![
        Good::new("a", 1.0, 1.0, 1.0, 1.0).with_price(2.0),
        Good::new("b", 1.0, 1.0, 1.0, 1.0),
    ];
    let err = system(&goods, 10.0).solve(Formulation::FixedPrices).unwrap_err();
    assert_eq!(err, EquilibriumError::MissingPrice { good: "b".into() });
}

// === SYMMETRIES ===

#[test]
fn permuting_goods_permutes_quantities() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..DRAWS {
        let n = rng.random_range(2..=4);
        let goods = surplus_goods(&mut rng, n);
        let pool = rng.random_range(1.0..100.0);

        let forward = quantities(&system(&goods, pool), Formulation::ProportionalSurplus);
        let reversed_goods: Vec<Good> = goods.iter().rev().cloned().collect();
        let mut backward = quantities(&system(&reversed_goods, pool), Formulation::ProportionalSurplus);
        backward.reverse();

        for (f, b) in forward.iter().zip(&backward) {
            assert!(close(*f, *b));
        }
    }
}

#[test]
fn scaling_every_capacity_leaves_quantities_unchanged() {
    let mut rng = StdRng::seed_from_u64(6);
    for _ in 0..DRAWS {
        let n = rng.random_range(2..=4);
        let goods = surplus_goods(&mut rng, n);
        let pool = rng.random_range(1.0..100.0);
        let factor = rng.random_range(0.1..10.0);

        let scaled: Vec<Good> = goods
            .iter()
            .cloned()
            .map(|mut g| {
                g.capacity *= factor;
                g
            })
            .collect();

        for formulation in [Formulation::ProportionalSurplus, Formulation::SurplusSplit] {
            if formulation == Formulation::SurplusSplit && n == 4 {
                continue;
            }
            let base = quantities(&system(&goods, pool), formulation);
            let moved = quantities(&system(&scaled, pool), formulation);
            for (b, m) in base.iter().zip(&moved) {
                assert!(close(*b, *m), "{formulation:?}: {b} vs {m}");
            }
        }
    }
}

// === INSTRUMENTED SWEEP ===

#[test]
fn larger_pools_buy_more() {
    let goods = vec![
        Good::new("grain", 10.0, 1.0, 1.0, 1.0),
        Good::new("salt", 8.0, 0.5, 1.5, 2.0),
        Good::new("wool", 14.0, 1.2, 0.7, 0.5),
    ];

    let ((), recorder) = instrument::capture_targets(&["equilibrium"], || {
        for pool in 1..=30 {
            system(&goods, pool as f64)
                .solve(Formulation::ProportionalSurplus)
                .unwrap();
        }
    });

    let df = recorder
        .table("equilibrium")
        .unwrap()
        .to_dataframe()
        .unwrap()
        .lazy()
        .filter(col("total_quantity").is_not_null())
        .collect()
        .unwrap();
    assert_eq!(df.height(), 30);

    let totals: Vec<f64> = df
        .column("total_quantity")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert!(
        totals.windows(2).all(|w| w[1] > w[0]),
        "total quantity should rise with the pool: {totals:?}"
    );
}
