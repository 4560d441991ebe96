use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};
use tsify_next::Tsify;

use crate::error::EquilibriumError;
use crate::solver::{self, Candidate};
use crate::types::{Good, GoodId, KeyToU64, Price, Quantity};

// ============================================================================
// Formulation - which closing identity clears the market
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum Formulation {
    /// Two or three goods, surplus identity, hand-expanded closed form.
    SurplusSplit,
    /// Any number of goods, surplus identity `Σ (I - S*(A - Q/2))*Q = P`.
    ProportionalSurplus,
    /// Surplus identity solved for per-good spend; spends must be non-negative too.
    SpendSplit,
    /// Exogenous unit prices, budget identity `Σ p*Q = P`.
    FixedPrices,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum Root {
    Upper,
    Lower,
    /// Discriminant exactly zero.
    Repeated,
    /// Fixed-price systems are linear.
    Linear,
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    pub quantity: Quantity,
    pub unit_price: Price,
    pub spend: f64,
}

#[derive(Debug, Clone)]
pub struct Equilibrium {
    pub formulation: Formulation,
    pub root: Root,
    pub pool: f64,
    pub allocations: SecondaryMap<GoodId, Allocation>,
}

impl Equilibrium {
    pub fn quantity(&self, id: GoodId) -> Option<Quantity> {
        self.allocations.get(id).map(|a| a.quantity)
    }

    pub fn allocation(&self, id: GoodId) -> Option<&Allocation> {
        self.allocations.get(id)
    }

    /// Closing identity evaluated at the solution; equals `pool` up to rounding.
    pub fn total_spend(&self) -> f64 {
        self.allocations.values().map(|a| a.spend).sum()
    }

    pub fn total_quantity(&self) -> Quantity {
        self.allocations.values().map(|a| a.quantity).sum()
    }
}

// ============================================================================
// MarketSystem - 2..N goods sharing one pool
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MarketSystem {
    goods: SlotMap<GoodId, Good>,
    pub pool: f64,
}

impl MarketSystem {
    pub fn new(pool: f64) -> Self {
        Self {
            goods: SlotMap::with_key(),
            pool,
        }
    }

    pub fn add_good(&mut self, good: Good) -> GoodId {
        self.goods.insert(good)
    }

    pub fn good(&self, id: GoodId) -> Option<&Good> {
        self.goods.get(id)
    }

    /// Goods in insertion order.
    pub fn goods(&self) -> impl Iterator<Item = (GoodId, &Good)> {
        self.goods.iter()
    }

    pub fn len(&self) -> usize {
        self.goods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goods.is_empty()
    }

    /// Solve for the non-negative equilibrium under `formulation`.
    ///
    /// Roots are tried upper first; the first one whose quantities (and, for
    /// [`Formulation::SpendSplit`], spends) are all non-negative is returned.
    pub fn solve(&self, formulation: Formulation) -> Result<Equilibrium, EquilibriumError> {
        if !self.pool.is_finite() {
            return Err(EquilibriumError::InvalidParameter {
                good: "<pool>".to_string(),
                field: "pool",
                value: self.pool,
            });
        }
        if self.goods.is_empty() {
            return Err(EquilibriumError::DegenerateSystem {
                aggregate: "goods list",
            });
        }
        for good in self.goods.values() {
            good.check_finite()?;
        }

        let (ids, goods): (Vec<GoodId>, Vec<&Good>) = self.goods.iter().unzip();
        let candidates = solver::candidates(formulation, &goods, self.pool)?;

        for candidate in &candidates {
            let allocations = allocate(formulation, &goods, candidate);
            if !feasible(formulation, &allocations) {
                #[cfg(feature = "instrument")]
                tracing::debug!(
                    target: "equilibrium",
                    formulation = ?formulation,
                    root = ?candidate.root,
                    "root rejected: negative allocation"
                );
                continue;
            }

            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "equilibrium",
                formulation = ?formulation,
                root = ?candidate.root,
                goods = goods.len() as u64,
                pool = self.pool,
                total_quantity = allocations.iter().map(|a| a.quantity).sum::<f64>(),
            );

            let mut map = SecondaryMap::with_capacity(ids.len());
            for (&id, allocation) in ids.iter().zip(allocations) {
                map.insert(id, allocation);
            }
            return Ok(Equilibrium {
                formulation,
                root: candidate.root,
                pool: self.pool,
                allocations: map,
            });
        }

        Err(EquilibriumError::Infeasible {
            roots: candidates
                .iter()
                .map(|c| scale_of(&goods, &c.quantities))
                .collect(),
        })
    }

    pub fn snapshot(&self, eq: &Equilibrium) -> SolveOutput {
        SolveOutput {
            formulation: eq.formulation,
            root: eq.root,
            allocations: self
                .goods
                .iter()
                .filter_map(|(id, good)| {
                    eq.allocation(id).map(|a| AllocationSnapshot {
                        good: id.to_u64(),
                        label: good.label.clone(),
                        quantity: a.quantity,
                        unit_price: a.unit_price,
                        spend: a.spend,
                    })
                })
                .collect(),
        }
    }
}

fn allocate(formulation: Formulation, goods: &[&Good], candidate: &Candidate) -> Vec<Allocation> {
    goods
        .iter()
        .zip(&candidate.quantities)
        .map(|(good, &quantity)| {
            let unit_price = match formulation {
                // Presence checked by the solver.
                Formulation::FixedPrices => good.price.unwrap_or_default(),
                _ => good.average_cost(quantity),
            };
            Allocation {
                quantity,
                unit_price,
                spend: unit_price * quantity,
            }
        })
        .collect()
}

fn feasible(formulation: Formulation, allocations: &[Allocation]) -> bool {
    allocations.iter().all(|a| {
        a.quantity.is_finite()
            && a.spend.is_finite()
            && a.quantity >= 0.0
            && (formulation != Formulation::SpendSplit || a.spend >= 0.0)
    })
}

/// Least-squares common scale `t` with `Q ≈ R*t`, for error reporting.
fn scale_of(goods: &[&Good], quantities: &[Quantity]) -> f64 {
    let (num, den) = goods
        .iter()
        .zip(quantities)
        .fold((0.0, 0.0), |(n, d), (g, q)| {
            (n + g.capacity * q, d + g.capacity * g.capacity)
        });
    if den == 0.0 { 0.0 } else { num / den }
}

// ============================================================================
// Boundary types - what crosses WASM / the command line
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct MarketInput {
    pub pool: f64,
    pub formulation: Formulation,
    pub goods: Vec<Good>,
}

impl MarketInput {
    pub fn from_json(json: &str) -> Result<Self, EquilibriumError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_system(&self) -> MarketSystem {
        let mut system = MarketSystem::new(self.pool);
        for good in &self.goods {
            system.add_good(good.clone());
        }
        system
    }

    pub fn solve(&self) -> Result<SolveOutput, EquilibriumError> {
        let system = self.to_system();
        let eq = system.solve(self.formulation)?;
        Ok(system.snapshot(&eq))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct SolveOutput {
    pub formulation: Formulation,
    pub root: Root,
    pub allocations: Vec<AllocationSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct AllocationSnapshot {
    pub good: u64,
    pub label: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub spend: f64,
}
