use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tsify_next::Tsify;

use crate::error::EquilibriumError;

// ============================================================================
// IDs - Using slotmap for generational indices
// ============================================================================

new_key_type! {
    pub struct GoodId;
}

/// Trait for converting SlotMap keys to u64 for WASM boundary
pub trait KeyToU64 {
    fn to_u64(self) -> u64;
}

impl KeyToU64 for GoodId {
    fn to_u64(self) -> u64 {
        self.0.as_ffi()
    }
}

pub type Quantity = f64;
pub type Price = f64;

// ============================================================================
// Good - one traded commodity/region slot
// ============================================================================

/// Parameters of one good in a market system.
///
/// The demand curve is linear in the stock held: buying `q` on top of an
/// endowment `A` moves the unit price from `I - S*A` down the slope `S`, and
/// the capacity weight `R` fixes the good's share of any proportional split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct Good {
    pub label: String,
    /// `A`: endowment / autonomy level.
    pub endowment: f64,
    /// `I`: intercept of the inverse demand curve.
    pub intercept: f64,
    /// `S`: slope of the inverse demand curve.
    pub slope: f64,
    /// `R`: transport capacity weight.
    pub capacity: f64,
    /// Exogenous unit price, only read by the fixed-price formulation.
    #[serde(default)]
    pub price: Option<Price>,
}

impl Good {
    pub fn new(
        label: impl Into<String>,
        endowment: f64,
        intercept: f64,
        slope: f64,
        capacity: f64,
    ) -> Self {
        Self {
            label: label.into(),
            endowment,
            intercept,
            slope,
            capacity,
            price: None,
        }
    }

    pub fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    /// Unit price paid when buying `q`: `I - S*(A - q/2)`.
    ///
    /// At `q == 0` this is the marginal price `I - S*A`.
    pub fn average_cost(&self, q: Quantity) -> Price {
        self.intercept - self.slope * (self.endowment - q / 2.0)
    }

    /// Spend required to buy `q`.
    pub fn cost(&self, q: Quantity) -> f64 {
        self.average_cost(q) * q
    }

    /// Quantity bought with spend `p`; inverse of [`Good::cost`] on its
    /// increasing branch.
    pub fn quantity_for_spend(&self, p: f64) -> Result<Quantity, EquilibriumError> {
        if self.slope == 0.0 {
            if self.intercept == 0.0 {
                return Ok(0.0);
            }
            return Ok(p / self.intercept);
        }
        let gap = self.intercept - self.slope * self.endowment;
        let radicand = gap * gap + 2.0 * self.slope * p;
        if radicand < 0.0 {
            return Err(EquilibriumError::Domain {
                discriminant: radicand,
            });
        }
        Ok(self.endowment - (self.intercept - radicand.sqrt()) / self.slope)
    }

    pub(crate) fn check_finite(&self) -> Result<(), EquilibriumError> {
        let fields = [
            ("endowment", self.endowment),
            ("intercept", self.intercept),
            ("slope", self.slope),
            ("capacity", self.capacity),
            ("price", self.price.unwrap_or(0.0)),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(EquilibriumError::InvalidParameter {
                    good: self.label.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}
