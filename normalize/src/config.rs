use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// How missing `frequencies` rows are found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackfillStrategy {
    /// Query each (business, mode) and insert the nations it lacks.
    #[default]
    GapScan,
    /// Build the full nation × business × mode set once and insert the
    /// difference with what is stored.
    SetDifference,
}

/// Knobs of the normalization pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Nations are numbered `1..=nation_count`.
    pub nation_count: i64,
    /// Towns with id up to this are fixed; later ones get re-sorted and renumbered.
    pub fixed_towns: i64,
    /// Business whose outputs are counted yearly and need a daily rate.
    pub livestock_business: i64,
    pub livestock_goods: RangeInclusive<i64>,
    pub days_per_year: f64,
    pub backfill: BackfillStrategy,
    pub dedupe_routes: bool,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            nation_count: 14,
            fixed_towns: 14,
            livestock_business: 4,
            livestock_goods: 59..=65,
            days_per_year: 365.0,
            backfill: BackfillStrategy::GapScan,
            dedupe_routes: true,
        }
    }
}

impl NormalizeConfig {
    pub fn validate(&self) -> StoreResult<()> {
        if self.nation_count < 1 {
            return Err(StoreError::Config(format!(
                "nation_count must be at least 1, got {}",
                self.nation_count
            )));
        }
        if self.fixed_towns < 0 {
            return Err(StoreError::Config(format!(
                "fixed_towns must not be negative, got {}",
                self.fixed_towns
            )));
        }
        if !(self.days_per_year.is_finite() && self.days_per_year > 0.0) {
            return Err(StoreError::Config(format!(
                "days_per_year must be positive, got {}",
                self.days_per_year
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_shipped_world() {
        let cfg = NormalizeConfig::default();
        assert_eq!(cfg.nation_count, 14);
        assert_eq!(cfg.fixed_towns, 14);
        assert!(cfg.livestock_goods.contains(&59) && cfg.livestock_goods.contains(&65));
        assert!(!cfg.livestock_goods.contains(&66));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_day_count() {
        let cfg = NormalizeConfig {
            days_per_year: 0.0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(StoreError::Config(_))));
    }

    #[test]
    fn rejects_empty_nation_range() {
        let cfg = NormalizeConfig {
            nation_count: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
