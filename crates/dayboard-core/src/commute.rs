//! Ride-share commute cost estimation
//!
//! Cost is `base + per_mile * miles + per_minute * minutes`, with the high
//! end scaled by a surge multiplier. Distances come from the caller; no maps
//! lookup happens here.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MILES_PER_METER: f64 = 0.000_621_371;

/// Fare parameters for one city
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuteCostModel {
    pub base_cents: i64,
    pub per_mile_cents: i64,
    pub per_minute_cents: i64,
}

impl Default for CommuteCostModel {
    fn default() -> Self {
        Self {
            base_cents: 200,
            per_mile_cents: 150,
            per_minute_cents: 25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommuteEstimate {
    pub distance_miles: f64,
    pub duration_minutes: f64,
    pub est_cost_low_cents: i64,
    pub est_cost_high_cents: i64,
}

fn check_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidInput(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

impl CommuteCostModel {
    /// Estimate a trip's cost range; both ends are truncated to whole cents
    pub fn estimate(&self, miles: f64, minutes: f64, surge: f64) -> Result<CommuteEstimate> {
        check_non_negative("distance", miles)?;
        check_non_negative("duration", minutes)?;
        check_non_negative("surge", surge)?;

        let low = self.base_cents as f64
            + self.per_mile_cents as f64 * miles
            + self.per_minute_cents as f64 * minutes;
        let high = low * surge;

        Ok(CommuteEstimate {
            distance_miles: miles,
            duration_minutes: minutes,
            est_cost_low_cents: low.trunc() as i64,
            est_cost_high_cents: high.trunc() as i64,
        })
    }

    /// Estimate from a routing result in meters and seconds
    pub fn estimate_route(&self, meters: u64, seconds: u64, surge: f64) -> Result<CommuteEstimate> {
        let miles = meters as f64 * MILES_PER_METER;
        let minutes = seconds as f64 / 60.0;
        self.estimate(miles, minutes, surge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_arithmetic() {
        let model = CommuteCostModel::default();
        let est = model.estimate(5.0, 15.0, 1.5).unwrap();

        // 200 + 150*5 + 25*15 = 1325
        assert_eq!(est.est_cost_low_cents, 1325);
        assert_eq!(est.est_cost_high_cents, 1987);
        assert_eq!(est.distance_miles, 5.0);
        assert_eq!(est.duration_minutes, 15.0);
    }

    #[test]
    fn test_estimate_truncates() {
        let model = CommuteCostModel::default();
        // 200 + 150*0.333 + 25*0 = 249.95
        let est = model.estimate(0.333, 0.0, 1.0).unwrap();
        assert_eq!(est.est_cost_low_cents, 249);
        assert_eq!(est.est_cost_high_cents, 249);
    }

    #[test]
    fn test_zero_trip_costs_base_fare() {
        let est = CommuteCostModel::default().estimate(0.0, 0.0, 1.0).unwrap();
        assert_eq!(est.est_cost_low_cents, 200);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let model = CommuteCostModel::default();
        assert!(model.estimate(-1.0, 10.0, 1.0).is_err());
        assert!(model.estimate(1.0, f64::NAN, 1.0).is_err());
        assert!(model.estimate(1.0, 10.0, f64::INFINITY).is_err());
        assert!(model.estimate(1.0, 10.0, -0.5).is_err());
    }

    #[test]
    fn test_estimate_route_converts_units() {
        let model = CommuteCostModel {
            base_cents: 0,
            per_mile_cents: 100,
            per_minute_cents: 10,
        };
        // 1609 m is just under a mile; 600 s is 10 minutes
        let est = model.estimate_route(1609, 600, 1.0).unwrap();
        assert!((est.distance_miles - 0.99978).abs() < 1e-4);
        assert_eq!(est.duration_minutes, 10.0);
        assert_eq!(est.est_cost_low_cents, 199);
    }
}
