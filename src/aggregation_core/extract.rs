//! Emission value extraction - normalizes raw entry gas values
//!
//! Raw entries carry a nested `calculatedEmissions` structure with an
//! `incoming` bucket (this period's contributions) and a `cumulative` bucket
//! (running totals across periods). Only `incoming` is summed here; reading
//! `cumulative` would double count period over period.

use super::types::{CalculatedEmissions, GasContribution, GasValues};

/// Sum a raw entry's incoming contributions into one canonical gas tuple.
/// Absent fields are treated as zero.
pub fn extract_gas_values(emissions: &CalculatedEmissions) -> GasValues {
    let mut total = GasValues::default();
    for contribution in &emissions.incoming {
        total.co2e += resolve_co2e(contribution);
        total.co2 += contribution.co2;
        total.ch4 += contribution.ch4;
        total.n2o += contribution.n2o;
        total.uncertainty += contribution.uncertainty;
    }
    total
}

/// The CO2e value has shipped under three field names over the product's
/// lifetime. Resolved in priority order; enumerated here once rather than
/// inferred at each use site.
fn resolve_co2e(contribution: &GasContribution) -> f64 {
    contribution
        .co2e
        .or(contribution.emission)
        .or(contribution.co2e_incl_uncertainty)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(co2e: Option<f64>, emission: Option<f64>, incl: Option<f64>) -> GasContribution {
        GasContribution {
            co2e,
            emission,
            co2e_incl_uncertainty: incl,
            ..GasContribution::default()
        }
    }

    #[test]
    fn test_canonical_field_wins() {
        let emissions = CalculatedEmissions {
            incoming: vec![contribution(Some(10.0), Some(99.0), Some(98.0))],
            cumulative: vec![],
        };
        assert_eq!(extract_gas_values(&emissions).co2e, 10.0);
    }

    #[test]
    fn test_legacy_fields_in_priority_order() {
        let emissions = CalculatedEmissions {
            incoming: vec![contribution(None, Some(42.0), Some(98.0))],
            cumulative: vec![],
        };
        assert_eq!(extract_gas_values(&emissions).co2e, 42.0);

        let emissions = CalculatedEmissions {
            incoming: vec![contribution(None, None, Some(98.0))],
            cumulative: vec![],
        };
        assert_eq!(extract_gas_values(&emissions).co2e, 98.0);
    }

    #[test]
    fn test_absent_fields_are_zero() {
        let emissions = CalculatedEmissions {
            incoming: vec![contribution(None, None, None)],
            cumulative: vec![],
        };
        assert_eq!(extract_gas_values(&emissions), GasValues::default());
    }

    #[test]
    fn test_incoming_summed_cumulative_ignored() {
        let emissions = CalculatedEmissions {
            incoming: vec![
                GasContribution {
                    co2e: Some(10.0),
                    co2: 8.0,
                    ch4: 0.5,
                    ..GasContribution::default()
                },
                GasContribution {
                    co2e: Some(5.0),
                    n2o: 0.25,
                    uncertainty: 0.1,
                    ..GasContribution::default()
                },
            ],
            cumulative: vec![contribution(Some(100_000.0), None, None)],
        };

        let total = extract_gas_values(&emissions);
        assert_eq!(total.co2e, 15.0);
        assert_eq!(total.co2, 8.0);
        assert_eq!(total.ch4, 0.5);
        assert_eq!(total.n2o, 0.25);
        assert_eq!(total.uncertainty, 0.1);
    }
}
