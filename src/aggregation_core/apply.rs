//! Allocation application - scale a gas tuple by a percentage

use super::types::GasValues;

/// Scale every gas field, including uncertainty, by `pct`/100. Pure; no
/// rounding here - the finalizer rounds at the reporting boundary.
pub fn apply_allocation(values: &GasValues, pct: f64) -> GasValues {
    let factor = pct / 100.0;
    GasValues {
        co2e: values.co2e * factor,
        co2: values.co2 * factor,
        ch4: values.ch4 * factor,
        n2o: values.n2o * factor,
        uncertainty: values.uncertainty * factor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_allocation_is_identity() {
        let raw = GasValues {
            co2e: 100.0,
            co2: 90.0,
            ch4: 5.0,
            n2o: 1.0,
            uncertainty: 2.5,
        };
        assert_eq!(apply_allocation(&raw, 100.0), raw);
    }

    #[test]
    fn test_split_scales_every_field() {
        let raw = GasValues {
            co2e: 100.0,
            co2: 90.0,
            ch4: 5.0,
            n2o: 1.0,
            uncertainty: 2.0,
        };
        let allocated = apply_allocation(&raw, 40.0);
        assert!((allocated.co2e - 40.0).abs() < 1e-9);
        assert!((allocated.co2 - 36.0).abs() < 1e-9);
        assert!((allocated.ch4 - 2.0).abs() < 1e-9);
        assert!((allocated.n2o - 0.4).abs() < 1e-9);
        assert!((allocated.uncertainty - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_zero_allocation_zeroes_out() {
        let raw = GasValues {
            co2e: 100.0,
            ..GasValues::default()
        };
        assert_eq!(apply_allocation(&raw, 0.0), GasValues::default());
    }

    #[test]
    fn test_split_conserves_total() {
        let raw = GasValues {
            co2e: 123.456789,
            ..GasValues::default()
        };
        let parts = [33.33, 33.33, 33.34];
        let sum: f64 = parts.iter().map(|p| apply_allocation(&raw, *p).co2e).sum();
        assert!((sum - raw.co2e).abs() < 1e-6);
    }
}
