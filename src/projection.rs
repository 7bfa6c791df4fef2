//! Compound-growth projection of a charge-point count against a target.
//!
//! The projector is policy-free: it accepts any rate and returns a signed
//! gap. Bounds on the rate and the shortfall/surplus wording belong to the
//! caller. Inputs outside `current >= 0`, `rate > -1` are not checked.

/// One projected value, `offset` whole years after the starting point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionPoint {
    pub offset: u32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionResult {
    /// `horizon + 1` points, offsets `0..=horizon`.
    pub points: Vec<ProjectionPoint>,
    /// `target - final value`; positive means the projection falls short.
    pub gap: f64,
    pub gap_percent: f64,
}

impl ProjectionResult {
    pub fn final_value(&self) -> f64 {
        // `points` always holds at least the offset-0 value
        self.points.last().map_or(0.0, |p| p.value)
    }
}

/// Project `current` forward with discrete annual compounding.
///
/// `value(k) = current * (1 + annual_growth_rate)^k` for `k` in `0..=horizon_years`.
pub fn project(
    current: f64,
    annual_growth_rate: f64,
    horizon_years: u32,
    target: f64,
) -> ProjectionResult {
    let factor = 1.0 + annual_growth_rate;
    let points: Vec<ProjectionPoint> = (0..=horizon_years)
        .map(|k| ProjectionPoint {
            offset: k,
            value: current * compound(factor, k),
        })
        .collect();

    let final_value = points.last().map_or(current, |p| p.value);
    let gap = target - final_value;
    ProjectionResult {
        points,
        gap,
        gap_percent: gap / target * 100.0,
    }
}

/// `factor^years`, falling back to `powf` past the `i32` exponent range.
fn compound(factor: f64, years: u32) -> f64 {
    match i32::try_from(years) {
        Ok(exp) => factor.powi(exp),
        Err(_) => factor.powf(f64::from(years)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, u32::MAX, 1.0)]
    #[case(0.5, u32::MAX, 0.0)]
    #[case(1.1, 2, 1.21)]
    fn compound_handles_exponents_past_i32(
        #[case] factor: f64,
        #[case] years: u32,
        #[case] expected: f64,
    ) {
        assert!(approx_eq!(f64, compound(factor, years), expected, epsilon = 1e-12));
    }

    #[test]
    fn compound_grows_past_i32_exponent() {
        // A wrapped exponent would be negative and shrink the value
        let big = u32::try_from(i32::MAX).unwrap() + 1;
        assert!(compound(1.0001, big) > 1.0);
    }

    #[test]
    fn project_reference_scenario() {
        let result = project(100_000.0, 0.30, 5, 1_500_000.0);
        assert_eq!(result.points.len(), 6);
        assert!(approx_eq!(f64, result.final_value(), 371_293.0, epsilon = 1e-6));
        assert!(approx_eq!(f64, result.gap, 1_128_707.0, epsilon = 1e-6));
        assert!(result.gap > 0.0);
        assert!((result.gap_percent - 75.247).abs() < 1e-3);
    }

    #[rstest]
    #[case(0.10)]
    #[case(0.30)]
    #[case(0.60)]
    fn project_strictly_increasing_for_positive_rate(#[case] rate: f64) {
        let result = project(1_000.0, rate, 10, 1.0);
        for pair in result.points.windows(2) {
            assert!(pair[1].value > pair[0].value);
        }
    }

    #[test]
    fn project_constant_for_zero_rate() {
        let result = project(42.0, 0.0, 4, 100.0);
        assert!(result.points.iter().all(|p| p.value == 42.0));
        assert!(approx_eq!(f64, result.gap, 58.0));
    }

    #[test]
    fn project_zero_current_stays_zero() {
        let result = project(0.0, 0.5, 3, 100.0);
        assert_eq!(result.points.len(), 4);
        assert!(result.points.iter().all(|p| p.value == 0.0));
        assert!(approx_eq!(f64, result.gap, 100.0));
        assert!(approx_eq!(f64, result.gap_percent, 100.0));
    }

    #[test]
    fn project_zero_horizon_is_single_point() {
        let result = project(500.0, 0.2, 0, 1_000.0);
        assert_eq!(
            result.points,
            [ProjectionPoint {
                offset: 0,
                value: 500.0
            }]
        );
        assert!(approx_eq!(f64, result.gap, 500.0));
        assert!(approx_eq!(f64, result.gap_percent, 50.0));
    }

    #[test]
    fn project_negative_rate_decays() {
        let result = project(1_000.0, -0.5, 3, 2_000.0);
        let values: Vec<f64> = result.points.iter().map(|p| p.value).collect();
        assert_eq!(values, [1_000.0, 500.0, 250.0, 125.0]);
    }

    #[test]
    fn project_surplus_has_negative_gap() {
        let result = project(1_000_000.0, 0.6, 5, 1_500_000.0);
        assert!(result.gap < 0.0);
        assert!(result.gap_percent < 0.0);
    }

    #[test]
    fn project_offsets_are_sequential() {
        let result = project(10.0, 0.1, 3, 20.0);
        let offsets: Vec<u32> = result.points.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, [0, 1, 2, 3]);
    }
}
